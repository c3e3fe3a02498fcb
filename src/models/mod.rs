//! Domain models

pub mod borrower;
pub mod item;

pub use borrower::{Borrower, Role, HISTORY_CAP, PRIVILEGED_LIMIT, STANDARD_LIMIT};
pub use item::Item;
