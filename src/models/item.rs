//! Item (catalog entry) model.
//!
//! An item carries a fixed number of physical copies; availability is derived
//! from the count of copies still on the shelf and refreshed on every mutation.

use serde::{Deserialize, Serialize};

use crate::error::CirculationError;

/// A catalog entry with finite copies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    id: i32,
    title: String,
    creator: String,
    /// External catalog code (ISBN or similar)
    code: String,
    category: String,
    total_copies: i32,
    available_copies: i32,
    /// Derived from `available_copies`, refreshed by `update_availability`
    is_available: bool,
}

impl Item {
    /// Create a new item with all copies on the shelf.
    pub fn new(
        id: i32,
        title: impl Into<String>,
        creator: impl Into<String>,
        code: impl Into<String>,
        category: impl Into<String>,
        copies: i32,
    ) -> Self {
        let copies = copies.max(0);
        let mut item = Self {
            id,
            title: title.into(),
            creator: creator.into(),
            code: code.into(),
            category: category.into(),
            total_copies: copies,
            available_copies: copies,
            is_available: false,
        };
        item.update_availability();
        item
    }

    pub fn id(&self) -> i32 {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn creator(&self) -> &str {
        &self.creator
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn total_copies(&self) -> i32 {
        self.total_copies
    }

    pub fn available_copies(&self) -> i32 {
        self.available_copies
    }

    pub fn is_available(&self) -> bool {
        self.is_available
    }

    /// Take one copy off the shelf.
    ///
    /// Fails with [`CirculationError::NoCopiesAvailable`] when every copy is
    /// already out; the counts are left untouched in that case.
    pub fn loan(&mut self) -> Result<(), CirculationError> {
        if self.available_copies > 0 {
            self.available_copies -= 1;
            self.update_availability();
            Ok(())
        } else {
            Err(CirculationError::NoCopiesAvailable)
        }
    }

    /// Put one copy back on the shelf.
    ///
    /// Fails with [`CirculationError::AllCopiesAlreadyReturned`] when the
    /// shelf is already full, guarding against over-return.
    pub fn give_back(&mut self) -> Result<(), CirculationError> {
        if self.available_copies < self.total_copies {
            self.available_copies += 1;
            self.update_availability();
            Ok(())
        } else {
            Err(CirculationError::AllCopiesAlreadyReturned)
        }
    }

    fn update_availability(&mut self) {
        self.is_available = self.available_copies > 0;
    }
}
