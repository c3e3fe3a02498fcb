//! Borrower (directory entry) model.
//!
//! A borrower is one of two roles: standard members and privileged members.
//! The role is a closed union carrying one role-specific field; dispatch is by
//! pattern match. Each borrower tracks the items it currently holds and a
//! bounded, most-recent-first history log.

use std::collections::VecDeque;

use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::error::CirculationError;

/// Maximum number of history entries kept per borrower.
pub const HISTORY_CAP: usize = 20;

/// Default lending limit for standard members.
pub const STANDARD_LIMIT: i32 = 5;

/// Default lending limit for privileged members.
pub const PRIVILEGED_LIMIT: i32 = 10;

/// Borrower role with its role-specific field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Role {
    /// Standard member enrolled in a program
    Standard { program: String },
    /// Privileged member holding a rank
    Privileged { rank: String },
}

impl Role {
    /// Role discriminator used for display and persistence tagging
    pub fn label(&self) -> &'static str {
        match self {
            Role::Standard { .. } => "Standard",
            Role::Privileged { .. } => "Privileged",
        }
    }

    /// The role-specific field (program or rank)
    pub fn extra(&self) -> &str {
        match self {
            Role::Standard { program } => program,
            Role::Privileged { rank } => rank,
        }
    }
}

/// A directory entry with a lending limit and the items it currently holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Borrower {
    id: String,
    name: String,
    affiliation: String,
    role: Role,
    limit: i32,
    held_count: i32,
    held_item_ids: Vec<i32>,
    history: VecDeque<String>,
}

impl Borrower {
    /// Create a standard member with the default lending limit.
    pub fn standard(
        id: impl Into<String>,
        name: impl Into<String>,
        affiliation: impl Into<String>,
        program: impl Into<String>,
    ) -> Self {
        Self::with_limit(
            id,
            name,
            affiliation,
            Role::Standard {
                program: program.into(),
            },
            STANDARD_LIMIT,
        )
    }

    /// Create a privileged member with the default lending limit.
    pub fn privileged(
        id: impl Into<String>,
        name: impl Into<String>,
        affiliation: impl Into<String>,
        rank: impl Into<String>,
    ) -> Self {
        Self::with_limit(
            id,
            name,
            affiliation,
            Role::Privileged { rank: rank.into() },
            PRIVILEGED_LIMIT,
        )
    }

    /// Create a borrower with an explicit lending limit.
    pub fn with_limit(
        id: impl Into<String>,
        name: impl Into<String>,
        affiliation: impl Into<String>,
        role: Role,
        limit: i32,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            affiliation: affiliation.into(),
            role,
            limit,
            held_count: 0,
            held_item_ids: Vec::new(),
            history: VecDeque::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn affiliation(&self) -> &str {
        &self.affiliation
    }

    pub fn role(&self) -> &Role {
        &self.role
    }

    /// Role discriminator ("Standard"/"Privileged")
    pub fn role_label(&self) -> &'static str {
        self.role.label()
    }

    pub fn limit(&self) -> i32 {
        self.limit
    }

    pub fn held_count(&self) -> i32 {
        self.held_count
    }

    /// Identifiers of the items currently held, in loan order
    pub fn held_item_ids(&self) -> &[i32] {
        &self.held_item_ids
    }

    /// History entries, most recent first, at most [`HISTORY_CAP`]
    pub fn history(&self) -> impl Iterator<Item = &str> {
        self.history.iter().map(String::as_str)
    }

    /// True while the borrower is below their lending limit.
    pub fn can_borrow_more(&self) -> bool {
        self.held_count < self.limit
    }

    /// Membership test on the held-item list.
    pub fn holds(&self, item_id: i32) -> bool {
        self.held_item_ids.contains(&item_id)
    }

    /// Record that the borrower took an item.
    ///
    /// The catalog checks the limit and duplicate holds before calling this;
    /// an id already present is left alone so it can never appear twice.
    pub fn record_loan(&mut self, item_id: i32) {
        if self.holds(item_id) {
            return;
        }
        self.held_item_ids.push(item_id);
        self.held_count += 1;
    }

    /// Record that the borrower gave an item back.
    pub fn record_return(&mut self, item_id: i32) -> Result<(), CirculationError> {
        match self.held_item_ids.iter().position(|&id| id == item_id) {
            Some(pos) => {
                self.held_item_ids.remove(pos);
                self.held_count -= 1;
                Ok(())
            }
            None => Err(CirculationError::NotHeld),
        }
    }

    /// Prepend a timestamped entry, evicting the oldest past [`HISTORY_CAP`].
    pub fn append_history(&mut self, entry: impl AsRef<str>) {
        let stamp = Local::now().format("%Y-%m-%d %H:%M:%S");
        self.history.push_front(format!("{} - {}", stamp, entry.as_ref()));
        if self.history.len() > HISTORY_CAP {
            self.history.pop_back();
        }
    }

    /// Credential the login boundary expects: the last six characters of the
    /// id, or the whole id when shorter.
    pub fn expected_credential(&self) -> &str {
        let chars = self.id.chars().count();
        match self.id.char_indices().nth(chars.saturating_sub(6)) {
            Some((pos, _)) => &self.id[pos..],
            None => &self.id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_limits_per_role() {
        let s = Borrower::standard("2023001", "Ada", "Engineering", "Software");
        let p = Borrower::privileged("T-42", "Grace", "Engineering", "Professor");
        assert_eq!(s.limit(), STANDARD_LIMIT);
        assert_eq!(p.limit(), PRIVILEGED_LIMIT);
        assert_eq!(s.role_label(), "Standard");
        assert_eq!(p.role_label(), "Privileged");
    }

    #[test]
    fn record_loan_never_duplicates_an_id() {
        let mut b = Borrower::standard("s1", "Ada", "Eng", "SW");
        b.record_loan(7);
        b.record_loan(7);
        assert_eq!(b.held_item_ids(), &[7]);
        assert_eq!(b.held_count(), 1);
    }

    #[test]
    fn record_return_of_absent_id_is_refused() {
        let mut b = Borrower::standard("s1", "Ada", "Eng", "SW");
        assert_eq!(b.record_return(3), Err(CirculationError::NotHeld));
        b.record_loan(3);
        assert!(b.record_return(3).is_ok());
        assert_eq!(b.held_count(), 0);
    }

    #[test]
    fn history_is_capped_and_most_recent_first() {
        let mut b = Borrower::standard("s1", "Ada", "Eng", "SW");
        for i in 0..25 {
            b.append_history(format!("entry {}", i));
        }
        let entries: Vec<&str> = b.history().collect();
        assert_eq!(entries.len(), HISTORY_CAP);
        assert!(entries[0].ends_with("entry 24"));
        assert!(entries[HISTORY_CAP - 1].ends_with("entry 5"));
    }

    #[test]
    fn credential_is_last_six_characters_of_id() {
        let b = Borrower::standard("20230015", "Ada", "Eng", "SW");
        assert_eq!(b.expected_credential(), "230015");
        let short = Borrower::standard("abc", "Bob", "Eng", "SW");
        assert_eq!(short.expected_credential(), "abc");
    }
}
