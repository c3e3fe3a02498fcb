//! Catalog aggregate: item and borrower collections, the on-loan ledger, and
//! the circulation state machine.
//!
//! The catalog owns its items by value and its borrowers exclusively; removal
//! drops the entry. A loan or return validates every precondition before the
//! first mutation, so a refused operation leaves no partial state behind.
//! Failures are signaled by `bool`/`Option` results and logged; the caller
//! decides what to present.

use indexmap::IndexSet;

use crate::models::{Borrower, Item};

/// The circulation engine.
#[derive(Debug, Default)]
pub struct Catalog {
    name: String,
    location: String,
    items: Vec<Item>,
    borrowers: Vec<Borrower>,
    /// Ids of items currently out. Tracks *that* an item is on loan, not to
    /// whom; the borrower-to-item association lives on the borrower side.
    loaned_item_ids: IndexSet<i32>,
    total_items: usize,
    available_items: usize,
}

impl Catalog {
    pub fn new(name: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            location: location.into(),
            ..Self::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn set_location(&mut self, location: impl Into<String>) {
        self.location = location.into();
    }

    /// Number of catalog entries.
    pub fn total_items(&self) -> usize {
        self.total_items
    }

    /// Number of entries with at least one copy on the shelf.
    pub fn available_items(&self) -> usize {
        self.available_items
    }

    // -------------------------------------------------------------------
    // Item management
    // -------------------------------------------------------------------

    pub fn add_item(&mut self, item: Item) {
        tracing::info!(id = item.id(), title = item.title(), "item added to catalog");
        self.items.push(item);
        self.update_statistics();
    }

    /// Remove an item by id. Returns false when no such item exists.
    pub fn remove_item(&mut self, item_id: i32) -> bool {
        match self.items.iter().position(|item| item.id() == item_id) {
            Some(pos) => {
                let removed = self.items.remove(pos);
                tracing::info!(id = item_id, title = removed.title(), "item removed");
                self.update_statistics();
                true
            }
            None => {
                tracing::warn!(id = item_id, "remove failed: no such item");
                false
            }
        }
    }

    pub fn find_by_id(&self, item_id: i32) -> Option<&Item> {
        self.items.iter().find(|item| item.id() == item_id)
    }

    pub fn find_by_id_mut(&mut self, item_id: i32) -> Option<&mut Item> {
        self.items.iter_mut().find(|item| item.id() == item_id)
    }

    /// First item whose title matches exactly. Titles are not unique; the
    /// first match wins.
    pub fn find_by_title(&self, title: &str) -> Option<&Item> {
        self.items.iter().find(|item| item.title() == title)
    }

    pub fn find_by_category(&self, category: &str) -> Vec<&Item> {
        self.items
            .iter()
            .filter(|item| item.category() == category)
            .collect()
    }

    pub fn find_by_creator(&self, creator: &str) -> Vec<&Item> {
        self.items
            .iter()
            .filter(|item| item.creator() == creator)
            .collect()
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Mutable view for callers that need stable access to entries.
    pub fn items_mut(&mut self) -> &mut Vec<Item> {
        &mut self.items
    }

    /// Replace the whole item collection and recompute aggregates.
    pub fn set_items(&mut self, items: Vec<Item>) {
        self.items = items;
        self.update_statistics();
    }

    // -------------------------------------------------------------------
    // Circulation
    // -------------------------------------------------------------------

    /// Take one copy of an item out, at the catalog-ledger level.
    ///
    /// Refused when the item is unknown, has no copies left, or its id is
    /// already in the ledger.
    pub fn lend(&mut self, item_id: i32) -> bool {
        if self.loaned_item_ids.contains(&item_id) {
            tracing::warn!(id = item_id, "lend failed: item already in the loan ledger");
            return false;
        }
        let Some(item) = self.items.iter_mut().find(|item| item.id() == item_id) else {
            tracing::warn!(id = item_id, "lend failed: no such item");
            return false;
        };
        match item.loan() {
            Ok(()) => {
                tracing::info!(id = item_id, title = item.title(), "item lent");
                self.loaned_item_ids.insert(item_id);
                self.update_statistics();
                true
            }
            Err(reason) => {
                tracing::warn!(id = item_id, %reason, "lend failed");
                false
            }
        }
    }

    /// Take one copy of an item back, at the catalog-ledger level.
    pub fn receive(&mut self, item_id: i32) -> bool {
        if !self.loaned_item_ids.contains(&item_id) {
            tracing::warn!(id = item_id, "receive failed: item not in the loan ledger");
            return false;
        }
        let Some(item) = self.items.iter_mut().find(|item| item.id() == item_id) else {
            tracing::warn!(id = item_id, "receive failed: no such item");
            return false;
        };
        match item.give_back() {
            Ok(()) => {
                tracing::info!(id = item_id, title = item.title(), "item received back");
                self.loaned_item_ids.shift_remove(&item_id);
                self.update_statistics();
                true
            }
            Err(reason) => {
                tracing::warn!(id = item_id, %reason, "receive failed");
                false
            }
        }
    }

    pub fn is_available(&self, item_id: i32) -> bool {
        self.find_by_id(item_id)
            .map(Item::is_available)
            .unwrap_or(false)
    }

    /// Loan an item to a borrower.
    ///
    /// Every precondition is checked before the first mutation: the borrower
    /// exists, is under their limit and does not already hold the item; the
    /// item exists, has a copy available and is not already in the ledger.
    /// On success the copy count drops, the ledger gains the id, the borrower
    /// records the loan and a history entry is appended.
    pub fn loan(&mut self, item_id: i32, borrower_id: &str) -> bool {
        let Some(borrower_pos) = self.borrower_position(borrower_id) else {
            tracing::warn!(borrower = borrower_id, "loan failed: no such borrower");
            return false;
        };
        let borrower = &self.borrowers[borrower_pos];
        if !borrower.can_borrow_more() {
            tracing::warn!(
                borrower = borrower_id,
                limit = borrower.limit(),
                "loan failed: lending limit reached"
            );
            return false;
        }
        if borrower.holds(item_id) {
            tracing::warn!(
                borrower = borrower_id,
                id = item_id,
                "loan failed: borrower already holds the item"
            );
            return false;
        }
        let Some(item) = self.find_by_id(item_id) else {
            tracing::warn!(id = item_id, "loan failed: no such item");
            return false;
        };
        if !item.is_available() {
            tracing::warn!(id = item_id, title = item.title(), "loan failed: no copies available");
            return false;
        }
        if self.loaned_item_ids.contains(&item_id) {
            tracing::warn!(id = item_id, "loan failed: item already in the loan ledger");
            return false;
        }
        let title = item.title().to_string();

        // All preconditions hold; none of these steps can refuse now.
        let loaned = self.lend(item_id);
        debug_assert!(loaned);
        let borrower = &mut self.borrowers[borrower_pos];
        borrower.record_loan(item_id);
        borrower.append_history(format!("Borrowed \"{}\"", title));
        tracing::info!(
            borrower = borrower_id,
            id = item_id,
            title = %title,
            held = borrower.held_count(),
            limit = borrower.limit(),
            "loan completed"
        );
        true
    }

    /// Return an item held by a borrower.
    ///
    /// Preconditions: the borrower holds the item, the item exists and its id
    /// is in the ledger. A refused return mutates nothing.
    pub fn return_item(&mut self, item_id: i32, borrower_id: &str) -> bool {
        let Some(borrower_pos) = self.borrower_position(borrower_id) else {
            tracing::warn!(borrower = borrower_id, "return failed: no such borrower");
            return false;
        };
        if !self.borrowers[borrower_pos].holds(item_id) {
            tracing::warn!(
                borrower = borrower_id,
                id = item_id,
                "return failed: borrower does not hold the item"
            );
            return false;
        }
        let Some(item) = self.find_by_id(item_id) else {
            tracing::warn!(id = item_id, "return failed: no such item");
            return false;
        };
        if !self.loaned_item_ids.contains(&item_id) {
            tracing::warn!(id = item_id, "return failed: item not in the loan ledger");
            return false;
        }
        let title = item.title().to_string();

        let received = self.receive(item_id);
        debug_assert!(received);
        let borrower = &mut self.borrowers[borrower_pos];
        let recorded = borrower.record_return(item_id);
        debug_assert!(recorded.is_ok());
        borrower.append_history(format!("Returned \"{}\"", title));
        tracing::info!(
            borrower = borrower_id,
            id = item_id,
            title = %title,
            held = borrower.held_count(),
            "return completed"
        );
        true
    }

    /// Ids of the items currently out, in loan order.
    pub fn loaned_item_ids(&self) -> impl Iterator<Item = i32> + '_ {
        self.loaned_item_ids.iter().copied()
    }

    // -------------------------------------------------------------------
    // Borrower management
    // -------------------------------------------------------------------

    /// Register a borrower. Refused when the id is already taken.
    pub fn add_borrower(&mut self, borrower: Borrower) -> bool {
        if self.find_borrower_by_id(borrower.id()).is_some() {
            tracing::warn!(
                borrower = borrower.id(),
                "registration failed: id already exists"
            );
            return false;
        }
        tracing::info!(
            borrower = borrower.id(),
            role = borrower.role_label(),
            name = borrower.name(),
            "borrower registered"
        );
        self.borrowers.push(borrower);
        true
    }

    /// Remove a borrower by id, dropping the record.
    ///
    /// Item ids the borrower still held stay in the loan ledger; existing
    /// snapshot files and callers depend on the ledger not being reconciled
    /// here.
    pub fn remove_borrower(&mut self, borrower_id: &str) -> bool {
        match self.borrower_position(borrower_id) {
            Some(pos) => {
                let removed = self.borrowers.remove(pos);
                tracing::info!(
                    borrower = borrower_id,
                    role = removed.role_label(),
                    name = removed.name(),
                    "borrower removed"
                );
                true
            }
            None => {
                tracing::warn!(borrower = borrower_id, "remove failed: no such borrower");
                false
            }
        }
    }

    pub fn find_borrower_by_id(&self, borrower_id: &str) -> Option<&Borrower> {
        self.borrowers.iter().find(|b| b.id() == borrower_id)
    }

    pub fn find_borrower_by_id_mut(&mut self, borrower_id: &str) -> Option<&mut Borrower> {
        self.borrowers.iter_mut().find(|b| b.id() == borrower_id)
    }

    pub fn borrowers(&self) -> &[Borrower] {
        &self.borrowers
    }

    /// Replace the whole borrower collection; the previous set is dropped.
    pub fn set_borrowers(&mut self, borrowers: Vec<Borrower>) {
        self.borrowers = borrowers;
    }

    fn borrower_position(&self, borrower_id: &str) -> Option<usize> {
        self.borrowers.iter().position(|b| b.id() == borrower_id)
    }

    // -------------------------------------------------------------------
    // Statistics
    // -------------------------------------------------------------------

    /// Item count per category, in first-seen order.
    pub fn category_counts(&self) -> Vec<(String, usize)> {
        let mut counts: Vec<(String, usize)> = Vec::new();
        for item in &self.items {
            match counts.iter_mut().find(|(cat, _)| cat == item.category()) {
                Some((_, n)) => *n += 1,
                None => counts.push((item.category().to_string(), 1)),
            }
        }
        counts
    }

    fn update_statistics(&mut self) {
        self.total_items = self.items.len();
        self.available_items = self.items.iter().filter(|i| i.is_available()).count();
    }

    // -------------------------------------------------------------------
    // Demonstration data
    // -------------------------------------------------------------------

    /// Load a fixed demonstration dataset.
    pub fn seed_sample_catalog(&mut self) {
        self.add_item(Item::new(1, "The C++ Programming Language", "Bjarne Stroustrup", "978-0-321-56384-2", "Computing", 3));
        self.add_item(Item::new(2, "Introduction to Algorithms", "Thomas H. Cormen", "978-0-262-03384-8", "Computing", 2));
        self.add_item(Item::new(3, "Structure and Interpretation of Computer Programs", "Harold Abelson", "978-0-262-51087-5", "Computing", 1));
        self.add_item(Item::new(4, "The Count of Monte Cristo", "Alexandre Dumas", "978-0-14-044926-6", "Literature", 5));
        self.add_item(Item::new(5, "Don Quixote", "Miguel de Cervantes", "978-0-06-093434-7", "Literature", 3));
        self.add_item(Item::new(6, "Design Patterns", "Erich Gamma", "978-0-201-63361-0", "Computing", 3));
        self.add_item(Item::new(7, "The Pragmatic Programmer", "Andrew Hunt", "978-0-201-61622-4", "Software Engineering", 4));
        self.add_item(Item::new(8, "The Three-Body Problem", "Liu Cixin", "978-0-7653-7706-7", "Science Fiction", 6));
        self.add_item(Item::new(9, "A Brief History of Time", "Stephen Hawking", "978-0-553-38016-3", "Science", 5));
        self.add_item(Item::new(10, "Sapiens", "Yuval Noah Harari", "978-0-06-231609-7", "History", 5));
        self.add_item(Item::new(11, "Clean Code", "Robert C. Martin", "978-0-13-235088-4", "Software Engineering", 5));
        self.add_item(Item::new(12, "Computer Systems: A Programmer's Perspective", "Randal E. Bryant", "978-0-13-409266-9", "Computing", 4));
        self.add_item(Item::new(13, "Deep Learning", "Ian Goodfellow", "978-0-262-03561-3", "Artificial Intelligence", 4));
        self.add_item(Item::new(14, "Programming Rust", "Jim Blandy", "978-1-4920-5259-3", "Computing", 3));
        self.add_item(Item::new(15, "Principles of Economics", "N. Gregory Mankiw", "978-0-538-45305-9", "Economics", 4));
        self.add_item(Item::new(16, "The Little Prince", "Antoine de Saint-Exupery", "978-0-15-601219-5", "Literature", 6));
        self.add_item(Item::new(17, "One Hundred Years of Solitude", "Gabriel Garcia Marquez", "978-0-06-088328-7", "Literature", 6));
        self.add_item(Item::new(18, "The Design of Everyday Things", "Don Norman", "978-0-465-05065-9", "Design", 6));
    }
}
