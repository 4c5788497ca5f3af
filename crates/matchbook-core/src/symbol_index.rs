//! Symbol name interning: string name to dense [`SymbolId`] and back.
//!
//! Names are stored as `Arc<str>`, so the character data has a stable
//! address for the life of the index no matter how the containers grow.
//! Books keep a clone of their name handle and trades borrow from it,
//! which is what lets [`crate::trade::Trade`] carry `&str` without any
//! per-trade allocation.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::types::SymbolId;

/// Append-only bidirectional mapping between symbol names and ids.
///
/// Ids are dense and equal the insertion index; they are never reused.
#[derive(Debug, Default)]
pub struct SymbolIndex {
    to_id: HashMap<Arc<str>, SymbolId>,
    names: Vec<Arc<str>>,
}

impl SymbolIndex {
    pub fn new() -> Self {
        SymbolIndex::default()
    }

    /// Return the existing id for `name` or append a new one.
    pub fn get_or_create(&mut self, name: &str) -> SymbolId {
        if let Some(&id) = self.to_id.get(name) {
            return id;
        }
        let id = self.names.len() as SymbolId;
        let stored: Arc<str> = Arc::from(name);
        self.names.push(stored.clone());
        self.to_id.insert(stored, id);
        id
    }

    /// Read-only lookup.
    pub fn find(&self, name: &str) -> Option<SymbolId> {
        self.to_id.get(name).copied()
    }

    /// Canonical name for an id issued by this index.
    ///
    /// Panics if `id` was never issued.
    pub fn name(&self, id: SymbolId) -> &str {
        &self.names[id as usize]
    }

    /// Shared handle to the canonical name, for holders that outlive a
    /// borrow of the index (books keep one of these).
    pub fn handle(&self, id: SymbolId) -> Option<Arc<str>> {
        self.names.get(id as usize).cloned()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Shared, guarded view of a [`SymbolIndex`].
///
/// The async shell resolves symbols on the producer side while the worker
/// reads names when it lazily creates a book, so the index sits behind a
/// read-write lock. Only symbol creation takes the write lock; steady-state
/// traffic on known symbols is read-locked lookups, and matching itself
/// never touches the lock because books hold their own name handle.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    inner: Arc<RwLock<SymbolIndex>>,
}

impl SymbolTable {
    pub fn new() -> Self {
        SymbolTable::default()
    }

    /// Resolve `name`, creating an id on first sight.
    pub fn get_or_create(&self, name: &str) -> SymbolId {
        if let Some(id) = self.inner.read().find(name) {
            return id;
        }
        // Re-checks under the write lock, so a lost race is harmless.
        self.inner.write().get_or_create(name)
    }

    /// Read-only lookup.
    pub fn find(&self, name: &str) -> Option<SymbolId> {
        self.inner.read().find(name)
    }

    /// Shared handle to the canonical name, or `None` for an unknown id.
    pub fn handle(&self, id: SymbolId) -> Option<Arc<str>> {
        self.inner.read().handle(id)
    }

    /// Number of symbols seen so far.
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_dense_and_stable() {
        let mut idx = SymbolIndex::new();
        assert_eq!(idx.get_or_create("FOO"), 0);
        assert_eq!(idx.get_or_create("BAR"), 1);
        assert_eq!(idx.get_or_create("FOO"), 0);
        assert_eq!(idx.len(), 2);
        assert_eq!(idx.name(0), "FOO");
        assert_eq!(idx.name(1), "BAR");
        assert_eq!(idx.find("BAZ"), None);
    }

    #[test]
    fn handles_survive_growth() {
        let mut idx = SymbolIndex::new();
        let first = idx.get_or_create("SYM0");
        let handle = idx.handle(first).unwrap();
        for i in 1..1000 {
            idx.get_or_create(&format!("SYM{i}"));
        }
        // Same allocation before and after the containers reallocated.
        assert!(Arc::ptr_eq(&handle, &idx.handle(first).unwrap()));
        assert_eq!(&*handle, "SYM0");
    }

    #[test]
    fn shared_table_resolves_and_finds() {
        let table = SymbolTable::new();
        let id = table.get_or_create("FOO");
        assert_eq!(table.get_or_create("FOO"), id);
        assert_eq!(table.find("FOO"), Some(id));
        assert_eq!(table.find("MISSING"), None);
        assert_eq!(table.handle(id).as_deref(), Some("FOO"));
        assert_eq!(table.handle(99), None);
    }
}
