//! # Connection Registry
//!
//! An ordered collection of [`Connection`] records keyed by transport handle.
//! Insertion order is arrival order, and that order is an observable
//! contract: the poll loop services connections oldest-first. The registry
//! exclusively owns each record; removing one drops its buffers and prompt
//! through ordinary ownership, no manual free involved.

use crate::connection::Connection;
use crate::transport::Transport;

pub struct ConnectionRegistry<T: Transport> {
    entries: Vec<Connection<T>>,
}

impl<T: Transport> Default for ConnectionRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Transport> ConnectionRegistry<T> {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Append a record at the end, preserving arrival order
    pub fn insert(&mut self, connection: Connection<T>) {
        self.entries.push(connection);
    }

    /// Look a record up by transport handle without touching the collection
    pub fn find(&self, handle: T::Handle) -> Option<&Connection<T>> {
        self.entries.iter().find(|c| c.handle() == handle)
    }

    pub fn find_mut(&mut self, handle: T::Handle) -> Option<&mut Connection<T>> {
        self.entries.iter_mut().find(|c| c.handle() == handle)
    }

    /// Remove the record for `handle`, keeping the order of the survivors.
    /// Head, interior, and tail removal are all safe while the poll loop is
    /// walking the collection by index: the caller just declines to advance
    /// its cursor after a removal.
    pub fn remove(&mut self, handle: T::Handle) -> Option<Connection<T>> {
        let index = self.entries.iter().position(|c| c.handle() == handle)?;
        Some(self.entries.remove(index))
    }

    /// Handle of the record at `index` in arrival order
    pub fn handle_at(&self, index: usize) -> Option<T::Handle> {
        self.entries.get(index).map(|c| c.handle())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Connection<T>> {
        self.entries.iter()
    }
}
