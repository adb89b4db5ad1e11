// Registry - Handle-indexed collections for clock registrations
// Queues, accumulators and tempo listeners are removed by handle, not by identity

use std::marker::PhantomData;

/// Stable handle returned on registration
#[derive(Debug)]
pub struct Handle<T> {
    id: u64,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Handle<T> {
    fn new(id: u64) -> Self {
        Self {
            id,
            _marker: PhantomData,
        }
    }

    /// Raw numeric id (for logging)
    pub fn id(&self) -> u64 {
        self.id
    }
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Eq for Handle<T> {}

impl<T> std::hash::Hash for Handle<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Registration-ordered collection addressed by `Handle<T>`
#[derive(Debug)]
pub struct Registry<T> {
    entries: Vec<(u64, T)>,
    next_id: u64,
}

impl<T> Registry<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 1,
        }
    }

    pub fn insert(&mut self, item: T) -> Handle<T> {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push((id, item));
        Handle::new(id)
    }

    /// Remove an entry; stale handles return None
    pub fn remove(&mut self, handle: Handle<T>) -> Option<T> {
        let index = self.entries.iter().position(|(id, _)| *id == handle.id)?;
        Some(self.entries.remove(index).1)
    }

    pub fn get(&self, handle: Handle<T>) -> Option<&T> {
        self.entries
            .iter()
            .find(|(id, _)| *id == handle.id)
            .map(|(_, item)| item)
    }

    pub fn get_mut(&mut self, handle: Handle<T>) -> Option<&mut T> {
        self.entries
            .iter_mut()
            .find(|(id, _)| *id == handle.id)
            .map(|(_, item)| item)
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter().map(|(_, item)| item)
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.entries.iter_mut().map(|(_, item)| item)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self::new()
    }
}
