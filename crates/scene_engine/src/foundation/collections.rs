//! Typed handles and append-only arenas
//!
//! Assets are created once at startup and never removed, so a plain index
//! into an ordered list is a stable reference. The list order doubles as
//! the order shown in GUI combo boxes.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// Typed index into a [`HandleList`]
pub struct Handle<T> {
    index: u32,
    _phantom: PhantomData<fn() -> T>,
}

impl<T> Handle<T> {
    fn new(index: u32) -> Self {
        Self {
            index,
            _phantom: PhantomData,
        }
    }

    /// Position of the referenced item in its list
    pub fn index(self) -> usize {
        self.index as usize
    }
}

// Manual impls so `T` needs no bounds
impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl<T> Eq for Handle<T> {}

impl<T> Hash for Handle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state);
    }
}

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle({})", self.index)
    }
}

/// Append-only list addressed by [`Handle`]
#[derive(Debug)]
pub struct HandleList<T> {
    items: Vec<T>,
}

impl<T> Default for HandleList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> HandleList<T> {
    /// Create an empty list
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Append an item and return its handle
    pub fn push(&mut self, item: T) -> Handle<T> {
        let index = u32::try_from(self.items.len()).unwrap_or(u32::MAX);
        self.items.push(item);
        Handle::new(index)
    }

    /// Look up an item
    pub fn get(&self, handle: Handle<T>) -> Option<&T> {
        self.items.get(handle.index())
    }

    /// Look up an item mutably
    pub fn get_mut(&mut self, handle: Handle<T>) -> Option<&mut T> {
        self.items.get_mut(handle.index())
    }

    /// Handle of the item at `index`, if it exists
    pub fn handle_at(&self, index: usize) -> Option<Handle<T>> {
        (index < self.items.len())
            .then(|| u32::try_from(index).ok())
            .flatten()
            .map(Handle::new)
    }

    /// Number of items
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the list is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterate items with their handles, in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (Handle<T>, &T)> {
        self.items
            .iter()
            .enumerate()
            .map(|(index, item)| (Handle::new(index as u32), item))
    }

    /// Find the first item matching a predicate
    pub fn find(&self, mut predicate: impl FnMut(&T) -> bool) -> Option<Handle<T>> {
        self.iter()
            .find(|(_, item)| predicate(item))
            .map(|(handle, _)| handle)
    }
}
