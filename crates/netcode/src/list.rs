//! Ordered, observable list.
//!
//! Every mutation is applied first, then reported once to each subscriber as a
//! [`ListEvent`]. Subscribers only ever see the event, never the list, so they
//! cannot mutate it while it is being changed.

use crate::error::{HandleError, Result};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListEventKind {
    /// Value pushed at the end
    Add,
    /// Value inserted at `index`
    Insert,
    /// First occurrence of a value removed
    Remove,
    /// Value removed by position
    RemoveAt,
    /// Value overwritten in place
    Value,
    /// All values dropped
    Clear,
    /// Contents replaced wholesale
    Full,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListEvent<T> {
    pub kind: ListEventKind,
    pub index: Option<usize>,
    pub value: Option<T>,
    pub previous_value: Option<T>,
}

impl<T> ListEvent<T> {
    fn at(kind: ListEventKind, index: usize, value: T) -> Self {
        Self {
            kind,
            index: Some(index),
            value: Some(value),
            previous_value: None,
        }
    }

    fn bare(kind: ListEventKind) -> Self {
        Self {
            kind,
            index: None,
            value: None,
            previous_value: None,
        }
    }
}

type Observer<T> = Box<dyn FnMut(&ListEvent<T>)>;

/// Id returned by [`NetworkList::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u32);

pub struct NetworkList<T> {
    items: Vec<T>,
    observers: Vec<(SubscriptionId, Observer<T>)>,
    next_subscription: u32,
}

impl<T> NetworkList<T> {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            observers: Vec::new(),
            next_subscription: 0,
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
            ..Self::new()
        }
    }

    /// Registers `observer`; it runs synchronously after each mutation.
    pub fn subscribe<F>(&mut self, observer: F) -> SubscriptionId
    where
        F: FnMut(&ListEvent<T>) + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sub, _)| *sub != id);
        self.observers.len() != before
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    fn notify(&mut self, event: ListEvent<T>) {
        for (_, observer) in self.observers.iter_mut() {
            observer(&event);
        }
    }
}

impl<T: Clone + PartialEq> NetworkList<T> {
    pub fn push(&mut self, value: T) {
        self.items.push(value.clone());
        let index = self.items.len() - 1;
        self.notify(ListEvent::at(ListEventKind::Add, index, value));
    }

    /// Inserts at `index`, shifting later values right. `index == len` appends.
    pub fn insert(&mut self, index: usize, value: T) -> Result<()> {
        if index > self.items.len() {
            return Err(HandleError::IndexOutOfRange {
                index,
                len: self.items.len(),
            });
        }
        self.items.insert(index, value.clone());
        self.notify(ListEvent::at(ListEventKind::Insert, index, value));
        Ok(())
    }

    /// Removes the first value equal to `value`.
    pub fn remove(&mut self, value: &T) -> bool {
        match self.index_of(value) {
            Some(index) => {
                let removed = self.items.remove(index);
                self.notify(ListEvent::at(ListEventKind::Remove, index, removed));
                true
            }
            None => false,
        }
    }

    pub fn remove_at(&mut self, index: usize) -> Result<T> {
        if index >= self.items.len() {
            return Err(HandleError::IndexOutOfRange {
                index,
                len: self.items.len(),
            });
        }
        let removed = self.items.remove(index);
        self.notify(ListEvent::at(ListEventKind::RemoveAt, index, removed.clone()));
        Ok(removed)
    }

    /// Overwrites the value at `index`, returning the old one.
    pub fn set(&mut self, index: usize, value: T) -> Result<T> {
        let len = self.items.len();
        let slot = self
            .items
            .get_mut(index)
            .ok_or(HandleError::IndexOutOfRange { index, len })?;
        let previous = std::mem::replace(slot, value.clone());
        self.notify(ListEvent {
            kind: ListEventKind::Value,
            index: Some(index),
            value: Some(value),
            previous_value: Some(previous.clone()),
        });
        Ok(previous)
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.notify(ListEvent::bare(ListEventKind::Clear));
    }

    /// Replaces every value at once, as when a late joiner receives full state.
    pub fn reset<I>(&mut self, values: I)
    where
        I: IntoIterator<Item = T>,
    {
        self.items.clear();
        self.items.extend(values);
        self.notify(ListEvent::bare(ListEventKind::Full));
    }

    pub fn contains(&self, value: &T) -> bool {
        self.items.contains(value)
    }

    pub fn index_of(&self, value: &T) -> Option<usize> {
        self.items.iter().position(|v| v == value)
    }
}

impl<T> Default for NetworkList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for NetworkList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NetworkList")
            .field("items", &self.items)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl<'a, T> IntoIterator for &'a NetworkList<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<T: Clone + PartialEq> FromIterator<T> for NetworkList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
            ..Self::new()
        }
    }
}
