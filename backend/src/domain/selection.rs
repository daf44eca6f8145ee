//! Insertion-ordered set of selected project identifiers.

use std::collections::HashSet;

/// Selected project identifiers.
///
/// Membership is set-like, but iteration yields identifiers in the order they
/// were first added so the shareable query string stays stable.
#[derive(Debug, Clone, Default)]
pub struct SelectionSet {
    order: Vec<String>,
    members: HashSet<String>,
}

impl SelectionSet {
    /// Empty selection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `id`; returns `false` when it was already selected.
    pub fn insert(&mut self, id: impl Into<String>) -> bool {
        let id = id.into();
        if self.members.contains(&id) {
            return false;
        }
        self.members.insert(id.clone());
        self.order.push(id);
        true
    }

    /// Remove `id`; returns `false` when it was not selected.
    pub fn remove(&mut self, id: &str) -> bool {
        if !self.members.remove(id) {
            return false;
        }
        self.order.retain(|existing| existing != id);
        true
    }

    /// Drop every identifier.
    pub fn clear(&mut self) {
        self.order.clear();
        self.members.clear();
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.members.contains(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Identifiers in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }
}

impl PartialEq for SelectionSet {
    fn eq(&self, other: &Self) -> bool {
        self.members == other.members
    }
}

impl Eq for SelectionSet {}

impl<S: Into<String>> FromIterator<S> for SelectionSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut selection = Self::new();
        selection.extend(iter);
        selection
    }
}

impl<S: Into<String>> Extend<S> for SelectionSet {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        for id in iter {
            self.insert(id);
        }
    }
}
