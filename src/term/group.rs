use std::collections::HashSet;
use std::ops::{BitAnd, BitOr};

use crate::GoTermId;

/// A set of [`GoTermId`]s
///
/// Each term can occur only once. The ids are kept sorted, so iteration
/// order is deterministic and intersection/union run as linear merges.
/// An annotation closure, an overlap and the set of selected processes
/// are all `GoGroup`s.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct GoGroup {
    ids: Vec<GoTermId>,
}

impl GoGroup {
    /// Constructs a new, empty `GoGroup`
    pub fn new() -> Self {
        Self::default()
    }

    /// Constructs a new, empty `GoGroup` with the given capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            ids: Vec::with_capacity(capacity),
        }
    }

    /// Returns `true` if the group contains no terms
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Returns the number of terms in the group
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Adds a term to the group
    ///
    /// Returns whether the term was newly inserted.
    pub fn insert(&mut self, id: GoTermId) -> bool {
        match self.ids.binary_search(&id) {
            Ok(_) => false,
            Err(idx) => {
                self.ids.insert(idx, id);
                true
            }
        }
    }

    /// Appends a term without checking the sort order
    ///
    /// Only valid when the caller guarantees `id` is larger than every
    /// term already in the group.
    fn insert_unchecked(&mut self, id: GoTermId) {
        self.ids.push(id);
    }

    /// Returns `true` if the group contains the term
    pub fn contains(&self, id: &GoTermId) -> bool {
        self.ids.binary_search(id).is_ok()
    }

    /// Returns an iterator over the terms in ascending id order
    pub fn iter(&self) -> std::iter::Copied<std::slice::Iter<'_, GoTermId>> {
        self.ids.iter().copied()
    }
}

impl FromIterator<GoTermId> for GoGroup {
    fn from_iter<I: IntoIterator<Item = GoTermId>>(iter: I) -> Self {
        let mut group = GoGroup::new();
        for id in iter {
            group.insert(id);
        }
        group
    }
}

impl From<HashSet<GoTermId>> for GoGroup {
    fn from(s: HashSet<GoTermId>) -> Self {
        s.into_iter().collect()
    }
}

impl<'a> IntoIterator for &'a GoGroup {
    type Item = GoTermId;
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, GoTermId>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl BitOr for &GoGroup {
    type Output = GoGroup;

    /// Set union as a linear merge of the two sorted id lists
    fn bitor(self, rhs: &GoGroup) -> GoGroup {
        let mut group = GoGroup::with_capacity(self.len() + rhs.len());
        let mut lhs_iter = self.ids.iter().peekable();
        let mut rhs_iter = rhs.ids.iter().peekable();

        loop {
            match (lhs_iter.peek(), rhs_iter.peek()) {
                (Some(&&a), Some(&&b)) => {
                    if a <= b {
                        group.insert_unchecked(a);
                        lhs_iter.next();
                        if a == b {
                            rhs_iter.next();
                        }
                    } else {
                        group.insert_unchecked(b);
                        rhs_iter.next();
                    }
                }
                (Some(&&a), None) => {
                    group.insert_unchecked(a);
                    lhs_iter.next();
                }
                (None, Some(&&b)) => {
                    group.insert_unchecked(b);
                    rhs_iter.next();
                }
                (None, None) => break,
            }
        }
        group
    }
}

impl BitAnd for &GoGroup {
    type Output = GoGroup;

    /// Set intersection, probing the larger group for each id of the smaller
    fn bitand(self, rhs: &GoGroup) -> GoGroup {
        let (large, small) = if self.len() > rhs.len() {
            (self, rhs)
        } else {
            (rhs, self)
        };

        let mut group = GoGroup::with_capacity(small.len());
        for id in &small.ids {
            if large.contains(id) {
                group.insert_unchecked(*id);
            }
        }
        group
    }
}
