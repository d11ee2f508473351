//! Sorted-set operations on [`Array`].
//!
//! An array kept sorted under a comparator doubles as an ordered set:
//! [`Array::bsearch_or_insert_by`] adds a value only if no equal element is
//! present, [`Array::sorted_push_by`] always adds it. Both keep the order.
//! This is the ordered counterpart of the hash-based [`StringTable`].
//!
//! [`StringTable`]: crate::StringTable

use crate::array::Array;
use std::cmp::Ordering;

/// Where a value ended up after [`Array::bsearch_or_insert_by`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Placement {
    /// An equal element was already present at this index.
    Found(usize),
    /// The value was inserted at this index.
    Inserted(usize),
}

impl Placement {
    /// Index of the matching or inserted element.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Placement::Found(index) | Placement::Inserted(index) => index,
        }
    }

    #[must_use]
    pub const fn is_inserted(self) -> bool {
        matches!(self, Placement::Inserted(_))
    }
}

impl<T> Array<T> {
    /// Inserts `value` at its sorted position unless an equal element exists.
    ///
    /// `compare(value, element)` orders the candidate against an element of
    /// the array. On a hit the array is left untouched and `value` dropped.
    ///
    /// ```
    /// use astore_mem::{Array, Placement};
    ///
    /// let mut keys: Array<u32> = [10, 20, 30].into_iter().collect();
    /// assert_eq!(keys.bsearch_or_insert_by(25, |a, b| a.cmp(b)), Placement::Inserted(2));
    /// assert_eq!(keys.bsearch_or_insert_by(20, |a, b| a.cmp(b)), Placement::Found(1));
    /// assert_eq!(keys.as_slice(), &[10, 20, 25, 30]);
    /// ```
    pub fn bsearch_or_insert_by<F>(&mut self, value: T, mut compare: F) -> Placement
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        match self.bsearch_by(|element| compare(&value, element)) {
            Ok(index) => Placement::Found(index),
            Err(index) => {
                self.insert_one(index, value);
                Placement::Inserted(index)
            }
        }
    }

    /// [`Array::bsearch_or_insert_by`] under `Ord`.
    pub fn bsearch_or_insert(&mut self, value: T) -> Placement
    where
        T: Ord,
    {
        self.bsearch_or_insert_by(value, T::cmp)
    }

    /// Inserts `value` at its sorted position and returns the index.
    ///
    /// Duplicates are kept: a value equal to an element the search hits goes
    /// right after it.
    pub fn sorted_push_by<F>(&mut self, value: T, mut compare: F) -> usize
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        let index = match self.bsearch_by(|element| compare(&value, element)) {
            Ok(hit) => hit + 1,
            Err(insertion_point) => insertion_point,
        };
        self.insert_one(index, value);
        index
    }

    /// [`Array::sorted_push_by`] under `Ord`.
    pub fn sorted_push(&mut self, value: T) -> usize
    where
        T: Ord,
    {
        self.sorted_push_by(value, T::cmp)
    }
}
