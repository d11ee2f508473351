//! Growable contiguous buffer with an explicit growth policy.
//!
//! [`Array`] is the storage every other container in this crate is built on.
//! Unlike `Vec`, its growth is deterministic: writes past the end grow the
//! buffer to [`proper_capacity`] of the required length, writes that skip
//! ahead fill the gap with zero (`T::default()`) values, and the buffer only
//! shrinks through [`Array::clear`]. Consumers rely on this to cache indices
//! across calls and to build arrays sparsely.
//!
//! # Memory Layout
//!
//! - `buffer`: `None` iff `capacity == 0`, otherwise a system allocation
//!   of `capacity` slots
//! - `[0, length)`: live, initialized elements
//! - `[length, capacity)`: uninitialized spare slots
//!
//! # Examples
//!
//! ```
//! use astore_mem::{Array, ClearOption};
//!
//! let mut seq: Array<i32> = Array::new();
//! for i in 0..10 {
//!     seq.set(i as usize, &[i]);
//! }
//! assert_eq!(seq.len(), 10);
//! assert_eq!(seq.capacity(), 16);
//!
//! // Sparse write: slots 10..100 become zero
//! seq.set_slots(100, 1);
//! assert_eq!(seq.len(), 101);
//! assert_eq!(seq.capacity(), 128);
//! assert!(seq.as_slice()[10..100].iter().all(|&v| v == 0));
//!
//! seq.clear(ClearOption::All);
//! assert_eq!(seq.capacity(), 0);
//! ```

use crate::capacity::proper_capacity;
use std::alloc::{self, Layout};
use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;
use std::marker::PhantomData;
use std::ops::{Index, IndexMut};
use std::ptr::{self, NonNull};
use std::slice;

/// How much of an array [`Array::clear`] tears down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClearOption {
    /// Drop every live element, keep the buffer for reuse.
    ElementsOnly,
    /// Drop every live element and free the buffer.
    All,
    /// Free the buffer without dropping elements. Used once ownership of the
    /// elements has been moved somewhere else.
    ContainerOnly,
}

/// A growable, contiguous buffer with explicit length and capacity.
pub struct Array<T> {
    /// Number of allocated slots.
    capacity: usize,
    /// Number of live elements at the front of the buffer.
    length: usize,
    /// Allocation, present iff `capacity > 0`.
    buffer: Option<NonNull<T>>,
    _marker: PhantomData<T>,
}

// SAFETY: Array<T> uniquely owns its buffer and the elements in it, exactly
// like Vec<T>, so it is Send/Sync whenever T is.
unsafe impl<T: Send> Send for Array<T> {}
unsafe impl<T: Sync> Sync for Array<T> {}

#[cold]
#[track_caller]
fn capacity_overflow() -> ! {
    panic!("capacity overflow");
}

impl<T> Array<T> {
    const IS_ZST: bool = std::mem::size_of::<T>() == 0;

    /// Creates an empty array without allocating.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            capacity: 0,
            length: 0,
            buffer: None,
            _marker: PhantomData,
        }
    }

    /// Number of live elements.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.length
    }

    /// Returns true if there are no live elements.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Number of allocated slots.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns true if a buffer is allocated.
    #[inline]
    #[must_use]
    pub const fn has_buffer(&self) -> bool {
        self.buffer.is_some()
    }

    /// Raw pointer to the buffer, or null when nothing is allocated.
    #[inline]
    #[must_use]
    pub fn as_ptr(&self) -> *const T {
        self.buffer.map_or(ptr::null(), |buf| buf.as_ptr().cast_const())
    }

    #[inline]
    fn data(&self) -> *mut T {
        self.buffer.unwrap_or(NonNull::dangling()).as_ptr()
    }

    fn layout(count: usize) -> Layout {
        Layout::array::<T>(count).unwrap_or_else(|_| capacity_overflow())
    }

    /// Ensures room for at least `min_count` elements.
    ///
    /// When the current buffer is too small it is reallocated to hold
    /// exactly `min_count` elements; rounding for amortised growth is the
    /// caller's business (see [`proper_capacity`]). Existing elements keep
    /// their indices.
    ///
    /// Allocation failure aborts through [`alloc::handle_alloc_error`].
    pub fn reserve(&mut self, min_count: usize) {
        if self.capacity >= min_count {
            return;
        }

        let new_layout = Self::layout(min_count);
        let buffer = if Self::IS_ZST {
            NonNull::dangling()
        } else {
            // SAFETY: new_layout has non-zero size (T is not a ZST and
            // min_count > capacity >= 0). When a buffer exists it was
            // allocated with Self::layout(self.capacity), which is the layout
            // passed to realloc.
            let raw = unsafe {
                match self.buffer {
                    Some(old) => alloc::realloc(
                        old.as_ptr().cast::<u8>(),
                        Self::layout(self.capacity),
                        new_layout.size(),
                    ),
                    None => alloc::alloc(new_layout),
                }
            };
            NonNull::new(raw.cast::<T>()).unwrap_or_else(|| alloc::handle_alloc_error(new_layout))
        };

        self.buffer = Some(buffer);
        self.capacity = min_count;
    }

    /// Grows through the capacity policy so that `end` slots fit.
    fn grow_for(&mut self, end: usize) {
        if self.capacity < end {
            self.reserve(proper_capacity(end));
        }
    }

    /// Appends `value`, growing through the capacity policy.
    ///
    /// ```
    /// use astore_mem::Array;
    ///
    /// let mut names = Array::new();
    /// names.push(String::from("sched.h"));
    /// names.push(String::from("stat.h"));
    /// assert_eq!(names.len(), 2);
    /// assert_eq!(names.capacity(), 2);
    /// ```
    pub fn push(&mut self, value: T) {
        let end = self.length.checked_add(1).unwrap_or_else(|| capacity_overflow());
        self.grow_for(end);
        // SAFETY: grow_for guarantees capacity >= length + 1, so the slot at
        // `length` is allocated and currently uninitialized.
        unsafe { self.data().add(self.length).write(value) };
        self.length = end;
    }

    /// Inserts `count` elements at `at <= len()`, shifting the tail right.
    ///
    /// The tail is moved bitwise. While `init` runs the tail is detached
    /// from `length`, so a panicking `init` leaks the tail instead of
    /// exposing moved-from slots.
    pub(crate) fn insert_within(
        &mut self,
        at: usize,
        count: usize,
        mut init: impl FnMut(usize) -> T,
    ) {
        assert!(at <= self.length, "insert index {at} out of bounds (len {})", self.length);
        let old_len = self.length;
        let end = old_len.checked_add(count).unwrap_or_else(|| capacity_overflow());
        self.grow_for(end);

        // SAFETY: capacity >= old_len + count, so both the source range
        // [at, old_len) and the destination range [at + count, end) are
        // inside the allocation. ptr::copy handles the overlap.
        unsafe {
            let base = self.data().add(at);
            ptr::copy(base, base.add(count), old_len - at);
        }

        self.length = at;
        for offset in 0..count {
            let value = init(at + offset);
            // SAFETY: slot at + offset < end is allocated and its previous
            // content was moved to the tail above.
            unsafe { self.data().add(at + offset).write(value) };
        }
        self.length = end;
    }

    /// Inserts a single owned `value` before `at <= len()`.
    pub(crate) fn insert_one(&mut self, at: usize, value: T) {
        assert!(at <= self.length, "insert index {at} out of bounds (len {})", self.length);
        let end = self.length.checked_add(1).unwrap_or_else(|| capacity_overflow());
        self.grow_for(end);

        // SAFETY: capacity >= length + 1. The tail [at, length) moves one
        // slot right inside the allocation, then the vacated slot is written
        // without dropping its stale bits.
        unsafe {
            let base = self.data().add(at);
            ptr::copy(base, base.add(1), self.length - at);
            base.write(value);
        }
        self.length = end;
    }

    /// Tears the array down according to `option`.
    ///
    /// ```
    /// use astore_mem::{Array, ClearOption};
    ///
    /// let mut seq: Array<u32> = (0..10).collect();
    /// seq.clear(ClearOption::ElementsOnly);
    /// assert!(seq.is_empty());
    /// assert!(seq.has_buffer());
    ///
    /// seq.clear(ClearOption::All);
    /// assert_eq!(seq.capacity(), 0);
    /// assert!(!seq.has_buffer());
    /// ```
    pub fn clear(&mut self, option: ClearOption) {
        let live = self.length;
        // Zero the length first: a panicking destructor then leaks the rest
        // instead of leaving dropped elements reachable.
        self.length = 0;

        if option != ClearOption::ContainerOnly {
            // SAFETY: [0, live) were the initialized elements; length is
            // already 0 so none of them is reachable after this.
            unsafe { ptr::drop_in_place(ptr::slice_from_raw_parts_mut(self.data(), live)) };
        }

        if option != ClearOption::ElementsOnly {
            self.release();
        }
    }

    fn release(&mut self) {
        if let Some(buffer) = self.buffer.take()
            && !Self::IS_ZST
        {
            // SAFETY: buffer was allocated by reserve() with
            // Self::layout(self.capacity) and has not been freed.
            unsafe { alloc::dealloc(buffer.as_ptr().cast::<u8>(), Self::layout(self.capacity)) };
        }
        self.capacity = 0;
    }

    /// Moves every element out into a `Vec` and frees the buffer.
    ///
    /// This is the ownership transfer [`ClearOption::ContainerOnly`] exists
    /// for: elements end up owned by the returned vector and the container
    /// is released without dropping them a second time.
    pub fn take_elements(&mut self) -> Vec<T> {
        let mut out = Vec::with_capacity(self.length);
        for i in 0..self.length {
            // SAFETY: i < length, so the slot is initialized. Each slot is
            // read exactly once and the container-only clear below does not
            // drop them again.
            out.push(unsafe { self.data().add(i).read() });
        }
        self.clear(ClearOption::ContainerOnly);
        out
    }

    /// Binary search over the live elements.
    ///
    /// `compare(element)` must return the ordering of the sought value
    /// relative to `element` (note: the reverse of `slice::binary_search_by`).
    /// Returns `Ok(index)` of the first match the halving search hits, or
    /// `Err(insertion_point)` where the value would keep the array sorted.
    pub fn bsearch_by<F>(&self, mut compare: F) -> Result<usize, usize>
    where
        F: FnMut(&T) -> Ordering,
    {
        let elements = self.as_slice();
        let mut begin = 0;
        let mut end = elements.len();

        while begin < end {
            let mid = begin + (end - begin) / 2;
            match compare(&elements[mid]) {
                Ordering::Equal => return Ok(mid),
                Ordering::Less => end = mid,
                Ordering::Greater => begin = mid + 1,
            }
        }

        Err(begin)
    }

    /// Binary search for `value` in an array sorted by `Ord`.
    ///
    /// ```
    /// use astore_mem::Array;
    ///
    /// let seq: Array<i32> = (0..100).collect();
    /// assert_eq!(seq.bsearch(&42), Ok(42));
    /// assert_eq!(seq.bsearch(&-1000), Err(0));
    /// assert_eq!(seq.bsearch(&1000), Err(100));
    /// ```
    pub fn bsearch<Q>(&self, value: &Q) -> Result<usize, usize>
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.bsearch_by(|element| value.cmp(<T as Borrow<Q>>::borrow(element)))
    }

    /// The live elements as a slice.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: data() is non-null and aligned (dangling when nothing is
        // allocated, which is fine for length 0) and [0, length) is
        // initialized.
        unsafe { slice::from_raw_parts(self.data(), self.length) }
    }

    /// The live elements as a mutable slice.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: as in as_slice; &mut self guarantees exclusivity.
        unsafe { slice::from_raw_parts_mut(self.data(), self.length) }
    }

    /// Returns the element at `index` if it is live.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.as_slice().get(index)
    }

    /// Returns the element at `index` mutably if it is live.
    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.as_mut_slice().get_mut(index)
    }

    /// Iterates over the live elements in index order.
    pub fn iter(&self) -> slice::Iter<'_, T> {
        self.as_slice().iter()
    }

    /// Iterates mutably over the live elements in index order.
    pub fn iter_mut(&mut self) -> slice::IterMut<'_, T> {
        self.as_mut_slice().iter_mut()
    }
}

impl<T: Default> Array<T> {
    /// Writes `count` elements starting at `at`, produced by `init`.
    ///
    /// `init` receives the absolute index of the slot it initializes. The
    /// array grows to [`proper_capacity`]`(at + count)` when needed, slots
    /// between the old length and `at` are filled with `T::default()`, and
    /// live slots inside the written range are overwritten.
    pub fn set_with(&mut self, at: usize, count: usize, mut init: impl FnMut(usize) -> T) {
        let end = at.checked_add(count).unwrap_or_else(|| capacity_overflow());
        self.grow_for(end);
        self.fill_default(at);

        for index in at..end {
            let value = init(index);
            if index < self.length {
                self[index] = value;
            } else {
                // SAFETY: index == length here (the range is contiguous and
                // starts at or below length), which is < end <= capacity.
                unsafe { self.data().add(index).write(value) };
                self.length = index + 1;
            }
        }
    }

    /// Reserves slots `[at, at + count)` without copying anything.
    ///
    /// Newly exposed slots (including any gap before `at`) hold
    /// `T::default()`; slots that were already live are left untouched.
    /// Used to pre-allocate room for a later in-place write.
    pub fn set_slots(&mut self, at: usize, count: usize) {
        let end = at.checked_add(count).unwrap_or_else(|| capacity_overflow());
        self.grow_for(end);
        self.fill_default(end);
    }

    /// Extends the live range to `end` with default values.
    fn fill_default(&mut self, end: usize) {
        debug_assert!(end <= self.capacity);
        while self.length < end {
            // SAFETY: length < end <= capacity, the slot is uninitialized.
            unsafe { self.data().add(self.length).write(T::default()) };
            self.length += 1;
        }
    }

    /// Inserts `count` elements produced by `init` before index `at`.
    ///
    /// When `at` is at or past the end this is exactly [`Array::set_with`].
    /// Otherwise the tail `[at, len)` shifts right by `count`.
    pub fn insert_with(&mut self, at: usize, count: usize, init: impl FnMut(usize) -> T) {
        if at >= self.length {
            self.set_with(at, count, init);
        } else {
            self.insert_within(at, count, init);
        }
    }
}

impl<T: Clone + Default> Array<T> {
    /// Copies `src` into the array starting at index `at`.
    ///
    /// See [`Array::set_with`] for growth and gap semantics.
    pub fn set(&mut self, at: usize, src: &[T]) {
        self.set_with(at, src.len(), |index| src[index - at].clone());
    }

    /// Inserts a copy of `src` before index `at`.
    ///
    /// ```
    /// use astore_mem::Array;
    ///
    /// let mut seq: Array<i32> = (0..10).collect();
    /// seq.insert(4, &[-1, -2, -3, -4]);
    /// assert_eq!(seq.as_slice(), &[0, 1, 2, 3, -1, -2, -3, -4, 4, 5, 6, 7, 8, 9]);
    /// ```
    pub fn insert(&mut self, at: usize, src: &[T]) {
        self.insert_with(at, src.len(), |index| src[index - at].clone());
    }
}

impl<T> Drop for Array<T> {
    fn drop(&mut self) {
        self.clear(ClearOption::All);
    }
}

impl<T> Default for Array<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Clone for Array<T> {
    /// Deep copy with the same capacity as `self`.
    fn clone(&self) -> Self {
        let mut copy = Self::new();
        copy.reserve(self.capacity);
        for element in self.iter() {
            copy.push(element.clone());
        }
        copy
    }
}

impl<T: fmt::Debug> fmt::Debug for Array<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: PartialEq> PartialEq for Array<T> {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: Eq> Eq for Array<T> {}

impl<T> Index<usize> for Array<T> {
    type Output = T;

    #[track_caller]
    fn index(&self, index: usize) -> &T {
        &self.as_slice()[index]
    }
}

impl<T> IndexMut<usize> for Array<T> {
    #[track_caller]
    fn index_mut(&mut self, index: usize) -> &mut T {
        &mut self.as_mut_slice()[index]
    }
}

impl<'a, T> IntoIterator for &'a Array<T> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T> FromIterator<T> for Array<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut array = Self::new();
        for value in iter {
            array.push(value);
        }
        array
    }
}
