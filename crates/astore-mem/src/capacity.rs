//! Growth policy shared by every container in this crate.

/// Returns the buffer size to allocate for `n` elements.
///
/// Zero stays zero; anything else rounds up to the next power of two, so
/// repeated growth doubles the buffer and stays amortised O(1).
///
/// # Panics
///
/// Panics if the next power of two does not fit in `usize`.
///
/// # Examples
///
/// ```
/// use astore_mem::proper_capacity;
///
/// assert_eq!(proper_capacity(0), 0);
/// assert_eq!(proper_capacity(3), 4);
/// assert_eq!(proper_capacity(64), 64);
/// assert_eq!(proper_capacity(65), 128);
/// ```
#[inline]
#[must_use]
pub const fn proper_capacity(n: usize) -> usize {
    if n == 0 {
        return 0;
    }
    match n.checked_next_power_of_two() {
        Some(capacity) => capacity,
        None => panic!("capacity overflow"),
    }
}
