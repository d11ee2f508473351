//! Small-buffer-optimized byte strings.
//!
//! A [`HybridString`] holds token text in one of four representations:
//!
//! - **Inline**: up to [`INLINE_CAPACITY`] bytes plus a terminator stored in
//!   the value itself
//! - **Heap**: an owned, null-terminated [`Array<u8>`]
//! - **Static**: a borrow of caller-owned bytes that outlive the value
//! - **Literal**: a borrow of process-constant bytes
//!
//! Owned strings pick inline or heap by length. Borrowed strings never copy
//! and are never written through: the first mutation promotes them to the
//! heap representation.
//!
//! # Examples
//!
//! ```
//! use astore_mem::{HybridString, Repr};
//!
//! let mut name = HybridString::owned(b"hello");
//! assert_eq!(name.repr(), Repr::Inline);
//!
//! name.append(b", and a tail that no longer fits inline");
//! assert_eq!(name.repr(), Repr::Heap);
//! assert_eq!(name, "hello, and a tail that no longer fits inline");
//!
//! let constant = HybridString::literal(b"ABCDEFGHIJKLMNOPQRSTUVWXYZ");
//! assert_eq!(constant.dup().repr(), Repr::Literal);
//! ```

use crate::array::{Array, ClearOption};
use crate::capacity::proper_capacity;
use crate::config::{HASH_SEED, INLINE_CAPACITY};
use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Width of content hashes.
#[cfg(not(feature = "hash-128"))]
pub type HashValue = u32;

/// Width of content hashes.
#[cfg(feature = "hash-128")]
pub type HashValue = u128;

/// Seeded content hash of `bytes`.
///
/// Never returns zero, which the interning table reserves for empty slots.
///
/// ```
/// use astore_mem::string::hash_bytes;
///
/// assert_eq!(hash_bytes(b"data"), hash_bytes(b"data"));
/// assert_ne!(hash_bytes(b""), 0);
/// ```
#[must_use]
pub fn hash_bytes(bytes: &[u8]) -> HashValue {
    #[cfg(not(feature = "hash-128"))]
    let raw = xxhash_rust::xxh32::xxh32(bytes, HASH_SEED);

    #[cfg(feature = "hash-128")]
    let raw = xxhash_rust::xxh3::xxh3_128_with_seed(bytes, u64::from(HASH_SEED));

    if raw == 0 { 1 } else { raw }
}

/// Active representation of a [`HybridString`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Repr {
    /// Content stored inside the value.
    Inline,
    /// Content owned in a heap buffer.
    Heap,
    /// Borrowed from caller-owned memory.
    Static,
    /// Borrowed from process-constant memory.
    Literal,
}

#[derive(Clone, Copy)]
struct InlineBuf {
    len: u8,
    bytes: [u8; INLINE_CAPACITY + 1],
}

const _: () = assert!(INLINE_CAPACITY < u8::MAX as usize);

impl InlineBuf {
    const EMPTY: Self = Self {
        len: 0,
        bytes: [0; INLINE_CAPACITY + 1],
    };
}

enum Inner<'a> {
    Inline(InlineBuf),
    /// Live elements are the content followed by one terminating zero, or
    /// nothing at all once the buffer has been released.
    Heap(Array<u8>),
    Static(&'a [u8]),
    Literal(&'static [u8]),
}

/// A byte string with inline, heap, and borrowed representations.
pub struct HybridString<'a> {
    inner: Inner<'a>,
}

impl<'a> HybridString<'a> {
    /// Creates an empty inline string.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            inner: Inner::Inline(InlineBuf::EMPTY),
        }
    }

    /// Creates an owned copy of `bytes`: inline when it fits, heap otherwise.
    #[must_use]
    pub fn owned(bytes: &[u8]) -> Self {
        let mut string = Self::new();
        string.set(0, bytes);
        string
    }

    /// Borrows `bytes` without copying.
    #[must_use]
    pub const fn borrowed(bytes: &'a [u8]) -> Self {
        Self {
            inner: Inner::Static(bytes),
        }
    }

    /// Borrows process-constant `bytes`. Duplicates stay borrowed.
    #[must_use]
    pub const fn literal(bytes: &'static [u8]) -> Self {
        Self {
            inner: Inner::Literal(bytes),
        }
    }

    /// The active representation.
    #[must_use]
    pub const fn repr(&self) -> Repr {
        match self.inner {
            Inner::Inline(_) => Repr::Inline,
            Inner::Heap(_) => Repr::Heap,
            Inner::Static(_) => Repr::Static,
            Inner::Literal(_) => Repr::Literal,
        }
    }

    /// Returns true for the inline and heap representations.
    #[must_use]
    pub const fn is_owned(&self) -> bool {
        matches!(self.inner, Inner::Inline(_) | Inner::Heap(_))
    }

    /// Content length in bytes, without the terminator.
    #[must_use]
    pub fn len(&self) -> usize {
        match &self.inner {
            Inner::Inline(buf) => buf.len as usize,
            Inner::Heap(buf) => buf.len().saturating_sub(1),
            Inner::Static(bytes) => bytes.len(),
            Inner::Literal(bytes) => bytes.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bytes available without reallocating.
    ///
    /// For the heap representation this counts the terminator slot, matching
    /// the size of the underlying buffer. Borrowed strings report their
    /// length.
    #[must_use]
    pub fn capacity(&self) -> usize {
        match &self.inner {
            Inner::Inline(_) => INLINE_CAPACITY,
            Inner::Heap(buf) => buf.capacity(),
            Inner::Static(bytes) => bytes.len(),
            Inner::Literal(bytes) => bytes.len(),
        }
    }

    /// The content bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        match &self.inner {
            Inner::Inline(buf) => &buf.bytes[..buf.len as usize],
            Inner::Heap(buf) => {
                let bytes = buf.as_slice();
                &bytes[..bytes.len().saturating_sub(1)]
            }
            Inner::Static(bytes) => bytes,
            Inner::Literal(bytes) => bytes,
        }
    }

    /// The content followed by its terminating zero.
    ///
    /// Only owned strings keep a terminator; borrowed strings and released
    /// heap strings return `None`.
    #[must_use]
    pub fn as_bytes_with_nul(&self) -> Option<&[u8]> {
        match &self.inner {
            Inner::Inline(buf) => Some(&buf.bytes[..=buf.len as usize]),
            Inner::Heap(buf) if !buf.is_empty() => Some(buf.as_slice()),
            _ => None,
        }
    }

    /// The content as UTF-8, replacing invalid sequences.
    #[must_use]
    pub fn to_str_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(self.as_bytes())
    }

    /// Seeded hash of the content, see [`hash_bytes`].
    #[must_use]
    pub fn content_hash(&self) -> HashValue {
        hash_bytes(self.as_bytes())
    }

    /// Ensures room for `n` content bytes in an owned representation.
    ///
    /// Heap strings grow to [`proper_capacity`]`(n + 1)`. Borrowed strings
    /// are always promoted to the heap, inline strings only when `n` exceeds
    /// [`INLINE_CAPACITY`].
    pub fn reserve(&mut self, n: usize) {
        match self.inner {
            Inner::Heap(ref mut buf) => buf.reserve(proper_capacity(n + 1)),
            Inner::Inline(_) if n <= INLINE_CAPACITY => {}
            _ => self.promote(n),
        }
    }

    fn promote(&mut self, n: usize) {
        let content = self.as_bytes();
        let mut heap = Array::new();
        heap.reserve(proper_capacity(n.max(content.len()) + 1));
        heap.set(0, content);
        heap.push(0);
        self.inner = Inner::Heap(heap);
    }

    /// Grows the content so that `[at, at + count)` is writable, zero-filling
    /// any gap and moving the terminator past the new end.
    fn open(&mut self, at: usize, count: usize) -> &mut [u8] {
        let old_len = self.len();
        let end = at
            .checked_add(count)
            .unwrap_or_else(|| panic!("capacity overflow"));
        self.reserve(end);

        if old_len < end {
            match &mut self.inner {
                Inner::Inline(buf) => {
                    buf.bytes[old_len..=end].fill(0);
                    buf.len = end as u8;
                }
                Inner::Heap(buf) => {
                    if buf.is_empty() {
                        buf.push(0);
                    }
                    // Slot `old_len` holds the old terminator (zero), the
                    // newly exposed slots are zero as well.
                    buf.set_slots(old_len, end + 1 - old_len);
                }
                Inner::Static(_) | Inner::Literal(_) => {
                    unreachable!("borrowed strings are promoted before mutation")
                }
            }
        }

        self.content_mut()
    }

    fn content_mut(&mut self) -> &mut [u8] {
        match &mut self.inner {
            Inner::Inline(buf) => &mut buf.bytes[..buf.len as usize],
            Inner::Heap(buf) => {
                let len = buf.len().saturating_sub(1);
                &mut buf.as_mut_slice()[..len]
            }
            Inner::Static(_) | Inner::Literal(_) => {
                unreachable!("borrowed strings are never written through")
            }
        }
    }

    /// Writes `src` at byte offset `at`, extending the string if needed.
    ///
    /// Bytes between the old end and `at` become zero.
    ///
    /// ```
    /// use astore_mem::HybridString;
    ///
    /// let mut s = HybridString::owned(b"ab");
    /// s.set(4, b"cd");
    /// assert_eq!(s.as_bytes(), b"ab\0\0cd");
    /// ```
    pub fn set(&mut self, at: usize, src: &[u8]) {
        let content = self.open(at, src.len());
        content[at..at + src.len()].copy_from_slice(src);
    }

    /// Extends the string to cover `[at, at + count)` without copying.
    pub fn set_slots(&mut self, at: usize, count: usize) {
        self.open(at, count);
    }

    /// Inserts `src` before byte offset `at`.
    ///
    /// Offsets at or past the end behave like [`HybridString::set`].
    pub fn insert(&mut self, at: usize, src: &[u8]) {
        let old_len = self.len();
        if at >= old_len {
            self.set(at, src);
            return;
        }

        let n = src.len();
        let content = self.open(old_len, n);
        content.copy_within(at..old_len, at + n);
        content[at..at + n].copy_from_slice(src);
    }

    /// Appends `src` at the end.
    pub fn append(&mut self, src: &[u8]) {
        self.set(self.len(), src);
    }

    /// Empties the string.
    ///
    /// Inline strings reset in place, heap strings clear their buffer per
    /// `option`, borrowed strings drop their reference.
    pub fn clear(&mut self, option: ClearOption) {
        match &mut self.inner {
            Inner::Inline(buf) => {
                buf.len = 0;
                buf.bytes[0] = 0;
            }
            Inner::Heap(buf) => {
                buf.clear(option);
                if buf.has_buffer() {
                    buf.push(0);
                }
            }
            Inner::Static(bytes) => *bytes = &[],
            Inner::Literal(bytes) => *bytes = &[],
        }
    }

    /// Duplicates the string into a value with no borrowed lifetime.
    ///
    /// Literals stay literal and share their bytes; everything else is
    /// copied into an owned representation chosen by length.
    #[must_use]
    pub fn dup(&self) -> HybridString<'static> {
        match &self.inner {
            Inner::Literal(bytes) => HybridString::literal(*bytes),
            Inner::Inline(buf) => HybridString {
                inner: Inner::Inline(*buf),
            },
            _ => HybridString::owned(self.as_bytes()),
        }
    }
}

impl Default for HybridString<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for HybridString<'_> {
    fn clone(&self) -> Self {
        self.dup()
    }
}

impl From<&str> for HybridString<'_> {
    fn from(s: &str) -> Self {
        Self::owned(s.as_bytes())
    }
}

impl From<&[u8]> for HybridString<'_> {
    fn from(bytes: &[u8]) -> Self {
        Self::owned(bytes)
    }
}

impl PartialEq for HybridString<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl Eq for HybridString<'_> {}

impl PartialEq<[u8]> for HybridString<'_> {
    fn eq(&self, other: &[u8]) -> bool {
        self.as_bytes() == other
    }
}

impl PartialEq<str> for HybridString<'_> {
    fn eq(&self, other: &str) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl PartialEq<&str> for HybridString<'_> {
    fn eq(&self, other: &&str) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl PartialOrd for HybridString<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HybridString<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_bytes().cmp(other.as_bytes())
    }
}

impl Hash for HybridString<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_bytes().hash(state);
    }
}

impl fmt::Display for HybridString<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_str_lossy())
    }
}

impl fmt::Debug for HybridString<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({:?})", self.repr(), self.to_str_lossy())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
    const LONG: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

    #[test]
    fn test_value_stays_small() {
        assert!(std::mem::size_of::<HybridString<'_>>() <= 32);
    }

    #[test]
    fn test_representation_selection() {
        let s = HybridString::owned(b"hello");
        assert_eq!(s.as_bytes(), b"hello");
        assert_eq!(s.len(), 5);
        assert_eq!(s.repr(), Repr::Inline);
        assert_eq!(s.as_bytes_with_nul(), Some(&b"hello\0"[..]));

        let l = HybridString::literal(ALPHABET);
        assert_eq!(l.len(), 26);
        assert_eq!(l.repr(), Repr::Literal);
        assert_eq!(l.as_bytes_with_nul(), None);

        let h = HybridString::owned(LONG);
        assert_eq!(h.as_bytes(), LONG);
        assert_eq!(h.len(), 36);
        assert_eq!(h.repr(), Repr::Heap);
        assert_eq!(h.capacity(), 64);
    }

    #[test]
    fn test_inline_boundary() {
        let fits = HybridString::owned(&[b'x'; INLINE_CAPACITY]);
        assert_eq!(fits.repr(), Repr::Inline);

        let spills = HybridString::owned(&[b'x'; INLINE_CAPACITY + 1]);
        assert_eq!(spills.repr(), Repr::Heap);
        assert_eq!(spills.capacity(), 32);
    }

    #[test]
    fn test_set_promotes_and_clear() {
        let mut s = HybridString::owned(b"hello");
        let mut h = HybridString::owned(LONG);

        s.set(0, h.as_bytes());
        assert_eq!(s, h);
        assert_eq!(s.len(), h.len());
        assert_eq!(s.repr(), Repr::Heap);

        s.clear(ClearOption::All);
        assert_eq!(s.len(), 0);
        assert_eq!(s.as_bytes_with_nul(), None);

        h.clear(ClearOption::ElementsOnly);
        assert_eq!(h.as_bytes_with_nul(), Some(&b"\0"[..]));
        assert_eq!(h.len(), 0);
        assert_eq!(h.repr(), Repr::Heap);
        assert_eq!(h.capacity(), 64);

        h.clear(ClearOption::All);
        assert_eq!(h.as_bytes_with_nul(), None);
        assert_eq!(h.capacity(), 0);
    }

    #[test]
    fn test_set_zero_fills_gap() {
        let mut inline = HybridString::owned(b"ab");
        inline.set(5, b"z");
        assert_eq!(inline.as_bytes(), b"ab\0\0\0z");
        assert_eq!(inline.as_bytes_with_nul(), Some(&b"ab\0\0\0z\0"[..]));

        let mut heap = HybridString::owned(LONG);
        heap.set(40, b"!");
        assert_eq!(heap.len(), 41);
        assert_eq!(&heap.as_bytes()[36..], b"\0\0\0\0!");
    }

    #[test]
    fn test_set_inside_keeps_length() {
        let mut s = HybridString::owned(b"abcdef");
        s.set(1, b"XY");
        assert_eq!(s, "aXYdef");
    }

    #[test]
    fn test_reuse_after_release() {
        let mut h = HybridString::owned(LONG);
        h.clear(ClearOption::All);
        h.append(b"again");
        assert_eq!(h, "again");
        assert_eq!(h.repr(), Repr::Heap);
        assert_eq!(h.as_bytes_with_nul(), Some(&b"again\0"[..]));
    }

    #[test]
    fn test_insert() {
        let mut s = HybridString::owned(b"struct stat");
        s.insert(0, b"const ");
        assert_eq!(s, "const struct stat");
        assert_eq!(s.repr(), Repr::Inline);

        s.insert(17, b" *restrict");
        assert_eq!(s, "const struct stat *restrict");
        assert_eq!(s.repr(), Repr::Heap);

        s.insert(17, b"64");
        assert_eq!(s, "const struct stat64 *restrict");
        assert_eq!(s.as_bytes_with_nul().map(<[u8]>::len), Some(30));
    }

    #[test]
    fn test_borrowed_promotes_on_mutation() {
        let source = b"int (*)(void)".to_vec();
        let mut s = HybridString::borrowed(&source);
        assert_eq!(s.repr(), Repr::Static);

        s.append(b" const");
        assert_eq!(s.repr(), Repr::Heap);
        assert_eq!(s, "int (*)(void) const");
        assert_eq!(source, b"int (*)(void)");
    }

    #[test]
    fn test_literal_promotes_on_reserve() {
        let mut l = HybridString::literal(ALPHABET);
        l.reserve(0);
        assert_eq!(l.repr(), Repr::Heap);
        assert_eq!(l.as_bytes(), ALPHABET);
        assert_eq!(l.capacity(), 32);
    }

    #[test]
    fn test_inline_reserve_is_noop_when_it_fits() {
        let mut s = HybridString::owned(b"abc");
        s.reserve(INLINE_CAPACITY);
        assert_eq!(s.repr(), Repr::Inline);
        s.reserve(INLINE_CAPACITY + 1);
        assert_eq!(s.repr(), Repr::Heap);
        assert_eq!(s, "abc");
    }

    #[test]
    fn test_borrowed_clear_drops_reference() {
        let source = b"sigsuspend".to_vec();
        let mut s = HybridString::borrowed(&source);
        s.clear(ClearOption::All);
        assert!(s.is_empty());
        assert_eq!(s.repr(), Repr::Static);
        assert_eq!(source, b"sigsuspend");
    }

    #[test]
    fn test_dup_rules() {
        let literal = HybridString::literal(ALPHABET);
        let copy = literal.dup();
        assert_eq!(copy.repr(), Repr::Literal);
        assert_eq!(copy.as_bytes().as_ptr(), ALPHABET.as_ptr());

        let source = LONG.to_vec();
        let borrowed = HybridString::borrowed(&source);
        let mut owned = borrowed.dup();
        assert_eq!(owned.repr(), Repr::Heap);
        owned.set(0, b"!");
        assert_eq!(borrowed.as_bytes(), LONG);

        let short = HybridString::borrowed(b"cmsghdr");
        assert_eq!(short.dup().repr(), Repr::Inline);
    }

    #[test]
    fn test_hash_follows_content() {
        let owned = HybridString::owned(b"epoll_data_t");
        let borrowed = HybridString::borrowed(b"epoll_data_t");
        let literal = HybridString::literal(b"epoll_data_t");
        assert_eq!(owned.content_hash(), borrowed.content_hash());
        assert_eq!(owned.content_hash(), literal.content_hash());
        assert_ne!(owned.content_hash(), HybridString::owned(b"epoll_data").content_hash());
        assert_ne!(HybridString::new().content_hash(), 0);
    }

    #[test]
    fn test_equality_and_order_across_representations() {
        let a = HybridString::owned(LONG);
        let b = HybridString::borrowed(LONG);
        assert_eq!(a, b);
        assert!(HybridString::literal(b"abc") < HybridString::owned(b"abd"));
        assert!(HybridString::literal(b"ab") < HybridString::owned(b"abc"));
    }

    #[test]
    fn test_display_and_debug() {
        let s = HybridString::from("__timeout");
        assert_eq!(s.to_string(), "__timeout");
        assert_eq!(format!("{s:?}"), "Inline(\"__timeout\")");
    }
}
