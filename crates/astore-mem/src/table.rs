//! Fixed-capacity string interning table.
//!
//! [`StringTable`] deduplicates byte content into one stored copy per
//! distinct string. It is an open-addressing hash set over a flat
//! [`Array<Entry>`]: a slot whose hash is zero is empty, collisions probe
//! linearly from `hash % capacity`.
//!
//! The table never grows. Its capacity is chosen once with
//! [`StringTable::reserve`] before the first insertion, and an insertion
//! that finds no room reports "no slot" instead of rehashing. Callers size
//! the table up front and treat exhaustion as fatal.
//!
//! # Examples
//!
//! ```
//! use astore_mem::{HybridString, Property, StringTable};
//!
//! let mut table = StringTable::new();
//! table.reserve(17);
//!
//! let first = table.intern(&HybridString::borrowed(b"__xstat64"), Property::IDENTIFIER).unwrap();
//! let again = table.intern(&HybridString::borrowed(b"__xstat64"), Property::FILE).unwrap();
//! assert_eq!(first, again);
//! assert_eq!(table.len(), 1);
//!
//! let entry = table.resolve(first).unwrap();
//! assert_eq!(entry.property(), Property::IDENTIFIER | Property::FILE);
//! ```

use crate::array::{Array, ClearOption};
use crate::string::{HashValue, HybridString};
use std::fmt;
use std::io;
use std::ops::{BitOr, BitOrAssign};

/// Bitmask describing how an interned string was used.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Property(u8);

impl Property {
    /// Plain text, no flags set.
    pub const TEXT: Self = Self(0);
    /// Used as a file path.
    pub const FILE: Self = Self(1);
    /// Used as an identifier.
    pub const IDENTIFIER: Self = Self(2);

    /// Creates a property from raw bits.
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    /// Raw bits, as exported to a store.
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Returns true if every bit of `other` is set in `self`.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for Property {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for Property {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 == 0 {
            return f.write_str("TEXT");
        }
        let mut sep = "";
        for (flag, name) in [(Self::FILE, "FILE"), (Self::IDENTIFIER, "IDENTIFIER")] {
            if self.contains(flag) {
                write!(f, "{sep}{name}")?;
                sep = " | ";
            }
        }
        let unknown = self.0 & !(Self::FILE.0 | Self::IDENTIFIER.0);
        if unknown != 0 {
            write!(f, "{sep}{unknown:#04x}")?;
        }
        Ok(())
    }
}

/// One slot of the table.
#[derive(Default)]
pub struct Entry {
    hash: HashValue,
    property: Property,
    value: HybridString<'static>,
}

impl Entry {
    /// Content hash; zero for an empty slot.
    #[inline]
    #[must_use]
    pub fn hash(&self) -> HashValue {
        self.hash
    }

    /// Union of every property the content was added with.
    #[inline]
    #[must_use]
    pub fn property(&self) -> Property {
        self.property
    }

    /// The stored content.
    #[inline]
    #[must_use]
    pub fn value(&self) -> &HybridString<'static> {
        &self.value
    }

    /// The stored content bytes.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.value.as_bytes()
    }

    #[inline]
    #[must_use]
    pub fn is_occupied(&self) -> bool {
        self.hash != 0
    }
}

impl fmt::Debug for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("hash", &self.hash)
            .field("property", &self.property)
            .field("value", &self.value)
            .finish()
    }
}

/// Handle to an interned string.
///
/// Stays valid until the table is cleared. The hash doubles as a join key
/// when interned strings are exported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Interned {
    slot: usize,
    hash: HashValue,
}

impl Interned {
    /// Slot index inside the table.
    #[inline]
    #[must_use]
    pub const fn slot(self) -> usize {
        self.slot
    }

    /// Content hash of the interned string.
    #[inline]
    #[must_use]
    pub const fn hash(self) -> HashValue {
        self.hash
    }
}

enum Probe {
    Found(usize),
    Vacant(usize),
    Full,
}

/// Open-addressing set of [`HybridString`]s with a capacity fixed at reserve.
#[derive(Default)]
pub struct StringTable {
    slots: Array<Entry>,
    occupied: usize,
}

impl StringTable {
    /// Creates a table with no slots. Call [`StringTable::reserve`] before
    /// adding anything.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            slots: Array::new(),
            occupied: 0,
        }
    }

    /// Creates a table with `capacity` empty slots.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let mut table = Self::new();
        table.reserve(capacity);
        table
    }

    /// Allocates `capacity` empty slots.
    ///
    /// # Panics
    ///
    /// Panics if the table already holds entries.
    pub fn reserve(&mut self, capacity: usize) {
        assert!(self.occupied == 0, "the string table is dirty");
        self.slots.reserve(capacity);
        self.slots.set_slots(0, capacity);
    }

    /// Number of slots.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of occupied slots.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.occupied
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.occupied == 0
    }

    /// Occupied slots over total slots; zero for an unreserved table.
    #[must_use]
    pub fn load_factor(&self) -> f64 {
        if self.capacity() == 0 {
            0.0
        } else {
            self.occupied as f64 / self.capacity() as f64
        }
    }

    fn probe(&self, hash: HashValue, bytes: &[u8]) -> Probe {
        let capacity = self.capacity();
        assert!(capacity > 0, "string table used before reserve");

        let start = (u128::from(hash) % capacity as u128) as usize;
        for step in 0..capacity {
            let slot = (start + step) % capacity;
            let entry = &self.slots[slot];
            if !entry.is_occupied() {
                return Probe::Vacant(slot);
            }
            if entry.hash == hash && entry.as_bytes() == bytes {
                return Probe::Found(slot);
            }
        }
        Probe::Full
    }

    /// Interns `candidate` and returns a handle to its slot.
    ///
    /// New content is duplicated into the first empty slot of its probe
    /// sequence. Content that is already present keeps its slot and gains
    /// `property`. Returns `None` when the content is absent and every slot
    /// is taken.
    ///
    /// # Panics
    ///
    /// Panics if the table was never reserved.
    pub fn intern(&mut self, candidate: &HybridString<'_>, property: Property) -> Option<Interned> {
        let hash = candidate.content_hash();
        let slot = match self.probe(hash, candidate.as_bytes()) {
            Probe::Found(slot) => {
                self.slots[slot].property |= property;
                slot
            }
            Probe::Vacant(slot) => {
                self.slots[slot] = Entry {
                    hash,
                    property,
                    value: candidate.dup(),
                };
                self.occupied += 1;
                slot
            }
            Probe::Full => return None,
        };
        Some(Interned { slot, hash })
    }

    /// Like [`StringTable::intern`], returning the entry itself.
    pub fn add(&mut self, candidate: &HybridString<'_>, property: Property) -> Option<&Entry> {
        let interned = self.intern(candidate, property)?;
        Some(&self.slots[interned.slot])
    }

    /// Looks `candidate` up without inserting it.
    #[must_use]
    pub fn find(&self, candidate: &HybridString<'_>) -> Option<&Entry> {
        if self.capacity() == 0 {
            return None;
        }
        match self.probe(candidate.content_hash(), candidate.as_bytes()) {
            Probe::Found(slot) => Some(&self.slots[slot]),
            Probe::Vacant(_) | Probe::Full => None,
        }
    }

    /// The entry behind `interned`, if the handle still refers to it.
    #[must_use]
    pub fn resolve(&self, interned: Interned) -> Option<&Entry> {
        self.slots
            .get(interned.slot)
            .filter(|entry| entry.is_occupied() && entry.hash == interned.hash)
    }

    /// Occupied entries in slot order.
    pub fn iter(&self) -> impl Iterator<Item = &Entry> + '_ {
        self.slots.iter().filter(|entry| entry.is_occupied())
    }

    /// Empties every occupied slot, then releases the slot array per
    /// `option`.
    ///
    /// With [`ClearOption::ElementsOnly`] the slots stay allocated and the
    /// table can be reused without another reserve.
    pub fn clear(&mut self, option: ClearOption) {
        for entry in self.slots.iter_mut() {
            if self.occupied == 0 {
                break;
            }
            if entry.is_occupied() {
                entry.value.clear(option);
                entry.hash = 0;
                entry.property = Property::TEXT;
                self.occupied -= 1;
            }
        }

        if option != ClearOption::ElementsOnly {
            self.slots.clear(option);
        }
    }

    /// Writes one line per occupied slot:
    /// `sequence:slot:hash:content`, with 1-based sequence numbers.
    pub fn dump(&self, out: &mut impl io::Write) -> io::Result<()> {
        let occupied = self
            .slots
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.is_occupied());

        for (seq, (slot, entry)) in occupied.enumerate() {
            writeln!(out, "{:6}:{:<6}:{:12}:{}", seq + 1, slot, entry.hash, entry.value)?;
        }
        Ok(())
    }
}

impl fmt::Debug for StringTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StringTable")
            .field("capacity", &self.capacity())
            .field("len", &self.occupied)
            .finish()
    }
}
