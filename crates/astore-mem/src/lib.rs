//! `astore` storage substrate
//!
//! This crate provides the in-memory containers every ingestion stage of
//! `astore` builds on:
//!
//! - **Capacity policy**: power-of-two rounding shared by all growth
//! - **Array**: a growable buffer with explicit growth, zero-filled sparse
//!   writes, ordered insert, binary search and three-way clear
//! - **Hybrid strings**: inline, heap, and borrowed byte strings
//! - **String table**: a fixed-capacity interning set that fails loudly when
//!   full
//! - **Sorted sets**: search-or-insert on sorted arrays
//! - **Session**: the containers of one run, sized from [`Config`]
//!
//! # Features
//!
//! - `hash-128`: widen content hashes from `u32` to `u128`
//! - `fatal-backtrace`: log a backtrace before aborting on a full table

pub mod array;
pub mod capacity;
pub mod config;
pub mod error;
pub mod session;
pub mod sorted;
pub mod string;
pub mod table;

pub use array::{Array, ClearOption};
pub use capacity::proper_capacity;
pub use config::Config;
pub use error::{MemError, Result};
pub use session::{Loc, Range, Semantics, Session};
pub use sorted::Placement;
pub use string::{HashValue, HybridString, Repr};
pub use table::{Entry, Interned, Property, StringTable};
