//! Per-run ingestion state.
//!
//! A [`Session`] owns everything a producer accumulates during one run: the
//! node list, the interned strings and the semantic spans. It is created at
//! run start from a [`Config`], threaded through every producer and consumer
//! call, and torn down once with [`Session::halt`].
//!
//! # Examples
//!
//! ```
//! use astore_mem::{Config, HybridString, Loc, Property, Range, Semantics, Session};
//!
//! let mut session: Session<u32> = Session::new(&Config::default().with_string_set_size(64));
//!
//! let file = session.add_string(&HybridString::borrowed(b"sched.h"), Property::FILE);
//! let kind = session.add_string(&HybridString::literal(b"FunctionDecl"), Property::TEXT);
//! let name = session.add_string(&HybridString::borrowed(b"sched_yield"), Property::IDENTIFIER);
//!
//! let at = Loc { file: Some(file), line: 12, col: 1 };
//! session.push_semantics(Semantics { kind, name, range: Range { begin: at, end: at } });
//! session.push_node(7);
//!
//! assert_eq!(session.resolve(name), Some(&b"sched_yield"[..]));
//! session.halt();
//! ```

use crate::array::{Array, ClearOption};
use crate::config::Config;
use crate::error::{self, MemError, Result};
use crate::string::HybridString;
use crate::table::{Interned, Property, StringTable};
use astore_log::{Level, debug, trace};

/// A position in a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Loc {
    /// Interned file path; `None` when the producer saw no file yet.
    pub file: Option<Interned>,
    pub line: u32,
    pub col: u32,
}

/// A span between two source positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Range {
    pub begin: Loc,
    pub end: Loc,
}

/// A named semantic span, e.g. the extent of a declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Semantics {
    /// Interned kind, such as `FunctionDecl`.
    pub kind: Interned,
    /// Interned name of the declared entity.
    pub name: Interned,
    pub range: Range,
}

/// Containers of one ingestion run, generic over the producer's node type.
#[derive(Debug)]
pub struct Session<N> {
    config: Config,
    nodes: Array<N>,
    strings: StringTable,
    semantics: Array<Semantics>,
}

impl<N> Session<N> {
    /// Starts a run, reserving the string table with the configured size.
    pub fn new(config: &Config) -> Self {
        debug!("string set size is {}", config.string_set_size);
        Self {
            config: config.clone(),
            nodes: Array::new(),
            strings: StringTable::with_capacity(config.string_set_size),
            semantics: Array::new(),
        }
    }

    /// Starts a run configured from the environment.
    ///
    /// Applies the configured log level to the global logger.
    pub fn from_env() -> Result<Self> {
        let config = Config::from_env()?;
        config.apply_logging();
        Ok(Self::new(&config))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Interns `s`, reporting a full table as an error.
    pub fn try_add_string(&mut self, s: &HybridString<'_>, property: Property) -> Result<Interned> {
        self.strings
            .intern(s, property)
            .ok_or(MemError::TableFull {
                capacity: self.strings.capacity(),
            })
    }

    /// Interns `s`.
    ///
    /// # Panics
    ///
    /// A full table ends the run: the condition is logged with the
    /// configured size and a hint to re-run with a bigger one, then the
    /// thread panics.
    #[track_caller]
    pub fn add_string(&mut self, s: &HybridString<'_>, property: Property) -> Interned {
        match self.try_add_string(s, property) {
            Ok(interned) => interned,
            Err(err) => error::fatal(&err),
        }
    }

    /// Content of an interned string.
    pub fn resolve(&self, interned: Interned) -> Option<&[u8]> {
        self.strings.resolve(interned).map(|entry| entry.as_bytes())
    }

    /// Appends a node and returns its index.
    pub fn push_node(&mut self, node: N) -> usize {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    /// Appends a semantic span and returns its index.
    pub fn push_semantics(&mut self, semantics: Semantics) -> usize {
        self.semantics.push(semantics);
        self.semantics.len() - 1
    }

    pub fn nodes(&self) -> &Array<N> {
        &self.nodes
    }

    pub fn nodes_mut(&mut self) -> &mut Array<N> {
        &mut self.nodes
    }

    pub fn semantics(&self) -> &Array<Semantics> {
        &self.semantics
    }

    pub fn strings(&self) -> &StringTable {
        &self.strings
    }

    /// Ends the run: reports table diagnostics, then releases everything.
    ///
    /// Dropping a session releases the same memory without the diagnostics.
    pub fn halt(mut self) {
        if astore_log::get_logger().enabled(Level::Trace) {
            let mut dump = Vec::new();
            if self.strings.dump(&mut dump).is_ok() {
                trace!("string set dump:\n{}", String::from_utf8_lossy(&dump));
            }
        }
        debug!(
            "The load factor of string set is {:.2}",
            self.strings.load_factor()
        );

        self.strings.clear(ClearOption::All);
        self.semantics.clear(ClearOption::All);
        self.nodes.clear(ClearOption::All);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(size: usize) -> Session<&'static str> {
        Session::new(&Config::default().with_string_set_size(size))
    }

    #[test]
    fn test_new_reserves_configured_size() {
        let s = session(17);
        assert_eq!(s.strings().capacity(), 17);
        assert!(s.strings().is_empty());
        assert!(s.nodes().is_empty());
        assert_eq!(s.config().string_set_size, 17);
    }

    #[test]
    fn test_add_string_deduplicates() {
        let mut s = session(16);
        let a = s.add_string(&HybridString::borrowed(b"ngx_shm_t *"), Property::TEXT);
        let b = s.add_string(&HybridString::from("ngx_shm_t *"), Property::IDENTIFIER);
        assert_eq!(a, b);
        assert_eq!(s.strings().len(), 1);
        assert_eq!(
            s.strings().resolve(a).map(|e| e.property()),
            Some(Property::IDENTIFIER)
        );
    }

    #[test]
    fn test_try_add_string_reports_full_table() {
        let mut s = session(1);
        assert!(s.try_add_string(&HybridString::from("a"), Property::TEXT).is_ok());
        assert_eq!(
            s.try_add_string(&HybridString::from("b"), Property::TEXT),
            Err(MemError::TableFull { capacity: 1 })
        );
        // Existing content still resolves
        assert!(s.try_add_string(&HybridString::from("a"), Property::FILE).is_ok());
    }

    #[test]
    #[should_panic(expected = "re-run with a bigger size")]
    fn test_add_string_on_full_table_is_fatal() {
        let mut s = session(1);
        s.add_string(&HybridString::from("a"), Property::TEXT);
        s.add_string(&HybridString::from("b"), Property::TEXT);
    }

    #[test]
    fn test_records_reference_interned_strings() {
        let mut s = session(32);
        let file = s.add_string(&HybridString::from("stat.h"), Property::FILE);
        let kind = s.add_string(&HybridString::literal(b"VarDecl"), Property::TEXT);
        let name = s.add_string(&HybridString::from("__timeout"), Property::IDENTIFIER);

        let begin = Loc { file: Some(file), line: 3, col: 5 };
        let end = Loc { col: 14, ..begin };
        let index = s.push_semantics(Semantics {
            kind,
            name,
            range: Range { begin, end },
        });
        assert_eq!(index, 0);

        let recorded = s.semantics()[0];
        assert_eq!(s.resolve(recorded.kind), Some(&b"VarDecl"[..]));
        assert_eq!(s.resolve(recorded.name), Some(&b"__timeout"[..]));
        assert_eq!(recorded.range.begin.file.and_then(|f| s.resolve(f)), Some(&b"stat.h"[..]));
    }

    #[test]
    fn test_push_node_returns_index() {
        let mut s = session(4);
        assert_eq!(s.push_node("TranslationUnitDecl"), 0);
        assert_eq!(s.push_node("TypedefDecl"), 1);
        s.nodes_mut()[1] = "RecordDecl";
        assert_eq!(s.nodes().as_slice(), &["TranslationUnitDecl", "RecordDecl"]);
    }

    #[test]
    fn test_halt_consumes_session() {
        let mut s = session(8);
        s.add_string(&HybridString::from("cmsghdr"), Property::TEXT);
        s.push_node("RecordDecl");
        s.halt();
    }
}
