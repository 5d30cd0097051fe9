//! Identifier interning: the hash table every identifier token passes
//! through, plus per-spelling mutable metadata (macro binding, keyword
//! override, front-end payload).
//!
//! Grounded on the teacher's `symbol/interner.rs` leaked-`'static`-string
//! strategy for stable addresses, de-concurrent-ized per `DESIGN.md`: this
//! table is process-scoped for one translation unit and is never shared
//! across threads (spec.md §5), so a `RefCell`-guarded `FxHashMap` replaces
//! the teacher's `DashMap`.

use std::cell::{Cell, RefCell};
use std::fmt;

use crate::error::{IdentifierTableError, IdentifierTableResult};
use crate::FxHashMap;

crate::define_idx!(MacroInfoHandle);

/// Per-identifier record. Interned once; its address never changes for the
/// lifetime of the owning [`IdentifierTable`] (the table leaks each record
/// to obtain `'static` references instead of tracking a separate arena
/// lifetime, matching the teacher's strategy).
pub struct IdentifierTokenInfo {
    spelling: &'static str,
    /// Opaque handle into an external macro-definition arena (owned by the
    /// preprocessor, in `cppc-lex`). `None` means "not currently `#define`d".
    macro_info: Cell<Option<MacroInfoHandle>>,
    /// Non-zero means this spelling lexes as a keyword (the value is a
    /// `cppc-lex::TokenKind` discriminant) rather than plain `identifier`.
    token_id: Cell<u8>,
    is_extension_token: Cell<bool>,
    /// Opaque front-end payload slot; 0 means unset. Consumers outside this
    /// crate may stash whatever index they like here.
    fe_token_info: Cell<u32>,
}

impl IdentifierTokenInfo {
    #[inline]
    pub fn spelling(&self) -> &'static str {
        self.spelling
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.spelling.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.spelling.is_empty()
    }

    #[inline]
    pub fn macro_info(&self) -> Option<MacroInfoHandle> {
        self.macro_info.get()
    }

    /// Binds this identifier to a macro definition. Only the preprocessor
    /// (never the lexer) calls this.
    #[inline]
    pub fn set_macro_info(&self, handle: Option<MacroInfoHandle>) {
        self.macro_info.set(handle);
    }

    #[inline]
    pub fn is_macro_defined(&self) -> bool {
        self.macro_info.get().is_some()
    }

    #[inline]
    pub fn token_id(&self) -> u8 {
        self.token_id.get()
    }

    #[inline]
    pub fn set_token_id(&self, id: u8) {
        self.token_id.set(id);
    }

    #[inline]
    pub fn is_keyword(&self) -> bool {
        self.token_id.get() != 0
    }

    #[inline]
    pub fn is_extension_token(&self) -> bool {
        self.is_extension_token.get()
    }

    #[inline]
    pub fn set_is_extension_token(&self, v: bool) {
        self.is_extension_token.set(v);
    }

    #[inline]
    pub fn fe_token_info(&self) -> u32 {
        self.fe_token_info.get()
    }

    #[inline]
    pub fn set_fe_token_info(&self, v: u32) {
        self.fe_token_info.set(v);
    }
}

impl fmt::Debug for IdentifierTokenInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentifierTokenInfo")
            .field("spelling", &self.spelling)
            .field("token_id", &self.token_id.get())
            .field("is_macro_defined", &self.is_macro_defined())
            .finish()
    }
}

/// Interning/probing counters, published per spec.md §4.5's "must publish
/// statistics" requirement (every identifier token goes through this path).
#[derive(Debug, Clone, Copy)]
pub struct IdentifierTableStats {
    pub count: usize,
    pub buckets: usize,
    pub empty_buckets: usize,
    pub avg_probes_per_hit: f64,
}

/// A hash table from spelling to a stable [`IdentifierTokenInfo`] handle.
#[derive(Default)]
pub struct IdentifierTable {
    entries: RefCell<FxHashMap<&'static str, &'static IdentifierTokenInfo>>,
    hits: Cell<u64>,
    probes: Cell<u64>,
}

impl IdentifierTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Interns `s`, returning the stable handle for its spelling. Repeated
    /// calls with an equal string return the same address.
    pub fn get(&self, s: &str) -> &'static IdentifierTokenInfo {
        self.hits.set(self.hits.get() + 1);
        self.probes.set(self.probes.get() + 1);
        if let Some(existing) = self.entries.borrow().get(s) {
            return existing;
        }
        let leaked_str: &'static str = Box::leak(s.to_string().into_boxed_str());
        let leaked: &'static IdentifierTokenInfo = Box::leak(Box::new(IdentifierTokenInfo {
            spelling: leaked_str,
            macro_info: Cell::new(None),
            token_id: Cell::new(0),
            is_extension_token: Cell::new(false),
            fe_token_info: Cell::new(0),
        }));
        self.entries.borrow_mut().insert(leaked_str, leaked);
        leaked
    }

    /// As [`Self::get`], but from a raw byte range (the lexer's native
    /// currency: `[start, end)` into a source buffer). Fails if the range
    /// is not valid UTF-8.
    pub fn get_bytes(&self, bytes: &[u8]) -> IdentifierTableResult<&'static IdentifierTokenInfo> {
        std::str::from_utf8(bytes).map(|s| self.get(s)).map_err(|_| IdentifierTableError::InvalidSpelling)
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    pub fn stats(&self) -> IdentifierTableStats {
        let entries = self.entries.borrow();
        let buckets = entries.capacity().max(1);
        let count = entries.len();
        IdentifierTableStats {
            count,
            buckets,
            empty_buckets: buckets.saturating_sub(count),
            avg_probes_per_hit: if self.hits.get() == 0 {
                0.0
            } else {
                self.probes.get() as f64 / self.hits.get() as f64
            },
        }
    }
}
