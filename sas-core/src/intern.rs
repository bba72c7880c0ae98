use indexmap::IndexSet;

/// A handle into a [`StringInterner`]'s pool. Equality and hashing are by
/// index, not content — two symbols from different interners must never be
/// compared (spec §3 "Cell": "equality is pointer equality").
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct Symbol(u32);

impl Symbol {
    /// The symbol for the empty string — SAS's missing character value.
    /// Valid because [`StringInterner::new`] always interns `""` first, so
    /// it is guaranteed to land at index 0.
    pub const EMPTY: Symbol = Symbol(0);

    /// True for [`Symbol::EMPTY`].
    pub fn is_missing(self) -> bool {
        self == Symbol::EMPTY
    }
}

/// Deduplicates strings so that repeated dataset cell values share storage.
/// Owned at `Environment` scope (spec §9: not a process-global singleton),
/// so two independent interpreter instances never share interned state.
#[derive(Debug)]
pub struct StringInterner {
    strings: IndexSet<Box<str>>,
}

impl Default for StringInterner {
    fn default() -> Self {
        Self::new()
    }
}

impl StringInterner {
    /// Creates a pool with the empty string pre-interned at [`Symbol::EMPTY`].
    pub fn new() -> Self {
        let mut strings = IndexSet::new();
        strings.insert(Box::from(""));
        Self { strings }
    }

    /// Interns `s`, returning its symbol. Interning the same content twice
    /// returns the same symbol.
    pub fn intern(&mut self, s: &str) -> Symbol {
        if let Some(index) = self.strings.get_index_of(s) {
            return Symbol(index as u32);
        }
        let (index, _) = self.strings.insert_full(Box::from(s));
        Symbol(index as u32)
    }

    /// Resolves a symbol back to its string contents.
    ///
    /// # Panics
    /// Panics if `symbol` was not produced by this interner.
    pub fn resolve(&self, symbol: Symbol) -> &str {
        self.strings
            .get_index(symbol.0 as usize)
            .expect("symbol from a foreign interner")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_content_interns_to_the_same_symbol() {
        let mut pool = StringInterner::new();
        let a = pool.intern("hello");
        let b = pool.intern("hello");
        let c = pool.intern("world");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(pool.resolve(a), "hello");
        assert_eq!(pool.resolve(c), "world");
    }

    #[test]
    fn empty_string_is_pre_interned_as_the_missing_symbol() {
        let mut pool = StringInterner::new();
        assert!(Symbol::EMPTY.is_missing());
        assert_eq!(pool.resolve(Symbol::EMPTY), "");
        assert_eq!(pool.intern(""), Symbol::EMPTY);
    }
}
