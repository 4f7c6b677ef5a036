//! Hash-consed name table for identifier storage.
//!
//! Every identifier and keyword spelling is interned exactly once into one
//! shared, append-only byte buffer; callers hold `Name` handles. Two handles
//! are equal if and only if their underlying byte content is equal, so name
//! comparison is a single `u32` compare.
//!
//! # Concurrency
//!
//! `NameTable` provides no internal locking: a table is either confined to
//! one compilation thread or shared behind [`SharedNameTable`], which wraps
//! it in a `parking_lot::RwLock` for externally-coordinated sessions.

use parking_lot::RwLock;
use rustc_hash::FxHasher;
use std::fmt;
use std::hash::Hasher;

/// Number of hash buckets. Spellings chain within a bucket, so this bounds
/// expected chain length, not capacity.
const BUCKET_COUNT: usize = 1 << 15;

/// An interned name: a stable, `Copy` handle into a [`NameTable`].
///
/// Handle equality is spelling equality (hash-consing). A `Name` is only
/// meaningful together with the table that produced it.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct Name(u32);

impl Name {
    /// The empty spelling, pre-interned in every table at index 0.
    pub const EMPTY: Name = Name(0);

    /// The raw handle index. Dense and contiguous: the n-th distinct
    /// spelling interned gets index n. Used by keyword tables to build
    /// dense `Name -> TokenKind` lookup arrays.
    #[inline]
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name({})", self.0)
    }
}

/// One interned spelling: a slice of the shared byte buffer plus the chain
/// link for its hash bucket.
struct Entry {
    /// Byte offset of the spelling in `NameTable::bytes`.
    start: u32,
    /// Spelling length in bytes.
    len: u32,
    /// Next entry index in the same hash bucket, or `u32::MAX`.
    next: u32,
}

const NO_ENTRY: u32 = u32::MAX;

/// Hash-consed, append-only name table.
///
/// Spellings are stored back-to-back in one growable byte buffer; an open
/// hash table with per-entry chaining maps spelling content to the entry
/// that owns it. Interning an already-present spelling allocates nothing.
pub struct NameTable {
    /// Shared spelling storage. Append-only for the table's lifetime.
    bytes: Vec<u8>,
    /// One entry per distinct spelling, indexed by `Name`.
    entries: Vec<Entry>,
    /// Bucket heads: entry index or `NO_ENTRY`.
    buckets: Box<[u32]>,
}

impl NameTable {
    /// Create a table with the empty spelling pre-interned as [`Name::EMPTY`].
    pub fn new() -> Self {
        let mut table = NameTable {
            bytes: Vec::with_capacity(4096),
            entries: Vec::with_capacity(512),
            buckets: vec![NO_ENTRY; BUCKET_COUNT].into_boxed_slice(),
        };
        let empty = table.intern("");
        debug_assert_eq!(empty, Name::EMPTY);
        table
    }

    /// Number of distinct spellings interned.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check whether only the empty spelling is present.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.len() <= 1
    }

    #[inline]
    fn hash_bucket(bytes: &[u8]) -> usize {
        let mut hasher = FxHasher::default();
        hasher.write(bytes);
        (hasher.finish() as usize) & (BUCKET_COUNT - 1)
    }

    /// Intern a spelling, returning its stable handle.
    ///
    /// Returns the existing handle when the spelling is already present;
    /// otherwise appends the bytes to the shared buffer and creates a new
    /// entry.
    pub fn intern(&mut self, spelling: &str) -> Name {
        self.intern_bytes(spelling.as_bytes())
    }

    /// Byte-level interning. `bytes` must be valid UTF-8 (all callers pass
    /// spellings that originated as `&str` or concatenations thereof).
    pub fn intern_bytes(&mut self, bytes: &[u8]) -> Name {
        debug_assert!(std::str::from_utf8(bytes).is_ok(), "spelling must be UTF-8");
        let bucket = Self::hash_bucket(bytes);

        let mut cursor = self.buckets[bucket];
        while cursor != NO_ENTRY {
            let entry = &self.entries[cursor as usize];
            let stored = &self.bytes[entry.start as usize..(entry.start + entry.len) as usize];
            if stored == bytes {
                return Name(cursor);
            }
            cursor = entry.next;
        }

        #[allow(
            clippy::cast_possible_truncation,
            reason = "a single translation-unit session cannot intern 4 billion spellings"
        )]
        let index = self.entries.len() as u32;
        #[allow(
            clippy::cast_possible_truncation,
            reason = "byte storage is bounded by total interned spelling length, well under u32::MAX"
        )]
        let start = self.bytes.len() as u32;
        self.bytes.extend_from_slice(bytes);
        #[allow(
            clippy::cast_possible_truncation,
            reason = "individual spellings are bounded by source length"
        )]
        let len = bytes.len() as u32;
        self.entries.push(Entry {
            start,
            len,
            next: self.buckets[bucket],
        });
        self.buckets[bucket] = index;
        Name(index)
    }

    /// Look up the spelling for a handle.
    ///
    /// # Panics
    ///
    /// Panics if `name` did not come from this table.
    pub fn lookup(&self, name: Name) -> &str {
        let entry = &self.entries[name.0 as usize];
        let bytes = &self.bytes[entry.start as usize..(entry.start + entry.len) as usize];
        #[allow(
            unsafe_code,
            reason = "intern_bytes only ever stores UTF-8 spellings; re-validating on every lookup would put a scan on the hot path"
        )]
        // SAFETY: every entry was stored via intern_bytes, which requires
        // (and debug-asserts) valid UTF-8.
        unsafe {
            std::str::from_utf8_unchecked(bytes)
        }
    }

    /// Byte offset of a handle's spelling in the shared buffer.
    ///
    /// Two handles obtained by interning the same spelling share one offset;
    /// this exposes that storage sharing for tests and for dense side tables.
    #[inline]
    pub fn offset(&self, name: Name) -> u32 {
        self.entries[name.0 as usize].start
    }

    /// Spelling length in bytes.
    #[inline]
    pub fn byte_len(&self, name: Name) -> u32 {
        self.entries[name.0 as usize].len
    }

    /// Byte-level prefix test: does `name`'s spelling start with `prefix`'s?
    pub fn starts_with(&self, name: Name, prefix: Name) -> bool {
        let n = &self.entries[name.0 as usize];
        let p = &self.entries[prefix.0 as usize];
        if p.len > n.len {
            return false;
        }
        let name_bytes = &self.bytes[n.start as usize..(n.start + p.len) as usize];
        let prefix_bytes = &self.bytes[p.start as usize..(p.start + p.len) as usize];
        name_bytes == prefix_bytes
    }

    /// Concatenate two spellings, interning the result.
    pub fn concat(&mut self, left: Name, right: Name) -> Name {
        let l = &self.entries[left.0 as usize];
        let r = &self.entries[right.0 as usize];
        let mut joined = Vec::with_capacity((l.len + r.len) as usize);
        joined.extend_from_slice(&self.bytes[l.start as usize..(l.start + l.len) as usize]);
        joined.extend_from_slice(&self.bytes[r.start as usize..(r.start + r.len) as usize]);
        self.intern_bytes(&joined)
    }
}

impl Default for NameTable {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for NameTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NameTable({} names)", self.entries.len())
    }
}

/// A name table behind a `RwLock`, for sessions that parse several units
/// from different threads.
///
/// The table itself stays lock-free internally; this wrapper is the one
/// sanctioned way to share it. Lookups return owned strings because the
/// borrow cannot outlive the lock guard.
pub struct SharedNameTable {
    inner: RwLock<NameTable>,
}

impl SharedNameTable {
    pub fn new() -> Self {
        SharedNameTable {
            inner: RwLock::new(NameTable::new()),
        }
    }

    /// Intern a spelling through the write lock.
    pub fn intern(&self, spelling: &str) -> Name {
        self.inner.write().intern(spelling)
    }

    /// Look up a spelling, cloning it out of the lock.
    pub fn lookup_owned(&self, name: Name) -> String {
        self.inner.read().lookup(name).to_owned()
    }

    /// Run a closure with shared read access to the table.
    pub fn with<R>(&self, f: impl FnOnce(&NameTable) -> R) -> R {
        f(&self.inner.read())
    }

    /// Run a closure with exclusive access to the table.
    pub fn with_mut<R>(&self, f: impl FnOnce(&mut NameTable) -> R) -> R {
        f(&mut self.inner.write())
    }
}

impl Default for SharedNameTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intern_and_lookup() {
        let mut table = NameTable::new();
        let hello = table.intern("hello");
        let world = table.intern("world");
        assert_ne!(hello, world);
        assert_eq!(table.lookup(hello), "hello");
        assert_eq!(table.lookup(world), "world");
    }

    #[test]
    fn interning_is_idempotent() {
        let mut table = NameTable::new();
        let a = table.intern("identifier");
        let before = table.len();
        let b = table.intern("identifier");
        assert_eq!(a, b);
        assert_eq!(table.len(), before, "re-interning must not grow the table");
        // hash-consed: both handles share the same storage offset
        assert_eq!(table.offset(a), table.offset(b));
    }

    #[test]
    fn empty_name_is_pre_interned() {
        let mut table = NameTable::new();
        assert_eq!(table.intern(""), Name::EMPTY);
        assert_eq!(table.lookup(Name::EMPTY), "");
    }

    #[test]
    fn indices_are_dense() {
        let mut table = NameTable::new();
        let a = table.intern("a");
        let b = table.intern("b");
        assert_eq!(a.index() + 1, b.index());
    }

    #[test]
    fn prefix_test() {
        let mut table = NameTable::new();
        let full = table.intern("java.util");
        let prefix = table.intern("java");
        let other = table.intern("javax");
        assert!(table.starts_with(full, prefix));
        assert!(table.starts_with(full, full));
        assert!(!table.starts_with(prefix, full));
        assert!(!table.starts_with(full, other));
        assert!(table.starts_with(full, Name::EMPTY));
    }

    #[test]
    fn concat_interns_joined_spelling() {
        let mut table = NameTable::new();
        let left = table.intern("get");
        let right = table.intern("Value");
        let joined = table.concat(left, right);
        assert_eq!(table.lookup(joined), "getValue");
        assert!(table.starts_with(joined, left));
        // concatenation hash-conses too
        let direct = table.intern("getValue");
        assert_eq!(joined, direct);
    }

    #[test]
    fn non_ascii_spellings() {
        let mut table = NameTable::new();
        let n = table.intern("变量");
        assert_eq!(table.lookup(n), "变量");
        assert_eq!(table.intern("变量"), n);
    }

    #[test]
    fn shared_table_round_trip() {
        let shared = SharedNameTable::new();
        let a = shared.intern("shared");
        let b = shared.intern("shared");
        assert_eq!(a, b);
        assert_eq!(shared.lookup_owned(a), "shared");
    }

    #[test]
    fn many_spellings_survive_chaining() {
        // Force bucket collisions by volume; every spelling must still
        // round-trip and re-intern to its original handle.
        let mut table = NameTable::new();
        let names: Vec<(String, Name)> = (0..5000)
            .map(|i| {
                let s = format!("ident_{i}");
                let n = table.intern(&s);
                (s, n)
            })
            .collect();
        for (s, n) in &names {
            assert_eq!(table.lookup(*n), s.as_str());
            assert_eq!(table.intern(s), *n);
        }
    }

    #[allow(
        clippy::disallowed_types,
        reason = "proptest macros internally use Arc"
    )]
    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn intern_twice_same_handle(s in "[a-zA-Z_$][a-zA-Z0-9_$]{0,24}") {
                let mut table = NameTable::new();
                let a = table.intern(&s);
                let b = table.intern(&s);
                prop_assert_eq!(a, b);
                prop_assert_eq!(table.offset(a), table.offset(b));
                prop_assert_eq!(table.lookup(a), s.as_str());
            }

            #[test]
            fn distinct_spellings_distinct_handles(
                a in "[a-z]{1,12}",
                b in "[a-z]{1,12}",
            ) {
                let mut table = NameTable::new();
                let na = table.intern(&a);
                let nb = table.intern(&b);
                prop_assert_eq!(a == b, na == nb);
            }

            #[test]
            fn concat_matches_string_concat(
                a in "[a-z]{0,8}",
                b in "[a-z]{0,8}",
            ) {
                let mut table = NameTable::new();
                let na = table.intern(&a);
                let nb = table.intern(&b);
                let joined = table.concat(na, nb);
                prop_assert_eq!(table.lookup(joined), format!("{a}{b}"));
            }
        }
    }
}
