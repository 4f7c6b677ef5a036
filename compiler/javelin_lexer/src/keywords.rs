//! The reserved-word and operator table.
//!
//! Built once per session: every fixed spelling (keywords *and* operators)
//! is interned into the shared name table, and a dense array maps name
//! indices back to token kinds. Classifying an identifier is then one
//! interning plus one array load; the greedy operator scanner reuses the
//! same table to test whether an extended spelling is still an operator.
//!
//! The table is immutable after construction and injected explicitly --
//! no process-wide singletons.

use javelin_ir::{Name, NameTable, TokenKind};

/// Dense `Name -> TokenKind` table for every fixed spelling.
pub struct Keywords {
    /// Indexed by `Name::index()`; `Identifier` for non-reserved names.
    kinds: Vec<TokenKind>,
    /// Highest name index occupied by a fixed spelling.
    max_key: u32,
}

/// All kinds with a fixed spelling, in discriminant order.
const FIXED_KINDS: [TokenKind; 104] = {
    use TokenKind::*;
    [
        Abstract, Assert, Boolean, Break, Byte, Case, Catch, Char, Class, Const, Continue,
        Default, Do, Double, Else, Enum, Extends, Final, Finally, Float, For, Goto, If,
        Implements, Import, InstanceOf, Int, Interface, Long, Native, New, Package, Private,
        Protected, Public, Return, Short, Static, Strictfp, Super, Switch, Synchronized, This,
        Throw, Throws, Transient, Try, Void, Volatile, While, True, False, Null, Underscore,
        Arrow, ColCol, LParen, RParen, LBrace, RBrace, LBracket, RBracket, Semi, Comma, Dot,
        Ellipsis, Eq, Gt, Lt, Bang, Tilde, Ques, Colon, EqEq, LtEq, GtEq, BangEq, AmpAmp,
        BarBar, PlusPlus, SubSub, Plus, Sub, Star, Slash, Amp, Bar, Caret, Percent, LtLt, GtGt,
        GtGtGt, PlusEq, SubEq, StarEq, SlashEq, AmpEq, BarEq, CaretEq, PercentEq, LtLtEq,
        GtGtEq, GtGtGtEq, At,
    ]
};

impl Keywords {
    /// Intern every fixed spelling into `names` and build the lookup table.
    pub fn new(names: &mut NameTable) -> Self {
        let mut entries: Vec<(Name, TokenKind)> = Vec::with_capacity(FIXED_KINDS.len());
        let mut max_key = 0u32;
        for kind in FIXED_KINDS {
            let Some(text) = kind.fixed_text() else {
                debug_assert!(false, "fixed kind without spelling: {kind:?}");
                continue;
            };
            let name = names.intern(text);
            max_key = max_key.max(name.index());
            entries.push((name, kind));
        }

        let mut kinds = vec![TokenKind::Identifier; max_key as usize + 1];
        for (name, kind) in entries {
            kinds[name.index() as usize] = kind;
        }
        Keywords { kinds, max_key }
    }

    /// Classify an interned spelling: its reserved kind, or `Identifier`.
    #[inline]
    pub fn kind_of(&self, name: Name) -> TokenKind {
        if name.index() > self.max_key {
            TokenKind::Identifier
        } else {
            self.kinds[name.index() as usize]
        }
    }
}
