//! Recursive-descent parser for the Javelin front end.
//!
//! One [`Parser`] parses exactly one translation unit and is then
//! discarded. It drives the lookahead [`Scanner`], builds nodes through a
//! [`TreeFactory`], and reports every problem to a diagnostic sink --
//! parsing always produces a tree, with `Erroneous` nodes standing in for
//! unparsable regions.
//!
//! Layout follows the grammar: `grammar::unit` (compilation units),
//! `grammar::decl` (type declarations and members), `grammar::stmt`
//! (statements), `grammar::expr` (precedence-climbing expressions),
//! `grammar::ty` (type-specific helpers). `classifier` holds the bounded
//! lookahead disambiguators; `recovery` the skip-and-resync machinery.

mod classifier;
mod factory;
mod features;
mod grammar;
mod mode;
mod recovery;
mod stack;

#[cfg(test)]
mod tests;

pub use classifier::ParensResult;
pub use factory::{ArenaFactory, EndPosTable, TreeFactory};
pub use features::{Feature, FeatureGates};
pub use mode::Mode;

use javelin_diagnostic::{Diagnostic, DiagnosticSink, ErrorCode};
use javelin_ir::{
    Comment, Name, NameTable, NodeId, NodeList, SourceLevel, Span, Token, Tree, TreeArena,
    TokenKind,
};
use javelin_lexer::{Keywords, Scanner};
use javelin_lexer_core::SourceBuffer;
use rustc_hash::FxHashMap;

/// Doc-comment side table: declaration node to its documentation comment.
pub type DocTable = FxHashMap<NodeId, Comment>;

/// Per-unit parser switches.
#[derive(Clone, Debug)]
pub struct ParserConfig {
    /// Configured minimum language level; drives the feature gates.
    pub level: SourceLevel,
    /// Record per-node end offsets (off: start offsets only).
    pub keep_end_positions: bool,
    /// Associate doc comments with the declarations they precede.
    pub keep_doc_comments: bool,
    /// Fold adjacent string-literal concatenations at parse time.
    pub fold_strings: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        ParserConfig {
            level: SourceLevel::LATEST,
            keep_end_positions: false,
            keep_doc_comments: false,
            fold_strings: true,
        }
    }
}

/// Everything a parse produces.
pub struct ParseOutcome {
    /// The compilation-unit root node.
    pub unit: NodeId,
    pub arena: TreeArena,
    /// The session name table (resolves every `Name` in the tree).
    pub names: NameTable,
    /// Present when `keep_end_positions` was set.
    pub end_positions: Option<EndPosTable>,
    /// Present when `keep_doc_comments` was set.
    pub doc_comments: Option<DocTable>,
}

/// Parse one translation unit.
pub fn parse(
    source: &str,
    config: &ParserConfig,
    sink: &mut dyn DiagnosticSink,
) -> ParseOutcome {
    let _span = tracing::debug_span!("parse_unit", bytes = source.len()).entered();
    let buffer = SourceBuffer::new(source);
    let mut names = NameTable::new();
    let keywords = Keywords::new(&mut names);
    let (unit, factory, doc_comments) = {
        let scanner = javelin_lexer::scan(&buffer, &mut names, &keywords, config.level);
        let mut parser = Parser::new(
            scanner,
            ArenaFactory::new(config.keep_end_positions),
            sink,
            config.clone(),
        );
        let unit = parser.parse_compilation_unit();
        parser.into_outcome(unit)
    };
    let (arena, end_positions) = factory.into_parts();
    ParseOutcome {
        unit,
        arena,
        names,
        end_positions,
        doc_comments,
    }
}

/// Parser state for one translation unit.
pub struct Parser<'src, 'sess, F: TreeFactory> {
    scanner: Scanner<'src, 'sess>,
    factory: F,
    sink: &'sess mut dyn DiagnosticSink,
    config: ParserConfig,
    gates: FeatureGates,
    /// Which interpretations the term being parsed admits.
    pub(crate) mode: Mode,
    /// The mode of the term that was parsed last.
    pub(crate) last_mode: Mode,
    /// Offset of the last reported syntax error (one diagnostic per offset).
    pub(crate) last_err_pos: Option<u32>,
    /// Token position at the last report, for forced progress.
    pub(crate) recovery_pos: Option<u32>,
    /// Pooled operand stack for the binary-expression ladder.
    pub(crate) od_stack: Vec<NodeId>,
    /// Pooled operator stack (kind, position) for the ladder.
    pub(crate) op_stack: Vec<(TokenKind, u32)>,
    docs: Option<DocTable>,
}

impl<'src, 'sess, F: TreeFactory> Parser<'src, 'sess, F> {
    pub fn new(
        scanner: Scanner<'src, 'sess>,
        factory: F,
        sink: &'sess mut dyn DiagnosticSink,
        config: ParserConfig,
    ) -> Self {
        let gates = FeatureGates::new(config.level);
        let docs = config.keep_doc_comments.then(DocTable::default);
        Parser {
            scanner,
            factory,
            sink,
            config,
            gates,
            mode: Mode::empty(),
            last_mode: Mode::empty(),
            last_err_pos: None,
            recovery_pos: None,
            od_stack: Vec::with_capacity(32),
            op_stack: Vec::with_capacity(32),
            docs,
        }
    }

    /// Flush remaining lexer diagnostics and release the factory and the
    /// doc table.
    pub fn into_outcome(mut self, unit: NodeId) -> (NodeId, F, Option<DocTable>) {
        self.drain_lexer_diagnostics();
        (unit, self.factory, self.docs)
    }

    // ── Token management ────────────────────────────────────────────────

    #[inline]
    pub(crate) fn kind(&self) -> TokenKind {
        self.scanner.token().kind
    }

    #[inline]
    pub(crate) fn token(&self) -> &Token {
        self.scanner.token()
    }

    /// Start offset of the current token.
    #[inline]
    pub(crate) fn pos(&self) -> u32 {
        self.scanner.token().span.start
    }

    /// End offset of the previously consumed token.
    #[inline]
    pub(crate) fn prev_end(&self) -> u32 {
        self.scanner.prev_token().span.end
    }

    /// Consume the current token.
    pub(crate) fn next(&mut self) {
        self.scanner.advance();
        self.drain_lexer_diagnostics();
    }

    fn drain_lexer_diagnostics(&mut self) {
        for diagnostic in self.scanner.take_diagnostics() {
            self.sink.report(diagnostic);
        }
    }

    /// Kind of the token `k` positions ahead (0 = current).
    #[inline]
    pub(crate) fn peek_kind(&mut self, k: usize) -> TokenKind {
        self.scanner.token_at(k).kind
    }

    /// Reinterpret the current compound operator as two shorter ones.
    pub(crate) fn split_token(&mut self) {
        self.scanner.split();
    }

    pub(crate) fn intern(&mut self, spelling: &str) -> Name {
        self.scanner.names().intern(spelling)
    }

    /// Consume `tk`, or report `<tk> expected` at the end of the previous
    /// token and continue without consuming.
    pub(crate) fn accept(&mut self, tk: TokenKind) {
        if self.kind() == tk {
            self.next();
        } else {
            let report_at = self.prev_end();
            self.report_syntax_error(
                report_at,
                ErrorCode::E1001,
                format!("'{}' expected", tk.display_name()),
            );
        }
    }

    /// Consume an identifier and return its name.
    ///
    /// `assert` and `enum` produce a diagnostic but still yield their
    /// spelling; `_` is accepted as an identifier. Anything else reports
    /// `identifier expected` without consuming.
    pub(crate) fn ident(&mut self) -> Name {
        match self.kind() {
            TokenKind::Identifier | TokenKind::Underscore => {
                let name = self.token().name().unwrap_or(Name::EMPTY);
                self.next();
                name
            }
            TokenKind::Assert => {
                let pos = self.pos();
                self.report_syntax_error(
                    pos,
                    ErrorCode::E1001,
                    "'assert' cannot be used as an identifier",
                );
                let name = self.intern("assert");
                self.next();
                name
            }
            TokenKind::Enum => {
                let pos = self.pos();
                self.report_syntax_error(
                    pos,
                    ErrorCode::E1001,
                    "'enum' cannot be used as an identifier",
                );
                let name = self.intern("enum");
                self.next();
                name
            }
            _ => {
                let report_at = self.prev_end();
                self.report_syntax_error(report_at, ErrorCode::E1001, "identifier expected");
                Name::EMPTY
            }
        }
    }

    /// Qualified identifier: `Ident { . Ident }*` as nested selects.
    pub(crate) fn qualident(&mut self) -> NodeId {
        let pos = self.pos();
        let name = self.ident();
        let mut t = self.make_at(Tree::Ident { name }, pos);
        while self.kind() == TokenKind::Dot {
            let sel_pos = self.pos();
            self.next();
            let name = self.ident();
            t = self.make_at(Tree::Select { target: t, name }, sel_pos);
            self.finish_node(t);
        }
        t
    }

    // ── Node construction ───────────────────────────────────────────────

    /// Build a node at a position.
    #[inline]
    pub(crate) fn make_at(&mut self, kind: Tree, pos: u32) -> NodeId {
        self.factory.node(kind, pos)
    }

    /// Build a node at a position and record its end at the previous
    /// token's end.
    pub(crate) fn make(&mut self, kind: Tree, pos: u32) -> NodeId {
        let id = self.factory.node(kind, pos);
        self.finish_node(id)
    }

    /// Record a node's end position at the previous token's end.
    pub(crate) fn finish_node(&mut self, id: NodeId) -> NodeId {
        let end = self.prev_end();
        self.factory.set_end(id, end);
        id
    }

    pub(crate) fn make_list(&mut self, items: &[NodeId]) -> NodeList {
        self.factory.list(items)
    }

    #[inline]
    pub(crate) fn node_kind(&self, id: NodeId) -> &Tree {
        self.factory.kind(id)
    }

    #[inline]
    pub(crate) fn node_pos(&self, id: NodeId) -> u32 {
        self.factory.pos(id)
    }

    // ── Modes ───────────────────────────────────────────────────────────

    /// Run `f` with the given term mode, restoring the previous mode on
    /// every exit path. The mode in force when `f` finished is kept as
    /// [`Self::last_mode`] for callers that disambiguate on it.
    pub(crate) fn with_mode<R>(&mut self, mode: Mode, f: impl FnOnce(&mut Self) -> R) -> R {
        let saved = self.mode;
        self.mode = mode;
        let result = f(self);
        self.last_mode = self.mode;
        self.mode = saved;
        result
    }

    // ── Feature gates ───────────────────────────────────────────────────

    /// Admit a gated construct: below the configured level the first use
    /// reports one diagnostic, then the gate behaves as enabled.
    pub(crate) fn check_feature(&mut self, feature: Feature, pos: u32) {
        if !self.gates.enabled(feature) {
            self.sink.report(
                Diagnostic::error(feature.code())
                    .with_message(format!(
                        "{} are not supported in source level {}",
                        feature.describe(),
                        self.gates.level().name()
                    ))
                    .with_span(Span::point(pos)),
            );
            self.gates.enable(feature);
        }
    }

    // ── Doc comments ────────────────────────────────────────────────────

    /// The doc comment attached to the current token, for declarations
    /// about to be parsed.
    pub(crate) fn current_doc_comment(&self) -> Option<Comment> {
        if self.docs.is_none() {
            return None;
        }
        self.scanner.token().doc_comment().cloned()
    }

    /// Associate a declaration node with its doc comment.
    pub(crate) fn attach_doc(&mut self, node: NodeId, comment: Option<Comment>) {
        if let (Some(table), Some(comment)) = (&mut self.docs, comment) {
            table.insert(node, comment);
        }
    }

    // ── Configuration access ────────────────────────────────────────────

    #[inline]
    pub(crate) fn fold_strings(&self) -> bool {
        self.config.fold_strings
    }

    /// Report a diagnostic at a span through the sink.
    pub(crate) fn report(&mut self, diagnostic: Diagnostic) {
        self.sink.report(diagnostic);
    }
}
