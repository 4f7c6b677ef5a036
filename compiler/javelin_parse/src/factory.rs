//! The tree-construction seam.
//!
//! The parser never allocates syntax-tree nodes directly: it drives a
//! [`TreeFactory`], keyed by source position. This keeps tree construction
//! an external collaborator -- hosts can decorate the default factory to
//! record extra metadata, or substitute their own arena.
//!
//! [`ArenaFactory`] is the default implementation: a [`TreeArena`] plus an
//! optional end-position table. End positions are recorded only when
//! enabled; disabled, the tree keeps start offsets only, trading
//! diagnostic precision for memory.

use javelin_ir::{NodeId, NodeList, Tree, TreeArena};
use rustc_hash::FxHashMap;

/// Node-construction capability consumed by the parser.
pub trait TreeFactory {
    /// Build a node at a source start offset.
    fn node(&mut self, kind: Tree, pos: u32) -> NodeId;

    /// Store a child list.
    fn list(&mut self, items: &[NodeId]) -> NodeList;

    /// Record a node's end offset. May be a no-op when end positions are
    /// not being kept.
    fn set_end(&mut self, id: NodeId, end: u32);

    /// A node's recorded end offset, if kept.
    fn end_pos(&self, id: NodeId) -> Option<u32>;

    /// A node's start offset.
    fn pos(&self, id: NodeId) -> u32;

    /// Inspect an already-built node.
    fn kind(&self, id: NodeId) -> &Tree;
}

/// End-position side table: node id to end byte offset.
pub type EndPosTable = FxHashMap<NodeId, u32>;

/// Default factory: arena storage plus optional end positions.
pub struct ArenaFactory {
    arena: TreeArena,
    end_positions: Option<EndPosTable>,
}

impl ArenaFactory {
    pub fn new(keep_end_positions: bool) -> Self {
        ArenaFactory {
            arena: TreeArena::new(),
            end_positions: keep_end_positions.then(EndPosTable::default),
        }
    }

    /// Tear down into the arena and the (possibly absent) end table.
    pub fn into_parts(self) -> (TreeArena, Option<EndPosTable>) {
        (self.arena, self.end_positions)
    }

    pub fn arena(&self) -> &TreeArena {
        &self.arena
    }
}

impl TreeFactory for ArenaFactory {
    fn node(&mut self, kind: Tree, pos: u32) -> NodeId {
        self.arena.alloc(kind, pos)
    }

    fn list(&mut self, items: &[NodeId]) -> NodeList {
        self.arena.list(items)
    }

    fn set_end(&mut self, id: NodeId, end: u32) {
        if let Some(table) = &mut self.end_positions {
            table.insert(id, end);
        }
    }

    fn end_pos(&self, id: NodeId) -> Option<u32> {
        self.end_positions.as_ref().and_then(|t| t.get(&id).copied())
    }

    fn pos(&self, id: NodeId) -> u32 {
        self.arena.pos(id)
    }

    fn kind(&self, id: NodeId) -> &Tree {
        self.arena.kind(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_end_positions_when_enabled() {
        let mut factory = ArenaFactory::new(true);
        let id = factory.node(Tree::EmptyStatement, 3);
        factory.set_end(id, 9);
        assert_eq!(factory.end_pos(id), Some(9));
        assert_eq!(factory.pos(id), 3);
    }

    #[test]
    fn skips_end_positions_when_disabled() {
        let mut factory = ArenaFactory::new(false);
        let id = factory.node(Tree::EmptyStatement, 3);
        factory.set_end(id, 9);
        assert_eq!(factory.end_pos(id), None);
    }

    #[test]
    fn into_parts_preserves_nodes() {
        let mut factory = ArenaFactory::new(true);
        let id = factory.node(Tree::EmptyStatement, 0);
        factory.set_end(id, 1);
        let (arena, ends) = factory.into_parts();
        assert_eq!(arena.len(), 1);
        assert_eq!(ends.and_then(|t| t.get(&id).copied()), Some(1));
    }
}
