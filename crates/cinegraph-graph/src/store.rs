//! The graph store contract and its in-memory implementation.
//!
//! Readers see the graph through [`GraphView`]. Writers describe their
//! changes as a [`Batch`] of mutations which the store applies atomically:
//! a concurrent reader observes either the whole batch or none of it.

use crate::graph::MovieGraph;
use cinegraph_core::{Edge, Node, NodeKey, NodeKind, RelKind, Result};
use parking_lot::RwLock;
use petgraph::Direction;
use tracing::info;

/// A node reached over one edge, together with that edge.
#[derive(Debug, Clone, Copy)]
pub struct Related<'a> {
    pub node: &'a Node,
    pub edge: &'a Edge,
}

/// Read access to a graph.
pub trait GraphView {
    /// Looks up a node by key. Absent keys are `NotFound`.
    fn get_node(&self, key: &NodeKey) -> Result<&Node>;

    /// Nodes connected to `key` by edges of `rel` in `direction`, unordered.
    fn related<'a>(
        &'a self,
        key: &NodeKey,
        rel: RelKind,
        direction: Direction,
    ) -> Result<Box<dyn Iterator<Item = Related<'a>> + 'a>>;

    /// All nodes of one kind, unordered.
    fn nodes<'a>(&'a self, kind: NodeKind) -> Box<dyn Iterator<Item = &'a Node> + 'a>;

    /// Review nodes whose text contains `needle`, ignoring case.
    fn reviews_containing(&self, needle: &str) -> Vec<&Node>;
}

/// A single change to the graph.
#[derive(Debug, Clone)]
pub enum Mutation {
    /// Insert a node, or merge it into the node with the same key.
    UpsertNode(Node),
    /// Connect two existing nodes. Symmetric kinds write both directions.
    Relate {
        from: NodeKey,
        to: NodeKey,
        edge: Edge,
    },
}

/// An ordered group of mutations applied as one unit.
#[derive(Debug, Clone, Default)]
pub struct Batch {
    ops: Vec<Mutation>,
}

impl Batch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upsert(&mut self, node: impl Into<Node>) -> &mut Self {
        self.ops.push(Mutation::UpsertNode(node.into()));
        self
    }

    pub fn relate(&mut self, from: NodeKey, to: NodeKey, edge: Edge) -> &mut Self {
        self.ops.push(Mutation::Relate { from, to, edge });
        self
    }

    pub fn ops(&self) -> &[Mutation] {
        &self.ops
    }

    pub fn into_ops(self) -> Vec<Mutation> {
        self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

impl Extend<Mutation> for Batch {
    fn extend<T: IntoIterator<Item = Mutation>>(&mut self, iter: T) {
        self.ops.extend(iter);
    }
}

/// What a batch changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub nodes_created: usize,
    pub nodes_merged: usize,
    pub edges_created: usize,
    pub edges_merged: usize,
}

impl BatchReport {
    pub(crate) fn count_edge(&mut self, created: bool) {
        if created {
            self.edges_created += 1;
        } else {
            self.edges_merged += 1;
        }
    }
}

/// A backing store for the movie graph.
///
/// Implementations must make `read` calls concurrent with each other and
/// `apply` atomic with respect to readers.
pub trait GraphStore: Send + Sync {
    /// Runs `f` against a consistent view of the graph.
    fn read<R>(&self, f: impl FnOnce(&dyn GraphView) -> Result<R>) -> Result<R>;

    /// Applies a batch. On error nothing from the batch is visible.
    fn apply(&self, batch: Batch) -> Result<BatchReport>;
}

/// Graph store held entirely in memory behind a reader-writer lock.
#[derive(Debug, Default)]
pub struct MemoryStore {
    graph: RwLock<MovieGraph>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps an already built graph.
    pub fn from_graph(graph: MovieGraph) -> Self {
        Self {
            graph: RwLock::new(graph),
        }
    }

    /// Runs `f` with shared access to the underlying graph.
    pub fn with_graph<R>(&self, f: impl FnOnce(&MovieGraph) -> R) -> R {
        f(&self.graph.read())
    }
}

impl GraphStore for MemoryStore {
    fn read<R>(&self, f: impl FnOnce(&dyn GraphView) -> Result<R>) -> Result<R> {
        let graph = self.graph.read();
        f(&*graph)
    }

    fn apply(&self, batch: Batch) -> Result<BatchReport> {
        let size = batch.len();
        let mut graph = self.graph.write();
        let report = graph.apply(batch)?;
        info!(
            "Committed {} mutations ({} new nodes, {} new edges)",
            size, report.nodes_created, report.edges_created
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cinegraph_core::{EngineError, User};
    use std::sync::Arc;
    use std::thread;

    fn seeded() -> MemoryStore {
        let store = MemoryStore::new();
        let mut batch = Batch::new();
        for name in ["alice", "bob", "carol"] {
            batch.upsert(User::new(name, name, format!("{}@example.com", name)));
        }
        store.apply(batch).unwrap();
        store
    }

    #[test]
    fn test_read_missing_node_is_not_found() {
        let store = seeded();
        let result = store.read(|g| g.get_node(&NodeKey::user("zed")).map(|_| ()));
        assert_eq!(result, Err(EngineError::not_found(&NodeKey::user("zed"))));
    }

    #[test]
    fn test_failed_batch_leaves_store_untouched() {
        let store = seeded();
        let mut batch = Batch::new();
        batch.relate(
            NodeKey::user("alice"),
            NodeKey::user("bob"),
            Edge::new(RelKind::IsFriendsWith),
        );
        batch.relate(
            NodeKey::user("alice"),
            NodeKey::user("nobody"),
            Edge::new(RelKind::IsFriendsWith),
        );

        assert!(store.apply(batch).is_err());
        store.with_graph(|g| assert_eq!(g.edge_count(), 0));
    }

    #[test]
    fn test_readers_never_see_half_a_friendship() {
        let store = Arc::new(seeded());

        let writer = {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for (a, b) in [("alice", "bob"), ("bob", "carol"), ("carol", "alice")] {
                    let mut batch = Batch::new();
                    batch.relate(
                        NodeKey::user(a),
                        NodeKey::user(b),
                        Edge::new(RelKind::IsFriendsWith),
                    );
                    store.apply(batch).unwrap();
                }
            })
        };

        for _ in 0..200 {
            let edges = store
                .read(|g| {
                    let mut total = 0;
                    for name in ["alice", "bob", "carol"] {
                        total += g
                            .related(&NodeKey::user(name), RelKind::IsFriendsWith, Direction::Outgoing)?
                            .count();
                    }
                    Ok(total)
                })
                .unwrap();
            assert_eq!(edges % 2, 0);
        }

        writer.join().unwrap();
        store.with_graph(|g| assert_eq!(g.edge_count(), 6));
    }
}
