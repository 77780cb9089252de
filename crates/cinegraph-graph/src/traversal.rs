//! Bounded breadth-first traversal over a single relationship type.
//!
//! Every reached node is tagged with the smallest number of hops needed to
//! reach it. A node is expanded at most once, which keeps the walk linear in
//! the reachable subgraph and makes it terminate on cyclic friend graphs.

use crate::store::GraphView;
use cinegraph_core::{EngineError, NodeKey, RelKind, Result};
use petgraph::Direction;
use std::collections::{HashMap, VecDeque};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Nodes reached by a traversal, mapped to their minimum degree.
pub type Reachable = HashMap<NodeKey, u32>;

/// Walks `rel` edges outward from `start`, up to `max_depth` hops.
///
/// The start node is never part of the result, even when a cycle leads
/// back to it. Fails with `InvalidArgument` for a zero depth, `NotFound`
/// for an unknown start, and `Cancelled` once `cancel` fires.
pub fn bfs_by_relation(
    graph: &dyn GraphView,
    start: &NodeKey,
    rel: RelKind,
    max_depth: u32,
    cancel: &CancellationToken,
) -> Result<Reachable> {
    if max_depth == 0 {
        return Err(EngineError::invalid("traversal depth must be at least 1"));
    }
    graph.get_node(start)?;

    let mut visited: HashMap<NodeKey, u32> = HashMap::new();
    let mut queue: VecDeque<(NodeKey, u32)> = VecDeque::new();

    visited.insert(start.clone(), 0);
    queue.push_back((start.clone(), 0));

    while let Some((current, depth)) = queue.pop_front() {
        if cancel.is_cancelled() {
            debug!("Traversal from {} cancelled at depth {}", start, depth);
            return Err(EngineError::Cancelled);
        }

        if depth >= max_depth {
            continue;
        }

        for related in graph.related(&current, rel, Direction::Outgoing)? {
            let key = related.node.key();
            if !visited.contains_key(&key) {
                visited.insert(key.clone(), depth + 1);
                queue.push_back((key, depth + 1));
            }
        }
    }

    visited.remove(start);
    debug!(
        "Traversal from {} over {} (depth {}) reached {} nodes",
        start,
        rel,
        max_depth,
        visited.len()
    );

    Ok(visited)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Batch;
    use crate::MovieGraph;
    use cinegraph_core::{Edge, User};

    fn friends(pairs: &[(&str, &str)]) -> MovieGraph {
        let mut batch = Batch::new();
        for (a, b) in pairs {
            for name in [a, b] {
                batch.upsert(User::new(*name, *name, format!("{}@example.com", name)));
            }
            batch.relate(
                NodeKey::user(*a),
                NodeKey::user(*b),
                Edge::new(RelKind::IsFriendsWith),
            );
        }

        let mut graph = MovieGraph::new();
        graph.apply(batch).unwrap();
        graph
    }

    fn walk(graph: &MovieGraph, start: &str, depth: u32) -> Result<Reachable> {
        bfs_by_relation(
            graph,
            &NodeKey::user(start),
            RelKind::IsFriendsWith,
            depth,
            &CancellationToken::new(),
        )
    }

    #[test]
    fn test_degrees_are_shortest_paths() {
        // alice - bob - carol - dan, plus a shortcut alice - carol
        let graph = friends(&[
            ("alice", "bob"),
            ("bob", "carol"),
            ("carol", "dan"),
            ("alice", "carol"),
        ]);

        let reached = walk(&graph, "alice", 5).unwrap();
        assert_eq!(reached[&NodeKey::user("bob")], 1);
        assert_eq!(reached[&NodeKey::user("carol")], 1);
        assert_eq!(reached[&NodeKey::user("dan")], 2);
        assert_eq!(reached.len(), 3);
    }

    #[test]
    fn test_start_excluded_on_cycle() {
        let graph = friends(&[("a", "b"), ("b", "c"), ("c", "a")]);

        let reached = walk(&graph, "a", 10).unwrap();
        assert!(!reached.contains_key(&NodeKey::user("a")));
        assert_eq!(reached.len(), 2);
    }

    #[test]
    fn test_max_depth_limit() {
        let graph = friends(&[("a", "b"), ("b", "c"), ("c", "d"), ("d", "e")]);

        let reached = walk(&graph, "a", 2).unwrap();
        assert_eq!(reached.len(), 2);
        assert!(reached.contains_key(&NodeKey::user("c")));
        assert!(!reached.contains_key(&NodeKey::user("d")));
    }

    #[test]
    fn test_zero_depth_rejected() {
        let graph = friends(&[("a", "b")]);
        assert!(matches!(
            walk(&graph, "a", 0),
            Err(EngineError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_unknown_start_not_found() {
        let graph = friends(&[("a", "b")]);
        assert_eq!(
            walk(&graph, "zed", 1),
            Err(EngineError::not_found(&NodeKey::user("zed")))
        );
    }

    #[test]
    fn test_isolated_user_reaches_nobody() {
        let mut graph = friends(&[("a", "b")]);
        let mut batch = Batch::new();
        batch.upsert(User::new("loner", "Loner", "loner@example.com"));
        graph.apply(batch).unwrap();

        assert!(walk(&graph, "loner", 3).unwrap().is_empty());
    }

    #[test]
    fn test_cancelled_traversal() {
        let graph = friends(&[("a", "b")]);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = bfs_by_relation(
            &graph,
            &NodeKey::user("a"),
            RelKind::IsFriendsWith,
            3,
            &cancel,
        );
        assert_eq!(result, Err(EngineError::Cancelled));
    }
}
