//! Core graph data structure.
//!
//! `MovieGraph` wraps petgraph and adds indexes for fast lookups: a key
//! index per node kind, a movie-id index, and an n-gram index over review
//! text. It is the storage behind [`MemoryStore`](crate::MemoryStore).

use crate::search_index::SearchIndex;
use crate::store::{Batch, BatchReport, GraphView, Mutation, Related};
use cinegraph_core::{Edge, EngineError, Node, NodeKey, NodeKind, RelKind, Result};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::debug;

/// Unique identifier for a node in the graph.
pub type NodeId = NodeIndex;

/// The movie graph.
///
/// Nodes are unique per [`NodeKey`]. Edges are unique per
/// (source, target, kind); adding an existing edge again is a no-op.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct MovieGraph {
    /// The underlying petgraph graph.
    pub(crate) graph: DiGraph<Node, Edge>,

    /// Maps node keys to graph node indexes.
    #[serde(skip)]
    key_index: HashMap<NodeKey, NodeId>,

    /// Maps movie ids to movie nodes.
    #[serde(skip)]
    movie_ids: HashMap<u64, NodeId>,

    /// Substring index over review text.
    #[serde(skip)]
    review_text: SearchIndex,
}

impl MovieGraph {
    /// Creates a new empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets the node index for a key.
    pub fn node_id(&self, key: &NodeKey) -> Option<NodeId> {
        self.key_index.get(key).copied()
    }

    /// Gets a node by its graph index.
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.graph.node_weight(id)
    }

    /// Returns the number of nodes.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Returns the number of edges. A friendship counts twice.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Applies a batch of mutations atomically.
    ///
    /// The whole batch is validated first; if any mutation would fail the
    /// graph is left untouched.
    pub fn apply(&mut self, batch: Batch) -> Result<BatchReport> {
        self.validate(batch.ops())?;

        let mut report = BatchReport::default();
        for op in batch.into_ops() {
            match op {
                Mutation::UpsertNode(node) => {
                    if self.upsert(node) {
                        report.nodes_created += 1;
                    } else {
                        report.nodes_merged += 1;
                    }
                }
                Mutation::Relate { from, to, edge } => {
                    let source = self.require(&from)?;
                    let target = self.require(&to)?;
                    let reverse = edge.kind.is_symmetric().then(|| edge.clone());

                    report.count_edge(self.relate(source, target, edge));
                    if let Some(reverse) = reverse {
                        report.count_edge(self.relate(target, source, reverse));
                    }
                }
            }
        }

        debug!(
            "Applied batch: {} nodes created, {} merged, {} edges created, {} merged",
            report.nodes_created, report.nodes_merged, report.edges_created, report.edges_merged
        );
        Ok(report)
    }

    /// Checks every mutation against the current graph plus the nodes the
    /// batch itself introduces.
    fn validate(&self, ops: &[Mutation]) -> Result<()> {
        let mut pending: HashSet<NodeKey> = HashSet::new();
        let mut claimed_ids: HashMap<u64, String> = HashMap::new();
        let mut review_links: HashMap<(NodeKey, RelKind), NodeKey> = HashMap::new();
        let mut reviews: Vec<NodeKey> = Vec::new();

        for op in ops {
            match op {
                Mutation::UpsertNode(node) => {
                    if let Node::Movie(movie) = node {
                        let owner = claimed_ids
                            .get(&movie.movie_id)
                            .cloned()
                            .or_else(|| self.movie_title_for_id(movie.movie_id));
                        if let Some(owner) = owner {
                            if owner != movie.title {
                                return Err(EngineError::invalid(format!(
                                    "movieId {} already belongs to \"{}\"",
                                    movie.movie_id, owner
                                )));
                            }
                        }
                        claimed_ids.insert(movie.movie_id, movie.title.clone());
                    }
                    if node.kind() == NodeKind::Review {
                        reviews.push(node.key());
                    }
                    pending.insert(node.key());
                }
                Mutation::Relate { from, to, edge } => {
                    for key in [from, to] {
                        if !self.key_index.contains_key(key) && !pending.contains(key) {
                            return Err(EngineError::not_found(key));
                        }
                    }

                    let (source_kind, target_kind) = edge.kind.endpoints();
                    if from.kind != source_kind || to.kind != target_kind {
                        return Err(EngineError::invalid(format!(
                            "{} cannot connect a {} to a {}",
                            edge.kind, from.kind, to.kind
                        )));
                    }

                    if edge.kind.is_symmetric() && from == to {
                        return Err(EngineError::invalid(format!(
                            "{} cannot be {} itself",
                            from, edge.kind
                        )));
                    }

                    // A review has exactly one movie and exactly one author.
                    if matches!(edge.kind, RelKind::HasReview | RelKind::GaveReview) {
                        let link = (to.clone(), edge.kind);
                        let owner = review_links
                            .get(&link)
                            .cloned()
                            .or_else(|| self.review_owner(to, edge.kind));
                        if let Some(owner) = owner {
                            if &owner != from {
                                return Err(EngineError::invalid(format!(
                                    "{} is already linked to {} via {}",
                                    to, owner, edge.kind
                                )));
                            }
                        }
                        review_links.insert(link, from.clone());
                    }
                }
            }
        }

        // Every review leaves the batch with its movie and its author.
        for review in &reviews {
            for kind in [RelKind::HasReview, RelKind::GaveReview] {
                let linked = review_links.contains_key(&(review.clone(), kind))
                    || self.review_owner(review, kind).is_some();
                if !linked {
                    return Err(EngineError::invalid(format!(
                        "{} is missing its {} link",
                        review, kind
                    )));
                }
            }
        }

        Ok(())
    }

    fn movie_title_for_id(&self, movie_id: u64) -> Option<String> {
        let id = self.movie_ids.get(&movie_id)?;
        self.graph
            .node_weight(*id)
            .and_then(Node::as_movie)
            .map(|m| m.title.clone())
    }

    fn review_owner(&self, review: &NodeKey, kind: RelKind) -> Option<NodeKey> {
        let id = self.node_id(review)?;
        self.graph
            .edges_directed(id, Direction::Incoming)
            .find(|e| e.weight().kind == kind)
            .and_then(|e| self.graph.node_weight(e.source()))
            .map(Node::key)
    }

    fn require(&self, key: &NodeKey) -> Result<NodeId> {
        self.node_id(key).ok_or_else(|| {
            EngineError::Internal(format!("{} vanished after validation", key))
        })
    }

    /// Inserts a node or merges it into the existing node with the same key.
    ///
    /// Returns true if a new node was created.
    fn upsert(&mut self, node: Node) -> bool {
        let key = node.key();
        match self.key_index.get(&key).copied() {
            Some(id) => {
                self.unindex_node(id);
                if let Some(existing) = self.graph.node_weight_mut(id) {
                    existing.merge(node);
                }
                self.index_node(id);
                false
            }
            None => {
                let id = self.graph.add_node(node);
                self.index_node(id);
                true
            }
        }
    }

    /// Adds an edge unless one of the same kind already connects the pair.
    ///
    /// An existing edge keeps its timestamp; a missing one is filled in.
    /// Returns true if a new edge was created.
    fn relate(&mut self, from: NodeId, to: NodeId, edge: Edge) -> bool {
        let existing = self
            .graph
            .edges_connecting(from, to)
            .find(|e| e.weight().kind == edge.kind)
            .map(|e| e.id());

        match existing {
            Some(edge_id) => {
                if let Some(weight) = self.graph.edge_weight_mut(edge_id) {
                    if weight.timestamp.is_none() {
                        weight.timestamp = edge.timestamp;
                    }
                }
                false
            }
            None => {
                self.graph.add_edge(from, to, edge);
                true
            }
        }
    }

    fn index_node(&mut self, id: NodeId) {
        let Some(node) = self.graph.node_weight(id) else {
            return;
        };

        self.key_index.insert(node.key(), id);
        match node {
            Node::Movie(movie) => {
                self.movie_ids.insert(movie.movie_id, id);
            }
            Node::Review(review) => self.review_text.insert(&review.text, id),
            _ => {}
        }
    }

    fn unindex_node(&mut self, id: NodeId) {
        match self.graph.node_weight(id) {
            Some(Node::Movie(movie)) => {
                self.movie_ids.remove(&movie.movie_id);
            }
            Some(Node::Review(_)) => self.review_text.remove(id),
            _ => {}
        }
    }

    /// Rebuilds every index from the node weights.
    ///
    /// Indexes are not serialized, so this runs after loading a snapshot.
    pub fn rebuild_indexes(&mut self) {
        self.key_index.clear();
        self.movie_ids.clear();
        self.review_text = SearchIndex::new();

        let ids: Vec<NodeId> = self.graph.node_indices().collect();
        for id in ids {
            self.index_node(id);
        }
    }

    /// Returns graph statistics.
    pub fn stats(&self) -> GraphStats {
        let mut nodes = BTreeMap::new();
        for node in self.graph.node_weights() {
            *nodes.entry(node.kind()).or_insert(0) += 1;
        }

        let mut edges = BTreeMap::new();
        for edge in self.graph.edge_weights() {
            *edges.entry(edge.kind).or_insert(0) += 1;
        }

        GraphStats {
            node_count: self.node_count(),
            edge_count: self.edge_count(),
            nodes,
            edges,
        }
    }
}

impl GraphView for MovieGraph {
    fn get_node(&self, key: &NodeKey) -> Result<&Node> {
        self.node_id(key)
            .and_then(|id| self.graph.node_weight(id))
            .ok_or_else(|| EngineError::not_found(key))
    }

    fn related<'a>(
        &'a self,
        key: &NodeKey,
        rel: RelKind,
        direction: Direction,
    ) -> Result<Box<dyn Iterator<Item = Related<'a>> + 'a>> {
        let id = self
            .node_id(key)
            .ok_or_else(|| EngineError::not_found(key))?;

        let iter = self
            .graph
            .edges_directed(id, direction)
            .filter(move |e| e.weight().kind == rel)
            .filter_map(move |e| {
                let other = match direction {
                    Direction::Outgoing => e.target(),
                    Direction::Incoming => e.source(),
                };
                self.graph.node_weight(other).map(|node| Related {
                    node,
                    edge: e.weight(),
                })
            });

        Ok(Box::new(iter))
    }

    fn nodes<'a>(&'a self, kind: NodeKind) -> Box<dyn Iterator<Item = &'a Node> + 'a> {
        Box::new(self.graph.node_weights().filter(move |n| n.kind() == kind))
    }

    fn reviews_containing(&self, needle: &str) -> Vec<&Node> {
        self.review_text
            .search(needle)
            .into_iter()
            .filter_map(|id| self.graph.node_weight(id))
            .collect()
    }
}

/// Graph statistics for the stats command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphStats {
    pub node_count: usize,
    pub edge_count: usize,
    pub nodes: BTreeMap<NodeKind, usize>,
    pub edges: BTreeMap<RelKind, usize>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use cinegraph_core::{Genre, Movie, Review, User};

    fn user(name: &str) -> Node {
        Node::from(User::new(name, name.to_uppercase(), format!("{}@example.com", name)))
    }

    /// Adds a review of `title` by `author` together with both of its links.
    fn add_review(batch: &mut Batch, review: Review, title: &str, author: &str) {
        let key = NodeKey::review(review.review_id);
        batch.upsert(review);
        batch.relate(NodeKey::movie(title), key.clone(), Edge::new(RelKind::HasReview));
        batch.relate(NodeKey::user(author), key, Edge::new(RelKind::GaveReview));
    }

    #[test]
    fn test_upsert_is_keyed() {
        let mut graph = MovieGraph::new();
        let mut batch = Batch::new();
        batch.upsert(Movie::new(1, "Heat", 1995));
        batch.upsert(Movie::new(1, "Heat", 1995));
        let report = graph.apply(batch).unwrap();

        assert_eq!(report.nodes_created, 1);
        assert_eq!(report.nodes_merged, 1);
        assert_eq!(graph.node_count(), 1);
    }

    #[test]
    fn test_relate_missing_endpoint_is_not_found() {
        let mut graph = MovieGraph::new();
        let mut batch = Batch::new();
        batch.upsert(Genre::new("Drama"));
        batch.relate(
            NodeKey::movie("Nowhere"),
            NodeKey::genre("Drama"),
            Edge::new(RelKind::InGenre),
        );

        let err = graph.apply(batch).unwrap_err();
        assert_eq!(err, EngineError::not_found(&NodeKey::movie("Nowhere")));
        // Nothing from the failed batch was applied.
        assert_eq!(graph.node_count(), 0);
    }

    #[test]
    fn test_symmetric_edges_written_in_pairs() {
        let mut graph = MovieGraph::new();
        let mut batch = Batch::new();
        batch.upsert(user("alice"));
        batch.upsert(user("bob"));
        batch.relate(
            NodeKey::user("alice"),
            NodeKey::user("bob"),
            Edge::new(RelKind::IsFriendsWith),
        );
        let report = graph.apply(batch).unwrap();
        assert_eq!(report.edges_created, 2);

        let from_bob: Vec<_> = graph
            .related(&NodeKey::user("bob"), RelKind::IsFriendsWith, Direction::Outgoing)
            .unwrap()
            .map(|r| r.node.key())
            .collect();
        assert_eq!(from_bob, vec![NodeKey::user("alice")]);
    }

    #[test]
    fn test_duplicate_edge_is_merged() {
        let mut graph = MovieGraph::new();
        let mut batch = Batch::new();
        batch.upsert(Movie::new(1, "Heat", 1995));
        batch.upsert(Genre::new("Crime"));
        graph.apply(batch).unwrap();

        for _ in 0..2 {
            let mut batch = Batch::new();
            batch.relate(
                NodeKey::movie("Heat"),
                NodeKey::genre("Crime"),
                Edge::new(RelKind::InGenre),
            );
            graph.apply(batch).unwrap();
        }

        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_self_friendship_rejected() {
        let mut graph = MovieGraph::new();
        let mut batch = Batch::new();
        batch.upsert(user("alice"));
        batch.relate(
            NodeKey::user("alice"),
            NodeKey::user("alice"),
            Edge::new(RelKind::IsFriendsWith),
        );

        assert!(matches!(
            graph.apply(batch),
            Err(EngineError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_wrong_endpoint_kinds_rejected() {
        let mut graph = MovieGraph::new();
        let mut batch = Batch::new();
        batch.upsert(user("alice"));
        batch.upsert(Genre::new("Drama"));
        batch.relate(
            NodeKey::user("alice"),
            NodeKey::genre("Drama"),
            Edge::new(RelKind::WantsToWatch),
        );

        assert!(matches!(
            graph.apply(batch),
            Err(EngineError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_movie_id_must_stay_unique() {
        let mut graph = MovieGraph::new();
        let mut batch = Batch::new();
        batch.upsert(Movie::new(1, "Heat", 1995));
        graph.apply(batch).unwrap();

        let mut batch = Batch::new();
        batch.upsert(Movie::new(1, "Ronin", 1998));
        assert!(matches!(
            graph.apply(batch),
            Err(EngineError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_review_has_single_movie() {
        let mut graph = MovieGraph::new();
        let mut batch = Batch::new();
        batch.upsert(Movie::new(1, "Heat", 1995));
        batch.upsert(Movie::new(2, "Ronin", 1998));
        batch.upsert(user("alice"));
        add_review(&mut batch, Review::new(10, "Tense", 4.0), "Heat", "alice");
        graph.apply(batch).unwrap();

        let mut batch = Batch::new();
        batch.relate(
            NodeKey::movie("Ronin"),
            NodeKey::review(10),
            Edge::new(RelKind::HasReview),
        );
        assert!(matches!(
            graph.apply(batch),
            Err(EngineError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_review_needs_movie_and_author() {
        let mut graph = MovieGraph::new();

        // No links at all
        let mut batch = Batch::new();
        batch.upsert(Review::new(8, "Orphaned", 3.0));
        assert!(matches!(
            graph.apply(batch),
            Err(EngineError::InvalidArgument(_))
        ));
        assert_eq!(graph.node_count(), 0);

        // A movie but no author
        let mut batch = Batch::new();
        batch.upsert(Movie::new(1, "Heat", 1995));
        batch.upsert(Review::new(7, "Great movie!", 5.0));
        batch.relate(
            NodeKey::movie("Heat"),
            NodeKey::review(7),
            Edge::new(RelKind::HasReview),
        );
        assert!(matches!(
            graph.apply(batch),
            Err(EngineError::InvalidArgument(_))
        ));
        assert_eq!(graph.node_count(), 0);
    }

    #[test]
    fn test_existing_review_keeps_links_on_update() {
        let mut graph = MovieGraph::new();
        let mut batch = Batch::new();
        batch.upsert(Movie::new(1, "Heat", 1995));
        batch.upsert(user("alice"));
        add_review(&mut batch, Review::new(7, "Great movie!", 5.0), "Heat", "alice");
        graph.apply(batch).unwrap();

        // Re-upserting a linked review needs no new links
        let mut batch = Batch::new();
        batch.upsert(Review::new(7, "Great movie, long though", 4.0));
        let report = graph.apply(batch).unwrap();
        assert_eq!(report.nodes_merged, 1);
        assert_eq!(graph.reviews_containing("long").len(), 1);
    }

    #[test]
    fn test_review_text_is_searchable_after_rebuild() {
        let mut graph = MovieGraph::new();
        let mut batch = Batch::new();
        batch.upsert(Movie::new(1, "Heat", 1995));
        batch.upsert(user("alice"));
        add_review(&mut batch, Review::new(1, "Great movie!", 5.0), "Heat", "alice");
        graph.apply(batch).unwrap();

        graph.rebuild_indexes();
        assert_eq!(graph.reviews_containing("great").len(), 1);
        assert!(graph.get_node(&NodeKey::review(1)).is_ok());
    }

    #[test]
    fn test_stats_by_kind() {
        let mut graph = MovieGraph::new();
        let mut batch = Batch::new();
        batch.upsert(user("alice"));
        batch.upsert(user("bob"));
        batch.upsert(Movie::new(1, "Heat", 1995));
        batch.relate(
            NodeKey::user("alice"),
            NodeKey::user("bob"),
            Edge::new(RelKind::IsFriendsWith),
        );
        graph.apply(batch).unwrap();

        let stats = graph.stats();
        assert_eq!(stats.node_count, 3);
        assert_eq!(stats.nodes[&NodeKind::User], 2);
        assert_eq!(stats.edges[&RelKind::IsFriendsWith], 2);
    }
}
