//! Cinegraph Graph - Storage and algorithms for the social-movie graph
//!
//! This crate holds the movie graph and answers the low-level questions the
//! query façade is built from: key lookups, related-node walks, bounded
//! breadth-first traversal, and distinct-contributor ranking.
//!
//! # Architecture
//!
//! The graph uses petgraph internally with additional indexes for:
//! - Key lookups per node kind
//! - Movie-id uniqueness
//! - Substring search over review text
//!
//! All writes go through a [`Batch`], which the store validates in full
//! before applying, so concurrent readers never see half of a mutation.
//!
//! # Example
//!
//! ```
//! use cinegraph_graph::{GraphBuilder, GraphStore, MemoryStore, bfs_by_relation};
//! use cinegraph_core::{NodeKey, RelKind, User};
//! use tokio_util::sync::CancellationToken;
//!
//! let store = MemoryStore::new();
//! GraphBuilder::new()
//!     .user(User::new("alice", "Alice", "alice@example.com"))
//!     .user(User::new("bob", "Bob", "bob@example.com"))
//!     .friends("alice", "bob")
//!     .load_into(&store)
//!     .unwrap();
//!
//! let reached = store
//!     .read(|g| {
//!         bfs_by_relation(
//!             g,
//!             &NodeKey::user("alice"),
//!             RelKind::IsFriendsWith,
//!             2,
//!             &CancellationToken::new(),
//!         )
//!     })
//!     .unwrap();
//! assert_eq!(reached[&NodeKey::user("bob")], 1);
//! ```

mod builder;
mod graph;
mod ranking;
mod search_index;
mod snapshot;
mod store;
mod traversal;

pub use builder::{
    Dataset, DatasetError, FriendshipRecord, GraphBuilder, MovieRecord, ReviewRecord, UserRecord,
    WatchIntentRecord,
};
pub use graph::{GraphStats, MovieGraph, NodeId};
pub use petgraph::Direction;
pub use ranking::{aggregate_and_rank, collect_provenance, Provenance, Ranked};
pub use snapshot::{SnapshotError, SnapshotStore};
pub use store::{Batch, BatchReport, GraphStore, GraphView, MemoryStore, Mutation, Related};
pub use traversal::{bfs_by_relation, Reachable};
