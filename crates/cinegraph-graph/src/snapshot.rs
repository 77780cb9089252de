//! Whole-graph snapshots in a sled database.
//!
//! The graph is serialized with bincode under a single key. Indexes are not
//! stored; they are rebuilt on load.

use crate::graph::MovieGraph;
use cinegraph_core::EngineError;
use sled::Db;
use std::path::Path;
use thiserror::Error;
use tracing::info;

const SNAPSHOT_KEY: &str = "movie_graph";

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("Database error: {0}")]
    Sled(#[from] sled::Error),
    #[error("Serialization error: {0}")]
    Bincode(#[from] bincode::Error),
}

impl From<SnapshotError> for EngineError {
    fn from(err: SnapshotError) -> Self {
        EngineError::StoreUnavailable(err.to_string())
    }
}

pub struct SnapshotStore {
    db: Db,
}

impl SnapshotStore {
    /// Opens or creates a snapshot store at the specified path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, SnapshotError> {
        let db = sled::open(path)?;
        Ok(Self { db })
    }

    /// Saves the entire graph, replacing any previous snapshot.
    pub fn save(&self, graph: &MovieGraph) -> Result<(), SnapshotError> {
        let bytes = bincode::serialize(graph)?;
        self.db.insert(SNAPSHOT_KEY, bytes)?;
        self.db.flush()?;
        info!(
            "Saved snapshot ({} nodes, {} edges)",
            graph.node_count(),
            graph.edge_count()
        );
        Ok(())
    }

    /// Loads the graph, if a snapshot exists.
    pub fn load(&self) -> Result<Option<MovieGraph>, SnapshotError> {
        match self.db.get(SNAPSHOT_KEY)? {
            Some(bytes) => {
                let mut graph: MovieGraph = bincode::deserialize(&bytes)?;
                graph.rebuild_indexes();
                Ok(Some(graph))
            }
            None => Ok(None),
        }
    }

    /// Clears the stored snapshot.
    pub fn clear(&self) -> Result<(), SnapshotError> {
        self.db.remove(SNAPSHOT_KEY)?;
        self.db.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::GraphBuilder;
    use crate::store::GraphView;
    use cinegraph_core::{Movie, NodeKey, Review, User};
    use tempfile::tempdir;

    #[test]
    fn test_save_load_graph() {
        let dir = tempdir().unwrap();
        let store = SnapshotStore::open(dir.path()).unwrap();

        let graph = GraphBuilder::new()
            .movie(Movie::new(1, "Heat", 1995))
            .user(User::new("alice", "Alice", "alice@example.com"))
            .review("alice", "Heat", Review::new(1, "Great movie!", 5.0), None)
            .build_graph()
            .unwrap();
        store.save(&graph).unwrap();

        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.node_count(), 3);
        assert_eq!(loaded.edge_count(), 2);
        assert!(loaded.get_node(&NodeKey::movie("Heat")).is_ok());
        assert_eq!(loaded.reviews_containing("GREAT").len(), 1);
    }

    #[test]
    fn test_load_empty_and_clear() {
        let dir = tempdir().unwrap();
        let store = SnapshotStore::open(dir.path()).unwrap();
        assert!(store.load().unwrap().is_none());

        store.save(&MovieGraph::new()).unwrap();
        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
    }
}
