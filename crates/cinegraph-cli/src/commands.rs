//! CLI command implementations.

use cinegraph_graph::{Dataset, GraphBuilder, MemoryStore, SnapshotStore};
use cinegraph_query::{EngineConfig, QueryEngine};
use colored::Colorize;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// The snapshot on disk and an engine over its contents.
pub struct Session {
    snapshot: SnapshotStore,
    engine: QueryEngine,
}

impl Session {
    /// Opens the snapshot database and loads the graph it holds, if any.
    pub fn open(db: Option<&Path>, config: Option<&Path>) -> Result<Self> {
        let db_path = match db {
            Some(path) => path.to_path_buf(),
            None => default_db_path()?,
        };
        debug!("Using snapshot at {}", db_path.display());

        let config = match config {
            Some(path) => EngineConfig::from_json(&fs::read_to_string(path)?)?,
            None => EngineConfig::default(),
        };
        config.validate()?;

        let snapshot = SnapshotStore::open(&db_path)?;
        let store = match snapshot.load()? {
            Some(graph) => MemoryStore::from_graph(graph),
            None => MemoryStore::new(),
        };

        Ok(Self {
            snapshot,
            engine: QueryEngine::with_config(Arc::new(store), config),
        })
    }

    /// Runs a read-only operation and prints its result.
    ///
    /// The operation runs on a blocking thread; Ctrl-C cancels it.
    pub async fn query<T, F>(&self, op: F) -> Result<()>
    where
        T: Serialize + Send + 'static,
        F: FnOnce(&QueryEngine, &CancellationToken) -> cinegraph_core::Result<T> + Send + 'static,
    {
        let cancel = CancellationToken::new();
        let interrupt = {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("Interrupted, cancelling");
                    cancel.cancel();
                }
            })
        };

        let engine = self.engine.clone();
        let result = tokio::task::spawn_blocking(move || op(&engine, &cancel)).await;
        interrupt.abort();

        print_json(&result??)
    }

    /// Runs a mutation, prints its result and saves the snapshot.
    pub async fn mutate<T, F>(&self, op: F) -> Result<()>
    where
        T: Serialize + Send + 'static,
        F: FnOnce(&QueryEngine) -> cinegraph_core::Result<T> + Send + 'static,
    {
        self.query(move |engine, _| op(engine)).await?;
        self.save()
    }

    fn save(&self) -> Result<()> {
        self.engine
            .store()
            .with_graph(|graph| self.snapshot.save(graph))?;
        Ok(())
    }
}

/// Replaces the snapshot with a freshly built dataset.
pub fn load(session: &Session, path: &Path) -> Result<()> {
    println!("{}", "Loading dataset...".cyan());

    let dataset = Dataset::from_path(path)?;
    let graph = GraphBuilder::new().dataset(dataset).build_graph()?;
    session.snapshot.save(&graph)?;

    println!(
        "{} Loaded {} nodes and {} edges from {}",
        "✓".green(),
        graph.node_count().to_string().cyan(),
        graph.edge_count().to_string().cyan(),
        path.display()
    );

    Ok(())
}

/// Deletes the stored snapshot. The next run starts from an empty graph.
pub fn reset(session: &Session) -> Result<()> {
    session.snapshot.clear()?;
    println!("{} Cleared snapshot", "✓".green());
    Ok(())
}

/// Prints node and edge counts by kind.
pub fn stats(session: &Session) -> Result<()> {
    let stats = session.engine.store().with_graph(|graph| graph.stats());

    println!("{}", "Cinegraph Status".cyan().bold());
    println!();
    println!("  {} {}", "Nodes:".dimmed(), stats.node_count);
    for (kind, count) in &stats.nodes {
        println!("    {} {}", format!("{}:", kind).dimmed(), count);
    }
    println!("  {} {}", "Edges:".dimmed(), stats.edge_count);
    for (kind, count) in &stats.edges {
        println!("    {} {}", format!("{}:", kind).dimmed(), count);
    }

    if stats.node_count == 0 {
        println!();
        println!("  Run {} to load a dataset", "cinegraph load".cyan());
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn default_db_path() -> Result<PathBuf> {
    let data_dir = dirs::data_dir().ok_or("could not determine the data directory")?;
    Ok(data_dir.join("cinegraph").join("snapshot"))
}
