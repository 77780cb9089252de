//! Graph builder for seeding a store from a dataset.
//!
//! The builder collects nodes and relationships in any order and emits
//! them as a single [`Batch`]: all nodes first, then all edges, so an edge
//! may be declared before the nodes it connects.

use crate::graph::MovieGraph;
use crate::store::{Batch, GraphStore};
use chrono::{DateTime, Utc};
use cinegraph_core::{
    Edge, Genre, Movie, Node, NodeKey, Person, RelKind, Result, Review, Role, User,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A serialized social-movie graph.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Dataset {
    pub genres: Vec<String>,
    pub movies: Vec<MovieRecord>,
    pub users: Vec<UserRecord>,
    pub friendships: Vec<FriendshipRecord>,
    pub watch_intents: Vec<WatchIntentRecord>,
    pub reviews: Vec<ReviewRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieRecord {
    pub movie_id: u64,
    pub title: String,
    pub release_year: i32,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub directors: Vec<String>,
    #[serde(default)]
    pub actors: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub user_name: String,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendshipRecord {
    pub user1: String,
    pub user2: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchIntentRecord {
    pub user_name: String,
    pub title: String,
    pub added_on: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRecord {
    pub review_id: u64,
    pub user_name: String,
    pub title: String,
    pub text: String,
    pub rating: f32,
    pub review_date: Option<DateTime<Utc>>,
}

impl Dataset {
    /// Parses a dataset from JSON text.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Reads and parses a dataset file.
    pub fn from_path(path: impl AsRef<Path>) -> std::result::Result<Self, DatasetError> {
        let text = std::fs::read_to_string(path)?;
        Ok(Self::from_json(&text)?)
    }
}

/// Failure to read a dataset file.
#[derive(thiserror::Error, Debug)]
pub enum DatasetError {
    #[error("Failed to read dataset: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed dataset: {0}")]
    Json(#[from] serde_json::Error),
}

/// Builds a mutation batch from entities and relationships.
#[derive(Debug, Default)]
pub struct GraphBuilder {
    nodes: Vec<Node>,
    edges: Vec<(NodeKey, NodeKey, Edge)>,
}

impl GraphBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn movie(mut self, movie: Movie) -> Self {
        self.nodes.push(movie.into());
        self
    }

    pub fn genre(mut self, name: &str) -> Self {
        self.nodes.push(Genre::new(name).into());
        self
    }

    pub fn user(mut self, user: User) -> Self {
        self.nodes.push(user.into());
        self
    }

    /// Records that `name` directed `title`.
    pub fn director(self, name: &str, title: &str) -> Self {
        self.credit(name, Role::Director, RelKind::Directs, title)
    }

    /// Records that `name` acted in `title`.
    pub fn actor(self, name: &str, title: &str) -> Self {
        self.credit(name, Role::Actor, RelKind::ActsIn, title)
    }

    fn credit(mut self, name: &str, role: Role, kind: RelKind, title: &str) -> Self {
        self.nodes.push(Person::new(name).with_role(role).into());
        self.edges.push((
            NodeKey::person(name),
            NodeKey::movie(title),
            Edge::new(kind),
        ));
        self
    }

    pub fn in_genre(mut self, title: &str, genre: &str) -> Self {
        self.edges.push((
            NodeKey::movie(title),
            NodeKey::genre(genre),
            Edge::new(RelKind::InGenre),
        ));
        self
    }

    pub fn friends(mut self, user1: &str, user2: &str) -> Self {
        self.edges.push((
            NodeKey::user(user1),
            NodeKey::user(user2),
            Edge::new(RelKind::IsFriendsWith),
        ));
        self
    }

    pub fn wants_to_watch(
        mut self,
        user_name: &str,
        title: &str,
        added_on: Option<DateTime<Utc>>,
    ) -> Self {
        self.edges.push((
            NodeKey::user(user_name),
            NodeKey::movie(title),
            Edge {
                kind: RelKind::WantsToWatch,
                timestamp: added_on,
            },
        ));
        self
    }

    /// Adds a review written by `user_name` about `title`.
    pub fn review(
        mut self,
        user_name: &str,
        title: &str,
        review: Review,
        review_date: Option<DateTime<Utc>>,
    ) -> Self {
        let key = NodeKey::review(review.review_id);
        self.nodes.push(review.into());
        self.edges.push((
            NodeKey::movie(title),
            key.clone(),
            Edge::new(RelKind::HasReview),
        ));
        self.edges.push((
            NodeKey::user(user_name),
            key,
            Edge {
                kind: RelKind::GaveReview,
                timestamp: review_date,
            },
        ));
        self
    }

    /// Adds everything in a dataset.
    pub fn dataset(mut self, dataset: Dataset) -> Self {
        for genre in &dataset.genres {
            self = self.genre(genre);
        }

        for record in dataset.movies {
            let title = record.title.clone();
            self = self.movie(Movie::new(record.movie_id, &record.title, record.release_year));
            for genre in &record.genres {
                self = self.genre(genre).in_genre(&title, genre);
            }
            for name in &record.directors {
                self = self.director(name, &title);
            }
            for name in &record.actors {
                self = self.actor(name, &title);
            }
        }

        for record in dataset.users {
            self = self.user(User::new(record.user_name, record.name, record.email));
        }

        for record in &dataset.friendships {
            self = self.friends(&record.user1, &record.user2);
        }

        for record in &dataset.watch_intents {
            self = self.wants_to_watch(&record.user_name, &record.title, record.added_on);
        }

        for record in dataset.reviews {
            let review = Review::new(record.review_id, record.text, record.rating);
            self = self.review(&record.user_name, &record.title, review, record.review_date);
        }

        self
    }

    /// Finishes building and returns the batch: nodes first, then edges.
    pub fn build(self) -> Batch {
        let mut batch = Batch::new();
        for node in self.nodes {
            batch.upsert(node);
        }
        for (from, to, edge) in self.edges {
            batch.relate(from, to, edge);
        }
        batch
    }

    /// Builds a standalone graph.
    pub fn build_graph(self) -> Result<MovieGraph> {
        let mut graph = MovieGraph::new();
        graph.apply(self.build())?;
        Ok(graph)
    }

    /// Applies the built batch to a store.
    pub fn load_into<S: GraphStore>(self, store: &S) -> Result<()> {
        store.apply(self.build()).map(|_| ())
    }
}
