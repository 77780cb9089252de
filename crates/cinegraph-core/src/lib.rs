//! Cinegraph Core - Domain model for the social-movie graph
//!
//! This crate defines the entities stored in the graph (movies, users,
//! people, genres, reviews), the typed relationships between them, and
//! the error taxonomy every other Cinegraph crate reports through.
//!
//! # Example
//!
//! ```
//! use cinegraph_core::{Movie, Node, NodeKey, NodeKind};
//!
//! let node = Node::Movie(Movie::new(1, "Inception", 2010));
//! assert_eq!(node.kind(), NodeKind::Movie);
//! assert_eq!(node.key(), NodeKey::movie("Inception"));
//! ```

mod error;
mod node;
mod relation;

pub use error::{EngineError, Result};
pub use node::{Genre, Movie, Node, NodeKey, NodeKind, Person, Review, Role, User};
pub use relation::{Edge, RelKind};
