//! Cinegraph Query - Named social-movie queries
//!
//! This crate is the façade an API layer calls into. Each operation on
//! [`QueryEngine`] validates its input, reads or writes the graph store,
//! and returns a structured result that serializes in camelCase.
//!
//! Supported queries:
//! - Movie lookups by title, director, actor and genre
//! - Friend lists, friend networks of a given degree
//! - Hottest movies and recommendations across the friend network
//! - Keyword search over review text
//!
//! # Example
//!
//! ```
//! use cinegraph_core::User;
//! use cinegraph_graph::{GraphBuilder, MemoryStore};
//! use cinegraph_query::QueryEngine;
//! use std::sync::Arc;
//!
//! let store = MemoryStore::new();
//! GraphBuilder::new()
//!     .user(User::new("alice", "Alice", "alice@example.com"))
//!     .user(User::new("bob", "Bob", "bob@example.com"))
//!     .load_into(&store)
//!     .unwrap();
//!
//! let engine = QueryEngine::new(Arc::new(store));
//! engine.connect_friends("alice", "bob").unwrap();
//!
//! let network = engine.find_friends_network("alice", "1").unwrap();
//! assert_eq!(network[0].person.user_name, "bob");
//! assert_eq!(network[0].degree, 1);
//! ```

mod config;
mod engine;
mod results;
mod validate;

pub use config::{EngineConfig, HOTTEST_LIMIT, HOTTEST_MAX_DEGREE, RECOMMENDATION_MAX_DEGREE};
pub use engine::QueryEngine;
pub use results::{
    Friendship, HotMovie, KeywordMatch, MovieDetails, MovieGenres, MovieReview, MovieSummary,
    NetworkMember, Recommendation, ReviewSummary, UserProfile, UserReview, WatchlistEntry,
};
pub use validate::{check_keyword, parse_degree};
