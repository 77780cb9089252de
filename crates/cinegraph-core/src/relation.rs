//! Relationship types for the movie graph.
//!
//! Edges are directed. Each kind fixes the node kinds it may connect,
//! which the store checks before applying a mutation.

use crate::node::NodeKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The type of relationship between two nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RelKind {
    /// Person directed movie.
    Directs,

    /// Person acted in movie.
    ActsIn,

    /// Movie belongs to genre.
    InGenre,

    /// Movie has review.
    HasReview,

    /// User is friends with user. Always stored as a pair of opposite edges.
    IsFriendsWith,

    /// User wants to watch movie.
    WantsToWatch,

    /// User wrote review.
    GaveReview,
}

impl RelKind {
    /// The (source, target) node kinds this relationship connects.
    pub fn endpoints(&self) -> (NodeKind, NodeKind) {
        match self {
            Self::Directs | Self::ActsIn => (NodeKind::Person, NodeKind::Movie),
            Self::InGenre => (NodeKind::Movie, NodeKind::Genre),
            Self::HasReview => (NodeKind::Movie, NodeKind::Review),
            Self::IsFriendsWith => (NodeKind::User, NodeKind::User),
            Self::WantsToWatch => (NodeKind::User, NodeKind::Movie),
            Self::GaveReview => (NodeKind::User, NodeKind::Review),
        }
    }

    /// Symmetric relationships are written in both directions at once.
    pub fn is_symmetric(&self) -> bool {
        matches!(self, Self::IsFriendsWith)
    }
}

impl std::fmt::Display for RelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Directs => "directs",
            Self::ActsIn => "actsIn",
            Self::InGenre => "inGenre",
            Self::HasReview => "hasReview",
            Self::IsFriendsWith => "isFriendsWith",
            Self::WantsToWatch => "wantsToWatch",
            Self::GaveReview => "gaveReview",
        };
        write!(f, "{}", s)
    }
}

/// An edge in the movie graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    /// The kind of relationship.
    pub kind: RelKind,

    /// When the relationship was recorded: `addedOn` for watch intents,
    /// `reviewDate` for reviews.
    pub timestamp: Option<DateTime<Utc>>,
}

impl Edge {
    /// Creates a new edge.
    pub fn new(kind: RelKind) -> Self {
        Self {
            kind,
            timestamp: None,
        }
    }

    /// Creates an edge stamped with a time.
    pub fn at(kind: RelKind, timestamp: DateTime<Utc>) -> Self {
        Self {
            kind,
            timestamp: Some(timestamp),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_friendship_is_the_only_symmetric_kind() {
        assert!(RelKind::IsFriendsWith.is_symmetric());
        assert!(!RelKind::WantsToWatch.is_symmetric());
        assert!(!RelKind::Directs.is_symmetric());
    }

    #[test]
    fn test_endpoints() {
        assert_eq!(
            RelKind::ActsIn.endpoints(),
            (NodeKind::Person, NodeKind::Movie)
        );
        assert_eq!(
            RelKind::GaveReview.endpoints(),
            (NodeKind::User, NodeKind::Review)
        );
    }

    #[test]
    fn test_display_matches_wire_name() {
        assert_eq!(RelKind::IsFriendsWith.to_string(), "isFriendsWith");
        assert_eq!(
            serde_json::to_string(&RelKind::WantsToWatch).unwrap(),
            "\"wantsToWatch\""
        );
    }
}
