//! Node types for the movie graph.
//!
//! Every node is identified by its kind plus a unique key within that kind:
//! movies by title, users by user name, people and genres by name, reviews
//! by review id.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// The type of a node in the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Movie,
    User,
    /// Directors and actors. Which of the two a person is lives in their role set.
    Person,
    Genre,
    Review,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Movie => "movie",
            Self::User => "user",
            Self::Person => "person",
            Self::Genre => "genre",
            Self::Review => "review",
        };
        write!(f, "{}", s)
    }
}

/// Unique identity of a node: its kind and its key within that kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeKey {
    pub kind: NodeKind,
    pub key: String,
}

impl NodeKey {
    pub fn new(kind: NodeKind, key: impl Into<String>) -> Self {
        Self {
            kind,
            key: key.into(),
        }
    }

    pub fn movie(title: impl Into<String>) -> Self {
        Self::new(NodeKind::Movie, title)
    }

    pub fn user(user_name: impl Into<String>) -> Self {
        Self::new(NodeKind::User, user_name)
    }

    pub fn person(name: impl Into<String>) -> Self {
        Self::new(NodeKind::Person, name)
    }

    pub fn genre(name: impl Into<String>) -> Self {
        Self::new(NodeKind::Genre, name)
    }

    pub fn review(review_id: u64) -> Self {
        Self::new(NodeKind::Review, review_id.to_string())
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.key)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movie {
    pub movie_id: u64,
    pub title: String,
    pub release_year: i32,
}

impl Movie {
    pub fn new(movie_id: u64, title: impl Into<String>, release_year: i32) -> Self {
        Self {
            movie_id,
            title: title.into(),
            release_year,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub user_name: String,
    pub name: String,
    pub email: String,
}

impl User {
    pub fn new(
        user_name: impl Into<String>,
        name: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            user_name: user_name.into(),
            name: name.into(),
            email: email.into(),
        }
    }
}

/// What a person does on a film.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Director,
    Actor,
}

/// A director, an actor, or both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub name: String,
    pub roles: BTreeSet<Role>,
}

impl Person {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            roles: BTreeSet::new(),
        }
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.roles.insert(role);
        self
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub name: String,
}

impl Genre {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub review_id: u64,
    pub text: String,
    pub rating: f32,
}

impl Review {
    pub fn new(review_id: u64, text: impl Into<String>, rating: f32) -> Self {
        Self {
            review_id,
            text: text.into(),
            rating,
        }
    }
}

/// A typed node in the property graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Node {
    Movie(Movie),
    User(User),
    Person(Person),
    Genre(Genre),
    Review(Review),
}

impl Node {
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Movie(_) => NodeKind::Movie,
            Self::User(_) => NodeKind::User,
            Self::Person(_) => NodeKind::Person,
            Self::Genre(_) => NodeKind::Genre,
            Self::Review(_) => NodeKind::Review,
        }
    }

    /// The node's unique key.
    pub fn key(&self) -> NodeKey {
        match self {
            Self::Movie(m) => NodeKey::movie(&m.title),
            Self::User(u) => NodeKey::user(&u.user_name),
            Self::Person(p) => NodeKey::person(&p.name),
            Self::Genre(g) => NodeKey::genre(&g.name),
            Self::Review(r) => NodeKey::review(r.review_id),
        }
    }

    /// Merges `incoming` into this node.
    ///
    /// Attributes are replaced, except a person's roles which accumulate.
    /// Both nodes must share the same key.
    pub fn merge(&mut self, incoming: Node) {
        match (self, incoming) {
            (Self::Person(existing), Self::Person(new)) => {
                existing.roles.extend(new.roles);
            }
            (this, other) => *this = other,
        }
    }

    pub fn as_movie(&self) -> Option<&Movie> {
        match self {
            Self::Movie(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_user(&self) -> Option<&User> {
        match self {
            Self::User(u) => Some(u),
            _ => None,
        }
    }

    pub fn as_person(&self) -> Option<&Person> {
        match self {
            Self::Person(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_review(&self) -> Option<&Review> {
        match self {
            Self::Review(r) => Some(r),
            _ => None,
        }
    }
}

impl From<Movie> for Node {
    fn from(m: Movie) -> Self {
        Self::Movie(m)
    }
}

impl From<User> for Node {
    fn from(u: User) -> Self {
        Self::User(u)
    }
}

impl From<Person> for Node {
    fn from(p: Person) -> Self {
        Self::Person(p)
    }
}

impl From<Genre> for Node {
    fn from(g: Genre) -> Self {
        Self::Genre(g)
    }
}

impl From<Review> for Node {
    fn from(r: Review) -> Self {
        Self::Review(r)
    }
}
