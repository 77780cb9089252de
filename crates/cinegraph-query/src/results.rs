//! Structured results returned by façade operations.
//!
//! Field names serialize in camelCase, the shape the hosting API layer
//! exposes to its clients.

use chrono::{DateTime, Utc};
use cinegraph_core::{Movie, Review, User};
use serde::{Deserialize, Serialize};

/// A movie with its credits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieDetails {
    pub title: String,
    pub release_year: i32,
    pub directors: Vec<String>,
    pub actors: Vec<String>,
}

/// Title and year of a movie.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieSummary {
    pub title: String,
    pub release_year: i32,
}

impl From<&Movie> for MovieSummary {
    fn from(movie: &Movie) -> Self {
        Self {
            title: movie.title.clone(),
            release_year: movie.release_year,
        }
    }
}

/// A review of one movie, with its author.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieReview {
    pub review: String,
    pub rating: f32,
    pub user: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub name: String,
    pub user_name: String,
    pub email: String,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            name: user.name.clone(),
            user_name: user.user_name.clone(),
            email: user.email.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchlistEntry {
    pub movie: MovieSummary,
    pub added_on: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewSummary {
    pub review_id: u64,
    pub text: String,
    pub rating: f32,
}

impl From<&Review> for ReviewSummary {
    fn from(review: &Review) -> Self {
        Self {
            review_id: review.review_id,
            text: review.text.clone(),
            rating: review.rating,
        }
    }
}

/// A review written by a user, with the movie it is about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserReview {
    pub movie: MovieSummary,
    pub review: ReviewSummary,
    pub review_date: Option<DateTime<Utc>>,
}

/// Display names of two users who are now friends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Friendship {
    pub user1_name: String,
    pub user2_name: String,
}

/// A user in someone's friend network and their distance in hops.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkMember {
    pub person: UserProfile,
    pub degree: u32,
}

/// A movie and how many distinct friends want to watch it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotMovie {
    pub top_movie: MovieSummary,
    pub hotness: usize,
}

/// A movie some friend wants to watch, and which friend at what distance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub recommendation: MovieSummary,
    pub person: UserProfile,
    pub degree: u32,
}

/// Reviews of one movie that matched a keyword.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeywordMatch {
    pub movie: String,
    pub reviews: Vec<String>,
}

/// A movie and the genres just linked to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieGenres {
    pub movie: MovieSummary,
    pub genres: Vec<String>,
}
