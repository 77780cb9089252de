//! The query façade.
//!
//! Each public method is one named operation the hosting layer can call.
//! Reads run against a single consistent view of the store; writes are
//! submitted as one batch so they land atomically.

use crate::config::EngineConfig;
use crate::results::{
    Friendship, HotMovie, KeywordMatch, MovieDetails, MovieGenres, MovieReview, MovieSummary,
    NetworkMember, Recommendation, ReviewSummary, UserProfile, UserReview, WatchlistEntry,
};
use crate::validate::{check_keyword, parse_degree, require};
use cinegraph_core::{
    Edge, EngineError, Movie, Node, NodeKey, NodeKind, RelKind, Result, Review, User,
};
use cinegraph_graph::{
    aggregate_and_rank, bfs_by_relation, collect_provenance, Batch, Direction, GraphStore,
    GraphView, MemoryStore,
};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Answers the fixed set of social-movie queries over a graph store.
///
/// Construct once with a shared store handle. The engine holds no other
/// state and can be cloned into as many threads as needed.
///
/// Names passed to lookups and mutations are trimmed before use.
pub struct QueryEngine<S = MemoryStore> {
    store: Arc<S>,
    config: EngineConfig,
}

impl<S> Clone for QueryEngine<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            config: self.config.clone(),
        }
    }
}

impl<S: GraphStore> QueryEngine<S> {
    /// Creates an engine with the default configuration.
    pub fn new(store: Arc<S>) -> Self {
        Self::with_config(store, EngineConfig::default())
    }

    pub fn with_config(store: Arc<S>, config: EngineConfig) -> Self {
        Self { store, config }
    }

    /// The store this engine reads from and writes to.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ─────────────────────────────────────────────────────────────────────
    // Movies
    // ─────────────────────────────────────────────────────────────────────

    /// Finds a movie by title, with its directors and actors.
    pub fn find_movie(&self, title: &str) -> Result<MovieDetails> {
        observe("find_movie", title, || {
            self.store.read(|g| movie_details(g, &NodeKey::movie(title.trim())))
        })
    }

    /// Lists every movie with its credits, ordered by title.
    pub fn find_movies(&self) -> Result<Vec<MovieDetails>> {
        observe("find_movies", "*", || {
            self.store.read(|g| {
                let mut keys: Vec<NodeKey> = g.nodes(NodeKind::Movie).map(Node::key).collect();
                keys.sort();
                keys.iter().map(|key| movie_details(g, key)).collect()
            })
        })
    }

    /// The reviews of one movie, ordered by review id.
    pub fn find_movie_reviews(&self, title: &str) -> Result<Vec<MovieReview>> {
        observe("find_movie_reviews", title, || {
            self.store.read(|g| {
                let key = NodeKey::movie(title.trim());
                g.get_node(&key)?;

                let mut reviews = Vec::new();
                for related in g.related(&key, RelKind::HasReview, Direction::Outgoing)? {
                    let Some(review) = related.node.as_review() else {
                        continue;
                    };
                    let user = g
                        .related(&related.node.key(), RelKind::GaveReview, Direction::Incoming)?
                        .find_map(|r| r.node.as_user())
                        .map(|u| u.user_name.clone())
                        .ok_or_else(|| {
                            EngineError::Internal(format!("{} has no author", related.node.key()))
                        })?;
                    let row = MovieReview {
                        review: review.text.clone(),
                        rating: review.rating,
                        user,
                    };
                    reviews.push((review.review_id, row));
                }

                reviews.sort_by_key(|(id, _)| *id);
                Ok(reviews.into_iter().map(|(_, row)| row).collect())
            })
        })
    }

    /// Movies directed by `name`. Unknown names yield an empty list.
    pub fn find_movies_by_director(&self, name: &str) -> Result<Vec<MovieSummary>> {
        observe("find_movies_by_director", name, || {
            self.store.read(|g| {
                movies_linked_to(
                    g,
                    &NodeKey::person(name.trim()),
                    RelKind::Directs,
                    Direction::Outgoing,
                )
            })
        })
    }

    /// Movies `name` acted in. Unknown names yield an empty list.
    pub fn find_movies_by_actor(&self, name: &str) -> Result<Vec<MovieSummary>> {
        observe("find_movies_by_actor", name, || {
            self.store.read(|g| {
                movies_linked_to(
                    g,
                    &NodeKey::person(name.trim()),
                    RelKind::ActsIn,
                    Direction::Outgoing,
                )
            })
        })
    }

    /// Movies in genre `name`. Unknown genres yield an empty list.
    pub fn find_movies_by_genre(&self, name: &str) -> Result<Vec<MovieSummary>> {
        observe("find_movies_by_genre", name, || {
            self.store.read(|g| {
                movies_linked_to(
                    g,
                    &NodeKey::genre(name.trim()),
                    RelKind::InGenre,
                    Direction::Incoming,
                )
            })
        })
    }

    /// Adds a movie, or updates the one with the same title.
    pub fn add_movie(&self, movie_id: u64, title: &str, release_year: i32) -> Result<Movie> {
        observe("add_movie", title, || {
            let title = require("title", title)?;
            if movie_id == 0 || release_year <= 0 {
                return Err(EngineError::invalid(
                    "movieId and releaseYear must be positive",
                ));
            }

            let movie = Movie::new(movie_id, title, release_year);
            let mut batch = Batch::new();
            batch.upsert(movie.clone());
            self.store.apply(batch)?;

            info!("Added movie {} ({})", movie.title, movie.release_year);
            Ok(movie)
        })
    }

    /// Links a movie to existing genres.
    ///
    /// Fails with `NotFound` if the movie or any genre is missing, in which
    /// case no link is made. Links that already exist are left as they are.
    pub fn add_genres_to_movie<I>(&self, title: &str, genres: I) -> Result<MovieGenres>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        observe("add_genres_to_movie", title, || {
            let title = require("title", title)?;
            let genres: BTreeSet<String> = genres
                .into_iter()
                .map(|g| require("genre", g.as_ref()).map(str::to_owned))
                .collect::<Result<_>>()?;
            if genres.is_empty() {
                return Err(EngineError::invalid("at least one genre is required"));
            }

            let movie_key = NodeKey::movie(title);
            let mut batch = Batch::new();
            for genre in &genres {
                batch.relate(
                    movie_key.clone(),
                    NodeKey::genre(genre.as_str()),
                    Edge::new(RelKind::InGenre),
                );
            }
            let report = self.store.apply(batch)?;
            info!(
                "Linked {} to {} genres ({} new)",
                title,
                genres.len(),
                report.edges_created
            );

            let movie = self
                .store
                .read(|g| expect_movie(g.get_node(&movie_key)?).map(MovieSummary::from))?;
            Ok(MovieGenres {
                movie,
                genres: genres.into_iter().collect(),
            })
        })
    }

    // ─────────────────────────────────────────────────────────────────────
    // Users
    // ─────────────────────────────────────────────────────────────────────

    pub fn find_user(&self, username: &str) -> Result<UserProfile> {
        observe("find_user", username, || {
            self.store.read(|g| {
                expect_user(g.get_node(&NodeKey::user(username.trim()))?).map(UserProfile::from)
            })
        })
    }

    /// Direct friends of a user, ordered by name.
    pub fn find_friends(&self, username: &str) -> Result<Vec<UserProfile>> {
        observe("find_friends", username, || {
            self.store.read(|g| {
                let key = NodeKey::user(username.trim());
                g.get_node(&key)?;

                let mut friends: Vec<UserProfile> = g
                    .related(&key, RelKind::IsFriendsWith, Direction::Outgoing)?
                    .filter_map(|r| r.node.as_user().map(UserProfile::from))
                    .collect();
                friends.sort_by(|a, b| {
                    a.name
                        .cmp(&b.name)
                        .then_with(|| a.user_name.cmp(&b.user_name))
                });
                Ok(friends)
            })
        })
    }

    /// Movies a user wants to watch, oldest intent first.
    pub fn find_watchlist(&self, username: &str) -> Result<Vec<WatchlistEntry>> {
        observe("find_watchlist", username, || {
            self.store.read(|g| {
                let key = NodeKey::user(username.trim());
                g.get_node(&key)?;

                let mut entries: Vec<WatchlistEntry> = g
                    .related(&key, RelKind::WantsToWatch, Direction::Outgoing)?
                    .filter_map(|r| {
                        r.node.as_movie().map(|m| WatchlistEntry {
                            movie: MovieSummary::from(m),
                            added_on: r.edge.timestamp,
                        })
                    })
                    .collect();
                entries.sort_by(|a, b| {
                    a.added_on
                        .cmp(&b.added_on)
                        .then_with(|| a.movie.cmp(&b.movie))
                });
                Ok(entries)
            })
        })
    }

    /// Reviews a user wrote, ordered by review id.
    pub fn find_reviews_by_user(&self, username: &str) -> Result<Vec<UserReview>> {
        observe("find_reviews_by_user", username, || {
            self.store.read(|g| {
                let key = NodeKey::user(username.trim());
                g.get_node(&key)?;

                let mut reviews = Vec::new();
                for related in g.related(&key, RelKind::GaveReview, Direction::Outgoing)? {
                    let Some(review) = related.node.as_review() else {
                        continue;
                    };
                    let Some(movie) = reviewed_movie(g, review)? else {
                        continue;
                    };
                    reviews.push(UserReview {
                        movie: MovieSummary::from(movie),
                        review: ReviewSummary::from(review),
                        review_date: related.edge.timestamp,
                    });
                }

                reviews.sort_by_key(|r| r.review.review_id);
                Ok(reviews)
            })
        })
    }

    /// Makes two users friends with each other.
    ///
    /// Both directions are written in one batch. Connecting users who are
    /// already friends changes nothing.
    pub fn connect_friends(&self, username1: &str, username2: &str) -> Result<Friendship> {
        let subject = format!("{} <-> {}", username1, username2);
        observe("connect_friends", &subject, || {
            let u1 = require("username1", username1)?;
            let u2 = require("username2", username2)?;
            if u1 == u2 {
                return Err(EngineError::invalid("a user cannot befriend themselves"));
            }

            let (k1, k2) = (NodeKey::user(u1), NodeKey::user(u2));
            let mut batch = Batch::new();
            batch.relate(k1.clone(), k2.clone(), Edge::new(RelKind::IsFriendsWith));
            self.store.apply(batch)?;
            info!("Connected {} and {}", u1, u2);

            self.store.read(|g| {
                Ok(Friendship {
                    user1_name: expect_user(g.get_node(&k1)?)?.name.clone(),
                    user2_name: expect_user(g.get_node(&k2)?)?.name.clone(),
                })
            })
        })
    }

    // ─────────────────────────────────────────────────────────────────────
    // Traversal queries
    // ─────────────────────────────────────────────────────────────────────

    /// Everyone within `degree` friendship hops of a user, with their
    /// shortest distance, ordered by distance then name.
    ///
    /// `degree` is raw user input and must parse as a positive integer.
    pub fn find_friends_network(&self, username: &str, degree: &str) -> Result<Vec<NetworkMember>> {
        self.find_friends_network_with(username, degree, &CancellationToken::new())
    }

    /// [`find_friends_network`](Self::find_friends_network) with a
    /// cancellation signal.
    pub fn find_friends_network_with(
        &self,
        username: &str,
        degree: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<NetworkMember>> {
        let subject = format!("{} within {}", username, degree);
        observe("find_friends_network", &subject, || {
            let max_depth = parse_degree(degree)?;
            if let Some(limit) = self.config.max_network_degree {
                if max_depth > limit {
                    return Err(EngineError::invalid(format!(
                        "degree {} exceeds the maximum of {}",
                        max_depth, limit
                    )));
                }
            }

            self.store.read(|g| {
                let reached = bfs_by_relation(
                    g,
                    &NodeKey::user(username.trim()),
                    RelKind::IsFriendsWith,
                    max_depth,
                    cancel,
                )?;

                let mut members = Vec::with_capacity(reached.len());
                for (key, degree) in reached {
                    let person = UserProfile::from(expect_user(g.get_node(&key)?)?);
                    members.push(NetworkMember { person, degree });
                }

                // Stable ordering: degree → name → user name
                members.sort_by(|a, b| {
                    a.degree
                        .cmp(&b.degree)
                        .then_with(|| a.person.name.cmp(&b.person.name))
                        .then_with(|| a.person.user_name.cmp(&b.person.user_name))
                });
                Ok(members)
            })
        })
    }

    /// The movies most wanted across a user's extended friend network.
    pub fn find_hottest_movies(&self, username: &str) -> Result<Vec<HotMovie>> {
        self.find_hottest_movies_with(username, &CancellationToken::new())
    }

    /// [`find_hottest_movies`](Self::find_hottest_movies) with a
    /// cancellation signal.
    pub fn find_hottest_movies_with(
        &self,
        username: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<HotMovie>> {
        observe("find_hottest_movies", username, || {
            self.store.read(|g| {
                let friends = bfs_by_relation(
                    g,
                    &NodeKey::user(username.trim()),
                    RelKind::IsFriendsWith,
                    self.config.hottest_max_degree,
                    cancel,
                )?;

                // (movie title, friend user name)
                let mut intents: Vec<(String, String)> = Vec::new();
                for friend in friends.keys() {
                    for related in g.related(friend, RelKind::WantsToWatch, Direction::Outgoing)? {
                        if let Some(movie) = related.node.as_movie() {
                            intents.push((movie.title.clone(), friend.key.clone()));
                        }
                    }
                }
                debug!(
                    "Hottest for {}: {} friends, {} watch intents",
                    username,
                    friends.len(),
                    intents.len()
                );

                let ranked = aggregate_and_rank(
                    intents,
                    |(title, friend)| (title.clone(), friend.clone()),
                    self.config.hottest_limit,
                );

                ranked
                    .into_iter()
                    .map(|r| {
                        let movie = expect_movie(g.get_node(&NodeKey::movie(r.group))?)?;
                        Ok(HotMovie {
                            top_movie: MovieSummary::from(movie),
                            hotness: r.score,
                        })
                    })
                    .collect()
            })
        })
    }

    /// Movies wanted by friends and friends-of-friends, with who wants each
    /// and how far away they are. Nothing is collapsed or truncated.
    pub fn find_movie_recommendations(&self, username: &str) -> Result<Vec<Recommendation>> {
        self.find_movie_recommendations_with(username, &CancellationToken::new())
    }

    /// [`find_movie_recommendations`](Self::find_movie_recommendations) with
    /// a cancellation signal.
    pub fn find_movie_recommendations_with(
        &self,
        username: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<Recommendation>> {
        observe("find_movie_recommendations", username, || {
            self.store.read(|g| {
                let friends = bfs_by_relation(
                    g,
                    &NodeKey::user(username.trim()),
                    RelKind::IsFriendsWith,
                    self.config.recommendation_max_degree,
                    cancel,
                )?;

                let mut triples = Vec::new();
                for (friend, degree) in &friends {
                    for related in g.related(friend, RelKind::WantsToWatch, Direction::Outgoing)? {
                        if let Some(movie) = related.node.as_movie() {
                            triples.push((movie.title.clone(), friend.key.clone(), *degree));
                        }
                    }
                }

                collect_provenance(triples)
                    .into_iter()
                    .map(|p| {
                        let movie = expect_movie(g.get_node(&NodeKey::movie(p.group))?)?;
                        let person = expect_user(g.get_node(&NodeKey::user(p.contributor))?)?;
                        Ok(Recommendation {
                            recommendation: MovieSummary::from(movie),
                            person: UserProfile::from(person),
                            degree: p.degree,
                        })
                    })
                    .collect()
            })
        })
    }

    // ─────────────────────────────────────────────────────────────────────
    // Reviews
    // ─────────────────────────────────────────────────────────────────────

    /// Reviews containing a single-word keyword, ignoring case, grouped by
    /// movie and ordered by title.
    pub fn find_reviews_with_keyword(&self, keyword: &str) -> Result<Vec<KeywordMatch>> {
        observe("find_reviews_with_keyword", keyword, || {
            let keyword = check_keyword(keyword)?;
            self.store.read(|g| {
                let mut by_movie: BTreeMap<String, Vec<(u64, String)>> = BTreeMap::new();
                for node in g.reviews_containing(keyword) {
                    let Some(review) = node.as_review() else {
                        continue;
                    };
                    if let Some(movie) = reviewed_movie(g, review)? {
                        by_movie
                            .entry(movie.title.clone())
                            .or_default()
                            .push((review.review_id, review.text.clone()));
                    }
                }

                Ok(by_movie
                    .into_iter()
                    .map(|(movie, mut reviews)| {
                        reviews.sort();
                        KeywordMatch {
                            movie,
                            reviews: reviews.into_iter().map(|(_, text)| text).collect(),
                        }
                    })
                    .collect())
            })
        })
    }
}

/// Runs one façade operation and logs its failure, if any, at a level
/// matching how serious it is.
fn observe<T>(op: &'static str, subject: &str, f: impl FnOnce() -> Result<T>) -> Result<T> {
    debug!(op, subject, "query");
    let result = f();
    if let Err(err) = &result {
        match err {
            EngineError::StoreUnavailable(_) | EngineError::Internal(_) => {
                error!(op, subject, error = %err, "store failure");
            }
            EngineError::InvalidArgument(_) => {
                warn!(op, subject, error = %err, "rejected input");
            }
            EngineError::NotFound { .. } | EngineError::Cancelled => {
                debug!(op, subject, error = %err, "no result");
            }
        }
    }
    result
}

fn expect_movie(node: &Node) -> Result<&Movie> {
    node.as_movie()
        .ok_or_else(|| EngineError::Internal(format!("{} is not a movie", node.key())))
}

fn expect_user(node: &Node) -> Result<&User> {
    node.as_user()
        .ok_or_else(|| EngineError::Internal(format!("{} is not a user", node.key())))
}

fn movie_details(g: &dyn GraphView, key: &NodeKey) -> Result<MovieDetails> {
    let movie = expect_movie(g.get_node(key)?)?;
    Ok(MovieDetails {
        title: movie.title.clone(),
        release_year: movie.release_year,
        directors: credited(g, key, RelKind::Directs)?,
        actors: credited(g, key, RelKind::ActsIn)?,
    })
}

/// Names of people credited on a movie through `rel`, sorted and distinct.
fn credited(g: &dyn GraphView, movie: &NodeKey, rel: RelKind) -> Result<Vec<String>> {
    let names: BTreeSet<String> = g
        .related(movie, rel, Direction::Incoming)?
        .filter_map(|r| r.node.as_person().map(|p| p.name.clone()))
        .collect();
    Ok(names.into_iter().collect())
}

/// Movies connected to an anchor node, ordered by title.
///
/// A missing anchor is not an error here: the list is simply empty.
fn movies_linked_to(
    g: &dyn GraphView,
    anchor: &NodeKey,
    rel: RelKind,
    direction: Direction,
) -> Result<Vec<MovieSummary>> {
    let related = match g.related(anchor, rel, direction) {
        Ok(related) => related,
        Err(EngineError::NotFound { .. }) => return Ok(Vec::new()),
        Err(err) => return Err(err),
    };

    let mut movies: Vec<MovieSummary> = related
        .filter_map(|r| r.node.as_movie().map(MovieSummary::from))
        .collect();
    movies.sort();
    movies.dedup();
    Ok(movies)
}

/// The movie a review belongs to.
fn reviewed_movie<'a>(g: &'a dyn GraphView, review: &Review) -> Result<Option<&'a Movie>> {
    let key = NodeKey::review(review.review_id);
    Ok(g
        .related(&key, RelKind::HasReview, Direction::Incoming)?
        .find_map(|r| r.node.as_movie()))
}
