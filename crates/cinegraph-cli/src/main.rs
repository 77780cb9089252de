//! Cinegraph CLI - Command-line interface for Cinegraph
//!
//! Loads a dataset into a local snapshot, then runs one named query per
//! invocation and prints the result as JSON.

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "cinegraph")]
#[command(author = "Cinegraph Contributors")]
#[command(version)]
#[command(about = "Social-movie graph queries", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Engine config file (JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Snapshot database directory
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replace the snapshot with the contents of a dataset file
    Load {
        /// Dataset JSON file
        dataset: PathBuf,
    },

    /// Delete the stored snapshot
    Reset,

    /// Show node and edge counts
    Stats,

    /// Find a movie by title
    Movie { title: String },

    /// List every movie
    Movies,

    /// List the reviews of a movie
    MovieReviews { title: String },

    /// Movies directed by a person
    Director { name: String },

    /// Movies a person acted in
    Actor { name: String },

    /// Movies in a genre
    Genre { name: String },

    /// Find a user by user name
    User { username: String },

    /// Direct friends of a user
    Friends { username: String },

    /// Movies a user wants to watch
    Watchlist { username: String },

    /// Reviews written by a user
    UserReviews { username: String },

    /// Make two users friends
    Connect { username1: String, username2: String },

    /// Add or update a movie
    AddMovie {
        movie_id: u64,
        title: String,
        release_year: i32,
    },

    /// Link a movie to existing genres
    AddGenres {
        title: String,

        #[arg(required = true)]
        genres: Vec<String>,
    },

    /// Everyone within some number of friendship hops
    Network {
        username: String,

        /// Maximum number of hops
        #[arg(short, long, default_value = "2")]
        degree: String,
    },

    /// Most wanted movies across a user's friend network
    Hottest { username: String },

    /// Movies wanted by friends and friends-of-friends
    Recommend { username: String },

    /// Reviews containing a keyword
    Reviews { keyword: String },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(tracing_subscriber::EnvFilter::new(filter))
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> commands::Result<()> {
    let session = commands::Session::open(cli.db.as_deref(), cli.config.as_deref())?;

    match cli.command {
        Commands::Load { dataset } => commands::load(&session, &dataset),
        Commands::Reset => commands::reset(&session),
        Commands::Stats => commands::stats(&session),
        Commands::Movie { title } => session.query(move |e, _| e.find_movie(&title)).await,
        Commands::Movies => session.query(|e, _| e.find_movies()).await,
        Commands::MovieReviews { title } => {
            session.query(move |e, _| e.find_movie_reviews(&title)).await
        }
        Commands::Director { name } => {
            session
                .query(move |e, _| e.find_movies_by_director(&name))
                .await
        }
        Commands::Actor { name } => session.query(move |e, _| e.find_movies_by_actor(&name)).await,
        Commands::Genre { name } => session.query(move |e, _| e.find_movies_by_genre(&name)).await,
        Commands::User { username } => session.query(move |e, _| e.find_user(&username)).await,
        Commands::Friends { username } => {
            session.query(move |e, _| e.find_friends(&username)).await
        }
        Commands::Watchlist { username } => {
            session.query(move |e, _| e.find_watchlist(&username)).await
        }
        Commands::UserReviews { username } => {
            session
                .query(move |e, _| e.find_reviews_by_user(&username))
                .await
        }
        Commands::Connect {
            username1,
            username2,
        } => {
            session
                .mutate(move |e| e.connect_friends(&username1, &username2))
                .await
        }
        Commands::AddMovie {
            movie_id,
            title,
            release_year,
        } => {
            session
                .mutate(move |e| e.add_movie(movie_id, &title, release_year))
                .await
        }
        Commands::AddGenres { title, genres } => {
            session
                .mutate(move |e| e.add_genres_to_movie(&title, &genres))
                .await
        }
        Commands::Network { username, degree } => {
            session
                .query(move |e, cancel| e.find_friends_network_with(&username, &degree, cancel))
                .await
        }
        Commands::Hottest { username } => {
            session
                .query(move |e, cancel| e.find_hottest_movies_with(&username, cancel))
                .await
        }
        Commands::Recommend { username } => {
            session
                .query(move |e, cancel| e.find_movie_recommendations_with(&username, cancel))
                .await
        }
        Commands::Reviews { keyword } => {
            session
                .query(move |e, _| e.find_reviews_with_keyword(&keyword))
                .await
        }
    }
}
