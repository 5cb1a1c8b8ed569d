// src/main.rs
// cinequery - movie lookup and reviews from the terminal

use anyhow::{Context, Result, bail};
use cinequery::catalog::{CatalogClient, MovieDetails, poster_url};
use cinequery::config::Config;
use cinequery::http::create_shared_client;
use cinequery::reviews::{DeleteOutcome, Review, ReviewController, ReviewDraft};
use cinequery::session::{Credentials, Session, User};
use cinequery::storage::Storage;
use cinequery::watched::WatchedList;
use clap::{Parser, Subcommand};
use dialoguer::{Confirm, Password};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "cinequery")]
#[command(about = "Movie lookup and reviews from the terminal")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search the movie catalog by title
    Search {
        query: String,
    },

    /// Show details and reviews for one movie
    Movie {
        id: u64,
    },

    /// Create an account and sign in
    Register {
        username: String,
    },

    /// Sign in
    Login {
        username: String,
    },

    /// Sign out
    Logout,

    /// Show the signed-in user
    Whoami,

    /// Manage reviews
    Review {
        #[command(subcommand)]
        action: ReviewAction,
    },

    /// Manage your watched list
    Watched {
        #[command(subcommand)]
        action: WatchedAction,
    },
}

#[derive(Subcommand)]
enum ReviewAction {
    /// List reviews for a movie
    List { movie_id: u64 },

    /// Write a review for a movie
    Add {
        movie_id: u64,
        /// Rating, 1-5
        #[arg(short, long)]
        rating: u8,
        /// Review text
        #[arg(short, long)]
        text: String,
    },

    /// Edit one of your reviews
    Edit {
        movie_id: u64,
        review_id: String,
        /// Rating, 1-5
        #[arg(short, long)]
        rating: u8,
        /// Review text
        #[arg(short, long)]
        text: String,
    },

    /// Delete one of your reviews (asks for confirmation)
    Delete { movie_id: u64, review_id: String },
}

#[derive(Subcommand)]
enum WatchedAction {
    /// List watched movie ids
    List,

    /// Mark a movie as watched
    Add { movie_id: u64 },

    /// Remove a movie from the watched list
    Remove { movie_id: u64 },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env files (global first, then project - project overrides)
    if let Some(home) = dirs::home_dir() {
        let _ = dotenvy::from_path(home.join(".cinequery/.env"));
    }
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::WARN)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = Config::load();
    let client = create_shared_client();
    let storage = Storage::open(config.data_dir())?;

    let mut session = Session::new(client.clone(), config.backend_url(), storage.clone());
    session.validate_token().await;

    match cli.command {
        Commands::Search { query } => {
            let catalog = catalog_client(&config, &client)?;
            run_search(&catalog, &query).await?;
        }
        Commands::Movie { id } => {
            let catalog = catalog_client(&config, &client)?;
            let mut reviews = ReviewController::new(client, config.backend_url(), storage);
            run_movie(&catalog, &mut reviews, id).await?;
        }
        Commands::Register { username } => {
            let password = Password::new().with_prompt("Password").interact()?;
            session.register(&Credentials { username, password }).await?;
            print_signed_in(&session);
        }
        Commands::Login { username } => {
            let password = Password::new().with_prompt("Password").interact()?;
            session.login(&Credentials { username, password }).await?;
            print_signed_in(&session);
        }
        Commands::Logout => {
            session.logout();
            println!("Signed out.");
        }
        Commands::Whoami => match session.user() {
            Some(user) => println!("{} (id {})", user.username, user.id),
            None => println!("Not signed in."),
        },
        Commands::Review { action } => {
            let mut reviews = ReviewController::new(client.clone(), config.backend_url(), storage);
            match action {
                ReviewAction::List { movie_id } => {
                    print_reviews(reviews.load_reviews_for_movie(&movie_id.to_string()).await);
                }
                ReviewAction::Add { movie_id, rating, text } => {
                    let user = require_user(&session)?;
                    let catalog = catalog_client(&config, &client)?;
                    run_review_add(&catalog, &mut reviews, &user, movie_id, rating, &text).await?;
                }
                ReviewAction::Edit { movie_id, review_id, rating, text } => {
                    require_user(&session)?;
                    reviews.load_reviews_for_movie(&movie_id.to_string()).await;
                    reviews.edit_review(&review_id, rating, &text).await?;
                    println!("Review updated.");
                    print_reviews(reviews.reviews());
                }
                ReviewAction::Delete { movie_id, review_id } => {
                    require_user(&session)?;
                    reviews.load_reviews_for_movie(&movie_id.to_string()).await;
                    run_review_delete(&mut reviews, &review_id).await?;
                }
            }
        }
        Commands::Watched { action } => {
            let user = require_user(&session)?;
            let watched = WatchedList::new(storage);
            match action {
                WatchedAction::List => {
                    for movie_id in watched.movies(&user.id) {
                        println!("{}", movie_id);
                    }
                }
                WatchedAction::Add { movie_id } => {
                    watched.mark_watched(&user.id, movie_id)?;
                    println!("Marked {} as watched.", movie_id);
                }
                WatchedAction::Remove { movie_id } => {
                    watched.mark_unwatched(&user.id, movie_id)?;
                    println!("Removed {} from watched.", movie_id);
                }
            }
        }
    }

    Ok(())
}

fn catalog_client(config: &Config, client: &reqwest::Client) -> Result<CatalogClient> {
    Ok(CatalogClient::new(
        client.clone(),
        config.catalog_url(),
        config.tmdb_api_key()?,
    ))
}

fn require_user(session: &Session) -> Result<User> {
    session.user().cloned().context("Du måste vara inloggad!")
}

fn print_signed_in(session: &Session) {
    if let Some(user) = session.user() {
        println!("Signed in as {}.", user.username);
    }
}

async fn run_search(catalog: &CatalogClient, query: &str) -> Result<()> {
    let hits = catalog.search(query).await?;
    if hits.is_empty() {
        println!("No results for \"{}\".", query);
        return Ok(());
    }
    for movie in hits {
        let year = movie
            .release_date
            .as_deref()
            .filter(|d| d.len() >= 4)
            .map(|d| format!(" ({})", &d[..4]))
            .unwrap_or_default();
        println!("{:>8}  {}{}", movie.id, movie.title, year);
    }
    Ok(())
}

async fn run_movie(
    catalog: &CatalogClient,
    reviews: &mut ReviewController,
    id: u64,
) -> Result<()> {
    let movie = catalog.movie_details(id).await?;
    print_details(&movie);

    println!();
    print_reviews(reviews.load_reviews_for_movie(&id.to_string()).await);
    Ok(())
}

fn print_details(movie: &MovieDetails) {
    println!("{}", movie.title);
    if let Some(year) = movie.release_year() {
        println!("  Year:    {}", year);
    }
    if !movie.genres.is_empty() {
        let names: Vec<&str> = movie.genres.iter().map(|g| g.name.as_str()).collect();
        println!("  Genres:  {}", names.join(", "));
    }
    if let Some(runtime) = movie.runtime {
        println!("  Runtime: {} min", runtime);
    }
    if let Some(path) = movie.poster_path.as_deref() {
        println!("  Poster:  {}", poster_url(path));
    }
    if let Some(overview) = movie.overview.as_deref().filter(|o| !o.is_empty()) {
        println!("\n{}", overview);
    }
}

fn print_reviews(reviews: &[Review]) {
    if reviews.is_empty() {
        println!("No reviews yet.");
        return;
    }
    for review in reviews {
        let author = review.author.username().unwrap_or_else(|| review.author.id());
        println!(
            "[{}] {}/5 by {} on {}",
            review.id,
            review.rating,
            author,
            review.created_at.format("%Y-%m-%d")
        );
        println!("    {}", review.review_text);
    }
}

async fn run_review_add(
    catalog: &CatalogClient,
    reviews: &mut ReviewController,
    user: &User,
    movie_id: u64,
    rating: u8,
    text: &str,
) -> Result<()> {
    if reviews.has_reviewed(&movie_id.to_string(), &user.id).await? {
        bail!("Du har redan recenserat denna film!");
    }

    let movie = catalog.movie_details(movie_id).await?;
    let draft = ReviewDraft {
        movie_id: movie_id.to_string(),
        movie_title: movie.title,
        user_id: user.id.clone(),
        rating: Some(rating),
        review_text: text.to_string(),
    };
    reviews.submit_review(&draft).await?;

    println!("Review saved.");
    print_reviews(reviews.reviews());
    Ok(())
}

async fn run_review_delete(reviews: &mut ReviewController, review_id: &str) -> Result<()> {
    // First invocation arms the pending delete; the confirmation prompt
    // stands in for the second click within the window.
    let outcome = reviews.delete_review(review_id).await?;
    debug_assert_eq!(outcome, DeleteOutcome::Armed);

    let confirmed = Confirm::new()
        .with_prompt(format!("Delete review {}?", review_id))
        .default(false)
        .interact()?;

    if !confirmed {
        println!("Aborted; review kept.");
        return Ok(());
    }

    match reviews.delete_review(review_id).await? {
        DeleteOutcome::Deleted => println!("Review deleted."),
        DeleteOutcome::Armed => println!("Confirmation window lapsed; review kept."),
    }
    Ok(())
}
