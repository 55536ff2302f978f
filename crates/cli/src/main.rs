use anyhow::{anyhow, Context, Result};
use catalogue::{Argon2Hasher, DataFiles, MemoryRepository, MovieId, Repository};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use serde::Serialize;
use services::{movies, auth, CommentView, MovieSummary, MovieView, SearchField, UserView, YearPage};
use std::path::PathBuf;
use std::time::Instant;

/// Movie Catalogue - browse the movie dataset from the terminal
#[derive(Parser)]
#[command(name = "movie-catalogue")]
#[command(about = "Browse and search an in-memory movie catalogue", long_about = None)]
struct Cli {
    /// Directory holding Data1000Movies.csv, users.csv and comments.csv
    #[arg(short, long, env = "MOVIE_DATA_DIR", default_value = "data")]
    data_dir: PathBuf,

    /// Movie dataset, if not in the data directory
    #[arg(long)]
    movies_file: Option<PathBuf>,

    /// Users file, if not in the data directory
    #[arg(long)]
    users_file: Option<PathBuf>,

    /// Comments file, if not in the data directory
    #[arg(long)]
    comments_file: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show one movie with its genres and comments
    Movie {
        /// Movie ID (the dataset's rank)
        id: MovieId,
    },

    /// List the movies released in a year
    Year {
        year: u16,
    },

    /// List a genre's movies, best rated first
    Genre {
        name: String,

        /// Number of movies to show
        #[arg(long, default_value = "10")]
        limit: usize,
    },

    /// List the movies of an actor (case-insensitive)
    Actor {
        name: String,
    },

    /// List the movies of a director (case-insensitive)
    Director {
        name: String,
    },

    /// Search movies by title, actor, genre or director
    Search {
        query: String,

        /// Attribute to match
        #[arg(long, value_enum, default_value = "title")]
        by: Field,
    },

    /// Show the given movie IDs, skipping unknown ones
    Ids {
        #[arg(required = true)]
        ids: Vec<MovieId>,
    },

    /// Show the comments on a movie
    Comments {
        movie_id: MovieId,
    },

    /// Page through every movie in release order
    Browse {
        #[arg(long, default_value = "0")]
        offset: usize,

        #[arg(long, default_value = "20")]
        limit: usize,
    },

    /// Pick random movies
    Random {
        #[arg(long, default_value = "3")]
        count: usize,
    },

    /// Show a user's profile and watchlist
    User {
        username: String,
    },

    /// Show catalogue statistics
    Stats,
}

#[derive(Clone, Copy, ValueEnum)]
enum Field {
    Title,
    Actor,
    Genre,
    Director,
}

impl From<Field> for SearchField {
    fn from(field: Field) -> Self {
        match field {
            Field::Title => SearchField::Title,
            Field::Actor => SearchField::Actor,
            Field::Genre => SearchField::Genre,
            Field::Director => SearchField::Director,
        }
    }
}

#[derive(Serialize)]
struct Stats {
    movies: usize,
    users: usize,
    comments: usize,
    genres: Vec<String>,
    actors: usize,
    directors: usize,
    years: Vec<u16>,
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let defaults = DataFiles::in_dir(&cli.data_dir);
    let files = DataFiles {
        movies: cli.movies_file.clone().unwrap_or(defaults.movies),
        users: cli.users_file.clone().unwrap_or(defaults.users),
        comments: cli.comments_file.clone().unwrap_or(defaults.comments),
    };

    let start = Instant::now();
    let repo = MemoryRepository::load(&files, &Argon2Hasher::new())
        .with_context(|| format!("Failed to load movie catalogue from {}", cli.data_dir.display()))?;
    tracing::debug!("Loaded catalogue in {:?}", start.elapsed());

    // Dispatch to appropriate command handler
    match cli.command {
        Commands::Movie { id } => {
            let movie = movies::get_movie(&repo, id)?;
            emit(cli.json, &movie, print_movie_detail)?;
        }
        Commands::Year { year } => {
            let page = movies::get_movies_by_year(&repo, year);
            emit(cli.json, &page, |page| print_year_page(year, page))?;
        }
        Commands::Genre { name, limit } => {
            let ids = movies::get_movie_ids_for_genre(&repo, &name);
            if ids.is_empty() {
                return Err(anyhow!("No movies tagged '{}'", name));
            }
            let top: Vec<MovieId> = ids.into_iter().take(limit).collect();
            let found = movies::get_movies_by_id(&repo, &top);
            emit(cli.json, &found, |found| {
                print_movie_list(&format!("Top {} movies:", name), found)
            })?;
        }
        Commands::Actor { name } => search(&repo, cli.json, SearchField::Actor, &name)?,
        Commands::Director { name } => search(&repo, cli.json, SearchField::Director, &name)?,
        Commands::Search { query, by } => search(&repo, cli.json, by.into(), &query)?,
        Commands::Ids { ids } => {
            let found = movies::get_movies_by_id(&repo, &ids);
            emit(cli.json, &found, |found| print_movie_list("Movies:", found))?;
        }
        Commands::Comments { movie_id } => {
            let comments = movies::get_comments_for_movie(&repo, movie_id)?;
            emit(cli.json, &comments, |comments| print_comments(comments))?;
        }
        Commands::Browse { offset, limit } => {
            let page: Vec<MovieSummary> = repo
                .movies_page(offset, limit)
                .into_iter()
                .map(MovieSummary::from)
                .collect();
            emit(cli.json, &page, |page| {
                print_summaries(&format!("Movies {}-{}:", offset + 1, offset + page.len()), page)
            })?;
        }
        Commands::Random { count } => {
            let picked = movies::get_random_movies(&repo, count);
            emit(cli.json, &picked, |picked| print_summaries("Random picks:", picked))?;
        }
        Commands::User { username } => {
            let user = auth::get_user(&repo, &username)?;
            emit(cli.json, &user, |user| print_user(&repo, user))?;
        }
        Commands::Stats => {
            let (users, movie_count, comments) = repo.counts();
            let stats = Stats {
                movies: movie_count,
                users,
                comments,
                genres: movies::get_genre_names(&repo),
                actors: repo.actors().len(),
                directors: repo.directors().len(),
                years: movies::get_years(&repo),
            };
            emit(cli.json, &stats, print_stats)?;
        }
    }

    Ok(())
}

/// Print `value` as JSON, or hand it to `render` for terminal output
fn emit<T: Serialize>(json: bool, value: &T, render: impl FnOnce(&T)) -> Result<()> {
    if json {
        let out = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
        println!("{}", out);
    } else {
        render(value);
    }
    Ok(())
}

fn search(repo: &MemoryRepository, json: bool, field: SearchField, query: &str) -> Result<()> {
    let found = movies::search_movies(repo, field, query);
    emit(json, &found, |found| {
        print_movie_list(&format!("Results for '{}':", query), found)
    })
}

fn year_label(year: Option<u16>) -> String {
    year.map_or_else(|| "unknown".to_string(), |y| y.to_string())
}

fn print_movie_line(movie: &MovieView) {
    let genres = movie
        .genres
        .iter()
        .map(|g| g.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    let rating = movie
        .rating
        .map_or_else(|| "-".to_string(), |r| format!("{:.1}", r));
    println!(
        "{}: {} ({}) [{}] rating {}",
        movie.id.to_string().green(),
        movie.title,
        year_label(movie.year),
        genres,
        rating
    );
}

fn print_movie_list(header: &str, movies: &[MovieView]) {
    println!("{}", header.bold().blue());
    if movies.is_empty() {
        println!("  (none)");
    }
    for movie in movies {
        print_movie_line(movie);
    }
}

fn print_movie_detail(movie: &MovieView) {
    println!("{}", format!("{} ({})", movie.title, year_label(movie.year)).bold().blue());
    if let Some(description) = &movie.description {
        println!("{}", description);
    }
    if let Some(director) = &movie.director {
        println!("{}Director: {}", "• ".green(), director);
    }
    println!("{}Actors: {}", "• ".green(), movie.actors.join(", "));
    if let Some(minutes) = movie.runtime_minutes {
        println!("{}Runtime: {} minutes", "• ".green(), minutes);
    }
    if let Some(rating) = movie.rating {
        println!("{}Rating: {:.1}", "• ".green(), rating);
    }
    for genre in &movie.genres {
        println!("{}{} ({} movies)", "• ".cyan(), genre.name, genre.tagged_movies.len());
    }
    print_comments(&movie.comments);
}

fn print_year_page(year: u16, page: &YearPage) {
    print_movie_list(&format!("Movies of {}:", year), &page.movies);
    if let Some(previous) = page.previous_year {
        println!("{} {}", "← previous:".dimmed(), previous);
    }
    if let Some(next) = page.next_year {
        println!("{} {}", "→ next:".dimmed(), next);
    }
}

fn print_comments(comments: &[CommentView]) {
    println!("{}", format!("Comments ({}):", comments.len()).bold());
    for comment in comments {
        println!(
            "  {} {} {}",
            comment.timestamp.format("%Y-%m-%d %H:%M").to_string().dimmed(),
            format!("{}:", comment.username).yellow(),
            comment.comment_text
        );
    }
}

fn print_summaries(header: &str, movies: &[MovieSummary]) {
    println!("{}", header.bold().blue());
    for movie in movies {
        println!(
            "{}: {} ({})",
            movie.id.to_string().green(),
            movie.title,
            year_label(movie.year)
        );
    }
}

fn print_user(repo: &MemoryRepository, user: &UserView) {
    println!("{}", format!("User: {}", user.username).bold().blue());
    println!("{}Watched minutes: {}", "• ".green(), user.watched_minutes);
    let comments = repo
        .get_user(&user.username)
        .map_or(0, |u| u.reviews().len());
    println!("{}Comments: {}", "• ".green(), comments);

    println!("Watchlist:");
    for movie in repo.get_movies_by_id(&user.watchlist) {
        println!("  - {} ({})", movie.title(), year_label(movie.year()));
    }
}

fn print_stats(stats: &Stats) {
    println!("{}", "Catalogue statistics:".bold().blue());
    println!("{}Movies: {}", "• ".green(), stats.movies);
    println!("{}Users: {}", "• ".green(), stats.users);
    println!("{}Comments: {}", "• ".green(), stats.comments);
    println!("{}Actors: {}", "• ".cyan(), stats.actors);
    println!("{}Directors: {}", "• ".cyan(), stats.directors);
    println!("{}Genres: {}", "• ".cyan(), stats.genres.join(", "));
    if let (Some(first), Some(last)) = (stats.years.first(), stats.years.last()) {
        println!("{}Years: {}-{}", "• ".cyan(), first, last);
    }
}
