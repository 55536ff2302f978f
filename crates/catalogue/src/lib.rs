//! # Catalogue Crate
//!
//! In-memory movie catalogue: the domain model, the indexed repository and
//! CSV ingestion of movies, users and comments.
//!
//! ## Main Components
//!
//! - **types**: Domain entities (Movie, Actor, Director, Genre, Review, User, Watchlist)
//! - **repository**: The `Repository` trait and its in-memory implementation
//! - **parser**: Parse the CSV files into plain row records
//! - **index**: Link parsed rows into a `MemoryRepository`
//! - **auth**: Password hashing
//! - **error**: Error types for the model, the repository and loading
//!
//! ## Example Usage
//!
//! ```ignore
//! use catalogue::{MemoryRepository, Repository};
//! use std::path::Path;
//!
//! let repo = MemoryRepository::load_from_files(Path::new("data"))?;
//!
//! let first = repo.get_first_movie().unwrap();
//! let same_year = repo.get_movies_by_year(first.year().unwrap());
//! let war = repo.get_movie_ids_for_genre("War");
//!
//! println!("{} movies share {}'s year, {} war movies", same_year.len(), first, war.len());
//! ```

pub mod auth;
pub mod error;
pub mod index;
pub mod parser;
pub mod repository;
pub mod types;

// Re-export commonly used types for convenience
pub use auth::{Argon2Hasher, PasswordHasher};
pub use error::{DataLoadError, ModelError, RepositoryError, Result};
pub use index::DataFiles;
pub use parser::parse_timestamp;
pub use repository::{MemoryRepository, MovieIter, Repository};
pub use types::{
    // Type aliases
    MovieId,
    // Entities
    Actor,
    Director,
    Genre,
    Movie,
    Review,
    User,
    Watchlist,
    // Helpers
    Named,
    normalize_username,
};
