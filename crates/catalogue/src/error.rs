//! Error types for the catalogue crate.
//!
//! Three layers of failure are kept apart:
//! - `ModelError`: an entity constructor was handed an invalid value
//! - `RepositoryError`: a write to the repository broke one of its invariants
//! - `DataLoadError`: ingestion of the CSV files failed
//!
//! "Not found" is never an error here. Lookups return `Option` or an empty `Vec`.

use crate::types::MovieId;
use thiserror::Error;

/// Errors raised while constructing domain entities.
///
/// Constructors validate their input instead of quietly storing a missing
/// value, so a malformed row surfaces at the point it is read.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    /// Actor, director, genre or user name was blank
    #[error("{entity} name must not be empty")]
    EmptyName { entity: &'static str },

    #[error("Movie title must not be empty")]
    EmptyTitle,

    /// Known years start at 1900
    #[error("Invalid release year: {0}")]
    InvalidYear(u16),

    #[error("Runtime must be a positive number of minutes, got {0}")]
    InvalidRuntime(u32),

    /// Review ratings range from 1 to 10
    #[error("Review rating must be between 1 and 10, got {0}")]
    InvalidRating(u8),

    #[error("Review text must not be empty")]
    EmptyText,

    /// Movie ratings are finite and between 0 and 10
    #[error("Movie rating must be between 0 and 10, got {0}")]
    InvalidMovieRating(f32),

    #[error("Password must not be empty")]
    EmptyPassword,

    #[error("Password hashing failed: {0}")]
    PasswordHash(String),
}

/// Errors raised by repository writes.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RepositoryError {
    /// The review is missing from its user's or its movie's review list
    #[error("Comment not correctly attached: {reason}")]
    CommentNotLinked { reason: String },

    /// Movie ids are assigned once and never reused
    #[error("Movie with id {0} already exists")]
    DuplicateMovie(MovieId),

    #[error("User {0} already exists")]
    DuplicateUser(String),

    #[error("Comment by '{username}' on movie {movie_id} was already added")]
    DuplicateComment { username: String, movie_id: MovieId },
}

/// Errors that can occur during data loading and parsing
#[derive(Error, Debug)]
pub enum DataLoadError {
    /// File could not be found or opened
    #[error("Failed to open file: {path}")]
    FileNotFound { path: String },

    /// The file exists (or may exist) but could not be opened
    #[error("I/O error opening {path}: {source}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The CSV reader itself failed (bad quoting, invalid UTF-8, ...)
    #[error("CSV error in {file}: {source}")]
    Csv {
        file: String,
        #[source]
        source: csv::Error,
    },

    /// Line in data file couldn't be parsed
    ///
    /// This variant stores context about where the error occurred
    #[error("Parse error at line {line} in {file}: {reason}")]
    ParseError {
        file: String,
        line: usize,
        reason: String,
    },

    /// Referenced entity doesn't exist (e.g., comment for non-existent movie)
    #[error("Missing reference: {entity} with id {id}")]
    MissingReference { entity: String, id: String },

    #[error("Repository rejected record: {0}")]
    Repository(#[from] RepositoryError),
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, DataLoadError>;
