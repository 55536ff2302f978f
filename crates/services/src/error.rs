use catalogue::{ModelError, MovieId, RepositoryError};
use thiserror::Error;

/// Failures of the service layer's use-cases.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ServiceError {
    #[error("Movie {0} does not exist")]
    NonExistentMovie(MovieId),

    #[error("Unknown user '{0}'")]
    UnknownUser(String),

    #[error("Username '{0}' is already taken")]
    NameNotUnique(String),

    #[error("Username and password do not match")]
    Authentication,

    #[error("Movie {movie_id} is already in the watchlist of '{username}'")]
    AlreadyInWatchlist { username: String, movie_id: MovieId },

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Convenience type alias for Results with ServiceError
pub type Result<T> = std::result::Result<T, ServiceError>;
