//! Watchlist use-cases.
//!
//! Every operation first resolves the user and the movie, so callers get a
//! typed error instead of the repository's plain `false`.

use crate::error::{Result, ServiceError};
use crate::views::{MovieView, movie_views};
use catalogue::{MovieId, Repository};
use tracing::debug;

fn ensure_user(repo: &dyn Repository, username: &str) -> Result<()> {
    match repo.get_user(username) {
        Some(_) => Ok(()),
        None => Err(ServiceError::UnknownUser(username.to_string())),
    }
}

fn ensure_movie(repo: &dyn Repository, movie_id: MovieId) -> Result<()> {
    match repo.get_movie(movie_id) {
        Some(_) => Ok(()),
        None => Err(ServiceError::NonExistentMovie(movie_id)),
    }
}

pub fn add_to_watch_list(repo: &mut dyn Repository, username: &str, movie_id: MovieId) -> Result<()> {
    ensure_user(repo, username)?;
    ensure_movie(repo, movie_id)?;

    if !repo.add_to_watch_list(username, movie_id) {
        return Err(ServiceError::AlreadyInWatchlist {
            username: username.to_string(),
            movie_id,
        });
    }
    debug!("Added movie {} to the watchlist of '{}'", movie_id, username);
    Ok(())
}

/// Returns whether the movie was in the watchlist.
pub fn remove_from_watch_list(
    repo: &mut dyn Repository,
    username: &str,
    movie_id: MovieId,
) -> Result<bool> {
    ensure_user(repo, username)?;
    Ok(repo.remove_from_watch_list(username, movie_id))
}

pub fn get_watch_list(repo: &dyn Repository, username: &str) -> Result<Vec<MovieView>> {
    ensure_user(repo, username)?;
    Ok(movie_views(&repo.get_watch_list(username), repo))
}

/// Mark a movie as watched; returns the user's total watched minutes.
pub fn watch_movie(repo: &mut dyn Repository, username: &str, movie_id: MovieId) -> Result<u32> {
    ensure_user(repo, username)?;
    ensure_movie(repo, movie_id)?;

    repo.watch_movie(username, movie_id);
    Ok(repo
        .get_user(username)
        .map(|user| user.watched_minutes())
        .unwrap_or_default())
}
