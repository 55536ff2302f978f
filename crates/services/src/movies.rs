//! Movie browsing and commenting use-cases.

use crate::error::{Result, ServiceError};
use crate::views::{
    CommentView, MovieSummary, MovieView, YearPage, comment_views, movie_views,
};
use catalogue::{MovieId, Named, Repository, RepositoryError, Review};
use chrono::Local;
use rand::seq::IteratorRandom;
use tracing::debug;

/// Which attribute a free-text search matches against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchField {
    Title,
    Actor,
    Genre,
    Director,
}

pub fn get_movie(repo: &dyn Repository, movie_id: MovieId) -> Result<MovieView> {
    repo.get_movie(movie_id)
        .map(|movie| MovieView::new(movie, repo))
        .ok_or(ServiceError::NonExistentMovie(movie_id))
}

pub fn get_first_movie(repo: &dyn Repository) -> Option<MovieView> {
    repo.get_first_movie().map(|movie| MovieView::new(movie, repo))
}

pub fn get_last_movie(repo: &dyn Repository) -> Option<MovieView> {
    repo.get_last_movie().map(|movie| MovieView::new(movie, repo))
}

/// Movies of `year` plus the neighbouring years that have movies.
///
/// An unknown year gives an empty page with no neighbours.
pub fn get_movies_by_year(repo: &dyn Repository, year: u16) -> YearPage {
    let movies = repo.get_movies_by_year(year);
    let Some(first) = movies.first() else {
        return YearPage::default();
    };

    YearPage {
        previous_year: repo.get_year_of_previous_movie(first),
        next_year: repo.get_year_of_next_movie(first),
        movies: movie_views(&movies, repo),
    }
}

/// Ids of the movies tagged `genre_name`, best rated first.
pub fn get_movie_ids_for_genre(repo: &dyn Repository, genre_name: &str) -> Vec<MovieId> {
    repo.get_movie_ids_for_genre(genre_name)
}

pub fn get_movies_by_id(repo: &dyn Repository, ids: &[MovieId]) -> Vec<MovieView> {
    movie_views(&repo.get_movies_by_id(ids), repo)
}

pub fn get_comments_for_movie(repo: &dyn Repository, movie_id: MovieId) -> Result<Vec<CommentView>> {
    repo.get_movie(movie_id)
        .map(|movie| comment_views(movie.reviews()))
        .ok_or(ServiceError::NonExistentMovie(movie_id))
}

/// Post a comment by `username` on a movie, timestamped now.
pub fn add_comment(
    repo: &mut dyn Repository,
    movie_id: MovieId,
    comment_text: &str,
    username: &str,
) -> Result<()> {
    if repo.get_movie(movie_id).is_none() {
        return Err(ServiceError::NonExistentMovie(movie_id));
    }
    let Some(user) = repo.get_user(username) else {
        return Err(ServiceError::UnknownUser(username.to_string()));
    };

    let review = Review::new(
        movie_id,
        user.username(),
        comment_text,
        None,
        Local::now().naive_local(),
    )?;
    if !repo.link_review(&review) {
        return Err(RepositoryError::CommentNotLinked {
            reason: format!("user '{}' or movie {} went missing", username, movie_id),
        }
        .into());
    }
    repo.add_comment(review)?;

    debug!("User '{}' commented on movie {}", username, movie_id);
    Ok(())
}

/// Case-insensitive search; a title must match exactly, the other fields
/// resolve to the first matching actor, genre or director.
pub fn search_movies(repo: &dyn Repository, field: SearchField, query: &str) -> Vec<MovieView> {
    let movies = match field {
        SearchField::Title => repo.get_movies(query),
        SearchField::Actor => repo.get_movies_for_actor(query),
        SearchField::Genre => repo.get_movies_for_genre(query),
        SearchField::Director => repo.get_movies_for_director(query),
    };
    movie_views(&movies, repo)
}

pub fn get_genre_names(repo: &dyn Repository) -> Vec<String> {
    repo.genres().iter().map(|genre| genre.name().to_string()).collect()
}

pub fn get_years(repo: &dyn Repository) -> Vec<u16> {
    repo.years()
}

/// Up to `quantity` distinct movies picked at random.
pub fn get_random_movies(repo: &dyn Repository, quantity: usize) -> Vec<MovieSummary> {
    repo.iter_movies()
        .choose_multiple(&mut rand::rng(), quantity)
        .into_iter()
        .map(MovieSummary::from)
        .collect()
}
