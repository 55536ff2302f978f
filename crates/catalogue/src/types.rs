//! Core domain types for the movie catalogue.
//!
//! Entities never point at each other directly. A movie lists its actors and
//! genres by value (their identity is their name), reviews and watchlists
//! refer to movies by `MovieId`, and users are addressed by their normalized
//! username. The repository owns every entity and resolves those keys.

use crate::error::ModelError;
use chrono::NaiveDateTime;
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

// =============================================================================
// Type Aliases
// =============================================================================

/// Unique identifier for a movie (the dataset's `Rank` column)
pub type MovieId = u32;

/// Earliest release year accepted for a movie
pub const MIN_RELEASE_YEAR: u16 = 1900;

fn normalize_name(raw: &str, entity: &'static str) -> Result<String, ModelError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(ModelError::EmptyName { entity });
    }
    Ok(name.to_string())
}

/// Usernames compare case-insensitively and ignore surrounding whitespace.
pub fn normalize_username(raw: &str) -> String {
    raw.trim().to_lowercase()
}

// =============================================================================
// People and Tags
// =============================================================================

/// Anything identified by a display name. Used by the repository to keep
/// actors, directors and genres in one kind of index.
pub trait Named {
    fn name(&self) -> &str;
}

/// An actor, identified by full name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Actor {
    full_name: String,
}

impl Actor {
    pub fn new(full_name: &str) -> Result<Self, ModelError> {
        Ok(Self {
            full_name: normalize_name(full_name, "Actor")?,
        })
    }
}

impl Named for Actor {
    fn name(&self) -> &str {
        &self.full_name
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Actor {}>", self.full_name)
    }
}

/// A director, identified by full name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Director {
    full_name: String,
}

impl Director {
    pub fn new(full_name: &str) -> Result<Self, ModelError> {
        Ok(Self {
            full_name: normalize_name(full_name, "Director")?,
        })
    }
}

impl Named for Director {
    fn name(&self) -> &str {
        &self.full_name
    }
}

impl fmt::Display for Director {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Director {}>", self.full_name)
    }
}

/// A genre tag such as "Sci-Fi".
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Genre {
    name: String,
}

impl Genre {
    pub fn new(name: &str) -> Result<Self, ModelError> {
        Ok(Self {
            name: normalize_name(name, "Genre")?,
        })
    }
}

impl Named for Genre {
    fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Genre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Genre {}>", self.name)
    }
}

// =============================================================================
// Movie
// =============================================================================

/// A movie from the dataset.
///
/// Two movies are the same movie when title and year match, whatever their
/// ids. Ordering by release year is [`Movie::cmp_by_year`]; an `Ord` impl
/// would disagree with `Eq`.
#[derive(Debug, Clone, Serialize)]
pub struct Movie {
    id: MovieId,
    title: String,
    /// `None` when the release year is unknown
    year: Option<u16>,
    description: Option<String>,
    runtime_minutes: Option<u32>,
    rating: Option<f32>,
    votes: Option<u32>,
    director: Option<Director>,
    actors: Vec<Actor>,
    genres: Vec<Genre>,
    reviews: Vec<Review>,
}

impl Movie {
    pub fn new(id: MovieId, title: &str, year: Option<u16>) -> Result<Self, ModelError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(ModelError::EmptyTitle);
        }
        if let Some(year) = year {
            if year < MIN_RELEASE_YEAR {
                return Err(ModelError::InvalidYear(year));
            }
        }
        Ok(Self {
            id,
            title: title.to_string(),
            year,
            description: None,
            runtime_minutes: None,
            rating: None,
            votes: None,
            director: None,
            actors: Vec::new(),
            genres: Vec::new(),
            reviews: Vec::new(),
        })
    }

    /// Blank descriptions are stored as `None`.
    pub fn with_description(mut self, description: &str) -> Self {
        let description = description.trim();
        self.description = (!description.is_empty()).then(|| description.to_string());
        self
    }

    pub fn with_runtime(mut self, minutes: u32) -> Result<Self, ModelError> {
        if minutes == 0 {
            return Err(ModelError::InvalidRuntime(minutes));
        }
        self.runtime_minutes = Some(minutes);
        Ok(self)
    }

    /// Ratings must be finite and within `0.0..=10.0`.
    pub fn with_rating(mut self, rating: Option<f32>) -> Result<Self, ModelError> {
        if let Some(rating) = rating {
            if !(0.0..=10.0).contains(&rating) {
                return Err(ModelError::InvalidMovieRating(rating));
            }
        }
        self.rating = rating;
        Ok(self)
    }

    pub fn with_votes(mut self, votes: Option<u32>) -> Self {
        self.votes = votes;
        self
    }

    pub fn with_director(mut self, director: Director) -> Self {
        self.director = Some(director);
        self
    }

    pub fn with_actors(mut self, actors: Vec<Actor>) -> Self {
        self.actors = actors;
        self
    }

    pub fn with_genres(mut self, genres: Vec<Genre>) -> Self {
        self.genres = genres;
        self
    }

    pub fn id(&self) -> MovieId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn year(&self) -> Option<u16> {
        self.year
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn runtime_minutes(&self) -> Option<u32> {
        self.runtime_minutes
    }

    pub fn rating(&self) -> Option<f32> {
        self.rating
    }

    pub fn votes(&self) -> Option<u32> {
        self.votes
    }

    pub fn director(&self) -> Option<&Director> {
        self.director.as_ref()
    }

    pub fn actors(&self) -> &[Actor] {
        &self.actors
    }

    pub fn genres(&self) -> &[Genre] {
        &self.genres
    }

    pub fn reviews(&self) -> &[Review] {
        &self.reviews
    }

    /// Compare by release year only. Unknown years sort first.
    pub fn cmp_by_year(&self, other: &Movie) -> Ordering {
        self.year.cmp(&other.year)
    }

    pub fn add_actor(&mut self, actor: Actor) {
        self.actors.push(actor);
    }

    /// Removes the first matching actor, if listed.
    pub fn remove_actor(&mut self, actor: &Actor) {
        if let Some(pos) = self.actors.iter().position(|a| a == actor) {
            self.actors.remove(pos);
        }
    }

    pub fn add_genre(&mut self, genre: Genre) {
        self.genres.push(genre);
    }

    pub fn remove_genre(&mut self, genre: &Genre) {
        if let Some(pos) = self.genres.iter().position(|g| g == genre) {
            self.genres.remove(pos);
        }
    }

    pub fn is_genred_by(&self, genre: &Genre) -> bool {
        self.genres.contains(genre)
    }

    pub fn add_review(&mut self, review: Review) {
        if !self.reviews.contains(&review) {
            self.reviews.push(review);
        }
    }

    pub fn has_review(&self, review: &Review) -> bool {
        self.reviews.contains(review)
    }
}

impl PartialEq for Movie {
    fn eq(&self, other: &Self) -> bool {
        self.title == other.title && self.year == other.year
    }
}

impl Eq for Movie {}

impl Hash for Movie {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.title.hash(state);
        self.year.hash(state);
    }
}

impl fmt::Display for Movie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.year {
            Some(year) => write!(f, "<Movie {}, {}, {}>", self.title, year, self.id),
            None => write!(f, "<Movie {}, ?, {}>", self.title, self.id),
        }
    }
}

// =============================================================================
// Review
// =============================================================================

/// A comment left by a user on a movie, optionally with a 1-10 rating.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Review {
    movie_id: MovieId,
    username: String,
    text: String,
    rating: Option<u8>,
    timestamp: NaiveDateTime,
}

impl Review {
    pub fn new(
        movie_id: MovieId,
        username: &str,
        text: &str,
        rating: Option<u8>,
        timestamp: NaiveDateTime,
    ) -> Result<Self, ModelError> {
        if text.trim().is_empty() {
            return Err(ModelError::EmptyText);
        }
        if let Some(rating) = rating {
            if !(1..=10).contains(&rating) {
                return Err(ModelError::InvalidRating(rating));
            }
        }
        Ok(Self {
            movie_id,
            username: normalize_name(&normalize_username(username), "User")?,
            text: text.to_string(),
            rating,
            timestamp,
        })
    }

    pub fn movie_id(&self) -> MovieId {
        self.movie_id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn rating(&self) -> Option<u8> {
        self.rating
    }

    pub fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }
}

// =============================================================================
// Watchlist
// =============================================================================

/// Movies a user intends to watch, in the order they were added.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Watchlist {
    movies: Vec<MovieId>,
}

impl Watchlist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the movie. Returns `false` if it is already listed.
    pub fn add_movie(&mut self, movie_id: MovieId) -> bool {
        if self.contains(movie_id) {
            return false;
        }
        self.movies.push(movie_id);
        true
    }

    /// Returns `false` if the movie was not listed.
    pub fn remove_movie(&mut self, movie_id: MovieId) -> bool {
        match self.movies.iter().position(|&id| id == movie_id) {
            Some(pos) => {
                self.movies.remove(pos);
                true
            }
            None => false,
        }
    }

    pub fn select_movie_to_watch(&self, index: usize) -> Option<MovieId> {
        self.movies.get(index).copied()
    }

    pub fn first_movie(&self) -> Option<MovieId> {
        self.movies.first().copied()
    }

    pub fn contains(&self, movie_id: MovieId) -> bool {
        self.movies.contains(&movie_id)
    }

    pub fn size(&self) -> usize {
        self.movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = MovieId> + '_ {
        self.movies.iter().copied()
    }
}

impl<'a> IntoIterator for &'a Watchlist {
    type Item = &'a MovieId;
    type IntoIter = std::slice::Iter<'a, MovieId>;

    fn into_iter(self) -> Self::IntoIter {
        self.movies.iter()
    }
}

// =============================================================================
// User
// =============================================================================

/// A registered user.
///
/// Identity is the normalized username. The password is stored already
/// hashed; see [`crate::auth::PasswordHasher`].
#[derive(Debug, Clone, Serialize)]
pub struct User {
    username: String,
    #[serde(skip_serializing)]
    password: String,
    reviews: Vec<Review>,
    watchlist: Watchlist,
    watched_movies: Vec<MovieId>,
    watched_minutes: u32,
}

impl User {
    pub fn new(username: &str, password_hash: &str) -> Result<Self, ModelError> {
        if password_hash.is_empty() {
            return Err(ModelError::EmptyPassword);
        }
        Ok(Self {
            username: normalize_name(&normalize_username(username), "User")?,
            password: password_hash.to_string(),
            reviews: Vec::new(),
            watchlist: Watchlist::new(),
            watched_movies: Vec::new(),
            watched_minutes: 0,
        })
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn reviews(&self) -> &[Review] {
        &self.reviews
    }

    /// Ignores a review the user already authored.
    pub fn add_review(&mut self, review: Review) {
        if !self.reviews.contains(&review) {
            self.reviews.push(review);
        }
    }

    pub fn has_review(&self, review: &Review) -> bool {
        self.reviews.contains(review)
    }

    pub fn watchlist(&self) -> &Watchlist {
        &self.watchlist
    }

    pub fn watchlist_mut(&mut self) -> &mut Watchlist {
        &mut self.watchlist
    }

    pub fn watched_movies(&self) -> &[MovieId] {
        &self.watched_movies
    }

    /// Total runtime of every distinct movie watched
    pub fn watched_minutes(&self) -> u32 {
        self.watched_minutes
    }

    /// Records the movie as watched. A movie only counts once.
    pub fn watch_movie(&mut self, movie: &Movie) -> bool {
        if self.watched_movies.contains(&movie.id()) {
            return false;
        }
        self.watched_movies.push(movie.id());
        if let Some(minutes) = movie.runtime_minutes() {
            self.watched_minutes = self.watched_minutes.saturating_add(minutes);
        }
        true
    }
}

impl PartialEq for User {
    fn eq(&self, other: &Self) -> bool {
        self.username == other.username
    }
}

impl Eq for User {}

impl PartialOrd for User {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for User {
    fn cmp(&self, other: &Self) -> Ordering {
        self.username.cmp(&other.username)
    }
}

impl Hash for User {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.username.hash(state);
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<User {}>", self.username)
    }
}
