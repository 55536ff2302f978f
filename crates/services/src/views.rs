//! Display-ready copies of repository entities.
//!
//! Views own their data, so they can outlive the repository borrow and be
//! serialized straight to JSON.

use catalogue::{Genre, Movie, MovieId, Named, Repository, Review, User};
use chrono::NaiveDateTime;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MovieView {
    pub id: MovieId,
    pub year: Option<u16>,
    pub title: String,
    pub description: Option<String>,
    pub runtime_minutes: Option<u32>,
    pub rating: Option<f32>,
    pub director: Option<String>,
    pub actors: Vec<String>,
    pub genres: Vec<GenreView>,
    pub comments: Vec<CommentView>,
}

/// A genre with the ids of every movie tagged with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenreView {
    pub name: String,
    pub tagged_movies: Vec<MovieId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentView {
    pub username: String,
    pub movie_id: MovieId,
    pub comment_text: String,
    pub timestamp: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserView {
    pub username: String,
    /// Password hash; never serialized
    #[serde(skip_serializing)]
    pub password: String,
    pub watched_minutes: u32,
    pub watchlist: Vec<MovieId>,
}

/// Just enough of a movie to render a link to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MovieSummary {
    pub id: MovieId,
    pub year: Option<u16>,
    pub title: String,
}

/// One page of a year listing, with the neighbouring years for navigation.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct YearPage {
    pub movies: Vec<MovieView>,
    pub previous_year: Option<u16>,
    pub next_year: Option<u16>,
}

impl MovieView {
    pub fn new(movie: &Movie, repo: &dyn Repository) -> Self {
        Self {
            id: movie.id(),
            year: movie.year(),
            title: movie.title().to_string(),
            description: movie.description().map(str::to_string),
            runtime_minutes: movie.runtime_minutes(),
            rating: movie.rating(),
            director: movie.director().map(|d| d.name().to_string()),
            actors: movie.actors().iter().map(|a| a.name().to_string()).collect(),
            genres: movie
                .genres()
                .iter()
                .map(|genre| GenreView::new(genre, repo))
                .collect(),
            comments: comment_views(movie.reviews()),
        }
    }
}

impl GenreView {
    pub fn new(genre: &Genre, repo: &dyn Repository) -> Self {
        Self {
            name: genre.name().to_string(),
            tagged_movies: repo
                .get_movies_by_genre(genre)
                .iter()
                .map(|movie| movie.id())
                .collect(),
        }
    }
}

impl From<&Review> for CommentView {
    fn from(review: &Review) -> Self {
        Self {
            username: review.username().to_string(),
            movie_id: review.movie_id(),
            comment_text: review.text().to_string(),
            timestamp: review.timestamp(),
        }
    }
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            username: user.username().to_string(),
            password: user.password().to_string(),
            watched_minutes: user.watched_minutes(),
            watchlist: user.watchlist().iter().collect(),
        }
    }
}

impl From<&Movie> for MovieSummary {
    fn from(movie: &Movie) -> Self {
        Self {
            id: movie.id(),
            year: movie.year(),
            title: movie.title().to_string(),
        }
    }
}

pub fn movie_views(movies: &[&Movie], repo: &dyn Repository) -> Vec<MovieView> {
    movies.iter().map(|movie| MovieView::new(movie, repo)).collect()
}

pub fn comment_views(reviews: &[Review]) -> Vec<CommentView> {
    reviews.iter().map(CommentView::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalogue::{Actor, Director, MemoryRepository, parse_timestamp};

    fn create_test_repository() -> MemoryRepository {
        let mut repo = MemoryRepository::new();
        let genres = |names: &[&str]| -> Vec<Genre> {
            names.iter().map(|n| Genre::new(n).unwrap()).collect()
        };

        repo.add_movie(
            Movie::new(1, "Guardians of the Galaxy", Some(2014))
                .unwrap()
                .with_description("A group of intergalactic criminals.")
                .with_director(Director::new("James Gunn").unwrap())
                .with_actors(vec![Actor::new("Chris Pratt").unwrap()])
                .with_genres(genres(&["Action", "Sci-Fi"])),
        )
        .unwrap();
        repo.add_movie(
            Movie::new(2, "Prometheus", Some(2012))
                .unwrap()
                .with_genres(genres(&["Sci-Fi"])),
        )
        .unwrap();
        repo.add_user(User::new("thorke", "$argon2id$v=19$m=8,t=1,p=1$c2FsdA$ZGlnZXN0").unwrap())
            .unwrap();
        repo
    }

    #[test]
    fn test_movie_view() {
        let repo = create_test_repository();
        let view = MovieView::new(repo.get_movie(1).unwrap(), &repo);

        assert_eq!(view.title, "Guardians of the Galaxy");
        assert_eq!(view.description.as_deref(), Some("A group of intergalactic criminals."));
        assert_eq!(view.director.as_deref(), Some("James Gunn"));
        assert_eq!(view.actors, vec!["Chris Pratt"]);
        assert_eq!(view.genres[0].name, "Action");
        assert_eq!(view.genres[1].tagged_movies, vec![1, 2]);
        assert!(view.comments.is_empty());
    }

    #[test]
    fn test_comment_view() {
        let timestamp = parse_timestamp("2020-02-28 14:31:26").unwrap();
        let review = Review::new(1, "thorke", "Loved it", None, timestamp).unwrap();
        let view = CommentView::from(&review);

        assert_eq!(view.username, "thorke");
        assert_eq!(view.movie_id, 1);
        assert_eq!(view.comment_text, "Loved it");
        assert_eq!(view.timestamp, timestamp);
    }

    #[test]
    fn test_user_view_hides_password_from_json() {
        let repo = create_test_repository();
        let view = UserView::from(repo.get_user("thorke").unwrap());

        assert_eq!(view.password, "$argon2id$v=19$m=8,t=1,p=1$c2FsdA$ZGlnZXN0");
        let json = serde_json::to_string(&view).unwrap();
        assert!(json.contains("\"username\":\"thorke\""));
        assert!(!json.contains("password"));
    }
}
