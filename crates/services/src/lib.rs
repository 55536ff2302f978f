//! Service layer over the movie catalogue.
//!
//! This crate provides:
//! - Views: owned, serializable copies of movies, genres, comments and users
//! - Movie use-cases: browsing by year/genre/id, search, comments, random picks
//! - Auth use-cases: registration, lookup and login
//! - Watchlist use-cases
//!
//! Every function takes the repository explicitly, as `&dyn Repository` for
//! reads and `&mut dyn Repository` for writes.
//!
//! ## Example Usage
//! ```ignore
//! use catalogue::MemoryRepository;
//! use services::movies;
//!
//! let mut repo = MemoryRepository::load_from_files(Path::new("data"))?;
//!
//! let page = movies::get_movies_by_year(&repo, 2016);
//! println!("{} movies, previous year {:?}", page.movies.len(), page.previous_year);
//!
//! movies::add_comment(&mut repo, 3, "Great twist", "thorke")?;
//! ```

pub mod auth;
pub mod error;
pub mod movies;
pub mod views;
pub mod watchlist;

// Re-export main types
pub use error::{Result, ServiceError};
pub use movies::SearchField;
pub use views::{CommentView, GenreView, MovieSummary, MovieView, UserView, YearPage};
