//! Building a `MemoryRepository` from the CSV files.
//!
//! Loading is all-or-nothing: rows are linked into a fresh repository which is
//! only handed back once every movie, user and comment has been accepted. Any
//! failure drops the half-built repository with the error.

use crate::auth::{Argon2Hasher, PasswordHasher};
use crate::error::{DataLoadError, ModelError, RepositoryError, Result};
use crate::parser::{self, CommentRecord, MovieRecord, UserRecord};
use crate::repository::{MemoryRepository, Repository};
use crate::types::*;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Default file names inside a data directory
pub const MOVIES_FILE: &str = "Data1000Movies.csv";
pub const USERS_FILE: &str = "users.csv";
pub const COMMENTS_FILE: &str = "comments.csv";

/// Locations of the three input files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataFiles {
    pub movies: PathBuf,
    pub users: PathBuf,
    pub comments: PathBuf,
}

impl DataFiles {
    /// The default file names inside `data_dir`
    pub fn in_dir(data_dir: &Path) -> Self {
        Self {
            movies: data_dir.join(MOVIES_FILE),
            users: data_dir.join(USERS_FILE),
            comments: data_dir.join(COMMENTS_FILE),
        }
    }
}

fn invalid_row(file: &Path, line: usize, err: ModelError) -> DataLoadError {
    DataLoadError::ParseError {
        file: file
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown.csv")
            .to_string(),
        line,
        reason: err.to_string(),
    }
}

impl MovieRecord {
    /// Build the `Movie` this row describes
    pub fn to_movie(&self) -> std::result::Result<Movie, ModelError> {
        let director = match self.director.trim() {
            "" => None,
            name => Some(Director::new(name)?),
        };
        let actors = self
            .actors
            .iter()
            .map(|name| Actor::new(name))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let genres = self
            .genres
            .iter()
            .map(|name| Genre::new(name))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut movie = Movie::new(self.rank, &self.title, Some(self.year))?
            .with_description(&self.description)
            .with_runtime(self.runtime_minutes)?
            .with_rating(self.rating)?
            .with_votes(self.votes)
            .with_actors(actors)
            .with_genres(genres);
        if let Some(director) = director {
            movie = movie.with_director(director);
        }
        Ok(movie)
    }
}

impl MemoryRepository {
    /// Load the catalogue from the default files in `data_dir`.
    ///
    /// Passwords are hashed with a default [`Argon2Hasher`].
    pub fn load_from_files(data_dir: &Path) -> Result<Self> {
        Self::load(&DataFiles::in_dir(data_dir), &Argon2Hasher::new())
    }

    /// Load the catalogue from explicit file locations.
    ///
    /// Steps:
    /// 1. Parse the three files in parallel
    /// 2. Insert movies (which fills every derived mapping)
    /// 3. Insert users, hashing their passwords
    /// 4. Link and insert comments
    pub fn load(files: &DataFiles, hasher: &dyn PasswordHasher) -> Result<Self> {
        info!("Loading movie catalogue from {:?}", files.movies.parent());

        // Rayon's `join` runs two closures in parallel; nest for three files
        let ((movies, users), comments) = rayon::join(
            || {
                rayon::join(
                    || parser::parse_movies(&files.movies),
                    || parser::parse_users(&files.users),
                )
            },
            || parser::parse_comments(&files.comments),
        );
        let movies = movies?;
        let users = users?;
        let comments = comments?;
        debug!(
            "Parsed {} movie rows, {} user rows, {} comment rows",
            movies.len(),
            users.len(),
            comments.len()
        );

        let mut repo = MemoryRepository::new();
        repo.insert_movie_records(&files.movies, &movies)?;
        let authors = repo.insert_user_records(&files.users, &users, hasher)?;
        repo.insert_comment_records(&files.comments, &comments, &authors)?;

        let (users, movies, reviews) = repo.counts();
        info!(
            "Loaded {} movies, {} users, {} comments ({} genres, {} actors, {} directors)",
            movies,
            users,
            reviews,
            repo.genres().len(),
            repo.actors().len(),
            repo.directors().len()
        );
        Ok(repo)
    }

    fn insert_movie_records(&mut self, file: &Path, records: &[MovieRecord]) -> Result<()> {
        for record in records {
            let movie = record
                .to_movie()
                .map_err(|err| invalid_row(file, record.line, err))?;
            self.add_movie(movie)?;
        }
        Ok(())
    }

    /// Returns the users file's row id -> username map, used to resolve comment authors.
    fn insert_user_records(
        &mut self,
        file: &Path,
        records: &[UserRecord],
        hasher: &dyn PasswordHasher,
    ) -> Result<HashMap<String, String>> {
        let mut authors = HashMap::with_capacity(records.len());
        for record in records {
            if record.password.is_empty() {
                return Err(invalid_row(file, record.line, ModelError::EmptyPassword));
            }
            let user = hasher
                .hash(&record.password)
                .and_then(|hashed| User::new(&record.username, &hashed))
                .map_err(|err| invalid_row(file, record.line, err))?;
            authors.insert(record.row_id.clone(), user.username().to_string());
            self.add_user(user)?;
        }
        Ok(authors)
    }

    fn insert_comment_records(
        &mut self,
        file: &Path,
        records: &[CommentRecord],
        authors: &HashMap<String, String>,
    ) -> Result<()> {
        for record in records {
            let username = authors.get(&record.user_row_id).ok_or_else(|| {
                DataLoadError::MissingReference {
                    entity: "User".to_string(),
                    id: record.user_row_id.clone(),
                }
            })?;
            if self.get_movie(record.movie_id).is_none() {
                return Err(DataLoadError::MissingReference {
                    entity: "Movie".to_string(),
                    id: record.movie_id.to_string(),
                });
            }

            let review = Review::new(record.movie_id, username, &record.text, None, record.timestamp)
                .map_err(|err| invalid_row(file, record.line, err))?;
            if !self.link_review(&review) {
                return Err(RepositoryError::CommentNotLinked {
                    reason: format!("row {} of {}", record.line, file.display()),
                }
                .into());
            }
            self.add_comment(review)?;
        }
        Ok(())
    }
}
