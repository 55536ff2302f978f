//! The repository: sole owner of every entity once ingestion is done.
//!
//! [`Repository`] is the contract the service layer programs against;
//! [`MemoryRepository`] is its in-memory implementation. Alongside the
//! primary store (`MovieId -> Movie`) the repository keeps:
//! - the primary sequence, movie ids ordered by release year
//! - a year index (`BTreeMap`, so distinct years come out sorted)
//! - genre, actor and director indices, each entity with its movie ids
//! - users keyed by normalized username, plus every accepted review
//!
//! All of these are updated by a single `&mut self` call, so a movie can never
//! be visible in one index but missing from another.

use crate::error::RepositoryError;
use crate::types::*;
use chrono::NaiveDateTime;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;
use std::ops::Bound::{Excluded, Unbounded};

/// Read/write surface of the catalogue.
///
/// Lookups that find nothing return `None` or an empty `Vec`, never an error.
/// Returned collections are freshly built and only borrow the entities, so
/// callers cannot disturb the indices through them.
pub trait Repository {
    // -- movies ---------------------------------------------------------

    /// Insert a movie and register it under its year, genres, actors and director.
    fn add_movie(&mut self, movie: Movie) -> Result<(), RepositoryError>;
    fn get_movie(&self, id: MovieId) -> Option<&Movie>;
    fn movie_count(&self) -> usize;
    fn get_first_movie(&self) -> Option<&Movie>;
    fn get_last_movie(&self) -> Option<&Movie>;
    /// Known ids in the caller's order; unknown ids are dropped.
    fn get_movies_by_id(&self, ids: &[MovieId]) -> Vec<&Movie>;
    /// A window of the year-ordered sequence.
    fn movies_page(&self, offset: usize, limit: usize) -> Vec<&Movie>;
    /// Every movie in year order.
    fn iter_movies(&self) -> Box<dyn Iterator<Item = &Movie> + '_>;

    // -- derived mappings -----------------------------------------------

    fn get_movies_by_year(&self, year: u16) -> Vec<&Movie>;
    fn get_movies_by_genre(&self, genre: &Genre) -> Vec<&Movie>;
    fn get_movies_by_actor(&self, actor: &Actor) -> Vec<&Movie>;
    fn get_movies_by_director(&self, director: &Director) -> Vec<&Movie>;
    /// Ids tagged with the genre, best rated first.
    fn get_movie_ids_for_genre(&self, name: &str) -> Vec<MovieId>;
    /// Ids released in the year, best rated first.
    fn get_movie_ids_for_year(&self, year: u16) -> Vec<MovieId>;
    fn get_year_of_previous_movie(&self, movie: &Movie) -> Option<u16>;
    fn get_year_of_next_movie(&self, movie: &Movie) -> Option<u16>;
    /// Distinct known years, ascending
    fn years(&self) -> Vec<u16>;

    // -- tags and people ------------------------------------------------

    fn add_genre(&mut self, genre: Genre);
    fn add_actor(&mut self, actor: Actor);
    fn add_director(&mut self, director: Director);
    fn genres(&self) -> &[Genre];
    fn actors(&self) -> &[Actor];
    fn directors(&self) -> &[Director];

    // -- free-text search (case-insensitive) ----------------------------

    fn get_movies(&self, title: &str) -> Vec<&Movie>;
    fn get_movies_for_actor(&self, name: &str) -> Vec<&Movie>;
    fn get_movies_for_genre(&self, name: &str) -> Vec<&Movie>;
    fn get_movies_for_director(&self, name: &str) -> Vec<&Movie>;

    // -- users, reviews, watchlists -------------------------------------

    fn add_user(&mut self, user: User) -> Result<(), RepositoryError>;
    fn get_user(&self, username: &str) -> Option<&User>;
    fn get_user_mut(&mut self, username: &str) -> Option<&mut User>;
    /// Attach a review to its user and its movie. `false` if either is unknown.
    fn link_review(&mut self, review: &Review) -> bool;
    /// Build a review and link it to its user and movie; `None` if either is unknown.
    fn make_review(
        &mut self,
        username: &str,
        movie_id: MovieId,
        text: &str,
        timestamp: NaiveDateTime,
    ) -> Option<Review>;
    /// Accept a review that is already linked to both its user and its movie.
    fn add_comment(&mut self, review: Review) -> Result<(), RepositoryError>;
    fn get_comments(&self) -> &[Review];
    fn add_to_watch_list(&mut self, username: &str, movie_id: MovieId) -> bool;
    fn remove_from_watch_list(&mut self, username: &str, movie_id: MovieId) -> bool;
    fn get_watch_list(&self, username: &str) -> Vec<&Movie>;
    fn watch_movie(&mut self, username: &str, movie_id: MovieId) -> bool;
}

// =============================================================================
// Credit index (genres, actors, directors)
// =============================================================================

/// Entities in first-seen order, each with the ids of the movies it tags.
#[derive(Debug)]
struct CreditIndex<E> {
    entries: Vec<E>,
    movies: Vec<Vec<MovieId>>,
    positions: HashMap<E, usize>,
}

impl<E> Default for CreditIndex<E> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            movies: Vec::new(),
            positions: HashMap::new(),
        }
    }
}

impl<E: Named + Eq + Hash + Clone> CreditIndex<E> {
    /// Returns the slot of the entity, creating it on first sight.
    fn add(&mut self, entity: &E) -> usize {
        if let Some(&pos) = self.positions.get(entity) {
            return pos;
        }
        let pos = self.entries.len();
        self.entries.push(entity.clone());
        self.movies.push(Vec::new());
        self.positions.insert(entity.clone(), pos);
        pos
    }

    fn register(&mut self, entity: &E, movie_id: MovieId) {
        let pos = self.add(entity);
        let movies = &mut self.movies[pos];
        if !movies.contains(&movie_id) {
            movies.push(movie_id);
        }
    }

    fn movies_of(&self, entity: &E) -> &[MovieId] {
        self.positions
            .get(entity)
            .map(|&pos| self.movies[pos].as_slice())
            .unwrap_or(&[])
    }

    /// First entity, in first-seen order, whose name matches ignoring case.
    fn find_by_name(&self, name: &str) -> &[MovieId] {
        let wanted = name.trim().to_lowercase();
        self.entries
            .iter()
            .position(|entity| entity.name().to_lowercase() == wanted)
            .map(|pos| self.movies[pos].as_slice())
            .unwrap_or(&[])
    }
}

// =============================================================================
// MemoryRepository
// =============================================================================

/// In-memory [`Repository`], populated once at startup.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    // Primary data stores
    pub(crate) movies: HashMap<MovieId, Movie>,
    /// Movie ids ordered by year
    pub(crate) movie_order: Vec<MovieId>,

    // Derived mappings
    pub(crate) year_index: BTreeMap<u16, Vec<MovieId>>,
    genres: CreditIndex<Genre>,
    actors: CreditIndex<Actor>,
    directors: CreditIndex<Director>,

    pub(crate) users: HashMap<String, User>,
    pub(crate) reviews: Vec<Review>,
}

impl MemoryRepository {
    /// Creates a new, empty repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Iterate the movies in year order. Each call starts from the beginning.
    pub fn iter(&self) -> MovieIter<'_> {
        MovieIter {
            ids: self.movie_order.iter(),
            movies: &self.movies,
        }
    }

    /// `(users, movies, reviews)`, for logging and sanity checks
    pub fn counts(&self) -> (usize, usize, usize) {
        (self.users.len(), self.movies.len(), self.reviews.len())
    }

    /// Whether two different actors appear together in at least one movie.
    pub fn actors_worked_together(&self, first: &Actor, second: &Actor) -> bool {
        if first == second {
            return false;
        }
        let theirs = self.actors.movies_of(second);
        self.actors
            .movies_of(first)
            .iter()
            .any(|id| theirs.contains(id))
    }

    fn resolve(&self, ids: &[MovieId]) -> Vec<&Movie> {
        ids.iter().filter_map(|id| self.movies.get(id)).collect()
    }

    /// Stable sort, highest rating first; unrated movies go last.
    fn sorted_by_rating(&self, ids: &[MovieId]) -> Vec<MovieId> {
        let rating = |id: &MovieId| self.movies.get(id).and_then(Movie::rating);
        let mut ids = ids.to_vec();
        ids.sort_by(|a, b| match (rating(a), rating(b)) {
            (Some(x), Some(y)) => y.total_cmp(&x),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        });
        ids
    }

    /// The year of `movie`, provided that year is in the year index.
    fn indexed_year(&self, movie: &Movie) -> Option<u16> {
        movie.year().filter(|year| self.year_index.contains_key(year))
    }
}

impl Repository for MemoryRepository {
    fn add_movie(&mut self, movie: Movie) -> Result<(), RepositoryError> {
        let id = movie.id();
        if self.movies.contains_key(&id) {
            return Err(RepositoryError::DuplicateMovie(id));
        }

        // Leftmost slot among movies of the same year
        let year = movie.year();
        let pos = self
            .movie_order
            .partition_point(|other| self.movies.get(other).and_then(Movie::year) < year);
        self.movie_order.insert(pos, id);

        if let Some(year) = year {
            let ids = self.year_index.entry(year).or_default();
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        for genre in movie.genres() {
            self.genres.register(genre, id);
        }
        for actor in movie.actors() {
            self.actors.register(actor, id);
        }
        if let Some(director) = movie.director() {
            self.directors.register(director, id);
        }

        self.movies.insert(id, movie);
        Ok(())
    }

    fn get_movie(&self, id: MovieId) -> Option<&Movie> {
        self.movies.get(&id)
    }

    fn movie_count(&self) -> usize {
        self.movies.len()
    }

    fn get_first_movie(&self) -> Option<&Movie> {
        self.movie_order.first().and_then(|id| self.movies.get(id))
    }

    fn get_last_movie(&self) -> Option<&Movie> {
        self.movie_order.last().and_then(|id| self.movies.get(id))
    }

    fn get_movies_by_id(&self, ids: &[MovieId]) -> Vec<&Movie> {
        self.resolve(ids)
    }

    fn movies_page(&self, offset: usize, limit: usize) -> Vec<&Movie> {
        self.iter().skip(offset).take(limit).collect()
    }

    fn iter_movies(&self) -> Box<dyn Iterator<Item = &Movie> + '_> {
        Box::new(self.iter())
    }

    fn get_movies_by_year(&self, year: u16) -> Vec<&Movie> {
        self.year_index
            .get(&year)
            .map(|ids| self.resolve(ids))
            .unwrap_or_default()
    }

    fn get_movies_by_genre(&self, genre: &Genre) -> Vec<&Movie> {
        self.resolve(self.genres.movies_of(genre))
    }

    fn get_movies_by_actor(&self, actor: &Actor) -> Vec<&Movie> {
        self.resolve(self.actors.movies_of(actor))
    }

    fn get_movies_by_director(&self, director: &Director) -> Vec<&Movie> {
        self.resolve(self.directors.movies_of(director))
    }

    fn get_movie_ids_for_genre(&self, name: &str) -> Vec<MovieId> {
        match Genre::new(name) {
            Ok(genre) => self.sorted_by_rating(self.genres.movies_of(&genre)),
            Err(_) => Vec::new(),
        }
    }

    fn get_movie_ids_for_year(&self, year: u16) -> Vec<MovieId> {
        self.year_index
            .get(&year)
            .map(|ids| self.sorted_by_rating(ids))
            .unwrap_or_default()
    }

    fn get_year_of_previous_movie(&self, movie: &Movie) -> Option<u16> {
        let year = self.indexed_year(movie)?;
        self.year_index.range(..year).next_back().map(|(&y, _)| y)
    }

    fn get_year_of_next_movie(&self, movie: &Movie) -> Option<u16> {
        let year = self.indexed_year(movie)?;
        self.year_index
            .range((Excluded(year), Unbounded))
            .next()
            .map(|(&y, _)| y)
    }

    fn years(&self) -> Vec<u16> {
        self.year_index.keys().copied().collect()
    }

    fn add_genre(&mut self, genre: Genre) {
        self.genres.add(&genre);
    }

    fn add_actor(&mut self, actor: Actor) {
        self.actors.add(&actor);
    }

    fn add_director(&mut self, director: Director) {
        self.directors.add(&director);
    }

    fn genres(&self) -> &[Genre] {
        &self.genres.entries
    }

    fn actors(&self) -> &[Actor] {
        &self.actors.entries
    }

    fn directors(&self) -> &[Director] {
        &self.directors.entries
    }

    fn get_movies(&self, title: &str) -> Vec<&Movie> {
        let wanted = title.trim().to_lowercase();
        self.iter()
            .filter(|movie| movie.title().to_lowercase() == wanted)
            .collect()
    }

    fn get_movies_for_actor(&self, name: &str) -> Vec<&Movie> {
        self.resolve(self.actors.find_by_name(name))
    }

    fn get_movies_for_genre(&self, name: &str) -> Vec<&Movie> {
        self.resolve(self.genres.find_by_name(name))
    }

    fn get_movies_for_director(&self, name: &str) -> Vec<&Movie> {
        self.resolve(self.directors.find_by_name(name))
    }

    fn add_user(&mut self, user: User) -> Result<(), RepositoryError> {
        if self.users.contains_key(user.username()) {
            return Err(RepositoryError::DuplicateUser(user.username().to_string()));
        }
        self.users.insert(user.username().to_string(), user);
        Ok(())
    }

    fn get_user(&self, username: &str) -> Option<&User> {
        self.users.get(&normalize_username(username))
    }

    fn get_user_mut(&mut self, username: &str) -> Option<&mut User> {
        self.users.get_mut(&normalize_username(username))
    }

    fn link_review(&mut self, review: &Review) -> bool {
        let (Some(user), Some(movie)) = (
            self.users.get_mut(review.username()),
            self.movies.get_mut(&review.movie_id()),
        ) else {
            return false;
        };
        user.add_review(review.clone());
        if !movie.has_review(review) {
            movie.add_review(review.clone());
        }
        true
    }

    fn make_review(
        &mut self,
        username: &str,
        movie_id: MovieId,
        text: &str,
        timestamp: NaiveDateTime,
    ) -> Option<Review> {
        let review = Review::new(movie_id, username, text, None, timestamp).ok()?;
        self.link_review(&review).then_some(review)
    }

    fn add_comment(&mut self, review: Review) -> Result<(), RepositoryError> {
        if self.reviews.contains(&review) {
            return Err(RepositoryError::DuplicateComment {
                username: review.username().to_string(),
                movie_id: review.movie_id(),
            });
        }

        let on_user = self
            .users
            .get(review.username())
            .is_some_and(|user| user.has_review(&review));
        if !on_user {
            return Err(RepositoryError::CommentNotLinked {
                reason: format!("not in the review list of user '{}'", review.username()),
            });
        }

        let on_movie = self
            .movies
            .get(&review.movie_id())
            .is_some_and(|movie| movie.has_review(&review));
        if !on_movie {
            return Err(RepositoryError::CommentNotLinked {
                reason: format!("not in the review list of movie {}", review.movie_id()),
            });
        }

        self.reviews.push(review);
        Ok(())
    }

    fn get_comments(&self) -> &[Review] {
        &self.reviews
    }

    fn add_to_watch_list(&mut self, username: &str, movie_id: MovieId) -> bool {
        if !self.movies.contains_key(&movie_id) {
            return false;
        }
        self.get_user_mut(username)
            .is_some_and(|user| user.watchlist_mut().add_movie(movie_id))
    }

    fn remove_from_watch_list(&mut self, username: &str, movie_id: MovieId) -> bool {
        self.get_user_mut(username)
            .is_some_and(|user| user.watchlist_mut().remove_movie(movie_id))
    }

    fn get_watch_list(&self, username: &str) -> Vec<&Movie> {
        self.get_user(username)
            .map(|user| {
                user.watchlist()
                    .iter()
                    .filter_map(|id| self.movies.get(&id))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn watch_movie(&mut self, username: &str, movie_id: MovieId) -> bool {
        let Some(movie) = self.movies.get(&movie_id) else {
            return false;
        };
        self.users
            .get_mut(&normalize_username(username))
            .is_some_and(|user| user.watch_movie(movie))
    }
}

/// Forward iterator over the movies in year order.
pub struct MovieIter<'a> {
    ids: std::slice::Iter<'a, MovieId>,
    movies: &'a HashMap<MovieId, Movie>,
}

impl<'a> Iterator for MovieIter<'a> {
    type Item = &'a Movie;

    fn next(&mut self) -> Option<Self::Item> {
        let movies = self.movies;
        self.ids.by_ref().find_map(|id| movies.get(id))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, self.ids.size_hint().1)
    }
}

impl<'a> IntoIterator for &'a MemoryRepository {
    type Item = &'a Movie;
    type IntoIter = MovieIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie(id: MovieId, title: &str, year: u16, rating: f32, genres: &[&str]) -> Movie {
        Movie::new(id, title, Some(year))
            .unwrap()
            .with_rating(Some(rating))
            .unwrap()
            .with_genres(genres.iter().map(|g| Genre::new(g).unwrap()).collect())
    }

    fn timestamp() -> NaiveDateTime {
        NaiveDateTime::parse_from_str("2020-02-28 14:31:26", "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn create_test_repository() -> MemoryRepository {
        let mut repo = MemoryRepository::new();

        repo.add_movie(
            movie(1, "Guardians of the Galaxy", 2014, 8.1, &["Action", "Sci-Fi"])
                .with_director(Director::new("James Gunn").unwrap())
                .with_actors(vec![
                    Actor::new("Chris Pratt").unwrap(),
                    Actor::new("Zoe Saldana").unwrap(),
                ])
                .with_runtime(121)
                .unwrap(),
        )
        .unwrap();
        repo.add_movie(
            movie(2, "Prometheus", 2012, 7.0, &["Adventure", "Mystery", "Sci-Fi"])
                .with_director(Director::new("Ridley Scott").unwrap())
                .with_actors(vec![
                    Actor::new("Noomi Rapace").unwrap(),
                    Actor::new("Michael Fassbender").unwrap(),
                ]),
        )
        .unwrap();
        repo.add_movie(
            movie(3, "Split", 2016, 7.3, &["Horror", "Thriller"])
                .with_director(Director::new("M. Night Shyamalan").unwrap())
                .with_actors(vec![Actor::new("James McAvoy").unwrap()]),
        )
        .unwrap();
        repo.add_movie(
            movie(4, "The Martian", 2015, 8.0, &["Adventure", "Drama", "Sci-Fi"])
                .with_director(Director::new("Ridley Scott").unwrap())
                .with_actors(vec![
                    Actor::new("Matt Damon").unwrap(),
                    Actor::new("Michael Fassbender").unwrap(),
                ]),
        )
        .unwrap();

        repo.add_user(User::new("thorke", "hash").unwrap()).unwrap();
        repo.add_user(User::new("fmercury", "hash").unwrap()).unwrap();
        repo
    }

    #[test]
    fn test_empty_queries() {
        let repo = MemoryRepository::new();

        assert!(repo.get_movie(1).is_none());
        assert!(repo.get_first_movie().is_none());
        assert!(repo.get_last_movie().is_none());
        assert!(repo.get_movies_by_year(2016).is_empty());
        assert!(repo.get_movie_ids_for_genre("War").is_empty());
        assert!(repo.get_user("jane").is_none());
        assert_eq!(repo.iter().count(), 0);

        let orphan = Movie::new(1, "Moana", Some(2016)).unwrap();
        assert_eq!(repo.get_year_of_previous_movie(&orphan), None);
        assert_eq!(repo.get_year_of_next_movie(&orphan), None);
    }

    #[test]
    fn test_primary_sequence_is_year_ordered() {
        let repo = create_test_repository();
        let years: Vec<_> = repo.iter().map(|m| m.year()).collect();

        assert_eq!(years, vec![Some(2012), Some(2014), Some(2015), Some(2016)]);
        assert_eq!(repo.get_first_movie().unwrap().title(), "Prometheus");
        assert_eq!(repo.get_last_movie().unwrap().title(), "Split");
    }

    #[test]
    fn test_later_insert_precedes_same_year() {
        let mut repo = MemoryRepository::new();
        repo.add_movie(movie(1, "Split", 2016, 7.3, &[])).unwrap();
        repo.add_movie(movie(2, "Arrival", 2016, 7.9, &[])).unwrap();
        repo.add_movie(movie(3, "Inland Empire", 2006, 7.0, &[])).unwrap();
        repo.add_movie(Movie::new(4, "Undated", None).unwrap()).unwrap();

        let ids: Vec<_> = repo.iter().map(Movie::id).collect();
        assert_eq!(ids, vec![4, 3, 2, 1]);
        // no year, no year mapping
        assert_eq!(repo.years(), vec![2006, 2016]);
        let undated = repo.get_movie(4).unwrap();
        assert_eq!(repo.get_year_of_next_movie(undated), None);
    }

    #[test]
    fn test_iteration_is_restartable() {
        let repo = create_test_repository();
        let first_pass: Vec<_> = (&repo).into_iter().map(Movie::id).collect();
        let second_pass: Vec<_> = repo.iter_movies().map(Movie::id).collect();

        assert_eq!(first_pass, second_pass);
        assert_eq!(first_pass.len(), 4);
    }

    #[test]
    fn test_get_movie_returns_inserted_movie() {
        let mut repo = create_test_repository();
        let moana = Movie::new(7, "Moana", Some(1900)).unwrap();
        repo.add_movie(moana.clone()).unwrap();

        let stored = repo.get_movie(7).unwrap();
        assert_eq!(stored, &moana);
        assert_eq!(stored.id(), 7);
        assert!(repo.get_movie(10001).is_none());
        assert_eq!(repo.get_first_movie().unwrap().id(), 7);
    }

    #[test]
    fn test_duplicate_id_rejected_without_mutation() {
        let mut repo = create_test_repository();
        let clash = movie(2, "Other", 1999, 1.0, &["War"]);

        assert_eq!(
            repo.add_movie(clash),
            Err(RepositoryError::DuplicateMovie(2))
        );
        assert_eq!(repo.movie_count(), 4);
        assert_eq!(repo.iter().count(), 4);
        assert!(repo.get_movies_by_year(1999).is_empty());
        assert!(repo.get_movie_ids_for_genre("War").is_empty());
    }

    #[test]
    fn test_every_movie_is_in_every_mapping_once() {
        let mut repo = create_test_repository();
        repo.add_movie(movie(9, "Double Tagged", 2001, 5.0, &["Drama", "Drama"]))
            .unwrap();

        for movie in &repo {
            let id = movie.id();
            let count = |movies: Vec<&Movie>| movies.iter().filter(|m| m.id() == id).count();

            assert_eq!(count(repo.get_movies_by_year(movie.year().unwrap())), 1);
            for genre in movie.genres() {
                assert_eq!(count(repo.get_movies_by_genre(genre)), 1);
            }
            for actor in movie.actors() {
                assert_eq!(count(repo.get_movies_by_actor(actor)), 1);
            }
            if let Some(director) = movie.director() {
                assert_eq!(count(repo.get_movies_by_director(director)), 1);
            }
        }
    }

    #[test]
    fn test_back_references_accumulate() {
        let repo = create_test_repository();

        let scott = Director::new("Ridley Scott").unwrap();
        let ids: Vec<_> = repo.get_movies_by_director(&scott).iter().map(|m| m.id()).collect();
        assert_eq!(ids, vec![2, 4]);

        let sci_fi = Genre::new("Sci-Fi").unwrap();
        assert_eq!(repo.get_movies_by_genre(&sci_fi).len(), 3);
        assert_eq!(
            repo.genres().iter().filter(|g| g.name() == "Sci-Fi").count(),
            1
        );
        assert!(repo.get_movies_by_actor(&Actor::new("a").unwrap()).is_empty());
    }

    #[test]
    fn test_previous_and_next_year() {
        let mut repo = MemoryRepository::new();
        repo.add_movie(movie(1, "The Prestige", 2006, 8.5, &[])).unwrap();
        repo.add_movie(movie(2, "The Dark Knight", 2008, 9.0, &[])).unwrap();
        repo.add_movie(movie(3, "Iron Man", 2008, 7.9, &[])).unwrap();

        let first = repo.get_first_movie().unwrap();
        assert_eq!(first.year(), Some(2006));
        assert_eq!(repo.get_year_of_previous_movie(first), None);
        assert_eq!(repo.get_year_of_next_movie(first), Some(2008));

        for id in [2, 3] {
            let movie = repo.get_movie(id).unwrap();
            assert_eq!(repo.get_year_of_previous_movie(movie), Some(2006));
        }
        assert_eq!(repo.get_year_of_next_movie(repo.get_last_movie().unwrap()), None);

        // a year the repository has never seen
        let stranger = Movie::new(99, "Stranger", Some(2007)).unwrap();
        assert_eq!(repo.get_year_of_previous_movie(&stranger), None);
        assert_eq!(repo.get_year_of_next_movie(&stranger), None);
    }

    #[test]
    fn test_movie_ids_for_genre_sorted_by_rating() {
        let mut repo = MemoryRepository::new();
        let ratings = [6.2, 7.7, 8.1, 6.2, 7.0, 5.9, 8.5, 7.7, 6.8, 7.4, 6.2, 7.1, 8.0];
        for (i, rating) in ratings.iter().enumerate() {
            let id = i as MovieId + 1;
            repo.add_movie(movie(id, &format!("War {id}"), 2000 + i as u16, *rating, &["War"]))
                .unwrap();
        }
        repo.add_movie(movie(50, "Peace", 2001, 9.9, &["Drama"])).unwrap();

        let ids = repo.get_movie_ids_for_genre("War");
        assert_eq!(ids.len(), 13);
        assert_eq!(ids, vec![7, 3, 13, 2, 8, 10, 12, 5, 9, 1, 4, 11, 6]);
        assert!(repo.get_movie_ids_for_genre("United States").is_empty());
    }

    #[test]
    fn test_rating_order_is_total() {
        let mut repo = MemoryRepository::new();
        repo.add_movie(movie(1, "Low", 2016, 1.5, &["Drama"])).unwrap();
        repo.add_movie(movie(2, "Blank", 2016, 0.0, &["Drama"]).with_rating(None).unwrap())
            .unwrap();
        repo.add_movie(movie(3, "High", 2016, 9.0, &["Drama"])).unwrap();
        repo.add_movie(movie(4, "Also Blank", 2016, 0.0, &["Drama"]).with_rating(None).unwrap())
            .unwrap();
        repo.add_movie(movie(5, "Tied", 2016, 9.0, &["Drama"])).unwrap();
        repo.add_movie(movie(6, "Floor", 2016, 0.0, &["Drama"])).unwrap();

        // ties keep insertion order, unrated last
        let expected = vec![3, 5, 1, 6, 2, 4];
        assert_eq!(repo.get_movie_ids_for_genre("Drama"), expected);
        assert_eq!(repo.get_movie_ids_for_year(2016), expected);
    }

    #[test]
    fn test_movie_ids_for_year_sorted_by_rating() {
        let mut repo = create_test_repository();
        repo.add_movie(movie(5, "Unrated", 2016, 0.0, &[]).with_rating(None).unwrap())
            .unwrap();
        repo.add_movie(movie(6, "Arrival", 2016, 7.9, &[])).unwrap();

        assert_eq!(repo.get_movie_ids_for_year(2016), vec![6, 3, 5]);
        assert!(repo.get_movie_ids_for_year(1850).is_empty());
    }

    #[test]
    fn test_get_movies_by_id_drops_unknown_ids() {
        let repo = create_test_repository();

        let movies = repo.get_movies_by_id(&[2, 9]);
        assert_eq!(movies.len(), 1);
        assert_eq!(movies[0].title(), "Prometheus");

        let ordered: Vec<_> = repo.get_movies_by_id(&[4, 1, 3]).iter().map(|m| m.id()).collect();
        assert_eq!(ordered, vec![4, 1, 3]);
    }

    #[test]
    fn test_movies_page() {
        let repo = create_test_repository();

        let page: Vec<_> = repo.movies_page(1, 2).iter().map(|m| m.id()).collect();
        assert_eq!(page, vec![1, 4]);
        assert!(repo.movies_page(10, 2).is_empty());
    }

    #[test]
    fn test_add_genre_is_idempotent() {
        let mut repo = MemoryRepository::new();
        repo.add_genre(Genre::new("Motoring").unwrap());
        repo.add_genre(Genre::new(" Motoring ").unwrap());
        repo.add_actor(Actor::new("Noomi Rapace").unwrap());
        repo.add_actor(Actor::new("Noomi Rapace").unwrap());
        repo.add_director(Director::new("Adam Wingard").unwrap());

        assert_eq!(repo.genres().len(), 1);
        assert_eq!(repo.actors().len(), 1);
        assert_eq!(repo.directors().len(), 1);
        assert!(repo.get_movies_by_genre(&Genre::new("Motoring").unwrap()).is_empty());
    }

    #[test]
    fn test_free_text_lookups_ignore_case() {
        let repo = create_test_repository();

        assert_eq!(repo.get_movies_for_actor("michael FASSBENDER").len(), 2);
        assert_eq!(repo.get_movies_for_genre("sci-fi").len(), 3);
        assert_eq!(repo.get_movies_for_director(" ridley scott ").len(), 2);
        assert_eq!(repo.get_movies("the martian")[0].id(), 4);
        assert!(repo.get_movies_for_actor("Nobody").is_empty());
        assert!(repo.get_movies("Nothing").is_empty());
    }

    #[test]
    fn test_actors_worked_together() {
        let repo = create_test_repository();
        let pratt = Actor::new("Chris Pratt").unwrap();
        let saldana = Actor::new("Zoe Saldana").unwrap();
        let damon = Actor::new("Matt Damon").unwrap();

        assert!(repo.actors_worked_together(&pratt, &saldana));
        assert!(!repo.actors_worked_together(&pratt, &damon));
        assert!(!repo.actors_worked_together(&pratt, &pratt));
    }

    #[test]
    fn test_users() {
        let mut repo = create_test_repository();
        repo.add_user(User::new("Jane", "123456789").unwrap()).unwrap();

        assert_eq!(repo.get_user("jane").unwrap().username(), "jane");
        assert_eq!(repo.get_user(" JANE ").unwrap().password(), "123456789");
        assert!(repo.get_user("prince").is_none());
        assert_eq!(
            repo.add_user(User::new("jane", "other").unwrap()),
            Err(RepositoryError::DuplicateUser("jane".to_string()))
        );
    }

    #[test]
    fn test_add_comment_requires_both_links() {
        let mut repo = create_test_repository();

        let loose = Review::new(2, "thorke", "Trump's onto it!", None, timestamp()).unwrap();
        assert!(matches!(
            repo.add_comment(loose.clone()),
            Err(RepositoryError::CommentNotLinked { .. })
        ));

        // attached to the user only
        repo.get_user_mut("thorke").unwrap().add_review(loose.clone());
        assert!(matches!(
            repo.add_comment(loose),
            Err(RepositoryError::CommentNotLinked { .. })
        ));
        assert!(repo.get_comments().is_empty());
    }

    #[test]
    fn test_add_comment_after_linking() {
        let mut repo = create_test_repository();
        let review = Review::new(2, "thorke", "Trump's onto it!", Some(7), timestamp()).unwrap();

        assert!(repo.link_review(&review));
        repo.add_comment(review.clone()).unwrap();

        assert_eq!(repo.get_comments(), &[review.clone()]);
        assert_eq!(repo.get_movie(2).unwrap().reviews(), &[review.clone()]);
        assert_eq!(repo.get_user("thorke").unwrap().reviews(), &[review]);
        assert_eq!(repo.counts(), (2, 4, 1));
    }

    #[test]
    fn test_add_comment_rejects_duplicate() {
        let mut repo = create_test_repository();
        let review = Review::new(2, "thorke", "Trump's onto it!", None, timestamp()).unwrap();

        assert!(repo.link_review(&review));
        repo.add_comment(review.clone()).unwrap();
        assert!(repo.link_review(&review));
        assert_eq!(
            repo.add_comment(review.clone()),
            Err(RepositoryError::DuplicateComment {
                username: "thorke".to_string(),
                movie_id: 2
            })
        );

        assert_eq!(repo.get_comments().len(), 1);
        assert_eq!(repo.get_user("thorke").unwrap().reviews().len(), 1);
        assert_eq!(repo.get_movie(2).unwrap().reviews().len(), 1);
    }

    #[test]
    fn test_link_review_needs_known_endpoints() {
        let mut repo = create_test_repository();
        let ghost = Review::new(2, "gmichael", "Hello", None, timestamp()).unwrap();
        let lost = Review::new(100000, "thorke", "Hello", None, timestamp()).unwrap();

        assert!(!repo.link_review(&ghost));
        assert!(!repo.link_review(&lost));
        assert!(repo.get_user("thorke").unwrap().reviews().is_empty());
    }

    #[test]
    fn test_make_review() {
        let mut repo = create_test_repository();

        let review = repo.make_review("THORKE", 4, "Science the ... out of it", timestamp()).unwrap();
        assert_eq!(review.username(), "thorke");
        assert!(repo.get_movie(4).unwrap().has_review(&review));
        repo.add_comment(review).unwrap();

        assert!(repo.make_review("nobody", 4, "Hi", timestamp()).is_none());
        assert!(repo.make_review("thorke", 99, "Hi", timestamp()).is_none());
        assert!(repo.make_review("thorke", 4, "   ", timestamp()).is_none());
    }

    #[test]
    fn test_watch_list() {
        let mut repo = create_test_repository();

        assert!(repo.add_to_watch_list("thorke", 3));
        assert!(repo.add_to_watch_list("thorke", 1));
        assert!(!repo.add_to_watch_list("thorke", 3));
        assert!(!repo.add_to_watch_list("thorke", 404));
        assert!(!repo.add_to_watch_list("nobody", 1));

        let titles: Vec<_> = repo.get_watch_list("thorke").iter().map(|m| m.title()).collect();
        assert_eq!(titles, vec!["Split", "Guardians of the Galaxy"]);

        assert!(repo.remove_from_watch_list("thorke", 3));
        assert!(!repo.remove_from_watch_list("thorke", 3));
        assert_eq!(repo.get_user("thorke").unwrap().watchlist().size(), 1);
        assert!(repo.get_watch_list("fmercury").is_empty());
    }

    #[test]
    fn test_watch_movie_tracks_minutes() {
        let mut repo = create_test_repository();

        assert!(repo.watch_movie("fmercury", 1));
        assert!(!repo.watch_movie("fmercury", 1));
        assert!(repo.watch_movie("fmercury", 2));
        assert!(!repo.watch_movie("fmercury", 404));

        let user = repo.get_user("fmercury").unwrap();
        assert_eq!(user.watched_movies(), &[1, 2]);
        // Prometheus has no runtime recorded
        assert_eq!(user.watched_minutes(), 121);
    }
}
