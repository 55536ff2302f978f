//! Parsers for the catalogue's CSV files.
//!
//! - movie dataset: header row, looked up by column name
//!   (`Title, Year, Runtime (Minutes), Director, Actors, Description, Genre,
//!   Rating, Votes, Rank`); other columns are ignored
//! - users: `id, username, password`
//! - comments: `id, user_id, movie_id, comment, timestamp`
//!
//! Each parser only turns rows into typed records. Resolving references
//! between the files is the job of [`crate::index`].

use crate::error::{DataLoadError, Result};
use crate::types::MovieId;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::fmt::Display;
use std::fs::File;
use std::io::ErrorKind;
use std::path::Path;
use std::str::FromStr;

/// One row of the movie dataset
#[derive(Debug, Clone, PartialEq)]
pub struct MovieRecord {
    pub line: usize,
    /// Becomes the movie id
    pub rank: MovieId,
    pub title: String,
    pub year: u16,
    pub runtime_minutes: u32,
    pub director: String,
    pub actors: Vec<String>,
    pub description: String,
    pub genres: Vec<String>,
    pub rating: Option<f32>,
    pub votes: Option<u32>,
}

/// One row of the users file. The password is still plaintext here.
#[derive(Debug, Clone, PartialEq)]
pub struct UserRecord {
    pub line: usize,
    pub row_id: String,
    pub username: String,
    pub password: String,
}

/// One row of the comments file
#[derive(Debug, Clone, PartialEq)]
pub struct CommentRecord {
    pub line: usize,
    pub row_id: String,
    /// Refers to [`UserRecord::row_id`]
    pub user_row_id: String,
    pub movie_id: MovieId,
    pub text: String,
    pub timestamp: NaiveDateTime,
}

/// Column positions in the movie dataset, resolved from its header row.
struct MovieColumns {
    title: usize,
    year: usize,
    runtime: usize,
    director: usize,
    actors: usize,
    description: usize,
    genre: usize,
    rating: usize,
    votes: usize,
    rank: usize,
}

impl MovieColumns {
    fn from_headers(headers: &StringRecord, file: &str) -> Result<Self> {
        let column = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim_start_matches('\u{feff}').trim() == name)
                .ok_or_else(|| DataLoadError::ParseError {
                    file: file.to_string(),
                    line: 1,
                    reason: format!("Missing column '{name}'"),
                })
        };
        Ok(Self {
            title: column("Title")?,
            year: column("Year")?,
            runtime: column("Runtime (Minutes)")?,
            director: column("Director")?,
            actors: column("Actors")?,
            description: column("Description")?,
            genre: column("Genre")?,
            rating: column("Rating")?,
            votes: column("Votes")?,
            rank: column("Rank")?,
        })
    }
}

/// Positional access to a CSV row, reporting failures against file and line.
struct Row<'a> {
    record: &'a StringRecord,
    file: &'a str,
    line: usize,
}

impl<'a> Row<'a> {
    fn error(&self, reason: String) -> DataLoadError {
        DataLoadError::ParseError {
            file: self.file.to_string(),
            line: self.line,
            reason,
        }
    }

    fn text(&self, idx: usize, name: &str) -> Result<&'a str> {
        self.record
            .get(idx)
            .ok_or_else(|| self.error(format!("Missing {name}")))
    }

    fn number<T>(&self, idx: usize, name: &str) -> Result<T>
    where
        T: FromStr,
        T::Err: Display,
    {
        let value = self.text(idx, name)?;
        value
            .parse()
            .map_err(|e| self.error(format!("Invalid {name} '{value}': {e}")))
    }

    /// Blank values are `None`; anything else must parse.
    fn optional_number<T>(&self, idx: usize, name: &str) -> Result<Option<T>>
    where
        T: FromStr,
        T::Err: Display,
    {
        if self.text(idx, name)?.is_empty() {
            return Ok(None);
        }
        self.number(idx, name).map(Some)
    }
}

fn open_csv(path: &Path) -> Result<(String, csv::Reader<File>)> {
    let file = File::open(path).map_err(|source| match source.kind() {
        ErrorKind::NotFound => DataLoadError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => DataLoadError::IoError {
            path: path.display().to_string(),
            source,
        },
    })?;
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("unknown.csv")
        .to_string();
    let reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(file);
    Ok((name, reader))
}

/// Runs `parse_row` over every non-blank data row of the reader.
fn parse_rows<T>(
    file: &str,
    reader: &mut csv::Reader<File>,
    mut parse_row: impl FnMut(&Row<'_>) -> Result<T>,
) -> Result<Vec<T>> {
    let mut rows = Vec::new();

    for (idx, result) in reader.records().enumerate() {
        let record = result.map_err(|source| DataLoadError::Csv {
            file: file.to_string(),
            source,
        })?;
        if record.iter().all(str::is_empty) {
            continue; // Skip empty lines
        }
        let line = record
            .position()
            .map_or(idx + 2, |pos| pos.line() as usize);
        rows.push(parse_row(&Row {
            record: &record,
            file,
            line,
        })?);
    }
    Ok(rows)
}

/// Split a comma-joined field such as `"Chris Pratt, Vin Diesel"`.
fn split_names(field: &str) -> Vec<String> {
    field
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse an ISO-8601 timestamp.
///
/// Accepts a space or `T` between date and time, optional fractional
/// seconds, an optional UTC offset (converted to UTC), or a bare date.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M"] {
        if let Ok(timestamp) = NaiveDateTime::parse_from_str(value, format) {
            return Some(timestamp);
        }
    }
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(value) {
        return Some(timestamp.naive_utc());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

/// Parse the movie dataset
pub fn parse_movies(path: &Path) -> Result<Vec<MovieRecord>> {
    let (file, mut reader) = open_csv(path)?;
    let headers = reader.headers().map_err(|source| DataLoadError::Csv {
        file: file.clone(),
        source,
    })?;
    let cols = MovieColumns::from_headers(headers, &file)?;

    parse_rows(&file, &mut reader, |row| {
        // f32 parsing accepts "NaN" and "inf", which cannot be ranked
        let rating: Option<f32> = row.optional_number(cols.rating, "Rating")?;
        if let Some(rating) = rating.filter(|r| !r.is_finite()) {
            return Err(row.error(format!("Invalid Rating '{rating}'")));
        }

        Ok(MovieRecord {
            line: row.line,
            rank: row.number(cols.rank, "Rank")?,
            title: row.text(cols.title, "Title")?.to_string(),
            year: row.number(cols.year, "Year")?,
            runtime_minutes: row.number(cols.runtime, "Runtime (Minutes)")?,
            director: row.text(cols.director, "Director")?.to_string(),
            actors: split_names(row.text(cols.actors, "Actors")?),
            description: row.text(cols.description, "Description")?.to_string(),
            genres: split_names(row.text(cols.genre, "Genre")?),
            rating,
            votes: row.optional_number(cols.votes, "Votes")?,
        })
    })
}

/// Parse the users file
pub fn parse_users(path: &Path) -> Result<Vec<UserRecord>> {
    let (file, mut reader) = open_csv(path)?;
    parse_rows(&file, &mut reader, |row| {
        Ok(UserRecord {
            line: row.line,
            row_id: row.text(0, "id")?.to_string(),
            username: row.text(1, "username")?.to_string(),
            password: row.text(2, "password")?.to_string(),
        })
    })
}

/// Parse the comments file
pub fn parse_comments(path: &Path) -> Result<Vec<CommentRecord>> {
    let (file, mut reader) = open_csv(path)?;
    parse_rows(&file, &mut reader, |row| {
        let raw_timestamp = row.text(4, "timestamp")?;
        let timestamp = parse_timestamp(raw_timestamp)
            .ok_or_else(|| row.error(format!("Invalid timestamp '{raw_timestamp}'")))?;

        Ok(CommentRecord {
            line: row.line,
            row_id: row.text(0, "id")?.to_string(),
            user_row_id: row.text(1, "user_id")?.to_string(),
            movie_id: row.number(2, "movie_id")?,
            text: row.text(3, "comment")?.to_string(),
            timestamp,
        })
    })
}
