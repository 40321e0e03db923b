use std::fmt;

use uuid::Uuid;

use crate::movie::errors::ActorIdError;
use crate::movie::errors::MovieIdError;

/// Movie unique identifier type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MovieId(pub Uuid);

impl MovieId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a movie ID from string.
    ///
    /// # Errors
    /// * `InvalidFormat` - String is not a valid UUID
    pub fn from_string(s: &str) -> Result<Self, MovieIdError> {
        Uuid::parse_str(s)
            .map(MovieId)
            .map_err(|e| MovieIdError::InvalidFormat(e.to_string()))
    }
}

impl fmt::Display for MovieId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Actor unique identifier type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActorId(pub Uuid);

impl ActorId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_string(s: &str) -> Result<Self, ActorIdError> {
        Uuid::parse_str(s)
            .map(ActorId)
            .map_err(|e| ActorIdError::InvalidFormat(e.to_string()))
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Catalog aggregate entity.
///
/// Movies are read-only from the API surface; the catalog is seeded out of
/// band and never mutated by requests.
#[derive(Debug, Clone, PartialEq)]
pub struct Movie {
    pub id: MovieId,
    pub title: String,
    pub description: String,
    pub release_year: i32,
    pub director: Director,
    pub genre: Genre,
    pub actors: Vec<Actor>,
}

/// Director value object, embedded in each movie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Director {
    pub name: String,
    pub bio: String,
    pub birth_year: Option<i32>,
}

/// Genre value object, embedded in each movie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Genre {
    pub name: String,
    pub description: String,
}

/// Actor entity with back-references to the movies it appears in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub id: ActorId,
    pub name: String,
    pub birth_year: Option<i32>,
    pub movies: Vec<MovieSummary>,
}

/// Lightweight movie reference used for actor back-references and
/// favorites listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovieSummary {
    pub id: MovieId,
    pub title: String,
}
