use async_trait::async_trait;

use crate::movie::errors::MovieError;
use crate::movie::models::Director;
use crate::movie::models::Genre;
use crate::movie::models::Movie;
use crate::movie::models::MovieId;
use crate::movie::models::MovieSummary;

/// Port for read-only catalog operations.
#[async_trait]
pub trait CatalogServicePort: Send + Sync + 'static {
    /// List every movie with director, genre, and actor detail.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn list_movies(&self) -> Result<Vec<Movie>, MovieError>;

    /// Retrieve a single movie by identifier.
    ///
    /// # Errors
    /// * `NotFound` - Movie does not exist
    /// * `DatabaseError` - Database operation failed
    async fn get_movie(&self, id: &MovieId) -> Result<Movie, MovieError>;

    /// Retrieve a genre by its exact name.
    ///
    /// # Errors
    /// * `GenreNotFound` - No movie carries this genre
    /// * `DatabaseError` - Database operation failed
    async fn get_genre(&self, name: &str) -> Result<Genre, MovieError>;

    /// Retrieve a director by their exact name.
    ///
    /// # Errors
    /// * `DirectorNotFound` - No movie carries this director
    /// * `DatabaseError` - Database operation failed
    async fn get_director(&self, name: &str) -> Result<Director, MovieError>;
}

/// Persistence operations for the catalog.
///
/// The catalog is read-only; this port has no create or update
/// operations.
#[async_trait]
pub trait MovieRepository: Send + Sync + 'static {
    /// Retrieve all movies with actors populated.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn list_all(&self) -> Result<Vec<Movie>, MovieError>;

    /// Retrieve a movie by identifier.
    ///
    /// # Returns
    /// Optional movie entity (None if not found)
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_by_id(&self, id: &MovieId) -> Result<Option<Movie>, MovieError>;

    /// Retrieve a genre value object by exact name.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_genre_by_name(&self, name: &str) -> Result<Option<Genre>, MovieError>;

    /// Retrieve a director value object by exact name.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_director_by_name(&self, name: &str) -> Result<Option<Director>, MovieError>;

    /// Whether a movie with this identifier exists.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn exists(&self, id: &MovieId) -> Result<bool, MovieError>;

    /// Retrieve lightweight summaries for a set of movie identifiers.
    ///
    /// Missing identifiers are skipped without error; the favorites
    /// relation tolerates stale references.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn summaries_by_ids(&self, ids: &[MovieId]) -> Result<Vec<MovieSummary>, MovieError>;
}
