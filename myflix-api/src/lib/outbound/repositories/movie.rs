use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::PgPool;
use sqlx::Row;
use uuid::Uuid;

use crate::movie::errors::MovieError;
use crate::movie::models::Actor;
use crate::movie::models::ActorId;
use crate::movie::models::Director;
use crate::movie::models::Genre;
use crate::movie::models::Movie;
use crate::movie::models::MovieId;
use crate::movie::models::MovieSummary;
use crate::movie::ports::MovieRepository;

/// PostgreSQL adapter for the read-only catalog port.
///
/// Director and genre are embedded value objects, stored denormalized on
/// the movie row. The actor relation is a join table; back-references are
/// assembled in memory when movies are loaded.
pub struct PostgresMovieRepository {
    pool: PgPool,
}

impl PostgresMovieRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn movie_from_row(row: &PgRow, actors: Vec<Actor>) -> Result<Movie, MovieError> {
        Ok(Movie {
            id: MovieId(row.try_get::<Uuid, _>("id").map_err(db_err)?),
            title: row.try_get("title").map_err(db_err)?,
            description: row.try_get("description").map_err(db_err)?,
            release_year: row.try_get("release_year").map_err(db_err)?,
            director: Director {
                name: row.try_get("director_name").map_err(db_err)?,
                bio: row.try_get("director_bio").map_err(db_err)?,
                birth_year: row
                    .try_get::<Option<i32>, _>("director_birth_year")
                    .map_err(db_err)?,
            },
            genre: Genre {
                name: row.try_get("genre_name").map_err(db_err)?,
                description: row.try_get("genre_description").map_err(db_err)?,
            },
            actors,
        })
    }

    /// Back-references for a set of actors: every movie each actor appears
    /// in, as lightweight summaries.
    async fn credits_for_actors(
        &self,
        actor_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, Vec<MovieSummary>>, MovieError> {
        if actor_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query(
            r#"
            SELECT ma.actor_id, m.id AS movie_id, m.title
            FROM movie_actors ma
            JOIN movies m ON m.id = ma.movie_id
            WHERE ma.actor_id = ANY($1)
            ORDER BY m.title
            "#,
        )
        .bind(actor_ids.to_vec())
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        let mut credits: HashMap<Uuid, Vec<MovieSummary>> = HashMap::new();
        for row in &rows {
            let actor_id = row.try_get::<Uuid, _>("actor_id").map_err(db_err)?;
            let summary = MovieSummary {
                id: MovieId(row.try_get::<Uuid, _>("movie_id").map_err(db_err)?),
                title: row.try_get("title").map_err(db_err)?,
            };
            credits.entry(actor_id).or_default().push(summary);
        }

        Ok(credits)
    }

    /// The cast of each movie in `movie_ids`, with back-references filled.
    async fn cast_for_movies(
        &self,
        movie_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, Vec<Actor>>, MovieError> {
        if movie_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query(
            r#"
            SELECT ma.movie_id, a.id AS actor_id, a.name, a.birth_year
            FROM movie_actors ma
            JOIN actors a ON a.id = ma.actor_id
            WHERE ma.movie_id = ANY($1)
            ORDER BY a.name
            "#,
        )
        .bind(movie_ids.to_vec())
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        let actor_ids: Vec<Uuid> = rows
            .iter()
            .map(|row| row.try_get::<Uuid, _>("actor_id").map_err(db_err))
            .collect::<Result<_, _>>()?;
        let credits = self.credits_for_actors(&actor_ids).await?;

        let mut cast: HashMap<Uuid, Vec<Actor>> = HashMap::new();
        for row in &rows {
            let movie_id = row.try_get::<Uuid, _>("movie_id").map_err(db_err)?;
            let actor_id = row.try_get::<Uuid, _>("actor_id").map_err(db_err)?;
            let actor = Actor {
                id: ActorId(actor_id),
                name: row.try_get("name").map_err(db_err)?,
                birth_year: row.try_get::<Option<i32>, _>("birth_year").map_err(db_err)?,
                movies: credits.get(&actor_id).cloned().unwrap_or_default(),
            };
            cast.entry(movie_id).or_default().push(actor);
        }

        Ok(cast)
    }
}

fn db_err(e: sqlx::Error) -> MovieError {
    MovieError::DatabaseError(e.to_string())
}

const MOVIE_SELECT: &str = r#"
    SELECT id, title, description, release_year,
           director_name, director_bio, director_birth_year,
           genre_name, genre_description
    FROM movies
"#;

#[async_trait]
impl MovieRepository for PostgresMovieRepository {
    async fn list_all(&self) -> Result<Vec<Movie>, MovieError> {
        let rows = sqlx::query(&format!("{} ORDER BY title", MOVIE_SELECT))
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

        let movie_ids: Vec<Uuid> = rows
            .iter()
            .map(|row| row.try_get::<Uuid, _>("id").map_err(db_err))
            .collect::<Result<_, _>>()?;
        let mut cast = self.cast_for_movies(&movie_ids).await?;

        rows.iter()
            .map(|row| {
                let id = row.try_get::<Uuid, _>("id").map_err(db_err)?;
                let actors = cast.remove(&id).unwrap_or_default();
                Self::movie_from_row(row, actors)
            })
            .collect()
    }

    async fn find_by_id(&self, id: &MovieId) -> Result<Option<Movie>, MovieError> {
        let row = sqlx::query(&format!("{} WHERE id = $1", MOVIE_SELECT))
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;

        match row {
            Some(row) => {
                let mut cast = self.cast_for_movies(&[id.0]).await?;
                let actors = cast.remove(&id.0).unwrap_or_default();
                Ok(Some(Self::movie_from_row(&row, actors)?))
            }
            None => Ok(None),
        }
    }

    async fn find_genre_by_name(&self, name: &str) -> Result<Option<Genre>, MovieError> {
        let row = sqlx::query(
            r#"
            SELECT genre_name, genre_description
            FROM movies
            WHERE genre_name = $1
            LIMIT 1
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        match row {
            Some(row) => Ok(Some(Genre {
                name: row.try_get("genre_name").map_err(db_err)?,
                description: row.try_get("genre_description").map_err(db_err)?,
            })),
            None => Ok(None),
        }
    }

    async fn find_director_by_name(&self, name: &str) -> Result<Option<Director>, MovieError> {
        let row = sqlx::query(
            r#"
            SELECT director_name, director_bio, director_birth_year
            FROM movies
            WHERE director_name = $1
            LIMIT 1
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        match row {
            Some(row) => Ok(Some(Director {
                name: row.try_get("director_name").map_err(db_err)?,
                bio: row.try_get("director_bio").map_err(db_err)?,
                birth_year: row
                    .try_get::<Option<i32>, _>("director_birth_year")
                    .map_err(db_err)?,
            })),
            None => Ok(None),
        }
    }

    async fn exists(&self, id: &MovieId) -> Result<bool, MovieError> {
        let row = sqlx::query("SELECT 1 AS one FROM movies WHERE id = $1")
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;

        Ok(row.is_some())
    }

    async fn summaries_by_ids(&self, ids: &[MovieId]) -> Result<Vec<MovieSummary>, MovieError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let raw_ids: Vec<Uuid> = ids.iter().map(|id| id.0).collect();
        let rows = sqlx::query("SELECT id, title FROM movies WHERE id = ANY($1) ORDER BY title")
            .bind(raw_ids)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

        rows.iter()
            .map(|row| {
                Ok(MovieSummary {
                    id: MovieId(row.try_get::<Uuid, _>("id").map_err(db_err)?),
                    title: row.try_get("title").map_err(db_err)?,
                })
            })
            .collect()
    }
}
