use std::collections::HashMap;

use async_trait::async_trait;
use chrono::DateTime;
use chrono::NaiveDate;
use chrono::Utc;
use sqlx::postgres::PgRow;
use sqlx::PgPool;
use sqlx::Row;
use uuid::Uuid;

use crate::domain::user::models::DisplayName;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::Username;
use crate::movie::models::MovieId;
use crate::user::errors::UserError;
use crate::user::ports::UserRepository;

/// PostgreSQL adapter for the user repository port.
///
/// The favorites relation lives in a join table; set semantics come from
/// its primary key plus `ON CONFLICT DO NOTHING` on insert, so each
/// mutation is atomic without client-side locking.
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn user_from_row(row: &PgRow, favorites: Vec<MovieId>) -> Result<User, UserError> {
        Ok(User {
            id: UserId(row.try_get::<Uuid, _>("id").map_err(db_err)?),
            username: Username::new(row.try_get::<String, _>("username").map_err(db_err)?)?,
            name: DisplayName::new(row.try_get::<String, _>("name").map_err(db_err)?)?,
            email: EmailAddress::new(row.try_get::<String, _>("email").map_err(db_err)?)?,
            birthdate: row
                .try_get::<Option<NaiveDate>, _>("birthdate")
                .map_err(db_err)?,
            password_hash: row.try_get("password_hash").map_err(db_err)?,
            favorites,
            created_at: row
                .try_get::<DateTime<Utc>, _>("created_at")
                .map_err(db_err)?,
        })
    }

    async fn favorites_for(&self, id: &UserId) -> Result<Vec<MovieId>, UserError> {
        let rows = sqlx::query("SELECT movie_id FROM favorites WHERE user_id = $1")
            .bind(id.0)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

        rows.iter()
            .map(|row| {
                Ok(MovieId(
                    row.try_get::<Uuid, _>("movie_id").map_err(db_err)?,
                ))
            })
            .collect()
    }
}

fn db_err(e: sqlx::Error) -> UserError {
    UserError::DatabaseError(e.to_string())
}

fn map_unique_violation(e: sqlx::Error, username: &Username) -> UserError {
    if let Some(db_error) = e.as_database_error() {
        if db_error.is_unique_violation() && db_error.constraint() == Some("users_username_key") {
            return UserError::UsernameAlreadyExists(username.as_str().to_string());
        }
    }
    UserError::DatabaseError(e.to_string())
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create(&self, user: User) -> Result<User, UserError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, username, name, email, birthdate, password_hash, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(user.id.0)
        .bind(user.username.as_str())
        .bind(user.name.as_str())
        .bind(user.email.as_str())
        .bind(user.birthdate)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, &user.username))?;

        Ok(user)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError> {
        let row = sqlx::query(
            r#"
            SELECT id, username, name, email, birthdate, password_hash, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        match row {
            Some(row) => {
                let favorites = self.favorites_for(id).await?;
                Ok(Some(Self::user_from_row(&row, favorites)?))
            }
            None => Ok(None),
        }
    }

    async fn find_by_username(&self, username: &Username) -> Result<Option<User>, UserError> {
        let row = sqlx::query(
            r#"
            SELECT id, username, name, email, birthdate, password_hash, created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        match row {
            Some(row) => {
                let id = UserId(row.try_get::<Uuid, _>("id").map_err(db_err)?);
                let favorites = self.favorites_for(&id).await?;
                Ok(Some(Self::user_from_row(&row, favorites)?))
            }
            None => Ok(None),
        }
    }

    async fn list_all(&self) -> Result<Vec<User>, UserError> {
        let user_rows = sqlx::query(
            r#"
            SELECT id, username, name, email, birthdate, password_hash, created_at
            FROM users
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        let favorite_rows = sqlx::query("SELECT user_id, movie_id FROM favorites")
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

        let mut favorites_by_user: HashMap<Uuid, Vec<MovieId>> = HashMap::new();
        for row in &favorite_rows {
            let user_id = row.try_get::<Uuid, _>("user_id").map_err(db_err)?;
            let movie_id = MovieId(row.try_get::<Uuid, _>("movie_id").map_err(db_err)?);
            favorites_by_user.entry(user_id).or_default().push(movie_id);
        }

        user_rows
            .iter()
            .map(|row| {
                let id = row.try_get::<Uuid, _>("id").map_err(db_err)?;
                let favorites = favorites_by_user.remove(&id).unwrap_or_default();
                Self::user_from_row(row, favorites)
            })
            .collect()
    }

    async fn update(&self, user: User) -> Result<User, UserError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET username = $2, name = $3, email = $4, birthdate = $5, password_hash = $6
            WHERE id = $1
            "#,
        )
        .bind(user.id.0)
        .bind(user.username.as_str())
        .bind(user.name.as_str())
        .bind(user.email.as_str())
        .bind(user.birthdate)
        .bind(&user.password_hash)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, &user.username))?;

        if result.rows_affected() == 0 {
            return Err(UserError::NotFound(user.id.to_string()));
        }

        Ok(user)
    }

    async fn delete(&self, id: &UserId) -> Result<(), UserError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id.0)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        if result.rows_affected() == 0 {
            return Err(UserError::NotFound(id.to_string()));
        }

        Ok(())
    }

    async fn add_favorite(
        &self,
        user_id: &UserId,
        movie_id: &MovieId,
    ) -> Result<User, UserError> {
        // Set insert: the primary key makes a duplicate add a no-op.
        sqlx::query(
            r#"
            INSERT INTO favorites (user_id, movie_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(user_id.0)
        .bind(movie_id.0)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        self.find_by_id(user_id)
            .await?
            .ok_or(UserError::NotFound(user_id.to_string()))
    }

    async fn remove_favorite(
        &self,
        user_id: &UserId,
        movie_id: &MovieId,
    ) -> Result<User, UserError> {
        // Removing an absent member affects zero rows, which is success.
        sqlx::query("DELETE FROM favorites WHERE user_id = $1 AND movie_id = $2")
            .bind(user_id.0)
            .bind(movie_id.0)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        self.find_by_id(user_id)
            .await?
            .ok_or(UserError::NotFound(user_id.to_string()))
    }
}
