use async_trait::async_trait;

use crate::domain::user::models::CreateUserCommand;
use crate::domain::user::models::Credentials;
use crate::domain::user::models::LoginOutcome;
use crate::domain::user::models::UpdateUserCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::movie::models::MovieId;
use crate::user::errors::UserError;
use crate::user::models::Username;

/// Port for user domain service operations, including the favorites
/// relation between users and movies.
#[async_trait]
pub trait UserServicePort: Send + Sync + 'static {
    /// Create a new user with validated registration fields.
    ///
    /// # Errors
    /// * `UsernameAlreadyExists` - Username is already taken
    /// * `DatabaseError` - Database operation failed
    async fn register(&self, command: CreateUserCommand) -> Result<User, UserError>;

    /// Verify a username/password pair and mint an access token.
    ///
    /// Unknown username and wrong password are indistinguishable in the
    /// returned error.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Lookup or password verification failed
    /// * `DatabaseError` - Database operation failed
    async fn authenticate(&self, credentials: Credentials) -> Result<LoginOutcome, UserError>;

    /// Retrieve a user by unique identifier.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `DatabaseError` - Database operation failed
    async fn get_user(&self, id: &UserId) -> Result<User, UserError>;

    /// Retrieve all users.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn list_users(&self) -> Result<Vec<User>, UserError>;

    /// Update an existing user with optional fields.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `UsernameAlreadyExists` - New username is already taken
    /// * `DatabaseError` - Database operation failed
    async fn update_user(&self, id: &UserId, command: UpdateUserCommand)
        -> Result<User, UserError>;

    /// Delete an existing user.
    ///
    /// # Returns
    /// The deleted user, so callers can report which account went away.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `DatabaseError` - Database operation failed
    async fn delete_user(&self, id: &UserId) -> Result<User, UserError>;

    /// Insert a movie into the user's favorites set.
    ///
    /// Idempotent: adding a movie that is already a favorite succeeds and
    /// changes nothing. Both the user and the movie must exist.
    ///
    /// # Returns
    /// The user with the resulting favorites state.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `MovieNotFound` - Movie does not exist
    /// * `DatabaseError` - Database operation failed
    async fn add_favorite(&self, user_id: &UserId, movie_id: &MovieId)
        -> Result<User, UserError>;

    /// Remove a movie from the user's favorites set.
    ///
    /// Removing a movie that is not a favorite succeeds and changes
    /// nothing. Both the user and the movie must exist.
    ///
    /// # Returns
    /// The user with the resulting favorites state.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `MovieNotFound` - Movie does not exist
    /// * `DatabaseError` - Database operation failed
    async fn remove_favorite(
        &self,
        user_id: &UserId,
        movie_id: &MovieId,
    ) -> Result<User, UserError>;

    /// List the titles of the user's favorite movies.
    ///
    /// Favorites that no longer resolve to a movie are skipped rather than
    /// treated as an error.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `DatabaseError` - Database operation failed
    async fn favorite_titles(&self, user_id: &UserId) -> Result<Vec<String>, UserError>;
}

/// Persistence operations for the user aggregate.
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Persist a new user.
    ///
    /// # Errors
    /// * `UsernameAlreadyExists` - Username is already taken
    /// * `DatabaseError` - Database operation failed
    async fn create(&self, user: User) -> Result<User, UserError>;

    /// Retrieve a user by identifier, favorites included.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError>;

    /// Retrieve a user by exact username.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_by_username(&self, username: &Username) -> Result<Option<User>, UserError>;

    /// Retrieve all users.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn list_all(&self) -> Result<Vec<User>, UserError>;

    /// Update an existing user's profile fields.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `UsernameAlreadyExists` - New username is already taken
    /// * `DatabaseError` - Database operation failed
    async fn update(&self, user: User) -> Result<User, UserError>;

    /// Remove a user.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `DatabaseError` - Database operation failed
    async fn delete(&self, id: &UserId) -> Result<(), UserError>;

    /// Atomically insert a movie id into the user's favorites set.
    ///
    /// Set semantics: inserting a member that is already present is a
    /// no-op, not an error.
    ///
    /// # Returns
    /// The user with the resulting favorites state.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `DatabaseError` - Database operation failed
    async fn add_favorite(&self, user_id: &UserId, movie_id: &MovieId)
        -> Result<User, UserError>;

    /// Atomically remove a movie id from the user's favorites set.
    ///
    /// Removing an absent member is a no-op, not an error.
    ///
    /// # Returns
    /// The user with the resulting favorites state.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `DatabaseError` - Database operation failed
    async fn remove_favorite(
        &self,
        user_id: &UserId,
        movie_id: &MovieId,
    ) -> Result<User, UserError>;
}
