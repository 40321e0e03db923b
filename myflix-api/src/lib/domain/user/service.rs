use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use myflix_auth::AuthenticationError;
use myflix_auth::Authenticator;
use myflix_auth::Claims;

use crate::domain::user::models::CreateUserCommand;
use crate::domain::user::models::Credentials;
use crate::domain::user::models::LoginOutcome;
use crate::domain::user::models::UpdateUserCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::Username;
use crate::movie::models::MovieId;
use crate::movie::ports::MovieRepository;
use crate::user::errors::UserError;
use crate::user::ports::UserRepository;
use crate::user::ports::UserServicePort;

/// Domain service implementation for user operations.
///
/// Owns the login flow and the favorites relation. The movie repository is
/// only consulted for existence checks and title lookups; catalog reads go
/// through the catalog service instead.
pub struct UserService<UR, MR>
where
    UR: UserRepository,
    MR: MovieRepository,
{
    users: Arc<UR>,
    movies: Arc<MR>,
    authenticator: Arc<Authenticator>,
}

impl<UR, MR> UserService<UR, MR>
where
    UR: UserRepository,
    MR: MovieRepository,
{
    /// Create a new user service with injected dependencies.
    pub fn new(users: Arc<UR>, movies: Arc<MR>, authenticator: Arc<Authenticator>) -> Self {
        Self {
            users,
            movies,
            authenticator,
        }
    }
}

#[async_trait]
impl<UR, MR> UserServicePort for UserService<UR, MR>
where
    UR: UserRepository,
    MR: MovieRepository,
{
    async fn register(&self, command: CreateUserCommand) -> Result<User, UserError> {
        let password_hash = self
            .authenticator
            .hash_password(command.password.as_str())
            .map_err(|e| UserError::Unknown(format!("Password hashing failed: {}", e)))?;

        let user = User {
            id: UserId::new(),
            username: command.username,
            name: command.name,
            email: command.email,
            birthdate: command.birthdate,
            password_hash,
            favorites: Vec::new(),
            created_at: Utc::now(),
        };

        self.users.create(user).await
    }

    async fn authenticate(&self, credentials: Credentials) -> Result<LoginOutcome, UserError> {
        // A username that fails validation cannot exist, and must be
        // rejected exactly like a wrong password.
        let username = Username::new(credentials.username)
            .map_err(|_| UserError::InvalidCredentials)?;

        let user = self
            .users
            .find_by_username(&username)
            .await?
            .ok_or(UserError::InvalidCredentials)?;

        // Token subject is the immutable id; the username claim is
        // informational and goes stale on rename, which is fine.
        let claims = Claims::for_user(user.id, user.username.as_str());

        let token = self
            .authenticator
            .login_token(&credentials.password, &user.password_hash, &claims)
            .map_err(|e| match e {
                AuthenticationError::InvalidCredentials => UserError::InvalidCredentials,
                other => UserError::Unknown(format!("Token issuance failed: {}", other)),
            })?;

        Ok(LoginOutcome { user, token })
    }

    async fn get_user(&self, id: &UserId) -> Result<User, UserError> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id.to_string()))
    }

    async fn list_users(&self) -> Result<Vec<User>, UserError> {
        self.users.list_all().await
    }

    async fn update_user(
        &self,
        id: &UserId,
        command: UpdateUserCommand,
    ) -> Result<User, UserError> {
        let mut user = self
            .users
            .find_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id.to_string()))?;

        if let Some(new_username) = command.username {
            user.username = new_username;
        }

        if let Some(new_name) = command.name {
            user.name = new_name;
        }

        if let Some(new_email) = command.email {
            user.email = new_email;
        }

        if let Some(new_birthdate) = command.birthdate {
            user.birthdate = Some(new_birthdate);
        }

        if let Some(new_password) = command.password {
            user.password_hash = self
                .authenticator
                .hash_password(new_password.as_str())
                .map_err(|e| UserError::Unknown(format!("Password hashing failed: {}", e)))?;
        }

        self.users.update(user).await
    }

    async fn delete_user(&self, id: &UserId) -> Result<User, UserError> {
        let user = self
            .users
            .find_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id.to_string()))?;

        self.users.delete(id).await?;

        Ok(user)
    }

    async fn add_favorite(
        &self,
        user_id: &UserId,
        movie_id: &MovieId,
    ) -> Result<User, UserError> {
        // Existence checks happen before the mutation. The sequence is not
        // transactional: a movie deleted between check and insert leaves a
        // stale reference, which the favorites set tolerates.
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or(UserError::NotFound(user_id.to_string()))?;

        if !self.movies.exists(movie_id).await.map_err(UserError::from)? {
            return Err(UserError::MovieNotFound(movie_id.to_string()));
        }

        self.users.add_favorite(user_id, movie_id).await
    }

    async fn remove_favorite(
        &self,
        user_id: &UserId,
        movie_id: &MovieId,
    ) -> Result<User, UserError> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or(UserError::NotFound(user_id.to_string()))?;

        if !self.movies.exists(movie_id).await.map_err(UserError::from)? {
            return Err(UserError::MovieNotFound(movie_id.to_string()));
        }

        self.users.remove_favorite(user_id, movie_id).await
    }

    async fn favorite_titles(&self, user_id: &UserId) -> Result<Vec<String>, UserError> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(UserError::NotFound(user_id.to_string()))?;

        let summaries = self
            .movies
            .summaries_by_ids(&user.favorites)
            .await
            .map_err(UserError::from)?;

        Ok(summaries.into_iter().map(|s| s.title).collect())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use mockall::mock;

    use super::*;
    use crate::domain::user::models::DisplayName;
    use crate::domain::user::models::EmailAddress;
    use crate::domain::user::models::Password;
    use crate::movie::errors::MovieError;
    use crate::movie::models::Director;
    use crate::movie::models::Genre;
    use crate::movie::models::Movie;
    use crate::movie::models::MovieSummary;

    const SECRET: &[u8] = b"test_secret_key_at_least_32_bytes!";

    mock! {
        pub TestUserRepository {}

        #[async_trait]
        impl UserRepository for TestUserRepository {
            async fn create(&self, user: User) -> Result<User, UserError>;
            async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError>;
            async fn find_by_username(&self, username: &Username) -> Result<Option<User>, UserError>;
            async fn list_all(&self) -> Result<Vec<User>, UserError>;
            async fn update(&self, user: User) -> Result<User, UserError>;
            async fn delete(&self, id: &UserId) -> Result<(), UserError>;
            async fn add_favorite(&self, user_id: &UserId, movie_id: &MovieId) -> Result<User, UserError>;
            async fn remove_favorite(&self, user_id: &UserId, movie_id: &MovieId) -> Result<User, UserError>;
        }
    }

    mock! {
        pub TestMovieRepository {}

        #[async_trait]
        impl MovieRepository for TestMovieRepository {
            async fn list_all(&self) -> Result<Vec<Movie>, MovieError>;
            async fn find_by_id(&self, id: &MovieId) -> Result<Option<Movie>, MovieError>;
            async fn find_genre_by_name(&self, name: &str) -> Result<Option<Genre>, MovieError>;
            async fn find_director_by_name(&self, name: &str) -> Result<Option<Director>, MovieError>;
            async fn exists(&self, id: &MovieId) -> Result<bool, MovieError>;
            async fn summaries_by_ids(&self, ids: &[MovieId]) -> Result<Vec<MovieSummary>, MovieError>;
        }
    }

    fn sample_user(id: UserId) -> User {
        User {
            id,
            username: Username::new("JohnnyD1".to_string()).unwrap(),
            name: DisplayName::new("John Doe".to_string()).unwrap(),
            email: EmailAddress::new("jdoe@example.com".to_string()).unwrap(),
            birthdate: None,
            password_hash: "$argon2id$test_hash".to_string(),
            favorites: Vec::new(),
            created_at: Utc::now(),
        }
    }

    fn build_service(
        users: MockTestUserRepository,
        movies: MockTestMovieRepository,
    ) -> (
        UserService<MockTestUserRepository, MockTestMovieRepository>,
        Arc<Authenticator>,
    ) {
        let authenticator = Arc::new(Authenticator::new(SECRET));
        let service = UserService::new(
            Arc::new(users),
            Arc::new(movies),
            Arc::clone(&authenticator),
        );
        (service, authenticator)
    }

    fn register_command() -> CreateUserCommand {
        CreateUserCommand {
            username: Username::new("JohnnyD1".to_string()).unwrap(),
            name: DisplayName::new("John Doe".to_string()).unwrap(),
            email: EmailAddress::new("jdoe@example.com".to_string()).unwrap(),
            password: Password::new("password1".to_string()).unwrap(),
            birthdate: None,
        }
    }

    #[tokio::test]
    async fn test_register_hashes_password() {
        let mut users = MockTestUserRepository::new();
        let movies = MockTestMovieRepository::new();

        users
            .expect_create()
            .withf(|user| {
                user.username.as_str() == "JohnnyD1"
                    && user.password_hash.starts_with("$argon2")
                    && user.password_hash != "password1"
                    && user.favorites.is_empty()
            })
            .times(1)
            .returning(|user| Ok(user));

        let (service, _) = build_service(users, movies);

        let user = service.register(register_command()).await.unwrap();
        assert_eq!(user.username.as_str(), "JohnnyD1");
        assert!(user.password_hash.starts_with("$argon2"));
    }

    #[tokio::test]
    async fn test_register_duplicate_username() {
        let mut users = MockTestUserRepository::new();
        let movies = MockTestMovieRepository::new();

        users.expect_create().times(1).returning(|user| {
            Err(UserError::UsernameAlreadyExists(
                user.username.as_str().to_string(),
            ))
        });

        let (service, _) = build_service(users, movies);

        let result = service.register(register_command()).await;
        assert!(matches!(
            result,
            Err(UserError::UsernameAlreadyExists(_))
        ));
    }

    #[tokio::test]
    async fn test_authenticate_success_token_resolves_same_user() {
        let mut users = MockTestUserRepository::new();
        let movies = MockTestMovieRepository::new();

        let authenticator = Authenticator::new(SECRET);
        let user_id = UserId::new();
        let mut user = sample_user(user_id);
        user.password_hash = authenticator.hash_password("password1").unwrap();

        let returned = user.clone();
        users
            .expect_find_by_username()
            .withf(|username| username.as_str() == "JohnnyD1")
            .times(1)
            .returning(move |_| Ok(Some(returned.clone())));

        let (service, authenticator) = build_service(users, movies);

        let outcome = service
            .authenticate(Credentials {
                username: "JohnnyD1".to_string(),
                password: "password1".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(outcome.user.id, user_id);

        // The token round-trips to the same identity.
        let claims = authenticator.verify_token(&outcome.token).unwrap();
        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.username, "JohnnyD1");
    }

    #[tokio::test]
    async fn test_authenticate_unknown_username() {
        let mut users = MockTestUserRepository::new();
        let movies = MockTestMovieRepository::new();

        users
            .expect_find_by_username()
            .times(1)
            .returning(|_| Ok(None));

        let (service, _) = build_service(users, movies);

        let result = service
            .authenticate(Credentials {
                username: "Nobody1".to_string(),
                password: "password1".to_string(),
            })
            .await;

        assert!(matches!(result, Err(UserError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_authenticate_wrong_password_same_rejection() {
        let mut users = MockTestUserRepository::new();
        let movies = MockTestMovieRepository::new();

        let authenticator = Authenticator::new(SECRET);
        let mut user = sample_user(UserId::new());
        user.password_hash = authenticator.hash_password("password1").unwrap();

        let returned = user.clone();
        users
            .expect_find_by_username()
            .times(1)
            .returning(move |_| Ok(Some(returned.clone())));

        let (service, _) = build_service(users, movies);

        let result = service
            .authenticate(Credentials {
                username: "JohnnyD1".to_string(),
                password: "wrong_password".to_string(),
            })
            .await;

        // Same variant as the unknown-username case: nothing leaks.
        assert!(matches!(result, Err(UserError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_authenticate_malformed_username_same_rejection() {
        let users = MockTestUserRepository::new();
        let movies = MockTestMovieRepository::new();

        let (service, _) = build_service(users, movies);

        // "x" can never be a registered username; the repository is not
        // even consulted.
        let result = service
            .authenticate(Credentials {
                username: "x".to_string(),
                password: "password1".to_string(),
            })
            .await;

        assert!(matches!(result, Err(UserError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_get_user_not_found() {
        let mut users = MockTestUserRepository::new();
        let movies = MockTestMovieRepository::new();

        users.expect_find_by_id().times(1).returning(|_| Ok(None));

        let (service, _) = build_service(users, movies);

        let result = service.get_user(&UserId::new()).await;
        assert!(matches!(result, Err(UserError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_update_user_rehashes_password() {
        let mut users = MockTestUserRepository::new();
        let movies = MockTestMovieRepository::new();

        let user_id = UserId::new();
        let existing = sample_user(user_id);

        let returned = existing.clone();
        users
            .expect_find_by_id()
            .withf(move |id| *id == user_id)
            .times(1)
            .returning(move |_| Ok(Some(returned.clone())));

        users
            .expect_update()
            .withf(|user| {
                user.username.as_str() == "JohnDoe1" && user.password_hash.starts_with("$argon2")
            })
            .times(1)
            .returning(|user| Ok(user));

        let (service, _) = build_service(users, movies);

        let command = UpdateUserCommand {
            username: Some(Username::new("JohnDoe1".to_string()).unwrap()),
            password: Some(Password::new("newpassword".to_string()).unwrap()),
            ..Default::default()
        };

        let updated = service.update_user(&user_id, command).await.unwrap();
        assert_eq!(updated.username.as_str(), "JohnDoe1");
    }

    #[tokio::test]
    async fn test_update_user_not_found() {
        let mut users = MockTestUserRepository::new();
        let movies = MockTestMovieRepository::new();

        users.expect_find_by_id().times(1).returning(|_| Ok(None));

        let (service, _) = build_service(users, movies);

        let result = service
            .update_user(&UserId::new(), UpdateUserCommand::default())
            .await;
        assert!(matches!(result, Err(UserError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_user_returns_deleted_account() {
        let mut users = MockTestUserRepository::new();
        let movies = MockTestMovieRepository::new();

        let user_id = UserId::new();
        let existing = sample_user(user_id);

        let returned = existing.clone();
        users
            .expect_find_by_id()
            .times(1)
            .returning(move |_| Ok(Some(returned.clone())));
        users
            .expect_delete()
            .withf(move |id| *id == user_id)
            .times(1)
            .returning(|_| Ok(()));

        let (service, _) = build_service(users, movies);

        let deleted = service.delete_user(&user_id).await.unwrap();
        assert_eq!(deleted.username.as_str(), "JohnnyD1");
    }

    #[tokio::test]
    async fn test_add_favorite_success() {
        let mut users = MockTestUserRepository::new();
        let mut movies = MockTestMovieRepository::new();

        let user_id = UserId::new();
        let movie_id = MovieId::new();

        let existing = sample_user(user_id);
        users
            .expect_find_by_id()
            .times(1)
            .returning(move |_| Ok(Some(existing.clone())));
        movies
            .expect_exists()
            .withf(move |id| *id == movie_id)
            .times(1)
            .returning(|_| Ok(true));

        let mut updated = sample_user(user_id);
        updated.favorites = vec![movie_id];
        users
            .expect_add_favorite()
            .times(1)
            .returning(move |_, _| Ok(updated.clone()));

        let (service, _) = build_service(users, movies);

        let user = service.add_favorite(&user_id, &movie_id).await.unwrap();
        assert_eq!(user.favorites, vec![movie_id]);
    }

    #[tokio::test]
    async fn test_add_favorite_movie_missing() {
        let mut users = MockTestUserRepository::new();
        let mut movies = MockTestMovieRepository::new();

        let user_id = UserId::new();
        let existing = sample_user(user_id);
        users
            .expect_find_by_id()
            .times(1)
            .returning(move |_| Ok(Some(existing.clone())));
        movies.expect_exists().times(1).returning(|_| Ok(false));

        // The mutation must never run when the existence check fails.
        users.expect_add_favorite().times(0);

        let (service, _) = build_service(users, movies);

        let result = service.add_favorite(&user_id, &MovieId::new()).await;
        assert!(matches!(result, Err(UserError::MovieNotFound(_))));
    }

    #[tokio::test]
    async fn test_add_favorite_user_missing() {
        let mut users = MockTestUserRepository::new();
        let movies = MockTestMovieRepository::new();

        users.expect_find_by_id().times(1).returning(|_| Ok(None));
        users.expect_add_favorite().times(0);

        let (service, _) = build_service(users, movies);

        let result = service.add_favorite(&UserId::new(), &MovieId::new()).await;
        assert!(matches!(result, Err(UserError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_add_favorite_twice_converges_to_single_membership() {
        let mut users = MockTestUserRepository::new();
        let mut movies = MockTestMovieRepository::new();

        let user_id = UserId::new();
        let movie_id = MovieId::new();

        let existing = sample_user(user_id);
        users
            .expect_find_by_id()
            .times(2)
            .returning(move |_| Ok(Some(existing.clone())));
        movies.expect_exists().times(2).returning(|_| Ok(true));

        // Set semantics behind the port: insert-if-absent.
        let favorites = Arc::new(Mutex::new(Vec::<MovieId>::new()));
        let store = Arc::clone(&favorites);
        users
            .expect_add_favorite()
            .times(2)
            .returning(move |uid, mid| {
                let mut set = store.lock().unwrap();
                if !set.contains(mid) {
                    set.push(*mid);
                }
                let mut user = sample_user(*uid);
                user.favorites = set.clone();
                Ok(user)
            });

        let (service, _) = build_service(users, movies);

        let first = service.add_favorite(&user_id, &movie_id).await.unwrap();
        let second = service.add_favorite(&user_id, &movie_id).await.unwrap();

        assert_eq!(first.favorites, vec![movie_id]);
        assert_eq!(second.favorites, vec![movie_id]);
    }

    #[tokio::test]
    async fn test_remove_favorite_nonmember_is_noop_success() {
        let mut users = MockTestUserRepository::new();
        let mut movies = MockTestMovieRepository::new();

        let user_id = UserId::new();
        let movie_id = MovieId::new();

        let existing = sample_user(user_id);
        users
            .expect_find_by_id()
            .times(1)
            .returning(move |_| Ok(Some(existing.clone())));
        movies.expect_exists().times(1).returning(|_| Ok(true));

        let unchanged = sample_user(user_id);
        users
            .expect_remove_favorite()
            .times(1)
            .returning(move |_, _| Ok(unchanged.clone()));

        let (service, _) = build_service(users, movies);

        let user = service.remove_favorite(&user_id, &movie_id).await.unwrap();
        assert!(user.favorites.is_empty());
    }

    #[tokio::test]
    async fn test_favorite_titles_skips_stale_references() {
        let mut users = MockTestUserRepository::new();
        let mut movies = MockTestMovieRepository::new();

        let user_id = UserId::new();
        let live_id = MovieId::new();
        let stale_id = MovieId::new();

        let mut existing = sample_user(user_id);
        existing.favorites = vec![live_id, stale_id];
        users
            .expect_find_by_id()
            .times(1)
            .returning(move |_| Ok(Some(existing.clone())));

        movies
            .expect_summaries_by_ids()
            .withf(move |ids| ids.contains(&live_id) && ids.contains(&stale_id))
            .times(1)
            .returning(move |_| {
                Ok(vec![MovieSummary {
                    id: live_id,
                    title: "The Brutalist".to_string(),
                }])
            });

        let (service, _) = build_service(users, movies);

        let titles = service.favorite_titles(&user_id).await.unwrap();
        assert_eq!(titles, vec!["The Brutalist".to_string()]);
    }
}
