use std::sync::Arc;

use async_trait::async_trait;

use crate::movie::errors::MovieError;
use crate::movie::models::Director;
use crate::movie::models::Genre;
use crate::movie::models::Movie;
use crate::movie::models::MovieId;
use crate::movie::ports::CatalogServicePort;
use crate::movie::ports::MovieRepository;

/// Domain service implementation for catalog lookups.
pub struct CatalogService<MR>
where
    MR: MovieRepository,
{
    movies: Arc<MR>,
}

impl<MR> CatalogService<MR>
where
    MR: MovieRepository,
{
    pub fn new(movies: Arc<MR>) -> Self {
        Self { movies }
    }
}

#[async_trait]
impl<MR> CatalogServicePort for CatalogService<MR>
where
    MR: MovieRepository,
{
    async fn list_movies(&self) -> Result<Vec<Movie>, MovieError> {
        self.movies.list_all().await
    }

    async fn get_movie(&self, id: &MovieId) -> Result<Movie, MovieError> {
        self.movies
            .find_by_id(id)
            .await?
            .ok_or(MovieError::NotFound(id.to_string()))
    }

    async fn get_genre(&self, name: &str) -> Result<Genre, MovieError> {
        self.movies
            .find_genre_by_name(name)
            .await?
            .ok_or(MovieError::GenreNotFound(name.to_string()))
    }

    async fn get_director(&self, name: &str) -> Result<Director, MovieError> {
        self.movies
            .find_director_by_name(name)
            .await?
            .ok_or(MovieError::DirectorNotFound(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use mockall::mock;

    use super::*;
    use crate::movie::models::MovieSummary;

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

    fn sample_movie(id: MovieId) -> Movie {
        Movie {
            id,
            title: "The Brutalist".to_string(),
            description: "An architect emigrates to the United States.".to_string(),
            release_year: 2024,
            director: Director {
                name: "Brady Corbet".to_string(),
                bio: "American filmmaker and actor.".to_string(),
                birth_year: Some(1988),
            },
            genre: Genre {
                name: "Period Drama".to_string(),
                description: "Films set in a specific historical era.".to_string(),
            },
            actors: vec![],
        }
    }

    #[tokio::test]
    async fn test_list_movies() {
        let mut repository = MockTestMovieRepository::new();

        let movie = sample_movie(MovieId::new());
        let returned = vec![movie.clone()];
        repository
            .expect_list_all()
            .times(1)
            .returning(move || Ok(returned.clone()));

        let service = CatalogService::new(Arc::new(repository));

        let movies = service.list_movies().await.unwrap();
        assert_eq!(movies.len(), 1);
        assert_eq!(movies[0].title, "The Brutalist");
    }

    #[tokio::test]
    async fn test_get_movie_success() {
        let mut repository = MockTestMovieRepository::new();

        let movie_id = MovieId::new();
        let movie = sample_movie(movie_id);
        let returned = movie.clone();
        repository
            .expect_find_by_id()
            .withf(move |id| *id == movie_id)
            .times(1)
            .returning(move |_| Ok(Some(returned.clone())));

        let service = CatalogService::new(Arc::new(repository));

        let found = service.get_movie(&movie_id).await.unwrap();
        assert_eq!(found.id, movie_id);
    }

    #[tokio::test]
    async fn test_get_movie_not_found() {
        let mut repository = MockTestMovieRepository::new();

        repository
            .expect_find_by_id()
            .times(1)
            .returning(|_| Ok(None));

        let service = CatalogService::new(Arc::new(repository));

        let result = service.get_movie(&MovieId::new()).await;
        assert!(matches!(result, Err(MovieError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_get_genre_success() {
        let mut repository = MockTestMovieRepository::new();

        repository
            .expect_find_genre_by_name()
            .withf(|name| name == "Period Drama")
            .times(1)
            .returning(|_| {
                Ok(Some(Genre {
                    name: "Period Drama".to_string(),
                    description: "Films set in a specific historical era.".to_string(),
                }))
            });

        let service = CatalogService::new(Arc::new(repository));

        let genre = service.get_genre("Period Drama").await.unwrap();
        assert_eq!(genre.name, "Period Drama");
    }

    #[tokio::test]
    async fn test_get_genre_not_found() {
        let mut repository = MockTestMovieRepository::new();

        repository
            .expect_find_genre_by_name()
            .times(1)
            .returning(|_| Ok(None));

        let service = CatalogService::new(Arc::new(repository));

        let result = service.get_genre("Mumblecore").await;
        assert!(matches!(result, Err(MovieError::GenreNotFound(_))));
    }

    #[tokio::test]
    async fn test_get_director_not_found() {
        let mut repository = MockTestMovieRepository::new();

        repository
            .expect_find_director_by_name()
            .times(1)
            .returning(|_| Ok(None));

        let service = CatalogService::new(Arc::new(repository));

        let result = service.get_director("Nobody").await;
        assert!(matches!(result, Err(MovieError::DirectorNotFound(_))));
    }
}
