use shelfwise_core::errors::DataAccessError;
use thiserror::Error;

pub mod catalog;
pub mod memory;

pub use catalog::SqlCatalogRepository;
pub use memory::InMemoryCatalog;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
    #[error("not found: {0}")]
    NotFound(String),
}

impl From<RepositoryError> for DataAccessError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::Database(
                source @ (sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_)),
            ) => DataAccessError::Unavailable(source.to_string()),
            RepositoryError::Database(source) => DataAccessError::Query(source.to_string()),
            RepositoryError::Decode(message) => DataAccessError::Decode(message),
            RepositoryError::NotFound(message) => DataAccessError::Query(message),
        }
    }
}
