//! Storage contract used by the facade, with in-memory and PostgreSQL backends.

mod memory;
mod postgres;

pub use memory::InMemoryRepository;
pub use postgres::PgRepository;

use crate::error::AppError;
use crate::models::Entity;
use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

#[async_trait]
pub trait Repository<T: Entity>: Send + Sync {
    /// Store a new entity. Fails with `Conflict` if the id is already present.
    async fn add(&self, entity: T) -> Result<T, AppError>;

    async fn get(&self, id: Uuid) -> Result<Option<T>, AppError>;

    /// All entities in insertion order.
    async fn get_all(&self) -> Result<Vec<T>, AppError>;

    /// Replace the stored entity with the same id. Returns false when absent.
    async fn update(&self, entity: &T) -> Result<bool, AppError>;

    /// Returns false when absent.
    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;

    /// Entities whose serialized `field` equals `value` (e.g. `owner_id`, `email`).
    async fn find_by(&self, field: &str, value: &Value) -> Result<Vec<T>, AppError>;

    async fn find_one_by(&self, field: &str, value: &Value) -> Result<Option<T>, AppError> {
        Ok(self.find_by(field, value).await?.into_iter().next())
    }
}
