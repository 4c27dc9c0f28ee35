//! PostgreSQL storage: one table per entity kind, the entity serialized into a JSONB payload.

use super::Repository;
use crate::error::AppError;
use crate::models::{Entity, EntityKind};
use crate::store::{qualified_table, USERS_EMAIL_KEY};
use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;
use std::marker::PhantomData;
use uuid::Uuid;

pub struct PgRepository<T> {
    pool: PgPool,
    table: String,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Entity> PgRepository<T> {
    /// Repository over `<schema>.<collection>`; tables come from [`crate::store::ensure_tables`].
    pub fn new(pool: PgPool, schema: &str) -> Self {
        PgRepository {
            pool,
            table: qualified_table(schema, T::KIND.collection()),
            _entity: PhantomData,
        }
    }

    fn decode_all(rows: Vec<Value>) -> Result<Vec<T>, AppError> {
        rows.into_iter()
            .map(|v| serde_json::from_value(v).map_err(AppError::from))
            .collect()
    }
}

#[async_trait]
impl<T: Entity> Repository<T> for PgRepository<T> {
    async fn add(&self, entity: T) -> Result<T, AppError> {
        let sql = format!(
            "INSERT INTO {} (id, payload, created_at, updated_at) VALUES ($1, $2, $3, $4)",
            self.table
        );
        tracing::debug!(sql = %sql, id = %entity.id(), "query");
        let payload = serde_json::to_value(&entity)?;
        let res = sqlx::query(&sql)
            .bind(entity.id())
            .bind(payload.clone())
            .bind(entity.created_at())
            .bind(entity.updated_at())
            .execute(&self.pool)
            .await;
        match res {
            Ok(_) => Ok(entity),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(unique_violation(T::KIND, entity.id(), db.constraint(), &payload))
            }
            Err(e) => Err(AppError::Db(e)),
        }
    }

    async fn get(&self, id: Uuid) -> Result<Option<T>, AppError> {
        let sql = format!("SELECT payload FROM {} WHERE id = $1", self.table);
        tracing::debug!(sql = %sql, id = %id, "query");
        let row: Option<Value> = sqlx::query_scalar(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        match row {
            Some(v) => Ok(Some(serde_json::from_value(v)?)),
            None => Ok(None),
        }
    }

    async fn get_all(&self) -> Result<Vec<T>, AppError> {
        let sql = format!("SELECT payload FROM {} ORDER BY created_at, id", self.table);
        tracing::debug!(sql = %sql, "query");
        let rows: Vec<Value> = sqlx::query_scalar(&sql).fetch_all(&self.pool).await?;
        Self::decode_all(rows)
    }

    async fn update(&self, entity: &T) -> Result<bool, AppError> {
        let sql = format!(
            "UPDATE {} SET payload = $2, updated_at = $3 WHERE id = $1",
            self.table
        );
        tracing::debug!(sql = %sql, id = %entity.id(), "query");
        let payload = serde_json::to_value(entity)?;
        let res = sqlx::query(&sql)
            .bind(entity.id())
            .bind(payload.clone())
            .bind(entity.updated_at())
            .execute(&self.pool)
            .await;
        match res {
            Ok(done) => Ok(done.rows_affected() > 0),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(unique_violation(T::KIND, entity.id(), db.constraint(), &payload))
            }
            Err(e) => Err(AppError::Db(e)),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let sql = format!("DELETE FROM {} WHERE id = $1", self.table);
        tracing::debug!(sql = %sql, id = %id, "query");
        let res = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        Ok(res.rows_affected() > 0)
    }

    async fn find_by(&self, field: &str, value: &Value) -> Result<Vec<T>, AppError> {
        let sql = format!(
            "SELECT payload FROM {} WHERE payload -> $1::text = $2 ORDER BY created_at, id",
            self.table
        );
        tracing::debug!(sql = %sql, field = %field, value = %value, "query");
        let rows: Vec<Value> = sqlx::query_scalar(&sql)
            .bind(field)
            .bind(value.clone())
            .fetch_all(&self.pool)
            .await?;
        Self::decode_all(rows)
    }
}

/// The email index maps to `DuplicateEmail`; any other unique clash is an id collision.
fn unique_violation(kind: EntityKind, id: Uuid, constraint: Option<&str>, payload: &Value) -> AppError {
    if kind == EntityKind::User && constraint == Some(USERS_EMAIL_KEY) {
        let email = payload.get("email").and_then(Value::as_str).unwrap_or_default();
        return AppError::DuplicateEmail(email.to_string());
    }
    AppError::Conflict(format!("{} {} already exists", kind, id))
}
