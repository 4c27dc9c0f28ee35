//! Process-local storage. Default backend when no database is configured.

use super::Repository;
use crate::error::AppError;
use crate::models::Entity;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

pub struct InMemoryRepository<T> {
    rows: RwLock<Vec<T>>,
}

impl<T: Entity> InMemoryRepository<T> {
    pub fn new() -> Self {
        InMemoryRepository {
            rows: RwLock::new(Vec::new()),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Vec<T>>, AppError> {
        self.rows
            .read()
            .map_err(|_| AppError::Storage(format!("{} lock poisoned", T::KIND.collection())))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Vec<T>>, AppError> {
        self.rows
            .write()
            .map_err(|_| AppError::Storage(format!("{} lock poisoned", T::KIND.collection())))
    }
}

impl<T: Entity> Default for InMemoryRepository<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: Entity> Repository<T> for InMemoryRepository<T> {
    async fn add(&self, entity: T) -> Result<T, AppError> {
        let mut rows = self.write()?;
        if rows.iter().any(|r| r.id() == entity.id()) {
            return Err(AppError::Conflict(format!("{} {} already exists", T::KIND, entity.id())));
        }
        rows.push(entity.clone());
        Ok(entity)
    }

    async fn get(&self, id: Uuid) -> Result<Option<T>, AppError> {
        Ok(self.read()?.iter().find(|r| r.id() == id).cloned())
    }

    async fn get_all(&self) -> Result<Vec<T>, AppError> {
        Ok(self.read()?.clone())
    }

    async fn update(&self, entity: &T) -> Result<bool, AppError> {
        let mut rows = self.write()?;
        match rows.iter_mut().find(|r| r.id() == entity.id()) {
            Some(slot) => {
                *slot = entity.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let mut rows = self.write()?;
        let before = rows.len();
        rows.retain(|r| r.id() != id);
        Ok(rows.len() != before)
    }

    async fn find_by(&self, field: &str, value: &Value) -> Result<Vec<T>, AppError> {
        let rows = self.read()?;
        let mut out = Vec::new();
        for row in rows.iter() {
            let json = serde_json::to_value(row)?;
            if json.get(field) == Some(value) {
                out.push(row.clone());
            }
        }
        Ok(out)
    }
}
