//! Identity, timestamps and update semantics shared by every entity.

use crate::models::validation::ValidationError;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

/// Field updates keyed by attribute name, as received from a request body.
pub type Fields = HashMap<String, Value>;

/// Closed set of entity kinds. Used for reference checks and storage naming.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    User,
    Place,
    Review,
    Amenity,
}

impl EntityKind {
    /// Table / collection name.
    pub fn collection(&self) -> &'static str {
        match self {
            EntityKind::User => "users",
            EntityKind::Place => "places",
            EntityKind::Review => "reviews",
            EntityKind::Amenity => "amenities",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EntityKind::User => "User",
            EntityKind::Place => "Place",
            EntityKind::Review => "Review",
            EntityKind::Amenity => "Amenity",
        };
        f.write_str(s)
    }
}

/// Tagged reference to an entity, passed to constructors that link entities together.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EntityRef {
    pub kind: EntityKind,
    pub id: Uuid,
}

impl EntityRef {
    pub fn of<T: Entity>(entity: &T) -> Self {
        EntityRef {
            kind: T::KIND,
            id: entity.id(),
        }
    }

    /// Returns the id when the reference points at `expected`, otherwise a validation error on `field`.
    pub fn expect_kind(
        &self,
        expected: EntityKind,
        field: &'static str,
        message: &str,
    ) -> Result<Uuid, ValidationError> {
        if self.kind != expected {
            return Err(ValidationError::new(field, message));
        }
        Ok(self.id)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EntityMeta {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl EntityMeta {
    pub fn new() -> Self {
        let now = Utc::now();
        EntityMeta {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl Default for EntityMeta {
    fn default() -> Self {
        Self::new()
    }
}

pub trait Entity: Clone + fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static {
    const KIND: EntityKind;

    fn meta(&self) -> &EntityMeta;

    fn meta_mut(&mut self) -> &mut EntityMeta;

    /// Validate and assign one mutable attribute. Unknown or immutable keys are ignored.
    fn apply_field(&mut self, key: &str, value: &Value) -> Result<(), ValidationError>;

    fn id(&self) -> Uuid {
        self.meta().id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.meta().created_at
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.meta().updated_at
    }

    /// Apply all supplied fields or none: changes are staged on a copy and only
    /// swapped in once every field has validated.
    fn update(&mut self, fields: &Fields) -> Result<(), ValidationError> {
        let mut staged = self.clone();
        for (key, value) in fields {
            staged.apply_field(key, value)?;
        }
        staged.meta_mut().touch();
        *self = staged;
        Ok(())
    }
}

pub(crate) fn expect_str<'a>(field: &'static str, value: &'a Value) -> Result<&'a str, ValidationError> {
    value
        .as_str()
        .ok_or_else(|| ValidationError::new(field, format!("{} must be a string", field)))
}

pub(crate) fn expect_f64(field: &'static str, value: &Value) -> Result<f64, ValidationError> {
    value
        .as_f64()
        .ok_or_else(|| ValidationError::new(field, format!("{} must be a number", field)))
}

pub(crate) fn expect_i64(field: &'static str, value: &Value) -> Result<i64, ValidationError> {
    value
        .as_i64()
        .ok_or_else(|| ValidationError::new(field, format!("{} must be an integer", field)))
}

pub(crate) fn expect_bool(field: &'static str, value: &Value) -> Result<bool, ValidationError> {
    value
        .as_bool()
        .ok_or_else(|| ValidationError::new(field, format!("{} must be a boolean", field)))
}
