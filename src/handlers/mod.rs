//! HTTP handlers for users, places, reviews and amenities.

pub mod amenities;
pub mod places;
pub mod reviews;
pub mod users;

use crate::error::AppError;
use crate::models::{EntityKind, Fields};
use serde::de::DeserializeOwned;
use serde_json::Value;
use uuid::Uuid;

/// Path ids that are not UUIDs cannot name a stored entity, so they read as not found.
fn parse_id(kind: EntityKind, id_str: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(id_str).map_err(|_| AppError::NotFound(format!("{} {} not found", kind, id_str)))
}

fn parse_body<T: DeserializeOwned>(body: Value) -> Result<T, AppError> {
    if !body.is_object() {
        return Err(AppError::BadRequest("body must be a JSON object".into()));
    }
    serde_json::from_value(body).map_err(|e| AppError::BadRequest(format!("invalid input data: {}", e)))
}

fn update_fields(body: Value) -> Result<Fields, AppError> {
    match body {
        Value::Object(m) if !m.is_empty() => Ok(m.into_iter().collect()),
        Value::Object(_) => Err(AppError::BadRequest("no fields to update".into())),
        _ => Err(AppError::BadRequest("body must be a JSON object".into())),
    }
}
