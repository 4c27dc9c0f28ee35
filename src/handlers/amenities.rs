//! Amenity handlers.

use super::{parse_body, parse_id, update_fields};
use crate::error::AppError;
use crate::models::{Amenity, Entity, EntityKind, NewAmenity};
use crate::response::{created, listed_with, ok};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

#[derive(Serialize)]
pub struct AmenityView {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AmenityView {
    pub fn new(a: &Amenity) -> Self {
        AmenityView {
            id: a.id(),
            name: a.name().to_string(),
            created_at: a.created_at(),
            updated_at: a.updated_at(),
        }
    }
}

pub async fn list(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let amenities = state.facade.get_all_amenities().await?;
    Ok(listed_with(amenities, AmenityView::new))
}

pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    let input: NewAmenity = parse_body(body)?;
    let amenity = state.facade.create_amenity(input).await?;
    Ok(created(AmenityView::new(&amenity)))
}

pub async fn read(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(EntityKind::Amenity, &id_str)?;
    let amenity = state
        .facade
        .get_amenity(id)
        .await?
        .ok_or_else(|| AppError::not_found(EntityKind::Amenity, id))?;
    Ok(ok(AmenityView::new(&amenity)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(EntityKind::Amenity, &id_str)?;
    let fields = update_fields(body)?;
    let amenity = state
        .facade
        .update_amenity(id, &fields)
        .await?
        .ok_or_else(|| AppError::not_found(EntityKind::Amenity, id))?;
    Ok(ok(AmenityView::new(&amenity)))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(EntityKind::Amenity, &id_str)?;
    if !state.facade.delete_amenity(id).await? {
        return Err(AppError::not_found(EntityKind::Amenity, id));
    }
    Ok(StatusCode::NO_CONTENT)
}
