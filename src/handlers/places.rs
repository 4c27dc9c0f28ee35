//! Place handlers: CRUD, amenity linking and the reviews of a place.

use super::{parse_body, parse_id, update_fields};
use crate::error::AppError;
use crate::handlers::reviews::ReviewView;
use crate::models::{Entity, EntityKind, Place};
use crate::response::{created, listed_with, ok};
use crate::service::PlaceInput;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

#[derive(Serialize)]
pub struct PlaceView {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub price: f64,
    pub latitude: f64,
    pub longitude: f64,
    pub owner_id: Uuid,
    pub amenities: Vec<Uuid>,
    /// Only present on single-place responses.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviews: Option<Vec<Uuid>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PlaceView {
    pub fn summary(place: &Place) -> Self {
        PlaceView {
            id: place.id(),
            title: place.title().to_string(),
            description: place.description().map(str::to_string),
            price: place.price(),
            latitude: place.latitude(),
            longitude: place.longitude(),
            owner_id: place.owner_id(),
            amenities: place.amenities().to_vec(),
            reviews: None,
            created_at: place.created_at(),
            updated_at: place.updated_at(),
        }
    }

    pub fn detail(place: &Place) -> Self {
        PlaceView {
            reviews: Some(place.reviews().to_vec()),
            ..Self::summary(place)
        }
    }
}

#[derive(Deserialize)]
pub struct AddAmenity {
    pub amenity_id: Uuid,
}

pub async fn list(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let places = state.facade.get_all_places().await?;
    Ok(listed_with(places, PlaceView::summary))
}

pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    let input: PlaceInput = parse_body(body)?;
    let place = state.facade.create_place(input).await?;
    Ok(created(PlaceView::detail(&place)))
}

pub async fn read(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(EntityKind::Place, &id_str)?;
    let place = state
        .facade
        .get_place(id)
        .await?
        .ok_or_else(|| AppError::not_found(EntityKind::Place, id))?;
    Ok(ok(PlaceView::detail(&place)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(EntityKind::Place, &id_str)?;
    let fields = update_fields(body)?;
    let place = state
        .facade
        .update_place(id, &fields)
        .await?
        .ok_or_else(|| AppError::not_found(EntityKind::Place, id))?;
    Ok(ok(PlaceView::detail(&place)))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(EntityKind::Place, &id_str)?;
    if !state.facade.delete_place(id).await? {
        return Err(AppError::not_found(EntityKind::Place, id));
    }
    Ok(StatusCode::NO_CONTENT)
}

pub async fn add_amenity(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(EntityKind::Place, &id_str)?;
    let AddAmenity { amenity_id } = parse_body(body)?;
    let place = state
        .facade
        .add_amenity_to_place(id, amenity_id)
        .await?
        .ok_or_else(|| AppError::not_found(EntityKind::Place, id))?;
    Ok(ok(PlaceView::detail(&place)))
}

pub async fn reviews(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(EntityKind::Place, &id_str)?;
    let reviews = state
        .facade
        .get_reviews_by_place(id)
        .await?
        .ok_or_else(|| AppError::not_found(EntityKind::Place, id))?;
    Ok(listed_with(reviews, ReviewView::new))
}
