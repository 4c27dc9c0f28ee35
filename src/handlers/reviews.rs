//! Review handlers.

use super::{parse_body, parse_id, update_fields};
use crate::error::AppError;
use crate::models::{Entity, EntityKind, Review};
use crate::response::{created, listed_with, ok};
use crate::service::ReviewInput;
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
pub struct ReviewView {
    pub id: Uuid,
    pub text: String,
    pub rating: u8,
    pub user_id: Uuid,
    pub place_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ReviewView {
    pub fn new(r: &Review) -> Self {
        ReviewView {
            id: r.id(),
            text: r.text().to_string(),
            rating: r.rating(),
            user_id: r.user_id(),
            place_id: r.place_id(),
            created_at: r.created_at(),
            updated_at: r.updated_at(),
        }
    }
}

pub async fn list(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let reviews = state.facade.get_all_reviews().await?;
    Ok(listed_with(reviews, ReviewView::new))
}

pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    let input: ReviewInput = parse_body(body)?;
    let review = state.facade.create_review(input).await?;
    Ok(created(ReviewView::new(&review)))
}

pub async fn read(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(EntityKind::Review, &id_str)?;
    let review = state
        .facade
        .get_review(id)
        .await?
        .ok_or_else(|| AppError::not_found(EntityKind::Review, id))?;
    Ok(ok(ReviewView::new(&review)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(EntityKind::Review, &id_str)?;
    let fields = update_fields(body)?;
    let review = state
        .facade
        .update_review(id, &fields)
        .await?
        .ok_or_else(|| AppError::not_found(EntityKind::Review, id))?;
    Ok(ok(ReviewView::new(&review)))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(EntityKind::Review, &id_str)?;
    if !state.facade.delete_review(id).await? {
        return Err(AppError::not_found(EntityKind::Review, id));
    }
    Ok(StatusCode::NO_CONTENT)
}
