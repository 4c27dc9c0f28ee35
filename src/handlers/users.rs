//! User handlers: CRUD plus the places and reviews a user owns.

use super::{parse_body, parse_id, update_fields};
use crate::error::AppError;
use crate::handlers::places::PlaceView;
use crate::handlers::reviews::ReviewView;
use crate::models::{Entity, EntityKind, NewUser, User};
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
pub struct UserView {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub is_admin: bool,
    /// Only present on single-user responses.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub places: Option<Vec<Uuid>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserView {
    pub fn summary(user: &User) -> Self {
        UserView {
            id: user.id(),
            first_name: user.first_name().to_string(),
            last_name: user.last_name().to_string(),
            email: user.email().to_string(),
            is_admin: user.is_admin(),
            places: None,
            created_at: user.created_at(),
            updated_at: user.updated_at(),
        }
    }

    pub fn detail(user: &User) -> Self {
        UserView {
            places: Some(user.places().to_vec()),
            ..Self::summary(user)
        }
    }
}

pub async fn list(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let users = state.facade.get_all_users().await?;
    Ok(listed_with(users, UserView::summary))
}

pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    let input: NewUser = parse_body(body)?;
    let user = state.facade.create_user(input).await?;
    Ok(created(UserView::detail(&user)))
}

pub async fn read(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(EntityKind::User, &id_str)?;
    let user = state
        .facade
        .get_user(id)
        .await?
        .ok_or_else(|| AppError::not_found(EntityKind::User, id))?;
    Ok(ok(UserView::detail(&user)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(EntityKind::User, &id_str)?;
    let fields = update_fields(body)?;
    let user = state
        .facade
        .update_user(id, &fields)
        .await?
        .ok_or_else(|| AppError::not_found(EntityKind::User, id))?;
    Ok(ok(UserView::detail(&user)))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(EntityKind::User, &id_str)?;
    if !state.facade.delete_user(id).await? {
        return Err(AppError::not_found(EntityKind::User, id));
    }
    Ok(StatusCode::NO_CONTENT)
}

pub async fn places(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(EntityKind::User, &id_str)?;
    let places = state
        .facade
        .get_places_by_owner(id)
        .await?
        .ok_or_else(|| AppError::not_found(EntityKind::User, id))?;
    Ok(listed_with(places, PlaceView::summary))
}

pub async fn reviews(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(EntityKind::User, &id_str)?;
    let reviews = state
        .facade
        .get_reviews_by_user(id)
        .await?
        .ok_or_else(|| AppError::not_found(EntityKind::User, id))?;
    Ok(listed_with(reviews, ReviewView::new))
}
