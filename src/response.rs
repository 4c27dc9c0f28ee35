//! Success envelopes: `{"data": ...}` for one entity, `{"data": [...], "meta": {"count"}}` for lists.

use axum::{http::StatusCode, Json};
use serde::Serialize;

#[derive(Serialize)]
pub struct SuccessOne<T> {
    pub data: T,
}

#[derive(Serialize)]
pub struct SuccessMany<T> {
    pub data: Vec<T>,
    pub meta: MetaCount,
}

#[derive(Serialize)]
pub struct MetaCount {
    pub count: u64,
}

pub type One<T> = (StatusCode, Json<SuccessOne<T>>);
pub type Many<T> = (StatusCode, Json<SuccessMany<T>>);

fn one<T: Serialize>(status: StatusCode, data: T) -> One<T> {
    (status, Json(SuccessOne { data }))
}

/// 201 with the created entity.
pub fn created<T: Serialize>(data: T) -> One<T> {
    one(StatusCode::CREATED, data)
}

pub fn ok<T: Serialize>(data: T) -> One<T> {
    one(StatusCode::OK, data)
}

pub fn listed<T: Serialize>(data: Vec<T>) -> Many<T> {
    let count = data.len() as u64;
    (
        StatusCode::OK,
        Json(SuccessMany {
            data,
            meta: MetaCount { count },
        }),
    )
}

/// Map each item through `f` and wrap the result as a list.
pub fn listed_with<S, T: Serialize>(items: Vec<S>, f: impl Fn(&S) -> T) -> Many<T> {
    listed(items.iter().map(f).collect())
}
