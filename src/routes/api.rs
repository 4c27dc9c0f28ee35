//! Entity routes, mounted by the binary under `/api/v1`.

use crate::handlers::{amenities, places, reviews, users};
use crate::state::AppState;
use axum::{routing::get, routing::post, Router};

pub fn api_routes(state: AppState) -> Router {
    Router::new()
        .route("/users", get(users::list).post(users::create))
        .route(
            "/users/:id",
            get(users::read).put(users::update).delete(users::delete),
        )
        .route("/users/:id/places", get(users::places))
        .route("/users/:id/reviews", get(users::reviews))
        .route("/amenities", get(amenities::list).post(amenities::create))
        .route(
            "/amenities/:id",
            get(amenities::read).put(amenities::update).delete(amenities::delete),
        )
        .route("/places", get(places::list).post(places::create))
        .route(
            "/places/:id",
            get(places::read).put(places::update).delete(places::delete),
        )
        .route("/places/:id/amenities", post(places::add_amenity))
        .route("/places/:id/reviews", get(places::reviews))
        .route("/reviews", get(reviews::list).post(reviews::create))
        .route(
            "/reviews/:id",
            get(reviews::read).put(reviews::update).delete(reviews::delete),
        )
        .route("/reviews/places/:id/reviews", get(places::reviews))
        .with_state(state)
}
