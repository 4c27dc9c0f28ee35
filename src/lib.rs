//! HBnB booking backend: users, places, reviews and amenities behind a validating facade.

pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod response;
pub mod routes;
pub mod service;
pub mod state;
pub mod store;

pub use config::Settings;
pub use error::AppError;
pub use routes::{api_routes, app, common_routes};
pub use service::HbnbFacade;
pub use state::AppState;
pub use store::{ensure_database_exists, ensure_tables};
