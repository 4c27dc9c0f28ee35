//! Shared application state for all routes.

use crate::service::HbnbFacade;
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub facade: Arc<HbnbFacade>,
    /// Present when entities are stored in PostgreSQL; used by the readiness probe.
    pub pool: Option<PgPool>,
}

impl AppState {
    pub fn in_memory() -> Self {
        AppState {
            facade: Arc::new(HbnbFacade::in_memory()),
            pool: None,
        }
    }

    pub fn postgres(pool: PgPool, schema: &str) -> Self {
        AppState {
            facade: Arc::new(HbnbFacade::postgres(pool.clone(), schema)),
            pool: Some(pool),
        }
    }
}
