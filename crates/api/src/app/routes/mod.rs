use axum::{Router, routing::get};

use gameshop_catalog::EntityKind;

pub mod associations;
pub mod catalog;
pub mod sales;
pub mod system;

/// Router for all authenticated endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .nest("/products", associations::router(EntityKind::Product))
        .nest("/developers", associations::router(EntityKind::Developer))
        .nest("/companies", associations::router(EntityKind::Company))
        .nest("/sales", sales::router())
        .nest("/catalog", catalog::router())
}
