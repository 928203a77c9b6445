//! Catalog registry: `/catalog/{kind}` where `kind` is a path segment such as
//! `products`, `payment-methods` or `sale-statuses`.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};

use gameshop_catalog::{EntityKind, EntityPatch};
use gameshop_core::EntityId;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/:kind", get(list_entities).post(create_entity))
        .route(
            "/:kind/:id",
            get(get_entity).patch(update_entity).delete(delete_entity),
        )
}

fn parse_kind(segment: &str) -> Result<EntityKind, Response> {
    EntityKind::from_path_segment(segment).ok_or_else(|| {
        errors::json_error(
            StatusCode::NOT_FOUND,
            "not_found",
            format!("unknown catalog kind '{segment}'"),
        )
    })
}

fn parse_target(kind: &str, id: &str) -> Result<(EntityKind, EntityId), Response> {
    Ok((parse_kind(kind)?, errors::parse_id(id)?))
}

pub async fn create_entity(
    Extension(services): Extension<Arc<AppServices>>,
    Path(kind): Path<String>,
    body: Result<Json<dto::CreateEntityRequest>, JsonRejection>,
) -> Response {
    let kind = match parse_kind(&kind) {
        Ok(k) => k,
        Err(resp) => return resp,
    };
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };

    match services.catalog.create(kind, &body.name, body.price).await {
        Ok(entity) => (StatusCode::CREATED, Json(dto::entity_to_json(&entity))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn list_entities(
    Extension(services): Extension<Arc<AppServices>>,
    Path(kind): Path<String>,
) -> Response {
    let kind = match parse_kind(&kind) {
        Ok(k) => k,
        Err(resp) => return resp,
    };
    match services.catalog.list(kind).await {
        Ok(entities) => {
            let items = entities.iter().map(dto::entity_to_json).collect::<Vec<_>>();
            (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
        }
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn get_entity(
    Extension(services): Extension<Arc<AppServices>>,
    Path((kind, id)): Path<(String, String)>,
) -> Response {
    let (kind, id) = match parse_target(&kind, &id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.catalog.get(kind, id).await {
        Ok(entity) => (StatusCode::OK, Json(dto::entity_to_json(&entity))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn update_entity(
    Extension(services): Extension<Arc<AppServices>>,
    Path((kind, id)): Path<(String, String)>,
    body: Result<Json<EntityPatch>, JsonRejection>,
) -> Response {
    let (kind, id) = match parse_target(&kind, &id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };

    match services.catalog.update(kind, id, body).await {
        Ok(entity) => (StatusCode::OK, Json(dto::entity_to_json(&entity))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn delete_entity(
    Extension(services): Extension<Arc<AppServices>>,
    Path((kind, id)): Path<(String, String)>,
) -> Response {
    let (kind, id) = match parse_target(&kind, &id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.catalog.delete(kind, id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
