//! Bridge-record routes, mounted under each left entity:
//! `/products/{id}/{platforms|genres|companies|developers}`,
//! `/developers/{id}/types`, `/companies/{id}/types`.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch, post},
};

use gameshop_associations::{AssociationPatch, RelationKind};
use gameshop_catalog::EntityKind;
use gameshop_core::{AssociationId, EntityId};

use crate::app::services::{AppServices, Associations};
use crate::app::{dto, errors};

/// Entity kind owning the mounted routes (the left side of every relation).
#[derive(Debug, Copy, Clone)]
pub struct Owner(pub EntityKind);

pub fn router(owner: EntityKind) -> Router {
    Router::new()
        .route("/:owner_id/:relation", get(list_associations))
        .route("/:owner_id/:relation/:other_id", post(link).delete(unlink))
        .route(
            "/:owner_id/:relation/relations/:record_id",
            patch(patch_association),
        )
        .layer(Extension(Owner(owner)))
}

fn manager(services: &AppServices, owner: Owner, segment: &str) -> Result<Associations, Response> {
    match RelationKind::for_segment(owner.0, segment) {
        Some(relation) => Ok(services.associations(relation)),
        None => Err(errors::json_error(
            StatusCode::NOT_FOUND,
            "not_found",
            format!("unknown relation '{segment}' for {}", owner.0),
        )),
    }
}

pub async fn list_associations(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(owner): Extension<Owner>,
    Path((owner_id, segment)): Path<(String, String)>,
) -> Response {
    let manager = match manager(&services, owner, &segment) {
        Ok(m) => m,
        Err(resp) => return resp,
    };
    let owner_id: EntityId = match errors::parse_id(&owner_id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match manager.find_by_left(owner_id).await {
        Ok(records) if records.is_empty() => StatusCode::NO_CONTENT.into_response(),
        Ok(records) => {
            let items = records.iter().map(dto::association_to_json).collect::<Vec<_>>();
            (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
        }
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn link(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(owner): Extension<Owner>,
    Path((owner_id, segment, other_id)): Path<(String, String, String)>,
) -> Response {
    let manager = match manager(&services, owner, &segment) {
        Ok(m) => m,
        Err(resp) => return resp,
    };
    let (owner_id, other_id) = match parse_pair(&owner_id, &other_id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match manager.link(owner_id, other_id).await {
        Ok(record) => (StatusCode::CREATED, Json(dto::association_to_json(&record))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn unlink(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(owner): Extension<Owner>,
    Path((owner_id, segment, other_id)): Path<(String, String, String)>,
) -> Response {
    let manager = match manager(&services, owner, &segment) {
        Ok(m) => m,
        Err(resp) => return resp,
    };
    let (owner_id, other_id) = match parse_pair(&owner_id, &other_id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match manager.unlink(owner_id, other_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

/// Re-point one or both sides of an existing record. The owner id in the
/// path only selects the route; the record id decides what is patched.
pub async fn patch_association(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(owner): Extension<Owner>,
    Path((_owner_id, segment, record_id)): Path<(String, String, String)>,
    body: Result<Json<AssociationPatch>, JsonRejection>,
) -> Response {
    let manager = match manager(&services, owner, &segment) {
        Ok(m) => m,
        Err(resp) => return resp,
    };
    let record_id: AssociationId = match errors::parse_id(&record_id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };

    match manager.patch(record_id, body).await {
        Ok(record) => (StatusCode::OK, Json(dto::association_to_json(&record))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

fn parse_pair(owner_id: &str, other_id: &str) -> Result<(EntityId, EntityId), Response> {
    Ok((errors::parse_id(owner_id)?, errors::parse_id(other_id)?))
}
