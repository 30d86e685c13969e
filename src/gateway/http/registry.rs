//! Registry API handlers.

use super::{ApiError, GatewayState};
use crate::catalogue::{
    domain::{CatalogueEntry, ServiceRecord},
    services::RegisterServiceRequest,
};
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub(super) struct RegisterServiceBody {
    name: String,
    url: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct RegisteredService {
    id: Uuid,
    name: String,
    url: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct UpdatedService {
    id: Uuid,
    name: String,
    url: String,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ServiceListing {
    id: Uuid,
    name: String,
    url: String,
    tool_count: usize,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<&ServiceRecord> for RegisteredService {
    fn from(service: &ServiceRecord) -> Self {
        Self {
            id: service.id().into_inner(),
            name: service.name().as_str().to_owned(),
            url: service.url().as_str().to_owned(),
            created_at: service.created_at(),
        }
    }
}

impl From<&ServiceRecord> for UpdatedService {
    fn from(service: &ServiceRecord) -> Self {
        Self {
            id: service.id().into_inner(),
            name: service.name().as_str().to_owned(),
            url: service.url().as_str().to_owned(),
            updated_at: service.updated_at(),
        }
    }
}

impl From<&CatalogueEntry> for ServiceListing {
    fn from(entry: &CatalogueEntry) -> Self {
        Self {
            id: entry.service.id().into_inner(),
            name: entry.service.name().as_str().to_owned(),
            url: entry.service.url().as_str().to_owned(),
            tool_count: entry.tools.len(),
            created_at: entry.service.created_at(),
            updated_at: entry.service.updated_at(),
        }
    }
}

pub(super) async fn register_service(
    State(state): State<GatewayState>,
    body: Result<Json<RegisterServiceBody>, JsonRejection>,
) -> Result<(StatusCode, Json<RegisteredService>), ApiError> {
    let Json(request) = body.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    let service = state
        .registry
        .register(RegisterServiceRequest::new(request.name, request.url))
        .await?;
    Ok((StatusCode::CREATED, Json(RegisteredService::from(&service))))
}

pub(super) async fn update_service(
    State(state): State<GatewayState>,
    Path(name): Path<String>,
) -> Result<Json<UpdatedService>, ApiError> {
    let service = state.registry.update(&name).await?;
    Ok(Json(UpdatedService::from(&service)))
}

pub(super) async fn delete_service(
    State(state): State<GatewayState>,
    Path(name): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.registry.delete(&name).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub(super) async fn list_services(
    State(state): State<GatewayState>,
) -> Result<Json<Vec<ServiceListing>>, ApiError> {
    let entries = state.registry.list().await?;
    Ok(Json(entries.iter().map(ServiceListing::from).collect()))
}
