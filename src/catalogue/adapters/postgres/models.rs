//! Diesel row models for service catalogue persistence.

use super::schema::{service_tools, services};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;

/// Query result row for service records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = services)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ServiceRow {
    /// Internal service identifier.
    pub id: uuid::Uuid,
    /// Service name.
    pub name: String,
    /// Service base url.
    pub url: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
    /// Soft-delete timestamp.
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Insert model for service records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = services)]
pub struct NewServiceRow {
    /// Internal service identifier.
    pub id: uuid::Uuid,
    /// Service name.
    pub name: String,
    /// Service base url.
    pub url: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Query result row for tool lists.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = service_tools)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ServiceToolsRow {
    /// Owning service identifier.
    pub service_id: uuid::Uuid,
    /// Tool descriptors payload.
    pub tools: Value,
    /// Soft-delete timestamp.
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Insert model for tool lists.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = service_tools)]
pub struct NewServiceToolsRow {
    /// Owning service identifier.
    pub service_id: uuid::Uuid,
    /// Tool descriptors payload.
    pub tools: Value,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last replacement timestamp.
    pub updated_at: DateTime<Utc>,
}
