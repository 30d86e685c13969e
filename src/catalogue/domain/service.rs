//! Service registration record and its stored tool list.

use super::{ServiceId, ServiceName, ServiceUrl, ToolDescriptor};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// A registered downstream service.
///
/// Records are never renamed. Deleting a service stamps `deleted_at` and
/// keeps the row; soft-deleted records take no part in active operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceRecord {
    id: ServiceId,
    name: ServiceName,
    url: ServiceUrl,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

/// Parameter object for reconstructing persisted service state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedServiceData {
    /// Persisted service identifier.
    pub id: ServiceId,
    /// Persisted service name.
    pub name: ServiceName,
    /// Persisted service url.
    pub url: ServiceUrl,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted update timestamp.
    pub updated_at: DateTime<Utc>,
    /// Persisted soft-delete timestamp.
    pub deleted_at: Option<DateTime<Utc>>,
}

impl ServiceRecord {
    /// Creates a new active service record.
    #[must_use]
    pub fn new(name: ServiceName, url: ServiceUrl, clock: &impl Clock) -> Self {
        let timestamp = clock.utc();
        Self {
            id: ServiceId::new(),
            name,
            url,
            created_at: timestamp,
            updated_at: timestamp,
            deleted_at: None,
        }
    }

    /// Reconstructs a record from persistence.
    #[must_use]
    pub fn from_persisted(data: PersistedServiceData) -> Self {
        Self {
            id: data.id,
            name: data.name,
            url: data.url,
            created_at: data.created_at,
            updated_at: data.updated_at,
            deleted_at: data.deleted_at,
        }
    }

    /// Returns the service identifier.
    #[must_use]
    pub const fn id(&self) -> ServiceId {
        self.id
    }

    /// Returns the validated service name.
    #[must_use]
    pub const fn name(&self) -> &ServiceName {
        &self.name
    }

    /// Returns the service base url.
    #[must_use]
    pub const fn url(&self) -> &ServiceUrl {
        &self.url
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns the soft-delete timestamp, if deleted.
    #[must_use]
    pub const fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }

    /// Returns whether the record is active.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.deleted_at.is_none()
    }

    /// Stamps the record as updated now.
    pub fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }

    /// Stamps the record as updated at `timestamp`.
    pub const fn touch_at(&mut self, timestamp: DateTime<Utc>) {
        self.updated_at = timestamp;
    }

    /// Marks the record soft-deleted at `timestamp`.
    pub const fn mark_deleted(&mut self, timestamp: DateTime<Utc>) {
        self.deleted_at = Some(timestamp);
    }
}

/// Stored tool list of one service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceTools {
    service_id: ServiceId,
    tools: Vec<ToolDescriptor>,
    deleted_at: Option<DateTime<Utc>>,
}

impl ServiceTools {
    /// Creates an active tool list.
    #[must_use]
    pub const fn new(service_id: ServiceId, tools: Vec<ToolDescriptor>) -> Self {
        Self {
            service_id,
            tools,
            deleted_at: None,
        }
    }

    /// Reconstructs a tool list from persistence.
    #[must_use]
    pub const fn from_persisted(
        service_id: ServiceId,
        tools: Vec<ToolDescriptor>,
        deleted_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            service_id,
            tools,
            deleted_at,
        }
    }

    /// Returns the owning service identifier.
    #[must_use]
    pub const fn service_id(&self) -> ServiceId {
        self.service_id
    }

    /// Returns the tools in downstream order.
    #[must_use]
    pub fn tools(&self) -> &[ToolDescriptor] {
        &self.tools
    }

    /// Returns the soft-delete timestamp, if deleted.
    #[must_use]
    pub const fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }

    /// Replaces the tool list wholesale.
    pub fn replace(&mut self, tools: Vec<ToolDescriptor>) {
        self.tools = tools;
    }

    /// Marks the list soft-deleted at `timestamp`.
    pub const fn mark_deleted(&mut self, timestamp: DateTime<Utc>) {
        self.deleted_at = Some(timestamp);
    }

    /// Consumes the list, returning the tools.
    #[must_use]
    pub fn into_tools(self) -> Vec<ToolDescriptor> {
        self.tools
    }
}

/// An active service together with its stored tools.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogueEntry {
    /// Service record.
    pub service: ServiceRecord,
    /// Tools in downstream order.
    pub tools: Vec<ToolDescriptor>,
}
