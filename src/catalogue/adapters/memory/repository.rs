//! In-memory repository for service records and tool lists.

use crate::catalogue::{
    domain::{
        CatalogueEntry, ServiceId, ServiceName, ServiceRecord, ServiceTools, ToolDescriptor,
    },
    ports::{ServiceCatalogueError, ServiceCatalogueRepository, ServiceCatalogueResult},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Thread-safe in-memory service catalogue.
///
/// Records are kept in registration order. Uniqueness checks and inserts
/// happen under one write lock.
#[derive(Debug, Clone, Default)]
pub struct InMemoryServiceCatalogue {
    state: Arc<RwLock<InMemoryCatalogueState>>,
}

#[derive(Debug, Default)]
struct InMemoryCatalogueState {
    services: Vec<ServiceRecord>,
    tools: HashMap<ServiceId, ServiceTools>,
}

impl InMemoryCatalogueState {
    fn active_mut(&mut self, service_id: ServiceId) -> ServiceCatalogueResult<&mut ServiceRecord> {
        self.services
            .iter_mut()
            .find(|service| service.id() == service_id && service.is_active())
            .ok_or(ServiceCatalogueError::NotFound(service_id))
    }
}

impl InMemoryServiceCatalogue {
    /// Creates an empty in-memory catalogue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read_state(&self) -> ServiceCatalogueResult<RwLockReadGuard<'_, InMemoryCatalogueState>> {
        self.state.read().map_err(|err| {
            ServiceCatalogueError::persistence(std::io::Error::other(err.to_string()))
        })
    }

    fn write_state(&self) -> ServiceCatalogueResult<RwLockWriteGuard<'_, InMemoryCatalogueState>> {
        self.state.write().map_err(|err| {
            ServiceCatalogueError::persistence(std::io::Error::other(err.to_string()))
        })
    }
}

#[async_trait]
impl ServiceCatalogueRepository for InMemoryServiceCatalogue {
    async fn insert(&self, service: &ServiceRecord) -> ServiceCatalogueResult<()> {
        let mut state = self.write_state()?;

        for existing in state.services.iter().filter(|existing| existing.is_active()) {
            if existing.name() == service.name() {
                return Err(ServiceCatalogueError::DuplicateServiceName(
                    service.name().clone(),
                ));
            }
            if existing.url() == service.url() {
                return Err(ServiceCatalogueError::DuplicateServiceUrl(
                    service.url().clone(),
                ));
            }
        }

        state.services.push(service.clone());
        state
            .tools
            .insert(service.id(), ServiceTools::new(service.id(), Vec::new()));
        Ok(())
    }

    async fn replace_tools(
        &self,
        service_id: ServiceId,
        tools: &[ToolDescriptor],
        updated_at: DateTime<Utc>,
    ) -> ServiceCatalogueResult<()> {
        let mut state = self.write_state()?;
        state.active_mut(service_id)?.touch_at(updated_at);
        state
            .tools
            .entry(service_id)
            .or_insert_with(|| ServiceTools::new(service_id, Vec::new()))
            .replace(tools.to_vec());
        Ok(())
    }

    async fn find_active_by_name(
        &self,
        name: &ServiceName,
    ) -> ServiceCatalogueResult<Option<ServiceRecord>> {
        let state = self.read_state()?;
        Ok(state
            .services
            .iter()
            .find(|service| service.is_active() && service.name() == name)
            .cloned())
    }

    async fn find_by_id(
        &self,
        service_id: ServiceId,
    ) -> ServiceCatalogueResult<Option<ServiceRecord>> {
        let state = self.read_state()?;
        Ok(state
            .services
            .iter()
            .find(|service| service.id() == service_id)
            .cloned())
    }

    async fn find_tools(
        &self,
        service_id: ServiceId,
    ) -> ServiceCatalogueResult<Option<ServiceTools>> {
        let state = self.read_state()?;
        Ok(state.tools.get(&service_id).cloned())
    }

    async fn soft_delete(
        &self,
        service_id: ServiceId,
        deleted_at: DateTime<Utc>,
    ) -> ServiceCatalogueResult<()> {
        let mut state = self.write_state()?;
        state.active_mut(service_id)?.mark_deleted(deleted_at);
        if let Some(tools) = state.tools.get_mut(&service_id) {
            tools.mark_deleted(deleted_at);
        }
        Ok(())
    }

    async fn list_active(&self) -> ServiceCatalogueResult<Vec<CatalogueEntry>> {
        let state = self.read_state()?;
        Ok(state
            .services
            .iter()
            .filter(|service| service.is_active())
            .map(|service| CatalogueEntry {
                service: service.clone(),
                tools: state
                    .tools
                    .get(&service.id())
                    .map(|tools| tools.tools().to_vec())
                    .unwrap_or_default(),
            })
            .collect())
    }
}
