//! `PostgreSQL` repository implementation for the service catalogue.

use super::{
    models::{NewServiceRow, NewServiceToolsRow, ServiceRow, ServiceToolsRow},
    schema::{service_tools, services},
};
use crate::catalogue::{
    domain::{
        CatalogueEntry, PersistedServiceData, ServiceId, ServiceName, ServiceRecord,
        ServiceTools, ServiceUrl, ToolDescriptor,
    },
    ports::{ServiceCatalogueError, ServiceCatalogueRepository, ServiceCatalogueResult},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::connection::SimpleConnection;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use serde_json::Value;

/// SQL creating the catalogue tables and partial unique indexes.
///
/// Every statement is idempotent.
pub const CATALOGUE_SCHEMA_SQL: &str =
    include_str!("../../../../migrations/2026-10-01-000000_create_service_catalogue/up.sql");

const ACTIVE_NAME_INDEX: &str = "idx_services_active_name";
const ACTIVE_URL_INDEX: &str = "idx_services_active_url";

/// `PostgreSQL` connection pool type for catalogue adapters.
pub type CataloguePgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed service catalogue.
#[derive(Debug, Clone)]
pub struct PostgresServiceCatalogue {
    pool: CataloguePgPool,
}

impl PostgresServiceCatalogue {
    /// Creates a new repository from a `PostgreSQL` pool.
    #[must_use]
    pub const fn new(pool: CataloguePgPool) -> Self {
        Self { pool }
    }

    /// Creates the catalogue tables when they do not exist yet.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceCatalogueError::Persistence`] when a connection
    /// cannot be obtained or a statement fails.
    pub async fn apply_schema(&self) -> ServiceCatalogueResult<()> {
        self.run_blocking(|connection| {
            connection
                .batch_execute(CATALOGUE_SCHEMA_SQL)
                .map_err(ServiceCatalogueError::persistence)
        })
        .await
    }

    async fn run_blocking<F, T>(&self, operation: F) -> ServiceCatalogueResult<T>
    where
        F: FnOnce(&mut PgConnection) -> ServiceCatalogueResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(ServiceCatalogueError::persistence)?;
            operation(&mut connection)
        })
        .await
        .map_err(ServiceCatalogueError::persistence)?
    }
}

#[async_trait]
impl ServiceCatalogueRepository for PostgresServiceCatalogue {
    async fn insert(&self, service: &ServiceRecord) -> ServiceCatalogueResult<()> {
        let service_name = service.name().clone();
        let service_url = service.url().clone();
        let new_service = NewServiceRow {
            id: service.id().into_inner(),
            name: service.name().as_str().to_owned(),
            url: service.url().as_str().to_owned(),
            created_at: service.created_at(),
            updated_at: service.updated_at(),
        };
        let new_tools = NewServiceToolsRow {
            service_id: service.id().into_inner(),
            tools: Value::Array(Vec::new()),
            created_at: service.created_at(),
            updated_at: service.updated_at(),
        };

        self.run_blocking(move |connection| {
            connection
                .transaction::<_, DieselError, _>(|transaction| {
                    diesel::insert_into(services::table)
                        .values(&new_service)
                        .execute(transaction)?;
                    diesel::insert_into(service_tools::table)
                        .values(&new_tools)
                        .execute(transaction)?;
                    Ok(())
                })
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info)
                        if violates(info.as_ref(), ACTIVE_NAME_INDEX) =>
                    {
                        ServiceCatalogueError::DuplicateServiceName(service_name.clone())
                    }
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info)
                        if violates(info.as_ref(), ACTIVE_URL_INDEX) =>
                    {
                        ServiceCatalogueError::DuplicateServiceUrl(service_url.clone())
                    }
                    _ => ServiceCatalogueError::persistence(err),
                })
        })
        .await
    }

    async fn replace_tools(
        &self,
        service_id: ServiceId,
        tools: &[ToolDescriptor],
        updated_at: DateTime<Utc>,
    ) -> ServiceCatalogueResult<()> {
        let payload = serde_json::to_value(tools).map_err(ServiceCatalogueError::persistence)?;
        let id = service_id.into_inner();

        let updated_count = self
            .run_blocking(move |connection| {
                connection
                    .transaction::<_, DieselError, _>(|transaction| {
                        let touched = diesel::update(
                            services::table
                                .filter(services::id.eq(id))
                                .filter(services::deleted_at.is_null()),
                        )
                        .set(services::updated_at.eq(updated_at))
                        .execute(transaction)?;
                        if touched == 0 {
                            return Ok(0);
                        }

                        diesel::insert_into(service_tools::table)
                            .values(&NewServiceToolsRow {
                                service_id: id,
                                tools: payload.clone(),
                                created_at: updated_at,
                                updated_at,
                            })
                            .on_conflict(service_tools::service_id)
                            .do_update()
                            .set((
                                service_tools::tools.eq(&payload),
                                service_tools::updated_at.eq(updated_at),
                            ))
                            .execute(transaction)?;
                        Ok(touched)
                    })
                    .map_err(ServiceCatalogueError::persistence)
            })
            .await?;

        if updated_count == 0 {
            return Err(ServiceCatalogueError::NotFound(service_id));
        }
        Ok(())
    }

    async fn find_active_by_name(
        &self,
        name: &ServiceName,
    ) -> ServiceCatalogueResult<Option<ServiceRecord>> {
        let service_name = name.as_str().to_owned();
        self.run_blocking(move |connection| {
            let row = services::table
                .filter(services::name.eq(&service_name))
                .filter(services::deleted_at.is_null())
                .select(ServiceRow::as_select())
                .first::<ServiceRow>(connection)
                .optional()
                .map_err(ServiceCatalogueError::persistence)?;
            row.map(row_to_service).transpose()
        })
        .await
    }

    async fn find_by_id(
        &self,
        service_id: ServiceId,
    ) -> ServiceCatalogueResult<Option<ServiceRecord>> {
        self.run_blocking(move |connection| {
            let row = services::table
                .filter(services::id.eq(service_id.into_inner()))
                .select(ServiceRow::as_select())
                .first::<ServiceRow>(connection)
                .optional()
                .map_err(ServiceCatalogueError::persistence)?;
            row.map(row_to_service).transpose()
        })
        .await
    }

    async fn find_tools(
        &self,
        service_id: ServiceId,
    ) -> ServiceCatalogueResult<Option<ServiceTools>> {
        self.run_blocking(move |connection| {
            let row = service_tools::table
                .filter(service_tools::service_id.eq(service_id.into_inner()))
                .select(ServiceToolsRow::as_select())
                .first::<ServiceToolsRow>(connection)
                .optional()
                .map_err(ServiceCatalogueError::persistence)?;
            row.map(|tools_row| {
                Ok(ServiceTools::from_persisted(
                    ServiceId::from_uuid(tools_row.service_id),
                    decode_tools(tools_row.tools)?,
                    tools_row.deleted_at,
                ))
            })
            .transpose()
        })
        .await
    }

    async fn soft_delete(
        &self,
        service_id: ServiceId,
        deleted_at: DateTime<Utc>,
    ) -> ServiceCatalogueResult<()> {
        let id = service_id.into_inner();

        let deleted_count = self
            .run_blocking(move |connection| {
                connection
                    .transaction::<_, DieselError, _>(|transaction| {
                        let marked = diesel::update(
                            services::table
                                .filter(services::id.eq(id))
                                .filter(services::deleted_at.is_null()),
                        )
                        .set(services::deleted_at.eq(Some(deleted_at)))
                        .execute(transaction)?;
                        if marked == 0 {
                            return Ok(0);
                        }

                        diesel::update(
                            service_tools::table.filter(service_tools::service_id.eq(id)),
                        )
                        .set(service_tools::deleted_at.eq(Some(deleted_at)))
                        .execute(transaction)?;
                        Ok(marked)
                    })
                    .map_err(ServiceCatalogueError::persistence)
            })
            .await?;

        if deleted_count == 0 {
            return Err(ServiceCatalogueError::NotFound(service_id));
        }
        Ok(())
    }

    async fn list_active(&self) -> ServiceCatalogueResult<Vec<CatalogueEntry>> {
        self.run_blocking(move |connection| {
            let rows = services::table
                .left_join(service_tools::table)
                .filter(services::deleted_at.is_null())
                .order(services::position.asc())
                .select((ServiceRow::as_select(), service_tools::tools.nullable()))
                .load::<(ServiceRow, Option<Value>)>(connection)
                .map_err(ServiceCatalogueError::persistence)?;

            rows.into_iter()
                .map(|(service_row, tools)| {
                    Ok(CatalogueEntry {
                        service: row_to_service(service_row)?,
                        tools: tools.map(decode_tools).transpose()?.unwrap_or_default(),
                    })
                })
                .collect()
        })
        .await
    }
}

fn row_to_service(row: ServiceRow) -> ServiceCatalogueResult<ServiceRecord> {
    let ServiceRow {
        id,
        name,
        url,
        created_at,
        updated_at,
        deleted_at,
    } = row;

    let data = PersistedServiceData {
        id: ServiceId::from_uuid(id),
        name: ServiceName::new(name).map_err(ServiceCatalogueError::invalid_persisted_data)?,
        url: ServiceUrl::new(url).map_err(ServiceCatalogueError::invalid_persisted_data)?,
        created_at,
        updated_at,
        deleted_at,
    };

    Ok(ServiceRecord::from_persisted(data))
}

fn decode_tools(payload: Value) -> ServiceCatalogueResult<Vec<ToolDescriptor>> {
    serde_json::from_value(payload).map_err(ServiceCatalogueError::invalid_persisted_data)
}

fn violates(info: &dyn diesel::result::DatabaseErrorInformation, index: &str) -> bool {
    info.constraint_name().is_some_and(|name| name == index)
}
