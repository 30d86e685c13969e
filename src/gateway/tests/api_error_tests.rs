//! Status mapping of registry failures.

use crate::catalogue::{
    domain::{CatalogueDomainError, ServiceId, ServiceName, ServiceUrl},
    ports::{CatalogueVersionError, ServiceCatalogueError, ToolFetchError},
    services::CatalogueServiceError,
};
use crate::gateway::http::ApiError;
use axum::http::StatusCode;
use rstest::rstest;

fn name() -> ServiceName {
    ServiceName::new("shopping").expect("valid name")
}

#[rstest]
#[case(ApiError::BadRequest(String::from("missing field `url`")), StatusCode::BAD_REQUEST)]
#[case(
    ApiError::Catalogue(CatalogueServiceError::Domain(CatalogueDomainError::EmptyServiceName)),
    StatusCode::BAD_REQUEST
)]
#[case(
    ApiError::Catalogue(CatalogueServiceError::Repository(
        ServiceCatalogueError::DuplicateServiceName(name())
    )),
    StatusCode::CONFLICT
)]
#[case(
    ApiError::Catalogue(CatalogueServiceError::Repository(
        ServiceCatalogueError::DuplicateServiceUrl(
            ServiceUrl::new("http://localhost:3001").expect("valid url")
        )
    )),
    StatusCode::CONFLICT
)]
#[case(
    ApiError::Catalogue(CatalogueServiceError::NotFound(String::from("ghost"))),
    StatusCode::NOT_FOUND
)]
#[case(
    ApiError::Catalogue(CatalogueServiceError::Repository(ServiceCatalogueError::NotFound(
        ServiceId::new()
    ))),
    StatusCode::NOT_FOUND
)]
#[case(
    ApiError::Catalogue(CatalogueServiceError::Fetch {
        name: name(),
        source: ToolFetchError::Unreachable {
            url: String::from("http://localhost:3001"),
            reason: String::from("connection refused"),
        },
    }),
    StatusCode::BAD_GATEWAY
)]
#[case(
    ApiError::Catalogue(CatalogueServiceError::Version(CatalogueVersionError::InvalidValue(
        String::from("abc")
    ))),
    StatusCode::INTERNAL_SERVER_ERROR
)]
fn registry_failures_map_to_http_statuses(#[case] error: ApiError, #[case] expected: StatusCode) {
    assert_eq!(error.status(), expected);
}
