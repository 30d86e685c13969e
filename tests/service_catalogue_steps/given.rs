//! Given steps for service catalogue BDD scenarios.

use super::world::{CatalogueWorld, descriptors, request, run_async, service_url};
use eyre::WrapErr;
use rstest_bdd_macros::given;

#[given(r#"a downstream at "{url}" offering tools "{tools}""#)]
fn downstream_offering(
    world: &mut CatalogueWorld,
    url: String,
    tools: String,
) -> Result<(), eyre::Report> {
    world
        .fetcher
        .set_tools(&service_url(&url)?, descriptors(&tools)?)
        .wrap_err("script downstream tools")
}

#[given(r#"an unreachable downstream at "{url}""#)]
fn unreachable_downstream(world: &mut CatalogueWorld, url: String) -> Result<(), eyre::Report> {
    world
        .fetcher
        .set_unreachable(&service_url(&url)?)
        .wrap_err("script unreachable downstream")
}

#[given(r#"service "{name}" has been registered at "{url}""#)]
fn service_registered(
    world: &mut CatalogueWorld,
    name: String,
    url: String,
) -> Result<(), eyre::Report> {
    run_async(world.service.register(request(&name, &url)))
        .wrap_err("register service for scenario")?;
    world.initial_version = run_async(world.cache.get_all_tools())
        .wrap_err("load catalogue after registration")?
        .version();
    Ok(())
}

#[given(r#"the downstream at "{url}" becomes unreachable"#)]
fn downstream_becomes_unreachable(
    world: &mut CatalogueWorld,
    url: String,
) -> Result<(), eyre::Report> {
    world
        .fetcher
        .set_unreachable(&service_url(&url)?)
        .wrap_err("script downstream outage")
}
