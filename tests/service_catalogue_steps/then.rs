//! Then steps for service catalogue BDD scenarios.

use super::world::{CatalogueWorld, run_async, split_names};
use concourse::catalogue::{ports::ToolFetchError, services::CatalogueServiceError};
use rstest_bdd_macros::then;

fn federated_names(world: &CatalogueWorld) -> Result<Vec<String>, eyre::Report> {
    let snapshot = run_async(world.cache.get_all_tools())
        .map_err(|err| eyre::eyre!("catalogue read failed: {err}"))?;
    Ok(snapshot
        .tools()
        .iter()
        .map(|tool| tool.name().to_owned())
        .collect())
}

#[then(r#"the catalogue lists tools "{tools}""#)]
fn catalogue_lists(world: &mut CatalogueWorld, tools: String) -> Result<(), eyre::Report> {
    let listed = federated_names(world)?;
    let expected = split_names(&tools);
    if listed != expected {
        return Err(eyre::eyre!("expected tools {expected:?}, found {listed:?}"));
    }
    Ok(())
}

#[then("the catalogue lists no tools")]
fn catalogue_is_empty(world: &mut CatalogueWorld) -> Result<(), eyre::Report> {
    let listed = federated_names(world)?;
    if !listed.is_empty() {
        return Err(eyre::eyre!("expected no tools, found {listed:?}"));
    }
    Ok(())
}

#[then("the catalogue version has advanced")]
fn version_advanced(world: &mut CatalogueWorld) -> Result<(), eyre::Report> {
    let snapshot = run_async(world.cache.get_all_tools())
        .map_err(|err| eyre::eyre!("catalogue read failed: {err}"))?;
    if snapshot.version() <= world.initial_version {
        return Err(eyre::eyre!(
            "expected version after {}, found {}",
            world.initial_version,
            snapshot.version()
        ));
    }
    Ok(())
}

#[then(r#"service "{name}" is listed with {count:usize} tools"#)]
fn service_listed_with(
    world: &mut CatalogueWorld,
    name: String,
    count: usize,
) -> Result<(), eyre::Report> {
    let entries =
        run_async(world.service.list()).map_err(|err| eyre::eyre!("list failed: {err}"))?;
    let entry = entries
        .iter()
        .find(|entry| entry.service.name().as_str() == name)
        .ok_or_else(|| eyre::eyre!("expected service '{name}' to be listed"))?;
    if entry.tools.len() != count {
        return Err(eyre::eyre!(
            "expected {count} tools for '{name}', found {}",
            entry.tools.len()
        ));
    }
    Ok(())
}

#[then("registration fails with a conflict")]
fn registration_conflicts(world: &CatalogueWorld) -> Result<(), eyre::Report> {
    let result = world
        .last_register_result
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing registration result in scenario world"))?;
    match result {
        Err(err) if err.is_conflict() => Ok(()),
        other => Err(eyre::eyre!("expected a conflict, got {other:?}")),
    }
}

#[then(r#"updating service "{name}" fails as not found"#)]
fn update_not_found(world: &mut CatalogueWorld, name: String) -> Result<(), eyre::Report> {
    let result = run_async(world.service.update(&name));
    if !matches!(result, Err(CatalogueServiceError::NotFound(_))) {
        return Err(eyre::eyre!("expected not found, got {result:?}"));
    }
    Ok(())
}

#[then("the update fails with a fetch error")]
fn update_fetch_failed(world: &CatalogueWorld) -> Result<(), eyre::Report> {
    let result = world
        .last_update_result
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing update result in scenario world"))?;
    if !matches!(
        result,
        Err(CatalogueServiceError::Fetch {
            source: ToolFetchError::Unreachable { .. },
            ..
        })
    ) {
        return Err(eyre::eyre!("expected a fetch failure, got {result:?}"));
    }
    Ok(())
}
