//! When steps for service catalogue BDD scenarios.

use super::world::{CatalogueWorld, request, run_async};
use rstest_bdd_macros::when;

#[when(r#"service "{name}" is registered at "{url}""#)]
fn register_service(world: &mut CatalogueWorld, name: String, url: String) {
    world.last_register_result = Some(run_async(world.service.register(request(&name, &url))));
}

#[when(r#"service "{name}" is updated"#)]
fn update_service(world: &mut CatalogueWorld, name: String) {
    world.last_update_result = Some(run_async(world.service.update(&name)));
}

#[when(r#"service "{name}" is deleted"#)]
fn delete_service(world: &mut CatalogueWorld, name: String) -> Result<(), eyre::Report> {
    run_async(world.service.delete(&name))
        .map_err(|err| eyre::eyre!("deletion failed: {err}"))?;
    Ok(())
}
