//! Step definitions for service catalogue behaviour tests.

pub mod given;
pub mod then;
pub mod when;
pub mod world;
