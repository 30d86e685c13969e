//! Unit tests for the service catalogue.

mod support;
