//! Unit tests for schema translation and argument validation.
