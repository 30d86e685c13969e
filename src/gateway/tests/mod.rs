//! Unit tests for the federation gateway.

mod api_error_tests;
