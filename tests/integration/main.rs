//! Integration tests for Trust-Lens
//!
//! These tests use wiremock to serve small sites and run whole scans
//! against them end-to-end.

mod crawl_tests;
mod scan_tests;
mod server_tests;
mod support;
