//! Integration tests for the collector
//!
//! These tests use wiremock to stand in for the listing endpoint and the
//! company detail pages.

mod scrape_tests;
