//! Integration tests for the item operation executor.

pub mod concurrent_replace;
pub mod property_tests;
