//! Shared test utilities for checkconf integration tests.
//!
//! This module provides:
//! - `TestHarness` for isolated reconciliation passes in temp directories
//! - Builders for writing manifest resources programmatically

pub mod builders;
pub mod harness;

pub use builders::*;
pub use harness::TestHarness;
