//! Testing utilities for CMS fixture steps.
//!
//! Provides a standard in-memory content model, a failure-injecting storage
//! wrapper, tracing setup for tests and small data-table helpers.

pub mod content_model;
pub mod failable;
pub mod logging;
pub mod tables;

pub use content_model::ContentModel;
pub use failable::FailableEntityStorage;
pub use logging::init_test_tracing;
pub use tables::{fixture_rows, table};
