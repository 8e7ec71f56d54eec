// MoodLog - core/mod.rs
//
// Core business logic layer: data model, form validation, store and
// session abstractions, statistics.
// Must NOT depend on: ui, platform, app.

pub mod form;
#[cfg(any(test, feature = "test-support"))]
pub mod memory;
pub mod model;
pub mod session;
pub mod stats;
pub mod store;
