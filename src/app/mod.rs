// MoodLog - app/mod.rs
//
// Application layer: view orchestration, request lifecycle, state.
// Dependencies: core layer.
// Must NOT depend on: ui, platform specifics.

pub mod requests;
pub mod state;
pub mod view;
