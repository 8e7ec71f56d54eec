// MoodLog - platform/mod.rs
//
// Platform layer: config files and directories, and the concrete HTTP
// clients for the hosted record store and auth service.
// Dependencies: core (traits and models), util.
// Must NOT depend on: app, ui.

pub mod auth;
pub mod config;
pub mod rest;
