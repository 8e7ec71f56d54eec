// MoodLog - ui/panels/mod.rs

pub mod about;
pub mod feed;
pub mod form;
pub mod login;
pub mod notices;
pub mod summary;
