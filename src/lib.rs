pub mod api;
pub mod config;
pub mod engine;
pub mod format;
pub mod humanize;
pub mod lifecycle;
pub mod observability;
pub mod store;
