pub mod alerts;
pub mod analytics;
pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod ingest;
pub mod store;
