pub mod api;
pub mod app;
pub mod config;
pub mod eoq;
pub mod export;
pub mod importers;
pub mod normalizer;
pub mod schema;
pub mod services;
pub mod table;
