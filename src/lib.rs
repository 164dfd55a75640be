pub mod client;
pub mod config;
pub mod db;
pub mod document;
pub mod dto;
pub mod errors;
pub mod format;
#[cfg(feature = "openapi")]
pub mod openapi;
pub mod routes;
pub mod services;
pub mod state;
