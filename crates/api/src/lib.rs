//! HTTP transport for the credential service.

pub mod app;
pub mod config;
pub mod context;
pub mod middleware;
