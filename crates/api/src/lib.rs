//! HTTP API: server, routing, and request/response mapping.

pub mod app;
pub mod config;
pub mod context;
pub mod error;
pub mod middleware;
pub mod routes;

pub use app::{build_app, build_state, router, AppState, Stores};
pub use config::{AppConfig, Posture};
