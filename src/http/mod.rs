//! HTTP control surface
//!
//! This module handles HTTP request routing and handling:
//! - Axum router with the titling endpoints
//! - Request handlers for load and stop
//! - Health and version endpoints

pub mod handlers;
pub mod routes;

pub use routes::create_router;
