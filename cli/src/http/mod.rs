//! HTTP server exposing the trigger and health endpoints.

pub mod middleware;
pub mod models;
pub mod rate_limit;
pub mod routes;
pub mod server;
pub mod state;

pub use models::*;
pub use server::*;
pub use state::*;
