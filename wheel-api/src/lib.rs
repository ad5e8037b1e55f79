//! HTTP JSON API for the prize wheel.
//!
//! Routes:
//! - `GET /api/saldo`, `GET /api/items`
//! - `POST /api/spin`, `POST /api/redeem`, `POST /api/admin/add-code`
//! - `GET /healthz`, `GET /metrics`

pub mod error;
pub mod response;
pub mod routes;
pub mod server;

pub use error::ApiError;
pub use routes::{ApiState, MAX_BODY_BYTES, handle};
pub use server::serve;
