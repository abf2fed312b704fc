//! Resizer HTTP service
//!
//! Library half of the `resizer-api` binary, exposed so integration tests can build the router
//! around their own state.

pub mod error;
pub mod handlers;
pub mod services;
pub mod setup;
pub mod state;
pub mod telemetry;

pub use error::{ErrorResponse, HttpResizerError};
pub use state::AppState;
