//! HTTP server for the accounts service.
//!
//! Registration, login, and per-account retrieve/update/delete under
//! `/api/accounts`, backed by `accounts-auth` for tokens and ownership checks.

pub mod accounts;
pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod observability;
pub mod server;

pub use config::AppConfig;
pub use error::{ApiError, ApiResult, FieldErrors};
pub use server::{AccountsServer, AppState, ServerBuilder, build_app, router};
