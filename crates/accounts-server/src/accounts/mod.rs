//! `/api/accounts` endpoints.

pub mod handlers;
pub mod payload;

use axum::{
    Router,
    routing::{MethodRouter, get, post},
};

use crate::server::AppState;

fn detail() -> MethodRouter<AppState> {
    get(handlers::retrieve)
        .put(handlers::update)
        .patch(handlers::update)
        .delete(handlers::destroy)
        .options(handlers::detail_options)
}

fn collection(handler: MethodRouter<AppState>) -> MethodRouter<AppState> {
    handler.options(handlers::collection_options)
}

/// Account routes, each served with and without the trailing slash.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/accounts/", collection(post(handlers::register)))
        .route("/api/accounts", collection(post(handlers::register)))
        .route("/api/accounts/login/", collection(post(handlers::login)))
        .route("/api/accounts/login", collection(post(handlers::login)))
        .route("/api/accounts/{id}/", detail())
        .route("/api/accounts/{id}", detail())
}
