//! Site endpoints.

mod about;
mod accounts;
mod blog;

use axum::{Router, response::Redirect, routing::get};

use crate::middleware::AppState;

/// Create the site router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(|| async { Redirect::to("/blog/") }))
        .merge(about::router())
        .merge(blog::router())
        .merge(accounts::router())
}
