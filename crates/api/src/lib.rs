//! HTTP layer for codestar.
//!
//! Server-rendered pages for the about page, the blog and accounts:
//!
//! - **Endpoints**: form-driven handlers returning HTML or `303` redirects
//! - **Extractors**: the caller's identity, resolved by [`middleware::auth_middleware`]
//! - **Middleware**: cross-site POSTs are refused by [`middleware::origin_check_middleware`]
//! - **Messages**: one-shot flash messages carried in a cookie
//! - **Render**: tera templates compiled into the binary

pub mod endpoints;
pub mod extractors;
pub mod messages;
pub mod middleware;
pub mod render;

use axum::{Router, middleware::from_fn_with_state};

pub use endpoints::router;
pub use middleware::AppState;

/// Build the site with the origin check and session resolution applied to
/// every route.
pub fn app(state: AppState) -> Router {
    router()
        .layer(from_fn_with_state(state.clone(), middleware::auth_middleware))
        .layer(from_fn_with_state(
            state.clone(),
            middleware::origin_check_middleware,
        ))
        .with_state(state)
}
