//! Application state and request middleware.

#![allow(missing_docs)]

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request, header},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use codestar_common::{AppError, AppResult, Config};
use codestar_core::{AboutService, BlogService, CommentService, UserService};
use codestar_db::repositories::{
    AboutRepository, CollaborateRequestRepository, CommentRepository, PostRepository,
    UserRepository,
};
use sea_orm::DatabaseConnection;

use crate::render::Renderer;

/// Cookie holding the session token.
pub const TOKEN_COOKIE: &str = "codestar_token";

const REASON_BAD_ORIGIN: &str = "Origin checking failed - does not match any trusted origins.";
const REASON_BAD_REFERER: &str = "Referer checking failed - does not match any trusted origins.";

/// Attributes shared by every cookie the site sets.
#[derive(Debug, Clone, Copy, Default)]
pub struct CookieSettings {
    pub secure: bool,
}

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub user_service: UserService,
    pub about_service: AboutService,
    pub blog_service: BlogService,
    pub comment_service: CommentService,
    pub renderer: Renderer,
    pub cookies: CookieSettings,
    /// `scheme://host[:port]` of the public site URL.
    pub trusted_origin: String,
}

impl AppState {
    /// Wire repositories and services over one connection pool.
    pub fn new(db: Arc<DatabaseConnection>, config: &Config) -> AppResult<Self> {
        let user_repo = UserRepository::new(Arc::clone(&db));
        let comment_repo = CommentRepository::new(Arc::clone(&db));

        Ok(Self {
            user_service: UserService::new(user_repo.clone()),
            about_service: AboutService::new(
                AboutRepository::new(Arc::clone(&db)),
                CollaborateRequestRepository::new(Arc::clone(&db)),
            ),
            blog_service: BlogService::new(
                PostRepository::new(Arc::clone(&db)),
                comment_repo.clone(),
                user_repo,
            ),
            comment_service: CommentService::new(comment_repo),
            renderer: Renderer::new(config.site.name.clone())?,
            cookies: CookieSettings {
                secure: config.site.secure_cookies,
            },
            trusted_origin: origin_of(&config.server.url),
        })
    }
}

/// Authentication middleware.
///
/// Resolves the session cookie, or a bearer token, to a user stored in the
/// request extensions. Unknown tokens leave the request anonymous.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(token) = request_token(&req) {
        match state.user_service.authenticate_by_token(&token).await {
            Ok(user) => {
                req.extensions_mut().insert(user);
            }
            Err(e) if e.is_server_error() => {
                tracing::error!(error = %e, "Session lookup failed");
            }
            Err(_) => tracing::debug!("Ignoring unknown session token"),
        }
    }

    next.run(req).await
}

fn request_token(req: &Request<Body>) -> Option<String> {
    let bearer = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_string);

    bearer.or_else(|| {
        CookieJar::from_headers(req.headers())
            .get(TOKEN_COOKIE)
            .map(|cookie| cookie.value().to_string())
    })
}

/// Cross-site request forgery guard.
///
/// Unsafe requests are refused with `403` when their `Origin`, or failing
/// that their `Referer`, names a site other than the configured one.
/// Requests carrying neither header pass; the session cookie is
/// `SameSite=Lax` for those.
pub async fn origin_check_middleware(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> AppResult<Response> {
    if !req.method().is_safe() {
        check_origin(req.headers(), &state.trusted_origin)?;
    }

    Ok(next.run(req).await)
}

fn check_origin(headers: &HeaderMap, trusted: &str) -> AppResult<()> {
    let header_value = |name: header::HeaderName| headers.get(name).and_then(|v| v.to_str().ok());

    if let Some(origin) = header_value(header::ORIGIN) {
        if !origin.eq_ignore_ascii_case(trusted) {
            tracing::warn!(origin, "Rejected cross-origin request");
            return Err(AppError::Forbidden(REASON_BAD_ORIGIN.to_string()));
        }
        return Ok(());
    }

    if let Some(referer) = header_value(header::REFERER) {
        let same_site = referer
            .get(..trusted.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(trusted))
            && matches!(referer.as_bytes().get(trusted.len()), None | Some(b'/' | b'?'));
        if !same_site {
            tracing::warn!(referer, "Rejected cross-site request");
            return Err(AppError::Forbidden(REASON_BAD_REFERER.to_string()));
        }
    }

    Ok(())
}

/// The `scheme://host[:port]` prefix of a URL, lowercased.
fn origin_of(url: &str) -> String {
    let url = url.trim_end_matches('/');
    let end = url
        .find("://")
        .and_then(|start| url[start + 3..].find('/').map(|path| start + 3 + path))
        .unwrap_or(url.len());
    url[..end].to_ascii_lowercase()
}
