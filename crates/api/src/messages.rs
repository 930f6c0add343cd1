//! One-shot flash messages.
//!
//! Messages queued while handling a request are either shown on the page that
//! request renders or, when it redirects, carried to the next page in a
//! cookie. Showing a message consumes it.

use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use serde::{Deserialize, Serialize};

use crate::middleware::AppState;

/// Cookie carrying messages across a redirect.
pub const MESSAGES_COOKIE: &str = "codestar_messages";

/// Browsers reject cookies much larger than this.
const MAX_COOKIE_SIZE: usize = 4096;

/// Message severity, also used as the CSS class suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Success,
    Error,
    Info,
}

/// A user-visible message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub level: Level,
    pub text: String,
}

/// Flash messages for the current request.
///
/// Extracting this reads whatever the previous response left in the cookie.
#[derive(Debug)]
pub struct Flash {
    jar: CookieJar,
    incoming: bool,
    messages: Vec<Message>,
    secure: bool,
}

impl Flash {
    fn from_jar(jar: CookieJar, secure: bool) -> Self {
        let stored = jar.get(MESSAGES_COOKIE).map(|c| decode(c.value()));
        let incoming = stored.is_some();

        Self {
            jar,
            incoming,
            messages: stored.unwrap_or_default(),
            secure,
        }
    }

    /// Queue a message.
    pub fn push(&mut self, level: Level, text: impl Into<String>) {
        self.messages.push(Message {
            level,
            text: text.into(),
        });
    }

    /// Queue a success message.
    pub fn success(&mut self, text: impl Into<String>) {
        self.push(Level::Success, text);
    }

    /// Queue an error message.
    pub fn error(&mut self, text: impl Into<String>) {
        self.push(Level::Error, text);
    }

    /// Queue an informational message.
    pub fn info(&mut self, text: impl Into<String>) {
        self.push(Level::Info, text);
    }

    /// Change other cookies on the response this flash ends up in.
    #[must_use]
    pub fn with_jar(mut self, f: impl FnOnce(CookieJar) -> CookieJar) -> Self {
        self.jar = f(self.jar);
        self
    }

    /// Take every pending message for display on the page being rendered.
    ///
    /// The returned jar clears the messages cookie if one arrived.
    #[must_use]
    pub fn consume(self) -> (CookieJar, Vec<Message>) {
        let jar = if self.incoming {
            self.jar.remove(Cookie::build((MESSAGES_COOKIE, "")).path("/"))
        } else {
            self.jar
        };
        (jar, self.messages)
    }

    /// Redirect with `303 See Other`, keeping pending messages for the next
    /// page.
    #[must_use]
    pub fn redirect(self, to: &str) -> Response {
        let secure = self.secure;
        let (jar, mut messages) = self.consume();

        if messages.is_empty() {
            return (jar, Redirect::to(to)).into_response();
        }

        // Oldest messages are dropped first when the cookie would be too big
        let mut value = encode(&messages);
        while value.len() > MAX_COOKIE_SIZE && !messages.is_empty() {
            messages.remove(0);
            value = encode(&messages);
        }

        let cookie = Cookie::build((MESSAGES_COOKIE, value))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(secure);

        (jar.add(cookie), Redirect::to(to)).into_response()
    }
}

impl FromRequestParts<AppState> for Flash {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        Ok(Self::from_jar(jar, state.cookies.secure))
    }
}

fn encode(messages: &[Message]) -> String {
    URL_SAFE_NO_PAD.encode(serde_json::to_vec(messages).unwrap_or_default())
}

fn decode(value: &str) -> Vec<Message> {
    let decoded = URL_SAFE_NO_PAD
        .decode(value)
        .ok()
        .and_then(|bytes| serde_json::from_slice(&bytes).ok());

    decoded.unwrap_or_else(|| {
        tracing::debug!("Discarding unreadable messages cookie");
        Vec::new()
    })
}
