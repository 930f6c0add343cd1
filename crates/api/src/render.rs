//! Server-side page rendering.

use std::sync::Arc;

use axum::response::Html;
use codestar_common::AppResult;
use codestar_db::entities::user;
use serde::Serialize;
use tera::{Context, Tera};

use crate::messages::Message;

/// Templates compiled into the binary, as `(name, source)`.
const TEMPLATES: &[(&str, &str)] = &[
    ("base.html", include_str!("../templates/base.html")),
    ("about/about.html", include_str!("../templates/about/about.html")),
    ("blog/index.html", include_str!("../templates/blog/index.html")),
    (
        "blog/post_detail.html",
        include_str!("../templates/blog/post_detail.html"),
    ),
    (
        "accounts/login.html",
        include_str!("../templates/accounts/login.html"),
    ),
    (
        "accounts/signup.html",
        include_str!("../templates/accounts/signup.html"),
    ),
];

/// The signed-in user as templates see it.
#[derive(Debug, Serialize)]
struct Viewer<'a> {
    id: &'a str,
    username: &'a str,
    display_name: &'a str,
}

/// Renders named templates with the site-wide context.
#[derive(Clone)]
pub struct Renderer {
    tera: Arc<Tera>,
    site_name: String,
}

impl Renderer {
    /// Parse all templates. Autoescaping is on for every `.html` template.
    pub fn new(site_name: impl Into<String>) -> AppResult<Self> {
        let mut tera = Tera::default();
        tera.add_raw_templates(TEMPLATES.iter().copied())?;

        Ok(Self {
            tera: Arc::new(tera),
            site_name: site_name.into(),
        })
    }

    /// Start a context carrying the viewer and the messages to display.
    #[must_use]
    pub fn context(&self, viewer: Option<&user::Model>, messages: &[Message]) -> Context {
        let mut context = Context::new();
        context.insert("site_name", &self.site_name);
        context.insert("messages", messages);
        if let Some(user) = viewer {
            context.insert(
                "user",
                &Viewer {
                    id: &user.id,
                    username: &user.username,
                    display_name: user.display_name(),
                },
            );
        }
        context
    }

    /// Render a template to an HTML response body.
    pub fn render(&self, template: &str, context: &Context) -> AppResult<Html<String>> {
        let html = self.tera.render(template, context).inspect_err(|e| {
            tracing::error!(template, error = ?e, "Template rendering failed");
        })?;
        Ok(Html(html))
    }
}
