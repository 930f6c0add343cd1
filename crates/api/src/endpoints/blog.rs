//! Blog listing, post detail and comment mutations.

use axum::{
    Form, Router,
    extract::{Path, Query, State, rejection::FormRejection},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use codestar_common::AppResult;
use codestar_core::{CommentInput, CommentOutcome, FormErrors, PageRequest};
use codestar_db::entities::{post, user};
use serde::Deserialize;

use crate::{extractors::MaybeAuthUser, messages::Flash, middleware::AppState};

/// Query parameters for the listing.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// A 1-based page number or `last`; absent means the first page.
    pub page: Option<String>,
}

async fn post_list(
    State(state): State<AppState>,
    MaybeAuthUser(user): MaybeAuthUser,
    flash: Flash,
    Query(query): Query<ListQuery>,
) -> AppResult<Response> {
    let request = PageRequest::parse(query.page.as_deref())?;
    let listing = state.blog_service.list(request).await?;

    let (jar, messages) = flash.consume();
    let mut context = state.renderer.context(user.as_ref(), &messages);
    context.insert("posts", &listing.posts);
    context.insert("page", &listing.page);

    let html = state.renderer.render("blog/index.html", &context)?;
    Ok((jar, html).into_response())
}

async fn post_detail(
    State(state): State<AppState>,
    MaybeAuthUser(user): MaybeAuthUser,
    flash: Flash,
    Path(slug): Path<String>,
) -> AppResult<Response> {
    let post = state.blog_service.get_published(&slug).await?;
    render_detail(&state, user.as_ref(), flash, post, &FormErrors::default()).await
}

async fn create_comment(
    State(state): State<AppState>,
    MaybeAuthUser(user): MaybeAuthUser,
    mut flash: Flash,
    Path(slug): Path<String>,
    form: Result<Form<CommentInput>, FormRejection>,
) -> AppResult<Response> {
    let post = state.blog_service.get_published(&slug).await?;
    let input = comment_input(form);

    let mut errors = FormErrors::default();
    match state
        .comment_service
        .create(user.as_ref(), &post, &input)
        .await?
    {
        CommentOutcome::Applied(_) => flash.success("Comment submitted and awaiting approval"),
        CommentOutcome::Forbidden(_) => flash.error("You must be logged in to leave a comment."),
        CommentOutcome::Invalid(invalid) => errors = invalid,
    }

    render_detail(&state, user.as_ref(), flash, post, &errors).await
}

async fn edit_comment(
    State(state): State<AppState>,
    MaybeAuthUser(user): MaybeAuthUser,
    mut flash: Flash,
    Path((slug, comment_id)): Path<(String, String)>,
    form: Result<Form<CommentInput>, FormRejection>,
) -> AppResult<Response> {
    let post = state.blog_service.get_published(&slug).await?;
    let comment = state.comment_service.find_on_post(&post, &comment_id).await?;
    let input = comment_input(form);

    // Invalid input and a foreign comment share one message
    let outcome = state
        .comment_service
        .edit(user.as_ref(), comment, &input)
        .await?;
    if outcome.is_applied() {
        flash.success("Comment Updated!");
    } else {
        flash.error("Error updating comment!");
    }

    Ok(flash.redirect(&detail_url(&post)))
}

async fn delete_comment(
    State(state): State<AppState>,
    MaybeAuthUser(user): MaybeAuthUser,
    mut flash: Flash,
    Path((slug, comment_id)): Path<(String, String)>,
) -> AppResult<Response> {
    let post = state.blog_service.get_published(&slug).await?;
    let comment = state.comment_service.find_on_post(&post, &comment_id).await?;

    match state.comment_service.delete(user.as_ref(), &comment).await? {
        CommentOutcome::Applied(()) => flash.success("Comment deleted!"),
        _ => flash.error("You can only delete your own comments!"),
    }

    Ok(flash.redirect(&detail_url(&post)))
}

/// An unreadable body is treated as an empty comment, which never validates.
fn comment_input(form: Result<Form<CommentInput>, FormRejection>) -> CommentInput {
    match form {
        Ok(Form(input)) => input,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "Unreadable comment form");
            CommentInput::default()
        }
    }
}

async fn render_detail(
    state: &AppState,
    user: Option<&user::Model>,
    flash: Flash,
    post: post::Model,
    errors: &FormErrors,
) -> AppResult<Response> {
    let detail = state.blog_service.detail(post).await?;

    let (jar, messages) = flash.consume();
    let mut context = state.renderer.context(user, &messages);
    context.insert("post", &detail);
    // The comment form is always rendered empty
    context.insert("form", &CommentInput::default());
    context.insert("errors", errors);

    let html = state.renderer.render("blog/post_detail.html", &context)?;
    Ok((jar, html).into_response())
}

fn detail_url(post: &post::Model) -> String {
    format!("/blog/{}/", post.slug)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/blog/", get(post_list))
        .route("/blog/{slug}/", get(post_detail).post(create_comment))
        .route("/blog/{slug}/edit_comment/{comment_id}/", post(edit_comment))
        .route(
            "/blog/{slug}/delete_comment/{comment_id}/",
            post(delete_comment),
        )
}
