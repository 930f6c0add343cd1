//! Signup, login and logout.

use axum::{
    Form, Router,
    extract::State,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use axum_extra::extract::cookie::{Cookie, SameSite};
use codestar_common::AppResult;
use codestar_core::{FormErrors, LoginInput, SignupInput, Submission};
use codestar_db::entities::user;
use serde::Serialize;

use crate::{
    extractors::MaybeAuthUser,
    messages::Flash,
    middleware::{AppState, TOKEN_COOKIE},
};

const HOME: &str = "/blog/";

async fn signup_page(
    State(state): State<AppState>,
    MaybeAuthUser(user): MaybeAuthUser,
    flash: Flash,
) -> AppResult<Response> {
    if user.is_some() {
        return Ok(flash.redirect(HOME));
    }
    render(
        &state,
        flash,
        "accounts/signup.html",
        &SignupInput::default(),
        &FormErrors::default(),
    )
}

async fn signup(
    State(state): State<AppState>,
    flash: Flash,
    Form(input): Form<SignupInput>,
) -> AppResult<Response> {
    match state.user_service.signup(&input).await? {
        Submission::Accepted(user) => Ok(sign_in(&state, flash, &user)),
        Submission::Rejected(errors) => {
            render(&state, flash, "accounts/signup.html", &input, &errors)
        }
    }
}

async fn login_page(
    State(state): State<AppState>,
    MaybeAuthUser(user): MaybeAuthUser,
    flash: Flash,
) -> AppResult<Response> {
    if user.is_some() {
        return Ok(flash.redirect(HOME));
    }
    render(
        &state,
        flash,
        "accounts/login.html",
        &LoginInput::default(),
        &FormErrors::default(),
    )
}

async fn login(
    State(state): State<AppState>,
    flash: Flash,
    Form(input): Form<LoginInput>,
) -> AppResult<Response> {
    match state.user_service.login(&input).await? {
        Submission::Accepted(user) => Ok(sign_in(&state, flash, &user)),
        Submission::Rejected(errors) => render(&state, flash, "accounts/login.html", &input, &errors),
    }
}

async fn logout(
    State(state): State<AppState>,
    MaybeAuthUser(user): MaybeAuthUser,
    mut flash: Flash,
) -> AppResult<Response> {
    if let Some(user) = user {
        state.user_service.logout(user).await?;
        flash.info("You have signed out.");
    }

    Ok(flash
        .with_jar(|jar| jar.remove(Cookie::build((TOKEN_COOKIE, "")).path("/")))
        .redirect(HOME))
}

/// Set the session cookie and go home.
fn sign_in(state: &AppState, flash: Flash, user: &user::Model) -> Response {
    let token = user.token.clone().unwrap_or_default();
    let cookie = Cookie::build((TOKEN_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(state.cookies.secure);

    let mut flash = flash.with_jar(|jar| jar.add(cookie));

    tracing::info!(user_id = %user.id, "User signed in");
    flash.success(format!("Successfully signed in as {}.", user.username));
    flash.redirect(HOME)
}

fn render<F: Serialize>(
    state: &AppState,
    flash: Flash,
    template: &str,
    form: &F,
    errors: &FormErrors,
) -> AppResult<Response> {
    let (jar, messages) = flash.consume();
    let mut context = state.renderer.context(None, &messages);
    context.insert("form", form);
    context.insert("errors", errors);

    let html = state.renderer.render(template, &context)?;
    Ok((jar, html).into_response())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/accounts/signup/", get(signup_page).post(signup))
        .route("/accounts/login/", get(login_page).post(login))
        .route("/accounts/logout/", post(logout))
}
