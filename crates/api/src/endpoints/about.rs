//! About page with the collaboration request form.

use axum::{
    Form, Router,
    extract::State,
    response::{IntoResponse, Response},
    routing::get,
};
use codestar_common::AppResult;
use codestar_core::{CollaborateInput, FormErrors, Submission};
use codestar_db::entities::user;

use crate::{extractors::MaybeAuthUser, messages::Flash, middleware::AppState};

const RECEIVED: &str =
    "Collaboration request received! I endeavour to respond within 2 working days.";

async fn about_page(
    State(state): State<AppState>,
    MaybeAuthUser(user): MaybeAuthUser,
    flash: Flash,
) -> AppResult<Response> {
    render(
        &state,
        user.as_ref(),
        flash,
        &CollaborateInput::default(),
        &FormErrors::default(),
    )
    .await
}

async fn submit_collaboration(
    State(state): State<AppState>,
    MaybeAuthUser(user): MaybeAuthUser,
    mut flash: Flash,
    Form(input): Form<CollaborateInput>,
) -> AppResult<Response> {
    match state.about_service.submit_collaboration(&input).await? {
        Submission::Accepted(_) => {
            flash.success(RECEIVED);
            render(
                &state,
                user.as_ref(),
                flash,
                &CollaborateInput::default(),
                &FormErrors::default(),
            )
            .await
        }
        Submission::Rejected(errors) => render(&state, user.as_ref(), flash, &input, &errors).await,
    }
}

async fn render(
    state: &AppState,
    user: Option<&user::Model>,
    flash: Flash,
    form: &CollaborateInput,
    errors: &FormErrors,
) -> AppResult<Response> {
    let about = state.about_service.current().await?;

    let (jar, messages) = flash.consume();
    let mut context = state.renderer.context(user, &messages);
    if let Some(about) = &about {
        context.insert(
            "about_updated_on",
            &about.updated_on.format("%B %-d, %Y").to_string(),
        );
    }
    context.insert("about", &about);
    context.insert("form", form);
    context.insert("errors", errors);

    let html = state.renderer.render("about/about.html", &context)?;
    Ok((jar, html).into_response())
}

pub fn router() -> Router<AppState> {
    Router::new().route("/about/", get(about_page).post(submit_collaboration))
}
