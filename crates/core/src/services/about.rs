//! About page and collaboration requests.

use codestar_common::{AppResult, IdGenerator};
use codestar_db::entities::{about, collaborate_request};
use codestar_db::repositories::{AboutRepository, CollaborateRequestRepository};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::forms::{FormErrors, REQUIRED, Submission, not_blank};

/// A collaboration request as submitted from the about page.
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
pub struct CollaborateInput {
    #[serde(default)]
    #[validate(
        custom(function = "not_blank"),
        length(max = 200, message = "Ensure this value has at most 200 characters.")
    )]
    pub name: String,

    #[serde(default)]
    #[validate(
        custom(function = "not_blank"),
        email(message = "Enter a valid email address."),
        length(max = 254, message = "Ensure this value has at most 254 characters.")
    )]
    pub email: String,

    #[serde(default)]
    #[validate(custom(function = "not_blank"))]
    pub message: String,
}

/// Service for the about page.
#[derive(Clone)]
pub struct AboutService {
    about_repo: AboutRepository,
    request_repo: CollaborateRequestRepository,
    id_gen: IdGenerator,
}

impl AboutService {
    /// Create a new about service.
    #[must_use]
    pub const fn new(
        about_repo: AboutRepository,
        request_repo: CollaborateRequestRepository,
    ) -> Self {
        Self {
            about_repo,
            request_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// The about entry to show: the most recently updated one.
    pub async fn current(&self) -> AppResult<Option<about::Model>> {
        self.about_repo.find_latest().await
    }

    /// Validate and store a collaboration request.
    ///
    /// Stored requests start unread. Invalid input writes nothing.
    pub async fn submit_collaboration(
        &self,
        input: &CollaborateInput,
    ) -> AppResult<Submission<collaborate_request::Model>> {
        // An empty field reports "required" only, not also "invalid email"
        if let Err(mut errors) = FormErrors::check(input) {
            if not_blank(&input.email).is_err() {
                errors.replace("email", REQUIRED);
            }
            return Ok(Submission::Rejected(errors));
        }

        let model = collaborate_request::ActiveModel {
            id: Set(self.id_gen.generate()),
            name: Set(input.name.trim().to_string()),
            email: Set(input.email.trim().to_string()),
            message: Set(input.message.clone()),
            read: Set(false),
            created_at: Set(chrono::Utc::now().into()),
        };

        let request = self.request_repo.create(model).await?;
        tracing::info!(request_id = %request.id, "Collaboration request stored");

        Ok(Submission::Accepted(request))
    }
}
