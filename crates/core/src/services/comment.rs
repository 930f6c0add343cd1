//! Comment creation, editing and deletion.
//!
//! Approval is owned by moderation: new comments are stored unapproved and an
//! edit puts a comment back in the queue. Nothing here ever sets `approved`
//! to true.

use codestar_common::{AppError, AppResult, IdGenerator};
use codestar_db::entities::{comment, post, user};
use codestar_db::repositories::CommentRepository;
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::authorization::{
    Authorization, NOT_SIGNED_IN, can_modify_comment, can_post_comment,
};
use crate::forms::{FormErrors, not_blank};

/// Comment form body.
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
pub struct CommentInput {
    #[serde(default)]
    #[validate(custom(function = "not_blank"))]
    pub body: String,
}

/// A comment about to be inserted.
#[derive(Debug, Clone)]
pub struct NewComment {
    pub post_id: String,
    pub author_id: String,
    pub body: String,
}

impl NewComment {
    /// Build the row to insert. The comment always starts unapproved.
    #[must_use]
    pub fn into_active_model(self, id: String) -> comment::ActiveModel {
        comment::ActiveModel {
            id: Set(id),
            post_id: Set(self.post_id),
            author_id: Set(self.author_id),
            body: Set(self.body),
            approved: Set(false),
            created_on: Set(chrono::Utc::now().into()),
        }
    }
}

/// Result of a comment mutation.
#[derive(Debug)]
pub enum CommentOutcome<T> {
    /// The change was written.
    Applied(T),
    /// The form was invalid; nothing was written.
    Invalid(FormErrors),
    /// The caller may not make this change; nothing was written.
    Forbidden(&'static str),
}

impl<T> CommentOutcome<T> {
    #[must_use]
    pub const fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }
}

/// Service for comment mutations.
#[derive(Clone)]
pub struct CommentService {
    comment_repo: CommentRepository,
    id_gen: IdGenerator,
}

impl CommentService {
    /// Create a new comment service.
    #[must_use]
    pub const fn new(comment_repo: CommentRepository) -> Self {
        Self {
            comment_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Find a comment that belongs to `post`.
    ///
    /// A comment on a different post is reported as not found, so a slug
    /// cannot be paired with another post's comment.
    pub async fn find_on_post(
        &self,
        post: &post::Model,
        comment_id: &str,
    ) -> AppResult<comment::Model> {
        self.comment_repo
            .find_by_id(comment_id)
            .await?
            .filter(|c| c.post_id == post.id)
            .ok_or_else(|| AppError::NotFound(format!("Comment: {comment_id}")))
    }

    /// Leave a new comment on a post.
    pub async fn create(
        &self,
        caller: Option<&user::Model>,
        post: &post::Model,
        input: &CommentInput,
    ) -> AppResult<CommentOutcome<comment::Model>> {
        let (Some(author), Authorization::Authorized) = (caller, can_post_comment(caller)) else {
            tracing::debug!(post_id = %post.id, "Comment from anonymous caller rejected");
            return Ok(CommentOutcome::Forbidden(NOT_SIGNED_IN));
        };

        if let Err(errors) = FormErrors::check(input) {
            return Ok(CommentOutcome::Invalid(errors));
        }

        let new_comment = NewComment {
            post_id: post.id.clone(),
            author_id: author.id.clone(),
            body: input.body.clone(),
        };

        let comment = self
            .comment_repo
            .create(new_comment.into_active_model(self.id_gen.generate()))
            .await?;

        tracing::info!(comment_id = %comment.id, post_id = %post.id, "Comment created");
        Ok(CommentOutcome::Applied(comment))
    }

    /// Replace a comment's body. The edited comment needs approval again.
    pub async fn edit(
        &self,
        caller: Option<&user::Model>,
        comment: comment::Model,
        input: &CommentInput,
    ) -> AppResult<CommentOutcome<comment::Model>> {
        if let Authorization::Forbidden(reason) = can_modify_comment(caller, &comment) {
            tracing::debug!(comment_id = %comment.id, reason, "Comment edit refused");
            return Ok(CommentOutcome::Forbidden(reason));
        }

        if let Err(errors) = FormErrors::check(input) {
            return Ok(CommentOutcome::Invalid(errors));
        }

        let updated = self
            .comment_repo
            .update(comment.edit(input.body.clone()))
            .await?;

        tracing::info!(comment_id = %updated.id, "Comment edited");
        Ok(CommentOutcome::Applied(updated))
    }

    /// Delete a comment.
    pub async fn delete(
        &self,
        caller: Option<&user::Model>,
        comment: &comment::Model,
    ) -> AppResult<CommentOutcome<()>> {
        if let Authorization::Forbidden(reason) = can_modify_comment(caller, comment) {
            tracing::debug!(comment_id = %comment.id, reason, "Comment delete refused");
            return Ok(CommentOutcome::Forbidden(reason));
        }

        self.comment_repo.delete(&comment.id).await?;

        tracing::info!(comment_id = %comment.id, "Comment deleted");
        Ok(CommentOutcome::Applied(()))
    }
}
