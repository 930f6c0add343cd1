//! Ownership checks for comment mutation.
//!
//! Every path that writes a comment asks here first; the answer is a value,
//! so callers decide how a refusal is reported.

use codestar_db::entities::{comment, user};

/// Refusal reason for anonymous callers.
pub const NOT_SIGNED_IN: &str = "not signed in";

/// Outcome of an authorization check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Authorization {
    /// The caller may proceed.
    Authorized,
    /// The caller may not proceed, with a short reason for logs.
    Forbidden(&'static str),
}

impl Authorization {
    /// Whether the caller may go ahead.
    #[must_use]
    pub const fn is_authorized(self) -> bool {
        matches!(self, Self::Authorized)
    }
}

/// Only signed-in users may leave comments.
#[must_use]
pub const fn can_post_comment(caller: Option<&user::Model>) -> Authorization {
    match caller {
        Some(_) => Authorization::Authorized,
        None => Authorization::Forbidden(NOT_SIGNED_IN),
    }
}

/// Only the author of a comment may edit or delete it.
#[must_use]
pub fn can_modify_comment(caller: Option<&user::Model>, comment: &comment::Model) -> Authorization {
    match caller {
        None => Authorization::Forbidden(NOT_SIGNED_IN),
        Some(user) if comment.is_authored_by(&user.id) => Authorization::Authorized,
        Some(_) => Authorization::Forbidden("not the comment author"),
    }
}
