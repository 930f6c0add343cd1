//! Core business logic for codestar.
//!
//! Services take the caller as an explicit `Option<&user::Model>` and return
//! outcomes the web layer turns into pages, redirects and flash messages.

pub mod authorization;
pub mod forms;
pub mod services;

pub use authorization::{Authorization, can_modify_comment, can_post_comment};
pub use forms::{FormErrors, Submission};
pub use services::*;
