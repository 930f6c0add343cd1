//! Repository layer.
//!
//! Each repository wraps the shared connection pool and maps `DbErr` into
//! `AppError::Database`.

mod about;
mod collaborate_request;
mod comment;
mod post;
mod user;

pub use about::AboutRepository;
pub use collaborate_request::CollaborateRequestRepository;
pub use comment::CommentRepository;
pub use post::PostRepository;
pub use user::UserRepository;
