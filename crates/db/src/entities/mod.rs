//! Database entities.

pub mod about;
pub mod collaborate_request;
pub mod comment;
pub mod post;
pub mod user;

pub use about::Entity as About;
pub use collaborate_request::Entity as CollaborateRequest;
pub use comment::Entity as Comment;
pub use post::Entity as Post;
pub use user::Entity as User;
