//! Business logic services.

#![allow(missing_docs)]

pub mod about;
pub mod blog;
pub mod comment;
pub mod user;

pub use about::{AboutService, CollaborateInput};
pub use blog::{
    BlogService, CommentView, POSTS_PER_PAGE, PageInfo, PageRequest, PostDetail, PostPage,
    PostSummary,
};
pub use comment::{CommentInput, CommentOutcome, CommentService, NewComment};
pub use user::{LoginInput, SignupInput, UserService};
