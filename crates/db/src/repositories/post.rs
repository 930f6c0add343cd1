//! Blog post repository.
//!
//! Only published posts are reachable from here: drafts are written and read
//! out of band.

use std::sync::Arc;

use crate::entities::{Post, post, post::PostStatus};
use codestar_common::{AppError, AppResult};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Select,
};

/// Post repository for database operations.
#[derive(Clone)]
pub struct PostRepository {
    db: Arc<DatabaseConnection>,
}

impl PostRepository {
    /// Create a new post repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    fn published() -> Select<Post> {
        Post::find().filter(post::Column::Status.eq(PostStatus::Published))
    }

    /// Find a published post by slug.
    pub async fn find_published_by_slug(&self, slug: &str) -> AppResult<Option<post::Model>> {
        Self::published()
            .filter(post::Column::Slug.eq(slug))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count published posts.
    pub async fn count_published(&self) -> AppResult<u64> {
        Self::published()
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find published posts, newest first.
    pub async fn find_published(&self, limit: u64, offset: u64) -> AppResult<Vec<post::Model>> {
        Self::published()
            .order_by_desc(post::Column::CreatedOn)
            .order_by_desc(post::Column::Id)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
