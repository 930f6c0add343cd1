//! About page repository.

use std::sync::Arc;

use crate::entities::{About, about};
use codestar_common::{AppError, AppResult};
use sea_orm::{DatabaseConnection, EntityTrait, QueryOrder};

/// About page repository.
#[derive(Clone)]
pub struct AboutRepository {
    db: Arc<DatabaseConnection>,
}

impl AboutRepository {
    /// Create a new about repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find the most recently updated about entry, if any exists.
    pub async fn find_latest(&self) -> AppResult<Option<about::Model>> {
        About::find()
            .order_by_desc(about::Column::UpdatedOn)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
