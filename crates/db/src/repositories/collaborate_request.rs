//! Collaboration request repository.

use std::sync::Arc;

use crate::entities::{CollaborateRequest, collaborate_request};
use codestar_common::{AppError, AppResult};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, PaginatorTrait};

/// Collaboration request repository.
#[derive(Clone)]
pub struct CollaborateRequestRepository {
    db: Arc<DatabaseConnection>,
}

impl CollaborateRequestRepository {
    /// Create a new collaboration request repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Store a new collaboration request.
    pub async fn create(
        &self,
        model: collaborate_request::ActiveModel,
    ) -> AppResult<collaborate_request::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count all stored requests.
    pub async fn count(&self) -> AppResult<u64> {
        CollaborateRequest::find()
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
