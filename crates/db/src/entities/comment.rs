//! Comment entity.
//!
//! A comment is moderated: it starts unapproved, and any edit sends it back
//! to moderation. [`Model::edit`] is the only place an existing comment's
//! body changes, so the reset cannot be forgotten at a call site.

use sea_orm::{Set, entity::prelude::*};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "comment")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(indexed)]
    pub post_id: String,

    #[sea_orm(indexed)]
    pub author_id: String,

    #[sea_orm(column_type = "Text")]
    pub body: String,

    /// Moderation flag; only approved comments are counted publicly
    #[sea_orm(default_value = false)]
    pub approved: bool,

    pub created_on: DateTimeWithTimeZone,
}

impl Model {
    /// Replace the body and send the comment back to moderation.
    #[must_use]
    pub fn edit(self, body: String) -> ActiveModel {
        let mut active: ActiveModel = self.into();
        active.body = Set(body);
        active.approved = Set(false);
        active
    }

    /// Whether `user_id` wrote this comment.
    #[must_use]
    pub fn is_authored_by(&self, user_id: &str) -> bool {
        self.author_id == user_id
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::post::Entity",
        from = "Column::PostId",
        to = "super::post::Column::Id",
        on_delete = "Cascade"
    )]
    Post,

    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::AuthorId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Author,
}

impl Related<super::post::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Post.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Author.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
