//! Blog post entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Publication status. Only published posts are visible to visitors.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "i32", db_type = "Integer")]
pub enum PostStatus {
    #[default]
    #[sea_orm(num_value = 0)]
    Draft,
    #[sea_orm(num_value = 1)]
    Published,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "post")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(unique)]
    pub title: String,

    /// URL-safe public identifier derived from the title
    #[sea_orm(unique)]
    pub slug: String,

    #[sea_orm(indexed)]
    pub author_id: String,

    /// Reference to the featured image on the external media host
    #[sea_orm(default_value = "placeholder")]
    pub featured_image: String,

    /// Post body (trusted HTML written by the author)
    #[sea_orm(column_type = "Text")]
    pub content: String,

    pub created_on: DateTimeWithTimeZone,

    pub updated_on: DateTimeWithTimeZone,

    pub status: PostStatus,

    #[sea_orm(column_type = "Text")]
    pub excerpt: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::AuthorId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Author,

    #[sea_orm(has_many = "super::comment::Entity")]
    Comments,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Author.def()
    }
}

impl Related<super::comment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
