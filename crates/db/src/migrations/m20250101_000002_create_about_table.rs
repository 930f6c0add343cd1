//! Create about and collaborate_request tables.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(About::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(About::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(About::Title).string_len(200).not_null())
                    .col(
                        ColumnDef::new(About::ProfileImage)
                            .string_len(255)
                            .not_null()
                            .default("placeholder"),
                    )
                    .col(ColumnDef::new(About::Content).text().not_null())
                    .col(
                        ColumnDef::new(About::UpdatedOn)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_about_updated_on")
                    .table(About::Table)
                    .col(About::UpdatedOn)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CollaborateRequest::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CollaborateRequest::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CollaborateRequest::Name).string_len(200).not_null())
                    .col(ColumnDef::new(CollaborateRequest::Email).string_len(254).not_null())
                    .col(ColumnDef::new(CollaborateRequest::Message).text().not_null())
                    .col(
                        ColumnDef::new(CollaborateRequest::Read)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(CollaborateRequest::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CollaborateRequest::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(About::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(Iden)]
enum About {
    Table,
    Id,
    Title,
    ProfileImage,
    Content,
    UpdatedOn,
}

#[derive(Iden)]
enum CollaborateRequest {
    Table,
    Id,
    Name,
    Email,
    Message,
    Read,
    CreatedAt,
}
