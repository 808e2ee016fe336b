use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Schools::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Schools::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Schools::Name).string().not_null())
                    .col(ColumnDef::new(Schools::Address).string().not_null())
                    .col(ColumnDef::new(Schools::City).string().not_null())
                    .col(ColumnDef::new(Schools::State).string().not_null())
                    .col(
                        ColumnDef::new(Schools::Contact)
                            .string_len(20)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Schools::Image).string().not_null())
                    .col(ColumnDef::new(Schools::EmailId).string().not_null())
                    .col(
                        ColumnDef::new(Schools::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Schools::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Storage-level uniqueness is the authoritative duplicate-email
        // guard; the application-level existence check only provides the
        // friendlier error message.
        manager
            .create_index(
                Index::create()
                    .name("idx_schools_email_id_unique")
                    .table(Schools::Table)
                    .col(Schools::EmailId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Default listing order is newest-first.
        manager
            .create_index(
                Index::create()
                    .name("idx_schools_created_at")
                    .table(Schools::Table)
                    .col(Schools::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Schools::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Schools {
    Table,
    Id,
    Name,
    Address,
    City,
    State,
    Contact,
    Image,
    EmailId,
    CreatedAt,
    UpdatedAt,
}
