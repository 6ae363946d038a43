use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // User: one account per email, compared case-insensitively
        manager
            .create_index(
                Index::create()
                    .name("uniq_user_normalized_email")
                    .table(User::Table)
                    .col(User::NormalizedEmail)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("uniq_user_normalized_email").table(User::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum User { Table, NormalizedEmail }
