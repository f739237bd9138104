use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // PersonalInfo: name lookups
        manager
            .create_index(
                Index::create()
                    .name("idx_personal_info_last_name")
                    .table(PersonalInfo::Table)
                    .col(PersonalInfo::LastName)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_personal_info_first_name")
                    .table(PersonalInfo::Table)
                    .col(PersonalInfo::FirstName)
                    .to_owned(),
            )
            .await?;

        // User: active flag filter
        manager
            .create_index(
                Index::create()
                    .name("idx_user_is_active")
                    .table(User::Table)
                    .col(User::IsActive)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_personal_info_last_name").table(PersonalInfo::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_personal_info_first_name").table(PersonalInfo::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_user_is_active").table(User::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum PersonalInfo { Table, FirstName, LastName }

#[derive(DeriveIden)]
enum User { Table, IsActive }
