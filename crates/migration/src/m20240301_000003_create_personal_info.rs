//! Create `personal_info` table owned by `client`.
//!
//! Rows are removed together with their client through the cascading FK.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PersonalInfo::Table)
                    .if_not_exists()
                    .col(big_integer(PersonalInfo::Id).auto_increment().primary_key())
                    .col(big_integer(PersonalInfo::ClientId).unique_key().not_null())
                    .col(string_len(PersonalInfo::FirstName, 128).not_null())
                    .col(string_len(PersonalInfo::LastName, 128).not_null())
                    .col(ColumnDef::new(PersonalInfo::Email).string_len(255).unique_key().null())
                    .col(ColumnDef::new(PersonalInfo::Phone).string_len(20).unique_key().null())
                    .col(ColumnDef::new(PersonalInfo::Address).string_len(255).null())
                    .col(timestamp_with_time_zone(PersonalInfo::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(PersonalInfo::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_personal_info_client")
                            .from(PersonalInfo::Table, PersonalInfo::ClientId)
                            .to(Client::Table, Client::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(PersonalInfo::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum PersonalInfo { Table, Id, ClientId, FirstName, LastName, Email, Phone, Address, CreatedAt, UpdatedAt }

#[derive(DeriveIden)]
enum Client { Table, Id }
