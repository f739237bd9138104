//! Create `client` table with a one-to-one FK to `user`.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Client::Table)
                    .if_not_exists()
                    .col(big_integer(Client::Id).auto_increment().primary_key())
                    .col(string_len(Client::Uuid, 36).unique_key().not_null())
                    // nullable, unique when present
                    .col(
                        ColumnDef::new(Client::Vat)
                            .string_len(20)
                            .unique_key()
                            .null(),
                    )
                    .col(big_integer(Client::UserId).unique_key().not_null())
                    .col(timestamp_with_time_zone(Client::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Client::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_client_user")
                            .from(Client::Table, Client::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Client::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Client { Table, Id, Uuid, Vat, UserId, CreatedAt, UpdatedAt }

#[derive(DeriveIden)]
enum User { Table, Id }
