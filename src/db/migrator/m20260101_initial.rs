use crate::entities::prelude::*;
use crate::entities::{admins, election_settings, system_config};
use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::Schema;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Install-time super admin. The password must be rotated after first login;
/// `balota admin set-password` can also replace it from the CLI.
pub const DEFAULT_ADMIN_USERNAME: &str = "admin";
pub const DEFAULT_ADMIN_PASSWORD: &str = "change-me";

/// Hash the default password using Argon2id
fn hash_default_password() -> String {
    use argon2::{
        Argon2,
        password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
    };

    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(DEFAULT_ADMIN_PASSWORD.as_bytes(), &salt)
        .expect("Failed to hash default password")
        .to_string()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();
        let schema = Schema::new(backend);

        manager
            .create_table(
                schema
                    .create_table_from_entity(Admins)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;
        manager
            .create_table(
                schema
                    .create_table_from_entity(Voters)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;
        manager
            .create_table(
                schema
                    .create_table_from_entity(Votes)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;
        manager
            .create_table(
                schema
                    .create_table_from_entity(Parties)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;
        manager
            .create_table(
                schema
                    .create_table_from_entity(ElectionSettings)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;
        manager
            .create_table(
                schema
                    .create_table_from_entity(SystemConfig)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;
        manager
            .create_table(
                schema
                    .create_table_from_entity(AuditLog)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;
        manager
            .create_table(
                schema
                    .create_table_from_entity(ActivityLog)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        // Seed the bootstrap super admin
        let now = chrono::Utc::now();
        let insert = Query::insert()
            .into_table(Admins)
            .columns([
                admins::Column::Username,
                admins::Column::PasswordHash,
                admins::Column::Role,
                admins::Column::IsBootstrap,
                admins::Column::IsActive,
                admins::Column::CreatedAt,
            ])
            .values_panic([
                DEFAULT_ADMIN_USERNAME.into(),
                hash_default_password().into(),
                "super_admin".into(),
                true.into(),
                true.into(),
                now.into(),
            ])
            .to_owned();
        manager.exec_stmt(insert).await?;

        // Seed the settings singleton: everything closed until the bootstrap
        // admin opens a window.
        let insert = Query::insert()
            .into_table(ElectionSettings)
            .columns([
                election_settings::Column::Id,
                election_settings::Column::RegistrationOpen,
            ])
            .values_panic([1.into(), false.into()])
            .to_owned();
        manager.exec_stmt(insert).await?;

        for (key, value, description) in crate::db::DEFAULT_SYSTEM_CONFIG {
            let insert = Query::insert()
                .into_table(SystemConfig)
                .columns([
                    system_config::Column::ConfigKey,
                    system_config::Column::ConfigValue,
                    system_config::Column::Description,
                ])
                .values_panic([(*key).into(), (*value).into(), (*description).into()])
                .to_owned();
            manager.exec_stmt(insert).await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ActivityLog).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AuditLog).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SystemConfig).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ElectionSettings).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Parties).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Votes).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Voters).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Admins).to_owned())
            .await?;

        Ok(())
    }
}
