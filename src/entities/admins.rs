use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "admins")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub username: String,

    /// Argon2id password hash
    pub password_hash: String,

    /// "admin" or "super_admin"
    pub role: String,

    /// Set only on the install-time admin; that row can never be deleted and
    /// is the only identity allowed to change windows, parties or reset state.
    pub is_bootstrap: bool,

    pub is_active: bool,

    /// Admin that created this account; the bootstrap row has none.
    pub created_by: Option<i32>,

    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
