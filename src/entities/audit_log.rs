use sea_orm::entity::prelude::*;
use serde::Serialize;

/// Append-only record of admin actions. Write-only from the policy core's
/// perspective; read back only by the audit viewer.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "audit_log")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    pub admin_id: i32,

    pub action: String,

    pub target: Option<String>,

    /// JSON payload describing the change.
    pub details: Option<String>,

    pub ip_address: Option<String>,

    pub user_agent: Option<String>,

    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
