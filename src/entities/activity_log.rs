use sea_orm::entity::prelude::*;
use serde::Serialize;

/// Append-only record of voter actions (logins, lockouts, ballots).
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "activity_log")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    pub voter_id: i32,

    pub action: String,

    /// JSON payload.
    pub details: Option<String>,

    pub ip_address: Option<String>,

    pub user_agent: Option<String>,

    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
