use sea_orm::entity::prelude::*;
use serde::Serialize;

/// Singleton row (id = 1) driving every window check. Null election dates
/// mean the election is closed; there is no separate flag for elections.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "election_settings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i32,

    pub registration_open: bool,

    pub registration_start_date: Option<DateTimeUtc>,

    pub registration_end_date: Option<DateTimeUtc>,

    pub election_start_date: Option<DateTimeUtc>,

    pub election_end_date: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
