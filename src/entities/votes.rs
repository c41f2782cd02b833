use sea_orm::entity::prelude::*;

/// One ballot per voter. The unique index on `voter_id` is the storage-level
/// backstop for the single-vote invariant; a concurrent duplicate insert
/// surfaces as a unique violation rather than a second row.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "votes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub voter_id: i32,

    pub party_id: i32,

    pub cast_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
