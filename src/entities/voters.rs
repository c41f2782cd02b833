use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "voters")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub full_name: String,

    pub age: i32,

    pub sex: String,

    pub region: String,

    pub zone: String,

    pub woreda: String,

    pub kebele: String,

    /// National identifier, `NNNN-NNNN-NNNN`
    #[sea_orm(unique)]
    pub fin: String,

    #[sea_orm(unique)]
    pub phone: Option<String>,

    /// Argon2id password hash
    pub password_hash: String,

    /// Voters are provisioned with a known default secret and must rotate it
    /// before being routed to the ballot.
    pub has_changed_password: bool,

    pub login_attempts: i32,

    pub locked_until: Option<DateTimeUtc>,

    pub is_active: bool,

    /// Admin that registered this voter.
    pub created_by: i32,

    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
