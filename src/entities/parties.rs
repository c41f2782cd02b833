use sea_orm::entity::prelude::*;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "parties")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub name_english: String,

    pub name_amharic: String,

    pub leader_name_english: Option<String>,

    pub leader_name_amharic: Option<String>,

    pub ideology: Option<String>,

    pub description_english: Option<String>,

    pub description_amharic: Option<String>,

    pub logo_url: Option<String>,

    pub leader_image_url: Option<String>,

    pub is_active: bool,

    pub created_by: i32,

    pub created_at: DateTimeUtc,

    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
