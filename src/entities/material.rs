use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, EnumIter,
    DeriveActiveEnum, Display, EnumString,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum MaterialType {
    #[sea_orm(string_value = "INGREDIENT")]
    Ingredient,
    #[sea_orm(string_value = "ACCESSORY")]
    Accessory,
    #[sea_orm(string_value = "OTHER")]
    Other,
}

impl MaterialType {
    /// Two-letter prefix used in generated material codes.
    pub fn code_prefix(&self) -> &'static str {
        match self {
            MaterialType::Ingredient => "NL",
            MaterialType::Accessory => "PK",
            MaterialType::Other => "KH",
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum, Display,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum MaterialStatus {
    #[sea_orm(string_value = "AVAILABLE")]
    Available,
    #[sea_orm(string_value = "LOW_STOCK")]
    LowStock,
    #[sea_orm(string_value = "OUT_OF_STOCK")]
    OutOfStock,
    #[sea_orm(string_value = "DISCONTINUED")]
    Discontinued,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "materials")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(unique)]
    pub code: String,
    /// On-hand quantity
    pub quantity: i32,
    pub unit: String,
    #[sea_orm(nullable)]
    pub origin_id: Option<Uuid>,
    pub is_active: bool,
    pub material_type: MaterialType,
    pub status: MaterialStatus,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::origin::Entity",
        from = "Column::OriginId",
        to = "super::origin::Column::Id"
    )]
    Origin,
    #[sea_orm(has_many = "super::request_material::Entity")]
    RequestMaterials,
    #[sea_orm(has_one = "super::request_input::Entity")]
    RequestInput,
}

impl Related<super::origin::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Origin.def()
    }
}

impl Related<super::request_material::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RequestMaterials.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
