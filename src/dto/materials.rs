use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::validate_not_blank;
use crate::entities::material::{MaterialStatus, MaterialType};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateMaterialDto {
    #[validate(length(min = 1, max = 255), custom = "validate_not_blank")]
    pub name: String,
    /// Generated from type and date when absent.
    #[validate(length(min = 1, max = 32))]
    pub code: Option<String>,
    #[validate(range(min = 0))]
    pub quantity: i32,
    #[validate(length(min = 1, max = 32))]
    pub unit: String,
    pub origin_id: Option<Uuid>,
    pub material_type: MaterialType,
    pub status: Option<MaterialStatus>,
    pub is_active: Option<bool>,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateMaterialDto {
    #[validate(length(min = 1, max = 255), custom = "validate_not_blank")]
    pub name: Option<String>,
    #[validate(range(min = 0))]
    pub quantity: Option<i32>,
    #[validate(length(min = 1, max = 32))]
    pub unit: Option<String>,
    pub origin_id: Option<Uuid>,
    pub material_type: Option<MaterialType>,
    pub status: Option<MaterialStatus>,
    pub is_active: Option<bool>,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MaterialListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub material_type: Option<MaterialType>,
    pub is_active: Option<bool>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateOriginDto {
    #[validate(length(min = 1, max = 255), custom = "validate_not_blank")]
    pub name: String,
    #[validate(length(max = 128))]
    pub country: Option<String>,
}
