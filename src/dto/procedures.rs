use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::validate_not_blank;
use crate::entities::subprocess::SubprocessStatus;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateSubprocessDto {
    pub department_id: Option<Uuid>,
    #[validate(length(max = 64))]
    pub role: Option<String>,
    #[validate(length(min = 1, max = 255), custom = "validate_not_blank")]
    pub name: String,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    #[validate(range(min = 1))]
    pub step: i32,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub estimated_duration_minutes: i32,
    #[serde(default = "default_required")]
    pub is_required: bool,
    #[serde(default)]
    pub has_cost: bool,
}

fn default_required() -> bool {
    true
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateSubprocessDto {
    pub department_id: Option<Uuid>,
    #[validate(length(max = 64))]
    pub role: Option<String>,
    #[validate(length(min = 1, max = 255), custom = "validate_not_blank")]
    pub name: Option<String>,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    #[validate(range(min = 1))]
    pub step: Option<i32>,
    #[validate(range(min = 0))]
    pub estimated_duration_minutes: Option<i32>,
    pub is_required: Option<bool>,
    pub has_cost: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateProcedureDto {
    #[validate(length(min = 1, max = 255), custom = "validate_not_blank")]
    pub name: String,
    #[validate(range(min = 1))]
    pub version: Option<i32>,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    #[serde(default)]
    #[validate]
    pub subprocesses: Vec<CreateSubprocessDto>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateProcedureDto {
    #[validate(length(min = 1, max = 255), custom = "validate_not_blank")]
    pub name: Option<String>,
    #[validate(range(min = 1))]
    pub version: Option<i32>,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwapStepsDto {
    pub first_id: Uuid,
    pub second_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SubprocessProgressDto {
    pub status: SubprocessStatus,
    #[validate(length(max = 2000))]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProcedureListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub search: Option<String>,
}
