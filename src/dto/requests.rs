use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::{validate_http_links, validate_not_blank};
use crate::entities::{
    material::MaterialType,
    request::{RequestPriority, RequestSource, RequestStatus},
    request_approval_info::ApprovalType,
};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RequestMaterialDto {
    pub material_id: Uuid,
    #[validate(range(min = 1, message = "quantity must be positive"))]
    pub quantity: i32,
    /// When set, the material must be of this type.
    pub material_type: Option<MaterialType>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RequestInputDto {
    pub material_id: Uuid,
    pub request_id: Option<Uuid>,
    #[validate(length(min = 1, max = 255), custom = "validate_not_blank")]
    pub supplier: String,
    pub expected_date: Option<DateTime<Utc>>,
    #[validate(custom = "validate_price")]
    pub price: Decimal,
    #[validate(range(min = 1))]
    pub quantity: i32,
    #[validate(length(max = 2000))]
    pub reason: Option<String>,
}

fn validate_price(price: &Decimal) -> Result<(), ValidationError> {
    if price.is_sign_negative() {
        return Err(ValidationError::new("negative_price"));
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateRequestDto {
    #[validate(length(min = 1, max = 255), custom = "validate_not_blank")]
    pub title: String,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    #[serde(default)]
    #[validate(custom = "validate_http_links")]
    pub product_links: Vec<String>,
    #[serde(default)]
    pub media: Vec<String>,
    pub source: RequestSource,
    pub priority: Option<RequestPriority>,
    pub customer_id: Option<Uuid>,
    pub source_other_id: Option<Uuid>,
    /// Defaults to the caller.
    pub created_by: Option<Uuid>,
    #[serde(default)]
    #[validate]
    pub materials: Vec<RequestMaterialDto>,
    #[validate]
    pub request_input: Option<RequestInputDto>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateRequestDto {
    #[validate(length(min = 1, max = 255), custom = "validate_not_blank")]
    pub title: Option<String>,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    #[validate(custom = "validate_http_links")]
    pub product_links: Option<Vec<String>>,
    pub media: Option<Vec<String>>,
    pub source: Option<RequestSource>,
    pub priority: Option<RequestPriority>,
    pub customer_id: Option<Uuid>,
    pub source_other_id: Option<Uuid>,
    /// Replaces the whole material set when present.
    pub materials: Option<Vec<RequestMaterialDto>>,
    #[validate]
    pub request_input: Option<RequestInputDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateRequestStatusDto {
    pub status: RequestStatus,
    #[validate(length(max = 2000))]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AddRequestMaterialDto {
    pub material_id: Uuid,
    #[validate(range(min = 1, message = "quantity must be positive"))]
    pub quantity: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoveRequestMaterialDto {
    pub material_request_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_approval_reasons"))]
pub struct CreateApprovalInfoDto {
    pub approval_type: ApprovalType,
    #[validate(length(max = 2000))]
    pub hold_reason: Option<String>,
    #[validate(length(max = 2000))]
    pub deny_reason: Option<String>,
    pub production_plan: Option<String>,
    #[serde(default)]
    pub files: Vec<String>,
    #[validate(length(max = 2000))]
    pub note: Option<String>,
}

fn has_text(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

fn validate_approval_reasons(dto: &CreateApprovalInfoDto) -> Result<(), ValidationError> {
    match dto.approval_type {
        ApprovalType::Hold if !has_text(&dto.hold_reason) => {
            Err(ValidationError::new("hold_reason_required"))
        }
        ApprovalType::Deny if !has_text(&dto.deny_reason) => {
            Err(ValidationError::new("deny_reason_required"))
        }
        _ => Ok(()),
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateApprovalInfoDto {
    #[validate(length(max = 2000))]
    pub hold_reason: Option<String>,
    #[validate(length(max = 2000))]
    pub deny_reason: Option<String>,
    pub production_plan: Option<String>,
    pub files: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RequestListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub status: Option<RequestStatus>,
    pub source: Option<RequestSource>,
    pub priority: Option<RequestPriority>,
    pub customer_id: Option<Uuid>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RequestInputListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub request_id: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCount {
    pub status: RequestStatus,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialTypeCount {
    pub material_type: MaterialType,
    pub count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approval(kind: ApprovalType) -> CreateApprovalInfoDto {
        CreateApprovalInfoDto {
            approval_type: kind,
            hold_reason: None,
            deny_reason: None,
            production_plan: None,
            files: vec![],
            note: None,
        }
    }

    #[test]
    fn hold_and_deny_need_a_reason() {
        assert!(approval(ApprovalType::Approve).validate().is_ok());
        assert!(approval(ApprovalType::Hold).validate().is_err());
        assert!(approval(ApprovalType::Deny).validate().is_err());

        let mut deny = approval(ApprovalType::Deny);
        deny.deny_reason = Some("out of scope".into());
        assert!(deny.validate().is_ok());
    }

    #[test]
    fn nested_material_quantities_are_validated() {
        let dto: CreateRequestDto = serde_json::from_value(serde_json::json!({
            "title": "Sample run",
            "source": "WEBSITE",
            "materials": [{"material_id": Uuid::new_v4(), "quantity": 0}]
        }))
        .unwrap();
        assert!(dto.validate().is_err());
    }

    #[test]
    fn request_input_price_accepts_numbers_and_strings() {
        let from_number: RequestInputDto = serde_json::from_value(serde_json::json!({
            "material_id": Uuid::new_v4(),
            "supplier": "Acme",
            "price": 12.5,
            "quantity": 3
        }))
        .unwrap();
        let from_string: RequestInputDto = serde_json::from_value(serde_json::json!({
            "material_id": Uuid::new_v4(),
            "supplier": "Acme",
            "price": "12.5",
            "quantity": 3
        }))
        .unwrap();
        assert_eq!(from_number.price, from_string.price);
        assert!(from_number.validate().is_ok());
    }
}
