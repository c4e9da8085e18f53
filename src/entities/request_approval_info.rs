use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use strum::Display;

use super::request::RequestStatus;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum, Display,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ApprovalType {
    #[sea_orm(string_value = "APPROVE")]
    Approve,
    #[sea_orm(string_value = "HOLD")]
    Hold,
    #[sea_orm(string_value = "DENY")]
    Deny,
}

impl ApprovalType {
    /// Request status an approval decision moves the request into.
    pub fn target_status(&self) -> RequestStatus {
        match self {
            ApprovalType::Approve => RequestStatus::Approved,
            ApprovalType::Hold => RequestStatus::OnHold,
            ApprovalType::Deny => RequestStatus::Denied,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "request_approval_infos")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub request_id: Uuid,
    pub approval_type: ApprovalType,
    #[sea_orm(column_type = "Text", nullable)]
    pub hold_reason: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub deny_reason: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub production_plan: Option<String>,
    /// JSON array of stored upload names
    #[sea_orm(column_type = "Json")]
    pub files: Json,
    #[sea_orm(nullable)]
    pub approved_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::request::Entity",
        from = "Column::RequestId",
        to = "super::request::Column::Id"
    )]
    Request,
}

impl Related<super::request::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Request.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
