use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Where a request came from.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, DeriveActiveEnum,
    Display, EnumString,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestSource {
    #[sea_orm(string_value = "WEBSITE")]
    Website,
    #[sea_orm(string_value = "FACEBOOK")]
    Facebook,
    #[sea_orm(string_value = "CUSTOMER_REFERRED")]
    CustomerReferred,
    #[sea_orm(string_value = "OTHER")]
    Other,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, DeriveActiveEnum,
    Display, EnumString,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestStatus {
    #[sea_orm(string_value = "PENDING")]
    Pending,
    #[sea_orm(string_value = "APPROVED")]
    Approved,
    #[sea_orm(string_value = "ON_HOLD")]
    OnHold,
    #[sea_orm(string_value = "DENIED")]
    Denied,
    #[sea_orm(string_value = "IN_PRODUCTION")]
    InProduction,
    #[sea_orm(string_value = "COMPLETED")]
    Completed,
    #[sea_orm(string_value = "CANCELLED")]
    Cancelled,
}

impl RequestStatus {
    /// Transitions allowed out of this status. Terminal states allow none.
    pub fn allowed_transitions(&self) -> &'static [RequestStatus] {
        use RequestStatus::*;
        match self {
            Pending => &[Approved, OnHold, Denied, Cancelled],
            OnHold => &[Pending, Approved, Denied, Cancelled],
            Denied => &[Pending],
            Approved => &[InProduction, OnHold, Cancelled],
            InProduction => &[Completed, Cancelled],
            Completed | Cancelled => &[],
        }
    }

    pub fn can_transition_to(&self, next: RequestStatus) -> bool {
        self.allowed_transitions().contains(&next)
    }

    pub fn is_terminal(&self) -> bool {
        self.allowed_transitions().is_empty()
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, DeriveActiveEnum,
    Display, EnumString,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestPriority {
    #[sea_orm(string_value = "LOW")]
    Low,
    #[sea_orm(string_value = "MEDIUM")]
    Medium,
    #[sea_orm(string_value = "HIGH")]
    High,
    #[sea_orm(string_value = "URGENT")]
    Urgent,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "requests")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique, nullable)]
    pub code: Option<String>,
    pub title: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    /// JSON array of product URLs
    #[sea_orm(column_type = "Json")]
    pub product_links: Json,
    /// JSON array of stored upload names
    #[sea_orm(column_type = "Json")]
    pub media: Json,
    pub source: RequestSource,
    pub status: RequestStatus,
    pub priority: RequestPriority,
    #[sea_orm(nullable)]
    pub customer_id: Option<Uuid>,
    #[sea_orm(nullable)]
    pub source_other_id: Option<Uuid>,
    #[sea_orm(nullable)]
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::request_material::Entity")]
    RequestMaterials,
    #[sea_orm(has_one = "super::request_approval_info::Entity")]
    ApprovalInfo,
    #[sea_orm(has_many = "super::request_status_history::Entity")]
    StatusHistories,
    #[sea_orm(
        belongs_to = "super::customer::Entity",
        from = "Column::CustomerId",
        to = "super::customer::Column::Id"
    )]
    Customer,
    #[sea_orm(
        belongs_to = "super::source_other::Entity",
        from = "Column::SourceOtherId",
        to = "super::source_other::Column::Id"
    )]
    SourceOther,
}

impl Related<super::request_material::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RequestMaterials.def()
    }
}

impl Related<super::request_approval_info::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ApprovalInfo.def()
    }
}

impl Related<super::customer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customer.def()
    }
}

impl Related<super::source_other::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SourceOther.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::RequestStatus::*;
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn pending_can_be_decided() {
        assert!(Pending.can_transition_to(Approved));
        assert!(Pending.can_transition_to(OnHold));
        assert!(Pending.can_transition_to(Denied));
        assert!(!Pending.can_transition_to(Completed));
    }

    #[test]
    fn production_only_after_approval() {
        assert!(Approved.can_transition_to(InProduction));
        assert!(!OnHold.can_transition_to(InProduction));
        assert!(InProduction.can_transition_to(Completed));
    }

    #[test]
    fn no_status_transitions_to_itself() {
        for status in RequestStatus::iter() {
            assert!(!status.can_transition_to(status), "{status} loops");
        }
    }

    #[test]
    fn joins_to_both_request_origins() {
        use sea_orm::{DbBackend, QueryTrait};

        let sql = Entity::find()
            .find_also_related(super::super::source_other::Entity)
            .build(DbBackend::Sqlite)
            .to_string();
        assert!(sql.contains("LEFT JOIN \"source_others\""), "{sql}");

        let sql = Entity::find()
            .find_also_related(super::super::customer::Entity)
            .build(DbBackend::Sqlite)
            .to_string();
        assert!(sql.contains("LEFT JOIN \"customers\""), "{sql}");
    }

    #[test]
    fn terminal_states() {
        assert!(Completed.is_terminal());
        assert!(Cancelled.is_terminal());
        assert!(!Denied.is_terminal());
    }

    #[test]
    fn display_matches_wire_value() {
        assert_eq!(OnHold.to_string(), "ON_HOLD");
        assert_eq!(RequestStatus::from_str("IN_PRODUCTION").unwrap(), InProduction);
        assert_eq!(
            serde_json::to_string(&RequestSource::CustomerReferred).unwrap(),
            "\"CUSTOMER_REFERRED\""
        );
    }
}
