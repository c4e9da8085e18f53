use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::subprocess::SubprocessStatus;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "subprocess_histories")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub subprocess_id: Uuid,
    pub procedure_id: Uuid,
    pub step: i32,
    pub from_status: SubprocessStatus,
    pub to_status: SubprocessStatus,
    #[sea_orm(nullable)]
    pub changed_by: Option<Uuid>,
    #[sea_orm(column_type = "Text", nullable)]
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::subprocess::Entity",
        from = "Column::SubprocessId",
        to = "super::subprocess::Column::Id",
        on_delete = "Cascade"
    )]
    Subprocess,
}

impl Related<super::subprocess::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Subprocess.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
