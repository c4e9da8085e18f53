use chrono::Utc;
use metrics::counter;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, TransactionTrait,
};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use super::{fetch_page, PageRequest, Paged};
use crate::{
    auth::user,
    dto::notifications::{BroadcastDto, BroadcastResult, NotificationListQuery},
    entities::notification,
    errors::ServiceError,
};

/// In-app notifications addressed to individual users.
#[derive(Clone)]
pub struct NotificationService {
    db: Arc<DatabaseConnection>,
}

impl NotificationService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// The caller's notifications, newest first.
    pub async fn list_for_user(
        &self,
        user_id: Uuid,
        query: &NotificationListQuery,
        page: PageRequest,
    ) -> Result<Paged<notification::Model>, ServiceError> {
        let mut select =
            notification::Entity::find().filter(notification::Column::UserId.eq(user_id));
        if query.unread_only {
            select = select.filter(notification::Column::IsRead.eq(false));
        }
        fetch_page(
            select.order_by_desc(notification::Column::CreatedAt),
            self.db.as_ref(),
            page,
        )
        .await
    }

    /// Marks one of the caller's notifications read. Someone else's
    /// notification is reported as missing.
    #[instrument(skip(self))]
    pub async fn mark_read(
        &self,
        user_id: Uuid,
        id: Uuid,
    ) -> Result<notification::Model, ServiceError> {
        let db = self.db.as_ref();
        let current = notification::Entity::find_by_id(id)
            .filter(notification::Column::UserId.eq(user_id))
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Notification", id))?;
        if current.is_read {
            return Ok(current);
        }
        let mut active: notification::ActiveModel = current.into();
        active.is_read = Set(true);
        Ok(active.update(db).await?)
    }

    /// Sends the same notification to every active user.
    #[instrument(skip(self, dto), fields(title = %dto.title))]
    pub async fn broadcast(&self, dto: BroadcastDto) -> Result<BroadcastResult, ServiceError> {
        dto.validate()?;
        let txn = self.db.begin().await?;
        let recipients = user::Entity::find()
            .filter(user::Column::IsActive.eq(true))
            .all(&txn)
            .await?;

        let now = Utc::now();
        let rows: Vec<notification::ActiveModel> = recipients
            .iter()
            .map(|recipient| notification::ActiveModel {
                id: Set(Uuid::new_v4()),
                user_id: Set(recipient.id),
                title: Set(dto.title.trim().to_string()),
                body: Set(dto.body.clone()),
                is_read: Set(false),
                created_at: Set(now),
            })
            .collect();
        let count = rows.len() as u64;
        if !rows.is_empty() {
            notification::Entity::insert_many(rows)
                .exec_without_returning(&txn)
                .await?;
        }
        txn.commit().await?;

        counter!("mfg_notifications.broadcast", 1);
        info!(recipients = count, "notification broadcast");
        Ok(BroadcastResult { recipients: count })
    }
}
