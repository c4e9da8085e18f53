use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder,
};
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use super::{fetch_page, like_pattern, PageRequest, Paged};
use crate::{
    dto::directory::{NamedEntryDto, SearchQuery, UpdateNamedEntryDto},
    entities::{request, source_other},
    errors::ServiceError,
};

/// Request sources other than a known customer (trade fairs, partners, ...).
#[derive(Clone)]
pub struct SourceOtherService {
    db: Arc<DatabaseConnection>,
}

impl SourceOtherService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self, dto), fields(name = %dto.name))]
    pub async fn create(&self, dto: NamedEntryDto) -> Result<source_other::Model, ServiceError> {
        dto.validate()?;
        Ok(source_other::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(dto.name.trim().to_string()),
            description: Set(dto.description),
        }
        .insert(self.db.as_ref())
        .await?)
    }

    pub async fn get(&self, id: Uuid) -> Result<source_other::Model, ServiceError> {
        source_other::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| ServiceError::not_found("SourceOther", id))
    }

    pub async fn list(
        &self,
        query: &SearchQuery,
        page: PageRequest,
    ) -> Result<Paged<source_other::Model>, ServiceError> {
        let mut select = source_other::Entity::find();
        if let Some(pattern) = like_pattern(query.search.as_deref()) {
            select = select.filter(source_other::Column::Name.like(pattern));
        }
        fetch_page(
            select.order_by_asc(source_other::Column::Name),
            self.db.as_ref(),
            page,
        )
        .await
    }

    #[instrument(skip(self, dto))]
    pub async fn update(
        &self,
        id: Uuid,
        dto: UpdateNamedEntryDto,
    ) -> Result<source_other::Model, ServiceError> {
        dto.validate()?;
        let mut active: source_other::ActiveModel = self.get(id).await?.into();
        if let Some(name) = dto.name {
            active.name = Set(name.trim().to_string());
        }
        if let Some(description) = dto.description {
            active.description = Set(Some(description));
        }
        Ok(active.update(self.db.as_ref()).await?)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        let db = self.db.as_ref();
        self.get(id).await?;
        let referenced = request::Entity::find()
            .filter(request::Column::SourceOtherId.eq(id))
            .count(db)
            .await?;
        if referenced > 0 {
            return Err(ServiceError::Conflict(format!(
                "source {} is referenced by {} request(s)",
                id, referenced
            )));
        }
        source_other::Entity::delete_by_id(id).exec(db).await?;
        Ok(())
    }
}
