use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder,
};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use super::{fetch_page, like_pattern, PageRequest, Paged};
use crate::{
    dto::directory::{NamedEntryDto, SearchQuery, UpdateNamedEntryDto},
    entities::department,
    errors::ServiceError,
};

/// Departments own subprocess steps and group users. Deleting one detaches
/// its users and steps rather than removing them.
#[derive(Clone)]
pub struct DepartmentService {
    db: Arc<DatabaseConnection>,
}

impl DepartmentService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self, dto), fields(name = %dto.name))]
    pub async fn create(&self, dto: NamedEntryDto) -> Result<department::Model, ServiceError> {
        dto.validate()?;
        let created = department::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(dto.name.trim().to_string()),
            description: Set(dto.description),
        }
        .insert(self.db.as_ref())
        .await?;
        info!(department_id = %created.id, "department created");
        Ok(created)
    }

    pub async fn get(&self, id: Uuid) -> Result<department::Model, ServiceError> {
        department::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| ServiceError::not_found("Department", id))
    }

    pub async fn list(
        &self,
        query: &SearchQuery,
        page: PageRequest,
    ) -> Result<Paged<department::Model>, ServiceError> {
        let mut select = department::Entity::find();
        if let Some(pattern) = like_pattern(query.search.as_deref()) {
            select = select.filter(department::Column::Name.like(pattern));
        }
        fetch_page(
            select.order_by_asc(department::Column::Name),
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
    ) -> Result<department::Model, ServiceError> {
        dto.validate()?;
        let mut active: department::ActiveModel = self.get(id).await?.into();
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
        let result = department::Entity::delete_by_id(id)
            .exec(self.db.as_ref())
            .await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::not_found("Department", id));
        }
        Ok(())
    }
}
