use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder,
};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use super::{code_generator::CodeGenerator, ensure_exists, fetch_page, like_pattern, PageRequest, Paged};
use crate::{
    dto::{
        directory::SearchQuery,
        materials::{CreateMaterialDto, CreateOriginDto, MaterialListQuery, UpdateMaterialDto},
    },
    entities::{
        material::{self, MaterialStatus},
        origin, request_material,
    },
    errors::ServiceError,
};

fn status_for_quantity(quantity: i32) -> MaterialStatus {
    if quantity == 0 {
        MaterialStatus::OutOfStock
    } else {
        MaterialStatus::Available
    }
}

/// Material catalogue and the origins materials are sourced from.
#[derive(Clone)]
pub struct MaterialService {
    db: Arc<DatabaseConnection>,
    codes: CodeGenerator,
}

impl MaterialService {
    pub fn new(db: Arc<DatabaseConnection>, codes: CodeGenerator) -> Self {
        Self { db, codes }
    }

    #[instrument(skip(self, dto), fields(name = %dto.name))]
    pub async fn create(&self, dto: CreateMaterialDto) -> Result<material::Model, ServiceError> {
        dto.validate()?;
        let db = self.db.as_ref();
        ensure_exists::<origin::Entity, _>(db, dto.origin_id, "Origin").await?;

        let code = match dto.code {
            Some(code) => code.trim().to_string(),
            None => self.codes.generate_material_code(dto.material_type).await?,
        };
        let now = Utc::now();
        let created = material::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(dto.name.trim().to_string()),
            code: Set(code),
            quantity: Set(dto.quantity),
            unit: Set(dto.unit),
            origin_id: Set(dto.origin_id),
            is_active: Set(dto.is_active.unwrap_or(true)),
            material_type: Set(dto.material_type),
            status: Set(dto.status.unwrap_or_else(|| status_for_quantity(dto.quantity))),
            description: Set(dto.description),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(db)
        .await?;

        info!(material_id = %created.id, code = %created.code, "material created");
        Ok(created)
    }

    pub async fn get(&self, id: Uuid) -> Result<material::Model, ServiceError> {
        material::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| ServiceError::not_found("Material", id))
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        query: &MaterialListQuery,
        page: PageRequest,
    ) -> Result<Paged<material::Model>, ServiceError> {
        let mut select = material::Entity::find();
        if let Some(material_type) = query.material_type {
            select = select.filter(material::Column::MaterialType.eq(material_type));
        }
        if let Some(is_active) = query.is_active {
            select = select.filter(material::Column::IsActive.eq(is_active));
        }
        if let Some(pattern) = like_pattern(query.search.as_deref()) {
            select = select.filter(
                Condition::any()
                    .add(material::Column::Name.like(pattern.clone()))
                    .add(material::Column::Code.like(pattern)),
            );
        }
        fetch_page(
            select.order_by_asc(material::Column::Name),
            self.db.as_ref(),
            page,
        )
        .await
    }

    #[instrument(skip(self, dto))]
    pub async fn update(
        &self,
        id: Uuid,
        dto: UpdateMaterialDto,
    ) -> Result<material::Model, ServiceError> {
        dto.validate()?;
        let current = self.get(id).await?;
        ensure_exists::<origin::Entity, _>(self.db.as_ref(), dto.origin_id, "Origin").await?;

        let mut active: material::ActiveModel = current.into();
        if let Some(name) = dto.name {
            active.name = Set(name.trim().to_string());
        }
        if let Some(quantity) = dto.quantity {
            active.quantity = Set(quantity);
            if dto.status.is_none() {
                active.status = Set(status_for_quantity(quantity));
            }
        }
        if let Some(unit) = dto.unit {
            active.unit = Set(unit);
        }
        if dto.origin_id.is_some() {
            active.origin_id = Set(dto.origin_id);
        }
        if let Some(material_type) = dto.material_type {
            active.material_type = Set(material_type);
        }
        if let Some(status) = dto.status {
            active.status = Set(status);
        }
        if let Some(is_active) = dto.is_active {
            active.is_active = Set(is_active);
        }
        if let Some(description) = dto.description {
            active.description = Set(Some(description));
        }
        active.updated_at = Set(Utc::now());
        Ok(active.update(self.db.as_ref()).await?)
    }

    /// Refused while any request still lists the material.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        let db = self.db.as_ref();
        self.get(id).await?;
        let in_use = request_material::Entity::find()
            .filter(request_material::Column::MaterialId.eq(id))
            .count(db)
            .await?;
        if in_use > 0 {
            return Err(ServiceError::Conflict(format!(
                "material {} is used by {} request line(s)",
                id, in_use
            )));
        }
        material::Entity::delete_by_id(id).exec(db).await?;
        info!(material_id = %id, "material deleted");
        Ok(())
    }

    pub async fn list_origins(
        &self,
        query: &SearchQuery,
        page: PageRequest,
    ) -> Result<Paged<origin::Model>, ServiceError> {
        let mut select = origin::Entity::find();
        if let Some(pattern) = like_pattern(query.search.as_deref()) {
            select = select.filter(origin::Column::Name.like(pattern));
        }
        fetch_page(
            select.order_by_asc(origin::Column::Name),
            self.db.as_ref(),
            page,
        )
        .await
    }

    #[instrument(skip(self, dto), fields(name = %dto.name))]
    pub async fn create_origin(&self, dto: CreateOriginDto) -> Result<origin::Model, ServiceError> {
        dto.validate()?;
        Ok(origin::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(dto.name.trim().to_string()),
            country: Set(dto.country),
        }
        .insert(self.db.as_ref())
        .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_stock_is_out_of_stock() {
        assert_eq!(status_for_quantity(0), MaterialStatus::OutOfStock);
        assert_eq!(status_for_quantity(3), MaterialStatus::Available);
    }
}
