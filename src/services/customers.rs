use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder,
};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use super::{fetch_page, like_pattern, PageRequest, Paged};
use crate::{
    dto::directory::{CreateCustomerDto, SearchQuery, UpdateCustomerDto},
    entities::{customer, request},
    errors::ServiceError,
};

fn normalize_email(email: Option<String>) -> Option<String> {
    email
        .map(|e| e.trim().to_lowercase())
        .filter(|e| !e.is_empty())
}

#[derive(Clone)]
pub struct CustomerService {
    db: Arc<DatabaseConnection>,
}

impl CustomerService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self, dto), fields(name = %dto.name))]
    pub async fn create(&self, dto: CreateCustomerDto) -> Result<customer::Model, ServiceError> {
        dto.validate()?;
        let now = Utc::now();
        let created = customer::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(dto.name.trim().to_string()),
            email: Set(normalize_email(dto.email)),
            phone: Set(dto.phone),
            address: Set(dto.address),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(self.db.as_ref())
        .await?;
        info!(customer_id = %created.id, "customer created");
        Ok(created)
    }

    pub async fn get(&self, id: Uuid) -> Result<customer::Model, ServiceError> {
        customer::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| ServiceError::not_found("Customer", id))
    }

    pub async fn list(
        &self,
        query: &SearchQuery,
        page: PageRequest,
    ) -> Result<Paged<customer::Model>, ServiceError> {
        let mut select = customer::Entity::find();
        if let Some(pattern) = like_pattern(query.search.as_deref()) {
            select = select.filter(
                Condition::any()
                    .add(customer::Column::Name.like(pattern.clone()))
                    .add(customer::Column::Email.like(pattern.clone()))
                    .add(customer::Column::Phone.like(pattern)),
            );
        }
        fetch_page(
            select.order_by_asc(customer::Column::Name),
            self.db.as_ref(),
            page,
        )
        .await
    }

    #[instrument(skip(self, dto))]
    pub async fn update(
        &self,
        id: Uuid,
        dto: UpdateCustomerDto,
    ) -> Result<customer::Model, ServiceError> {
        dto.validate()?;
        let mut active: customer::ActiveModel = self.get(id).await?.into();
        if let Some(name) = dto.name {
            active.name = Set(name.trim().to_string());
        }
        if dto.email.is_some() {
            active.email = Set(normalize_email(dto.email));
        }
        if let Some(phone) = dto.phone {
            active.phone = Set(Some(phone));
        }
        if let Some(address) = dto.address {
            active.address = Set(Some(address));
        }
        active.updated_at = Set(Utc::now());
        Ok(active.update(self.db.as_ref()).await?)
    }

    /// Refused while requests reference the customer.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        let db = self.db.as_ref();
        self.get(id).await?;
        let referenced = request::Entity::find()
            .filter(request::Column::CustomerId.eq(id))
            .count(db)
            .await?;
        if referenced > 0 {
            return Err(ServiceError::Conflict(format!(
                "customer {} is referenced by {} request(s)",
                id, referenced
            )));
        }
        customer::Entity::delete_by_id(id).exec(db).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emails_are_stored_lowercase() {
        assert_eq!(
            normalize_email(Some(" Buyer@Example.COM ".into())),
            Some("buyer@example.com".into())
        );
        assert_eq!(normalize_email(Some("  ".into())), None);
    }
}
