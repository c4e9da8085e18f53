pub mod code_generator;
pub mod customers;
pub mod departments;
pub mod material_validator;
pub mod materials;
pub mod notifications;
pub mod procedures;
pub mod requests;
pub mod source_others;
pub mod uploads;
pub mod users;

use sea_orm::{
    ConnectionTrait, DatabaseConnection, EntityTrait, PaginatorTrait, PrimaryKeyTrait, Select,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::{AuthConfig, AuthService};
use crate::config::AppConfig;
use crate::errors::ServiceError;
use crate::message_queue::MessageQueue;
use crate::notifications::MailDispatcher;
use code_generator::{CodeGenerator, CounterStore};

/// One page of a list, 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub limit: u64,
}

impl PageRequest {
    pub fn new(page: Option<u64>, limit: u64) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit.max(1),
        }
    }

    pub fn from_config(cfg: &AppConfig, page: Option<u64>, limit: Option<u64>) -> Self {
        Self::new(page, cfg.page_limit(limit))
    }
}

#[derive(Debug, Clone)]
pub struct Paged<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
}

impl<T> Paged<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paged<U> {
        Paged {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            limit: self.limit,
        }
    }
}

pub async fn fetch_page<E>(
    select: Select<E>,
    db: &DatabaseConnection,
    page: PageRequest,
) -> Result<Paged<E::Model>, ServiceError>
where
    E: EntityTrait,
    E::Model: Sync,
{
    let paginator = select.paginate(db, page.limit);
    let total = paginator.num_items().await?;
    let items = paginator.fetch_page(page.page - 1).await?;
    Ok(Paged {
        items,
        total,
        page: page.page,
        limit: page.limit,
    })
}

/// `Ok` when `id` is absent or names an existing row of `E`.
pub async fn ensure_exists<E, C>(conn: &C, id: Option<Uuid>, label: &str) -> Result<(), ServiceError>
where
    E: EntityTrait,
    C: ConnectionTrait,
    <E::PrimaryKey as PrimaryKeyTrait>::ValueType: From<Uuid>,
{
    let Some(id) = id else {
        return Ok(());
    };
    E::find_by_id(id)
        .one(conn)
        .await?
        .map(|_| ())
        .ok_or_else(|| ServiceError::not_found(label, id))
}

/// `%term%` for LIKE filters, or `None` for a blank term.
pub(crate) fn like_pattern(term: Option<&str>) -> Option<String> {
    term.map(str::trim)
        .filter(|t| !t.is_empty())
        .map(|t| format!("%{}%", t))
}

/// All services, built once at startup and shared through the app state.
#[derive(Clone)]
pub struct AppServices {
    pub auth: Arc<AuthService>,
    pub mail: MailDispatcher,
    pub requests: requests::RequestService,
    pub materials: materials::MaterialService,
    pub customers: customers::CustomerService,
    pub source_others: source_others::SourceOtherService,
    pub departments: departments::DepartmentService,
    pub users: users::UserService,
    pub procedures: procedures::ProcedureService,
    pub notifications: notifications::NotificationService,
    pub uploads: uploads::UploadStorage,
}

impl AppServices {
    /// Wires every service over one pool, counter store and job queue.
    pub fn new(
        db: Arc<DatabaseConnection>,
        config: &AppConfig,
        counters: Arc<dyn CounterStore>,
        queue: Arc<dyn MessageQueue>,
    ) -> Self {
        let codes = CodeGenerator::new(counters);
        Self {
            auth: Arc::new(AuthService::new(AuthConfig::from(config), db.clone())),
            mail: MailDispatcher::new(queue),
            requests: requests::RequestService::new(
                db.clone(),
                codes.clone(),
                config.reservation_mode(),
            ),
            materials: materials::MaterialService::new(db.clone(), codes),
            customers: customers::CustomerService::new(db.clone()),
            source_others: source_others::SourceOtherService::new(db.clone()),
            departments: departments::DepartmentService::new(db.clone()),
            users: users::UserService::new(db.clone()),
            procedures: procedures::ProcedureService::new(db.clone()),
            notifications: notifications::NotificationService::new(db),
            uploads: uploads::UploadStorage::new(config.upload_path(), config.max_upload_bytes),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_request_floors_at_one() {
        assert_eq!(PageRequest::new(None, 20), PageRequest { page: 1, limit: 20 });
        assert_eq!(PageRequest::new(Some(0), 0), PageRequest { page: 1, limit: 1 });
    }

    #[test]
    fn like_pattern_ignores_blank_terms() {
        assert_eq!(like_pattern(Some(" bolt ")), Some("%bolt%".to_string()));
        assert_eq!(like_pattern(Some("   ")), None);
        assert_eq!(like_pattern(None), None);
    }
}
