use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, TransactionTrait,
};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

use super::{ensure_exists, fetch_page, like_pattern, PageRequest, Paged};
use crate::{
    auth::{password, user, user_session, AuthError, AuthUser, Role},
    dto::users::{
        ChangeRoleDto, CreateUserDto, SignupDto, UpdateUserDto, UserListQuery, VerifyUserDto,
    },
    entities::department,
    errors::ServiceError,
};

fn hash(raw: &str) -> Result<String, ServiceError> {
    password::hash_password(raw).map_err(|e| ServiceError::HashError(e.to_string()))
}

/// Granting or taking away SUPER_ADMIN needs SUPER_ADMIN.
fn check_role_grant(actor: Role, current: Option<Role>, requested: Role) -> Result<(), ServiceError> {
    let touches_super = requested == Role::SuperAdmin || current == Some(Role::SuperAdmin);
    if touches_super && actor != Role::SuperAdmin {
        return Err(AuthError::InsufficientRole.into());
    }
    Ok(())
}

struct NewUser {
    username: String,
    email: String,
    full_name: String,
    password: String,
    role: Role,
    department_id: Option<Uuid>,
    is_verified: bool,
}

/// User accounts: self-service signup plus admin management.
#[derive(Clone)]
pub struct UserService {
    db: Arc<DatabaseConnection>,
}

impl UserService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    async fn insert(&self, new: NewUser) -> Result<user::Model, ServiceError> {
        let db = self.db.as_ref();
        ensure_exists::<department::Entity, _>(db, new.department_id, "Department").await?;

        let email = new.email.trim().to_lowercase();
        let taken = user::Entity::find()
            .filter(
                Condition::any()
                    .add(user::Column::Email.eq(email.clone()))
                    .add(user::Column::Username.eq(new.username.trim())),
            )
            .one(db)
            .await?;
        if taken.is_some() {
            return Err(ServiceError::Conflict(
                "email or username already registered".to_string(),
            ));
        }

        let now = Utc::now();
        let created = user::ActiveModel {
            id: Set(Uuid::new_v4()),
            username: Set(new.username.trim().to_string()),
            email: Set(email),
            full_name: Set(new.full_name.trim().to_string()),
            password_hash: Set(hash(&new.password)?),
            role: Set(new.role),
            department_id: Set(new.department_id),
            is_active: Set(true),
            is_verified: Set(new.is_verified),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(db)
        .await?;
        info!(user_id = %created.id, role = %created.role, "user created");
        Ok(created)
    }

    /// Creates an unverified USER account.
    #[instrument(skip(self, dto), fields(username = %dto.username))]
    pub async fn signup(&self, dto: SignupDto) -> Result<user::Model, ServiceError> {
        dto.validate()?;
        self.insert(NewUser {
            username: dto.username,
            email: dto.email,
            full_name: dto.full_name,
            password: dto.password,
            role: Role::User,
            department_id: dto.department_id,
            is_verified: false,
        })
        .await
    }

    #[instrument(skip(self, dto, actor), fields(username = %dto.username, actor = %actor.user_id))]
    pub async fn create(
        &self,
        dto: CreateUserDto,
        actor: &AuthUser,
    ) -> Result<user::Model, ServiceError> {
        dto.validate()?;
        let role = dto.role.unwrap_or(Role::User);
        check_role_grant(actor.role, None, role)?;
        self.insert(NewUser {
            username: dto.username,
            email: dto.email,
            full_name: dto.full_name,
            password: dto.password,
            role,
            department_id: dto.department_id,
            is_verified: dto.is_verified,
        })
        .await
    }

    pub async fn get(&self, id: Uuid) -> Result<user::Model, ServiceError> {
        user::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| ServiceError::not_found("User", id))
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<user::Model>, ServiceError> {
        Ok(user::Entity::find()
            .filter(user::Column::Email.eq(email.trim().to_lowercase()))
            .one(self.db.as_ref())
            .await?)
    }

    pub async fn list(
        &self,
        query: &UserListQuery,
        page: PageRequest,
    ) -> Result<Paged<user::Model>, ServiceError> {
        let mut select = user::Entity::find();
        if let Some(role) = query.role {
            select = select.filter(user::Column::Role.eq(role));
        }
        if let Some(department_id) = query.department_id {
            select = select.filter(user::Column::DepartmentId.eq(department_id));
        }
        if let Some(is_verified) = query.is_verified {
            select = select.filter(user::Column::IsVerified.eq(is_verified));
        }
        if let Some(pattern) = like_pattern(query.search.as_deref()) {
            select = select.filter(
                Condition::any()
                    .add(user::Column::Username.like(pattern.clone()))
                    .add(user::Column::Email.like(pattern.clone()))
                    .add(user::Column::FullName.like(pattern)),
            );
        }
        fetch_page(
            select.order_by_asc(user::Column::Username),
            self.db.as_ref(),
            page,
        )
        .await
    }

    /// A new password or deactivation also ends every session of the user.
    #[instrument(skip(self, dto))]
    pub async fn update(&self, id: Uuid, dto: UpdateUserDto) -> Result<user::Model, ServiceError> {
        dto.validate()?;
        let current = self.get(id).await?;
        ensure_exists::<department::Entity, _>(self.db.as_ref(), dto.department_id, "Department")
            .await?;

        let revoke = dto.password.is_some() || dto.is_active == Some(false);
        let mut active: user::ActiveModel = current.into();
        if let Some(full_name) = dto.full_name {
            active.full_name = Set(full_name.trim().to_string());
        }
        if dto.department_id.is_some() {
            active.department_id = Set(dto.department_id);
        }
        if let Some(is_active) = dto.is_active {
            active.is_active = Set(is_active);
        }
        if let Some(raw) = dto.password {
            active.password_hash = Set(hash(&raw)?);
        }
        active.updated_at = Set(Utc::now());

        let txn = self.db.begin().await?;
        let updated = active.update(&txn).await?;
        if revoke {
            let revoked = user_session::Entity::delete_many()
                .filter(user_session::Column::UserId.eq(id))
                .exec(&txn)
                .await?;
            info!(user_id = %id, revoked = revoked.rows_affected, "sessions revoked on account change");
        }
        txn.commit().await?;
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn verify(&self, id: Uuid, dto: VerifyUserDto) -> Result<user::Model, ServiceError> {
        let mut active: user::ActiveModel = self.get(id).await?.into();
        active.is_verified = Set(dto.is_verified);
        active.updated_at = Set(Utc::now());
        let updated = active.update(self.db.as_ref()).await?;
        info!(user_id = %id, verified = dto.is_verified, "user verification changed");
        Ok(updated)
    }

    #[instrument(skip(self, actor), fields(actor = %actor.user_id))]
    pub async fn change_role(
        &self,
        id: Uuid,
        dto: ChangeRoleDto,
        actor: &AuthUser,
    ) -> Result<user::Model, ServiceError> {
        let current = self.get(id).await?;
        check_role_grant(actor.role, Some(current.role), dto.role)?;
        if current.id == actor.user_id {
            return Err(ServiceError::BadRequest(
                "users cannot change their own role".to_string(),
            ));
        }

        let mut active: user::ActiveModel = current.into();
        active.role = Set(dto.role);
        active.updated_at = Set(Utc::now());
        let updated = active.update(self.db.as_ref()).await?;
        info!(user_id = %id, role = %dto.role, "role changed");
        Ok(updated)
    }

    #[instrument(skip(self, actor), fields(actor = %actor.user_id))]
    pub async fn delete(&self, id: Uuid, actor: &AuthUser) -> Result<(), ServiceError> {
        if id == actor.user_id {
            return Err(ServiceError::BadRequest(
                "users cannot delete themselves".to_string(),
            ));
        }
        let target = self.get(id).await?;
        check_role_grant(actor.role, Some(target.role), target.role)?;
        user::Entity::delete_by_id(id)
            .exec(self.db.as_ref())
            .await?;
        warn!(user_id = %id, "user deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn only_super_admin_grants_super_admin() {
        assert_matches!(
            check_role_grant(Role::Admin, Some(Role::User), Role::SuperAdmin),
            Err(ServiceError::Auth(AuthError::InsufficientRole))
        );
        assert!(check_role_grant(Role::SuperAdmin, Some(Role::User), Role::SuperAdmin).is_ok());
        assert!(check_role_grant(Role::Admin, Some(Role::User), Role::Admin).is_ok());
    }

    #[test]
    fn admins_cannot_demote_super_admins() {
        assert_matches!(
            check_role_grant(Role::Admin, Some(Role::SuperAdmin), Role::User),
            Err(ServiceError::Auth(AuthError::InsufficientRole))
        );
    }
}
