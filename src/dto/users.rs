use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::auth::{password, Role};

fn validate_password(value: &str) -> Result<(), ValidationError> {
    password::check_strength(value).map_err(|e| {
        let mut err = ValidationError::new("weak_password");
        err.message = Some(e.to_string().into());
        err
    })
}

fn validate_username(value: &str) -> Result<(), ValidationError> {
    if value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.' || c == '-')
    {
        Ok(())
    } else {
        Err(ValidationError::new("username_charset"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginDto {
    /// Email or username.
    #[serde(alias = "email", alias = "username")]
    #[validate(length(min = 1, max = 255))]
    pub identifier: String,
    #[validate(length(min = 1, max = 128))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SignupDto {
    #[validate(length(min = 3, max = 64), custom = "validate_username")]
    pub username: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 255))]
    pub full_name: String,
    #[validate(custom = "validate_password")]
    pub password: String,
    pub department_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ForgotPasswordDto {
    #[validate(email)]
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateUserDto {
    #[validate(length(min = 3, max = 64), custom = "validate_username")]
    pub username: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 255))]
    pub full_name: String,
    #[validate(custom = "validate_password")]
    pub password: String,
    pub role: Option<Role>,
    pub department_id: Option<Uuid>,
    #[serde(default)]
    pub is_verified: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateUserDto {
    #[validate(length(min = 1, max = 255))]
    pub full_name: Option<String>,
    pub department_id: Option<Uuid>,
    pub is_active: Option<bool>,
    #[validate(custom = "validate_password")]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyUserDto {
    pub is_verified: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeRoleDto {
    pub role: Role,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub role: Option<Role>,
    pub department_id: Option<Uuid>,
    pub is_verified: Option<bool>,
    pub search: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_accepts_email_or_username_keys() {
        let by_email: LoginDto =
            serde_json::from_value(serde_json::json!({"email": "a@b.io", "password": "x"}))
                .unwrap();
        let by_name: LoginDto =
            serde_json::from_value(serde_json::json!({"username": "ops", "password": "x"}))
                .unwrap();
        assert_eq!(by_email.identifier, "a@b.io");
        assert_eq!(by_name.identifier, "ops");
    }

    #[test]
    fn signup_rejects_weak_password_and_bad_username() {
        let dto = SignupDto {
            username: "bad name".into(),
            email: "new@example.com".into(),
            full_name: "New".into(),
            password: "short".into(),
            department_id: None,
        };
        let errors = dto.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("username"));
        assert!(fields.contains_key("password"));
    }
}
