/*!
 * # Authentication and Authorization Module
 *
 * Bearer tokens are HS256 JWTs, but a valid signature is only a pre-filter:
 * every token must also match a live row in `user_sessions`, keyed by the
 * SHA-256 of the token. Issuing a token replaces all earlier sessions of the
 * user, so at most one token per user is accepted at any time.
 *
 * Authorization uses the ordered [`Role`] ladder (see [`rbac`]).
 */

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::errors::ServiceError;

// Entity modules
pub mod user;
pub mod user_session;

pub mod password;
pub mod rbac;

pub use rbac::Role;

/// Claim structure for access tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user id
    pub role: Role,
    pub jti: String, // unique per issuance so token hashes never collide
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
}

/// Authenticated caller, inserted into request extensions by [`auth_middleware`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub session_id: Uuid,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or(AuthError::MissingHeader)
    }
}

/// Authentication configuration
#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub token_ttl: ChronoDuration,
}

impl AuthConfig {
    pub fn new(jwt_secret: String, jwt_issuer: String, token_ttl: ChronoDuration) -> Self {
        Self {
            jwt_secret,
            jwt_issuer,
            token_ttl,
        }
    }
}

impl From<&AppConfig> for AuthConfig {
    fn from(cfg: &AppConfig) -> Self {
        Self::new(
            cfg.jwt_secret.clone(),
            cfg.auth_issuer.clone(),
            ChronoDuration::seconds(cfg.jwt_expiration as i64),
        )
    }
}

/// A freshly issued bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuedToken {
    pub access_token: String,
    pub token_type: String,
    pub expires_at: DateTime<Utc>,
    pub expires_in: i64,
}

/// Hex SHA-256 of a bearer token, the lookup key of `user_sessions`.
pub fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// Splits an `Authorization` header value into its bearer token. The scheme
/// is matched case-insensitively.
pub fn parse_bearer(value: &str) -> Result<&str, AuthError> {
    let (scheme, token) = value
        .trim()
        .split_once(char::is_whitespace)
        .ok_or(AuthError::MalformedHeader)?;
    let token = token.trim();
    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return Err(AuthError::MalformedHeader);
    }
    Ok(token)
}

/// Authentication service that issues, verifies and revokes sessions
#[derive(Debug, Clone)]
pub struct AuthService {
    pub config: AuthConfig,
    pub db: Arc<DatabaseConnection>,
}

impl AuthService {
    pub fn new(config: AuthConfig, db: Arc<DatabaseConnection>) -> Self {
        Self { config, db }
    }

    fn sign(
        &self,
        user: &user::Model,
        now: DateTime<Utc>,
    ) -> Result<(String, DateTime<Utc>), AuthError> {
        let expires_at = now + self.config.token_ttl;
        let claims = Claims {
            sub: user.id.to_string(),
            role: user.role,
            jti: Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            iss: self.config.jwt_issuer.clone(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )
        .map_err(|e| AuthError::TokenCreation(e.to_string()))?;
        Ok((token, expires_at))
    }

    /// Signs a token and makes it the user's only live session.
    #[instrument(skip(self, user), fields(user_id = %user.id))]
    pub async fn issue_session(
        &self,
        user: &user::Model,
        user_agent: Option<String>,
    ) -> Result<IssuedToken, AuthError> {
        let now = Utc::now();
        let (token, expires_at) = self.sign(user, now)?;

        let txn = self.db.begin().await?;
        let revoked = user_session::Entity::delete_many()
            .filter(user_session::Column::UserId.eq(user.id))
            .exec(&txn)
            .await?
            .rows_affected;
        user_session::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user.id),
            token_hash: Set(hash_token(&token)),
            expires_at: Set(expires_at),
            user_agent: Set(user_agent),
            created_at: Set(now),
        }
        .insert(&txn)
        .await?;
        txn.commit().await?;

        info!(revoked, "session issued");
        metrics::counter!("mfg_auth.sessions_issued", 1);

        Ok(IssuedToken {
            access_token: token,
            token_type: "Bearer".to_string(),
            expires_at,
            expires_in: (expires_at - now).num_seconds(),
        })
    }

    /// Signature and expiry check only.
    pub fn decode_token(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_issuer(&[self.config.jwt_issuer.as_str()]);

        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::InvalidSignature,
        })
    }

    /// Full verification of an `Authorization` header value.
    pub async fn authenticate(&self, header_value: Option<&str>) -> Result<AuthUser, AuthError> {
        let value = header_value.ok_or(AuthError::MissingHeader)?;
        let token = parse_bearer(value)?;
        let claims = self.decode_token(token)?;
        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| AuthError::InvalidSignature)?;

        let session = user_session::Entity::find()
            .filter(user_session::Column::TokenHash.eq(hash_token(token)))
            .filter(user_session::Column::ExpiresAt.gt(Utc::now()))
            .one(self.db.as_ref())
            .await?
            .filter(|s| s.user_id == user_id)
            .ok_or(AuthError::SessionRevoked)?;

        let user = user::Entity::find_by_id(user_id)
            .one(self.db.as_ref())
            .await?
            .ok_or(AuthError::SessionRevoked)?;
        if !user.is_active {
            return Err(AuthError::AccountDisabled);
        }
        if !user.is_verified {
            return Err(AuthError::UnverifiedAccount);
        }

        Ok(AuthUser {
            user_id: user.id,
            username: user.username,
            email: user.email,
            role: user.role,
            session_id: session.id,
        })
    }

    /// Password login by email or username.
    #[instrument(skip(self, password, user_agent))]
    pub async fn login(
        &self,
        identifier: &str,
        password: &str,
        user_agent: Option<String>,
    ) -> Result<(IssuedToken, user::Model), AuthError> {
        let identifier = identifier.trim();
        let user = user::Entity::find()
            .filter(
                Condition::any()
                    .add(user::Column::Email.eq(identifier.to_lowercase()))
                    .add(user::Column::Username.eq(identifier)),
            )
            .one(self.db.as_ref())
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !password::verify_password(password, &user.password_hash) || !user.is_active {
            warn!(user_id = %user.id, "login rejected");
            return Err(AuthError::InvalidCredentials);
        }
        if !user.is_verified {
            return Err(AuthError::UnverifiedAccount);
        }

        let token = self.issue_session(&user, user_agent).await?;
        Ok((token, user))
    }

    /// Revokes the session the caller authenticated with.
    pub async fn logout(&self, auth_user: &AuthUser) -> Result<(), AuthError> {
        user_session::Entity::delete_by_id(auth_user.session_id)
            .exec(self.db.as_ref())
            .await?;
        debug!(user_id = %auth_user.user_id, "session revoked");
        Ok(())
    }

    /// Revokes every session of the user. Returns how many were removed.
    pub async fn logout_all(&self, user_id: Uuid) -> Result<u64, AuthError> {
        let result = user_session::Entity::delete_many()
            .filter(user_session::Column::UserId.eq(user_id))
            .exec(self.db.as_ref())
            .await?;
        info!(%user_id, revoked = result.rows_affected, "all sessions revoked");
        Ok(result.rows_affected)
    }
}

/// Authentication error types
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Authorization header is missing")]
    MissingHeader,

    #[error("Authorization header must be 'Bearer <token>'")]
    MalformedHeader,

    #[error("Token has expired")]
    TokenExpired,

    #[error("Token signature is invalid")]
    InvalidSignature,

    #[error("Session has been revoked or has expired")]
    SessionRevoked,

    #[error("Account is disabled")]
    AccountDisabled,

    #[error("Account has not been verified")]
    UnverifiedAccount,

    #[error("Insufficient role for this operation")]
    InsufficientRole,

    #[error("invalid email/username or password")]
    InvalidCredentials,

    #[error("Token creation failed: {0}")]
    TokenCreation(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<DbErr> for AuthError {
    fn from(err: DbErr) -> Self {
        AuthError::DatabaseError(err.to_string())
    }
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingHeader
            | Self::MalformedHeader
            | Self::TokenExpired
            | Self::InvalidSignature
            | Self::SessionRevoked
            | Self::AccountDisabled
            | Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::UnverifiedAccount => StatusCode::BAD_REQUEST,
            Self::InsufficientRole => StatusCode::FORBIDDEN,
            Self::TokenCreation(_) | Self::DatabaseError(_) | Self::InternalError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::MissingHeader => "AUTH_MISSING_HEADER",
            Self::MalformedHeader => "AUTH_MALFORMED_HEADER",
            Self::TokenExpired => "AUTH_TOKEN_EXPIRED",
            Self::InvalidSignature => "AUTH_INVALID_SIGNATURE",
            Self::SessionRevoked => "AUTH_SESSION_REVOKED",
            Self::AccountDisabled => "AUTH_ACCOUNT_DISABLED",
            Self::UnverifiedAccount => "AUTH_UNVERIFIED_ACCOUNT",
            Self::InsufficientRole => "AUTH_INSUFFICIENT_ROLE",
            Self::InvalidCredentials => "AUTH_INVALID_CREDENTIALS",
            Self::TokenCreation(_) => "AUTH_TOKEN_CREATION_FAILED",
            Self::DatabaseError(_) => "AUTH_DATABASE_ERROR",
            Self::InternalError(_) => "AUTH_INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        ServiceError::Auth(self).into_response()
    }
}

/// Authentication middleware that verifies the bearer token against the session store
pub async fn auth_middleware(mut request: Request, next: Next) -> Response {
    let auth_service = match request.extensions().get::<Arc<AuthService>>() {
        Some(service) => service.clone(),
        None => {
            return AuthError::InternalError("Authentication service not available".into())
                .into_response();
        }
    };

    let header_value = request
        .headers()
        .get(header::AUTHORIZATION)
        .map(|raw| raw.to_str().map(str::to_owned));

    let result = match header_value {
        None => auth_service.authenticate(None).await,
        Some(Ok(value)) => auth_service.authenticate(Some(&value)).await,
        Some(Err(_)) => Err(AuthError::MalformedHeader),
    };

    match result {
        Ok(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(e) => {
            debug!(code = e.error_code(), "authentication failed");
            e.into_response()
        }
    }
}

/// Role middleware admitting callers whose rank reaches the lowest accepted role
pub async fn role_middleware(
    State(accepted): State<Arc<[Role]>>,
    request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let user = request
        .extensions()
        .get::<AuthUser>()
        .ok_or(AuthError::MissingHeader)?;

    if !user.role.satisfies(&accepted) {
        return Err(AuthError::InsufficientRole);
    }

    Ok(next.run(request).await)
}

/// Extension methods for Router to add auth middleware
pub trait AuthRouterExt {
    fn with_auth(self) -> Self;
    fn with_roles(self, roles: &[Role]) -> Self;
}

impl<S> AuthRouterExt for axum::Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_auth(self) -> Self {
        self.layer(axum::middleware::from_fn(auth_middleware))
    }

    fn with_roles(self, roles: &[Role]) -> Self {
        let accepted: Arc<[Role]> = Arc::from(roles);
        self.layer(axum::middleware::from_fn_with_state(
            accepted,
            role_middleware,
        ))
        .with_auth()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn service_with_ttl(ttl: ChronoDuration) -> AuthService {
        let db = DatabaseConnection::Disconnected;
        AuthService::new(
            AuthConfig::new("k".repeat(64), "mfg-test".into(), ttl),
            Arc::new(db),
        )
    }

    fn sample_user() -> user::Model {
        let now = Utc::now();
        user::Model {
            id: Uuid::new_v4(),
            username: "ops".into(),
            email: "ops@example.com".into(),
            full_name: "Ops".into(),
            password_hash: String::new(),
            role: Role::Admin,
            department_id: None,
            is_active: true,
            is_verified: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn bearer_scheme_is_case_insensitive() {
        assert_eq!(parse_bearer("Bearer abc").unwrap(), "abc");
        assert_eq!(parse_bearer("bearer abc").unwrap(), "abc");
        assert_eq!(parse_bearer("BEARER   abc ").unwrap(), "abc");
    }

    #[test]
    fn malformed_headers_are_rejected() {
        assert_matches!(parse_bearer("Bearer"), Err(AuthError::MalformedHeader));
        assert_matches!(parse_bearer("Bearer    "), Err(AuthError::MalformedHeader));
        assert_matches!(parse_bearer("Basic abc"), Err(AuthError::MalformedHeader));
        assert_matches!(parse_bearer(""), Err(AuthError::MalformedHeader));
    }

    #[test]
    fn signed_token_decodes() {
        let service = service_with_ttl(ChronoDuration::minutes(5));
        let user = sample_user();
        let (token, _) = service.sign(&user, Utc::now()).unwrap();
        let claims = service.decode_token(&token).unwrap();
        assert_eq!(claims.sub, user.id.to_string());
        assert_eq!(claims.role, Role::Admin);
    }

    #[test]
    fn expired_token_is_reported_as_expired() {
        let service = service_with_ttl(ChronoDuration::minutes(5));
        let (token, _) = service
            .sign(&sample_user(), Utc::now() - ChronoDuration::hours(1))
            .unwrap();
        assert_matches!(service.decode_token(&token), Err(AuthError::TokenExpired));
    }

    #[test]
    fn foreign_signature_is_rejected() {
        let service = service_with_ttl(ChronoDuration::minutes(5));
        let other = AuthService::new(
            AuthConfig::new("z".repeat(64), "mfg-test".into(), ChronoDuration::minutes(5)),
            Arc::new(DatabaseConnection::Disconnected),
        );
        let (token, _) = other.sign(&sample_user(), Utc::now()).unwrap();
        assert_matches!(service.decode_token(&token), Err(AuthError::InvalidSignature));
    }

    #[test]
    fn tokens_hash_differently_per_issuance() {
        let service = service_with_ttl(ChronoDuration::minutes(5));
        let user = sample_user();
        let now = Utc::now();
        let (a, _) = service.sign(&user, now).unwrap();
        let (b, _) = service.sign(&user, now).unwrap();
        assert_ne!(hash_token(&a), hash_token(&b));
        assert_eq!(hash_token(&a).len(), 64);
    }

    #[tokio::test]
    async fn missing_header_fails_first() {
        let service = service_with_ttl(ChronoDuration::minutes(5));
        assert_matches!(
            service.authenticate(None).await,
            Err(AuthError::MissingHeader)
        );
    }

    #[test]
    fn error_codes_and_statuses() {
        assert_eq!(AuthError::UnverifiedAccount.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AuthError::InsufficientRole.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            AuthError::InvalidCredentials.to_string(),
            "invalid email/username or password"
        );
        assert_eq!(AuthError::SessionRevoked.error_code(), "AUTH_SESSION_REVOKED");
    }
}
