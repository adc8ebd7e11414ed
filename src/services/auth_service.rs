//! Authentication service - login, token refresh and verification.
//!
//! There is no open registration: accounts are provisioned by
//! MANAGEMENT through the user service.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::{
    Config, SECONDS_PER_HOUR, TOKEN_KIND_ACCESS, TOKEN_KIND_REFRESH, TOKEN_TYPE_BEARER,
};
use crate::domain::{Password, RowFilter, User};
use crate::errors::{AppError, AppResult};
use crate::infra::UnitOfWork;

/// JWT claims payload. `kind` distinguishes access from refresh tokens
/// so a refresh token can never be used to call protected endpoints.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub username: String,
    pub role: String,
    pub kind: String,
    pub exp: i64,
    pub iat: i64,
}

/// Response to a successful login: both tokens.
#[derive(Debug, Serialize, ToSchema)]
pub struct TokenPair {
    /// Short-lived JWT for API calls
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub access_token: String,
    /// Long-lived JWT accepted only by the refresh endpoint
    pub refresh_token: String,
    /// Token type (always "Bearer")
    #[schema(example = "Bearer")]
    pub token_type: String,
    /// Access token lifetime in seconds
    #[schema(example = 28800)]
    pub expires_in: i64,
}

/// Response to a successful refresh: a fresh access token.
#[derive(Debug, Serialize, ToSchema)]
pub struct TokenResponse {
    pub access_token: String,
    #[schema(example = "Bearer")]
    pub token_type: String,
    pub expires_in: i64,
}

/// Authentication service trait for dependency injection.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Check credentials and return an access/refresh token pair.
    async fn login(&self, username: String, password: String) -> AppResult<TokenPair>;

    /// Exchange a valid refresh token for a new access token.
    async fn refresh(&self, refresh_token: String) -> AppResult<TokenResponse>;

    /// Verify a JWT signature and expiry, returning its claims.
    fn verify_token(&self, token: &str) -> AppResult<Claims>;
}

fn encode_token(user: &User, kind: &str, hours: i64, config: &Config) -> AppResult<String> {
    let now = Utc::now();
    let claims = Claims {
        sub: user.id,
        username: user.username.clone(),
        role: user.role.to_string(),
        kind: kind.to_string(),
        exp: (now + Duration::hours(hours)).timestamp(),
        iat: now.timestamp(),
    };

    Ok(encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret_bytes()),
    )?)
}

fn decode_token(token: &str, config: &Config) -> AppResult<Claims> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret_bytes()),
        &Validation::default(),
    )?;

    Ok(token_data.claims)
}

/// Concrete implementation of AuthService using Unit of Work.
pub struct Authenticator<U: UnitOfWork> {
    uow: Arc<U>,
    config: Config,
}

impl<U: UnitOfWork> Authenticator<U> {
    pub fn new(uow: Arc<U>, config: Config) -> Self {
        Self { uow, config }
    }
}

#[async_trait]
impl<U: UnitOfWork> AuthService for Authenticator<U> {
    async fn login(&self, username: String, password: String) -> AppResult<TokenPair> {
        let user_result = self.uow.users().find_by_username(&username).await?;

        // Verify against a dummy hash when the user is unknown so the
        // timing of the response does not reveal which usernames exist.
        let dummy_hash =
            "$argon2id$v=19$m=19456,t=2,p=1$dummysalt123456$dummyhash1234567890123456789012";

        let password_hash = user_result
            .as_ref()
            .map(|user| user.password_hash.as_str())
            .unwrap_or(dummy_hash);

        let stored_password = Password::from_hash(password_hash.to_string());
        let password_valid = stored_password.verify(&password);

        let user = match &user_result {
            Some(user) if password_valid => user,
            _ => return Err(AppError::InvalidCredentials),
        };
        Ok(TokenPair {
            access_token: encode_token(
                user,
                TOKEN_KIND_ACCESS,
                self.config.access_token_hours,
                &self.config,
            )?,
            refresh_token: encode_token(
                user,
                TOKEN_KIND_REFRESH,
                self.config.refresh_token_hours,
                &self.config,
            )?,
            token_type: TOKEN_TYPE_BEARER.to_string(),
            expires_in: self.config.access_token_hours * SECONDS_PER_HOUR,
        })
    }

    async fn refresh(&self, refresh_token: String) -> AppResult<TokenResponse> {
        let claims = decode_token(&refresh_token, &self.config)?;
        if claims.kind != TOKEN_KIND_REFRESH {
            return Err(AppError::Unauthorized);
        }

        // Re-load the account so revoked users and role changes take
        // effect at refresh time.
        let user = self
            .uow
            .users()
            .find_by_id(&RowFilter::All, claims.sub)
            .await?
            .ok_or(AppError::Unauthorized)?;

        Ok(TokenResponse {
            access_token: encode_token(
                &user,
                TOKEN_KIND_ACCESS,
                self.config.access_token_hours,
                &self.config,
            )?,
            token_type: TOKEN_TYPE_BEARER.to_string(),
            expires_in: self.config.access_token_hours * SECONDS_PER_HOUR,
        })
    }

    fn verify_token(&self, token: &str) -> AppResult<Claims> {
        decode_token(token, &self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Role;
    use crate::infra::repositories::MockUserRepository;
    use crate::services::test_support::TestUow;

    fn sample_user(password: &str) -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            username: "alice.dupont".to_string(),
            email: "alice@example.com".to_string(),
            password_hash: Password::new(password).unwrap().into_string(),
            role: Role::Sales,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn login_returns_access_and_refresh_tokens() {
        let user = sample_user("correct horse battery");
        let mut users = MockUserRepository::new();
        let returned = user.clone();
        users
            .expect_find_by_username()
            .returning(move |_| Ok(Some(returned.clone())));

        let mut uow = TestUow::new();
        uow.users = Arc::new(users);

        let auth = Authenticator::new(Arc::new(uow), Config::for_tests());
        let pair = auth
            .login("alice.dupont".into(), "correct horse battery".into())
            .await
            .unwrap();

        let access = auth.verify_token(&pair.access_token).unwrap();
        assert_eq!(access.kind, TOKEN_KIND_ACCESS);
        assert_eq!(access.sub, user.id);
        assert_eq!(access.role, "SALES");

        let refresh = auth.verify_token(&pair.refresh_token).unwrap();
        assert_eq!(refresh.kind, TOKEN_KIND_REFRESH);
    }

    #[tokio::test]
    async fn login_rejects_wrong_password_and_unknown_user_alike() {
        let user = sample_user("right-password");
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_username()
            .returning(move |username: &str| {
                if username == "alice.dupont" {
                    Ok(Some(user.clone()))
                } else {
                    Ok(None)
                }
            });

        let mut uow = TestUow::new();
        uow.users = Arc::new(users);
        let auth = Authenticator::new(Arc::new(uow), Config::for_tests());

        let wrong = auth
            .login("alice.dupont".into(), "wrong-password".into())
            .await;
        assert!(matches!(wrong, Err(AppError::InvalidCredentials)));

        let unknown = auth.login("nobody".into(), "whatever".into()).await;
        assert!(matches!(unknown, Err(AppError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn access_token_is_rejected_by_refresh() {
        let user = sample_user("pw-not-relevant");
        let mut users = MockUserRepository::new();
        let returned = user.clone();
        users
            .expect_find_by_id()
            .returning(move |_, _| Ok(Some(returned.clone())));

        let mut uow = TestUow::new();
        uow.users = Arc::new(users);
        let auth = Authenticator::new(Arc::new(uow), Config::for_tests());

        let access = encode_token(&user, TOKEN_KIND_ACCESS, 1, &Config::for_tests()).unwrap();
        let result = auth.refresh(access).await;
        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[tokio::test]
    async fn refresh_issues_new_access_token() {
        let user = sample_user("pw-not-relevant");
        let mut users = MockUserRepository::new();
        let returned = user.clone();
        users
            .expect_find_by_id()
            .returning(move |_, _| Ok(Some(returned.clone())));

        let mut uow = TestUow::new();
        uow.users = Arc::new(users);
        let auth = Authenticator::new(Arc::new(uow), Config::for_tests());

        let refresh = encode_token(&user, TOKEN_KIND_REFRESH, 24, &Config::for_tests()).unwrap();
        let response = auth.refresh(refresh).await.unwrap();

        let claims = auth.verify_token(&response.access_token).unwrap();
        assert_eq!(claims.kind, TOKEN_KIND_ACCESS);
        assert_eq!(claims.sub, user.id);
    }
}
