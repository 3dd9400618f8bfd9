//! Authentication service: registration, login, token rotation, email
//! verification, and password changes.

use chrono::{Duration, Utc};
use persistence::entities::UserEntity;
use persistence::repositories::UserRepository;
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::config::JwtAuthConfig;
use crate::services::email::EmailService;
use shared::crypto::{generate_verification_code, sha256_hex};
use shared::jwt::{extract_user_id, JwtConfig, JwtError};
use shared::password::{hash_password, verify_password, PasswordError};

/// Verification codes stay valid for this long.
const VERIFICATION_CODE_TTL_MINUTES: i64 = 10;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Email already registered")]
    EmailAlreadyExists,

    #[error("User not found")]
    UserNotFound,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid refresh token")]
    InvalidRefreshToken,

    #[error("Invalid or expired verification code")]
    InvalidVerificationCode,

    #[error("Old password does not match")]
    OldPasswordMismatch,

    #[error("New password equals the old one")]
    NewPasswordSameAsOld,

    #[error("Token error: {0}")]
    TokenError(#[from] JwtError),

    #[error("Password error: {0}")]
    PasswordError(#[from] PasswordError),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

/// A freshly issued access/refresh token pair.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Authentication service.
pub struct AuthService {
    users: UserRepository,
    jwt: JwtConfig,
    email: EmailService,
}

impl AuthService {
    /// Creates a new AuthService over the given pool and configuration.
    pub fn new(pool: PgPool, jwt_config: &JwtAuthConfig, email: EmailService) -> Self {
        let jwt = JwtConfig::with_leeway(
            &jwt_config.secret,
            jwt_config.access_token_expiry_secs,
            jwt_config.refresh_token_expiry_secs,
            jwt_config.leeway_secs,
        );

        Self {
            users: UserRepository::new(pool),
            jwt,
            email,
        }
    }

    /// Register a new account and kick off email verification.
    ///
    /// Field validation happens at the route; this enforces email uniqueness
    /// (case-folded), hashes the password, stores a pending verification
    /// code, and fires the verification email without awaiting it.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        name: &str,
        language: &str,
        timezone: &str,
    ) -> Result<UserEntity, AuthError> {
        if self.users.find_by_email(email).await?.is_some() {
            return Err(AuthError::EmailAlreadyExists);
        }

        let password_hash = hash_password(password)?;
        let code = generate_verification_code();
        let expiry = Utc::now() + Duration::minutes(VERIFICATION_CODE_TTL_MINUTES);

        let user = self
            .users
            .create_user(
                email,
                &password_hash,
                name,
                language,
                timezone,
                &code,
                expiry,
            )
            .await?;

        self.spawn_verification_email(&user, code);
        Ok(user)
    }

    /// Authenticate with email and password, issuing a token pair.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(UserEntity, TokenPair), AuthError> {
        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if !verify_password(password, &user.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        let tokens = self.issue_tokens(user.id).await?;
        Ok((user, tokens))
    }

    /// Drop the stored refresh token so it can no longer be redeemed.
    pub async fn logout(&self, user_id: Uuid) -> Result<(), AuthError> {
        self.users.set_refresh_token_hash(user_id, None).await?;
        Ok(())
    }

    /// Redeem a refresh token for a fresh pair, rotating the stored one.
    ///
    /// The presented token must both verify as a refresh JWT and match the
    /// digest stored for its subject, so a rotated-out token is dead even
    /// before it expires.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        let claims = self
            .jwt
            .validate_refresh_token(refresh_token)
            .map_err(|_| AuthError::InvalidRefreshToken)?;
        let user_id = extract_user_id(&claims).map_err(|_| AuthError::InvalidRefreshToken)?;

        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::InvalidRefreshToken)?;

        let presented = sha256_hex(refresh_token);
        if user.refresh_token_hash.as_deref() != Some(presented.as_str()) {
            return Err(AuthError::InvalidRefreshToken);
        }

        self.issue_tokens(user.id).await
    }

    /// Regenerate and email a verification code for the account.
    pub async fn resend_verification_code(&self, email: &str) -> Result<(), AuthError> {
        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let code = generate_verification_code();
        let expiry = Utc::now() + Duration::minutes(VERIFICATION_CODE_TTL_MINUTES);
        self.users
            .set_verification_code(user.id, &code, expiry)
            .await?;

        self.spawn_verification_email(&user, code);
        Ok(())
    }

    /// Redeem a verification code, marking the account verified.
    pub async fn verify_email(&self, code: &str) -> Result<(), AuthError> {
        let user = self
            .users
            .find_by_active_verification_code(code, Utc::now())
            .await?
            .ok_or(AuthError::InvalidVerificationCode)?;

        self.users.mark_verified(user.id).await?;
        Ok(())
    }

    /// Change the password after re-verifying the old one.
    pub async fn change_password(
        &self,
        user_id: Uuid,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if !verify_password(old_password, &user.password_hash)? {
            return Err(AuthError::OldPasswordMismatch);
        }

        if verify_password(new_password, &user.password_hash)? {
            return Err(AuthError::NewPasswordSameAsOld);
        }

        let new_hash = hash_password(new_password)?;
        self.users.update_password(user_id, &new_hash).await?;
        Ok(())
    }

    /// Issue a token pair and persist the refresh token digest.
    async fn issue_tokens(&self, user_id: Uuid) -> Result<TokenPair, AuthError> {
        let access_token = self.jwt.generate_access_token(user_id)?;
        let refresh_token = self.jwt.generate_refresh_token(user_id)?;

        self.users
            .set_refresh_token_hash(user_id, Some(&sha256_hex(&refresh_token)))
            .await?;

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    /// Fire-and-forget the verification email; a failure is logged and never
    /// fails the triggering request.
    fn spawn_verification_email(&self, user: &UserEntity, code: String) {
        let email = self.email.clone();
        let to = user.email.clone();
        let name = user.name.clone();
        tokio::spawn(async move {
            if let Err(err) = email.send_verification_email(&to, &name, &code).await {
                tracing::error!(to = %to, error = %err, "Failed to send verification email");
            } else {
                tracing::info!(to = %to, "Verification email sent");
            }
        });
    }
}
