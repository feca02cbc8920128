// ABOUTME: JWT-based user authentication and role authorization
// ABOUTME: Issues HS256 tokens and resolves bearer headers to stored users
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Authentication
//!
//! Every API route except `/health` carries `Authorization: Bearer <jwt>`.
//! The token only proves identity; the user is reloaded from the database on
//! each request so role changes take effect immediately.

use crate::constants::JWT_AUDIENCE;
use crate::errors::{AppError, AppResult};
use crate::models::{User, UserRole};
use crate::resources::ServerResources;
use axum::http::HeaderMap;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};
use uuid::Uuid;

/// Roles allowed on ordinary user routes
pub const USER_ROLES: &[UserRole] = &[UserRole::User];
/// Roles allowed on administrative routes
pub const ADMIN_ROLES: &[UserRole] = &[UserRole::Admin, UserRole::SuperAdmin];
/// Any authenticated caller
pub const ANY_ROLE: &[UserRole] = &[UserRole::User, UserRole::Admin, UserRole::SuperAdmin];

/// `JWT` validation failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JwtValidationError {
    /// Token has expired
    TokenExpired,
    /// Signature or audience check failed
    TokenInvalid {
        /// Reason for invalidity
        reason: String,
    },
    /// Not a well-formed `JWT`
    TokenMalformed {
        /// Details about malformation
        details: String,
    },
}

impl fmt::Display for JwtValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TokenExpired => f.write_str("JWT token has expired"),
            Self::TokenInvalid { reason } => write!(f, "JWT token is invalid: {reason}"),
            Self::TokenMalformed { details } => write!(f, "JWT token is malformed: {details}"),
        }
    }
}

impl std::error::Error for JwtValidationError {}

/// `JWT` claims for user authentication
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User `ID`
    pub sub: String,
    /// User email
    pub email: String,
    /// Role at issue time; informational only
    pub role: UserRole,
    /// Issued at timestamp
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
    /// Audience
    pub aud: String,
}

/// Caller resolved from a bearer token
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user: User,
}

impl AuthenticatedUser {
    #[must_use]
    pub const fn user_id(&self) -> Uuid {
        self.user.id
    }
}

/// Issues and validates HS256 tokens
#[derive(Clone)]
pub struct AuthManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_expiry_hours: i64,
}

impl fmt::Debug for AuthManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthManager")
            .field("token_expiry_hours", &self.token_expiry_hours)
            .finish_non_exhaustive()
    }
}

impl AuthManager {
    /// Create a manager signing with `secret`
    #[must_use]
    pub fn new(secret: &[u8], token_expiry_hours: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            token_expiry_hours,
        }
    }

    /// Generate a token for `user`
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails
    pub fn generate_token(&self, user: &User) -> AppResult<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            role: user.role,
            iat: now.timestamp(),
            exp: (now + Duration::hours(self.token_expiry_hours)).timestamp(),
            aud: JWT_AUDIENCE.to_owned(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to sign token: {e}")))
    }

    /// Validate a token's signature, audience, and expiry
    ///
    /// # Errors
    ///
    /// Returns a [`JwtValidationError`] describing the failure
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtValidationError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.set_audience(&[JWT_AUDIENCE]);

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| Self::convert_jwt_error(&e))
    }

    fn convert_jwt_error(e: &jsonwebtoken::errors::Error) -> JwtValidationError {
        use jsonwebtoken::errors::ErrorKind;

        match e.kind() {
            ErrorKind::ExpiredSignature => JwtValidationError::TokenExpired,
            ErrorKind::InvalidToken
            | ErrorKind::Base64(_)
            | ErrorKind::Json(_)
            | ErrorKind::Utf8(_) => JwtValidationError::TokenMalformed {
                details: e.to_string(),
            },
            _ => JwtValidationError::TokenInvalid {
                reason: e.to_string(),
            },
        }
    }
}

/// Extract the bearer token from request headers
fn bearer_token(headers: &HeaderMap) -> AppResult<&str> {
    let value = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(AppError::auth_required)?;

    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::auth_invalid("Authorization header must be a Bearer token"))
}

/// Resolve the caller and check their role
///
/// # Errors
///
/// - `AUTH_REQUIRED` without an `Authorization` header
/// - `AUTH_INVALID` for a malformed or invalid token
/// - `RESOURCE_NOT_FOUND` if the token's user no longer exists
/// - `PERMISSION_DENIED` if the user's role is not in `allowed_roles`
pub async fn authenticate(
    headers: &HeaderMap,
    resources: &ServerResources,
    allowed_roles: &[UserRole],
) -> AppResult<AuthenticatedUser> {
    let token = bearer_token(headers)?;
    let claims = resources.auth_manager.validate_token(token).map_err(|e| {
        warn!(error = %e, "Rejected bearer token");
        AppError::auth_invalid(format!("Authentication failed: {e}"))
    })?;

    let user_id = Uuid::parse_str(&claims.sub)
        .map_err(|_| AppError::auth_invalid("Token subject is not a user ID"))?;

    let user = resources
        .database
        .users()
        .get(user_id)
        .await?
        .ok_or_else(|| AppError::not_found("User"))?;

    if !allowed_roles.contains(&user.role) {
        debug!(user_id = %user.id, role = %user.role, "Role not allowed on route");
        return Err(AppError::permission_denied(format!(
            "Role {} is not allowed to perform this action",
            user.role
        )));
    }

    Ok(AuthenticatedUser { user })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCode;

    #[test]
    fn test_token_roundtrip_and_tamper() {
        let manager = AuthManager::new(b"test-secret-with-enough-length", 1);
        let user = User::new("athlete@example.com", None, UserRole::User);
        let token = manager.generate_token(&user).unwrap();

        let claims = manager.validate_token(&token).unwrap();
        assert_eq!(claims.sub, user.id.to_string());
        assert_eq!(claims.aud, JWT_AUDIENCE);

        let other = AuthManager::new(b"a-different-secret-entirely", 1);
        assert!(matches!(
            other.validate_token(&token),
            Err(JwtValidationError::TokenInvalid { .. })
        ));
    }

    #[test]
    fn test_expired_token_rejected() {
        let manager = AuthManager::new(b"test-secret-with-enough-length", -2);
        let user = User::new("late@example.com", None, UserRole::User);
        let token = manager.generate_token(&user).unwrap();
        assert_eq!(
            manager.validate_token(&token).unwrap_err(),
            JwtValidationError::TokenExpired
        );
    }

    #[test]
    fn test_bearer_token_parsing() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers).unwrap_err().code, ErrorCode::AuthRequired);

        headers.insert("authorization", "Basic abc".parse().unwrap());
        assert_eq!(bearer_token(&headers).unwrap_err().code, ErrorCode::AuthInvalid);

        headers.insert("authorization", "Bearer abc.def.ghi".parse().unwrap());
        assert_eq!(bearer_token(&headers).unwrap(), "abc.def.ghi");
    }
}
