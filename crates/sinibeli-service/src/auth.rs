//! JWT authentication.
//!
//! - [`JwtService`] issues and validates HS256 tokens
//! - [`AuthUser`] extracts the caller from `Authorization: Bearer <token>`
//! - [`require_auth`] middleware guards the API routes when `AUTH_REQUIRED` is set

use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::{FromRequestParts, Request};
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::Response;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::state::AppState;

/// Token lifetime.
pub const TOKEN_LIFETIME_HOURS: i64 = 24;

/// Authentication errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No `Authorization` header.
    #[error("authorization header is required")]
    MissingHeader,

    /// Header present but not `Bearer <token>`.
    #[error("authorization header must be in the form 'Bearer <token>'")]
    InvalidHeader,

    /// Token failed signature, issuer or expiry checks.
    #[error("invalid or expired token")]
    InvalidToken,

    /// Token could not be signed.
    #[error("failed to issue token: {0}")]
    Issue(String),
}

impl AuthError {
    /// Machine-readable reason returned in the `error` field.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::MissingHeader => "missing_authorization_header",
            Self::InvalidHeader => "invalid_authorization_header",
            Self::InvalidToken => "invalid_token",
            Self::Issue(_) => "token_issue_failed",
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Issue(msg) => Self::Internal(msg),
            other => Self::Unauthorized {
                code: other.code(),
                message: other.to_string(),
            },
        }
    }
}

/// JWT claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub user_id: i64,
    /// User email.
    pub email: String,
    /// Username.
    pub username: String,
    /// Issuer.
    pub iss: String,
    /// Issued at.
    pub iat: i64,
    /// Not before.
    pub nbf: i64,
    /// Expiration time.
    pub exp: i64,
}

/// Issues and validates HS256 tokens for one issuer.
#[derive(Clone)]
pub struct JwtService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    issuer: String,
    lifetime: Duration,
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("issuer", &self.issuer)
            .field("lifetime", &self.lifetime)
            .finish_non_exhaustive()
    }
}

impl JwtService {
    /// Create a service signing with `secret`.
    #[must_use]
    pub fn new(secret: &str, issuer: impl Into<String>) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            issuer: issuer.into(),
            lifetime: Duration::hours(TOKEN_LIFETIME_HOURS),
        }
    }

    /// Override the token lifetime.
    #[must_use]
    pub fn with_lifetime(mut self, lifetime: Duration) -> Self {
        self.lifetime = lifetime;
        self
    }

    /// Sign a token for a user.
    pub fn issue(&self, user_id: i64, email: &str, username: &str) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            user_id,
            email: email.to_string(),
            username: username.to_string(),
            iss: self.issuer.clone(),
            iat: now.timestamp(),
            nbf: now.timestamp(),
            exp: (now + self.lifetime).timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| AuthError::Issue(e.to_string()))
    }

    /// Check signature, issuer and time claims.
    pub fn validate(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.validate_nbf = true;

        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!(error = %e, "JWT validation failed");
                AuthError::InvalidToken
            })
    }
}

/// An authenticated caller.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The user ID.
    pub user_id: i64,
    /// The validated claims.
    pub claims: Claims,
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get("authorization")
            .ok_or(AuthError::MissingHeader)?;

        let token = header
            .to_str()
            .ok()
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::InvalidHeader)?;

        let jwt = state.jwt.as_ref().ok_or(AuthError::InvalidToken)?;
        let claims = jwt.validate(token)?;

        Ok(Self {
            user_id: claims.user_id,
            claims,
        })
    }
}

/// Reject requests without a valid bearer token.
///
/// The authenticated user is stored in the request extensions.
pub async fn require_auth(user: AuthUser, mut request: Request, next: Next) -> Response {
    tracing::debug!(user_id = user.user_id, "Request authenticated");
    request.extensions_mut().insert(user);
    next.run(request).await
}
