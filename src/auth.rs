use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::Response,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    config::AppConfig,
    error::{AppError, AppResult},
    models::Role,
    session::SessionIssuer,
};

/// Claims
///
/// The payload of every bearer token issued by this service.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user id the token is bound to.
    pub sub: Uuid,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
    /// Issued at (UTC Unix timestamp).
    pub iat: i64,
}

/// TokenSigner
///
/// HS256 signing and verification with the configured secret and lifetime.
#[derive(Clone)]
pub struct TokenSigner {
    secret: String,
    ttl: Duration,
}

impl TokenSigner {
    pub fn new(secret: &str, expires_hours: i64) -> Self {
        Self {
            secret: secret.to_string(),
            ttl: Duration::hours(expires_hours),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(&config.jwt_secret, config.jwt_expires_hours)
    }

    /// Issues a token bound to `user_id`.
    pub fn issue(&self, user_id: Uuid) -> AppResult<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(format!("token signing failed: {e}")))
    }

    /// Checks signature and expiry and returns the claims.
    pub fn decode(&self, token: &str) -> AppResult<Claims> {
        let mut validation = Validation::default();
        validation.validate_exp = true;

        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => {
                AppError::Unauthorized("Token has expired, please login again.".to_string())
            }
            _ => AppError::Unauthorized("Invalid token.".to_string()),
        })
    }
}

/// AuthUser
///
/// The resolved identity of an authenticated request.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthUser {
    pub id: Uuid,
    pub role: Role,
}

/// AuthUser Extractor Implementation
///
/// Reuses the identity placed in the request extensions by `authenticate`;
/// otherwise reads the `Authorization: Bearer` header and verifies it through the
/// `SessionIssuer` (signature, expiry, user still present).
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    SessionIssuer: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthUser>() {
            return Ok(user.clone());
        }

        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| {
                AppError::Unauthorized("Please login first to access this resource.".to_string())
            })?;

        SessionIssuer::from_ref(state).verify(token).await
    }
}

/// authenticate
///
/// First link of the middleware chain: resolves the caller and stores the
/// identity in the request extensions for the links that follow.
pub async fn authenticate(auth_user: AuthUser, mut request: Request, next: Next) -> Response {
    request.extensions_mut().insert(auth_user);
    next.run(request).await
}

/// require_roles
///
/// Second link of the chain, attached per route with the roles that route allows.
/// Must run inside `authenticate`.
pub async fn require_roles(
    State(roles): State<&'static [Role]>,
    request: Request,
    next: Next,
) -> AppResult<Response> {
    let user = request.extensions().get::<AuthUser>().ok_or_else(|| {
        AppError::Unauthorized("Please login first to access this resource.".to_string())
    })?;
    authorize_roles(user, roles)?;
    Ok(next.run(request).await)
}

/// Fails with Forbidden unless the caller's role is one of `roles`.
pub fn authorize_roles(user: &AuthUser, roles: &[Role]) -> AppResult<()> {
    if roles.contains(&user.role) {
        Ok(())
    } else {
        tracing::warn!(user_id = %user.id, role = %user.role, "role not permitted");
        Err(AppError::Forbidden(format!(
            "Role '{}' is not allowed to access this resource.",
            user.role
        )))
    }
}

/// Fails with Forbidden unless the caller is the recorded owner.
pub fn authorize_owner(owner: Uuid, user: &AuthUser, message: &str) -> AppResult<()> {
    if owner == user.id {
        Ok(())
    } else {
        tracing::warn!(user_id = %user.id, owner_id = %owner, "ownership check failed");
        Err(AppError::Forbidden(message.to_string()))
    }
}
