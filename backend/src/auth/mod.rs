use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::config_loader;

#[derive(Debug, Serialize, Deserialize)]
pub struct AccessClaims {
    pub sub: String,
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub exp: usize,
}

/// Caller identity resolved from a bearer access token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub email: Option<String>,
    /// Display name from the identity provider, if it sent one.
    pub name: Option<String>,
}

#[derive(Debug)]
pub struct AuthError(anyhow::Error);

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        AuthError(err)
    }
}

impl axum::response::IntoResponse for AuthError {
    fn into_response(self) -> axum::response::Response {
        (StatusCode::UNAUTHORIZED, format!("Unauthorized: {}", self.0)).into_response()
    }
}

pub fn validate_access_token(token: &str) -> Result<AccessClaims, AuthError> {
    let secret = config_loader::get_auth_secret()
        .map_err(|e| anyhow::anyhow!("Failed to load auth secret: {}", e))?
        .jwt_secret;

    decode_access_token(token, &secret)
}

pub fn decode_access_token(token: &str, secret: &str) -> Result<AccessClaims, AuthError> {
    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let mut validation = Validation::new(jsonwebtoken::Algorithm::HS256);
    validation.validate_aud = false;

    let token_data = decode::<AccessClaims>(token, &decoding_key, &validation)
        .map_err(|e| anyhow::anyhow!("JWT validation failed: {}", e))?;

    Ok(token_data.claims)
}

fn claims_to_user(claims: AccessClaims) -> Result<AuthUser, (StatusCode, String)> {
    let user_id = Uuid::parse_str(&claims.sub).map_err(|_| {
        (
            StatusCode::UNAUTHORIZED,
            "Invalid user ID in token".to_string(),
        )
    })?;

    Ok(AuthUser {
        user_id,
        email: claims.email,
        name: claims.name,
    })
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, String);

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| {
                    (
                        StatusCode::UNAUTHORIZED,
                        "Missing or invalid Authorization header".to_string(),
                    )
                })?;

        let claims = validate_access_token(bearer.token())
            .map_err(|e| (StatusCode::UNAUTHORIZED, e.0.to_string()))?;

        claims_to_user(claims)
    }
}

/// Same as `AuthUser` but anonymous callers are allowed through as `None`.
#[derive(Debug, Clone)]
pub struct MaybeAuthUser(pub Option<AuthUser>);

#[async_trait]
impl<S> FromRequestParts<S> for MaybeAuthUser
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, String);

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if !parts.headers.contains_key(axum::http::header::AUTHORIZATION) {
            return Ok(MaybeAuthUser(None));
        }

        AuthUser::from_request_parts(parts, state)
            .await
            .map(|user| MaybeAuthUser(Some(user)))
    }
}

/// Signs a bearer token for `user_id` and points the extractor at the same
/// secret, for router tests.
#[cfg(test)]
pub(crate) fn test_bearer(user_id: Uuid) -> String {
    use jsonwebtoken::{EncodingKey, Header, encode};

    const TEST_JWT_SECRET: &str = "router-tests-jwt-secret-0123456789";

    // Every caller writes the same value.
    unsafe { std::env::set_var("AUTH_JWT_SECRET", TEST_JWT_SECRET) };

    let claims = AccessClaims {
        sub: user_id.to_string(),
        email: Some("router@example.com".to_string()),
        name: None,
        exp: 9_999_999_999,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes()),
    )
    .unwrap();

    format!("Bearer {token}")
}
