//! Session verification.
//!
//! Callers present the access token issued by the hosted auth backend as
//! `Authorization: Bearer <jwt>`. Tokens are HS256-signed with the project's JWT
//! secret and carry the user id in `sub`.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;

/// Audience claim on tokens issued to signed-in users.
pub const AUTHENTICATED_AUDIENCE: &str = "authenticated";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing Authorization header")]
    MissingToken,

    #[error("Authorization header is not a bearer token")]
    MalformedHeader,

    #[error("invalid token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),

    #[error("token subject is not a user id: {0}")]
    InvalidSubject(String),
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        warn!("Authentication denied: {e}");
        AppError::Unauthorized
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: u64,
    pub aud: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// The authenticated caller.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: Option<String>,
}

/// Resolves a session token to a user identity.
pub trait SessionVerifier: Send + Sync {
    fn verify(&self, token: &str) -> Result<AuthUser, AuthError>;
}

pub struct JwtSessionVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl JwtSessionVerifier {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[AUTHENTICATED_AUDIENCE]);
        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }
}

impl SessionVerifier for JwtSessionVerifier {
    fn verify(&self, token: &str) -> Result<AuthUser, AuthError> {
        let data = decode::<Claims>(token, &self.key, &self.validation)?;
        let id = Uuid::parse_str(&data.claims.sub)
            .map_err(|_| AuthError::InvalidSubject(data.claims.sub.clone()))?;
        Ok(AuthUser {
            id,
            email: data.claims.email,
        })
    }
}

fn bearer_token(parts: &Parts) -> Result<&str, AuthError> {
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingToken)?;
    let value = header.to_str().map_err(|_| AuthError::MalformedHeader)?;
    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(AuthError::MalformedHeader)
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        let user = state.sessions.verify(token)?;
        debug!(
            "Authenticated user {} <{}>",
            user.id,
            user.email.as_deref().unwrap_or("no email")
        );
        Ok(user)
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{sign, token_for, TEST_SECRET};
    use super::*;
    use axum::http::Request;

    fn parts_with(header: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/");
        if let Some(value) = header {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_valid_token_resolves_user() {
        let user_id = Uuid::new_v4();
        let verifier = JwtSessionVerifier::new(TEST_SECRET);
        let user = verifier.verify(&token_for(user_id)).unwrap();
        assert_eq!(user.id, user_id);
        assert_eq!(user.email.as_deref(), Some("user@example.com"));
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let verifier = JwtSessionVerifier::new("another-secret");
        let result = verifier.verify(&token_for(Uuid::new_v4()));
        assert!(matches!(result, Err(AuthError::InvalidToken(_))));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let token = sign(&Claims {
            sub: Uuid::new_v4().to_string(),
            exp: 1_000,
            aud: AUTHENTICATED_AUDIENCE.to_string(),
            email: None,
        });
        let verifier = JwtSessionVerifier::new(TEST_SECRET);
        assert!(verifier.verify(&token).is_err());
    }

    #[test]
    fn test_non_uuid_subject_is_rejected() {
        let token = sign(&Claims {
            sub: "mock-user-id".to_string(),
            exp: jsonwebtoken::get_current_timestamp() + 60,
            aud: AUTHENTICATED_AUDIENCE.to_string(),
            email: None,
        });
        let verifier = JwtSessionVerifier::new(TEST_SECRET);
        assert!(matches!(
            verifier.verify(&token),
            Err(AuthError::InvalidSubject(_))
        ));
    }

    #[test]
    fn test_bearer_token_extraction() {
        assert_eq!(bearer_token(&parts_with(Some("Bearer abc"))).unwrap(), "abc");
        assert!(matches!(
            bearer_token(&parts_with(None)),
            Err(AuthError::MissingToken)
        ));
        assert!(matches!(
            bearer_token(&parts_with(Some("Basic abc"))),
            Err(AuthError::MalformedHeader)
        ));
        assert!(matches!(
            bearer_token(&parts_with(Some("Bearer "))),
            Err(AuthError::MalformedHeader)
        ));
    }
}
