//! JWT bearer authentication.
//!
//! Tokens are HS256-signed with a secret supplied at construction time;
//! there is no process-global signing key. The middleware validates the
//! token on every wallet request and makes the authenticated user id
//! available as a request extension.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Json,
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use wallet_types::{AppError, LedgerStore, RateProvider, UserId};

use super::handlers::AppState;

/// Signing and verification keys plus token lifetime.
#[derive(Clone)]
pub struct AuthKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    token_ttl: Duration,
}

#[derive(Serialize, Deserialize)]
struct Claims {
    /// User id (UUID)
    sub: String,
    /// Expiry, seconds since the epoch
    exp: i64,
}

impl AuthKeys {
    pub fn new(secret: &str, token_ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            token_ttl,
        }
    }

    /// Issues a bearer token for a user.
    pub fn issue_token(&self, user_id: UserId) -> Result<String, AppError> {
        let exp = chrono::Utc::now()
            + chrono::Duration::from_std(self.token_ttl)
                .map_err(|e| AppError::Internal(format!("invalid token ttl: {e}")))?;
        let claims = Claims {
            sub: user_id.to_string(),
            exp: exp.timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| AppError::Internal(format!("failed to sign token: {e}")))
    }

    /// Verifies a bearer token and returns the user id it was issued for.
    pub fn verify_token(&self, token: &str) -> Result<UserId, AppError> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::default())
            .map_err(|_| AppError::Unauthorized("Invalid or expired token".into()))?;
        data.claims
            .sub
            .parse()
            .map_err(|_| AppError::Unauthorized("Invalid token subject".into()))
    }
}

/// Authenticated user id, inserted by the middleware.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub UserId);

/// Extracts the token from the Authorization header.
/// Expected format: "Bearer <token>"
fn extract_bearer(auth_header: Option<&str>) -> Option<&str> {
    auth_header?.strip_prefix("Bearer ")
}

/// Routes that do not require a token.
fn is_public(path: &str) -> bool {
    matches!(path, "/health" | "/api/v1/register" | "/api/v1/login")
}

/// Authentication middleware validating JWT bearer tokens.
pub async fn auth_middleware<L: LedgerStore, P: RateProvider>(
    State(state): State<Arc<AppState<L, P>>>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    if is_public(request.uri().path()) {
        return next.run(request).await;
    }

    let auth_header = request
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok());

    let token = match extract_bearer(auth_header) {
        Some(token) if !token.is_empty() => token,
        _ => return unauthorized_response("Missing or invalid Authorization header"),
    };

    match state.auth.verify_token(token) {
        Ok(user_id) => {
            request.extensions_mut().insert(AuthUser(user_id));
            next.run(request).await
        }
        Err(e) => unauthorized_response(&e.to_string()),
    }
}

fn unauthorized_response(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(serde_json::json!({
            "error": message,
            "code": 401
        })),
    )
        .into_response()
}
