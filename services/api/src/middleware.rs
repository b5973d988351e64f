//! Authentication middleware for JWT token validation and request guarding
//!
//! The middleware runs on every route. It resolves the caller identity from
//! the `Authorization` header (absent, malformed, expired, or unknown-role
//! tokens all resolve to "no identity"), asks the guard for a decision, and
//! maps that decision onto HTTP: 401 for unauthenticated, 403 for
//! unauthorized. On allow, the resolved [`AuthUser`] is inserted into the
//! request extensions as an explicit value for handlers.

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use std::env;
use uuid::Uuid;

use crate::{
    error::ApiError,
    guard::{self, AccessDecision},
    rbac::Role,
    state::AppState,
};

/// JWT claims structure issued by the auth service
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: Uuid,
    /// Canonical role string
    pub role: String,
    /// Issued at time
    pub iat: u64,
    /// Expiration time
    pub exp: u64,
    /// Token type (access or refresh)
    pub token_type: TokenType,
}

/// Token type enum
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub enum TokenType {
    /// Access token
    Access,
    /// Refresh token
    Refresh,
}

/// Authenticated caller, resolved once per request
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub role: Role,
}

/// Verifies access tokens against the auth service's public key
///
/// Built once at startup so the key is parsed a single time.
#[derive(Clone)]
pub struct JwtVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    /// Create a verifier from environment variables
    ///
    /// # Environment Variables
    /// - `JWT_PUBLIC_KEY`: public key for verifying tokens (PEM format) or
    ///   path to a public key file
    pub fn from_env() -> anyhow::Result<Self> {
        let public_key = env::var("JWT_PUBLIC_KEY")
            .map_err(|_| anyhow::anyhow!("JWT_PUBLIC_KEY environment variable not set"))?;

        // If the public key looks like a file path, read from file (try CWD,
        // then project root)
        let public_key = if public_key.starts_with("-----BEGIN") {
            public_key
        } else {
            std::fs::read_to_string(&public_key)
                .or_else(|_| {
                    let mut path = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"));
                    path.push(&public_key);
                    std::fs::read_to_string(path)
                })
                .map_err(|e| anyhow::anyhow!("Failed to read public key file: {}", e))?
                .trim()
                .to_string()
        };

        let decoding_key = DecodingKey::from_rsa_pem(public_key.as_bytes())?;
        let mut validation = Validation::new(jsonwebtoken::Algorithm::RS256);
        validation.validate_exp = true;

        Ok(JwtVerifier {
            decoding_key,
            validation,
        })
    }

    /// Validate a token and return its claims
    pub fn validate(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        Ok(data.claims)
    }
}

/// Resolve the caller identity from the request, if any
///
/// Every failure mode collapses to `None`: the guard must treat an invalid
/// token exactly like a missing one, and no token detail may leak to the
/// caller.
fn resolve_identity(state: &AppState, req: &Request<Body>) -> Option<AuthUser> {
    let auth_header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok())?;

    let token = auth_header.strip_prefix("Bearer ")?;

    let claims = state.jwt_verifier.validate(token).ok()?;

    if claims.token_type != TokenType::Access {
        return None;
    }

    // Unknown role strings fail closed
    let role = claims.role.parse::<Role>().ok()?;

    Some(AuthUser {
        id: claims.sub,
        role,
    })
}

/// Guard middleware, applied to every route
pub async fn access_guard(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let path_and_query = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());

    let identity = resolve_identity(&state, &req);

    match guard::authorize(&path_and_query, identity.as_ref()) {
        AccessDecision::Allow => {
            if let Some(user) = identity {
                req.extensions_mut().insert(user);
            }
            Ok(next.run(req).await)
        }
        AccessDecision::DenyUnauthenticated { next } => Err(ApiError::Unauthenticated { next }),
        AccessDecision::DenyUnauthorized { required, current } => {
            Err(ApiError::Forbidden { required, current })
        }
    }
}
