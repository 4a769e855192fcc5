// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Caller identity and authorization context
//!
//! A bearer token is optional. Absent, malformed, expired or otherwise
//! invalid tokens all produce an anonymous context; authentication never
//! fails a request.

pub mod config;
pub mod jwt;

pub use config::AuthConfig;
pub use jwt::JwtIdentityVerifier;

use async_trait::async_trait;
use axum::http::{header::AUTHORIZATION, HeaderMap};
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

/// Token verification errors; only ever logged
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Token has expired")]
    TokenExpired,

    #[error("Token is missing a subject")]
    MissingSubject,
}

/// Per-request authorization state
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizationContext {
    pub is_authenticated: bool,
    /// Always equal to `is_authenticated`; there are no intermediate tiers
    pub has_full_access: bool,
    #[serde(skip)]
    pub user_id: Option<String>,
}

impl AuthorizationContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn authenticated(user_id: impl Into<String>) -> Self {
        Self {
            is_authenticated: true,
            has_full_access: true,
            user_id: Some(user_id.into()),
        }
    }
}

/// Identity collaborator: bearer token to user id
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<String, AuthError>;
}

/// Verifier used when no identity backend is configured
pub struct AnonymousOnly;

#[async_trait]
impl IdentityVerifier for AnonymousOnly {
    async fn verify(&self, _token: &str) -> Result<String, AuthError> {
        Err(AuthError::InvalidToken("identity verification disabled".to_string()))
    }
}

/// Extract a bearer token from the `Authorization` header
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Resolve the authorization context for an optional token
pub async fn resolve_context(
    verifier: &dyn IdentityVerifier,
    token: Option<&str>,
) -> AuthorizationContext {
    let Some(token) = token else {
        return AuthorizationContext::anonymous();
    };
    match verifier.verify(token).await {
        Ok(user_id) => AuthorizationContext::authenticated(user_id),
        Err(e) => {
            debug!("Bearer token rejected, continuing anonymously: {}", e);
            AuthorizationContext::anonymous()
        }
    }
}
