// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! HS256 JWT identity verifier

use async_trait::async_trait;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;

use super::config::AuthConfig;
use super::{AuthError, IdentityVerifier};

#[derive(Debug, Deserialize)]
struct Claims {
    sub: String,
}

/// Verifies HS256 tokens signed with a shared secret
///
/// `exp` and `sub` are required; `aud` is checked when configured.
pub struct JwtIdentityVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl JwtIdentityVerifier {
    pub fn new(secret: &[u8], audience: Option<&str>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "sub"]);
        match audience {
            Some(aud) => validation.set_audience(&[aud]),
            None => validation.validate_aud = false,
        }

        Self {
            key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Build a verifier if a secret is configured
    pub fn from_config(config: &AuthConfig) -> Option<Self> {
        config
            .jwt_secret
            .as_deref()
            .map(|secret| Self::new(secret.as_bytes(), config.jwt_audience.as_deref()))
    }
}

#[async_trait]
impl IdentityVerifier for JwtIdentityVerifier {
    async fn verify(&self, token: &str) -> Result<String, AuthError> {
        let data = decode::<Claims>(token, &self.key, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken(e.to_string()),
            }
        })?;

        let sub = data.claims.sub.trim();
        if sub.is_empty() {
            return Err(AuthError::MissingSubject);
        }
        Ok(sub.to_string())
    }
}
