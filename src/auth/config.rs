// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Configuration for bearer-token verification

use std::env;

/// HS256 verification settings; no secret means every caller is anonymous
#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
    pub jwt_secret: Option<String>,
    /// Expected `aud` claim, checked only when set
    pub jwt_audience: Option<String>,
}

impl AuthConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            jwt_secret: env::var("AUTH_JWT_SECRET").ok().filter(|v| !v.is_empty()),
            jwt_audience: env::var("AUTH_JWT_AUDIENCE").ok().filter(|v| !v.is_empty()),
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        if let Some(secret) = &self.jwt_secret {
            if secret.len() < 16 {
                return Err("AUTH_JWT_SECRET must be at least 16 bytes".to_string());
            }
        }
        Ok(())
    }

    pub fn is_enabled(&self) -> bool {
        self.jwt_secret.is_some()
    }
}
