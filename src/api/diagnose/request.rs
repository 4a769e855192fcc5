// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Diagnosis API request types

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Request body for POST on the diagnose path
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnoseApiRequest {
    /// Page to diagnose; a missing scheme defaults to https
    pub url: String,
}

impl DiagnoseApiRequest {
    /// Parse and validate a raw request body
    ///
    /// Errors are short descriptions for logs; callers map them to a fixed
    /// client-input message.
    pub fn parse(body: &[u8]) -> Result<Self, String> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Err("request body is empty".to_string());
        }
        let value: Value =
            serde_json::from_slice(body).map_err(|e| format!("invalid JSON body: {}", e))?;
        let Value::Object(fields) = value else {
            return Err("request body must be a JSON object".to_string());
        };
        let url = match fields.get("url") {
            Some(Value::String(url)) => url.clone(),
            Some(_) => return Err("url must be a string".to_string()),
            None => return Err("missing url field".to_string()),
        };
        let request = Self { url };
        request.validate()?;
        Ok(request)
    }

    /// Validate the request
    pub fn validate(&self) -> Result<(), String> {
        if self.url.trim().is_empty() {
            return Err("url cannot be empty".to_string());
        }
        if self.url.len() > 2048 {
            return Err("url too long (max 2048 characters)".to_string());
        }
        Ok(())
    }
}
