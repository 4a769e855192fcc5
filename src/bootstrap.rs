// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Composition of service handles from configuration
//!
//! Every collaborator is constructed once here and shared by reference
//! counting; nothing is created per request.

use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use crate::analysis::{AnalysisClient, OpenAiCompatibleProvider};
use crate::api::AppState;
use crate::auth::{AnonymousOnly, IdentityVerifier, JwtIdentityVerifier};
use crate::cache::{CacheGateway, DiagnosisStore, MemoryDiagnosisStore, RestDiagnosisStore};
use crate::config::ServiceConfig;
use crate::diagnosis::DiagnosisService;
use crate::history::{HistoryStore, RestHistoryStore};
use crate::scrape::{PageFetcher, PageSource, RenderServiceClient};
use crate::store::PostgrestClient;

/// Long-lived handles shared by the server, the cleanup task and the CLI
#[derive(Clone)]
pub struct Services {
    pub diagnosis: Arc<DiagnosisService>,
    pub identity: Arc<dyn IdentityVerifier>,
    pub cache: CacheGateway,
}

impl Services {
    /// Router state for the HTTP server
    pub fn app_state(&self, diagnose_path: &str) -> AppState {
        AppState::new(self.diagnosis.clone(), self.identity.clone())
            .with_diagnose_path(diagnose_path)
    }
}

/// Build every service handle from configuration
pub fn build_services(config: &ServiceConfig) -> Result<Services> {
    let (diagnoses, history) = build_stores(config)?;
    let cache = CacheGateway::new(diagnoses, config.cache.ttl());

    let fetcher: Arc<dyn PageSource> = Arc::new(PageFetcher::new(config.fetch.clone())?);
    let provider = Arc::new(OpenAiCompatibleProvider::new(&config.analysis)?);
    let analysis = AnalysisClient::new(provider, config.analysis.clone());

    let mut diagnosis =
        DiagnosisService::new(fetcher, analysis, cache.clone()).with_deadline(config.server.deadline());
    if let Some(history) = history {
        diagnosis = diagnosis.with_history(history);
    }

    match &config.fetch.render_service {
        Some(render) => {
            let client = RenderServiceClient::new(
                render,
                config.fetch.min_body_chars,
                config.fetch.max_body_bytes,
            )?;
            diagnosis = diagnosis.with_fallback(Arc::new(client));
        }
        None => info!("No render service configured; direct fetch failures are final"),
    }

    let identity: Arc<dyn IdentityVerifier> = match JwtIdentityVerifier::from_config(&config.auth) {
        Some(verifier) => {
            info!("Bearer tokens verified with HS256");
            Arc::new(verifier)
        }
        None => {
            info!("AUTH_JWT_SECRET not set; all callers are anonymous");
            Arc::new(AnonymousOnly)
        }
    };

    info!(
        "Services ready: prompt={}, model={}, deadline={}s",
        config.analysis.prompt_style, config.analysis.model, config.server.deadline_secs
    );

    Ok(Services {
        diagnosis: Arc::new(diagnosis),
        identity,
        cache,
    })
}

/// Diagnosis store plus the history store, which only exists when remote
fn build_stores(
    config: &ServiceConfig,
) -> Result<(Arc<dyn DiagnosisStore>, Option<Arc<dyn HistoryStore>>)> {
    if !config.store.is_remote() {
        info!("STORE_URL not set; using an in-memory cache and no history");
        let diagnoses: Arc<dyn DiagnosisStore> = Arc::new(MemoryDiagnosisStore::new());
        return Ok((diagnoses, None));
    }

    let client = PostgrestClient::new(&config.store)?;
    info!(
        "Using PostgREST store: tables {} / {}",
        config.store.diagnoses_table, config.store.history_table
    );
    let diagnoses: Arc<dyn DiagnosisStore> = Arc::new(RestDiagnosisStore::new(
        client.clone(),
        config.store.diagnoses_table.clone(),
    ));
    let history: Arc<dyn HistoryStore> =
        Arc::new(RestHistoryStore::new(client, config.store.history_table.clone()));
    Ok((diagnoses, Some(history)))
}
