// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! HTTP server setup

use std::any::Any;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Body;
use axum::http::Request;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{self, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, info_span};
use uuid::Uuid;

use super::diagnose::{diagnose_handler, liveness_handler, method_not_allowed_handler};
use super::errors::ApiError;
use crate::auth::IdentityVerifier;
use crate::diagnosis::DiagnosisService;

/// Default path of the diagnose endpoint
pub const DEFAULT_DIAGNOSE_PATH: &str = "/api/diagnose";

/// Shared handles for request handlers
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<DiagnosisService>,
    pub identity: Arc<dyn IdentityVerifier>,
    pub diagnose_path: String,
}

impl AppState {
    pub fn new(service: Arc<DiagnosisService>, identity: Arc<dyn IdentityVerifier>) -> Self {
        Self {
            service,
            identity,
            diagnose_path: DEFAULT_DIAGNOSE_PATH.to_string(),
        }
    }

    pub fn with_diagnose_path(mut self, path: impl Into<String>) -> Self {
        self.diagnose_path = path.into();
        self
    }
}

/// Build the application router
pub fn create_app(state: AppState) -> Router {
    let path = state.diagnose_path.clone();

    Router::new()
        .route(
            &path,
            post(diagnose_handler)
                .get(liveness_handler)
                .fallback(method_not_allowed_handler),
        )
        .route("/health", get(liveness_handler))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                info_span!(
                    "http_request",
                    request_id = %Uuid::new_v4(),
                    method = %request.method(),
                    uri = %request.uri(),
                )
            }),
        )
        .layer(
            CorsLayer::new()
                .allow_origin(cors::Any)
                .allow_methods(cors::Any)
                .allow_headers(cors::Any),
        )
        .with_state(state)
}

/// Serve until `shutdown` resolves
pub async fn start_server<F>(state: AppState, addr: SocketAddr, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let path = state.diagnose_path.clone();
    let app = create_app(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("API server listening on {} (diagnose path {})", addr, path);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("API server stopped");
    Ok(())
}

fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };
    error!("Request handler panicked: {}", detail);
    ApiError::Internal(detail).into_response()
}
