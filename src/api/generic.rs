//! Generic API structures and server
//!
//! This module contains the response envelope, rejection types, the admin
//! auth filter, and the API server with its route table.

use std::convert::Infallible;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use warp::{
    http::{Method, StatusCode},
    Filter, Rejection, Reply,
};

use crate::config::Config;
use crate::context::RelayerContext;

// ============================================================================
// SHARED REQUEST/RESPONSE STRUCTURES
// ============================================================================

/// Standardized response structure for all API endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Whether the request was successful
    pub success: bool,
    /// Response data (if successful)
    pub data: Option<T>,
    /// Error message (if failed)
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

// ============================================================================
// CUSTOM REJECTION TYPES
// ============================================================================

/// Request failed validation (bad chain name, malformed hex, empty list).
#[derive(Debug)]
pub struct ValidationError(pub String);

impl warp::reject::Reject for ValidationError {}

/// A named resource does not exist.
#[derive(Debug)]
pub struct NotFoundError(pub String);

impl warp::reject::Reject for NotFoundError {}

/// The request conflicts with current state (duplicate receipt, terminal job).
#[derive(Debug)]
pub struct ConflictError(pub String);

impl warp::reject::Reject for ConflictError {}

/// Authorization header missing or malformed.
#[derive(Debug)]
pub struct Unauthorized;

impl warp::reject::Reject for Unauthorized {}

/// Authorization header present but the token does not match.
#[derive(Debug)]
pub struct Forbidden;

impl warp::reject::Reject for Forbidden {}

// ============================================================================
// WARP FILTER HELPERS
// ============================================================================

/// Creates a warp filter that injects the shared context into handlers.
pub fn with_context(
    ctx: Arc<RelayerContext>,
) -> impl Filter<Extract = (Arc<RelayerContext>,), Error = Infallible> + Clone {
    warp::any().map(move || ctx.clone())
}

/// Creates a warp filter that checks the admin bearer token.
///
/// Rejects with [`Unauthorized`] when the header is missing or not a bearer
/// token, and with [`Forbidden`] when the token does not match the
/// configured one.
pub fn admin_auth(config: Arc<Config>) -> impl Filter<Extract = (), Error = Rejection> + Clone {
    warp::header::optional::<String>("authorization")
        .and_then(move |header: Option<String>| {
            let expected = config.api.admin_token.clone();
            async move {
                let value = header.ok_or_else(|| warp::reject::custom(Unauthorized))?;
                let token = value
                    .strip_prefix("Bearer ")
                    .ok_or_else(|| warp::reject::custom(Unauthorized))?;
                if token == expected {
                    Ok(())
                } else {
                    Err(warp::reject::custom(Forbidden))
                }
            }
        })
        .untuple_one()
}

// ============================================================================
// CORS CONFIGURATION
// ============================================================================

/// Creates a CORS filter based on the configured allowed origins.
fn create_cors_filter(allowed_origins: &[String]) -> warp::cors::Builder {
    let methods = vec![
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
    ];

    if allowed_origins.contains(&"*".to_string()) {
        warp::cors()
            .allow_any_origin()
            .allow_methods(methods.clone())
            .allow_headers(vec!["content-type", "authorization"])
    } else {
        let origins: Vec<&str> = allowed_origins.iter().map(|s| s.as_str()).collect();
        warp::cors()
            .allow_origins(origins)
            .allow_methods(methods)
            .allow_headers(vec!["content-type", "authorization"])
    }
}

// ============================================================================
// REJECTION HANDLER
// ============================================================================

/// Global rejection handler for all API routes.
///
/// Converts rejections into the standardized response envelope with the
/// appropriate HTTP status code.
pub async fn handle_rejection(rej: Rejection) -> Result<impl Reply, Infallible> {
    let (status, message) = if let Some(err) = rej.find::<ValidationError>() {
        (StatusCode::BAD_REQUEST, err.0.clone())
    } else if let Some(err) = rej.find::<NotFoundError>() {
        (StatusCode::NOT_FOUND, err.0.clone())
    } else if let Some(err) = rej.find::<ConflictError>() {
        (StatusCode::CONFLICT, err.0.clone())
    } else if rej.find::<Unauthorized>().is_some() {
        (
            StatusCode::UNAUTHORIZED,
            "Missing or malformed authorization header".to_string(),
        )
    } else if rej.find::<Forbidden>().is_some() {
        (StatusCode::FORBIDDEN, "Invalid admin token".to_string())
    } else if let Some(err) = rej.find::<warp::filters::body::BodyDeserializeError>() {
        (StatusCode::BAD_REQUEST, format!("Invalid JSON: {}", err))
    } else if rej.is_not_found() {
        (StatusCode::NOT_FOUND, "Endpoint not found".to_string())
    } else if rej.find::<warp::reject::MethodNotAllowed>().is_some() {
        (
            StatusCode::METHOD_NOT_ALLOWED,
            "Method not allowed".to_string(),
        )
    } else {
        error!("Unhandled rejection: {:?}", rej);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error".to_string(),
        )
    };

    Ok(warp::reply::with_status(
        warp::reply::json(&ApiResponse::<()> {
            success: false,
            data: None,
            error: Some(message),
        }),
        status,
    ))
}

// ============================================================================
// API SERVER IMPLEMENTATION
// ============================================================================

/// REST API server for the relayer service.
pub struct ApiServer {
    ctx: Arc<RelayerContext>,
}

impl ApiServer {
    /// Creates a new API server from a validated configuration, building the
    /// shared context (stores and per-chain clients).
    pub fn new(config: Config) -> Result<Self> {
        Ok(Self {
            ctx: Arc::new(RelayerContext::new(config)?),
        })
    }

    /// Creates an API server around an existing context.
    pub fn with_context(ctx: Arc<RelayerContext>) -> Self {
        Self { ctx }
    }

    /// Shared context handle, for seeding stores in tests and tools.
    pub fn context(&self) -> Arc<RelayerContext> {
        self.ctx.clone()
    }

    /// Starts the API server and begins handling HTTP requests.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - Server ran to completion
    /// * `Err(anyhow::Error)` - Failed to bind the configured address
    pub async fn run(&self) -> Result<()> {
        info!(
            "Starting API server on {}:{}",
            self.ctx.config.api.host, self.ctx.config.api.port
        );

        let routes = self.create_routes();

        let addr: std::net::SocketAddr =
            format!("{}:{}", self.ctx.config.api.host, self.ctx.config.api.port)
                .parse()
                .context("Failed to parse API server address")?;

        warp::serve(routes).run(addr).await;

        Ok(())
    }

    /// Creates all API routes for the server.
    pub(crate) fn create_routes(
        &self,
    ) -> impl Filter<Extract = impl warp::Reply, Error = std::convert::Infallible> + Clone {
        use super::bridge;

        let ctx = self.ctx.clone();
        let config = self.ctx.config.clone();

        // Health check endpoint - returns service status
        let health = warp::path("health").and(warp::get()).map(|| {
            warp::reply::json(&ApiResponse::<String>::ok(
                "Relayer Service is running".to_string(),
            ))
        });

        // POST /api/bridge/relay - fan out one job per target chain
        let relay = warp::path!("api" / "bridge" / "relay")
            .and(warp::post())
            .and(admin_auth(config.clone()))
            .and(with_context(ctx.clone()))
            .and(warp::body::json())
            .and_then(bridge::relay_handler);

        // GET /api/bridge/status/:doc_hash - aggregated cross-chain status
        let status = warp::path!("api" / "bridge" / "status" / String)
            .and(warp::get())
            .and(with_context(ctx.clone()))
            .and_then(bridge::status_handler);

        // GET /api/bridge/jobs/:id - single job lookup (audit trail)
        let get_job = warp::path!("api" / "bridge" / "jobs" / uuid::Uuid)
            .and(warp::get())
            .and(with_context(ctx.clone()))
            .and_then(bridge::get_job_handler);

        // POST /api/bridge/jobs/:id/cancel - stop a running pipeline
        let cancel_job = warp::path!("api" / "bridge" / "jobs" / uuid::Uuid / "cancel")
            .and(warp::post())
            .and(admin_auth(config.clone()))
            .and(with_context(ctx.clone()))
            .and_then(bridge::cancel_job_handler);

        // POST /api/receipts - register a receipt
        let create_receipt = warp::path!("api" / "receipts")
            .and(warp::post())
            .and(admin_auth(config))
            .and(with_context(ctx.clone()))
            .and(warp::body::json())
            .and_then(bridge::create_receipt_handler);

        // GET /api/receipts/:hash - receipt with its cross-chain status
        let get_receipt = warp::path!("api" / "receipts" / String)
            .and(warp::get())
            .and(with_context(ctx))
            .and_then(bridge::receipt_handler);

        // Combine all routes and apply rejection handler
        health
            .or(relay)
            .or(status)
            .or(get_job)
            .or(cancel_job)
            .or(create_receipt)
            .or(get_receipt)
            .with(create_cors_filter(&self.ctx.config.api.cors_origins))
            .recover(handle_rejection)
    }

    /// Public method for testing - exposes routes for integration tests
    #[allow(dead_code)] // Used by tests
    pub fn test_routes(
        &self,
    ) -> impl Filter<Extract = impl warp::Reply, Error = std::convert::Infallible> + Clone {
        self.create_routes()
    }
}
