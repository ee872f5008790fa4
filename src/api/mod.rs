//! REST API Server Module
//!
//! This module provides the REST API server for the relayer service:
//! relay triggering, status queries, receipt registration and lookup, and
//! job cancellation. Relay-triggering and mutating endpoints require the
//! configured admin bearer token.

// Generic shared code (server, response envelope, rejections, auth, CORS)
mod generic;

// Bridge and receipt route handlers
mod bridge;

// Re-export ApiServer for convenience
pub use generic::ApiServer;
// Re-export ApiResponse for testing
#[allow(unused_imports)]
pub use generic::ApiResponse;
