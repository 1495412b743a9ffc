// ABOUTME: HTTP middleware for request tracing, authentication, and CORS
// ABOUTME: Provides request ID spans, bearer token resolution, and cross-origin policy

pub mod auth;
pub mod cors;
pub mod tracing;

// Authentication
pub use auth::{authenticate_request, AuthenticatedUser};

// CORS configuration
pub use cors::setup_cors;

// Request tracing
pub use tracing::{create_request_span, request_id_for, REQUEST_ID_HEADER};
