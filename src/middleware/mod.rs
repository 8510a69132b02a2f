// ABOUTME: HTTP middleware configuration shared by the router
// ABOUTME: Currently provides the cross-origin policy layer

pub mod cors;

// CORS configuration
pub use cors::setup_cors;
