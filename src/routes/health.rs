// ABOUTME: Health check route handlers for service monitoring
// ABOUTME: Provides a liveness endpoint and a readiness endpoint that checks the database
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Saedam Contributors

//! Health check routes for service monitoring

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use serde_json::{json, Value};

use crate::constants::service_names::HEALTH_MESSAGE;
use crate::errors::AppResult;
use crate::resources::ServerResources;

/// Health routes implementation
pub struct HealthRoutes;

impl HealthRoutes {
    /// Create all health check routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/v1/health", get(Self::health))
            .route("/api/v1/ready", get(Self::ready))
            .with_state(resources)
    }

    async fn health() -> Json<Value> {
        Json(json!({
            "status": "ok",
            "message": HEALTH_MESSAGE,
        }))
    }

    async fn ready(State(resources): State<Arc<ServerResources>>) -> AppResult<Json<Value>> {
        resources.store.health_check().await?;
        Ok(Json(json!({
            "status": "ready",
            "database": "ok",
            "timestamp": chrono::Utc::now().to_rfc3339(),
        })))
    }
}
