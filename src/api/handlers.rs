use crate::models::{BatchInput, BatchOutcome};
use crate::service::{run_input, MatcherService};
use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Request body: payment ids to match from the database
#[derive(Debug, Deserialize)]
pub struct BatchMatchRequest {
    pub payment_ids: Vec<i64>,
}

/// Response body
#[derive(Debug, Serialize)]
pub struct BatchMatchResponse {
    pub success: bool,
    pub message: String,
    pub outcome: Option<BatchOutcome>,
}

impl BatchMatchResponse {
    fn ok(outcome: BatchOutcome) -> Self {
        Self {
            success: true,
            message: format!(
                "Matched {} payments, {} rejected",
                outcome.results.len(),
                outcome.rejected.len()
            ),
            outcome: Some(outcome),
        }
    }
}

/// Health check
pub async fn health_check() -> &'static str {
    "OK"
}

/// Match stored payments against the stored errand snapshot.
pub async fn batch_match(
    State(service): State<Arc<MatcherService>>,
    Json(req): Json<BatchMatchRequest>,
) -> Response {
    match service.match_payments(&req.payment_ids).await {
        Ok(outcome) => (StatusCode::OK, Json(BatchMatchResponse::ok(outcome))).into_response(),
        Err(e) => {
            tracing::error!("Batch match failed: {}", e);
            let response = BatchMatchResponse {
                success: false,
                message: format!("Error: {}", e),
                outcome: None,
            };
            (StatusCode::INTERNAL_SERVER_ERROR, Json(response)).into_response()
        }
    }
}

/// Match a self-contained batch (payments, snapshot and tables in the body).
pub async fn inline_match(Json(input): Json<BatchInput>) -> Response {
    match tokio::task::spawn_blocking(move || run_input(input)).await {
        Ok(outcome) => (StatusCode::OK, Json(BatchMatchResponse::ok(outcome))).into_response(),
        Err(e) => {
            tracing::error!("Inline match task failed: {}", e);
            let response = BatchMatchResponse {
                success: false,
                message: format!("Error: {}", e),
                outcome: None,
            };
            (StatusCode::INTERNAL_SERVER_ERROR, Json(response)).into_response()
        }
    }
}
