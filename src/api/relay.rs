//! Relay endpoint: the only place the model credential is used
//!
//! Accepts `{"action": ..., "payload": {...}}` and answers with the
//! normalized model result. Failures never echo upstream detail.

use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use serde::Serialize;
use tracing::Instrument;

use super::ApiState;
use crate::gateway::wire::{GradingResponse, PronunciationResponse, RelayRequest};
use crate::voice::encode_base64;

/// Build relay router
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new().route("/", post(relay)).with_state(state)
}

async fn relay(State(state): State<Arc<ApiState>>, body: Bytes) -> Result<Response, RelayError> {
    let request: RelayRequest = serde_json::from_slice(&body).map_err(|e| {
        tracing::debug!(error = %e, "rejected relay request");
        RelayError::InvalidAction
    })?;

    let span = tracing::info_span!(
        "relay",
        request_id = %uuid::Uuid::new_v4(),
        action = request.action()
    );

    dispatch(&state, request).instrument(span).await
}

async fn dispatch(state: &ApiState, request: RelayRequest) -> Result<Response, RelayError> {
    match request {
        RelayRequest::GeneratePronunciation { word } => {
            let audio = state.gateway.pronounce(&word).await.map_err(|e| {
                tracing::error!(error = %e, "pronunciation failed");
                RelayError::Internal
            })?;

            let audio_data = (!audio.is_empty()).then(|| encode_base64(&audio));
            tracing::info!(word = %word, bytes = audio.len(), "pronunciation relayed");

            Ok(Json(PronunciationResponse { audio_data }).into_response())
        }
        RelayRequest::CheckHandwriting {
            image_data_url,
            word,
        } => {
            let text = state
                .gateway
                .grade(&image_data_url, &word)
                .await
                .map_err(|e| {
                    tracing::error!(error = %e, "handwriting check failed");
                    RelayError::Internal
                })?;

            tracing::info!(word = %word, answer = %text, "handwriting check relayed");

            Ok(Json(GradingResponse {
                text: text.trim().to_string(),
            })
            .into_response())
        }
    }
}

/// Relay API errors
#[derive(Debug)]
pub enum RelayError {
    InvalidAction,
    Internal,
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorResponse {
            error: &'static str,
        }

        match self {
            Self::InvalidAction => (StatusCode::BAD_REQUEST, "Invalid action").into_response(),
            Self::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "An internal error occurred.",
                }),
            )
                .into_response(),
        }
    }
}
