//! HTTP front-end for the churn predictor

use crate::error::{ChurnError, ErrorKind};
use crate::metrics::PredictionMetrics;
use crate::predictor::ChurnPredictor;
use crate::types::customer::RawInput;
use crate::views;
use axum::{
    extract::{rejection::FormRejection, Form, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tower_http::trace::TraceLayer;
use tracing::{debug, error};

/// Shared state handed to every request handler
#[derive(Clone)]
pub struct AppState {
    pub predictor: Arc<ChurnPredictor>,
    pub metrics: Arc<PredictionMetrics>,
    /// When false, failures still answer 200 with an error body
    pub strict_status_codes: bool,
}

impl AppState {
    pub fn new(
        predictor: Arc<ChurnPredictor>,
        metrics: Arc<PredictionMetrics>,
        strict_status_codes: bool,
    ) -> Self {
        Self {
            predictor,
            metrics,
            strict_status_codes,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/predict", post(predict))
        .route("/health", get(health_check))
        .route("/stats", get(stats))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn index(State(state): State<AppState>) -> Response {
    match views::render_form() {
        Ok(html) => Html(html).into_response(),
        Err(e) => error_response(&state, &e),
    }
}

pub async fn predict(
    State(state): State<AppState>,
    form: Result<Form<HashMap<String, String>>, FormRejection>,
) -> Response {
    let start = Instant::now();
    // An unreadable body is reported like a form with every field missing
    let raw = match form {
        Ok(Form(fields)) => RawInput::new(fields),
        Err(rejection) => {
            debug!(%rejection, "Unreadable form body");
            RawInput::default()
        }
    };

    let rendered = state
        .predictor
        .predict(&raw)
        .and_then(|result| views::render_result(&result).map(|html| (result, html)));

    match rendered {
        Ok((result, html)) => {
            state.metrics.record_prediction(start.elapsed(), &result);
            Html(html).into_response()
        }
        Err(e) => {
            state.metrics.record_failure(start.elapsed(), e.kind());
            error_response(&state, &e)
        }
    }
}

pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

pub async fn stats(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.metrics.snapshot())
}

/// Plain-text `Error: <message>` body
fn error_response(state: &AppState, err: &ChurnError) -> Response {
    if err.kind() == ErrorKind::Render {
        error!(error = %err, "Failed to render page");
    }

    let status = if state.strict_status_codes {
        status_for(err.kind())
    } else {
        StatusCode::OK
    };
    (status, format!("Error: {err}")).into_response()
}

pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Input => StatusCode::BAD_REQUEST,
        ErrorKind::Inference | ErrorKind::Render => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_for(ErrorKind::Input), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(ErrorKind::Inference), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(status_for(ErrorKind::Render), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
