use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

/// Server-level errors. Pipeline and store errors fold into `net_est_core::Error`
/// at their crate boundary and arrive here already classified by kind.
#[derive(Error, Debug)]
pub enum ServerError {
    #[error(transparent)]
    Core(#[from] net_est_core::Error),

    #[error("invalid query parameter: {0}")]
    InvalidQuery(String),
}

impl From<net_est_pipeline::PipelineError> for ServerError {
    fn from(err: net_est_pipeline::PipelineError) -> Self {
        ServerError::Core(err.into())
    }
}

impl From<net_est_store::PersistenceError> for ServerError {
    fn from(err: net_est_store::PersistenceError) -> Self {
        ServerError::Core(err.into())
    }
}

impl ServerError {
    fn status_and_kind(&self) -> (StatusCode, &'static str) {
        match self {
            ServerError::Core(net_est_core::Error::InvalidInput(_)) => (StatusCode::BAD_REQUEST, "invalid_input"),
            ServerError::Core(net_est_core::Error::InvalidOffsets(_)) => (StatusCode::BAD_REQUEST, "invalid_offsets"),
            ServerError::Core(net_est_core::Error::NotFound(_)) => (StatusCode::NOT_FOUND, "not_found"),
            ServerError::Core(net_est_core::Error::IllegalTransition(_)) => (StatusCode::CONFLICT, "illegal_transition"),
            ServerError::Core(net_est_core::Error::Resource(_)) => (StatusCode::SERVICE_UNAVAILABLE, "resource_unavailable"),
            ServerError::Core(net_est_core::Error::Internal(_)) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
            ServerError::InvalidQuery(_) => (StatusCode::BAD_REQUEST, "invalid_query"),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, kind) = self.status_and_kind();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, "request rejected");
        }
        (
            status,
            Json(serde_json::json!({
                "error": kind,
                "message": self.to_string(),
            })),
        )
            .into_response()
    }
}
