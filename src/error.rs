//! Error types for OrderMgmt
//!
//! Every failure surfaced by the store, the shipment pipeline and the RPC
//! handlers is an [`OrderError`]. The same value is rendered as a gRPC
//! status or as a JSON HTTP response depending on the surface it leaves by.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Result type alias for OrderMgmt operations
pub type Result<T> = std::result::Result<T, OrderError>;

#[derive(Debug, Error)]
pub enum OrderError {
    /// Requested identifier is absent from the store
    #[error("Not found: {0}")]
    NotFound(String),

    /// Malformed request or parameters
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Unexpected failure, e.g. identifier generation
    #[error("Internal error: {0}")]
    Internal(String),

    /// Transport-level failure while receiving from a stream
    #[error("Stream error: {0}")]
    Stream(#[from] tonic::Status),

    /// The peer stopped consuming an outbound stream
    #[error("Stream closed: {0}")]
    StreamClosed(String),

    /// The server is shutting down
    #[error("Unavailable: {0}")]
    Unavailable(String),
}

impl OrderError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, OrderError::NotFound(_))
    }
}

impl IntoResponse for OrderError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            OrderError::NotFound(ref id) => {
                tracing::debug!("Not found: {}", id);
                (StatusCode::NOT_FOUND, format!("Not found: {}", id))
            }
            OrderError::InvalidArgument(ref msg) => {
                tracing::warn!("Invalid argument: {}", msg);
                (StatusCode::BAD_REQUEST, msg.clone())
            }
            OrderError::Internal(ref msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".to_string())
            }
            OrderError::Stream(ref status) => {
                tracing::error!("Stream error: {}", status);
                (StatusCode::BAD_GATEWAY, "Stream error".to_string())
            }
            OrderError::StreamClosed(ref msg) => {
                tracing::debug!("Stream closed: {}", msg);
                (StatusCode::BAD_GATEWAY, "Stream closed".to_string())
            }
            OrderError::Unavailable(ref msg) => {
                tracing::info!("Unavailable: {}", msg);
                (StatusCode::SERVICE_UNAVAILABLE, msg.clone())
            }
        };

        let body = Json(json!({
            "error": error_message,
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}

impl From<OrderError> for tonic::Status {
    fn from(error: OrderError) -> Self {
        match error {
            OrderError::NotFound(id) => tonic::Status::not_found(format!("Not found: {}", id)),
            OrderError::InvalidArgument(msg) => tonic::Status::invalid_argument(msg),
            OrderError::Internal(msg) => tonic::Status::internal(msg),
            OrderError::Stream(status) => status,
            OrderError::StreamClosed(msg) => tonic::Status::cancelled(msg),
            OrderError::Unavailable(msg) => tonic::Status::unavailable(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = OrderError::NotFound("101".to_string());
        assert_eq!(error.to_string(), "Not found: 101");

        let error = OrderError::InvalidArgument("order id must not be empty".to_string());
        assert_eq!(
            error.to_string(),
            "Invalid argument: order id must not be empty"
        );
    }

    #[test]
    fn test_error_into_status_code() {
        let response = OrderError::NotFound("101".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = OrderError::InvalidArgument("bad".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = OrderError::Internal("boom".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_error_into_grpc_status() {
        let status = tonic::Status::from(OrderError::NotFound("101".to_string()));
        assert_eq!(status.code(), tonic::Code::NotFound);

        let status = tonic::Status::from(OrderError::InvalidArgument("bad".to_string()));
        assert_eq!(status.code(), tonic::Code::InvalidArgument);

        let status = tonic::Status::from(OrderError::StreamClosed("gone".to_string()));
        assert_eq!(status.code(), tonic::Code::Cancelled);

        let status = tonic::Status::from(OrderError::Unavailable("shutting down".to_string()));
        assert_eq!(status.code(), tonic::Code::Unavailable);
    }

    #[test]
    fn test_stream_status_passes_through() {
        let original = tonic::Status::unavailable("connection reset");
        let status = tonic::Status::from(OrderError::from(original));
        assert_eq!(status.code(), tonic::Code::Unavailable);
        assert_eq!(status.message(), "connection reset");
    }
}
