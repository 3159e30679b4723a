use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Success envelope.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Envelope<T> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub data: T,
}

impl<T> Envelope<T> {
    pub fn new(data: T) -> Self {
        Self {
            message: None,
            data,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// Failure envelope.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(title = "ErrorEnvelope")]
pub struct ErrorEnvelope {
    /// Human-readable message, shown verbatim by clients.
    pub message: String,
    /// Stable machine-readable code, e.g. `BookIsOutOfStock`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Object)]
    pub data: Option<serde_json::Value>,
}

/// Axum error response: a status plus the failure envelope.
#[derive(Debug, Clone)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorEnvelope,
}

impl ApiError {
    pub fn new(status: StatusCode, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorEnvelope {
                message: message.into(),
                error_code: Some(code.into()),
                data: None,
            },
        }
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.body.data = Some(data);
        self
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "BadRequest", message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "Unauthorized", message)
    }

    pub fn internal() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "InternalServerError",
            "An internal error occurred",
        )
    }

    pub fn code(&self) -> Option<&str> {
        self.body.error_code.as_deref()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[test]
    fn success_envelope_omits_missing_message() {
        let v = serde_json::to_value(Envelope::new(5)).unwrap();
        assert_eq!(v, serde_json::json!({ "data": 5 }));

        let v = serde_json::to_value(Envelope::new("x").with_message("done")).unwrap();
        assert_eq!(v, serde_json::json!({ "message": "done", "data": "x" }));
    }

    #[tokio::test]
    async fn api_error_renders_status_and_body() {
        let err = ApiError::new(StatusCode::CONFLICT, "BookIsOutOfStock", "Book is out of stock")
            .with_data(serde_json::json!({ "bookId": "b1" }));
        assert_eq!(err.code(), Some("BookIsOutOfStock"));

        let resp = err.into_response();
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["message"], "Book is out of stock");
        assert_eq!(body["error_code"], "BookIsOutOfStock");
        assert_eq!(body["data"]["bookId"], "b1");
    }

    #[test]
    fn internal_error_hides_details() {
        let err = ApiError::internal();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.body.message, "An internal error occurred");
        assert!(err.body.data.is_none());
    }
}
