use axum::{http::StatusCode, Json};

use crate::envelope::{ApiError, Envelope};

/// Handler return type: status + enveloped payload, or an error envelope.
pub type ApiResult<T> = Result<(StatusCode, Json<Envelope<T>>), ApiError>;

/// 200 OK + enveloped JSON
pub fn ok<T>(data: T) -> (StatusCode, Json<Envelope<T>>) {
    (StatusCode::OK, Json(Envelope::new(data)))
}

/// 200 OK + enveloped JSON with a message
pub fn ok_with_message<T>(message: impl Into<String>, data: T) -> (StatusCode, Json<Envelope<T>>) {
    (StatusCode::OK, Json(Envelope::new(data).with_message(message)))
}

/// 201 Created + enveloped JSON
pub fn created<T>(message: impl Into<String>, data: T) -> (StatusCode, Json<Envelope<T>>) {
    (
        StatusCode::CREATED,
        Json(Envelope::new(data).with_message(message)),
    )
}
