//! Catalog-driven error building.
use axum::http::StatusCode;

use crate::envelope::ApiError;

/// Static error definition from a module's catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrDef {
    pub status: u16,
    pub code: &'static str,
    /// Default user-facing message.
    pub message: &'static str,
}

impl ErrDef {
    pub const fn new(status: u16, code: &'static str, message: &'static str) -> Self {
        Self {
            status,
            code,
            message,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Error with the catalog message.
    #[inline]
    pub fn to_error(&self) -> ApiError {
        ApiError::new(self.status_code(), self.code, self.message)
    }

    /// Error with an occurrence-specific message.
    #[inline]
    pub fn with_message(&self, message: impl Into<String>) -> ApiError {
        ApiError::new(self.status_code(), self.code, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOT_FOUND: ErrDef = ErrDef::new(404, "BookNotFound", "Book not found");

    #[test]
    fn err_def_to_error_works() {
        let err = NOT_FOUND.to_error();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert_eq!(err.body.message, "Book not found");
        assert_eq!(err.code(), Some("BookNotFound"));

        let err = NOT_FOUND.with_message("Book b1 not found");
        assert_eq!(err.body.message, "Book b1 not found");
    }

    #[test]
    fn invalid_status_falls_back_to_500() {
        let def = ErrDef::new(1000, "Weird", "weird");
        assert_eq!(def.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
