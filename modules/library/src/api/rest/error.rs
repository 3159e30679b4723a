//! The single translation step from domain failures to HTTP error envelopes.

use apikit::{ApiError, ErrDef};
use serde_json::json;

use crate::domain::error::DomainError;

/// Status and default message per `error_code`.
pub mod catalog {
    use apikit::ErrDef;

    pub const USER_NOT_FOUND: ErrDef = ErrDef::new(404, "UserNotFound", "User not found");
    pub const BOOK_NOT_FOUND: ErrDef = ErrDef::new(404, "BookNotFound", "Book not found");
    pub const AUTHOR_NOT_FOUND: ErrDef = ErrDef::new(404, "AuthorNotFound", "Author not found");
    pub const CATEGORY_NOT_FOUND: ErrDef =
        ErrDef::new(404, "CategoryNotFound", "Category not found");
    pub const ROLE_NOT_FOUND: ErrDef = ErrDef::new(404, "RoleNotFound", "Role not found");
    pub const BORROW_RECORD_NOT_FOUND: ErrDef =
        ErrDef::new(404, "BorrowRecordNotFound", "Borrow record not found");

    pub const USER_IS_UNIQUE: ErrDef = ErrDef::new(409, "UserIsUnique", "User already exists");
    pub const BOOK_IS_UNIQUE: ErrDef = ErrDef::new(409, "BookIsUnique", "Book already exists");
    pub const AUTHOR_IS_UNIQUE: ErrDef =
        ErrDef::new(409, "AuthorIsUnique", "Author already exists");
    pub const CATEGORY_IS_UNIQUE: ErrDef =
        ErrDef::new(409, "CategoryIsUnique", "Category already exists");
    pub const ROLE_IS_UNIQUE: ErrDef = ErrDef::new(409, "RoleIsUnique", "Role already exists");

    pub const SYSTEM_ROLE_IS_IMMUTABLE: ErrDef = ErrDef::new(
        409,
        "SystemRoleIsImmutable",
        "System roles cannot be renamed or deleted",
    );
    pub const ROLE_IN_USE: ErrDef =
        ErrDef::new(409, "RoleInUse", "Role is still assigned to users");
    pub const CATEGORY_IN_USE: ErrDef =
        ErrDef::new(409, "CategoryInUse", "Category still has books");
    pub const AUTHOR_IN_USE: ErrDef = ErrDef::new(409, "AuthorInUse", "Author still has books");
    pub const BOOK_HAS_ACTIVE_LOANS: ErrDef =
        ErrDef::new(409, "BookHasActiveLoans", "Book has outstanding loans");
    pub const USER_HAS_ACTIVE_LOANS: ErrDef =
        ErrDef::new(409, "UserHasActiveLoans", "User has outstanding loans");
    pub const BOOK_HAS_LOAN_HISTORY: ErrDef =
        ErrDef::new(409, "BookHasLoanHistory", "Book has borrow records");
    pub const USER_HAS_LOAN_HISTORY: ErrDef =
        ErrDef::new(409, "UserHasLoanHistory", "User has borrow records");
    pub const BOOK_IS_OUT_OF_STOCK: ErrDef =
        ErrDef::new(409, "BookIsOutOfStock", "Book is out of stock");
    pub const BORROW_RECORD_NOT_OUTSTANDING: ErrDef = ErrDef::new(
        409,
        "BorrowRecordNotOutstanding",
        "Borrow record is already closed",
    );

    pub const INVALID_CREDENTIALS: ErrDef =
        ErrDef::new(401, "InvalidCredentials", "Invalid email or password");
    pub const UNAUTHORIZED: ErrDef = ErrDef::new(401, "Unauthorized", "Unauthorized");

    pub const USER_IS_INACTIVE: ErrDef =
        ErrDef::new(403, "UserIsInactive", "User account is inactive");
    pub const NOT_ABLE_ASSIGN_BOOK: ErrDef = ErrDef::new(
        403,
        "NotAbleAssignBook",
        "Members are not allowed to assign books",
    );
    pub const FORBIDDEN: ErrDef = ErrDef::new(403, "Forbidden", "Forbidden");

    pub const VALIDATION: ErrDef = ErrDef::new(400, "Validation", "Validation error");
    pub const INVALID_SORT_FIELD: ErrDef =
        ErrDef::new(400, "InvalidSortField", "Unknown sort field");
    pub const INVALID_RETURN_DATE: ErrDef =
        ErrDef::new(400, "InvalidReturnDate", "Return date is before the issue date");
    pub const INVALID_QUANTITY: ErrDef = ErrDef::new(
        400,
        "InvalidQuantity",
        "Quantity may not drop below the issued count",
    );

    pub const INTERNAL: ErrDef =
        ErrDef::new(500, "InternalServerError", "An internal error occurred");

    /// Every entry, for documentation and tests.
    pub const ALL: &[ErrDef] = &[
        USER_NOT_FOUND,
        BOOK_NOT_FOUND,
        AUTHOR_NOT_FOUND,
        CATEGORY_NOT_FOUND,
        ROLE_NOT_FOUND,
        BORROW_RECORD_NOT_FOUND,
        USER_IS_UNIQUE,
        BOOK_IS_UNIQUE,
        AUTHOR_IS_UNIQUE,
        CATEGORY_IS_UNIQUE,
        ROLE_IS_UNIQUE,
        SYSTEM_ROLE_IS_IMMUTABLE,
        ROLE_IN_USE,
        CATEGORY_IN_USE,
        AUTHOR_IN_USE,
        BOOK_HAS_ACTIVE_LOANS,
        USER_HAS_ACTIVE_LOANS,
        BOOK_HAS_LOAN_HISTORY,
        USER_HAS_LOAN_HISTORY,
        BOOK_IS_OUT_OF_STOCK,
        BORROW_RECORD_NOT_OUTSTANDING,
        INVALID_CREDENTIALS,
        UNAUTHORIZED,
        USER_IS_INACTIVE,
        NOT_ABLE_ASSIGN_BOOK,
        FORBIDDEN,
        VALIDATION,
        INVALID_SORT_FIELD,
        INVALID_RETURN_DATE,
        INVALID_QUANTITY,
        INTERNAL,
    ];
}

/// Catalog entry for a domain error.
pub fn err_def(e: &DomainError) -> &'static ErrDef {
    use catalog::*;

    match e {
        DomainError::UserNotFound { .. } => &USER_NOT_FOUND,
        DomainError::BookNotFound { .. } => &BOOK_NOT_FOUND,
        DomainError::AuthorNotFound { .. } => &AUTHOR_NOT_FOUND,
        DomainError::CategoryNotFound { .. } => &CATEGORY_NOT_FOUND,
        DomainError::RoleNotFound { .. } => &ROLE_NOT_FOUND,
        DomainError::BorrowRecordNotFound { .. } => &BORROW_RECORD_NOT_FOUND,
        DomainError::UserIsUnique { .. } => &USER_IS_UNIQUE,
        DomainError::BookIsUnique { .. } => &BOOK_IS_UNIQUE,
        DomainError::AuthorIsUnique { .. } => &AUTHOR_IS_UNIQUE,
        DomainError::CategoryIsUnique { .. } => &CATEGORY_IS_UNIQUE,
        DomainError::RoleIsUnique { .. } => &ROLE_IS_UNIQUE,
        DomainError::SystemRoleIsImmutable { .. } => &SYSTEM_ROLE_IS_IMMUTABLE,
        DomainError::RoleInUse { .. } => &ROLE_IN_USE,
        DomainError::CategoryInUse { .. } => &CATEGORY_IN_USE,
        DomainError::AuthorInUse { .. } => &AUTHOR_IN_USE,
        DomainError::BookHasActiveLoans { .. } => &BOOK_HAS_ACTIVE_LOANS,
        DomainError::UserHasActiveLoans { .. } => &USER_HAS_ACTIVE_LOANS,
        DomainError::BookHasLoanHistory { .. } => &BOOK_HAS_LOAN_HISTORY,
        DomainError::UserHasLoanHistory { .. } => &USER_HAS_LOAN_HISTORY,
        DomainError::BookIsOutOfStock { .. } => &BOOK_IS_OUT_OF_STOCK,
        DomainError::BorrowRecordNotOutstanding { .. } => &BORROW_RECORD_NOT_OUTSTANDING,
        DomainError::InvalidCredentials => &INVALID_CREDENTIALS,
        DomainError::Unauthorized { .. } => &UNAUTHORIZED,
        DomainError::UserIsInactive => &USER_IS_INACTIVE,
        DomainError::NotAbleAssignBook => &NOT_ABLE_ASSIGN_BOOK,
        DomainError::Forbidden => &FORBIDDEN,
        DomainError::Validation { .. } => &VALIDATION,
        DomainError::InvalidSortField { .. } => &INVALID_SORT_FIELD,
        DomainError::InvalidReturnDate { .. } => &INVALID_RETURN_DATE,
        DomainError::InvalidQuantity { .. } => &INVALID_QUANTITY,
        DomainError::Database { .. } => &INTERNAL,
    }
}

/// Map a domain error to the failure envelope.
pub fn map_domain_error(e: &DomainError) -> ApiError {
    let def = err_def(e);
    match e {
        DomainError::Database { .. } => {
            // Log the internal error details but don't expose them to the client
            tracing::error!(error = %e, "Database error occurred");
            def.to_error()
        }
        DomainError::Validation { field, .. } => {
            def.with_message(e.to_string()).with_data(json!({ "field": field }))
        }
        DomainError::InvalidQuantity { quantity, issued } => def
            .with_message(e.to_string())
            .with_data(json!({ "quantity": quantity, "issuedBook": issued })),
        DomainError::BookIsOutOfStock { book_id } => def
            .with_message(e.to_string())
            .with_data(json!({ "bookId": book_id })),
        DomainError::BorrowRecordNotOutstanding { id, status } => def
            .with_message(e.to_string())
            .with_data(json!({ "id": id, "status": status })),
        _ => def.with_message(e.to_string()),
    }
}

impl From<DomainError> for ApiError {
    fn from(e: DomainError) -> Self {
        map_domain_error(&e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use uuid::Uuid;

    #[test]
    fn codes_match_domain_names() {
        let samples = [
            DomainError::user_not_found(Uuid::nil()),
            DomainError::CategoryIsUnique {
                name: "Fiction".into(),
            },
            DomainError::NotAbleAssignBook,
            DomainError::BookIsOutOfStock {
                book_id: Uuid::nil(),
            },
            DomainError::InvalidCredentials,
            DomainError::InvalidSortField { field: "x".into() },
            DomainError::database("boom"),
        ];
        for e in &samples {
            assert_eq!(map_domain_error(e).code(), Some(e.code()));
        }
    }

    #[test]
    fn database_details_are_hidden() {
        let err = map_domain_error(&DomainError::database("relation books does not exist"));
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.body.message, "An internal error occurred");
        assert!(err.body.data.is_none());
    }

    #[test]
    fn out_of_stock_carries_the_book_id() {
        let id = Uuid::new_v4();
        let err = map_domain_error(&DomainError::BookIsOutOfStock { book_id: id });
        assert_eq!(err.status, StatusCode::CONFLICT);
        assert_eq!(err.body.data, Some(json!({ "bookId": id })));
    }

    #[test]
    fn catalog_codes_are_unique() {
        let mut codes: Vec<_> = catalog::ALL.iter().map(|d| d.code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), catalog::ALL.len());
    }
}
