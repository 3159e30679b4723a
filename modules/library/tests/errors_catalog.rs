use std::collections::HashSet;

use axum::http::StatusCode;
use uuid::Uuid;

use library::api::rest::error::{catalog, err_def, map_domain_error};
use library::contract::model::BorrowStatus;
use library::domain::error::DomainError;

#[test]
fn error_codes_have_correct_status() {
    assert_eq!(catalog::BOOK_NOT_FOUND.status, 404);
    assert_eq!(catalog::CATEGORY_IS_UNIQUE.status, 409);
    assert_eq!(catalog::BOOK_IS_OUT_OF_STOCK.status, 409);
    assert_eq!(catalog::INVALID_CREDENTIALS.status, 401);
    assert_eq!(catalog::NOT_ABLE_ASSIGN_BOOK.status, 403);
    assert_eq!(catalog::USER_IS_INACTIVE.status, 403);
    assert_eq!(catalog::INVALID_SORT_FIELD.status, 400);
    assert_eq!(catalog::INTERNAL.status, 500);
}

#[test]
fn codes_are_unique_and_statuses_valid() {
    let mut seen = HashSet::new();
    for def in catalog::ALL {
        assert!(seen.insert(def.code), "duplicate code {}", def.code);
        assert!(
            (400..=599).contains(&def.status),
            "invalid status {} for {}",
            def.status,
            def.code
        );
    }
}

#[test]
fn domain_errors_map_to_their_own_code() {
    let id = Uuid::new_v4();
    let cases = [
        (DomainError::UserNotFound { id }, "UserNotFound"),
        (DomainError::InvalidCredentials, "InvalidCredentials"),
        (DomainError::NotAbleAssignBook, "NotAbleAssignBook"),
        (DomainError::BookIsOutOfStock { book_id: id }, "BookIsOutOfStock"),
        (
            DomainError::InvalidSortField {
                field: "x".into(),
            },
            "InvalidSortField",
        ),
        (
            DomainError::BorrowRecordNotOutstanding {
                id,
                status: BorrowStatus::Lost,
            },
            "BorrowRecordNotOutstanding",
        ),
    ];

    for (err, code) in cases {
        assert_eq!(err_def(&err).code, code);
        assert_eq!(map_domain_error(&err).code(), Some(code));
    }
}

#[test]
fn database_errors_hide_their_detail() {
    let err = DomainError::Database {
        message: "SQLITE_BUSY: database is locked".into(),
    };

    let api = map_domain_error(&err);

    assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(api.code(), Some("InternalServerError"));
    assert!(!api.body.message.contains("SQLITE"));
}

#[test]
fn out_of_stock_carries_the_book_id() {
    let book_id = Uuid::new_v4();

    let api = map_domain_error(&DomainError::BookIsOutOfStock { book_id });

    assert_eq!(api.status, StatusCode::CONFLICT);
    let data = api.body.data.expect("data attached");
    assert_eq!(data["bookId"], book_id.to_string());
}
