use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

use crate::contract::model::BorrowStatus;

/// Every rejection the domain can produce. Variant names double as the
/// `error_code` clients see.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    // --- not found ---
    #[error("User not found: {id}")]
    UserNotFound { id: Uuid },

    #[error("Book not found: {id}")]
    BookNotFound { id: Uuid },

    #[error("Author not found: {id}")]
    AuthorNotFound { id: Uuid },

    #[error("Category not found: {id}")]
    CategoryNotFound { id: Uuid },

    #[error("Role not found: {id}")]
    RoleNotFound { id: Uuid },

    #[error("Borrow record not found: {id}")]
    BorrowRecordNotFound { id: Uuid },

    // --- natural-key conflicts ---
    #[error("User with email '{email}' already exists")]
    UserIsUnique { email: String },

    #[error("Book with title '{title}' already exists")]
    BookIsUnique { title: String },

    #[error("Author '{name}' already exists")]
    AuthorIsUnique { name: String },

    #[error("Category '{name}' already exists")]
    CategoryIsUnique { name: String },

    #[error("Role '{name}' already exists")]
    RoleIsUnique { name: String },

    #[error("System role '{name}' cannot be renamed or deleted")]
    SystemRoleIsImmutable { name: String },

    // --- referential guards ---
    #[error("Role {id} is assigned to {users} user(s)")]
    RoleInUse { id: Uuid, users: u64 },

    #[error("Category {id} has {books} book(s)")]
    CategoryInUse { id: Uuid, books: u64 },

    #[error("Author {id} has {books} book(s)")]
    AuthorInUse { id: Uuid, books: u64 },

    #[error("Book {id} has {loans} outstanding loan(s)")]
    BookHasActiveLoans { id: Uuid, loans: u64 },

    #[error("User {id} has {loans} outstanding loan(s)")]
    UserHasActiveLoans { id: Uuid, loans: u64 },

    #[error("Book {id} appears in {loans} borrow record(s)")]
    BookHasLoanHistory { id: Uuid, loans: u64 },

    #[error("User {id} appears in {loans} borrow record(s)")]
    UserHasLoanHistory { id: Uuid, loans: u64 },

    // --- authentication / authorization ---
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("User account is inactive")]
    UserIsInactive,

    #[error("Unauthorized: {reason}")]
    Unauthorized { reason: String },

    #[error("Forbidden")]
    Forbidden,

    // --- lending ---
    #[error("Members are not allowed to assign books")]
    NotAbleAssignBook,

    #[error("Book {book_id} is out of stock")]
    BookIsOutOfStock { book_id: Uuid },

    #[error("Borrow record {id} is already {status}")]
    BorrowRecordNotOutstanding { id: Uuid, status: BorrowStatus },

    #[error("Return date {return_date} is before issue date {issue_date}")]
    InvalidReturnDate {
        return_date: NaiveDate,
        issue_date: NaiveDate,
    },

    #[error("Quantity {quantity} is below the {issued} issued unit(s)")]
    InvalidQuantity { quantity: i32, issued: i32 },

    // --- input ---
    #[error("Validation error on '{field}': {message}")]
    Validation { field: String, message: String },

    #[error("Unknown sort field '{field}'")]
    InvalidSortField { field: String },

    #[error("Database error: {message}")]
    Database { message: String },
}

impl DomainError {
    pub fn user_not_found(id: Uuid) -> Self {
        Self::UserNotFound { id }
    }

    pub fn book_not_found(id: Uuid) -> Self {
        Self::BookNotFound { id }
    }

    pub fn author_not_found(id: Uuid) -> Self {
        Self::AuthorNotFound { id }
    }

    pub fn category_not_found(id: Uuid) -> Self {
        Self::CategoryNotFound { id }
    }

    pub fn role_not_found(id: Uuid) -> Self {
        Self::RoleNotFound { id }
    }

    pub fn borrow_record_not_found(id: Uuid) -> Self {
        Self::BorrowRecordNotFound { id }
    }

    pub fn unauthorized(reason: impl Into<String>) -> Self {
        Self::Unauthorized {
            reason: reason.into(),
        }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }

    /// Stable machine-readable name, used as `error_code`.
    pub fn code(&self) -> &'static str {
        match self {
            Self::UserNotFound { .. } => "UserNotFound",
            Self::BookNotFound { .. } => "BookNotFound",
            Self::AuthorNotFound { .. } => "AuthorNotFound",
            Self::CategoryNotFound { .. } => "CategoryNotFound",
            Self::RoleNotFound { .. } => "RoleNotFound",
            Self::BorrowRecordNotFound { .. } => "BorrowRecordNotFound",
            Self::UserIsUnique { .. } => "UserIsUnique",
            Self::BookIsUnique { .. } => "BookIsUnique",
            Self::AuthorIsUnique { .. } => "AuthorIsUnique",
            Self::CategoryIsUnique { .. } => "CategoryIsUnique",
            Self::RoleIsUnique { .. } => "RoleIsUnique",
            Self::SystemRoleIsImmutable { .. } => "SystemRoleIsImmutable",
            Self::RoleInUse { .. } => "RoleInUse",
            Self::CategoryInUse { .. } => "CategoryInUse",
            Self::AuthorInUse { .. } => "AuthorInUse",
            Self::BookHasActiveLoans { .. } => "BookHasActiveLoans",
            Self::UserHasActiveLoans { .. } => "UserHasActiveLoans",
            Self::BookHasLoanHistory { .. } => "BookHasLoanHistory",
            Self::UserHasLoanHistory { .. } => "UserHasLoanHistory",
            Self::InvalidCredentials => "InvalidCredentials",
            Self::UserIsInactive => "UserIsInactive",
            Self::Unauthorized { .. } => "Unauthorized",
            Self::Forbidden => "Forbidden",
            Self::NotAbleAssignBook => "NotAbleAssignBook",
            Self::BookIsOutOfStock { .. } => "BookIsOutOfStock",
            Self::BorrowRecordNotOutstanding { .. } => "BorrowRecordNotOutstanding",
            Self::InvalidReturnDate { .. } => "InvalidReturnDate",
            Self::InvalidQuantity { .. } => "InvalidQuantity",
            Self::Validation { .. } => "Validation",
            Self::InvalidSortField { .. } => "InvalidSortField",
            Self::Database { .. } => "InternalServerError",
        }
    }
}

/// Repository failures surface as `Database`; details stay in logs.
impl From<anyhow::Error> for DomainError {
    fn from(e: anyhow::Error) -> Self {
        Self::database(format!("{e:#}"))
    }
}
