//! Domain service: business rules over the repository ports.
//!
//! One [`Service`] covers every entity; its methods are split by concern
//! across the submodules.

mod auth;
mod books;
mod catalog;
mod lending;
mod roles;
mod users;

use std::sync::Arc;

use chrono::{NaiveDate, Utc};

use crate::contract::model::AuthenticatedUser;
use crate::domain::error::DomainError;
use crate::domain::ports::{PasswordHasher, TokenIssuer};
use crate::domain::query::PageLimits;
use crate::domain::repo::{
    AuthorsRepository, BooksRepository, BorrowRecordsRepository, CategoriesRepository,
    RolesRepository, UniqueViolation, UsersRepository,
};

/// Repository ports the service depends on.
#[derive(Clone)]
pub struct Repositories {
    pub roles: Arc<dyn RolesRepository>,
    pub users: Arc<dyn UsersRepository>,
    pub authors: Arc<dyn AuthorsRepository>,
    pub categories: Arc<dyn CategoriesRepository>,
    pub books: Arc<dyn BooksRepository>,
    pub borrows: Arc<dyn BorrowRecordsRepository>,
}

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub page_limits: PageLimits,
    /// Fine accrued per day past the return date.
    pub fine_per_day: f64,
    pub min_password_len: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            page_limits: PageLimits::default(),
            fine_per_day: 1.0,
            min_password_len: 8,
        }
    }
}

#[derive(Clone)]
pub struct Service {
    repos: Repositories,
    hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<dyn TokenIssuer>,
    config: ServiceConfig,
}

impl Service {
    pub fn new(
        repos: Repositories,
        hasher: Arc<dyn PasswordHasher>,
        tokens: Arc<dyn TokenIssuer>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            repos,
            hasher,
            tokens,
            config,
        }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    // --- shared validation helpers ---

    fn validate_password(&self, password: &str) -> Result<(), DomainError> {
        if password.chars().count() < self.config.min_password_len {
            return Err(DomainError::validation(
                "password",
                format!(
                    "must be at least {} characters long",
                    self.config.min_password_len
                ),
            ));
        }
        Ok(())
    }

    fn fine_for(&self, overdue_days: i64) -> f64 {
        overdue_days as f64 * self.config.fine_per_day
    }
}

fn require_admin(actor: &AuthenticatedUser) -> Result<(), DomainError> {
    if actor.role.is_admin() {
        Ok(())
    } else {
        Err(DomainError::Forbidden)
    }
}

fn require_staff(actor: &AuthenticatedUser) -> Result<(), DomainError> {
    if actor.role.is_staff() {
        Ok(())
    } else {
        Err(DomainError::Forbidden)
    }
}

/// Trimmed value; blank is a validation error.
fn required(field: &str, value: &str) -> Result<String, DomainError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation(field, "must not be empty"));
    }
    Ok(trimmed.to_owned())
}

fn normalize_email(email: &str) -> Result<String, DomainError> {
    let email = email.trim().to_lowercase();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.')
        }
        None => false,
    };
    if !valid {
        return Err(DomainError::validation(
            "email",
            format!("'{email}' is not a valid address"),
        ));
    }
    Ok(email)
}

/// Unique-index races surface as the natural-key conflict.
fn write_failed(err: anyhow::Error, conflict: impl FnOnce() -> DomainError) -> DomainError {
    if err.downcast_ref::<UniqueViolation>().is_some() {
        conflict()
    } else {
        DomainError::database(format!("{err:#}"))
    }
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Whole days `due` lies before `on`, never negative.
fn days_overdue(due: NaiveDate, on: NaiveDate) -> i64 {
    (on - due).num_days().max(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emails_are_trimmed_and_lowercased() {
        assert_eq!(normalize_email("  Ann@Example.COM ").unwrap(), "ann@example.com");
        assert!(normalize_email("no-at-sign").is_err());
        assert!(normalize_email("@example.com").is_err());
        assert!(normalize_email("ann@localhost").is_err());
    }

    #[test]
    fn overdue_days_never_negative() {
        let due = NaiveDate::from_ymd_opt(2025, 12, 1).unwrap();
        assert_eq!(days_overdue(due, NaiveDate::from_ymd_opt(2025, 12, 4).unwrap()), 3);
        assert_eq!(days_overdue(due, NaiveDate::from_ymd_opt(2025, 11, 20).unwrap()), 0);
    }

    #[test]
    fn required_rejects_blank() {
        assert_eq!(required("name", "  Tolkien ").unwrap(), "Tolkien");
        assert!(matches!(
            required("name", "   "),
            Err(DomainError::Validation { .. })
        ));
    }
}
