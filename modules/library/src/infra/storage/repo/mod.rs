//! SeaORM-backed implementations of the domain repository ports.
//!
//! Each repository is generic over `C: ConnectionTrait`, so it can be built
//! from a `DatabaseConnection` or from a transaction handle.

mod authors;
mod books;
mod borrow_records;
mod categories;
mod roles;
mod users;

use std::sync::Arc;

use sea_orm::DatabaseConnection;

pub use authors::SeaOrmAuthorsRepository;
pub use books::SeaOrmBooksRepository;
pub use borrow_records::SeaOrmBorrowRecordsRepository;
pub use categories::SeaOrmCategoriesRepository;
pub use roles::SeaOrmRolesRepository;
pub use users::SeaOrmUsersRepository;

use crate::domain::repo::UniqueViolation;
use crate::domain::service::Repositories;

/// Wires every repository to one shared connection pool.
pub struct SeaOrmRepositories;

impl SeaOrmRepositories {
    pub fn build(conn: DatabaseConnection) -> Repositories {
        Repositories {
            roles: Arc::new(SeaOrmRolesRepository::new(conn.clone())),
            users: Arc::new(SeaOrmUsersRepository::new(conn.clone())),
            authors: Arc::new(SeaOrmAuthorsRepository::new(conn.clone())),
            categories: Arc::new(SeaOrmCategoriesRepository::new(conn.clone())),
            books: Arc::new(SeaOrmBooksRepository::new(conn.clone())),
            borrows: Arc::new(SeaOrmBorrowRecordsRepository::new(conn)),
        }
    }
}

/// Context for a failed write; unique violations become [`UniqueViolation`].
pub(crate) fn write_error(err: sea_orm::DbErr, context: &'static str) -> anyhow::Error {
    if db::errors::is_unique_violation(&err) {
        anyhow::Error::new(UniqueViolation).context(context)
    } else {
        anyhow::Error::new(err).context(context)
    }
}
