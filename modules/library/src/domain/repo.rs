//! Persistence ports. The domain computes ids, timestamps and validation;
//! repositories only persist and query.

use apikit::Page;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::contract::model::{
    Author, AuthorFilter, Book, BookFilter, BorrowFilter, BorrowRecord, Category, CategoryFilter,
    Role, RoleFilter, User, UserCredentials, UserFilter,
};
use crate::domain::query::{
    AuthorSort, BookSort, BorrowSort, CategorySort, RoleSort, SearchQuery, UserSort,
};

#[async_trait]
pub trait RolesRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Role>>;
    /// Exact, case-insensitive.
    async fn find_by_name(&self, name: &str) -> anyhow::Result<Option<Role>>;
    /// Roles whose name equals `name` case-insensitively, except `exclude`.
    async fn count_by_name(&self, name: &str, exclude: Option<Uuid>) -> anyhow::Result<u64>;
    async fn insert(&self, role: Role) -> anyhow::Result<()>;
    async fn update(&self, role: Role) -> anyhow::Result<()>;
    async fn delete(&self, id: Uuid) -> anyhow::Result<bool>;
    async fn search(&self, query: &SearchQuery<RoleFilter, RoleSort>) -> anyhow::Result<Page<Role>>;
}

#[async_trait]
pub trait UsersRepository: Send + Sync {
    /// User with its role resolved.
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>>;
    /// Batch lookup; missing ids are simply absent from the result.
    async fn find_many(&self, ids: &[Uuid]) -> anyhow::Result<Vec<User>>;
    async fn find_credentials(&self, id: Uuid) -> anyhow::Result<Option<UserCredentials>>;
    async fn find_credentials_by_email(
        &self,
        email: &str,
    ) -> anyhow::Result<Option<UserCredentials>>;
    async fn count_by_email(&self, email: &str, exclude: Option<Uuid>) -> anyhow::Result<u64>;
    async fn count_by_role(&self, role_id: Uuid) -> anyhow::Result<u64>;
    async fn insert(&self, user: User, password_hash: String) -> anyhow::Result<()>;
    /// Profile fields, role, status and `updated_at`. Secrets are untouched.
    async fn update(&self, user: User) -> anyhow::Result<()>;
    async fn set_password(
        &self,
        id: Uuid,
        password_hash: String,
        at: DateTime<Utc>,
    ) -> anyhow::Result<()>;
    async fn set_refresh_token(&self, id: Uuid, token: Option<String>) -> anyhow::Result<()>;
    async fn record_login(
        &self,
        id: Uuid,
        at: DateTime<Utc>,
        refresh_token: String,
    ) -> anyhow::Result<()>;
    async fn delete(&self, id: Uuid) -> anyhow::Result<bool>;
    async fn search(&self, query: &SearchQuery<UserFilter, UserSort>) -> anyhow::Result<Page<User>>;
}

#[async_trait]
pub trait AuthorsRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Author>>;
    async fn count_by_name(&self, name: &str, exclude: Option<Uuid>) -> anyhow::Result<u64>;
    async fn insert(&self, author: Author) -> anyhow::Result<()>;
    async fn update(&self, author: Author) -> anyhow::Result<()>;
    async fn delete(&self, id: Uuid) -> anyhow::Result<bool>;
    async fn search(
        &self,
        query: &SearchQuery<AuthorFilter, AuthorSort>,
    ) -> anyhow::Result<Page<Author>>;
}

#[async_trait]
pub trait CategoriesRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Category>>;
    async fn count_by_name(&self, name: &str, exclude: Option<Uuid>) -> anyhow::Result<u64>;
    async fn insert(&self, category: Category) -> anyhow::Result<()>;
    async fn update(&self, category: Category) -> anyhow::Result<()>;
    async fn delete(&self, id: Uuid) -> anyhow::Result<bool>;
    async fn search(
        &self,
        query: &SearchQuery<CategoryFilter, CategorySort>,
    ) -> anyhow::Result<Page<Category>>;
}

#[async_trait]
pub trait BooksRepository: Send + Sync {
    /// Book with author and category names resolved.
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Book>>;
    async fn count_by_title(&self, title: &str, exclude: Option<Uuid>) -> anyhow::Result<u64>;
    async fn count_by_author(&self, author_id: Uuid) -> anyhow::Result<u64>;
    async fn count_by_category(&self, category_id: Uuid) -> anyhow::Result<u64>;
    /// Persists `author.id`/`category.id` as references; `issued_book` starts as given.
    async fn insert(&self, book: Book) -> anyhow::Result<()>;
    /// Writes every column except `issued_book`, which only the lending
    /// workflow changes. Returns `false` when `quantity` would drop below the
    /// live `issued_book`.
    async fn update(&self, book: Book) -> anyhow::Result<bool>;
    async fn delete(&self, id: Uuid) -> anyhow::Result<bool>;
    async fn search(&self, query: &SearchQuery<BookFilter, BookSort>) -> anyhow::Result<Page<Book>>;
}

/// How a loan left the outstanding state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoanClosure {
    /// The unit is back on the shelf.
    Returned,
    /// The unit leaves the inventory.
    Lost,
}

/// Values written when a loan is closed or marked overdue.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoanAccrual {
    pub overdue_days: i64,
    pub fine: f64,
    pub at: DateTime<Utc>,
}

/// Loans referencing a book or user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoanCounts {
    /// ISSUED or OVERDUE.
    pub outstanding: u64,
    pub total: u64,
}

#[async_trait]
pub trait BorrowRecordsRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<BorrowRecord>>;
    async fn loan_counts_by_book(&self, book_id: Uuid) -> anyhow::Result<LoanCounts>;
    /// Counts loans where the user is the borrower or the assigning staff member.
    async fn loan_counts_by_user(&self, user_id: Uuid) -> anyhow::Result<LoanCounts>;

    /// Atomically takes one unit of stock and records the loan.
    ///
    /// Increments `issued_book` only while it is below `quantity` and inserts
    /// `record` in the same transaction. Returns `false` (nothing written)
    /// when no unit was available.
    async fn assign(&self, record: BorrowRecord) -> anyhow::Result<bool>;

    /// Atomically closes an outstanding loan and releases its unit.
    ///
    /// Returns `None` when the record is no longer outstanding.
    async fn close(
        &self,
        record_id: Uuid,
        closure: LoanClosure,
        accrual: LoanAccrual,
    ) -> anyhow::Result<Option<BorrowRecord>>;

    /// Outstanding loans due strictly before `today`.
    async fn list_past_due(&self, today: NaiveDate) -> anyhow::Result<Vec<BorrowRecord>>;

    /// Flags an outstanding loan OVERDUE with the accrued values.
    async fn mark_overdue(&self, record_id: Uuid, accrual: LoanAccrual) -> anyhow::Result<bool>;

    async fn search(
        &self,
        query: &SearchQuery<BorrowFilter, BorrowSort>,
    ) -> anyhow::Result<Page<BorrowRecord>>;
}

/// Raised by repositories when a write hits a unique constraint, so the
/// service can report the natural-key conflict instead of a storage failure.
#[derive(Debug, Clone, Copy, thiserror::Error)]
#[error("unique constraint violated")]
pub struct UniqueViolation;
