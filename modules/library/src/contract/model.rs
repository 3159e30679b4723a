//! Transport-agnostic domain models shared by the service, storage and REST layers.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

pub const ROLE_ADMIN: &str = "Admin";
pub const ROLE_LIBRARIAN: &str = "Librarian";
pub const ROLE_MEMBER: &str = "Member";

/// Seeded roles the access rules and signup resolve by name.
pub const SYSTEM_ROLES: [&str; 3] = [ROLE_ADMIN, ROLE_LIBRARIAN, ROLE_MEMBER];

/// Wire names for a status enum: `as_str`, `Display` and `FromStr`.
macro_rules! wire_names {
    ($name:ident { $($variant:ident => $wire:literal),+ $(,)? }) => {
        impl $name {
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $wire),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($wire => Ok(Self::$variant),)+
                    other => Err(format!("unknown {} '{}'", stringify!($name), other)),
                }
            }
        }
    };
}

/// Account lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum UserStatus {
    #[serde(rename = "ACTIVE")]
    Active,
    #[serde(rename = "IN_ACTIVE")]
    Inactive,
}

wire_names!(UserStatus { Active => "ACTIVE", Inactive => "IN_ACTIVE" });

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum CategoryStatus {
    #[serde(rename = "ACTIVE")]
    Active,
    #[serde(rename = "IN_ACTIVE")]
    Inactive,
}

wire_names!(CategoryStatus { Active => "ACTIVE", Inactive => "IN_ACTIVE" });

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookStatus {
    Available,
    CheckedOut,
    Reserved,
    Lost,
}

wire_names!(BookStatus {
    Available => "AVAILABLE",
    CheckedOut => "CHECKED_OUT",
    Reserved => "RESERVED",
    Lost => "LOST",
});

/// Loan lifecycle. `Issued` and `Overdue` are outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BorrowStatus {
    Issued,
    Returned,
    Lost,
    Overdue,
}

wire_names!(BorrowStatus {
    Issued => "ISSUED",
    Returned => "RETURNED",
    Lost => "LOST",
    Overdue => "OVERDUE",
});

impl BorrowStatus {
    pub const OUTSTANDING: [BorrowStatus; 2] = [BorrowStatus::Issued, BorrowStatus::Overdue];

    pub fn is_outstanding(&self) -> bool {
        Self::OUTSTANDING.contains(self)
    }
}

/// A reference resolved to `{id, name}` at the repository boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedRef {
    pub id: Uuid,
    pub name: String,
}

/// The role of a user, always resolved.
pub type RoleRef = NamedRef;

impl NamedRef {
    pub fn is_admin(&self) -> bool {
        self.name == ROLE_ADMIN
    }

    /// Admin or Librarian.
    pub fn is_staff(&self) -> bool {
        self.name == ROLE_ADMIN || self.name == ROLE_LIBRARIAN
    }
}

// ---------- Role ----------

#[derive(Debug, Clone, PartialEq)]
pub struct Role {
    pub id: Uuid,
    pub name: String,
    pub permissions: Vec<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Role {
    pub fn is_system(&self) -> bool {
        SYSTEM_ROLES.contains(&self.name.as_str())
    }
}

#[derive(Debug, Clone, Default)]
pub struct NewRole {
    pub name: String,
    pub permissions: Vec<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct RolePatch {
    pub name: Option<String>,
    pub permissions: Option<Vec<String>>,
    pub description: Option<String>,
}

// ---------- User ----------

#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub role: RoleRef,
    pub status: UserStatus,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A user together with its secrets; never leaves the domain layer.
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user: User,
    pub password_hash: String,
    pub refresh_token: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub role_id: Uuid,
}

#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub role_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default)]
pub struct Signup {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// The caller of an authenticated request, resolved from a valid access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub id: Uuid,
    pub email: String,
    pub role: RoleRef,
}

impl From<&User> for AuthenticatedUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            role: user.role.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

// ---------- Author ----------

#[derive(Debug, Clone, PartialEq)]
pub struct Author {
    pub id: Uuid,
    pub name: String,
    pub bio: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct NewAuthor {
    pub name: String,
    pub bio: Option<String>,
    pub birth_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default)]
pub struct AuthorPatch {
    pub name: Option<String>,
    pub bio: Option<String>,
    pub birth_date: Option<NaiveDate>,
}

// ---------- Category ----------

#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub status: CategoryStatus,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewCategory {
    pub name: String,
    pub status: CategoryStatus,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct CategoryPatch {
    pub name: Option<String>,
    pub status: Option<CategoryStatus>,
    pub description: Option<String>,
}

// ---------- Book ----------

#[derive(Debug, Clone, PartialEq)]
pub struct Book {
    pub id: Uuid,
    pub title: String,
    pub author: NamedRef,
    pub category: NamedRef,
    pub isbn: Option<String>,
    pub publisher: Option<String>,
    pub quantity: i32,
    /// Units currently out; `0 <= issued_book <= quantity`.
    pub issued_book: i32,
    pub description: Option<String>,
    pub cover_image: Option<String>,
    pub status: BookStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Book {
    pub fn available(&self) -> i32 {
        self.quantity - self.issued_book
    }
}

#[derive(Debug, Clone)]
pub struct NewBook {
    pub title: String,
    pub author_id: Uuid,
    pub category_id: Uuid,
    pub isbn: Option<String>,
    pub publisher: Option<String>,
    pub quantity: i32,
    pub description: Option<String>,
    pub cover_image: Option<String>,
    pub status: BookStatus,
}

#[derive(Debug, Clone, Default)]
pub struct BookPatch {
    pub title: Option<String>,
    pub author_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub isbn: Option<String>,
    pub publisher: Option<String>,
    pub quantity: Option<i32>,
    pub description: Option<String>,
    pub cover_image: Option<String>,
    pub status: Option<BookStatus>,
}

// ---------- Borrow records ----------

#[derive(Debug, Clone, PartialEq)]
pub struct BorrowRecord {
    pub id: Uuid,
    pub book_id: Uuid,
    /// Borrower.
    pub issued_by: Uuid,
    /// Staff member who performed the assignment.
    pub assigned_by: Uuid,
    pub issue_date: DateTime<Utc>,
    pub return_date: NaiveDate,
    pub returned_at: Option<DateTime<Utc>>,
    pub overdue_days: Option<i64>,
    pub fine: Option<f64>,
    pub status: BorrowStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input of the lending workflow.
#[derive(Debug, Clone)]
pub struct AssignBook {
    pub user_id: Uuid,
    pub return_date: NaiveDate,
    pub notes: Option<String>,
}

// ---------- Search filters ----------

#[derive(Debug, Clone, Default)]
pub struct RoleFilter {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct AuthorFilter {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct CategoryFilter {
    pub name: Option<String>,
    pub status: Option<CategoryStatus>,
}

#[derive(Debug, Clone, Default)]
pub struct BookFilter {
    pub title: Option<String>,
    /// Author name, substring.
    pub author: Option<String>,
    /// Category name, substring.
    pub category: Option<String>,
    pub isbn: Option<String>,
    pub publisher: Option<String>,
    pub status: Option<BookStatus>,
    pub author_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    pub name: Option<String>,
    pub email: Option<String>,
    pub status: Option<UserStatus>,
    /// Role name, substring.
    pub role: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct BorrowFilter {
    pub book_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    pub status: Option<BorrowStatus>,
}
