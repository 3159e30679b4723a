//! Row <-> contract model conversions.

use std::str::FromStr;

use anyhow::{anyhow, Context};
use chrono::{DateTime, Utc};
use sea_orm::FromQueryResult;
use uuid::Uuid;

use crate::contract::model::{
    Author, Book, BookStatus, BorrowRecord, BorrowStatus, Category, CategoryStatus, NamedRef, Role,
    User, UserCredentials, UserStatus,
};
use crate::infra::storage::entity::{author, borrow_record, category, role};

fn parse_status<T>(raw: &str) -> anyhow::Result<T>
where
    T: FromStr<Err = String>,
{
    T::from_str(raw).map_err(|e| anyhow!(e))
}

pub fn encode_permissions(permissions: &[String]) -> anyhow::Result<String> {
    serde_json::to_string(permissions).context("encode role permissions")
}

pub fn role_to_contract(m: role::Model) -> anyhow::Result<Role> {
    let permissions: Vec<String> =
        serde_json::from_str(&m.permissions).context("decode role permissions")?;
    Ok(Role {
        id: m.id,
        name: m.name,
        permissions,
        description: m.description,
        created_at: m.created_at,
        updated_at: m.updated_at,
    })
}

pub fn author_to_contract(m: author::Model) -> Author {
    Author {
        id: m.id,
        name: m.name,
        bio: m.bio,
        birth_date: m.birth_date,
        created_at: m.created_at,
        updated_at: m.updated_at,
    }
}

pub fn category_to_contract(m: category::Model) -> anyhow::Result<Category> {
    Ok(Category {
        id: m.id,
        name: m.name,
        status: parse_status::<CategoryStatus>(&m.status)?,
        description: m.description,
        created_at: m.created_at,
        updated_at: m.updated_at,
    })
}

pub fn borrow_to_contract(m: borrow_record::Model) -> anyhow::Result<BorrowRecord> {
    Ok(BorrowRecord {
        id: m.id,
        book_id: m.book_id,
        issued_by: m.issued_by,
        assigned_by: m.assigned_by,
        issue_date: m.issue_date,
        return_date: m.return_date,
        returned_at: m.returned_at,
        overdue_days: m.overdue_days,
        fine: m.fine,
        status: parse_status::<BorrowStatus>(&m.status)?,
        notes: m.notes,
        created_at: m.created_at,
        updated_at: m.updated_at,
    })
}

/// A user row joined with its role name.
#[derive(Debug, Clone, FromQueryResult)]
pub struct UserRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub role_id: Uuid,
    pub role_name: String,
    pub status: String,
    pub last_login: Option<DateTime<Utc>>,
    pub refresh_token: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserRow {
    pub fn into_credentials(self) -> anyhow::Result<UserCredentials> {
        let user = User {
            id: self.id,
            name: self.name,
            email: self.email,
            phone: self.phone,
            address: self.address,
            role: NamedRef {
                id: self.role_id,
                name: self.role_name,
            },
            status: parse_status::<UserStatus>(&self.status)?,
            last_login: self.last_login,
            created_at: self.created_at,
            updated_at: self.updated_at,
        };
        Ok(UserCredentials {
            user,
            password_hash: self.password_hash,
            refresh_token: self.refresh_token,
        })
    }

    pub fn into_user(self) -> anyhow::Result<User> {
        self.into_credentials().map(|c| c.user)
    }
}

/// A book row joined with author and category names.
#[derive(Debug, Clone, FromQueryResult)]
pub struct BookRow {
    pub id: Uuid,
    pub title: String,
    pub author_id: Uuid,
    pub author_name: String,
    pub category_id: Uuid,
    pub category_name: String,
    pub isbn: Option<String>,
    pub publisher: Option<String>,
    pub quantity: i32,
    pub issued_book: i32,
    pub description: Option<String>,
    pub cover_image: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<BookRow> for Book {
    type Error = anyhow::Error;

    fn try_from(r: BookRow) -> anyhow::Result<Self> {
        Ok(Book {
            id: r.id,
            title: r.title,
            author: NamedRef {
                id: r.author_id,
                name: r.author_name,
            },
            category: NamedRef {
                id: r.category_id,
                name: r.category_name,
            },
            isbn: r.isbn,
            publisher: r.publisher,
            quantity: r.quantity,
            issued_book: r.issued_book,
            description: r.description,
            cover_image: r.cover_image,
            status: parse_status::<BookStatus>(&r.status)?,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}
