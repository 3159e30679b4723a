//! REST DTOs. Payloads are camelCase except the token pair.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::contract::model::{
    AssignBook, Author, AuthorFilter, AuthorPatch, Book, BookFilter, BookPatch, BookStatus,
    BorrowFilter, BorrowRecord, BorrowStatus, Category, CategoryFilter, CategoryPatch,
    CategoryStatus, NamedRef, NewAuthor, NewBook, NewCategory, NewRole, NewUser, Role, RoleFilter,
    RolePatch, Signup, TokenPair, User, UserFilter, UserPatch, UserStatus,
};
use crate::domain::query::SearchParams;

// ---------- shared ----------

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NamedRefDto {
    pub id: Uuid,
    pub name: String,
}

impl From<NamedRef> for NamedRefDto {
    fn from(r: NamedRef) -> Self {
        Self {
            id: r.id,
            name: r.name,
        }
    }
}

/// `[[field, direction], ...]`; a missing direction sorts descending.
fn order_pairs(order: Option<Vec<Vec<String>>>) -> Vec<(String, String)> {
    order
        .unwrap_or_default()
        .into_iter()
        .filter_map(|entry| {
            let mut it = entry.into_iter();
            let field = it.next()?;
            Some((field, it.next().unwrap_or_default()))
        })
        .collect()
}

fn search_params<F>(
    filter: F,
    order: Option<Vec<Vec<String>>>,
    offset: Option<u64>,
    limit: Option<u64>,
) -> SearchParams<F> {
    SearchParams {
        filter,
        order: order_pairs(order),
        offset,
        limit,
    }
}

// ---------- auth ----------

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LoginReq {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignupReq {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
    pub address: Option<String>,
}

impl From<SignupReq> for Signup {
    fn from(req: SignupReq) -> Self {
        Self {
            name: req.name,
            email: req.email,
            password: req.password,
            phone: req.phone,
            address: req.address,
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RefreshTokenReq {
    #[serde(alias = "refreshToken")]
    pub refresh_token: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordReq {
    pub current_password: String,
    pub new_password: String,
}

/// Token pair, snake_case on the wire.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenPairDto {
    pub access_token: String,
    pub refresh_token: String,
}

impl From<TokenPair> for TokenPairDto {
    fn from(p: TokenPair) -> Self {
        Self {
            access_token: p.access_token,
            refresh_token: p.refresh_token,
        }
    }
}

// ---------- roles ----------

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoleDto {
    pub id: Uuid,
    pub name: String,
    pub permissions: Vec<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Role> for RoleDto {
    fn from(r: Role) -> Self {
        Self {
            id: r.id,
            name: r.name,
            permissions: r.permissions,
            description: r.description,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateRoleReq {
    pub name: String,
    #[serde(default)]
    pub permissions: Vec<String>,
    pub description: Option<String>,
}

impl From<CreateRoleReq> for NewRole {
    fn from(req: CreateRoleReq) -> Self {
        Self {
            name: req.name,
            permissions: req.permissions,
            description: req.description,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateRoleReq {
    pub name: Option<String>,
    pub permissions: Option<Vec<String>>,
    pub description: Option<String>,
}

impl From<UpdateRoleReq> for RolePatch {
    fn from(req: UpdateRoleReq) -> Self {
        Self {
            name: req.name,
            permissions: req.permissions,
            description: req.description,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct SearchRolesReq {
    pub name: Option<String>,
    pub order: Option<Vec<Vec<String>>>,
    pub offset: Option<u64>,
    pub limit: Option<u64>,
}

impl From<SearchRolesReq> for SearchParams<RoleFilter> {
    fn from(req: SearchRolesReq) -> Self {
        search_params(
            RoleFilter { name: req.name },
            req.order,
            req.offset,
            req.limit,
        )
    }
}

// ---------- users ----------

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub role: NamedRefDto,
    pub status: UserStatus,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserDto {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            name: u.name,
            email: u.email,
            phone: u.phone,
            address: u.address,
            role: u.role.into(),
            status: u.status,
            last_login: u.last_login,
            created_at: u.created_at,
            updated_at: u.updated_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserReq {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub role_id: Uuid,
}

impl From<CreateUserReq> for NewUser {
    fn from(req: CreateUserReq) -> Self {
        Self {
            name: req.name,
            email: req.email,
            password: req.password,
            phone: req.phone,
            address: req.address,
            role_id: req.role_id,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserReq {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub role_id: Option<Uuid>,
}

impl From<UpdateUserReq> for UserPatch {
    fn from(req: UpdateUserReq) -> Self {
        Self {
            name: req.name,
            email: req.email,
            phone: req.phone,
            address: req.address,
            role_id: req.role_id,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct SearchUsersReq {
    pub name: Option<String>,
    pub email: Option<String>,
    pub status: Option<UserStatus>,
    /// Role name, substring.
    pub role: Option<String>,
    pub order: Option<Vec<Vec<String>>>,
    pub offset: Option<u64>,
    pub limit: Option<u64>,
}

impl From<SearchUsersReq> for SearchParams<UserFilter> {
    fn from(req: SearchUsersReq) -> Self {
        let filter = UserFilter {
            name: req.name,
            email: req.email,
            status: req.status,
            role: req.role,
        };
        search_params(filter, req.order, req.offset, req.limit)
    }
}

// ---------- authors ----------

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthorDto {
    pub id: Uuid,
    pub name: String,
    pub bio: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Author> for AuthorDto {
    fn from(a: Author) -> Self {
        Self {
            id: a.id,
            name: a.name,
            bio: a.bio,
            birth_date: a.birth_date,
            created_at: a.created_at,
            updated_at: a.updated_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAuthorReq {
    pub name: String,
    pub bio: Option<String>,
    pub birth_date: Option<NaiveDate>,
}

impl From<CreateAuthorReq> for NewAuthor {
    fn from(req: CreateAuthorReq) -> Self {
        Self {
            name: req.name,
            bio: req.bio,
            birth_date: req.birth_date,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAuthorReq {
    pub name: Option<String>,
    pub bio: Option<String>,
    pub birth_date: Option<NaiveDate>,
}

impl From<UpdateAuthorReq> for AuthorPatch {
    fn from(req: UpdateAuthorReq) -> Self {
        Self {
            name: req.name,
            bio: req.bio,
            birth_date: req.birth_date,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct SearchAuthorsReq {
    pub name: Option<String>,
    pub order: Option<Vec<Vec<String>>>,
    pub offset: Option<u64>,
    pub limit: Option<u64>,
}

impl From<SearchAuthorsReq> for SearchParams<AuthorFilter> {
    fn from(req: SearchAuthorsReq) -> Self {
        search_params(
            AuthorFilter { name: req.name },
            req.order,
            req.offset,
            req.limit,
        )
    }
}

// ---------- categories ----------

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDto {
    pub id: Uuid,
    pub name: String,
    pub status: CategoryStatus,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Category> for CategoryDto {
    fn from(c: Category) -> Self {
        Self {
            id: c.id,
            name: c.name,
            status: c.status,
            description: c.description,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateCategoryReq {
    pub name: String,
    #[serde(default = "active_category")]
    pub status: CategoryStatus,
    pub description: Option<String>,
}

fn active_category() -> CategoryStatus {
    CategoryStatus::Active
}

impl From<CreateCategoryReq> for NewCategory {
    fn from(req: CreateCategoryReq) -> Self {
        Self {
            name: req.name,
            status: req.status,
            description: req.description,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateCategoryReq {
    pub name: Option<String>,
    pub status: Option<CategoryStatus>,
    pub description: Option<String>,
}

impl From<UpdateCategoryReq> for CategoryPatch {
    fn from(req: UpdateCategoryReq) -> Self {
        Self {
            name: req.name,
            status: req.status,
            description: req.description,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct SearchCategoriesReq {
    pub name: Option<String>,
    pub status: Option<CategoryStatus>,
    pub order: Option<Vec<Vec<String>>>,
    pub offset: Option<u64>,
    pub limit: Option<u64>,
}

impl From<SearchCategoriesReq> for SearchParams<CategoryFilter> {
    fn from(req: SearchCategoriesReq) -> Self {
        let filter = CategoryFilter {
            name: req.name,
            status: req.status,
        };
        search_params(filter, req.order, req.offset, req.limit)
    }
}

// ---------- books ----------

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookDto {
    pub id: Uuid,
    pub title: String,
    pub author: NamedRefDto,
    pub category: NamedRefDto,
    pub isbn: Option<String>,
    pub publisher: Option<String>,
    pub quantity: i32,
    pub issued_book: i32,
    /// `quantity - issuedBook`.
    pub available: i32,
    pub description: Option<String>,
    pub cover_image: Option<String>,
    pub status: BookStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Book> for BookDto {
    fn from(b: Book) -> Self {
        let available = b.available();
        Self {
            id: b.id,
            title: b.title,
            author: b.author.into(),
            category: b.category.into(),
            isbn: b.isbn,
            publisher: b.publisher,
            quantity: b.quantity,
            issued_book: b.issued_book,
            available,
            description: b.description,
            cover_image: b.cover_image,
            status: b.status,
            created_at: b.created_at,
            updated_at: b.updated_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookReq {
    pub title: String,
    pub author_id: Uuid,
    pub category_id: Uuid,
    pub isbn: Option<String>,
    pub publisher: Option<String>,
    pub quantity: i32,
    pub description: Option<String>,
    pub cover_image: Option<String>,
    #[serde(default = "available_book")]
    pub status: BookStatus,
}

fn available_book() -> BookStatus {
    BookStatus::Available
}

impl From<CreateBookReq> for NewBook {
    fn from(req: CreateBookReq) -> Self {
        Self {
            title: req.title,
            author_id: req.author_id,
            category_id: req.category_id,
            isbn: req.isbn,
            publisher: req.publisher,
            quantity: req.quantity,
            description: req.description,
            cover_image: req.cover_image,
            status: req.status,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBookReq {
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

impl From<UpdateBookReq> for BookPatch {
    fn from(req: UpdateBookReq) -> Self {
        Self {
            title: req.title,
            author_id: req.author_id,
            category_id: req.category_id,
            isbn: req.isbn,
            publisher: req.publisher,
            quantity: req.quantity,
            description: req.description,
            cover_image: req.cover_image,
            status: req.status,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchBooksReq {
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
    pub order: Option<Vec<Vec<String>>>,
    pub offset: Option<u64>,
    pub limit: Option<u64>,
}

impl From<SearchBooksReq> for SearchParams<BookFilter> {
    fn from(req: SearchBooksReq) -> Self {
        let filter = BookFilter {
            title: req.title,
            author: req.author,
            category: req.category,
            isbn: req.isbn,
            publisher: req.publisher,
            status: req.status,
            author_id: req.author_id,
            category_id: req.category_id,
        };
        search_params(filter, req.order, req.offset, req.limit)
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignBookReq {
    /// The borrower.
    pub user_id: Uuid,
    pub return_date: NaiveDate,
    pub notes: Option<String>,
}

impl From<AssignBookReq> for AssignBook {
    fn from(req: AssignBookReq) -> Self {
        Self {
            user_id: req.user_id,
            return_date: req.return_date,
            notes: req.notes,
        }
    }
}

// ---------- borrow records ----------

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BorrowRecordDto {
    pub id: Uuid,
    pub book_id: Uuid,
    /// Borrower.
    pub issued_by: Uuid,
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

impl From<BorrowRecord> for BorrowRecordDto {
    fn from(r: BorrowRecord) -> Self {
        Self {
            id: r.id,
            book_id: r.book_id,
            issued_by: r.issued_by,
            assigned_by: r.assigned_by,
            issue_date: r.issue_date,
            return_date: r.return_date,
            returned_at: r.returned_at,
            overdue_days: r.overdue_days,
            fine: r.fine,
            status: r.status,
            notes: r.notes,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchBorrowRecordsReq {
    pub book_id: Option<Uuid>,
    /// Borrower.
    pub user_id: Option<Uuid>,
    pub status: Option<BorrowStatus>,
    pub order: Option<Vec<Vec<String>>>,
    pub offset: Option<u64>,
    pub limit: Option<u64>,
}

impl From<SearchBorrowRecordsReq> for SearchParams<BorrowFilter> {
    fn from(req: SearchBorrowRecordsReq) -> Self {
        let filter = BorrowFilter {
            book_id: req.book_id,
            user_id: req.user_id,
            status: req.status,
        };
        search_params(filter, req.order, req.offset, req.limit)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RefreshOverdueDto {
    /// Records flagged or re-accrued.
    pub updated: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_entries_tolerate_missing_direction() {
        let pairs = order_pairs(Some(vec![
            vec!["title".into(), "ASC".into()],
            vec!["createdAt".into()],
            vec![],
        ]));
        assert_eq!(
            pairs,
            vec![
                ("title".to_string(), "ASC".to_string()),
                ("createdAt".to_string(), String::new()),
            ]
        );
        assert!(order_pairs(None).is_empty());
    }

    #[test]
    fn book_search_body_uses_camel_case() {
        let req: SearchBooksReq = serde_json::from_value(serde_json::json!({
            "title": "ring",
            "authorId": "00000000-0000-0000-0000-000000000000",
            "order": [["issuedBook", "desc"]],
            "limit": 5
        }))
        .unwrap();
        let params: SearchParams<BookFilter> = req.into();
        assert_eq!(params.filter.title.as_deref(), Some("ring"));
        assert_eq!(params.filter.author_id, Some(Uuid::nil()));
        assert_eq!(params.order, vec![("issuedBook".into(), "desc".into())]);
        assert_eq!(params.limit, Some(5));
        assert_eq!(params.offset, None);
    }

    #[test]
    fn token_pair_stays_snake_case() {
        let v = serde_json::to_value(TokenPairDto {
            access_token: "a".into(),
            refresh_token: "r".into(),
        })
        .unwrap();
        assert_eq!(v, serde_json::json!({ "access_token": "a", "refresh_token": "r" }));
    }

    #[test]
    fn assign_body_parses_iso_date() {
        let req: AssignBookReq = serde_json::from_value(serde_json::json!({
            "userId": "00000000-0000-0000-0000-000000000000",
            "returnDate": "2025-12-01"
        }))
        .unwrap();
        assert_eq!(req.return_date, NaiveDate::from_ymd_opt(2025, 12, 1).unwrap());
    }
}
