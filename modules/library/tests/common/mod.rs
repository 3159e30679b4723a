//! Shared fixtures: a fresh in-memory SQLite database per test with
//! migrations applied, plus one user per system role.
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use chrono::{Days, NaiveDate, Utc};
use db::{ConnectOpts, DbHandle};
use uuid::Uuid;

use library::config::LibraryConfig;
use library::contract::model::{
    AuthenticatedUser, BookStatus, CategoryStatus, NewAuthor, NewBook, NewCategory, NewUser,
    RoleFilter, User, ROLE_LIBRARIAN, ROLE_MEMBER,
};
use library::domain::query::SearchParams;
use library::domain::service::Service;
use library::infra::security::{Argon2Hasher, TokenSettings};
use library::Library;

pub const PASSWORD: &str = "correct-horse-battery";

pub struct TestEnv {
    pub db: DbHandle,
    pub library: Library,
    pub service: Arc<Service>,
    pub admin: AuthenticatedUser,
    pub librarian: AuthenticatedUser,
    pub member: AuthenticatedUser,
}

pub fn token_settings() -> TokenSettings {
    TokenSettings {
        access_secret: "test-access-secret-0123456789".into(),
        refresh_secret: "test-refresh-secret-0123456789".into(),
        access_ttl: Duration::from_secs(900),
        refresh_ttl: Duration::from_secs(3600),
    }
}

/// Fresh database, migrated, with an Admin, a Librarian and a Member.
pub async fn setup() -> TestEnv {
    let db = DbHandle::connect("sqlite::memory:", ConnectOpts::default())
        .await
        .expect("connect to in-memory sqlite");
    let library = Library::new();
    library.migrate(&db).await.expect("migrations");
    library
        .init_with_hasher(
            db.sea(),
            &LibraryConfig::default(),
            &token_settings(),
            Arc::new(Argon2Hasher::with_params(1024, 1, 1).expect("argon2 params")),
        )
        .expect("init library");
    let service = library.service().expect("service");

    let admin_user = service
        .create_admin("Ada Admin", "admin@example.com", PASSWORD)
        .await
        .expect("create admin");
    let admin = AuthenticatedUser::from(&admin_user);

    let librarian = create_user(
        &service,
        &admin,
        "Lena Librarian",
        "lib@example.com",
        ROLE_LIBRARIAN,
    )
    .await;
    let member = create_user(
        &service,
        &admin,
        "Max Member",
        "member@example.com",
        ROLE_MEMBER,
    )
    .await;

    TestEnv {
        db,
        library,
        service,
        admin,
        librarian: AuthenticatedUser::from(&librarian),
        member: AuthenticatedUser::from(&member),
    }
}

pub async fn role_id(service: &Service, name: &str) -> Uuid {
    let page = service
        .search_roles(SearchParams::new(RoleFilter {
            name: Some(name.to_string()),
        }))
        .await
        .expect("search roles");
    page.rows
        .into_iter()
        .find(|r| r.name == name)
        .map(|r| r.id)
        .expect("system role seeded")
}

pub async fn create_user(
    service: &Service,
    admin: &AuthenticatedUser,
    name: &str,
    email: &str,
    role: &str,
) -> User {
    let role_id = role_id(service, role).await;
    service
        .create_user(
            admin,
            NewUser {
                name: name.to_string(),
                email: email.to_string(),
                password: PASSWORD.to_string(),
                role_id,
                ..Default::default()
            },
        )
        .await
        .expect("create user")
}

/// A book with its own author and category.
pub async fn create_book(env: &TestEnv, title: &str, quantity: i32) -> Uuid {
    let svc = &env.service;
    let author = svc
        .create_author(
            &env.librarian,
            NewAuthor {
                name: format!("Author of {title}"),
                ..Default::default()
            },
        )
        .await
        .expect("create author");
    let category = svc
        .create_category(
            &env.librarian,
            NewCategory {
                name: format!("Category of {title}"),
                status: CategoryStatus::Active,
                description: None,
            },
        )
        .await
        .expect("create category");
    svc.create_book(
        &env.librarian,
        NewBook {
            title: title.to_string(),
            author_id: author.id,
            category_id: category.id,
            isbn: None,
            publisher: None,
            quantity,
            description: None,
            cover_image: None,
            status: BookStatus::Available,
        },
    )
    .await
    .expect("create book")
    .id
}

pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

pub fn in_days(days: u64) -> NaiveDate {
    today()
        .checked_add_days(Days::new(days))
        .expect("date in range")
}
