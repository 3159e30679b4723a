use std::sync::Arc;

use axum::middleware::from_fn_with_state;
use axum::routing::{get, patch, post};
use axum::{Extension, Router};

use crate::api::rest::{auth::require_auth, handlers};
use crate::domain::service::Service;

/// Every library route under `/api`. Only login, signup and token refresh are public.
pub fn router(service: Arc<Service>) -> Router {
    let public = Router::new()
        .route("/api/auth/login", post(handlers::login))
        .route("/api/auth/signup", post(handlers::signup))
        .route("/api/auth/refresh-token", patch(handlers::refresh_token));

    let protected = Router::new()
        // auth
        .route("/api/auth/logout/{id}", get(handlers::logout))
        .route(
            "/api/auth/reset-password",
            patch(handlers::reset_password).post(handlers::reset_password),
        )
        .route("/api/profile/me", get(handlers::profile))
        // roles
        .route("/api/roles", post(handlers::create_role))
        .route("/api/roles/search", post(handlers::search_roles))
        .route(
            "/api/roles/{id}",
            get(handlers::get_role)
                .put(handlers::update_role)
                .delete(handlers::delete_role),
        )
        // users
        .route("/api/users", post(handlers::create_user))
        .route("/api/users/search", post(handlers::search_users))
        .route(
            "/api/users/{id}",
            get(handlers::get_user)
                .put(handlers::update_user)
                .delete(handlers::delete_user),
        )
        .route("/api/users/{id}/status", patch(handlers::toggle_user_status))
        // authors
        .route("/api/author", post(handlers::create_author))
        .route("/api/author/search", post(handlers::search_authors))
        .route(
            "/api/author/{id}",
            get(handlers::get_author)
                .put(handlers::update_author)
                .delete(handlers::delete_author),
        )
        // categories
        .route("/api/categories", post(handlers::create_category))
        .route("/api/categories/search", post(handlers::search_categories))
        .route(
            "/api/categories/{id}",
            get(handlers::get_category)
                .put(handlers::update_category)
                .delete(handlers::delete_category),
        )
        // books
        .route("/api/books", post(handlers::create_book))
        .route("/api/books/search", post(handlers::search_books))
        .route(
            "/api/books/{id}",
            get(handlers::get_book)
                .put(handlers::update_book)
                .delete(handlers::delete_book),
        )
        .route("/api/books/{id}/assign-book", post(handlers::assign_book))
        // borrow records
        .route(
            "/api/borrow-records/search",
            post(handlers::search_borrow_records),
        )
        .route(
            "/api/borrow-records/refresh-overdue",
            post(handlers::refresh_overdue),
        )
        .route("/api/borrow-records/{id}", get(handlers::get_borrow_record))
        .route("/api/borrow-records/{id}/return", post(handlers::return_book))
        .route("/api/borrow-records/{id}/lost", post(handlers::mark_lost))
        .route_layer(from_fn_with_state(service.clone(), require_auth));

    public.merge(protected).layer(Extension(service))
}
