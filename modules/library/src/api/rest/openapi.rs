use apikit::ErrorEnvelope;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::rest::{dto, handlers};
use crate::contract::model::{BookStatus, BorrowStatus, CategoryStatus, UserStatus};

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    info(title = "Library API", description = "Catalog, members and lending"),
    paths(
        handlers::login,
        handlers::signup,
        handlers::refresh_token,
        handlers::logout,
        handlers::reset_password,
        handlers::profile,
        handlers::create_role,
        handlers::get_role,
        handlers::update_role,
        handlers::delete_role,
        handlers::search_roles,
        handlers::create_user,
        handlers::get_user,
        handlers::update_user,
        handlers::toggle_user_status,
        handlers::delete_user,
        handlers::search_users,
        handlers::create_author,
        handlers::get_author,
        handlers::update_author,
        handlers::delete_author,
        handlers::search_authors,
        handlers::create_category,
        handlers::get_category,
        handlers::update_category,
        handlers::delete_category,
        handlers::search_categories,
        handlers::create_book,
        handlers::get_book,
        handlers::update_book,
        handlers::delete_book,
        handlers::search_books,
        handlers::assign_book,
        handlers::get_borrow_record,
        handlers::search_borrow_records,
        handlers::return_book,
        handlers::mark_lost,
        handlers::refresh_overdue,
    ),
    components(schemas(
        ErrorEnvelope,
        UserStatus,
        CategoryStatus,
        BookStatus,
        BorrowStatus,
        dto::NamedRefDto,
        dto::TokenPairDto,
        dto::RoleDto,
        dto::UserDto,
        dto::AuthorDto,
        dto::CategoryDto,
        dto::BookDto,
        dto::BorrowRecordDto,
        dto::RefreshOverdueDto,
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "auth", description = "Login, tokens and the caller's profile"),
        (name = "roles", description = "Role management"),
        (name = "users", description = "User management"),
        (name = "authors", description = "Authors"),
        (name = "categories", description = "Categories"),
        (name = "books", description = "Books and lending"),
        (name = "borrow-records", description = "Loan lifecycle"),
    )
)]
pub struct ApiDoc;

/// The OpenAPI document as JSON, served by the ingress at `/openapi.json`.
pub fn document() -> serde_json::Value {
    serde_json::to_value(ApiDoc::openapi()).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "failed to serialize OpenAPI document");
        serde_json::Value::Null
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_lending_routes() {
        let doc = document();
        assert!(doc.pointer("/paths/~1api~1books~1{id}~1assign-book/post").is_some());
        assert!(doc.pointer("/paths/~1api~1borrow-records~1{id}~1return/post").is_some());
        assert!(doc.pointer("/components/schemas/BookDto").is_some());
        assert!(doc.pointer("/components/securitySchemes/bearer").is_some());
    }
}
