use std::sync::Arc;

use apikit::{created, ok, ok_with_message, ApiJson, ApiPath, ApiResult, ErrorEnvelope, Page};
use axum::Extension;
use tracing::{debug, info};
use uuid::Uuid;

use crate::api::rest::auth::Caller;
use crate::api::rest::dto::{
    AssignBookReq, AuthorDto, BookDto, BorrowRecordDto, CategoryDto, CreateAuthorReq,
    CreateBookReq, CreateCategoryReq, CreateRoleReq, CreateUserReq, LoginReq, RefreshOverdueDto,
    RefreshTokenReq, ResetPasswordReq, RoleDto, SearchAuthorsReq, SearchBooksReq,
    SearchBorrowRecordsReq, SearchCategoriesReq, SearchRolesReq, SearchUsersReq, SignupReq,
    TokenPairDto, UpdateAuthorReq, UpdateBookReq, UpdateCategoryReq, UpdateRoleReq, UpdateUserReq,
    UserDto,
};
use crate::domain::service::Service;

type Svc = Extension<Arc<Service>>;

// ---------- auth ----------

#[utoipa::path(
    post, path = "/api/auth/login", tag = "auth",
    request_body = LoginReq,
    responses(
        (status = 200, description = "Token pair", body = TokenPairDto),
        (status = 401, description = "Invalid credentials", body = ErrorEnvelope),
        (status = 403, description = "User is inactive", body = ErrorEnvelope),
    )
)]
pub async fn login(
    Extension(svc): Svc,
    ApiJson(req): ApiJson<LoginReq>,
) -> ApiResult<TokenPairDto> {
    let (user, tokens) = svc.login(&req.email, &req.password).await?;
    info!(user_id = %user.id, "User logged in");
    Ok(ok_with_message("Login successful", tokens.into()))
}

#[utoipa::path(
    post, path = "/api/auth/signup", tag = "auth",
    request_body = SignupReq,
    responses(
        (status = 201, description = "Member account created", body = UserDto),
        (status = 409, description = "Email already in use", body = ErrorEnvelope),
    )
)]
pub async fn signup(Extension(svc): Svc, ApiJson(req): ApiJson<SignupReq>) -> ApiResult<UserDto> {
    let user = svc.signup(req.into()).await?;
    Ok(created("Signup successful", user.into()))
}

#[utoipa::path(
    patch, path = "/api/auth/refresh-token", tag = "auth",
    request_body = RefreshTokenReq,
    responses(
        (status = 200, description = "Rotated token pair", body = TokenPairDto),
        (status = 401, description = "Refresh token rejected", body = ErrorEnvelope),
    )
)]
pub async fn refresh_token(
    Extension(svc): Svc,
    ApiJson(req): ApiJson<RefreshTokenReq>,
) -> ApiResult<TokenPairDto> {
    let tokens = svc.refresh_token(&req.refresh_token).await?;
    Ok(ok(tokens.into()))
}

#[utoipa::path(
    get, path = "/api/auth/logout/{id}", tag = "auth",
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 200, description = "Logged out"),
        (status = 403, description = "Forbidden", body = ErrorEnvelope),
    ),
    security(("bearer" = []))
)]
pub async fn logout(
    Extension(svc): Svc,
    Caller(caller): Caller,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Option<()>> {
    svc.logout(&caller, id).await?;
    Ok(ok_with_message("Logged out", None))
}

#[utoipa::path(
    patch, path = "/api/auth/reset-password", tag = "auth",
    request_body = ResetPasswordReq,
    responses(
        (status = 200, description = "Password changed"),
        (status = 401, description = "Unauthorized", body = ErrorEnvelope),
    ),
    security(("bearer" = []))
)]
pub async fn reset_password(
    Extension(svc): Svc,
    Caller(caller): Caller,
    ApiJson(req): ApiJson<ResetPasswordReq>,
) -> ApiResult<Option<()>> {
    svc.reset_password(&caller, &req.current_password, &req.new_password)
        .await?;
    Ok(ok_with_message("Password changed", None))
}

#[utoipa::path(
    get, path = "/api/profile/me", tag = "auth",
    responses((status = 200, description = "Caller profile", body = UserDto)),
    security(("bearer" = []))
)]
pub async fn profile(Extension(svc): Svc, Caller(caller): Caller) -> ApiResult<UserDto> {
    let user = svc.profile(&caller).await?;
    Ok(ok(user.into()))
}

// ---------- roles ----------

#[utoipa::path(
    post, path = "/api/roles", tag = "roles",
    request_body = CreateRoleReq,
    responses(
        (status = 201, description = "Created", body = RoleDto),
        (status = 409, description = "Conflict", body = ErrorEnvelope),
    ),
    security(("bearer" = []))
)]
pub async fn create_role(
    Extension(svc): Svc,
    Caller(caller): Caller,
    ApiJson(req): ApiJson<CreateRoleReq>,
) -> ApiResult<RoleDto> {
    let role = svc.create_role(&caller, req.into()).await?;
    info!(role_id = %role.id, "Role created");
    Ok(created("Role created", role.into()))
}

#[utoipa::path(
    get, path = "/api/roles/{id}", tag = "roles",
    params(("id" = Uuid, Path, description = "Role id")),
    responses(
        (status = 200, description = "OK", body = RoleDto),
        (status = 404, description = "Not found", body = ErrorEnvelope),
    ),
    security(("bearer" = []))
)]
pub async fn get_role(Extension(svc): Svc, ApiPath(id): ApiPath<Uuid>) -> ApiResult<RoleDto> {
    debug!(%id, "Getting role");
    Ok(ok(svc.get_role(id).await?.into()))
}

#[utoipa::path(
    put, path = "/api/roles/{id}", tag = "roles",
    params(("id" = Uuid, Path, description = "Role id")),
    request_body = UpdateRoleReq,
    responses(
        (status = 200, description = "OK", body = RoleDto),
        (status = 404, description = "Not found", body = ErrorEnvelope),
        (status = 409, description = "Conflict", body = ErrorEnvelope),
    ),
    security(("bearer" = []))
)]
pub async fn update_role(
    Extension(svc): Svc,
    Caller(caller): Caller,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<UpdateRoleReq>,
) -> ApiResult<RoleDto> {
    let role = svc.update_role(&caller, id, req.into()).await?;
    Ok(ok_with_message("Role updated", role.into()))
}

#[utoipa::path(
    delete, path = "/api/roles/{id}", tag = "roles",
    params(("id" = Uuid, Path, description = "Role id")),
    responses(
        (status = 200, description = "Role deleted"),
        (status = 409, description = "Conflict", body = ErrorEnvelope),
    ),
    security(("bearer" = []))
)]
pub async fn delete_role(
    Extension(svc): Svc,
    Caller(caller): Caller,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Option<()>> {
    svc.delete_role(&caller, id).await?;
    Ok(ok_with_message("Role deleted", None))
}

#[utoipa::path(
    post, path = "/api/roles/search", tag = "roles",
    request_body = SearchRolesReq,
    responses((status = 200, description = "`{count, rows}` of roles")),
    security(("bearer" = []))
)]
pub async fn search_roles(
    Extension(svc): Svc,
    ApiJson(req): ApiJson<SearchRolesReq>,
) -> ApiResult<Page<RoleDto>> {
    let page = svc.search_roles(req.into()).await?;
    Ok(ok(page.map_rows(RoleDto::from)))
}

// ---------- users ----------

#[utoipa::path(
    post, path = "/api/users", tag = "users",
    request_body = CreateUserReq,
    responses(
        (status = 201, description = "Created", body = UserDto),
        (status = 409, description = "Conflict", body = ErrorEnvelope),
    ),
    security(("bearer" = []))
)]
pub async fn create_user(
    Extension(svc): Svc,
    Caller(caller): Caller,
    ApiJson(req): ApiJson<CreateUserReq>,
) -> ApiResult<UserDto> {
    let user = svc.create_user(&caller, req.into()).await?;
    info!(user_id = %user.id, "User created");
    Ok(created("User created", user.into()))
}

#[utoipa::path(
    get, path = "/api/users/{id}", tag = "users",
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 200, description = "OK", body = UserDto),
        (status = 404, description = "Not found", body = ErrorEnvelope),
    ),
    security(("bearer" = []))
)]
pub async fn get_user(
    Extension(svc): Svc,
    Caller(caller): Caller,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<UserDto> {
    debug!(%id, "Getting user");
    Ok(ok(svc.get_user_as(&caller, id).await?.into()))
}

#[utoipa::path(
    put, path = "/api/users/{id}", tag = "users",
    params(("id" = Uuid, Path, description = "User id")),
    request_body = UpdateUserReq,
    responses(
        (status = 200, description = "OK", body = UserDto),
        (status = 404, description = "Not found", body = ErrorEnvelope),
        (status = 409, description = "Conflict", body = ErrorEnvelope),
    ),
    security(("bearer" = []))
)]
pub async fn update_user(
    Extension(svc): Svc,
    Caller(caller): Caller,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<UpdateUserReq>,
) -> ApiResult<UserDto> {
    let user = svc.update_user(&caller, id, req.into()).await?;
    Ok(ok_with_message("User updated", user.into()))
}

#[utoipa::path(
    patch, path = "/api/users/{id}/status", tag = "users",
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 200, description = "OK", body = UserDto),
        (status = 404, description = "Not found", body = ErrorEnvelope),
    ),
    security(("bearer" = []))
)]
pub async fn toggle_user_status(
    Extension(svc): Svc,
    Caller(caller): Caller,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<UserDto> {
    let user = svc.toggle_user_status(&caller, id).await?;
    Ok(ok_with_message("User status updated", user.into()))
}

#[utoipa::path(
    delete, path = "/api/users/{id}", tag = "users",
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 200, description = "User deleted"),
        (status = 409, description = "Conflict", body = ErrorEnvelope),
    ),
    security(("bearer" = []))
)]
pub async fn delete_user(
    Extension(svc): Svc,
    Caller(caller): Caller,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Option<()>> {
    svc.delete_user(&caller, id).await?;
    Ok(ok_with_message("User deleted", None))
}

#[utoipa::path(
    post, path = "/api/users/search", tag = "users",
    request_body = SearchUsersReq,
    responses(
        (status = 200, description = "`{count, rows}` of users"),
        (status = 403, description = "Forbidden", body = ErrorEnvelope),
    ),
    security(("bearer" = []))
)]
pub async fn search_users(
    Extension(svc): Svc,
    Caller(caller): Caller,
    ApiJson(req): ApiJson<SearchUsersReq>,
) -> ApiResult<Page<UserDto>> {
    let page = svc.search_users(&caller, req.into()).await?;
    Ok(ok(page.map_rows(UserDto::from)))
}

// ---------- authors ----------

#[utoipa::path(
    post, path = "/api/author", tag = "authors",
    request_body = CreateAuthorReq,
    responses(
        (status = 201, description = "Created", body = AuthorDto),
        (status = 409, description = "Conflict", body = ErrorEnvelope),
    ),
    security(("bearer" = []))
)]
pub async fn create_author(
    Extension(svc): Svc,
    Caller(caller): Caller,
    ApiJson(req): ApiJson<CreateAuthorReq>,
) -> ApiResult<AuthorDto> {
    let author = svc.create_author(&caller, req.into()).await?;
    Ok(created("Author created", author.into()))
}

#[utoipa::path(
    get, path = "/api/author/{id}", tag = "authors",
    params(("id" = Uuid, Path, description = "Author id")),
    responses(
        (status = 200, description = "OK", body = AuthorDto),
        (status = 404, description = "Not found", body = ErrorEnvelope),
    ),
    security(("bearer" = []))
)]
pub async fn get_author(Extension(svc): Svc, ApiPath(id): ApiPath<Uuid>) -> ApiResult<AuthorDto> {
    Ok(ok(svc.get_author(id).await?.into()))
}

#[utoipa::path(
    put, path = "/api/author/{id}", tag = "authors",
    params(("id" = Uuid, Path, description = "Author id")),
    request_body = UpdateAuthorReq,
    responses(
        (status = 200, description = "OK", body = AuthorDto),
        (status = 404, description = "Not found", body = ErrorEnvelope),
        (status = 409, description = "Conflict", body = ErrorEnvelope),
    ),
    security(("bearer" = []))
)]
pub async fn update_author(
    Extension(svc): Svc,
    Caller(caller): Caller,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<UpdateAuthorReq>,
) -> ApiResult<AuthorDto> {
    let author = svc.update_author(&caller, id, req.into()).await?;
    Ok(ok_with_message("Author updated", author.into()))
}

#[utoipa::path(
    delete, path = "/api/author/{id}", tag = "authors",
    params(("id" = Uuid, Path, description = "Author id")),
    responses(
        (status = 200, description = "Author deleted"),
        (status = 409, description = "Conflict", body = ErrorEnvelope),
    ),
    security(("bearer" = []))
)]
pub async fn delete_author(
    Extension(svc): Svc,
    Caller(caller): Caller,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Option<()>> {
    svc.delete_author(&caller, id).await?;
    Ok(ok_with_message("Author deleted", None))
}

#[utoipa::path(
    post, path = "/api/author/search", tag = "authors",
    request_body = SearchAuthorsReq,
    responses((status = 200, description = "`{count, rows}` of authors")),
    security(("bearer" = []))
)]
pub async fn search_authors(
    Extension(svc): Svc,
    ApiJson(req): ApiJson<SearchAuthorsReq>,
) -> ApiResult<Page<AuthorDto>> {
    let page = svc.search_authors(req.into()).await?;
    Ok(ok(page.map_rows(AuthorDto::from)))
}

// ---------- categories ----------

#[utoipa::path(
    post, path = "/api/categories", tag = "categories",
    request_body = CreateCategoryReq,
    responses(
        (status = 201, description = "Created", body = CategoryDto),
        (status = 409, description = "Conflict", body = ErrorEnvelope),
    ),
    security(("bearer" = []))
)]
pub async fn create_category(
    Extension(svc): Svc,
    Caller(caller): Caller,
    ApiJson(req): ApiJson<CreateCategoryReq>,
) -> ApiResult<CategoryDto> {
    let category = svc.create_category(&caller, req.into()).await?;
    Ok(created("Category created", category.into()))
}

#[utoipa::path(
    get, path = "/api/categories/{id}", tag = "categories",
    params(("id" = Uuid, Path, description = "Category id")),
    responses(
        (status = 200, description = "OK", body = CategoryDto),
        (status = 404, description = "Not found", body = ErrorEnvelope),
    ),
    security(("bearer" = []))
)]
pub async fn get_category(
    Extension(svc): Svc,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<CategoryDto> {
    Ok(ok(svc.get_category(id).await?.into()))
}

#[utoipa::path(
    put, path = "/api/categories/{id}", tag = "categories",
    params(("id" = Uuid, Path, description = "Category id")),
    request_body = UpdateCategoryReq,
    responses(
        (status = 200, description = "OK", body = CategoryDto),
        (status = 404, description = "Not found", body = ErrorEnvelope),
        (status = 409, description = "Conflict", body = ErrorEnvelope),
    ),
    security(("bearer" = []))
)]
pub async fn update_category(
    Extension(svc): Svc,
    Caller(caller): Caller,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<UpdateCategoryReq>,
) -> ApiResult<CategoryDto> {
    let category = svc.update_category(&caller, id, req.into()).await?;
    Ok(ok_with_message("Category updated", category.into()))
}

#[utoipa::path(
    delete, path = "/api/categories/{id}", tag = "categories",
    params(("id" = Uuid, Path, description = "Category id")),
    responses(
        (status = 200, description = "Category deleted"),
        (status = 409, description = "Conflict", body = ErrorEnvelope),
    ),
    security(("bearer" = []))
)]
pub async fn delete_category(
    Extension(svc): Svc,
    Caller(caller): Caller,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Option<()>> {
    svc.delete_category(&caller, id).await?;
    Ok(ok_with_message("Category deleted", None))
}

#[utoipa::path(
    post, path = "/api/categories/search", tag = "categories",
    request_body = SearchCategoriesReq,
    responses((status = 200, description = "`{count, rows}` of categories")),
    security(("bearer" = []))
)]
pub async fn search_categories(
    Extension(svc): Svc,
    ApiJson(req): ApiJson<SearchCategoriesReq>,
) -> ApiResult<Page<CategoryDto>> {
    let page = svc.search_categories(req.into()).await?;
    Ok(ok(page.map_rows(CategoryDto::from)))
}

// ---------- books ----------

#[utoipa::path(
    post, path = "/api/books", tag = "books",
    request_body = CreateBookReq,
    responses(
        (status = 201, description = "Created", body = BookDto),
        (status = 404, description = "Author or category missing", body = ErrorEnvelope),
        (status = 409, description = "Conflict", body = ErrorEnvelope),
    ),
    security(("bearer" = []))
)]
pub async fn create_book(
    Extension(svc): Svc,
    Caller(caller): Caller,
    ApiJson(req): ApiJson<CreateBookReq>,
) -> ApiResult<BookDto> {
    let book = svc.create_book(&caller, req.into()).await?;
    info!(book_id = %book.id, "Book created");
    Ok(created("Book created", book.into()))
}

#[utoipa::path(
    get, path = "/api/books/{id}", tag = "books",
    params(("id" = Uuid, Path, description = "Book id")),
    responses(
        (status = 200, description = "OK", body = BookDto),
        (status = 404, description = "Not found", body = ErrorEnvelope),
    ),
    security(("bearer" = []))
)]
pub async fn get_book(Extension(svc): Svc, ApiPath(id): ApiPath<Uuid>) -> ApiResult<BookDto> {
    debug!(%id, "Getting book");
    Ok(ok(svc.get_book(id).await?.into()))
}

#[utoipa::path(
    put, path = "/api/books/{id}", tag = "books",
    params(("id" = Uuid, Path, description = "Book id")),
    request_body = UpdateBookReq,
    responses(
        (status = 200, description = "OK", body = BookDto),
        (status = 400, description = "Quantity below issued count", body = ErrorEnvelope),
        (status = 404, description = "Not found", body = ErrorEnvelope),
        (status = 409, description = "Conflict", body = ErrorEnvelope),
    ),
    security(("bearer" = []))
)]
pub async fn update_book(
    Extension(svc): Svc,
    Caller(caller): Caller,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<UpdateBookReq>,
) -> ApiResult<BookDto> {
    let book = svc.update_book(&caller, id, req.into()).await?;
    Ok(ok_with_message("Book updated", book.into()))
}

#[utoipa::path(
    delete, path = "/api/books/{id}", tag = "books",
    params(("id" = Uuid, Path, description = "Book id")),
    responses(
        (status = 200, description = "Book deleted"),
        (status = 409, description = "Conflict", body = ErrorEnvelope),
    ),
    security(("bearer" = []))
)]
pub async fn delete_book(
    Extension(svc): Svc,
    Caller(caller): Caller,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Option<()>> {
    svc.delete_book(&caller, id).await?;
    Ok(ok_with_message("Book deleted", None))
}

#[utoipa::path(
    post, path = "/api/books/search", tag = "books",
    request_body = SearchBooksReq,
    responses(
        (status = 200, description = "`{count, rows}` of books"),
        (status = 400, description = "Bad request", body = ErrorEnvelope),
    ),
    security(("bearer" = []))
)]
pub async fn search_books(
    Extension(svc): Svc,
    ApiJson(req): ApiJson<SearchBooksReq>,
) -> ApiResult<Page<BookDto>> {
    let page = svc.search_books(req.into()).await?;
    Ok(ok(page.map_rows(BookDto::from)))
}

#[utoipa::path(
    post, path = "/api/books/{id}/assign-book", tag = "books",
    params(("id" = Uuid, Path, description = "Book id")),
    request_body = AssignBookReq,
    responses(
        (status = 201, description = "Loan recorded", body = BorrowRecordDto),
        (status = 403, description = "Requester may not assign books", body = ErrorEnvelope),
        (status = 404, description = "Not found", body = ErrorEnvelope),
        (status = 409, description = "Out of stock", body = ErrorEnvelope),
    ),
    security(("bearer" = []))
)]
pub async fn assign_book(
    Extension(svc): Svc,
    Caller(caller): Caller,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<AssignBookReq>,
) -> ApiResult<BorrowRecordDto> {
    let record = svc.assign_book(id, caller.id, req.into()).await?;
    Ok(created("Book assigned", record.into()))
}

// ---------- borrow records ----------

#[utoipa::path(
    get, path = "/api/borrow-records/{id}", tag = "borrow-records",
    params(("id" = Uuid, Path, description = "Borrow record id")),
    responses(
        (status = 200, description = "OK", body = BorrowRecordDto),
        (status = 404, description = "Not found", body = ErrorEnvelope),
    ),
    security(("bearer" = []))
)]
pub async fn get_borrow_record(
    Extension(svc): Svc,
    Caller(caller): Caller,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<BorrowRecordDto> {
    Ok(ok(svc.get_borrow_record(&caller, id).await?.into()))
}

#[utoipa::path(
    post, path = "/api/borrow-records/search", tag = "borrow-records",
    request_body = SearchBorrowRecordsReq,
    responses((status = 200, description = "`{count, rows}` of borrow records")),
    security(("bearer" = []))
)]
pub async fn search_borrow_records(
    Extension(svc): Svc,
    Caller(caller): Caller,
    ApiJson(req): ApiJson<SearchBorrowRecordsReq>,
) -> ApiResult<Page<BorrowRecordDto>> {
    let page = svc.search_borrow_records(&caller, req.into()).await?;
    Ok(ok(page.map_rows(BorrowRecordDto::from)))
}

#[utoipa::path(
    post, path = "/api/borrow-records/{id}/return", tag = "borrow-records",
    params(("id" = Uuid, Path, description = "Borrow record id")),
    responses(
        (status = 200, description = "OK", body = BorrowRecordDto),
        (status = 409, description = "Conflict", body = ErrorEnvelope),
    ),
    security(("bearer" = []))
)]
pub async fn return_book(
    Extension(svc): Svc,
    Caller(caller): Caller,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<BorrowRecordDto> {
    let record = svc.return_book(&caller, id).await?;
    Ok(ok_with_message("Book returned", record.into()))
}

#[utoipa::path(
    post, path = "/api/borrow-records/{id}/lost", tag = "borrow-records",
    params(("id" = Uuid, Path, description = "Borrow record id")),
    responses(
        (status = 200, description = "OK", body = BorrowRecordDto),
        (status = 409, description = "Conflict", body = ErrorEnvelope),
    ),
    security(("bearer" = []))
)]
pub async fn mark_lost(
    Extension(svc): Svc,
    Caller(caller): Caller,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<BorrowRecordDto> {
    let record = svc.mark_lost(&caller, id).await?;
    Ok(ok_with_message("Book marked lost", record.into()))
}

#[utoipa::path(
    post, path = "/api/borrow-records/refresh-overdue", tag = "borrow-records",
    responses(
        (status = 200, description = "OK", body = RefreshOverdueDto),
        (status = 403, description = "Forbidden", body = ErrorEnvelope),
    ),
    security(("bearer" = []))
)]
pub async fn refresh_overdue(
    Extension(svc): Svc,
    Caller(caller): Caller,
) -> ApiResult<RefreshOverdueDto> {
    let updated = svc.refresh_overdue(&caller).await?;
    Ok(ok(RefreshOverdueDto { updated }))
}
