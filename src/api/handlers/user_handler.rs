//! User management handlers.
//!
//! Creation and deletion are MANAGEMENT operations; other roles only
//! ever see their own account here.

use axum::{
    extract::{Extension, Path, Query, RawQuery, State},
    response::Json,
    routing::get,
    Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::{Role, UserResponse};
use crate::errors::AppResult;
use crate::services::UserUpdate;
use crate::types::{Created, NoContent, Page, PaginationParams};

/// New collaborator account
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUserRequest {
    #[validate(length(min = 3, message = "username must be at least 3 characters"))]
    #[schema(example = "bob.martin")]
    pub username: String,
    #[validate(email(message = "invalid email format"))]
    #[schema(example = "bob.martin@example.com")]
    pub email: String,
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    #[schema(example = "SecurePass123!", min_length = 8)]
    pub password: String,
    pub role: Role,
}

/// Full account replacement; password is optional and re-hashed when set
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ReplaceUserRequest {
    #[validate(length(min = 3, message = "username must be at least 3 characters"))]
    pub username: String,
    #[validate(email(message = "invalid email format"))]
    pub email: String,
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub password: Option<String>,
    pub role: Role,
}

/// Partial account update
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateUserRequest {
    #[validate(length(min = 3, message = "username must be at least 3 characters"))]
    pub username: Option<String>,
    #[validate(email(message = "invalid email format"))]
    pub email: Option<String>,
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub password: Option<String>,
    pub role: Option<Role>,
}

/// Create user routes
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route("/me", get(get_current_user))
        .route(
            "/:id",
            get(get_user)
                .put(replace_user)
                .patch(update_user)
                .delete(delete_user),
        )
}

/// List visible users
#[utoipa::path(
    get,
    path = "/users",
    tag = "Users",
    params(PaginationParams),
    responses(
        (status = 200, description = "Paginated users"),
        (status = 401, description = "Not authenticated")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_users(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Query(pagination): Query<PaginationParams>,
    RawQuery(query): RawQuery,
) -> AppResult<Json<Page<UserResponse>>> {
    let (users, count) = state
        .user_service
        .list_users(current.actor(), &pagination)
        .await?;

    let page = Page::new(users, count, &pagination, "/users", query.as_deref())
        .map(UserResponse::from);
    Ok(Json(page))
}

/// Get the authenticated user's own account
#[utoipa::path(
    get,
    path = "/users/me",
    tag = "Users",
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Not authenticated")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_current_user(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> AppResult<Json<UserResponse>> {
    let user = state
        .user_service
        .get_user(current.actor(), current.id)
        .await?;

    Ok(Json(UserResponse::from(user)))
}

/// Get one user
#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "Users",
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 200, description = "User found", body = UserResponse),
        (status = 404, description = "Not found or not visible")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_user(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<UserResponse>> {
    let user = state.user_service.get_user(current.actor(), id).await?;

    Ok(Json(UserResponse::from(user)))
}

/// Create a collaborator account (MANAGEMENT only)
#[utoipa::path(
    post,
    path = "/users",
    tag = "Users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Not management"),
        (status = 409, description = "Username already taken")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_user(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<CreateUserRequest>,
) -> AppResult<Created<UserResponse>> {
    let user = state
        .user_service
        .create_user(
            current.actor(),
            payload.username,
            payload.email,
            payload.password,
            payload.role,
        )
        .await?;

    Ok(Created(UserResponse::from(user)))
}

/// Replace a user account
#[utoipa::path(
    put,
    path = "/users/{id}",
    tag = "Users",
    params(("id" = Uuid, Path, description = "User id")),
    request_body = ReplaceUserRequest,
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 403, description = "Not allowed to modify this account"),
        (status = 404, description = "Not found or not visible")
    ),
    security(("bearer_auth" = []))
)]
pub async fn replace_user(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<ReplaceUserRequest>,
) -> AppResult<Json<UserResponse>> {
    let update = UserUpdate {
        username: Some(payload.username),
        email: Some(payload.email),
        password: payload.password,
        role: Some(payload.role),
    };
    let user = state
        .user_service
        .update_user(current.actor(), id, update)
        .await?;

    Ok(Json(UserResponse::from(user)))
}

/// Partially update a user account
#[utoipa::path(
    patch,
    path = "/users/{id}",
    tag = "Users",
    params(("id" = Uuid, Path, description = "User id")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 403, description = "Not allowed to modify this account"),
        (status = 404, description = "Not found or not visible")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_user(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateUserRequest>,
) -> AppResult<Json<UserResponse>> {
    let update = UserUpdate {
        username: payload.username,
        email: payload.email,
        password: payload.password,
        role: payload.role,
    };
    let user = state
        .user_service
        .update_user(current.actor(), id, update)
        .await?;

    Ok(Json(UserResponse::from(user)))
}

/// Delete a user account (MANAGEMENT only, never your own)
#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "Users",
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 403, description = "Not management, or own account"),
        (status = 404, description = "Not found or not visible")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> AppResult<NoContent> {
    state.user_service.delete_user(current.actor(), id).await?;

    Ok(NoContent)
}
