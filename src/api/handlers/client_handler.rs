//! Client handlers.

use axum::{
    extract::{Extension, Path, Query, RawQuery, State},
    response::Json,
    routing::get,
    Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::{ClientChanges, ClientResponse, NewClient};
use crate::errors::AppResult;
use crate::types::{Created, NoContent, Page, PaginationParams};

/// New client. `sales_contact` is honored for MANAGEMENT only; a SALES
/// creator always becomes the contact themselves.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateClientRequest {
    #[validate(length(min = 1, message = "full_name is required"))]
    #[schema(example = "Jean Martin")]
    pub full_name: String,
    #[validate(email(message = "invalid email format"))]
    #[schema(example = "jean.martin@alpha.example")]
    pub email: String,
    #[validate(length(min = 1, message = "phone is required"))]
    pub phone: String,
    #[validate(length(min = 1, message = "company_name is required"))]
    #[schema(example = "Société Alpha")]
    pub company_name: String,
    pub last_contact_date: NaiveDate,
    pub sales_contact: Option<Uuid>,
}

/// Partial client update
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateClientRequest {
    #[validate(length(min = 1, message = "full_name is required"))]
    pub full_name: Option<String>,
    #[validate(email(message = "invalid email format"))]
    pub email: Option<String>,
    #[validate(length(min = 1, message = "phone is required"))]
    pub phone: Option<String>,
    #[validate(length(min = 1, message = "company_name is required"))]
    pub company_name: Option<String>,
    pub last_contact_date: Option<NaiveDate>,
    pub sales_contact: Option<Uuid>,
}

/// Create client routes
pub fn client_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_clients).post(create_client))
        .route(
            "/:id",
            get(get_client)
                .put(replace_client)
                .patch(update_client)
                .delete(delete_client),
        )
}

/// List visible clients
#[utoipa::path(
    get,
    path = "/clients",
    tag = "Clients",
    params(PaginationParams),
    responses(
        (status = 200, description = "Paginated clients"),
        (status = 401, description = "Not authenticated")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_clients(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Query(pagination): Query<PaginationParams>,
    RawQuery(query): RawQuery,
) -> AppResult<Json<Page<ClientResponse>>> {
    let (clients, count) = state
        .client_service
        .list_clients(current.actor(), &pagination)
        .await?;

    let page = Page::new(clients, count, &pagination, "/clients", query.as_deref())
        .map(ClientResponse::from);
    Ok(Json(page))
}

/// Get one client
#[utoipa::path(
    get,
    path = "/clients/{id}",
    tag = "Clients",
    params(("id" = Uuid, Path, description = "Client id")),
    responses(
        (status = 200, description = "Client found", body = ClientResponse),
        (status = 404, description = "Not found or not visible")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_client(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ClientResponse>> {
    let client = state.client_service.get_client(current.actor(), id).await?;

    Ok(Json(ClientResponse::from(client)))
}

/// Create a client (MANAGEMENT and SALES)
#[utoipa::path(
    post,
    path = "/clients",
    tag = "Clients",
    request_body = CreateClientRequest,
    responses(
        (status = 201, description = "Client created", body = ClientResponse),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Role may not create clients"),
        (status = 409, description = "Email already in use")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_client(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<CreateClientRequest>,
) -> AppResult<Created<ClientResponse>> {
    let client = state
        .client_service
        .create_client(
            current.actor(),
            NewClient {
                full_name: payload.full_name,
                email: payload.email,
                phone: payload.phone,
                company_name: payload.company_name,
                last_contact_date: payload.last_contact_date,
                sales_contact: payload.sales_contact,
            },
        )
        .await?;

    Ok(Created(ClientResponse::from(client)))
}

/// Replace a client
#[utoipa::path(
    put,
    path = "/clients/{id}",
    tag = "Clients",
    params(("id" = Uuid, Path, description = "Client id")),
    request_body = CreateClientRequest,
    responses(
        (status = 200, description = "Client updated", body = ClientResponse),
        (status = 403, description = "Not your client"),
        (status = 404, description = "Not found or not visible")
    ),
    security(("bearer_auth" = []))
)]
pub async fn replace_client(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<CreateClientRequest>,
) -> AppResult<Json<ClientResponse>> {
    let changes = ClientChanges {
        full_name: Some(payload.full_name),
        email: Some(payload.email),
        phone: Some(payload.phone),
        company_name: Some(payload.company_name),
        last_contact_date: Some(payload.last_contact_date),
        sales_contact: payload.sales_contact,
    };
    let client = state
        .client_service
        .update_client(current.actor(), id, changes)
        .await?;

    Ok(Json(ClientResponse::from(client)))
}

/// Partially update a client
#[utoipa::path(
    patch,
    path = "/clients/{id}",
    tag = "Clients",
    params(("id" = Uuid, Path, description = "Client id")),
    request_body = UpdateClientRequest,
    responses(
        (status = 200, description = "Client updated", body = ClientResponse),
        (status = 403, description = "Not your client"),
        (status = 404, description = "Not found or not visible")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_client(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateClientRequest>,
) -> AppResult<Json<ClientResponse>> {
    let changes = ClientChanges {
        full_name: payload.full_name,
        email: payload.email,
        phone: payload.phone,
        company_name: payload.company_name,
        last_contact_date: payload.last_contact_date,
        sales_contact: payload.sales_contact,
    };
    let client = state
        .client_service
        .update_client(current.actor(), id, changes)
        .await?;

    Ok(Json(ClientResponse::from(client)))
}

/// Delete a client (MANAGEMENT only)
#[utoipa::path(
    delete,
    path = "/clients/{id}",
    tag = "Clients",
    params(("id" = Uuid, Path, description = "Client id")),
    responses(
        (status = 204, description = "Client deleted"),
        (status = 403, description = "Not management"),
        (status = 404, description = "Not found or not visible")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_client(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> AppResult<NoContent> {
    state
        .client_service
        .delete_client(current.actor(), id)
        .await?;

    Ok(NoContent)
}
