//! Contract handlers.

use axum::{
    extract::{Extension, Path, Query, RawQuery, State},
    response::Json,
    routing::get,
    Router,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::{ContractChanges, ContractFilters, ContractResponse, NewContract};
use crate::errors::AppResult;
use crate::types::{Created, NoContent, Page, PaginationParams};

/// New contract
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateContractRequest {
    pub client: Uuid,
    pub sales_contact: Option<Uuid>,
    #[schema(value_type = String, example = "1000.00")]
    pub total_amount: Decimal,
    #[schema(value_type = String, example = "250.00")]
    pub amount_due: Decimal,
    #[serde(default)]
    pub is_signed: bool,
}

/// Partial contract update
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateContractRequest {
    pub client: Option<Uuid>,
    pub sales_contact: Option<Uuid>,
    #[schema(value_type = Option<String>)]
    pub total_amount: Option<Decimal>,
    #[schema(value_type = Option<String>)]
    pub amount_due: Option<Decimal>,
    pub is_signed: Option<bool>,
}

/// Create contract routes
pub fn contract_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_contracts).post(create_contract))
        .route(
            "/:id",
            get(get_contract)
                .put(replace_contract)
                .patch(update_contract)
                .delete(delete_contract),
        )
}

/// List visible contracts
#[utoipa::path(
    get,
    path = "/contracts",
    tag = "Contracts",
    params(PaginationParams, ContractFilters),
    responses(
        (status = 200, description = "Paginated contracts"),
        (status = 401, description = "Not authenticated")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_contracts(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Query(filters): Query<ContractFilters>,
    Query(pagination): Query<PaginationParams>,
    RawQuery(query): RawQuery,
) -> AppResult<Json<Page<ContractResponse>>> {
    let (contracts, count) = state
        .contract_service
        .list_contracts(current.actor(), &filters, &pagination)
        .await?;

    let page = Page::new(contracts, count, &pagination, "/contracts", query.as_deref())
        .map(ContractResponse::from);
    Ok(Json(page))
}

/// Get one contract
#[utoipa::path(
    get,
    path = "/contracts/{id}",
    tag = "Contracts",
    params(("id" = Uuid, Path, description = "Contract id")),
    responses(
        (status = 200, description = "Contract found", body = ContractResponse),
        (status = 404, description = "Not found or not visible")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_contract(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ContractResponse>> {
    let contract = state
        .contract_service
        .get_contract(current.actor(), id)
        .await?;

    Ok(Json(ContractResponse::from(contract)))
}

/// Create a contract (MANAGEMENT only)
#[utoipa::path(
    post,
    path = "/contracts",
    tag = "Contracts",
    request_body = CreateContractRequest,
    responses(
        (status = 201, description = "Contract created", body = ContractResponse),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Not management")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_contract(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<CreateContractRequest>,
) -> AppResult<Created<ContractResponse>> {
    let contract = state
        .contract_service
        .create_contract(
            current.actor(),
            NewContract {
                client: payload.client,
                sales_contact: payload.sales_contact,
                total_amount: payload.total_amount,
                amount_due: payload.amount_due,
                is_signed: payload.is_signed,
            },
        )
        .await?;

    Ok(Created(ContractResponse::from(contract)))
}

/// Replace a contract (MANAGEMENT only)
#[utoipa::path(
    put,
    path = "/contracts/{id}",
    tag = "Contracts",
    params(("id" = Uuid, Path, description = "Contract id")),
    request_body = CreateContractRequest,
    responses(
        (status = 200, description = "Contract updated", body = ContractResponse),
        (status = 403, description = "Not management"),
        (status = 404, description = "Not found or not visible")
    ),
    security(("bearer_auth" = []))
)]
pub async fn replace_contract(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<CreateContractRequest>,
) -> AppResult<Json<ContractResponse>> {
    let changes = ContractChanges {
        client: Some(payload.client),
        sales_contact: payload.sales_contact,
        total_amount: Some(payload.total_amount),
        amount_due: Some(payload.amount_due),
        is_signed: Some(payload.is_signed),
    };
    let contract = state
        .contract_service
        .update_contract(current.actor(), id, changes)
        .await?;

    Ok(Json(ContractResponse::from(contract)))
}

/// Partially update a contract (MANAGEMENT only)
#[utoipa::path(
    patch,
    path = "/contracts/{id}",
    tag = "Contracts",
    params(("id" = Uuid, Path, description = "Contract id")),
    request_body = UpdateContractRequest,
    responses(
        (status = 200, description = "Contract updated", body = ContractResponse),
        (status = 400, description = "Amount invariant violated"),
        (status = 403, description = "Not management"),
        (status = 404, description = "Not found or not visible")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_contract(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateContractRequest>,
) -> AppResult<Json<ContractResponse>> {
    let changes = ContractChanges {
        client: payload.client,
        sales_contact: payload.sales_contact,
        total_amount: payload.total_amount,
        amount_due: payload.amount_due,
        is_signed: payload.is_signed,
    };
    let contract = state
        .contract_service
        .update_contract(current.actor(), id, changes)
        .await?;

    Ok(Json(ContractResponse::from(contract)))
}

/// Delete a contract (MANAGEMENT only)
#[utoipa::path(
    delete,
    path = "/contracts/{id}",
    tag = "Contracts",
    params(("id" = Uuid, Path, description = "Contract id")),
    responses(
        (status = 204, description = "Contract deleted"),
        (status = 403, description = "Not management"),
        (status = 404, description = "Not found or not visible")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_contract(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> AppResult<NoContent> {
    state
        .contract_service
        .delete_contract(current.actor(), id)
        .await?;

    Ok(NoContent)
}
