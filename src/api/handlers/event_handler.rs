//! Event handlers.

use axum::{
    extract::{Extension, Path, Query, RawQuery, State},
    response::Json,
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::{EventChanges, EventFilters, EventResponse};
use crate::errors::AppResult;
use crate::services::EventDraft;
use crate::types::{Created, NoContent, Page, PaginationParams};

/// New event. `client` is optional; when present it must match the
/// contract's client, and the stored value always comes from the
/// contract either way.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateEventRequest {
    pub contract: Uuid,
    pub client: Option<Uuid>,
    pub support_contact: Option<Uuid>,
    #[validate(length(min = 1, message = "event_name is required"))]
    #[schema(example = "Kickoff reception")]
    pub event_name: String,
    pub event_start: DateTime<Utc>,
    pub event_end: DateTime<Utc>,
    #[validate(length(min = 1, message = "location is required"))]
    #[schema(example = "Salle Eiffel - Paris")]
    pub location: String,
    #[validate(range(min = 1, message = "attendees must be positive"))]
    #[schema(example = 80)]
    pub attendees: i32,
    pub notes: Option<String>,
}

/// Partial event update. The contract and client links are immutable;
/// sending them back unchanged is tolerated.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateEventRequest {
    pub contract: Option<Uuid>,
    pub client: Option<Uuid>,
    pub support_contact: Option<Uuid>,
    #[validate(length(min = 1, message = "event_name is required"))]
    pub event_name: Option<String>,
    pub event_start: Option<DateTime<Utc>>,
    pub event_end: Option<DateTime<Utc>>,
    #[validate(length(min = 1, message = "location is required"))]
    pub location: Option<String>,
    #[validate(range(min = 1, message = "attendees must be positive"))]
    pub attendees: Option<i32>,
    pub notes: Option<String>,
}

/// Create event routes
pub fn event_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_events).post(create_event))
        .route(
            "/:id",
            get(get_event)
                .put(replace_event)
                .patch(update_event)
                .delete(delete_event),
        )
}

/// List visible events
#[utoipa::path(
    get,
    path = "/events",
    tag = "Events",
    params(PaginationParams, EventFilters),
    responses(
        (status = 200, description = "Paginated events"),
        (status = 401, description = "Not authenticated")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_events(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Query(filters): Query<EventFilters>,
    Query(pagination): Query<PaginationParams>,
    RawQuery(query): RawQuery,
) -> AppResult<Json<Page<EventResponse>>> {
    let (events, count) = state
        .event_service
        .list_events(current.actor(), &filters, &pagination)
        .await?;

    let page = Page::new(events, count, &pagination, "/events", query.as_deref())
        .map(EventResponse::from);
    Ok(Json(page))
}

/// Get one event
#[utoipa::path(
    get,
    path = "/events/{id}",
    tag = "Events",
    params(("id" = Uuid, Path, description = "Event id")),
    responses(
        (status = 200, description = "Event found", body = EventResponse),
        (status = 404, description = "Not found or not visible")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_event(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<EventResponse>> {
    let event = state.event_service.get_event(current.actor(), id).await?;

    Ok(Json(EventResponse::from(event)))
}

/// Create an event for a signed contract (MANAGEMENT and SALES)
#[utoipa::path(
    post,
    path = "/events",
    tag = "Events",
    request_body = CreateEventRequest,
    responses(
        (status = 201, description = "Event created", body = EventResponse),
        (status = 400, description = "Validation error (unsigned contract, bad schedule...)"),
        (status = 403, description = "Role may not create events, or contract not owned"),
        (status = 409, description = "Contract already has an event")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_event(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<CreateEventRequest>,
) -> AppResult<Created<EventResponse>> {
    let event = state
        .event_service
        .create_event(
            current.actor(),
            EventDraft {
                contract: payload.contract,
                client: payload.client,
                support_contact: payload.support_contact,
                event_name: payload.event_name,
                event_start: payload.event_start,
                event_end: payload.event_end,
                location: payload.location,
                attendees: payload.attendees,
                notes: payload.notes,
            },
        )
        .await?;

    Ok(Created(EventResponse::from(event)))
}

/// Replace an event
#[utoipa::path(
    put,
    path = "/events/{id}",
    tag = "Events",
    params(("id" = Uuid, Path, description = "Event id")),
    request_body = CreateEventRequest,
    responses(
        (status = 200, description = "Event updated", body = EventResponse),
        (status = 400, description = "Contract or client change attempted"),
        (status = 403, description = "Not assigned to you"),
        (status = 404, description = "Not found or not visible")
    ),
    security(("bearer_auth" = []))
)]
pub async fn replace_event(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<CreateEventRequest>,
) -> AppResult<Json<EventResponse>> {
    let changes = EventChanges {
        contract: Some(payload.contract),
        client: payload.client,
        support_contact: payload.support_contact,
        event_name: Some(payload.event_name),
        event_start: Some(payload.event_start),
        event_end: Some(payload.event_end),
        location: Some(payload.location),
        attendees: Some(payload.attendees),
        notes: payload.notes,
    };
    let event = state
        .event_service
        .update_event(current.actor(), id, changes)
        .await?;

    Ok(Json(EventResponse::from(event)))
}

/// Partially update an event
#[utoipa::path(
    patch,
    path = "/events/{id}",
    tag = "Events",
    params(("id" = Uuid, Path, description = "Event id")),
    request_body = UpdateEventRequest,
    responses(
        (status = 200, description = "Event updated", body = EventResponse),
        (status = 400, description = "Contract or client change attempted"),
        (status = 403, description = "Not assigned to you"),
        (status = 404, description = "Not found or not visible")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_event(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateEventRequest>,
) -> AppResult<Json<EventResponse>> {
    let changes = EventChanges {
        contract: payload.contract,
        client: payload.client,
        support_contact: payload.support_contact,
        event_name: payload.event_name,
        event_start: payload.event_start,
        event_end: payload.event_end,
        location: payload.location,
        attendees: payload.attendees,
        notes: payload.notes,
    };
    let event = state
        .event_service
        .update_event(current.actor(), id, changes)
        .await?;

    Ok(Json(EventResponse::from(event)))
}

/// Delete an event (MANAGEMENT only)
#[utoipa::path(
    delete,
    path = "/events/{id}",
    tag = "Events",
    params(("id" = Uuid, Path, description = "Event id")),
    responses(
        (status = 204, description = "Event deleted"),
        (status = 403, description = "Not management"),
        (status = 404, description = "Not found or not visible")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_event(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> AppResult<NoContent> {
    state.event_service.delete_event(current.actor(), id).await?;

    Ok(NoContent)
}
