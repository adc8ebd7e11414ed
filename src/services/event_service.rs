//! Event service - scheduled engagements backed by signed contracts.
//!
//! Creation runs a fixed guard chain: the contract must exist, the
//! payload client (if any) must match it, the contract must be signed,
//! a SALES creator must own the client, and the contract must not
//! already have an event. The stored client is always taken from the
//! contract.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{
    event::{validate_attendees, validate_schedule},
    Actor, EventChanges, EventDetail, EventFilters, NewEvent, Resource, Role, RowAction, RowFacts,
    RowFilter,
};
use crate::errors::{AppError, AppResult};
use crate::infra::UnitOfWork;
use crate::types::PaginationParams;

/// Fields accepted when creating an event. `client` is optional and,
/// when present, only cross-checked against the contract.
#[derive(Debug, Clone)]
pub struct EventDraft {
    pub contract: Uuid,
    pub client: Option<Uuid>,
    pub support_contact: Option<Uuid>,
    pub event_name: String,
    pub event_start: chrono::DateTime<Utc>,
    pub event_end: chrono::DateTime<Utc>,
    pub location: String,
    pub attendees: i32,
    pub notes: Option<String>,
}

/// Event service trait for dependency injection.
#[async_trait]
pub trait EventService: Send + Sync {
    async fn list_events(
        &self,
        actor: Actor,
        filters: &EventFilters,
        pagination: &PaginationParams,
    ) -> AppResult<(Vec<EventDetail>, u64)>;

    async fn get_event(&self, actor: Actor, id: Uuid) -> AppResult<EventDetail>;

    /// Create an event for a signed contract.
    async fn create_event(&self, actor: Actor, draft: EventDraft) -> AppResult<EventDetail>;

    /// Update an event. The contract and client links are immutable.
    async fn update_event(
        &self,
        actor: Actor,
        id: Uuid,
        changes: EventChanges,
    ) -> AppResult<EventDetail>;

    /// Delete an event. MANAGEMENT only.
    async fn delete_event(&self, actor: Actor, id: Uuid) -> AppResult<()>;
}

/// Concrete implementation of EventService using Unit of Work.
pub struct EventManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> EventManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }

    /// An event's support contact must point at an existing SUPPORT user.
    async fn check_support_contact(&self, id: Uuid) -> AppResult<()> {
        let user = self
            .uow
            .users()
            .find_by_id(&RowFilter::All, id)
            .await?
            .ok_or_else(|| AppError::field("support_contact", "support_contact does not exist"))?;

        if user.role != Role::Support {
            return Err(AppError::field(
                "support_contact",
                "support_contact must reference a SUPPORT user",
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl<U: UnitOfWork> EventService for EventManager<U> {
    async fn list_events(
        &self,
        actor: Actor,
        filters: &EventFilters,
        pagination: &PaginationParams,
    ) -> AppResult<(Vec<EventDetail>, u64)> {
        let scope = actor.read_scope(Resource::Events);
        self.uow.events().list(&scope, filters, pagination).await
    }

    async fn get_event(&self, actor: Actor, id: Uuid) -> AppResult<EventDetail> {
        let scope = actor.read_scope(Resource::Events);
        self.uow
            .events()
            .find_by_id(&scope, id)
            .await?
            .ok_or(AppError::NotFound)
    }

    async fn create_event(&self, actor: Actor, draft: EventDraft) -> AppResult<EventDetail> {
        if !actor.can_create(Resource::Events) {
            return Err(AppError::forbidden(
                "only management and sales may create events",
            ));
        }

        let contract = self
            .uow
            .contracts()
            .find_by_id(&RowFilter::All, draft.contract)
            .await?
            .ok_or_else(|| AppError::field("contract", "contract does not exist"))?;

        if let Some(client) = draft.client {
            if client != contract.contract.client {
                return Err(AppError::field("client", "client does not match contract"));
            }
        }

        if !contract.contract.is_signed {
            return Err(AppError::field(
                "contract",
                "cannot create an event for an unsigned contract",
            ));
        }

        if actor.role == Role::Sales && contract.client_sales_contact != Some(actor.id) {
            return Err(AppError::forbidden(
                "you may only create events for your own contracts",
            ));
        }

        if self
            .uow
            .events()
            .find_by_contract(draft.contract)
            .await?
            .is_some()
        {
            return Err(AppError::conflict("an event for this contract"));
        }

        if let Some(support_contact) = draft.support_contact {
            self.check_support_contact(support_contact).await?;
        }

        validate_attendees(draft.attendees)?;
        validate_schedule(draft.event_start, draft.event_end, Some(Utc::now()))?;

        self.uow
            .events()
            .insert(NewEvent {
                contract: draft.contract,
                // The stored client always comes from the contract.
                client: contract.contract.client,
                support_contact: draft.support_contact,
                event_name: draft.event_name,
                event_start: draft.event_start,
                event_end: draft.event_end,
                location: draft.location,
                attendees: draft.attendees,
                notes: draft.notes,
            })
            .await
    }

    async fn update_event(
        &self,
        actor: Actor,
        id: Uuid,
        changes: EventChanges,
    ) -> AppResult<EventDetail> {
        let read_scope = actor.read_scope(Resource::Events);
        let detail = self
            .uow
            .events()
            .find_by_id(&read_scope, id)
            .await?
            .ok_or(AppError::NotFound)?;

        let facts = RowFacts {
            id: Some(detail.event.id),
            sales_owner: detail.client_sales_contact,
            support_assignee: detail.event.support_contact,
        };
        if !actor.scope(Resource::Events, RowAction::Update).allows(&facts) {
            return Err(AppError::forbidden(
                "you may only modify events assigned to you",
            ));
        }

        if let Some(contract) = changes.contract {
            if contract != detail.event.contract {
                return Err(AppError::field("contract", "contract cannot be modified"));
            }
        }
        if let Some(client) = changes.client {
            if client != detail.event.client {
                return Err(AppError::field("client", "client cannot be modified"));
            }
        }

        if changes.touches_restricted_fields() && !actor.role.is_management() {
            return Err(AppError::forbidden(
                "only management may reassign the support contact",
            ));
        }
        if let Some(support_contact) = changes.support_contact {
            self.check_support_contact(support_contact).await?;
        }

        if let Some(attendees) = changes.attendees {
            validate_attendees(attendees)?;
        }

        // The schedule invariant holds on the resulting state; past
        // start dates are tolerated here (events get notes afterwards).
        let start = changes.event_start.unwrap_or(detail.event.event_start);
        let end = changes.event_end.unwrap_or(detail.event.event_end);
        validate_schedule(start, end, None)?;

        self.uow.events().update(id, changes).await
    }

    async fn delete_event(&self, actor: Actor, id: Uuid) -> AppResult<()> {
        let read_scope = actor.read_scope(Resource::Events);
        let detail = self
            .uow
            .events()
            .find_by_id(&read_scope, id)
            .await?
            .ok_or(AppError::NotFound)?;

        let facts = RowFacts {
            id: Some(detail.event.id),
            sales_owner: detail.client_sales_contact,
            support_assignee: detail.event.support_contact,
        };
        if !actor.scope(Resource::Events, RowAction::Delete).allows(&facts) {
            return Err(AppError::forbidden("only management may delete events"));
        }

        self.uow.events().delete(id).await
    }
}
