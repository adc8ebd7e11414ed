//! Event persistence.
//!
//! SALES visibility follows the owning client (via `clients.sales_contact_id`);
//! SUPPORT visibility follows direct assignment (`events.support_contact_id`).

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult, JoinType,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set,
};
use uuid::Uuid;

use super::entities::{client, event, user};
use crate::domain::{Event, EventChanges, EventDetail, EventFilters, NewEvent, RowFilter};
use crate::errors::AppResult;
use crate::types::PaginationParams;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventRepository: Send + Sync {
    /// List events visible under `scope`, latest start first, after
    /// applying the query-string filters.
    async fn list(
        &self,
        scope: &RowFilter,
        filters: &EventFilters,
        pagination: &PaginationParams,
    ) -> AppResult<(Vec<EventDetail>, u64)>;

    /// Fetch one event if it exists and falls inside `scope`.
    async fn find_by_id(&self, scope: &RowFilter, id: Uuid) -> AppResult<Option<EventDetail>>;

    /// Fetch the event attached to a contract, if any. Used by the
    /// one-event-per-contract pre-check.
    async fn find_by_contract(&self, contract_id: Uuid) -> AppResult<Option<Event>>;

    async fn insert(&self, data: NewEvent) -> AppResult<EventDetail>;

    async fn update(&self, id: Uuid, changes: EventChanges) -> AppResult<EventDetail>;

    async fn delete(&self, id: Uuid) -> AppResult<()>;
}

/// SeaORM-backed implementation.
pub struct EventStore {
    db: DatabaseConnection,
}

impl EventStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn scoped_query(scope: &RowFilter) -> sea_orm::Select<event::Entity> {
        let query = event::Entity::find()
            .column_as(client::Column::FullName, "client_full_name")
            .column_as(client::Column::SalesContactId, "client_sales_contact")
            .column_as(user::Column::Username, "support_contact_username")
            .join(JoinType::InnerJoin, event::Relation::Client.def())
            .join(JoinType::LeftJoin, event::Relation::SupportContact.def());

        match scope {
            RowFilter::All => query,
            RowFilter::SalesOwned(user_id) => {
                query.filter(client::Column::SalesContactId.eq(*user_id))
            }
            RowFilter::SupportAssigned(user_id) => {
                query.filter(event::Column::SupportContactId.eq(*user_id))
            }
            RowFilter::IdIs(id) => query.filter(event::Column::Id.eq(*id)),
            RowFilter::Nothing => query.filter(event::Column::Id.is_null()),
        }
    }

    fn filtered_query(scope: &RowFilter, filters: &EventFilters) -> sea_orm::Select<event::Entity> {
        let mut query = Self::scoped_query(scope);

        if let Some(support_contact) = filters.support_contact {
            query = query.filter(event::Column::SupportContactId.eq(support_contact));
        }
        if let Some(isnull) = filters.support_contact_isnull {
            query = if isnull {
                query.filter(event::Column::SupportContactId.is_null())
            } else {
                query.filter(event::Column::SupportContactId.is_not_null())
            };
        }
        if let Some(client_id) = filters.client {
            query = query.filter(event::Column::ClientId.eq(client_id));
        }
        if let Some(v) = filters.event_start_gte {
            query = query.filter(event::Column::EventStart.gte(v));
        }
        if let Some(v) = filters.event_start_lte {
            query = query.filter(event::Column::EventStart.lte(v));
        }

        query
    }

    async fn fetch_detail(&self, id: Uuid) -> AppResult<EventDetail> {
        self.find_by_id(&RowFilter::All, id)
            .await?
            .ok_or_else(|| crate::errors::AppError::internal("event row vanished after write"))
    }
}

#[derive(Debug, FromQueryResult)]
struct EventRow {
    id: Uuid,
    contract_id: Uuid,
    client_id: Uuid,
    support_contact_id: Option<Uuid>,
    event_name: String,
    event_start: chrono::DateTime<Utc>,
    event_end: chrono::DateTime<Utc>,
    location: String,
    attendees: i32,
    notes: Option<String>,
    created_at: chrono::DateTime<Utc>,
    updated_at: chrono::DateTime<Utc>,
    client_full_name: String,
    client_sales_contact: Option<Uuid>,
    support_contact_username: Option<String>,
}

impl From<EventRow> for EventDetail {
    fn from(row: EventRow) -> Self {
        Self {
            event: Event {
                id: row.id,
                contract: row.contract_id,
                client: row.client_id,
                support_contact: row.support_contact_id,
                event_name: row.event_name,
                event_start: row.event_start,
                event_end: row.event_end,
                location: row.location,
                attendees: row.attendees,
                notes: row.notes,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
            client_full_name: row.client_full_name,
            support_contact_username: row.support_contact_username,
            client_sales_contact: row.client_sales_contact,
        }
    }
}

#[async_trait]
impl EventRepository for EventStore {
    async fn list(
        &self,
        scope: &RowFilter,
        filters: &EventFilters,
        pagination: &PaginationParams,
    ) -> AppResult<(Vec<EventDetail>, u64)> {
        let paginator = Self::filtered_query(scope, filters)
            .order_by_desc(event::Column::EventStart)
            .into_model::<EventRow>()
            .paginate(&self.db, pagination.limit());

        let total = paginator.num_items().await?;
        let rows = paginator.fetch_page(pagination.page_index()).await?;

        Ok((rows.into_iter().map(EventDetail::from).collect(), total))
    }

    async fn find_by_id(&self, scope: &RowFilter, id: Uuid) -> AppResult<Option<EventDetail>> {
        let row = Self::scoped_query(scope)
            .filter(event::Column::Id.eq(id))
            .into_model::<EventRow>()
            .one(&self.db)
            .await?;

        Ok(row.map(EventDetail::from))
    }

    async fn find_by_contract(&self, contract_id: Uuid) -> AppResult<Option<Event>> {
        let model = event::Entity::find()
            .filter(event::Column::ContractId.eq(contract_id))
            .one(&self.db)
            .await?;

        Ok(model.map(Event::from))
    }

    async fn insert(&self, data: NewEvent) -> AppResult<EventDetail> {
        let now = Utc::now();
        let model = event::ActiveModel {
            id: Set(Uuid::new_v4()),
            contract_id: Set(data.contract),
            client_id: Set(data.client),
            support_contact_id: Set(data.support_contact),
            event_name: Set(data.event_name),
            event_start: Set(data.event_start),
            event_end: Set(data.event_end),
            location: Set(data.location),
            attendees: Set(data.attendees),
            notes: Set(data.notes),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let inserted = model.insert(&self.db).await?;
        self.fetch_detail(inserted.id).await
    }

    async fn update(&self, id: Uuid, changes: EventChanges) -> AppResult<EventDetail> {
        let model = event::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(crate::errors::AppError::NotFound)?;

        let mut active: event::ActiveModel = model.into();
        if let Some(support_contact) = changes.support_contact {
            active.support_contact_id = Set(Some(support_contact));
        }
        if let Some(event_name) = changes.event_name {
            active.event_name = Set(event_name);
        }
        if let Some(event_start) = changes.event_start {
            active.event_start = Set(event_start);
        }
        if let Some(event_end) = changes.event_end {
            active.event_end = Set(event_end);
        }
        if let Some(location) = changes.location {
            active.location = Set(location);
        }
        if let Some(attendees) = changes.attendees {
            active.attendees = Set(attendees);
        }
        if let Some(notes) = changes.notes {
            active.notes = Set(Some(notes));
        }
        active.updated_at = Set(Utc::now());

        let updated = active.update(&self.db).await?;
        self.fetch_detail(updated.id).await
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = event::Entity::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(crate::errors::AppError::NotFound);
        }
        Ok(())
    }
}
