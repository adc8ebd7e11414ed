//! Client persistence.
//!
//! Every read goes through a [`RowFilter`] so that role scoping is applied
//! in SQL, before any row leaves the database.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult, JoinType,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set,
};
use uuid::Uuid;

use super::entities::{client, user};
use crate::domain::{Client, ClientChanges, ClientDetail, NewClient, RowFilter};
use crate::errors::AppResult;
use crate::types::PaginationParams;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClientRepository: Send + Sync {
    /// List clients visible under `scope`, newest first.
    async fn list(
        &self,
        scope: &RowFilter,
        pagination: &PaginationParams,
    ) -> AppResult<(Vec<ClientDetail>, u64)>;

    /// Fetch one client if it exists and falls inside `scope`.
    async fn find_by_id(&self, scope: &RowFilter, id: Uuid) -> AppResult<Option<ClientDetail>>;

    async fn find_by_email(&self, email: &str) -> AppResult<Option<Client>>;

    async fn insert(&self, data: NewClient) -> AppResult<ClientDetail>;

    async fn update(&self, id: Uuid, changes: ClientChanges) -> AppResult<ClientDetail>;

    async fn delete(&self, id: Uuid) -> AppResult<()>;
}

/// SeaORM-backed implementation.
pub struct ClientStore {
    db: DatabaseConnection,
}

impl ClientStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn scoped_query(scope: &RowFilter) -> sea_orm::Select<client::Entity> {
        let query = client::Entity::find()
            .column_as(user::Column::Username, "sales_contact_username")
            .join(JoinType::LeftJoin, client::Relation::SalesContact.def());

        match scope {
            RowFilter::All => query,
            RowFilter::SalesOwned(user_id) => {
                query.filter(client::Column::SalesContactId.eq(*user_id))
            }
            RowFilter::IdIs(id) => query.filter(client::Column::Id.eq(*id)),
            // No support assignment on clients; deny rather than leak.
            RowFilter::SupportAssigned(_) | RowFilter::Nothing => {
                query.filter(client::Column::Id.is_null())
            }
        }
    }

    async fn fetch_detail(&self, id: Uuid) -> AppResult<ClientDetail> {
        self.find_by_id(&RowFilter::All, id)
            .await?
            .ok_or_else(|| crate::errors::AppError::internal("client row vanished after write"))
    }
}

#[derive(Debug, FromQueryResult)]
struct ClientRow {
    id: Uuid,
    full_name: String,
    email: String,
    phone: String,
    company_name: String,
    last_contact_date: chrono::NaiveDate,
    sales_contact_id: Option<Uuid>,
    created_at: chrono::DateTime<Utc>,
    updated_at: chrono::DateTime<Utc>,
    sales_contact_username: Option<String>,
}

impl From<ClientRow> for ClientDetail {
    fn from(row: ClientRow) -> Self {
        Self {
            client: Client {
                id: row.id,
                full_name: row.full_name,
                email: row.email,
                phone: row.phone,
                company_name: row.company_name,
                last_contact_date: row.last_contact_date,
                sales_contact: row.sales_contact_id,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
            sales_contact_username: row.sales_contact_username,
        }
    }
}

#[async_trait]
impl ClientRepository for ClientStore {
    async fn list(
        &self,
        scope: &RowFilter,
        pagination: &PaginationParams,
    ) -> AppResult<(Vec<ClientDetail>, u64)> {
        let paginator = Self::scoped_query(scope)
            .order_by_desc(client::Column::CreatedAt)
            .into_model::<ClientRow>()
            .paginate(&self.db, pagination.limit());

        let total = paginator.num_items().await?;
        let rows = paginator.fetch_page(pagination.page_index()).await?;

        Ok((rows.into_iter().map(ClientDetail::from).collect(), total))
    }

    async fn find_by_id(&self, scope: &RowFilter, id: Uuid) -> AppResult<Option<ClientDetail>> {
        let row = Self::scoped_query(scope)
            .filter(client::Column::Id.eq(id))
            .into_model::<ClientRow>()
            .one(&self.db)
            .await?;

        Ok(row.map(ClientDetail::from))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<Client>> {
        let model = client::Entity::find()
            .filter(client::Column::Email.eq(email))
            .one(&self.db)
            .await?;

        Ok(model.map(Client::from))
    }

    async fn insert(&self, data: NewClient) -> AppResult<ClientDetail> {
        let now = Utc::now();
        let model = client::ActiveModel {
            id: Set(Uuid::new_v4()),
            full_name: Set(data.full_name),
            email: Set(data.email),
            phone: Set(data.phone),
            company_name: Set(data.company_name),
            last_contact_date: Set(data.last_contact_date),
            sales_contact_id: Set(data.sales_contact),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let inserted = model.insert(&self.db).await?;
        self.fetch_detail(inserted.id).await
    }

    async fn update(&self, id: Uuid, changes: ClientChanges) -> AppResult<ClientDetail> {
        let model = client::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(crate::errors::AppError::NotFound)?;

        let mut active: client::ActiveModel = model.into();
        if let Some(full_name) = changes.full_name {
            active.full_name = Set(full_name);
        }
        if let Some(email) = changes.email {
            active.email = Set(email);
        }
        if let Some(phone) = changes.phone {
            active.phone = Set(phone);
        }
        if let Some(company_name) = changes.company_name {
            active.company_name = Set(company_name);
        }
        if let Some(last_contact_date) = changes.last_contact_date {
            active.last_contact_date = Set(last_contact_date);
        }
        if let Some(sales_contact) = changes.sales_contact {
            active.sales_contact_id = Set(Some(sales_contact));
        }
        active.updated_at = Set(Utc::now());

        let updated = active.update(&self.db).await?;
        self.fetch_detail(updated.id).await
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = client::Entity::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(crate::errors::AppError::NotFound);
        }
        Ok(())
    }
}
