//! Contract persistence.
//!
//! SALES visibility follows the owning client: a contract is in a sales
//! rep's scope when the related client's `sales_contact_id` matches, so
//! the scope filter is applied on the joined `clients` table.

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult, JoinType,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set,
};
use uuid::Uuid;

use super::entities::{client, contract, user};
use crate::domain::{Contract, ContractChanges, ContractDetail, ContractFilters, NewContract, RowFilter};
use crate::errors::AppResult;
use crate::types::PaginationParams;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContractRepository: Send + Sync {
    /// List contracts visible under `scope`, newest first, after applying
    /// the query-string filters.
    async fn list(
        &self,
        scope: &RowFilter,
        filters: &ContractFilters,
        pagination: &PaginationParams,
    ) -> AppResult<(Vec<ContractDetail>, u64)>;

    /// Fetch one contract if it exists and falls inside `scope`.
    async fn find_by_id(&self, scope: &RowFilter, id: Uuid) -> AppResult<Option<ContractDetail>>;

    async fn insert(&self, data: NewContract) -> AppResult<ContractDetail>;

    async fn update(&self, id: Uuid, changes: ContractChanges) -> AppResult<ContractDetail>;

    async fn delete(&self, id: Uuid) -> AppResult<()>;
}

/// SeaORM-backed implementation.
pub struct ContractStore {
    db: DatabaseConnection,
}

impl ContractStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn scoped_query(scope: &RowFilter) -> sea_orm::Select<contract::Entity> {
        let query = contract::Entity::find()
            .column_as(client::Column::FullName, "client_full_name")
            .column_as(client::Column::SalesContactId, "client_sales_contact")
            .column_as(user::Column::Username, "sales_contact_username")
            .join(JoinType::InnerJoin, contract::Relation::Client.def())
            .join(JoinType::LeftJoin, contract::Relation::SalesContact.def());

        match scope {
            RowFilter::All => query,
            RowFilter::SalesOwned(user_id) => {
                query.filter(client::Column::SalesContactId.eq(*user_id))
            }
            RowFilter::IdIs(id) => query.filter(contract::Column::Id.eq(*id)),
            RowFilter::SupportAssigned(_) | RowFilter::Nothing => {
                query.filter(contract::Column::Id.is_null())
            }
        }
    }

    fn filtered_query(
        scope: &RowFilter,
        filters: &ContractFilters,
    ) -> sea_orm::Select<contract::Entity> {
        let mut query = Self::scoped_query(scope);

        if let Some(is_signed) = filters.is_signed {
            query = query.filter(contract::Column::IsSigned.eq(is_signed));
        }
        if let Some(client_id) = filters.client {
            query = query.filter(contract::Column::ClientId.eq(client_id));
        }
        if let Some(sales_contact) = filters.sales_contact {
            query = query.filter(contract::Column::SalesContactId.eq(sales_contact));
        }
        if let Some(v) = filters.amount_due {
            query = query.filter(contract::Column::AmountDue.eq(v));
        }
        if let Some(v) = filters.amount_due_gt {
            query = query.filter(contract::Column::AmountDue.gt(v));
        }
        if let Some(v) = filters.amount_due_gte {
            query = query.filter(contract::Column::AmountDue.gte(v));
        }
        if let Some(v) = filters.amount_due_lt {
            query = query.filter(contract::Column::AmountDue.lt(v));
        }
        if let Some(v) = filters.amount_due_lte {
            query = query.filter(contract::Column::AmountDue.lte(v));
        }
        if let Some(v) = filters.total_amount {
            query = query.filter(contract::Column::TotalAmount.eq(v));
        }
        if let Some(v) = filters.total_amount_gt {
            query = query.filter(contract::Column::TotalAmount.gt(v));
        }
        if let Some(v) = filters.total_amount_gte {
            query = query.filter(contract::Column::TotalAmount.gte(v));
        }
        if let Some(v) = filters.total_amount_lt {
            query = query.filter(contract::Column::TotalAmount.lt(v));
        }
        if let Some(v) = filters.total_amount_lte {
            query = query.filter(contract::Column::TotalAmount.lte(v));
        }
        if let Some(v) = filters.created_at {
            query = query.filter(contract::Column::CreatedAt.eq(v));
        }
        if let Some(v) = filters.created_at_gte {
            query = query.filter(contract::Column::CreatedAt.gte(v));
        }
        if let Some(v) = filters.created_at_lte {
            query = query.filter(contract::Column::CreatedAt.lte(v));
        }

        query
    }

    async fn fetch_detail(&self, id: Uuid) -> AppResult<ContractDetail> {
        self.find_by_id(&RowFilter::All, id)
            .await?
            .ok_or_else(|| crate::errors::AppError::internal("contract row vanished after write"))
    }
}

#[derive(Debug, FromQueryResult)]
struct ContractRow {
    id: Uuid,
    client_id: Uuid,
    sales_contact_id: Option<Uuid>,
    total_amount: Decimal,
    amount_due: Decimal,
    is_signed: bool,
    created_at: chrono::DateTime<Utc>,
    updated_at: chrono::DateTime<Utc>,
    client_full_name: String,
    client_sales_contact: Option<Uuid>,
    sales_contact_username: Option<String>,
}

impl From<ContractRow> for ContractDetail {
    fn from(row: ContractRow) -> Self {
        Self {
            contract: Contract {
                id: row.id,
                client: row.client_id,
                sales_contact: row.sales_contact_id,
                total_amount: row.total_amount,
                amount_due: row.amount_due,
                is_signed: row.is_signed,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
            client_full_name: row.client_full_name,
            sales_contact_username: row.sales_contact_username,
            client_sales_contact: row.client_sales_contact,
        }
    }
}

#[async_trait]
impl ContractRepository for ContractStore {
    async fn list(
        &self,
        scope: &RowFilter,
        filters: &ContractFilters,
        pagination: &PaginationParams,
    ) -> AppResult<(Vec<ContractDetail>, u64)> {
        let paginator = Self::filtered_query(scope, filters)
            .order_by_desc(contract::Column::CreatedAt)
            .into_model::<ContractRow>()
            .paginate(&self.db, pagination.limit());

        let total = paginator.num_items().await?;
        let rows = paginator.fetch_page(pagination.page_index()).await?;

        Ok((rows.into_iter().map(ContractDetail::from).collect(), total))
    }

    async fn find_by_id(&self, scope: &RowFilter, id: Uuid) -> AppResult<Option<ContractDetail>> {
        let row = Self::scoped_query(scope)
            .filter(contract::Column::Id.eq(id))
            .into_model::<ContractRow>()
            .one(&self.db)
            .await?;

        Ok(row.map(ContractDetail::from))
    }

    async fn insert(&self, data: NewContract) -> AppResult<ContractDetail> {
        let now = Utc::now();
        let model = contract::ActiveModel {
            id: Set(Uuid::new_v4()),
            client_id: Set(data.client),
            sales_contact_id: Set(data.sales_contact),
            total_amount: Set(data.total_amount),
            amount_due: Set(data.amount_due),
            is_signed: Set(data.is_signed),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let inserted = model.insert(&self.db).await?;
        self.fetch_detail(inserted.id).await
    }

    async fn update(&self, id: Uuid, changes: ContractChanges) -> AppResult<ContractDetail> {
        let model = contract::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(crate::errors::AppError::NotFound)?;

        let mut active: contract::ActiveModel = model.into();
        if let Some(client_id) = changes.client {
            active.client_id = Set(client_id);
        }
        if let Some(sales_contact) = changes.sales_contact {
            active.sales_contact_id = Set(Some(sales_contact));
        }
        if let Some(total_amount) = changes.total_amount {
            active.total_amount = Set(total_amount);
        }
        if let Some(amount_due) = changes.amount_due {
            active.amount_due = Set(amount_due);
        }
        if let Some(is_signed) = changes.is_signed {
            active.is_signed = Set(is_signed);
        }
        active.updated_at = Set(Utc::now());

        let updated = active.update(&self.db).await?;
        self.fetch_detail(updated.id).await
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = contract::Entity::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(crate::errors::AppError::NotFound);
        }
        Ok(())
    }
}
