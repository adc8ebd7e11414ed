//! Contract service - financial agreements, MANAGEMENT-administered.
//!
//! SALES and SUPPORT only read contracts (scoped by the policy);
//! creation and every mutation is a management operation.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{
    contract::validate_amounts, Actor, ContractChanges, ContractDetail, ContractFilters,
    NewContract, Resource, Role, RowAction, RowFacts, RowFilter,
};
use crate::errors::{AppError, AppResult};
use crate::infra::UnitOfWork;
use crate::types::PaginationParams;

/// Contract service trait for dependency injection.
#[async_trait]
pub trait ContractService: Send + Sync {
    async fn list_contracts(
        &self,
        actor: Actor,
        filters: &ContractFilters,
        pagination: &PaginationParams,
    ) -> AppResult<(Vec<ContractDetail>, u64)>;

    async fn get_contract(&self, actor: Actor, id: Uuid) -> AppResult<ContractDetail>;

    /// Create a contract. MANAGEMENT only.
    async fn create_contract(&self, actor: Actor, data: NewContract) -> AppResult<ContractDetail>;

    /// Update a contract. MANAGEMENT only; the amount invariant is
    /// checked on the resulting state.
    async fn update_contract(
        &self,
        actor: Actor,
        id: Uuid,
        changes: ContractChanges,
    ) -> AppResult<ContractDetail>;

    /// Delete a contract. MANAGEMENT only.
    async fn delete_contract(&self, actor: Actor, id: Uuid) -> AppResult<()>;
}

/// Concrete implementation of ContractService using Unit of Work.
pub struct ContractManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> ContractManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }

    async fn check_client_exists(&self, id: Uuid) -> AppResult<()> {
        self.uow
            .clients()
            .find_by_id(&RowFilter::All, id)
            .await?
            .map(|_| ())
            .ok_or_else(|| AppError::field("client", "client does not exist"))
    }

    async fn check_sales_contact(&self, id: Uuid) -> AppResult<()> {
        let user = self
            .uow
            .users()
            .find_by_id(&RowFilter::All, id)
            .await?
            .ok_or_else(|| AppError::field("sales_contact", "sales_contact does not exist"))?;

        if user.role != Role::Sales {
            return Err(AppError::field(
                "sales_contact",
                "sales_contact must reference a SALES user",
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl<U: UnitOfWork> ContractService for ContractManager<U> {
    async fn list_contracts(
        &self,
        actor: Actor,
        filters: &ContractFilters,
        pagination: &PaginationParams,
    ) -> AppResult<(Vec<ContractDetail>, u64)> {
        let scope = actor.read_scope(Resource::Contracts);
        self.uow.contracts().list(&scope, filters, pagination).await
    }

    async fn get_contract(&self, actor: Actor, id: Uuid) -> AppResult<ContractDetail> {
        let scope = actor.read_scope(Resource::Contracts);
        self.uow
            .contracts()
            .find_by_id(&scope, id)
            .await?
            .ok_or(AppError::NotFound)
    }

    async fn create_contract(&self, actor: Actor, data: NewContract) -> AppResult<ContractDetail> {
        if !actor.can_create(Resource::Contracts) {
            return Err(AppError::forbidden("only management may create contracts"));
        }

        self.check_client_exists(data.client).await?;
        if let Some(sales_contact) = data.sales_contact {
            self.check_sales_contact(sales_contact).await?;
        }
        validate_amounts(data.total_amount, data.amount_due)?;

        self.uow.contracts().insert(data).await
    }

    async fn update_contract(
        &self,
        actor: Actor,
        id: Uuid,
        changes: ContractChanges,
    ) -> AppResult<ContractDetail> {
        let read_scope = actor.read_scope(Resource::Contracts);
        let detail = self
            .uow
            .contracts()
            .find_by_id(&read_scope, id)
            .await?
            .ok_or(AppError::NotFound)?;

        let facts = RowFacts {
            id: Some(detail.contract.id),
            sales_owner: detail.client_sales_contact,
            ..Default::default()
        };
        if !actor
            .scope(Resource::Contracts, RowAction::Update)
            .allows(&facts)
        {
            return Err(AppError::forbidden("only management may modify contracts"));
        }

        if let Some(client) = changes.client {
            if client != detail.contract.client {
                self.check_client_exists(client).await?;
                // The event's client mirrors the contract's and is
                // immutable, so the link freezes once an event exists.
                if self.uow.events().find_by_contract(id).await?.is_some() {
                    return Err(AppError::field(
                        "client",
                        "client cannot be changed once the contract has an event",
                    ));
                }
            }
        }
        if let Some(sales_contact) = changes.sales_contact {
            self.check_sales_contact(sales_contact).await?;
        }

        // The invariant holds on the state the row will end up in.
        let total = changes.total_amount.unwrap_or(detail.contract.total_amount);
        let due = changes.amount_due.unwrap_or(detail.contract.amount_due);
        validate_amounts(total, due)?;

        self.uow.contracts().update(id, changes).await
    }

    async fn delete_contract(&self, actor: Actor, id: Uuid) -> AppResult<()> {
        let read_scope = actor.read_scope(Resource::Contracts);
        let detail = self
            .uow
            .contracts()
            .find_by_id(&read_scope, id)
            .await?
            .ok_or(AppError::NotFound)?;

        let facts = RowFacts {
            id: Some(detail.contract.id),
            sales_owner: detail.client_sales_contact,
            ..Default::default()
        };
        if !actor
            .scope(Resource::Contracts, RowAction::Delete)
            .allows(&facts)
        {
            return Err(AppError::forbidden("only management may delete contracts"));
        }

        self.uow.contracts().delete(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal::Decimal;

    use crate::domain::Contract;
    use crate::infra::repositories::MockContractRepository;
    use crate::services::test_support::TestUow;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn stored_contract(owner: Option<Uuid>) -> ContractDetail {
        let now = Utc::now();
        ContractDetail {
            contract: Contract {
                id: Uuid::new_v4(),
                client: Uuid::new_v4(),
                sales_contact: owner,
                total_amount: dec("1000.00"),
                amount_due: dec("250.00"),
                is_signed: true,
                created_at: now,
                updated_at: now,
            },
            client_full_name: "Jean Martin".to_string(),
            sales_contact_username: owner.map(|_| "some.rep".to_string()),
            client_sales_contact: owner,
        }
    }

    #[tokio::test]
    async fn sales_cannot_create_contracts() {
        let rep = Actor::new(Uuid::new_v4(), Role::Sales);
        let service = ContractManager::new(Arc::new(TestUow::new()));

        let result = service
            .create_contract(
                rep,
                NewContract {
                    client: Uuid::new_v4(),
                    sales_contact: None,
                    total_amount: dec("100"),
                    amount_due: dec("0"),
                    is_signed: false,
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn update_rejects_amount_due_above_resulting_total() {
        let boss = Actor::new(Uuid::new_v4(), Role::Management);

        let mut contracts = MockContractRepository::new();
        contracts
            .expect_find_by_id()
            .returning(|_, _| Ok(Some(stored_contract(None))));

        let mut uow = TestUow::new();
        uow.contracts = Arc::new(contracts);
        let service = ContractManager::new(Arc::new(uow));

        // Stored total is 1000.00; raising amount_due past it must fail
        // even though the request touches only one field.
        let result = service
            .update_contract(
                boss,
                Uuid::new_v4(),
                ContractChanges {
                    amount_due: Some(dec("1200.00")),
                    ..Default::default()
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn sales_updates_are_forbidden_even_on_own_contracts() {
        let rep = Actor::new(Uuid::new_v4(), Role::Sales);

        let mut contracts = MockContractRepository::new();
        let owner = rep.id;
        contracts
            .expect_find_by_id()
            .returning(move |_, _| Ok(Some(stored_contract(Some(owner)))));

        let mut uow = TestUow::new();
        uow.contracts = Arc::new(contracts);
        let service = ContractManager::new(Arc::new(uow));

        let result = service
            .update_contract(
                rep,
                Uuid::new_v4(),
                ContractChanges {
                    is_signed: Some(true),
                    ..Default::default()
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn out_of_scope_contract_reads_as_not_found() {
        let rep = Actor::new(Uuid::new_v4(), Role::Sales);

        let mut contracts = MockContractRepository::new();
        // Scoped query returns nothing for contracts of other reps' clients.
        contracts.expect_find_by_id().returning(|_, _| Ok(None));

        let mut uow = TestUow::new();
        uow.contracts = Arc::new(contracts);
        let service = ContractManager::new(Arc::new(uow));

        let result = service.get_contract(rep, Uuid::new_v4()).await;
        assert!(matches!(result, Err(AppError::NotFound)));
    }
}
