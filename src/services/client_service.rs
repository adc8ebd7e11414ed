//! Client service - prospect and customer management.
//!
//! SALES create clients they automatically own; ownership then gates
//! every later mutation. SUPPORT is read-only here.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{
    Actor, ClientChanges, ClientDetail, NewClient, Resource, Role, RowAction, RowFacts,
};
use crate::errors::{AppError, AppResult};
use crate::infra::UnitOfWork;
use crate::types::PaginationParams;

/// Client service trait for dependency injection.
#[async_trait]
pub trait ClientService: Send + Sync {
    async fn list_clients(
        &self,
        actor: Actor,
        pagination: &PaginationParams,
    ) -> AppResult<(Vec<ClientDetail>, u64)>;

    async fn get_client(&self, actor: Actor, id: Uuid) -> AppResult<ClientDetail>;

    /// Create a client. A SALES actor always becomes the sales contact,
    /// whatever the payload says.
    async fn create_client(&self, actor: Actor, data: NewClient) -> AppResult<ClientDetail>;

    async fn update_client(
        &self,
        actor: Actor,
        id: Uuid,
        changes: ClientChanges,
    ) -> AppResult<ClientDetail>;

    /// Delete a client. MANAGEMENT only.
    async fn delete_client(&self, actor: Actor, id: Uuid) -> AppResult<()>;
}

/// Concrete implementation of ClientService using Unit of Work.
pub struct ClientManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> ClientManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }

    /// A client's sales contact must point at an existing SALES user.
    async fn check_sales_contact(&self, id: Uuid) -> AppResult<()> {
        let user = self
            .uow
            .users()
            .find_by_id(&crate::domain::RowFilter::All, id)
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
impl<U: UnitOfWork> ClientService for ClientManager<U> {
    async fn list_clients(
        &self,
        actor: Actor,
        pagination: &PaginationParams,
    ) -> AppResult<(Vec<ClientDetail>, u64)> {
        let scope = actor.read_scope(Resource::Clients);
        self.uow.clients().list(&scope, pagination).await
    }

    async fn get_client(&self, actor: Actor, id: Uuid) -> AppResult<ClientDetail> {
        let scope = actor.read_scope(Resource::Clients);
        self.uow
            .clients()
            .find_by_id(&scope, id)
            .await?
            .ok_or(AppError::NotFound)
    }

    async fn create_client(&self, actor: Actor, mut data: NewClient) -> AppResult<ClientDetail> {
        if !actor.can_create(Resource::Clients) {
            return Err(AppError::forbidden(
                "only management and sales may create clients",
            ));
        }

        // SALES own what they create; only MANAGEMENT picks the contact.
        match actor.role {
            Role::Sales => data.sales_contact = Some(actor.id),
            Role::Management => {
                if let Some(sales_contact) = data.sales_contact {
                    self.check_sales_contact(sales_contact).await?;
                }
            }
            // Already refused by can_create above; kept as an error so
            // the function stays panic-free if that check ever moves.
            Role::Support => {
                return Err(AppError::forbidden(
                    "only management and sales may create clients",
                ))
            }
        }

        if self.uow.clients().find_by_email(&data.email).await?.is_some() {
            return Err(AppError::conflict("client"));
        }

        self.uow.clients().insert(data).await
    }

    async fn update_client(
        &self,
        actor: Actor,
        id: Uuid,
        changes: ClientChanges,
    ) -> AppResult<ClientDetail> {
        let read_scope = actor.read_scope(Resource::Clients);
        let detail = self
            .uow
            .clients()
            .find_by_id(&read_scope, id)
            .await?
            .ok_or(AppError::NotFound)?;

        let facts = RowFacts {
            id: Some(detail.client.id),
            sales_owner: detail.client.sales_contact,
            ..Default::default()
        };
        if !actor
            .scope(Resource::Clients, RowAction::Update)
            .allows(&facts)
        {
            return Err(AppError::forbidden("you may only modify your own clients"));
        }

        if let Some(sales_contact) = changes.sales_contact {
            if !actor.role.is_management() {
                return Err(AppError::forbidden(
                    "only management may reassign the sales contact",
                ));
            }
            self.check_sales_contact(sales_contact).await?;
        }

        if let Some(email) = &changes.email {
            if email != &detail.client.email {
                if let Some(existing) = self.uow.clients().find_by_email(email).await? {
                    if existing.id != id {
                        return Err(AppError::conflict("client"));
                    }
                }
            }
        }

        self.uow.clients().update(id, changes).await
    }

    async fn delete_client(&self, actor: Actor, id: Uuid) -> AppResult<()> {
        let read_scope = actor.read_scope(Resource::Clients);
        let detail = self
            .uow
            .clients()
            .find_by_id(&read_scope, id)
            .await?
            .ok_or(AppError::NotFound)?;

        let facts = RowFacts {
            id: Some(detail.client.id),
            sales_owner: detail.client.sales_contact,
            ..Default::default()
        };
        if !actor
            .scope(Resource::Clients, RowAction::Delete)
            .allows(&facts)
        {
            return Err(AppError::forbidden("only management may delete clients"));
        }

        self.uow.clients().delete(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    use crate::domain::Client;
    use crate::infra::repositories::MockClientRepository;
    use crate::services::test_support::TestUow;

    fn sample_new_client() -> NewClient {
        NewClient {
            full_name: "Jean Martin".to_string(),
            email: "jean.martin@alpha.example".to_string(),
            phone: "+33100000000".to_string(),
            company_name: "Société Alpha".to_string(),
            last_contact_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            sales_contact: None,
        }
    }

    fn stored_client(owner: Option<Uuid>) -> ClientDetail {
        let now = Utc::now();
        ClientDetail {
            client: Client {
                id: Uuid::new_v4(),
                full_name: "Jean Martin".to_string(),
                email: "jean.martin@alpha.example".to_string(),
                phone: "+33100000000".to_string(),
                company_name: "Société Alpha".to_string(),
                last_contact_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
                sales_contact: owner,
                created_at: now,
                updated_at: now,
            },
            sales_contact_username: owner.map(|_| "some.rep".to_string()),
        }
    }

    #[tokio::test]
    async fn sales_creator_becomes_the_sales_contact() {
        let rep = Actor::new(Uuid::new_v4(), Role::Sales);

        let mut clients = MockClientRepository::new();
        clients.expect_find_by_email().returning(|_| Ok(None));
        let rep_id = rep.id;
        clients
            .expect_insert()
            .withf(move |data: &NewClient| data.sales_contact == Some(rep_id))
            .returning(move |data| {
                let mut detail = stored_client(data.sales_contact);
                detail.client.email = data.email;
                Ok(detail)
            });

        let mut uow = TestUow::new();
        uow.clients = Arc::new(clients);
        let service = ClientManager::new(Arc::new(uow));

        // Payload claims a different sales contact; it must be ignored.
        let mut data = sample_new_client();
        data.sales_contact = Some(Uuid::new_v4());

        let created = service.create_client(rep, data).await.unwrap();
        assert_eq!(created.client.sales_contact, Some(rep.id));
    }

    #[tokio::test]
    async fn support_create_is_refused_with_an_error() {
        let staff = Actor::new(Uuid::new_v4(), Role::Support);
        let service = ClientManager::new(Arc::new(TestUow::new()));

        let result = service.create_client(staff, sample_new_client()).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn duplicate_client_email_is_a_conflict() {
        let rep = Actor::new(Uuid::new_v4(), Role::Sales);

        let mut clients = MockClientRepository::new();
        clients
            .expect_find_by_email()
            .returning(|_| Ok(Some(stored_client(None).client)));

        let mut uow = TestUow::new();
        uow.clients = Arc::new(clients);
        let service = ClientManager::new(Arc::new(uow));

        let result = service.create_client(rep, sample_new_client()).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn sales_cannot_update_someone_elses_client() {
        let rep = Actor::new(Uuid::new_v4(), Role::Sales);
        let other_rep = Uuid::new_v4();

        let mut clients = MockClientRepository::new();
        clients
            .expect_find_by_id()
            .returning(move |_, _| Ok(Some(stored_client(Some(other_rep)))));

        let mut uow = TestUow::new();
        uow.clients = Arc::new(clients);
        let service = ClientManager::new(Arc::new(uow));

        let result = service
            .update_client(
                rep,
                Uuid::new_v4(),
                ClientChanges {
                    phone: Some("+33700000000".to_string()),
                    ..Default::default()
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn sales_cannot_reassign_the_sales_contact() {
        let rep = Actor::new(Uuid::new_v4(), Role::Sales);

        let mut clients = MockClientRepository::new();
        let owner = rep.id;
        clients
            .expect_find_by_id()
            .returning(move |_, _| Ok(Some(stored_client(Some(owner)))));

        let mut uow = TestUow::new();
        uow.clients = Arc::new(clients);
        let service = ClientManager::new(Arc::new(uow));

        let result = service
            .update_client(
                rep,
                Uuid::new_v4(),
                ClientChanges {
                    sales_contact: Some(Uuid::new_v4()),
                    ..Default::default()
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn support_cannot_delete_clients() {
        let staff = Actor::new(Uuid::new_v4(), Role::Support);

        let mut clients = MockClientRepository::new();
        clients
            .expect_find_by_id()
            .returning(|_, _| Ok(Some(stored_client(None))));

        let mut uow = TestUow::new();
        uow.clients = Arc::new(clients);
        let service = ClientManager::new(Arc::new(uow));

        let result = service.delete_client(staff, Uuid::new_v4()).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }
}
