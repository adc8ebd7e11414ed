//! Service container - centralized service access for the API layer.

use std::sync::Arc;

use super::{AuthService, ClientService, ContractService, EventService, UserService};
use crate::config::Config;
use crate::infra::Persistence;

/// Service container trait for dependency injection.
pub trait ServiceContainer: Send + Sync {
    fn auth(&self) -> Arc<dyn AuthService>;
    fn users(&self) -> Arc<dyn UserService>;
    fn clients(&self) -> Arc<dyn ClientService>;
    fn contracts(&self) -> Arc<dyn ContractService>;
    fn events(&self) -> Arc<dyn EventService>;
}

/// Concrete implementation of ServiceContainer
pub struct Services {
    auth_service: Arc<dyn AuthService>,
    user_service: Arc<dyn UserService>,
    client_service: Arc<dyn ClientService>,
    contract_service: Arc<dyn ContractService>,
    event_service: Arc<dyn EventService>,
}

impl Services {
    pub fn new(
        auth_service: Arc<dyn AuthService>,
        user_service: Arc<dyn UserService>,
        client_service: Arc<dyn ClientService>,
        contract_service: Arc<dyn ContractService>,
        event_service: Arc<dyn EventService>,
    ) -> Self {
        Self {
            auth_service,
            user_service,
            client_service,
            contract_service,
            event_service,
        }
    }

    /// Wire every service onto one shared unit of work.
    pub fn from_connection(db: sea_orm::DatabaseConnection, config: Config) -> Self {
        use super::{Authenticator, ClientManager, ContractManager, EventManager, UserManager};

        let uow = Arc::new(Persistence::new(db));

        Self {
            auth_service: Arc::new(Authenticator::new(uow.clone(), config)),
            user_service: Arc::new(UserManager::new(uow.clone())),
            client_service: Arc::new(ClientManager::new(uow.clone())),
            contract_service: Arc::new(ContractManager::new(uow.clone())),
            event_service: Arc::new(EventManager::new(uow)),
        }
    }
}

impl ServiceContainer for Services {
    fn auth(&self) -> Arc<dyn AuthService> {
        self.auth_service.clone()
    }

    fn users(&self) -> Arc<dyn UserService> {
        self.user_service.clone()
    }

    fn clients(&self) -> Arc<dyn ClientService> {
        self.client_service.clone()
    }

    fn contracts(&self) -> Arc<dyn ContractService> {
        self.contract_service.clone()
    }

    fn events(&self) -> Arc<dyn EventService> {
        self.event_service.clone()
    }
}
