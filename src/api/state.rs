//! Application state - dependency injection container.

use std::sync::Arc;

use crate::infra::Database;
use crate::services::{
    AuthService, ClientService, ContractService, EventService, ServiceContainer, Services,
    UserService,
};

/// Application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<dyn AuthService>,
    pub user_service: Arc<dyn UserService>,
    pub client_service: Arc<dyn ClientService>,
    pub contract_service: Arc<dyn ContractService>,
    pub event_service: Arc<dyn EventService>,
    pub database: Arc<Database>,
}

impl AppState {
    /// Build the state with production services wired onto the database.
    pub fn from_config(database: Arc<Database>, config: crate::config::Config) -> Self {
        let container = Services::from_connection(database.get_connection(), config);

        Self {
            auth_service: container.auth(),
            user_service: container.users(),
            client_service: container.clients(),
            contract_service: container.contracts(),
            event_service: container.events(),
            database,
        }
    }

    /// Build the state from individually injected services (tests).
    pub fn new(
        auth_service: Arc<dyn AuthService>,
        user_service: Arc<dyn UserService>,
        client_service: Arc<dyn ClientService>,
        contract_service: Arc<dyn ContractService>,
        event_service: Arc<dyn EventService>,
        database: Arc<Database>,
    ) -> Self {
        Self {
            auth_service,
            user_service,
            client_service,
            contract_service,
            event_service,
            database,
        }
    }
}
