//! Unit of Work - centralized repository access for dependency injection.

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use super::repositories::{
    ClientRepository, ClientStore, ContractRepository, ContractStore, EventRepository, EventStore,
    UserRepository, UserStore,
};

/// Hands out repository handles. Services depend on this trait rather
/// than on concrete stores, so tests can substitute fakes.
pub trait UnitOfWork: Send + Sync {
    fn users(&self) -> Arc<dyn UserRepository>;
    fn clients(&self) -> Arc<dyn ClientRepository>;
    fn contracts(&self) -> Arc<dyn ContractRepository>;
    fn events(&self) -> Arc<dyn EventRepository>;
}

/// Production implementation backed by SeaORM stores sharing one
/// connection pool.
pub struct Persistence {
    users: Arc<UserStore>,
    clients: Arc<ClientStore>,
    contracts: Arc<ContractStore>,
    events: Arc<EventStore>,
}

impl Persistence {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            users: Arc::new(UserStore::new(db.clone())),
            clients: Arc::new(ClientStore::new(db.clone())),
            contracts: Arc::new(ContractStore::new(db.clone())),
            events: Arc::new(EventStore::new(db)),
        }
    }
}

impl UnitOfWork for Persistence {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.users.clone()
    }

    fn clients(&self) -> Arc<dyn ClientRepository> {
        self.clients.clone()
    }

    fn contracts(&self) -> Arc<dyn ContractRepository> {
        self.contracts.clone()
    }

    fn events(&self) -> Arc<dyn EventRepository> {
        self.events.clone()
    }
}
