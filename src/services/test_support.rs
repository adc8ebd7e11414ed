//! Shared helpers for service unit tests.

use std::sync::Arc;

use crate::infra::repositories::{
    ClientRepository, ContractRepository, EventRepository, MockClientRepository,
    MockContractRepository, MockEventRepository, MockUserRepository, UserRepository,
};
use crate::infra::UnitOfWork;

/// Unit of work backed by mockall repositories. Replace the fields you
/// need before wrapping in an `Arc`.
pub(crate) struct TestUow {
    pub users: Arc<MockUserRepository>,
    pub clients: Arc<MockClientRepository>,
    pub contracts: Arc<MockContractRepository>,
    pub events: Arc<MockEventRepository>,
}

impl TestUow {
    pub fn new() -> Self {
        Self {
            users: Arc::new(MockUserRepository::new()),
            clients: Arc::new(MockClientRepository::new()),
            contracts: Arc::new(MockContractRepository::new()),
            events: Arc::new(MockEventRepository::new()),
        }
    }
}

impl UnitOfWork for TestUow {
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
