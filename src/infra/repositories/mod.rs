//! Repository layer - data access behind trait seams.
//!
//! Each repository translates a [`crate::domain::RowFilter`] into SQL so
//! that role scoping is enforced at query time, and returns detail types
//! that already carry the joined facade fields.

pub(crate) mod entities;

mod client_repository;
mod contract_repository;
mod event_repository;
mod user_repository;

pub use client_repository::{ClientRepository, ClientStore};
pub use contract_repository::{ContractRepository, ContractStore};
pub use event_repository::{EventRepository, EventStore};
pub use user_repository::{UserRepository, UserStore};

#[cfg(test)]
pub use client_repository::MockClientRepository;
#[cfg(test)]
pub use contract_repository::MockContractRepository;
#[cfg(test)]
pub use event_repository::MockEventRepository;
#[cfg(test)]
pub use user_repository::MockUserRepository;
