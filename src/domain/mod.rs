//! Core business entities and logic.
//!
//! The `policy` module is the heart of the system: the role-scoped
//! authorization matrix consumed by both the repositories (SQL
//! filtering) and the services (mutation guards).

pub mod client;
pub mod contract;
pub mod event;
pub mod password;
pub mod policy;
pub mod user;

pub use client::{Client, ClientChanges, ClientDetail, ClientResponse, NewClient};
pub use contract::{
    Contract, ContractChanges, ContractDetail, ContractFilters, ContractResponse, NewContract,
};
pub use event::{Event, EventChanges, EventDetail, EventFilters, EventResponse, NewEvent};
pub use password::Password;
pub use policy::{Actor, Resource, RowAction, RowFacts, RowFilter};
pub use user::{NewUser, Role, User, UserChanges, UserResponse};
