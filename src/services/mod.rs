//! Business logic layer.
//!
//! Services take the authenticated [`crate::domain::Actor`] on every
//! call, derive the applicable row scope from the policy, and re-check
//! ownership in memory before any mutation. The repositories apply the
//! same scope in SQL, so a bug in either layer alone cannot widen
//! access.

mod auth_service;
mod client_service;
mod container;
mod contract_service;
mod event_service;
mod user_service;

#[cfg(test)]
pub(crate) mod test_support;

pub use auth_service::{AuthService, Authenticator, Claims, TokenPair, TokenResponse};
pub use client_service::{ClientManager, ClientService};
pub use container::{ServiceContainer, Services};
pub use contract_service::{ContractManager, ContractService};
pub use event_service::{EventDraft, EventManager, EventService};
pub use user_service::{UserManager, UserService, UserUpdate};
