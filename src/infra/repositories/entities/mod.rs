//! SeaORM entity definitions
//!
//! These are database-specific entities separate from domain models.

pub mod client;
pub mod contract;
pub mod event;
pub mod user;
