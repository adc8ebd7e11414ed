//! Database schema migrations, applied in order by the [`Migrator`].

use sea_orm_migration::prelude::*;

mod m20240101_000001_create_users_table;
mod m20240101_000002_create_clients_table;
mod m20240101_000003_create_contracts_table;
mod m20240101_000004_create_events_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_users_table::Migration),
            Box::new(m20240101_000002_create_clients_table::Migration),
            Box::new(m20240101_000003_create_contracts_table::Migration),
            Box::new(m20240101_000004_create_events_table::Migration),
        ]
    }
}
