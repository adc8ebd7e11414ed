//! Seed command - Populates the database with demo data.
//!
//! Creates one collaborator per role plus a second sales rep, a handful
//! of clients split between the reps, one contract per client (half of
//! them signed) and an event for every signed contract. Inserts go
//! through the repositories so the data obeys the same constraints as
//! API writes.

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::cli::args::SeedArgs;
use crate::config::Config;
use crate::domain::{NewClient, NewContract, NewEvent, NewUser, Password, Role};
use crate::errors::{AppError, AppResult};
use crate::infra::{Database, Persistence, UnitOfWork};

struct SeedUser {
    username: &'static str,
    email: &'static str,
    role: Role,
}

const SEED_USERS: &[SeedUser] = &[
    SeedUser {
        username: "alice.sales",
        email: "alice.dupont@example.com",
        role: Role::Sales,
    },
    SeedUser {
        username: "marc.sales",
        email: "marc.lefort@example.com",
        role: Role::Sales,
    },
    SeedUser {
        username: "bob.support",
        email: "bob.moreau@example.com",
        role: Role::Support,
    },
    SeedUser {
        username: "claire.management",
        email: "claire.bernard@example.com",
        role: Role::Management,
    },
];

const SEED_CLIENTS: &[(&str, &str)] = &[
    ("Jean Martin", "Societe Alpha"),
    ("Sophie Durand", "Durand Consulting"),
    ("Karim Boulahya", "TechWave"),
    ("Emma Lefevre", "Lefevre & Fils"),
    ("Lucas Petit", "Petit Design"),
    ("Nora Benali", "Benali Co."),
];

const SEED_LOCATIONS: &[&str] = &[
    "Salle Eiffel - Paris",
    "Hotel de Ville - Lyon",
    "Centre Expo - Marseille",
    "Palais des Congres - Lille",
    "Espace Atlantique - Nantes",
    "Salle Horizon - Toulouse",
];

/// Execute the seed command
pub async fn execute(args: SeedArgs, config: Config) -> AppResult<()> {
    tracing::info!("Seeding database...");

    let db = Database::connect(&config)
        .await
        .map_err(|e| AppError::internal(format!("Database connection failed: {}", e)))?;
    let persistence = Persistence::new(db.get_connection());

    let password_hash = Password::new(&args.password)?.into_string();

    let mut sales_reps: Vec<Uuid> = Vec::new();
    let mut support_rep: Option<Uuid> = None;
    for account in SEED_USERS {
        let user = persistence
            .users()
            .insert(NewUser {
                username: account.username.to_string(),
                email: account.email.to_string(),
                password_hash: password_hash.clone(),
                role: account.role,
            })
            .await?;
        match account.role {
            Role::Sales => sales_reps.push(user.id),
            Role::Support => support_rep = Some(user.id),
            Role::Management => {}
        }
        tracing::info!(username = %user.username, role = %user.role, "seeded user");
    }
    let support_rep = support_rep.ok_or_else(|| AppError::internal("seed produced no support rep"))?;

    let today = Utc::now().date_naive();
    let mut contracts: Vec<(Uuid, Uuid, bool)> = Vec::new();

    for (i, (full_name, company)) in SEED_CLIENTS.iter().enumerate() {
        let email = format!("{}@exemple.com", full_name.to_lowercase().replace(' ', "."));
        let sales_contact = sales_reps[i % sales_reps.len()];

        let client = persistence
            .clients()
            .insert(NewClient {
                full_name: full_name.to_string(),
                email,
                phone: format!("06{:08}", 10_000_000 + i as u32 * 1_111_111),
                company_name: company.to_string(),
                last_contact_date: today - Duration::days(3 * (i as i64 + 1)),
                sales_contact: Some(sales_contact),
            })
            .await?;
        tracing::info!(client = %client.client.full_name, "seeded client");

        let total_amount = Decimal::new(150_000 + 75_000 * i as i64, 2);
        let amount_due = if i % 3 == 0 {
            Decimal::ZERO
        } else {
            total_amount / Decimal::from(2)
        };
        let is_signed = i % 2 == 0;

        let contract = persistence
            .contracts()
            .insert(NewContract {
                client: client.client.id,
                sales_contact: Some(sales_contact),
                total_amount,
                amount_due,
                is_signed,
            })
            .await?;
        contracts.push((contract.contract.id, client.client.id, is_signed));
    }

    let now = Utc::now();
    let mut event_count = 0;
    for (i, (contract_id, client_id, is_signed)) in contracts.iter().enumerate() {
        if !is_signed {
            continue;
        }
        let (_, company) = SEED_CLIENTS[i];
        persistence
            .events()
            .insert(NewEvent {
                contract: *contract_id,
                client: *client_id,
                support_contact: Some(support_rep),
                event_name: format!("Kickoff reception - {}", company),
                event_start: now + Duration::days(7 + i as i64),
                event_end: now + Duration::days(7 + i as i64) + Duration::hours(6),
                location: SEED_LOCATIONS[i % SEED_LOCATIONS.len()].to_string(),
                attendees: 20 + 15 * i as i32,
                notes: Some("Invitations sent, room confirmed.".to_string()),
            })
            .await?;
        event_count += 1;
    }

    tracing::info!(
        users = SEED_USERS.len(),
        clients = SEED_CLIENTS.len(),
        contracts = contracts.len(),
        events = event_count,
        "seed completed"
    );
    println!("Seeded accounts (password: {}):", args.password);
    for account in SEED_USERS {
        println!("  {} ({})", account.username, account.role);
    }

    Ok(())
}
