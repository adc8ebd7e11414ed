//! Shared in-memory persistence for integration tests.
//!
//! `World` implements the repository traits over plain vectors, applying
//! the same row scoping the SQL stores apply, so the services can be
//! exercised end to end without a database.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use epicrm::domain::{
    Actor, Client, ClientChanges, ClientDetail, Contract, ContractChanges, ContractDetail,
    ContractFilters, Event, EventChanges, EventDetail, EventFilters, NewClient, NewContract,
    NewEvent, NewUser, Password, Role, RowFilter, User, UserChanges,
};
use epicrm::errors::{AppError, AppResult};
use epicrm::infra::repositories::{
    ClientRepository, ContractRepository, EventRepository, UserRepository,
};
use epicrm::infra::UnitOfWork;
use epicrm::types::PaginationParams;

pub fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

pub fn pagination() -> PaginationParams {
    PaginationParams::default()
}

#[derive(Default)]
struct State {
    users: Vec<User>,
    clients: Vec<Client>,
    contracts: Vec<Contract>,
    events: Vec<Event>,
}

/// In-memory stand-in for the persistence layer.
#[derive(Clone, Default)]
pub struct World {
    state: Arc<Mutex<State>>,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a user directly, bypassing service-level guards.
    pub fn add_user(&self, username: &str, role: Role) -> User {
        self.add_user_with_password(username, role, "Password123!")
    }

    pub fn add_user_with_password(&self, username: &str, role: Role, password: &str) -> User {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            email: format!("{}@example.com", username),
            password_hash: Password::new(password).unwrap().into_string(),
            role,
            created_at: now,
            updated_at: now,
        };
        self.state.lock().unwrap().users.push(user.clone());
        user
    }

    pub fn add_client(&self, email: &str, sales_contact: Option<Uuid>) -> Client {
        let now = Utc::now();
        let client = Client {
            id: Uuid::new_v4(),
            full_name: "Jean Martin".to_string(),
            email: email.to_string(),
            phone: "+33100000000".to_string(),
            company_name: "Société Alpha".to_string(),
            last_contact_date: now.date_naive(),
            sales_contact,
            created_at: now,
            updated_at: now,
        };
        self.state.lock().unwrap().clients.push(client.clone());
        client
    }

    pub fn add_contract(
        &self,
        client: &Client,
        is_signed: bool,
        total_amount: Decimal,
        amount_due: Decimal,
    ) -> Contract {
        let now = Utc::now();
        let contract = Contract {
            id: Uuid::new_v4(),
            client: client.id,
            sales_contact: client.sales_contact,
            total_amount,
            amount_due,
            is_signed,
            created_at: now,
            updated_at: now,
        };
        self.state.lock().unwrap().contracts.push(contract.clone());
        contract
    }

    pub fn add_event(&self, contract: &Contract, support_contact: Option<Uuid>) -> Event {
        let now = Utc::now();
        let event = Event {
            id: Uuid::new_v4(),
            contract: contract.id,
            client: contract.client,
            support_contact,
            event_name: "Kickoff reception".to_string(),
            event_start: now + Duration::days(30),
            event_end: now + Duration::days(30) + Duration::hours(5),
            location: "Salle Eiffel - Paris".to_string(),
            attendees: 80,
            notes: None,
            created_at: now,
            updated_at: now,
        };
        self.state.lock().unwrap().events.push(event.clone());
        event
    }
}

pub fn actor_for(user: &User) -> Actor {
    Actor::new(user.id, user.role)
}

fn paginate<T: Clone>(rows: Vec<T>, pagination: &PaginationParams) -> (Vec<T>, u64) {
    let count = rows.len() as u64;
    let start = (pagination.page_index() * pagination.limit()) as usize;
    let page = rows
        .into_iter()
        .skip(start)
        .take(pagination.limit() as usize)
        .collect();
    (page, count)
}

fn username_of(state: &State, id: Option<Uuid>) -> Option<String> {
    id.and_then(|id| state.users.iter().find(|u| u.id == id))
        .map(|u| u.username.clone())
}

fn client_of(state: &State, id: Uuid) -> Option<&Client> {
    state.clients.iter().find(|c| c.id == id)
}

fn client_detail(state: &State, client: &Client) -> ClientDetail {
    ClientDetail {
        client: client.clone(),
        sales_contact_username: username_of(state, client.sales_contact),
    }
}

fn contract_detail(state: &State, contract: &Contract) -> ContractDetail {
    let client = client_of(state, contract.client);
    ContractDetail {
        contract: contract.clone(),
        client_full_name: client.map(|c| c.full_name.clone()).unwrap_or_default(),
        sales_contact_username: username_of(state, contract.sales_contact),
        client_sales_contact: client.and_then(|c| c.sales_contact),
    }
}

fn event_detail(state: &State, event: &Event) -> EventDetail {
    let client = client_of(state, event.client);
    EventDetail {
        event: event.clone(),
        client_full_name: client.map(|c| c.full_name.clone()).unwrap_or_default(),
        support_contact_username: username_of(state, event.support_contact),
        client_sales_contact: client.and_then(|c| c.sales_contact),
    }
}

fn client_visible(scope: &RowFilter, client: &Client) -> bool {
    match *scope {
        RowFilter::All => true,
        RowFilter::SalesOwned(user) => client.sales_contact == Some(user),
        RowFilter::IdIs(id) => client.id == id,
        RowFilter::SupportAssigned(_) | RowFilter::Nothing => false,
    }
}

fn contract_visible(state: &State, scope: &RowFilter, contract: &Contract) -> bool {
    match *scope {
        RowFilter::All => true,
        RowFilter::SalesOwned(user) => {
            client_of(state, contract.client).and_then(|c| c.sales_contact) == Some(user)
        }
        RowFilter::IdIs(id) => contract.id == id,
        RowFilter::SupportAssigned(_) | RowFilter::Nothing => false,
    }
}

fn event_visible(state: &State, scope: &RowFilter, event: &Event) -> bool {
    match *scope {
        RowFilter::All => true,
        RowFilter::SalesOwned(user) => {
            client_of(state, event.client).and_then(|c| c.sales_contact) == Some(user)
        }
        RowFilter::SupportAssigned(user) => event.support_contact == Some(user),
        RowFilter::IdIs(id) => event.id == id,
        RowFilter::Nothing => false,
    }
}

fn user_visible(scope: &RowFilter, user: &User) -> bool {
    match *scope {
        RowFilter::All => true,
        RowFilter::IdIs(id) => user.id == id,
        RowFilter::SalesOwned(_) | RowFilter::SupportAssigned(_) | RowFilter::Nothing => false,
    }
}

struct UserFake(Arc<Mutex<State>>);
struct ClientFake(Arc<Mutex<State>>);
struct ContractFake(Arc<Mutex<State>>);
struct EventFake(Arc<Mutex<State>>);

#[async_trait]
impl UserRepository for UserFake {
    async fn list(
        &self,
        scope: &RowFilter,
        pagination: &PaginationParams,
    ) -> AppResult<(Vec<User>, u64)> {
        let state = self.0.lock().unwrap();
        let mut rows: Vec<User> = state
            .users
            .iter()
            .filter(|u| user_visible(scope, u))
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(paginate(rows, pagination))
    }

    async fn find_by_id(&self, scope: &RowFilter, id: Uuid) -> AppResult<Option<User>> {
        let state = self.0.lock().unwrap();
        Ok(state
            .users
            .iter()
            .find(|u| u.id == id && user_visible(scope, u))
            .cloned())
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let state = self.0.lock().unwrap();
        Ok(state.users.iter().find(|u| u.username == username).cloned())
    }

    async fn insert(&self, data: NewUser) -> AppResult<User> {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            username: data.username,
            email: data.email,
            password_hash: data.password_hash,
            role: data.role,
            created_at: now,
            updated_at: now,
        };
        self.0.lock().unwrap().users.push(user.clone());
        Ok(user)
    }

    async fn update(&self, id: Uuid, changes: UserChanges) -> AppResult<User> {
        let mut state = self.0.lock().unwrap();
        let user = state
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(AppError::NotFound)?;
        if let Some(username) = changes.username {
            user.username = username;
        }
        if let Some(email) = changes.email {
            user.email = email;
        }
        if let Some(password_hash) = changes.password_hash {
            user.password_hash = password_hash;
        }
        if let Some(role) = changes.role {
            user.role = role;
        }
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let mut state = self.0.lock().unwrap();
        let before = state.users.len();
        state.users.retain(|u| u.id != id);
        if state.users.len() == before {
            return Err(AppError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl ClientRepository for ClientFake {
    async fn list(
        &self,
        scope: &RowFilter,
        pagination: &PaginationParams,
    ) -> AppResult<(Vec<ClientDetail>, u64)> {
        let state = self.0.lock().unwrap();
        let rows: Vec<ClientDetail> = state
            .clients
            .iter()
            .filter(|c| client_visible(scope, c))
            .map(|c| client_detail(&state, c))
            .collect();
        Ok(paginate(rows, pagination))
    }

    async fn find_by_id(&self, scope: &RowFilter, id: Uuid) -> AppResult<Option<ClientDetail>> {
        let state = self.0.lock().unwrap();
        Ok(state
            .clients
            .iter()
            .find(|c| c.id == id && client_visible(scope, c))
            .map(|c| client_detail(&state, c)))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<Client>> {
        let state = self.0.lock().unwrap();
        Ok(state.clients.iter().find(|c| c.email == email).cloned())
    }

    async fn insert(&self, data: NewClient) -> AppResult<ClientDetail> {
        let now = Utc::now();
        let client = Client {
            id: Uuid::new_v4(),
            full_name: data.full_name,
            email: data.email,
            phone: data.phone,
            company_name: data.company_name,
            last_contact_date: data.last_contact_date,
            sales_contact: data.sales_contact,
            created_at: now,
            updated_at: now,
        };
        let mut state = self.0.lock().unwrap();
        state.clients.push(client.clone());
        Ok(client_detail(&state, &client))
    }

    async fn update(&self, id: Uuid, changes: ClientChanges) -> AppResult<ClientDetail> {
        let mut state = self.0.lock().unwrap();
        let client = state
            .clients
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(AppError::NotFound)?;
        if let Some(full_name) = changes.full_name {
            client.full_name = full_name;
        }
        if let Some(email) = changes.email {
            client.email = email;
        }
        if let Some(phone) = changes.phone {
            client.phone = phone;
        }
        if let Some(company_name) = changes.company_name {
            client.company_name = company_name;
        }
        if let Some(last_contact_date) = changes.last_contact_date {
            client.last_contact_date = last_contact_date;
        }
        if let Some(sales_contact) = changes.sales_contact {
            client.sales_contact = Some(sales_contact);
        }
        client.updated_at = Utc::now();
        let client = client.clone();
        Ok(client_detail(&state, &client))
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let mut state = self.0.lock().unwrap();
        let before = state.clients.len();
        state.clients.retain(|c| c.id != id);
        if state.clients.len() == before {
            return Err(AppError::NotFound);
        }
        Ok(())
    }
}

fn contract_matches(filters: &ContractFilters, contract: &Contract) -> bool {
    let checks = [
        filters.is_signed.map_or(true, |v| contract.is_signed == v),
        filters.client.map_or(true, |v| contract.client == v),
        filters
            .sales_contact
            .map_or(true, |v| contract.sales_contact == Some(v)),
        filters.amount_due.map_or(true, |v| contract.amount_due == v),
        filters
            .amount_due_gt
            .map_or(true, |v| contract.amount_due > v),
        filters
            .amount_due_gte
            .map_or(true, |v| contract.amount_due >= v),
        filters
            .amount_due_lt
            .map_or(true, |v| contract.amount_due < v),
        filters
            .amount_due_lte
            .map_or(true, |v| contract.amount_due <= v),
        filters
            .total_amount
            .map_or(true, |v| contract.total_amount == v),
        filters
            .total_amount_gt
            .map_or(true, |v| contract.total_amount > v),
        filters
            .total_amount_gte
            .map_or(true, |v| contract.total_amount >= v),
        filters
            .total_amount_lt
            .map_or(true, |v| contract.total_amount < v),
        filters
            .total_amount_lte
            .map_or(true, |v| contract.total_amount <= v),
        filters.created_at.map_or(true, |v| contract.created_at == v),
        filters
            .created_at_gte
            .map_or(true, |v| contract.created_at >= v),
        filters
            .created_at_lte
            .map_or(true, |v| contract.created_at <= v),
    ];
    checks.into_iter().all(|ok| ok)
}

#[async_trait]
impl ContractRepository for ContractFake {
    async fn list(
        &self,
        scope: &RowFilter,
        filters: &ContractFilters,
        pagination: &PaginationParams,
    ) -> AppResult<(Vec<ContractDetail>, u64)> {
        let state = self.0.lock().unwrap();
        let rows: Vec<ContractDetail> = state
            .contracts
            .iter()
            .filter(|c| contract_visible(&state, scope, c) && contract_matches(filters, c))
            .map(|c| contract_detail(&state, c))
            .collect();
        Ok(paginate(rows, pagination))
    }

    async fn find_by_id(&self, scope: &RowFilter, id: Uuid) -> AppResult<Option<ContractDetail>> {
        let state = self.0.lock().unwrap();
        Ok(state
            .contracts
            .iter()
            .find(|c| c.id == id && contract_visible(&state, scope, c))
            .map(|c| contract_detail(&state, c)))
    }

    async fn insert(&self, data: NewContract) -> AppResult<ContractDetail> {
        let now = Utc::now();
        let contract = Contract {
            id: Uuid::new_v4(),
            client: data.client,
            sales_contact: data.sales_contact,
            total_amount: data.total_amount,
            amount_due: data.amount_due,
            is_signed: data.is_signed,
            created_at: now,
            updated_at: now,
        };
        let mut state = self.0.lock().unwrap();
        state.contracts.push(contract.clone());
        Ok(contract_detail(&state, &contract))
    }

    async fn update(&self, id: Uuid, changes: ContractChanges) -> AppResult<ContractDetail> {
        let mut state = self.0.lock().unwrap();
        let contract = state
            .contracts
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(AppError::NotFound)?;
        if let Some(client) = changes.client {
            contract.client = client;
        }
        if let Some(sales_contact) = changes.sales_contact {
            contract.sales_contact = Some(sales_contact);
        }
        if let Some(total_amount) = changes.total_amount {
            contract.total_amount = total_amount;
        }
        if let Some(amount_due) = changes.amount_due {
            contract.amount_due = amount_due;
        }
        if let Some(is_signed) = changes.is_signed {
            contract.is_signed = is_signed;
        }
        contract.updated_at = Utc::now();
        let contract = contract.clone();
        Ok(contract_detail(&state, &contract))
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let mut state = self.0.lock().unwrap();
        let before = state.contracts.len();
        state.contracts.retain(|c| c.id != id);
        if state.contracts.len() == before {
            return Err(AppError::NotFound);
        }
        Ok(())
    }
}

fn event_matches(filters: &EventFilters, event: &Event) -> bool {
    let checks = [
        filters
            .support_contact
            .map_or(true, |v| event.support_contact == Some(v)),
        filters
            .support_contact_isnull
            .map_or(true, |v| event.support_contact.is_none() == v),
        filters.client.map_or(true, |v| event.client == v),
        filters
            .event_start_gte
            .map_or(true, |v| event.event_start >= v),
        filters
            .event_start_lte
            .map_or(true, |v| event.event_start <= v),
    ];
    checks.into_iter().all(|ok| ok)
}

#[async_trait]
impl EventRepository for EventFake {
    async fn list(
        &self,
        scope: &RowFilter,
        filters: &EventFilters,
        pagination: &PaginationParams,
    ) -> AppResult<(Vec<EventDetail>, u64)> {
        let state = self.0.lock().unwrap();
        let rows: Vec<EventDetail> = state
            .events
            .iter()
            .filter(|e| event_visible(&state, scope, e) && event_matches(filters, e))
            .map(|e| event_detail(&state, e))
            .collect();
        Ok(paginate(rows, pagination))
    }

    async fn find_by_id(&self, scope: &RowFilter, id: Uuid) -> AppResult<Option<EventDetail>> {
        let state = self.0.lock().unwrap();
        Ok(state
            .events
            .iter()
            .find(|e| e.id == id && event_visible(&state, scope, e))
            .map(|e| event_detail(&state, e)))
    }

    async fn find_by_contract(&self, contract_id: Uuid) -> AppResult<Option<Event>> {
        let state = self.0.lock().unwrap();
        Ok(state
            .events
            .iter()
            .find(|e| e.contract == contract_id)
            .cloned())
    }

    async fn insert(&self, data: NewEvent) -> AppResult<EventDetail> {
        let now = Utc::now();
        let event = Event {
            id: Uuid::new_v4(),
            contract: data.contract,
            client: data.client,
            support_contact: data.support_contact,
            event_name: data.event_name,
            event_start: data.event_start,
            event_end: data.event_end,
            location: data.location,
            attendees: data.attendees,
            notes: data.notes,
            created_at: now,
            updated_at: now,
        };
        let mut state = self.0.lock().unwrap();
        state.events.push(event.clone());
        Ok(event_detail(&state, &event))
    }

    async fn update(&self, id: Uuid, changes: EventChanges) -> AppResult<EventDetail> {
        let mut state = self.0.lock().unwrap();
        let event = state
            .events
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or(AppError::NotFound)?;
        if let Some(support_contact) = changes.support_contact {
            event.support_contact = Some(support_contact);
        }
        if let Some(event_name) = changes.event_name {
            event.event_name = event_name;
        }
        if let Some(event_start) = changes.event_start {
            event.event_start = event_start;
        }
        if let Some(event_end) = changes.event_end {
            event.event_end = event_end;
        }
        if let Some(location) = changes.location {
            event.location = location;
        }
        if let Some(attendees) = changes.attendees {
            event.attendees = attendees;
        }
        if let Some(notes) = changes.notes {
            event.notes = Some(notes);
        }
        event.updated_at = Utc::now();
        let event = event.clone();
        Ok(event_detail(&state, &event))
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let mut state = self.0.lock().unwrap();
        let before = state.events.len();
        state.events.retain(|e| e.id != id);
        if state.events.len() == before {
            return Err(AppError::NotFound);
        }
        Ok(())
    }
}

impl UnitOfWork for World {
    fn users(&self) -> Arc<dyn UserRepository> {
        Arc::new(UserFake(self.state.clone()))
    }

    fn clients(&self) -> Arc<dyn ClientRepository> {
        Arc::new(ClientFake(self.state.clone()))
    }

    fn contracts(&self) -> Arc<dyn ContractRepository> {
        Arc::new(ContractFake(self.state.clone()))
    }

    fn events(&self) -> Arc<dyn EventRepository> {
        Arc::new(EventFake(self.state.clone()))
    }
}
