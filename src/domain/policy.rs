//! Role-scoped authorization policy.
//!
//! Single source of truth for the per-role, per-resource, per-action
//! access matrix. Two layers consume it:
//!
//! - repositories translate the [`RowFilter`] into SQL predicates when
//!   listing or fetching rows;
//! - services re-evaluate the same filter against the fetched row
//!   before any mutation (defense in depth — both layers must agree).
//!
//! Rows outside an actor's read scope are reported as NotFound so that
//! existence is never leaked across scopes. Rows readable but not
//! writable surface as Forbidden.

use uuid::Uuid;

use super::user::Role;

/// Authenticated principal, extracted from the JWT by the middleware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub id: Uuid,
    pub role: Role,
}

impl Actor {
    pub fn new(id: Uuid, role: Role) -> Self {
        Self { id, role }
    }
}

/// Resources governed by the policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Users,
    Clients,
    Contracts,
    Events,
}

/// Row-level actions. Creation is handled separately since it has no
/// target row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowAction {
    List,
    Retrieve,
    Update,
    Delete,
}

impl RowAction {
    pub fn is_read(self) -> bool {
        matches!(self, RowAction::List | RowAction::Retrieve)
    }
}

/// Predicate over a resource's rows.
///
/// Repositories map each variant onto a SQL filter; services evaluate
/// it in memory against [`RowFacts`] for the mutation-guard re-check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowFilter {
    /// Every row is visible/mutable.
    All,
    /// Rows whose owning sales contact is the given user. For clients
    /// this is `sales_contact`; for contracts and events it is the
    /// sales contact of the related client.
    SalesOwned(Uuid),
    /// Rows whose assigned support contact is the given user.
    SupportAssigned(Uuid),
    /// Exactly the row with the given id (self-access on users).
    IdIs(Uuid),
    /// No rows at all.
    Nothing,
}

/// Ownership facts about a single fetched row, used for the in-memory
/// re-check. Fields that do not apply to a resource stay `None`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RowFacts {
    pub id: Option<Uuid>,
    pub sales_owner: Option<Uuid>,
    pub support_assignee: Option<Uuid>,
}

impl RowFilter {
    /// Does this filter admit a row with the given facts?
    pub fn allows(&self, facts: &RowFacts) -> bool {
        match *self {
            RowFilter::All => true,
            RowFilter::SalesOwned(user) => facts.sales_owner == Some(user),
            RowFilter::SupportAssigned(user) => facts.support_assignee == Some(user),
            RowFilter::IdIs(id) => facts.id == Some(id),
            RowFilter::Nothing => false,
        }
    }
}

impl Actor {
    /// The set of rows this actor may target with the given action.
    ///
    /// The match is exhaustive over (role, resource, action): adding a
    /// role or resource forces every rule to be revisited.
    pub fn scope(&self, resource: Resource, action: RowAction) -> RowFilter {
        use Resource::*;
        use RowAction::*;

        match (self.role, resource, action) {
            // Management has unrestricted visibility and mutation.
            (Role::Management, _, _) => RowFilter::All,

            // Sales: read every client, mutate only their own, never delete.
            (Role::Sales, Clients, List | Retrieve) => RowFilter::All,
            (Role::Sales, Clients, Update) => RowFilter::SalesOwned(self.id),
            (Role::Sales, Clients, Delete) => RowFilter::Nothing,

            // Sales: contracts and events of their own clients, read-only.
            (Role::Sales, Contracts | Events, List | Retrieve) => RowFilter::SalesOwned(self.id),
            (Role::Sales, Contracts | Events, Update | Delete) => RowFilter::Nothing,

            // Support: read-only on clients and contracts.
            (Role::Support, Clients | Contracts, List | Retrieve) => RowFilter::All,
            (Role::Support, Clients | Contracts, Update | Delete) => RowFilter::Nothing,

            // Support: their assigned events, updatable but not deletable.
            (Role::Support, Events, List | Retrieve | Update) => {
                RowFilter::SupportAssigned(self.id)
            }
            (Role::Support, Events, Delete) => RowFilter::Nothing,

            // Non-management users see and edit only their own account.
            (Role::Sales | Role::Support, Users, List | Retrieve | Update) => {
                RowFilter::IdIs(self.id)
            }
            (Role::Sales | Role::Support, Users, Delete) => RowFilter::Nothing,
        }
    }

    /// Create eligibility for the given resource.
    pub fn can_create(&self, resource: Resource) -> bool {
        match (self.role, resource) {
            (Role::Management, _) => true,
            // Sales create clients (auto-owned) and events (guarded further
            // by the signed-contract ownership checks in the service).
            (Role::Sales, Resource::Clients | Resource::Events) => true,
            (Role::Sales, Resource::Users | Resource::Contracts) => false,
            (Role::Support, _) => false,
        }
    }

    /// Read scope shorthand (list and retrieve share the same filter).
    pub fn read_scope(&self, resource: Resource) -> RowFilter {
        self.scope(resource, RowAction::Retrieve)
    }
}
