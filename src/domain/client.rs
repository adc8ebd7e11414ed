//! Client domain entity (prospects and active customers).

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

/// Client domain entity. `sales_contact` links the owning sales
/// representative and drives mutation rights for SALES actors.
#[derive(Debug, Clone, Serialize)]
pub struct Client {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub company_name: String,
    pub last_contact_date: NaiveDate,
    pub sales_contact: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Client row joined with its display facade, produced by the read path.
#[derive(Debug, Clone)]
pub struct ClientDetail {
    pub client: Client,
    /// Username of the owning sales rep, derived from the relation.
    pub sales_contact_username: Option<String>,
}

/// Fields for inserting a new client.
#[derive(Debug, Clone)]
pub struct NewClient {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub company_name: String,
    pub last_contact_date: NaiveDate,
    pub sales_contact: Option<Uuid>,
}

/// Partial update for a client. `None` leaves the field unchanged.
#[derive(Debug, Clone, Default)]
pub struct ClientChanges {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company_name: Option<String>,
    pub last_contact_date: Option<NaiveDate>,
    pub sales_contact: Option<Uuid>,
}

/// Client API representation, including read-only facade fields.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ClientResponse {
    pub id: Uuid,
    #[schema(example = "Jean Martin")]
    pub full_name: String,
    #[schema(example = "jean.martin@alpha.example")]
    pub email: String,
    pub phone: String,
    #[schema(example = "Société Alpha")]
    pub company_name: String,
    pub last_contact_date: NaiveDate,
    pub sales_contact: Option<Uuid>,
    /// Username of the owning sales rep (read-only facade)
    pub sales_contact_username: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ClientDetail> for ClientResponse {
    fn from(detail: ClientDetail) -> Self {
        let ClientDetail {
            client,
            sales_contact_username,
        } = detail;
        Self {
            id: client.id,
            full_name: client.full_name,
            email: client.email,
            phone: client.phone,
            company_name: client.company_name,
            last_contact_date: client.last_contact_date,
            sales_contact: client.sales_contact,
            sales_contact_username,
            created_at: client.created_at,
            updated_at: client.updated_at,
        }
    }
}
