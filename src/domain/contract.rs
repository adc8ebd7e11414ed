//! Contract domain entity (financial agreements tied to a client).

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::errors::{AppError, AppResult};

/// Contract domain entity.
#[derive(Debug, Clone, Serialize)]
pub struct Contract {
    pub id: Uuid,
    pub client: Uuid,
    pub sales_contact: Option<Uuid>,
    pub total_amount: Decimal,
    pub amount_due: Decimal,
    pub is_signed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Contract row joined with its display facade and the ownership fact
/// needed for the mutation-guard re-check.
#[derive(Debug, Clone)]
pub struct ContractDetail {
    pub contract: Contract,
    /// Full name of the related client (read-only facade).
    pub client_full_name: String,
    /// Username of the sales rep on the contract (read-only facade).
    pub sales_contact_username: Option<String>,
    /// Sales contact of the related client; determines SALES visibility.
    pub client_sales_contact: Option<Uuid>,
}

/// Fields for inserting a new contract.
#[derive(Debug, Clone)]
pub struct NewContract {
    pub client: Uuid,
    pub sales_contact: Option<Uuid>,
    pub total_amount: Decimal,
    pub amount_due: Decimal,
    pub is_signed: bool,
}

/// Partial update for a contract. `None` leaves the field unchanged.
#[derive(Debug, Clone, Default)]
pub struct ContractChanges {
    pub client: Option<Uuid>,
    pub sales_contact: Option<Uuid>,
    pub total_amount: Option<Decimal>,
    pub amount_due: Option<Decimal>,
    pub is_signed: Option<bool>,
}

/// List filters, matching the query-string names of the HTTP API
/// (e.g. `?is_signed=true&amount_due__gt=0`).
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct ContractFilters {
    pub is_signed: Option<bool>,
    pub client: Option<Uuid>,
    pub sales_contact: Option<Uuid>,
    pub amount_due: Option<Decimal>,
    #[serde(rename = "amount_due__gt")]
    #[param(rename = "amount_due__gt")]
    pub amount_due_gt: Option<Decimal>,
    #[serde(rename = "amount_due__gte")]
    #[param(rename = "amount_due__gte")]
    pub amount_due_gte: Option<Decimal>,
    #[serde(rename = "amount_due__lt")]
    #[param(rename = "amount_due__lt")]
    pub amount_due_lt: Option<Decimal>,
    #[serde(rename = "amount_due__lte")]
    #[param(rename = "amount_due__lte")]
    pub amount_due_lte: Option<Decimal>,
    pub total_amount: Option<Decimal>,
    #[serde(rename = "total_amount__gt")]
    #[param(rename = "total_amount__gt")]
    pub total_amount_gt: Option<Decimal>,
    #[serde(rename = "total_amount__gte")]
    #[param(rename = "total_amount__gte")]
    pub total_amount_gte: Option<Decimal>,
    #[serde(rename = "total_amount__lt")]
    #[param(rename = "total_amount__lt")]
    pub total_amount_lt: Option<Decimal>,
    #[serde(rename = "total_amount__lte")]
    #[param(rename = "total_amount__lte")]
    pub total_amount_lte: Option<Decimal>,
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "created_at__gte")]
    #[param(rename = "created_at__gte")]
    pub created_at_gte: Option<DateTime<Utc>>,
    #[serde(rename = "created_at__lte")]
    #[param(rename = "created_at__lte")]
    pub created_at_lte: Option<DateTime<Utc>>,
}

/// Contract API representation, including read-only facade fields.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ContractResponse {
    pub id: Uuid,
    pub client: Uuid,
    /// Full name of the related client (read-only facade)
    #[schema(example = "Jean Martin")]
    pub client_full_name: String,
    pub sales_contact: Option<Uuid>,
    /// Username of the sales rep in charge (read-only facade)
    pub sales_contact_username: Option<String>,
    #[schema(value_type = String, example = "1000.00")]
    pub total_amount: Decimal,
    #[schema(value_type = String, example = "250.00")]
    pub amount_due: Decimal,
    pub is_signed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ContractDetail> for ContractResponse {
    fn from(detail: ContractDetail) -> Self {
        let ContractDetail {
            contract,
            client_full_name,
            sales_contact_username,
            ..
        } = detail;
        Self {
            id: contract.id,
            client: contract.client,
            client_full_name,
            sales_contact: contract.sales_contact,
            sales_contact_username,
            total_amount: contract.total_amount,
            amount_due: contract.amount_due,
            is_signed: contract.is_signed,
            created_at: contract.created_at,
            updated_at: contract.updated_at,
        }
    }
}

/// Amount invariant: both amounts non-negative, and the outstanding
/// amount can never exceed the contract total.
pub fn validate_amounts(total_amount: Decimal, amount_due: Decimal) -> AppResult<()> {
    if total_amount < Decimal::ZERO {
        return Err(AppError::field(
            "total_amount",
            "total_amount must be a non-negative amount",
        ));
    }
    if amount_due < Decimal::ZERO {
        return Err(AppError::field(
            "amount_due",
            "amount_due must be a non-negative amount",
        ));
    }
    if amount_due > total_amount {
        return Err(AppError::field(
            "amount_due",
            "amount_due cannot exceed total_amount",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn accepts_amount_due_up_to_total() {
        assert!(validate_amounts(dec("1000.00"), dec("0")).is_ok());
        assert!(validate_amounts(dec("1000.00"), dec("1000.00")).is_ok());
        assert!(validate_amounts(dec("1000.00"), dec("250.50")).is_ok());
    }

    #[test]
    fn rejects_amount_due_above_total() {
        let err = validate_amounts(dec("1000.00"), dec("1200.00")).unwrap_err();
        match err {
            crate::errors::AppError::Validation(fields) => {
                assert!(fields.0.contains_key("amount_due"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn rejects_negative_amounts() {
        assert!(validate_amounts(dec("-1"), dec("0")).is_err());
        assert!(validate_amounts(dec("100"), dec("-1")).is_err());
    }
}
