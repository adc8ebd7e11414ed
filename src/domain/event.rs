//! Event domain entity (scheduled engagements backed by a signed contract).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::errors::{AppError, AppResult};

/// Event domain entity. `contract` is a one-to-one link; `client`
/// always mirrors the contract's client.
#[derive(Debug, Clone, Serialize)]
pub struct Event {
    pub id: Uuid,
    pub contract: Uuid,
    pub client: Uuid,
    pub support_contact: Option<Uuid>,
    pub event_name: String,
    pub event_start: DateTime<Utc>,
    pub event_end: DateTime<Utc>,
    pub location: String,
    pub attendees: i32,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Event row joined with its display facade and the ownership fact
/// needed for SALES visibility checks.
#[derive(Debug, Clone)]
pub struct EventDetail {
    pub event: Event,
    /// Full name of the related client (read-only facade).
    pub client_full_name: String,
    /// Username of the assigned support staffer (read-only facade).
    pub support_contact_username: Option<String>,
    /// Sales contact of the related client; determines SALES visibility.
    pub client_sales_contact: Option<Uuid>,
}

/// Fields for inserting a new event. `client` is always derived from
/// the contract by the service, never taken from the request.
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub contract: Uuid,
    pub client: Uuid,
    pub support_contact: Option<Uuid>,
    pub event_name: String,
    pub event_start: DateTime<Utc>,
    pub event_end: DateTime<Utc>,
    pub location: String,
    pub attendees: i32,
    pub notes: Option<String>,
}

/// Partial update for an event. `None` leaves the field unchanged.
/// `contract` and `client` may be present only if equal to the stored
/// values; the service rejects any change attempt.
#[derive(Debug, Clone, Default)]
pub struct EventChanges {
    pub contract: Option<Uuid>,
    pub client: Option<Uuid>,
    pub support_contact: Option<Uuid>,
    pub event_name: Option<String>,
    pub event_start: Option<DateTime<Utc>>,
    pub event_end: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub attendees: Option<i32>,
    pub notes: Option<String>,
}

impl EventChanges {
    /// True when the update touches anything beyond the SUPPORT-writable
    /// subset (name, schedule, location, attendees, notes).
    pub fn touches_restricted_fields(&self) -> bool {
        self.support_contact.is_some()
    }
}

/// List filters, matching the query-string names of the HTTP API
/// (e.g. `?support_contact__isnull=true&event_start__gte=...`).
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct EventFilters {
    pub support_contact: Option<Uuid>,
    #[serde(rename = "support_contact__isnull")]
    #[param(rename = "support_contact__isnull")]
    pub support_contact_isnull: Option<bool>,
    pub client: Option<Uuid>,
    #[serde(rename = "event_start__gte")]
    #[param(rename = "event_start__gte")]
    pub event_start_gte: Option<DateTime<Utc>>,
    #[serde(rename = "event_start__lte")]
    #[param(rename = "event_start__lte")]
    pub event_start_lte: Option<DateTime<Utc>>,
}

/// Event API representation, including read-only facade fields.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EventResponse {
    pub id: Uuid,
    pub contract: Uuid,
    /// Identifier of the linked contract (read-only facade echo)
    pub contract_id: Uuid,
    pub client: Uuid,
    /// Full name of the related client (read-only facade)
    #[schema(example = "Jean Martin")]
    pub client_full_name: String,
    pub support_contact: Option<Uuid>,
    /// Username of the assigned support staffer (read-only facade)
    pub support_contact_username: Option<String>,
    #[schema(example = "Kickoff reception")]
    pub event_name: String,
    pub event_start: DateTime<Utc>,
    pub event_end: DateTime<Utc>,
    #[schema(example = "Salle Eiffel - Paris")]
    pub location: String,
    #[schema(example = 80)]
    pub attendees: i32,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<EventDetail> for EventResponse {
    fn from(detail: EventDetail) -> Self {
        let EventDetail {
            event,
            client_full_name,
            support_contact_username,
            ..
        } = detail;
        Self {
            id: event.id,
            contract: event.contract,
            contract_id: event.contract,
            client: event.client,
            client_full_name,
            support_contact: event.support_contact,
            support_contact_username,
            event_name: event.event_name,
            event_start: event.event_start,
            event_end: event.event_end,
            location: event.location,
            attendees: event.attendees,
            notes: event.notes,
            created_at: event.created_at,
            updated_at: event.updated_at,
        }
    }
}

/// An event hosts at least one attendee.
pub fn validate_attendees(attendees: i32) -> AppResult<()> {
    if attendees < 1 {
        return Err(AppError::field("attendees", "attendees must be positive"));
    }
    Ok(())
}

/// Schedule invariants: the end must be strictly after the start, and
/// at creation time the start must not already be in the past.
pub fn validate_schedule(
    event_start: DateTime<Utc>,
    event_end: DateTime<Utc>,
    now: Option<DateTime<Utc>>,
) -> AppResult<()> {
    if let Some(now) = now {
        if event_start < now {
            return Err(AppError::field(
                "event_start",
                "event_start cannot be in the past",
            ));
        }
    }
    if event_end <= event_start {
        return Err(AppError::field(
            "event_end",
            "event_end must be after event_start",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn accepts_future_well_ordered_schedule() {
        let now = Utc::now();
        let start = now + Duration::days(7);
        let end = start + Duration::hours(4);
        assert!(validate_schedule(start, end, Some(now)).is_ok());
    }

    #[test]
    fn rejects_start_in_the_past_at_creation() {
        let now = Utc::now();
        let start = now - Duration::hours(1);
        let end = now + Duration::hours(1);
        let err = validate_schedule(start, end, Some(now)).unwrap_err();
        match err {
            AppError::Validation(fields) => assert!(fields.0.contains_key("event_start")),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn allows_past_start_on_update() {
        // Updates do not re-enforce the future-start policy.
        let now = Utc::now();
        let start = now - Duration::days(1);
        let end = start + Duration::hours(2);
        assert!(validate_schedule(start, end, None).is_ok());
    }

    #[test]
    fn rejects_zero_or_negative_attendees() {
        for n in [0, -5] {
            let err = validate_attendees(n).unwrap_err();
            match err {
                AppError::Validation(fields) => assert!(fields.0.contains_key("attendees")),
                other => panic!("expected validation error, got {:?}", other),
            }
        }
        assert!(validate_attendees(1).is_ok());
    }

    #[test]
    fn rejects_end_not_after_start() {
        let now = Utc::now();
        let start = now + Duration::days(1);
        let err = validate_schedule(start, start, None).unwrap_err();
        match err {
            AppError::Validation(fields) => assert!(fields.0.contains_key("event_end")),
            other => panic!("expected validation error, got {:?}", other),
        }
    }
}
