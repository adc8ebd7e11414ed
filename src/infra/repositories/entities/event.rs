//! `events` table entity. The unique index on `contract_id` enforces
//! the one-event-per-contract invariant at the storage level.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "events")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub contract_id: Uuid,
    pub client_id: Uuid,
    pub support_contact_id: Option<Uuid>,
    pub event_name: String,
    pub event_start: DateTimeUtc,
    pub event_end: DateTimeUtc,
    pub location: String,
    pub attendees: i32,
    pub notes: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::contract::Entity",
        from = "Column::ContractId",
        to = "super::contract::Column::Id",
        on_delete = "Cascade"
    )]
    Contract,
    #[sea_orm(
        belongs_to = "super::client::Entity",
        from = "Column::ClientId",
        to = "super::client::Column::Id",
        on_delete = "Cascade"
    )]
    Client,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::SupportContactId",
        to = "super::user::Column::Id",
        on_delete = "SetNull"
    )]
    SupportContact,
}

impl Related<super::contract::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Contract.def()
    }
}

impl Related<super::client::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Client.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SupportContact.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for crate::domain::Event {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            contract: model.contract_id,
            client: model.client_id,
            support_contact: model.support_contact_id,
            event_name: model.event_name,
            event_start: model.event_start,
            event_end: model.event_end,
            location: model.location,
            attendees: model.attendees,
            notes: model.notes,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
