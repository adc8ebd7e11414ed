//! `clients` table entity.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "clients")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub full_name: String,
    #[sea_orm(unique)]
    pub email: String,
    pub phone: String,
    pub company_name: String,
    pub last_contact_date: Date,
    pub sales_contact_id: Option<Uuid>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::SalesContactId",
        to = "super::user::Column::Id",
        on_delete = "SetNull"
    )]
    SalesContact,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SalesContact.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for crate::domain::Client {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            full_name: model.full_name,
            email: model.email,
            phone: model.phone,
            company_name: model.company_name,
            last_contact_date: model.last_contact_date,
            sales_contact: model.sales_contact_id,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
