//! User persistence.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use super::entities::user;
use crate::domain::{NewUser, RowFilter, User, UserChanges};
use crate::errors::AppResult;
use crate::types::PaginationParams;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// List users visible under `scope`, ordered by username.
    async fn list(
        &self,
        scope: &RowFilter,
        pagination: &PaginationParams,
    ) -> AppResult<(Vec<User>, u64)>;

    /// Fetch one user if they exist and fall inside `scope`.
    async fn find_by_id(&self, scope: &RowFilter, id: Uuid) -> AppResult<Option<User>>;

    /// Credential lookup for login; not scope-filtered.
    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>>;

    async fn insert(&self, data: NewUser) -> AppResult<User>;

    async fn update(&self, id: Uuid, changes: UserChanges) -> AppResult<User>;

    async fn delete(&self, id: Uuid) -> AppResult<()>;
}

/// SeaORM-backed implementation.
pub struct UserStore {
    db: DatabaseConnection,
}

impl UserStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn scoped_query(scope: &RowFilter) -> sea_orm::Select<user::Entity> {
        let query = user::Entity::find();

        match scope {
            RowFilter::All => query,
            RowFilter::IdIs(id) => query.filter(user::Column::Id.eq(*id)),
            // Users carry no sales/support ownership; anything else is a deny.
            RowFilter::SalesOwned(_) | RowFilter::SupportAssigned(_) | RowFilter::Nothing => {
                query.filter(user::Column::Id.is_null())
            }
        }
    }
}

#[async_trait]
impl UserRepository for UserStore {
    async fn list(
        &self,
        scope: &RowFilter,
        pagination: &PaginationParams,
    ) -> AppResult<(Vec<User>, u64)> {
        let paginator = Self::scoped_query(scope)
            .order_by_asc(user::Column::Username)
            .paginate(&self.db, pagination.limit());

        let total = paginator.num_items().await?;
        let models = paginator.fetch_page(pagination.page_index()).await?;

        let users = models
            .into_iter()
            .map(User::try_from)
            .collect::<AppResult<Vec<_>>>()?;

        Ok((users, total))
    }

    async fn find_by_id(&self, scope: &RowFilter, id: Uuid) -> AppResult<Option<User>> {
        let model = Self::scoped_query(scope)
            .filter(user::Column::Id.eq(id))
            .one(&self.db)
            .await?;

        model.map(User::try_from).transpose()
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let model = user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await?;

        model.map(User::try_from).transpose()
    }

    async fn insert(&self, data: NewUser) -> AppResult<User> {
        let now = Utc::now();
        let model = user::ActiveModel {
            id: Set(Uuid::new_v4()),
            username: Set(data.username),
            email: Set(data.email),
            password_hash: Set(data.password_hash),
            role: Set(data.role.as_str().to_string()),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let inserted = model.insert(&self.db).await?;
        User::try_from(inserted)
    }

    async fn update(&self, id: Uuid, changes: UserChanges) -> AppResult<User> {
        let model = user::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(crate::errors::AppError::NotFound)?;

        let mut active: user::ActiveModel = model.into();
        if let Some(username) = changes.username {
            active.username = Set(username);
        }
        if let Some(email) = changes.email {
            active.email = Set(email);
        }
        if let Some(password_hash) = changes.password_hash {
            active.password_hash = Set(password_hash);
        }
        if let Some(role) = changes.role {
            active.role = Set(role.as_str().to_string());
        }
        active.updated_at = Set(Utc::now());

        let updated = active.update(&self.db).await?;
        User::try_from(updated)
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = user::Entity::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(crate::errors::AppError::NotFound);
        }
        Ok(())
    }
}
