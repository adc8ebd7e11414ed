//! User service - collaborator account management.
//!
//! Accounts are provisioned by MANAGEMENT; everyone else is limited to
//! reading and editing their own account.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{
    Actor, NewUser, Password, Resource, Role, RowAction, RowFacts, User, UserChanges,
};
use crate::errors::{AppError, AppResult};
use crate::infra::UnitOfWork;
use crate::types::PaginationParams;

/// Requested changes to a user account (plaintext password, hashed here).
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<Role>,
}

/// User service trait for dependency injection.
#[async_trait]
pub trait UserService: Send + Sync {
    /// List users visible to the actor (all for MANAGEMENT, self otherwise).
    async fn list_users(
        &self,
        actor: Actor,
        pagination: &PaginationParams,
    ) -> AppResult<(Vec<User>, u64)>;

    async fn get_user(&self, actor: Actor, id: Uuid) -> AppResult<User>;

    /// Create a collaborator account. MANAGEMENT only.
    async fn create_user(
        &self,
        actor: Actor,
        username: String,
        email: String,
        password: String,
        role: Role,
    ) -> AppResult<User>;

    async fn update_user(&self, actor: Actor, id: Uuid, update: UserUpdate) -> AppResult<User>;

    /// Delete an account. MANAGEMENT only, and never their own.
    async fn delete_user(&self, actor: Actor, id: Uuid) -> AppResult<()>;
}

/// Concrete implementation of UserService using Unit of Work.
pub struct UserManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> UserManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> UserService for UserManager<U> {
    async fn list_users(
        &self,
        actor: Actor,
        pagination: &PaginationParams,
    ) -> AppResult<(Vec<User>, u64)> {
        let scope = actor.read_scope(Resource::Users);
        self.uow.users().list(&scope, pagination).await
    }

    async fn get_user(&self, actor: Actor, id: Uuid) -> AppResult<User> {
        let scope = actor.read_scope(Resource::Users);
        self.uow
            .users()
            .find_by_id(&scope, id)
            .await?
            .ok_or(AppError::NotFound)
    }

    async fn create_user(
        &self,
        actor: Actor,
        username: String,
        email: String,
        password: String,
        role: Role,
    ) -> AppResult<User> {
        if !actor.can_create(Resource::Users) {
            return Err(AppError::forbidden("only management may create users"));
        }

        if self.uow.users().find_by_username(&username).await?.is_some() {
            return Err(AppError::conflict("user"));
        }

        let password_hash = Password::new(&password)?.into_string();
        self.uow
            .users()
            .insert(NewUser {
                username,
                email,
                password_hash,
                role,
            })
            .await
    }

    async fn update_user(&self, actor: Actor, id: Uuid, update: UserUpdate) -> AppResult<User> {
        let read_scope = actor.read_scope(Resource::Users);
        let user = self
            .uow
            .users()
            .find_by_id(&read_scope, id)
            .await?
            .ok_or(AppError::NotFound)?;

        let facts = RowFacts {
            id: Some(user.id),
            ..Default::default()
        };
        if !actor.scope(Resource::Users, RowAction::Update).allows(&facts) {
            return Err(AppError::forbidden("you may only modify your own account"));
        }

        // Role changes are a management privilege; sending the current
        // role back (full update) is not a change.
        if let Some(role) = update.role {
            if role != user.role && !actor.role.is_management() {
                return Err(AppError::forbidden("only management may change roles"));
            }
        }

        if let Some(username) = &update.username {
            if username != &user.username
                && self.uow.users().find_by_username(username).await?.is_some()
            {
                return Err(AppError::conflict("user"));
            }
        }

        let password_hash = match update.password {
            Some(password) => Some(Password::new(&password)?.into_string()),
            None => None,
        };

        self.uow
            .users()
            .update(
                id,
                UserChanges {
                    username: update.username,
                    email: update.email,
                    password_hash,
                    role: update.role,
                },
            )
            .await
    }

    async fn delete_user(&self, actor: Actor, id: Uuid) -> AppResult<()> {
        let read_scope = actor.read_scope(Resource::Users);
        let user = self
            .uow
            .users()
            .find_by_id(&read_scope, id)
            .await?
            .ok_or(AppError::NotFound)?;

        let facts = RowFacts {
            id: Some(user.id),
            ..Default::default()
        };
        if !actor.scope(Resource::Users, RowAction::Delete).allows(&facts) {
            return Err(AppError::forbidden("only management may delete users"));
        }

        if user.id == actor.id {
            return Err(AppError::forbidden("you cannot delete your own account"));
        }

        self.uow.users().delete(id).await
    }
}
