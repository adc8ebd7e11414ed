//! Authentication and account management flows.

mod common;

use std::sync::Arc;

use epicrm::config::Config;
use epicrm::domain::Role;
use epicrm::errors::AppError;
use epicrm::services::{AuthService, Authenticator, UserManager, UserService, UserUpdate};

use common::{actor_for, World};

#[tokio::test]
async fn login_and_refresh_round_trip() {
    let world = World::new();
    let user = world.add_user_with_password("alice.sales", Role::Sales, "Sup3rSecret!");

    let auth = Authenticator::new(Arc::new(world.clone()), Config::for_tests());

    let pair = auth
        .login("alice.sales".to_string(), "Sup3rSecret!".to_string())
        .await
        .unwrap();
    assert_eq!(pair.token_type, "Bearer");

    let claims = auth.verify_token(&pair.access_token).unwrap();
    assert_eq!(claims.sub, user.id);
    assert_eq!(claims.role, "SALES");
    assert_eq!(claims.kind, "access");

    let refreshed = auth.refresh(pair.refresh_token).await.unwrap();
    let claims = auth.verify_token(&refreshed.access_token).unwrap();
    assert_eq!(claims.kind, "access");
    assert_eq!(claims.sub, user.id);
}

#[tokio::test]
async fn access_token_cannot_be_used_as_refresh_token() {
    let world = World::new();
    world.add_user_with_password("alice.sales", Role::Sales, "Sup3rSecret!");

    let auth = Authenticator::new(Arc::new(world.clone()), Config::for_tests());

    let pair = auth
        .login("alice.sales".to_string(), "Sup3rSecret!".to_string())
        .await
        .unwrap();

    let result = auth.refresh(pair.access_token).await;
    assert!(matches!(result, Err(AppError::Unauthorized)));
}

#[tokio::test]
async fn bad_credentials_are_indistinguishable() {
    let world = World::new();
    world.add_user_with_password("alice.sales", Role::Sales, "Sup3rSecret!");

    let auth = Authenticator::new(Arc::new(world.clone()), Config::for_tests());

    let wrong_password = auth
        .login("alice.sales".to_string(), "nope".to_string())
        .await;
    let unknown_user = auth
        .login("ghost".to_string(), "Sup3rSecret!".to_string())
        .await;
    assert!(matches!(wrong_password, Err(AppError::InvalidCredentials)));
    assert!(matches!(unknown_user, Err(AppError::InvalidCredentials)));
}

#[tokio::test]
async fn only_management_provisions_accounts() {
    let world = World::new();
    let rep = world.add_user("alice.sales", Role::Sales);
    let boss = world.add_user("claire.management", Role::Management);

    let users = UserManager::new(Arc::new(world.clone()));

    let result = users
        .create_user(
            actor_for(&rep),
            "new.guy".to_string(),
            "new.guy@example.com".to_string(),
            "Password123!".to_string(),
            Role::Support,
        )
        .await;
    assert!(matches!(result, Err(AppError::Forbidden(_))));

    let created = users
        .create_user(
            actor_for(&boss),
            "new.guy".to_string(),
            "new.guy@example.com".to_string(),
            "Password123!".to_string(),
            Role::Support,
        )
        .await
        .unwrap();
    assert_eq!(created.role, Role::Support);

    // Usernames are unique.
    let result = users
        .create_user(
            actor_for(&boss),
            "new.guy".to_string(),
            "other@example.com".to_string(),
            "Password123!".to_string(),
            Role::Support,
        )
        .await;
    assert!(matches!(result, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn collaborators_edit_themselves_but_not_their_role() {
    let world = World::new();
    let rep = world.add_user("alice.sales", Role::Sales);

    let users = UserManager::new(Arc::new(world.clone()));

    let updated = users
        .update_user(
            actor_for(&rep),
            rep.id,
            UserUpdate {
                email: Some("alice.new@example.com".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.email, "alice.new@example.com");

    // Echoing the current role back is not a change.
    let same_role = users
        .update_user(
            actor_for(&rep),
            rep.id,
            UserUpdate {
                role: Some(Role::Sales),
                ..Default::default()
            },
        )
        .await;
    assert!(same_role.is_ok());

    let escalation = users
        .update_user(
            actor_for(&rep),
            rep.id,
            UserUpdate {
                role: Some(Role::Management),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(escalation, Err(AppError::Forbidden(_))));
}

#[tokio::test]
async fn management_deletes_accounts_but_never_their_own() {
    let world = World::new();
    let rep = world.add_user("alice.sales", Role::Sales);
    let boss = world.add_user("claire.management", Role::Management);

    let users = UserManager::new(Arc::new(world.clone()));

    let result = users.delete_user(actor_for(&boss), boss.id).await;
    assert!(matches!(result, Err(AppError::Forbidden(_))));

    users.delete_user(actor_for(&boss), rep.id).await.unwrap();
    let result = users.get_user(actor_for(&boss), rep.id).await;
    assert!(matches!(result, Err(AppError::NotFound)));
}

#[tokio::test]
async fn password_changes_take_effect_at_the_next_login() {
    let world = World::new();
    let rep = world.add_user_with_password("alice.sales", Role::Sales, "OldSecret123!");

    let users = UserManager::new(Arc::new(world.clone()));
    let auth = Authenticator::new(Arc::new(world.clone()), Config::for_tests());

    users
        .update_user(
            actor_for(&rep),
            rep.id,
            UserUpdate {
                password: Some("NewSecret123!".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let stale = auth
        .login("alice.sales".to_string(), "OldSecret123!".to_string())
        .await;
    assert!(matches!(stale, Err(AppError::InvalidCredentials)));

    auth.login("alice.sales".to_string(), "NewSecret123!".to_string())
        .await
        .unwrap();
}
