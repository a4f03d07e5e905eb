//! 服务层测试：身份解析、登录与首次访问建档

use blog_service::{
    error::AppError,
    models::user::{RegisterUserRequest, UpdateUserRequest},
    repository::{RoleRepository, UserRepository},
    services::IdentityResolver,
};

mod common;
use common::{create_test_app_state, setup_test_app, ALICE_PASSWORD};

#[tokio::test]
async fn test_load_authorities() {
    let app = setup_test_app().await;
    let resolver = IdentityResolver::new(app.state.db.clone());

    let claims = resolver.load_authorities("alice").await.unwrap();

    assert_eq!(claims.username, "alice");
    let expected = ["CREATE", "PUBLISH", "READ", "ROLE_AUTHOR", "UPDATE"];
    assert_eq!(
        claims.authorities.iter().map(String::as_str).collect::<Vec<_>>(),
        expected
    );
}

#[tokio::test]
async fn test_load_authorities_unknown_user() {
    let state = create_test_app_state().await;
    let resolver = IdentityResolver::new(state.db.clone());

    assert!(matches!(
        resolver.load_authorities("nobody").await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_login_returns_authenticated_context() {
    let app = setup_test_app().await;

    let outcome = app.state.auth_service.login("alice", ALICE_PASSWORD).await.unwrap();

    let principal = outcome.context.principal().expect("authenticated");
    assert_eq!(principal.username, "alice");
    assert!(principal.has_role("AUTHOR"));
    assert!(principal.has_authority("PUBLISH"));
    assert_eq!(principal.authorities, outcome.claims.authorities);
}

#[tokio::test]
async fn test_status_checked_only_after_password() {
    let app = setup_test_app().await;
    let repo = UserRepository::new(app.state.db.clone());

    let mut alice = repo.find_by_id(app.alice_id).await.unwrap().unwrap();
    alice.account_not_locked = false;
    repo.update(alice).await.unwrap();

    assert!(matches!(
        app.state.auth_service.login("alice", "wrong-password").await,
        Err(AppError::InvalidCredentials)
    ));
    assert!(matches!(
        app.state.auth_service.login("alice", ALICE_PASSWORD).await,
        Err(AppError::AccountLocked)
    ));
}

#[tokio::test]
async fn test_register_or_get_default_is_idempotent() {
    let state = create_test_app_state().await;

    let first = state
        .auth_service
        .register_or_get_default("oauth-user", Some("OAuth User"))
        .await
        .unwrap();
    let second = state
        .auth_service
        .register_or_get_default("oauth-user", None)
        .await
        .unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(first.password_hash, second.password_hash);
    assert_eq!(second.display_name.as_deref(), Some("OAuth User"));
    assert!(first.enabled && first.account_not_locked);

    let user_role = RoleRepository::new(state.db.clone())
        .find_by_name("USER")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(first.role_ids.iter().copied().collect::<Vec<_>>(), vec![user_role.id]);
}

#[tokio::test]
async fn test_register_or_get_default_creates_missing_role() {
    let state = create_test_app_state().await;
    let roles = RoleRepository::new(state.db.clone());
    let user_role = roles.find_by_name("USER").await.unwrap().unwrap();
    roles.soft_delete(user_role.id).await.unwrap();

    let credential = state
        .auth_service
        .register_or_get_default("newcomer", None)
        .await
        .unwrap();

    let recreated = roles.find_by_name("USER").await.unwrap().unwrap();
    assert_ne!(recreated.id, user_role.id);
    assert!(credential.role_ids.contains(&recreated.id));
}

#[tokio::test]
async fn test_first_touch_account_cannot_login_with_guess() {
    let state = create_test_app_state().await;
    state
        .auth_service
        .register_or_get_default("oauth-user", None)
        .await
        .unwrap();

    assert!(matches!(
        state.auth_service.login("oauth-user", "").await,
        Err(AppError::InvalidCredentials)
    ));
}

#[tokio::test]
async fn test_register_author_requires_name() {
    let state = create_test_app_state().await;

    let result = state
        .user_service
        .register(
            RegisterUserRequest {
                username: "frank".to_string(),
                password: "frank-pass".to_string(),
                author_name: None,
                is_author: true,
                roles: vec!["AUTHOR".to_string()],
            },
            true,
        )
        .await;

    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn test_register_unknown_role() {
    let state = create_test_app_state().await;

    let result = state
        .user_service
        .register(
            RegisterUserRequest {
                username: "grace".to_string(),
                password: "grace-pass".to_string(),
                author_name: None,
                is_author: false,
                roles: vec!["WIZARD".to_string()],
            },
            false,
        )
        .await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_update_unlinks_author() {
    let app = setup_test_app().await;

    let updated = app
        .state
        .user_service
        .update(
            app.alice_id,
            UpdateUserRequest {
                is_author: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert!(updated.author_id.is_none());
    assert!(matches!(
        app.state.blog_service.get_author(app.alice_author_id).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_update_password() {
    let app = setup_test_app().await;

    app.state
        .user_service
        .update(
            app.bob_id,
            UpdateUserRequest {
                password: Some("new-bob-pass".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert!(app.state.auth_service.login("bob", "new-bob-pass").await.is_ok());
    assert!(matches!(
        app.state.auth_service.login("bob", common::BOB_PASSWORD).await,
        Err(AppError::InvalidCredentials)
    ));
}

#[tokio::test]
async fn test_rejected_update_leaves_user_untouched() {
    let app = setup_test_app().await;

    let result = app
        .state
        .user_service
        .update(
            app.carol_id,
            UpdateUserRequest {
                username: Some("caroline".to_string()),
                password: Some("caroline-pass".to_string()),
                roles: Some(vec!["AUTHOR".to_string()]),
                is_author: Some(true),
                author_name: None,
            },
        )
        .await;
    assert!(matches!(result, Err(AppError::Validation(_))));

    let stored = app.state.user_service.get(app.carol_id).await.unwrap();
    assert_eq!(stored.username, "carol");
    assert_eq!(stored.roles.iter().collect::<Vec<_>>(), vec!["USER"]);
    assert!(stored.author_id.is_none());
    assert!(app.state.auth_service.login("carol", common::CAROL_PASSWORD).await.is_ok());
}

#[tokio::test]
async fn test_author_link_requires_author_role() {
    let app = setup_test_app().await;

    let result = app
        .state
        .user_service
        .update(
            app.carol_id,
            UpdateUserRequest {
                username: Some("caroline".to_string()),
                is_author: Some(true),
                author_name: Some("Carol Writer".to_string()),
                ..Default::default()
            },
        )
        .await;

    assert!(matches!(result, Err(AppError::Validation(_))));
    let stored = app.state.user_service.get(app.carol_id).await.unwrap();
    assert_eq!(stored.username, "carol");
    assert!(stored.author_id.is_none());
}

#[tokio::test]
async fn test_public_register_author_needs_author_role() {
    let state = create_test_app_state().await;

    let result = state
        .user_service
        .register(
            RegisterUserRequest {
                username: "henry".to_string(),
                password: "henry-pass".to_string(),
                author_name: Some("Henry Writer".to_string()),
                is_author: true,
                roles: vec![],
            },
            false,
        )
        .await;

    assert!(matches!(result, Err(AppError::Validation(_))));
    let users = UserRepository::new(state.db.clone());
    assert!(users.find_by_username("henry").await.unwrap().is_none());

    let author = state
        .user_service
        .register(
            RegisterUserRequest {
                username: "henry".to_string(),
                password: "henry-pass".to_string(),
                author_name: Some("Henry Writer".to_string()),
                is_author: true,
                roles: vec!["AUTHOR".to_string()],
            },
            false,
        )
        .await
        .unwrap();
    assert!(author.author_id.is_some());
}

#[tokio::test]
async fn test_unknown_and_deleted_users_fail_alike() {
    let app = setup_test_app().await;
    app.state.user_service.soft_delete(app.bob_id).await.unwrap();

    for username in ["nobody", "bob"] {
        assert!(matches!(
            app.state.auth_service.login(username, common::BOB_PASSWORD).await,
            Err(AppError::InvalidCredentials)
        ));
    }
}
