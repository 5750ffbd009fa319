mod common;

use axum::{
    extract::FromRequestParts,
    http::{Request, header::AUTHORIZATION},
};
use common::{seed_user, test_state};
use restaurant_api::{
    AppError, AppState, AuthUser, TokenSigner,
    models::{LoginRequest, Role, SignUpRequest},
    repository::Repository,
};
use uuid::Uuid;

// --- Helpers ---

async fn extract(state: &AppState, authorization: Option<&str>) -> Result<AuthUser, AppError> {
    let mut builder = Request::builder().uri("/restaurants");
    if let Some(value) = authorization {
        builder = builder.header(AUTHORIZATION, value);
    }
    let (mut parts, _) = builder.body(()).unwrap().into_parts();
    AuthUser::from_request_parts(&mut parts, state).await
}

fn signer(state: &AppState) -> TokenSigner {
    TokenSigner::from_config(&state.config)
}

fn assert_unauthorized(result: Result<AuthUser, AppError>) {
    match result {
        Err(AppError::Unauthorized(_)) => {}
        other => panic!("expected Unauthorized, got {:?}", other),
    }
}

// --- Extractor ---

#[tokio::test]
async fn test_valid_token_resolves_identity_and_role() {
    let (state, _) = test_state();
    let admin = seed_user(&state, "admin@example.com", Role::Admin).await;
    let token = signer(&state).issue(admin.id).unwrap();

    let user = extract(&state, Some(&format!("Bearer {token}"))).await.unwrap();

    assert_eq!(user, admin);
    assert_eq!(user.role, Role::Admin);
}

#[tokio::test]
async fn test_missing_header_is_unauthorized() {
    let (state, _) = test_state();
    assert_unauthorized(extract(&state, None).await);
}

#[tokio::test]
async fn test_non_bearer_scheme_is_unauthorized() {
    let (state, _) = test_state();
    let user = seed_user(&state, "a@example.com", Role::User).await;
    let token = signer(&state).issue(user.id).unwrap();

    assert_unauthorized(extract(&state, Some(&format!("Basic {token}"))).await);
    assert_unauthorized(extract(&state, Some("Bearer ")).await);
}

#[tokio::test]
async fn test_garbage_token_is_unauthorized() {
    let (state, _) = test_state();
    assert_unauthorized(extract(&state, Some("Bearer not.a.jwt")).await);
}

#[tokio::test]
async fn test_token_signed_with_other_secret_is_unauthorized() {
    let (state, _) = test_state();
    let user = seed_user(&state, "a@example.com", Role::User).await;
    let forged = TokenSigner::new("some-other-secret", 1).issue(user.id).unwrap();

    assert_unauthorized(extract(&state, Some(&format!("Bearer {forged}"))).await);
}

#[tokio::test]
async fn test_expired_token_is_unauthorized() {
    let (state, _) = test_state();
    let user = seed_user(&state, "a@example.com", Role::User).await;
    let expired = TokenSigner::new(&state.config.jwt_secret, -2)
        .issue(user.id)
        .unwrap();

    match extract(&state, Some(&format!("Bearer {expired}"))).await {
        Err(AppError::Unauthorized(msg)) => assert!(msg.contains("expired")),
        other => panic!("expected expiry rejection, got {:?}", other),
    }
}

#[tokio::test]
async fn test_token_for_unknown_user_is_unauthorized() {
    let (state, _) = test_state();
    let token = signer(&state).issue(Uuid::new_v4()).unwrap();

    assert_unauthorized(extract(&state, Some(&format!("Bearer {token}"))).await);
}

#[tokio::test]
async fn test_identity_from_extensions_is_reused() {
    let (state, _) = test_state();
    let resolved = AuthUser {
        id: Uuid::new_v4(),
        role: Role::User,
    };
    let (mut parts, _) = Request::builder()
        .uri("/meals")
        .body(())
        .unwrap()
        .into_parts();
    parts.extensions.insert(resolved.clone());

    let user = AuthUser::from_request_parts(&mut parts, &state).await.unwrap();
    assert_eq!(user, resolved);
}

// --- Sessions ---

#[tokio::test]
async fn test_sign_up_token_authenticates_as_plain_user() {
    let (state, _) = test_state();
    let token = state
        .sessions()
        .sign_up(SignUpRequest {
            email: "New@Example.com".to_string(),
            password: "secret123".to_string(),
            name: "New".to_string(),
        })
        .await
        .unwrap();

    let user = extract(&state, Some(&format!("Bearer {token}"))).await.unwrap();
    assert_eq!(user.role, Role::User);
}

#[tokio::test]
async fn test_duplicate_email_is_conflict() {
    let (state, _) = test_state();
    seed_user(&state, "taken@example.com", Role::User).await;

    let result = state
        .sessions()
        .sign_up(SignUpRequest {
            email: "TAKEN@example.com".to_string(),
            password: "secret123".to_string(),
            name: "Again".to_string(),
        })
        .await;

    assert!(matches!(result, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn test_sign_up_rejects_short_password() {
    let (state, _) = test_state();
    let result = state
        .sessions()
        .sign_up(SignUpRequest {
            email: "short@example.com".to_string(),
            password: "123".to_string(),
            name: "Short".to_string(),
        })
        .await;

    assert!(matches!(result, Err(AppError::BadRequest(msg)) if msg.contains("6 characters")));
}

#[tokio::test]
async fn test_sign_up_rejects_whitespace_only_name() {
    let (state, _) = test_state();
    let result = state
        .sessions()
        .sign_up(SignUpRequest {
            email: "blank@example.com".to_string(),
            password: "secret123".to_string(),
            name: "   ".to_string(),
        })
        .await;

    assert!(matches!(result, Err(AppError::BadRequest(msg)) if msg == "Name is required"));
    assert!(
        state
            .repo
            .find_credentials_by_email("blank@example.com")
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let (state, _) = test_state();
    seed_user(&state, "a@example.com", Role::User).await;

    let wrong_password = state
        .sessions()
        .login(LoginRequest {
            email: "a@example.com".to_string(),
            password: "wrong-password".to_string(),
        })
        .await;
    let unknown_email = state
        .sessions()
        .login(LoginRequest {
            email: "nobody@example.com".to_string(),
            password: common::PASSWORD.to_string(),
        })
        .await;

    match (wrong_password, unknown_email) {
        (Err(AppError::Unauthorized(a)), Err(AppError::Unauthorized(b))) => assert_eq!(a, b),
        other => panic!("expected two Unauthorized errors, got {:?}", other),
    }
}

#[tokio::test]
async fn test_login_is_case_insensitive_on_email() {
    let (state, _) = test_state();
    let seeded = seed_user(&state, "a@example.com", Role::User).await;

    let token = state
        .sessions()
        .login(LoginRequest {
            email: "A@Example.COM".to_string(),
            password: common::PASSWORD.to_string(),
        })
        .await
        .unwrap();

    let claims = signer(&state).decode(&token).unwrap();
    assert_eq!(claims.sub, seeded.id);
}
