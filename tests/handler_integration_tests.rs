mod common;

use axum::{
    body::to_bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use common::{meal_request, restaurant_request, seed_restaurant, seed_user, test_state};
use restaurant_api::{
    AppError,
    extract::Json,
    handlers::{self, RestaurantQuery},
    models::{LoginRequest, Role, SignUpRequest, UpdateMealRequest},
};
use serde_json::Value;

async fn error_body(err: AppError) -> (StatusCode, Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_sign_up_handler_returns_created_token() {
    let (state, _) = test_state();

    let (status, Json(token)) = handlers::sign_up(
        State(state.clone()),
        Json(SignUpRequest {
            email: "new@example.com".to_string(),
            password: "secret123".to_string(),
            name: "New".to_string(),
        }),
    )
    .await
    .unwrap();

    assert_eq!(status, StatusCode::CREATED);
    assert!(!token.token.is_empty());

    let Json(login) = handlers::login(
        State(state),
        Json(LoginRequest {
            email: "new@example.com".to_string(),
            password: "secret123".to_string(),
        }),
    )
    .await
    .unwrap();
    assert!(!login.token.is_empty());
}

#[tokio::test]
async fn test_get_restaurants_defaults_to_first_page() {
    let (state, _) = test_state();
    let owner = seed_user(&state, "owner@example.com", Role::User).await;
    for name in ["One", "Two", "Three"] {
        seed_restaurant(&state, &owner, name).await;
    }

    let Json(page) = handlers::get_restaurants(State(state), Query(RestaurantQuery::default()))
        .await
        .unwrap();

    assert_eq!(page.len(), 2);
    assert_eq!(page[0].name, "One");
}

#[tokio::test]
async fn test_create_restaurant_handler_returns_created() {
    let (state, _) = test_state();
    let owner = seed_user(&state, "owner@example.com", Role::User).await;

    let (status, Json(restaurant)) = handlers::create_restaurant(
        owner.clone(),
        State(state),
        Json(restaurant_request("Handler Cafe")),
    )
    .await
    .unwrap();

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(restaurant.user, owner.id);
}

#[tokio::test]
async fn test_get_restaurant_not_found_response() {
    let (state, _) = test_state();

    let err = handlers::get_restaurant(State(state), Path(uuid::Uuid::new_v4().to_string()))
        .await
        .unwrap_err();
    let (status, body) = error_body(err).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Restaurant not found.");
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_delete_restaurant_by_non_owner_is_forbidden() {
    let (state, _) = test_state();
    let owner = seed_user(&state, "owner@example.com", Role::User).await;
    let other = seed_user(&state, "other@example.com", Role::User).await;
    let restaurant = seed_restaurant(&state, &owner, "Mine").await;

    let err = handlers::delete_restaurant(other, State(state), Path(restaurant.id.to_string()))
        .await
        .unwrap_err();

    assert_eq!(err.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_meal_handlers_round_trip() {
    let (state, _) = test_state();
    let owner = seed_user(&state, "owner@example.com", Role::User).await;
    let restaurant = seed_restaurant(&state, &owner, "Soup Spot").await;

    let (status, Json(meal)) = handlers::create_meal(
        owner.clone(),
        State(state.clone()),
        Json(meal_request(restaurant.id)),
    )
    .await
    .unwrap();
    assert_eq!(status, StatusCode::CREATED);

    let Json(updated) = handlers::update_meal(
        owner.clone(),
        State(state.clone()),
        Path(meal.id.to_string()),
        Json(UpdateMealRequest {
            name: Some("Lentil Soup".to_string()),
            ..Default::default()
        }),
    )
    .await
    .unwrap();
    assert_eq!(updated.name, "Lentil Soup");

    let Json(found) = handlers::get_meal(State(state.clone()), Path(meal.id.to_string()))
        .await
        .unwrap();
    assert_eq!(found.name, "Lentil Soup");

    let Json(outcome) =
        handlers::delete_meal(owner, State(state.clone()), Path(meal.id.to_string()))
            .await
            .unwrap();
    assert!(outcome.deleted);

    let Json(all) = handlers::get_meals(State(state)).await.unwrap();
    assert!(all.is_empty());
}

#[tokio::test]
async fn test_internal_errors_are_sanitized() {
    let (status, body) = error_body(AppError::Storage("bucket exploded".to_string())).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "An internal error occurred");
    assert_eq!(body["code"], "STORAGE_ERROR");
}
