#![allow(dead_code)]

use restaurant_api::{
    AppConfig, AppState, AuthUser, InMemoryRepository, MockGeocoder, MockStorageService,
    geocoder::GeocoderState,
    models::{
        Category, CreateMealRequest, CreateRestaurantRequest, MealCategory, NewUser, Restaurant,
        Role, UploadFile,
    },
    password::hash_password,
    repository::{Repository, RepositoryState},
    storage::StorageState,
};
use std::sync::Arc;
use uuid::Uuid;

pub const PASSWORD: &str = "secret123";

/// State over the in-memory repository. The returned storage handle shares its
/// record of deleted keys with the one inside the state.
pub fn test_state() -> (AppState, MockStorageService) {
    state_with(MockStorageService::new(), MockGeocoder::new())
}

pub fn state_with(storage: MockStorageService, geocoder: MockGeocoder) -> (AppState, MockStorageService) {
    let state = AppState {
        repo: Arc::new(InMemoryRepository::new()) as RepositoryState,
        storage: Arc::new(storage.clone()) as StorageState,
        geocoder: Arc::new(geocoder) as GeocoderState,
        config: AppConfig::default(),
    };
    (state, storage)
}

pub async fn seed_user(state: &AppState, email: &str, role: Role) -> AuthUser {
    let user = state
        .repo
        .create_user(NewUser {
            email: email.to_string(),
            name: "Tester".to_string(),
            password_hash: hash_password(PASSWORD).unwrap(),
            role,
        })
        .await
        .unwrap();
    AuthUser {
        id: user.id,
        role: user.role,
    }
}

pub fn restaurant_request(name: &str) -> CreateRestaurantRequest {
    CreateRestaurantRequest {
        name: name.to_string(),
        description: "Family run".to_string(),
        email: "owner@example.com".to_string(),
        phone_no: 5_405_551_234,
        address: "1 Main St, Stafford, VA".to_string(),
        category: Category::Cafe,
    }
}

pub async fn seed_restaurant(state: &AppState, owner: &AuthUser, name: &str) -> Restaurant {
    state
        .restaurants()
        .create(restaurant_request(name), owner)
        .await
        .unwrap()
}

pub fn meal_request(restaurant: Uuid) -> CreateMealRequest {
    CreateMealRequest {
        name: "Tomato Soup".to_string(),
        description: "Hot".to_string(),
        price: 6.5,
        category: MealCategory::Soups,
        restaurant: restaurant.to_string(),
    }
}

pub fn image(name: &str) -> UploadFile {
    UploadFile {
        file_name: name.to_string(),
        content_type: "image/png".to_string(),
        bytes: vec![0x89, 0x50, 0x4e, 0x47],
    }
}
