use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};

// --- Enumerations (stored as TEXT columns) ---

/// Role
///
/// The RBAC field attached to every user. New accounts always start as `User`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Role {
    #[default]
    User,
    Admin,
}

/// Category
///
/// Restaurant category. The wire names are the human-readable labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub enum Category {
    #[default]
    #[serde(rename = "Fast Food")]
    FastFood,
    #[serde(rename = "Cafe")]
    Cafe,
    // Older clients send the misspelled label.
    #[serde(rename = "Fine Dining", alias = "Fine Dinning")]
    FineDining,
}

/// MealCategory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub enum MealCategory {
    #[default]
    Soups,
    Salads,
    Sandwiches,
    Pasta,
}

/// Implements `as_str`, `Display` and `FromStr` for an enum persisted as text.
macro_rules! text_enum {
    ($ty:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $ty {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    other => Err(format!("unknown {} '{}'", stringify!($ty), other)),
                }
            }
        }
    };
}

text_enum!(Role { User => "user", Admin => "admin" });
text_enum!(Category { FastFood => "Fast Food", Cafe => "Cafe", FineDining => "Fine Dining" });
text_enum!(MealCategory {
    Soups => "Soups",
    Salads => "Salads",
    Sandwiches => "Sandwiches",
    Pasta => "Pasta",
});

// --- Core Application Schemas ---

/// User
///
/// Public view of an account. The password hash never leaves the repository
/// except through `UserCredentials`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default, PartialEq)]
#[ts(export)]
pub struct User {
    pub id: Uuid,
    // Unique, stored lower-cased.
    pub email: String,
    pub name: String,
    pub role: Role,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

/// UserCredentials
///
/// A user together with the stored Argon2 PHC hash. Only used by login.
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user: User,
    pub password_hash: String,
}

/// NewUser
///
/// Insert payload for the credential store.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub role: Role,
}

/// ImageRef
///
/// Handle to an object in the image bucket. Owned by its restaurant.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default, PartialEq, Eq)]
#[ts(export)]
pub struct ImageRef {
    pub bucket: String,
    pub key: String,
    pub url: String,
}

/// Location
///
/// GeoJSON-style point derived from the restaurant address.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Location {
    /// Always `"Point"`.
    #[serde(rename = "type")]
    pub kind: String,
    /// `[longitude, latitude]`
    pub coordinates: Vec<f64>,
    pub formatted_address: String,
    pub city: String,
    pub state: String,
    pub zipcode: String,
    pub country: String,
}

/// Restaurant
///
/// A directory entry. `user` is the owner and is never reassigned; `menu` holds
/// the ids of the meals that point back at this restaurant.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Restaurant {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub email: String,
    pub phone_no: i64,
    pub address: String,
    pub category: Category,
    pub images: Vec<ImageRef>,
    pub location: Option<Location>,
    pub menu: Vec<Uuid>,
    pub user: Uuid,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

/// Meal
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Meal {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category: MealCategory,
    /// The owning restaurant.
    pub restaurant: Uuid,
    /// The user who created the meal.
    pub user: Uuid,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

// --- Request Payloads (Input Schemas) ---

/// SignUpRequest
///
/// Input payload for `POST /auth/signup`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate, Default)]
#[ts(export)]
pub struct SignUpRequest {
    #[validate(email(message = "Please enter a correct email address"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters long"))]
    pub password: String,
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
}

/// LoginRequest
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate, Default)]
#[ts(export)]
pub struct LoginRequest {
    #[validate(email(message = "Please enter a correct email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// TokenResponse
///
/// The bearer token handed out by signup and login.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct TokenResponse {
    pub token: String,
}

/// CreateRestaurantRequest
///
/// Input payload for `POST /restaurants`. The owner always comes from the
/// session, never from the body.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CreateRestaurantRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
    #[validate(email(message = "Please enter a correct email address"))]
    pub email: String,
    pub phone_no: i64,
    #[validate(length(min = 1, message = "Address is required"))]
    pub address: String,
    pub category: Category,
}

/// UpdateRestaurantRequest
///
/// Partial update payload for `PUT /restaurants/{id}`. Images are managed by the
/// upload endpoint and cannot be set here.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct UpdateRestaurantRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "Name cannot be empty"))]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(email(message = "Please enter a correct email address"))]
    pub email: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_no: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "Address cannot be empty"))]
    pub address: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
}

/// CreateMealRequest
///
/// `restaurant` is taken as a raw string so a malformed id surfaces as 400.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate, Default)]
#[ts(export)]
pub struct CreateMealRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
    #[validate(range(min = 0.0, message = "Price cannot be negative"))]
    pub price: f64,
    pub category: MealCategory,
    pub restaurant: String,
}

/// UpdateMealRequest
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate, Default)]
#[ts(export)]
pub struct UpdateMealRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "Name cannot be empty"))]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0.0, message = "Price cannot be negative"))]
    pub price: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<MealCategory>,
}

/// DeleteResponse
///
/// `deleted: false` is a normal outcome (e.g. the image cleanup was refused),
/// not an error.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, TS, ToSchema, Default, PartialEq, Eq)]
#[ts(export)]
pub struct DeleteResponse {
    pub deleted: bool,
}

/// UploadFile
///
/// One file received from a multipart upload, before it reaches object storage.
#[derive(Debug, Clone, Default)]
pub struct UploadFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// parse_id
///
/// Parses a path or body identifier. Anything that is not a UUID is a client error.
pub fn parse_id(raw: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| AppError::BadRequest("Invalid id, please provide a correct id.".to_string()))
}
