use crate::{
    AppState,
    auth::AuthUser,
    error::{AppError, AppResult},
    extract::Json,
    models::{
        CreateMealRequest, CreateRestaurantRequest, DeleteResponse, LoginRequest, Meal,
        Restaurant, SignUpRequest, TokenResponse, UpdateMealRequest, UpdateRestaurantRequest,
        UploadFile,
    },
    pagination::PageRequest,
};
use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;

// --- Filter Structs ---

/// RestaurantQuery
///
/// Query parameters of `GET /restaurants`. `page` is kept as raw text so that a
/// non-numeric value falls back to page 1 instead of failing the request.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
pub struct RestaurantQuery {
    /// Case-insensitive substring of the restaurant name.
    pub keyword: Option<String>,
    /// 1-based page number; two restaurants per page.
    pub page: Option<String>,
}

/// ImageUploadForm
///
/// Documents the multipart body of `PUT /restaurants/upload/{id}`; the handler
/// reads the parts directly.
#[derive(utoipa::ToSchema)]
#[allow(dead_code)]
pub struct ImageUploadForm {
    /// One part per image.
    #[schema(value_type = Vec<String>, format = Binary)]
    files: Vec<Vec<u8>>,
}

// --- Auth Handlers ---

/// sign_up
///
/// [Public Route] Creates an account and returns its bearer token.
#[utoipa::path(
    post,
    path = "/auth/signup",
    request_body = SignUpRequest,
    responses(
        (status = 201, description = "Signed up", body = TokenResponse),
        (status = 400, description = "Invalid payload"),
        (status = 409, description = "Duplicate email")
    )
)]
pub async fn sign_up(
    State(state): State<AppState>,
    Json(payload): Json<SignUpRequest>,
) -> AppResult<(StatusCode, Json<TokenResponse>)> {
    let token = state.sessions().sign_up(payload).await?;
    Ok((StatusCode::CREATED, Json(TokenResponse { token })))
}

/// login
///
/// [Public Route] Exchanges email and password for a bearer token. Served on both
/// GET (with a JSON body, for older clients) and POST.
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = TokenResponse),
        (status = 401, description = "Invalid email address or password")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<TokenResponse>> {
    let token = state.sessions().login(payload).await?;
    Ok(Json(TokenResponse { token }))
}

// --- Restaurant Handlers ---

/// get_restaurants
///
/// [Public Route] Paged listing with optional keyword search.
#[utoipa::path(
    get,
    path = "/restaurants",
    params(RestaurantQuery),
    responses((status = 200, description = "One page of restaurants", body = [Restaurant]))
)]
pub async fn get_restaurants(
    State(state): State<AppState>,
    Query(query): Query<RestaurantQuery>,
) -> AppResult<Json<Vec<Restaurant>>> {
    let page = PageRequest::from_query(query.page.as_deref());
    let restaurants = state.restaurants().find_all(query.keyword, page).await?;
    Ok(Json(restaurants))
}

/// get_restaurant
///
/// [Public Route] A single restaurant.
#[utoipa::path(
    get,
    path = "/restaurants/{id}",
    params(("id" = String, Path, description = "Restaurant ID")),
    responses(
        (status = 200, description = "Found", body = Restaurant),
        (status = 400, description = "Malformed id"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_restaurant(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Restaurant>> {
    Ok(Json(state.restaurants().find_by_id(&id).await?))
}

/// create_restaurant
///
/// [Authenticated Route] The caller becomes the owner.
#[utoipa::path(
    post,
    path = "/restaurants",
    request_body = CreateRestaurantRequest,
    responses(
        (status = 201, description = "Created", body = Restaurant),
        (status = 401, description = "Not logged in"),
        (status = 403, description = "Role not allowed")
    )
)]
pub async fn create_restaurant(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateRestaurantRequest>,
) -> AppResult<(StatusCode, Json<Restaurant>)> {
    let restaurant = state.restaurants().create(payload, &user).await?;
    Ok((StatusCode::CREATED, Json(restaurant)))
}

/// update_restaurant
///
/// [Authenticated Route] Owner only.
#[utoipa::path(
    put,
    path = "/restaurants/{id}",
    params(("id" = String, Path, description = "Restaurant ID")),
    request_body = UpdateRestaurantRequest,
    responses(
        (status = 200, description = "Updated", body = Restaurant),
        (status = 403, description = "Not Owner"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update_restaurant(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateRestaurantRequest>,
) -> AppResult<Json<Restaurant>> {
    Ok(Json(state.restaurants().update(&id, payload, &user).await?))
}

/// delete_restaurant
///
/// [Authenticated Route] Owner only. `{deleted: false}` means the image cleanup
/// failed and nothing was removed.
#[utoipa::path(
    delete,
    path = "/restaurants/{id}",
    params(("id" = String, Path, description = "Restaurant ID")),
    responses(
        (status = 200, description = "Delete outcome", body = DeleteResponse),
        (status = 403, description = "Not Owner"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_restaurant(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<DeleteResponse>> {
    Ok(Json(state.restaurants().delete(&id, &user).await?))
}

/// upload_images
///
/// [Authenticated Route] Owner only. Multipart form; every part named `files` is
/// uploaded and the restaurant's image list is replaced by the result.
#[utoipa::path(
    put,
    path = "/restaurants/upload/{id}",
    params(("id" = String, Path, description = "Restaurant ID")),
    request_body(content = ImageUploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Images replaced", body = Restaurant),
        (status = 400, description = "No files"),
        (status = 403, description = "Not Owner")
    )
)]
pub async fn upload_images(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    mut multipart: Multipart,
) -> AppResult<Json<Restaurant>> {
    let mut files = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.body_text()))?
    {
        if field.name() != Some("files") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("image").to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;

        files.push(UploadFile {
            file_name,
            content_type,
            bytes: bytes.to_vec(),
        });
    }

    Ok(Json(
        state.restaurants().upload_images(&id, files, &user).await?,
    ))
}

// --- Meal Handlers ---

/// get_meals
///
/// [Public Route] Every meal.
#[utoipa::path(
    get,
    path = "/meals",
    responses((status = 200, description = "All meals", body = [Meal]))
)]
pub async fn get_meals(State(state): State<AppState>) -> AppResult<Json<Vec<Meal>>> {
    Ok(Json(state.meals().find_all().await?))
}

/// get_meals_by_restaurant
///
/// [Public Route] The meals of one restaurant.
#[utoipa::path(
    get,
    path = "/meals/restaurant/{id}",
    params(("id" = String, Path, description = "Restaurant ID")),
    responses(
        (status = 200, description = "Menu", body = [Meal]),
        (status = 400, description = "Malformed id")
    )
)]
pub async fn get_meals_by_restaurant(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Vec<Meal>>> {
    Ok(Json(state.meals().find_by_restaurant(&id).await?))
}

/// get_meal
#[utoipa::path(
    get,
    path = "/meals/{id}",
    params(("id" = String, Path, description = "Meal ID")),
    responses(
        (status = 200, description = "Found", body = Meal),
        (status = 400, description = "Malformed id"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_meal(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Meal>> {
    Ok(Json(state.meals().find_by_id(&id).await?))
}

/// create_meal
///
/// [Authenticated Route] Only the restaurant owner can add to its menu.
#[utoipa::path(
    post,
    path = "/meals",
    request_body = CreateMealRequest,
    responses(
        (status = 201, description = "Created", body = Meal),
        (status = 403, description = "Not the restaurant owner"),
        (status = 404, description = "Restaurant not found")
    )
)]
pub async fn create_meal(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateMealRequest>,
) -> AppResult<(StatusCode, Json<Meal>)> {
    let meal = state.meals().create(payload, &user).await?;
    Ok((StatusCode::CREATED, Json(meal)))
}

/// update_meal
#[utoipa::path(
    put,
    path = "/meals/{id}",
    params(("id" = String, Path, description = "Meal ID")),
    request_body = UpdateMealRequest,
    responses(
        (status = 200, description = "Updated", body = Meal),
        (status = 403, description = "Not Owner")
    )
)]
pub async fn update_meal(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateMealRequest>,
) -> AppResult<Json<Meal>> {
    Ok(Json(state.meals().update(&id, payload, &user).await?))
}

/// delete_meal
///
/// [Authenticated Route] Removes the meal and its entry in the restaurant menu.
#[utoipa::path(
    delete,
    path = "/meals/{id}",
    params(("id" = String, Path, description = "Meal ID")),
    responses(
        (status = 200, description = "Delete outcome", body = DeleteResponse),
        (status = 403, description = "Not Owner")
    )
)]
pub async fn delete_meal(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<DeleteResponse>> {
    Ok(Json(state.meals().delete(&id, &user).await?))
}
