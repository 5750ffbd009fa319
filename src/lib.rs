use axum::{Router, extract::FromRef, http::HeaderName, middleware};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Domain services.
pub mod meals;
pub mod restaurants;
pub mod session;

// Infrastructure and shared plumbing.
pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod geocoder;
pub mod handlers;
pub mod models;
pub mod pagination;
pub mod password;
pub mod repository;
pub mod storage;

// Public and authenticated route tables.
pub mod routes;
use routes::{authenticated, public};

// --- Public Re-exports ---

pub use auth::{AuthUser, TokenSigner};
pub use config::{AppConfig, Env};
pub use error::{AppError, AppResult};
pub use geocoder::{GeocoderState, HttpGeocoder, MockGeocoder};
pub use meals::MealService;
pub use repository::{InMemoryRepository, PostgresRepository, RepositoryState};
pub use restaurants::RestaurantService;
pub use session::SessionIssuer;
pub use storage::{MockStorageService, S3StorageClient, StorageState};

/// ApiDoc
///
/// OpenAPI document for every routed handler, served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::sign_up, handlers::login,
        handlers::get_restaurants, handlers::get_restaurant, handlers::create_restaurant,
        handlers::update_restaurant, handlers::delete_restaurant, handlers::upload_images,
        handlers::get_meals, handlers::get_meals_by_restaurant, handlers::get_meal,
        handlers::create_meal, handlers::update_meal, handlers::delete_meal
    ),
    components(
        schemas(
            models::Role, models::Category, models::MealCategory,
            models::ImageRef, models::Location, models::Restaurant, models::Meal,
            models::SignUpRequest, models::LoginRequest, models::TokenResponse,
            models::CreateRestaurantRequest, models::UpdateRestaurantRequest,
            models::CreateMealRequest, models::UpdateMealRequest, models::DeleteResponse,
            handlers::ImageUploadForm,
        )
    ),
    tags(
        (name = "restaurant-api", description = "Restaurant directory API")
    )
)]
struct ApiDoc;

/// AppState
///
/// Shared, cloneable container for the backends and configuration. Services are
/// cheap views over it and are built per request.
#[derive(Clone)]
pub struct AppState {
    /// Persistence for users, restaurants and meals.
    pub repo: RepositoryState,
    /// Object storage for restaurant images.
    pub storage: StorageState,
    /// Address to coordinates lookup.
    pub geocoder: GeocoderState,
    pub config: AppConfig,
}

impl AppState {
    pub fn sessions(&self) -> SessionIssuer {
        SessionIssuer::from_ref(self)
    }

    pub fn restaurants(&self) -> RestaurantService {
        RestaurantService::new(
            self.repo.clone(),
            self.storage.clone(),
            self.geocoder.clone(),
        )
    }

    pub fn meals(&self) -> MealService {
        MealService::new(self.repo.clone())
    }
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for StorageState {
    fn from_ref(app_state: &AppState) -> StorageState {
        app_state.storage.clone()
    }
}

impl FromRef<AppState> for GeocoderState {
    fn from_ref(app_state: &AppState) -> GeocoderState {
        app_state.geocoder.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

// Lets the `AuthUser` extractor verify tokens straight from the shared state.
impl FromRef<AppState> for SessionIssuer {
    fn from_ref(app_state: &AppState) -> SessionIssuer {
        SessionIssuer::new(
            app_state.repo.clone(),
            TokenSigner::from_config(&app_state.config),
        )
    }
}

/// create_router
///
/// Assembles the routing tree, the authentication chain and the observability
/// layers, then binds the state.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        // Every authenticated route resolves the caller first; role checks are
        // attached per route inside this layer.
        .merge(
            authenticated::authenticated_routes(state.config.max_upload_bytes).route_layer(
                middleware::from_fn_with_state(state.clone(), auth::authenticate),
            ),
        )
        .with_state(state);

    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Span per request carrying method, uri and the `x-request-id` so every log line
/// of one request can be correlated.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
