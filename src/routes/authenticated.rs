use crate::{AppState, auth, handlers, models::Role};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{post, put},
};

/// Roles allowed to create restaurants and meals.
const WRITER_ROLES: &[Role] = &[Role::User, Role::Admin];

/// Authenticated Router Module
///
/// Every route here runs after `auth::authenticate` (applied by `create_router`),
/// so handlers always receive a resolved `AuthUser`. Update, delete and upload
/// are owner-only; the services enforce that against the stored record.
pub fn authenticated_routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::<AppState>::new()
        // POST /restaurants
        // The caller becomes the owner. Responds 201.
        .route(
            "/restaurants",
            post(handlers::create_restaurant).route_layer(middleware::from_fn_with_state(
                WRITER_ROLES,
                auth::require_roles,
            )),
        )
        // PUT/DELETE /restaurants/{id}
        // Delete removes the stored images first and aborts if that fails.
        .route(
            "/restaurants/{id}",
            put(handlers::update_restaurant).delete(handlers::delete_restaurant),
        )
        // PUT /restaurants/upload/{id}
        // Multipart `files` parts replace the image list.
        .route(
            "/restaurants/upload/{id}",
            put(handlers::upload_images).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        // POST /meals
        // Restaurant owner only. The meal id is appended to the menu.
        .route(
            "/meals",
            post(handlers::create_meal).route_layer(middleware::from_fn_with_state(
                WRITER_ROLES,
                auth::require_roles,
            )),
        )
        // PUT/DELETE /meals/{id}
        .route(
            "/meals/{id}",
            put(handlers::update_meal).delete(handlers::delete_meal),
        )
}
