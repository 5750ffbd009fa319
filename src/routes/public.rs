use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Read-only catalogue access plus the two gateway endpoints that issue tokens.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness probe for load balancers.
        .route("/health", get(|| async { "ok" }))
        // POST /auth/signup
        // New account with the `user` role. Responds 201 with a token.
        .route("/auth/signup", post(handlers::sign_up))
        // GET|POST /auth/login
        // GET with a JSON body is kept for existing clients.
        .route("/auth/login", get(handlers::login).post(handlers::login))
        // GET /restaurants?keyword=...&page=...
        // Two restaurants per page, optional case-insensitive name search.
        .route("/restaurants", get(handlers::get_restaurants))
        // GET /restaurants/{id}
        .route("/restaurants/{id}", get(handlers::get_restaurant))
        // GET /meals
        .route("/meals", get(handlers::get_meals))
        // GET /meals/restaurant/{id}
        // The menu of one restaurant.
        .route(
            "/meals/restaurant/{id}",
            get(handlers::get_meals_by_restaurant),
        )
        // GET /meals/{id}
        .route("/meals/{id}", get(handlers::get_meal))
}
