pub mod auth;
pub mod dto;
pub mod middleware;
pub mod protocol;
pub mod rest;
pub mod state;
pub mod ws_handler;

pub use middleware::{require_admin, require_auth, require_clinician};
pub use ws_handler::ws_handler;

use crate::{config::ConfigError, error::ApiError};
use axum::{
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use rest::*;
use state::AppState;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Builds the complete application router: public auth routes, the
/// session-protected API with its admin and clinician sections, CORS, and
/// the Swagger UI.
pub fn router(app_state: Arc<AppState>) -> Result<Router, ApiError> {
    let origin = app_state
        .config
        .cors_origin
        .parse::<HeaderValue>()
        .map_err(|e| ConfigError::InvalidValue("CORS_ORIGIN".to_string(), e.to_string()))?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT]);

    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/auth/signup", post(auth::signup_handler))
        .route("/auth/login", post(auth::login_handler))
        .route("/auth/logout", post(auth::logout_handler));

    let admin_routes = Router::new()
        .route("/doctor-applications", get(list_applications_handler))
        .route(
            "/doctor-applications/{id}/decision",
            post(decide_application_handler),
        )
        .route("/admin/stats", get(admin_stats_handler))
        .route("/admin/accounts/{id}/role", put(assign_role_handler))
        .route_layer(axum_middleware::from_fn(require_admin));

    let clinician_routes = Router::new()
        .route(
            "/appointments/{id}/status",
            post(set_appointment_status_handler),
        )
        .route_layer(axum_middleware::from_fn(require_clinician));

    // Protected routes (auth required)
    let protected_routes = Router::new()
        .route("/me", get(me_handler))
        .route("/doctors", get(list_doctors_handler))
        .route("/doctors/specializations", get(list_specializations_handler))
        .route("/doctors/{id}", get(get_doctor_handler))
        .route("/doctors/{id}/slots", get(list_slots_handler))
        .route("/doctor-applications", post(submit_application_handler))
        .route(
            "/appointments",
            post(book_appointment_handler).get(list_appointments_handler),
        )
        .route("/notifications", get(list_notifications_handler))
        .route("/notifications/{id}/seen", post(mark_seen_handler))
        .route("/ws", get(ws_handler))
        .merge(admin_routes)
        .merge(clinician_routes)
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            require_auth,
        ));

    let api_router = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(cors)
        .with_state(app_state);

    // Merge the API router with the Swagger UI router for a complete application.
    Ok(Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi())))
}
