use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{delete, get, post, put},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::config::Config;
use crate::state::SharedState;

mod admins;
pub mod audit;
pub mod auth;
mod error;
mod observability;
mod parties;
mod settings;
mod system;
mod types;
mod voters;
mod votes;

pub use error::ApiError;
pub use types::*;

use metrics_exporter_prometheus::PrometheusHandle;

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    pub start_time: std::time::Instant,

    pub prometheus_handle: Option<PrometheusHandle>,
}

pub fn create_app_state(
    shared: Arc<SharedState>,
    prometheus_handle: Option<PrometheusHandle>,
) -> Arc<AppState> {
    Arc::new(AppState {
        shared,
        start_time: std::time::Instant::now(),
        prometheus_handle,
    })
}

pub async fn create_app_state_from_config(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::new(config).await?);
    Ok(create_app_state(shared, prometheus_handle))
}

pub async fn router(state: Arc<AppState>) -> Router {
    let (cors_origins, secure_cookies, session_minutes) = {
        let config = state.shared.config.read().await;
        (
            config.server.cors_allowed_origins.clone(),
            config.server.secure_cookies,
            config.server.session_minutes,
        )
    };

    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(secure_cookies)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(
            session_minutes,
        )));

    let api_router = Router::new()
        .merge(admin_router())
        .merge(voter_router())
        .route("/admin/login", post(auth::admin_login))
        .route("/voter/login", post(auth::voter_login))
        .route("/logout", post(auth::logout))
        .route("/election/status", get(settings::get_status))
        .route("/parties", get(parties::list_parties))
        .layer(session_layer)
        .with_state(state);

    let cors_layer = if cors_origins.contains(&"*".to_string()) {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .nest("/api", api_router)
        .layer(middleware::from_fn(
            observability::security_headers_middleware,
        ))
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(observability::logging_middleware))
}

/// Routes requiring an admin session. Per-capability checks happen in the
/// services; the middleware only establishes who is asking.
fn admin_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/voters", post(voters::register_voter))
        .route("/results", get(votes::get_results))
        .route("/admins", get(admins::list_admins))
        .route("/admins", post(admins::create_admin))
        .route("/admins/{id}", delete(admins::delete_admin))
        .route("/parties/all", get(parties::list_all_parties))
        .route("/parties", post(parties::create_party))
        .route("/parties/{id}", put(parties::update_party))
        .route("/parties/{id}", delete(parties::delete_party))
        .route(
            "/parties/{id}/visibility",
            put(parties::set_party_visibility),
        )
        .route("/election/period", put(settings::set_election_period))
        .route("/election/period", delete(settings::clear_election_period))
        .route(
            "/registration/period",
            put(settings::set_registration_period),
        )
        .route(
            "/registration/period",
            delete(settings::clear_registration_period),
        )
        .route("/registration/flag", put(settings::set_registration_flag))
        .route("/audit", get(audit::query_audit))
        .route("/system/status", get(system::get_status))
        .route("/system/reset", post(system::reset_system))
        .route("/metrics", get(observability::get_metrics))
        .route_layer(middleware::from_fn(auth::admin_auth_middleware))
}

/// Routes requiring a voter session.
fn voter_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/vote", post(votes::cast_vote))
        .route("/vote/status", get(votes::vote_status))
        .route("/voter/password", post(auth::change_voter_password))
        .route_layer(middleware::from_fn(auth::voter_auth_middleware))
}
