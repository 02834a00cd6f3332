//! Application state and router assembly.

use std::sync::Arc;

use axum::http::{HeaderValue, Method, StatusCode};
use axum::middleware::from_fn;
use axum::routing::{get, post};
use axum::{extract::State, Json, Router};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::AppConfig;
use crate::handlers::{auth, customers, monitoring, pages, products};
use crate::middleware::{require_bm, require_marketing, require_session, route_guard};
use crate::session::{ProfileCache, SessionManager};
use crate::upstream::{HttpUpstream, UpstreamApi};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub upstream: Arc<dyn UpstreamApi>,
    pub sessions: Arc<SessionManager>,
}

impl AppState {
    /// Production wiring: a real HTTP client against the configured core
    /// API, with its 401 hook dropping the profile cache.
    pub fn from_config(config: AppConfig) -> Result<Self, url::ParseError> {
        let upstream = Arc::new(HttpUpstream::new(&config.upstream.base_url)?);
        let profiles = Arc::new(ProfileCache::new());

        let hook_profiles = profiles.clone();
        upstream.set_unauthorized_hook(move || {
            tracing::warn!("core API returned 401; dropping cached profiles");
            hook_profiles.clear();
        });

        Ok(Self::with_upstream(config, upstream, profiles))
    }

    /// Assemble state around any upstream implementation. Tests inject
    /// scripted upstreams through here.
    pub fn with_upstream(
        config: AppConfig,
        upstream: Arc<dyn UpstreamApi>,
        profiles: Arc<ProfileCache>,
    ) -> Self {
        let sessions = Arc::new(SessionManager::new(upstream.clone(), profiles));
        Self {
            config: Arc::new(config),
            upstream,
            sessions,
        }
    }
}

/// GET /health - liveness plus a reachability probe of the core API
async fn health(State(state): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    let upstream_ok = state.upstream.ping().await;
    let status = if upstream_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (
        status,
        Json(json!({
            "success": upstream_ok,
            "data": {
                "gateway": "ok",
                "core_api": if upstream_ok { "reachable" } else { "unreachable" },
                "checked_at": chrono::Utc::now().to_rfc3339(),
            }
        })),
    )
}

/// Build the full router.
pub fn app(state: AppState) -> Router {
    // Browser navigation, protected by the redirecting route guard
    let navigation = Router::new()
        .route("/", get(pages::home))
        .route("/login", get(pages::login_page))
        .route("/dashboard/marketing", get(pages::marketing_dashboard))
        .route(
            "/dashboard/marketing/inputnasabah",
            get(pages::prospect_form_page),
        )
        .route(
            "/dashboard/marketing/customer/:cif",
            get(pages::customer_page),
        )
        .route("/dashboard/manager", get(pages::manager_dashboard))
        .route(
            "/dashboard/manager/targetmarketing",
            get(pages::target_form_page),
        )
        .layer(from_fn(route_guard));

    // Session endpoints; login and logout work without an existing session
    let auth_api = Router::new()
        .route("/session", get(auth::session).route_layer(from_fn(require_session)))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout));

    let marketing_api = Router::new()
        .route("/customers", get(customers::list).post(customers::create))
        .route("/customers/me", get(customers::list_mine))
        .route("/customers/:cif", get(customers::detail))
        .route("/customers/:cif/status", post(customers::update_status))
        .route_layer(from_fn(require_marketing));

    let bm_api = Router::new()
        .route("/monitoring/assignments", get(monitoring::assignments))
        .route(
            "/monitoring/assignments/:nip",
            post(monitoring::save_assignment),
        )
        .route("/monitoring/target", get(monitoring::target_summary))
        .route(
            "/monitoring/product-performance",
            get(monitoring::product_performance),
        )
        .route_layer(from_fn(require_bm));

    // Everything role-scoped or profile-reading requires a session first
    let protected_api = Router::new()
        .nest("/marketing", marketing_api)
        .nest("/bm", bm_api)
        .route("/products", get(products::list))
        .route_layer(from_fn(require_session));

    let api = Router::new()
        .nest("/auth", auth_api)
        .merge(protected_api);

    let mut router = Router::new()
        .merge(navigation)
        .nest("/api", api)
        .route("/health", get(health));

    if state.config.security.enable_cors {
        router = router.layer(cors_layer(&state.config));
    }

    router
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([axum::http::header::CONTENT_TYPE])
        // Session cookies must travel on cross-origin dashboard calls
        .allow_credentials(true)
}
