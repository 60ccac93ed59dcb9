use std::sync::Arc;

use axum::{
    http::{HeaderValue, Method},
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

use crate::auth::JwtKeys;
use crate::config::SecurityConfig;
use crate::database::Store;
use crate::handlers::{protected, public};
use crate::middleware::jwt_auth_middleware;
use crate::services::{AuthService, MeasurementService, SeriesService};

/// Services shared by every request, all backed by the same injected store.
#[derive(Clone)]
pub struct AppState {
    pub auth: AuthService,
    pub series: SeriesService,
    pub measurements: MeasurementService,
    pub store: Arc<dyn Store>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, keys: JwtKeys, bcrypt_cost: u32) -> Self {
        Self {
            auth: AuthService::new(store.clone(), keys, bcrypt_cost),
            series: SeriesService::new(store.clone()),
            measurements: MeasurementService::new(store.clone()),
            store,
        }
    }

    pub fn from_config(store: Arc<dyn Store>, security: &SecurityConfig) -> Self {
        Self::new(store, JwtKeys::from_config(security), security.bcrypt_cost)
    }
}

/// Full application router.
pub fn app(state: AppState, security: &SecurityConfig) -> Router {
    let mut router = Router::new()
        .route("/", get(public::system::root))
        .route("/health", get(public::system::health))
        .merge(public_routes())
        .merge(protected_routes(state.clone()))
        .with_state(state);

    if security.enable_cors {
        router = router.layer(cors_layer(&security.cors_origins));
    }

    router.layer(TraceLayer::new_for_http())
}

fn public_routes() -> Router<AppState> {
    use public::{auth, measurements, series};

    Router::new()
        .route("/auth/login", post(auth::login_post))
        .route("/auth/register", post(auth::register_post))
        .route("/api/series", get(series::series_list))
        .route("/api/measurements", get(measurements::measurements_list))
}

fn protected_routes(state: AppState) -> Router<AppState> {
    use protected::{auth, measurements, series};

    Router::new()
        .route("/auth/change-password", put(auth::change_password_put))
        .route("/api/series", post(series::series_create))
        .route(
            "/api/series/:id",
            put(series::series_update).delete(series::series_delete),
        )
        .route("/api/measurements", post(measurements::measurement_create))
        .route(
            "/api/measurements/:id",
            put(measurements::measurement_update).delete(measurements::measurement_delete),
        )
        .route_layer(middleware::from_fn_with_state(state, jwt_auth_middleware))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any)
}
