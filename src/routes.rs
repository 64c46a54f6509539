use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::http::header::{ACCEPT_LANGUAGE, AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderValue, Method};
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::config::SecurityConfig;
use crate::handlers::{elevated, protected, public};
use crate::middleware::{jwt_auth_middleware, locale_middleware, require_admin, validate_user_middleware};
use crate::portal::models::{Application, Broker, Client, Lender};
use crate::state::AppState;

/// Multipart framing on top of the file itself.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Build the full application router.
///
/// Locale resolution wraps the whole router rather than each route because it
/// may rewrite the request path (`/ca/api/site/locale` → `/api/site/locale`),
/// which has to happen before routing.
pub fn app(state: AppState) -> Router {
    let routes = Router::new()
        .merge(public_routes())
        .merge(portal_routes(&state))
        .merge(admin_routes(&state))
        .with_state(state.clone());

    Router::new()
        .fallback_service(routes)
        .layer(from_fn_with_state(state.clone(), locale_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&state.config.security))
}

fn public_routes() -> Router<AppState> {
    use public::{site, status};

    Router::new()
        .route("/", get(status::root))
        .route("/health", get(status::health))
        .route("/api/site/locale", get(site::locale))
        .route("/api/site/links", get(site::links))
        .route("/api/site/calculators/mortgage", get(site::mortgage))
        .route("/api/site/calculators/affordability", get(site::affordability_estimate))
        .route("/api/site/icons/:name", get(site::icon))
}

fn portal_routes(state: &AppState) -> Router<AppState> {
    use protected::{applications, documents, me, records};

    let upload_limit = state.config.storage.max_upload_bytes + MULTIPART_OVERHEAD_BYTES;

    Router::new()
        .route("/api/portal/me", get(me::show))
        // Clients
        .route(
            "/api/portal/clients",
            get(records::list::<Client>).post(records::create::<Client>),
        )
        .route(
            "/api/portal/clients/:id",
            get(records::show::<Client>).put(records::update::<Client>),
        )
        // Applications
        .route(
            "/api/portal/applications",
            get(records::list::<Application>).post(records::create::<Application>),
        )
        .route(
            "/api/portal/applications/:id",
            get(applications::show).put(records::update::<Application>),
        )
        .route(
            "/api/portal/applications/:id/documents",
            get(documents::list)
                .post(documents::upload)
                .layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route(
            "/api/portal/applications/:id/documents/:doc_id",
            get(documents::download).delete(documents::delete),
        )
        // Lenders
        .route(
            "/api/portal/lenders",
            get(records::list::<Lender>).post(records::create::<Lender>),
        )
        .route(
            "/api/portal/lenders/:id",
            get(records::show::<Lender>).put(records::update::<Lender>),
        )
        .route_layer(from_fn_with_state(state.clone(), validate_user_middleware))
        .route_layer(from_fn_with_state(state.clone(), jwt_auth_middleware))
}

fn admin_routes(state: &AppState) -> Router<AppState> {
    use elevated::brokers;
    use protected::records;

    Router::new()
        .route(
            "/api/admin/brokers",
            get(records::list::<Broker>).post(brokers::create),
        )
        .route(
            "/api/admin/brokers/:id",
            get(records::show::<Broker>).put(records::update::<Broker>),
        )
        .route("/api/admin/brokers/:id/deactivate", post(brokers::deactivate))
        .route("/api/admin/brokers/:id/reactivate", post(brokers::reactivate))
        .route_layer(from_fn(require_admin))
        .route_layer(from_fn_with_state(state.clone(), validate_user_middleware))
        .route_layer(from_fn_with_state(state.clone(), jwt_auth_middleware))
}

/// CORS for the configured site origins. Origins that fail to parse are
/// skipped with a warning.
pub fn cors_layer(config: &SecurityConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Ignoring invalid CORS origin '{}': {}", origin, e);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION, ACCEPT_LANGUAGE])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600))
}
