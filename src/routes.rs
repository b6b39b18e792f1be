use crate::{auth, handlers, middleware::add_security_headers, AppState};
use axum::{
    http::{header, HeaderValue},
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

pub fn create_router(state: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/magic-link", post(auth::request_magic_link_handler))
        .route("/verify", post(auth::verify_magic_link_handler))
        .route("/me", get(auth::me_handler));

    let report_routes = Router::new()
        .route("/reports", get(handlers::list_reports_handler))
        .route("/reports/", get(handlers::list_reports_handler));

    Router::new()
        .route("/", get(handlers::status_handler))
        .nest("/auth", auth_routes)
        .merge(report_routes)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            add_security_headers,
        ))
        .layer(cors_layer(&state.config.cors_allowed_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter(|origin| origin.as_str() != "*")
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    let allow_origin = if origins.is_empty() {
        AllowOrigin::from(Any)
    } else {
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
        .max_age(std::time::Duration::from_secs(3600))
}
