pub mod api;
pub mod client;
pub mod config;
pub mod infrastructure;
pub mod services;
pub mod utils;

use crate::config::AppConfig;
use crate::services::content_store::ContentStore;
use crate::services::staging::StagingArea;
use crate::services::upload_service::UploadService;
use axum::{
    Router,
    body::Body,
    http::{HeaderValue, Request, Response},
    middleware::from_fn,
    routing::{get, post},
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::classify::{ServerErrorsAsFailures, SharedClassifier};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{Span, info};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::handlers::health::root,
        api::handlers::health::health_check,
        api::handlers::mangas::upload_manga,
        api::handlers::mangas::list_chapter,
    ),
    components(
        schemas(
            api::handlers::health::HealthResponse,
            api::handlers::mangas::UploadForm,
            services::upload_service::UploadResponse,
            services::upload_service::MangaData,
        )
    ),
    tags(
        (name = "mangas", description = "Manga upload endpoints"),
        (name = "system", description = "Service status endpoints")
    )
)]
pub struct ApiDoc;

#[derive(Clone)]
pub struct AppState {
    pub staging: Arc<StagingArea>,
    pub upload_service: Arc<UploadService>,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn ContentStore>, staging: Arc<StagingArea>) -> Self {
        let upload_service = Arc::new(UploadService::new(store));
        Self {
            staging,
            upload_service,
            config,
        }
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| HeaderValue::from_str(o).ok())
        .collect();
    layer.allow_origin(origins)
}

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/", get(api::handlers::health::root))
        .route("/health", get(api::handlers::health::health_check))
        .route("/mangas/upload", post(api::handlers::mangas::upload_manga))
        .route(
            "/mangas/:title/:chapter",
            get(api::handlers::mangas::list_chapter),
        )
        .layer(cors_layer(&state.config.allowed_origins))
        .layer(axum::extract::DefaultBodyLimit::max(
            state.config.body_limit(),
        ))
        .layer(trace_layer())
        // Outermost so the trace span sees a minted id
        .layer(from_fn(api::middleware::request_id::request_id_middleware))
        .with_state(state)
}

fn trace_layer() -> TraceLayer<
    SharedClassifier<ServerErrorsAsFailures>,
    impl Fn(&Request<Body>) -> Span + Clone,
    impl Fn(&Request<Body>, &Span) + Clone,
    impl Fn(&Response<Body>, Duration, &Span) + Clone,
> {
    TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            let request_id = request
                .headers()
                .get(api::middleware::request_id::REQUEST_ID_HEADER)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("unknown");
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = %request_id,
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            info!("📥 {} {}", request.method(), request.uri());
        })
        .on_response(|response: &Response<Body>, latency: Duration, _span: &Span| {
            info!(
                "📤 Finished in {:?} with status {}",
                latency,
                response.status()
            );
        })
}
