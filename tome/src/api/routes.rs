use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use super::handlers;
use super::middleware::auth_middleware;
use super::AppState;

const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let documents = Router::new()
        .route("/", get(handlers::list_documents))
        .route(
            "/file",
            post(handlers::upload_document)
                .layer::<_, std::convert::Infallible>(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
                .layer(RequestBodyLimitLayer::new(MAX_UPLOAD_BYTES)),
        )
        .route("/url", post(handlers::ingest_url))
        .route(
            "/{documentId}",
            get(handlers::get_document).delete(handlers::delete_document),
        );

    let chat = Router::new()
        .route("/", get(handlers::get_transcript))
        .route("/query", post(handlers::chat_query))
        .route("/{exchangeId}/stats", get(handlers::exchange_stats));

    let public_routes = Router::new().route("/health", get(handlers::health));

    let protected_routes = Router::new()
        .nest("/documents", documents)
        .nest("/chat", chat)
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let v1 = Router::new().merge(public_routes).merge(protected_routes);

    Router::new()
        .nest("/api/v1", v1)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
