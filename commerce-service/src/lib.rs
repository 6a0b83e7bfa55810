pub mod config;
pub mod dtos;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod startup;
pub mod utils;

use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method},
    middleware::{from_fn, from_fn_with_state},
    routing::{delete, get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use service_core::middleware::{
    request_id_middleware, security_headers_middleware, REQUEST_ID_HEADER,
};

use crate::config::CommerceConfig;
use crate::services::{MongoDb, PaymentGateway, SessionManager, TokenService};

#[derive(Clone)]
pub struct AppState {
    pub config: CommerceConfig,
    pub db: MongoDb,
    pub tokens: TokenService,
    pub sessions: SessionManager,
    pub gateway: Arc<dyn PaymentGateway>,
}

pub fn build_router(state: AppState) -> Router {
    // Everything behind the authorization middleware. Handlers receive the
    // principal via the CurrentUser extractor.
    let protected = Router::new()
        .route("/auth/logout", post(handlers::auth::logout))
        .route("/auth/delete", delete(handlers::auth::delete_account))
        .route(
            "/lists",
            get(handlers::lists::list_lists).post(handlers::lists::create_list),
        )
        .route(
            "/lists/:list_id",
            get(handlers::lists::get_list)
                .put(handlers::lists::update_list)
                .delete(handlers::lists::delete_list),
        )
        .route(
            "/lists/:list_id/product/:product_id",
            post(handlers::lists::add_product_to_list)
                .delete(handlers::lists::remove_product_from_list),
        )
        .route(
            "/orders",
            get(handlers::orders::list_orders).post(handlers::orders::create_order),
        )
        .route(
            "/settings",
            get(handlers::settings::get_settings).put(handlers::settings::update_settings),
        )
        .layer(from_fn_with_state(
            state.clone(),
            middleware::auth_middleware,
        ));

    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/health/mongo", get(handlers::health::mongo_health))
        .route("/health/redis", get(handlers::health::redis_health))
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .route(
            "/products",
            get(handlers::products::list_products).post(handlers::products::create_product),
        )
        .route(
            "/products/:product_id",
            get(handlers::products::get_product)
                .put(handlers::products::update_product)
                .delete(handlers::products::delete_product),
        )
        .route(
            "/payments/create-checkout-session",
            post(handlers::payments::create_checkout_session),
        )
        .merge(protected)
        .with_state(state.clone())
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        .layer(from_fn(security_headers_middleware))
        .layer(cors_layer(&state.config))
}

fn cors_layer(config: &CommerceConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .security
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::error!("Invalid CORS origin '{}': {}; skipping", origin, e);
                None
            }
        })
        .collect();

    // Credentials on: the auth cookie must survive cross-origin requests
    // from the frontend.
    CorsLayer::new()
        .allow_origin(origins)
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}
