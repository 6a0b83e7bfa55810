//! Shared harness for commerce-service integration tests.
//!
//! The session store and payment gateway are in-memory mocks, so any test
//! that stops short of a MongoDB query runs without external services.
//! Tests that do hit MongoDB are marked `#[ignore]` and expect a local
//! instance at MONGODB_URI.

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request},
    response::Response,
    Router,
};
use serde_json::Value;
use uuid::Uuid;

use commerce_service::{
    build_router,
    config::{
        CommerceConfig, CookieConfig, Environment, JwtConfig, MongoConfig, RedisConfig,
        SecurityConfig, StripeConfig,
    },
    models::Role,
    services::{
        MockGateway, MockSessionStore, MongoDb, PaymentGateway, SessionManager, SessionSnapshot,
        SessionStore, TokenService,
    },
    AppState,
};

pub const TEST_JWT_SECRET: &str = "test-secret-not-for-production";

pub fn test_config(db_name: &str) -> CommerceConfig {
    dotenvy::dotenv().ok();
    CommerceConfig {
        common: service_core::config::Config { port: 0 },
        environment: Environment::Dev,
        service_name: "commerce-service-test".to_string(),
        log_level: "error".to_string(),
        frontend_url: "http://localhost:5173".to_string(),
        mongodb: MongoConfig {
            uri: std::env::var("MONGODB_URI")
                .unwrap_or_else(|_| "mongodb://localhost:27017".to_string()),
            database: db_name.to_string(),
        },
        redis: RedisConfig {
            url: "redis://localhost:6379".to_string(),
        },
        jwt: JwtConfig {
            secret: TEST_JWT_SECRET.to_string(),
            algorithm: "HS256".to_string(),
            access_expires_minutes: 60,
        },
        cookie: CookieConfig {
            name: "access_token".to_string(),
            secure: false,
            same_site: "lax".to_string(),
            domain: None,
        },
        stripe: StripeConfig {
            secret_key: "sk_test_unused".to_string(),
            api_base: "https://api.stripe.com".to_string(),
        },
        security: SecurityConfig {
            allowed_origins: vec!["http://localhost:5173".to_string()],
        },
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub store: Arc<MockSessionStore>,
    pub gateway: Arc<MockGateway>,
    db_name: String,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with_gateway(MockGateway::new()).await
    }

    pub async fn spawn_with_gateway(gateway: MockGateway) -> Self {
        let db_name = format!("test_commerce_{}", Uuid::new_v4().simple());
        let config = test_config(&db_name);

        // The driver connects lazily; no MongoDB is contacted until a query runs.
        let db = MongoDb::connect(&config.mongodb.uri, &config.mongodb.database)
            .await
            .expect("Failed to create MongoDB client");

        let store = Arc::new(MockSessionStore::new());
        let sessions = SessionManager::new(store.clone() as Arc<dyn SessionStore>);
        let tokens = TokenService::new(&config.jwt).expect("Failed to create token service");
        let gateway = Arc::new(gateway);

        let state = AppState {
            config,
            db,
            tokens,
            sessions,
            gateway: gateway.clone() as Arc<dyn PaymentGateway>,
        };

        let router = build_router(state.clone());

        Self {
            router,
            state,
            store,
            gateway,
            db_name,
        }
    }

    /// Issue a token and create a matching session without touching MongoDB.
    pub async fn authenticate(&self) -> (String, String) {
        let user_id = Uuid::new_v4().to_string();
        let token = self.issue_token(&user_id);
        self.create_session(&token, &user_id).await;
        (token, user_id)
    }

    pub fn issue_token(&self, user_id: &str) -> String {
        let mut claims = serde_json::Map::new();
        claims.insert(
            "email".to_string(),
            Value::String("test@example.com".to_string()),
        );
        claims.insert("role".to_string(), Value::String("customer".to_string()));
        self.state
            .tokens
            .issue(user_id, &claims)
            .expect("Failed to issue token")
    }

    pub async fn create_session(&self, token: &str, user_id: &str) {
        self.state
            .sessions
            .create(
                token,
                &SessionSnapshot {
                    user_id: user_id.to_string(),
                    email: "test@example.com".to_string(),
                    role: Role::Customer,
                },
                3600,
            )
            .await
            .expect("Failed to create session");
    }

    /// Drop the per-test database. Only meaningful for live-MongoDB tests.
    pub async fn teardown(&self) {
        let client = self.state.db.client();
        let _ = client.database(&self.db_name).drop(None).await;
    }
}

pub fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("Failed to build request")
}

pub fn authed_request(method: Method, uri: &str, token: &str, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token));
    let body = match body {
        Some(value) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };
    builder.body(body).expect("Failed to build request")
}

pub async fn body_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read response body");
    serde_json::from_slice(&bytes).expect("Response body is not JSON")
}
