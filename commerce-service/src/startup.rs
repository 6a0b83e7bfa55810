use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tokio::signal;

use service_core::error::AppError;

use crate::config::CommerceConfig;
use crate::services::{
    MongoDb, PaymentGateway, RedisSessionStore, SessionManager, StripeGateway, TokenService,
};
use crate::{build_router, AppState};

pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
}

impl Application {
    pub async fn build(config: CommerceConfig) -> Result<Self, AppError> {
        let db = MongoDb::connect(&config.mongodb.uri, &config.mongodb.database)
            .await
            .map_err(|e| {
                tracing::error!("Failed to connect to MongoDB: {}", e);
                e
            })?;
        db.initialize_indexes().await.map_err(|e| {
            tracing::error!("Failed to initialize database indexes: {}", e);
            e
        })?;

        let store = RedisSessionStore::new(&config.redis)
            .await
            .map_err(AppError::InternalError)?;
        let sessions = SessionManager::new(Arc::new(store));

        let tokens = TokenService::new(&config.jwt).map_err(AppError::ConfigError)?;

        let gateway: Arc<dyn PaymentGateway> = Arc::new(StripeGateway::new(config.stripe.clone()));

        let state = AppState {
            config: config.clone(),
            db,
            tokens,
            sessions,
            gateway,
        };

        let router = build_router(state);

        let addr = config.common.socket_addr();
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Listening on {}", port);

        Ok(Self {
            port,
            listener,
            router,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => tracing::error!("Failed to install SIGTERM handler: {}", e),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
