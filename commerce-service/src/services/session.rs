use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use redis::{aio::ConnectionManager, Client};
use serde::{Deserialize, Serialize};

use crate::config::RedisConfig;
use crate::models::Role;
use crate::services::error::ServiceError;

/// Key prefix for server-side session records.
pub const SESSION_KEY_PREFIX: &str = "session:";

/// Minimal key-value contract the session layer needs from the cache.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn set(&self, key: &str, value: &str, ttl_seconds: i64) -> Result<(), anyhow::Error>;
    async fn get(&self, key: &str) -> Result<Option<String>, anyhow::Error>;
    async fn delete(&self, key: &str) -> Result<(), anyhow::Error>;
    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, anyhow::Error>;
    async fn health_check(&self) -> Result<(), anyhow::Error>;
}

#[derive(Clone)]
pub struct RedisSessionStore {
    _client: Client,
    manager: ConnectionManager,
}

impl RedisSessionStore {
    pub async fn new(config: &RedisConfig) -> Result<Self, anyhow::Error> {
        tracing::info!(url = %config.url, "Connecting to Redis");
        let client = Client::open(config.url.clone())?;

        // ConnectionManager reconnects automatically
        let manager = client.get_connection_manager().await.map_err(|e| {
            tracing::error!("Failed to get Redis connection manager: {}", e);
            anyhow::anyhow!("Failed to connect to Redis: {}", e)
        })?;

        tracing::info!("Successfully connected to Redis");

        Ok(Self {
            _client: client,
            manager,
        })
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn set(&self, key: &str, value: &str, ttl_seconds: i64) -> Result<(), anyhow::Error> {
        let mut conn = self.manager.clone();
        redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("EX")
            .arg(ttl_seconds)
            .query_async(&mut conn)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to set cache key: {}", e))
    }

    async fn get(&self, key: &str) -> Result<Option<String>, anyhow::Error> {
        let mut conn = self.manager.clone();
        redis::cmd("GET")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to get cache key: {}", e))
    }

    async fn delete(&self, key: &str) -> Result<(), anyhow::Error> {
        let mut conn = self.manager.clone();
        redis::cmd("DEL")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to delete cache key: {}", e))
    }

    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, anyhow::Error> {
        let mut conn = self.manager.clone();
        let pattern = format!("{}*", prefix);
        let mut keys = Vec::new();
        let mut cursor: u64 = 0;

        loop {
            let (next, batch): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(100)
                .query_async(&mut conn)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to scan cache keys: {}", e))?;

            keys.extend(batch);
            cursor = next;
            if cursor == 0 {
                break;
            }
        }

        Ok(keys)
    }

    async fn health_check(&self) -> Result<(), anyhow::Error> {
        let mut conn = self.manager.clone();
        redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|e| anyhow::anyhow!("Redis health check failed: {}", e))
    }
}

/// In-memory store for tests, with real TTL expiry.
#[derive(Default)]
pub struct MockSessionStore {
    entries: Mutex<HashMap<String, (String, Instant)>>,
}

impl MockSessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MockSessionStore {
    async fn set(&self, key: &str, value: &str, ttl_seconds: i64) -> Result<(), anyhow::Error> {
        let deadline = Instant::now() + Duration::from_secs(ttl_seconds.max(0) as u64);
        self.entries
            .lock()
            .map_err(|e| anyhow::anyhow!("Mock store mutex poisoned: {}", e))?
            .insert(key.to_string(), (value.to_string(), deadline));
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, anyhow::Error> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| anyhow::anyhow!("Mock store mutex poisoned: {}", e))?;
        match entries.get(key) {
            Some((value, deadline)) if Instant::now() < *deadline => Ok(Some(value.clone())),
            Some(_) => {
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, key: &str) -> Result<(), anyhow::Error> {
        self.entries
            .lock()
            .map_err(|e| anyhow::anyhow!("Mock store mutex poisoned: {}", e))?
            .remove(key);
        Ok(())
    }

    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, anyhow::Error> {
        let entries = self
            .entries
            .lock()
            .map_err(|e| anyhow::anyhow!("Mock store mutex poisoned: {}", e))?;
        Ok(entries
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect())
    }

    async fn health_check(&self) -> Result<(), anyhow::Error> {
        Ok(())
    }
}

/// The server-side view of an authenticated user, cached per token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub user_id: String,
    pub email: String,
    pub role: Role,
}

/// Bridges stateless tokens to revocable server-side session state. A token
/// is only honored while its session record exists, which is what makes
/// logout and account deletion effective before cryptographic expiry.
#[derive(Clone)]
pub struct SessionManager {
    store: Arc<dyn SessionStore>,
}

impl SessionManager {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    fn key(token: &str) -> String {
        format!("{}{}", SESSION_KEY_PREFIX, token)
    }

    pub async fn create(
        &self,
        token: &str,
        snapshot: &SessionSnapshot,
        ttl_seconds: i64,
    ) -> Result<(), ServiceError> {
        let value = serde_json::to_string(snapshot)
            .map_err(|e| ServiceError::Internal(anyhow::Error::new(e)))?;
        self.store
            .set(&Self::key(token), &value, ttl_seconds)
            .await
            .map_err(ServiceError::Cache)
    }

    /// Absence means never created, revoked, or expired; callers cannot and
    /// need not distinguish the three.
    pub async fn resolve(&self, token: &str) -> Result<Option<SessionSnapshot>, ServiceError> {
        let value = self
            .store
            .get(&Self::key(token))
            .await
            .map_err(ServiceError::Cache)?;

        match value {
            None => Ok(None),
            Some(raw) => match serde_json::from_str(&raw) {
                Ok(snapshot) => Ok(Some(snapshot)),
                Err(e) => {
                    // A record written by an incompatible deploy; treat as no session.
                    tracing::warn!(error = %e, "Discarding undecodable session record");
                    Ok(None)
                }
            },
        }
    }

    pub async fn revoke(&self, token: &str) -> Result<(), ServiceError> {
        self.store
            .delete(&Self::key(token))
            .await
            .map_err(ServiceError::Cache)
    }

    /// Delete every session belonging to `user_id`. Walks all live sessions;
    /// O(total active sessions), acceptable at this deployment's scale.
    pub async fn revoke_all_for_user(&self, user_id: &str) -> Result<u64, ServiceError> {
        let keys = self
            .store
            .keys_with_prefix(SESSION_KEY_PREFIX)
            .await
            .map_err(ServiceError::Cache)?;

        let mut revoked = 0u64;
        for key in keys {
            let Some(raw) = self.store.get(&key).await.map_err(ServiceError::Cache)? else {
                continue;
            };
            let Ok(snapshot) = serde_json::from_str::<SessionSnapshot>(&raw) else {
                continue;
            };
            if snapshot.user_id == user_id {
                self.store.delete(&key).await.map_err(ServiceError::Cache)?;
                revoked += 1;
            }
        }

        tracing::debug!(user_id = %user_id, revoked, "Revoked user sessions");
        Ok(revoked)
    }

    pub async fn health_check(&self) -> Result<(), anyhow::Error> {
        self.store.health_check().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> SessionManager {
        SessionManager::new(Arc::new(MockSessionStore::new()))
    }

    fn snapshot(user_id: &str) -> SessionSnapshot {
        SessionSnapshot {
            user_id: user_id.to_string(),
            email: format!("{}@example.com", user_id),
            role: Role::Customer,
        }
    }

    #[tokio::test]
    async fn create_then_resolve_returns_snapshot() {
        let sessions = manager();
        let snap = snapshot("user-1");

        sessions.create("tok-1", &snap, 60).await.unwrap();

        assert_eq!(sessions.resolve("tok-1").await.unwrap(), Some(snap));
    }

    #[tokio::test]
    async fn resolve_unknown_token_is_absent() {
        let sessions = manager();
        assert_eq!(sessions.resolve("never-created").await.unwrap(), None);
    }

    #[tokio::test]
    async fn revoke_makes_session_absent_regardless_of_ttl() {
        let sessions = manager();
        sessions.create("tok-1", &snapshot("user-1"), 3600).await.unwrap();

        sessions.revoke("tok-1").await.unwrap();

        assert_eq!(sessions.resolve("tok-1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn session_expires_when_ttl_elapses() {
        let sessions = manager();
        sessions.create("tok-1", &snapshot("user-1"), 1).await.unwrap();

        assert!(sessions.resolve("tok-1").await.unwrap().is_some());

        tokio::time::sleep(std::time::Duration::from_millis(1100)).await;
        assert_eq!(sessions.resolve("tok-1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn revoke_all_for_user_spares_other_users() {
        let sessions = manager();
        sessions.create("tok-a1", &snapshot("alice"), 60).await.unwrap();
        sessions.create("tok-a2", &snapshot("alice"), 60).await.unwrap();
        sessions.create("tok-b1", &snapshot("bob"), 60).await.unwrap();

        let revoked = sessions.revoke_all_for_user("alice").await.unwrap();

        assert_eq!(revoked, 2);
        assert_eq!(sessions.resolve("tok-a1").await.unwrap(), None);
        assert_eq!(sessions.resolve("tok-a2").await.unwrap(), None);
        assert!(sessions.resolve("tok-b1").await.unwrap().is_some());
    }
}
