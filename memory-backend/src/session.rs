//! Backend Session (spec §4.1): a single logical session to the graph
//! database over a reconnecting connection, safe for concurrent use by the
//! Query Layer.
//!
//! Reconnection uses exponential backoff (initial 1s, cap 30s, bounded
//! attempt count), replaying authentication and namespace/database
//! selection before the session is considered ready again (spec §9
//! "Reconnecting session"). In-flight queries at the moment of disconnect
//! fail with [`memory_core::Error::Transient`]; the caller may retry — this
//! session does exactly one such retry itself, which is enough to ride out a
//! single dropped connection without pushing the policy decision onto every
//! Query Layer call site.

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use memory_core::{Error, Result};
use surrealdb::engine::remote::ws::{Client, Ws};
use surrealdb::opt::auth::Root;
use surrealdb::Surreal;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Initial reconnect backoff delay.
const INITIAL_BACKOFF: Duration = Duration::from_secs(1);
/// Backoff delay cap.
const MAX_BACKOFF: Duration = Duration::from_secs(30);
/// Bounded reconnect attempt count before giving up on a single `query()`
/// call (the caller may still retry the call itself).
const MAX_RECONNECT_ATTEMPTS: u32 = 5;

/// Connection parameters for a [`BackendSession`].
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub url: String,
    pub namespace: String,
    pub database: String,
    pub username: String,
    pub password: String,
}

impl From<&memory_core::config::Config> for SessionConfig {
    fn from(config: &memory_core::config::Config) -> Self {
        Self {
            url: config.database_url.clone(),
            namespace: config.namespace.clone(),
            database: config.database.clone(),
            username: config.username.clone(),
            password: config.password.clone(),
        }
    }
}

/// A reconnecting session to the graph database.
///
/// `connect`/`close`/`query` form the whole public contract (spec §4.1);
/// everything below the `query` method is reconnect plumbing the Query
/// Layer never has to think about.
pub struct BackendSession {
    config: SessionConfig,
    db: RwLock<Option<Surreal<Client>>>,
    reconnect_attempts: AtomicU32,
}

impl BackendSession {
    #[must_use]
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            db: RwLock::new(None),
            reconnect_attempts: AtomicU32::new(0),
        }
    }

    /// Opens the stream, authenticates, and selects namespace/database.
    pub async fn connect(&self) -> Result<()> {
        let client = self.open_and_authenticate().await?;
        *self.db.write().await = Some(client);
        self.reconnect_attempts.store(0, Ordering::SeqCst);
        info!(url = %self.config.url, "backend session connected");
        Ok(())
    }

    /// Drops the connection. A subsequent `query` will transparently
    /// reconnect.
    pub async fn close(&self) {
        *self.db.write().await = None;
        info!("backend session closed");
    }

    async fn open_and_authenticate(&self) -> Result<Surreal<Client>> {
        let endpoint = self
            .config
            .url
            .trim_start_matches("ws://")
            .trim_start_matches("wss://")
            .trim_end_matches("/rpc");

        let client = Surreal::new::<Ws>(endpoint)
            .await
            .map_err(|e| Error::transient("connect", format!("failed to open socket: {e}")))?;

        client
            .signin(Root {
                username: &self.config.username,
                password: &self.config.password,
            })
            .await
            .map_err(|e| Error::transient("connect", format!("authentication failed: {e}")))?;

        client
            .use_ns(self.config.namespace.clone())
            .use_db(self.config.database.clone())
            .await
            .map_err(|e| {
                Error::transient("connect", format!("namespace/database selection failed: {e}"))
            })?;

        Ok(client)
    }

    /// Reopens the stream with exponential backoff, replaying
    /// authentication and namespace selection (spec §9).
    async fn reconnect(&self) -> Result<()> {
        let mut delay = INITIAL_BACKOFF;
        let mut attempts = 0u32;

        loop {
            attempts += 1;
            warn!(attempt = attempts, "attempting backend reconnect");
            match self.open_and_authenticate().await {
                Ok(client) => {
                    *self.db.write().await = Some(client);
                    self.reconnect_attempts.store(0, Ordering::SeqCst);
                    info!("backend reconnect succeeded");
                    return Ok(());
                }
                Err(err) if attempts >= MAX_RECONNECT_ATTEMPTS => {
                    return Err(Error::transient(
                        "reconnect",
                        format!("giving up after {attempts} attempts: {err}"),
                    ));
                }
                Err(_) => {
                    tokio::time::sleep(delay).await;
                    delay = std::cmp::min(delay * 2, MAX_BACKOFF);
                }
            }
        }
    }

    /// Runs a statement (or bounded sequence of statements) against the
    /// database, returning the raw [`surrealdb::Response`] so the Query
    /// Layer can `.take(n)` each result set.
    ///
    /// Variables are passed as [`serde_json::Value`] regardless of their
    /// Rust origin — the Query Layer binds everything from a mix of ids,
    /// numbers, and whole record structs, so a single dynamically-typed
    /// binding list is simpler than threading a generic through every call
    /// site.
    ///
    /// On a connection error the session reconnects once and retries the
    /// statement; a second failure is surfaced as
    /// [`memory_core::Error::Transient`] for the caller to retry.
    pub async fn query(
        &self,
        statement: &str,
        variables: Vec<(&'static str, serde_json::Value)>,
    ) -> Result<surrealdb::Response> {
        match self.try_query(statement, variables.clone()).await {
            Ok(response) => Ok(response),
            Err(_) => {
                debug!("query failed, attempting one reconnect-and-retry cycle");
                self.reconnect().await?;
                self.try_query(statement, variables).await
            }
        }
    }

    async fn try_query(
        &self,
        statement: &str,
        variables: Vec<(&'static str, serde_json::Value)>,
    ) -> Result<surrealdb::Response> {
        let guard = self.db.read().await;
        let client = guard
            .as_ref()
            .ok_or_else(|| Error::transient("query", "no active backend connection"))?;

        let mut query = client.query(statement);
        for (name, value) in variables {
            query = query.bind((name, value));
        }
        query
            .await
            .map_err(|e| Error::transient("query", format!("statement failed: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_config_from_core_config_round_trips() {
        let core_config = memory_core::config::Config {
            database_url: "ws://example:8000/rpc".to_string(),
            namespace: "ns".to_string(),
            database: "db".to_string(),
            username: "user".to_string(),
            password: "pass".to_string(),
            ..Default::default()
        };
        let session_config = SessionConfig::from(&core_config);
        assert_eq!(session_config.url, "ws://example:8000/rpc");
        assert_eq!(session_config.namespace, "ns");
        assert_eq!(session_config.database, "db");
    }
}
