//! Environment-driven configuration (spec §6 "Configuration surface").
//!
//! Mirrors the teacher's `CacheWarmingConfig::from_env` pattern
//! (`memory-mcp/src/server.rs`): every field has a documented default and is
//! read from an environment variable, never from a config file the process
//! has to locate — file-based config loading is part of the out-of-scope
//! process bootstrap (spec §1).

use std::env;

/// Full configuration surface, assembled once at process start.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub namespace: String,
    pub database: String,
    pub username: String,
    pub password: String,
    pub embedding_host: String,
    pub embedding_model: String,
    pub embedding_dimension: usize,
    pub log_file: Option<String>,
    pub log_level: String,
    pub default_context: Option<String>,
    pub context_from_cwd: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "ws://localhost:8000/rpc".to_string(),
            namespace: "knowledge".to_string(),
            database: "graph".to_string(),
            username: "root".to_string(),
            password: "root".to_string(),
            embedding_host: "http://localhost:11434".to_string(),
            embedding_model: "nomic-embed-text".to_string(),
            embedding_dimension: crate::model::DEFAULT_EMBEDDING_DIM,
            log_file: None,
            log_level: "INFO".to_string(),
            default_context: None,
            context_from_cwd: false,
        }
    }
}

impl Config {
    fn env_string(key: &str, default: &str) -> String {
        env::var(key).unwrap_or_else(|_| default.to_string())
    }

    fn env_bool(key: &str, default: bool) -> bool {
        env::var(key)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    fn env_usize(key: &str, default: usize) -> usize {
        env::var(key)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    /// Loads configuration from the process environment, falling back to the
    /// documented defaults (spec §6 table) for anything unset.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            database_url: env::var("MEMORY_DATABASE_URL").unwrap_or(defaults.database_url),
            namespace: Self::env_string("MEMORY_NAMESPACE", &defaults.namespace),
            database: Self::env_string("MEMORY_DATABASE", &defaults.database),
            username: Self::env_string("MEMORY_USER", &defaults.username),
            password: Self::env_string("MEMORY_PASS", &defaults.password),
            embedding_host: Self::env_string("MEMORY_EMBEDDING_HOST", &defaults.embedding_host),
            embedding_model: Self::env_string("MEMORY_EMBEDDING_MODEL", &defaults.embedding_model),
            embedding_dimension: Self::env_usize(
                "MEMORY_EMBEDDING_DIM",
                defaults.embedding_dimension,
            ),
            log_file: env::var("MEMORY_LOG_FILE").ok(),
            log_level: Self::env_string("MEMORY_LOG_LEVEL", &defaults.log_level),
            default_context: env::var("MEMORY_DEFAULT_CONTEXT")
                .ok()
                .filter(|s| !s.is_empty()),
            context_from_cwd: Self::env_bool("MEMORY_CONTEXT_FROM_CWD", defaults.context_from_cwd),
        }
    }

    /// Default log file path, `/tmp/<name>.log`, used when `MEMORY_LOG_FILE`
    /// is unset.
    #[must_use]
    pub fn default_log_file(process_name: &str) -> String {
        format!("/tmp/{process_name}.log")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec_table() {
        let c = Config::default();
        assert_eq!(c.database_url, "ws://localhost:8000/rpc");
        assert_eq!(c.namespace, "knowledge");
        assert_eq!(c.database, "graph");
        assert_eq!(c.username, "root");
        assert_eq!(c.password, "root");
        assert_eq!(c.embedding_host, "http://localhost:11434");
        assert_eq!(c.log_level, "INFO");
        assert!(c.default_context.is_none());
        assert!(!c.context_from_cwd);
    }

    #[test]
    fn default_log_file_is_tmp_scoped() {
        assert_eq!(
            Config::default_log_file("memory-mcp"),
            "/tmp/memory-mcp.log"
        );
    }
}
