//! Storage configuration types.

use serde::Deserialize;

/// SQLite storage configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Database file path. Parent directories are created on startup.
    pub path: String,
    /// Connection pool size.
    pub max_connections: u32,
    /// How long a connection waits on a locked database before failing.
    pub busy_timeout_secs: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: "data/orders.db".to_string(),
            max_connections: 5,
            busy_timeout_secs: 30,
        }
    }
}

impl StorageConfig {
    /// True for SQLite's private in-memory database. Such a database lives
    /// only as long as its connection.
    pub fn is_in_memory(&self) -> bool {
        self.path == ":memory:" || self.path.starts_with("sqlite::memory:")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_config_default() {
        let storage = StorageConfig::default();
        assert_eq!(storage.path, "data/orders.db");
        assert_eq!(storage.max_connections, 5);
        assert_eq!(storage.busy_timeout_secs, 30);
    }

    #[test]
    fn test_is_in_memory() {
        let mut storage = StorageConfig::default();
        assert!(!storage.is_in_memory());

        storage.path = ":memory:".to_string();
        assert!(storage.is_in_memory());
    }
}
