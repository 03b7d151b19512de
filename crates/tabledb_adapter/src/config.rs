//! Adapter configuration.

/// Configuration for connecting to a document store.
#[derive(Debug, Clone)]
pub struct AdapterConfig {
    /// Store host.
    pub host: String,
    /// Store port.
    pub port: u16,
    /// Database name.
    pub database: String,
}

impl AdapterConfig {
    /// Creates a configuration for the given database.
    pub fn new(database: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            ..Self::default()
        }
    }

    /// Sets the store host.
    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Sets the store port.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Returns the logical address of the store, for diagnostics.
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}/{}", self.host, self.port, self.database)
    }
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 27017,
            database: "test".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = AdapterConfig::default();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 27017);
        assert_eq!(config.database, "test");
    }

    #[test]
    fn config_builder() {
        let config = AdapterConfig::new("app")
            .with_host("db.internal")
            .with_port(28015);
        assert_eq!(config.address(), "db.internal:28015/app");
    }
}
