//! Explicit platform registry.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::error::{DdlError, Result};
use crate::platform::{MySqlPlatform, OraclePlatform, Platform, PostgresPlatform, SqlitePlatform};

/// Maps platform names to [`Platform`] instances.
///
/// Lookup is case-insensitive. There is no global instance; callers construct
/// a registry, usually via [`PlatformRegistry::with_builtins`], and pass it
/// where needed.
#[derive(Default)]
pub struct PlatformRegistry {
    platforms: HashMap<String, Arc<dyn Platform>>,
}

impl PlatformRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry pre-populated with all built-in platforms.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(MySqlPlatform::new()));
        registry.register(Arc::new(OraclePlatform::new()));
        registry.register(Arc::new(PostgresPlatform::new()));
        registry.register(Arc::new(SqlitePlatform::new()));
        registry
    }

    /// Registers a platform under its canonical name, replacing any previous
    /// registration of the same name.
    pub fn register(&mut self, platform: Arc<dyn Platform>) {
        debug!(platform = platform.name(), "registering platform");
        self.platforms
            .insert(platform.name().to_ascii_lowercase(), platform);
    }

    /// Looks up a platform by name, ignoring case.
    pub fn get(&self, name: &str) -> Result<Arc<dyn Platform>> {
        self.platforms
            .get(&name.to_ascii_lowercase())
            .cloned()
            .ok_or_else(|| DdlError::NoSuchPlatform(name.to_string()))
    }

    /// The canonical names of every registered platform, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.platforms.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl std::fmt::Debug for PlatformRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlatformRegistry")
            .field("platforms", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins_registered() {
        let registry = PlatformRegistry::with_builtins();
        assert_eq!(registry.names(), vec!["mysql", "oracle", "postgresql", "sqlite"]);
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let registry = PlatformRegistry::with_builtins();
        assert_eq!(registry.get("PostgreSQL").unwrap().name(), "postgresql");
        assert_eq!(registry.get("MYSQL").unwrap().name(), "mysql");
    }

    #[test]
    fn test_unknown_platform_is_an_error() {
        let registry = PlatformRegistry::with_builtins();
        let err = registry.get("db2").unwrap_err();
        assert!(matches!(err, DdlError::NoSuchPlatform(name) if name == "db2"));
    }

    #[test]
    fn test_reregistration_replaces() {
        let mut registry = PlatformRegistry::new();
        registry.register(Arc::new(SqlitePlatform::new()));
        registry.register(Arc::new(SqlitePlatform::new()));
        assert_eq!(registry.names(), vec!["sqlite"]);
    }
}
