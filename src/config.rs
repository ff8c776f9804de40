//! Configuration Module
//!
//! Per-namespace cache configuration with fail-fast validation.

use std::collections::HashSet;
use std::time::Duration;

use crate::error::{CacheError, Result};

// == Namespace Config ==
/// Configuration for a single cache namespace.
///
/// Namespaces are created once at startup from a fixed configuration; there
/// is no runtime namespace creation.
#[derive(Debug, Clone)]
pub struct NamespaceConfig {
    /// Namespace name, unique within a cache instance
    pub name: String,
    /// Default TTL in seconds for entries stored without an explicit TTL
    pub ttl_seconds: u64,
    /// Background sweep interval in seconds
    pub sweep_interval_seconds: u64,
}

impl NamespaceConfig {
    /// Creates a namespace configuration.
    pub fn new(name: impl Into<String>, ttl_seconds: u64, sweep_interval_seconds: u64) -> Self {
        Self {
            name: name.into(),
            ttl_seconds,
            sweep_interval_seconds,
        }
    }

    /// Default TTL as a `Duration`.
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }

    /// Sweep interval as a `Duration`.
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_seconds)
    }

    /// Validates the configuration.
    ///
    /// Names must be non-empty; TTL and sweep interval must be positive.
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(CacheError::InvalidConfig(
                "namespace name cannot be empty".to_string(),
            ));
        }
        if self.ttl_seconds == 0 {
            return Err(CacheError::InvalidConfig(format!(
                "namespace '{}': ttl_seconds must be positive",
                self.name
            )));
        }
        if self.sweep_interval_seconds == 0 {
            return Err(CacheError::InvalidConfig(format!(
                "namespace '{}': sweep_interval_seconds must be positive",
                self.name
            )));
        }
        Ok(())
    }
}

// == Cache Config ==
/// The full set of namespaces for one cache instance.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Namespaces to create at startup
    pub namespaces: Vec<NamespaceConfig>,
}

impl CacheConfig {
    /// Creates a configuration from an explicit namespace list.
    pub fn new(namespaces: Vec<NamespaceConfig>) -> Self {
        Self { namespaces }
    }

    /// Validates every namespace and rejects duplicate names.
    ///
    /// Called by the cache constructor so a misconfigured instance fails at
    /// startup, before any namespace is usable.
    pub fn validate(&self) -> Result<()> {
        if self.namespaces.is_empty() {
            return Err(CacheError::InvalidConfig(
                "at least one namespace is required".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for namespace in &self.namespaces {
            namespace.validate()?;
            if !seen.insert(namespace.name.as_str()) {
                return Err(CacheError::InvalidConfig(format!(
                    "duplicate namespace name '{}'",
                    namespace.name
                )));
            }
        }
        Ok(())
    }
}

impl Default for CacheConfig {
    /// The standard three-partition layout: short-lived shared data, shorter
    /// per-user data, and longer-lived auth lookups.
    fn default() -> Self {
        Self {
            namespaces: vec![
                NamespaceConfig::new("public", 300, 60),
                NamespaceConfig::new("user", 180, 60),
                NamespaceConfig::new("auth", 900, 120),
            ],
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = CacheConfig::default();
        assert_eq!(config.namespaces.len(), 3);
        assert!(config.validate().is_ok());

        let public = &config.namespaces[0];
        assert_eq!(public.name, "public");
        assert_eq!(public.ttl(), Duration::from_secs(300));
        assert_eq!(public.sweep_interval(), Duration::from_secs(60));
    }

    #[test]
    fn test_config_rejects_zero_ttl() {
        let config = CacheConfig::new(vec![NamespaceConfig::new("bad", 0, 60)]);
        assert!(matches!(
            config.validate(),
            Err(CacheError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_config_rejects_zero_sweep_interval() {
        let config = CacheConfig::new(vec![NamespaceConfig::new("bad", 60, 0)]);
        assert!(matches!(
            config.validate(),
            Err(CacheError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_config_rejects_empty_name() {
        let config = CacheConfig::new(vec![NamespaceConfig::new("", 60, 60)]);
        assert!(matches!(
            config.validate(),
            Err(CacheError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_config_rejects_duplicate_names() {
        let config = CacheConfig::new(vec![
            NamespaceConfig::new("public", 60, 60),
            NamespaceConfig::new("public", 120, 60),
        ]);
        assert!(matches!(
            config.validate(),
            Err(CacheError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_config_rejects_empty_namespace_list() {
        let config = CacheConfig::new(vec![]);
        assert!(matches!(
            config.validate(),
            Err(CacheError::InvalidConfig(_))
        ));
    }
}
