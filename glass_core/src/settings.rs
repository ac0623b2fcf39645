//! Catalog endpoint settings.
//!
//! Defaults can be overridden from the environment:
//!
//! | Variable                     | Field          |
//! |------------------------------|----------------|
//! | `GLASS_CATALOG_URL`          | `base_url`     |
//! | `GLASS_CATALOG_TIMEOUT_SECS` | `timeout_secs` |

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Environment variable holding the catalog base URL
pub const ENV_CATALOG_URL: &str = "GLASS_CATALOG_URL";

/// Environment variable holding the request timeout in seconds
pub const ENV_CATALOG_TIMEOUT: &str = "GLASS_CATALOG_TIMEOUT_SECS";

/// Catalog URL used when none is configured
pub const DEFAULT_CATALOG_URL: &str = "http://localhost:8080/api";

/// Request timeout used when none is configured
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Where and how to reach the catalog backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogSettings {
    pub base_url: String,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        CatalogSettings {
            base_url: DEFAULT_CATALOG_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: format!("GlassCalculator/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl CatalogSettings {
    /// Defaults overridden by the environment.
    ///
    /// An unparseable or zero timeout keeps the default and logs a warning.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut settings = CatalogSettings::default();

        if let Some(url) = lookup(ENV_CATALOG_URL).filter(|u| !u.trim().is_empty()) {
            settings.base_url = url.trim().to_string();
        }

        if let Some(raw) = lookup(ENV_CATALOG_TIMEOUT) {
            match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => settings.timeout_secs = secs,
                _ => tracing::warn!(value = %raw, "Ignoring invalid {}", ENV_CATALOG_TIMEOUT),
            }
        }

        settings
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Builder: point at another backend
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let s = CatalogSettings::from_lookup(lookup(&[]));
        assert_eq!(s, CatalogSettings::default());
        assert_eq!(s.timeout(), Duration::from_secs(10));
        assert!(s.user_agent.starts_with("GlassCalculator/"));
    }

    #[test]
    fn test_env_overrides() {
        let s = CatalogSettings::from_lookup(lookup(&[
            (ENV_CATALOG_URL, " https://example.test/api/glass "),
            (ENV_CATALOG_TIMEOUT, "30"),
        ]));
        assert_eq!(s.base_url, "https://example.test/api/glass");
        assert_eq!(s.timeout_secs, 30);
    }

    #[test]
    fn test_invalid_timeout_keeps_default() {
        let s = CatalogSettings::from_lookup(lookup(&[(ENV_CATALOG_TIMEOUT, "soon")]));
        assert_eq!(s.timeout_secs, DEFAULT_TIMEOUT_SECS);
        let s = CatalogSettings::from_lookup(lookup(&[(ENV_CATALOG_TIMEOUT, "0")]));
        assert_eq!(s.timeout_secs, DEFAULT_TIMEOUT_SECS);
    }
}
