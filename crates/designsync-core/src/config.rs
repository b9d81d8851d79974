//! Engine configuration

use serde::{Deserialize, Serialize};

/// Default number of days a preview URL stays valid
pub const DEFAULT_PREVIEW_VALIDITY_DAYS: u32 = 30;

/// Tuning for a synchronization run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Calendar days added to the resolution date for `Preview expires`
    pub preview_validity_days: u32,
    /// Upper bound on enrichment lookups in flight
    pub max_concurrent_lookups: usize,
}

impl SyncConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With preview validity window
    #[inline]
    #[must_use]
    pub fn with_preview_validity_days(mut self, days: u32) -> Self {
        self.preview_validity_days = days;
        self
    }

    /// With lookup concurrency
    #[inline]
    #[must_use]
    pub fn with_max_concurrent_lookups(mut self, max: usize) -> Self {
        self.max_concurrent_lookups = max;
        self
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            preview_validity_days: DEFAULT_PREVIEW_VALIDITY_DAYS,
            max_concurrent_lookups: 4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = SyncConfig::new();
        assert_eq!(config.preview_validity_days, 30);
        assert_eq!(config.max_concurrent_lookups, 4);
    }

    #[test]
    fn builders() {
        let config = SyncConfig::new()
            .with_preview_validity_days(7)
            .with_max_concurrent_lookups(1);
        assert_eq!(config.preview_validity_days, 7);
        assert_eq!(config.max_concurrent_lookups, 1);
    }
}
