//! Engine configuration and the process-scoped service bundle

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::focus::{ActiveElementHistory, TabDirectionTracker};
use crate::outside::TopLayerRegistry;
use crate::scheduler::Scheduler;

/// Errors produced while loading an [`EngineConfig`]
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration value for `{field}`: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// Tunables shared by every collection and controller built from one
/// [`Services`] bundle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Inactivity window after which the typeahead buffer clears
    pub typeahead_timeout_ms: u64,

    /// Touch gestures moving this far (or further) on either axis are drags,
    /// not taps
    pub touch_move_threshold_px: f64,

    /// Capacity of the recently-focused element history
    pub history_capacity: usize,

    /// Touch platforms deliver a synthetic click after touchend; when set,
    /// outside detection uses touchend only and ignores click.
    pub ignore_clicks_on_touch_devices: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            typeahead_timeout_ms: 350,
            touch_move_threshold_px: 30.0,
            history_capacity: 10,
            ignore_clicks_on_touch_devices: false,
        }
    }
}

impl EngineConfig {
    /// Parse and validate a JSON document. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.history_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                field: "history_capacity",
                reason: "must be at least 1".to_string(),
            });
        }
        if !self.touch_move_threshold_px.is_finite() || self.touch_move_threshold_px < 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "touch_move_threshold_px",
                reason: format!(
                    "must be a non-negative number, got {}",
                    self.touch_move_threshold_px
                ),
            });
        }
        Ok(())
    }

    /// Typeahead inactivity window as a [`Duration`]
    pub fn typeahead_timeout(&self) -> Duration {
        Duration::from_millis(self.typeahead_timeout_ms)
    }
}

/// One isolated set of the engine's shared services.
///
/// A host normally creates one per document and passes it by reference to
/// every widget and controller. Tests create their own to stay isolated.
#[derive(Debug, Clone)]
pub struct Services {
    pub config: EngineConfig,
    pub scheduler: Scheduler,
    pub history: ActiveElementHistory,
    pub tab_direction: TabDirectionTracker,
    pub layers: TopLayerRegistry,
}

impl Default for Services {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl Services {
    /// Build the services for `config`
    pub fn new(config: EngineConfig) -> Self {
        log::debug!("creating headless services with {:?}", config);
        Self {
            history: ActiveElementHistory::new(config.history_capacity),
            scheduler: Scheduler::new(),
            tab_direction: TabDirectionTracker::new(),
            layers: TopLayerRegistry::new(),
            config,
        }
    }
}
