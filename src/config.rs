use std::path::Path;
use std::time::Duration;

use log::warn;
use serde::Deserialize;

use crate::error::{read_resource, DataError};
use crate::pair::PAIR_SIZE;

/// Timing and sizing knobs for a [`crate::session::SortSession`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Delay before the partner of a swiped card is sent the other way.
    pub auto_resolve_delay_ms: u64,
    /// Pause between a cycle resolving and the next batch being pulled.
    /// Zero pulls synchronously.
    pub next_pair_delay_ms: u64,
    /// 1 for a single-card deck, 2 for the split rail.
    pub max_active: usize,
    /// Subsample the sample data down to this many cards.
    pub display_size: Option<usize>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            auto_resolve_delay_ms: 200,
            next_pair_delay_ms: 150,
            max_active: PAIR_SIZE,
            display_size: None,
        }
    }
}

impl SessionConfig {
    pub fn auto_resolve_delay(&self) -> Duration {
        Duration::from_millis(self.auto_resolve_delay_ms)
    }

    pub fn next_pair_delay(&self) -> Duration {
        Duration::from_millis(self.next_pair_delay_ms)
    }

    pub fn from_json_str(text: &str) -> Result<Self, DataError> {
        serde_json::from_str(text).map_err(DataError::parse)
    }

    pub fn from_path(path: &Path) -> Result<Self, DataError> {
        Self::from_json_str(&read_resource(path)?)
    }

    pub fn load_or_default(path: &Path) -> Self {
        match Self::from_path(path) {
            Ok(config) => config,
            Err(err) => {
                warn!("Falling back to default session config: {}", err);
                Self::default()
            }
        }
    }
}
