use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{CategoryConfig, LocationRecord};

/// Lifecycle of one category's search lane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryStatus {
    Idle,
    Loading,
    Ready,
    Error,
}

impl std::fmt::Display for CategoryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CategoryStatus::Idle => write!(f, "idle"),
            CategoryStatus::Loading => write!(f, "loading"),
            CategoryStatus::Ready => write!(f, "ready"),
            CategoryStatus::Error => write!(f, "error"),
        }
    }
}

/// One amenity type being searched for, together with its latest results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchCategory {
    pub id: String,
    pub query_text: String,
    pub color: String,
    pub enabled: bool,
    pub visible: bool,
    pub locations: Vec<LocationRecord>,
    pub status: CategoryStatus,
    pub error_message: Option<String>,
    pub last_search_timestamp: Option<DateTime<Utc>>,
}

impl SearchCategory {
    /// A fresh `Idle` category with the configured default flags.
    #[must_use]
    pub fn from_config(config: &CategoryConfig) -> Self {
        Self {
            id: config.id.clone(),
            query_text: config.query.clone(),
            color: config.color.clone(),
            enabled: config.enabled,
            visible: config.visible,
            locations: Vec::new(),
            status: CategoryStatus::Idle,
            error_message: None,
            last_search_timestamp: None,
        }
    }
}
