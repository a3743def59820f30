//! Tunables for clustering and for the search coordinator.

use serde::{Deserialize, Serialize};

use crate::ConfigError;

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

/// Controls when and how one category's locations collapse into clusters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusteringConfig {
    /// Clustering applies only while the map zoom is strictly below this level.
    pub cluster_min_zoom: f64,
    /// Maximum distance from a cluster's centroid for a candidate to merge.
    pub cluster_distance_meters: f64,
    /// Groups smaller than this are emitted as singletons.
    pub min_cluster_size: usize,
    /// Hard cap on any member's distance from its cluster's centroid.
    pub max_cluster_radius_meters: f64,
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            cluster_min_zoom: 14.0,
            cluster_distance_meters: 300.0,
            min_cluster_size: 2,
            max_cluster_radius_meters: 1200.0,
        }
    }
}

impl ClusteringConfig {
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] for non-positive distances or a
    /// zero `min_cluster_size`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !is_positive(self.cluster_distance_meters) {
            return Err(ConfigError::Validation(format!(
                "clustering.cluster_distance_meters must be positive, got {}",
                self.cluster_distance_meters
            )));
        }
        if !is_positive(self.max_cluster_radius_meters) {
            return Err(ConfigError::Validation(format!(
                "clustering.max_cluster_radius_meters must be positive, got {}",
                self.max_cluster_radius_meters
            )));
        }
        if self.min_cluster_size == 0 {
            return Err(ConfigError::Validation(
                "clustering.min_cluster_size must be at least 1".to_string(),
            ));
        }
        if !self.cluster_min_zoom.is_finite() {
            return Err(ConfigError::Validation(
                "clustering.cluster_min_zoom must be finite".to_string(),
            ));
        }
        Ok(())
    }
}

/// Behaviour of the search coordinator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchOptions {
    /// Upper bound on amenity result pages fetched per category search.
    pub max_result_pages: u32,
    /// Upper bound on the radius sent to the amenity lookup.
    pub search_radius_meters: f64,
    /// Radius of per-location and per-category coverage circles.
    pub circle_radius_meters: f64,
    /// When false, viewport changes are recorded but never trigger a search.
    pub auto_update: bool,
    /// Fraction by which the viewport's half-diagonal is widened when sizing a search.
    pub bounds_expansion_ratio: f64,
    pub debounce_ms: u64,
    pub parallel_search: bool,
    /// Delay before each follow-up page request.
    pub page_stagger_ms: u64,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            max_result_pages: 1,
            search_radius_meters: 2000.0,
            circle_radius_meters: 500.0,
            auto_update: true,
            bounds_expansion_ratio: 0.2,
            debounce_ms: 400,
            parallel_search: true,
            page_stagger_ms: 200,
        }
    }
}

impl SearchOptions {
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] when a radius is not positive, the
    /// page limit is zero, or the expansion ratio is negative.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_result_pages == 0 {
            return Err(ConfigError::Validation(
                "search.max_result_pages must be at least 1".to_string(),
            ));
        }
        if !is_positive(self.search_radius_meters) {
            return Err(ConfigError::Validation(format!(
                "search.search_radius_meters must be positive, got {}",
                self.search_radius_meters
            )));
        }
        if !is_positive(self.circle_radius_meters) {
            return Err(ConfigError::Validation(format!(
                "search.circle_radius_meters must be positive, got {}",
                self.circle_radius_meters
            )));
        }
        if !(self.bounds_expansion_ratio.is_finite() && self.bounds_expansion_ratio >= 0.0) {
            return Err(ConfigError::Validation(format!(
                "search.bounds_expansion_ratio must not be negative, got {}",
                self.bounds_expansion_ratio
            )));
        }
        Ok(())
    }
}
