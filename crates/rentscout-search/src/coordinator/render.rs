use serde::Serialize;

use rentscout_core::{Circle, ClusteringConfig, LocationCluster, LocationRecord};
use rentscout_spatial::{cluster, per_location_circles, should_cluster};

/// What the rendering layer draws for one category.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "kind", content = "items", rename_all = "snake_case")]
pub enum RenderSet {
    #[default]
    Empty,
    Clusters(Vec<LocationCluster>),
    Circles(Vec<Circle>),
}

impl RenderSet {
    /// Clusters below `cluster_min_zoom`, raw per-location circles otherwise.
    pub(crate) fn build(
        locations: &[LocationRecord],
        category_id: &str,
        zoom: f64,
        clustering: &ClusteringConfig,
        circle_radius_meters: f64,
    ) -> Self {
        if locations.is_empty() {
            return Self::Empty;
        }
        if should_cluster(zoom, locations.len(), clustering) {
            Self::Clusters(cluster(locations, category_id, clustering))
        } else {
            Self::Circles(per_location_circles(locations, circle_radius_meters))
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Clusters(c) => c.is_empty(),
            Self::Circles(c) => c.is_empty(),
        }
    }

    /// Number of drawn shapes.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Empty => 0,
            Self::Clusters(c) => c.len(),
            Self::Circles(c) => c.len(),
        }
    }
}

/// Render-ready output for one enabled, visible category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryRender {
    pub category_id: String,
    pub color: String,
    pub shapes: RenderSet,
}

#[cfg(test)]
mod tests {
    use rentscout_core::GeoPoint;

    use super::*;

    fn records(n: u8) -> Vec<LocationRecord> {
        (0..n)
            .map(|i| LocationRecord {
                id: format!("r{i}"),
                name: format!("r{i}"),
                point: GeoPoint::new(35.0 + f64::from(i) * 0.0001, 139.0),
                address: None,
                rating: None,
                category_id: "gym".to_string(),
            })
            .collect()
    }

    #[test]
    fn low_zoom_clusters() {
        let set = RenderSet::build(&records(5), "gym", 12.0, &ClusteringConfig::default(), 500.0);
        assert!(matches!(set, RenderSet::Clusters(ref c) if c.len() == 1 && c[0].count == 5));
    }

    #[test]
    fn high_zoom_draws_raw_circles() {
        let set = RenderSet::build(&records(5), "gym", 16.0, &ClusteringConfig::default(), 500.0);
        assert!(matches!(set, RenderSet::Circles(ref c) if c.len() == 5));
    }

    #[test]
    fn no_locations_is_empty() {
        let set = RenderSet::build(&[], "gym", 12.0, &ClusteringConfig::default(), 500.0);
        assert_eq!(set, RenderSet::Empty);
        assert!(set.is_empty());
        assert_eq!(set.len(), 0);
    }
}
