//! Render-ready geometry produced by the clusterer and intersection
//! calculator.

use serde::{Deserialize, Serialize};

use crate::{GeoPoint, LocationRecord};

/// A coverage circle for one category or one location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub id: String,
    pub center: GeoPoint,
    pub radius: f64,
    /// Category the circle belongs to; regions are formed across distinct labels.
    pub label: String,
}

/// A group of nearby locations of one category, rebuilt on every clustering pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationCluster {
    pub id: String,
    pub center: GeoPoint,
    pub members: Vec<LocationRecord>,
    pub category_id: String,
    pub count: usize,
    pub radius: f64,
}

/// A zone judged to lie within two or more categories' coverage circles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntersectionRegion {
    pub id: String,
    pub center: GeoPoint,
    pub radius: f64,
    pub participant_labels: Vec<String>,
    pub score: f64,
}
