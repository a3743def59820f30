use serde::{Deserialize, Serialize};

use crate::GeoPoint;

/// One amenity hit returned by the amenity lookup for a category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationRecord {
    /// Provider-assigned place ID.
    pub id: String,
    pub name: String,
    pub point: GeoPoint,
    pub address: Option<String>,
    pub rating: Option<f32>,
    /// The category whose search produced this record.
    pub category_id: String,
}

impl LocationRecord {
    #[must_use]
    pub fn has_valid_point(&self) -> bool {
        self.point.is_valid()
    }
}
