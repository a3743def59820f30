//! Builders for the coverage circles fed to rendering and to [`crate::intersect`].

use serde::{Deserialize, Serialize};

use rentscout_core::{Circle, GeoPoint, LocationRecord};

use crate::geometry::{centroid, distance_meters};

/// How a category's locations are turned into coverage circles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CircleMode {
    /// One representative circle per category.
    #[default]
    PerCategory,
    /// One circle per location.
    PerLocation,
}

/// One circle of `radius_meters` around every valid location.
#[must_use]
pub fn per_location_circles(locations: &[LocationRecord], radius_meters: f64) -> Vec<Circle> {
    locations
        .iter()
        .filter(|l| l.has_valid_point())
        .map(|l| Circle {
            id: l.id.clone(),
            center: l.point,
            radius: radius_meters,
            label: l.category_id.clone(),
        })
        .collect()
}

/// A circle centered on the centroid of the category's valid locations,
/// wide enough to reach the farthest of them and never narrower than
/// `min_radius_meters`. `None` when no location is valid.
#[must_use]
pub fn category_circle(
    category_id: &str,
    locations: &[LocationRecord],
    min_radius_meters: f64,
) -> Option<Circle> {
    let points: Vec<GeoPoint> = locations
        .iter()
        .filter(|l| l.has_valid_point())
        .map(|l| l.point)
        .collect();
    let center = centroid(&points).ok()?;
    let reach = points
        .iter()
        .map(|p| distance_meters(*p, center))
        .fold(0.0, f64::max);

    Some(Circle {
        id: format!("{category_id}-coverage"),
        center,
        radius: reach.max(min_radius_meters),
        label: category_id.to_string(),
    })
}

/// Coverage circles for every `(category_id, locations)` pair.
#[must_use]
pub fn coverage_circles<'a, I>(mode: CircleMode, categories: I, radius_meters: f64) -> Vec<Circle>
where
    I: IntoIterator<Item = (&'a str, &'a [LocationRecord])>,
{
    categories
        .into_iter()
        .flat_map(|(id, locations)| match mode {
            CircleMode::PerCategory => category_circle(id, locations, radius_meters)
                .into_iter()
                .collect::<Vec<_>>(),
            CircleMode::PerLocation => per_location_circles(locations, radius_meters),
        })
        .collect()
}
