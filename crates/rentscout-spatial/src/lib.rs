//! Pure geometry for amenity search: distances, clustering of one
//! category's locations, and overlap regions across categories.

pub mod cluster;
pub mod coverage;
pub mod geometry;
pub mod intersect;

pub use cluster::{cluster, should_cluster};
pub use coverage::{category_circle, coverage_circles, per_location_circles, CircleMode};
pub use geometry::{centroid, distance_meters, half_diagonal_meters, point_in_circle};
pub use intersect::intersect;
