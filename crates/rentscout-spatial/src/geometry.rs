//! Great-circle distance, centroids, and containment tests on WGS84 points.

use rentscout_core::{CoreError, GeoPoint, Viewport};

/// Mean Earth radius used by the haversine formula.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Haversine distance between two points in meters.
#[must_use]
pub fn distance_meters(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let delta_lat = (b.lat - a.lat).to_radians();
    let delta_lng = (b.lng - a.lng).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lng / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_METERS * c
}

/// Arithmetic mean of the latitudes and longitudes.
///
/// # Errors
///
/// Returns [`CoreError::EmptyInput`] when `points` is empty.
pub fn centroid(points: &[GeoPoint]) -> Result<GeoPoint, CoreError> {
    if points.is_empty() {
        return Err(CoreError::EmptyInput);
    }
    // Point sets are bounded by one page of amenity results.
    #[allow(clippy::cast_precision_loss)]
    let n = points.len() as f64;
    let (lat_sum, lng_sum) = points
        .iter()
        .fold((0.0, 0.0), |(lat, lng), p| (lat + p.lat, lng + p.lng));
    Ok(GeoPoint::new(lat_sum / n, lng_sum / n))
}

#[must_use]
pub fn point_in_circle(point: GeoPoint, center: GeoPoint, radius_meters: f64) -> bool {
    distance_meters(point, center) <= radius_meters
}

/// Point at `fraction` of the way from `from` to `to`, interpolated linearly
/// in degrees. Longitude takes the short way across the antimeridian.
#[must_use]
pub fn interpolate(from: GeoPoint, to: GeoPoint, fraction: f64) -> GeoPoint {
    let lng = from.lng + wrap_longitude(to.lng - from.lng) * fraction;
    GeoPoint::new(from.lat + (to.lat - from.lat) * fraction, wrap_longitude(lng))
}

/// Folds a longitude (or longitude delta) into `[-180, 180]`.
fn wrap_longitude(lng: f64) -> f64 {
    if lng > 180.0 {
        lng - 360.0
    } else if lng < -180.0 {
        lng + 360.0
    } else {
        lng
    }
}

/// Distance from the viewport's center to its farthest corner.
#[must_use]
pub fn half_diagonal_meters(viewport: &Viewport) -> f64 {
    [
        GeoPoint::new(viewport.north, viewport.east),
        GeoPoint::new(viewport.north, viewport.west),
        GeoPoint::new(viewport.south, viewport.east),
        GeoPoint::new(viewport.south, viewport.west),
    ]
    .into_iter()
    .map(|corner| distance_meters(viewport.center, corner))
    .fold(0.0, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_points() -> Vec<GeoPoint> {
        vec![
            GeoPoint::new(35.0, 139.0),
            GeoPoint::new(35.003, 139.0),
            GeoPoint::new(-33.868_8, 151.209_3),
            GeoPoint::new(51.507_4, -0.127_8),
            GeoPoint::new(0.0, 179.999),
            GeoPoint::new(0.0, -179.999),
            GeoPoint::new(89.9, 10.0),
        ]
    }

    #[test]
    fn distance_is_symmetric() {
        let points = sample_points();
        for a in &points {
            for b in &points {
                assert_eq!(
                    distance_meters(*a, *b).to_bits(),
                    distance_meters(*b, *a).to_bits(),
                    "asymmetric for {a:?} / {b:?}"
                );
            }
        }
    }

    #[test]
    fn distance_to_self_is_zero() {
        for p in sample_points() {
            assert!(distance_meters(p, p).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn distinct_points_have_positive_distance() {
        let a = GeoPoint::new(35.0, 139.0);
        let b = GeoPoint::new(35.000_01, 139.0);
        assert!(distance_meters(a, b) > 0.0);
    }

    #[test]
    fn hundredth_degree_of_latitude_is_about_1112_meters() {
        let d = distance_meters(GeoPoint::new(35.0, 139.0), GeoPoint::new(35.01, 139.0));
        assert!((d - 1111.95).abs() < 1.0, "got {d}");
    }

    #[test]
    fn antimeridian_distance_is_short() {
        let d = distance_meters(GeoPoint::new(0.0, 179.999), GeoPoint::new(0.0, -179.999));
        assert!(d < 300.0, "got {d}");
    }

    #[test]
    fn centroid_of_empty_set_fails() {
        assert!(matches!(centroid(&[]), Err(CoreError::EmptyInput)));
    }

    #[test]
    fn centroid_is_arithmetic_mean() {
        let c = centroid(&[
            GeoPoint::new(10.0, 20.0),
            GeoPoint::new(12.0, 24.0),
            GeoPoint::new(14.0, 28.0),
        ])
        .unwrap();
        assert!((c.lat - 12.0).abs() < 1e-12);
        assert!((c.lng - 24.0).abs() < 1e-12);
    }

    #[test]
    fn point_in_circle_includes_boundary() {
        let center = GeoPoint::new(35.0, 139.0);
        let p = GeoPoint::new(35.003, 139.0);
        let d = distance_meters(p, center);
        assert!(point_in_circle(p, center, d));
        assert!(!point_in_circle(p, center, d - 0.01));
    }

    #[test]
    fn interpolate_endpoints_and_midpoint() {
        let a = GeoPoint::new(35.0, 139.0);
        let b = GeoPoint::new(36.0, 141.0);
        assert_eq!(interpolate(a, b, 0.0), a);
        assert_eq!(interpolate(a, b, 1.0), b);
        assert_eq!(interpolate(a, b, 0.5), GeoPoint::new(35.5, 140.0));
    }

    #[test]
    fn interpolate_crosses_antimeridian_the_short_way() {
        let east = GeoPoint::new(0.0, 179.9);
        let west = GeoPoint::new(0.0, -179.9);

        let quarter = interpolate(east, west, 0.25);
        assert!((quarter.lng - 179.95).abs() < 1e-9, "got {}", quarter.lng);

        let three_quarters = interpolate(east, west, 0.75);
        assert!((three_quarters.lng + 179.95).abs() < 1e-9, "got {}", three_quarters.lng);

        let back = interpolate(west, east, 0.25);
        assert!((back.lng + 179.95).abs() < 1e-9, "got {}", back.lng);
    }

    #[test]
    fn half_diagonal_of_small_viewport() {
        let vp = Viewport::around(GeoPoint::new(35.0, 139.0), 0.02, 0.02, 14.0);
        let d = half_diagonal_meters(&vp);
        // ~1112 m north-south and ~911 m east-west at this latitude
        assert!(d > 1300.0 && d < 1500.0, "got {d}");
    }
}
