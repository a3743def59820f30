//! Coordinates, viewports, and the quantized viewport fingerprint used to
//! suppress redundant searches.

use serde::{Deserialize, Serialize};

use crate::CoreError;

/// Highest zoom level any supported map surface reports.
const MAX_ZOOM: f64 = 22.0;

/// A WGS84 coordinate in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// `true` when both components are finite and inside the WGS84 ranges.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }

    /// # Errors
    ///
    /// Returns [`CoreError::InvalidCoordinate`] when [`GeoPoint::is_valid`] is false.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(CoreError::InvalidCoordinate {
                lat: self.lat,
                lng: self.lng,
            })
        }
    }
}

/// The visible map rectangle plus its center and zoom level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
    pub center: GeoPoint,
    pub zoom: f64,
}

impl Viewport {
    /// Builds a viewport centered on `center` spanning `span_lat` by
    /// `span_lng` degrees.
    #[must_use]
    pub fn around(center: GeoPoint, span_lat: f64, span_lng: f64, zoom: f64) -> Self {
        Self {
            north: (center.lat + span_lat / 2.0).min(90.0),
            south: (center.lat - span_lat / 2.0).max(-90.0),
            east: (center.lng + span_lng / 2.0).min(180.0),
            west: (center.lng - span_lng / 2.0).max(-180.0),
            center,
            zoom,
        }
    }

    /// Rejects a viewport before any search is dispatched for it.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidViewport`] when the center is out of range,
    /// the bounds are inverted or non-finite, or the zoom is outside `0..=22`.
    pub fn validate(&self) -> Result<(), CoreError> {
        if !self.center.is_valid() {
            return Err(CoreError::InvalidViewport(format!(
                "center ({}, {}) is out of range",
                self.center.lat, self.center.lng
            )));
        }
        let corners = [
            GeoPoint::new(self.north, self.east),
            GeoPoint::new(self.south, self.west),
        ];
        if corners.iter().any(|p| !p.is_valid()) {
            return Err(CoreError::InvalidViewport(
                "bounds are out of range".to_string(),
            ));
        }
        if self.north < self.south {
            return Err(CoreError::InvalidViewport(format!(
                "north {} is below south {}",
                self.north, self.south
            )));
        }
        if !self.zoom.is_finite() || !(0.0..=MAX_ZOOM).contains(&self.zoom) {
            return Err(CoreError::InvalidViewport(format!(
                "zoom {} is outside 0..={MAX_ZOOM}",
                self.zoom
            )));
        }
        Ok(())
    }

    #[must_use]
    pub fn key(&self) -> ViewportKey {
        ViewportKey::from_viewport(self)
    }
}

/// Quantized viewport fingerprint: center rounded to the millidegree, zoom
/// rounded to the hundredth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewportKey {
    lat_milli: i64,
    lng_milli: i64,
    zoom_centi: i64,
}

impl ViewportKey {
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_viewport(viewport: &Viewport) -> Self {
        Self {
            lat_milli: (viewport.center.lat * 1000.0).round() as i64,
            lng_milli: (viewport.center.lng * 1000.0).round() as i64,
            zoom_centi: (viewport.zoom * 100.0).round() as i64,
        }
    }
}

impl std::fmt::Display for ViewportKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            self.lat_milli, self.lng_milli, self.zoom_centi
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport(lat: f64, lng: f64, zoom: f64) -> Viewport {
        Viewport::around(GeoPoint::new(lat, lng), 0.02, 0.02, zoom)
    }

    #[test]
    fn point_validity_bounds() {
        assert!(GeoPoint::new(90.0, 180.0).is_valid());
        assert!(GeoPoint::new(-90.0, -180.0).is_valid());
        assert!(!GeoPoint::new(90.1, 0.0).is_valid());
        assert!(!GeoPoint::new(0.0, -180.5).is_valid());
        assert!(!GeoPoint::new(f64::NAN, 0.0).is_valid());
        assert!(!GeoPoint::new(0.0, f64::INFINITY).is_valid());
    }

    #[test]
    fn validate_reports_coordinates() {
        let err = GeoPoint::new(120.0, 5.0).validate().unwrap_err();
        assert!(matches!(err, CoreError::InvalidCoordinate { lat, .. } if (lat - 120.0).abs() < f64::EPSILON));
    }

    #[test]
    fn keys_match_within_same_millidegree() {
        let a = viewport(35.000_1, 139.000_2, 14.0);
        let b = viewport(35.000_4, 139.000_4, 14.0);
        assert_eq!(a.key(), b.key());
    }

    #[test]
    fn keys_differ_on_zoom() {
        let a = viewport(35.0, 139.0, 14.0);
        let b = viewport(35.0, 139.0, 15.0);
        assert_ne!(a.key(), b.key());
    }

    #[test]
    fn keys_differ_on_movement() {
        let a = viewport(35.0, 139.0, 14.0);
        let b = viewport(35.002, 139.0, 14.0);
        assert_ne!(a.key(), b.key());
    }

    #[test]
    fn key_display_is_colon_separated() {
        assert_eq!(viewport(35.0, 139.0, 14.0).key().to_string(), "35000:139000:1400");
    }

    #[test]
    fn viewport_validation_rejects_bad_center() {
        let mut vp = viewport(35.0, 139.0, 14.0);
        vp.center = GeoPoint::new(95.0, 139.0);
        assert!(matches!(vp.validate(), Err(CoreError::InvalidViewport(_))));
    }

    #[test]
    fn viewport_validation_rejects_inverted_bounds() {
        let mut vp = viewport(35.0, 139.0, 14.0);
        std::mem::swap(&mut vp.north, &mut vp.south);
        let err = vp.validate().unwrap_err();
        assert!(err.to_string().contains("below south"));
    }

    #[test]
    fn viewport_validation_rejects_zoom_out_of_range() {
        assert!(viewport(35.0, 139.0, 23.0).validate().is_err());
        assert!(viewport(35.0, 139.0, f64::NAN).validate().is_err());
        assert!(viewport(35.0, 139.0, 0.0).validate().is_ok());
    }

    #[test]
    fn around_clamps_to_world_bounds() {
        let vp = Viewport::around(GeoPoint::new(89.99, 179.99), 1.0, 1.0, 3.0);
        assert!(vp.north <= 90.0);
        assert!(vp.east <= 180.0);
        assert!(vp.validate().is_ok());
    }
}
