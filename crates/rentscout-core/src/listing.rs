use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{CoreError, GeoPoint};

/// A rental listing returned by the listing lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: String,
    pub title: String,
    pub point: GeoPoint,
    /// Monthly rent.
    pub price: Decimal,
    pub bedrooms: Option<u8>,
    pub url: Option<String>,
}

/// Optional inclusive rent bounds passed through to the listing lookup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceFilter {
    pub min: Option<Decimal>,
    pub max: Option<Decimal>,
}

impl PriceFilter {
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidPriceFilter`] when both bounds are set and
    /// `min > max`.
    pub fn validate(&self) -> Result<(), CoreError> {
        match (self.min, self.max) {
            (Some(min), Some(max)) if min > max => Err(CoreError::InvalidPriceFilter { min, max }),
            _ => Ok(()),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_filter_is_valid() {
        let filter = PriceFilter::default();
        assert!(filter.is_empty());
        assert!(filter.validate().is_ok());
    }

    #[test]
    fn inverted_filter_is_rejected() {
        let filter = PriceFilter {
            min: Some(Decimal::new(2000, 0)),
            max: Some(Decimal::new(1500, 0)),
        };
        let err = filter.validate().unwrap_err();
        assert!(err.to_string().contains("greater than max"));
    }

    #[test]
    fn one_sided_filter_is_valid() {
        let filter = PriceFilter {
            min: None,
            max: Some(Decimal::new(1500, 0)),
        };
        assert!(!filter.is_empty());
        assert!(filter.validate().is_ok());
    }
}
