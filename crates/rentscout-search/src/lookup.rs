//! Collaborator seams for the search coordinator, plus the wire shapes the
//! HTTP providers speak.

use std::future::Future;

use rentscout_core::{GeoPoint, Listing, LocationRecord, PriceFilter};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::LookupError;

/// One page request against an amenity provider.
#[derive(Debug, Clone, PartialEq)]
pub struct AmenityRequest {
    /// Stamped onto every returned [`LocationRecord`].
    pub category_id: String,
    pub query_text: String,
    pub center: GeoPoint,
    pub radius_meters: f64,
    /// Continuation token from the previous page; `None` for the first page.
    pub page: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AmenityPage {
    pub locations: Vec<LocationRecord>,
    pub next_page_token: Option<String>,
}

/// Text-and-proximity amenity search.
///
/// Implementations own their transport concerns, retries included.
pub trait AmenityLookup: Send + Sync + 'static {
    fn search(
        &self,
        request: AmenityRequest,
    ) -> impl Future<Output = Result<AmenityPage, LookupError>> + Send;
}

/// One area request against a listing provider.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingRequest {
    pub center: GeoPoint,
    pub radius_meters: f64,
    pub price: PriceFilter,
}

/// Rental listing search inside a circle.
pub trait ListingLookup: Send + Sync {
    fn find_listings(
        &self,
        request: ListingRequest,
    ) -> impl Future<Output = Result<Vec<Listing>, LookupError>> + Send;
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// `{ success, data: { locations, next_page_token }, error: { code, message } }`
#[derive(Debug, Deserialize)]
pub(crate) struct AmenityEnvelope {
    pub success: bool,
    #[serde(default)]
    pub data: Option<AmenityData>,
    #[serde(default)]
    pub error: Option<ApiErrorBody>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct AmenityData {
    #[serde(default)]
    pub locations: Vec<RawPlace>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawPlace {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub rating: Option<f32>,
}

impl AmenityEnvelope {
    /// Converts the envelope into a page, or the provider's refusal into
    /// [`LookupError::Upstream`].
    ///
    /// Places without coordinates are skipped here. Places with coordinates
    /// outside the valid range are passed through; the coordinator drops them.
    pub(crate) fn into_page(self, category_id: &str) -> Result<AmenityPage, LookupError> {
        if !self.success {
            let body = self.error.unwrap_or(ApiErrorBody {
                code: None,
                message: None,
            });
            return Err(LookupError::upstream(
                body.code.unwrap_or_else(|| "UNKNOWN".to_string()),
                body.message
                    .unwrap_or_else(|| "provider reported failure".to_string()),
            ));
        }

        let data = self.data.unwrap_or_default();
        let locations = data
            .locations
            .into_iter()
            .filter_map(|raw| raw.into_record(category_id))
            .collect();

        Ok(AmenityPage {
            locations,
            next_page_token: data.next_page_token.filter(|t| !t.is_empty()),
        })
    }
}

impl RawPlace {
    fn into_record(self, category_id: &str) -> Option<LocationRecord> {
        let (Some(lat), Some(lng)) = (self.lat, self.lng) else {
            tracing::debug!(
                category = category_id,
                id = ?self.id,
                "skipping place without coordinates"
            );
            return None;
        };
        // Providers occasionally omit ids; mint one so per-page dedup and
        // per-location circles still have a stable key.
        let id = self
            .id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        Some(LocationRecord {
            name: self.name.unwrap_or_else(|| id.clone()),
            id,
            point: GeoPoint::new(lat, lng),
            address: self.address,
            rating: self.rating,
            category_id: category_id.to_string(),
        })
    }
}

/// `{ "listings": [ ... ] }`
#[derive(Debug, Deserialize)]
pub(crate) struct ListingEnvelope {
    #[serde(default)]
    pub listings: Vec<RawListing>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawListing {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    pub lat: f64,
    pub lng: f64,
    pub price: Decimal,
    #[serde(default)]
    pub bedrooms: Option<u8>,
    #[serde(default)]
    pub url: Option<String>,
}

impl From<RawListing> for Listing {
    fn from(raw: RawListing) -> Self {
        Self {
            title: raw.title.unwrap_or_else(|| raw.id.clone()),
            id: raw.id,
            point: GeoPoint::new(raw.lat, raw.lng),
            price: raw.price,
            bedrooms: raw.bedrooms,
            url: raw.url,
        }
    }
}
