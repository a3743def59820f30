//! Region → listing sweep: one Listing Lookup per ranked intersection region.

use std::collections::HashSet;

use serde::Serialize;

use rentscout_core::{CoreError, IntersectionRegion, Listing, PriceFilter};

use crate::lookup::{ListingLookup, ListingRequest};

/// Listings found inside one region, or why the lookup failed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionListings {
    pub region: IntersectionRegion,
    pub listings: Vec<Listing>,
    pub error: Option<String>,
}

/// Queries `lookup` once per region, in order.
///
/// A failing region is recorded and the sweep moves on. A listing already
/// reported for an earlier region is not repeated.
///
/// # Errors
///
/// Returns [`CoreError::InvalidPriceFilter`] before any lookup when
/// `price.min > price.max`.
pub async fn find_listings<L: ListingLookup>(
    lookup: &L,
    regions: &[IntersectionRegion],
    price: PriceFilter,
) -> Result<Vec<RegionListings>, CoreError> {
    price.validate()?;

    let mut seen: HashSet<String> = HashSet::new();
    let mut results = Vec::with_capacity(regions.len());

    for region in regions {
        let request = ListingRequest {
            center: region.center,
            radius_meters: region.radius,
            price,
        };
        match lookup.find_listings(request).await {
            Ok(found) => {
                let total = found.len();
                let listings: Vec<Listing> = found
                    .into_iter()
                    .filter(|listing| seen.insert(listing.id.clone()))
                    .collect();
                tracing::info!(
                    region = %region.id,
                    total,
                    new = listings.len(),
                    "listings fetched for region"
                );
                results.push(RegionListings {
                    region: region.clone(),
                    listings,
                    error: None,
                });
            }
            Err(err) => {
                tracing::warn!(region = %region.id, error = %err, "listing lookup failed");
                results.push(RegionListings {
                    region: region.clone(),
                    listings: Vec::new(),
                    error: Some(err.to_string()),
                });
            }
        }
    }

    Ok(results)
}
