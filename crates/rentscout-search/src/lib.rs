pub mod amenity_client;
pub mod coordinator;
pub mod error;
pub mod listing_client;
pub mod lookup;
pub(crate) mod retry;
pub mod sweep;

pub use amenity_client::AmenityApiClient;
pub use coordinator::{
    CategoryRender, CoordinatorSnapshot, LaneOutcome, RenderSet, SearchCoordinator, SearchStats,
    SearchSummary, ViewportDecision,
};
pub use error::{CoordinatorError, LookupError};
pub use listing_client::ListingApiClient;
pub use lookup::{AmenityLookup, AmenityPage, AmenityRequest, ListingLookup, ListingRequest};
pub use sweep::{find_listings, RegionListings};
