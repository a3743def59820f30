mod app_config;
mod categories;
mod category;
mod config;
mod geo;
mod listing;
mod location;
mod options;
mod shapes;

pub use app_config::{AppConfig, Environment};
pub use categories::{load_categories, CategoriesFile, CategoryConfig};
pub use category::{CategoryStatus, SearchCategory};
pub use config::{load_app_config, load_app_config_from_env};
pub use geo::{GeoPoint, Viewport, ViewportKey};
pub use listing::{Listing, PriceFilter};
pub use location::LocationRecord;
pub use options::{ClusteringConfig, SearchOptions};
pub use shapes::{Circle, IntersectionRegion, LocationCluster};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid coordinate ({lat}, {lng})")]
    InvalidCoordinate { lat: f64, lng: f64 },

    #[error("cannot compute a centroid of an empty point set")]
    EmptyInput,

    #[error("invalid viewport: {0}")]
    InvalidViewport(String),

    #[error("invalid price filter: min {min} is greater than max {max}")]
    InvalidPriceFilter {
        min: rust_decimal::Decimal,
        max: rust_decimal::Decimal,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read categories file {path}: {source}")]
    CategoriesFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse categories file: {0}")]
    CategoriesFileParse(#[from] serde_yaml::Error),

    #[error("configuration validation failed: {0}")]
    Validation(String),
}
