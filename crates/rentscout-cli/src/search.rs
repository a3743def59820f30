//! `search` command: one coordinator pass over a viewport, then the overlap
//! regions and, optionally, the listing sweep.

use anyhow::Context;

use rentscout_core::{AppConfig, GeoPoint, PriceFilter, SearchCategory, Viewport};
use rentscout_search::{
    find_listings, AmenityApiClient, CategoryRender, ListingApiClient, RegionListings,
    RenderSet, SearchCoordinator,
};
use rentscout_spatial::CircleMode;

use crate::SearchArgs;

const KM_PER_DEGREE_LAT: f64 = 111.195;
const MIN_REGION_RADIUS_METERS: f64 = 100.0;
const MAX_REGION_RADIUS_METERS: f64 = 800.0;

/// Square viewport of `span_km` on each side around the requested center.
pub(crate) fn viewport_from_args(args: &SearchArgs) -> Viewport {
    let span_lat = args.span_km / KM_PER_DEGREE_LAT;
    let cos_lat = args.lat.to_radians().cos().abs().max(0.01);
    let span_lng = (args.span_km / (KM_PER_DEGREE_LAT * cos_lat)).min(360.0);
    Viewport::around(GeoPoint::new(args.lat, args.lng), span_lat, span_lng, args.zoom)
}

/// # Errors
///
/// Returns an error if the categories file cannot be loaded, a client cannot
/// be built, the viewport is invalid, or the price filter is inverted.
/// Per-category and per-region lookup failures are reported, not returned.
pub(crate) async fn run_search(config: &AppConfig, args: &SearchArgs) -> anyhow::Result<()> {
    let file = rentscout_core::load_categories(&config.categories_path).with_context(|| {
        format!(
            "failed to load categories from {}",
            config.categories_path.display()
        )
    })?;
    let amenities =
        AmenityApiClient::from_config(config).context("failed to build amenity client")?;
    let coordinator = SearchCoordinator::from_categories_file(amenities, &file);

    let viewport = viewport_from_args(args);
    let summary = coordinator.search_all_enabled(viewport).await?;
    tracing::info!(
        categories = summary.outcomes.len(),
        failed = summary.failed(),
        "search pass complete"
    );

    let snapshot = coordinator.snapshot().await;
    let render = coordinator.render().await;
    let regions = coordinator
        .intersection_regions(
            CircleMode::PerCategory,
            MIN_REGION_RADIUS_METERS,
            MAX_REGION_RADIUS_METERS,
        )
        .await;

    let listings = if args.listings {
        let client =
            ListingApiClient::from_config(config).context("failed to build listing client")?;
        let price = PriceFilter {
            min: args.price_min,
            max: args.price_max,
        };
        Some(find_listings(&client, &regions, price).await?)
    } else {
        None
    };

    if args.json {
        let report = serde_json::json!({
            "viewport": viewport,
            "summary": summary,
            "snapshot": snapshot,
            "render": render,
            "regions": regions,
            "listings": listings,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "Searched {} categories around ({:.5}, {:.5}) at zoom {}",
        snapshot.categories.len(),
        viewport.center.lat,
        viewport.center.lng,
        viewport.zoom
    );
    for category in &snapshot.categories {
        println!("  {}", fmt_category(category));
    }
    println!(
        "{} locations, {} ready, {} failed",
        snapshot.stats.total_locations, snapshot.stats.ready_count, snapshot.stats.error_count
    );

    println!();
    for entry in &render {
        println!("  {}", fmt_render(entry));
    }

    println!();
    if regions.is_empty() {
        println!("No overlap regions found.");
    } else {
        println!("Top {} overlap regions:", regions.len());
        for region in &regions {
            println!(
                "  {:<24} ({:.5}, {:.5}) r={:>4.0}m score={:.2} [{}]",
                region.id,
                region.center.lat,
                region.center.lng,
                region.radius,
                region.score,
                region.participant_labels.join(", ")
            );
        }
    }

    if let Some(results) = listings {
        println!();
        print_listings(&results);
    }

    Ok(())
}

fn fmt_category(category: &SearchCategory) -> String {
    let state = if category.enabled {
        category.status.to_string()
    } else {
        "disabled".to_string()
    };
    let detail = match &category.error_message {
        Some(message) => format!(" - {message}"),
        None if category.enabled => format!(" - {} locations", category.locations.len()),
        None => String::new(),
    };
    format!("{:<14} {:<8}{detail}", category.id, state)
}

fn fmt_render(entry: &CategoryRender) -> String {
    let shapes = match &entry.shapes {
        RenderSet::Empty => "nothing to draw".to_string(),
        RenderSet::Clusters(clusters) => {
            let grouped = clusters.iter().filter(|c| c.count > 1).count();
            format!("{} clusters ({grouped} grouped)", clusters.len())
        }
        RenderSet::Circles(circles) => format!("{} circles", circles.len()),
    };
    format!("{:<14} {} {shapes}", entry.category_id, entry.color)
}

fn print_listings(results: &[RegionListings]) {
    for result in results {
        match &result.error {
            Some(err) => println!("  {}: lookup failed - {err}", result.region.id),
            None => {
                println!(
                    "  {}: {} listings",
                    result.region.id,
                    result.listings.len()
                );
                for listing in &result.listings {
                    let bedrooms = listing
                        .bedrooms
                        .map_or_else(|| "?".to_string(), |b| b.to_string());
                    println!(
                        "    {:<12} {:>10} {bedrooms}br  {}",
                        listing.id, listing.price, listing.title
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rentscout_core::{CategoryConfig, CategoryStatus};

    use super::*;

    fn args(lat: f64, span_km: f64) -> SearchArgs {
        SearchArgs {
            lat,
            lng: 139.7,
            zoom: 15.0,
            span_km,
            listings: false,
            price_min: None,
            price_max: None,
            json: false,
        }
    }

    fn category() -> SearchCategory {
        SearchCategory::from_config(&CategoryConfig {
            id: "coffee".to_string(),
            query: "coffee shop".to_string(),
            color: "#8b4513".to_string(),
            enabled: true,
            visible: true,
        })
    }

    #[test]
    fn viewport_spans_requested_kilometres() {
        let vp = viewport_from_args(&args(35.6, 2.0));
        assert!(vp.validate().is_ok());
        let lat_span_km = (vp.north - vp.south) * KM_PER_DEGREE_LAT;
        assert!((lat_span_km - 2.0).abs() < 1e-6);
        // Longitude degrees are shorter away from the equator.
        assert!(vp.east - vp.west > vp.north - vp.south);
    }

    #[test]
    fn viewport_near_pole_stays_valid() {
        let vp = viewport_from_args(&args(89.99, 50.0));
        assert!(vp.validate().is_ok());
    }

    #[test]
    fn category_line_shows_error_message() {
        let mut c = category();
        c.status = CategoryStatus::Error;
        c.error_message = Some("quota".to_string());
        let line = fmt_category(&c);
        assert!(line.contains("error"));
        assert!(line.ends_with("- quota"));
    }

    #[test]
    fn disabled_category_line() {
        let mut c = category();
        c.enabled = false;
        assert!(fmt_category(&c).contains("disabled"));
    }

    #[test]
    fn empty_render_line() {
        let entry = CategoryRender {
            category_id: "coffee".to_string(),
            color: "#8b4513".to_string(),
            shapes: RenderSet::Empty,
        };
        assert!(fmt_render(&entry).ends_with("nothing to draw"));
    }
}
