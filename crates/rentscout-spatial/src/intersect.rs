//! Ranked overlap regions among labeled coverage circles.
//!
//! Pairwise regions use a weighted point on the segment between the two
//! centers rather than the true lens centroid. Multi-way regions use the
//! centroid of all centers and must fall inside every circle.

use std::collections::HashMap;

use rentscout_core::{Circle, GeoPoint, IntersectionRegion};

use crate::geometry::{centroid, distance_meters, interpolate, point_in_circle};

/// Maximum number of regions returned.
pub const MAX_REGIONS: usize = 5;

/// Regions whose centers are closer than this are the same region.
pub const DEDUP_DISTANCE_METERS: f64 = 200.0;

const IDEAL_RADIUS_METERS: f64 = 500.0;
const MEMBER_WEIGHT: f64 = 0.2;
const PARTICIPANT_WEIGHT: f64 = 0.3;
const RADIUS_WEIGHT: f64 = 0.5;
const MULTI_WAY_BONUS: f64 = 0.5;

/// Compute the top overlap regions for `circles`, best first.
///
/// Circles with an invalid center or a non-positive radius are ignored. Two
/// circles with the same label never form a region on their own.
#[must_use]
pub fn intersect(
    circles: &[Circle],
    min_region_radius: f64,
    max_region_radius: f64,
) -> Vec<IntersectionRegion> {
    let (lo, hi) = if min_region_radius <= max_region_radius {
        (min_region_radius, max_region_radius)
    } else {
        (max_region_radius, min_region_radius)
    };

    let valid: Vec<&Circle> = circles
        .iter()
        .filter(|c| {
            let ok = c.center.is_valid() && c.radius.is_finite() && c.radius > 0.0;
            if !ok {
                tracing::warn!(circle = %c.id, label = %c.label, "ignoring invalid circle");
            }
            ok
        })
        .collect();

    let mut candidates = pairwise_regions(&valid, lo, hi);
    if valid.len() >= 3 {
        candidates.extend(multi_way_region(&valid, lo, hi));
    }

    let mut regions = dedup_regions(candidates);
    regions.truncate(MAX_REGIONS);
    regions
}

fn pairwise_regions(circles: &[&Circle], lo: f64, hi: f64) -> Vec<IntersectionRegion> {
    let mut regions = Vec::new();
    for (i, a) in circles.iter().enumerate() {
        for b in &circles[i + 1..] {
            if a.label == b.label {
                continue;
            }
            let d = distance_meters(a.center, b.center);
            if d > a.radius + b.radius {
                continue;
            }
            let center = interpolate(a.center, b.center, a.radius / (a.radius + b.radius));
            let radius = clamp((a.radius + b.radius - d) / 2.0, lo, hi);
            let labels = vec![a.label.clone(), b.label.clone()];
            let score = score_region(center, radius, labels.len(), circles, false);
            regions.push(IntersectionRegion {
                id: format!("pair-{}-{}", a.id, b.id),
                center,
                radius,
                participant_labels: labels,
                score,
            });
        }
    }
    regions
}

fn multi_way_region(circles: &[&Circle], lo: f64, hi: f64) -> Option<IntersectionRegion> {
    let labels = distinct_labels(circles);
    if labels.len() < 2 {
        return None;
    }

    let centers: Vec<GeoPoint> = circles.iter().map(|c| c.center).collect();
    let center = centroid(&centers).ok()?;
    if !circles
        .iter()
        .all(|c| point_in_circle(center, c.center, c.radius))
    {
        return None;
    }

    let depth = circles
        .iter()
        .map(|c| c.radius - distance_meters(center, c.center))
        .fold(f64::INFINITY, f64::min);
    if depth < lo {
        return None;
    }
    let radius = clamp(depth, lo, hi);
    let score = score_region(center, radius, labels.len(), circles, true);

    Some(IntersectionRegion {
        id: "multi-way".to_string(),
        center,
        radius,
        participant_labels: labels,
        score,
    })
}

/// `0.2` per circle center (one per location or category) inside the region,
/// `0.3` per participating category, up to `0.5` for a radius near 500 m, and
/// a flat `0.5` for multi-way agreement.
fn score_region(
    center: GeoPoint,
    radius: f64,
    participants: usize,
    circles: &[&Circle],
    multi_way: bool,
) -> f64 {
    let mut inside_by_label: HashMap<&str, usize> = HashMap::new();
    for c in circles {
        if point_in_circle(c.center, center, radius) {
            *inside_by_label.entry(c.label.as_str()).or_default() += 1;
        }
    }
    #[allow(clippy::cast_precision_loss)]
    let member_score: f64 = inside_by_label
        .values()
        .map(|&n| MEMBER_WEIGHT * n as f64)
        .sum();
    #[allow(clippy::cast_precision_loss)]
    let participant_score = PARTICIPANT_WEIGHT * participants as f64;
    let radius_score =
        RADIUS_WEIGHT * (1.0 - (radius - IDEAL_RADIUS_METERS).abs() / IDEAL_RADIUS_METERS);
    let bonus = if multi_way { MULTI_WAY_BONUS } else { 0.0 };

    member_score + participant_score + radius_score + bonus
}

/// Sort by score (stable, so ties keep discovery order) and drop any region
/// whose center is within [`DEDUP_DISTANCE_METERS`] of an already kept one.
fn dedup_regions(mut candidates: Vec<IntersectionRegion>) -> Vec<IntersectionRegion> {
    candidates.sort_by(|a, b| b.score.total_cmp(&a.score));
    let mut kept: Vec<IntersectionRegion> = Vec::with_capacity(candidates.len());
    for region in candidates {
        let duplicate = kept
            .iter()
            .any(|k| distance_meters(k.center, region.center) <= DEDUP_DISTANCE_METERS);
        if !duplicate {
            kept.push(region);
        }
    }
    kept
}

fn distinct_labels(circles: &[&Circle]) -> Vec<String> {
    let mut labels: Vec<String> = Vec::new();
    for c in circles {
        if !labels.contains(&c.label) {
            labels.push(c.label.clone());
        }
    }
    labels
}

fn clamp(value: f64, lo: f64, hi: f64) -> f64 {
    value.max(lo).min(hi)
}
