//! Greedy agglomerative clustering of one category's locations.
//!
//! Deterministic for a given input order: seeds are taken front to back and
//! each working cluster absorbs candidates until a full scan adds nothing.
//! Quadratic in the worst case, which is fine for one page of amenity hits.

use rentscout_core::{ClusteringConfig, GeoPoint, LocationCluster, LocationRecord};

use crate::geometry::distance_meters;

/// Lower clamp for the radius of a multi-member cluster.
pub const MIN_CLUSTER_RADIUS_METERS: f64 = 100.0;

/// Fixed radius given to every singleton.
pub const SINGLETON_RADIUS_METERS: f64 = 200.0;

/// Whether a category with `count` locations should be clustered at `zoom`
/// rather than drawn as raw per-location circles.
#[must_use]
pub fn should_cluster(zoom: f64, count: usize, config: &ClusteringConfig) -> bool {
    zoom < config.cluster_min_zoom && count >= config.min_cluster_size
}

/// Partition `locations` into clusters and singletons.
///
/// Records with an invalid point are dropped; every other record appears in
/// exactly one output cluster.
#[must_use]
pub fn cluster(
    locations: &[LocationRecord],
    category_id: &str,
    config: &ClusteringConfig,
) -> Vec<LocationCluster> {
    let mut pool: Vec<LocationRecord> = Vec::with_capacity(locations.len());
    for location in locations {
        if location.has_valid_point() {
            pool.push(location.clone());
        } else {
            tracing::warn!(
                category = category_id,
                location = %location.id,
                lat = location.point.lat,
                lng = location.point.lng,
                "dropping location with invalid coordinates before clustering"
            );
        }
    }
    // Seeds are popped from the back, so reverse to honour input order.
    pool.reverse();

    let mut clusters = Vec::new();
    let mut cluster_index = 0usize;

    while let Some(seed) = pool.pop() {
        let mut members = vec![seed];
        grow(&mut members, &mut pool, config);

        if members.len() > 1 && members.len() >= config.min_cluster_size {
            let center = mean_point(&members);
            let observed = max_distance(&members, center);
            clusters.push(LocationCluster {
                id: format!("{category_id}-cluster-{cluster_index}"),
                center,
                count: members.len(),
                radius: observed.max(MIN_CLUSTER_RADIUS_METERS),
                members,
                category_id: category_id.to_string(),
            });
            cluster_index += 1;
        } else {
            clusters.extend(members.into_iter().map(|m| singleton(m, category_id)));
        }
    }

    clusters
}

/// Absorb candidates from `pool` (searched back to front, i.e. input order)
/// until a full scan adds nothing.
fn grow(members: &mut Vec<LocationRecord>, pool: &mut Vec<LocationRecord>, config: &ClusteringConfig) {
    loop {
        let mut added = false;
        let mut i = pool.len();
        while i > 0 {
            i -= 1;
            let candidate = pool[i].point;
            let current = mean_point(members);
            if distance_meters(candidate, current) > config.cluster_distance_meters {
                continue;
            }

            let mut points: Vec<GeoPoint> = members.iter().map(|m| m.point).collect();
            points.push(candidate);
            let tentative = mean_of(&points);
            let spread = points
                .iter()
                .map(|p| distance_meters(*p, tentative))
                .fold(0.0, f64::max);
            if spread > config.max_cluster_radius_meters {
                continue;
            }

            members.push(pool.remove(i));
            added = true;
        }
        if !added {
            break;
        }
    }
}

fn singleton(member: LocationRecord, category_id: &str) -> LocationCluster {
    LocationCluster {
        id: format!("{category_id}-single-{}", member.id),
        center: member.point,
        count: 1,
        radius: SINGLETON_RADIUS_METERS,
        members: vec![member],
        category_id: category_id.to_string(),
    }
}

fn mean_point(members: &[LocationRecord]) -> GeoPoint {
    let points: Vec<GeoPoint> = members.iter().map(|m| m.point).collect();
    mean_of(&points)
}

// Callers always pass at least the seed, so the empty case cannot occur.
fn mean_of(points: &[GeoPoint]) -> GeoPoint {
    crate::geometry::centroid(points).unwrap_or(GeoPoint::new(0.0, 0.0))
}

fn max_distance(members: &[LocationRecord], center: GeoPoint) -> f64 {
    members
        .iter()
        .map(|m| distance_meters(m.point, center))
        .fold(0.0, f64::max)
}
