//! The search coordinator: one lane per amenity category, driven by viewport
//! events.
//!
//! Each lane follows `Idle → Loading → {Ready | Error} → Loading → …`. A
//! search captures the lane's generation when it starts and may only write
//! back while that generation is still current, so the most recently started
//! search for a category always wins regardless of response order. Viewport
//! events are deduplicated by [`ViewportKey`] and coalesced by a resettable
//! debounce timer.

mod debounce;
mod lane;
mod render;

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use tokio::sync::Mutex;

use rentscout_core::{
    CategoriesFile, CategoryConfig, CategoryStatus, Circle, ClusteringConfig, GeoPoint,
    IntersectionRegion, LocationRecord, SearchCategory, SearchOptions, Viewport, ViewportKey,
};
use rentscout_spatial::{coverage_circles, half_diagonal_meters, intersect, CircleMode};

use crate::error::{CoordinatorError, LookupError};
use crate::lookup::{AmenityLookup, AmenityRequest};

use debounce::Debouncer;
use lane::{Applied, CategoryAction, Lane};
pub use render::{CategoryRender, RenderSet};

/// What [`SearchCoordinator::on_viewport_changed`] did with an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewportDecision {
    /// A debounced search was (re)scheduled.
    Scheduled,
    /// Same key as the last search; nothing scheduled.
    Unchanged,
    /// Auto-update is off; the viewport was only remembered.
    Recorded,
}

/// How one lane's search ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum LaneOutcome {
    Ready { category_id: String, locations: usize },
    Failed { category_id: String, message: String },
    /// A newer search (or a toggle/clear) took the lane over; nothing written.
    Superseded { category_id: String },
}

impl LaneOutcome {
    #[must_use]
    pub fn category_id(&self) -> &str {
        match self {
            Self::Ready { category_id, .. }
            | Self::Failed { category_id, .. }
            | Self::Superseded { category_id } => category_id,
        }
    }
}

/// Outcomes of one batch, in category configuration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchSummary {
    pub outcomes: Vec<LaneOutcome>,
}

impl SearchSummary {
    #[must_use]
    pub fn failed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, LaneOutcome::Failed { .. }))
            .count()
    }

    #[must_use]
    pub fn superseded(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, LaneOutcome::Superseded { .. }))
            .count()
    }
}

/// Cross-category aggregates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SearchStats {
    pub is_any_loading: bool,
    pub error_count: usize,
    pub ready_count: usize,
    pub total_locations: usize,
}

impl SearchStats {
    fn from_categories(categories: &[SearchCategory]) -> Self {
        categories.iter().fold(Self::default(), |mut stats, c| {
            stats.is_any_loading |= c.status == CategoryStatus::Loading;
            match c.status {
                CategoryStatus::Error => stats.error_count += 1,
                CategoryStatus::Ready => stats.ready_count += 1,
                CategoryStatus::Idle | CategoryStatus::Loading => {}
            }
            stats.total_locations += c.locations.len();
            stats
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoordinatorSnapshot {
    pub categories: Vec<SearchCategory>,
    pub stats: SearchStats,
}

#[derive(Default)]
struct ViewportState {
    current: Option<Viewport>,
    last_searched: Option<ViewportKey>,
}

struct Inner<L> {
    lookup: L,
    options: SearchOptions,
    clustering: ClusteringConfig,
    lanes: Vec<Lane>,
    viewport: Mutex<ViewportState>,
    debounce: Debouncer,
    /// Bumped by `clear_all`; lanes only start while the epoch their batch
    /// captured is still current.
    epoch: AtomicU64,
}

/// Owns the category lanes and the amenity lookup. Cheap to clone; clones
/// share state.
pub struct SearchCoordinator<L> {
    inner: Arc<Inner<L>>,
}

impl<L> Clone for SearchCoordinator<L> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<L: AmenityLookup> SearchCoordinator<L> {
    /// Builds a coordinator with one `Idle` lane per category, in the given
    /// order. Expects already-validated configuration.
    pub fn new(
        lookup: L,
        categories: &[CategoryConfig],
        options: SearchOptions,
        clustering: ClusteringConfig,
    ) -> Self {
        let debounce = Debouncer::new(Duration::from_millis(options.debounce_ms));
        Self {
            inner: Arc::new(Inner {
                lookup,
                lanes: categories.iter().cloned().map(Lane::new).collect(),
                options,
                clustering,
                viewport: Mutex::new(ViewportState::default()),
                debounce,
                epoch: AtomicU64::new(0),
            }),
        }
    }

    pub fn from_categories_file(lookup: L, file: &CategoriesFile) -> Self {
        Self::new(
            lookup,
            &file.categories,
            file.search.clone(),
            file.clustering.clone(),
        )
    }

    #[must_use]
    pub fn options(&self) -> &SearchOptions {
        &self.inner.options
    }

    /// Handles a pan/zoom event.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinatorError::Validation`] for a malformed viewport;
    /// nothing is recorded or scheduled in that case.
    pub async fn on_viewport_changed(
        &self,
        viewport: Viewport,
    ) -> Result<ViewportDecision, CoordinatorError> {
        viewport.validate()?;
        let key = viewport.key();
        let unchanged = {
            let mut state = self.inner.viewport.lock().await;
            state.current = Some(viewport);
            if !self.inner.options.auto_update {
                return Ok(ViewportDecision::Recorded);
            }
            state.last_searched == Some(key)
        };
        if unchanged {
            // Back at the searched viewport: a timer armed for an intermediate
            // one must not fire.
            let cancelled = self.inner.debounce.cancel().await;
            tracing::debug!(
                key = %key,
                pending_cancelled = cancelled,
                "viewport unchanged, skipping search"
            );
            return Ok(ViewportDecision::Unchanged);
        }

        let coordinator = self.clone();
        self.inner
            .debounce
            .schedule(async move { coordinator.run_debounced(viewport, key).await })
            .await;
        Ok(ViewportDecision::Scheduled)
    }

    async fn run_debounced(&self, viewport: Viewport, key: ViewportKey) {
        if self.inner.viewport.lock().await.last_searched == Some(key) {
            tracing::debug!(key = %key, "viewport already searched, skipping debounced search");
            return;
        }
        if let Err(err) = self.search_all_enabled(viewport).await {
            tracing::warn!(error = %err, "debounced search rejected");
        }
    }

    /// Starts (or restarts) the search of every enabled category.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinatorError::Validation`] for a malformed viewport.
    /// Lookup failures are recorded on the affected category and reported in
    /// the summary, never returned here.
    pub async fn search_all_enabled(
        &self,
        viewport: Viewport,
    ) -> Result<SearchSummary, CoordinatorError> {
        viewport.validate()?;
        let epoch = self.inner.epoch.load(Ordering::SeqCst);
        {
            let mut state = self.inner.viewport.lock().await;
            state.current = Some(viewport);
            state.last_searched = Some(viewport.key());
        }

        let mut enabled = Vec::new();
        for lane in &self.inner.lanes {
            if lane.is_enabled().await {
                enabled.push(lane);
            }
        }

        tracing::info!(
            categories = enabled.len(),
            parallel = self.inner.options.parallel_search,
            zoom = viewport.zoom,
            "starting search batch"
        );

        let outcomes = if self.inner.options.parallel_search {
            let pending: Vec<_> = enabled
                .iter()
                .map(|lane| self.run_lane(lane, &viewport, epoch, true))
                .collect();
            futures::future::join_all(pending).await
        } else {
            let mut outcomes = Vec::with_capacity(enabled.len());
            // Lanes disabled or cleared while waiting their turn come back
            // superseded without a request.
            for lane in enabled {
                outcomes.push(self.run_lane(lane, &viewport, epoch, true).await);
            }
            outcomes
        };

        Ok(SearchSummary { outcomes })
    }

    /// Searches one category, enabled or not, superseding any search already
    /// running for it.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinatorError::Validation`] for a malformed viewport or
    /// [`CoordinatorError::UnknownCategory`].
    pub async fn search_category(
        &self,
        category_id: &str,
        viewport: Viewport,
    ) -> Result<LaneOutcome, CoordinatorError> {
        viewport.validate()?;
        let lane = self.lane(category_id)?;
        let epoch = self.inner.epoch.load(Ordering::SeqCst);
        self.inner.viewport.lock().await.current = Some(viewport);
        Ok(self.run_lane(lane, &viewport, epoch, false).await)
    }

    /// Re-runs the search for the latest viewport, ignoring the dedup key.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinatorError::NoViewport`] before the first viewport
    /// event.
    pub async fn manual_search(&self) -> Result<SearchSummary, CoordinatorError> {
        self.inner.debounce.cancel().await;
        let viewport = {
            let mut state = self.inner.viewport.lock().await;
            state.last_searched = None;
            state.current.ok_or(CoordinatorError::NoViewport)?
        };
        self.search_all_enabled(viewport).await
    }

    /// Flips `enabled` for one category and returns the new value.
    ///
    /// Disabling invalidates the category's in-flight search and clears its
    /// rendered shapes without touching the network.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinatorError::UnknownCategory`].
    pub async fn toggle_category(&self, category_id: &str) -> Result<bool, CoordinatorError> {
        let lane = self.lane(category_id)?;
        let zoom = self.inner.viewport.lock().await.current.map(|v| v.zoom);
        let enabled = lane
            .toggle_enabled(|locations| match zoom {
                Some(zoom) => self.render_set(locations, lane.id(), zoom),
                None => RenderSet::Empty,
            })
            .await;
        tracing::info!(category = category_id, enabled, "category toggled");
        Ok(enabled)
    }

    /// Flips `visible` for one category and returns the new value.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinatorError::UnknownCategory`].
    pub async fn toggle_visibility(&self, category_id: &str) -> Result<bool, CoordinatorError> {
        Ok(self.lane(category_id)?.toggle_visible().await)
    }

    /// Resets every category to its configured defaults, invalidates all
    /// in-flight searches, stops running batches from starting further
    /// categories and drops any pending debounced search.
    pub async fn clear_all(&self) {
        self.inner.epoch.fetch_add(1, Ordering::SeqCst);
        let cancelled = self.inner.debounce.cancel().await;
        self.inner.viewport.lock().await.last_searched = None;
        for lane in &self.inner.lanes {
            lane.reset().await;
        }
        tracing::info!(pending_cancelled = cancelled, "all categories cleared");
    }

    pub async fn category(&self, category_id: &str) -> Option<SearchCategory> {
        match self.lane(category_id) {
            Ok(lane) => Some(lane.category().await),
            Err(_) => None,
        }
    }

    pub async fn snapshot(&self) -> CoordinatorSnapshot {
        let mut categories = Vec::with_capacity(self.inner.lanes.len());
        for lane in &self.inner.lanes {
            categories.push(lane.category().await);
        }
        let stats = SearchStats::from_categories(&categories);
        CoordinatorSnapshot { categories, stats }
    }

    pub async fn stats(&self) -> SearchStats {
        self.snapshot().await.stats
    }

    /// Render sets of every enabled and visible category, in configuration
    /// order.
    pub async fn render(&self) -> Vec<CategoryRender> {
        let mut out = Vec::new();
        for lane in &self.inner.lanes {
            let entry = lane
                .with_state(|state| {
                    (state.category.enabled && state.category.visible).then(|| CategoryRender {
                        category_id: lane.id().to_string(),
                        color: lane.color().to_string(),
                        shapes: state.render.clone(),
                    })
                })
                .await;
            out.extend(entry);
        }
        out
    }

    /// Coverage circles of every enabled category that has locations.
    pub async fn coverage_circles(&self, mode: CircleMode) -> Vec<Circle> {
        let mut per_category: Vec<(String, Vec<LocationRecord>)> = Vec::new();
        for lane in &self.inner.lanes {
            let entry = lane
                .with_state(|state| {
                    (state.category.enabled && !state.category.locations.is_empty())
                        .then(|| (lane.id().to_string(), state.category.locations.clone()))
                })
                .await;
            per_category.extend(entry);
        }
        coverage_circles(
            mode,
            per_category
                .iter()
                .map(|(id, locations)| (id.as_str(), locations.as_slice())),
            self.inner.options.circle_radius_meters,
        )
    }

    /// Ranked overlap regions of the current coverage circles.
    pub async fn intersection_regions(
        &self,
        mode: CircleMode,
        min_region_radius: f64,
        max_region_radius: f64,
    ) -> Vec<IntersectionRegion> {
        let circles = self.coverage_circles(mode).await;
        intersect(&circles, min_region_radius, max_region_radius)
    }

    /// Search radius for `viewport`: the bounds' half-diagonal grown by the
    /// expansion ratio, capped at `search_radius_meters`, and never below
    /// `circle_radius_meters`.
    #[must_use]
    pub fn search_radius(&self, viewport: &Viewport) -> f64 {
        let options = &self.inner.options;
        let reach = half_diagonal_meters(viewport) * (1.0 + options.bounds_expansion_ratio);
        reach
            .min(options.search_radius_meters)
            .max(options.circle_radius_meters)
    }

    fn lane(&self, category_id: &str) -> Result<&Lane, CoordinatorError> {
        self.inner
            .lanes
            .iter()
            .find(|lane| lane.id() == category_id)
            .ok_or_else(|| CoordinatorError::UnknownCategory(category_id.to_string()))
    }

    fn render_set(&self, locations: &[LocationRecord], category_id: &str, zoom: f64) -> RenderSet {
        RenderSet::build(
            locations,
            category_id,
            zoom,
            &self.inner.clustering,
            self.inner.options.circle_radius_meters,
        )
    }

    /// Runs one lane's search. The lane only starts if no `clear_all`
    /// happened since `epoch` was captured and, with `require_enabled`, if it
    /// is still enabled; both checks happen under the lane lock.
    async fn run_lane(
        &self,
        lane: &Lane,
        viewport: &Viewport,
        epoch: u64,
        require_enabled: bool,
    ) -> LaneOutcome {
        let category_id = lane.id().to_string();
        let started = lane
            .try_begin(|category| {
                (category.enabled || !require_enabled)
                    && self.inner.epoch.load(Ordering::SeqCst) == epoch
            })
            .await;
        let Some(generation) = started else {
            tracing::debug!(category = %category_id, "lane disabled or cleared before start");
            return LaneOutcome::Superseded { category_id };
        };
        let radius = self.search_radius(viewport);
        tracing::debug!(
            category = %category_id,
            generation,
            radius_meters = radius,
            "category search started"
        );

        let fetched = self
            .fetch_pages(lane, generation, viewport.center, radius)
            .await;

        match fetched {
            Ok(Some(locations)) => {
                let locations = sanitize(&category_id, locations);
                let count = locations.len();
                let render = self.render_set(&locations, &category_id, viewport.zoom);
                let action = CategoryAction::SearchSucceeded {
                    locations,
                    at: Utc::now(),
                };
                match lane.apply(generation, action, Some(render)).await {
                    Applied::Yes => {
                        tracing::info!(category = %category_id, generation, count, "category ready");
                        LaneOutcome::Ready {
                            category_id,
                            locations: count,
                        }
                    }
                    Applied::Superseded => superseded(category_id, generation),
                }
            }
            Ok(None) => superseded(category_id, generation),
            Err(err) => {
                let message = err.to_string();
                let action = CategoryAction::SearchFailed {
                    message: message.clone(),
                };
                match lane.apply(generation, action, None).await {
                    Applied::Yes => {
                        tracing::warn!(
                            category = %category_id,
                            generation,
                            error = %err,
                            "category search failed"
                        );
                        LaneOutcome::Failed {
                            category_id,
                            message,
                        }
                    }
                    Applied::Superseded => superseded(category_id, generation),
                }
            }
        }
    }

    /// Fetches up to `max_result_pages` pages. `Ok(None)` means the lane was
    /// superseded between pages and the remaining pages were not requested.
    async fn fetch_pages(
        &self,
        lane: &Lane,
        generation: u64,
        center: GeoPoint,
        radius_meters: f64,
    ) -> Result<Option<Vec<LocationRecord>>, LookupError> {
        let options = &self.inner.options;
        let mut locations = Vec::new();
        let mut token: Option<String> = None;

        for page in 0..options.max_result_pages.max(1) {
            if page > 0 {
                tokio::time::sleep(Duration::from_millis(options.page_stagger_ms)).await;
                if !lane.is_current(generation).await {
                    return Ok(None);
                }
            }

            let request = AmenityRequest {
                category_id: lane.id().to_string(),
                query_text: lane.query().to_string(),
                center,
                radius_meters,
                page: token.take(),
            };
            let result = self.inner.lookup.search(request).await?;
            tracing::debug!(
                category = lane.id(),
                page,
                count = result.locations.len(),
                "amenity page received"
            );
            locations.extend(result.locations);

            match result.next_page_token {
                Some(next) => token = Some(next),
                None => break,
            }
        }

        Ok(Some(locations))
    }
}

fn superseded(category_id: String, generation: u64) -> LaneOutcome {
    tracing::debug!(category = %category_id, generation, "discarding superseded result");
    LaneOutcome::Superseded { category_id }
}

/// Drops records with invalid coordinates and repeats of an id already seen.
fn sanitize(category_id: &str, locations: Vec<LocationRecord>) -> Vec<LocationRecord> {
    let mut seen = HashSet::new();
    locations
        .into_iter()
        .filter(|location| {
            if !location.has_valid_point() {
                tracing::warn!(
                    category = category_id,
                    location = %location.id,
                    lat = location.point.lat,
                    lng = location.point.lng,
                    "dropping location with invalid coordinates"
                );
                return false;
            }
            seen.insert(location.id.clone())
        })
        .collect()
}

#[cfg(test)]
#[path = "coordinator_test.rs"]
mod tests;
