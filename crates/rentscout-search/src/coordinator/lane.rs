//! Per-category lane state and its transition table.
//!
//! Every write goes through [`Lane::apply`] (or one of the generation-bumping
//! helpers), under the lane's mutex, after comparing the caller's captured
//! generation with the current one.

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use rentscout_core::{CategoryConfig, CategoryStatus, LocationRecord, SearchCategory};

use super::render::RenderSet;

/// Inputs to [`reduce`].
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum CategoryAction {
    SearchStarted,
    SearchSucceeded {
        locations: Vec<LocationRecord>,
        at: DateTime<Utc>,
    },
    SearchFailed {
        message: String,
    },
    SetEnabled(bool),
    ToggleVisible,
    Reset {
        enabled: bool,
        visible: bool,
    },
}

/// The category transition table. Pure; generation gating happens in [`Lane`].
pub(crate) fn reduce(category: &mut SearchCategory, action: CategoryAction) {
    match action {
        CategoryAction::SearchStarted => {
            category.status = CategoryStatus::Loading;
            category.error_message = None;
        }
        CategoryAction::SearchSucceeded { locations, at } => {
            category.locations = locations;
            category.status = CategoryStatus::Ready;
            category.error_message = None;
            category.last_search_timestamp = Some(at);
        }
        CategoryAction::SearchFailed { message } => {
            category.status = CategoryStatus::Error;
            category.error_message = Some(message);
        }
        CategoryAction::SetEnabled(enabled) => {
            category.enabled = enabled;
            // A disabled lane has nothing in flight any more.
            if !enabled && category.status == CategoryStatus::Loading {
                category.status = CategoryStatus::Idle;
            }
        }
        CategoryAction::ToggleVisible => category.visible = !category.visible,
        CategoryAction::Reset { enabled, visible } => {
            category.enabled = enabled;
            category.visible = visible;
            category.locations.clear();
            category.status = CategoryStatus::Idle;
            category.error_message = None;
            category.last_search_timestamp = None;
        }
    }
}

/// Result of trying to write a search outcome into a lane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Applied {
    Yes,
    Superseded,
}

pub(crate) struct LaneState {
    pub category: SearchCategory,
    pub generation: u64,
    pub render: RenderSet,
}

pub(crate) struct Lane {
    config: CategoryConfig,
    state: Mutex<LaneState>,
}

impl Lane {
    pub(crate) fn new(config: CategoryConfig) -> Self {
        let category = SearchCategory::from_config(&config);
        Self {
            config,
            state: Mutex::new(LaneState {
                category,
                generation: 0,
                render: RenderSet::Empty,
            }),
        }
    }

    pub(crate) fn id(&self) -> &str {
        &self.config.id
    }

    pub(crate) fn color(&self) -> &str {
        &self.config.color
    }

    pub(crate) fn query(&self) -> &str {
        &self.config.query
    }

    /// Starts a new search if `admit` accepts the current category:
    /// invalidates any in-flight one, marks the lane `Loading` and returns the
    /// generation the new search owns. `None` leaves the lane untouched.
    pub(crate) async fn try_begin<F>(&self, admit: F) -> Option<u64>
    where
        F: FnOnce(&SearchCategory) -> bool,
    {
        let mut state = self.state.lock().await;
        if !admit(&state.category) {
            return None;
        }
        state.generation += 1;
        reduce(&mut state.category, CategoryAction::SearchStarted);
        Some(state.generation)
    }

    pub(crate) async fn is_current(&self, generation: u64) -> bool {
        self.state.lock().await.generation == generation
    }

    /// Applies `action` only if `generation` still owns the lane. `render`
    /// replaces the lane's render set when given.
    pub(crate) async fn apply(
        &self,
        generation: u64,
        action: CategoryAction,
        render: Option<RenderSet>,
    ) -> Applied {
        let mut state = self.state.lock().await;
        if state.generation != generation {
            return Applied::Superseded;
        }
        reduce(&mut state.category, action);
        if let Some(render) = render {
            state.render = render;
        }
        Applied::Yes
    }

    /// Flips `enabled`. Disabling invalidates the in-flight search and clears
    /// the render set; enabling rebuilds it from the retained locations with
    /// `rebuild`. Returns the new flag.
    pub(crate) async fn toggle_enabled<F>(&self, rebuild: F) -> bool
    where
        F: FnOnce(&[LocationRecord]) -> RenderSet,
    {
        let mut state = self.state.lock().await;
        let enabled = !state.category.enabled;
        if enabled {
            state.render = rebuild(&state.category.locations);
        } else {
            state.generation += 1;
            state.render = RenderSet::Empty;
        }
        reduce(&mut state.category, CategoryAction::SetEnabled(enabled));
        enabled
    }

    pub(crate) async fn toggle_visible(&self) -> bool {
        let mut state = self.state.lock().await;
        reduce(&mut state.category, CategoryAction::ToggleVisible);
        state.category.visible
    }

    /// Back to the configured defaults, invalidating any in-flight search.
    pub(crate) async fn reset(&self) {
        let mut state = self.state.lock().await;
        state.generation += 1;
        state.render = RenderSet::Empty;
        reduce(
            &mut state.category,
            CategoryAction::Reset {
                enabled: self.config.enabled,
                visible: self.config.visible,
            },
        );
    }

    pub(crate) async fn is_enabled(&self) -> bool {
        self.state.lock().await.category.enabled
    }

    pub(crate) async fn category(&self) -> SearchCategory {
        self.state.lock().await.category.clone()
    }

    /// Runs `f` against the locked state without cloning it out.
    pub(crate) async fn with_state<T>(&self, f: impl FnOnce(&LaneState) -> T) -> T {
        let state = self.state.lock().await;
        f(&state)
    }
}

#[cfg(test)]
mod tests {
    use rentscout_core::GeoPoint;

    use super::*;

    fn config() -> CategoryConfig {
        CategoryConfig {
            id: "coffee".to_string(),
            query: "coffee shop".to_string(),
            color: "#8b4513".to_string(),
            enabled: true,
            visible: true,
        }
    }

    fn record(id: &str) -> LocationRecord {
        LocationRecord {
            id: id.to_string(),
            name: id.to_string(),
            point: GeoPoint::new(35.0, 139.0),
            address: None,
            rating: None,
            category_id: "coffee".to_string(),
        }
    }

    #[test]
    fn reducer_walks_the_lifecycle() {
        let mut category = SearchCategory::from_config(&config());
        assert_eq!(category.status, CategoryStatus::Idle);

        reduce(&mut category, CategoryAction::SearchStarted);
        assert_eq!(category.status, CategoryStatus::Loading);

        reduce(
            &mut category,
            CategoryAction::SearchFailed {
                message: "quota".to_string(),
            },
        );
        assert_eq!(category.status, CategoryStatus::Error);
        assert_eq!(category.error_message.as_deref(), Some("quota"));

        reduce(&mut category, CategoryAction::SearchStarted);
        assert!(category.error_message.is_none());

        let now = Utc::now();
        reduce(
            &mut category,
            CategoryAction::SearchSucceeded {
                locations: vec![record("a")],
                at: now,
            },
        );
        assert_eq!(category.status, CategoryStatus::Ready);
        assert_eq!(category.locations.len(), 1);
        assert_eq!(category.last_search_timestamp, Some(now));
    }

    #[test]
    fn empty_result_is_ready_not_error() {
        let mut category = SearchCategory::from_config(&config());
        reduce(&mut category, CategoryAction::SearchStarted);
        reduce(
            &mut category,
            CategoryAction::SearchSucceeded {
                locations: Vec::new(),
                at: Utc::now(),
            },
        );
        assert_eq!(category.status, CategoryStatus::Ready);
        assert!(category.locations.is_empty());
    }

    #[test]
    fn disabling_while_loading_returns_to_idle() {
        let mut category = SearchCategory::from_config(&config());
        reduce(&mut category, CategoryAction::SearchStarted);
        reduce(&mut category, CategoryAction::SetEnabled(false));
        assert!(!category.enabled);
        assert_eq!(category.status, CategoryStatus::Idle);
    }

    #[test]
    fn reset_restores_defaults() {
        let mut category = SearchCategory::from_config(&config());
        reduce(&mut category, CategoryAction::SetEnabled(false));
        reduce(&mut category, CategoryAction::ToggleVisible);
        reduce(
            &mut category,
            CategoryAction::SearchSucceeded {
                locations: vec![record("a")],
                at: Utc::now(),
            },
        );
        reduce(
            &mut category,
            CategoryAction::Reset {
                enabled: true,
                visible: true,
            },
        );
        assert!(category.enabled && category.visible);
        assert!(category.locations.is_empty());
        assert_eq!(category.status, CategoryStatus::Idle);
        assert!(category.last_search_timestamp.is_none());
    }

    #[tokio::test]
    async fn stale_generation_cannot_write() {
        let lane = Lane::new(config());
        let first = lane.try_begin(|_| true).await.unwrap();
        let second = lane.try_begin(|_| true).await.unwrap();
        assert!(second > first);

        let applied = lane
            .apply(
                first,
                CategoryAction::SearchSucceeded {
                    locations: vec![record("stale")],
                    at: Utc::now(),
                },
                None,
            )
            .await;
        assert_eq!(applied, Applied::Superseded);

        let category = lane.category().await;
        assert_eq!(category.status, CategoryStatus::Loading);
        assert!(category.locations.is_empty());

        let applied = lane
            .apply(
                second,
                CategoryAction::SearchSucceeded {
                    locations: vec![record("fresh")],
                    at: Utc::now(),
                },
                None,
            )
            .await;
        assert_eq!(applied, Applied::Yes);
        assert_eq!(lane.category().await.locations[0].id, "fresh");
    }

    #[tokio::test]
    async fn disabling_invalidates_in_flight_search() {
        let lane = Lane::new(config());
        let generation = lane.try_begin(|_| true).await.unwrap();
        assert!(!lane.toggle_enabled(|_| RenderSet::Empty).await);
        assert!(!lane.is_current(generation).await);
    }

    #[tokio::test]
    async fn refused_start_leaves_lane_untouched() {
        let lane = Lane::new(config());
        let generation = lane.try_begin(|_| true).await.unwrap();
        lane.toggle_enabled(|_| RenderSet::Empty).await;

        assert!(lane.try_begin(|c| c.enabled).await.is_none());
        let category = lane.category().await;
        assert_eq!(category.status, CategoryStatus::Idle);
        assert!(!lane.is_current(generation).await);
        assert_eq!(lane.with_state(|s| s.generation).await, generation + 1);
    }

    #[tokio::test]
    async fn reset_invalidates_in_flight_search() {
        let lane = Lane::new(config());
        let generation = lane.try_begin(|_| true).await.unwrap();
        lane.reset().await;
        assert!(!lane.is_current(generation).await);
        assert_eq!(lane.category().await.status, CategoryStatus::Idle);
    }
}
