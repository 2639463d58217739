//! Timeline engine lifecycle.
//!
//! # Responsibility
//! - Own the schedule store, derived bounds and timeline state.
//! - Provide `load` / `apply` / `reset` entry points over scene capabilities.
//!
//! # Invariants
//! - Entries and bounds are stored as one unit; no reader can observe bounds
//!   of a different generation than the stored entries.
//! - A failed `load` leaves the previous schedule, state and visuals untouched.
//! - A successful `load` clears the timeline position; the current date is
//!   always inside the bounds of the stored schedule.
//! - `reset` reaches the same observable state as a freshly built engine and
//!   is idempotent.

use crate::config::{ConfigError, EngineConfig};
use crate::extension::kernel::ToolRegistryError;
use crate::model::schedule::{normalize_records, ScheduleEntry, ScheduleRecord};
use crate::model::timeline::{TimelineBounds, TimelineError, TimelineState};
use crate::scene::{SceneError, SceneMutator};
use crate::service::visibility::{evaluate, partition_at, VisibilityPartition};
use chrono::NaiveDateTime;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors surfaced by engine and adapter operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    Timeline(TimelineError),
    Scene(SceneError),
    Tool(ToolRegistryError),
    /// Slider input could not be read as a number.
    InvalidSliderInput(String),
}

impl Display for EngineError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Timeline(err) => write!(f, "{err}"),
            Self::Scene(err) => write!(f, "{err}"),
            Self::Tool(err) => write!(f, "{err}"),
            Self::InvalidSliderInput(value) => {
                write!(f, "slider input is not a number: `{value}`")
            }
        }
    }
}

impl Error for EngineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Timeline(err) => Some(err),
            Self::Scene(err) => Some(err),
            Self::Tool(err) => Some(err),
            Self::InvalidSliderInput(_) => None,
        }
    }
}

impl From<TimelineError> for EngineError {
    fn from(value: TimelineError) -> Self {
        Self::Timeline(value)
    }
}

impl From<SceneError> for EngineError {
    fn from(value: SceneError) -> Self {
        Self::Scene(value)
    }
}

impl From<ToolRegistryError> for EngineError {
    fn from(value: ToolRegistryError) -> Self {
        Self::Tool(value)
    }
}

/// Entries plus the bounds derived from exactly those entries.
#[derive(Debug, Clone, PartialEq, Eq)]
struct LoadedSchedule {
    entries: Vec<ScheduleEntry>,
    bounds: TimelineBounds,
}

/// Read-only view of engine state for diagnostics and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSnapshot {
    pub entry_count: usize,
    pub bounds: Option<TimelineBounds>,
    pub state: TimelineState,
}

/// Explicitly owned timeline engine.
#[derive(Debug, Clone, Default)]
pub struct TimelineEngine {
    config: EngineConfig,
    schedule: Option<LoadedSchedule>,
    state: TimelineState,
}

impl TimelineEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            schedule: None,
            state: TimelineState::default(),
        }
    }

    /// Builds an engine after checking `config`.
    ///
    /// # Errors
    /// - `ConfigError` when the label format or color is unusable.
    pub fn try_new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::new(config))
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Stored entries; empty before the first successful load and after reset.
    pub fn entries(&self) -> &[ScheduleEntry] {
        self.schedule
            .as_ref()
            .map(|schedule| schedule.entries.as_slice())
            .unwrap_or(&[])
    }

    pub fn bounds(&self) -> Option<TimelineBounds> {
        self.schedule.as_ref().map(|schedule| schedule.bounds)
    }

    pub fn state(&self) -> TimelineState {
        self.state
    }

    pub fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            entry_count: self.entries().len(),
            bounds: self.bounds(),
            state: self.state,
        }
    }

    /// Replaces the schedule store and its bounds in one step and clears
    /// the timeline position. Visuals are left as they are until the next apply.
    ///
    /// # Errors
    /// - `InvalidRange` when no usable bounds exist; prior state is kept.
    pub fn load(&mut self, entries: Vec<ScheduleEntry>) -> Result<TimelineBounds, TimelineError> {
        let bounds = match TimelineBounds::from_entries(&entries) {
            Ok(bounds) => bounds,
            Err(err) => {
                warn!(
                    "event=schedule_load module=engine status=error entries={} reason=\"{err}\"",
                    entries.len()
                );
                return Err(err);
            }
        };

        let complete = entries.iter().filter(|entry| entry.is_complete()).count();
        info!(
            "event=schedule_load module=engine status=ok entries={} complete={} earliest={} latest={}",
            entries.len(),
            complete,
            bounds.earliest(),
            bounds.latest()
        );
        // Why: a position applied against the previous schedule may lie
        // outside the new bounds; keeping it would pair new entries with a
        // date that was never applied for them.
        self.schedule = Some(LoadedSchedule { entries, bounds });
        self.state = TimelineState::default();
        Ok(bounds)
    }

    /// Normalizes raw records and loads them.
    pub fn load_records(
        &mut self,
        records: &[ScheduleRecord],
    ) -> Result<TimelineBounds, TimelineError> {
        self.load(normalize_records(records))
    }

    /// Maps a slider position onto the loaded timeline.
    pub fn date_at(&self, percent: f64) -> Result<NaiveDateTime, TimelineError> {
        self.bounds()
            .map(|bounds| bounds.date_at(percent))
            .ok_or(TimelineError::InvalidRange {
                reason: "no schedule is loaded",
            })
    }

    /// Maps `percent` to a date and applies it to `scene`.
    ///
    /// # Errors
    /// - `InvalidRange` when nothing is loaded; state and visuals are untouched.
    pub fn apply_percent(
        &mut self,
        percent: f64,
        scene: &mut dyn SceneMutator,
    ) -> Result<VisibilityPartition, EngineError> {
        let at = self.date_at(percent)?;
        Ok(self.apply_date(at, scene))
    }

    /// Applies the timeline point `at` to `scene` as a full recompute.
    pub fn apply_date(
        &mut self,
        at: NaiveDateTime,
        scene: &mut dyn SceneMutator,
    ) -> VisibilityPartition {
        self.state.current = Some(at);
        let partition = evaluate(self.entries(), at, self.config.highlight_color, scene);
        self.state.last_applied = Some(at);
        info!(
            "event=timeline_apply module=engine status=ok at={} visible={} highlighted={}",
            at,
            partition.visible.len(),
            partition.highlighted.len()
        );
        partition
    }

    /// Partition at the current position without touching any scene.
    pub fn current_partition(&self) -> Option<VisibilityPartition> {
        self.state
            .current
            .map(|at| partition_at(self.entries(), at.date()))
    }

    /// Clears schedule and timeline state; restores baseline visuals when a
    /// scene is given (show all, no highlights).
    pub fn reset(&mut self, scene: Option<&mut dyn SceneMutator>) {
        self.schedule = None;
        self.state = TimelineState::default();
        match scene {
            Some(scene) => {
                scene.show_all();
                scene.clear_highlights();
                info!("event=scene_reset module=engine status=ok visuals=restored");
            }
            None => info!("event=scene_reset module=engine status=ok visuals=detached"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{EngineError, TimelineEngine};
    use crate::config::{ConfigError, EngineConfig};
    use crate::model::schedule::ScheduleEntry;
    use crate::model::timeline::{TimelineError, TimelineState};
    use crate::scene::memory::{InMemoryScene, SceneCall};
    use chrono::NaiveDate;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid test date")
    }

    fn sample() -> Vec<ScheduleEntry> {
        vec![ScheduleEntry::new(
            1,
            Some(ymd(2024, 1, 1)),
            Some(ymd(2024, 1, 10)),
        )]
    }

    #[test]
    fn failed_load_keeps_previous_generation() {
        let mut engine = TimelineEngine::new(EngineConfig::default());
        let bounds = engine.load(sample()).expect("first load");

        let err = engine.load(Vec::new()).expect_err("empty load must fail");
        assert!(matches!(err, TimelineError::InvalidRange { .. }));
        assert_eq!(engine.entries(), sample().as_slice());
        assert_eq!(engine.bounds(), Some(bounds));
    }

    #[test]
    fn successful_load_clears_previous_position() {
        let mut engine = TimelineEngine::default();
        engine.load(sample()).expect("first load");
        let mut scene = InMemoryScene::new();
        engine.apply_percent(50.0, &mut scene).expect("apply");
        assert!(engine.state().current.is_some());

        let bounds = engine
            .load(vec![ScheduleEntry::new(
                2,
                Some(ymd(2025, 6, 1)),
                Some(ymd(2025, 6, 10)),
            )])
            .expect("second load");

        assert_eq!(engine.state(), TimelineState::default());
        assert_eq!(engine.current_partition(), None);
        engine.apply_percent(0.0, &mut scene).expect("apply");
        let current = engine.state().current.expect("current date");
        assert!(bounds.contains(current));
    }

    #[test]
    fn try_new_rejects_broken_label_format() {
        let config = EngineConfig {
            label_format: "%Y-%".to_string(),
            ..EngineConfig::default()
        };
        assert!(matches!(
            TimelineEngine::try_new(config),
            Err(ConfigError::InvalidLabelFormat(_))
        ));
        TimelineEngine::try_new(EngineConfig::default()).expect("defaults are valid");
    }

    #[test]
    fn apply_without_schedule_leaves_scene_untouched() {
        let mut engine = TimelineEngine::default();
        let mut scene = InMemoryScene::with_root(1, "Model");

        let err = engine
            .apply_percent(50.0, &mut scene)
            .expect_err("no schedule loaded");
        assert!(matches!(err, EngineError::Timeline(_)));
        assert!(scene.calls().is_empty());
        assert_eq!(engine.state().current, None);
    }

    #[test]
    fn apply_records_current_and_last_applied() {
        let mut engine = TimelineEngine::default();
        engine.load(sample()).expect("load");
        let mut scene = InMemoryScene::new();

        engine.apply_percent(0.0, &mut scene).expect("apply");
        let state = engine.state();
        assert_eq!(state.current.map(|at| at.date()), Some(ymd(2024, 1, 1)));
        assert_eq!(state.current, state.last_applied);
        assert!(engine.current_partition().expect("partition").highlighted.contains(&1));
    }

    #[test]
    fn reset_matches_fresh_engine_and_is_idempotent() {
        let fresh = TimelineEngine::default().snapshot();

        let mut engine = TimelineEngine::default();
        engine.load(sample()).expect("load");
        let mut scene = InMemoryScene::with_root(1, "Model");
        engine.apply_percent(40.0, &mut scene).expect("apply");

        engine.reset(Some(&mut scene));
        let once = engine.snapshot();
        let visible_once = scene.visible_ids();
        engine.reset(Some(&mut scene));

        assert_eq!(once, fresh);
        assert_eq!(engine.snapshot(), fresh);
        assert_eq!(scene.visible_ids(), visible_once);
        assert!(scene.highlights().is_empty());
        assert_eq!(scene.calls().last(), Some(&SceneCall::ClearHighlights));
    }
}
