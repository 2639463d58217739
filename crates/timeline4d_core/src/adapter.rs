//! Boundary adapter between UI/viewer signals and the engine.
//!
//! # Responsibility
//! - Turn slider input into mapper + evaluator passes.
//! - Attach the scene once its load task resolves and run aggregation.
//! - Relay category counts and selection state to the reporting sink.
//!
//! # Invariants
//! - Without an attached scene, timeline operations abort with
//!   `SceneNotReady`, log once, and change no state.
//! - Slider display and engine state are reset together.

use crate::engine::{EngineError, TimelineEngine};
use crate::extension::kernel::ToolRegistry;
use crate::model::schedule::{ElementId, ScheduleRecord};
use crate::model::timeline::{clamp_percent, TimelineBounds, PERCENT_MIN};
use crate::scene::readiness::SceneLoadTask;
use crate::scene::{SceneError, SceneMutator, SceneQuery};
use crate::service::category::{aggregate_categories, CategoryCounts};
use crate::service::selection::{PropertySource, SelectionReport};
use crate::service::visibility::{apply_partition, VisibilityPartition};
use log::{error, info, warn};

/// Slider control display.
pub trait SliderSink {
    fn set_position(&mut self, percent: f64);
    fn set_label(&mut self, label: &str);
}

/// Outward reporting channel.
pub trait ReportSink {
    fn report_categories(&mut self, counts: &CategoryCounts);
    fn report_selection(&mut self, report: &SelectionReport);
}

/// Parses the raw value of a range input event.
pub fn parse_slider_input(raw: &str) -> Result<f64, EngineError> {
    let trimmed = raw.trim();
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(clamp_percent(value)),
        _ => Err(EngineError::InvalidSliderInput(trimmed.to_string())),
    }
}

/// Glue owning the engine, the attached scene and the UI sinks.
pub struct TimelineAdapter<S, U, R> {
    engine: TimelineEngine,
    scene: Option<S>,
    slider: U,
    reports: R,
}

impl<S, U, R> TimelineAdapter<S, U, R>
where
    S: SceneQuery + SceneMutator,
    U: SliderSink,
    R: ReportSink,
{
    pub fn new(engine: TimelineEngine, slider: U, reports: R) -> Self {
        Self {
            engine,
            scene: None,
            slider,
            reports,
        }
    }

    pub fn engine(&self) -> &TimelineEngine {
        &self.engine
    }

    pub fn scene(&self) -> Option<&S> {
        self.scene.as_ref()
    }

    pub fn slider(&self) -> &U {
        &self.slider
    }

    pub fn reports(&self) -> &R {
        &self.reports
    }

    /// Normalizes and loads schedule records.
    ///
    /// Visuals are not touched; the next slider event applies the new schedule.
    pub fn load_schedule(
        &mut self,
        records: &[ScheduleRecord],
    ) -> Result<TimelineBounds, EngineError> {
        Ok(self.engine.load_records(records)?)
    }

    /// Handles one raw range-input event value.
    pub fn on_slider_input(&mut self, raw: &str) -> Result<VisibilityPartition, EngineError> {
        let percent = parse_slider_input(raw)?;
        self.on_slider_value(percent)
    }

    /// Maps `percent` to a date, applies it and updates the slider label.
    ///
    /// # Errors
    /// - `SceneNotReady` when no scene is attached.
    /// - `InvalidRange` when no schedule is loaded.
    pub fn on_slider_value(&mut self, percent: f64) -> Result<VisibilityPartition, EngineError> {
        let Some(scene) = self.scene.as_mut() else {
            warn!("event=timeline_apply module=adapter status=skipped reason=scene_not_ready");
            return Err(SceneError::NotReady.into());
        };

        let percent = clamp_percent(percent);
        let partition = self.engine.apply_percent(percent, scene)?;
        if let Some(at) = self.engine.state().current {
            let label = self.engine.config().format_label(at);
            self.slider.set_position(percent);
            self.slider.set_label(&label);
        }
        Ok(partition)
    }

    /// Awaits the one-shot scene load, then attaches the scene.
    ///
    /// Returns the category counts, or `None` when aggregation was skipped.
    ///
    /// # Errors
    /// - `LoadFailed` when the load task reports failure; nothing is attached.
    pub async fn attach_scene(
        &mut self,
        task: SceneLoadTask<S>,
    ) -> Result<Option<CategoryCounts>, EngineError> {
        match task.await {
            Ok(scene) => Ok(self.attach_ready_scene(scene)),
            Err(err) => {
                error!("event=scene_ready module=adapter status=error reason=\"{err}\"");
                Err(err.into())
            }
        }
    }

    /// Attaches an already loaded scene and runs the aggregation pass.
    ///
    /// A timeline position applied before the scene was ready is re-applied.
    pub fn attach_ready_scene(&mut self, scene: S) -> Option<CategoryCounts> {
        info!("event=scene_ready module=adapter status=ok");
        let scene = self.scene.insert(scene);

        if let Some(partition) = self.engine.current_partition() {
            apply_partition(&partition, self.engine.config().highlight_color, scene);
        }

        match aggregate_categories(&*scene) {
            Ok(counts) => {
                self.reports.report_categories(&counts);
                Some(counts)
            }
            Err(_) => None,
        }
    }

    /// Detaches and returns the current scene (e.g. before a new model load).
    pub fn detach_scene(&mut self) -> Option<S> {
        self.scene.take()
    }

    /// Forwards `select(ids)` to the scene.
    pub fn select(&mut self, ids: &[ElementId]) -> Result<(), EngineError> {
        let scene = self.require_scene("select")?;
        scene.select(ids);
        Ok(())
    }

    /// Isolates the elements in progress at the current timeline position.
    ///
    /// Returns the isolated ids; empty (and no scene call) when no position
    /// has been applied yet. Timeline state is not modified.
    pub fn focus_in_progress(&mut self) -> Result<Vec<ElementId>, EngineError> {
        let partition = self.engine.current_partition();
        let scene = self.require_scene("focus_in_progress")?;
        let Some(partition) = partition else {
            return Ok(Vec::new());
        };
        let ids = partition.highlighted_ids();
        scene.isolate(&ids);
        Ok(ids)
    }

    /// Runs a registered tool against the attached scene.
    pub fn activate_tool(
        &mut self,
        registry: &ToolRegistry,
        tool_id: &str,
        ids: &[ElementId],
    ) -> Result<(), EngineError> {
        let scene = self.require_scene("activate_tool")?;
        Ok(registry.activate(tool_id, scene, ids)?)
    }

    /// Resets engine state, viewer visuals (if attached) and slider display.
    pub fn reset(&mut self) {
        self.engine
            .reset(self.scene.as_mut().map(|scene| scene as &mut dyn SceneMutator));
        self.slider.set_position(PERCENT_MIN);
        self.slider.set_label(&self.engine.config().empty_label);
    }

    fn require_scene(&mut self, operation: &str) -> Result<&mut S, EngineError> {
        match self.scene.as_mut() {
            Some(scene) => Ok(scene),
            None => {
                warn!(
                    "event={operation} module=adapter status=skipped reason=scene_not_ready"
                );
                Err(SceneError::NotReady.into())
            }
        }
    }
}

impl<S, U, R> TimelineAdapter<S, U, R>
where
    S: SceneQuery + SceneMutator + PropertySource,
    U: SliderSink,
    R: ReportSink,
{
    /// Relays an external selection-changed signal to the reporting sink.
    ///
    /// Properties are attached when a scene is available.
    pub fn on_selection_changed(&mut self, ids: &[ElementId]) -> SelectionReport {
        let report = SelectionReport::from_ids(ids);
        let report = match self.scene.as_ref() {
            Some(scene) => report.with_properties(scene),
            None => report,
        };
        self.reports.report_selection(&report);
        report
    }
}
