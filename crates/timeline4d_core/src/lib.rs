//! Core timeline engine for 4D construction-schedule playback.
//! Maps a slider position onto a schedule and drives scene visibility.

pub mod adapter;
pub mod config;
pub mod engine;
pub mod extension;
pub mod logging;
pub mod model;
pub mod scene;
pub mod service;

pub use adapter::{parse_slider_input, ReportSink, SliderSink, TimelineAdapter};
pub use config::{ConfigError, EngineConfig};
pub use engine::{EngineError, EngineSnapshot, TimelineEngine};
pub use extension::kernel::{ToolProvider, ToolRegistry, ToolRegistryError};
pub use logging::{default_log_level, init_logging, logging_status, LogTarget};
pub use model::date::{normalize_date, parse_schedule_date, DateParseError};
pub use model::schedule::{normalize_records, ElementId, ScheduleEntry, ScheduleRecord};
pub use model::timeline::{TimelineBounds, TimelineError, TimelineState};
pub use scene::memory::{InMemoryScene, SceneCall, SceneNodeSpec};
pub use scene::readiness::{scene_load_channel, SceneLoadSender, SceneLoadTask};
pub use scene::{HighlightColor, NodeId, SceneError, SceneMutator, SceneQuery};
pub use service::category::{aggregate_categories, CategoryCounts};
pub use service::selection::{PropertyIndex, PropertySource, RawProperty, SelectionReport};
pub use service::visibility::VisibilityPartition;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
