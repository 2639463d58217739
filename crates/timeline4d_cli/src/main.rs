//! Schedule replay CLI.
//!
//! # Responsibility
//! - Load a schedule (and optionally a scene tree) from JSON files.
//! - Replay slider positions through the core adapter and print each result.
//! - Keep output deterministic so replays can be diffed.

use clap::Parser;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::Write;
use std::path::{Path, PathBuf};
use timeline4d_core::{
    CategoryCounts, ConfigError, EngineConfig, EngineError, InMemoryScene, ReportSink,
    SceneNodeSpec, ScheduleRecord, SelectionReport, SliderSink, TimelineAdapter, TimelineEngine,
};

#[derive(Parser, Debug)]
#[command(name = "timeline4d")]
#[command(about = "Replay a construction schedule against a scene tree")]
struct Cli {
    /// Schedule records: `[{"elementId": 1, "startDate": "2024-01-01", "endDate": "2024-01-10"}]`
    #[arg(long)]
    schedule: PathBuf,

    /// Scene tree: `{"id": 1, "name": "Model", "children": [...]}`
    #[arg(long)]
    scene: Option<PathBuf>,

    /// Slider positions to replay, in order.
    #[arg(long = "percent", default_values_t = [0.0, 50.0, 100.0])]
    percents: Vec<f64>,

    /// Engine config: `{"highlightColor": "#FF8C00", "emptyLabel": "N/A", "labelFormat": "%Y-%m-%d"}`.
    /// `TIMELINE4D_*` environment overrides are used when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    log_level: Option<String>,

    /// Absolute directory for rotating log files; stderr when omitted.
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

#[derive(Debug)]
enum CliError {
    Read { path: PathBuf, source: std::io::Error },
    Parse { path: PathBuf, source: serde_json::Error },
    Config(ConfigError),
    Engine(EngineError),
    Logging(String),
    Output(std::io::Error),
}

impl Display for CliError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read { path, source } => write!(f, "cannot read `{}`: {source}", path.display()),
            Self::Parse { path, source } => {
                write!(f, "cannot parse `{}`: {source}", path.display())
            }
            Self::Config(err) => write!(f, "{err}"),
            Self::Engine(err) => write!(f, "{err}"),
            Self::Logging(message) => write!(f, "{message}"),
            Self::Output(err) => write!(f, "cannot write output: {err}"),
        }
    }
}

impl Error for CliError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::Config(err) => Some(err),
            Self::Engine(err) => Some(err),
            Self::Logging(_) => None,
            Self::Output(err) => Some(err),
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<EngineError> for CliError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Output(value)
    }
}

/// Keeps the last label shown on the slider.
#[derive(Debug, Default)]
struct LabelCapture {
    label: String,
}

impl SliderSink for LabelCapture {
    fn set_position(&mut self, _percent: f64) {}

    fn set_label(&mut self, label: &str) {
        self.label = label.to_string();
    }
}

/// Keeps the most recent category summary.
#[derive(Debug, Default)]
struct SummaryCapture {
    categories: Option<CategoryCounts>,
}

impl ReportSink for SummaryCapture {
    fn report_categories(&mut self, counts: &CategoryCounts) {
        self.categories = Some(counts.clone());
    }

    fn report_selection(&mut self, _report: &SelectionReport) {}
}

fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(&cli) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), CliError> {
    let level = cli
        .log_level
        .as_deref()
        .unwrap_or(timeline4d_core::default_log_level());
    timeline4d_core::init_logging(level, cli.log_dir.as_deref()).map_err(CliError::Logging)?;
    info!(
        "event=cli_start module=cli status=ok version={}",
        timeline4d_core::core_version()
    );

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    replay(cli, load_config(cli)?, &mut out)
}

fn load_config(cli: &Cli) -> Result<EngineConfig, CliError> {
    match &cli.config {
        Some(path) => read_json(path),
        None => Ok(EngineConfig::from_env()?),
    }
}

fn replay(cli: &Cli, config: EngineConfig, out: &mut impl Write) -> Result<(), CliError> {
    let records: Vec<ScheduleRecord> = read_json(&cli.schedule)?;
    let scene = match &cli.scene {
        Some(path) => {
            let spec: SceneNodeSpec = read_json(path)?;
            InMemoryScene::from_spec(&spec).map_err(EngineError::from)?
        }
        None => InMemoryScene::new(),
    };

    let mut adapter = TimelineAdapter::new(
        TimelineEngine::try_new(config)?,
        LabelCapture::default(),
        SummaryCapture::default(),
    );
    let bounds = adapter.load_schedule(&records)?;
    writeln!(
        out,
        "bounds earliest={} latest={} entries={}",
        bounds.earliest(),
        bounds.latest(),
        adapter.engine().entries().len()
    )?;

    adapter.attach_ready_scene(scene);
    for percent in &cli.percents {
        let partition = adapter.on_slider_value(*percent)?;
        writeln!(
            out,
            "percent={} date={} visible={} highlighted={}",
            percent,
            adapter.slider().label,
            format_ids(&partition.visible_ids()),
            format_ids(&partition.highlighted_ids())
        )?;
    }

    if let Some(categories) = &adapter.reports().categories {
        for (category, count) in categories {
            writeln!(out, "category {category}={count}")?;
        }
    }
    Ok(())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, CliError> {
    let raw = std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| CliError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn format_ids(ids: &[i64]) -> String {
    let joined = ids
        .iter()
        .map(i64::to_string)
        .collect::<Vec<_>>()
        .join(",");
    format!("[{joined}]")
}

#[cfg(test)]
mod tests {
    use super::{load_config, replay, Cli, CliError};
    use clap::Parser;
    use std::path::Path;
    use timeline4d_core::{ConfigError, EngineConfig, EngineError, TimelineError};

    const SCHEDULE: &str = r#"[
        {"elementId": 1, "startDate": "2024-01-01", "endDate": "2024-01-10"},
        {"elementId": 2, "startDate": "2024-01-05", "endDate": "2024-01-08"}
    ]"#;

    const SCENE: &str = r#"{
        "id": 100,
        "name": "Model",
        "children": [
            {"id": 1, "name": "Walls [501]"},
            {"id": 101, "name": "Doors [502]", "children": [{"id": 2, "name": "Door"}, {"id": 3, "name": "Door"}]}
        ]
    }"#;

    fn write_file(dir: &Path, name: &str, contents: &str) -> String {
        let path = dir.join(name);
        std::fs::write(&path, contents).expect("write fixture");
        path.display().to_string()
    }

    fn replay_to_string(args: &[&str]) -> Result<String, CliError> {
        let cli = Cli::try_parse_from(args).expect("cli args");
        let mut out = Vec::new();
        replay(&cli, EngineConfig::default(), &mut out)?;
        Ok(String::from_utf8(out).expect("utf8 output"))
    }

    #[test]
    fn replays_default_percents_with_categories() {
        let dir = tempfile::tempdir().expect("temp dir");
        let schedule = write_file(dir.path(), "schedule.json", SCHEDULE);
        let scene = write_file(dir.path(), "scene.json", SCENE);

        let output = replay_to_string(&["timeline4d", "--schedule", &schedule, "--scene", &scene])
            .expect("replay");
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(
            lines,
            vec![
                "bounds earliest=2024-01-01 latest=2024-01-11 entries=2",
                "percent=0 date=2024-01-01 visible=[1] highlighted=[1]",
                "percent=50 date=2024-01-06 visible=[1,2] highlighted=[1,2]",
                "percent=100 date=2024-01-11 visible=[1,2] highlighted=[]",
                "category Doors=2",
                "category Walls=1",
            ]
        );
    }

    #[test]
    fn replays_requested_percents_without_scene() {
        let dir = tempfile::tempdir().expect("temp dir");
        let schedule = write_file(dir.path(), "schedule.json", SCHEDULE);

        let output = replay_to_string(&[
            "timeline4d",
            "--schedule",
            &schedule,
            "--percent",
            "40",
            "--percent",
            "150",
        ])
        .expect("replay");
        assert!(output.contains("percent=40 date=2024-01-05 visible=[1,2] highlighted=[1,2]"));
        assert!(output.contains("percent=150 date=2024-01-11"));
        assert!(!output.contains("category"));
    }

    #[test]
    fn config_file_sets_label_format() {
        let dir = tempfile::tempdir().expect("temp dir");
        let schedule = write_file(dir.path(), "schedule.json", SCHEDULE);
        let config = write_file(dir.path(), "config.json", r#"{"labelFormat": "%d.%m.%Y"}"#);

        let cli = Cli::try_parse_from([
            "timeline4d",
            "--schedule",
            schedule.as_str(),
            "--config",
            config.as_str(),
            "--percent",
            "0",
        ])
        .expect("cli args");
        let mut out = Vec::new();
        replay(&cli, load_config(&cli).expect("config"), &mut out).expect("replay");
        let output = String::from_utf8(out).expect("utf8 output");
        assert!(output.contains("percent=0 date=01.01.2024 "));
    }

    #[test]
    fn config_file_with_broken_label_format_is_rejected() {
        let dir = tempfile::tempdir().expect("temp dir");
        let schedule = write_file(dir.path(), "schedule.json", SCHEDULE);
        let config = write_file(dir.path(), "config.json", r#"{"labelFormat": "%Y-%"}"#);

        let cli = Cli::try_parse_from([
            "timeline4d",
            "--schedule",
            schedule.as_str(),
            "--config",
            config.as_str(),
        ])
        .expect("cli args");
        let err = replay(&cli, load_config(&cli).expect("config"), &mut Vec::<u8>::new())
            .expect_err("invalid label format");
        assert!(matches!(
            err,
            CliError::Config(ConfigError::InvalidLabelFormat(_))
        ));
    }

    #[test]
    fn empty_schedule_is_an_invalid_range() {
        let dir = tempfile::tempdir().expect("temp dir");
        let schedule = write_file(dir.path(), "schedule.json", "[]");

        let err = replay_to_string(&["timeline4d", "--schedule", &schedule])
            .expect_err("empty schedule");
        assert!(matches!(
            err,
            CliError::Engine(EngineError::Timeline(TimelineError::InvalidRange { .. }))
        ));
    }

    #[test]
    fn reports_unreadable_and_malformed_files() {
        let dir = tempfile::tempdir().expect("temp dir");
        let missing = dir.path().join("missing.json").display().to_string();
        assert!(matches!(
            replay_to_string(&["timeline4d", "--schedule", &missing]),
            Err(CliError::Read { .. })
        ));

        let broken = write_file(dir.path(), "broken.json", "{not json");
        assert!(matches!(
            replay_to_string(&["timeline4d", "--schedule", &broken]),
            Err(CliError::Parse { .. })
        ));
    }
}
