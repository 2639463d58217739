use chrono::NaiveDate;
use std::collections::BTreeSet;
use timeline4d_core::{
    CategoryCounts, EngineError, InMemoryScene, ReportSink, SceneCall, SceneError, ScheduleEntry,
    ScheduleRecord, SelectionReport, SliderSink, TimelineAdapter, TimelineEngine, TimelineError,
};

struct NoSlider;

impl SliderSink for NoSlider {
    fn set_position(&mut self, _percent: f64) {}
    fn set_label(&mut self, _label: &str) {}
}

struct NoReports;

impl ReportSink for NoReports {
    fn report_categories(&mut self, _counts: &CategoryCounts) {}
    fn report_selection(&mut self, _report: &SelectionReport) {}
}

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid test date")
}

fn records(json: &str) -> Vec<ScheduleRecord> {
    serde_json::from_str(json).expect("schedule json")
}

fn staggered_schedule() -> Vec<ScheduleEntry> {
    vec![
        ScheduleEntry::new(10, Some(ymd(2024, 3, 1)), Some(ymd(2024, 3, 5))),
        ScheduleEntry::new(11, Some(ymd(2024, 3, 4)), Some(ymd(2024, 3, 12))),
        ScheduleEntry::new(12, Some(ymd(2024, 3, 10)), Some(ymd(2024, 3, 10))),
        ScheduleEntry::new(13, Some(ymd(2024, 3, 15)), Some(ymd(2024, 3, 30))),
        ScheduleEntry::new(14, None, Some(ymd(2024, 3, 20))),
        ScheduleEntry::new(15, Some(ymd(2024, 3, 2)), None),
    ]
}

#[test]
fn single_entry_is_highlighted_at_start_and_finished_at_end() {
    let mut engine = TimelineEngine::default();
    engine
        .load_records(&records(
            r#"[{"elementId": 1, "startDate": "2024-01-01", "endDate": "2024-01-10"}]"#,
        ))
        .expect("load");
    let mut scene = InMemoryScene::new();

    let start = engine.apply_percent(0.0, &mut scene).expect("apply 0");
    assert_eq!(engine.state().current.map(|at| at.date()), Some(ymd(2024, 1, 1)));
    assert_eq!(start.visible_ids(), vec![1]);
    assert_eq!(start.highlighted_ids(), vec![1]);

    let end = engine.apply_percent(100.0, &mut scene).expect("apply 100");
    assert_eq!(engine.state().current.map(|at| at.date()), Some(ymd(2024, 1, 11)));
    assert_eq!(end.visible_ids(), vec![1]);
    assert!(end.highlighted.is_empty());
    assert!(scene.highlights().is_empty());
}

#[test]
fn entry_without_start_never_shows_or_stretches_bounds() {
    let mut engine = TimelineEngine::default();
    let bounds = engine
        .load_records(&records(
            r#"[
                {"elementId": 1, "startDate": "2024-02-01", "endDate": "2024-02-05"},
                {"elementId": 2, "startDate": null, "endDate": "2024-02-05"}
            ]"#,
        ))
        .expect("load");
    assert_eq!(bounds.earliest(), ymd(2024, 2, 1));
    assert_eq!(bounds.latest(), ymd(2024, 2, 6));

    let mut scene = InMemoryScene::new();
    for percent in [0.0, 10.0, 33.3, 50.0, 75.0, 99.9, 100.0] {
        let partition = engine.apply_percent(percent, &mut scene).expect("apply");
        assert!(!partition.visible.contains(&2), "visible at {percent}");
        assert!(!partition.highlighted.contains(&2), "highlighted at {percent}");
        assert!(!scene.is_visible(2));
    }
}

#[test]
fn empty_load_fails_and_keeps_prior_visuals() {
    let mut engine = TimelineEngine::default();
    engine
        .load(vec![ScheduleEntry::new(
            7,
            Some(ymd(2024, 5, 1)),
            Some(ymd(2024, 5, 3)),
        )])
        .expect("load");
    let mut scene = InMemoryScene::new();
    engine.apply_percent(50.0, &mut scene).expect("apply");
    scene.take_calls();
    let visible_before = scene.visible_ids();
    let state_before = engine.state();

    let err = engine.load(Vec::new()).expect_err("empty schedule");
    assert!(matches!(err, TimelineError::InvalidRange { .. }));
    assert!(scene.calls().is_empty());
    assert_eq!(scene.visible_ids(), visible_before);
    assert_eq!(engine.state(), state_before);
    assert_eq!(engine.entries().len(), 1);
}

#[test]
fn all_unparsable_dates_fail_with_invalid_range() {
    let mut engine = TimelineEngine::default();
    let err = engine
        .load_records(&records(
            r#"[
                {"elementId": 1, "startDate": "soon", "endDate": "2024-13-40"},
                {"elementId": 2}
            ]"#,
        ))
        .expect_err("no usable bounds");
    assert!(matches!(err, TimelineError::InvalidRange { .. }));
    assert!(engine.bounds().is_none());
}

#[test]
fn mapped_date_stays_within_bounds() {
    let mut engine = TimelineEngine::default();
    let bounds = engine.load(staggered_schedule()).expect("load");

    for step in 0..=200 {
        let percent = f64::from(step) / 2.0;
        let at = engine.date_at(percent).expect("date");
        assert!(bounds.contains(at), "{at} outside bounds at {percent}");
    }
    assert_eq!(engine.date_at(-20.0).expect("date").date(), bounds.earliest());
    assert_eq!(engine.date_at(250.0).expect("date").date(), bounds.latest());
}

#[test]
fn highlighted_is_subset_of_visible_and_visible_grows_monotonically() {
    let mut engine = TimelineEngine::default();
    engine.load(staggered_schedule()).expect("load");
    let mut scene = InMemoryScene::new();

    let mut previous: BTreeSet<i64> = BTreeSet::new();
    for step in 0..=20 {
        let percent = f64::from(step) * 5.0;
        let partition = engine.apply_percent(percent, &mut scene).expect("apply");
        assert!(partition.highlighted.is_subset(&partition.visible));
        assert!(
            previous.is_subset(&partition.visible),
            "visible set shrank at {percent}"
        );
        previous = partition.visible.clone();
    }
    assert_eq!(previous, BTreeSet::from([10, 11, 12, 13]));
}

#[test]
fn applying_the_same_date_twice_is_idempotent() {
    let mut engine = TimelineEngine::default();
    engine.load(staggered_schedule()).expect("load");
    let at = engine.date_at(40.0).expect("date");

    let mut once = InMemoryScene::new();
    engine.apply_date(at, &mut once);

    let mut twice = InMemoryScene::new();
    engine.apply_date(at, &mut twice);
    let first_calls = twice.take_calls();
    engine.apply_date(at, &mut twice);

    assert_eq!(twice.visible_ids(), once.visible_ids());
    assert_eq!(twice.highlights(), once.highlights());
    assert_eq!(twice.calls(), first_calls.as_slice());
}

#[test]
fn scene_updates_follow_hide_show_clear_recolor_order() {
    let mut engine = TimelineEngine::default();
    engine.load(staggered_schedule()).expect("load");
    let mut scene = InMemoryScene::new();

    let at = ymd(2024, 3, 4).and_hms_opt(0, 0, 0).expect("time");
    engine.apply_date(at, &mut scene);

    let color = engine.config().highlight_color;
    assert_eq!(
        scene.calls(),
        &[
            SceneCall::HideAll,
            SceneCall::Show(vec![10, 11]),
            SceneCall::ClearHighlights,
            SceneCall::SetHighlight(10, Some(color)),
            SceneCall::SetHighlight(11, Some(color)),
        ]
    );
}

#[test]
fn reset_twice_matches_reset_once() {
    let mut engine = TimelineEngine::default();
    engine.load(staggered_schedule()).expect("load");
    let mut scene = InMemoryScene::with_root(1, "Model");
    engine.apply_percent(60.0, &mut scene).expect("apply");

    engine.reset(Some(&mut scene));
    let snapshot = engine.snapshot();
    let visible = scene.visible_ids();
    engine.reset(Some(&mut scene));

    assert_eq!(engine.snapshot(), snapshot);
    assert_eq!(scene.visible_ids(), visible);
    assert!(scene.highlights().is_empty());
    assert!(engine.entries().is_empty());
    assert!(matches!(
        engine.apply_percent(10.0, &mut scene),
        Err(EngineError::Timeline(TimelineError::InvalidRange { .. }))
    ));
}

#[test]
fn reloading_drops_the_position_of_the_previous_schedule() {
    let mut adapter = TimelineAdapter::new(TimelineEngine::default(), NoSlider, NoReports);
    adapter
        .load_schedule(&records(
            r#"[{"elementId": 1, "startDate": "2024-01-01", "endDate": "2024-01-10"}]"#,
        ))
        .expect("first load");
    adapter.attach_ready_scene(InMemoryScene::new());
    adapter.on_slider_value(50.0).expect("apply");

    let bounds = adapter
        .load_schedule(&records(
            r#"[{"elementId": 2, "startDate": "2025-06-01", "endDate": "2025-06-10"}]"#,
        ))
        .expect("second load");
    assert_eq!(adapter.engine().state().current, None);
    assert_eq!(adapter.engine().current_partition(), None);

    let mut scene = adapter.detach_scene().expect("scene");
    scene.take_calls();
    assert_eq!(
        adapter.focus_in_progress(),
        Err(EngineError::Scene(SceneError::NotReady))
    );
    adapter.attach_ready_scene(scene);
    assert!(adapter.scene().expect("attached").calls().is_empty());
    assert_eq!(adapter.focus_in_progress().expect("focus"), Vec::<i64>::new());
    assert!(adapter.scene().expect("attached").calls().is_empty());

    adapter.on_slider_value(50.0).expect("apply");
    let current = adapter.engine().state().current.expect("current date");
    assert!(bounds.contains(current));
    assert_eq!(adapter.focus_in_progress().expect("focus"), vec![2]);
}
