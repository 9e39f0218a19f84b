//! Integration tests for the add/validate lifecycle over real files.

use chrono::{NaiveDate, NaiveDateTime};
use misenplace_core::{
    summarize, Config, CoreError, DuplicatePolicy, Frequency, PerformanceTag, TaskKey,
    TaskLifecycleController, TaskStore,
};
use tempfile::TempDir;

fn day(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn at(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
}

fn controller(dir: &TempDir) -> TaskLifecycleController {
    TaskLifecycleController::from_config(&Config::default(), dir.path())
}

#[test]
fn test_full_kitchen_day() {
    let dir = TempDir::new().unwrap();
    let ctl = controller(&dir);
    let today = day("2026-10-16");

    ctl.add_task_on("Chop onions", Frequency::Daily, 15, today).unwrap();
    ctl.add_task_on("Clean walk-in", Frequency::Weekly, 60, today).unwrap();
    ctl.add_task_on("Sharpen knives", Frequency::Once, 20, today).unwrap();
    assert_eq!(ctl.due_on(today).unwrap().len(), 3);

    let (_, onions) = ctl
        .validate_task_at(&TaskKey::new("Chop onions"), 15, Some("Rosa"), at("2026-10-16 07:10:00"))
        .unwrap();
    let (_, walk_in) = ctl
        .validate_task_at(&TaskKey::new("Clean walk-in"), 80, Some("Ana"), at("2026-10-16 15:00:00"))
        .unwrap();
    let (_, knives) = ctl
        .validate_task_at(&TaskKey::new("Sharpen knives"), 30, None, at("2026-10-16 16:20:00"))
        .unwrap();

    assert_eq!((onions.efficiency, onions.tag), (100, PerformanceTag::Green));
    assert_eq!((walk_in.efficiency, walk_in.tag), (75, PerformanceTag::Yellow));
    assert_eq!((knives.efficiency, knives.tag), (66, PerformanceTag::Red));

    assert!(ctl.due_on(today).unwrap().is_empty());

    let tomorrow = day("2026-10-17");
    let due: Vec<_> = ctl
        .due_on(tomorrow)
        .unwrap()
        .into_iter()
        .map(|t| t.name)
        .collect();
    assert_eq!(due, vec!["Chop onions"]);

    let log = ctl.validation_log().unwrap();
    assert_eq!(log, vec![onions, walk_in, knives]);

    let summary = summarize(&log);
    assert_eq!(summary.len(), 3);
    assert_eq!(summary[0].cook, "Ana");
}

#[test]
fn test_duplicate_validation_grows_ledger_once() {
    let dir = TempDir::new().unwrap();
    let ctl = controller(&dir);
    ctl.add_task_on("Salsa roja", Frequency::Daily, 20, day("2026-10-16")).unwrap();
    let key = TaskKey::new("Salsa roja");

    ctl.validate_task_at(&key, 20, None, at("2026-10-16 08:00:00")).unwrap();
    let second = ctl.validate_task_at(&key, 20, None, at("2026-10-16 08:05:00"));
    assert!(matches!(second, Err(CoreError::AlreadyValidated { .. })));
    assert_eq!(ctl.validation_log().unwrap().len(), 1);

    // Next day is a new key.
    ctl.validate_task_at(&key, 25, None, at("2026-10-17 08:00:00")).unwrap();
    assert_eq!(ctl.validation_log().unwrap().len(), 2);
}

#[test]
fn test_per_cook_policy_from_config() {
    let dir = TempDir::new().unwrap();
    let mut config = Config::default();
    config.validation.duplicate_policy = DuplicatePolicy::TaskDateCook;
    let ctl = TaskLifecycleController::from_config(&config, dir.path());

    ctl.add_task_on("Curtido", Frequency::Daily, 10, day("2026-10-16")).unwrap();
    let key = TaskKey::new("Curtido");
    ctl.validate_task_at(&key, 10, Some("Rosa"), at("2026-10-16 08:00:00")).unwrap();
    ctl.validate_task_at(&key, 12, Some("Luis"), at("2026-10-16 08:10:00")).unwrap();

    let task = &ctl.store().load().unwrap()[0];
    assert_eq!(task.cook_name.as_deref(), Some("Luis"));
    assert_eq!(task.efficiency, Some(83));
}

#[test]
fn test_save_load_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let ctl = controller(&dir);
    ctl.add_task_on("Masa", Frequency::Daily, 30, day("2026-10-15")).unwrap();
    ctl.add_task_on("Frijoles", Frequency::Weekly, 45, day("2026-10-15")).unwrap();
    ctl.validate_task_at(&TaskKey::new("Masa"), 40, Some("Rosa"), at("2026-10-16 06:30:00"))
        .unwrap();

    let store = TaskStore::new(ctl.store().path());
    let before_bytes = std::fs::read(store.path()).unwrap();
    let first = store.load().unwrap();
    store.save(&first).unwrap();
    let second = store.load().unwrap();

    assert_eq!(first, second);
    assert_eq!(std::fs::read(store.path()).unwrap(), before_bytes);
}

#[test]
fn test_legacy_files_load_and_accept_new_validations() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("tasks.csv"),
        "Task Name,Frequency,Date,Completed,Cook Name,Prep Time (min),Target Time (min),Efficiency (%),Performance Tag,Last Validated Date,Is Due\n\
         Pupusa dough,daily,2026-10-15,True,,35.0,30,85.0,🟡,2026-10-15,True\n\
         Clean fryer,weekly,2026-10-09,True,,60.0,60,100.0,🟢,2026-10-09,True\n",
    )
    .unwrap();
    std::fs::write(
        dir.path().join("validations.csv"),
        "Task Name,Date,Prep Time (min),Target Time (min),Efficiency (%),Performance Tag,Validation Time\n\
         Clean fryer,2026-10-09,60,60,100,🟢,2026-10-09 22:10:00\n\
         Pupusa dough,2026-10-15,35,30,85,🟡,2026-10-15 06:00:00\n",
    )
    .unwrap();

    let ctl = controller(&dir);
    let today = day("2026-10-16");
    let due: Vec<_> = ctl.due_on(today).unwrap().into_iter().map(|t| t.name).collect();
    assert_eq!(due, vec!["Pupusa dough", "Clean fryer"]);

    let (task, _) = ctl
        .validate_task_at(&TaskKey::new("Clean fryer"), 50, None, at("2026-10-16 22:00:00"))
        .unwrap();
    assert_eq!(task.tag, Some(PerformanceTag::Green));
    assert_eq!(ctl.validation_log().unwrap().len(), 3);
}
