use dagmake::context::Context;
use dagmake::engine::{DeletedResource, EngineEvent};
use dagmake::errors::PipelineError;
use dagmake::fs::mock::MockFileSystem;
use dagmake::Pipeline;
use dagmake_test_utils::builders::{json_resource, recording_task, InvocationCounter};
use dagmake_test_utils::recording::RecordingObserver;

/// `a → r1 → b → r2 → c → r3`, plus `solo → s` on the side.
fn chain(fs: &MockFileSystem, counter: &InvocationCounter) -> Pipeline {
    let r1 = json_resource(fs, "r1", "r1.json");
    let r2 = json_resource(fs, "r2", "r2.json");
    let r3 = json_resource(fs, "r3", "r3.json");
    let s = json_resource(fs, "s", "s.json");

    let mut pipeline = Pipeline::new();
    pipeline
        .register(recording_task("a", &[], &[&r1], counter))
        .unwrap()
        .register(recording_task("b", &[&r1], &[&r2], counter))
        .unwrap()
        .register(recording_task("c", &[&r2], &[&r3], counter))
        .unwrap()
        .register(recording_task("solo", &[], &[&s], counter))
        .unwrap();
    pipeline
}

fn built(fs: &MockFileSystem, counter: &InvocationCounter) -> Pipeline {
    let pipeline = chain(fs, counter);
    pipeline.run(&[], &Context::new()).unwrap();
    assert_eq!(fs.files().len(), 4);
    pipeline
}

#[test]
fn undo_without_cascade_removes_only_the_target_outputs() {
    let fs = MockFileSystem::new();
    let counter = InvocationCounter::new();
    let pipeline = built(&fs, &counter);

    let report = pipeline.undo(Some("b"), &Context::new(), false).unwrap();

    assert_eq!(report.undone, vec!["b"]);
    assert_eq!(
        report.deleted,
        vec![DeletedResource {
            task: "b".into(),
            resource: "r2".into(),
            location: "r2.json".into(),
        }]
    );
    assert!(fs.contents("r2.json").is_none());
    assert!(fs.contents("r1.json").is_some());
    assert!(fs.contents("r3.json").is_some());
}

#[test]
fn cascade_removes_every_consumer_and_nothing_unrelated() {
    let fs = MockFileSystem::new();
    let counter = InvocationCounter::new();
    let pipeline = built(&fs, &counter);

    let observer = RecordingObserver::new();
    let report = pipeline
        .undo_with(Some("a"), &Context::new(), true, &observer)
        .unwrap();

    // Consumers before the producers they read from.
    assert_eq!(report.undone, vec!["c", "b", "a"]);
    assert_eq!(observer.undone(), vec!["c", "b", "a"]);
    assert_eq!(report.deleted.len(), 3);
    assert_eq!(
        fs.files(),
        vec![std::path::PathBuf::from("s.json")]
    );
}

#[test]
fn cascade_from_the_middle_keeps_upstream() {
    let fs = MockFileSystem::new();
    let counter = InvocationCounter::new();
    let pipeline = built(&fs, &counter);

    let report = pipeline.undo(Some("b"), &Context::new(), true).unwrap();

    assert_eq!(report.undone, vec!["c", "b"]);
    assert!(fs.contents("r1.json").is_some());
    assert!(fs.contents("s.json").is_some());
}

#[test]
fn undo_without_target_clears_everything() {
    let fs = MockFileSystem::new();
    let counter = InvocationCounter::new();
    let pipeline = built(&fs, &counter);

    let report = pipeline.undo(None, &Context::new(), false).unwrap();

    assert_eq!(report.undone.len(), 4);
    let pos = |t: &str| report.undone.iter().position(|u| u == t).unwrap();
    assert!(pos("c") < pos("b"));
    assert!(pos("b") < pos("a"));
    assert!(fs.files().is_empty());
}

#[test]
fn deleting_absent_outputs_is_not_an_error() {
    let fs = MockFileSystem::new();
    let counter = InvocationCounter::new();
    let pipeline = chain(&fs, &counter);

    let observer = RecordingObserver::new();
    let report = pipeline
        .undo_with(Some("a"), &Context::new(), true, &observer)
        .unwrap();

    assert!(report.deleted.is_empty());
    assert_eq!(report.undone.len(), 3);
    assert!(observer.events().contains(&EngineEvent::ResourceAbsent {
        task: "a".into(),
        resource: "r1".into(),
        location: "r1.json".into(),
    }));

    // A second undo after a real one behaves the same.
    let pipeline = built(&fs, &counter);
    pipeline.undo(Some("c"), &Context::new(), false).unwrap();
    let again = pipeline.undo(Some("c"), &Context::new(), false).unwrap();
    assert!(again.deleted.is_empty());
}

#[test]
fn undo_then_run_reproduces_outputs() {
    let fs = MockFileSystem::new();
    let counter = InvocationCounter::new();
    let pipeline = built(&fs, &counter);
    let before: Vec<_> = fs.files().iter().map(|p| fs.contents(p)).collect();

    pipeline.undo(Some("a"), &Context::new(), true).unwrap();
    let report = pipeline.run(&["c"], &Context::new()).unwrap();

    assert_eq!(report.executed, vec!["a", "b", "c"]);
    let after: Vec<_> = fs.files().iter().map(|p| fs.contents(p)).collect();
    assert_eq!(before, after);
}

#[test]
fn undo_resolves_locations_from_context() {
    let fs = MockFileSystem::new();
    let counter = InvocationCounter::new();
    let daily = json_resource(&fs, "daily", "out/{date}.json");

    let mut pipeline = Pipeline::new();
    pipeline
        .register(recording_task("snap", &[], &[&daily], &counter))
        .unwrap();

    let jan = Context::new().with("date", "jan");
    let feb = Context::new().with("date", "feb");
    pipeline.run(&[], &jan).unwrap();
    pipeline.run(&[], &feb).unwrap();

    pipeline.undo(Some("snap"), &jan, false).unwrap();
    assert!(fs.contents("out/jan.json").is_none());
    assert!(fs.contents("out/feb.json").is_some());
}

#[test]
fn unknown_undo_target_is_reported() {
    let fs = MockFileSystem::new();
    let counter = InvocationCounter::new();
    let pipeline = chain(&fs, &counter);

    let err = pipeline.undo(Some("zzz"), &Context::new(), true).unwrap_err();
    assert!(matches!(err, PipelineError::TaskNotFound(name) if name == "zzz"));
}
