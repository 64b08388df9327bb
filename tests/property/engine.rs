use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use dagmake::context::Context;
use dagmake::errors::PipelineError;
use dagmake::fs::mock::MockFileSystem;
use dagmake::resource::Resource;
use dagmake::Pipeline;
use dagmake_test_utils::builders::{json_resource, recording_task, InvocationCounter};
use proptest::prelude::*;

/// A random pipeline shape: task `i` produces `r_i` and may only consume
/// outputs of tasks `0..i`, which keeps it acyclic.
#[derive(Debug, Clone)]
struct Shape {
    deps: Vec<BTreeSet<usize>>,
    /// Resources that already exist before the run.
    present: BTreeSet<usize>,
}

fn shape_strategy(max_tasks: usize) -> impl Strategy<Value = Shape> {
    (1..=max_tasks).prop_flat_map(|num_tasks| {
        (
            proptest::collection::vec(
                proptest::collection::vec(any::<usize>(), 0..num_tasks),
                num_tasks,
            ),
            proptest::collection::btree_set(0..num_tasks, 0..=num_tasks),
        )
            .prop_map(|(raw_deps, present)| {
                let deps = raw_deps
                    .into_iter()
                    .enumerate()
                    .map(|(i, potential)| {
                        if i == 0 {
                            BTreeSet::new()
                        } else {
                            potential.into_iter().map(|d| d % i).collect()
                        }
                    })
                    .collect();
                Shape { deps, present }
            })
    })
}

/// `start` plus every task that transitively consumes its output, read
/// straight off the shape.
fn consumers_closure(shape: &Shape, start: usize) -> BTreeSet<usize> {
    let mut found = BTreeSet::from([start]);
    let mut stack = vec![start];
    while let Some(producer) = stack.pop() {
        for (consumer, deps) in shape.deps.iter().enumerate() {
            if deps.contains(&producer) && found.insert(consumer) {
                stack.push(consumer);
            }
        }
    }
    found
}

struct Built {
    fs: MockFileSystem,
    counter: InvocationCounter,
    pipeline: Pipeline,
}

/// Register the shape, optionally adding extra (consumer, producer) edges.
fn build(shape: &Shape, extra: &[(usize, usize)]) -> Built {
    let fs = MockFileSystem::new();
    let counter = InvocationCounter::new();
    let resources: Vec<Arc<Resource>> = (0..shape.deps.len())
        .map(|i| json_resource(&fs, &format!("r_{i}"), &format!("r_{i}.json")))
        .collect();

    for &i in shape.present.iter() {
        fs.add_file(format!("r_{i}.json"), b"{}".to_vec());
    }

    let mut pipeline = Pipeline::new();
    for (i, deps) in shape.deps.iter().enumerate() {
        let mut inputs: Vec<&Arc<Resource>> = deps.iter().map(|&d| &resources[d]).collect();
        for &(consumer, producer) in extra {
            if consumer == i {
                inputs.push(&resources[producer]);
            }
        }
        pipeline
            .register(recording_task(
                &format!("task_{i}"),
                &inputs,
                &[&resources[i]],
                &counter,
            ))
            .unwrap();
    }

    Built { fs, counter, pipeline }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn run_invokes_each_task_at_most_once(
        shape in shape_strategy(8),
        pick in any::<usize>(),
    ) {
        let built = build(&shape, &[]);
        let target = format!("task_{}", pick % shape.deps.len());

        let report = built.pipeline.run(&[target.as_str()], &Context::new()).unwrap();

        let calls = built.counter.calls();
        let unique: HashSet<&String> = calls.iter().collect();
        prop_assert_eq!(unique.len(), calls.len());
        prop_assert_eq!(&calls, &report.executed);

        // The target's output exists afterwards.
        let idx = pick % shape.deps.len();
        let out = format!("r_{idx}.json");
        prop_assert!(built.fs.contents(&out).is_some());

        // Executed tasks are exactly those whose output was missing and needed.
        for name in report.executed.iter() {
            let i: usize = name.trim_start_matches("task_").parse().unwrap();
            prop_assert!(!shape.present.contains(&i));
        }
    }

    #[test]
    fn second_run_is_a_no_op(
        shape in shape_strategy(8),
    ) {
        let built = build(&shape, &[]);
        built.pipeline.run(&[], &Context::new()).unwrap();
        let first = built.counter.total();
        prop_assert!(first <= shape.deps.len());

        let report = built.pipeline.run(&[], &Context::new()).unwrap();
        prop_assert!(report.executed.is_empty());
        prop_assert_eq!(built.counter.total(), first);
        prop_assert_eq!(built.fs.files().len(), shape.deps.len());
    }

    #[test]
    fn cascade_undo_removes_exactly_the_downstream_closure(
        shape in shape_strategy(8),
        pick in any::<usize>(),
    ) {
        let built = build(&shape, &[]);
        built.pipeline.run(&[], &Context::new()).unwrap();

        let start = pick % shape.deps.len();
        let target = format!("task_{start}");
        let expected: BTreeSet<String> = consumers_closure(&shape, start)
            .into_iter()
            .map(|i| format!("task_{i}"))
            .collect();

        let report = built.pipeline.undo(Some(target.as_str()), &Context::new(), true).unwrap();
        let undone: BTreeSet<String> = report.undone.iter().cloned().collect();
        prop_assert_eq!(&undone, &expected);

        for i in 0..shape.deps.len() {
            let gone = built.fs.contents(format!("r_{i}.json")).is_none();
            prop_assert_eq!(gone, expected.contains(&format!("task_{i}")));
        }
    }

    #[test]
    fn reachable_cycle_invokes_nothing(
        shape in shape_strategy(8),
    ) {
        prop_assume!(shape.deps.len() >= 2);
        let last = shape.deps.len() - 1;
        // task_0 and task_last consume each other's output.
        let built = build(&shape, &[(0, last), (last, 0)]);

        let err = built
            .pipeline
            .run(&[format!("task_{last}").as_str()], &Context::new())
            .unwrap_err();

        prop_assert!(matches!(err, PipelineError::CyclicDependency { .. }), "{:?}", err);
        prop_assert_eq!(built.counter.total(), 0);
    }
}
