//! Shared registry and engine under parallel callers.

use std::sync::Arc;
use std::thread;

use flowstate::{Action, DefinitionInput, ErrorKind, State, WorkflowService};

use crate::fixtures::{document_review, execute, service_with_review, start, state_of};

const THREADS: usize = 8;

/// A single state with a self-loop, so every execute succeeds.
fn spinner() -> DefinitionInput {
    DefinitionInput::new("spin", "Spinner")
        .state(State::new("s", "Spinning").initial())
        .action(Action::new("spin", "Spin", ["s"], "s"))
}

#[test]
fn test_concurrent_register_same_id_single_winner() {
    let service = Arc::new(WorkflowService::new());

    let results: Vec<_> = thread::scope(|scope| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let service = Arc::clone(&service);
                scope.spawn(move || service.register_definition(document_review("doc")))
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let winners = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(winners, 1);
    assert!(results
        .iter()
        .filter_map(|r| r.as_ref().err())
        .all(|e| e.kind() == ErrorKind::DuplicateDefinition));
    assert_eq!(service.list_definitions().len(), 1);
}

#[test]
fn test_concurrent_execute_same_transition_applies_once() {
    let service = Arc::new(service_with_review());
    let id = start(&service, "doc", Some("race"));

    let results: Vec<_> = thread::scope(|scope| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let service = Arc::clone(&service);
                let id = id.clone();
                scope.spawn(move || execute(&service, &id, "submit"))
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results
        .iter()
        .filter_map(|r| r.as_ref().err())
        .all(|e| e.kind() == ErrorKind::InvalidSourceState));

    let summary = service.get_instance(&id).unwrap();
    assert_eq!(summary.instance.current_state_id(), "review");
    assert_eq!(summary.instance.history().len(), 1);
}

#[test]
fn test_concurrent_execute_loses_no_updates() {
    const PER_THREAD: usize = 50;

    let service = Arc::new(WorkflowService::new());
    service.register_definition(spinner()).unwrap();
    let id = start(&service, "spin", Some("wheel"));

    thread::scope(|scope| {
        for _ in 0..THREADS {
            let service = Arc::clone(&service);
            let id = id.clone();
            scope.spawn(move || {
                for _ in 0..PER_THREAD {
                    execute(&service, &id, "spin").unwrap();
                }
            });
        }
    });

    let summary = service.get_instance(&id).unwrap();
    assert_eq!(summary.instance.history().len(), THREADS * PER_THREAD);
    assert!(summary
        .instance
        .history()
        .iter()
        .all(|h| h.from_state_id == "s" && h.to_state_id == "s"));
}

#[test]
fn test_parallel_instances_progress_independently() {
    let service = Arc::new(service_with_review());
    let ids: Vec<_> = (0..THREADS)
        .map(|i| start(&service, "doc", Some(format!("doc-{i}").as_str())))
        .collect();

    thread::scope(|scope| {
        for (i, id) in ids.iter().enumerate() {
            let service = Arc::clone(&service);
            scope.spawn(move || {
                execute(&service, id, "submit").unwrap();
                let last = if i % 2 == 0 { "approve" } else { "reject" };
                execute(&service, id, last).unwrap();
            });
        }
    });

    for (i, id) in ids.iter().enumerate() {
        let expected = if i % 2 == 0 { "approved" } else { "rejected" };
        assert_eq!(state_of(&service, id), expected);
    }
}

#[test]
fn test_reads_during_writes_see_consistent_instances() {
    const PER_THREAD: usize = 100;

    let service = Arc::new(WorkflowService::new());
    service.register_definition(spinner()).unwrap();
    let id = start(&service, "spin", Some("wheel"));

    thread::scope(|scope| {
        let writer_service = Arc::clone(&service);
        let writer_id = id.clone();
        scope.spawn(move || {
            for _ in 0..PER_THREAD {
                execute(&writer_service, &writer_id, "spin").unwrap();
            }
        });

        let reader_service = Arc::clone(&service);
        let reader_id = id.clone();
        scope.spawn(move || {
            let mut last_len = 0;
            for _ in 0..PER_THREAD {
                let summary = reader_service.get_instance(&reader_id).unwrap();
                let len = summary.instance.history().len();
                // History only grows, and every snapshot is internally whole.
                assert!(len >= last_len);
                assert_eq!(summary.instance.current_state_id(), "s");
                last_len = len;
            }
        });
    });

    assert_eq!(
        service.get_instance(&id).unwrap().instance.history().len(),
        PER_THREAD
    );
}
