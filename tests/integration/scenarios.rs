//! Document-review walkthroughs and definition rejection cases.

use flowstate::{Action, DefinitionInput, ErrorKind, State};

use crate::fixtures::{document_review, execute, service_with_review, start, state_of};

/// Happy path to a final state, then terminality.
#[test]
fn test_review_to_approval() {
    let service = service_with_review();
    let id = start(&service, "doc", None);
    assert_eq!(state_of(&service, &id), "draft");

    let summary = execute(&service, &id, "submit").unwrap();
    assert_eq!(summary.instance.current_state_id(), "review");
    assert_eq!(summary.instance.history().len(), 1);

    let summary = execute(&service, &id, "approve").unwrap();
    assert_eq!(summary.instance.current_state_id(), "approved");
    assert_eq!(summary.instance.history().len(), 2);
    assert!(summary.is_final);

    let err = execute(&service, &id, "submit").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InstanceAlreadyFinal);
    assert_eq!(service.get_instance(&id).unwrap().instance.history().len(), 2);
}

/// Two initial states are rejected and nothing is stored.
#[test]
fn test_two_initial_states_rejected() {
    let service = flowstate::WorkflowService::new();
    let input = DefinitionInput::new("twins", "Twins")
        .state(State::new("a", "A").initial())
        .state(State::new("b", "B").initial());

    let err = service.register_definition(input).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InitialStateCount);
    assert_eq!(
        service.get_definition("twins").unwrap_err().kind(),
        ErrorKind::DefinitionNotFound
    );
}

/// Re-registering an id fails and the first definition is untouched.
#[test]
fn test_duplicate_definition_keeps_first() {
    let service = service_with_review();
    let first = service.get_definition("doc").unwrap();

    let replacement = DefinitionInput::new("doc", "Replacement")
        .state(State::new("only", "Only").initial());
    let err = service.register_definition(replacement).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DuplicateDefinition);

    let current = service.get_definition("doc").unwrap();
    assert_eq!(*current, *first);
    assert_eq!(current.name, "Document review");
    assert_eq!(service.list_definitions().len(), 1);
}

/// An action targeting an undeclared state.
#[test]
fn test_unknown_target_state_rejected() {
    let service = flowstate::WorkflowService::new();
    let input = document_review("doc").action(Action::new(
        "publish",
        "Publish",
        ["approved"],
        "published",
    ));
    let err = service.register_definition(input).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnknownStateReference);
    assert!(service.list_definitions().is_empty());
}

/// An action whose sources do not include the current state.
#[test]
fn test_wrong_source_state_rejected() {
    let service = service_with_review();
    let id = start(&service, "doc", Some("e-1"));
    execute(&service, &id, "submit").unwrap();

    let err = execute(&service, &id, "submit").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidSourceState);
    assert_eq!(state_of(&service, &id), "review");
    assert_eq!(service.get_instance(&id).unwrap().instance.history().len(), 1);
}

#[test]
fn test_revise_loop_records_full_history() {
    let service = service_with_review();
    let id = start(&service, "doc", Some("loop"));
    for action in ["submit", "revise", "submit", "reject"] {
        execute(&service, &id, action).unwrap();
    }

    let summary = service.get_instance(&id).unwrap();
    let actions: Vec<_> = summary
        .instance
        .history()
        .iter()
        .map(|h| h.action_id.as_str())
        .collect();
    assert_eq!(actions, ["submit", "revise", "submit", "reject"]);

    let hops: Vec<_> = summary
        .instance
        .history()
        .iter()
        .map(|h| (h.from_state_id.as_str(), h.to_state_id.as_str()))
        .collect();
    assert_eq!(
        hops,
        [
            ("draft", "review"),
            ("review", "draft"),
            ("draft", "review"),
            ("review", "rejected"),
        ]
    );
    assert!(summary
        .instance
        .history()
        .windows(2)
        .all(|w| w[0].timestamp <= w[1].timestamp));
}

#[test]
fn test_available_actions_follow_state() {
    let service = service_with_review();
    let id = start(&service, "doc", None);

    let ids = |service: &flowstate::WorkflowService| -> Vec<String> {
        service
            .get_available_actions(&id)
            .unwrap()
            .into_iter()
            .map(|a| a.id)
            .collect()
    };

    assert_eq!(ids(&service), ["submit"]);
    execute(&service, &id, "submit").unwrap();
    assert_eq!(ids(&service), ["approve", "reject", "revise"]);
    execute(&service, &id, "approve").unwrap();
    assert!(ids(&service).is_empty());
}

#[test]
fn test_final_state_with_outgoing_action_stays_terminal() {
    let service = flowstate::WorkflowService::new();
    service
        .register_definition(
            document_review("doc").action(Action::new("reopen", "Reopen", ["approved"], "draft")),
        )
        .unwrap();
    let id = start(&service, "doc", None);
    execute(&service, &id, "submit").unwrap();
    execute(&service, &id, "approve").unwrap();

    assert!(service.get_available_actions(&id).unwrap().is_empty());
    for action in ["reopen", "submit", "approve", "reject", "revise"] {
        assert_eq!(
            execute(&service, &id, action).unwrap_err().kind(),
            ErrorKind::InstanceAlreadyFinal,
            "action {action} should be refused from a final state"
        );
    }
}

#[test]
fn test_disabled_action_never_available() {
    let service = flowstate::WorkflowService::new();
    service
        .register_definition(
            document_review("doc")
                .action(Action::new("skip", "Skip review", ["draft"], "approved").disabled()),
        )
        .unwrap();
    let id = start(&service, "doc", None);

    let available: Vec<_> = service
        .get_available_actions(&id)
        .unwrap()
        .into_iter()
        .map(|a| a.id)
        .collect();
    assert_eq!(available, ["submit"]);
    assert_eq!(
        execute(&service, &id, "skip").unwrap_err().kind(),
        ErrorKind::ActionDisabled
    );
}

#[test]
fn test_lookup_failures() {
    let service = service_with_review();
    assert_eq!(
        service.get_instance("ghost").unwrap_err().kind(),
        ErrorKind::InstanceNotFound
    );
    assert_eq!(
        execute(&service, "ghost", "submit").unwrap_err().kind(),
        ErrorKind::InstanceNotFound
    );

    let id = start(&service, "doc", None);
    assert_eq!(
        execute(&service, &id, "teleport").unwrap_err().kind(),
        ErrorKind::ActionNotFound
    );
}

#[test]
fn test_instances_are_independent() {
    let service = service_with_review();
    let a = start(&service, "doc", Some("a"));
    let b = start(&service, "doc", Some("b"));

    execute(&service, &a, "submit").unwrap();
    assert_eq!(state_of(&service, &a), "review");
    assert_eq!(state_of(&service, &b), "draft");

    let listed: Vec<_> = service
        .list_instances()
        .unwrap()
        .into_iter()
        .map(|s| s.instance.id().to_string())
        .collect();
    assert_eq!(listed, ["a", "b"]);
}

#[test]
fn test_duplicate_instance_id() {
    let service = service_with_review();
    start(&service, "doc", Some("same"));
    let err = service
        .start_instance(flowstate::StartInstanceInput {
            definition_id: "doc".to_string(),
            instance_id: Some("same".to_string()),
        })
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DuplicateInstanceId);
    assert_eq!(service.list_instances().unwrap().len(), 1);
}
