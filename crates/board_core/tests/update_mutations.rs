mod common;

use board_core::{
    update, Effect, Msg, ProjectDraft, ProjectId, ProjectStatus, SyncError, TaskKind, TaskStatus,
};
use chrono::Utc;
use common::{ids, init_logging, loaded, project, provisional_id, with_layout, with_revision};
use pretty_assertions::assert_eq;

fn create(name: &str) -> Msg {
    Msg::CreateRequested {
        draft: ProjectDraft::new(name),
        created_at: Utc::now(),
    }
}

fn canonical(id: &str, name: &str) -> board_core::Project {
    let mut project = project(id, name);
    project.tasks.clear();
    project
}

#[test]
fn create_inserts_provisional_then_swaps_in_canonical_id() {
    init_logging();
    let state = loaded(vec![project("a", "Alpha")]);
    let (state, effects) = update(state, create("Villa Alpha"));

    let provisional = provisional_id(&effects);
    assert_eq!(state.entries().len(), 2);
    let row = &state.entries()[1];
    assert!(row.provisional);
    assert_eq!(row.project.id, provisional);
    assert_eq!(row.project.name, "Villa Alpha");
    assert_eq!(row.project.status, ProjectStatus::Active);
    assert!(row.project.tasks.is_empty());
    assert!(state.is_loading());
    let key = row.key;

    let stored = canonical("65f0c2", "Villa Alpha");
    let (state, effects) = update(
        state,
        Msg::CreateCompleted {
            provisional_id: provisional,
            result: Ok(stored.clone()),
        },
    );
    assert_eq!(ids(&state), vec!["a", "65f0c2"]);
    assert_eq!(state.entries()[1].key, key);
    assert_eq!(state.entries()[1].project.name, "Villa Alpha");
    assert!(!state.entries()[1].provisional);
    assert!(!state.is_loading());
    assert_eq!(
        effects,
        vec![Effect::SaveSnapshot {
            generation: 2,
            projects: vec![project("a", "Alpha"), stored],
        }]
    );
}

#[test]
fn create_with_tasks_starts_every_task_pending() {
    init_logging();
    let draft = ProjectDraft::new("Tower")
        .with_task(TaskKind::Layout)
        .with_task(TaskKind::Other("Landscape".into()));
    let (state, _) = update(
        loaded(Vec::new()),
        Msg::CreateRequested {
            draft,
            created_at: Utc::now(),
        },
    );
    let tasks = &state.entries()[0].project.tasks;
    assert_eq!(tasks.len(), 2);
    assert!(tasks.iter().all(|t| t.status == TaskStatus::Pending));
}

#[test]
fn create_with_blank_name_is_rejected_locally() {
    init_logging();
    let (state, effects) = update(loaded(Vec::new()), create("   "));
    assert!(state.entries().is_empty());
    assert!(!state.is_loading());
    assert!(matches!(
        effects.as_slice(),
        [Effect::Rejected(SyncError::ValidationFailed(_))]
    ));
    assert!(matches!(
        state.last_error(),
        Some(SyncError::ValidationFailed(_))
    ));
}

#[test]
fn failed_create_keeps_provisional_row_until_next_refresh() {
    init_logging();
    let (state, effects) = update(loaded(Vec::new()), create("Villa Beta"));
    let provisional = provisional_id(&effects);
    let (state, effects) = update(
        state,
        Msg::CreateCompleted {
            provisional_id: provisional.clone(),
            result: Err(SyncError::RemoteUnavailable("timeout".into())),
        },
    );
    assert!(effects.is_empty());
    assert_eq!(ids(&state), vec![provisional.to_string()]);
    assert!(state.last_error().is_some());

    let (state, _) = update(state, Msg::RefreshRequested);
    let (state, _) = update(state, Msg::RefreshCompleted(Ok(Vec::new())));
    assert!(state.entries().is_empty());
}

#[test]
fn in_flight_create_survives_a_refresh() {
    init_logging();
    let (state, effects) = update(loaded(vec![project("a", "Alpha")]), create("Villa"));
    let provisional = provisional_id(&effects);
    let (state, _) = update(state, Msg::RefreshRequested);
    let (state, _) = update(state, Msg::RefreshCompleted(Ok(vec![project("b", "Beta")])));
    assert_eq!(ids(&state), vec!["b".to_string(), provisional.to_string()]);
}

#[test]
fn create_completing_after_refresh_delivered_it_leaves_one_row() {
    init_logging();
    let (state, effects) = update(loaded(Vec::new()), create("Villa"));
    let provisional = provisional_id(&effects);
    let stored = canonical("c1", "Villa");
    let (state, _) = update(state, Msg::RefreshRequested);
    let (state, _) = update(state, Msg::RefreshCompleted(Ok(vec![stored.clone()])));
    assert_eq!(state.entries().len(), 2);

    let (state, _) = update(
        state,
        Msg::CreateCompleted {
            provisional_id: provisional,
            result: Ok(stored),
        },
    );
    assert_eq!(ids(&state), vec!["c1"]);
}

#[test]
fn delete_removes_immediately_and_emits_remote_call() {
    init_logging();
    let state = loaded(vec![project("a", "Alpha"), project("b", "Beta")]);
    let (state, effects) = update(state, Msg::DeleteRequested { id: "a".into() });
    assert_eq!(ids(&state), vec!["b"]);
    assert_eq!(effects, vec![Effect::DeleteProject { id: "a".into() }]);
    assert!(state.is_loading());
}

#[test]
fn failed_delete_is_not_rolled_back() {
    init_logging();
    let state = loaded(vec![project("a", "Alpha")]);
    let (state, _) = update(state, Msg::DeleteRequested { id: "a".into() });
    let (state, effects) = update(
        state,
        Msg::DeleteCompleted {
            id: "a".into(),
            result: Err(SyncError::RemoteRejected {
                status: 404,
                reason: "Not Found".into(),
            }),
        },
    );
    assert!(effects.is_empty());
    assert!(state.entries().is_empty());
    assert!(matches!(
        state.last_error(),
        Some(SyncError::RemoteRejected { status: 404, .. })
    ));
}

#[test]
fn confirmed_delete_wins_over_refresh_that_completed_earlier() {
    init_logging();
    let state = loaded(vec![project("a", "Alpha")]);
    let (state, _) = update(state, Msg::DeleteRequested { id: "a".into() });
    let (state, _) = update(state, Msg::RefreshRequested);
    let (state, _) = update(state, Msg::RefreshCompleted(Ok(vec![project("a", "Alpha")])));
    assert_eq!(ids(&state), vec!["a"]);

    let (state, effects) = update(
        state,
        Msg::DeleteCompleted {
            id: "a".into(),
            result: Ok(()),
        },
    );
    assert!(state.entries().is_empty());
    assert_eq!(
        effects,
        vec![Effect::SaveSnapshot {
            generation: 3,
            projects: Vec::new(),
        }]
    );
}

#[test]
fn delete_of_unknown_or_provisional_project_is_rejected() {
    init_logging();
    let (state, effects) = update(loaded(Vec::new()), Msg::DeleteRequested { id: "zz".into() });
    assert_eq!(
        effects,
        vec![Effect::Rejected(SyncError::ProjectNotFound("zz".into()))]
    );

    let (state, effects) = update(state, create("Villa"));
    let provisional = provisional_id(&effects);
    let (state, effects) = update(state, Msg::DeleteRequested { id: provisional });
    assert_eq!(state.entries().len(), 1);
    assert!(matches!(
        effects.as_slice(),
        [Effect::Rejected(SyncError::ValidationFailed(_))]
    ));
}

#[test]
fn task_status_applies_optimistically_and_reconciles() {
    init_logging();
    let state = loaded(vec![project("a", "Alpha")]);
    let (state, effects) = update(
        state,
        Msg::TaskStatusRequested {
            id: "a".into(),
            task_key: "layout".into(),
            status: TaskStatus::Completed,
        },
    );
    assert_eq!(
        effects,
        vec![Effect::UpdateTaskStatus {
            id: "a".into(),
            task_key: "layout".into(),
            status: TaskStatus::Completed,
        }]
    );
    let layout = state.projects()[0].task("layout").cloned().unwrap();
    assert_eq!(layout.status, TaskStatus::Completed);

    let stored = with_revision(with_layout(project("a", "Alpha"), TaskStatus::Completed), 1);
    let (state, effects) = update(
        state,
        Msg::TaskStatusCompleted {
            id: "a".into(),
            result: Ok(stored.clone()),
        },
    );
    assert_eq!(state.projects(), vec![stored.clone()]);
    assert_eq!(
        effects,
        vec![Effect::SaveSnapshot {
            generation: 2,
            projects: vec![stored],
        }]
    );
}

#[test]
fn task_status_on_missing_task_or_project_is_rejected() {
    init_logging();
    let state = loaded(vec![project("a", "Alpha")]);
    let (state, effects) = update(
        state,
        Msg::TaskStatusRequested {
            id: "a".into(),
            task_key: "ext3D".into(),
            status: TaskStatus::InProgress,
        },
    );
    assert_eq!(
        effects,
        vec![Effect::Rejected(SyncError::TaskNotFound {
            project: ProjectId::new("a"),
            task: "ext3D".into(),
        })]
    );

    let (_, effects) = update(
        state,
        Msg::TaskStatusRequested {
            id: "nope".into(),
            task_key: "layout".into(),
            status: TaskStatus::InProgress,
        },
    );
    assert_eq!(
        effects,
        vec![Effect::Rejected(SyncError::ProjectNotFound("nope".into()))]
    );
}

#[test]
fn stale_task_status_completion_is_ignored() {
    init_logging();
    let state = loaded(vec![with_revision(project("a", "Alpha"), 7)]);
    let (state, _) = update(
        state,
        Msg::TaskStatusRequested {
            id: "a".into(),
            task_key: "layout".into(),
            status: TaskStatus::InProgress,
        },
    );
    let (state, effects) = update(
        state,
        Msg::TaskStatusCompleted {
            id: "a".into(),
            result: Ok(with_revision(project("a", "Alpha"), 6)),
        },
    );
    assert!(effects.is_empty());
    let held = &state.projects()[0];
    assert_eq!(held.revision, 7);
    assert_eq!(held.tasks[0].status, TaskStatus::InProgress);
}

#[test]
fn last_completion_wins_between_toggle_and_refresh() {
    init_logging();
    let state = loaded(vec![project("a", "Alpha")]);
    let (state, _) = update(
        state,
        Msg::TaskStatusRequested {
            id: "a".into(),
            task_key: "layout".into(),
            status: TaskStatus::Completed,
        },
    );
    let (state, _) = update(state, Msg::RefreshRequested);

    let toggled = with_layout(project("a", "Alpha"), TaskStatus::Completed);
    let (state, _) = update(
        state,
        Msg::TaskStatusCompleted {
            id: "a".into(),
            result: Ok(toggled),
        },
    );
    let (state, _) = update(state, Msg::RefreshCompleted(Ok(vec![project("a", "Alpha")])));
    assert_eq!(state.projects()[0].tasks[0].status, TaskStatus::Pending);
    assert!(!state.is_loading());
}

#[test]
fn new_request_clears_previous_error() {
    init_logging();
    let (state, _) = update(loaded(Vec::new()), create(""));
    assert!(state.last_error().is_some());
    let (state, _) = update(state, create("Villa"));
    assert_eq!(state.last_error(), None);
}

#[test]
fn store_id_shaped_like_a_local_id_is_a_confirmed_project() {
    init_logging();
    let state = loaded(vec![project("local-7", "Depot")]);
    assert!(!state.entries()[0].provisional);

    let (state, effects) = update(
        state,
        Msg::TaskStatusRequested {
            id: "local-7".into(),
            task_key: "layout".into(),
            status: TaskStatus::InProgress,
        },
    );
    assert!(matches!(effects.as_slice(), [Effect::UpdateTaskStatus { .. }]));

    let (state, effects) = update(state, Msg::DeleteRequested { id: "local-7".into() });
    assert_eq!(effects, vec![Effect::DeleteProject { id: "local-7".into() }]);
    assert!(state.entries().is_empty());
}

#[test]
fn store_id_colliding_with_pending_local_id_keeps_both_rows() {
    init_logging();
    let (state, effects) = update(loaded(Vec::new()), create("Mine"));
    let provisional = provisional_id(&effects);
    let theirs = canonical(provisional.as_str(), "Theirs");

    let (state, _) = update(state, Msg::RefreshRequested);
    let (state, effects) = update(state, Msg::RefreshCompleted(Ok(vec![theirs.clone()])));
    let names: Vec<_> = state.projects().into_iter().map(|p| p.name).collect();
    assert_eq!(names, vec!["Theirs", "Mine"]);
    assert_eq!(
        effects,
        vec![Effect::SaveSnapshot {
            generation: 2,
            projects: vec![theirs.clone()],
        }]
    );

    let mine = canonical("abc", "Mine");
    let (state, effects) = update(
        state,
        Msg::CreateCompleted {
            provisional_id: provisional.clone(),
            result: Ok(mine.clone()),
        },
    );
    assert_eq!(ids(&state), vec![provisional.to_string(), "abc".to_string()]);
    assert!(state.entries().iter().all(|e| !e.provisional));
    assert_eq!(
        effects,
        vec![Effect::SaveSnapshot {
            generation: 3,
            projects: vec![theirs, mine],
        }]
    );
}

#[test]
fn foreign_task_status_answer_is_recorded_and_not_applied() {
    init_logging();
    let state = loaded(vec![project("a", "Alpha"), project("b", "Beta")]);
    let (state, _) = update(
        state,
        Msg::TaskStatusRequested {
            id: "a".into(),
            task_key: "layout".into(),
            status: TaskStatus::Completed,
        },
    );
    let (state, effects) = update(
        state,
        Msg::TaskStatusCompleted {
            id: "a".into(),
            result: Ok(with_layout(project("b", "Beta"), TaskStatus::Completed)),
        },
    );
    assert!(effects.is_empty());
    assert_eq!(
        state.last_error(),
        Some(&SyncError::foreign_answer(&"a".into(), &"b".into()))
    );
    assert_eq!(state.projects()[1], project("b", "Beta"));
}
