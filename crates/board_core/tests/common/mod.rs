#![allow(dead_code)]

use board_core::{
    update, Effect, Msg, Project, ProjectId, ProjectStatus, SyncState, Task, TaskKind, TaskStatus,
};
use chrono::{TimeZone, Utc};

pub fn init_logging() {
    board_logging::initialize_for_tests();
}

pub fn project(id: &str, name: &str) -> Project {
    Project {
        id: ProjectId::new(id),
        name: name.to_string(),
        created_at: Utc.with_ymd_and_hms(2025, 3, 14, 9, 0, 0).unwrap(),
        status: ProjectStatus::Active,
        tasks: vec![
            Task::pending(TaskKind::Layout),
            Task::pending(TaskKind::StructureDrawing),
        ],
        revision: 0,
    }
}

pub fn with_layout(mut project: Project, status: TaskStatus) -> Project {
    project.tasks[0].status = status;
    project
}

pub fn with_revision(mut project: Project, revision: u64) -> Project {
    project.revision = revision;
    project
}

/// A state that went through a successful first load of `projects`.
pub fn loaded(projects: Vec<Project>) -> SyncState {
    let (state, _) = update(SyncState::new(), Msg::Mounted);
    let (state, _) = update(state, Msg::RefreshCompleted(Ok(projects)));
    state
}

pub fn ids(state: &SyncState) -> Vec<String> {
    state
        .entries()
        .iter()
        .map(|e| e.project.id.to_string())
        .collect()
}

pub fn provisional_id(effects: &[Effect]) -> ProjectId {
    effects
        .iter()
        .find_map(|effect| match effect {
            Effect::CreateProject { provisional_id, .. } => Some(provisional_id.clone()),
            _ => None,
        })
        .expect("create effect")
}
