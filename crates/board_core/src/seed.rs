use chrono::{DateTime, Utc};

use crate::{Project, ProjectId, ProjectStatus, Task, TaskKind, TaskStatus};

// 2024-01-01T00:00:00Z
const SEED_CREATED_AT: i64 = 1_704_067_200;

/// Last-resort dataset for a first load that reaches neither the remote
/// store nor a cached snapshot.
pub fn seed_projects() -> Vec<Project> {
    let created_at = DateTime::<Utc>::from_timestamp(SEED_CREATED_AT, 0).unwrap_or_default();
    vec![
        Project {
            id: ProjectId::new("1"),
            name: "Project A".to_string(),
            created_at,
            status: ProjectStatus::Active,
            tasks: vec![
                task(TaskKind::MddaSubmission, TaskStatus::Pending),
                task(TaskKind::ArchitectureDrawing, TaskStatus::InProgress),
                task(TaskKind::StructureDrawing, TaskStatus::Completed),
                task(TaskKind::Other("Other".to_string()), TaskStatus::Pending),
            ],
            revision: 0,
        },
        Project {
            id: ProjectId::new("2"),
            name: "Project B".to_string(),
            created_at,
            status: ProjectStatus::Completed,
            tasks: vec![
                task(TaskKind::MddaSubmission, TaskStatus::Completed),
                task(TaskKind::ArchitectureDrawing, TaskStatus::Completed),
                task(TaskKind::StructureDrawing, TaskStatus::Completed),
                task(TaskKind::Other("Other".to_string()), TaskStatus::Completed),
            ],
            revision: 0,
        },
    ]
}

fn task(kind: TaskKind, status: TaskStatus) -> Task {
    Task { kind, status }
}
