use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::validate::{validate_project, ValidationError};

const PROVISIONAL_PREFIX: &str = "local-";

/// Opaque project identifier, assigned by the remote store. The sync state
/// also mints `local-<n>` ids for rows whose create is in flight; whether a
/// row is provisional is tracked on the row, never read from the id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(String);

impl ProjectId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub(crate) fn provisional(seq: u64) -> Self {
        Self(format!("{PROVISIONAL_PREFIX}{seq}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProjectId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ProjectId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    #[default]
    Active,
    Completed,
}

impl ProjectStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ProjectStatus::Active => "active",
            ProjectStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 3] = [
        TaskStatus::Pending,
        TaskStatus::InProgress,
        TaskStatus::Completed,
    ];

    /// Wire literal: `pending`, `in-progress` or `completed`.
    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in-progress",
            TaskStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TaskStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s.trim())
            .ok_or_else(|| ValidationError::UnknownStatus(s.to_string()))
    }
}

/// The kind of work a task tracks. Each kind owns a unique wire key, so a
/// project carries at most one task per kind (and at most one `Other`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TaskKind {
    Layout,
    MddaSubmission,
    StructureDrawing,
    ArchitectureDrawing,
    Export3d,
    Other(String),
}

impl TaskKind {
    pub const FIXED: [TaskKind; 5] = [
        TaskKind::Layout,
        TaskKind::MddaSubmission,
        TaskKind::StructureDrawing,
        TaskKind::ArchitectureDrawing,
        TaskKind::Export3d,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            TaskKind::Layout => "layout",
            TaskKind::MddaSubmission => "mddaMap",
            TaskKind::StructureDrawing => "structureDwg",
            TaskKind::ArchitectureDrawing => "architectureDwg",
            TaskKind::Export3d => "ext3D",
            TaskKind::Other(_) => "other",
        }
    }

    /// Human label shown on the board.
    pub fn label(&self) -> &str {
        match self {
            TaskKind::Layout => "Layout",
            TaskKind::MddaSubmission => "MDDA Submission",
            TaskKind::StructureDrawing => "Structure Dwg",
            TaskKind::ArchitectureDrawing => "Architecture Dwg",
            TaskKind::Export3d => "Ext 3D",
            TaskKind::Other(label) => label,
        }
    }

    pub fn from_key(key: &str, label: Option<String>) -> Result<Self, ValidationError> {
        if key == "other" {
            let label = label.map(|l| l.trim().to_string()).unwrap_or_default();
            if label.is_empty() {
                return Err(ValidationError::MissingOtherLabel);
            }
            return Ok(TaskKind::Other(label));
        }
        TaskKind::FIXED
            .into_iter()
            .find(|kind| kind.key() == key)
            .ok_or_else(|| ValidationError::UnknownTaskKind(key.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TaskRecord", into = "TaskRecord")]
pub struct Task {
    pub kind: TaskKind,
    pub status: TaskStatus,
}

impl Task {
    pub fn pending(kind: TaskKind) -> Self {
        Self {
            kind,
            status: TaskStatus::Pending,
        }
    }

    pub fn key(&self) -> &'static str {
        self.kind.key()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct TaskRecord {
    kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    label: Option<String>,
    status: TaskStatus,
}

impl TryFrom<TaskRecord> for Task {
    type Error = ValidationError;

    fn try_from(record: TaskRecord) -> Result<Self, Self::Error> {
        Ok(Task {
            kind: TaskKind::from_key(&record.kind, record.label)?,
            status: record.status,
        })
    }
}

impl From<Task> for TaskRecord {
    fn from(task: Task) -> Self {
        let kind = task.key().to_string();
        let label = match task.kind {
            TaskKind::Other(label) => Some(label),
            _ => None,
        };
        TaskRecord {
            kind,
            label,
            status: task.status,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Completion {
    pub done: usize,
    pub total: usize,
}

impl Completion {
    pub fn is_finished(&self) -> bool {
        self.total > 0 && self.done == self.total
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub status: ProjectStatus,
    #[serde(default)]
    pub tasks: Vec<Task>,
    /// Store-assigned revision; records without one count as revision 0.
    #[serde(default)]
    pub revision: u64,
}

impl Project {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_project(self)
    }

    pub fn task(&self, key: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.key() == key)
    }

    pub(crate) fn task_mut(&mut self, key: &str) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|task| task.key() == key)
    }

    pub fn completion(&self) -> Completion {
        Completion {
            done: self
                .tasks
                .iter()
                .filter(|task| task.status == TaskStatus::Completed)
                .count(),
            total: self.tasks.len(),
        }
    }
}

/// What the admin form submits: no id, no creation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "DraftRecord")]
pub struct ProjectDraft {
    pub name: String,
    pub status: ProjectStatus,
    pub tasks: Vec<TaskKind>,
}

#[derive(Serialize)]
struct DraftRecord {
    name: String,
    status: ProjectStatus,
    tasks: Vec<Task>,
}

impl From<ProjectDraft> for DraftRecord {
    fn from(draft: ProjectDraft) -> Self {
        DraftRecord {
            name: draft.name.trim().to_string(),
            status: draft.status,
            tasks: draft.tasks.into_iter().map(Task::pending).collect(),
        }
    }
}

impl ProjectDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: ProjectStatus::Active,
            tasks: Vec::new(),
        }
    }

    pub fn with_task(mut self, kind: TaskKind) -> Self {
        self.tasks.push(kind);
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        let mut seen = Vec::with_capacity(self.tasks.len());
        for kind in &self.tasks {
            if let TaskKind::Other(label) = kind {
                if label.trim().is_empty() {
                    return Err(ValidationError::MissingOtherLabel);
                }
            }
            if seen.contains(&kind.key()) {
                return Err(ValidationError::DuplicateTask(kind.key().to_string()));
            }
            seen.push(kind.key());
        }
        Ok(())
    }

    /// The optimistic entity shown while the store has not answered yet.
    pub(crate) fn provisional(&self, id: ProjectId, created_at: DateTime<Utc>) -> Project {
        Project {
            id,
            name: self.name.trim().to_string(),
            created_at,
            status: self.status,
            tasks: self.tasks.iter().cloned().map(Task::pending).collect(),
            revision: 0,
        }
    }
}
