use std::collections::HashSet;

use serde_json::Value;

use crate::{Project, ProjectId, TaskKind};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("project id is empty")]
    EmptyId,
    #[error("project name is empty")]
    EmptyName,
    #[error("duplicate project id {0}")]
    DuplicateId(ProjectId),
    #[error("task `{0}` appears more than once")]
    DuplicateTask(String),
    #[error("unknown task kind `{0}`")]
    UnknownTaskKind(String),
    #[error("task `other` requires a non-empty label")]
    MissingOtherLabel,
    #[error("unknown task status `{0}`")]
    UnknownStatus(String),
    #[error("malformed project record: {0}")]
    Malformed(String),
}

pub fn validate_project(project: &Project) -> Result<(), ValidationError> {
    if project.id.as_str().trim().is_empty() {
        return Err(ValidationError::EmptyId);
    }
    if project.name.trim().is_empty() {
        return Err(ValidationError::EmptyName);
    }
    let mut keys = HashSet::with_capacity(project.tasks.len());
    for task in &project.tasks {
        if let TaskKind::Other(label) = &task.kind {
            if label.trim().is_empty() {
                return Err(ValidationError::MissingOtherLabel);
            }
        }
        if !keys.insert(task.key()) {
            return Err(ValidationError::DuplicateTask(task.key().to_string()));
        }
    }
    Ok(())
}

pub fn is_valid_project(project: &Project) -> bool {
    validate_project(project).is_ok()
}

/// Decode one untyped record into a project, failing closed: missing
/// `id`/`name`/`createdAt`, out-of-enumeration statuses and structurally
/// invalid projects are all rejected.
pub fn admit_project(value: Value) -> Result<Project, ValidationError> {
    let project: Project =
        serde_json::from_value(value).map_err(|err| ValidationError::Malformed(err.to_string()))?;
    project.validate()?;
    Ok(project)
}

/// Admit every valid record of a collection. Later records reusing an
/// already-admitted id are rejected.
pub fn admit_collection(values: Vec<Value>) -> (Vec<Project>, Vec<ValidationError>) {
    let mut admitted: Vec<Project> = Vec::with_capacity(values.len());
    let mut rejected = Vec::new();
    for value in values {
        match admit_project(value) {
            Ok(project) if admitted.iter().any(|p| p.id == project.id) => {
                rejected.push(ValidationError::DuplicateId(project.id));
            }
            Ok(project) => admitted.push(project),
            Err(err) => rejected.push(err),
        }
    }
    (admitted, rejected)
}

/// Keep the valid projects of an already-typed collection, first id wins.
pub(crate) fn retain_admissible(projects: Vec<Project>) -> Vec<Project> {
    let mut kept: Vec<Project> = Vec::with_capacity(projects.len());
    for project in projects {
        if is_valid_project(&project) && !kept.iter().any(|p| p.id == project.id) {
            kept.push(project);
        }
    }
    kept
}
