//! Status board core: entity model, validation and the pure sync state machine.
mod effect;
mod error;
mod model;
mod msg;
mod seed;
mod state;
mod update;
mod validate;
mod view_model;

pub use effect::Effect;
pub use error::SyncError;
pub use model::{
    Completion, Project, ProjectDraft, ProjectId, ProjectStatus, Task, TaskKind, TaskStatus,
};
pub use msg::Msg;
pub use seed::seed_projects;
pub use state::{Phase, ProjectEntry, RowKey, SyncState};
pub use update::update;
pub use validate::{
    admit_collection, admit_project, is_valid_project, validate_project, ValidationError,
};
pub use view_model::{BoardRow, BoardViewModel, TaskCell, PROJECTS_PER_PAGE};
