use crate::state::unconfirmed;
use crate::validate::retain_admissible;
use crate::{seed_projects, Effect, Msg, Phase, Project, SyncError, SyncState};

/// Pure update function: applies a message to state and returns any effects.
///
/// Mutations are applied optimistically on the `*Requested` message and never
/// rolled back on failure; completions are applied in arrival order, so the
/// later-completing response wins (subject to the revision check).
pub fn update(mut state: SyncState, msg: Msg) -> (SyncState, Vec<Effect>) {
    let effects = match msg {
        Msg::Mounted => {
            if state.phase() == Phase::Uninitialized {
                start_refresh(&mut state)
            } else {
                Vec::new()
            }
        }
        Msg::RefreshRequested => start_refresh(&mut state),
        Msg::RefreshCompleted(Ok(projects)) => {
            let projects = retain_admissible(projects);
            state.finish_op();
            state.set_phase(Phase::Synced);
            state.apply_snapshot(projects.clone());
            vec![save(&mut state, projects)]
        }
        Msg::RefreshCompleted(Err(err)) => {
            state.finish_op();
            state.set_phase(Phase::Degraded);
            state.record_error(err);
            // Only a session that has never shown a list falls back; otherwise
            // the current list stays on screen.
            if state.has_loaded() {
                Vec::new()
            } else {
                vec![Effect::LoadFallback]
            }
        }
        Msg::FallbackLoaded(projects) => {
            if !state.has_loaded() {
                let projects = if projects.is_empty() {
                    seed_projects()
                } else {
                    projects
                };
                state.apply_snapshot(projects);
            }
            Vec::new()
        }
        Msg::CreateRequested { draft, created_at } => match draft.validate() {
            Ok(()) => {
                state.begin_op();
                let provisional_id = state.insert_provisional(&draft, created_at);
                vec![Effect::CreateProject {
                    provisional_id,
                    draft,
                }]
            }
            Err(err) => reject(&mut state, err.into()),
        },
        Msg::CreateCompleted {
            provisional_id,
            result,
        } => {
            state.finish_op();
            match result.and_then(admitted) {
                Ok(project) => {
                    state.settle_create(&provisional_id, project);
                    vec![save_confirmed(&mut state)]
                }
                Err(err) => {
                    state.abandon_create(&provisional_id);
                    state.record_error(err);
                    Vec::new()
                }
            }
        }
        Msg::DeleteRequested { id } => {
            if state.remove(&id) {
                state.begin_op();
                vec![Effect::DeleteProject { id }]
            } else if state.is_unconfirmed(&id) {
                reject(&mut state, unconfirmed(&id))
            } else {
                reject(&mut state, SyncError::ProjectNotFound(id))
            }
        }
        Msg::DeleteCompleted { id, result } => {
            state.finish_op();
            match result {
                Ok(()) => {
                    // A refresh that completed in between may have brought it back.
                    state.remove(&id);
                    vec![save_confirmed(&mut state)]
                }
                Err(err) => {
                    state.record_error(err);
                    Vec::new()
                }
            }
        }
        Msg::TaskStatusRequested {
            id,
            task_key,
            status,
        } => match state.set_task_status(&id, &task_key, status) {
            Ok(()) => {
                state.begin_op();
                vec![Effect::UpdateTaskStatus {
                    id,
                    task_key,
                    status,
                }]
            }
            Err(err) => reject(&mut state, err),
        },
        Msg::TaskStatusCompleted { id, result } => {
            state.finish_op();
            match result.and_then(admitted) {
                Ok(project) if project.id != id => {
                    state.record_error(SyncError::foreign_answer(&id, &project.id));
                    Vec::new()
                }
                Ok(project) => {
                    if state.reconcile(project) {
                        vec![save_confirmed(&mut state)]
                    } else {
                        Vec::new()
                    }
                }
                Err(err) => {
                    state.record_error(err);
                    Vec::new()
                }
            }
        }
    };

    (state, effects)
}

fn start_refresh(state: &mut SyncState) -> Vec<Effect> {
    state.begin_op();
    state.set_phase(Phase::Loading);
    vec![Effect::FetchProjects]
}

fn reject(state: &mut SyncState, err: SyncError) -> Vec<Effect> {
    state.record_error(err.clone());
    vec![Effect::Rejected(err)]
}

fn save(state: &mut SyncState, projects: Vec<Project>) -> Effect {
    Effect::SaveSnapshot {
        generation: state.next_snapshot_generation(),
        projects,
    }
}

/// Persist every row the store has confirmed, leaving provisional ones out.
fn save_confirmed(state: &mut SyncState) -> Effect {
    let projects = state.confirmed_snapshot();
    save(state, projects)
}

fn admitted(project: Project) -> Result<Project, SyncError> {
    project.validate()?;
    Ok(project)
}
