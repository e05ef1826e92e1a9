use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use board_core::{
    update, BoardViewModel, Effect, Msg, Phase, Project, ProjectDraft, ProjectEntry, ProjectId,
    SyncError, SyncState, TaskStatus,
};
use board_logging::{board_debug, board_info, board_warn};
use chrono::Utc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::cache::FallbackCache;
use crate::remote::RemoteStore;

/// Owns one session's project list and reconciles it with the remote store.
///
/// Cloning is cheap and every clone drives the same session. The state lock
/// is held only for the instant of a transition, never across a request, so
/// overlapping operations run independently and complete in any order.
#[derive(Clone)]
pub struct SyncEngine {
    inner: Arc<Inner>,
}

struct Inner {
    state: Mutex<SyncState>,
    remote: Arc<dyn RemoteStore>,
    cache: Arc<dyn FallbackCache>,
    /// Generation of the newest snapshot written to the cache. Held while
    /// writing, so saves never interleave.
    saved_generation: Mutex<u64>,
}

impl SyncEngine {
    pub fn new(remote: Arc<dyn RemoteStore>, cache: Arc<dyn FallbackCache>) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(SyncState::new()),
                remote,
                cache,
                saved_generation: Mutex::new(0),
            }),
        }
    }

    /// First load of the session. Later calls are no-ops.
    pub async fn mount(&self) -> Result<(), SyncError> {
        let effects = self.apply(Msg::Mounted);
        let completions = self.run(effects).await;
        refresh_outcome(completions)
    }

    /// Full refresh from the remote store. A failure leaves the displayed
    /// list in place and is also recorded as the last error.
    pub async fn refresh(&self) -> Result<(), SyncError> {
        let effects = self.apply(Msg::RefreshRequested);
        let completions = self.run(effects).await;
        refresh_outcome(completions)
    }

    /// Adds a provisional row at once and returns the store's canonical
    /// project once it acknowledges.
    pub async fn create_project(&self, draft: ProjectDraft) -> Result<Project, SyncError> {
        let effects = self.apply(Msg::CreateRequested {
            draft,
            created_at: Utc::now(),
        });
        rejected(&effects)?;
        let completions = self.run(effects).await;
        completions
            .into_iter()
            .find_map(|msg| match msg {
                Msg::CreateCompleted { result, .. } => Some(result),
                _ => None,
            })
            .unwrap_or_else(|| Err(not_dispatched("create")))
    }

    /// Removes the row at once; a failed remote delete is not rolled back.
    pub async fn delete_project(&self, id: &ProjectId) -> Result<(), SyncError> {
        let effects = self.apply(Msg::DeleteRequested { id: id.clone() });
        rejected(&effects)?;
        let completions = self.run(effects).await;
        completions
            .into_iter()
            .find_map(|msg| match msg {
                Msg::DeleteCompleted { result, .. } => Some(result),
                _ => None,
            })
            .unwrap_or_else(|| Err(not_dispatched("delete")))
    }

    pub async fn update_task_status(
        &self,
        id: &ProjectId,
        task_key: &str,
        status: TaskStatus,
    ) -> Result<Project, SyncError> {
        let effects = self.apply(Msg::TaskStatusRequested {
            id: id.clone(),
            task_key: task_key.to_string(),
            status,
        });
        rejected(&effects)?;
        let completions = self.run(effects).await;
        completions
            .into_iter()
            .find_map(|msg| match msg {
                Msg::TaskStatusCompleted { result, .. } => Some(result),
                _ => None,
            })
            .unwrap_or_else(|| Err(not_dispatched("task status update")))
            .and_then(|project| {
                if &project.id == id {
                    Ok(project)
                } else {
                    Err(SyncError::foreign_answer(id, &project.id))
                }
            })
    }

    /// Starts the periodic refresh timer. Must be called inside a tokio
    /// runtime. Every tick spawns its own refresh, so stopping the timer never
    /// cancels a request that is already in flight.
    pub fn spawn_polling(&self, interval: Duration) -> PollingHandle {
        let engine = self.clone();
        let period = interval.max(Duration::from_millis(1));
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick fires immediately; the mount already loaded.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let engine = engine.clone();
                tokio::spawn(async move {
                    if let Err(err) = engine.refresh().await {
                        board_warn!("Periodic refresh failed: {}", err);
                    }
                });
            }
        });
        board_info!("Polling remote store every {:?}", period);
        PollingHandle { task }
    }

    pub fn projects(&self) -> Vec<Project> {
        self.lock().projects()
    }

    pub fn entries(&self) -> Vec<ProjectEntry> {
        self.lock().entries().to_vec()
    }

    pub fn is_loading(&self) -> bool {
        self.lock().is_loading()
    }

    pub fn last_error(&self) -> Option<SyncError> {
        self.lock().last_error().cloned()
    }

    pub fn phase(&self) -> Phase {
        self.lock().phase()
    }

    pub fn view(&self, page: usize, page_size: usize) -> BoardViewModel {
        self.lock().view(page, page_size)
    }

    /// Whether anything changed since the previous call.
    pub fn take_dirty(&self) -> bool {
        self.lock().consume_dirty()
    }

    fn lock(&self) -> MutexGuard<'_, SyncState> {
        // `apply` only stores a fully computed state, so a poisoned lock still
        // guards the last applied one.
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn apply(&self, msg: Msg) -> Vec<Effect> {
        let mut guard = self.lock();
        let (state, effects) = update(guard.clone(), msg);
        *guard = state;
        effects
    }

    /// Completions can apply on one task and reach their save on another, so
    /// saves may arrive out of order. Only a newer generation is written.
    fn save_snapshot(&self, generation: u64, projects: &[Project]) {
        let mut saved = self
            .inner
            .saved_generation
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if generation <= *saved {
            board_debug!(
                "Skipping snapshot {} superseded by {}",
                generation,
                *saved
            );
            return;
        }
        self.inner.cache.save(projects);
        *saved = generation;
    }

    /// Executes effects until none are left, feeding every completion back
    /// through `update`. Returns the completions in the order they applied.
    async fn run(&self, effects: Vec<Effect>) -> Vec<Msg> {
        let mut pending: VecDeque<Effect> = effects.into();
        let mut completions = Vec::new();
        while let Some(effect) = pending.pop_front() {
            if let Some(msg) = self.execute(effect).await {
                pending.extend(self.apply(msg.clone()));
                completions.push(msg);
            }
        }
        completions
    }

    async fn execute(&self, effect: Effect) -> Option<Msg> {
        let remote = self.inner.remote.as_ref();
        match effect {
            Effect::FetchProjects => {
                let result = remote.list().await.map_err(SyncError::from);
                match &result {
                    Ok(projects) => board_info!("Refreshed {} projects", projects.len()),
                    Err(err) => board_warn!("Refresh failed: {}", err),
                }
                Some(Msg::RefreshCompleted(result))
            }
            Effect::LoadFallback => {
                let projects = self.inner.cache.load();
                board_warn!(
                    "Degraded mode: {} cached projects available",
                    projects.len()
                );
                Some(Msg::FallbackLoaded(projects))
            }
            Effect::SaveSnapshot {
                generation,
                projects,
            } => {
                self.save_snapshot(generation, &projects);
                None
            }
            Effect::CreateProject {
                provisional_id,
                draft,
            } => {
                let result = remote.create(&draft).await.map_err(SyncError::from);
                match &result {
                    Ok(project) => board_info!("Created project {} as {}", provisional_id, project.id),
                    Err(err) => board_warn!("Create of {} failed: {}", provisional_id, err),
                }
                Some(Msg::CreateCompleted {
                    provisional_id,
                    result,
                })
            }
            Effect::DeleteProject { id } => {
                let result = remote.delete(&id).await.map_err(SyncError::from);
                if let Err(err) = &result {
                    board_warn!("Delete of {} failed: {}", id, err);
                }
                Some(Msg::DeleteCompleted { id, result })
            }
            Effect::UpdateTaskStatus {
                id,
                task_key,
                status,
            } => {
                let result = remote
                    .update_task_status(&id, &task_key, status)
                    .await
                    .map_err(SyncError::from);
                match &result {
                    Ok(_) => board_debug!("Task {} of {} is now {}", task_key, id, status),
                    Err(err) => board_warn!("Task status update on {} failed: {}", id, err),
                }
                Some(Msg::TaskStatusCompleted { id, result })
            }
            Effect::Rejected(err) => {
                board_debug!("Request rejected locally: {}", err);
                None
            }
        }
    }
}

/// Releases the polling timer when stopped or dropped.
#[derive(Debug)]
pub struct PollingHandle {
    task: JoinHandle<()>,
}

impl PollingHandle {
    pub fn stop(self) {
        drop(self);
    }
}

impl Drop for PollingHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

fn rejected(effects: &[Effect]) -> Result<(), SyncError> {
    match effects.iter().find_map(|effect| match effect {
        Effect::Rejected(err) => Some(err.clone()),
        _ => None,
    }) {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

fn refresh_outcome(completions: Vec<Msg>) -> Result<(), SyncError> {
    completions
        .into_iter()
        .find_map(|msg| match msg {
            Msg::RefreshCompleted(result) => Some(result.map(|_| ())),
            _ => None,
        })
        .unwrap_or(Ok(()))
}

fn not_dispatched(operation: &str) -> SyncError {
    SyncError::ValidationFailed(format!("{operation} was not sent to the remote store"))
}
