use std::collections::BTreeSet;

use chrono::{DateTime, Utc};

use crate::validate::retain_admissible;
use crate::view_model::{build_view, BoardViewModel};
use crate::{Project, ProjectDraft, ProjectId, SyncError, TaskStatus};

/// Stable render key for a row. Survives the provisional-to-canonical id
/// change and every refresh, so presentation code never re-keys a row.
pub type RowKey = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Uninitialized,
    Loading,
    /// Last full refresh succeeded.
    Synced,
    /// Last full refresh failed; the list may come from the cache or the seed.
    Degraded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectEntry {
    pub key: RowKey,
    pub project: Project,
    /// Inserted locally and not (yet) acknowledged by the store.
    pub provisional: bool,
}

/// The in-memory project list of one session plus the bookkeeping needed to
/// reconcile it with the remote store.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SyncState {
    entries: Vec<ProjectEntry>,
    phase: Phase,
    has_loaded: bool,
    in_flight: usize,
    last_error: Option<SyncError>,
    pending_creates: BTreeSet<ProjectId>,
    next_key: RowKey,
    next_provisional: u64,
    snapshot_generation: u64,
    dirty: bool,
}

impl SyncState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn entries(&self) -> &[ProjectEntry] {
        &self.entries
    }

    pub fn projects(&self) -> Vec<Project> {
        self.entries.iter().map(|e| e.project.clone()).collect()
    }

    pub fn project(&self, id: &ProjectId) -> Option<&Project> {
        self.position(id)
            .or_else(|| self.provisional_position(id))
            .map(|idx| &self.entries[idx].project)
    }

    /// True while any refresh or mutation is in flight.
    pub fn is_loading(&self) -> bool {
        self.in_flight > 0
    }

    pub fn last_error(&self) -> Option<&SyncError> {
        self.last_error.as_ref()
    }

    /// Whether the list has ever been populated, from any source.
    pub fn has_loaded(&self) -> bool {
        self.has_loaded
    }

    pub fn view(&self, page: usize, page_size: usize) -> BoardViewModel {
        build_view(self, page, page_size)
    }

    /// Returns whether the state changed since the last call, and resets the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
        self.dirty = true;
    }

    pub(crate) fn begin_op(&mut self) {
        self.in_flight += 1;
        self.last_error = None;
        self.dirty = true;
    }

    pub(crate) fn finish_op(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
        self.dirty = true;
    }

    pub(crate) fn record_error(&mut self, err: SyncError) {
        self.last_error = Some(err);
        self.dirty = true;
    }

    /// Replace the list with a full read, keeping row keys of known ids and the
    /// provisional rows of creates that are still in flight. A record older
    /// than the held revision of the same project is ignored.
    pub(crate) fn apply_snapshot(&mut self, projects: Vec<Project>) {
        let mut previous = std::mem::take(&mut self.entries);
        let mut next: Vec<ProjectEntry> = Vec::with_capacity(projects.len());

        for project in retain_admissible(projects) {
            let held = previous
                .iter()
                .position(|e| !e.provisional && e.project.id == project.id)
                .map(|idx| previous.swap_remove(idx));
            let entry = match held {
                Some(held) if held.project.revision > project.revision => held,
                Some(held) => ProjectEntry {
                    key: held.key,
                    project,
                    provisional: false,
                },
                None => ProjectEntry {
                    key: self.allocate_key(),
                    project,
                    provisional: false,
                },
            };
            next.push(entry);
        }

        // Keep issue order for provisional rows.
        let mut provisional: Vec<ProjectEntry> = previous
            .into_iter()
            .filter(|e| e.provisional && self.pending_creates.contains(&e.project.id))
            .collect();
        provisional.sort_by_key(|e| e.key);
        next.extend(provisional);

        self.entries = next;
        self.has_loaded = true;
        self.dirty = true;
    }

    pub(crate) fn insert_provisional(
        &mut self,
        draft: &ProjectDraft,
        created_at: DateTime<Utc>,
    ) -> ProjectId {
        self.next_provisional += 1;
        let id = ProjectId::provisional(self.next_provisional);
        let key = self.allocate_key();
        self.entries.push(ProjectEntry {
            key,
            project: draft.provisional(id.clone(), created_at),
            provisional: true,
        });
        self.pending_creates.insert(id.clone());
        self.dirty = true;
        id
    }

    /// Swap the provisional row for the store's canonical entity.
    pub(crate) fn settle_create(&mut self, provisional_id: &ProjectId, project: Project) {
        self.pending_creates.remove(provisional_id);
        let provisional = self.provisional_position(provisional_id);
        let canonical = self.position(&project.id);
        match (provisional, canonical) {
            (Some(idx), None) => {
                let entry = &mut self.entries[idx];
                entry.project = project;
                entry.provisional = false;
            }
            (Some(idx), Some(_)) => {
                // A refresh already delivered the canonical row.
                self.entries.remove(idx);
                self.reconcile(project);
            }
            (None, Some(_)) => {
                self.reconcile(project);
            }
            (None, None) => {
                let key = self.allocate_key();
                self.entries.push(ProjectEntry {
                    key,
                    project,
                    provisional: false,
                });
            }
        }
        self.dirty = true;
    }

    /// The create failed; its provisional row stays until the next refresh.
    pub(crate) fn abandon_create(&mut self, provisional_id: &ProjectId) {
        self.pending_creates.remove(provisional_id);
    }

    /// Whether `id` names a locally inserted row the store has not confirmed.
    pub(crate) fn is_unconfirmed(&self, id: &ProjectId) -> bool {
        self.provisional_position(id).is_some()
    }

    /// Removes the confirmed row with this id.
    pub(crate) fn remove(&mut self, id: &ProjectId) -> bool {
        match self.position(id) {
            Some(idx) => {
                self.entries.remove(idx);
                self.dirty = true;
                true
            }
            None => false,
        }
    }

    pub(crate) fn set_task_status(
        &mut self,
        id: &ProjectId,
        task_key: &str,
        status: TaskStatus,
    ) -> Result<(), SyncError> {
        let idx = match self.position(id) {
            Some(idx) => idx,
            None if self.is_unconfirmed(id) => return Err(unconfirmed(id)),
            None => return Err(SyncError::ProjectNotFound(id.clone())),
        };
        let task = self.entries[idx]
            .project
            .task_mut(task_key)
            .ok_or_else(|| SyncError::TaskNotFound {
                project: id.clone(),
                task: task_key.to_string(),
            })?;
        task.status = status;
        self.dirty = true;
        Ok(())
    }

    /// Replace the held record of an existing project unless the incoming one
    /// carries an older revision. Unknown ids are not re-added.
    pub(crate) fn reconcile(&mut self, project: Project) -> bool {
        let Some(idx) = self.position(&project.id) else {
            return false;
        };
        if self.entries[idx].project.revision > project.revision {
            return false;
        }
        self.entries[idx].project = project;
        self.dirty = true;
        true
    }

    /// Every row the store has confirmed, i.e. without provisional creates.
    pub(crate) fn confirmed_snapshot(&self) -> Vec<Project> {
        self.entries
            .iter()
            .filter(|e| !e.provisional)
            .map(|e| e.project.clone())
            .collect()
    }

    /// Next cache generation; later saves supersede earlier ones.
    pub(crate) fn next_snapshot_generation(&mut self) -> u64 {
        self.snapshot_generation += 1;
        self.snapshot_generation
    }

    /// Position of the confirmed row with this id.
    fn position(&self, id: &ProjectId) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| !e.provisional && &e.project.id == id)
    }

    fn provisional_position(&self, id: &ProjectId) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| e.provisional && &e.project.id == id)
    }

    fn allocate_key(&mut self) -> RowKey {
        self.next_key += 1;
        self.next_key
    }
}

pub(crate) fn unconfirmed(id: &ProjectId) -> SyncError {
    SyncError::ValidationFailed(format!("project {id} is not confirmed by the store yet"))
}
