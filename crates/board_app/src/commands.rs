use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use board_core::{ProjectDraft, ProjectId, TaskKind, TaskStatus};
use board_engine::{FileCache, HttpRemoteStore, SyncEngine};
use board_logging::{board_info, board_warn};
use tokio::time::MissedTickBehavior;

use crate::config::AppConfig;
use crate::render::{render_board, render_list};

const REDRAW_INTERVAL: Duration = Duration::from_millis(500);
const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

pub fn build_engine(config: &AppConfig) -> anyhow::Result<SyncEngine> {
    let remote = HttpRemoteStore::new(config.remote_settings())
        .with_context(|| format!("invalid remote store url {}", config.base_url))?;
    let cache = FileCache::new(&config.cache_dir);
    Ok(SyncEngine::new(Arc::new(remote), Arc::new(cache)))
}

/// Loads the list; a failed load leaves the engine on cached or seed data.
async fn mount(engine: &SyncEngine) {
    if let Err(err) = engine.mount().await {
        board_warn!("Showing offline data: {}", err);
        eprintln!("warning: remote store unavailable, showing offline data ({err})");
    }
}

pub async fn watch(engine: &SyncEngine, config: &AppConfig) -> anyhow::Result<()> {
    mount(engine).await;
    let polling = engine.spawn_polling(config.refresh_interval());

    let mut page_timer = tokio::time::interval(config.page_duration());
    page_timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut redraw_timer = tokio::time::interval(REDRAW_INTERVAL);
    redraw_timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    let mut page = 0;
    let mut first = true;
    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            _ = page_timer.tick() => {
                if !first {
                    page += 1;
                }
                first = false;
                draw(engine, page, config.page_size)?;
            }
            _ = redraw_timer.tick() => {
                if engine.take_dirty() {
                    draw(engine, page, config.page_size)?;
                }
            }
        }
    }

    polling.stop();
    board_info!("Board stopped");
    Ok(())
}

fn draw(engine: &SyncEngine, page: usize, page_size: usize) -> anyhow::Result<()> {
    let view = engine.view(page, page_size);
    let mut stdout = std::io::stdout().lock();
    write!(stdout, "{CLEAR_SCREEN}{}", render_board(&view)).context("failed to draw board")?;
    stdout.flush().context("failed to draw board")?;
    Ok(())
}

pub async fn list(engine: &SyncEngine) -> anyhow::Result<()> {
    mount(engine).await;
    print!("{}", render_list(&engine.projects()));
    Ok(())
}

pub async fn create(
    engine: &SyncEngine,
    name: String,
    tasks: Vec<TaskKind>,
    other: Option<String>,
) -> anyhow::Result<()> {
    mount(engine).await;
    let mut draft = ProjectDraft::new(name);
    for kind in tasks {
        draft = draft.with_task(kind);
    }
    if let Some(label) = other {
        draft = draft.with_task(TaskKind::Other(label));
    }
    let project = engine
        .create_project(draft)
        .await
        .context("failed to create project")?;
    println!("Created project {} ({})", project.id, project.name);
    Ok(())
}

pub async fn delete(engine: &SyncEngine, id: String) -> anyhow::Result<()> {
    mount(engine).await;
    let id = ProjectId::new(id);
    engine
        .delete_project(&id)
        .await
        .with_context(|| format!("failed to delete project {id}"))?;
    println!("Deleted project {id}");
    Ok(())
}

pub async fn set_status(
    engine: &SyncEngine,
    id: String,
    task: String,
    status: TaskStatus,
) -> anyhow::Result<()> {
    mount(engine).await;
    let id = ProjectId::new(id);
    let project = engine
        .update_task_status(&id, &task, status)
        .await
        .with_context(|| format!("failed to update {task} on project {id}"))?;
    let completion = project.completion();
    println!(
        "{}: {} is now {} ({}/{} tasks completed)",
        project.name, task, status, completion.done, completion.total
    );
    Ok(())
}
