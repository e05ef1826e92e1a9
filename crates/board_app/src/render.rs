use std::fmt::Write;

use board_core::{BoardRow, BoardViewModel, Phase, Project, TaskStatus};

const NAME_WIDTH: usize = 28;

/// Text rendering of one board page.
pub fn render_board(view: &BoardViewModel) -> String {
    let mut out = String::new();
    let _ = write!(
        out,
        "PROJECT STATUS  page {}/{}  ({} projects)",
        view.page + 1,
        view.page_count.max(1),
        view.total_projects
    );
    if view.phase == Phase::Degraded {
        out.push_str("  [offline]");
    }
    if view.loading {
        out.push_str("  [syncing]");
    }
    out.push('\n');
    if let Some(err) = &view.last_error {
        let _ = writeln!(out, "! {err}");
    }
    out.push('\n');

    if view.rows.is_empty() {
        out.push_str("No projects.\n");
        return out;
    }
    for row in &view.rows {
        render_row(&mut out, row);
    }
    out
}

fn render_row(out: &mut String, row: &BoardRow) {
    let marker = if row.provisional { "*" } else { " " };
    let _ = writeln!(
        out,
        "{marker}{:<width$} {}  {:<9}  {}/{}",
        truncate(&row.name, NAME_WIDTH),
        row.created_on,
        row.status.as_str(),
        row.completed_tasks,
        row.total_tasks,
        width = NAME_WIDTH,
    );
    for task in &row.tasks {
        let _ = writeln!(out, "     {} {}", status_box(task.status), task.label);
    }
}

/// One line per project, for `list`.
pub fn render_list(projects: &[Project]) -> String {
    let mut out = String::new();
    for project in projects {
        let completion = project.completion();
        let _ = writeln!(
            out,
            "{}\t{}\t{}\t{}/{}",
            project.id, project.name, project.status, completion.done, completion.total
        );
    }
    out
}

fn status_box(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::Pending => "[ ]",
        TaskStatus::InProgress => "[~]",
        TaskStatus::Completed => "[x]",
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut short: String = text.chars().take(max.saturating_sub(1)).collect();
    short.push('…');
    short
}
