//! Plain-text rendering of explorer views for terminal use.

use std::fmt::Write as _;

use chrono::DateTime;

use crate::domain::{ExplorerView, GroupView, LoadState, ProjectCard};

const SELECTED_MARKER: &str = "[x]";
const UNSELECTED_MARKER: &str = "[ ]";

/// Render a derived view: provenance header, one block per group, and the
/// associated map ids of the selection.
#[must_use]
pub fn render_view(view: &ExplorerView) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Ridership modeling projects ({}): {} projects, {} jobs",
        view.environment, view.total_projects, view.total_jobs
    );
    if let Some(source) = &view.source {
        let cache = if source.from_cache { "cached" } else { "fresh" };
        let _ = writeln!(
            out,
            "Source: {} (last modified {}, {cache})",
            source.source_file,
            source.last_modified.format("%Y-%m-%d %H:%M:%S UTC")
        );
    }

    if view.total_projects == 0 {
        out.push_str("\nNo projects found.\n");
    }
    for group in view.groups.iter().filter(|group| !group.cards.is_empty()) {
        render_group(&mut out, group);
    }

    let _ = writeln!(out, "\nSelected: {}", view.selected_count);
    if view.associated_map_ids.is_empty() {
        out.push_str("Associated map ids: none\n");
    } else {
        let _ = writeln!(
            out,
            "Associated map ids: {}",
            view.associated_map_ids.join(", ")
        );
    }
    let _ = writeln!(out, "Share: ?{}", view.share_query);
    out
}

fn render_group(out: &mut String, group: &GroupView) {
    out.push('\n');
    if !group.title.is_empty() {
        let _ = writeln!(out, "== {} ({}) ==", group.title, group.cards.len());
    }
    for card in &group.cards {
        render_card(out, card);
    }
}

fn render_card(out: &mut String, card: &ProjectCard) {
    let project = &card.project;
    let marker = if card.selected {
        SELECTED_MARKER
    } else {
        UNSELECTED_MARKER
    };
    let _ = writeln!(out, "{marker} {} ({})", display_or(&project.name, "Untitled"), project.id);
    let _ = writeln!(
        out,
        "    agency: {}  author: {}",
        display_or(&project.agency_name, "-"),
        display_or(&project.author_name, "-")
    );
    let _ = writeln!(
        out,
        "    created {}  updated {}  jobs: {}",
        display_date(&project.created_at),
        display_date(&project.updated_at),
        card.job_count
    );
}

fn display_or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.is_empty() { fallback } else { value }
}

fn display_date(raw: &str) -> String {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(parsed) => parsed.format("%Y-%m-%d").to_string(),
        Err(_) => display_or(raw, "unknown").to_owned(),
    }
}

/// Status line for a session that has nothing to show yet; `None` once a
/// snapshot is loaded.
#[must_use]
pub fn render_status(state: &LoadState) -> Option<String> {
    match state {
        LoadState::Idle => Some("No projects loaded yet.".to_owned()),
        LoadState::Loading => Some("Loading projects...".to_owned()),
        LoadState::Loaded(_) => None,
        LoadState::Failed { message } => Some(format!(
            "Error loading projects: {message}\nRun again with --refresh to retry."
        )),
    }
}
