//! Text and JSON output for an [`ExplorerView`].

use crate::explorer::{ExplorerView, Summary};
use crate::filter::FilterState;
use crate::options::FilterOptions;
use crate::pager::FetchState;
use color_eyre::Result;
use serde::Serialize;
use std::collections::BTreeMap;

const SELECTED_MARK: &str = "*";

/// Render the view as an aligned text table followed by a summary line.
/// Selected rows carry a `*` in the leading column.
pub fn render_table(view: &ExplorerView<'_>) -> String {
    let header: Vec<&str> = view.columns.iter().map(|c| c.label.as_str()).collect();
    let rows: Vec<(bool, Vec<String>)> = view
        .records
        .iter()
        .map(|record| {
            let cells = view.columns.iter().map(|c| c.render(record)).collect();
            (view.selection.contains(record.id()), cells)
        })
        .collect();

    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for (_, cells) in &rows {
        for (width, cell) in widths.iter_mut().zip(cells) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    if !view.columns.is_empty() {
        push_row(&mut out, " ", header.iter().copied(), &widths);
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        push_row(&mut out, " ", rule.iter().map(String::as_str), &widths);
        for (selected, cells) in &rows {
            let mark = if *selected { SELECTED_MARK } else { " " };
            push_row(&mut out, mark, cells.iter().map(String::as_str), &widths);
        }
    }
    out.push_str(&summary_line(&view.summary, view.fetch_state));
    out.push('\n');
    out
}

fn push_row<'a>(out: &mut String, mark: &str, cells: impl Iterator<Item = &'a str>, widths: &[usize]) {
    let padded: Vec<String> = cells
        .zip(widths)
        .map(|(cell, width)| format!("{cell:<width$}"))
        .collect();
    out.push_str(mark);
    out.push(' ');
    out.push_str(padded.join("  ").trim_end());
    out.push('\n');
}

pub fn summary_line(summary: &Summary, state: &FetchState) -> String {
    let status = match state {
        FetchState::Idle => "more available".to_string(),
        FetchState::Fetching => "loading".to_string(),
        FetchState::Exhausted => "all pages loaded".to_string(),
        FetchState::Error(message) => format!("error: {message}"),
    };
    format!(
        "Showing {} of {} loaded ({} total), {} selected, {}",
        summary.current_count, summary.loaded, summary.total, summary.selected_count, status
    )
}

#[derive(Serialize)]
struct JsonColumn<'a> {
    key: &'a str,
    label: &'a str,
    sortable: bool,
    searchable: bool,
}

#[derive(Serialize)]
struct JsonRow<'a> {
    id: &'a str,
    selected: bool,
    cells: BTreeMap<&'a str, String>,
}

#[derive(Serialize)]
struct JsonView<'a> {
    columns: Vec<JsonColumn<'a>>,
    rows: Vec<JsonRow<'a>>,
    summary: Summary,
    fetch_state: &'a FetchState,
    filters: &'a FilterState,
    filter_options: &'a FilterOptions,
}

/// Render the view as a pretty-printed JSON document.
pub fn render_json(view: &ExplorerView<'_>) -> Result<String> {
    let doc = JsonView {
        columns: view
            .columns
            .iter()
            .map(|c| JsonColumn {
                key: &c.key,
                label: &c.label,
                sortable: c.sortable,
                searchable: c.searchable,
            })
            .collect(),
        rows: view
            .records
            .iter()
            .map(|record| JsonRow {
                id: record.id().as_str(),
                selected: view.selection.contains(record.id()),
                cells: view
                    .columns
                    .iter()
                    .map(|c| (c.key.as_str(), c.render(record)))
                    .collect(),
            })
            .collect(),
        summary: view.summary,
        fetch_state: view.fetch_state,
        filters: view.filters,
        filter_options: view.filter_options,
    };
    Ok(serde_json::to_string_pretty(&doc)?)
}
