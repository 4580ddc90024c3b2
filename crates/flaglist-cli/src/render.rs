use flaglist_core::contracts::ListRequest;
use flaglist_core::contracts::Page;
use flaglist_core::query::active_pairs;
use flaglist_core::state::FilterKey;
use flaglist_core::state::ListKind;
use flaglist_core::state::ListPageState;
use flaglist_core::view::empty_message;
use flaglist_core::view::project;
use flaglist_core::view::status_tabs;
use flaglist_core::view::CollectionView;
use flaglist_core::view::Pagination;
use flaglist_core::view::StatusTab;
use flaglist_source::Record;
use serde::Serialize;

pub const COLUMNS: [&str; 5] = ["ID", "NAME", "TAGS", "ENABLED", "UPDATED"];

pub fn row_cells(kind: ListKind, record: &Record) -> [String; 5] {
    let enabled = match kind {
        ListKind::Goals | ListKind::Segments => {
            if record.in_use { "in use" } else { "unused" }
        }
        _ => {
            if record.enabled { "on" } else { "off" }
        }
    };
    [
        record.id.clone(),
        record.name.clone(),
        record.tags_label(),
        enabled.to_string(),
        record.updated_at.format("%Y-%m-%d %H:%M").to_string(),
    ]
}

pub fn tab_label(tab: &StatusTab) -> String {
    match tab.count {
        Some(count) => format!("{} ({count})", tab.status.label()),
        None => tab.status.label().to_string(),
    }
}

pub fn footer_text(pagination: &Pagination) -> String {
    format!(
        "{}-{} of {}  page {}/{}",
        pagination.first_item,
        pagination.last_item,
        pagination.total_count,
        pagination.current_page,
        pagination.page_count
    )
}

pub fn url_line(state: &ListPageState<Record>) -> String {
    if state.url_query.is_empty() {
        format!("/{}", state.kind.slug())
    } else {
        format!("/{}?{}", state.kind.slug(), state.url_query)
    }
}

/// Plain-text rendering of the current view for one-shot output.
pub fn render_text(state: &ListPageState<Record>) -> String {
    let mut out = String::new();
    let tabs: Vec<String> = status_tabs(state)
        .iter()
        .map(|tab| {
            let label = tab_label(tab);
            if tab.selected { format!("[{label}]") } else { label }
        })
        .collect();
    out.push_str(&format!("{}  {}\n", state.kind.label(), tabs.join("  ")));
    out.push_str(&format!(
        "sort: {} {}",
        state.filters.order_by.label(),
        state.filters.order_direction.arrow()
    ));
    if !state.filters.search_query.is_empty() {
        out.push_str(&format!("  search: {:?}", state.filters.search_query));
    }
    let chips: Vec<String> = active_pairs(&state.filters, &state.defaults)
        .into_iter()
        .filter(|(key, _)| FilterKey::from_query_key(key).is_some())
        .map(|(key, value)| format!("{key}={value}"))
        .collect();
    if !chips.is_empty() {
        out.push_str(&format!("  filters: {}", chips.join(" ")));
    }
    out.push('\n');

    match project(state) {
        CollectionView::Loading => out.push_str("Loading...\n"),
        CollectionView::Error { error } => out.push_str(&format!("Failed to load: {error}\n")),
        CollectionView::Empty { filtered } => {
            out.push_str(empty_message(filtered));
            out.push('\n');
        }
        CollectionView::Populated {
            items, pagination, ..
        } => {
            let rows: Vec<[String; 5]> = items
                .iter()
                .map(|record| row_cells(state.kind, record))
                .collect();
            out.push_str(&table(&rows));
            if let Some(pagination) = pagination {
                out.push_str(&footer_text(&pagination));
                out.push('\n');
            }
        }
    }
    out.push_str(&url_line(state));
    out.push('\n');
    out
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonOutput<'a> {
    kind: ListKind,
    url_query: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    request: Option<&'a ListRequest>,
    #[serde(skip_serializing_if = "Option::is_none")]
    page: Option<&'a Page<Record>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

pub fn render_json(state: &ListPageState<Record>) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&JsonOutput {
        kind: state.kind,
        url_query: &state.url_query,
        request: state.fetch.last_request.as_ref(),
        page: state.fetch.page.as_ref(),
        error: state.fetch.error.as_ref().map(ToString::to_string),
    })
}

fn table(rows: &[[String; 5]]) -> String {
    let mut widths = COLUMNS.map(|column| column.chars().count());
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let format_row = |cells: &[String]| {
        cells
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let header: Vec<String> = COLUMNS.iter().map(|column| column.to_string()).collect();
    let mut out = format_row(&header);
    out.push('\n');
    for row in rows {
        out.push_str(&format_row(row));
        out.push('\n');
    }
    out
}
