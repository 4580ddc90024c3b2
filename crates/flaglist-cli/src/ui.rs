use std::io;
use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Row, Table, Tabs};
use ratatui::Terminal;

use flaglist_core::actions::{ListAction, RuntimeAction, UserAction};
use flaglist_core::reducer::{reduce, ListEffect};
use flaglist_core::state::ListPageState;
use flaglist_core::view::{empty_message, project, status_tabs, CollectionView};
use flaglist_source::Record;

use crate::render::{footer_text, row_cells, tab_label, url_line, COLUMNS};
use crate::SharedSource;

struct TuiGuard;

impl Drop for TuiGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, crossterm::cursor::Show);
    }
}

pub fn run(
    state: ListPageState<Record>,
    source: SharedSource,
    query: String,
) -> Result<(), Box<dyn std::error::Error>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, crossterm::cursor::Hide)?;
    let _guard = TuiGuard;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(state);
    run_app(&mut terminal, &mut app, source, query).map_err(|e| e.into())
}

enum UiEvent {
    Fetched(RuntimeAction<Record>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum InputMode {
    Browse,
    Search(String),
}

struct App {
    state: ListPageState<Record>,
    mode: InputMode,
    notice: Option<String>,
}

impl App {
    fn new(state: ListPageState<Record>) -> Self {
        Self {
            state,
            mode: InputMode::Browse,
            notice: None,
        }
    }
}

#[derive(Debug, PartialEq)]
enum KeyOutcome {
    Dispatch(UserAction),
    CopyUrl,
    Exit,
    Redraw,
}

struct UiPalette {
    accent: Color,
    danger: Color,
    muted: Color,
    border: Color,
    header: Color,
}

const PALETTE: UiPalette = UiPalette {
    accent: Color::Cyan,
    danger: Color::Red,
    muted: Color::DarkGray,
    border: Color::Gray,
    header: Color::Yellow,
};

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    source: SharedSource,
    query: String,
) -> io::Result<()> {
    let (tx, rx) = mpsc::channel();

    let effects = reduce(
        &mut app.state,
        ListAction::Runtime(RuntimeAction::Initialize { query }),
    );
    apply_effects(effects, &source, &tx);

    loop {
        while let Ok(event) = rx.try_recv() {
            match event {
                UiEvent::Fetched(action) => {
                    let effects = reduce(&mut app.state, ListAction::Runtime(action));
                    apply_effects(effects, &source, &tx);
                }
            }
        }

        terminal.draw(|f| ui(f, app))?;

        if event::poll(Duration::from_millis(50))? {
            let Event::Key(key) = event::read()? else {
                continue;
            };
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match handle_key(app, key) {
                KeyOutcome::Dispatch(action) => {
                    app.notice = None;
                    let effects = reduce(&mut app.state, ListAction::User(action));
                    apply_effects(effects, &source, &tx);
                }
                KeyOutcome::CopyUrl => {
                    let url = url_line(&app.state);
                    app.notice = Some(match arboard::Clipboard::new() {
                        Ok(mut clipboard) => match clipboard.set_text(url) {
                            Ok(()) => "Copied URL to clipboard".to_string(),
                            Err(err) => format!("Clipboard error: {err}"),
                        },
                        Err(err) => format!("Clipboard unavailable: {err}"),
                    });
                }
                KeyOutcome::Exit => return Ok(()),
                KeyOutcome::Redraw => {}
            }
        }
    }
}

/// Fetches run on their own thread; results come back through `tx`.
/// There is no address bar, the footer reads `url_query` from state.
fn apply_effects(effects: Vec<ListEffect>, source: &SharedSource, tx: &mpsc::Sender<UiEvent>) {
    for effect in effects {
        match effect {
            ListEffect::Fetch { seq, request } => {
                let tx = tx.clone();
                let source = Arc::clone(source);
                std::thread::spawn(move || {
                    let action = match source.list(&request) {
                        Ok(page) => RuntimeAction::FetchSucceeded { seq, page },
                        Err(error) => RuntimeAction::FetchFailed { seq, error },
                    };
                    let _ = tx.send(UiEvent::Fetched(action));
                });
            }
            ListEffect::ReplaceUrl(query) => {
                tracing::debug!(query = %query, "url replaced");
            }
            ListEffect::RequestFrame => {}
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) -> KeyOutcome {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return KeyOutcome::Exit;
    }

    if let InputMode::Search(buffer) = &mut app.mode {
        match key.code {
            KeyCode::Enter => {
                let query = std::mem::take(buffer);
                app.mode = InputMode::Browse;
                return KeyOutcome::Dispatch(UserAction::Search(query));
            }
            KeyCode::Esc => app.mode = InputMode::Browse,
            KeyCode::Backspace => {
                buffer.pop();
            }
            KeyCode::Char(ch) => buffer.push(ch),
            _ => {}
        }
        return KeyOutcome::Redraw;
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => KeyOutcome::Exit,
        KeyCode::Char('/') => {
            app.mode = InputMode::Search(app.state.filters.search_query.clone());
            KeyOutcome::Redraw
        }
        KeyCode::Tab | KeyCode::BackTab => KeyOutcome::Dispatch(UserAction::ToggleStatus),
        KeyCode::Char('s') => KeyOutcome::Dispatch(UserAction::CycleSort),
        KeyCode::Left | KeyCode::Char('p') => KeyOutcome::Dispatch(UserAction::PrevPage),
        KeyCode::Right | KeyCode::Char('n') => KeyOutcome::Dispatch(UserAction::NextPage),
        KeyCode::Char('c') => KeyOutcome::Dispatch(UserAction::ClearAll),
        KeyCode::Char('r') => KeyOutcome::Dispatch(UserAction::Retry),
        KeyCode::Char('y') => KeyOutcome::CopyUrl,
        _ => KeyOutcome::Redraw,
    }
}

fn get_spinner() -> &'static str {
    let frames = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis())
        .unwrap_or(0);
    frames[(millis / 100) as usize % frames.len()]
}

fn ui(f: &mut ratatui::Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(f.area());

    render_tabs(f, chunks[0], app);
    render_search(f, chunks[1], app);
    render_collection(f, chunks[2], app);
    render_footer(f, chunks[3], app);
    render_help(f, chunks[4], app);
}

fn render_tabs(f: &mut ratatui::Frame, area: Rect, app: &App) {
    let tabs = status_tabs(&app.state);
    let titles: Vec<Line> = tabs.iter().map(|tab| Line::from(tab_label(tab))).collect();
    let selected = tabs.iter().position(|tab| tab.selected).unwrap_or(0);
    let widget = Tabs::new(titles)
        .select(selected)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(PALETTE.border))
                .title(app.state.kind.label()),
        )
        .highlight_style(
            Style::default()
                .fg(PALETTE.accent)
                .add_modifier(Modifier::BOLD),
        );
    f.render_widget(widget, area);
}

fn render_search(f: &mut ratatui::Frame, area: Rect, app: &App) {
    let filters = &app.state.filters;
    let (text, style) = match &app.mode {
        InputMode::Search(buffer) => (format!("{buffer}▏"), Style::default().fg(PALETTE.accent)),
        InputMode::Browse if filters.search_query.is_empty() => {
            ("press / to search".to_string(), Style::default().fg(PALETTE.muted))
        }
        InputMode::Browse => (filters.search_query.clone(), Style::default()),
    };
    let mut spans = vec![Span::styled(text, style)];
    let active = filters.filters.active_count();
    if active > 0 {
        spans.push(Span::styled(
            format!("  [{active} filter(s)]"),
            Style::default().fg(PALETTE.header),
        ));
    }
    let title = format!(
        "Search · sort {} {}",
        filters.order_by.label(),
        filters.order_direction.arrow()
    );
    let widget = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(PALETTE.border))
            .title(title),
    );
    f.render_widget(widget, area);
}

fn render_collection(f: &mut ratatui::Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(PALETTE.border));

    let message = match project(&app.state) {
        CollectionView::Loading => Line::from(format!("{} Loading...", get_spinner())),
        CollectionView::Error { error } => Line::from(vec![
            Span::styled(
                format!("Failed to load: {error}"),
                Style::default().fg(PALETTE.danger),
            ),
            Span::styled("  (r to retry)", Style::default().fg(PALETTE.muted)),
        ]),
        CollectionView::Empty { filtered } => Line::from(Span::styled(
            empty_message(filtered),
            Style::default().fg(PALETTE.muted),
        )),
        CollectionView::Populated { items, .. } => {
            let rows = items
                .iter()
                .map(|record| Row::new(row_cells(app.state.kind, record).to_vec()));
            let header = Row::new(COLUMNS.to_vec()).style(
                Style::default()
                    .fg(PALETTE.header)
                    .add_modifier(Modifier::BOLD),
            );
            let widths = [
                Constraint::Percentage(25),
                Constraint::Percentage(30),
                Constraint::Percentage(20),
                Constraint::Length(8),
                Constraint::Length(17),
            ];
            let table = Table::new(rows, widths).header(header).block(block);
            f.render_widget(table, area);
            return;
        }
    };
    f.render_widget(Paragraph::new(message).block(block), area);
}

fn render_footer(f: &mut ratatui::Frame, area: Rect, app: &App) {
    let pagination = match project(&app.state) {
        CollectionView::Populated { pagination, .. } => pagination,
        _ => None,
    };
    let mut spans = Vec::new();
    if let Some(pagination) = pagination {
        let prev = if pagination.has_prev() { "◀ " } else { "  " };
        let next = if pagination.has_next() { " ▶" } else { "  " };
        spans.push(Span::raw(format!("{prev}{}{next}  ", footer_text(&pagination))));
    }
    spans.push(Span::styled(
        url_line(&app.state),
        Style::default().fg(PALETTE.muted),
    ));
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_help(f: &mut ratatui::Frame, area: Rect, app: &App) {
    let text = match (&app.mode, &app.notice) {
        (InputMode::Search(_), _) => "enter apply · esc cancel".to_string(),
        (InputMode::Browse, Some(notice)) => notice.clone(),
        (InputMode::Browse, None) => {
            let target = app.state.filters.status.toggle();
            let keys = "s sort · ←/→ page · c clear · r retry · y copy url · q quit";
            format!("/ search · tab {} · {keys}", target.label().to_lowercase())
        }
    };
    f.render_widget(
        Paragraph::new(Span::styled(text, Style::default().fg(PALETTE.muted))),
        area,
    );
}

#[cfg(test)]
mod tests {
    use flaglist_core::state::{EnvironmentScope, ListKind};
    use flaglist_source::InMemorySource;
    use pretty_assertions::assert_eq;
    use ratatui::backend::TestBackend;

    use super::*;

    fn source(count: usize) -> SharedSource {
        let records = (0..count)
            .map(|idx| {
                let mut record = Record::new(format!("flag-{idx:03}"), "env-dev");
                record.name = if idx % 2 == 0 { "web" } else { "ios" }.to_string();
                record
            })
            .collect();
        Arc::new(InMemorySource::new(records))
    }

    /// Feeds worker results back through the reducer until nothing is in flight.
    fn settle(
        app: &mut App,
        source: &SharedSource,
        tx: &mpsc::Sender<UiEvent>,
        rx: &mpsc::Receiver<UiEvent>,
    ) {
        while app.state.fetch.is_loading() {
            let UiEvent::Fetched(action) = rx
                .recv_timeout(Duration::from_secs(5))
                .expect("worker result");
            let effects = reduce(&mut app.state, ListAction::Runtime(action));
            apply_effects(effects, source, tx);
        }
    }

    fn app() -> App {
        App::new(ListPageState::new(
            ListKind::Features,
            EnvironmentScope::new("env-dev"),
            50,
        ))
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn search_mode_collects_input_until_enter() {
        let mut app = app();
        assert_eq!(handle_key(&mut app, press(KeyCode::Char('/'))), KeyOutcome::Redraw);
        for ch in "webx".chars() {
            handle_key(&mut app, press(KeyCode::Char(ch)));
        }
        handle_key(&mut app, press(KeyCode::Backspace));
        assert_eq!(app.mode, InputMode::Search("web".to_string()));
        // `q` is text while searching
        handle_key(&mut app, press(KeyCode::Char('q')));
        handle_key(&mut app, press(KeyCode::Backspace));

        assert_eq!(
            handle_key(&mut app, press(KeyCode::Enter)),
            KeyOutcome::Dispatch(UserAction::Search("web".to_string()))
        );
        assert_eq!(app.mode, InputMode::Browse);
    }

    #[test]
    fn browse_keys_map_to_actions() {
        let mut app = app();
        assert_eq!(
            handle_key(&mut app, press(KeyCode::Tab)),
            KeyOutcome::Dispatch(UserAction::ToggleStatus)
        );
        assert_eq!(
            handle_key(&mut app, press(KeyCode::Right)),
            KeyOutcome::Dispatch(UserAction::NextPage)
        );
        assert_eq!(
            handle_key(&mut app, press(KeyCode::Char('p'))),
            KeyOutcome::Dispatch(UserAction::PrevPage)
        );
        assert_eq!(handle_key(&mut app, press(KeyCode::Char('y'))), KeyOutcome::CopyUrl);
        assert_eq!(handle_key(&mut app, press(KeyCode::Char('q'))), KeyOutcome::Exit);
    }

    #[test]
    fn escape_cancels_search_without_dispatch() {
        let mut app = app();
        app.state.filters.search_query = "old".to_string();
        handle_key(&mut app, press(KeyCode::Char('/')));
        handle_key(&mut app, press(KeyCode::Char('x')));
        assert_eq!(handle_key(&mut app, press(KeyCode::Esc)), KeyOutcome::Redraw);
        assert_eq!(app.mode, InputMode::Browse);
        assert_eq!(app.state.filters.search_query, "old");
    }

    #[test]
    fn frame_renders_empty_list_message() {
        let mut app = app();
        app.state.fetch.page = Some(flaglist_core::contracts::Page::empty());
        let mut terminal = Terminal::new(TestBackend::new(100, 14)).expect("terminal");
        terminal.draw(|f| ui(f, &app)).expect("draw");

        let buffer = terminal.backend().buffer();
        let text: String = buffer
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(text.contains("Nothing here yet."));
        assert!(text.contains("/features"));
    }

    #[test]
    fn worker_results_flow_back_through_the_reducer() {
        let source = source(120);
        let (tx, rx) = mpsc::channel();
        let mut app = app();

        let effects = reduce(
            &mut app.state,
            ListAction::Runtime(RuntimeAction::Initialize {
                query: "page=9".to_string(),
            }),
        );
        apply_effects(effects, &source, &tx);
        settle(&mut app, &source, &tx, &rx);

        // Past-the-end page is clamped and refetched by a second worker.
        assert_eq!(app.state.filters.page, 3);
        assert_eq!(app.state.url_query, "page=3");
        assert_eq!(app.state.items().len(), 20);
        assert_eq!(app.state.fetch.error, None);
    }

    #[test]
    fn only_the_latest_worker_result_is_applied() {
        let source = source(10);
        let (tx, rx) = mpsc::channel();
        let mut app = app();

        let effects = reduce(
            &mut app.state,
            ListAction::Runtime(RuntimeAction::Initialize {
                query: String::new(),
            }),
        );
        apply_effects(effects, &source, &tx);
        for query in ["web", "ios"] {
            let effects = reduce(
                &mut app.state,
                ListAction::User(UserAction::Search(query.to_string())),
            );
            apply_effects(effects, &source, &tx);
        }
        settle(&mut app, &source, &tx, &rx);

        assert_eq!(app.state.filters.search_query, "ios");
        assert_eq!(app.state.items().len(), 5);
        assert!(app.state.items().iter().all(|record| record.name == "ios"));
    }
}
