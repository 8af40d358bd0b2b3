// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use devdex_app::{
    AppCommand, AppEvent, AppState, AttributeValue, Catalog, CatalogError, DEFAULT_OVERSCAN,
    DEFAULT_SUGGESTION_LIMIT, Deferred, DeferredQueue, Device, FilterPanel, FilteredView,
    ImageKind, ImageSize, ImageUrls, Route, RowCursor, RowMove, SuggestionController,
    SuggestionInput, SuggestionOutcome, Suggestions, ViewMode, Virtualizer, suggest,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Tabs, Wrap,
};
use std::io;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

const TABLE_ROW_EXTENT: u32 = 1;
const GRID_CARD_EXTENT: u32 = 5;
const WHEEL_ROWS: i64 = 3;
const SUGGESTION_SLOTS_SHOWN: usize = 8;
const STATUS_CLEAR_AFTER: Duration = Duration::from_secs(4);
const MISSING_VALUE: &str = "n/a";

/// Everything the UI needs from the outside world.
pub trait AppRuntime {
    fn load_catalog(&mut self) -> Result<Arc<Catalog>, CatalogError>;
    /// Drop any cached catalog and fetch again.
    fn reload_catalog(&mut self) -> Result<Arc<Catalog>, CatalogError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiOptions {
    pub suggestion_limit: usize,
    pub overscan: usize,
    pub images: ImageUrls,
}

impl Default for UiOptions {
    fn default() -> Self {
        Self {
            suggestion_limit: DEFAULT_SUGGESTION_LIMIT,
            overscan: DEFAULT_OVERSCAN,
            images: ImageUrls::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
enum LoadState {
    #[default]
    Loading,
    Ready,
    Failed(CatalogError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoadRequest {
    Initial,
    Reload,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Focus {
    #[default]
    List,
    Search,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct DetailUiState {
    show_json: bool,
    scroll: u16,
}

pub enum InternalEvent {
    ClearStatus { token: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ScreenLayout {
    header: Rect,
    search: Rect,
    body: Rect,
    status: Rect,
}

#[derive(Debug, Clone, PartialEq)]
struct ViewData {
    options: UiOptions,
    load: LoadState,
    pending_load: Option<LoadRequest>,
    catalog: Option<Arc<Catalog>>,
    focus: Focus,
    suggestions: SuggestionController,
    suggestion_scroll: usize,
    deferred: DeferredQueue,
    rows: RowCursor,
    virtualizer: Virtualizer,
    filter_panel: FilterPanel,
    detail: DetailUiState,
    help_visible: bool,
    screen: Rect,
    status_token: u64,
}

impl ViewData {
    fn new(options: UiOptions, committed_search: &str) -> Self {
        let overscan = options.overscan;
        Self {
            options,
            load: LoadState::Loading,
            pending_load: Some(LoadRequest::Initial),
            catalog: None,
            focus: Focus::List,
            suggestions: SuggestionController::new(committed_search),
            suggestion_scroll: 0,
            deferred: DeferredQueue::default(),
            rows: RowCursor::default(),
            virtualizer: Virtualizer::new(0, TABLE_ROW_EXTENT, overscan),
            filter_panel: FilterPanel::default(),
            detail: DetailUiState::default(),
            help_visible: false,
            screen: Rect::default(),
            status_token: 0,
        }
    }
}

pub fn run_app<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    options: UiOptions,
) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen, EnableMouseCapture)
        .context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut view_data = ViewData::new(options, &state.view.search_term);
    let (internal_tx, internal_rx) = mpsc::channel();

    let mut result = Ok(());
    loop {
        process_internal_events(state, &mut view_data, &internal_rx);

        let area = match terminal.size() {
            Ok(size) => Rect::new(0, 0, size.width, size.height),
            Err(error) => {
                result = Err(error).context("read terminal size");
                break;
            }
        };
        prepare_frame(state, &mut view_data, area);

        if let Err(error) = terminal.draw(|frame| render(frame, state, &view_data)) {
            result = Err(error).context("draw frame");
            break;
        }

        // The loading frame is on screen; fetch before reading input.
        if view_data.pending_load.is_some() {
            perform_pending_load(state, runtime, &mut view_data, &internal_tx);
            continue;
        }

        let has_event = match event::poll(Duration::from_millis(120)) {
            Ok(has_event) => has_event,
            Err(error) => {
                result = Err(error).context("poll event");
                break;
            }
        };
        if !has_event {
            continue;
        }
        match event::read() {
            Ok(Event::Key(key)) if key.kind != KeyEventKind::Release => {
                if handle_key_event(state, &mut view_data, &internal_tx, key) {
                    break;
                }
            }
            Ok(Event::Mouse(mouse)) => {
                handle_mouse_event(state, &mut view_data, &internal_tx, mouse);
            }
            Ok(_) => {}
            Err(error) => {
                result = Err(error).context("read event");
                break;
            }
        }
    }

    disable_raw_mode().context("disable raw mode")?;
    execute!(
        io::stdout(),
        DisableMouseCapture,
        terminal::LeaveAlternateScreen
    )
    .context("leave alternate screen")?;
    result
}

fn process_internal_events(
    state: &mut AppState,
    view_data: &mut ViewData,
    rx: &Receiver<InternalEvent>,
) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::ClearStatus { token } if token == view_data.status_token => {
                state.dispatch(AppCommand::ClearStatus);
            }
            InternalEvent::ClearStatus { .. } => {}
        }
    }
}

fn schedule_status_clear(internal_tx: &Sender<InternalEvent>, token: u64) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(STATUS_CLEAR_AFTER);
        let _ = sender.send(InternalEvent::ClearStatus { token });
    });
}

fn emit_status(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    message: impl Into<String>,
) {
    state.dispatch(AppCommand::SetStatus(message.into()));
    view_data.status_token = view_data.status_token.saturating_add(1);
    schedule_status_clear(internal_tx, view_data.status_token);
}

fn request_load(view_data: &mut ViewData, request: LoadRequest) {
    view_data.load = LoadState::Loading;
    view_data.pending_load = Some(request);
}

fn perform_pending_load<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    let Some(request) = view_data.pending_load.take() else {
        return;
    };
    let result = match request {
        LoadRequest::Initial => runtime.load_catalog(),
        LoadRequest::Reload => runtime.reload_catalog(),
    };
    match result {
        Ok(catalog) => {
            info!(devices = catalog.len(), ?request, "catalog ready");
            let count = catalog.len();
            view_data.catalog = Some(catalog);
            view_data.load = LoadState::Ready;
            reset_suggestions(view_data);
            if request == LoadRequest::Reload {
                emit_status(state, view_data, internal_tx, format!("reloaded {count} devices"));
            }
        }
        Err(error) => {
            warn!(%error, ?request, "catalog load failed");
            view_data.catalog = None;
            view_data.load = LoadState::Failed(error);
        }
    }
}

/// Sizes the virtualizer for this frame, then runs deferred reveals so they
/// see the list the frame will draw.
fn prepare_frame(state: &AppState, view_data: &mut ViewData, area: Rect) {
    view_data.screen = area;
    let layout = screen_layout(area);
    let rows_area = list_rows_area(layout.body, state.view.view_mode);
    let len = visible_len(state, view_data);
    let columns = grid_columns(rows_area.width);

    let (estimate, count) = match state.view.view_mode {
        ViewMode::Table => (TABLE_ROW_EXTENT, len),
        ViewMode::Grid => (GRID_CARD_EXTENT, len.div_ceil(columns)),
    };
    view_data.virtualizer.set_estimate(estimate);
    view_data.virtualizer.set_count(count);
    view_data.virtualizer.set_viewport(u32::from(rows_area.height));
    view_data.rows.clamp(len);

    for action in view_data.deferred.drain() {
        match action {
            Deferred::RevealRow(index) => {
                let item = match state.view.view_mode {
                    ViewMode::Table => index,
                    ViewMode::Grid => index / columns,
                };
                view_data.virtualizer.scroll_into_view(item);
            }
            Deferred::RevealSuggestion(index) => reveal_suggestion(view_data, index),
        }
    }
}

fn reveal_suggestion(view_data: &mut ViewData, index: usize) {
    if index < view_data.suggestion_scroll {
        view_data.suggestion_scroll = index;
    } else if index >= view_data.suggestion_scroll + SUGGESTION_SLOTS_SHOWN {
        view_data.suggestion_scroll = index + 1 - SUGGESTION_SLOTS_SHOWN;
    }
}

fn visible_len(state: &AppState, view_data: &ViewData) -> usize {
    view_data.catalog.as_deref().map_or(0, |catalog| {
        filtered_view(catalog, state).visible.len()
    })
}

fn filtered_view<'a>(catalog: &'a Catalog, state: &AppState) -> FilteredView<'a> {
    FilteredView::derive(
        catalog,
        &state.view.selected_categories,
        &state.view.search_term,
    )
}

fn live_suggestions<'a>(
    catalog: &'a Catalog,
    state: &AppState,
    view_data: &ViewData,
) -> Suggestions<'a> {
    let view = filtered_view(catalog, state);
    suggest(
        &view.category_filtered,
        view_data.suggestions.draft(),
        view_data.options.suggestion_limit,
        view_data.suggestions.expanded(),
    )
}

fn reset_suggestions(view_data: &mut ViewData) {
    view_data.suggestions.handle(
        SuggestionInput::DevicesChanged,
        &Suggestions::default(),
        &mut view_data.deferred,
    );
    view_data.suggestion_scroll = 0;
}

fn reset_list(view_data: &mut ViewData) {
    view_data.rows.reset();
    view_data.virtualizer.scroll_to(0);
}

fn apply_command(
    state: &mut AppState,
    view_data: &mut ViewData,
    command: AppCommand,
) -> Vec<AppEvent> {
    let events = state.dispatch(command);
    for event in &events {
        match event {
            AppEvent::CategoriesChanged => {
                reset_suggestions(view_data);
                reset_list(view_data);
            }
            AppEvent::SearchCommitted(term) => {
                view_data.suggestions.set_draft(term);
                reset_list(view_data);
            }
            AppEvent::ViewModeChanged(_) => {
                view_data.virtualizer.scroll_to(0);
                if let Some(index) = view_data.rows.index() {
                    view_data.deferred.push(Deferred::RevealRow(index));
                }
            }
            AppEvent::RouteChanged(route) => {
                debug!(?route, "route changed");
                view_data.detail = DetailUiState::default();
                view_data.focus = Focus::List;
            }
            AppEvent::LocationReplaced(_) | AppEvent::StatusUpdated(_) | AppEvent::StatusCleared => {}
        }
    }
    events
}

fn send_suggestion_input(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    input: SuggestionInput,
) {
    let catalog = view_data.catalog.clone();
    let suggestions = match catalog.as_deref() {
        Some(catalog) => live_suggestions(catalog, state, view_data),
        None => Suggestions::default(),
    };
    let total = suggestions.total_matches;
    let outcome = view_data
        .suggestions
        .handle(input, &suggestions, &mut view_data.deferred);
    if view_data.suggestions.highlighted().is_none() {
        view_data.suggestion_scroll = 0;
    }

    match outcome {
        SuggestionOutcome::Nothing => {}
        SuggestionOutcome::Commit(term) => {
            apply_command(state, view_data, AppCommand::CommitSearch(term));
            view_data.focus = Focus::List;
        }
        SuggestionOutcome::Expanded => {
            emit_status(state, view_data, internal_tx, format!("showing all {total} matches"));
        }
        SuggestionOutcome::Closed { keep_focus } => {
            if !keep_focus {
                view_data.focus = Focus::List;
            }
        }
    }
}

fn focus_search(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    view_data.focus = Focus::Search;
    send_suggestion_input(state, view_data, internal_tx, SuggestionInput::Focus);
}

fn handle_key_event(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    if matches!(key.code, KeyCode::Char('q') | KeyCode::Char('c'))
        && key.modifiers.contains(KeyModifiers::CONTROL)
    {
        return true;
    }

    if view_data.help_visible {
        if key.code == KeyCode::Esc || key.code == KeyCode::Char('?') {
            view_data.help_visible = false;
        }
        return false;
    }

    if view_data.filter_panel.is_open() {
        handle_filter_panel_key(state, view_data, internal_tx, key);
        return false;
    }

    if view_data.focus == Focus::Search {
        handle_search_key(state, view_data, internal_tx, key);
        return false;
    }

    match (key.code, key.modifiers) {
        (KeyCode::Char('q'), KeyModifiers::NONE) => return true,
        (KeyCode::Char('?'), _) => {
            view_data.help_visible = true;
            return false;
        }
        (KeyCode::Char('r'), KeyModifiers::NONE) => {
            request_load(view_data, LoadRequest::Reload);
            return false;
        }
        _ => {}
    }

    match state.route() {
        Route::Devices => handle_list_key(state, view_data, internal_tx, key),
        Route::Device(_) | Route::NotFound(_) => handle_detail_key(state, view_data, key),
    }
    false
}

fn handle_search_key(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let input = match (key.code, key.modifiers) {
        (KeyCode::Esc, _) => {
            if !view_data.suggestions.is_open() {
                view_data.focus = Focus::List;
                return;
            }
            SuggestionInput::Escape
        }
        (KeyCode::Tab | KeyCode::BackTab, _) => SuggestionInput::Tab,
        (KeyCode::Enter, _) => SuggestionInput::Enter,
        (KeyCode::Down, _) => SuggestionInput::ArrowDown,
        (KeyCode::Up, _) => SuggestionInput::ArrowUp,
        (KeyCode::Char('u'), modifiers) if modifiers.contains(KeyModifiers::CONTROL) => {
            SuggestionInput::Clear
        }
        (KeyCode::Backspace, _) => {
            let mut draft = view_data.suggestions.draft().to_owned();
            draft.pop();
            SuggestionInput::TextChanged(draft)
        }
        (KeyCode::Char(ch), modifiers)
            if !modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
        {
            let mut draft = view_data.suggestions.draft().to_owned();
            draft.push(ch);
            SuggestionInput::TextChanged(draft)
        }
        _ => return,
    };
    send_suggestion_input(state, view_data, internal_tx, input);
}

fn handle_list_key(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let grid = state.view.view_mode == ViewMode::Grid;
    let rows_area = list_rows_area(screen_layout(view_data.screen).body, state.view.view_mode);
    let columns = grid_columns(rows_area.width);
    let viewport_rows = usize::try_from(
        view_data.virtualizer.viewport() / view_data.virtualizer.estimate(),
    )
    .unwrap_or(1)
    .max(1);
    let page = if grid {
        columns * viewport_rows
    } else {
        viewport_rows
    };

    let movement = match (key.code, key.modifiers) {
        (KeyCode::Char('/'), _) => {
            focus_search(state, view_data, internal_tx);
            return;
        }
        (KeyCode::Char('u'), modifiers) if modifiers.contains(KeyModifiers::CONTROL) => {
            send_suggestion_input(state, view_data, internal_tx, SuggestionInput::Clear);
            emit_status(state, view_data, internal_tx, "search cleared");
            return;
        }
        (KeyCode::Char('v'), KeyModifiers::NONE) => {
            apply_command(state, view_data, AppCommand::ToggleViewMode);
            return;
        }
        (KeyCode::Char('p'), KeyModifiers::NONE) => {
            open_filter_panel(state, view_data, internal_tx);
            return;
        }
        (KeyCode::Char('x'), KeyModifiers::NONE) => {
            reset_categories(state, view_data, internal_tx);
            return;
        }
        (KeyCode::Enter, _) => {
            open_selected_device(state, view_data, internal_tx);
            return;
        }
        (KeyCode::Char('j') | KeyCode::Down, _) if grid => (RowMove::PageDown, columns),
        (KeyCode::Char('k') | KeyCode::Up, _) if grid => (RowMove::GridUp, columns),
        (KeyCode::Char('l') | KeyCode::Right, _) if grid => (RowMove::Down, 1),
        (KeyCode::Char('h') | KeyCode::Left, _) if grid => (RowMove::Up, 1),
        (KeyCode::Char('j') | KeyCode::Down, _) => (RowMove::Down, page),
        (KeyCode::Char('k') | KeyCode::Up, _) => (RowMove::Up, page),
        (KeyCode::PageDown, _) => (RowMove::PageDown, page),
        (KeyCode::PageUp, _) => (RowMove::PageUp, page),
        (KeyCode::Char('g') | KeyCode::Home, _) => (RowMove::Home, page),
        (KeyCode::Char('G') | KeyCode::End, _) => (RowMove::End, page),
        _ => return,
    };

    let len = visible_len(state, view_data);
    let (movement, step) = movement;
    view_data
        .rows
        .apply(movement, len, step, &mut view_data.deferred);
}

fn handle_detail_key(state: &mut AppState, view_data: &mut ViewData, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Backspace | KeyCode::Left | KeyCode::Char('h') => {
            apply_command(state, view_data, AppCommand::Back);
        }
        KeyCode::Char('s') => {
            view_data.detail.show_json = !view_data.detail.show_json;
            view_data.detail.scroll = 0;
        }
        KeyCode::Char('j') | KeyCode::Down => {
            view_data.detail.scroll = view_data.detail.scroll.saturating_add(1);
        }
        KeyCode::Char('k') | KeyCode::Up => {
            view_data.detail.scroll = view_data.detail.scroll.saturating_sub(1);
        }
        _ => {}
    }
}

fn handle_filter_panel_key(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let categories = categories(view_data);
    match key.code {
        KeyCode::Esc | KeyCode::Char('p') => view_data.filter_panel.close(),
        KeyCode::Char('j') | KeyCode::Down => view_data.filter_panel.move_by(1, categories.len()),
        KeyCode::Char('k') | KeyCode::Up => view_data.filter_panel.move_by(-1, categories.len()),
        KeyCode::Char(' ') | KeyCode::Enter => {
            let Some(name) = view_data.filter_panel.current(&categories) else {
                return;
            };
            let selected = !state.view.selected_categories.contains(name);
            apply_command(
                state,
                view_data,
                AppCommand::ToggleCategory {
                    name: name.to_owned(),
                    selected,
                },
            );
        }
        KeyCode::Char('x') => reset_categories(state, view_data, internal_tx),
        _ => {}
    }
}

fn categories(view_data: &ViewData) -> Vec<String> {
    view_data
        .catalog
        .as_deref()
        .map(|catalog| devdex_app::derive_categories(catalog.devices.iter()))
        .unwrap_or_default()
}

fn open_filter_panel(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    let categories = categories(view_data);
    if categories.is_empty() {
        emit_status(state, view_data, internal_tx, "no product lines loaded");
        return;
    }
    view_data.filter_panel.open(categories.len());
}

fn reset_categories(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    if !state.filter_active() {
        emit_status(state, view_data, internal_tx, "no product line filter active");
        return;
    }
    apply_command(state, view_data, AppCommand::ResetCategories);
    emit_status(state, view_data, internal_tx, "filters reset");
}

fn open_selected_device(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    let Some(catalog) = view_data.catalog.clone() else {
        return;
    };
    let Some(index) = view_data.rows.index() else {
        emit_status(state, view_data, internal_tx, "select a device first");
        return;
    };
    let id = filtered_view(&catalog, state)
        .visible
        .get(index)
        .map(|device| device.id.clone());
    if let Some(id) = id {
        apply_command(state, view_data, AppCommand::OpenDevice(id));
    }
}

fn handle_mouse_event(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    mouse: MouseEvent,
) {
    if view_data.help_visible || view_data.filter_panel.is_open() {
        return;
    }
    let point = Position::new(mouse.column, mouse.row);
    let layout = screen_layout(view_data.screen);
    let panel_slot = suggestion_slot_at(state, view_data, layout, point);

    match mouse.kind {
        MouseEventKind::Moved => {
            if let Some(slot) = panel_slot {
                send_suggestion_input(state, view_data, internal_tx, SuggestionInput::Hover(slot));
            }
        }
        MouseEventKind::Down(MouseButton::Left) => {
            if let Some(slot) = panel_slot {
                send_suggestion_input(state, view_data, internal_tx, SuggestionInput::Click(slot));
                return;
            }
            if layout.search.contains(point) {
                focus_search(state, view_data, internal_tx);
                return;
            }
            if view_data.focus == Focus::Search {
                send_suggestion_input(state, view_data, internal_tx, SuggestionInput::ClickOutside);
                view_data.focus = Focus::List;
            }
            if state.route() == Route::Devices {
                click_row(state, view_data, internal_tx, layout, point);
            }
        }
        MouseEventKind::ScrollDown | MouseEventKind::ScrollUp => {
            if state.route() != Route::Devices || !layout.body.contains(point) {
                return;
            }
            let direction = if mouse.kind == MouseEventKind::ScrollDown {
                1
            } else {
                -1
            };
            let delta = direction * WHEEL_ROWS * i64::from(view_data.virtualizer.estimate());
            view_data.virtualizer.scroll_by(delta);
        }
        _ => {}
    }
}

fn click_row(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    layout: ScreenLayout,
    point: Position,
) {
    let rows_area = list_rows_area(layout.body, state.view.view_mode);
    if !rows_area.contains(point) {
        return;
    }
    let offset = view_data
        .virtualizer
        .scroll_offset()
        .saturating_add(u32::from(point.y - rows_area.y));
    if offset >= view_data.virtualizer.total_extent() {
        return;
    }
    let Some(item) = view_data.virtualizer.index_at(offset) else {
        return;
    };
    let index = match state.view.view_mode {
        ViewMode::Table => item,
        ViewMode::Grid => {
            let columns = grid_columns(rows_area.width);
            let card_width = (rows_area.width / columns as u16).max(1);
            let column = usize::from((point.x - rows_area.x) / card_width).min(columns - 1);
            item * columns + column
        }
    };

    let len = visible_len(state, view_data);
    if view_data.rows.index() == Some(index) {
        open_selected_device(state, view_data, internal_tx);
    } else {
        view_data.rows.select(index, len);
    }
}

fn suggestion_slot_at(
    state: &AppState,
    view_data: &ViewData,
    layout: ScreenLayout,
    point: Position,
) -> Option<usize> {
    if view_data.focus != Focus::Search || !view_data.suggestions.is_open() {
        return None;
    }
    let catalog = view_data.catalog.as_deref()?;
    let slots = live_suggestions(catalog, state, view_data).slot_count();
    let panel = suggestion_panel_area(layout, view_data.screen, slots)?;
    let inner = inset(panel);
    if !inner.contains(point) {
        return None;
    }
    let slot = view_data.suggestion_scroll + usize::from(point.y - inner.y);
    (slot < slots).then_some(slot)
}

fn screen_layout(area: Rect) -> ScreenLayout {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
        ])
        .split(area);
    ScreenLayout {
        header: chunks[0],
        search: chunks[1],
        body: chunks[2],
        status: chunks[3],
    }
}

fn inset(area: Rect) -> Rect {
    Rect::new(
        area.x.saturating_add(1),
        area.y.saturating_add(1),
        area.width.saturating_sub(2),
        area.height.saturating_sub(2),
    )
}

/// Area holding device rows or cards, below the table header when present.
fn list_rows_area(body: Rect, mode: ViewMode) -> Rect {
    let inner = inset(body);
    match mode {
        ViewMode::Table => Rect {
            y: inner.y.saturating_add(1),
            height: inner.height.saturating_sub(1),
            ..inner
        },
        ViewMode::Grid => inner,
    }
}

fn grid_columns(width: u16) -> usize {
    match width {
        0..60 => 2,
        60..90 => 3,
        90..120 => 4,
        120..150 => 5,
        _ => 6,
    }
}

fn suggestion_panel_area(layout: ScreenLayout, screen: Rect, slots: usize) -> Option<Rect> {
    if slots == 0 {
        return None;
    }
    let top = layout.search.y.saturating_add(layout.search.height);
    let available = screen.bottom().saturating_sub(top);
    let wanted = u16::try_from(slots.min(SUGGESTION_SLOTS_SHOWN)).unwrap_or(u16::MAX) + 2;
    let height = wanted.min(available);
    (height > 2).then(|| Rect::new(layout.search.x, top, layout.search.width, height))
}

fn render(frame: &mut ratatui::Frame<'_>, state: &AppState, view_data: &ViewData) {
    let layout = screen_layout(frame.area());
    let catalog = view_data.catalog.as_deref();

    render_header(frame, layout.header, state, catalog);
    render_search(frame, layout.search, view_data);

    match (&view_data.load, catalog) {
        (LoadState::Ready, Some(catalog)) => match state.route() {
            Route::Devices => render_list(frame, layout.body, state, view_data, catalog),
            Route::Device(id) => match catalog.find(&id) {
                Ok(device) => render_detail(frame, layout.body, view_data, device),
                Err(error) => render_message(frame, layout.body, "not found", &error.to_string()),
            },
            Route::NotFound(path) => render_message(
                frame,
                layout.body,
                "404",
                &format!("Page not found: {path}\n\npress esc to return to the device list"),
            ),
        },
        (LoadState::Failed(error), _) => render_message(
            frame,
            layout.body,
            "error",
            &format!("{error}\n\npress r to retry"),
        ),
        _ => render_message(frame, layout.body, "devices", "loading devices..."),
    }

    let status = Paragraph::new(status_text(state, view_data))
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status, layout.status);

    if view_data.focus == Focus::Search
        && view_data.suggestions.is_open()
        && let Some(catalog) = catalog
    {
        render_suggestions(frame, layout, state, view_data, catalog);
    }

    if view_data.filter_panel.is_open() {
        let area = centered_rect(50, 60, frame.area());
        frame.render_widget(Clear, area);
        let panel = Paragraph::new(filter_panel_lines(state, view_data)).block(
            Block::default()
                .title("product lines")
                .borders(Borders::ALL)
                .style(Style::default().fg(Color::Cyan)),
        );
        frame.render_widget(panel, area);
    }

    if view_data.help_visible {
        let area = centered_rect(80, 60, frame.area());
        frame.render_widget(Clear, area);
        let help = Paragraph::new(help_overlay_text())
            .block(Block::default().title("help").borders(Borders::ALL));
        frame.render_widget(help, area);
    }
}

fn render_header(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    state: &AppState,
    catalog: Option<&Catalog>,
) {
    if let Route::Device(id) = state.route() {
        let name = catalog
            .and_then(|catalog| catalog.find(&id).ok())
            .map_or_else(|| id.to_string(), |device| device.name().to_owned());
        let crumb = Paragraph::new(format!("devices > {name}"))
            .block(Block::default().title("devdex").borders(Borders::ALL));
        frame.render_widget(crumb, area);
        return;
    }

    let selected = ViewMode::ALL
        .iter()
        .position(|mode| *mode == state.view.view_mode)
        .unwrap_or(0);
    let mut titles: Vec<String> = ViewMode::ALL
        .iter()
        .map(|mode| mode.label().to_owned())
        .collect();
    if state.filter_active() {
        titles.push(format!(
            "filter: {}",
            state.view.selected_categories.iter().collect::<Vec<_>>().join(", ")
        ));
    }
    let tabs = Tabs::new(titles)
        .block(Block::default().title("devdex").borders(Borders::ALL))
        .style(Style::default().fg(Color::White))
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .select(selected);
    frame.render_widget(tabs, area);
}

fn render_search(frame: &mut ratatui::Frame<'_>, area: Rect, view_data: &ViewData) {
    let focused = view_data.focus == Focus::Search;
    let title = if focused {
        "search"
    } else {
        "search (/ to focus)"
    };
    let mut text = view_data.suggestions.draft().to_owned();
    if focused {
        text.push('_');
    }
    let style = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    let input = Paragraph::new(text)
        .style(style)
        .block(Block::default().title(title).borders(Borders::ALL));
    frame.render_widget(input, area);
}

fn render_message(frame: &mut ratatui::Frame<'_>, area: Rect, title: &str, message: &str) {
    let body = Paragraph::new(message.to_owned())
        .wrap(Wrap { trim: false })
        .block(Block::default().title(title.to_owned()).borders(Borders::ALL));
    frame.render_widget(body, area);
}

fn render_list(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    state: &AppState,
    view_data: &ViewData,
    catalog: &Catalog,
) {
    let view = filtered_view(catalog, state);
    if view.visible.is_empty() {
        let message = if catalog.is_empty() {
            "no devices in catalog"
        } else {
            "no devices match the current search and filters"
        };
        render_message(frame, area, "devices", message);
        return;
    }
    match state.view.view_mode {
        ViewMode::Table => render_table(frame, area, &view, view_data),
        ViewMode::Grid => render_grid(frame, area, &view, view_data),
    }
}

fn render_table(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    view: &FilteredView<'_>,
    view_data: &ViewData,
) {
    let window = view_data.virtualizer.window();
    let header = Row::new(
        ["Name", "Product line", "Short names", "Max power", "Speed", "Ports"].map(|label| {
            Cell::from(label).style(
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            )
        }),
    );

    let rows = window.items.iter().filter_map(|item| {
        let device = view.visible.get(item.index)?;
        let style = if view_data.rows.index() == Some(item.index) {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        Some(
            Row::new(vec![
                Cell::from(device.name().to_owned()),
                Cell::from(device.category().to_owned()),
                Cell::from(device.short_names_label()),
                Cell::from(compact_attribute(device.max_power(), "W")),
                Cell::from(compact_attribute(device.speed_mbps(), "Mbps")),
                Cell::from(
                    device
                        .port_count()
                        .map_or_else(|| "-".to_owned(), |ports| ports.to_string()),
                ),
            ])
            .style(style),
        )
    });

    let offset = match (&window.visible_range, &window.render_range) {
        (Some(visible), Some(rendered)) => visible.start() - rendered.start(),
        _ => 0,
    };
    let widths = [
        Constraint::Percentage(30),
        Constraint::Percentage(18),
        Constraint::Percentage(20),
        Constraint::Percentage(10),
        Constraint::Percentage(12),
        Constraint::Percentage(10),
    ];
    let table = Table::new(rows, widths)
        .header(header)
        .column_spacing(1)
        .block(
            Block::default()
                .title(format!("devices ({})", view.stats_label()))
                .borders(Borders::ALL),
        );
    let mut table_state = TableState::default().with_offset(offset);
    frame.render_stateful_widget(table, area, &mut table_state);
}

#[derive(Debug, Clone, PartialEq)]
struct CardModel<'a> {
    index: usize,
    row: usize,
    column: usize,
    device: &'a Device,
    image: Option<String>,
}

/// Card models for every grid row in the render range. Image URLs are only
/// resolved for rows within one row of the viewport.
fn grid_cards<'a>(
    view: &FilteredView<'a>,
    view_data: &ViewData,
    columns: usize,
) -> Vec<CardModel<'a>> {
    let window = view_data.virtualizer.window();
    let mut cards = Vec::new();
    for item in &window.items {
        let near = view_data
            .virtualizer
            .within_margin(item.index, GRID_CARD_EXTENT);
        for column in 0..columns {
            let index = item.index * columns + column;
            let Some(device) = view.visible.get(index) else {
                break;
            };
            let image = near
                .then(|| {
                    view_data
                        .options
                        .images
                        .url(device, ImageKind::Default, ImageSize::Small)
                })
                .flatten();
            cards.push(CardModel {
                index,
                row: item.index,
                column,
                device,
                image,
            });
        }
    }
    cards
}

fn render_grid(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    view: &FilteredView<'_>,
    view_data: &ViewData,
) {
    let outer = Block::default()
        .title(format!("devices ({})", view.stats_label()))
        .borders(Borders::ALL);
    frame.render_widget(outer, area);

    let rows_area = list_rows_area(area, ViewMode::Grid);
    let columns = grid_columns(rows_area.width);
    let card_width = rows_area.width / columns as u16;
    let scroll = view_data.virtualizer.scroll_offset();
    let bottom = scroll.saturating_add(u32::from(rows_area.height));

    for card in grid_cards(view, view_data, columns) {
        let start = view_data.virtualizer.offset_of(card.row);
        if start < scroll || start >= bottom {
            continue;
        }
        let top = rows_area.y + u16::try_from(start - scroll).unwrap_or(u16::MAX);
        let height = GRID_CARD_EXTENT.min(bottom - start);
        let card_area = Rect::new(
            rows_area.x + card_width * card.column as u16,
            top,
            card_width,
            u16::try_from(height).unwrap_or(u16::MAX),
        );

        let selected = view_data.rows.index() == Some(card.index);
        let border_style = if selected {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let image_line = match &card.image {
            Some(url) => format!("img {}", url_tail(url)),
            None => "img pending".to_owned(),
        };
        let lines = vec![
            Line::from(Span::styled(
                card.device.name().to_owned(),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                card.device.category().to_owned(),
                Style::default().fg(Color::Gray),
            )),
            Line::from(Span::styled(image_line, Style::default().fg(Color::DarkGray))),
        ];
        let widget = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style),
        );
        frame.render_widget(widget, card_area);
    }
}

fn url_tail(url: &str) -> &str {
    let start = url.len().saturating_sub(24);
    url.get(start..).unwrap_or(url)
}

fn compact_attribute(value: Option<AttributeValue>, unit: &str) -> String {
    match value {
        Some(number @ AttributeValue::Number(_)) => format!("{number} {unit}"),
        Some(text) => text.to_string(),
        None => "-".to_owned(),
    }
}

fn detail_value(value: Option<String>) -> String {
    value
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| MISSING_VALUE.to_owned())
}

fn detail_lines(view_data: &ViewData, device: &Device) -> Vec<Line<'static>> {
    let label = Style::default().add_modifier(Modifier::BOLD);
    let rows = [
        ("Name", Some(device.name().to_owned())),
        (
            "Product line",
            Some(format!(
                "{} ({})",
                device.product_line.name, device.product_line.id
            )),
        ),
        ("ID", Some(device.id.to_string())),
        ("Abbreviation", Some(device.product.abbrev.clone())),
        ("Short names", Some(device.short_names_label())),
        ("Max. power", device.max_power().map(|value| value.to_string())),
        ("Speed", device.speed_mbps().map(|value| value.to_string())),
        (
            "Number of ports",
            device.port_count().map(|ports| ports.to_string()),
        ),
        (
            "Image",
            view_data
                .options
                .images
                .url(device, ImageKind::Default, ImageSize::Large),
        ),
    ];

    let mut lines: Vec<Line<'static>> = rows
        .into_iter()
        .map(|(name, value)| {
            Line::from(vec![
                Span::styled(format!("{name}: "), label),
                Span::raw(detail_value(value)),
            ])
        })
        .collect();

    lines.push(Line::from(""));
    if view_data.detail.show_json {
        lines.push(Line::from(Span::styled("JSON (s to hide)", label)));
        let json = serde_json::to_string_pretty(device)
            .unwrap_or_else(|error| format!("cannot render device JSON: {error}"));
        lines.extend(json.lines().map(|line| Line::from(line.to_owned())));
    } else {
        lines.push(Line::from(Span::styled(
            "s show JSON | esc back",
            Style::default().fg(Color::DarkGray),
        )));
    }
    lines
}

fn render_detail(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    view_data: &ViewData,
    device: &Device,
) {
    let body = Paragraph::new(detail_lines(view_data, device))
        .wrap(Wrap { trim: false })
        .scroll((view_data.detail.scroll, 0))
        .block(
            Block::default()
                .title(device.name().to_owned())
                .borders(Borders::ALL),
        );
    frame.render_widget(body, area);
}

fn render_suggestions(
    frame: &mut ratatui::Frame<'_>,
    layout: ScreenLayout,
    state: &AppState,
    view_data: &ViewData,
    catalog: &Catalog,
) {
    let suggestions = live_suggestions(catalog, state, view_data);
    let Some(area) = suggestion_panel_area(layout, frame.area(), suggestions.slot_count()) else {
        return;
    };
    let shown = usize::from(area.height.saturating_sub(2));
    let highlight_style = Style::default()
        .add_modifier(Modifier::BOLD)
        .add_modifier(Modifier::UNDERLINED);

    let lines: Vec<Line<'_>> = (view_data.suggestion_scroll..suggestions.slot_count())
        .take(shown)
        .map(|slot| {
            let selected = view_data.suggestions.highlighted() == Some(slot);
            let mut line = match suggestions.items.get(slot) {
                Some(item) => {
                    let mut spans: Vec<Span<'_>> = item
                        .highlighted_name
                        .segments()
                        .iter()
                        .map(|segment| {
                            if segment.matched {
                                Span::styled(segment.text.clone(), highlight_style)
                            } else {
                                Span::raw(segment.text.clone())
                            }
                        })
                        .collect();
                    spans.push(Span::styled(
                        format!("  {}", item.device.category()),
                        Style::default().fg(Color::DarkGray),
                    ));
                    Line::from(spans)
                }
                None => Line::from(Span::styled(
                    format!("Load more results ({})", suggestions.remaining_count),
                    Style::default().fg(Color::Cyan),
                )),
            };
            if selected {
                line = line.style(Style::default().bg(Color::DarkGray));
            }
            line
        })
        .collect();

    frame.render_widget(Clear, area);
    let panel = Paragraph::new(lines).block(
        Block::default()
            .title(format!("{} matches", suggestions.total_matches))
            .borders(Borders::ALL),
    );
    frame.render_widget(panel, area);
}

fn filter_panel_lines(state: &AppState, view_data: &ViewData) -> Vec<Line<'static>> {
    let categories = categories(view_data);
    let mut lines: Vec<Line<'static>> = categories
        .iter()
        .enumerate()
        .map(|(index, name)| {
            let mark = if state.view.selected_categories.contains(name) {
                "[x]"
            } else {
                "[ ]"
            };
            let line = Line::from(format!("{mark} {name}"));
            if index == view_data.filter_panel.cursor() {
                line.style(Style::default().fg(Color::Black).bg(Color::Cyan))
            } else {
                line
            }
        })
        .collect();
    lines.push(Line::from(""));
    let reset_hint = if state.filter_active() {
        "x reset"
    } else {
        "x reset (no filter)"
    };
    lines.push(Line::from(format!(
        "space toggle | {reset_hint} | esc close"
    )));
    lines
}

fn status_text(state: &AppState, view_data: &ViewData) -> String {
    let mut parts = Vec::new();
    if let (LoadState::Ready, Some(catalog)) = (&view_data.load, view_data.catalog.as_deref()) {
        parts.push(filtered_view(catalog, state).stats_label());
    }
    parts.push(state.location().to_string());
    match &state.status_line {
        Some(status) => parts.push(status.clone()),
        None => parts.push(default_hints(state, view_data).to_owned()),
    }
    parts.join(" | ")
}

fn default_hints(state: &AppState, view_data: &ViewData) -> &'static str {
    if view_data.focus == Focus::Search {
        return "type to search | up/down pick | enter apply | esc close | tab leave";
    }
    match state.route() {
        Route::Devices => "/ search | j/k move | enter open | p lines | v view | ? help | q quit",
        Route::Device(_) | Route::NotFound(_) => "esc back | s json | ? help | q quit",
    }
}

fn help_overlay_text() -> &'static str {
    "global: ctrl+q quit | q quit | ? help | r reload\n\
list: j/k up/down | pgup/pgdn | g/G home/end | enter open | v table/grid | p product lines | x reset lines\n\
grid: h/l left/right | j/k row down/up\n\
search: / focus | type to suggest | up/down pick | enter apply | esc close | tab leave | ctrl+u clear\n\
product lines: j/k move | space toggle | x reset | esc close\n\
detail: esc back | s show/hide JSON | j/k scroll\n\
mouse: wheel scroll | click select | click again open | hover suggestions"
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
