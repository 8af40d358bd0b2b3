// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use tracing::debug;

use crate::filter::CategorySelection;
use crate::ids::DeviceId;
use crate::location::{History, Location, Route, decode_filter_query, encode_filter_query};
use crate::model::ViewMode;

/// Committed view state. Draft keystrokes live in the suggestion
/// controller, not here.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ViewState {
    pub search_term: String,
    pub selected_categories: CategorySelection,
    pub view_mode: ViewMode,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    pub view: ViewState,
    pub status_line: Option<String>,
    history: History,
}

impl Default for AppState {
    fn default() -> Self {
        Self::from_location(Location::root(), ViewMode::default())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    ToggleCategory { name: String, selected: bool },
    ResetCategories,
    CommitSearch(String),
    SetViewMode(ViewMode),
    ToggleViewMode,
    OpenDevice(DeviceId),
    Back,
    SetStatus(String),
    ClearStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    CategoriesChanged,
    SearchCommitted(String),
    ViewModeChanged(ViewMode),
    LocationReplaced(Location),
    RouteChanged(Route),
    StatusUpdated(String),
    StatusCleared,
}

impl AppState {
    /// Seed committed state from a location. Unknown or malformed query
    /// values fall back to defaults.
    pub fn from_location(location: Location, view_mode: ViewMode) -> Self {
        let (search_term, selected_categories) = decode_filter_query(location.query());
        Self {
            view: ViewState {
                search_term,
                selected_categories,
                view_mode,
            },
            status_line: None,
            history: History::new(location),
        }
    }

    pub fn location(&self) -> &Location {
        self.history.current()
    }

    pub fn route(&self) -> Route {
        self.history.current().route()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn filter_active(&self) -> bool {
        !self.view.selected_categories.is_empty()
    }

    pub fn dispatch(&mut self, command: AppCommand) -> Vec<AppEvent> {
        match command {
            AppCommand::ToggleCategory { name, selected } => {
                let changed = if selected {
                    self.view.selected_categories.insert(&name)
                } else {
                    self.view.selected_categories.remove(&name)
                };
                if !changed {
                    return Vec::new();
                }
                let mut events = vec![AppEvent::CategoriesChanged];
                events.extend(self.sync_location());
                events
            }
            AppCommand::ResetCategories => {
                if self.view.selected_categories.is_empty() {
                    return Vec::new();
                }
                self.view.selected_categories.clear();
                let mut events = vec![AppEvent::CategoriesChanged];
                events.extend(self.sync_location());
                events
            }
            AppCommand::CommitSearch(term) => {
                self.view.search_term = term.clone();
                let mut events = vec![AppEvent::SearchCommitted(term)];
                events.extend(self.sync_location());
                events
            }
            AppCommand::SetViewMode(mode) => {
                if self.view.view_mode == mode {
                    return Vec::new();
                }
                self.view.view_mode = mode;
                vec![AppEvent::ViewModeChanged(mode)]
            }
            AppCommand::ToggleViewMode => {
                let mode = self.view.view_mode.toggled();
                self.view.view_mode = mode;
                vec![
                    AppEvent::ViewModeChanged(mode),
                    self.set_status(mode.label()),
                ]
            }
            AppCommand::OpenDevice(id) => {
                let location = Location::device(&id);
                if self.history.current() == &location {
                    return Vec::new();
                }
                self.history.push(location);
                vec![AppEvent::RouteChanged(self.route())]
            }
            AppCommand::Back => self.back(),
            AppCommand::SetStatus(message) => vec![self.set_status(&message)],
            AppCommand::ClearStatus => {
                self.status_line = None;
                vec![AppEvent::StatusCleared]
            }
        }
    }

    fn back(&mut self) -> Vec<AppEvent> {
        if self.history.back() {
            // The popped-to entry may predate a commit made on another route.
            let mut events = vec![AppEvent::RouteChanged(self.route())];
            events.extend(self.sync_location());
            return events;
        }
        if self.route() == Route::Devices {
            return Vec::new();
        }
        let query = encode_filter_query(&self.view.search_term, &self.view.selected_categories);
        self.history.replace(Location::root().with_query(query));
        vec![AppEvent::RouteChanged(self.route())]
    }

    /// Mirror committed filters into the list location. Replaces rather
    /// than pushes.
    fn sync_location(&mut self) -> Option<AppEvent> {
        if self.route() != Route::Devices {
            return None;
        }
        let query = encode_filter_query(&self.view.search_term, &self.view.selected_categories);
        let next = self.history.current().with_query(query);
        if &next == self.history.current() {
            return None;
        }
        debug!(location = %next, "replaced location");
        self.history.replace(next.clone());
        Some(AppEvent::LocationReplaced(next))
    }

    fn set_status(&mut self, message: &str) -> AppEvent {
        self.status_line = Some(message.to_owned());
        AppEvent::StatusUpdated(message.to_owned())
    }
}
