// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::collections::VecDeque;

use crate::suggest::Suggestions;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SuggestionState {
    pub draft_text: String,
    pub is_open: bool,
    pub highlighted: Option<usize>,
    pub expanded: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestionPhase {
    Closed,
    OpenUnselected,
    OpenSelected(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuggestionInput {
    TextChanged(String),
    ArrowDown,
    ArrowUp,
    Enter,
    Escape,
    Tab,
    Focus,
    FocusLost,
    Hover(usize),
    Click(usize),
    ClickOutside,
    Clear,
    DevicesChanged,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuggestionOutcome {
    Nothing,
    /// Commit this value as the search term.
    Commit(String),
    Expanded,
    Closed { keep_focus: bool },
}

/// Work that must run after the current state update reaches the rendered
/// list, drained once per frame by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deferred {
    RevealSuggestion(usize),
    RevealRow(usize),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DeferredQueue {
    pending: VecDeque<Deferred>,
}

impl DeferredQueue {
    pub fn push(&mut self, action: Deferred) {
        self.pending.retain(|queued| !same_target(*queued, action));
        self.pending.push_back(action);
    }

    pub fn drain(&mut self) -> Vec<Deferred> {
        self.pending.drain(..).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

fn same_target(left: Deferred, right: Deferred) -> bool {
    matches!(
        (left, right),
        (Deferred::RevealSuggestion(_), Deferred::RevealSuggestion(_))
            | (Deferred::RevealRow(_), Deferred::RevealRow(_))
    )
}

/// Roving-index state machine over the live suggestion list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SuggestionController {
    state: SuggestionState,
}

impl SuggestionController {
    pub fn new(draft_text: impl Into<String>) -> Self {
        Self {
            state: SuggestionState {
                draft_text: draft_text.into(),
                ..SuggestionState::default()
            },
        }
    }

    pub fn state(&self) -> &SuggestionState {
        &self.state
    }

    pub fn draft(&self) -> &str {
        &self.state.draft_text
    }

    pub fn is_open(&self) -> bool {
        self.state.is_open
    }

    pub fn highlighted(&self) -> Option<usize> {
        self.state.highlighted
    }

    pub fn expanded(&self) -> bool {
        self.state.expanded
    }

    pub fn phase(&self) -> SuggestionPhase {
        match (self.state.is_open, self.state.highlighted) {
            (false, _) => SuggestionPhase::Closed,
            (true, None) => SuggestionPhase::OpenUnselected,
            (true, Some(index)) => SuggestionPhase::OpenSelected(index),
        }
    }

    /// Sync the draft with an externally committed term without opening.
    pub fn set_draft(&mut self, text: &str) {
        if self.state.draft_text != text {
            self.state.draft_text = text.to_owned();
            self.state.highlighted = None;
            self.state.expanded = false;
        }
    }

    /// `suggestions` must be the list computed from the current draft and
    /// expansion flag.
    pub fn handle(
        &mut self,
        input: SuggestionInput,
        suggestions: &Suggestions<'_>,
        deferred: &mut DeferredQueue,
    ) -> SuggestionOutcome {
        match input {
            SuggestionInput::TextChanged(text) => {
                self.state.is_open = !text.trim().is_empty();
                self.state.draft_text = text;
                self.state.highlighted = None;
                self.state.expanded = false;
                SuggestionOutcome::Nothing
            }
            SuggestionInput::Enter => self.enter(suggestions),
            SuggestionInput::ArrowDown => {
                let slots = suggestions.slot_count();
                if !self.state.is_open || slots == 0 {
                    return SuggestionOutcome::Nothing;
                }
                let next = match self.state.highlighted {
                    None => 0,
                    Some(index) => (index + 1).min(slots - 1),
                };
                self.state.highlighted = Some(next);
                deferred.push(Deferred::RevealSuggestion(next));
                SuggestionOutcome::Nothing
            }
            SuggestionInput::ArrowUp => {
                if !self.state.is_open || suggestions.slot_count() == 0 {
                    return SuggestionOutcome::Nothing;
                }
                self.state.highlighted = match self.state.highlighted {
                    Some(index) if index > 0 => Some(index - 1),
                    _ => None,
                };
                if let Some(index) = self.state.highlighted {
                    deferred.push(Deferred::RevealSuggestion(index));
                }
                SuggestionOutcome::Nothing
            }
            SuggestionInput::Escape => self.close(true),
            SuggestionInput::Tab | SuggestionInput::FocusLost | SuggestionInput::ClickOutside => {
                self.close(false)
            }
            SuggestionInput::Focus => {
                if !self.state.draft_text.trim().is_empty() {
                    self.state.is_open = true;
                    self.state.highlighted = None;
                }
                SuggestionOutcome::Nothing
            }
            SuggestionInput::Hover(index) => {
                if self.state.is_open && index < suggestions.slot_count() {
                    self.state.highlighted = Some(index);
                }
                SuggestionOutcome::Nothing
            }
            SuggestionInput::Click(index) => {
                if !self.state.is_open || index >= suggestions.slot_count() {
                    return SuggestionOutcome::Nothing;
                }
                self.state.highlighted = Some(index);
                self.activate(index, suggestions)
            }
            SuggestionInput::Clear => {
                self.state = SuggestionState::default();
                SuggestionOutcome::Commit(String::new())
            }
            SuggestionInput::DevicesChanged => {
                self.state.highlighted = None;
                self.state.expanded = false;
                SuggestionOutcome::Nothing
            }
        }
    }

    fn enter(&mut self, suggestions: &Suggestions<'_>) -> SuggestionOutcome {
        match self.phase() {
            SuggestionPhase::OpenSelected(index) if index < suggestions.slot_count() => {
                self.activate(index, suggestions)
            }
            _ => self.commit(self.state.draft_text.clone()),
        }
    }

    fn activate(&mut self, index: usize, suggestions: &Suggestions<'_>) -> SuggestionOutcome {
        if suggestions.load_more_slot() == Some(index) {
            self.state.expanded = true;
            return SuggestionOutcome::Expanded;
        }
        match suggestions.items.get(index) {
            Some(item) => self.commit(item.device.name().to_owned()),
            None => SuggestionOutcome::Nothing,
        }
    }

    fn commit(&mut self, value: String) -> SuggestionOutcome {
        self.state.draft_text = value.clone();
        self.state.is_open = false;
        self.state.highlighted = None;
        self.state.expanded = false;
        SuggestionOutcome::Commit(value)
    }

    fn close(&mut self, keep_focus: bool) -> SuggestionOutcome {
        if !self.state.is_open {
            return SuggestionOutcome::Nothing;
        }
        self.state.is_open = false;
        self.state.highlighted = None;
        SuggestionOutcome::Closed { keep_focus }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowMove {
    Up,
    Down,
    PageUp,
    PageDown,
    /// Up one grid row; the top row stays put.
    GridUp,
    Home,
    End,
}

/// Cursor over the visible device rows. Never wraps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RowCursor {
    index: Option<usize>,
}

impl RowCursor {
    pub fn index(&self) -> Option<usize> {
        self.index
    }

    pub fn reset(&mut self) {
        self.index = None;
    }

    /// Keep the cursor inside a list that may have shrunk.
    pub fn clamp(&mut self, len: usize) {
        self.index = match self.index {
            _ if len == 0 => None,
            Some(index) => Some(index.min(len - 1)),
            None => None,
        };
    }

    pub fn select(&mut self, index: usize, len: usize) -> bool {
        if index >= len {
            return false;
        }
        self.index = Some(index);
        true
    }

    pub fn apply(
        &mut self,
        movement: RowMove,
        len: usize,
        page: usize,
        deferred: &mut DeferredQueue,
    ) -> Option<usize> {
        if len == 0 {
            self.index = None;
            return None;
        }
        let last = len - 1;
        let page = page.max(1);
        let next = match (movement, self.index) {
            (RowMove::Home, _) | (RowMove::Down | RowMove::PageDown, None) => 0,
            (RowMove::End, _) => last,
            (RowMove::Up | RowMove::PageUp | RowMove::GridUp, None) => 0,
            (RowMove::Down, Some(index)) => (index + 1).min(last),
            (RowMove::Up, Some(index)) => index.saturating_sub(1),
            (RowMove::PageDown, Some(index)) => index.saturating_add(page).min(last),
            (RowMove::PageUp, Some(index)) => index.saturating_sub(page),
            (RowMove::GridUp, Some(index)) => index.checked_sub(page).unwrap_or(index),
        };
        self.index = Some(next);
        deferred.push(Deferred::RevealRow(next));
        Some(next)
    }
}

/// Checkbox list over the product-line names.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterPanel {
    open: bool,
    cursor: usize,
}

impl FilterPanel {
    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn open(&mut self, len: usize) {
        self.open = true;
        self.cursor = self.cursor.min(len.saturating_sub(1));
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn move_by(&mut self, delta: isize, len: usize) {
        if len == 0 {
            self.cursor = 0;
            return;
        }
        let last = len as isize - 1;
        self.cursor = (self.cursor as isize + delta).clamp(0, last) as usize;
    }

    pub fn current<'a>(&self, categories: &'a [String]) -> Option<&'a str> {
        categories.get(self.cursor).map(String::as_str)
    }
}
