// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use regex::RegexBuilder;

use crate::filter::name_contains;
use crate::model::Device;

pub const DEFAULT_SUGGESTION_LIMIT: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightSegment {
    pub text: String,
    pub matched: bool,
}

/// A product name split into matched and unmatched runs. Joining the runs
/// always reproduces the source name.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HighlightedName {
    segments: Vec<HighlightSegment>,
}

impl HighlightedName {
    fn unmarked(name: &str) -> Self {
        let mut out = Self::default();
        out.push(name, false);
        out
    }

    fn push(&mut self, text: &str, matched: bool) {
        if text.is_empty() {
            return;
        }
        self.segments.push(HighlightSegment {
            text: text.to_owned(),
            matched,
        });
    }

    pub fn segments(&self) -> &[HighlightSegment] {
        &self.segments
    }

    pub fn has_match(&self) -> bool {
        self.segments.iter().any(|segment| segment.matched)
    }

    pub fn plain(&self) -> String {
        self.segments
            .iter()
            .map(|segment| segment.text.as_str())
            .collect()
    }

    pub fn marked(&self, open: &str, close: &str) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            if segment.matched {
                out.push_str(open);
                out.push_str(&segment.text);
                out.push_str(close);
            } else {
                out.push_str(&segment.text);
            }
        }
        out
    }
}

/// Wrap every case-insensitive occurrence of `draft` in `name`. The draft is
/// matched literally; regex metacharacters carry no meaning.
pub fn highlight(name: &str, draft: &str) -> HighlightedName {
    if draft.trim().is_empty() {
        return HighlightedName::unmarked(name);
    }
    let Ok(pattern) = RegexBuilder::new(&regex::escape(draft))
        .case_insensitive(true)
        .build()
    else {
        return HighlightedName::unmarked(name);
    };

    let mut out = HighlightedName::default();
    let mut cursor = 0;
    for found in pattern.find_iter(name) {
        out.push(&name[cursor..found.start()], false);
        out.push(found.as_str(), true);
        cursor = found.end();
    }
    out.push(&name[cursor..], false);
    out
}

#[derive(Debug, Clone, PartialEq)]
pub struct HighlightedDevice<'a> {
    pub device: &'a Device,
    pub highlighted_name: HighlightedName,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Suggestions<'a> {
    pub items: Vec<HighlightedDevice<'a>>,
    pub remaining_count: usize,
    pub total_matches: usize,
}

impl Suggestions<'_> {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Navigable slots: every suggestion plus the "load more" entry when
    /// matches are hidden.
    pub fn slot_count(&self) -> usize {
        self.items.len() + usize::from(self.remaining_count > 0)
    }

    pub fn load_more_slot(&self) -> Option<usize> {
        (self.remaining_count > 0).then_some(self.items.len())
    }
}

/// Live suggestions for the in-progress draft, in collection order.
pub fn suggest<'a>(
    devices: &[&'a Device],
    draft: &str,
    cap: usize,
    expanded: bool,
) -> Suggestions<'a> {
    if draft.trim().is_empty() {
        return Suggestions::default();
    }

    let needle = draft.to_lowercase();
    let matches: Vec<&'a Device> = devices
        .iter()
        .copied()
        .filter(|device| name_contains(device.name(), &needle))
        .collect();
    let total_matches = matches.len();
    let limit = if expanded { total_matches } else { cap };
    let remaining_count = if expanded {
        0
    } else {
        total_matches.saturating_sub(cap)
    };

    let items = matches
        .into_iter()
        .take(limit)
        .map(|device| HighlightedDevice {
            device,
            highlighted_name: highlight(device.name(), draft),
        })
        .collect();

    Suggestions {
        items,
        remaining_count,
        total_matches,
    }
}

#[cfg(test)]
mod tests {
    use super::{DEFAULT_SUGGESTION_LIMIT, highlight, suggest};
    use crate::fixtures::{abc_catalog, device, switch_catalog};

    #[test]
    fn cap_and_remaining_count() {
        let catalog = switch_catalog(23);
        let all = catalog.device_refs();

        let collapsed = suggest(&all, "switch", DEFAULT_SUGGESTION_LIMIT, false);
        assert_eq!(collapsed.items.len(), 10);
        assert_eq!(collapsed.remaining_count, 13);
        assert_eq!(collapsed.total_matches, 23);
        assert_eq!(collapsed.slot_count(), 11);
        assert_eq!(collapsed.load_more_slot(), Some(10));

        let expanded = suggest(&all, "switch", DEFAULT_SUGGESTION_LIMIT, true);
        assert_eq!(expanded.items.len(), 23);
        assert_eq!(expanded.remaining_count, 0);
        assert_eq!(expanded.load_more_slot(), None);
    }

    #[test]
    fn fewer_matches_than_cap_leaves_nothing_remaining() {
        let catalog = switch_catalog(4);
        let all = catalog.device_refs();
        let suggestions = suggest(&all, "switch", 10, false);
        assert_eq!(suggestions.items.len(), 4);
        assert_eq!(suggestions.remaining_count, 0);
        assert_eq!(suggestions.slot_count(), 4);
    }

    #[test]
    fn preserves_collection_order() {
        let catalog = abc_catalog();
        let all = catalog.device_refs();
        let suggestions = suggest(&all, "a", 10, false);
        let ids: Vec<&str> = suggestions
            .items
            .iter()
            .map(|item| item.device.id.as_str())
            .collect();
        assert_eq!(ids, vec!["d1", "d2", "d3"]);
    }

    #[test]
    fn blank_draft_suggests_nothing() {
        let catalog = abc_catalog();
        let all = catalog.device_refs();
        assert!(suggest(&all, "", 10, false).is_empty());
        assert!(suggest(&all, "  ", 10, true).is_empty());
    }

    #[test]
    fn highlight_wraps_every_occurrence_case_insensitively() {
        let name = highlight("Banana Band", "AN");
        assert_eq!(name.marked("<", ">"), "B<an><an>a B<an>d");
        assert_eq!(name.plain(), "Banana Band");
        assert!(name.has_match());
    }

    #[test]
    fn highlight_escapes_metacharacters() {
        let name = highlight("Switch (PoE+) 8", "(poe+)");
        assert_eq!(name.marked("[", "]"), "Switch [(PoE+)] 8");

        let dotted = highlight("U6.Pro", ".");
        assert_eq!(dotted.marked("[", "]"), "U6[.]Pro");
    }

    #[test]
    fn highlight_with_empty_draft_is_unmodified() {
        let name = highlight("Dream Machine", "");
        assert_eq!(name.marked("<", ">"), "Dream Machine");
        assert!(!name.has_match());
    }

    #[test]
    fn stripping_markers_round_trips() {
        for (source, draft) in [
            ("Access Point AC Pro", "ac"),
            ("[bracketed] name", "["),
            ("aaaa", "aa"),
            ("Ünïcode Gateway", "gate"),
            ("no match here", "xyz"),
        ] {
            let name = highlight(source, draft);
            let joined: String = name.segments().iter().map(|s| s.text.as_str()).collect();
            assert_eq!(joined, source);
        }
    }

    #[test]
    fn suggestion_names_are_highlighted_against_draft() {
        let catalog = crate::Catalog {
            devices: vec![device("1", "UniFi", "Cloud Key")],
            version: String::new(),
        };
        let all = catalog.device_refs();
        let suggestions = suggest(&all, "key", 10, false);
        assert_eq!(
            suggestions.items[0].highlighted_name.marked("*", "*"),
            "Cloud *Key*"
        );
    }
}
