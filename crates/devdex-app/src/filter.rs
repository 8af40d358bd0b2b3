// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::collections::BTreeSet;

use crate::model::{Catalog, Device};

/// Selected product-line names in the order they were chosen. An empty
/// selection means "no filter".
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CategorySelection {
    names: Vec<String>,
}

impl CategorySelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|selected| selected == name)
    }

    /// Returns `false` when the name was already selected.
    pub fn insert(&mut self, name: &str) -> bool {
        if self.contains(name) {
            return false;
        }
        self.names.push(name.to_owned());
        true
    }

    /// Returns `false` when the name was not selected.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.names.len();
        self.names.retain(|selected| selected != name);
        self.names.len() != before
    }

    pub fn clear(&mut self) {
        self.names.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.names
    }
}

impl<S: AsRef<str>> FromIterator<S> for CategorySelection {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut selection = Self::new();
        for name in iter {
            selection.insert(name.as_ref());
        }
        selection
    }
}

/// Distinct product-line names, sorted.
pub fn derive_categories<'a>(devices: impl IntoIterator<Item = &'a Device>) -> Vec<String> {
    devices
        .into_iter()
        .map(|device| device.category().to_owned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

pub fn apply_category_filter<'a>(
    devices: &[&'a Device],
    selected: &CategorySelection,
) -> Vec<&'a Device> {
    if selected.is_empty() {
        return devices.to_vec();
    }
    devices
        .iter()
        .copied()
        .filter(|device| selected.contains(device.category()))
        .collect()
}

pub fn apply_search_filter<'a>(devices: &[&'a Device], term: &str) -> Vec<&'a Device> {
    if term.trim().is_empty() {
        return devices.to_vec();
    }
    let needle = term.to_lowercase();
    devices
        .iter()
        .copied()
        .filter(|device| name_contains(device.name(), &needle))
        .collect()
}

/// `needle` must already be lowercased.
pub(crate) fn name_contains(name: &str, needle: &str) -> bool {
    name.to_lowercase().contains(needle)
}

/// One consistent derivation of the list view from a catalog snapshot and
/// the committed filter state. Category filtering always runs first.
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredView<'a> {
    pub total: usize,
    pub categories: Vec<String>,
    pub category_filtered: Vec<&'a Device>,
    pub visible: Vec<&'a Device>,
    filter_active: bool,
    search_active: bool,
}

impl<'a> FilteredView<'a> {
    pub fn derive(catalog: &'a Catalog, selected: &CategorySelection, term: &str) -> Self {
        let all = catalog.device_refs();
        let category_filtered = apply_category_filter(&all, selected);
        let visible = apply_search_filter(&category_filtered, term);
        Self {
            total: all.len(),
            categories: derive_categories(catalog.devices.iter()),
            category_filtered,
            visible,
            filter_active: !selected.is_empty(),
            search_active: !term.is_empty(),
        }
    }

    pub fn stats_label(&self) -> String {
        stats_label(
            self.total,
            self.category_filtered.len(),
            self.visible.len(),
            self.search_active,
            self.filter_active,
        )
    }
}

pub fn stats_label(
    total: usize,
    category_filtered: usize,
    visible: usize,
    search_active: bool,
    filter_active: bool,
) -> String {
    match (filter_active, search_active) {
        (true, true) => format!("{visible} of {category_filtered} devices ({total} total)"),
        (true, false) => format!("{category_filtered} of {total} devices"),
        (false, true) => format!("{visible} of {total} devices"),
        (false, false) => format!("{total} devices"),
    }
}

#[cfg(test)]
mod tests {
    use super::{
        CategorySelection, FilteredView, apply_category_filter, apply_search_filter,
        derive_categories, stats_label,
    };
    use crate::fixtures::{abc_catalog, device};

    fn names(devices: &[&crate::Device]) -> Vec<String> {
        devices.iter().map(|d| d.name().to_owned()).collect()
    }

    #[test]
    fn categories_are_sorted_and_distinct() {
        let catalog = crate::Catalog {
            devices: vec![
                device("1", "UniFi Protect", "G4 Bullet"),
                device("2", "UniFi", "U6 Lite"),
                device("3", "UniFi Protect", "G5 Flex"),
                device("4", "AmpliFi", "Alien"),
            ],
            version: String::new(),
        };
        assert_eq!(
            derive_categories(catalog.devices.iter()),
            vec!["AmpliFi", "UniFi", "UniFi Protect"]
        );
        assert!(derive_categories(std::iter::empty()).is_empty());
    }

    #[test]
    fn empty_selection_is_identity() {
        let catalog = abc_catalog();
        let all = catalog.device_refs();
        assert_eq!(apply_category_filter(&all, &CategorySelection::new()), all);
    }

    #[test]
    fn category_filter_preserves_order_and_is_idempotent() {
        let catalog = abc_catalog();
        let all = catalog.device_refs();
        let selected: CategorySelection = ["B", "A"].into_iter().collect();
        let once = apply_category_filter(&all, &selected);
        assert_eq!(names(&once), vec!["Alpha", "Abacus", "Beta"]);

        let only_a: CategorySelection = ["A"].into_iter().collect();
        let once = apply_category_filter(&all, &only_a);
        let twice = apply_category_filter(&once, &only_a);
        assert_eq!(once, twice);
        assert_eq!(names(&once), vec!["Alpha", "Abacus"]);
    }

    #[test]
    fn category_filter_uses_line_name_not_id() {
        let catalog = abc_catalog();
        let all = catalog.device_refs();
        let by_id: CategorySelection = ["a"].into_iter().collect();
        assert!(apply_category_filter(&all, &by_id).is_empty());
    }

    #[test]
    fn search_is_case_insensitive_substring_on_product_name() {
        let catalog = abc_catalog();
        let all = catalog.device_refs();
        assert_eq!(names(&apply_search_filter(&all, "AB")), vec!["Abacus"]);
        assert_eq!(names(&apply_search_filter(&all, "a")), vec!["Alpha", "Abacus", "Beta"]);
        assert!(apply_search_filter(&all, "zzz").is_empty());
    }

    #[test]
    fn blank_search_term_is_identity() {
        let catalog = abc_catalog();
        let all = catalog.device_refs();
        assert_eq!(apply_search_filter(&all, ""), all);
        assert_eq!(apply_search_filter(&all, "   "), all);
    }

    #[test]
    fn multi_word_search_is_one_literal_substring() {
        let catalog = crate::Catalog {
            devices: vec![
                device("1", "UniFi", "Access Point U6 Pro"),
                device("2", "UniFi", "Pro Access Point"),
            ],
            version: String::new(),
        };
        let all = catalog.device_refs();
        assert_eq!(names(&apply_search_filter(&all, "access point u6")), vec![
            "Access Point U6 Pro"
        ]);
        assert!(apply_search_filter(&all, "pro access point u6").is_empty());
    }

    #[test]
    fn search_results_are_an_ordered_subsequence() {
        let catalog = abc_catalog();
        let all = catalog.device_refs();
        for term in ["a", "b", "ph", "E", "lph", " "] {
            let found = apply_search_filter(&all, term);
            let mut cursor = all.iter();
            for hit in &found {
                assert!(cursor.any(|candidate| candidate.id == hit.id));
                if !term.trim().is_empty() {
                    assert!(hit.name().to_lowercase().contains(&term.to_lowercase()));
                }
            }
        }
    }

    #[test]
    fn category_then_search_scenario_counts() {
        let catalog = abc_catalog();
        let selected: CategorySelection = ["A"].into_iter().collect();
        let view = FilteredView::derive(&catalog, &selected, "ab");
        assert_eq!(names(&view.visible), vec!["Abacus"]);
        assert_eq!(view.category_filtered.len(), 2);
        assert_eq!(view.stats_label(), "1 of 2 devices (3 total)");
        assert_eq!(view.categories, vec!["A", "B"]);
    }

    #[test]
    fn stats_label_variants() {
        assert_eq!(stats_label(10, 10, 10, false, false), "10 devices");
        assert_eq!(stats_label(10, 4, 4, false, true), "4 of 10 devices");
        assert_eq!(stats_label(10, 10, 3, true, false), "3 of 10 devices");
        assert_eq!(stats_label(10, 4, 1, true, true), "1 of 4 devices (10 total)");
    }

    #[test]
    fn selection_keeps_first_choice_order_without_duplicates() {
        let mut selection = CategorySelection::new();
        assert!(selection.insert("B"));
        assert!(selection.insert("A"));
        assert!(!selection.insert("B"));
        assert_eq!(selection.as_slice(), ["B".to_owned(), "A".to_owned()]);
        assert!(selection.remove("B"));
        assert!(!selection.remove("B"));
        assert_eq!(selection.len(), 1);
    }
}
