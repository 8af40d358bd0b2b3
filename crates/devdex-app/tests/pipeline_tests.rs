// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use devdex_app::{
    AppCommand, AppState, FilteredView, Location, ViewMode, Virtualizer, suggest,
};
use devdex_testkit::{DeviceFaker, abc_catalog};

#[test]
fn category_then_search_through_app_state() {
    let catalog = abc_catalog();
    let mut state = AppState::default();
    state.dispatch(AppCommand::ToggleCategory {
        name: "A".to_owned(),
        selected: true,
    });
    state.dispatch(AppCommand::CommitSearch("ab".to_owned()));

    let view = FilteredView::derive(
        &catalog,
        &state.view.selected_categories,
        &state.view.search_term,
    );
    let names: Vec<_> = view.visible.iter().map(|device| device.name()).collect();
    assert_eq!(names, vec!["Abacus"]);
    assert_eq!(view.stats_label(), "1 of 2 devices (3 total)");
    assert_eq!(state.location().to_string(), "/?search=ab&productLines=A");
}

#[test]
fn suggestions_come_from_the_category_filtered_set() {
    let catalog = abc_catalog();
    let state = AppState::from_location(Location::parse("/?productLines=B"), ViewMode::Table);
    let view = FilteredView::derive(&catalog, &state.view.selected_categories, "");
    let suggestions = suggest(&view.category_filtered, "a", 10, false);
    let names: Vec<_> = suggestions
        .items
        .iter()
        .map(|item| item.device.name())
        .collect();
    assert_eq!(names, vec!["Beta"]);
}

#[test]
fn large_generated_catalog_windows_to_a_bounded_slice() {
    let catalog = DeviceFaker::new(21).catalog(2000);
    let view = FilteredView::derive(&catalog, &Default::default(), "");
    let mut virtualizer = Virtualizer::new(view.visible.len(), 1, 5);
    virtualizer.set_viewport(30);
    virtualizer.scroll_to(1000);

    let window = virtualizer.window();
    assert_eq!(window.total_extent, 2000);
    assert_eq!(window.visible_range, Some(1000..=1029));
    assert_eq!(window.items.len(), 40);
    assert!(window.items.iter().all(|item| item.index < view.visible.len()));
}

#[test]
fn every_generated_category_filters_to_its_own_devices() {
    let catalog = DeviceFaker::new(8).catalog(300);
    let categories = FilteredView::derive(&catalog, &Default::default(), "").categories;
    for category in &categories {
        let selected = [category.as_str()].into_iter().collect();
        let view = FilteredView::derive(&catalog, &selected, "");
        assert!(!view.visible.is_empty());
        assert!(view.visible.iter().all(|device| device.category() == category));
    }
}
