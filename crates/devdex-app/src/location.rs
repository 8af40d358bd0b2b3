// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::fmt;
use url::Url;
use url::form_urlencoded::byte_serialize;

use crate::filter::CategorySelection;
use crate::ids::DeviceId;

pub const SEARCH_PARAM: &str = "search";
pub const PRODUCT_LINES_PARAM: &str = "productLines";
const DEVICE_SEGMENT: &str = "device";
const LOCATION_BASE: &str = "http://devdex.invalid/";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Devices,
    Device(DeviceId),
    NotFound(String),
}

/// Path plus optional query, the shareable address of a view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    path: String,
    query: Option<String>,
}

impl Default for Location {
    fn default() -> Self {
        Self::root()
    }
}

impl Location {
    pub fn root() -> Self {
        Self {
            path: "/".to_owned(),
            query: None,
        }
    }

    pub fn device(id: &DeviceId) -> Self {
        let path = match Url::parse(LOCATION_BASE) {
            Ok(mut url) => {
                if let Ok(mut segments) = url.path_segments_mut() {
                    segments.clear().push(DEVICE_SEGMENT).push(id.as_str());
                }
                url.path().to_owned()
            }
            Err(_) => format!("/{DEVICE_SEGMENT}/{}", encode_component(id.as_str())),
        };
        Self { path, query: None }
    }

    /// Lenient parse: anything unusable resolves to the root list view.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Self::root();
        }
        let Ok(base) = Url::parse(LOCATION_BASE) else {
            return Self::root();
        };
        let Ok(url) = Url::options().base_url(Some(&base)).parse(trimmed) else {
            return Self::root();
        };
        Self {
            path: url.path().to_owned(),
            query: url.query().filter(|query| !query.is_empty()).map(str::to_owned),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    pub fn with_query(&self, query: Option<String>) -> Self {
        Self {
            path: self.path.clone(),
            query: query.filter(|query| !query.is_empty()),
        }
    }

    pub fn route(&self) -> Route {
        let segments: Vec<&str> = self
            .path
            .split('/')
            .filter(|segment| !segment.is_empty())
            .collect();
        match segments.as_slice() {
            [] => Route::Devices,
            [DEVICE_SEGMENT, id] => {
                let id = decode_component(id, false);
                if id.is_empty() {
                    Route::NotFound(self.path.clone())
                } else {
                    Route::Device(DeviceId::new(id))
                }
            }
            _ => Route::NotFound(self.path.clone()),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)?;
        if let Some(query) = &self.query {
            write!(f, "?{query}")?;
        }
        Ok(())
    }
}

fn encode_component(value: &str) -> String {
    byte_serialize(value.as_bytes()).collect()
}

fn decode_component(raw: &str, plus_is_space: bool) -> String {
    let raw = if plus_is_space {
        raw.to_owned()
    } else {
        raw.replace('+', "%2B")
    };
    let pair = format!("_={raw}");
    url::form_urlencoded::parse(pair.as_bytes())
        .next()
        .map(|(_, value)| value.into_owned())
        .unwrap_or_default()
}

/// Query for committed filter state. Empty values are omitted, and an
/// all-default state yields no query at all.
pub fn encode_filter_query(search: &str, categories: &CategorySelection) -> Option<String> {
    let mut parts = Vec::new();
    if !search.is_empty() {
        parts.push(format!("{SEARCH_PARAM}={}", encode_component(search)));
    }
    if !categories.is_empty() {
        let joined = categories
            .iter()
            .map(encode_component)
            .collect::<Vec<_>>()
            .join(",");
        parts.push(format!("{PRODUCT_LINES_PARAM}={joined}"));
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("&"))
    }
}

/// Inverse of [`encode_filter_query`]. Unknown keys are ignored and
/// malformed values fall back to empty.
pub fn decode_filter_query(query: Option<&str>) -> (String, CategorySelection) {
    let mut search = String::new();
    let mut categories = CategorySelection::new();
    let Some(query) = query else {
        return (search, categories);
    };

    for pair in query.split('&').filter(|pair| !pair.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        match decode_component(key, true).as_str() {
            SEARCH_PARAM => search = decode_component(value, true),
            PRODUCT_LINES_PARAM => {
                categories = value
                    .split(',')
                    .map(|raw| decode_component(raw, true))
                    .filter(|name| !name.trim().is_empty())
                    .collect();
            }
            _ => {}
        }
    }
    (search, categories)
}

/// In-process navigation stack. Filter edits replace the current entry so
/// they never add back-navigation steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct History {
    entries: Vec<Location>,
    index: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(Location::root())
    }
}

impl History {
    pub fn new(initial: Location) -> Self {
        Self {
            entries: vec![initial],
            index: 0,
        }
    }

    pub fn current(&self) -> &Location {
        &self.entries[self.index]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn push(&mut self, location: Location) {
        self.entries.truncate(self.index + 1);
        self.entries.push(location);
        self.index = self.entries.len() - 1;
    }

    pub fn replace(&mut self, location: Location) {
        self.entries[self.index] = location;
    }

    pub fn can_go_back(&self) -> bool {
        self.index > 0
    }

    pub fn back(&mut self) -> bool {
        if !self.can_go_back() {
            return false;
        }
        self.index -= 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::{History, Location, Route, decode_filter_query, encode_filter_query};
    use crate::{CategorySelection, DeviceId};

    #[test]
    fn filter_query_round_trips_in_given_order() {
        let location = Location::parse("/?search=foo&productLines=A,B");
        let (search, categories) = decode_filter_query(location.query());
        assert_eq!(search, "foo");
        assert_eq!(categories.as_slice(), ["A".to_owned(), "B".to_owned()]);

        let rebuilt = location.with_query(encode_filter_query(&search, &categories));
        assert_eq!(rebuilt.to_string(), "/?search=foo&productLines=A,B");
    }

    #[test]
    fn default_state_has_clean_location() {
        assert_eq!(encode_filter_query("", &CategorySelection::new()), None);
        let location = Location::root().with_query(None);
        assert_eq!(location.to_string(), "/");
    }

    #[test]
    fn empty_values_are_omitted() {
        let only_lines: CategorySelection = ["UniFi"].into_iter().collect();
        assert_eq!(
            encode_filter_query("", &only_lines).as_deref(),
            Some("productLines=UniFi")
        );
        assert_eq!(
            encode_filter_query("u6", &CategorySelection::new()).as_deref(),
            Some("search=u6")
        );
    }

    #[test]
    fn special_characters_survive_the_round_trip() {
        let categories: CategorySelection = ["UniFi Protect", "Lines, with comma", "a&b"]
            .into_iter()
            .collect();
        let query = encode_filter_query("pro max & co", &categories);
        let (search, decoded) = decode_filter_query(query.as_deref());
        assert_eq!(search, "pro max & co");
        assert_eq!(decoded, categories);
    }

    #[test]
    fn malformed_query_falls_back_to_defaults() {
        let (search, categories) = decode_filter_query(Some("&&=&productLines=,,&bogus"));
        assert_eq!(search, "");
        assert!(categories.is_empty());

        let (search, categories) = decode_filter_query(Some("search=%ZZ&productLines=%"));
        assert_eq!(search, "%ZZ");
        assert_eq!(categories.as_slice(), ["%".to_owned()]);
    }

    #[test]
    fn routes_resolve_from_paths() {
        assert_eq!(Location::parse("").route(), Route::Devices);
        assert_eq!(Location::parse("/?search=x").route(), Route::Devices);
        assert_eq!(
            Location::parse("/device/abc123").route(),
            Route::Device(DeviceId::from("abc123"))
        );
        assert!(matches!(
            Location::parse("/settings").route(),
            Route::NotFound(_)
        ));
    }

    #[test]
    fn device_location_encodes_id() {
        let id = DeviceId::from("odd id/+");
        let location = Location::device(&id);
        assert_eq!(location.route(), Route::Device(id));
        assert!(!location.path().contains(' '));
    }

    #[test]
    fn history_replace_does_not_grow_and_push_does() {
        let mut history = History::default();
        history.replace(Location::parse("/?search=a"));
        history.replace(Location::parse("/?search=ab"));
        assert_eq!(history.len(), 1);
        assert!(!history.can_go_back());

        history.push(Location::device(&DeviceId::from("x")));
        assert_eq!(history.len(), 2);
        assert!(history.back());
        assert_eq!(history.current().to_string(), "/?search=ab");
        assert!(!history.back());
    }
}
