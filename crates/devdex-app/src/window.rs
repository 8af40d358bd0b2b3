// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::ops::RangeInclusive;

pub const DEFAULT_OVERSCAN: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VirtualItem {
    pub index: usize,
    pub start: u32,
    pub size: u32,
}

impl VirtualItem {
    pub fn end(&self) -> u32 {
        self.start.saturating_add(self.size)
    }
}

/// The slice of a long list worth constructing for the current viewport.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VirtualWindow {
    pub total_extent: u32,
    pub visible_range: Option<RangeInclusive<usize>>,
    pub render_range: Option<RangeInclusive<usize>>,
    pub items: Vec<VirtualItem>,
}

impl VirtualWindow {
    pub fn item(&self, index: usize) -> Option<&VirtualItem> {
        self.items.iter().find(|item| item.index == index)
    }
}

/// Windowing over `count` items. Extents are measured-or-estimated; the
/// estimate is used until [`Virtualizer::measure`] reports a real size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Virtualizer {
    estimate: u32,
    overscan: usize,
    measured: Vec<Option<u32>>,
    scroll_offset: u32,
    viewport: u32,
}

impl Virtualizer {
    pub fn new(count: usize, estimate: u32, overscan: usize) -> Self {
        Self {
            estimate: estimate.max(1),
            overscan,
            measured: vec![None; count],
            scroll_offset: 0,
            viewport: 0,
        }
    }

    pub fn count(&self) -> usize {
        self.measured.len()
    }

    pub fn estimate(&self) -> u32 {
        self.estimate
    }

    pub fn overscan(&self) -> usize {
        self.overscan
    }

    pub fn scroll_offset(&self) -> u32 {
        self.scroll_offset
    }

    pub fn viewport(&self) -> u32 {
        self.viewport
    }

    /// Measurements past the new count are dropped.
    pub fn set_count(&mut self, count: usize) {
        if count == self.measured.len() {
            return;
        }
        self.measured.resize(count, None);
        self.clamp_scroll();
    }

    pub fn set_estimate(&mut self, estimate: u32) {
        self.estimate = estimate.max(1);
        self.clamp_scroll();
    }

    pub fn set_viewport(&mut self, viewport: u32) {
        self.viewport = viewport;
        self.clamp_scroll();
    }

    /// Returns `true` when the recorded extent changed.
    pub fn measure(&mut self, index: usize, size: u32) -> bool {
        let Some(slot) = self.measured.get_mut(index) else {
            return false;
        };
        if *slot == Some(size) {
            return false;
        }
        *slot = Some(size);
        self.clamp_scroll();
        true
    }

    pub fn size_of(&self, index: usize) -> u32 {
        self.measured
            .get(index)
            .copied()
            .flatten()
            .unwrap_or(self.estimate)
    }

    /// Prefix sum of extents before `index`.
    pub fn offset_of(&self, index: usize) -> u32 {
        (0..index.min(self.count()))
            .map(|i| self.size_of(i))
            .fold(0u32, u32::saturating_add)
    }

    pub fn total_extent(&self) -> u32 {
        self.offset_of(self.count())
    }

    pub fn max_scroll(&self) -> u32 {
        self.total_extent().saturating_sub(self.viewport)
    }

    pub fn scroll_to(&mut self, offset: u32) {
        self.scroll_offset = offset.min(self.max_scroll());
    }

    pub fn scroll_by(&mut self, delta: i64) {
        let target = (i64::from(self.scroll_offset) + delta).max(0);
        self.scroll_to(u32::try_from(target).unwrap_or(u32::MAX));
    }

    /// Minimal scroll so the item is fully inside the viewport.
    pub fn scroll_into_view(&mut self, index: usize) {
        if index >= self.count() {
            return;
        }
        let start = self.offset_of(index);
        let end = start.saturating_add(self.size_of(index));
        if start < self.scroll_offset {
            self.scroll_to(start);
        } else if end > self.scroll_offset.saturating_add(self.viewport) {
            self.scroll_to(end.saturating_sub(self.viewport));
        }
    }

    /// Index of the item covering `offset`, clamped to the last item.
    pub fn index_at(&self, offset: u32) -> Option<usize> {
        if self.count() == 0 {
            return None;
        }
        let mut cursor = 0u32;
        for index in 0..self.count() {
            cursor = cursor.saturating_add(self.size_of(index));
            if cursor > offset {
                return Some(index);
            }
        }
        Some(self.count() - 1)
    }

    pub fn visible_range(&self) -> Option<RangeInclusive<usize>> {
        if self.viewport == 0 {
            return None;
        }
        let first = self.index_at(self.scroll_offset)?;
        let last_offset = self
            .scroll_offset
            .saturating_add(self.viewport)
            .saturating_sub(1);
        let last = self.index_at(last_offset)?;
        Some(first..=last)
    }

    pub fn render_range(&self) -> Option<RangeInclusive<usize>> {
        let visible = self.visible_range()?;
        let start = visible.start().saturating_sub(self.overscan);
        let end = visible
            .end()
            .saturating_add(self.overscan)
            .min(self.count() - 1);
        Some(start..=end)
    }

    pub fn window(&self) -> VirtualWindow {
        let render_range = self.render_range();
        let items = match &render_range {
            Some(range) => {
                let mut start = self.offset_of(*range.start());
                range
                    .clone()
                    .map(|index| {
                        let size = self.size_of(index);
                        let item = VirtualItem { index, start, size };
                        start = start.saturating_add(size);
                        item
                    })
                    .collect()
            }
            None => Vec::new(),
        };
        VirtualWindow {
            total_extent: self.total_extent(),
            visible_range: self.visible_range(),
            render_range,
            items,
        }
    }

    /// Whether the item lies within `margin` units of the viewport. Used to
    /// gate work that only matters for items about to be seen.
    pub fn within_margin(&self, index: usize, margin: u32) -> bool {
        if index >= self.count() || self.viewport == 0 {
            return false;
        }
        let start = self.offset_of(index);
        let end = start.saturating_add(self.size_of(index));
        let top = self.scroll_offset.saturating_sub(margin);
        let bottom = self
            .scroll_offset
            .saturating_add(self.viewport)
            .saturating_add(margin);
        end > top && start < bottom
    }

    fn clamp_scroll(&mut self) {
        self.scroll_offset = self.scroll_offset.min(self.max_scroll());
    }
}

#[cfg(test)]
mod tests {
    use super::Virtualizer;

    fn sized(count: usize, estimate: u32, viewport: u32, overscan: usize) -> Virtualizer {
        let mut virtualizer = Virtualizer::new(count, estimate, overscan);
        virtualizer.set_viewport(viewport);
        virtualizer
    }

    #[test]
    fn initial_window_adds_overscan_clamped_at_zero() {
        let virtualizer = sized(1000, 40, 400, 5);
        assert_eq!(virtualizer.visible_range(), Some(0..=9));
        assert_eq!(virtualizer.render_range(), Some(0..=14));

        let window = virtualizer.window();
        assert_eq!(window.total_extent, 40_000);
        assert_eq!(window.items.len(), 15);
        assert_eq!(window.items[3].start, 120);
    }

    #[test]
    fn scrolling_moves_the_window_and_clamps_at_the_end() {
        let mut virtualizer = sized(1000, 40, 400, 5);
        virtualizer.scroll_to(4000);
        assert_eq!(virtualizer.visible_range(), Some(100..=109));
        assert_eq!(virtualizer.render_range(), Some(95..=114));

        virtualizer.scroll_by(1_000_000);
        assert_eq!(virtualizer.scroll_offset(), 40_000 - 400);
        assert_eq!(virtualizer.render_range(), Some(985..=999));

        virtualizer.scroll_by(-1_000_000);
        assert_eq!(virtualizer.scroll_offset(), 0);
    }

    #[test]
    fn empty_list_and_zero_viewport_render_nothing() {
        let empty = sized(0, 40, 400, 5);
        assert_eq!(empty.visible_range(), None);
        assert!(empty.window().items.is_empty());
        assert_eq!(empty.window().total_extent, 0);

        let hidden = sized(10, 40, 0, 5);
        assert!(hidden.window().items.is_empty());
    }

    #[test]
    fn measurements_replace_the_estimate() {
        let mut virtualizer = sized(10, 40, 100, 0);
        assert!(virtualizer.measure(0, 100));
        assert!(!virtualizer.measure(0, 100));
        assert!(!virtualizer.measure(99, 1));
        assert_eq!(virtualizer.total_extent(), 100 + 9 * 40);
        assert_eq!(virtualizer.visible_range(), Some(0..=0));
        assert_eq!(virtualizer.offset_of(2), 140);
    }

    #[test]
    fn shrinking_count_drops_measurements_and_clamps_scroll() {
        let mut virtualizer = sized(100, 1, 10, 2);
        virtualizer.measure(50, 3);
        virtualizer.scroll_to(80);
        virtualizer.set_count(20);
        assert_eq!(virtualizer.scroll_offset(), 10);
        virtualizer.set_count(100);
        assert_eq!(virtualizer.size_of(50), 1);
    }

    #[test]
    fn scroll_into_view_is_minimal() {
        let mut virtualizer = sized(100, 1, 10, 0);
        virtualizer.scroll_into_view(5);
        assert_eq!(virtualizer.scroll_offset(), 0);

        virtualizer.scroll_into_view(25);
        assert_eq!(virtualizer.scroll_offset(), 16);
        assert_eq!(virtualizer.visible_range(), Some(16..=25));

        virtualizer.scroll_into_view(3);
        assert_eq!(virtualizer.scroll_offset(), 3);
    }

    #[test]
    fn margin_gate_includes_neighbours_only() {
        let mut virtualizer = sized(100, 5, 10, 0);
        virtualizer.scroll_to(50);
        assert!(virtualizer.within_margin(10, 0));
        assert!(virtualizer.within_margin(11, 0));
        assert!(!virtualizer.within_margin(12, 0));
        assert!(virtualizer.within_margin(12, 5));
        assert!(virtualizer.within_margin(9, 5));
        assert!(!virtualizer.within_margin(8, 5));
        assert!(!virtualizer.within_margin(500, 5));
    }
}
