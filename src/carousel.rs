//! Wrap-around paging over the catalog entries other than the open one.

use crate::catalog::CatalogEntry;

/// How many entries a carousel page shows for a given viewport width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSizePolicy {
    pub narrow: usize,
    pub wide: usize,
    /// Widths at or above this use `wide`.
    pub width_threshold: u32,
}

impl PageSizePolicy {
    pub fn page_size(&self, viewport_width: u32) -> usize {
        if viewport_width >= self.width_threshold {
            self.wide
        } else {
            self.narrow
        }
    }
}

impl Default for PageSizePolicy {
    fn default() -> Self {
        Self {
            narrow: 3,
            wide: 5,
            width_threshold: 768,
        }
    }
}

/// A sliding window of `page_size` entries that wraps at both ends.
///
/// The largest offset is `max(len - page_size, 0)`: advancing past it
/// wraps to 0, retreating below 0 wraps to it. When there are fewer entries
/// than a page, the offset stays at 0 and the window shows everything.
#[derive(Debug, Clone)]
pub struct Carousel {
    entries: Vec<CatalogEntry>,
    offset: usize,
    page_size: usize,
}

impl Carousel {
    /// Builds a carousel over `catalog` minus the entry whose file is `open_file`.
    pub fn new(catalog: &[CatalogEntry], open_file: Option<&str>, page_size: usize) -> Self {
        let entries = catalog
            .iter()
            .filter(|entry| open_file != Some(entry.file.as_str()))
            .cloned()
            .collect();
        Self {
            entries,
            offset: 0,
            page_size,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    fn max_offset(&self) -> usize {
        self.entries.len().saturating_sub(self.page_size)
    }

    /// Changes the page size, e.g. after a viewport resize, keeping the
    /// offset in range.
    pub fn set_page_size(&mut self, page_size: usize) {
        self.page_size = page_size;
        self.offset = self.offset.min(self.max_offset());
    }

    pub fn advance(&mut self) {
        self.offset = if self.offset < self.max_offset() {
            self.offset + 1
        } else {
            0
        };
    }

    pub fn retreat(&mut self) {
        self.offset = if self.offset > 0 {
            self.offset - 1
        } else {
            self.max_offset()
        };
    }

    /// Entries `[offset, offset + page_size)`, clipped to what exists.
    pub fn visible_window(&self) -> &[CatalogEntry] {
        let start = self.offset.min(self.entries.len());
        let end = (start + self.page_size).min(self.entries.len());
        &self.entries[start..end]
    }

    /// Returns the entry at `index` within the visible window.
    pub fn select(&self, index: usize) -> Option<&CatalogEntry> {
        self.visible_window().get(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn catalog(n: usize) -> Vec<CatalogEntry> {
        (0..n)
            .map(|i| CatalogEntry {
                id: i as u64,
                title: format!("image {i}"),
                file: format!("https://example.test/{i}.svg"),
                tags: Vec::new(),
                description: String::new(),
            })
            .collect()
    }

    fn ids(window: &[CatalogEntry]) -> Vec<u64> {
        window.iter().map(|e| e.id).collect()
    }

    #[test]
    fn open_entry_is_excluded() {
        let entries = catalog(4);
        let carousel = Carousel::new(&entries, Some("https://example.test/2.svg"), 5);
        assert_eq!(ids(carousel.entries()), vec![0, 1, 3]);
    }

    #[test]
    fn retreat_from_zero_wraps_to_last_page() {
        let mut carousel = Carousel::new(&catalog(7), None, 5);
        carousel.retreat();
        assert_eq!(carousel.offset(), 2);
        assert_eq!(ids(carousel.visible_window()), vec![2, 3, 4, 5, 6]);
    }

    #[test]
    fn advance_wraps_after_last_page() {
        let mut carousel = Carousel::new(&catalog(7), None, 5);
        carousel.retreat();

        let mut offsets = Vec::new();
        for _ in 0..3 {
            carousel.advance();
            offsets.push(carousel.offset());
        }
        assert_eq!(offsets, vec![0, 1, 2]);
    }

    #[test]
    fn short_catalog_never_goes_negative() {
        let mut carousel = Carousel::new(&catalog(2), None, 5);
        carousel.retreat();
        assert_eq!(carousel.offset(), 0);
        carousel.advance();
        assert_eq!(carousel.offset(), 0);
        assert_eq!(ids(carousel.visible_window()), vec![0, 1]);
    }

    #[test]
    fn empty_catalog_has_empty_window() {
        let mut carousel = Carousel::new(&[], None, 3);
        carousel.advance();
        carousel.retreat();
        assert!(carousel.visible_window().is_empty());
        assert!(carousel.select(0).is_none());
    }

    #[test]
    fn shrinking_page_keeps_offset_and_growing_clamps_it() {
        let mut carousel = Carousel::new(&catalog(7), None, 3);
        carousel.retreat();
        assert_eq!(carousel.offset(), 4);
        carousel.set_page_size(5);
        assert_eq!(carousel.offset(), 2);
        assert_eq!(carousel.visible_window().len(), 5);
    }

    #[test]
    fn page_size_follows_viewport_width() {
        let policy = PageSizePolicy::default();
        assert_eq!(policy.page_size(500), 3);
        assert_eq!(policy.page_size(768), 5);
        assert_eq!(policy.page_size(1920), 5);
    }

    #[test]
    fn select_indexes_into_window() {
        let mut carousel = Carousel::new(&catalog(7), None, 3);
        carousel.advance();
        assert_eq!(carousel.select(0).map(|e| e.id), Some(1));
        assert!(carousel.select(3).is_none());
    }
}
