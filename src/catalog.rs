//! The image catalog: wire decoding, paginated fetch, and search.
//!
//! Transport is abstracted behind [`CatalogTransport`] so the crate does not
//! pick an HTTP client. A transport returns raw page bodies plus the total
//! page count the server reported; everything else happens here.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{StudioError, StudioResult};

// ============================================================================
// Entries
// ============================================================================

/// One image in the catalog, ready for display and download.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: u64,
    pub title: String,
    /// Absolute URL of the vector document.
    pub file: String,
    pub tags: Vec<String>,
    pub description: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct RenderedText {
    #[serde(default)]
    rendered: String,
}

/// An entry exactly as the catalog endpoint sends it.
#[derive(Debug, Clone, Deserialize)]
pub struct RawCatalogEntry {
    pub id: u64,
    #[serde(default)]
    title: RenderedText,
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub svg_image_file: String,
    /// Comma-joined tag list.
    #[serde(default, deserialize_with = "lenient_string")]
    pub svg_image_tags: String,
}

/// Accepts a string, or treats `null`/`false`/anything else as empty.
fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value.as_str().map(str::to_owned).unwrap_or_default())
}

impl RawCatalogEntry {
    pub fn title(&self) -> &str {
        &self.title.rendered
    }

    /// Splits tags, resolves the file URL against `base_url`.
    pub fn into_entry(self, base_url: &str) -> CatalogEntry {
        CatalogEntry {
            id: self.id,
            file: normalize_file_url(base_url, &self.svg_image_file),
            tags: split_tags(&self.svg_image_tags),
            title: self.title.rendered,
            description: self.description,
        }
    }
}

/// Splits a comma-joined tag string into trimmed, non-empty tags.
pub fn split_tags(joined: &str) -> Vec<String> {
    joined
        .split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Leaves `http(s)` URLs alone and joins anything else onto `base_url`.
pub fn normalize_file_url(base_url: &str, file: &str) -> String {
    if file.starts_with("http") {
        return file.to_owned();
    }
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        file.trim_start_matches('/')
    )
}

// ============================================================================
// Search
// ============================================================================

/// Keeps entries whose tags, description, or title contain `query`,
/// ignoring case. An empty query keeps everything.
pub fn filter_entries<'a>(entries: &'a [CatalogEntry], query: &str) -> Vec<&'a CatalogEntry> {
    let needle = query.to_lowercase();
    entries
        .iter()
        .filter(|entry| {
            entry.tags.join(" ").to_lowercase().contains(&needle)
                || entry.description.to_lowercase().contains(&needle)
                || entry.title.to_lowercase().contains(&needle)
        })
        .collect()
}

// ============================================================================
// Fetching
// ============================================================================

/// One page as returned by the endpoint.
#[derive(Debug, Clone)]
pub struct RawPage {
    /// JSON array of entries.
    pub body: String,
    /// Value of the total-pages response header.
    pub total_pages: u32,
}

/// Network access used by [`CatalogSource`].
pub trait CatalogTransport {
    /// Fetches one page (1-based) of the listing.
    fn fetch_page(&mut self, page: u32, per_page: u32) -> StudioResult<RawPage>;

    /// Fetches the markup of a single vector document.
    fn fetch_document(&mut self, url: &str) -> StudioResult<String>;
}

/// Produces the full catalog from a paginated endpoint.
pub struct CatalogSource<T: CatalogTransport> {
    transport: T,
    base_url: String,
    per_page: u32,
}

impl<T: CatalogTransport> CatalogSource<T> {
    pub fn new(transport: T, base_url: impl Into<String>, per_page: u32) -> Self {
        Self {
            transport,
            base_url: base_url.into(),
            per_page: per_page.max(1),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Walks every page and returns all entries at once.
    ///
    /// If the first page fails the whole fetch fails, since the page count
    /// is unknown. A later page that fails, or an entry that does not
    /// decode, is logged and left out. Nothing is retried.
    #[tracing::instrument(skip(self), fields(base_url = %self.base_url))]
    pub fn fetch_all_entries(&mut self) -> StudioResult<Vec<CatalogEntry>> {
        let first = self.transport.fetch_page(1, self.per_page).inspect_err(|e| {
            tracing::error!(error = %e, "catalog fetch failed");
        })?;
        let total_pages = first.total_pages.max(1);

        let mut entries = self.decode_page(1, &first.body)?;
        for page in 2..=total_pages {
            match self
                .transport
                .fetch_page(page, self.per_page)
                .and_then(|raw| self.decode_page(page, &raw.body))
            {
                Ok(mut more) => entries.append(&mut more),
                Err(e) => tracing::error!(page, error = %e, "skipping catalog page"),
            }
        }

        tracing::debug!(entries = entries.len(), total_pages, "catalog fetched");
        Ok(entries)
    }

    fn decode_page(&self, page: u32, body: &str) -> StudioResult<Vec<CatalogEntry>> {
        let values: Vec<serde_json::Value> =
            serde_json::from_str(body).map_err(|e| StudioError::fetch(page, e.to_string()))?;

        Ok(values
            .into_iter()
            .filter_map(|value| match serde_json::from_value::<RawCatalogEntry>(value) {
                Ok(raw) => Some(raw.into_entry(&self.base_url)),
                Err(e) => {
                    tracing::warn!(page, error = %e, "skipping malformed catalog entry");
                    None
                }
            })
            .collect())
    }

    /// Fetches the vector markup behind `entry`.
    pub fn fetch_markup(&mut self, entry: &CatalogEntry) -> StudioResult<String> {
        self.transport.fetch_document(&entry.file).inspect_err(|e| {
            tracing::error!(id = entry.id, error = %e, "document fetch failed");
        })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    const BASE: &str = "https://react.the2px.com/";

    /// Serves canned pages; pages missing from the map fail.
    struct CannedTransport {
        pages: HashMap<u32, RawPage>,
        documents: HashMap<String, String>,
        requested: Vec<u32>,
    }

    impl CatalogTransport for CannedTransport {
        fn fetch_page(&mut self, page: u32, _per_page: u32) -> StudioResult<RawPage> {
            self.requested.push(page);
            self.pages
                .get(&page)
                .cloned()
                .ok_or_else(|| StudioError::fetch(page, "503"))
        }

        fn fetch_document(&mut self, url: &str) -> StudioResult<String> {
            self.documents
                .get(url)
                .cloned()
                .ok_or_else(|| StudioError::fetch(0, format!("404 {url}")))
        }
    }

    fn page(body: &str, total_pages: u32) -> RawPage {
        RawPage {
            body: body.to_owned(),
            total_pages,
        }
    }

    fn source(pages: Vec<(u32, RawPage)>) -> CatalogSource<CannedTransport> {
        CatalogSource::new(
            CannedTransport {
                pages: pages.into_iter().collect(),
                documents: HashMap::new(),
                requested: Vec::new(),
            },
            BASE,
            100,
        )
    }

    const PAGE_ONE: &str = r#"[
        {"id": 1, "title": {"rendered": "Star"}, "description": "A bright star",
         "svg_image_file": "wp-content/uploads/star.svg", "svg_image_tags": "space, night ,,sky"},
        {"id": 2, "title": {"rendered": "Leaf"}, "description": null,
         "svg_image_file": "https://cdn.test/leaf.svg", "svg_image_tags": false}
    ]"#;
    const PAGE_TWO: &str = r#"[{"id": 3, "title": {"rendered": "Moon"}, "svg_image_file": "/moon.svg"}]"#;

    #[test]
    fn raw_entries_are_normalized() {
        let mut source = source(vec![(1, page(PAGE_ONE, 1))]);
        let entries = source.fetch_all_entries().unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].file, "https://react.the2px.com/wp-content/uploads/star.svg");
        assert_eq!(entries[0].tags, vec!["space", "night", "sky"]);
        assert_eq!(entries[1].file, "https://cdn.test/leaf.svg");
        assert!(entries[1].tags.is_empty());
        assert_eq!(entries[1].description, "");
    }

    #[test]
    fn all_pages_are_walked() {
        let mut source = source(vec![(1, page(PAGE_ONE, 2)), (2, page(PAGE_TWO, 2))]);
        let entries = source.fetch_all_entries().unwrap();

        let titles: Vec<_> = entries.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["Star", "Leaf", "Moon"]);
        assert_eq!(entries[2].file, "https://react.the2px.com/moon.svg");
        assert_eq!(source.transport().requested, vec![1, 2]);
    }

    #[test]
    fn failed_later_page_is_left_out() {
        let mut source = source(vec![(1, page(PAGE_ONE, 3)), (3, page(PAGE_TWO, 3))]);
        let entries = source.fetch_all_entries().unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(source.transport().requested, vec![1, 2, 3]);
    }

    #[test]
    fn failed_first_page_fails_the_fetch() {
        let mut source = source(vec![]);
        let err = source.fetch_all_entries().unwrap_err();
        assert!(matches!(err, StudioError::Fetch { page: 1, .. }));
    }

    #[test]
    fn malformed_entry_is_skipped() {
        let body = r#"[{"title": {"rendered": "no id"}}, {"id": 9}]"#;
        let mut source = source(vec![(1, page(body, 1))]);
        let entries = source.fetch_all_entries().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, 9);
    }

    #[test]
    fn filter_matches_tags_description_and_title() {
        let mut source = source(vec![(1, page(PAGE_ONE, 2)), (2, page(PAGE_TWO, 2))]);
        let entries = source.fetch_all_entries().unwrap();

        let by = |q: &str| -> Vec<u64> { filter_entries(&entries, q).iter().map(|e| e.id).collect() };
        assert_eq!(by("NIGHT"), vec![1]);
        assert_eq!(by("bright"), vec![1]);
        assert_eq!(by("moon"), vec![3]);
        assert_eq!(by(""), vec![1, 2, 3]);
        assert!(by("volcano").is_empty());
    }

    #[test]
    fn fetch_markup_reports_missing_document() {
        let mut source = source(vec![]);
        let entry = CatalogEntry {
            id: 5,
            title: "Gone".into(),
            file: "https://cdn.test/gone.svg".into(),
            tags: vec![],
            description: String::new(),
        };
        assert!(matches!(
            source.fetch_markup(&entry),
            Err(StudioError::Fetch { .. })
        ));
    }

    #[test]
    fn split_tags_drops_blanks() {
        assert_eq!(split_tags(" a , ,b,"), vec!["a", "b"]);
        assert!(split_tags("").is_empty());
    }
}
