//! The editing session: one open image, its palette, and the picker state.
//!
//! Which palette slot is being edited and whether the picker is open are
//! plain fields here rather than flags scattered across UI code. The
//! session owns the [`RecolorEngine`] and the [`Carousel`], so opening
//! another image is a single call that reloads everything.

use chrono::NaiveDate;

use crate::carousel::{Carousel, PageSizePolicy};
use crate::catalog::CatalogEntry;
use crate::color::ColorToken;
use crate::config::StudioConfig;
use crate::error::{StudioError, StudioResult};
use crate::export::{self, ExportArtifact, ExportFormat, ExportNamer, ExportRequest};
use crate::raster::{BackgroundFill, SizingPolicy};
use crate::recolor::{Clock, PaletteState, Preview, RecolorEngine, SystemClock};

/// Title used for documents that did not come from the catalog.
pub const UNTITLED: &str = "untitled";

/// What the color picker is currently editing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PickerTarget {
    #[default]
    Closed,
    Slot(usize),
    Background,
}

/// State of one editing session.
///
/// # Example
///
/// ```
/// use the2px_studio::{ColorToken, EditorSession, PickerTarget, StudioConfig};
///
/// let mut session = EditorSession::new(StudioConfig::default());
/// session.open_document("Dot", r##"<svg><circle fill="#f00"/></svg>"##);
///
/// session.open_picker(PickerTarget::Slot(0)).unwrap();
/// session.pick_color(ColorToken::parse("#0f0").unwrap()).unwrap();
/// session.close_picker();
///
/// assert!(session.engine().committed().as_str().contains("#0f0"));
/// ```
pub struct EditorSession<C: Clock = SystemClock> {
    config: StudioConfig,
    namer: ExportNamer,
    page_sizes: PageSizePolicy,
    engine: RecolorEngine<C>,
    catalog: Vec<CatalogEntry>,
    carousel: Carousel,
    current: Option<CatalogEntry>,
    title: String,
    picker: PickerTarget,
    viewport_width: u32,
}

impl EditorSession<SystemClock> {
    pub fn new(config: StudioConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }
}

impl<C: Clock> EditorSession<C> {
    pub fn with_clock(config: StudioConfig, clock: C) -> Self {
        let mut engine = RecolorEngine::with_clock(clock, config.throttle_interval());
        engine.set_background(config.default_background());
        let page_sizes = config.page_size_policy();
        let viewport_width = page_sizes.width_threshold;

        Self {
            namer: config.namer(),
            carousel: Carousel::new(&[], None, page_sizes.page_size(viewport_width)),
            page_sizes,
            engine,
            catalog: Vec::new(),
            current: None,
            title: UNTITLED.to_owned(),
            picker: PickerTarget::Closed,
            viewport_width,
            config,
        }
    }

    pub fn config(&self) -> &StudioConfig {
        &self.config
    }

    pub fn engine(&self) -> &RecolorEngine<C> {
        &self.engine
    }

    pub fn palette(&self) -> &PaletteState {
        self.engine.palette()
    }

    pub fn picker(&self) -> PickerTarget {
        self.picker
    }

    pub fn current_entry(&self) -> Option<&CatalogEntry> {
        self.current.as_ref()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn tags(&self) -> &[String] {
        self.current
            .as_ref()
            .map(|entry| entry.tags.as_slice())
            .unwrap_or_default()
    }

    // ---- Catalog browsing ----

    /// Replaces the catalog the carousel pages through.
    pub fn set_catalog(&mut self, entries: Vec<CatalogEntry>) {
        self.catalog = entries;
        self.rebuild_carousel();
    }

    pub fn carousel(&self) -> &Carousel {
        &self.carousel
    }

    pub fn next_page(&mut self) {
        self.carousel.advance();
    }

    pub fn previous_page(&mut self) {
        self.carousel.retreat();
    }

    /// Reacts to a viewport resize.
    pub fn set_viewport_width(&mut self, width: u32) {
        self.viewport_width = width;
        self.carousel.set_page_size(self.page_sizes.page_size(width));
    }

    fn rebuild_carousel(&mut self) {
        let open_file = self.current.as_ref().map(|entry| entry.file.as_str());
        self.carousel = Carousel::new(
            &self.catalog,
            open_file,
            self.page_sizes.page_size(self.viewport_width),
        );
    }

    // ---- Opening documents ----

    /// Opens a catalog entry whose markup has already been fetched.
    ///
    /// Uncommitted edits to the previous image are dropped.
    pub fn open_entry(&mut self, entry: CatalogEntry, markup: impl Into<String>) {
        tracing::info!(id = entry.id, title = %entry.title, "opening catalog entry");
        self.title = entry.title.clone();
        self.current = Some(entry);
        self.load(markup.into());
        self.rebuild_carousel();
    }

    /// Opens markup that is not part of the catalog.
    pub fn open_document(&mut self, title: impl Into<String>, markup: impl Into<String>) {
        self.title = title.into();
        self.current = None;
        self.load(markup.into());
        self.rebuild_carousel();
    }

    fn load(&mut self, markup: String) {
        self.picker = PickerTarget::Closed;
        self.engine.load(markup);
    }

    /// Opens the entry at `index` of the visible carousel window.
    ///
    /// `fetch` loads the entry's markup. If it fails the current image stays
    /// open and the error is returned. Returns false if the window has no
    /// item at `index`.
    pub fn select_from_carousel<F>(&mut self, index: usize, fetch: F) -> StudioResult<bool>
    where
        F: FnOnce(&CatalogEntry) -> StudioResult<String>,
    {
        let Some(entry) = self.carousel.select(index).cloned() else {
            return Ok(false);
        };
        let markup = fetch(&entry)?;
        self.open_entry(entry, markup);
        Ok(true)
    }

    // ---- Color picking ----

    /// Points the picker at `target` and returns the color it should show.
    ///
    /// Leaving a slot commits its edits first.
    pub fn open_picker(&mut self, target: PickerTarget) -> StudioResult<Option<ColorToken>> {
        let current = match target {
            PickerTarget::Closed => None,
            PickerTarget::Background => Some(self.engine.background().color().clone()),
            PickerTarget::Slot(slot) => Some(
                self.engine
                    .slot_color(slot)
                    .cloned()
                    .ok_or(StudioError::InvalidSlot {
                        slot,
                        palette_size: self.engine.palette().len(),
                    })?,
            ),
        };
        if matches!(self.picker, PickerTarget::Slot(_)) && self.picker != target {
            self.engine.commit();
        }
        self.picker = target;
        Ok(current)
    }

    /// Handles a color reported by the picker.
    ///
    /// Slot edits go through the throttled preview; background edits apply
    /// immediately. With the picker closed the color is ignored.
    pub fn pick_color(&mut self, color: ColorToken) -> StudioResult<Option<Preview>> {
        match self.picker {
            PickerTarget::Slot(slot) => self.engine.preview_substitute(slot, color).map(Some),
            PickerTarget::Background => {
                self.engine.set_background(BackgroundFill::new(color));
                Ok(None)
            }
            PickerTarget::Closed => {
                tracing::debug!(%color, "picker closed, ignoring color");
                Ok(None)
            }
        }
    }

    /// Applies a due trailing edit. Call when the engine's deadline passes.
    pub fn poll(&mut self) -> bool {
        self.engine.poll()
    }

    /// Closes the picker and commits the live preview.
    pub fn close_picker(&mut self) {
        self.engine.commit();
        self.picker = PickerTarget::Closed;
    }

    // ---- Export ----

    /// Builds a download of the committed document.
    pub fn export(
        &self,
        format: ExportFormat,
        sizing: SizingPolicy,
        date: NaiveDate,
    ) -> StudioResult<ExportArtifact> {
        export::export_document(
            self.engine.committed(),
            self.engine.background(),
            &self.namer,
            &self.config.provenance_comment,
            &ExportRequest {
                title: &self.title,
                format,
                sizing,
                date,
            },
        )
    }
}
