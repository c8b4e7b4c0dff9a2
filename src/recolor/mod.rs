//! Live recoloring of a vector document.
//!
//! [`RecolorEngine`] keeps two copies of the document: the committed one,
//! which exports read from, and a live preview that palette edits land on.
//! Edits are throttled (see [`throttle`]) so a color picker dragging across
//! its gradient does not rewrite the markup on every pointer event.

pub mod throttle;

use std::time::{Duration, Instant};

use crate::color::{self, ColorToken};
use crate::error::{StudioError, StudioResult};
use crate::geometry::SizePx;
use crate::raster::{self, BackgroundFill};

pub use throttle::{Clock, ManualClock, SystemClock, Throttle};

/// Default minimum spacing between applied preview edits.
pub const DEFAULT_THROTTLE_INTERVAL: Duration = Duration::from_millis(50);

// ============================================================================
// VectorDocument
// ============================================================================

/// Vector markup text.
///
/// Documents are values: every substitution produces a new document and the
/// original is left as it was.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VectorDocument {
    markup: String,
}

impl VectorDocument {
    pub fn new(markup: impl Into<String>) -> Self {
        Self {
            markup: markup.into(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.markup
    }

    pub fn is_empty(&self) -> bool {
        self.markup.is_empty()
    }

    /// Declared size of the root element, 500 for each missing dimension.
    pub fn intrinsic_size(&self) -> SizePx {
        raster::intrinsic_size(&self.markup)
    }

    /// Distinct colors in first-seen order.
    pub fn colors(&self) -> Vec<ColorToken> {
        color::extract_colors(&self.markup)
    }

    /// Returns a copy with every `from` token replaced by `to`, plus the
    /// number of replacements.
    pub fn substituted(&self, from: &ColorToken, to: &ColorToken) -> (Self, usize) {
        let (markup, count) = color::substitute(&self.markup, from, to);
        (Self { markup }, count)
    }
}

impl From<String> for VectorDocument {
    fn from(markup: String) -> Self {
        Self::new(markup)
    }
}

impl From<&str> for VectorDocument {
    fn from(markup: &str) -> Self {
        Self::new(markup)
    }
}

// ============================================================================
// PaletteState
// ============================================================================

/// Current value of each palette slot.
///
/// Slots are fixed when a document is loaded, one per extracted color. Edits
/// change a slot's value but never add, remove, or reorder slots.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PaletteState {
    slots: Vec<ColorToken>,
}

impl PaletteState {
    pub fn from_colors(colors: Vec<ColorToken>) -> Self {
        Self { slots: colors }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn get(&self, slot: usize) -> Option<&ColorToken> {
        self.slots.get(slot)
    }

    pub fn slots(&self) -> &[ColorToken] {
        &self.slots
    }

    fn check(&self, slot: usize) -> StudioResult<()> {
        if slot < self.slots.len() {
            Ok(())
        } else {
            Err(StudioError::InvalidSlot {
                slot,
                palette_size: self.slots.len(),
            })
        }
    }

    fn set(&mut self, slot: usize, color: ColorToken) -> Option<ColorToken> {
        self.slots
            .get_mut(slot)
            .map(|value| std::mem::replace(value, color))
    }
}

// ============================================================================
// RecolorEngine
// ============================================================================

/// A single palette edit: paint `slot` with `color`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaletteEdit {
    pub slot: usize,
    pub color: ColorToken,
}

/// What happened to a preview request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preview {
    /// The edit was applied to the live document right away.
    Applied,
    /// The edit is waiting for the trailing edge at the given instant.
    Scheduled(Instant),
}

/// Holds the committed and live documents, the palette, and the background.
///
/// The engine owns no timer. Callers drive the trailing edge by calling
/// [`poll`](Self::poll) at or after [`next_deadline`](Self::next_deadline),
/// and [`commit`](Self::commit) flushes anything still pending.
///
/// # Example
///
/// ```
/// use the2px_studio::{ColorToken, RecolorEngine};
///
/// let mut engine = RecolorEngine::new();
/// engine.load(r##"<svg><rect fill="#ff0000"/></svg>"##);
///
/// let blue = ColorToken::parse("#0000ff").unwrap();
/// engine.preview_substitute(0, blue).unwrap();
/// engine.commit();
///
/// assert!(engine.committed().as_str().contains("#0000ff"));
/// ```
pub struct RecolorEngine<C: Clock = SystemClock> {
    clock: C,
    committed: VectorDocument,
    live: VectorDocument,
    palette: PaletteState,
    background: BackgroundFill,
    throttle: Throttle<PaletteEdit>,
}

impl RecolorEngine<SystemClock> {
    /// Creates an empty engine on the system clock with the default interval.
    pub fn new() -> Self {
        Self::with_clock(SystemClock, DEFAULT_THROTTLE_INTERVAL)
    }
}

impl Default for RecolorEngine<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> RecolorEngine<C> {
    pub fn with_clock(clock: C, interval: Duration) -> Self {
        Self {
            clock,
            committed: VectorDocument::default(),
            live: VectorDocument::default(),
            palette: PaletteState::default(),
            background: BackgroundFill::default(),
            throttle: Throttle::new(interval),
        }
    }

    /// Replaces both documents with `markup` and rebuilds the palette.
    ///
    /// Pending edits for the previous document are discarded.
    pub fn load(&mut self, markup: impl Into<VectorDocument>) {
        let document = markup.into();
        self.palette = PaletteState::from_colors(document.colors());
        self.throttle.reset();
        self.committed = document.clone();
        self.live = document;
        tracing::debug!(colors = self.palette.len(), "loaded document");
    }

    pub fn committed(&self) -> &VectorDocument {
        &self.committed
    }

    pub fn live(&self) -> &VectorDocument {
        &self.live
    }

    pub fn palette(&self) -> &PaletteState {
        &self.palette
    }

    /// The most recent color chosen for `slot`.
    ///
    /// A trailing edit still waiting on the throttle wins over the value
    /// already applied to the live document.
    pub fn slot_color(&self, slot: usize) -> Option<&ColorToken> {
        match self.throttle.pending() {
            Some(edit) if edit.slot == slot => Some(&edit.color),
            _ => self.palette.get(slot),
        }
    }

    pub fn background(&self) -> &BackgroundFill {
        &self.background
    }

    pub fn set_background(&mut self, background: BackgroundFill) {
        self.background = background;
    }

    /// Returns true if the live document differs from the committed one.
    pub fn has_uncommitted_changes(&self) -> bool {
        self.live != self.committed
    }

    /// Paints palette `slot` with `color` on the live document, throttled.
    ///
    /// An out-of-range slot returns [`StudioError::InvalidSlot`] and leaves
    /// the engine untouched. A pending edit for a different slot is applied
    /// first so switching slots never drops an edit.
    pub fn preview_substitute(&mut self, slot: usize, color: ColorToken) -> StudioResult<Preview> {
        if let Err(err) = self.palette.check(slot) {
            tracing::warn!(slot, palette_size = self.palette.len(), "ignoring edit to unknown slot");
            return Err(err);
        }

        let now = self.clock.now();
        if self.throttle.pending().is_some_and(|p| p.slot != slot) {
            if let Some(edit) = self.throttle.flush(now) {
                self.apply(edit);
            }
        }

        match self.throttle.call(now, PaletteEdit { slot, color }) {
            Some(edit) => {
                self.apply(edit);
                Ok(Preview::Applied)
            }
            None => Ok(Preview::Scheduled(
                self.throttle.deadline().unwrap_or(now),
            )),
        }
    }

    /// Applies the pending edit if it is due. Returns true if one was applied.
    pub fn poll(&mut self) -> bool {
        match self.throttle.poll(self.clock.now()) {
            Some(edit) => {
                self.apply(edit);
                true
            }
            None => false,
        }
    }

    /// Applies the pending edit immediately. Returns true if one was applied.
    pub fn flush(&mut self) -> bool {
        match self.throttle.flush(self.clock.now()) {
            Some(edit) => {
                self.apply(edit);
                true
            }
            None => false,
        }
    }

    /// When the pending edit becomes due, if there is one.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.throttle.deadline()
    }

    /// Flushes any pending edit and makes the live document the committed one.
    pub fn commit(&mut self) {
        self.flush();
        self.committed = self.live.clone();
        tracing::debug!("committed live document");
    }

    fn apply(&mut self, edit: PaletteEdit) {
        let Some(previous) = self.palette.get(edit.slot).cloned() else {
            return;
        };
        let (live, replaced) = self.live.substituted(&previous, &edit.color);
        tracing::debug!(
            slot = edit.slot,
            from = %previous,
            to = %edit.color,
            replaced,
            "applied palette edit"
        );
        self.live = live;
        self.palette.set(edit.slot, edit.color);
    }
}

// ============================================================================
// Tests
// ============================================================================
