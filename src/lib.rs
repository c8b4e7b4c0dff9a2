//! the2px-studio: recolor vector images and export them as SVG, PNG, or JPEG.
//!
//! The crate covers the pipeline behind an image's editor view:
//!
//! 1. [`extract_colors`] finds the distinct hex colors of a document.
//! 2. [`RecolorEngine`] previews palette edits on a live copy, throttled for
//!    interactive use, and commits them on request.
//! 3. [`rasterize`] letterboxes the committed document into a bitmap.
//! 4. [`ExportNamer`] names the download.
//!
//! [`EditorSession`] ties these together with the catalog [`Carousel`].
//!
//! # Example
//!
//! ```
//! use the2px_studio::{
//!     BackgroundFill, ColorToken, FixedSize, RasterFormat, RecolorEngine, SizingPolicy,
//!     rasterize,
//! };
//!
//! let mut engine = RecolorEngine::new();
//! engine.load(r##"<svg xmlns="http://www.w3.org/2000/svg" width="20" height="10"><rect width="20" height="10" fill="#c00"/></svg>"##);
//!
//! engine.preview_substitute(0, ColorToken::parse("#0c0").unwrap()).unwrap();
//! engine.commit();
//!
//! let png = rasterize(
//!     engine.committed().as_str(),
//!     SizingPolicy::Fixed(FixedSize::Px500),
//!     &BackgroundFill::default(),
//!     RasterFormat::Png,
//! )
//! .unwrap();
//! assert!(!png.is_empty());
//! ```

mod carousel;
mod catalog;
mod color;
mod config;
mod error;
mod export;
mod geometry;
mod raster;
mod recolor;
mod session;

pub use carousel::{Carousel, PageSizePolicy};
pub use catalog::{
    CatalogEntry, CatalogSource, CatalogTransport, RawCatalogEntry, RawPage, filter_entries,
    normalize_file_url, split_tags,
};
pub use color::{ColorToken, extract_colors, substitute};
pub use config::{CarouselSettings, CatalogSettings, StudioConfig};
pub use error::{StudioError, StudioResult};
pub use export::{
    DEFAULT_PROVENANCE, ExportArtifact, ExportFormat, ExportNamer, ExportRequest,
    export_document, vector_payload,
};
pub use geometry::{Placement, SizePx};
pub use raster::{
    BackgroundFill, DEFAULT_INTRINSIC_EDGE, FixedSize, MAX_CANVAS_EDGE, RasterFormat,
    SizingPolicy, encode, intrinsic_size, rasterize, render_canvas,
};
pub use recolor::{
    Clock, DEFAULT_THROTTLE_INTERVAL, ManualClock, PaletteEdit, PaletteState, Preview,
    RecolorEngine, SystemClock, Throttle, VectorDocument,
};
pub use session::{EditorSession, PickerTarget, UNTITLED};
