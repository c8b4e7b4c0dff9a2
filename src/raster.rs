//! Bitmap export of vector documents using resvg/usvg.
//!
//! A document is parsed once, measured at its natural size, then drawn
//! letterboxed into a target canvas whose size comes from a
//! [`SizingPolicy`]. Opaque formats get the background filled first;
//! PNG keeps transparency.

use std::fmt;
use std::io::Cursor;
use std::str::FromStr;

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use resvg::tiny_skia::{Color, Pixmap, Transform};
use resvg::usvg::{Options, Tree};
use serde::{Deserialize, Serialize};

use crate::color::ColorToken;
use crate::error::{StudioError, StudioResult};
use crate::geometry::{Placement, SizePx};

/// Edge length used for any intrinsic dimension that is missing or unreadable.
pub const DEFAULT_INTRINSIC_EDGE: u32 = 500;

/// Largest canvas edge accepted from a declared intrinsic size.
pub const MAX_CANVAS_EDGE: u32 = 8000;

// ============================================================================
// Sizing
// ============================================================================

/// The square export sizes offered next to the intrinsic one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FixedSize {
    #[serde(rename = "500")]
    Px500,
    #[serde(rename = "1000")]
    Px1000,
    #[serde(rename = "2000")]
    Px2000,
}

impl FixedSize {
    pub const ALL: [FixedSize; 3] = [FixedSize::Px500, FixedSize::Px1000, FixedSize::Px2000];

    /// Returns the edge length in pixels.
    pub fn pixels(self) -> u32 {
        match self {
            Self::Px500 => 500,
            Self::Px1000 => 1000,
            Self::Px2000 => 2000,
        }
    }

    /// Looks up the fixed size with the given edge length.
    pub fn from_pixels(pixels: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|size| size.pixels() == pixels)
    }
}

/// How the target canvas is sized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SizingPolicy {
    /// Use the document's declared `width`/`height`, 500 for each one missing.
    #[default]
    Intrinsic,
    /// A square canvas of the given size.
    Fixed(FixedSize),
}

impl SizingPolicy {
    /// Resolves the canvas size for `markup`.
    pub fn target_size(self, markup: &str) -> SizePx {
        match self {
            Self::Intrinsic => intrinsic_size(markup),
            Self::Fixed(size) => SizePx::new(size.pixels(), size.pixels()),
        }
    }
}

impl FromStr for SizingPolicy {
    type Err = StudioError;

    /// Accepts `intrinsic` or one of the fixed edge lengths.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("intrinsic") {
            return Ok(Self::Intrinsic);
        }
        s.parse::<u32>()
            .ok()
            .and_then(FixedSize::from_pixels)
            .map(Self::Fixed)
            .ok_or_else(|| StudioError::InvalidSize(s.to_string()))
    }
}

impl fmt::Display for SizingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Intrinsic => f.write_str("intrinsic"),
            Self::Fixed(size) => write!(f, "{}", size.pixels()),
        }
    }
}

/// Reads the declared `width` and `height` of the root `<svg>` element.
///
/// Each dimension falls back to [`DEFAULT_INTRINSIC_EDGE`] independently.
/// Plain numbers and `px` values are understood; anything else (percentages,
/// other units, garbage) counts as absent.
pub fn intrinsic_size(markup: &str) -> SizePx {
    let tag = root_tag(markup).unwrap_or("");
    let edge = |name: &str| {
        attribute(tag, name)
            .and_then(parse_dimension)
            .unwrap_or(DEFAULT_INTRINSIC_EDGE)
    };
    SizePx::new(edge("width"), edge("height"))
}

/// Returns the text of the root `<svg ...>` start tag, without the brackets.
fn root_tag(markup: &str) -> Option<&str> {
    let mut search = markup;
    loop {
        let start = search.find("<svg")?;
        let rest = &search[start + 4..];
        match rest.bytes().next() {
            Some(b) if b.is_ascii_whitespace() || b == b'>' || b == b'/' => {
                let end = rest.find('>')?;
                return Some(&rest[..end]);
            }
            _ => search = rest,
        }
    }
}

/// Finds a quoted attribute value inside a start tag.
fn attribute<'a>(tag: &'a str, name: &str) -> Option<&'a str> {
    let mut offset = 0;
    while let Some(found) = tag[offset..].find(name) {
        let start = offset + found;
        let boundary = tag[..start]
            .bytes()
            .next_back()
            .is_some_and(|b| b.is_ascii_whitespace());
        let after = tag[start + name.len()..].trim_start();

        if boundary {
            if let Some(value) = after.strip_prefix('=') {
                let value = value.trim_start();
                let quote = value.chars().next()?;
                if quote == '"' || quote == '\'' {
                    let body = &value[1..];
                    let end = body.find(quote)?;
                    return Some(&body[..end]);
                }
            }
        }
        offset = start + name.len();
    }
    None
}

fn parse_dimension(value: &str) -> Option<u32> {
    let value = value.trim();
    let number = value.strip_suffix("px").unwrap_or(value).trim_end();
    let parsed: f32 = number.parse().ok()?;
    (parsed.is_finite() && parsed >= 1.0).then(|| parsed.round() as u32)
}

// ============================================================================
// Formats and background
// ============================================================================

/// Bitmap encodings offered for download.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RasterFormat {
    Png,
    Jpeg,
}

impl RasterFormat {
    /// Returns true for formats without an alpha channel.
    ///
    /// Only these get the background fill.
    pub fn is_opaque(self) -> bool {
        matches!(self, Self::Jpeg)
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
        }
    }
}

/// The color painted under the drawing for opaque exports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BackgroundFill(pub ColorToken);

impl BackgroundFill {
    pub fn new(color: ColorToken) -> Self {
        Self(color)
    }

    pub fn color(&self) -> &ColorToken {
        &self.0
    }

    fn to_skia(&self) -> StudioResult<Color> {
        let rgb = self.0.to_srgb()?;
        Ok(Color::from_rgba8(rgb.red, rgb.green, rgb.blue, 255))
    }
}

impl Default for BackgroundFill {
    fn default() -> Self {
        Self(ColorToken::from_normalized("#fdfdfd"))
    }
}

// ============================================================================
// Rasterization
// ============================================================================

/// Draws `markup` into a canvas sized by `sizing`.
///
/// The background is filled only when `format` is opaque. Fails with
/// [`StudioError::Decode`] when the markup cannot be parsed and with
/// [`StudioError::InvalidSize`] when either canvas edge exceeds
/// [`MAX_CANVAS_EDGE`].
pub fn render_canvas(
    markup: &str,
    sizing: SizingPolicy,
    background: &BackgroundFill,
    format: RasterFormat,
) -> StudioResult<RgbaImage> {
    let target = sizing.target_size(markup);
    if target.width > MAX_CANVAS_EDGE || target.height > MAX_CANVAS_EDGE {
        tracing::warn!(
            width = target.width,
            height = target.height,
            "canvas exceeds the maximum edge"
        );
        return Err(StudioError::InvalidSize(format!(
            "{}x{}",
            target.width, target.height
        )));
    }

    let tree = Tree::from_str(markup, &Options::default()).map_err(|e| {
        tracing::error!(error = %e, "vector document failed to decode");
        StudioError::decode(e.to_string())
    })?;

    let natural = tree.size();
    let placement = Placement::letterbox(natural.width(), natural.height(), target);

    let mut pixmap = Pixmap::new(target.width, target.height).ok_or_else(|| {
        StudioError::InvalidSize(format!("{}x{}", target.width, target.height))
    })?;

    if format.is_opaque() {
        pixmap.fill(background.to_skia()?);
    }

    let transform = Transform::from_row(
        placement.width / natural.width(),
        0.0,
        0.0,
        placement.height / natural.height(),
        placement.x,
        placement.y,
    );
    resvg::render(&tree, transform, &mut pixmap.as_mut());

    tracing::debug!(
        width = target.width,
        height = target.height,
        drawn_width = placement.width,
        drawn_height = placement.height,
        "rendered canvas"
    );

    Ok(pixmap_to_rgba_image(&pixmap))
}

/// Renders and encodes `markup` in one step.
///
/// Nothing is returned unless both rendering and encoding succeed.
#[tracing::instrument(skip(markup, background), fields(bytes = markup.len()))]
pub fn rasterize(
    markup: &str,
    sizing: SizingPolicy,
    background: &BackgroundFill,
    format: RasterFormat,
) -> StudioResult<Vec<u8>> {
    let canvas = render_canvas(markup, sizing, background, format)?;
    encode(&canvas, format)
}

/// Encodes a canvas. JPEG is written at maximum quality.
pub fn encode(canvas: &RgbaImage, format: RasterFormat) -> StudioResult<Vec<u8>> {
    let mut bytes = Vec::new();
    match format {
        RasterFormat::Png => {
            canvas.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
        }
        RasterFormat::Jpeg => {
            let rgb = DynamicImage::ImageRgba8(canvas.clone()).into_rgb8();
            JpegEncoder::new_with_quality(&mut bytes, 100).encode_image(&rgb)?;
        }
    }
    Ok(bytes)
}

/// Converts a tiny_skia Pixmap to an image::RgbaImage.
fn pixmap_to_rgba_image(pixmap: &Pixmap) -> RgbaImage {
    let mut img = RgbaImage::new(pixmap.width(), pixmap.height());
    // tiny_skia stores premultiplied alpha
    for (dst, src) in img.pixels_mut().zip(pixmap.pixels()) {
        let c = src.demultiply();
        *dst = Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
    }
    img
}

// ============================================================================
// Tests
// ============================================================================
