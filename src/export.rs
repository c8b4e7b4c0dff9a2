//! Download artifacts: file naming and the vector pass-through.

use std::fmt;
use std::str::FromStr;

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{StudioError, StudioResult};
use crate::raster::{self, BackgroundFill, RasterFormat, SizingPolicy};
use crate::recolor::VectorDocument;

/// Default provenance line prepended to vector exports.
pub const DEFAULT_PROVENANCE: &str = "<!-- Downloaded from the2px.com -->";

// ============================================================================
// ExportFormat
// ============================================================================

/// The three downloads offered for an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Svg,
    Png,
    Jpeg,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Svg => "svg",
            Self::Png => RasterFormat::Png.extension(),
            Self::Jpeg => RasterFormat::Jpeg.extension(),
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Svg => "image/svg+xml;charset=utf-8",
            Self::Png => RasterFormat::Png.mime_type(),
            Self::Jpeg => RasterFormat::Jpeg.mime_type(),
        }
    }

    /// The bitmap encoding behind this format, `None` for vector output.
    pub fn raster(self) -> Option<RasterFormat> {
        match self {
            Self::Svg => None,
            Self::Png => Some(RasterFormat::Png),
            Self::Jpeg => Some(RasterFormat::Jpeg),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = StudioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "svg" => Ok(Self::Svg),
            "png" => Ok(Self::Png),
            "jpeg" | "jpg" => Ok(Self::Jpeg),
            _ => Err(StudioError::InvalidFormat(s.to_string())),
        }
    }
}

// ============================================================================
// Naming
// ============================================================================

/// Builds `<brand>-<title>-<YYYYMMDD>.<ext>` download names.
///
/// Two exports of the same title on the same day get the same name; the
/// later download simply replaces the earlier one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportNamer {
    brand: String,
}

impl ExportNamer {
    pub fn new(brand: impl Into<String>) -> Self {
        Self {
            brand: brand.into(),
        }
    }

    pub fn brand(&self) -> &str {
        &self.brand
    }

    /// Names an export made today, by the local calendar.
    pub fn file_name(&self, title: &str, format: ExportFormat) -> String {
        self.file_name_on(title, format, Local::now().date_naive())
    }

    /// Names an export made on `date`.
    pub fn file_name_on(&self, title: &str, format: ExportFormat, date: NaiveDate) -> String {
        // Path separators would turn the title into directories.
        let title = title.replace(['/', '\\'], "-");
        format!(
            "{}-{}-{}.{}",
            self.brand,
            title,
            date.format("%Y%m%d"),
            format.extension()
        )
    }
}

impl Default for ExportNamer {
    fn default() -> Self {
        Self::new("the2px")
    }
}

// ============================================================================
// ExportArtifact
// ============================================================================

/// A finished download: its name, content type, and payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub file_name: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Returns the document text with `provenance` on its own first line.
pub fn vector_payload(document: &VectorDocument, provenance: &str) -> String {
    let mut payload = String::with_capacity(provenance.len() + 1 + document.as_str().len());
    payload.push_str(provenance);
    payload.push('\n');
    payload.push_str(document.as_str());
    payload
}

/// Everything needed to turn a document into a download.
#[derive(Debug, Clone)]
pub struct ExportRequest<'a> {
    pub title: &'a str,
    pub format: ExportFormat,
    pub sizing: SizingPolicy,
    pub date: NaiveDate,
}

/// Produces the artifact for `request`. Raster failures yield no artifact.
pub fn export_document(
    document: &VectorDocument,
    background: &BackgroundFill,
    namer: &ExportNamer,
    provenance: &str,
    request: &ExportRequest<'_>,
) -> StudioResult<ExportArtifact> {
    let bytes = match request.format.raster() {
        None => vector_payload(document, provenance).into_bytes(),
        Some(raster_format) => {
            raster::rasterize(document.as_str(), request.sizing, background, raster_format)?
        }
    };

    let artifact = ExportArtifact {
        file_name: namer.file_name_on(request.title, request.format, request.date),
        mime_type: request.format.mime_type(),
        bytes,
    };
    tracing::info!(
        file = %artifact.file_name,
        bytes = artifact.bytes.len(),
        "export ready"
    );
    Ok(artifact)
}
