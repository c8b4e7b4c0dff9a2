//! Serializable studio configuration.
//!
//! Every field has a default, so `{}` is a complete configuration and a
//! frontend only needs to send the values it wants to change.
//!
//! # Example
//!
//! ```
//! use the2px_studio::StudioConfig;
//!
//! let config = StudioConfig::from_json(r#"{ "brand": "acme", "carousel": { "wide": 4 } }"#).unwrap();
//! assert_eq!(config.brand, "acme");
//! assert_eq!(config.carousel.wide, 4);
//! assert_eq!(config.carousel.narrow, 3);
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::carousel::PageSizePolicy;
use crate::color::ColorToken;
use crate::export::{DEFAULT_PROVENANCE, ExportNamer};
use crate::raster::BackgroundFill;

// ============================================================================
// Sections
// ============================================================================

/// Carousel page sizes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CarouselSettings {
    /// Entries per page below the width threshold.
    #[serde(alias = "narrowPageSize")]
    pub narrow: usize,
    /// Entries per page at or above the width threshold.
    #[serde(alias = "widePageSize")]
    pub wide: usize,
    pub width_threshold: u32,
}

impl Default for CarouselSettings {
    fn default() -> Self {
        let policy = PageSizePolicy::default();
        Self {
            narrow: policy.narrow,
            wide: policy.wide,
            width_threshold: policy.width_threshold,
        }
    }
}

impl From<&CarouselSettings> for PageSizePolicy {
    fn from(settings: &CarouselSettings) -> Self {
        Self {
            narrow: settings.narrow,
            wide: settings.wide,
            width_threshold: settings.width_threshold,
        }
    }
}

/// Where the catalog lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CatalogSettings {
    /// Prefix for relative document paths.
    pub base_url: String,
    pub per_page: u32,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            base_url: "https://react.the2px.com/".to_owned(),
            per_page: 100,
        }
    }
}

// ============================================================================
// StudioConfig
// ============================================================================

/// All tunable settings of the recolor-and-export pipeline.
///
/// # JSON Format
///
/// ```json
/// {
///   "brand": "the2px",
///   "throttleIntervalMs": 50,
///   "defaultBackground": "#fdfdfd",
///   "provenanceComment": "<!-- Downloaded from the2px.com -->",
///   "carousel": { "narrow": 3, "wide": 5, "widthThreshold": 768 },
///   "catalog": { "baseUrl": "https://react.the2px.com/", "perPage": 100 }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StudioConfig {
    /// First component of every download name.
    pub brand: String,
    pub throttle_interval_ms: u64,
    /// Fill for opaque exports until the user picks one.
    pub default_background: ColorToken,
    /// Line prepended to vector downloads.
    pub provenance_comment: String,
    pub carousel: CarouselSettings,
    pub catalog: CatalogSettings,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            brand: ExportNamer::default().brand().to_owned(),
            throttle_interval_ms: 50,
            default_background: BackgroundFill::default().0,
            provenance_comment: DEFAULT_PROVENANCE.to_owned(),
            carousel: CarouselSettings::default(),
            catalog: CatalogSettings::default(),
        }
    }
}

impl StudioConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn throttle_interval(&self) -> Duration {
        Duration::from_millis(self.throttle_interval_ms)
    }

    pub fn namer(&self) -> ExportNamer {
        ExportNamer::new(&self.brand)
    }

    pub fn page_size_policy(&self) -> PageSizePolicy {
        (&self.carousel).into()
    }

    pub fn default_background(&self) -> BackgroundFill {
        BackgroundFill::new(self.default_background.clone())
    }

    /// Serializes the config to a JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serializes the config to a pretty-printed JSON string.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserializes a config from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
