//! Error taxonomy shared by every stage of the recolor-and-export pipeline.
//!
//! None of these errors are fatal to an editing session: the caller logs
//! them and the operation that produced them simply does not complete.

pub type StudioResult<T> = Result<T, StudioError>;

#[derive(thiserror::Error, Debug)]
pub enum StudioError {
    /// The vector document could not be parsed into a renderable tree.
    #[error("decode error: {0}")]
    Decode(String),

    /// A catalog page or a vector document could not be fetched.
    #[error("fetch error on page {page}: {reason}")]
    Fetch { page: u32, reason: String },

    /// A palette edit addressed a slot that does not exist.
    #[error("invalid palette slot {slot} (palette has {palette_size} slots)")]
    InvalidSlot { slot: usize, palette_size: usize },

    /// A string could not be read as a `#rgb` / `#rrggbb` color.
    #[error("invalid color: {0}")]
    InvalidColor(String),

    /// An export size outside the supported set.
    #[error("unsupported export size '{0}'")]
    InvalidSize(String),

    /// An export format other than svg, png, or jpeg.
    #[error("unsupported export format '{0}'")]
    InvalidFormat(String),

    #[error("encode error: {0}")]
    Encode(#[from] image::ImageError),

    #[error("configuration error: {0}")]
    Config(#[from] serde_json::Error),
}

impl StudioError {
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    pub fn fetch(page: u32, reason: impl Into<String>) -> Self {
        Self::Fetch {
            page,
            reason: reason.into(),
        }
    }

    pub fn invalid_color(value: impl Into<String>) -> Self {
        Self::InvalidColor(value.into())
    }
}
