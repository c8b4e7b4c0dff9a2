//! Pixel geometry for raster export.
//!
//! [`Placement`] describes where a decoded document lands inside the target
//! canvas once it has been letterboxed.

/// A 2D size in pixel units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SizePx {
    pub width: u32,
    pub height: u32,
}

impl SizePx {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// A rectangle in canvas coordinates, kept fractional so centering offsets
/// survive until the draw transform is built.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Placement {
    /// X offset from the left edge of the canvas
    pub x: f32,
    /// Y offset from the top edge of the canvas
    pub y: f32,
    /// Drawn width
    pub width: f32,
    /// Drawn height
    pub height: f32,
}

impl Placement {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Fits a source of `natural_width x natural_height` into `target`,
    /// preserving aspect ratio and centering on the padded axis.
    ///
    /// Wide sources (`aspect > 1`) span the full target width and are
    /// vertically centered. Everything else spans the full target height
    /// and is horizontally centered.
    pub fn letterbox(natural_width: f32, natural_height: f32, target: SizePx) -> Self {
        let target_w = target.width as f32;
        let target_h = target.height as f32;

        if natural_width <= 0.0 || natural_height <= 0.0 {
            return Self::new(0.0, 0.0, target_w, target_h);
        }

        let aspect = natural_width / natural_height;
        if aspect > 1.0 {
            let drawn_h = target_w / aspect;
            Self::new(0.0, (target_h - drawn_h) / 2.0, target_w, drawn_h)
        } else {
            let drawn_w = target_h * aspect;
            Self::new((target_w - drawn_w) / 2.0, 0.0, drawn_w, target_h)
        }
    }
}
