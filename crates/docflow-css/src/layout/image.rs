//! Replaced content: image sizing and the vector rasterization seam.
//!
//! [§ 10.3.2 Inline, replaced elements](https://www.w3.org/TR/CSS2/visudet.html#inline-replaced-width)
//!
//! Raster images are referenced, never decoded: the emitter fetches `src`.
//! Vector markup (`svg`) cannot be placed in the target document directly,
//! so it is handed to a [`Rasterizer`] supplied by the caller.

use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

use docflow_common::{DiagnosticKind, Diagnostics};
use docflow_dom::ElementData;

use crate::config::LayoutConfig;
use crate::style::ComputedStyle;
use crate::style::values::{AutoLength, ComputedLength, LengthValue, parse_dimension_attribute};

/// Component name used in diagnostics.
const COMPONENT: &str = "image";

/// A width and height in px.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ImageSize {
    /// Width in px.
    pub width: f32,
    /// Height in px.
    pub height: f32,
}

impl ImageSize {
    /// Create a size.
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Width over height, or 1 for a degenerate height.
    #[must_use]
    pub fn aspect_ratio(&self) -> f32 {
        if self.height > 0.0 && self.width > 0.0 {
            self.width / self.height
        } else {
            1.0
        }
    }
}

/// Pixels produced by a [`Rasterizer`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RasterImage {
    /// Pixel width.
    pub width: u32,
    /// Pixel height.
    pub height: u32,
    /// MIME type of `data`, e.g. `image/png`.
    pub media_type: String,
    /// Encoded image bytes.
    #[serde(skip)]
    pub data: Vec<u8>,
}

/// Why a rasterization failed.
#[derive(Debug, Error)]
pub enum RasterError {
    /// The collaborator did not answer in time.
    #[error("rasterization timed out after {0:?}")]
    Timeout(Duration),
    /// The collaborator refused the markup.
    #[error("markup rejected: {0}")]
    Rejected(String),
    /// The collaborator could not be reached.
    #[error("rasterizer unavailable: {0}")]
    Unavailable(String),
}

/// Converts vector markup to pixels.
///
/// Implementations may block; one instance may serve conversions running in
/// parallel. The markup is passed through as serialized from the source
/// tree: sanitizing it is the implementation's responsibility.
pub trait Rasterizer: Send + Sync {
    /// Rasterize `markup`, aiming for `size_hint` px.
    ///
    /// # Errors
    ///
    /// Any [`RasterError`]; the caller degrades the image to a placeholder.
    fn rasterize(&self, markup: &str, size_hint: ImageSize) -> Result<RasterImage, RasterError>;
}

/// The payload of an image box.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageBox {
    /// `src` of an `img`; `None` for vector content.
    pub source: Option<String>,
    /// `alt` text.
    pub alt: Option<String>,
    /// Natural size used for the aspect ratio.
    pub intrinsic: ImageSize,
    /// Size to place the image at.
    pub target: ImageSize,
    /// Nothing can be drawn: the emitter reserves the space only.
    pub placeholder: bool,
    /// Rasterized pixels for vector content.
    pub raster: Option<RasterImage>,
}

/// [§ 4.8.4.3 Dimension attributes](https://html.spec.whatwg.org/multipage/embedded-content-other.html#dimension-attributes)
///
/// Natural size declared by `width`/`height` attributes, or for `svg` by
/// the `viewBox`. Both dimensions must be known.
#[must_use]
pub fn declared_intrinsic_size(element: &ElementData) -> Option<ImageSize> {
    let attribute_px = |name: &str| match element.attr(name).and_then(parse_dimension_attribute) {
        Some(LengthValue::Px(px)) if px > 0.0 => Some(px),
        _ => None,
    };
    if let (Some(width), Some(height)) = (attribute_px("width"), attribute_px("height")) {
        return Some(ImageSize::new(width, height));
    }
    element.attr("viewBox").and_then(parse_view_box)
}

/// `min-x min-y width height`, separated by whitespace and/or commas.
fn parse_view_box(value: &str) -> Option<ImageSize> {
    let numbers: Vec<f32> = value
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|part| !part.is_empty())
        .map(str::parse)
        .collect::<Result<_, _>>()
        .ok()?;
    match numbers.as_slice() {
        [_, _, width, height] if *width > 0.0 && *height > 0.0 => {
            Some(ImageSize::new(*width, *height))
        }
        _ => None,
    }
}

/// [§ 10.3.2 Inline, replaced elements](https://www.w3.org/TR/CSS2/visudet.html#inline-replaced-width)
///
/// "If 'height' and 'width' both have computed values of 'auto' and the
/// element also has an intrinsic width, then that intrinsic width is the used
/// value of 'width'."
///
/// "if 'width' has a computed value of 'auto', 'height' has some other
/// computed value, and the element does have an intrinsic ratio; then the
/// used value of 'width' is: (used height) * (intrinsic ratio)"
///
/// The result is scaled down, keeping its ratio, to fit the containing block.
#[must_use]
pub fn target_size(
    style: &ComputedStyle,
    intrinsic: Option<ImageSize>,
    containing_block_width: f32,
    config: &LayoutConfig,
) -> ImageSize {
    let natural = intrinsic
        .unwrap_or_else(|| ImageSize::new(config.default_image_width, config.default_image_height));
    let ratio = natural.aspect_ratio();

    let width = style.width.resolve(containing_block_width).filter(|w| *w > 0.0);
    // Percentage heights have no definite basis in paged flow.
    let height = match style.height {
        AutoLength::Length(ComputedLength::Px(px)) if px > 0.0 => Some(px),
        _ => None,
    };

    let mut size = match (width, height) {
        (Some(width), Some(height)) => ImageSize::new(width, height),
        (Some(width), None) => ImageSize::new(width, width / ratio),
        (None, Some(height)) => ImageSize::new(height * ratio, height),
        (None, None) => natural,
    };

    if containing_block_width > 0.0 && size.width > containing_block_width {
        let scale = containing_block_width / size.width;
        size = ImageSize::new(containing_block_width, size.height * scale);
    }
    size
}

/// Hand vector markup to the rasterizer. Failure, or no rasterizer at all,
/// yields `None` and an [`DiagnosticKind::ExternalServiceFailure`].
pub fn rasterize_vector(
    rasterizer: Option<&dyn Rasterizer>,
    markup: &str,
    size_hint: ImageSize,
    diagnostics: &mut Diagnostics,
) -> Option<RasterImage> {
    let Some(rasterizer) = rasterizer else {
        diagnostics.report(
            DiagnosticKind::ExternalServiceFailure,
            COMPONENT,
            "no rasterizer configured; <svg> kept as a placeholder",
        );
        return None;
    };
    match rasterizer.rasterize(markup, size_hint) {
        Ok(image) => {
            log::debug!(
                target: "docflow::image",
                "rasterized {} bytes of markup to {}x{}",
                markup.len(),
                image.width,
                image.height
            );
            Some(image)
        }
        Err(err) => {
            diagnostics.report(
                DiagnosticKind::ExternalServiceFailure,
                COMPONENT,
                format!("<svg> kept as a placeholder: {err}"),
            );
            None
        }
    }
}
