//! Document decoders.
//!
//! Two capability-equivalent decoder families sit behind this crate:
//!
//! - [`ExactDecoder`]: page-addressable formats (PDF). The decoder reports the
//!   native page count and renders any page at any scale.
//! - [`FlowDecoder`]: reflowed formats (DOCX). The decoder lays the whole
//!   document out once into a continuous [`FlowSurface`]; page boundaries are
//!   derived later from the surface extent.
//!
//! Default adapters are [`LopdfDecoder`] and [`DocxDecoder`]. Both take their
//! runtime configuration at construction time.

mod docx;
mod exact;
mod flow;
mod pdf;

pub use docx::DocxDecoder;
pub use exact::{ExactDecoder, ExactDocument, PageHandle, PageSize};
pub use flow::{BlockKind, FlowBlock, FlowDecoder, FlowLayout, FlowSurface};
pub use pdf::{DecoderOptions, LopdfDecoder};

use image::{ImageBuffer, Rgba};

/// Pixel buffer a page is rendered into.
pub type RgbaImage = ImageBuffer<Rgba<u8>, Vec<u8>>;

/// Decoding strategy of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum DocumentFormat {
    /// Native page boundaries are authoritative (PDF).
    Exact,
    /// Continuous content with synthesized page boundaries (DOCX).
    Flow,
}

/// Errors raised while opening or laying out a document.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("PDF parse error: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("encrypted PDFs are not supported")]
    EncryptedUnsupported,
    #[error("document has no pages")]
    NoPages,
    #[error("invalid document container: {0}")]
    Container(#[from] zip::result::ZipError),
    #[error("document part {0} is missing")]
    MissingPart(&'static str),
    #[error("XML error: {0}")]
    Xml(#[from] roxmltree::Error),
    #[error("decoder backend error: {0}")]
    Backend(String),
}

/// Errors raised while rendering a single page.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    #[error("page {page} out of range (page_count={page_count})")]
    PageOutOfRange { page: u32, page_count: u32 },
    #[error("surface {width}x{height} exceeds the pixel budget")]
    SurfaceTooLarge { width: u32, height: u32 },
    #[error("render backend error: {0}")]
    Backend(String),
}
