use crate::{DecodeError, RenderError, RgbaImage};
use std::future::Future;
use std::sync::Arc;

/// Native page size in points. One point maps to one pixel at scale 1.0.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PageSize {
    pub width_pt: f32,
    pub height_pt: f32,
}

impl PageSize {
    /// US Letter, used when a page carries no usable media box.
    pub const LETTER: PageSize = PageSize { width_pt: 612.0, height_pt: 792.0 };

    /// Pixel dimensions of this page rendered at `scale`.
    pub fn scaled(self, scale: f32) -> (u32, u32) {
        let scale = if scale.is_finite() && scale > 0.0 { scale } else { 1.0 };
        let width = (self.width_pt * scale).round().max(1.0) as u32;
        let height = (self.height_pt * scale).round().max(1.0) as u32;
        (width, height)
    }

    /// Same page turned by a quarter turn.
    pub fn rotated(self) -> Self {
        Self { width_pt: self.height_pt, height_pt: self.width_pt }
    }
}

/// A single addressable page of an [`ExactDocument`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageHandle {
    /// 1-based page number.
    pub number: u32,
    pub size: PageSize,
}

/// Decoded page-addressable document.
///
/// The source bytes are kept read-only and shared with every render task.
#[derive(Debug, Clone)]
pub struct ExactDocument {
    bytes: Arc<[u8]>,
    pages: Vec<PageSize>,
}

impl ExactDocument {
    pub fn new(bytes: Arc<[u8]>, pages: Vec<PageSize>) -> Self {
        Self { bytes, pages }
    }

    pub fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    /// Look up page `number` (1-based).
    pub fn page(&self, number: u32) -> Result<PageHandle, RenderError> {
        number
            .checked_sub(1)
            .and_then(|index| self.pages.get(index as usize))
            .map(|size| PageHandle { number, size: *size })
            .ok_or(RenderError::PageOutOfRange { page: number, page_count: self.page_count() })
    }

    pub fn page_sizes(&self) -> &[PageSize] {
        &self.pages
    }

    pub fn bytes(&self) -> &Arc<[u8]> {
        &self.bytes
    }
}

/// Decoder for formats with native page boundaries.
///
/// Pages are independent: rendering page N only needs the document and the
/// scale, so calls may run in any order and interleave freely.
pub trait ExactDecoder: Send + Sync + 'static {
    /// Parse `bytes` into a document.
    fn open(
        &self,
        bytes: Arc<[u8]>,
    ) -> impl Future<Output = Result<ExactDocument, DecodeError>> + Send;

    /// Render `page` of `document` at `scale`.
    fn render_page(
        &self,
        document: &ExactDocument,
        page: PageHandle,
        scale: f32,
    ) -> impl Future<Output = Result<RgbaImage, RenderError>> + Send;
}
