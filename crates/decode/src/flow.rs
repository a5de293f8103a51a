use crate::DecodeError;
use std::future::Future;
use std::sync::Arc;

/// Kind of a laid-out block on a [`FlowSurface`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum BlockKind {
    Paragraph,
    /// Heading level, 0 for a document title.
    Heading(u8),
    TableRow,
}

/// One block of reflowed content, positioned on the continuous surface.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FlowBlock {
    pub kind: BlockKind,
    /// Distance from the top of the surface.
    pub top: f32,
    pub height: f32,
    pub font_px: f32,
    pub lines: Vec<String>,
}

/// The single continuous surface a [`FlowDecoder`] renders into.
///
/// The surface is laid out once at a fixed content width; zooming is applied
/// by the presentation layer as a uniform transform.
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct FlowSurface {
    width: f32,
    blocks: Vec<FlowBlock>,
    extent: f32,
}

impl FlowSurface {
    pub fn new(width: f32) -> Self {
        Self { width, blocks: Vec::new(), extent: 0.0 }
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    /// Total rendered height of the content.
    pub fn extent(&self) -> f32 {
        self.extent
    }

    pub fn blocks(&self) -> &[FlowBlock] {
        &self.blocks
    }

    /// Replace the surface contents with freshly laid-out blocks.
    pub fn fill(&mut self, blocks: Vec<FlowBlock>, extent: f32) {
        self.blocks = blocks;
        self.extent = extent.max(0.0);
    }

    pub fn clear(&mut self) {
        self.blocks.clear();
        self.extent = 0.0;
    }
}

/// Layout parameters for flow rendering.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct FlowLayout {
    /// Width available to text, in pixels.
    pub content_width: f32,
    /// Blank space above the first and below the last block.
    pub margin: f32,
    pub base_font_pt: f32,
    /// Line height as a multiple of the font size.
    pub line_spacing: f32,
    /// Space after each paragraph, in points.
    pub paragraph_spacing_pt: f32,
    /// Average glyph advance as a fraction of the font size.
    pub average_glyph_em: f32,
}

impl Default for FlowLayout {
    fn default() -> Self {
        Self {
            content_width: 624.0,
            margin: 96.0,
            base_font_pt: 11.0,
            line_spacing: 1.15,
            paragraph_spacing_pt: 8.0,
            average_glyph_em: 0.5,
        }
    }
}

impl FlowLayout {
    pub fn with_content_width(mut self, width: f32) -> Self {
        self.content_width = width;
        self
    }

    pub fn with_margin(mut self, margin: f32) -> Self {
        self.margin = margin;
        self
    }

    /// Number of glyphs that fit on one line at `font_px`.
    pub fn columns(&self, font_px: f32) -> usize {
        let advance = font_px * self.average_glyph_em;
        if !(advance > 0.0) || !(self.content_width > 0.0) {
            return 1;
        }
        ((self.content_width / advance).floor() as usize).max(1)
    }
}

/// Decoder for reflowed formats.
///
/// There is no native page count; callers derive pages from
/// [`FlowSurface::extent`] after rendering.
pub trait FlowDecoder: Send + Sync + 'static {
    /// Lay out the whole document into `target`.
    fn render_all(
        &self,
        bytes: Arc<[u8]>,
        target: &mut FlowSurface,
    ) -> impl Future<Output = Result<(), DecodeError>> + Send;
}
