//! Page index: page count, per-page geometry and scroll offset mapping.
//!
//! Exact documents get one descriptor per native page, laid out top to bottom
//! at the current scale. Flow documents are sliced into fixed-height synthetic
//! pages; those breaks are a heuristic and may fall mid-line.

use serde::{Deserialize, Serialize};

/// Default height of one synthetic flow page.
pub const DEFAULT_SLICE_HEIGHT: f32 = 1200.0;

/// Smallest height an exact page may occupy, keeping offsets strictly increasing.
const MIN_PAGE_HEIGHT: f32 = 1.0;

/// Layout parameters for building a [`PageIndex`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PaginationSettings {
    /// Height of one synthetic page in flow mode.
    pub slice_height: f32,
    /// Vertical space between exact pages, at scale 1.0.
    pub page_gap: f32,
}

impl Default for PaginationSettings {
    fn default() -> Self {
        Self { slice_height: DEFAULT_SLICE_HEIGHT, page_gap: 0.0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PaginationMode {
    /// Native page boundaries.
    Exact,
    /// Fixed-height slices of one continuous surface.
    Flow { slice_height: f32 },
}

/// Maps a page number to its scroll offset and height.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageDescriptor {
    /// 1-based page number.
    pub index: u32,
    /// Distance from the document start, in pixels.
    pub offset: f32,
    pub height: f32,
}

/// Pixel height of a page of `base_height` points drawn at `scale`.
pub fn rendered_height(base_height: f32, scale: f32) -> f32 {
    let height = (base_height * scale).round();
    if height.is_finite() {
        height.max(MIN_PAGE_HEIGHT)
    } else {
        MIN_PAGE_HEIGHT
    }
}

/// Ordered page descriptors for one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageIndex {
    mode: PaginationMode,
    descriptors: Vec<PageDescriptor>,
}

impl PageIndex {
    /// Index with no pages, used while loading and after a failed decode.
    pub fn empty() -> Self {
        Self { mode: PaginationMode::Exact, descriptors: Vec::new() }
    }

    /// One descriptor per native page; `base_heights` are unscaled page heights.
    ///
    /// Each page occupies its rendered pixel height: the scaled height rounded
    /// to whole pixels, never less than one.
    pub fn exact(base_heights: &[f32], scale: f32, page_gap: f32) -> Self {
        let gap = if page_gap.is_finite() { page_gap.max(0.0) * scale } else { 0.0 };
        let mut cursor = 0.0;
        let mut descriptors = Vec::with_capacity(base_heights.len());

        for (index, base_height) in base_heights.iter().enumerate() {
            let height = rendered_height(*base_height, scale);
            descriptors.push(PageDescriptor { index: index as u32 + 1, offset: cursor, height });
            cursor += height + gap;
        }

        Self { mode: PaginationMode::Exact, descriptors }
    }

    /// Slices a continuous surface of height `extent` into pages of `slice_height`.
    ///
    /// `page_count = ceil(extent / slice_height)`; the last page holds the remainder.
    pub fn flow(extent: f32, slice_height: f32) -> Self {
        let mode = PaginationMode::Flow { slice_height };
        if !(extent > 0.0) || !(slice_height > 0.0) || !extent.is_finite() {
            return Self { mode, descriptors: Vec::new() };
        }

        let count = (extent / slice_height).ceil() as u32;
        let descriptors = (0..count)
            .map(|i| {
                let offset = i as f32 * slice_height;
                PageDescriptor { index: i + 1, offset, height: slice_height.min(extent - offset) }
            })
            .collect();

        Self { mode, descriptors }
    }

    pub fn mode(&self) -> PaginationMode {
        self.mode
    }

    pub fn page_count(&self) -> u32 {
        self.descriptors.len() as u32
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    pub fn descriptors(&self) -> &[PageDescriptor] {
        &self.descriptors
    }

    pub fn get(&self, page: u32) -> Option<&PageDescriptor> {
        page.checked_sub(1).and_then(|i| self.descriptors.get(i as usize))
    }

    /// Height of the whole paginated content.
    pub fn total_extent(&self) -> f32 {
        self.descriptors.last().map_or(0.0, |last| last.offset + last.height)
    }

    /// Page shown at `scroll`, clamped to `[1, page_count]`.
    ///
    /// Returns `None` only for an empty index.
    pub fn resolve_page(&self, scroll: f32) -> Option<u32> {
        if self.descriptors.is_empty() {
            return None;
        }

        let scroll = scroll.max(0.0);
        let page = match self.mode {
            PaginationMode::Exact => {
                self.descriptors.partition_point(|page| page.offset <= scroll) as u32
            }
            PaginationMode::Flow { slice_height } => {
                ((scroll / slice_height).floor() as u32).saturating_add(1)
            }
        };

        Some(page.clamp(1, self.page_count()))
    }

    /// Scroll offset that brings `page` to the top; inverse of [`Self::resolve_page`].
    pub fn scroll_target_for(&self, page: u32) -> Option<f32> {
        self.get(page).map(|descriptor| descriptor.offset)
    }
}

impl Default for PageIndex {
    fn default() -> Self {
        Self::empty()
    }
}
