//! Page surfaces, one slot per page, indexed by page number.

use docview_decode::{RenderError, RgbaImage};
use std::sync::Arc;

/// What is currently drawn on a page.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum PageSurface {
    #[default]
    Blank,
    Drawn {
        image: Arc<RgbaImage>,
        scale: f32,
        generation: u64,
    },
}

impl PageSurface {
    pub fn is_blank(&self) -> bool {
        matches!(self, PageSurface::Blank)
    }

    /// Scale of the drawn image, if any.
    pub fn scale(&self) -> Option<f32> {
        match self {
            PageSurface::Blank => None,
            PageSurface::Drawn { scale, .. } => Some(*scale),
        }
    }

    pub fn image(&self) -> Option<&Arc<RgbaImage>> {
        match self {
            PageSurface::Blank => None,
            PageSurface::Drawn { image, .. } => Some(image),
        }
    }
}

#[derive(Debug, Clone, Default)]
struct Slot {
    surface: PageSurface,
    last_error: Option<RenderError>,
    /// Ticket of the most recent request for this page.
    latest_ticket: u64,
}

/// Arena of page surfaces.
///
/// Each request for a page takes a ticket; a completion is only applied when
/// its ticket is still the latest one for that page.
#[derive(Debug, Clone, Default)]
pub struct SurfaceArena {
    slots: Vec<Slot>,
}

impl SurfaceArena {
    pub fn with_pages(page_count: u32) -> Self {
        Self { slots: vec![Slot::default(); page_count as usize] }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn surface(&self, page: u32) -> Option<&PageSurface> {
        self.slot(page).map(|slot| &slot.surface)
    }

    pub fn last_error(&self, page: u32) -> Option<&RenderError> {
        self.slot(page).and_then(|slot| slot.last_error.as_ref())
    }

    /// Surfaces in page order.
    pub fn surfaces(&self) -> impl Iterator<Item = &PageSurface> {
        self.slots.iter().map(|slot| &slot.surface)
    }

    /// Issue a new ticket for `page`, superseding any earlier request.
    pub fn issue_ticket(&mut self, page: u32) -> Option<u64> {
        let slot = self.slot_mut(page)?;
        slot.latest_ticket += 1;
        Some(slot.latest_ticket)
    }

    /// Draw a finished render. Returns `false` when a newer request superseded it.
    pub fn draw(&mut self, page: u32, ticket: u64, image: RgbaImage, scale: f32, generation: u64) -> bool {
        let Some(slot) = self.current_slot(page, ticket) else {
            return false;
        };
        slot.surface = PageSurface::Drawn { image: Arc::new(image), scale, generation };
        slot.last_error = None;
        true
    }

    /// Record a failed render. The page is left blank.
    pub fn fail(&mut self, page: u32, ticket: u64, error: RenderError) -> bool {
        let Some(slot) = self.current_slot(page, ticket) else {
            return false;
        };
        slot.surface = PageSurface::Blank;
        slot.last_error = Some(error);
        true
    }

    fn current_slot(&mut self, page: u32, ticket: u64) -> Option<&mut Slot> {
        self.slot_mut(page).filter(|slot| slot.latest_ticket == ticket)
    }

    fn slot(&self, page: u32) -> Option<&Slot> {
        page.checked_sub(1).and_then(|i| self.slots.get(i as usize))
    }

    fn slot_mut(&mut self, page: u32) -> Option<&mut Slot> {
        page.checked_sub(1).and_then(|i| self.slots.get_mut(i as usize))
    }
}
