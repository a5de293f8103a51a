//! Viewer core: pagination, zoom and viewport state.
//!
//! Everything here is synchronous and free of I/O; the document session
//! drives it and carries out the effects it returns.

pub mod pagination;
pub mod viewport;
pub mod zoom;

pub use pagination::{
    rendered_height, PageDescriptor, PageIndex, PaginationMode, PaginationSettings,
    DEFAULT_SLICE_HEIGHT,
};
pub use viewport::{
    PageListEntry, ScrollBehavior, ScrollRequest, ViewportCommand, ViewportController,
    ViewportEffect, ViewportState,
};
pub use zoom::{Zoom, MAX_SCALE, MIN_SCALE, ZOOM_STEP};
