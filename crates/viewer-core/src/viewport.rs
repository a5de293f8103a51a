//! Viewport controller: zoom and current page state.
//!
//! User actions come in as [`ViewportCommand`]s; the controller updates its
//! state and returns the [`ViewportEffect`]s the owner has to carry out
//! (re-rendering pages, applying a flow transform, scrolling).

use crate::pagination::{PageIndex, PaginationSettings};
use crate::zoom::Zoom;
use log::debug;
use serde::{Deserialize, Serialize};

/// User-facing viewport state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportState {
    pub zoom: Zoom,
    /// 1-based; stays at 1 while the document has no pages.
    pub current_page: u32,
}

impl Default for ViewportState {
    fn default() -> Self {
        Self { zoom: Zoom::ACTUAL_SIZE, current_page: 1 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScrollBehavior {
    Smooth,
    Instant,
}

/// Request for the presentation layer to move the scroll position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScrollRequest {
    pub offset: f32,
    pub behavior: ScrollBehavior,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewportCommand {
    ZoomIn,
    ZoomOut,
    ResetZoom,
    /// Jump to a 1-based page.
    SelectPage(u32),
    /// The scroll container moved to this offset.
    Scroll(f32),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewportEffect {
    /// Every exact page must be rendered again at `scale`.
    RenderAll { scale: f32 },
    /// The flow surface must be shown with a uniform `scale` transform.
    ApplyTransform { scale: f32 },
    ScrollTo(ScrollRequest),
}

/// Page list entry for navigation affordances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageListEntry {
    pub number: u32,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq)]
enum Geometry {
    Loading,
    Empty,
    Exact { base_heights: Vec<f32> },
    Flow { extent: f32 },
}

#[derive(Debug, Clone)]
pub struct ViewportController {
    state: ViewportState,
    settings: PaginationSettings,
    geometry: Geometry,
    index: PageIndex,
    scroll_offset: f32,
}

impl ViewportController {
    /// Controller in the loading state: scale 1.0, page 1, no pages yet.
    pub fn new(settings: PaginationSettings) -> Self {
        Self {
            state: ViewportState::default(),
            settings,
            geometry: Geometry::Loading,
            index: PageIndex::empty(),
            scroll_offset: 0.0,
        }
    }

    /// Install an exact document given its unscaled page heights.
    pub fn load_exact(&mut self, base_heights: Vec<f32>) -> Vec<ViewportEffect> {
        self.index = PageIndex::exact(&base_heights, self.state.zoom.scale(), self.settings.page_gap);
        self.geometry = Geometry::Exact { base_heights };
        self.reset_position();

        if self.index.is_empty() {
            return Vec::new();
        }
        vec![ViewportEffect::RenderAll { scale: self.state.zoom.scale() }]
    }

    /// Install a flow document given the extent of its rendered surface.
    pub fn load_flow(&mut self, extent: f32) -> Vec<ViewportEffect> {
        self.index = PageIndex::flow(extent, self.settings.slice_height);
        self.geometry = Geometry::Flow { extent };
        self.reset_position();

        vec![ViewportEffect::ApplyTransform { scale: self.state.zoom.scale() }]
    }

    /// Finish loading without any pages (decode failure or empty document).
    pub fn load_empty(&mut self) {
        self.index = PageIndex::empty();
        self.geometry = Geometry::Empty;
        self.reset_position();
    }

    pub fn apply(&mut self, command: ViewportCommand) -> Vec<ViewportEffect> {
        match command {
            ViewportCommand::ZoomIn => self.set_zoom(self.state.zoom.zoomed_in()),
            ViewportCommand::ZoomOut => self.set_zoom(self.state.zoom.zoomed_out()),
            ViewportCommand::ResetZoom => self.set_zoom(Zoom::ACTUAL_SIZE),
            ViewportCommand::SelectPage(page) => self.select_page(page),
            ViewportCommand::Scroll(offset) => {
                self.on_scroll(offset);
                Vec::new()
            }
        }
    }

    pub fn state(&self) -> ViewportState {
        self.state
    }

    pub fn zoom(&self) -> Zoom {
        self.state.zoom
    }

    pub fn current_page(&self) -> u32 {
        self.state.current_page
    }

    pub fn page_count(&self) -> u32 {
        self.index.page_count()
    }

    pub fn index(&self) -> &PageIndex {
        &self.index
    }

    pub fn settings(&self) -> &PaginationSettings {
        &self.settings
    }

    /// Last known scroll offset, either reported or requested.
    pub fn scroll_offset(&self) -> f32 {
        self.scroll_offset
    }

    /// True until a document (or the lack of one) has been installed.
    pub fn is_loading(&self) -> bool {
        self.geometry == Geometry::Loading
    }

    pub fn page_list(&self) -> Vec<PageListEntry> {
        (1..=self.page_count())
            .map(|number| PageListEntry { number, active: number == self.state.current_page })
            .collect()
    }

    fn set_zoom(&mut self, zoom: Zoom) -> Vec<ViewportEffect> {
        if zoom == self.state.zoom {
            return Vec::new();
        }
        self.state.zoom = zoom;
        let scale = zoom.scale();

        match &self.geometry {
            Geometry::Exact { base_heights } => {
                self.index = PageIndex::exact(base_heights, scale, self.settings.page_gap);

                let mut effects = vec![ViewportEffect::RenderAll { scale }];
                // Keep the current page in view under the new page geometry.
                if let Some(offset) = self.index.scroll_target_for(self.state.current_page) {
                    self.scroll_offset = offset;
                    effects.push(ViewportEffect::ScrollTo(ScrollRequest {
                        offset,
                        behavior: ScrollBehavior::Instant,
                    }));
                }
                effects
            }
            Geometry::Flow { .. } => vec![ViewportEffect::ApplyTransform { scale }],
            Geometry::Loading | Geometry::Empty => Vec::new(),
        }
    }

    fn select_page(&mut self, page: u32) -> Vec<ViewportEffect> {
        let Some(offset) = self.index.scroll_target_for(page) else {
            debug!("Ignoring selection of page {page} (page_count={})", self.page_count());
            return Vec::new();
        };

        self.state.current_page = page;
        self.scroll_offset = offset;
        vec![ViewportEffect::ScrollTo(ScrollRequest { offset, behavior: ScrollBehavior::Smooth })]
    }

    fn on_scroll(&mut self, offset: f32) {
        if !offset.is_finite() {
            return;
        }
        self.scroll_offset = offset;
        if let Some(page) = self.index.resolve_page(offset) {
            self.state.current_page = page;
        }
    }

    fn reset_position(&mut self) {
        self.state.current_page = 1;
        self.scroll_offset = 0.0;
    }
}

impl Default for ViewportController {
    fn default() -> Self {
        Self::new(PaginationSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exact_controller(pages: usize) -> ViewportController {
        let mut controller = ViewportController::default();
        controller.load_exact(vec![792.0; pages]);
        controller
    }

    #[test]
    fn starts_in_loading_state() {
        let controller = ViewportController::default();

        assert!(controller.is_loading());
        assert_eq!(controller.page_count(), 0);
        assert_eq!(controller.state(), ViewportState { zoom: Zoom::ACTUAL_SIZE, current_page: 1 });
    }

    #[test]
    fn loading_exact_requests_initial_render() {
        let mut controller = ViewportController::default();

        let effects = controller.load_exact(vec![792.0, 792.0]);

        assert!(!controller.is_loading());
        assert_eq!(effects, vec![ViewportEffect::RenderAll { scale: 1.0 }]);
    }

    #[test]
    fn select_page_scrolls_smoothly_and_updates_immediately() {
        let mut controller = exact_controller(5);

        let effects = controller.apply(ViewportCommand::SelectPage(5));

        assert_eq!(controller.current_page(), 5);
        assert_eq!(
            effects,
            vec![ViewportEffect::ScrollTo(ScrollRequest {
                offset: 4.0 * 792.0,
                behavior: ScrollBehavior::Smooth,
            })]
        );
    }

    #[test]
    fn select_page_out_of_range_is_ignored() {
        let mut controller = exact_controller(3);

        assert!(controller.apply(ViewportCommand::SelectPage(0)).is_empty());
        assert!(controller.apply(ViewportCommand::SelectPage(4)).is_empty());
        assert_eq!(controller.current_page(), 1);
    }

    #[test]
    fn zoom_in_repaginates_and_keeps_current_page_anchored() {
        let mut controller = exact_controller(3);
        controller.apply(ViewportCommand::SelectPage(2));

        let effects = controller.apply(ViewportCommand::ZoomIn);

        assert_eq!(controller.zoom().scale(), 1.25);
        assert_eq!(controller.index().scroll_target_for(2), Some(990.0));
        assert_eq!(
            effects,
            vec![
                ViewportEffect::RenderAll { scale: 1.25 },
                ViewportEffect::ScrollTo(ScrollRequest {
                    offset: 990.0,
                    behavior: ScrollBehavior::Instant,
                }),
            ]
        );
        assert_eq!(controller.index().resolve_page(controller.scroll_offset()), Some(2));
    }

    #[test]
    fn zoom_at_bound_has_no_effects() {
        let mut controller = exact_controller(1);
        for _ in 0..20 {
            controller.apply(ViewportCommand::ZoomOut);
        }

        assert_eq!(controller.zoom(), Zoom::MIN);
        assert!(controller.apply(ViewportCommand::ZoomOut).is_empty());
        assert!(!controller.apply(ViewportCommand::ZoomIn).is_empty());
    }

    #[test]
    fn reset_zoom_returns_to_actual_size() {
        let mut controller = exact_controller(2);
        controller.apply(ViewportCommand::ZoomIn);
        controller.apply(ViewportCommand::ZoomIn);

        let effects = controller.apply(ViewportCommand::ResetZoom);

        assert_eq!(controller.zoom(), Zoom::ACTUAL_SIZE);
        assert_eq!(effects[0], ViewportEffect::RenderAll { scale: 1.0 });
        assert!(controller.apply(ViewportCommand::ResetZoom).is_empty());
    }

    #[test]
    fn flow_zoom_is_a_transform_only() {
        let mut controller = ViewportController::default();
        controller.load_flow(3000.0);
        controller.apply(ViewportCommand::Scroll(1300.0));

        let effects = controller.apply(ViewportCommand::ZoomIn);

        assert_eq!(effects, vec![ViewportEffect::ApplyTransform { scale: 1.25 }]);
        assert_eq!(controller.page_count(), 3);
        assert_eq!(controller.current_page(), 2);
    }

    #[test]
    fn scroll_tracks_current_page() {
        let mut controller = ViewportController::default();
        controller.load_flow(3000.0);

        controller.apply(ViewportCommand::Scroll(2500.0));
        assert_eq!(controller.current_page(), 3);

        controller.apply(ViewportCommand::Scroll(f32::INFINITY));
        assert_eq!(controller.current_page(), 3);

        controller.apply(ViewportCommand::Scroll(0.0));
        assert_eq!(controller.current_page(), 1);
    }

    #[test]
    fn current_page_stays_in_range_for_empty_documents() {
        let mut controller = ViewportController::default();
        controller.load_empty();

        for command in [
            ViewportCommand::SelectPage(3),
            ViewportCommand::Scroll(5000.0),
            ViewportCommand::SelectPage(1),
            ViewportCommand::Scroll(-10.0),
        ] {
            controller.apply(command);
            assert_eq!(controller.current_page(), 1);
        }
        assert!(!controller.is_loading());
        assert!(controller.page_list().is_empty());
    }

    #[test]
    fn current_page_stays_in_range_under_mixed_commands() {
        let mut controller = exact_controller(4);
        let commands = [
            ViewportCommand::Scroll(1e9),
            ViewportCommand::SelectPage(9),
            ViewportCommand::ZoomIn,
            ViewportCommand::Scroll(-1.0),
            ViewportCommand::SelectPage(4),
            ViewportCommand::ZoomOut,
            ViewportCommand::ZoomOut,
            ViewportCommand::Scroll(1000.0),
        ];

        for command in commands {
            controller.apply(command);
            let page = controller.current_page();
            assert!((1..=controller.page_count()).contains(&page), "{command:?} -> {page}");
        }
    }

    #[test]
    fn page_list_marks_active_page() {
        let mut controller = exact_controller(3);
        controller.apply(ViewportCommand::SelectPage(2));

        let active: Vec<u32> =
            controller.page_list().iter().filter(|entry| entry.active).map(|entry| entry.number).collect();
        assert_eq!(active, vec![2]);
        assert_eq!(controller.page_list().len(), 3);
    }
}
