//! Document session: one open document and everything the viewer shows for it.
//!
//! Opening a file runs a typed pipeline:
//!
//! ```text
//! Loaded -> Decoded -> Paginated -> Rendered
//! ```
//!
//! Exact documents are decoded, paginated from their native page sizes and
//! rendered page by page through the [`RenderScheduler`]. Flow documents are
//! laid out once into a single surface and sliced into synthetic pages.

use crate::config::ViewerConfig;
use crate::error::{ViewerError, ViewerResult};
use crate::format::detect_format;
use crate::notice::{Notice, NoticeBoard};
use crate::source::SourceFile;
use docview_decode::{
    DecodeError, DocumentFormat, DocxDecoder, ExactDecoder, ExactDocument, FlowDecoder, FlowSurface,
    LopdfDecoder, RenderError,
};
use docview_scheduler::{render_flow, PageSurface, RenderScheduler, SchedulerStats};
use docview_viewer_core::{
    PageIndex, PageListEntry, ScrollRequest, ViewportCommand, ViewportController, ViewportEffect,
    ViewportState, Zoom,
};
use log::{error, info, warn};
use std::path::Path;
use std::sync::Arc;

/// Where the open document is in its load pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// No document; the upload screen.
    Idle,
    /// Bytes are in memory, decoding has not finished.
    Loaded,
    Decoded,
    /// Page index built; page renders may still be outstanding.
    Paginated,
    /// Every requested render has finished.
    Rendered,
    /// Decoding failed; the document is shown as empty.
    Failed,
}

enum Content {
    Pending,
    Exact(Arc<ExactDocument>),
    Flow(FlowSurface),
    Empty,
}

struct OpenDocument {
    name: String,
    format: DocumentFormat,
    content: Content,
}

/// A viewer session over at most one document at a time.
pub struct DocumentSession<E: ExactDecoder = LopdfDecoder, F: FlowDecoder = DocxDecoder> {
    config: ViewerConfig,
    exact_decoder: Arc<E>,
    flow_decoder: F,
    scheduler: RenderScheduler<E>,
    viewport: ViewportController,
    notices: NoticeBoard,
    document: Option<OpenDocument>,
    stage: Stage,
    flow_scale: f32,
    scroll_request: Option<ScrollRequest>,
}

impl DocumentSession {
    /// Session with the default PDF and DOCX decoders.
    pub fn new(config: ViewerConfig) -> Self {
        let exact = LopdfDecoder::new(config.decoder_options());
        let flow = DocxDecoder::new(config.flow_layout);
        Self::with_decoders(config, exact, flow)
    }
}

impl Default for DocumentSession {
    fn default() -> Self {
        Self::new(ViewerConfig::default())
    }
}

impl<E: ExactDecoder, F: FlowDecoder> DocumentSession<E, F> {
    pub fn with_decoders(config: ViewerConfig, exact: E, flow: F) -> Self {
        let exact = Arc::new(exact);
        Self {
            scheduler: RenderScheduler::new(Arc::clone(&exact), config.scheduler_config()),
            exact_decoder: exact,
            viewport: ViewportController::new(config.pagination_settings()),
            flow_decoder: flow,
            notices: NoticeBoard::default(),
            document: None,
            stage: Stage::Idle,
            flow_scale: 1.0,
            scroll_request: None,
            config,
        }
    }

    /// Read a file from disk and open it.
    pub async fn open_path(&mut self, path: impl AsRef<Path>) -> ViewerResult<()> {
        let source = match SourceFile::load(path).await {
            Ok(source) => source,
            Err(err) => {
                warn!("{err}");
                self.notices.error(err.to_string());
                return Err(err);
            }
        };
        self.open(source).await
    }

    /// Open `source`, replacing the current document.
    ///
    /// An unsupported file leaves the session untouched. A file that fails to
    /// decode is shown as an empty document. Both cases queue a notice and
    /// return the error.
    pub async fn open(&mut self, source: SourceFile) -> ViewerResult<()> {
        let Some(format) = detect_format(source.name(), source.mime()) else {
            let err = ViewerError::UnsupportedFormat {
                name: source.name().to_string(),
                mime: source.mime().map(str::to_owned),
            };
            warn!("Rejected {} (mime {:?})", source.name(), source.mime());
            self.notices.error(err.to_string());
            return Err(err);
        };

        self.reset();
        info!("Opening {} ({} bytes) as {:?}", source.name(), source.len(), format);
        self.document =
            Some(OpenDocument { name: source.name().to_string(), format, content: Content::Pending });
        self.stage = Stage::Loaded;

        let result = match format {
            DocumentFormat::Exact => self.open_exact(Arc::clone(source.bytes())).await,
            DocumentFormat::Flow => self.open_flow(Arc::clone(source.bytes())).await,
        };

        result.map_err(|err| self.fail(format, err))
    }

    async fn open_exact(&mut self, bytes: Arc<[u8]>) -> Result<(), DecodeError> {
        let document = Arc::new(self.exact_decoder.open(bytes).await?);
        self.stage = Stage::Decoded;
        info!("Decoded {} page(s)", document.page_count());

        let heights = document.page_sizes().iter().map(|size| size.height_pt).collect();
        self.scheduler.attach(Arc::clone(&document));
        self.set_content(Content::Exact(document));

        let effects = self.viewport.load_exact(heights);
        self.stage = Stage::Paginated;
        self.run_effects(effects);
        Ok(())
    }

    async fn open_flow(&mut self, bytes: Arc<[u8]>) -> Result<(), DecodeError> {
        let width = self.config.flow_layout.content_width;
        let surface = render_flow(&self.flow_decoder, bytes, width).await?;
        self.stage = Stage::Decoded;

        let effects = self.viewport.load_flow(surface.extent());
        info!("Laid out {}px of content as {} page(s)", surface.extent(), self.viewport.page_count());
        self.set_content(Content::Flow(surface));
        self.stage = Stage::Paginated;
        self.run_effects(effects);
        // The single flow render already happened during decoding.
        self.stage = Stage::Rendered;
        Ok(())
    }

    fn fail(&mut self, format: DocumentFormat, err: DecodeError) -> ViewerError {
        error!("Failed to decode document: {err}");
        let message = match format {
            DocumentFormat::Exact => "Error loading PDF. Please try again.",
            DocumentFormat::Flow => "Error loading DOCX. Please try again.",
        };
        self.notices.error(message);

        self.scheduler.close();
        self.viewport.load_empty();
        self.set_content(Content::Empty);
        self.stage = Stage::Failed;
        ViewerError::Decode(err)
    }

    /// Wait for every outstanding page render.
    pub async fn settle(&mut self) {
        self.scheduler.wait_idle().await;
        if self.stage == Stage::Paginated {
            self.stage = Stage::Rendered;
        }
    }

    pub fn zoom_in(&mut self) {
        self.apply(ViewportCommand::ZoomIn);
    }

    pub fn zoom_out(&mut self) {
        self.apply(ViewportCommand::ZoomOut);
    }

    pub fn reset_zoom(&mut self) {
        self.apply(ViewportCommand::ResetZoom);
    }

    /// Jump to a 1-based page; out-of-range pages are ignored.
    pub fn select_page(&mut self, page: u32) {
        self.apply(ViewportCommand::SelectPage(page));
    }

    /// Report the scroll container's current offset.
    pub fn on_scroll(&mut self, offset: f32) {
        self.apply(ViewportCommand::Scroll(offset));
    }

    pub fn apply(&mut self, command: ViewportCommand) {
        let effects = self.viewport.apply(command);
        self.run_effects(effects);
    }

    /// Drop the document and return to the upload screen.
    pub fn close(&mut self) {
        if let Some(document) = &self.document {
            info!("Closing {}", document.name);
        }
        self.reset();
    }

    fn reset(&mut self) {
        self.scheduler.close();
        self.viewport = ViewportController::new(self.config.pagination_settings());
        self.document = None;
        self.stage = Stage::Idle;
        self.flow_scale = 1.0;
        self.scroll_request = None;
    }

    fn run_effects(&mut self, effects: Vec<ViewportEffect>) {
        for effect in effects {
            match effect {
                ViewportEffect::RenderAll { scale } => {
                    self.scheduler.render_all(scale);
                    if self.stage == Stage::Rendered {
                        self.stage = Stage::Paginated;
                    }
                }
                ViewportEffect::ApplyTransform { scale } => self.flow_scale = scale,
                ViewportEffect::ScrollTo(request) => self.scroll_request = Some(request),
            }
        }
    }

    fn set_content(&mut self, content: Content) {
        if let Some(document) = &mut self.document {
            document.content = content;
        }
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// True while a document is being read and decoded.
    pub fn is_loading(&self) -> bool {
        matches!(self.stage, Stage::Loaded | Stage::Decoded)
    }

    pub fn has_document(&self) -> bool {
        self.document.is_some()
    }

    pub fn format(&self) -> Option<DocumentFormat> {
        self.document.as_ref().map(|document| document.format)
    }

    pub fn file_name(&self) -> Option<&str> {
        self.document.as_ref().map(|document| document.name.as_str())
    }

    pub fn page_count(&self) -> u32 {
        self.viewport.page_count()
    }

    pub fn current_page(&self) -> u32 {
        self.viewport.current_page()
    }

    pub fn page_index(&self) -> &PageIndex {
        self.viewport.index()
    }

    pub fn page_list(&self) -> Vec<PageListEntry> {
        self.viewport.page_list()
    }

    pub fn viewport_state(&self) -> ViewportState {
        self.viewport.state()
    }

    pub fn zoom(&self) -> Zoom {
        self.viewport.zoom()
    }

    pub fn zoom_label(&self) -> String {
        self.viewport.zoom().label()
    }

    pub fn can_zoom_in(&self) -> bool {
        self.viewport.zoom().can_zoom_in()
    }

    pub fn can_zoom_out(&self) -> bool {
        self.viewport.zoom().can_zoom_out()
    }

    /// The exact document, once decoded.
    pub fn exact_document(&self) -> Option<&Arc<ExactDocument>> {
        match &self.document.as_ref()?.content {
            Content::Exact(document) => Some(document),
            _ => None,
        }
    }

    /// The laid-out flow surface, once decoded.
    pub fn flow_surface(&self) -> Option<&FlowSurface> {
        match &self.document.as_ref()?.content {
            Content::Flow(surface) => Some(surface),
            _ => None,
        }
    }

    /// Uniform scale to draw the flow surface with; `None` for exact documents.
    pub fn flow_scale(&self) -> Option<f32> {
        self.flow_surface().map(|_| self.flow_scale)
    }

    pub fn page_surface(&self, page: u32) -> Option<PageSurface> {
        self.scheduler.surface(page)
    }

    /// Exact page surfaces in page order.
    pub fn page_surfaces(&self) -> Vec<PageSurface> {
        self.scheduler.surfaces()
    }

    pub fn render_error(&self, page: u32) -> Option<RenderError> {
        self.scheduler.last_error(page)
    }

    pub fn render_stats(&self) -> SchedulerStats {
        self.scheduler.stats()
    }

    /// Most recent scroll the presentation layer has been asked to perform.
    pub fn scroll_request(&self) -> Option<ScrollRequest> {
        self.scroll_request
    }

    pub fn take_scroll_request(&mut self) -> Option<ScrollRequest> {
        self.scroll_request.take()
    }

    pub fn notices(&self) -> impl Iterator<Item = &Notice> {
        self.notices.iter()
    }

    pub fn drain_notices(&mut self) -> Vec<Notice> {
        self.notices.drain()
    }
}
