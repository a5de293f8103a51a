//! Render scheduler for exact documents.
//!
//! Pages are rendered independently on the Tokio runtime. A full pass staggers
//! its submissions and a semaphore caps how many renders reach the decode
//! backend at once. Results arrive in any order; stale ones (older scale
//! generation, cancelled document, superseded request) are dropped on arrival.

use crate::cancel::CancellationToken;
use crate::config::SchedulerConfig;
use crate::surface::{PageSurface, SurfaceArena};
use docview_decode::{ExactDecoder, ExactDocument, PageHandle, RenderError, RgbaImage};
use log::{debug, warn};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinSet};

/// Render scheduler statistics for the current document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchedulerStats {
    /// Render requests accepted.
    pub submitted: u64,
    /// Results drawn onto a page surface.
    pub applied: u64,
    /// Results dropped as stale or cancelled.
    pub discarded: u64,
    /// Renders that failed in the backend.
    pub failed: u64,
    /// Requests not yet finished.
    pub in_flight: u64,
}

struct State {
    surfaces: SurfaceArena,
    stats: SchedulerStats,
}

/// State shared with the render tasks of one document.
struct Shared {
    state: Mutex<State>,
    generation: AtomicU64,
}

impl Shared {
    fn new(page_count: u32) -> Self {
        Self {
            state: Mutex::new(State {
                surfaces: SurfaceArena::with_pages(page_count),
                stats: SchedulerStats::default(),
            }),
            generation: AtomicU64::new(0),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn current_generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    fn is_stale(&self, generation: u64, token: &CancellationToken) -> bool {
        token.is_cancelled() || generation != self.current_generation()
    }

    fn finish(&self, request: Request, token: &CancellationToken, outcome: Option<Result<RgbaImage, RenderError>>) {
        let mut state = self.lock();
        state.stats.in_flight = state.stats.in_flight.saturating_sub(1);

        let outcome = match outcome {
            Some(outcome) if !self.is_stale(request.generation, token) => outcome,
            _ => {
                debug!(
                    "Discarding render of page {} at scale {} (generation {})",
                    request.page, request.scale, request.generation
                );
                state.stats.discarded += 1;
                return;
            }
        };

        match outcome {
            Ok(image) => {
                if state.surfaces.draw(request.page, request.ticket, image, request.scale, request.generation) {
                    debug!("Rendered page {} at scale {}", request.page, request.scale);
                    state.stats.applied += 1;
                } else {
                    debug!("Discarding superseded render of page {}", request.page);
                    state.stats.discarded += 1;
                }
            }
            Err(error) => {
                warn!("Failed to render page {} at scale {}: {error}", request.page, request.scale);
                state.stats.failed += 1;
                state.surfaces.fail(request.page, request.ticket, error);
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Request {
    page: u32,
    scale: f32,
    generation: u64,
    ticket: u64,
}

/// Schedules page renders of one exact document at a time.
///
/// Submitting work spawns Tokio tasks, so the scheduler must be driven from
/// within a runtime.
pub struct RenderScheduler<D: ExactDecoder> {
    decoder: Arc<D>,
    config: SchedulerConfig,
    permits: Arc<Semaphore>,
    document: Option<Arc<ExactDocument>>,
    shared: Arc<Shared>,
    token: CancellationToken,
    tasks: JoinSet<()>,
    scale: Option<f32>,
}

impl<D: ExactDecoder> RenderScheduler<D> {
    pub fn new(decoder: Arc<D>, config: SchedulerConfig) -> Self {
        Self {
            decoder,
            permits: Arc::new(Semaphore::new(config.max_in_flight.max(1))),
            config,
            document: None,
            shared: Arc::new(Shared::new(0)),
            token: CancellationToken::new(),
            tasks: JoinSet::new(),
            scale: None,
        }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Switch to `document`, cancelling everything scheduled for the previous one.
    pub fn attach(&mut self, document: Arc<ExactDocument>) {
        self.detach();
        self.shared = Arc::new(Shared::new(document.page_count()));
        self.document = Some(document);
    }

    /// Cancel outstanding work and drop the document.
    pub fn close(&mut self) {
        self.detach();
        self.shared = Arc::new(Shared::new(0));
        self.document = None;
    }

    pub fn document(&self) -> Option<&Arc<ExactDocument>> {
        self.document.as_ref()
    }

    /// Render one page at `scale`. A scale different from the last one starts
    /// a new generation, making every older request stale.
    pub fn schedule(&mut self, page: u32, scale: f32) -> Result<(), RenderError> {
        let (document, handle) = self.resolve(page)?;
        if self.scale != Some(scale) {
            self.begin_generation(scale);
        }
        self.submit(document, handle, scale, Duration::ZERO);
        Ok(())
    }

    /// Render every page at `scale` as a new generation, page `n` starting
    /// `(n - 1) * stagger` from now.
    pub fn render_all(&mut self, scale: f32) {
        let Some(document) = self.document.clone() else {
            return;
        };
        self.begin_generation(scale);

        for (position, size) in document.page_sizes().iter().enumerate() {
            let position = position as u32;
            let handle = PageHandle { number: position + 1, size: *size };
            let delay = self.config.stagger_for(position);
            self.submit(Arc::clone(&document), handle, scale, delay);
        }
    }

    /// Wait until every submitted render has finished or been discarded.
    pub async fn wait_idle(&mut self) {
        while let Some(joined) = self.tasks.join_next().await {
            log_join_error(joined);
        }
    }

    /// Render tasks spawned for the current document and not yet reaped.
    pub fn tracked_tasks(&self) -> usize {
        self.tasks.len()
    }

    pub fn generation(&self) -> u64 {
        self.shared.current_generation()
    }

    /// Scale of the current generation, if any render was requested.
    pub fn scale(&self) -> Option<f32> {
        self.scale
    }

    pub fn page_count(&self) -> u32 {
        self.document.as_ref().map_or(0, |document| document.page_count())
    }

    pub fn surface(&self, page: u32) -> Option<PageSurface> {
        self.shared.lock().surfaces.surface(page).cloned()
    }

    /// Snapshot of every page surface, in page order.
    pub fn surfaces(&self) -> Vec<PageSurface> {
        self.shared.lock().surfaces.surfaces().cloned().collect()
    }

    pub fn last_error(&self, page: u32) -> Option<RenderError> {
        self.shared.lock().surfaces.last_error(page).cloned()
    }

    pub fn stats(&self) -> SchedulerStats {
        self.shared.lock().stats
    }

    fn resolve(&self, page: u32) -> Result<(Arc<ExactDocument>, PageHandle), RenderError> {
        let Some(document) = &self.document else {
            return Err(RenderError::PageOutOfRange { page, page_count: 0 });
        };
        let handle = document.page(page)?;
        Ok((Arc::clone(document), handle))
    }

    fn begin_generation(&mut self, scale: f32) {
        let generation = self.shared.generation.fetch_add(1, Ordering::AcqRel) + 1;
        self.scale = Some(scale);
        debug!("Starting render generation {generation} at scale {scale}");
    }

    fn detach(&mut self) {
        self.token.cancel();
        self.token = CancellationToken::new();
        // Detached tasks observe the cancelled token and update only the old shared state.
        self.tasks.detach_all();
        self.scale = None;
    }

    fn submit(&mut self, document: Arc<ExactDocument>, handle: PageHandle, scale: f32, delay: Duration) {
        let generation = self.shared.current_generation();
        let ticket = {
            let mut state = self.shared.lock();
            let Some(ticket) = state.surfaces.issue_ticket(handle.number) else {
                return;
            };
            state.stats.submitted += 1;
            state.stats.in_flight += 1;
            ticket
        };

        while let Some(joined) = self.tasks.try_join_next() {
            log_join_error(joined);
        }

        let request = Request { page: handle.number, scale, generation, ticket };
        let decoder = Arc::clone(&self.decoder);
        let permits = Arc::clone(&self.permits);
        let shared = Arc::clone(&self.shared);
        let token = self.token.clone();

        self.tasks.spawn(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            let outcome = if shared.is_stale(generation, &token) {
                None
            } else {
                match permits.acquire().await {
                    Ok(_permit) if !shared.is_stale(generation, &token) => {
                        Some(decoder.render_page(&document, handle, scale).await)
                    }
                    _ => None,
                }
            };
            shared.finish(request, &token, outcome);
        });
    }
}

fn log_join_error(joined: Result<(), JoinError>) {
    if let Err(error) = joined {
        if error.is_panic() {
            warn!("Render task panicked: {error}");
        }
    }
}

impl<D: ExactDecoder> Drop for RenderScheduler<D> {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
