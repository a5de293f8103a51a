//! Render scheduling for docview.
//!
//! Exact documents are rendered page by page: a full pass staggers its
//! submissions, a semaphore caps concurrent backend renders, and every result
//! is checked against the current scale generation and the document's
//! cancellation token before it is drawn. Flow documents are rendered once
//! into a single surface.
//!
//! ```no_run
//! use docview_decode::{ExactDecoder, LopdfDecoder};
//! use docview_scheduler::{RenderScheduler, SchedulerConfig};
//! use std::sync::Arc;
//!
//! # async fn demo(bytes: Arc<[u8]>) -> Result<(), Box<dyn std::error::Error>> {
//! let decoder = Arc::new(LopdfDecoder::default());
//! let document = decoder.open(bytes).await?;
//!
//! let mut scheduler = RenderScheduler::new(decoder, SchedulerConfig::default());
//! scheduler.attach(Arc::new(document));
//! scheduler.render_all(1.0);
//! scheduler.wait_idle().await;
//! # Ok(())
//! # }
//! ```

mod cancel;
mod config;
mod flow;
mod scheduler;
mod surface;

pub use cancel::CancellationToken;
pub use config::{SchedulerConfig, DEFAULT_MAX_IN_FLIGHT, DEFAULT_STAGGER};
pub use flow::render_flow;
pub use scheduler::{RenderScheduler, SchedulerStats};
pub use surface::{PageSurface, SurfaceArena};
