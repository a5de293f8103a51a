//! docview core: open a PDF or DOCX file and drive everything a viewer shows.
//!
//! A [`DocumentSession`] detects the file format, decodes it with an injected
//! decoder, builds the page index, schedules page renders and applies the
//! viewport's zoom and navigation commands. Problems the user should see are
//! queued as [`Notice`]s; none of them ends the session.
//!
//! ```no_run
//! use docview_core::{DocumentSession, ViewerConfig};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let mut session = DocumentSession::new(ViewerConfig::from_env()?);
//! session.open_path("report.pdf").await?;
//! session.settle().await;
//!
//! session.select_page(3);
//! session.zoom_in();
//! println!("page {} of {} at {}", session.current_page(), session.page_count(), session.zoom_label());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod format;
pub mod notice;
pub mod session;
pub mod source;

pub use config::{ConfigError, ViewerConfig};
pub use error::{ViewerError, ViewerResult, UNSUPPORTED_FORMAT_MESSAGE};
pub use format::{detect_format, DOCX_MIME, PDF_MIME};
pub use notice::{Notice, NoticeBoard, NoticeId, NoticeLevel};
pub use session::{DocumentSession, Stage};
pub use source::{mime_for_path, SourceFile};

pub use docview_decode::DocumentFormat;
pub use docview_scheduler::PageSurface;
pub use docview_viewer_core::{PageListEntry, ScrollBehavior, ScrollRequest, ViewportState, Zoom};
