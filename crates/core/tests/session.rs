mod common;

use common::{a4_pdf, config, docx_with_mime, init_logging, letter_pdf, long_docx, pdf_bytes, LETTER};
use docview_core::{
    DocumentFormat, DocumentSession, NoticeLevel, ScrollBehavior, ScrollRequest, SourceFile, Stage,
    ViewerError, PDF_MIME, UNSUPPORTED_FORMAT_MESSAGE,
};
use docview_decode::RenderError;

fn session() -> DocumentSession {
    init_logging();
    DocumentSession::new(config())
}

#[tokio::test]
async fn five_page_pdf_end_to_end() {
    let mut session = session();

    session.open(letter_pdf(5)).await.expect("pdf opens");

    assert_eq!(session.format(), Some(DocumentFormat::Exact));
    assert_eq!(session.page_count(), 5);
    assert_eq!(session.current_page(), 1);
    assert_eq!(session.stage(), Stage::Paginated);
    assert!(!session.is_loading());

    session.settle().await;
    assert_eq!(session.stage(), Stage::Rendered);
    assert!(session.page_surfaces().iter().all(|surface| surface.scale() == Some(1.0)));

    session.select_page(5);
    assert_eq!(session.current_page(), 5);
    assert_eq!(
        session.scroll_request(),
        Some(ScrollRequest { offset: 4.0 * 792.0, behavior: ScrollBehavior::Smooth })
    );
    assert_eq!(session.page_index().scroll_target_for(5), Some(4.0 * 792.0));

    session.zoom_in();
    session.zoom_in();
    assert_eq!(session.zoom().scale(), 1.5);
    assert_eq!(session.zoom_label(), "150%");
    assert_eq!(session.stage(), Stage::Paginated);

    session.settle().await;
    let surfaces = session.page_surfaces();
    assert_eq!(surfaces.len(), 5);
    for surface in &surfaces {
        assert_eq!(surface.scale(), Some(1.5));
        assert_eq!(surface.image().map(|image| image.dimensions()), Some((918, 1188)));
    }

    assert_eq!(session.current_page(), 5);
    assert_eq!(
        session.scroll_request(),
        Some(ScrollRequest { offset: 4.0 * 792.0 * 1.5, behavior: ScrollBehavior::Instant })
    );
}

#[tokio::test]
async fn page_offsets_match_the_rendered_page_stack() {
    let mut session = session();
    session.open(a4_pdf(10)).await.expect("pdf opens");
    session.zoom_in();
    session.settle().await;

    let mut stacked = 0.0;
    for (page, surface) in (1..).zip(session.page_surfaces()) {
        assert_eq!(session.page_index().scroll_target_for(page), Some(stacked));
        let (_, height) = surface.image().map(|image| image.dimensions()).expect("page rendered");
        assert_eq!(session.page_index().get(page).map(|d| d.height), Some(height as f32));
        stacked += height as f32;
    }
    assert_eq!(session.page_index().total_extent(), stacked);
}

#[tokio::test]
async fn page_list_follows_scrolling() {
    let mut session = session();
    session.open(letter_pdf(3)).await.expect("pdf opens");

    session.on_scroll(800.0);

    let active: Vec<u32> =
        session.page_list().iter().filter(|entry| entry.active).map(|entry| entry.number).collect();
    assert_eq!(active, vec![2]);
    assert_eq!(session.viewport_state().current_page, 2);
}

#[tokio::test]
async fn unsupported_file_leaves_session_untouched() {
    let mut session = session();
    session.open(letter_pdf(2)).await.expect("pdf opens");
    session.settle().await;

    let png = SourceFile::new("photo.png", Some("image/png".to_string()), vec![0x89, b'P', b'N', b'G']);
    let err = session.open(png.clone()).await.unwrap_err();
    session.open(png).await.unwrap_err();

    assert!(matches!(err, ViewerError::UnsupportedFormat { ref name, .. } if name == "photo.png"));
    assert_eq!(session.file_name(), Some("letter.pdf"));
    assert_eq!(session.page_count(), 2);
    assert_eq!(session.stage(), Stage::Rendered);

    let notices = session.drain_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Error);
    assert_eq!(notices[0].message, UNSUPPORTED_FORMAT_MESSAGE);
}

#[tokio::test]
async fn corrupt_pdf_is_an_empty_document() {
    let mut session = session();

    let broken = SourceFile::new("broken.pdf", Some(PDF_MIME.to_string()), b"not a pdf at all".to_vec());
    let err = session.open(broken).await.unwrap_err();

    assert!(matches!(err, ViewerError::Decode(_)));
    assert_eq!(session.stage(), Stage::Failed);
    assert!(!session.is_loading());
    assert_eq!(session.page_count(), 0);
    assert_eq!(session.current_page(), 1);
    assert!(session.page_list().is_empty());
    assert!(session.page_surfaces().is_empty());

    session.select_page(1);
    session.on_scroll(500.0);
    assert_eq!(session.current_page(), 1);

    let notices = session.drain_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].message, "Error loading PDF. Please try again.");

    session.open(letter_pdf(1)).await.expect("session recovers");
    assert_eq!(session.page_count(), 1);
}

#[tokio::test]
async fn docx_is_sliced_into_pages_and_zoom_never_rerenders() {
    let mut session = session();

    session.open(long_docx(120)).await.expect("docx opens");

    let extent = session.flow_surface().map(|surface| surface.extent()).expect("flow surface");
    assert_eq!(session.format(), Some(DocumentFormat::Flow));
    assert_eq!(session.stage(), Stage::Rendered);
    assert!(session.page_count() >= 2);
    assert_eq!(session.page_count(), (extent / 1200.0).ceil() as u32);
    assert_eq!(session.flow_scale(), Some(1.0));

    session.zoom_in();
    session.settle().await;

    assert_eq!(session.flow_scale(), Some(1.25));
    assert_eq!(session.flow_surface().map(|surface| surface.extent()), Some(extent));
    assert_eq!(session.page_count(), (extent / 1200.0).ceil() as u32);
    assert_eq!(session.render_stats().submitted, 0);
    assert!(session.page_surfaces().is_empty());

    session.on_scroll(1300.0);
    assert_eq!(session.current_page(), 2);

    session.select_page(1);
    assert_eq!(
        session.scroll_request(),
        Some(ScrollRequest { offset: 0.0, behavior: ScrollBehavior::Smooth })
    );
}

#[tokio::test]
async fn docx_is_recognized_by_mime_type() {
    let mut session = session();

    session.open(docx_with_mime(&["Hello", "World"])).await.expect("docx opens");

    assert_eq!(session.format(), Some(DocumentFormat::Flow));
    assert_eq!(session.page_count(), 1);
}

#[tokio::test]
async fn opening_docx_always_finishes_loading() {
    let mut session = session();

    session.open(long_docx(40)).await.expect("first docx opens");
    session.open(docx_with_mime(&["Replacement"])).await.expect("second docx opens");

    assert_eq!(session.stage(), Stage::Rendered);
    assert!(!session.is_loading());
    assert_eq!(session.file_name(), Some("upload.bin"));
    assert!(session.flow_surface().is_some());
    assert_eq!(session.page_count(), 1);
}

#[tokio::test]
async fn broken_docx_is_an_empty_document() {
    let mut session = session();

    let err = session
        .open(SourceFile::new("broken.docx", None, b"PK but not really".to_vec()))
        .await
        .unwrap_err();

    assert!(matches!(err, ViewerError::Decode(_)));
    assert_eq!(session.page_count(), 0);
    assert!(session.flow_surface().is_none());
    assert_eq!(session.drain_notices()[0].message, "Error loading DOCX. Please try again.");
}

#[tokio::test]
async fn render_failure_leaves_only_that_page_blank() {
    init_logging();
    let mut session = DocumentSession::new(config().with_max_surface_pixels(1_000_000));
    let bytes = pdf_bytes(&[LETTER, (5000, 5000), LETTER]);

    session.open(SourceFile::new("mixed.pdf", Some(PDF_MIME.to_string()), bytes)).await.expect("pdf opens");
    session.settle().await;

    let surfaces = session.page_surfaces();
    assert!(!surfaces[0].is_blank());
    assert!(surfaces[1].is_blank());
    assert!(!surfaces[2].is_blank());
    assert!(matches!(session.render_error(2), Some(RenderError::SurfaceTooLarge { .. })));
    assert_eq!(session.render_stats().failed, 1);
    assert!(session.drain_notices().is_empty());
}

#[tokio::test]
async fn replacing_a_document_cancels_its_renders() {
    let mut session = session();

    session.open(letter_pdf(4)).await.expect("first pdf opens");
    session.open(letter_pdf(2)).await.expect("second pdf opens");
    session.settle().await;

    assert_eq!(session.page_count(), 2);
    assert_eq!(session.page_surfaces().len(), 2);
    assert_eq!(session.render_stats().submitted, 2);
    assert_eq!(session.render_stats().applied, 2);
}

#[tokio::test]
async fn close_returns_to_upload_state() {
    let mut session = session();
    session.open(letter_pdf(2)).await.expect("pdf opens");
    session.zoom_in();

    session.close();

    assert_eq!(session.stage(), Stage::Idle);
    assert!(!session.has_document());
    assert_eq!(session.file_name(), None);
    assert_eq!(session.page_count(), 0);
    assert_eq!(session.zoom().scale(), 1.0);
    assert!(session.scroll_request().is_none());
}

#[tokio::test]
async fn open_path_detects_format_from_extension() {
    let mut session = session();
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("Scan.PDF");
    std::fs::write(&path, pdf_bytes(&[LETTER; 3])).expect("write pdf");

    session.open_path(&path).await.expect("pdf opens");

    assert_eq!(session.file_name(), Some("Scan.PDF"));
    assert_eq!(session.page_count(), 3);
}

#[tokio::test]
async fn open_path_reports_missing_files() {
    let mut session = session();
    let dir = tempfile::tempdir().expect("tempdir");

    let err = session.open_path(dir.path().join("gone.pdf")).await.unwrap_err();

    assert!(matches!(err, ViewerError::Io { .. }));
    assert!(!session.has_document());
    assert_eq!(session.drain_notices().len(), 1);
}
