//! PDF adapter built on `lopdf`.

use crate::exact::{ExactDecoder, ExactDocument, PageHandle, PageSize};
use crate::{DecodeError, RenderError, RgbaImage};
use image::Rgba;
use log::debug;
use lopdf::{Dictionary, Document, Object};
use std::sync::Arc;

const MAX_INHERITANCE_DEPTH: usize = 32;
const PAGE_FILL: Rgba<u8> = Rgba([255, 255, 255, 255]);
const PAGE_BORDER: Rgba<u8> = Rgba([220, 220, 220, 255]);

/// Runtime configuration handed to [`LopdfDecoder`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecoderOptions {
    /// Refuse documents carrying an `/Encrypt` dictionary.
    pub reject_encrypted: bool,
    /// Largest surface (width × height) a single page render may allocate.
    pub max_surface_pixels: u64,
    /// Size assumed for pages without a usable media box.
    pub fallback_page_size: PageSize,
}

impl Default for DecoderOptions {
    fn default() -> Self {
        Self {
            reject_encrypted: true,
            max_surface_pixels: 64 * 1024 * 1024,
            fallback_page_size: PageSize::LETTER,
        }
    }
}

impl DecoderOptions {
    pub fn with_reject_encrypted(mut self, reject: bool) -> Self {
        self.reject_encrypted = reject;
        self
    }

    pub fn with_max_surface_pixels(mut self, pixels: u64) -> Self {
        self.max_surface_pixels = pixels;
        self
    }
}

/// Exact decoder reading page geometry with `lopdf`.
///
/// Rendering produces a page-sized canvas at the requested scale; parsing and
/// rasterization both run on the blocking pool.
#[derive(Debug, Clone, Default)]
pub struct LopdfDecoder {
    options: DecoderOptions,
}

impl LopdfDecoder {
    pub fn new(options: DecoderOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &DecoderOptions {
        &self.options
    }
}

impl ExactDecoder for LopdfDecoder {
    async fn open(&self, bytes: Arc<[u8]>) -> Result<ExactDocument, DecodeError> {
        let options = self.options;
        let source = Arc::clone(&bytes);

        let pages = tokio::task::spawn_blocking(move || parse_page_sizes(&source, &options))
            .await
            .map_err(|err| DecodeError::Backend(format!("decode worker failed: {err}")))??;

        debug!("Parsed PDF with {} pages ({} bytes)", pages.len(), bytes.len());
        Ok(ExactDocument::new(bytes, pages))
    }

    async fn render_page(
        &self,
        document: &ExactDocument,
        page: PageHandle,
        scale: f32,
    ) -> Result<RgbaImage, RenderError> {
        if page.number == 0 || page.number > document.page_count() {
            return Err(RenderError::PageOutOfRange {
                page: page.number,
                page_count: document.page_count(),
            });
        }

        let (width, height) = page.size.scaled(scale);
        if u64::from(width) * u64::from(height) > self.options.max_surface_pixels {
            return Err(RenderError::SurfaceTooLarge { width, height });
        }

        tokio::task::spawn_blocking(move || rasterize_page(width, height))
            .await
            .map_err(|err| RenderError::Backend(format!("render worker failed: {err}")))
    }
}

fn parse_page_sizes(bytes: &[u8], options: &DecoderOptions) -> Result<Vec<PageSize>, DecodeError> {
    let doc = Document::load_mem(bytes)?;
    // Only the trailer's `/Encrypt` entry marks a document as encrypted.
    if options.reject_encrypted && doc.trailer.get(b"Encrypt").is_ok() {
        return Err(DecodeError::EncryptedUnsupported);
    }

    let pages = doc.get_pages();
    let mut sizes = Vec::with_capacity(pages.len());

    for (_, object_id) in pages {
        let dict = doc.get_dictionary(object_id)?;
        let size = media_box(&doc, dict).unwrap_or(options.fallback_page_size);

        let quarter_turned = inherited(&doc, dict, b"Rotate")
            .and_then(|rotate| rotate.as_i64().ok())
            .is_some_and(|degrees| matches!(degrees.rem_euclid(360), 90 | 270));

        sizes.push(if quarter_turned { size.rotated() } else { size });
    }

    if sizes.is_empty() {
        return Err(DecodeError::NoPages);
    }

    Ok(sizes)
}

fn media_box(doc: &Document, page: &Dictionary) -> Option<PageSize> {
    let array = inherited(doc, page, b"MediaBox")?.as_array().ok()?;
    if array.len() != 4 {
        return None;
    }

    let x0 = number(resolve(doc, &array[0])?)?;
    let y0 = number(resolve(doc, &array[1])?)?;
    let x1 = number(resolve(doc, &array[2])?)?;
    let y1 = number(resolve(doc, &array[3])?)?;

    let size = PageSize { width_pt: (x1 - x0).abs(), height_pt: (y1 - y0).abs() };
    (size.width_pt > 0.0 && size.height_pt > 0.0).then_some(size)
}

/// Page attribute lookup following the `/Parent` chain.
fn inherited<'a>(doc: &'a Document, page: &'a Dictionary, key: &[u8]) -> Option<&'a Object> {
    let mut current = page;

    for _ in 0..MAX_INHERITANCE_DEPTH {
        if let Ok(value) = current.get(key) {
            return resolve(doc, value);
        }

        let parent = current.get(b"Parent").ok()?.as_reference().ok()?;
        current = doc.get_dictionary(parent).ok()?;
    }

    None
}

fn resolve<'a>(doc: &'a Document, object: &'a Object) -> Option<&'a Object> {
    match object {
        Object::Reference(id) => doc.get_object(*id).ok(),
        other => Some(other),
    }
}

fn number(object: &Object) -> Option<f32> {
    match object {
        Object::Integer(value) => Some(*value as f32),
        Object::Real(value) => Some(*value as f32),
        _ => None,
    }
}

fn rasterize_page(width: u32, height: u32) -> RgbaImage {
    let mut image = RgbaImage::from_pixel(width, height, PAGE_FILL);

    if width >= 4 && height >= 4 {
        for x in 0..width {
            image.put_pixel(x, 0, PAGE_BORDER);
            image.put_pixel(x, height - 1, PAGE_BORDER);
        }
        for y in 0..height {
            image.put_pixel(0, y, PAGE_BORDER);
            image.put_pixel(width - 1, y, PAGE_BORDER);
        }
    }

    image
}
