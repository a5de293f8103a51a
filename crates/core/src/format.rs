use docview_decode::DocumentFormat;

pub const PDF_MIME: &str = "application/pdf";
pub const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Pick the decoding strategy for a file.
///
/// PDFs are recognized by MIME type only. DOCX files are recognized by MIME
/// type or by a `.docx` name suffix, since browsers and file pickers often
/// report no type for them.
pub fn detect_format(name: &str, mime: Option<&str>) -> Option<DocumentFormat> {
    match mime {
        Some(PDF_MIME) => Some(DocumentFormat::Exact),
        Some(DOCX_MIME) => Some(DocumentFormat::Flow),
        _ if name.ends_with(".docx") => Some(DocumentFormat::Flow),
        _ => None,
    }
}
