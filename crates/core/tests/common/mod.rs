#![allow(dead_code)]

use docview_core::{SourceFile, ViewerConfig, DOCX_MIME, PDF_MIME};
use lopdf::{dictionary, Document, Object};
use std::io::{Cursor, Write};
use std::time::Duration;

pub const LETTER: (i64, i64) = (612, 792);

pub fn init_logging() {
    let _ = simplelog::TestLogger::init(log::LevelFilter::Debug, simplelog::Config::default());
}

/// Default configuration without the render stagger, so tests settle quickly.
pub fn config() -> ViewerConfig {
    ViewerConfig::default().with_stagger(Duration::ZERO)
}

/// A PDF whose pages have the given media box sizes, in points.
pub fn pdf_bytes(sizes: &[(i64, i64)]) -> Vec<u8> {
    let boxes: Vec<(Object, Object)> =
        sizes.iter().map(|(width, height)| (Object::Integer(*width), Object::Integer(*height))).collect();
    pdf_with_media_boxes(boxes)
}

/// A PDF of ISO A4 pages, whose media box is fractional in points.
pub fn a4_pdf(pages: usize) -> SourceFile {
    let boxes = vec![(Object::Real(595.28), Object::Real(841.89)); pages];
    SourceFile::new("a4.pdf", Some(PDF_MIME.to_string()), pdf_with_media_boxes(boxes))
}

fn pdf_with_media_boxes(boxes: Vec<(Object, Object)>) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let kids: Vec<Object> = boxes
        .into_iter()
        .map(|(width, height)| {
            let page = dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => Object::Array(vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    width,
                    height,
                ]),
            };
            Object::Reference(doc.add_object(page))
        })
        .collect();

    let tree = dictionary! {
        "Type" => "Pages",
        "Count" => kids.len() as i64,
        "Kids" => kids,
    };
    doc.objects.insert(pages_id, Object::Dictionary(tree));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).expect("pdf should serialize");
    bytes
}

pub fn letter_pdf(pages: usize) -> SourceFile {
    SourceFile::new("letter.pdf", Some(PDF_MIME.to_string()), pdf_bytes(&vec![LETTER; pages]))
}

/// A DOCX with one paragraph per entry of `paragraphs`.
pub fn docx_bytes(paragraphs: &[&str]) -> Vec<u8> {
    let body: String = paragraphs
        .iter()
        .map(|text| format!("<w:p><w:r><w:t>{text}</w:t></w:r></w:p>"))
        .collect();
    let xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body}</w:body></w:document>"#
    );

    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    writer
        .start_file("word/document.xml", zip::write::FileOptions::default())
        .expect("zip entry should start");
    writer.write_all(xml.as_bytes()).expect("zip entry should be written");
    writer.finish().expect("zip should finish").into_inner()
}

pub fn long_docx(paragraphs: usize) -> SourceFile {
    let texts: Vec<String> = (1..=paragraphs).map(|i| format!("Paragraph number {i}.")).collect();
    let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
    SourceFile::new("notes.docx", None, docx_bytes(&refs))
}

pub fn docx_with_mime(paragraphs: &[&str]) -> SourceFile {
    SourceFile::new("upload.bin", Some(DOCX_MIME.to_string()), docx_bytes(paragraphs))
}
