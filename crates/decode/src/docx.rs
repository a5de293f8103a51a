//! DOCX adapter: lays out `word/document.xml` onto a continuous surface.

use crate::flow::{BlockKind, FlowBlock, FlowDecoder, FlowLayout, FlowSurface};
use crate::DecodeError;
use log::debug;
use roxmltree::Node;
use std::io::{Cursor, Read};
use std::sync::Arc;

const WORDPROCESSING_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const DOCUMENT_PART: &str = "word/document.xml";
const TAB_WIDTH: usize = 4;

/// Flow decoder for Office Open XML word-processing documents.
#[derive(Debug, Clone, Default)]
pub struct DocxDecoder {
    layout: FlowLayout,
}

impl DocxDecoder {
    pub fn new(layout: FlowLayout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &FlowLayout {
        &self.layout
    }
}

impl FlowDecoder for DocxDecoder {
    async fn render_all(&self, bytes: Arc<[u8]>, target: &mut FlowSurface) -> Result<(), DecodeError> {
        let layout = FlowLayout { content_width: target.width(), ..self.layout };

        let (blocks, extent) = tokio::task::spawn_blocking(move || {
            let xml = read_document_part(&bytes)?;
            let paragraphs = parse_body(&xml)?;
            Ok::<_, DecodeError>(lay_out(&paragraphs, &layout))
        })
        .await
        .map_err(|err| DecodeError::Backend(format!("layout worker failed: {err}")))??;

        debug!("Laid out {} blocks, extent {extent:.1}px", blocks.len());
        target.fill(blocks, extent);
        Ok(())
    }
}

/// A paragraph-like unit extracted from the document body.
#[derive(Debug, Clone, PartialEq)]
struct SourceBlock {
    kind: BlockKind,
    /// Explicit run size in points, when the document sets one.
    size_pt: Option<f32>,
    text: String,
}

fn read_document_part(bytes: &[u8]) -> Result<String, DecodeError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;
    let mut part = archive.by_name(DOCUMENT_PART).map_err(|err| match err {
        zip::result::ZipError::FileNotFound => DecodeError::MissingPart(DOCUMENT_PART),
        other => DecodeError::Container(other),
    })?;

    let mut xml = String::new();
    part.read_to_string(&mut xml)
        .map_err(|err| DecodeError::Backend(format!("failed to read {DOCUMENT_PART}: {err}")))?;
    Ok(xml)
}

fn parse_body(xml: &str) -> Result<Vec<SourceBlock>, DecodeError> {
    let doc = roxmltree::Document::parse(xml)?;
    let Some(body) = doc.descendants().find(|node| node.has_tag_name((WORDPROCESSING_NS, "body")))
    else {
        return Ok(Vec::new());
    };

    let mut blocks = Vec::new();
    for child in body.children().filter(Node::is_element) {
        if child.has_tag_name((WORDPROCESSING_NS, "p")) {
            blocks.push(paragraph(child));
        } else if child.has_tag_name((WORDPROCESSING_NS, "tbl")) {
            blocks.extend(table_rows(child));
        }
    }

    Ok(blocks)
}

fn paragraph(node: Node<'_, '_>) -> SourceBlock {
    let kind = w_child(node, "pPr")
        .and_then(|props| w_child(props, "pStyle"))
        .and_then(|style| style.attribute((WORDPROCESSING_NS, "val")))
        .and_then(heading_level)
        .map_or(BlockKind::Paragraph, BlockKind::Heading);

    let size_pt = node
        .descendants()
        .filter(|n| n.has_tag_name((WORDPROCESSING_NS, "sz")))
        .find_map(|n| n.attribute((WORDPROCESSING_NS, "val")))
        .and_then(|half_points| half_points.parse::<f32>().ok())
        .filter(|half_points| *half_points > 0.0)
        .map(|half_points| half_points / 2.0);

    SourceBlock { kind, size_pt, text: paragraph_text(node) }
}

fn paragraph_text(node: Node<'_, '_>) -> String {
    let mut text = String::new();

    for n in node.descendants().filter(Node::is_element) {
        if n.tag_name().namespace() != Some(WORDPROCESSING_NS) {
            continue;
        }
        match n.tag_name().name() {
            "t" => text.push_str(n.text().unwrap_or_default()),
            "tab" if !is_tab_stop(n) => text.push_str(&" ".repeat(TAB_WIDTH)),
            "br" | "cr" => text.push('\n'),
            _ => {}
        }
    }

    text
}

// `w:tab` also appears inside `w:tabs` as a tab stop definition.
fn is_tab_stop(node: Node<'_, '_>) -> bool {
    node.parent().is_some_and(|parent| parent.has_tag_name((WORDPROCESSING_NS, "tabs")))
}

fn table_rows(table: Node<'_, '_>) -> Vec<SourceBlock> {
    table
        .children()
        .filter(|n| n.has_tag_name((WORDPROCESSING_NS, "tr")))
        .map(|row| {
            let cells: Vec<String> = row
                .children()
                .filter(|n| n.has_tag_name((WORDPROCESSING_NS, "tc")))
                .map(|cell| {
                    cell.children()
                        .filter(|n| n.has_tag_name((WORDPROCESSING_NS, "p")))
                        .map(paragraph_text)
                        .collect::<Vec<_>>()
                        .join(" ")
                })
                .collect();

            SourceBlock { kind: BlockKind::TableRow, size_pt: None, text: cells.join(" | ") }
        })
        .collect()
}

fn w_child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|n| n.has_tag_name((WORDPROCESSING_NS, name)))
}

fn heading_level(style: &str) -> Option<u8> {
    if style.eq_ignore_ascii_case("title") {
        return Some(0);
    }
    let level = style.strip_prefix("Heading").or_else(|| style.strip_prefix("heading"))?;
    level.trim().parse::<u8>().ok().filter(|level| (1..=6).contains(level))
}

fn font_scale(kind: BlockKind) -> f32 {
    match kind {
        BlockKind::Heading(0) => 2.0,
        BlockKind::Heading(1) => 1.6,
        BlockKind::Heading(2) => 1.4,
        BlockKind::Heading(3) => 1.2,
        BlockKind::Heading(_) => 1.1,
        BlockKind::Paragraph | BlockKind::TableRow => 1.0,
    }
}

fn points_to_px(points: f32) -> f32 {
    points * 96.0 / 72.0
}

fn lay_out(source: &[SourceBlock], layout: &FlowLayout) -> (Vec<FlowBlock>, f32) {
    if source.is_empty() {
        return (Vec::new(), 0.0);
    }

    let spacing = points_to_px(layout.paragraph_spacing_pt);
    let mut cursor = layout.margin;
    let mut blocks = Vec::with_capacity(source.len());

    for block in source {
        let font_pt = block.size_pt.unwrap_or(layout.base_font_pt) * font_scale(block.kind);
        let font_px = points_to_px(font_pt);
        let columns = layout.columns(font_px);

        let mut lines: Vec<String> = block
            .text
            .split('\n')
            .flat_map(|segment| {
                if segment.trim().is_empty() {
                    vec![String::new()]
                } else {
                    textwrap::wrap(segment, columns).into_iter().map(|line| line.into_owned()).collect()
                }
            })
            .collect();
        if lines.is_empty() {
            lines.push(String::new());
        }

        let height = lines.len() as f32 * font_px * layout.line_spacing;
        blocks.push(FlowBlock { kind: block.kind, top: cursor, height, font_px, lines });
        cursor += height + spacing;
    }

    // The trailing paragraph spacing is replaced by the bottom margin.
    let extent = cursor - spacing + layout.margin;
    (blocks, extent)
}
