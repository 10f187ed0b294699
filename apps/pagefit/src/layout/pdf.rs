//! Serializes a paginated layout to PDF bytes with `lopdf`.
//!
//! Only the three standard Type1 Helvetica faces are referenced, so nothing is
//! embedded. Text is encoded as WinAnsi. The writer adds no timestamps or ids,
//! so identical layouts serialize to identical bytes.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, Stream, StringFormat};

use crate::errors::RenderError;
use crate::layout::flow::{Page, PageLayout};
use crate::layout::font_metrics::FontFace;

const PDF_VERSION: &str = "1.5";

/// Writes `layout` as a compressed PDF document.
pub fn write_pdf(layout: &PageLayout) -> Result<Vec<u8>, RenderError> {
    let mut doc = Document::with_version(PDF_VERSION);
    let pages_id = doc.new_object_id();

    let mut fonts = Dictionary::new();
    for face in FontFace::ALL {
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => face.base_font(),
            "Encoding" => "WinAnsiEncoding",
        });
        fonts.set(face.resource_name(), font_id);
    }
    let resources_id = doc.add_object(dictionary! {
        "Font" => fonts,
    });

    let media_box: Vec<Object> = vec![
        0.into(),
        0.into(),
        Object::Real(layout.geometry.width_pt),
        Object::Real(layout.geometry.height_pt),
    ];

    let mut kids: Vec<Object> = Vec::with_capacity(layout.pages.len());
    for page in &layout.pages {
        let content = page_content(page);
        let encoded = content
            .encode()
            .map_err(|e| RenderError::Encode(e.to_string()))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => count,
        "Resources" => resources_id,
        "MediaBox" => media_box,
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|e| RenderError::Encode(format!("Failed to serialize PDF: {e}")))?;
    Ok(bytes)
}

fn page_content(page: &Page) -> Content {
    let mut operations = Vec::with_capacity(page.lines.len() * 4);
    for line in &page.lines {
        operations.push(Operation::new("BT", vec![]));
        operations.push(Operation::new(
            "Tf",
            vec![line.face.resource_name().into(), Object::Real(line.size_pt)],
        ));
        operations.push(Operation::new(
            "Td",
            vec![Object::Real(round2(line.x_pt)), Object::Real(round2(line.baseline_pt))],
        ));
        operations.push(Operation::new(
            "Tj",
            vec![Object::String(encode_win_ansi(&line.text), StringFormat::Literal)],
        ));
        operations.push(Operation::new("ET", vec![]));
    }
    Content { operations }
}

fn round2(v: f32) -> f32 {
    (v * 100.0).round() / 100.0
}

/// Maps text to WinAnsi (CP1252). Unmappable characters become '?'.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            ' '..='~' => c as u8,
            '\u{A0}'..='\u{FF}' => c as u32 as u8,
            '\u{20AC}' => 0x80, // €
            '\u{2026}' => 0x85, // …
            '\u{2018}' => 0x91,
            '\u{2019}' => 0x92,
            '\u{201C}' => 0x93,
            '\u{201D}' => 0x94,
            '\u{2022}' => 0x95, // •
            '\u{2013}' => 0x96, // –
            '\u{2014}' => 0x97, // —
            '\t' => b' ',
            _ => b'?',
        })
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::flow::{paginate, Align, Block, PageGeometry, Paragraph, TextStyle};

    fn layout_with_lines(lines: usize) -> PageLayout {
        let style = TextStyle {
            face: FontFace::Regular,
            size_pt: 10.0,
            leading_pt: 12.0,
            space_before_pt: 0.0,
            space_after_pt: 0.0,
            indent_pt: 0.0,
            align: Align::Left,
        };
        let block = Block {
            paragraphs: (0..lines)
                .map(|i| Paragraph {
                    text: format!("\u{2022} Line {i}"),
                    style,
                })
                .collect(),
            keep_together: false,
            space_after_pt: 0.0,
        };
        paginate(&[block], PageGeometry::us_letter(0.75))
    }

    #[test]
    fn test_output_is_a_pdf() {
        let bytes = write_pdf(&layout_with_lines(3)).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"), "missing PDF header");
    }

    #[test]
    fn test_page_tree_matches_layout() {
        let layout = layout_with_lines(130);
        assert_eq!(layout.page_count(), 3);
        let bytes = write_pdf(&layout).unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 3);
    }

    #[test]
    fn test_identical_layouts_identical_bytes() {
        let a = write_pdf(&layout_with_lines(40)).unwrap();
        let b = write_pdf(&layout_with_lines(40)).unwrap();
        assert_eq!(a, b, "serialization must be deterministic");
    }

    #[test]
    fn test_encode_win_ansi() {
        assert_eq!(encode_win_ansi("A\u{2022}b"), vec![b'A', 0x95, b'b']);
        assert_eq!(encode_win_ansi("caf\u{e9}"), vec![b'c', b'a', b'f', 0xE9]);
        assert_eq!(encode_win_ansi("\u{4e2d}"), vec![b'?'], "CJK is not representable");
    }
}
