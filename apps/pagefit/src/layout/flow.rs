//! Line breaking and pagination.
//!
//! Greedy word wrap against the static metric tables, then a top-to-bottom flow
//! of blocks onto fixed-size pages. A keep-together block that does not fit the
//! remaining space moves to a fresh page; a block taller than a whole page is
//! split line by line. Coordinates are PDF points with the origin bottom-left.

use std::mem;

use crate::layout::font_metrics::{get_metrics, FontFace, FontMetricTable};

const POINTS_PER_INCH: f32 = 72.0;
const US_LETTER_WIDTH_PT: f32 = 612.0;
const US_LETTER_HEIGHT_PT: f32 = 792.0;
/// Fraction of the font size below the baseline.
const DESCENT_RATIO: f32 = 0.2;

// ────────────────────────────────────────────────────────────────────────────
// Types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub face: FontFace,
    pub size_pt: f32,
    pub leading_pt: f32,
    pub space_before_pt: f32,
    pub space_after_pt: f32,
    pub indent_pt: f32,
    pub align: Align,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Paragraph {
    pub text: String,
    pub style: TextStyle,
}

/// A run of paragraphs flowed together, optionally kept on one page.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub paragraphs: Vec<Paragraph>,
    pub keep_together: bool,
    /// Extra gap after the block (between jobs, between projects).
    pub space_after_pt: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width_pt: f32,
    pub height_pt: f32,
    pub margin_pt: f32,
}

impl PageGeometry {
    /// US letter with the same margin on all four sides.
    pub fn us_letter(margin_inches: f64) -> Self {
        Self {
            width_pt: US_LETTER_WIDTH_PT,
            height_pt: US_LETTER_HEIGHT_PT,
            margin_pt: margin_inches as f32 * POINTS_PER_INCH,
        }
    }

    pub fn content_width(&self) -> f32 {
        self.width_pt - 2.0 * self.margin_pt
    }

    pub fn content_height(&self) -> f32 {
        self.height_pt - 2.0 * self.margin_pt
    }

    fn top(&self) -> f32 {
        self.height_pt - self.margin_pt
    }

    fn bottom(&self) -> f32 {
        self.margin_pt
    }
}

/// One line of text at its final position.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLine {
    pub x_pt: f32,
    pub baseline_pt: f32,
    pub text: String,
    pub face: FontFace,
    pub size_pt: f32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub lines: Vec<PlacedLine>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageLayout {
    pub geometry: PageGeometry,
    pub pages: Vec<Page>,
}

impl PageLayout {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Word wrap
// ────────────────────────────────────────────────────────────────────────────

/// Greedy word wrap. Words wider than the line are broken between characters.
/// Blank text yields no lines.
pub fn wrap_text(text: &str, face: FontFace, size_pt: f32, max_width_pt: f32) -> Vec<String> {
    let metrics = get_metrics(face);
    let space_w = metrics.space_width * size_pt;

    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_w = 0.0_f32;

    for word in text.split_whitespace() {
        for piece in split_oversized(word, metrics, size_pt, max_width_pt) {
            let piece_w = metrics.width_pt(&piece, size_pt);
            if current.is_empty() {
                current = piece;
                current_w = piece_w;
            } else if current_w + space_w + piece_w > max_width_pt {
                lines.push(mem::take(&mut current));
                current = piece;
                current_w = piece_w;
            } else {
                current.push(' ');
                current.push_str(&piece);
                current_w += space_w + piece_w;
            }
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Breaks a single word into pieces no wider than `max_width_pt`.
/// Every piece holds at least one character, so wrapping always makes progress.
fn split_oversized(
    word: &str,
    metrics: &FontMetricTable,
    size_pt: f32,
    max_width_pt: f32,
) -> Vec<String> {
    if metrics.width_pt(word, size_pt) <= max_width_pt {
        return vec![word.to_string()];
    }

    let mut pieces = Vec::new();
    let mut piece = String::new();
    let mut piece_w = 0.0_f32;
    for c in word.chars() {
        let c_w = metrics.char_width(c) * size_pt;
        if !piece.is_empty() && piece_w + c_w > max_width_pt {
            pieces.push(mem::take(&mut piece));
            piece_w = 0.0;
        }
        piece.push(c);
        piece_w += c_w;
    }
    if !piece.is_empty() {
        pieces.push(piece);
    }
    pieces
}

// ────────────────────────────────────────────────────────────────────────────
// Pagination
// ────────────────────────────────────────────────────────────────────────────

struct WrappedParagraph<'a> {
    lines: Vec<String>,
    style: &'a TextStyle,
}

/// Flows blocks onto pages. Always returns at least one page.
pub fn paginate(blocks: &[Block], geometry: PageGeometry) -> PageLayout {
    let mut cursor = PageCursor::new(geometry);

    for block in blocks {
        let wrapped: Vec<WrappedParagraph<'_>> = block
            .paragraphs
            .iter()
            .map(|p| WrappedParagraph {
                lines: wrap_text(
                    &p.text,
                    p.style.face,
                    p.style.size_pt,
                    geometry.content_width() - p.style.indent_pt,
                ),
                style: &p.style,
            })
            .filter(|w| !w.lines.is_empty())
            .collect();

        if wrapped.is_empty() {
            continue;
        }

        if block.keep_together {
            let height = block_height(&wrapped);
            if height > cursor.remaining() && height <= geometry.content_height() {
                cursor.break_page();
            }
        }

        for paragraph in &wrapped {
            cursor.skip(paragraph.style.space_before_pt);
            for line in &paragraph.lines {
                cursor.place(line, paragraph.style);
            }
            cursor.skip(paragraph.style.space_after_pt);
        }
        cursor.skip(block.space_after_pt);
    }

    cursor.finish()
}

/// Height of a block when laid out without a page break. The leading space of
/// the first paragraph is counted, matching how `place` spends it mid-page.
fn block_height(paragraphs: &[WrappedParagraph<'_>]) -> f32 {
    paragraphs
        .iter()
        .map(|p| {
            p.style.space_before_pt
                + p.lines.len() as f32 * p.style.leading_pt
                + p.style.space_after_pt
        })
        .sum()
}

struct PageCursor {
    geometry: PageGeometry,
    pages: Vec<Page>,
    /// Top of the free space on the current page.
    y: f32,
}

impl PageCursor {
    fn new(geometry: PageGeometry) -> Self {
        Self {
            geometry,
            pages: vec![Page::default()],
            y: geometry.top(),
        }
    }

    fn current_is_empty(&self) -> bool {
        self.pages.last().map_or(true, |p| p.lines.is_empty())
    }

    fn remaining(&self) -> f32 {
        self.y - self.geometry.bottom()
    }

    fn break_page(&mut self) {
        self.pages.push(Page::default());
        self.y = self.geometry.top();
    }

    /// Vertical whitespace. Collapses at the top of a page.
    fn skip(&mut self, amount: f32) {
        if !self.current_is_empty() {
            self.y -= amount;
        }
    }

    fn place(&mut self, text: &str, style: &TextStyle) {
        // A line taller than the whole content area still lands on an empty page.
        if style.leading_pt > self.remaining() && !self.current_is_empty() {
            self.break_page();
        }

        let left = self.geometry.margin_pt;
        let x_pt = match style.align {
            Align::Left => left + style.indent_pt,
            Align::Center => {
                let width = get_metrics(style.face).width_pt(text, style.size_pt);
                left + ((self.geometry.content_width() - width) / 2.0).max(0.0)
            }
        };
        let baseline_pt = self.y - style.leading_pt + DESCENT_RATIO * style.size_pt;

        if let Some(page) = self.pages.last_mut() {
            page.lines.push(PlacedLine {
                x_pt,
                baseline_pt,
                text: text.to_string(),
                face: style.face,
                size_pt: style.size_pt,
            });
        }
        self.y -= style.leading_pt;
    }

    fn finish(self) -> PageLayout {
        PageLayout {
            geometry: self.geometry,
            pages: self.pages,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn body_style() -> TextStyle {
        TextStyle {
            face: FontFace::Regular,
            size_pt: 10.0,
            leading_pt: 12.0,
            space_before_pt: 0.0,
            space_after_pt: 0.0,
            indent_pt: 0.0,
            align: Align::Left,
        }
    }

    fn block_of(lines: usize, keep_together: bool) -> Block {
        Block {
            paragraphs: (0..lines)
                .map(|i| Paragraph {
                    text: format!("Line {i}"),
                    style: body_style(),
                })
                .collect(),
            keep_together,
            space_after_pt: 0.0,
        }
    }

    // ── wrap_text ───────────────────────────────────────────────────────────

    #[test]
    fn test_wrap_empty_text_has_no_lines() {
        assert!(wrap_text("   ", FontFace::Regular, 10.0, 500.0).is_empty());
    }

    #[test]
    fn test_wrap_short_text_single_line() {
        let lines = wrap_text("Built a thing", FontFace::Regular, 10.0, 500.0);
        assert_eq!(lines, vec!["Built a thing".to_string()]);
    }

    #[test]
    fn test_wrap_long_text_respects_width() {
        let text = "Architected a distributed caching layer using Redis and consistent hashing ".repeat(6);
        let max = 300.0;
        let lines = wrap_text(&text, FontFace::Regular, 10.0, max);
        assert!(lines.len() > 1, "long text must wrap");
        for line in &lines {
            let w = get_metrics(FontFace::Regular).width_pt(line, 10.0);
            assert!(w <= max + 1e-3, "line '{line}' is {w}pt wide");
        }
        let rejoined = lines.join(" ");
        assert_eq!(rejoined, text.split_whitespace().collect::<Vec<_>>().join(" "));
    }

    #[test]
    fn test_wrap_breaks_oversized_word() {
        let word = "x".repeat(400);
        let lines = wrap_text(&word, FontFace::Regular, 10.0, 100.0);
        assert!(lines.len() > 1);
        assert_eq!(lines.concat(), word);
    }

    // ── paginate ────────────────────────────────────────────────────────────

    #[test]
    fn test_empty_document_is_one_page() {
        let layout = paginate(&[], PageGeometry::us_letter(0.75));
        assert_eq!(layout.page_count(), 1);
        assert!(layout.pages[0].lines.is_empty());
    }

    #[test]
    fn test_small_block_fits_one_page() {
        let layout = paginate(&[block_of(10, true)], PageGeometry::us_letter(0.75));
        assert_eq!(layout.page_count(), 1);
        assert_eq!(layout.pages[0].lines.len(), 10);
    }

    #[test]
    fn test_overflow_spills_to_second_page() {
        // 684pt of content height / 12pt leading = 57 lines per page.
        let layout = paginate(&[block_of(80, false)], PageGeometry::us_letter(0.75));
        assert_eq!(layout.page_count(), 2);
        assert_eq!(layout.pages[0].lines.len(), 57);
        assert_eq!(layout.pages[1].lines.len(), 23);
    }

    #[test]
    fn test_keep_together_moves_block_to_next_page() {
        let blocks = vec![block_of(50, false), block_of(10, true)];
        let layout = paginate(&blocks, PageGeometry::us_letter(0.75));
        assert_eq!(layout.page_count(), 2);
        assert_eq!(layout.pages[0].lines.len(), 50, "kept block must not split");
        assert_eq!(layout.pages[1].lines.len(), 10);
    }

    #[test]
    fn test_keep_together_block_taller_than_page_splits() {
        let layout = paginate(&[block_of(120, true)], PageGeometry::us_letter(0.75));
        assert_eq!(layout.page_count(), 3);
    }

    #[test]
    fn test_smaller_margins_hold_more_lines() {
        let wide = paginate(&[block_of(60, false)], PageGeometry::us_letter(0.75));
        let narrow = paginate(&[block_of(60, false)], PageGeometry::us_letter(0.5));
        assert_eq!(wide.page_count(), 2);
        assert_eq!(narrow.page_count(), 1, "0.5in margins leave 720pt = 60 lines");
    }

    #[test]
    fn test_lines_stay_inside_margins() {
        let geometry = PageGeometry::us_letter(0.75);
        let layout = paginate(&[block_of(200, false)], geometry);
        for page in &layout.pages {
            for line in &page.lines {
                assert!(line.baseline_pt >= geometry.margin_pt - 1e-3);
                assert!(line.baseline_pt <= geometry.height_pt - geometry.margin_pt);
            }
        }
    }
}
