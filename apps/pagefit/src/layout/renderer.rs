//! The rendering seam used by the compression controller.
//!
//! `Renderer` is a trait so the controller can be driven by a scripted fake in
//! tests; `PdfRenderer` is the production implementation.

use bytes::Bytes;
use tracing::debug;

use crate::errors::RenderError;
use crate::layout::compose::compose;
use crate::layout::flow::{paginate, PageGeometry};
use crate::layout::measure::{measure, PageCount};
use crate::layout::pdf::write_pdf;
use crate::models::{DocumentHeader, ResumeContent, TypographySettings};

/// Narrowest content column the layout accepts.
pub const MIN_CONTENT_WIDTH_PT: f32 = 72.0;

/// One render call's inputs. Everything is borrowed; renderers never mutate.
#[derive(Debug, Clone, Copy)]
pub struct RenderRequest<'a> {
    pub header: &'a DocumentHeader,
    pub content: &'a ResumeContent,
    pub typography: &'a TypographySettings,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedDocument {
    pub artifact: Bytes,
    pub page_count: PageCount,
}

pub trait Renderer: Send + Sync {
    /// Renders and measures one candidate. Identical requests must yield
    /// identical page counts.
    fn render(&self, request: &RenderRequest<'_>) -> Result<RenderedDocument, RenderError>;
}

/// US-Letter PDF renderer over the standard Helvetica faces.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfRenderer;

impl PdfRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for PdfRenderer {
    fn render(&self, request: &RenderRequest<'_>) -> Result<RenderedDocument, RenderError> {
        let geometry = validate_typography(request.typography)?;
        validate_content(request.header, request.content)?;

        let blocks = compose(request.header, request.content, request.typography);
        let layout = paginate(&blocks, geometry);
        let bytes = write_pdf(&layout)?;
        let page_count = measure(&bytes);

        if page_count.pages() as usize != layout.page_count() {
            debug!(
                laid_out = layout.page_count(),
                measured = page_count.pages(),
                approximate = page_count.is_approximate(),
                "Measured page count differs from layout"
            );
        }

        Ok(RenderedDocument {
            artifact: Bytes::from(bytes),
            page_count,
        })
    }
}

fn validate_typography(typography: &TypographySettings) -> Result<PageGeometry, RenderError> {
    for (name, value) in [
        ("font_size_pt", typography.font_size_pt),
        ("margin_inches", typography.margin_inches),
        ("line_spacing", typography.line_spacing),
    ] {
        if !value.is_finite() || value <= 0.0 {
            return Err(RenderError::InvalidTypography(format!(
                "{name} must be a positive finite number, got {value}"
            )));
        }
    }

    let geometry = PageGeometry::us_letter(typography.margin_inches);
    if geometry.content_width() < MIN_CONTENT_WIDTH_PT {
        return Err(RenderError::InvalidTypography(format!(
            "margin of {}in leaves no room for content",
            typography.margin_inches
        )));
    }
    Ok(geometry)
}

/// Rejects display strings carrying control characters other than whitespace.
fn validate_content(header: &DocumentHeader, content: &ResumeContent) -> Result<(), RenderError> {
    check_text("name", &header.name)?;
    check_text("contact_line", &header.contact_line)?;
    check_text("summary", &content.summary)?;

    for (i, exp) in content.experiences.iter().enumerate() {
        check_text(&format!("experiences[{i}].title"), &exp.title)?;
        check_text(&format!("experiences[{i}].company"), &exp.company)?;
        check_text(&format!("experiences[{i}].duration"), &exp.duration)?;
        for (j, bullet) in exp.bullets.iter().enumerate() {
            check_text(&format!("experiences[{i}].bullets[{j}]"), bullet)?;
        }
    }
    for (i, skill) in content.skills.iter().enumerate() {
        check_text(&format!("skills[{i}]"), skill)?;
    }
    for (i, project) in content.projects.iter().enumerate() {
        check_text(&format!("projects[{i}].name"), &project.name)?;
        for (j, bullet) in project.bullets.iter().enumerate() {
            check_text(&format!("projects[{i}].bullets[{j}]"), bullet)?;
        }
        for (j, tech) in project.technologies.iter().enumerate() {
            check_text(&format!("projects[{i}].technologies[{j}]"), tech)?;
        }
    }
    for (i, cert) in content.certifications.iter().enumerate() {
        check_text(&format!("certifications[{i}]"), cert)?;
    }
    for (i, edu) in content.education.iter().enumerate() {
        check_text(&format!("education[{i}].degree"), &edu.degree)?;
        check_text(&format!("education[{i}].institution"), &edu.institution)?;
        check_text(&format!("education[{i}].year"), &edu.year)?;
        check_text(&format!("education[{i}].gpa"), &edu.gpa)?;
    }
    Ok(())
}

fn check_text(field: &str, text: &str) -> Result<(), RenderError> {
    match text
        .chars()
        .find(|c| c.is_control() && !matches!(c, '\n' | '\r' | '\t'))
    {
        Some(c) => Err(RenderError::MalformedContent {
            field: field.to_string(),
            reason: format!("control character U+{:04X}", c as u32),
        }),
        None => Ok(()),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
