//! Turns a header plus `ResumeContent` into styled blocks ready for pagination.
//!
//! Every size and gap is derived from the body font size so that typography
//! degradation shrinks the whole document, not just body text.

use crate::layout::flow::{Align, Block, Paragraph, TextStyle};
use crate::layout::font_metrics::FontFace;
use crate::models::{DocumentHeader, Education, Experience, Project, ResumeContent, TypographySettings};

const POINTS_PER_INCH: f32 = 72.0;
const BULLET_PREFIX: &str = "\u{2022} ";
const SEPARATOR: &str = " \u{2022} ";

pub const HEADING_SUMMARY: &str = "PROFESSIONAL SUMMARY";
pub const HEADING_EXPERIENCE: &str = "PROFESSIONAL EXPERIENCE";
pub const HEADING_SKILLS: &str = "TECHNICAL SKILLS & EXPERTISE";
pub const HEADING_PROJECTS: &str = "PROJECTS & ACHIEVEMENTS";
pub const HEADING_CERTIFICATIONS: &str = "CERTIFICATIONS & TRAINING";
pub const HEADING_EDUCATION: &str = "EDUCATION";

// ────────────────────────────────────────────────────────────────────────────
// Styles
// ────────────────────────────────────────────────────────────────────────────

/// One `TextStyle` per kind of line in the document.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentStyles {
    pub name: TextStyle,
    pub contact: TextStyle,
    pub section: TextStyle,
    pub job_title: TextStyle,
    pub company: TextStyle,
    pub bullet: TextStyle,
    pub summary: TextStyle,
    pub skill: TextStyle,
    pub project_name: TextStyle,
    pub technologies: TextStyle,
    pub certification: TextStyle,
    pub education: TextStyle,
    /// Gap after each job or project entry.
    pub entry_gap_pt: f32,
}

impl DocumentStyles {
    pub fn for_typography(typography: &TypographySettings) -> Self {
        let f = typography.font_size_pt as f32;
        let spacing = typography.line_spacing as f32;
        let margin_pt = typography.margin_inches as f32 * POINTS_PER_INCH;
        let indent = (margin_pt * 0.2).max(10.8);

        let body = |face: FontFace, size: f32, after: f32, indent_pt: f32| TextStyle {
            face,
            size_pt: size,
            leading_pt: size * spacing,
            space_before_pt: 0.0,
            space_after_pt: after,
            indent_pt,
            align: Align::Left,
        };

        let name_size = (f + 14.0).max(18.0);
        let section_size = (f + 2.0).max(10.0);

        Self {
            name: TextStyle {
                leading_pt: (name_size * spacing).max(22.0),
                align: Align::Center,
                ..body(FontFace::Bold, name_size, 0.0, 0.0)
            },
            contact: TextStyle {
                align: Align::Center,
                ..body(FontFace::Regular, f, (f * 1.2).max(12.0), 0.0)
            },
            section: TextStyle {
                space_before_pt: (f * 1.2).max(12.0),
                ..body(FontFace::Bold, section_size, (f * 0.6).max(6.0), 0.0)
            },
            job_title: body(FontFace::Bold, (f + 1.0).max(9.0), (f * 0.1).max(1.0), 0.0),
            company: body(FontFace::Oblique, f, (f * 0.4).max(4.0), 0.0),
            bullet: body(FontFace::Regular, f, (f * 0.2).max(2.0), indent),
            summary: body(FontFace::Regular, f, (f * 0.6).max(6.0), 0.0),
            skill: body(FontFace::Regular, f, (f * 0.1).max(1.0), indent),
            project_name: body(FontFace::Bold, f, (f * 0.1).max(1.0), 0.0),
            technologies: body(FontFace::Oblique, f, (f * 0.2).max(2.0), indent),
            certification: body(FontFace::Regular, f, (f * 0.2).max(2.0), indent),
            education: body(FontFace::Regular, f, (f * 0.2).max(2.0), 0.0),
            entry_gap_pt: (f * 0.36).max(3.6),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Composition
// ────────────────────────────────────────────────────────────────────────────

/// Builds the block list. Empty sections are omitted; the heading of each
/// section is kept on the same page as its first entry.
pub fn compose(
    header: &DocumentHeader,
    content: &ResumeContent,
    typography: &TypographySettings,
) -> Vec<Block> {
    let styles = DocumentStyles::for_typography(typography);
    let mut blocks = vec![header_block(header, &styles)];

    if !content.summary.trim().is_empty() {
        push_section(
            &mut blocks,
            &styles,
            HEADING_SUMMARY,
            vec![Block {
                paragraphs: vec![para(&content.summary, styles.summary)],
                keep_together: false,
                space_after_pt: 0.0,
            }],
        );
    }

    push_section(
        &mut blocks,
        &styles,
        HEADING_EXPERIENCE,
        content
            .experiences
            .iter()
            .map(|e| experience_block(e, &styles))
            .collect(),
    );

    push_section(
        &mut blocks,
        &styles,
        HEADING_SKILLS,
        simple_entries(&content.skills, styles.skill),
    );

    push_section(
        &mut blocks,
        &styles,
        HEADING_PROJECTS,
        content
            .projects
            .iter()
            .map(|p| project_block(p, &styles))
            .collect(),
    );

    push_section(
        &mut blocks,
        &styles,
        HEADING_CERTIFICATIONS,
        simple_entries(&content.certifications, styles.certification),
    );

    push_section(
        &mut blocks,
        &styles,
        HEADING_EDUCATION,
        content
            .education
            .iter()
            .map(|e| education_block(e, &styles))
            .collect(),
    );

    blocks
}

fn para(text: &str, style: TextStyle) -> Paragraph {
    Paragraph {
        text: text.to_string(),
        style,
    }
}

fn header_block(header: &DocumentHeader, styles: &DocumentStyles) -> Block {
    let mut paragraphs = Vec::new();
    if !header.name.trim().is_empty() {
        paragraphs.push(para(&header.name, styles.name));
    }
    if !header.contact_line.trim().is_empty() {
        paragraphs.push(para(&header.contact_line, styles.contact));
    }
    Block {
        paragraphs,
        keep_together: true,
        space_after_pt: 0.0,
    }
}

/// Appends a section. The heading is folded into the first entry so the two
/// never land on different pages.
fn push_section(blocks: &mut Vec<Block>, styles: &DocumentStyles, heading: &str, entries: Vec<Block>) {
    let mut entries = entries.into_iter().filter(|b| !b.paragraphs.is_empty());
    let Some(mut first) = entries.next() else {
        return;
    };

    first.paragraphs.insert(0, para(heading, styles.section));
    // Single-paragraph entries (summary, skills) stay with their heading.
    if !first.keep_together && first.paragraphs.len() <= 2 {
        first.keep_together = true;
    }
    blocks.push(first);
    blocks.extend(entries);
}

fn experience_block(exp: &Experience, styles: &DocumentStyles) -> Block {
    let mut paragraphs = Vec::new();
    if !exp.title.trim().is_empty() {
        paragraphs.push(para(&exp.title, styles.job_title));
    }
    let meta = join_nonblank(&[&exp.company, &exp.duration], SEPARATOR);
    if !meta.is_empty() {
        paragraphs.push(para(&meta, styles.company));
    }
    paragraphs.extend(bullets(&exp.bullets, styles.bullet));
    Block {
        paragraphs,
        keep_together: true,
        space_after_pt: styles.entry_gap_pt,
    }
}

fn project_block(project: &Project, styles: &DocumentStyles) -> Block {
    let mut paragraphs = Vec::new();
    if !project.name.trim().is_empty() {
        paragraphs.push(para(&project.name, styles.project_name));
    }
    paragraphs.extend(bullets(&project.bullets, styles.bullet));
    let technologies: Vec<&str> = project
        .technologies
        .iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .collect();
    if !technologies.is_empty() {
        paragraphs.push(para(
            &format!("Technologies: {}", technologies.join(", ")),
            styles.technologies,
        ));
    }
    Block {
        paragraphs,
        keep_together: true,
        space_after_pt: styles.entry_gap_pt,
    }
}

fn education_block(edu: &Education, styles: &DocumentStyles) -> Block {
    let mut paragraphs = Vec::new();
    if !edu.degree.trim().is_empty() {
        paragraphs.push(para(&edu.degree, styles.job_title));
    }
    if !edu.institution.trim().is_empty() {
        paragraphs.push(para(&edu.institution, styles.company));
    }
    let gpa = if edu.gpa.trim().is_empty() {
        String::new()
    } else {
        format!("GPA: {}", edu.gpa.trim())
    };
    let meta = join_nonblank(&[&edu.year, &gpa], SEPARATOR);
    if !meta.is_empty() {
        paragraphs.push(para(&meta, styles.education));
    }
    Block {
        paragraphs,
        keep_together: true,
        space_after_pt: styles.entry_gap_pt,
    }
}

fn simple_entries(items: &[String], style: TextStyle) -> Vec<Block> {
    items
        .iter()
        .filter(|s| !s.trim().is_empty())
        .map(|s| Block {
            paragraphs: vec![para(&format!("{BULLET_PREFIX}{}", s.trim()), style)],
            keep_together: false,
            space_after_pt: 0.0,
        })
        .collect()
}

fn bullets(items: &[String], style: TextStyle) -> impl Iterator<Item = Paragraph> + '_ {
    items
        .iter()
        .filter(|b| !b.trim().is_empty())
        .map(move |b| para(&format!("{BULLET_PREFIX}{}", b.trim()), style))
}

fn join_nonblank(parts: &[&str], separator: &str) -> String {
    parts
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(separator)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn header() -> DocumentHeader {
        DocumentHeader {
            name: "Jane Doe".to_string(),
            contact_line: "jane@example.com | 555-0100".to_string(),
        }
    }

    fn all_text(blocks: &[Block]) -> Vec<String> {
        blocks
            .iter()
            .flat_map(|b| b.paragraphs.iter().map(|p| p.text.clone()))
            .collect()
    }

    #[test]
    fn test_name_size_scales_with_floor() {
        let small = DocumentStyles::for_typography(&TypographySettings {
            font_size_pt: 2.0,
            ..TypographySettings::default()
        });
        assert_eq!(small.name.size_pt, 18.0, "name never shrinks below 18pt");

        let normal = DocumentStyles::for_typography(&TypographySettings::default());
        assert_eq!(normal.name.size_pt, 24.0);
        assert_eq!(normal.section.size_pt, 12.0);
        assert_eq!(normal.job_title.size_pt, 11.0);
    }

    #[test]
    fn test_leading_follows_line_spacing() {
        let styles = DocumentStyles::for_typography(&TypographySettings {
            font_size_pt: 10.0,
            margin_inches: 0.75,
            line_spacing: 1.5,
        });
        assert!((styles.bullet.leading_pt - 15.0).abs() < 1e-4);
    }

    #[test]
    fn test_empty_sections_omitted() {
        let content = ResumeContent {
            skills: vec!["Rust".to_string()],
            ..ResumeContent::default()
        };
        let text = all_text(&compose(&header(), &content, &TypographySettings::default()));
        assert!(text.contains(&HEADING_SKILLS.to_string()));
        assert!(!text.contains(&HEADING_EXPERIENCE.to_string()), "no experiences, no heading");
        assert!(!text.contains(&HEADING_SUMMARY.to_string()));
    }

    #[test]
    fn test_heading_attached_to_first_entry() {
        let content = ResumeContent {
            experiences: vec![
                Experience {
                    title: "Engineer".to_string(),
                    company: "Acme".to_string(),
                    duration: "2020-2024".to_string(),
                    bullets: vec!["Shipped things".to_string()],
                    ..Experience::default()
                },
                Experience {
                    title: "Intern".to_string(),
                    ..Experience::default()
                },
            ],
            ..ResumeContent::default()
        };
        let blocks = compose(&header(), &content, &TypographySettings::default());
        let first_job = &blocks[1];
        assert_eq!(first_job.paragraphs[0].text, HEADING_EXPERIENCE);
        assert_eq!(first_job.paragraphs[1].text, "Engineer");
        assert_eq!(first_job.paragraphs[2].text, "Acme \u{2022} 2020-2024");
        assert_eq!(first_job.paragraphs[3].text, "\u{2022} Shipped things");
        assert!(first_job.keep_together);
        assert_eq!(blocks[2].paragraphs[0].text, "Intern");
    }

    #[test]
    fn test_project_technologies_line() {
        let content = ResumeContent {
            projects: vec![Project {
                name: "Pipeline".to_string(),
                bullets: vec![],
                technologies: vec!["Rust".to_string(), " ".to_string(), "Kafka".to_string()],
            }],
            ..ResumeContent::default()
        };
        let text = all_text(&compose(&header(), &content, &TypographySettings::default()));
        assert!(text.contains(&"Technologies: Rust, Kafka".to_string()), "got {text:?}");
    }

    #[test]
    fn test_education_year_and_gpa_line() {
        let content = ResumeContent {
            education: vec![Education {
                degree: "BSc Computer Science".to_string(),
                institution: "State University".to_string(),
                year: "2019".to_string(),
                gpa: "3.8".to_string(),
            }],
            ..ResumeContent::default()
        };
        let text = all_text(&compose(&header(), &content, &TypographySettings::default()));
        assert!(text.contains(&"2019 \u{2022} GPA: 3.8".to_string()), "got {text:?}");
    }

    #[test]
    fn test_compose_does_not_touch_input() {
        let content = ResumeContent {
            summary: "Backend engineer".to_string(),
            skills: vec!["Go".to_string()],
            ..ResumeContent::default()
        };
        let before = content.clone();
        let _ = compose(&header(), &content, &TypographySettings::default());
        assert_eq!(content, before);
    }
}
