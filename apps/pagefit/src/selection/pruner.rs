//! Content pruner: removes résumé content in two escalating tiers.
//!
//! - Tier 1 (`prune_by_relevance`): relevance-ranked top-K per section, sized by target pages.
//! - Tier 2 (`prune_aggressively`): fixed, terminal cut down to one experience and one project.
//! - `minimal_placeholder`: the fixed content rendered when even Tier 2 does not fit.
//!
//! Pruners never mutate their input; they return a new `ResumeContent`.
//! Truncation always keeps a stable prefix of the relevance order.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::models::{Experience, Project, ResumeContent};
use crate::selection::relevance::{rank_by_relevance, RelevanceContext};

const ELLIPSIS: &str = "...";

// ────────────────────────────────────────────────────────────────────────────
// Thresholds
// ────────────────────────────────────────────────────────────────────────────

/// Per-section caps for one pruning profile. `None` leaves that dimension untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionLimits {
    /// Includes the synthetic "Additional Experience" note when one is appended.
    pub max_experiences: usize,
    pub max_bullets_per_experience: Option<usize>,
    pub max_skills: usize,
    pub max_projects: usize,
    pub max_bullets_per_project: Option<usize>,
    pub max_summary_chars: Option<usize>,
}

/// Limits for the aggressive tier. Experiences and projects are fixed at one each.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggressiveLimits {
    pub max_skills: usize,
    pub max_summary_chars: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PruningThresholds {
    pub single_page: SectionLimits,
    pub multi_page: SectionLimits,
    pub aggressive: AggressiveLimits,
}

impl Default for PruningThresholds {
    fn default() -> Self {
        Self {
            single_page: SectionLimits {
                max_experiences: 2,
                max_bullets_per_experience: Some(2),
                max_skills: 6,
                max_projects: 1,
                max_bullets_per_project: Some(1),
                max_summary_chars: Some(150),
            },
            multi_page: SectionLimits {
                max_experiences: 5,
                max_bullets_per_experience: None,
                max_skills: 15,
                max_projects: 4,
                max_bullets_per_project: None,
                max_summary_chars: None,
            },
            aggressive: AggressiveLimits {
                max_skills: 4,
                max_summary_chars: 100,
            },
        }
    }
}

impl PruningThresholds {
    pub fn for_target(&self, target_pages: u32) -> &SectionLimits {
        if target_pages <= 1 {
            &self.single_page
        } else {
            &self.multi_page
        }
    }

    pub fn validate(&self) -> Result<()> {
        for (name, limits) in [("single_page", &self.single_page), ("multi_page", &self.multi_page)] {
            if limits.max_experiences == 0 {
                bail!("pruning.{name}.max_experiences must be at least 1");
            }
        }
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tier 1
// ────────────────────────────────────────────────────────────────────────────

/// Relevance-guided trim. Certifications and education pass through untouched.
pub fn prune_by_relevance(
    content: &ResumeContent,
    context: &RelevanceContext,
    target_pages: u32,
    thresholds: &PruningThresholds,
) -> ResumeContent {
    let limits = thresholds.for_target(target_pages);

    let experiences = select_experiences(content, context, limits);
    let skills = top_n(&content.skills, context, limits.max_skills);
    let projects: Vec<Project> = rank_by_relevance(&content.projects, context)
        .into_iter()
        .take(limits.max_projects)
        .map(|p| with_project_bullets(p, limits.max_bullets_per_project))
        .collect();
    let summary = match limits.max_summary_chars {
        Some(max) => truncate_chars(&content.summary, max),
        None => content.summary.clone(),
    };

    info!(
        target_pages,
        experiences_before = content.experiences.len(),
        experiences_after = experiences.len(),
        skills_before = content.skills.len(),
        skills_after = skills.len(),
        projects_before = content.projects.len(),
        projects_after = projects.len(),
        "Applied relevance pruning"
    );

    ResumeContent {
        summary,
        experiences,
        skills,
        projects,
        certifications: content.certifications.clone(),
        education: content.education.clone(),
    }
}

/// Keeps the top real experiences and appends the omission note when anything was dropped.
///
/// The note takes one of the `max_experiences` slots. At least one real experience survives.
fn select_experiences(
    content: &ResumeContent,
    context: &RelevanceContext,
    limits: &SectionLimits,
) -> Vec<Experience> {
    let real: Vec<Experience> = content
        .experiences
        .iter()
        .filter(|e| !e.is_omission_note())
        .cloned()
        .collect();
    let had_note = real.len() < content.experiences.len();

    if real.is_empty() {
        return if had_note { vec![Experience::omission_note()] } else { Vec::new() };
    }

    let limit = limits.max_experiences.max(1);
    let needs_note = had_note || real.len() > limit;
    let real_cap = if needs_note { (limit - 1).max(1) } else { limit };

    let mut kept: Vec<Experience> = rank_by_relevance(&real, context)
        .into_iter()
        .take(real_cap)
        .map(|e| with_experience_bullets(e, limits.max_bullets_per_experience))
        .collect();

    if needs_note {
        kept.push(Experience::omission_note());
    }
    kept
}

// ────────────────────────────────────────────────────────────────────────────
// Tier 2
// ────────────────────────────────────────────────────────────────────────────

/// Terminal, non-tunable trim. Idempotent: applying it twice equals applying it once.
pub fn prune_aggressively(
    content: &ResumeContent,
    context: &RelevanceContext,
    thresholds: &PruningThresholds,
) -> ResumeContent {
    let limits = &thresholds.aggressive;

    let real: Vec<Experience> = content
        .experiences
        .iter()
        .filter(|e| !e.is_omission_note())
        .cloned()
        .collect();
    let had_note = real.len() < content.experiences.len();

    let mut experiences: Vec<Experience> = rank_by_relevance(&real, context)
        .into_iter()
        .take(1)
        .map(|e| with_experience_bullets(e, Some(1)))
        .collect();
    if !experiences.is_empty() || had_note {
        experiences.push(Experience::omission_note());
    }

    let projects: Vec<Project> = rank_by_relevance(&content.projects, context)
        .into_iter()
        .take(1)
        .map(|p| with_project_bullets(p, Some(1)))
        .collect();

    let pruned = ResumeContent {
        summary: truncate_chars(&content.summary, limits.max_summary_chars),
        experiences,
        skills: top_n(&content.skills, context, limits.max_skills),
        projects,
        certifications: Vec::new(),
        education: Vec::new(),
    };

    info!(
        experiences = pruned.experiences.len(),
        skills = pruned.skills.len(),
        projects = pruned.projects.len(),
        certifications_removed = content.certifications.len(),
        education_removed = content.education.len(),
        "Applied aggressive pruning"
    );

    pruned
}

// ────────────────────────────────────────────────────────────────────────────
// Minimal placeholder
// ────────────────────────────────────────────────────────────────────────────

/// Fixed content small enough to fit on one page at any typography within limits.
pub fn minimal_placeholder() -> ResumeContent {
    ResumeContent {
        summary: "Professional summary available upon request.".to_string(),
        experiences: vec![Experience {
            title: "Professional Experience".to_string(),
            company: "Various Companies".to_string(),
            duration: "Current".to_string(),
            bullets: vec!["Additional experience available upon request.".to_string()],
            ..Experience::default()
        }],
        skills: vec!["Skills list available upon request.".to_string()],
        projects: Vec::new(),
        certifications: Vec::new(),
        education: Vec::new(),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Internal helpers
// ────────────────────────────────────────────────────────────────────────────

fn top_n(items: &[String], context: &RelevanceContext, n: usize) -> Vec<String> {
    rank_by_relevance(items, context)
        .into_iter()
        .take(n)
        .cloned()
        .collect()
}

fn with_experience_bullets(exp: &Experience, max: Option<usize>) -> Experience {
    let mut exp = exp.clone();
    if let Some(max) = max {
        exp.bullets.truncate(max);
    }
    exp
}

fn with_project_bullets(project: &Project, max: Option<usize>) -> Project {
    let mut project = project.clone();
    if let Some(max) = max {
        project.bullets.truncate(max);
    }
    project
}

/// Cuts `text` to `max` characters and appends "..." when it was longer.
/// Counts chars, not bytes, so multi-byte text never splits mid-codepoint.
pub(crate) fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max).collect();
    cut.push_str(ELLIPSIS);
    cut
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Education;

    fn experience(title: &str, bullet_count: usize) -> Experience {
        Experience {
            title: title.to_string(),
            company: "Acme".to_string(),
            duration: "2020-2023".to_string(),
            bullets: (0..bullet_count)
                .map(|i| format!("{title} achievement {i}"))
                .collect(),
            ..Experience::default()
        }
    }

    fn project(name: &str, bullet_count: usize) -> Project {
        Project {
            name: name.to_string(),
            bullets: (0..bullet_count).map(|i| format!("{name} detail {i}")).collect(),
            technologies: vec!["Rust".to_string()],
        }
    }

    fn rich_content() -> ResumeContent {
        ResumeContent {
            summary: "x".repeat(300),
            experiences: vec![
                experience("Java Developer", 5),
                experience("Python Engineer", 5),
                experience("Support Analyst", 5),
                experience("SQL Analyst", 5),
                experience("Python SQL Lead", 5),
                experience("Intern", 5),
            ],
            skills: (0..20).map(|i| format!("Skill {i}")).collect(),
            projects: vec![project("Game", 3), project("Python tool", 3), project("Blog", 3)],
            certifications: vec!["AWS Certified Developer".to_string()],
            education: vec![Education {
                degree: "BSc Computer Science".to_string(),
                ..Default::default()
            }],
        }
    }

    fn ctx() -> RelevanceContext {
        RelevanceContext::new(["python", "sql"])
    }

    // ── Tier 1 ──────────────────────────────────────────────────────────────

    #[test]
    fn test_single_page_bounds() {
        let pruned = prune_by_relevance(&rich_content(), &ctx(), 1, &PruningThresholds::default());
        assert!(pruned.experiences.len() <= 2, "got {}", pruned.experiences.len());
        assert!(pruned.skills.len() <= 6);
        assert!(pruned.projects.len() <= 1);
        for exp in &pruned.experiences {
            assert!(exp.bullets.len() <= 2, "single page keeps at most 2 bullets");
        }
        assert!(pruned.projects[0].bullets.len() <= 1);
    }

    #[test]
    fn test_multi_page_bounds_leave_bullets() {
        let pruned = prune_by_relevance(&rich_content(), &ctx(), 2, &PruningThresholds::default());
        assert!(pruned.experiences.len() <= 5);
        assert!(pruned.skills.len() <= 15);
        assert!(pruned.projects.len() <= 4);
        let real = pruned.experiences.iter().find(|e| !e.is_omission_note()).unwrap();
        assert_eq!(real.bullets.len(), 5, "multi page does not trim bullets");
    }

    #[test]
    fn test_most_relevant_experience_first() {
        let pruned = prune_by_relevance(&rich_content(), &ctx(), 1, &PruningThresholds::default());
        assert_eq!(pruned.experiences[0].title, "Python SQL Lead");
    }

    #[test]
    fn test_omission_note_appended_when_dropping() {
        let pruned = prune_by_relevance(&rich_content(), &ctx(), 2, &PruningThresholds::default());
        assert!(pruned.experiences.last().unwrap().is_omission_note());
        assert_eq!(pruned.experiences.len(), 5);
    }

    #[test]
    fn test_no_note_when_nothing_dropped() {
        let content = ResumeContent {
            experiences: vec![experience("Python Engineer", 3)],
            ..Default::default()
        };
        let pruned = prune_by_relevance(&content, &ctx(), 1, &PruningThresholds::default());
        assert_eq!(pruned.experiences.len(), 1);
        assert!(!pruned.experiences[0].is_omission_note());
        assert_eq!(pruned.experiences[0].bullets.len(), 2);
    }

    #[test]
    fn test_summary_truncated_for_single_page_only() {
        let thresholds = PruningThresholds::default();
        let one = prune_by_relevance(&rich_content(), &ctx(), 1, &thresholds);
        assert_eq!(one.summary.chars().count(), 153);
        assert!(one.summary.ends_with("..."));
        let two = prune_by_relevance(&rich_content(), &ctx(), 2, &thresholds);
        assert_eq!(two.summary.len(), 300);
    }

    #[test]
    fn test_summary_boundary_at_150_chars() {
        let thresholds = PruningThresholds::default();
        let exact = ResumeContent {
            summary: "s".repeat(150),
            ..Default::default()
        };
        let pruned = prune_by_relevance(&exact, &ctx(), 1, &thresholds);
        assert_eq!(pruned.summary, exact.summary, "150 chars stays untouched");

        let over = ResumeContent {
            summary: "s".repeat(151),
            ..Default::default()
        };
        let pruned = prune_by_relevance(&over, &ctx(), 1, &thresholds);
        assert_eq!(pruned.summary, format!("{}...", "s".repeat(150)));
    }

    #[test]
    fn test_real_experience_with_note_text_is_ranked() {
        let lookalike = Experience {
            title: "Additional Experience".to_string(),
            company: "Various Companies".to_string(),
            duration: "Previous Roles".to_string(),
            bullets: vec!["Python consulting".to_string()],
            ..Experience::default()
        };
        let content = ResumeContent {
            experiences: vec![lookalike.clone()],
            ..Default::default()
        };
        let pruned = prune_by_relevance(&content, &ctx(), 1, &PruningThresholds::default());
        assert_eq!(pruned.experiences, vec![lookalike.clone()], "input entry must survive as real");

        let tier2 = prune_aggressively(&content, &ctx(), &PruningThresholds::default());
        assert_eq!(tier2.experiences[0], lookalike);
        assert!(tier2.experiences[1].is_omission_note());
    }

    #[test]
    fn test_tier1_leaves_certifications_and_education() {
        let content = rich_content();
        let pruned = prune_by_relevance(&content, &ctx(), 1, &PruningThresholds::default());
        assert_eq!(pruned.certifications, content.certifications);
        assert_eq!(pruned.education, content.education);
    }

    #[test]
    fn test_tier1_does_not_mutate_input() {
        let content = rich_content();
        let before = content.clone();
        let _ = prune_by_relevance(&content, &ctx(), 1, &PruningThresholds::default());
        assert_eq!(content, before);
    }

    // ── Tier 2 ──────────────────────────────────────────────────────────────

    #[test]
    fn test_aggressive_shape() {
        let pruned = prune_aggressively(&rich_content(), &ctx(), &PruningThresholds::default());
        assert_eq!(pruned.experiences.len(), 2);
        assert_eq!(pruned.experiences[0].title, "Python SQL Lead");
        assert_eq!(pruned.experiences[0].bullets.len(), 1);
        assert!(pruned.experiences[1].is_omission_note());
        assert_eq!(pruned.skills.len(), 4);
        assert_eq!(pruned.projects.len(), 1);
        assert_eq!(pruned.projects[0].name, "Python tool");
        assert_eq!(pruned.projects[0].bullets.len(), 1);
        assert_eq!(pruned.summary.chars().count(), 103);
        assert!(pruned.certifications.is_empty());
        assert!(pruned.education.is_empty());
    }

    #[test]
    fn test_aggressive_is_idempotent() {
        let thresholds = PruningThresholds::default();
        let once = prune_aggressively(&rich_content(), &ctx(), &thresholds);
        let twice = prune_aggressively(&once, &ctx(), &thresholds);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_aggressive_after_tier1_never_ranks_note_as_real() {
        let thresholds = PruningThresholds::default();
        let no_keywords = RelevanceContext::default();
        let tier1 = prune_by_relevance(&rich_content(), &no_keywords, 1, &thresholds);
        let tier2 = prune_aggressively(&tier1, &no_keywords, &thresholds);
        assert!(!tier2.experiences[0].is_omission_note());
        assert_eq!(tier2.experiences.iter().filter(|e| e.is_omission_note()).count(), 1);
    }

    #[test]
    fn test_aggressive_on_empty_content() {
        let pruned = prune_aggressively(
            &ResumeContent::default(),
            &ctx(),
            &PruningThresholds::default(),
        );
        assert_eq!(pruned, ResumeContent::default());
    }

    // ── helpers ─────────────────────────────────────────────────────────────

    #[test]
    fn test_truncate_chars_respects_multibyte() {
        let text = "é".repeat(10);
        let cut = truncate_chars(&text, 4);
        assert_eq!(cut, "éééé...");
        assert_eq!(truncate_chars("short", 150), "short");
    }

    #[test]
    fn test_minimal_placeholder_is_small() {
        let minimal = minimal_placeholder();
        assert_eq!(minimal.experiences.len(), 1);
        assert_eq!(minimal.skills.len(), 1);
        assert!(minimal.projects.is_empty());
    }

    #[test]
    fn test_zero_experience_limit_rejected() {
        let mut thresholds = PruningThresholds::default();
        thresholds.single_page.max_experiences = 0;
        assert!(thresholds.validate().is_err());
    }
}
