use serde::{Deserialize, Deserializer, Serialize};

/// Title of the synthetic entry that stands in for experiences removed by pruning.
pub const OMISSION_NOTE_TITLE: &str = "Additional Experience";
const OMISSION_NOTE_COMPANY: &str = "Various Companies";
const OMISSION_NOTE_DURATION: &str = "Previous Roles";
const OMISSION_NOTE_BULLET: &str = "Additional professional experience available upon request.";

/// Normalized résumé content. Every list keeps the caller's order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResumeContent {
    pub summary: String,
    #[serde(alias = "experience")]
    pub experiences: Vec<Experience>,
    pub skills: Vec<String>,
    pub projects: Vec<Project>,
    pub certifications: Vec<String>,
    pub education: Vec<Education>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Experience {
    pub title: String,
    pub company: String,
    pub duration: String,
    #[serde(alias = "description", deserialize_with = "one_or_many")]
    pub bullets: Vec<String>,
    /// Set only on entries created by `omission_note`. Never read from input.
    #[serde(skip)]
    pub(crate) synthetic: bool,
}

impl Experience {
    /// The synthetic entry appended when pruning drops real experiences.
    pub fn omission_note() -> Self {
        Self {
            title: OMISSION_NOTE_TITLE.to_string(),
            company: OMISSION_NOTE_COMPANY.to_string(),
            duration: OMISSION_NOTE_DURATION.to_string(),
            bullets: vec![OMISSION_NOTE_BULLET.to_string()],
            synthetic: true,
        }
    }

    pub fn is_omission_note(&self) -> bool {
        self.synthetic
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Project {
    pub name: String,
    #[serde(alias = "description", deserialize_with = "one_or_many")]
    pub bullets: Vec<String>,
    pub technologies: Vec<String>,
}

/// Display-only record. Pruning removes it wholesale or not at all.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Education {
    pub degree: String,
    pub institution: String,
    pub year: String,
    pub gpa: String,
}

/// Name and contact line printed above the content. Never compressed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentHeader {
    pub name: String,
    pub contact_line: String,
}

/// Accepts either a single string or a list of strings.
/// A blank single string becomes an empty list.
fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(s) if s.trim().is_empty() => Vec::new(),
        OneOrMany::One(s) => vec![s],
        OneOrMany::Many(v) => v,
    })
}
