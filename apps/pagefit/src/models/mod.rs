pub mod resume;
pub mod typography;

pub use resume::{DocumentHeader, Education, Experience, Project, ResumeContent};
pub use typography::{TypographyLimits, TypographySettings, TypographyStep};
