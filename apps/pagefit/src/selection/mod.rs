// Content selection: keyword relevance scoring and the two pruning tiers.
// Pure functions over `ResumeContent`; no rendering happens here.

pub mod pruner;
pub mod relevance;

pub use pruner::{
    minimal_placeholder, prune_aggressively, prune_by_relevance, AggressiveLimits,
    PruningThresholds, SectionLimits,
};
pub use relevance::{rank_by_relevance, score, RelevanceContext, Scorable};
