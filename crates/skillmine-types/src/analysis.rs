use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::Source;

/// Summary of one prompt topic cluster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterSummary {
    pub cluster_id: u32,
    /// Joined top vectorized terms, or "misc" / "all prompts" for degenerate cases.
    pub label: String,
    pub count: u32,
    /// Up to 5 member prompts, truncated to 200 chars.
    pub example_prompts: Vec<String>,
    /// Up to 10 highest-weight centroid terms.
    pub top_terms: Vec<String>,
    pub sources: Vec<Source>,
}

/// A mined multi-step workflow: a group of raw tool subsequences sharing one
/// normalized form (consecutive duplicates collapsed).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowPattern {
    /// Highest-occurrence raw member of the group.
    pub pattern: Vec<String>,
    /// Shared normalized form; unique across the final output.
    pub normalized: Vec<String>,
    /// Total occurrences summed across the group.
    pub occurrences: u32,
    pub distinct_sessions: u32,
    pub sources: Vec<Source>,
    /// Up to 5 first prompts of contributing sessions, truncated to 200 chars.
    pub example_first_prompts: Vec<String>,
    /// Mean raw-member length across the group.
    pub avg_length: f64,
}

impl WorkflowPattern {
    pub fn pattern_display(&self) -> String {
        self.pattern.join(" → ")
    }

    pub fn normalized_display(&self) -> String {
        self.normalized.join(" → ")
    }
}

/// Category of a scored automation-unit candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CandidateKind {
    Skill,
    Subagent,
    Tool,
}

impl CandidateKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CandidateKind::Skill => "skill",
            CandidateKind::Subagent => "subagent",
            CandidateKind::Tool => "tool",
        }
    }
}

/// A scored, ranked suggestion for a reusable automation unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub kind: CandidateKind,
    pub label: String,
    pub score: f64,
    /// Ordered human-readable scoring factors.
    pub reasons: Vec<String>,
    pub count: u32,
    pub sources: Vec<Source>,
    pub examples: Vec<String>,
    /// Top matching workflow pattern; skill candidates only.
    pub workflow: Option<String>,
}

/// The three ranked candidate lists produced by the classifier.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Classifications {
    pub skills: Vec<Candidate>,
    pub subagents: Vec<Candidate>,
    pub tools: Vec<Candidate>,
}

/// Global usage count for one tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCount {
    pub tool_name: String,
    pub count: u32,
}

/// Per-source usage count for one tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceToolCount {
    pub source: Source,
    pub tool_name: String,
    pub count: u32,
}

/// Occurrence count for a contiguous within-turn tool sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceCount {
    pub sequence: Vec<String>,
    pub count: u32,
}

impl SequenceCount {
    pub fn display(&self) -> String {
        self.sequence.join(" → ")
    }
}

/// Count of two tools appearing together in the same turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairCount {
    pub tool_a: String,
    pub tool_b: String,
    pub count: u32,
}

/// Error statistics for one tool with at least one error-flagged call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolErrorStats {
    pub tool_name: String,
    pub error_count: u32,
    pub count: u32,
    pub error_rate_pct: f64,
}

/// Full tool-usage analysis result. Frequency tables are persisted as
/// relations; the rest is consumed in-memory by reporting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolUsageReport {
    pub frequency: Vec<ToolCount>,
    pub frequency_by_source: Vec<SourceToolCount>,
    /// Top sequences keyed by n, for n in {2, 3, 4}.
    pub ngrams: BTreeMap<usize, Vec<SequenceCount>>,
    pub cooccurrence: Vec<PairCount>,
    pub errors: Vec<ToolErrorStats>,
}
