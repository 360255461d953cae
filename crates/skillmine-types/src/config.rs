use std::collections::HashSet;
use std::path::PathBuf;

// NOTE: Configuration Object Rationale
//
// Source roots and scoring vocabularies are passed as explicit configuration
// objects into the extractor and classifier rather than read from module
// globals. Two pipelines with different roots or vocabularies can coexist in
// one process, and tests can inject temp-dir roots without touching the
// environment.

/// Root locations of the three log sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRoots {
    /// Claude session trees, one subdirectory per project.
    pub claude_root: PathBuf,
    /// Codex session files.
    pub codex_root: PathBuf,
    /// Codex flat auxiliary history log, keyed by session id.
    pub codex_history: PathBuf,
    /// Lemon agent session files.
    pub lemon_root: PathBuf,
}

impl Default for SourceRoots {
    fn default() -> Self {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        Self {
            claude_root: home.join(".claude").join("projects"),
            codex_root: home.join(".codex").join("sessions"),
            codex_history: home.join(".codex").join("history.jsonl"),
            lemon_root: home.join(".lemon").join("agent").join("sessions"),
        }
    }
}

/// Knobs for the extraction phase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Cap on files processed per source (for testing).
    pub max_files: Option<usize>,
    /// Worker pool size override; defaults to the CPU core count.
    pub workers: Option<usize>,
    /// Skip the lemon source entirely.
    pub skip_lemon: bool,
}

/// Vocabularies driving the candidate scoring rules.
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    /// Action verbs whose presence in a cluster label signals clear intent.
    pub intent_verbs: HashSet<String>,
    /// Research/exploration vocabulary for subagent scoring.
    pub exploration_terms: HashSet<String>,
    /// Tool names that read or search without mutating.
    pub exploration_tools: HashSet<String>,
    /// Tool names that edit files or execute commands.
    pub mutation_tools: HashSet<String>,
}

const INTENT_VERBS: &[&str] = &[
    "fix", "add", "create", "implement", "update", "refactor", "test", "review", "debug", "deploy",
];

const EXPLORATION_TERMS: &[&str] = &[
    "find", "search", "understand", "explore", "look", "check", "investigate", "review", "analyze",
];

const EXPLORATION_TOOLS: &[&str] = &[
    "Read", "read", "Grep", "grep", "Glob", "glob", "find", "ls", "cat", "head",
];

const MUTATION_TOOLS: &[&str] = &[
    "Edit", "edit", "Write", "write", "Bash", "bash", "exec_command", "shell",
];

fn to_set(words: &[&str]) -> HashSet<String> {
    words.iter().map(|w| w.to_string()).collect()
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            intent_verbs: to_set(INTENT_VERBS),
            exploration_terms: to_set(EXPLORATION_TERMS),
            exploration_tools: to_set(EXPLORATION_TOOLS),
            mutation_tools: to_set(MUTATION_TOOLS),
        }
    }
}

impl ClassifierConfig {
    /// Case-insensitive membership against the exploration tool set.
    pub fn is_exploration_tool(&self, tool: &str) -> bool {
        let lower = tool.to_lowercase();
        self.exploration_tools.iter().any(|t| t.to_lowercase() == lower)
    }

    /// Case-insensitive membership against the mutation tool set.
    pub fn is_mutation_tool(&self, tool: &str) -> bool {
        let lower = tool.to_lowercase();
        self.mutation_tools.iter().any(|t| t.to_lowercase() == lower)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_vocabularies_present() {
        let config = ClassifierConfig::default();
        assert!(config.intent_verbs.contains("fix"));
        assert!(config.exploration_terms.contains("investigate"));
        assert!(config.is_exploration_tool("Read"));
        assert!(config.is_mutation_tool("Edit"));
    }

    #[test]
    fn test_tool_membership_is_case_insensitive() {
        let config = ClassifierConfig::default();
        assert!(config.is_exploration_tool("GREP"));
        assert!(config.is_mutation_tool("bash"));
        assert!(!config.is_exploration_tool("Task"));
    }
}
