use skillmine_types::{ClassifierConfig, ClusterSummary, WorkflowPattern, format_sources};

// NOTE: Scoring Rule Rationale
//
// Each factor is an independent pure function: features in, optional
// (delta, reason) out. The classifier folds an ordered rule list, so a new
// factor is one function plus one array entry, and every rule is unit
// testable on its own.

/// One rule's contribution. A reason is attached only where a human-facing
/// explanation is worth surfacing.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ScoreDelta {
    pub delta: f64,
    pub reason: Option<String>,
}

impl ScoreDelta {
    fn new(delta: f64, reason: impl Into<String>) -> Option<Self> {
        Some(Self { delta, reason: Some(reason.into()) })
    }

    fn silent(delta: f64) -> Option<Self> {
        Some(Self { delta, reason: None })
    }
}

/// Fold an ordered rule list into (total score, ordered reasons).
pub(crate) fn apply_rules<F>(
    rules: &[fn(&F, &ClassifierConfig) -> Option<ScoreDelta>],
    features: &F,
    config: &ClassifierConfig,
) -> (f64, Vec<String>) {
    let mut score = 0.0;
    let mut reasons = Vec::new();
    for rule in rules {
        if let Some(outcome) = rule(features, config) {
            score += outcome.delta;
            if let Some(reason) = outcome.reason {
                reasons.push(reason);
            }
        }
    }
    ((score * 10.0).round() / 10.0, reasons)
}

// --- Skill rules (per cluster) ---

pub(crate) struct SkillFeatures<'a> {
    pub cluster: &'a ClusterSummary,
    /// Highest-occurrence workflow whose example prompts overlap the
    /// cluster's examples, if any.
    pub best_workflow: Option<&'a WorkflowPattern>,
}

pub(crate) type SkillRule = fn(&SkillFeatures, &ClassifierConfig) -> Option<ScoreDelta>;

pub(crate) const SKILL_RULES: &[SkillRule] = &[
    skill_count_tier,
    skill_cross_source,
    skill_workflow_overlap,
    skill_intent_verb,
];

fn skill_count_tier(features: &SkillFeatures, _: &ClassifierConfig) -> Option<ScoreDelta> {
    let count = features.cluster.count;
    if count >= 20 {
        ScoreDelta::new(3.0, format!("high frequency ({} occurrences)", count))
    } else if count >= 10 {
        ScoreDelta::new(2.0, format!("moderate frequency ({})", count))
    } else if count >= 5 {
        ScoreDelta::silent(1.0)
    } else {
        None
    }
}

fn skill_cross_source(features: &SkillFeatures, _: &ClassifierConfig) -> Option<ScoreDelta> {
    let sources = &features.cluster.sources;
    if sources.len() > 1 {
        ScoreDelta::new(1.0, format!("cross-source ({})", format_sources(sources)))
    } else {
        None
    }
}

fn skill_workflow_overlap(features: &SkillFeatures, _: &ClassifierConfig) -> Option<ScoreDelta> {
    let workflow = features.best_workflow?;
    let steps = workflow.normalized.len();
    if steps >= 3 {
        ScoreDelta::new(2.0, format!("consistent workflow ({} steps)", steps))
    } else {
        None
    }
}

fn skill_intent_verb(features: &SkillFeatures, config: &ClassifierConfig) -> Option<ScoreDelta> {
    let label = features.cluster.label.to_lowercase();
    if config.intent_verbs.iter().any(|verb| label.contains(verb.as_str())) {
        ScoreDelta::new(1.0, "clear intent trigger")
    } else {
        None
    }
}

// --- Subagent rules (per cluster) ---

pub(crate) struct SubagentFeatures<'a> {
    pub cluster: &'a ClusterSummary,
}

pub(crate) type SubagentRule = fn(&SubagentFeatures, &ClassifierConfig) -> Option<ScoreDelta>;

pub(crate) const SUBAGENT_RULES: &[SubagentRule] = &[
    subagent_label_vocabulary,
    subagent_example_vocabulary,
    subagent_count_tier,
    subagent_cross_source,
];

fn contains_exploration_term(text: &str, config: &ClassifierConfig) -> bool {
    let lower = text.to_lowercase();
    config.exploration_terms.iter().any(|term| lower.contains(term.as_str()))
}

fn subagent_label_vocabulary(
    features: &SubagentFeatures,
    config: &ClassifierConfig,
) -> Option<ScoreDelta> {
    if contains_exploration_term(&features.cluster.label, config) {
        ScoreDelta::new(2.0, "exploration intent in label")
    } else {
        None
    }
}

fn subagent_example_vocabulary(
    features: &SubagentFeatures,
    config: &ClassifierConfig,
) -> Option<ScoreDelta> {
    let matching = features
        .cluster
        .example_prompts
        .iter()
        .filter(|example| contains_exploration_term(example, config))
        .count();
    if matching >= 2 {
        ScoreDelta::new(1.5, format!("research keywords in {} examples", matching))
    } else {
        None
    }
}

fn subagent_count_tier(features: &SubagentFeatures, _: &ClassifierConfig) -> Option<ScoreDelta> {
    let count = features.cluster.count;
    if count >= 10 {
        ScoreDelta::new(1.5, format!("frequent ({})", count))
    } else if count >= 5 {
        ScoreDelta::silent(0.5)
    } else {
        None
    }
}

fn subagent_cross_source(features: &SubagentFeatures, _: &ClassifierConfig) -> Option<ScoreDelta> {
    if features.cluster.sources.len() > 1 {
        ScoreDelta::silent(0.5)
    } else {
        None
    }
}

// --- Tool-pattern rules (per short workflow) ---

pub(crate) struct ToolFeatures<'a> {
    pub workflow: &'a WorkflowPattern,
}

pub(crate) type ToolRule = fn(&ToolFeatures, &ClassifierConfig) -> Option<ScoreDelta>;

pub(crate) const TOOL_RULES: &[ToolRule] =
    &[tool_count_tier, tool_focused, tool_read_then_write];

fn tool_count_tier(features: &ToolFeatures, _: &ClassifierConfig) -> Option<ScoreDelta> {
    let count = features.workflow.occurrences;
    if count >= 50 {
        ScoreDelta::new(3.0, format!("very high frequency ({})", count))
    } else if count >= 20 {
        ScoreDelta::new(2.0, format!("high frequency ({})", count))
    } else if count >= 10 {
        ScoreDelta::silent(1.0)
    } else {
        None
    }
}

fn tool_focused(features: &ToolFeatures, _: &ClassifierConfig) -> Option<ScoreDelta> {
    let steps = features.workflow.normalized.len();
    if steps <= 3 {
        ScoreDelta::new(1.0, format!("focused ({} steps)", steps))
    } else {
        None
    }
}

fn tool_read_then_write(features: &ToolFeatures, config: &ClassifierConfig) -> Option<ScoreDelta> {
    let steps = &features.workflow.normalized;
    let has_read = steps.iter().any(|step| config.is_exploration_tool(step));
    let has_write = steps.iter().any(|step| config.is_mutation_tool(step));
    if has_read && has_write {
        ScoreDelta::new(1.5, "read-then-write pattern")
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skillmine_types::Source;

    fn cluster(label: &str, count: u32, sources: Vec<Source>) -> ClusterSummary {
        ClusterSummary {
            cluster_id: 0,
            label: label.to_string(),
            count,
            example_prompts: Vec::new(),
            top_terms: Vec::new(),
            sources,
        }
    }

    fn workflow(tools: &[&str], occurrences: u32) -> WorkflowPattern {
        let pattern: Vec<String> = tools.iter().map(|t| t.to_string()).collect();
        WorkflowPattern {
            normalized: crate::workflows::normalize_sequence(&pattern),
            pattern,
            occurrences,
            distinct_sessions: 1,
            sources: vec![Source::Claude],
            example_first_prompts: Vec::new(),
            avg_length: tools.len() as f64,
        }
    }

    #[test]
    fn test_skill_count_tiers() {
        let config = ClassifierConfig::default();
        for (count, expected) in [(25, 3.0), (12, 2.0), (6, 1.0), (3, 0.0)] {
            let cluster = cluster("anything", count, vec![Source::Claude]);
            let features = SkillFeatures { cluster: &cluster, best_workflow: None };
            let delta = skill_count_tier(&features, &config).map_or(0.0, |d| d.delta);
            assert_eq!(delta, expected, "count {}", count);
        }
    }

    #[test]
    fn test_skill_workflow_overlap_requires_three_normalized_steps() {
        let config = ClassifierConfig::default();
        let summary = cluster("deploy", 5, vec![Source::Claude]);

        let short = workflow(&["Read", "Read", "Edit"], 10); // normalizes to 2 steps
        let features = SkillFeatures { cluster: &summary, best_workflow: Some(&short) };
        assert!(skill_workflow_overlap(&features, &config).is_none());

        let long = workflow(&["Read", "Grep", "Edit"], 10);
        let features = SkillFeatures { cluster: &summary, best_workflow: Some(&long) };
        assert_eq!(skill_workflow_overlap(&features, &config).map(|d| d.delta), Some(2.0));
    }

    #[test]
    fn test_skill_intent_verb_matches_substring_of_label() {
        let config = ClassifierConfig::default();
        let summary = cluster("fix auth bug", 1, vec![Source::Claude]);
        let features = SkillFeatures { cluster: &summary, best_workflow: None };
        let outcome = skill_intent_verb(&features, &config).expect("verb present");
        assert_eq!(outcome.delta, 1.0);
        assert_eq!(outcome.reason.as_deref(), Some("clear intent trigger"));
    }

    #[test]
    fn test_subagent_example_vocabulary_needs_two_matches() {
        let config = ClassifierConfig::default();
        let mut summary = cluster("misc", 1, vec![Source::Claude]);
        summary.example_prompts = vec![
            "find the config loader".to_string(),
            "explain this error".to_string(),
        ];
        let features = SubagentFeatures { cluster: &summary };
        assert!(subagent_example_vocabulary(&features, &config).is_none());

        summary.example_prompts.push("investigate the race".to_string());
        let features = SubagentFeatures { cluster: &summary };
        assert_eq!(
            subagent_example_vocabulary(&features, &config).map(|d| d.delta),
            Some(1.5)
        );
    }

    #[test]
    fn test_tool_read_then_write_shape() {
        let config = ClassifierConfig::default();

        let read_only = workflow(&["Read", "Grep"], 10);
        let features = ToolFeatures { workflow: &read_only };
        assert!(tool_read_then_write(&features, &config).is_none());

        let mixed = workflow(&["Read", "Edit"], 10);
        let features = ToolFeatures { workflow: &mixed };
        assert_eq!(tool_read_then_write(&features, &config).map(|d| d.delta), Some(1.5));
    }

    #[test]
    fn test_apply_rules_orders_reasons_and_rounds() {
        let config = ClassifierConfig::default();
        let summary = cluster("fix auth bug", 25, vec![Source::Claude, Source::Codex]);
        let features = SkillFeatures { cluster: &summary, best_workflow: None };
        let (score, reasons) = apply_rules(SKILL_RULES, &features, &config);

        // 3.0 count tier + 1.0 cross-source + 1.0 intent verb
        assert_eq!(score, 5.0);
        assert_eq!(reasons.len(), 3);
        assert!(reasons[0].starts_with("high frequency"));
        assert!(reasons[1].starts_with("cross-source"));
        assert_eq!(reasons[2], "clear intent trigger");
    }
}
