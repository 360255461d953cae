mod rules;

use anyhow::Result;
use skillmine_store::RelationStore;
use skillmine_types::{
    Candidate, CandidateKind, ClassifierConfig, Classifications, ClusterSummary, ToolCount,
    WorkflowPattern,
};

use rules::{
    SKILL_RULES, SUBAGENT_RULES, SkillFeatures, SubagentFeatures, TOOL_RULES, ToolFeatures,
    apply_rules,
};

/// Minimum score for a candidate to survive, all categories.
const SCORE_THRESHOLD: f64 = 2.0;

/// Ranked candidates kept per category.
const MAX_CANDIDATES: usize = 20;

/// Candidates carry at most this many example prompts.
const MAX_CANDIDATE_EXAMPLES: usize = 3;

/// Workflows of this normalized length are scored as atomic tool patterns.
const TOOL_PATTERN_STEPS: std::ops::RangeInclusive<usize> = 2..=4;

/// Cluster examples are matched against workflow examples by this prefix.
const OVERLAP_PREFIX_LEN: usize = 30;

/// Phase 3: re-derive the three candidate lists from the persisted
/// clusters, workflows, and tool-frequency relations. Nothing is written;
/// classification is recomputed on demand.
pub fn run_classification(
    store: &RelationStore,
    config: &ClassifierConfig,
) -> Result<Classifications> {
    let clusters = store.read_clusters()?;
    let workflows = store.read_workflows()?;
    let tool_frequency = store.read_tool_frequency()?;
    Ok(classify(&clusters, &workflows, &tool_frequency, config))
}

/// Score clusters as skill and subagent candidates and short workflows as
/// atomic tool candidates. Deterministic: identical inputs yield identical
/// scores, reasons, and ranking order.
pub fn classify(
    clusters: &[ClusterSummary],
    workflows: &[WorkflowPattern],
    tool_frequency: &[ToolCount],
    config: &ClassifierConfig,
) -> Classifications {
    let mut results = Classifications::default();

    for cluster in clusters {
        let best_workflow = best_matching_workflow(cluster, workflows);

        let features = SkillFeatures { cluster, best_workflow };
        let (score, reasons) = apply_rules(SKILL_RULES, &features, config);
        if score >= SCORE_THRESHOLD {
            results.skills.push(Candidate {
                kind: CandidateKind::Skill,
                label: cluster.label.clone(),
                score,
                reasons,
                count: cluster.count,
                sources: cluster.sources.clone(),
                examples: cluster
                    .example_prompts
                    .iter()
                    .take(MAX_CANDIDATE_EXAMPLES)
                    .cloned()
                    .collect(),
                workflow: best_workflow.map(|w| w.pattern_display()),
            });
        }

        let features = SubagentFeatures { cluster };
        let (score, reasons) = apply_rules(SUBAGENT_RULES, &features, config);
        if score >= SCORE_THRESHOLD {
            results.subagents.push(Candidate {
                kind: CandidateKind::Subagent,
                label: cluster.label.clone(),
                score,
                reasons,
                count: cluster.count,
                sources: cluster.sources.clone(),
                examples: cluster
                    .example_prompts
                    .iter()
                    .take(MAX_CANDIDATE_EXAMPLES)
                    .cloned()
                    .collect(),
                workflow: None,
            });
        }
    }

    // Tool patterns reuse workflow occurrence counts; without any observed
    // tool frequency there is nothing to ground them in.
    if !tool_frequency.is_empty() {
        for workflow in workflows {
            if !TOOL_PATTERN_STEPS.contains(&workflow.normalized.len()) {
                continue;
            }
            let features = ToolFeatures { workflow };
            let (score, reasons) = apply_rules(TOOL_RULES, &features, config);
            if score >= SCORE_THRESHOLD {
                results.tools.push(Candidate {
                    kind: CandidateKind::Tool,
                    label: workflow.pattern_display(),
                    score,
                    reasons,
                    count: workflow.occurrences,
                    sources: workflow.sources.clone(),
                    examples: Vec::new(),
                    workflow: None,
                });
            }
        }
    }

    for list in [&mut results.skills, &mut results.subagents, &mut results.tools] {
        list.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.label.cmp(&b.label))
        });
        list.truncate(MAX_CANDIDATES);
    }

    results
}

/// Find the highest-occurrence workflow whose example prompts overlap the
/// cluster's examples, matched by first-30-char prefix containment.
fn best_matching_workflow<'a>(
    cluster: &ClusterSummary,
    workflows: &'a [WorkflowPattern],
) -> Option<&'a WorkflowPattern> {
    workflows
        .iter()
        .filter(|workflow| {
            cluster.example_prompts.iter().any(|example| {
                let prefix: String = example.chars().take(OVERLAP_PREFIX_LEN).collect();
                !prefix.is_empty()
                    && workflow
                        .example_first_prompts
                        .iter()
                        .any(|wf_example| wf_example.contains(&prefix))
            })
        })
        .max_by_key(|workflow| workflow.occurrences)
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
            distinct_sessions: 3,
            sources: vec![Source::Claude],
            example_first_prompts: Vec::new(),
            avg_length: tools.len() as f64,
        }
    }

    fn freq() -> Vec<ToolCount> {
        vec![ToolCount { tool_name: "Read".to_string(), count: 100 }]
    }

    #[test]
    fn test_skill_scenario_fix_auth_bug() {
        // {label="fix auth bug", count=25, sources={claude, codex}}
        // => 3.0 count tier + 1.0 cross-source + 1.0 intent verb = 5.0
        let clusters = vec![cluster("fix auth bug", 25, vec![Source::Claude, Source::Codex])];
        let results = classify(&clusters, &[], &freq(), &ClassifierConfig::default());

        assert_eq!(results.skills.len(), 1);
        let skill = &results.skills[0];
        assert!(skill.score >= 5.0, "score {}", skill.score);
        assert_eq!(skill.score, 5.0);
        assert_eq!(skill.kind, CandidateKind::Skill);
    }

    #[test]
    fn test_tool_scenario_read_edit_sixty() {
        // ["Read","Edit"] x60 => 3.0 + 1.0 focused + 1.5 read-then-write = 5.5
        let workflows = vec![workflow(&["Read", "Edit"], 60)];
        let results = classify(&[], &workflows, &freq(), &ClassifierConfig::default());

        assert_eq!(results.tools.len(), 1);
        let tool = &results.tools[0];
        assert_eq!(tool.score, 5.5);
        assert_eq!(tool.label, "Read → Edit");
        assert_eq!(tool.count, 60);
    }

    #[test]
    fn test_tool_patterns_need_normalized_length_two_to_four() {
        let workflows = vec![
            workflow(&["Read", "Read", "Read"], 60), // normalizes to 1 step
            workflow(&["Read", "Grep", "Glob", "Edit", "Bash"], 60), // 5 steps
            workflow(&["Read", "Edit"], 60),
        ];
        let results = classify(&[], &workflows, &freq(), &ClassifierConfig::default());
        assert_eq!(results.tools.len(), 1);
        assert_eq!(results.tools[0].label, "Read → Edit");
    }

    #[test]
    fn test_tool_patterns_skipped_without_frequency_input() {
        let workflows = vec![workflow(&["Read", "Edit"], 60)];
        let results = classify(&[], &workflows, &[], &ClassifierConfig::default());
        assert!(results.tools.is_empty());
    }

    #[test]
    fn test_subagent_scoring() {
        let mut summary =
            cluster("investigate search issues", 12, vec![Source::Claude, Source::Codex]);
        summary.example_prompts = vec![
            "find where the token refresh happens".to_string(),
            "check the retry logic in the client".to_string(),
        ];
        let results = classify(&[summary], &[], &freq(), &ClassifierConfig::default());

        assert_eq!(results.subagents.len(), 1);
        let subagent = &results.subagents[0];
        // 2.0 label + 1.5 examples + 1.5 count + 0.5 cross-source
        assert_eq!(subagent.score, 5.5);
        assert_eq!(subagent.kind, CandidateKind::Subagent);
    }

    #[test]
    fn test_below_threshold_excluded() {
        let clusters = vec![cluster("misc", 1, vec![Source::Claude])];
        let results = classify(&clusters, &[], &freq(), &ClassifierConfig::default());
        assert!(results.skills.is_empty());
        assert!(results.subagents.is_empty());
    }

    #[test]
    fn test_workflow_overlap_bonus_via_prefix_match() {
        let mut summary = cluster("fix auth bug", 8, vec![Source::Claude]);
        summary.example_prompts =
            vec!["please fix the authentication bug in the login flow".to_string()];

        let mut matching = workflow(&["Read", "Grep", "Edit"], 30);
        matching.example_first_prompts =
            vec!["please fix the authentication bug in the login flow today".to_string()];
        let mut unrelated = workflow(&["Glob", "Bash", "Write"], 99);
        unrelated.example_first_prompts = vec!["entirely different".to_string()];

        let workflows = vec![unrelated, matching];
        let results = classify(&[summary], &workflows, &freq(), &ClassifierConfig::default());

        let skill = &results.skills[0];
        // 1.0 count tier + 2.0 workflow overlap + 1.0 intent verb
        assert_eq!(skill.score, 4.0);
        assert_eq!(skill.workflow.as_deref(), Some("Read → Grep → Edit"));
        assert!(skill.reasons.iter().any(|r| r.contains("consistent workflow (3 steps)")));
    }

    #[test]
    fn test_classification_is_deterministic() {
        let mut summary = cluster("review search code", 15, vec![Source::Claude, Source::Lemon]);
        summary.example_prompts = vec!["review the search module".to_string()];
        let clusters = vec![summary];
        let workflows = vec![workflow(&["Read", "Edit"], 25), workflow(&["Grep", "Write"], 25)];

        let first = classify(&clusters, &workflows, &freq(), &ClassifierConfig::default());
        let second = classify(&clusters, &workflows, &freq(), &ClassifierConfig::default());
        assert_eq!(first, second);

        // equal-score tools rank lexicographically
        assert_eq!(first.tools.len(), 2);
        assert!(first.tools[0].label < first.tools[1].label);
    }

    #[test]
    fn test_candidate_lists_capped_at_twenty() {
        let clusters: Vec<ClusterSummary> = (0..30)
            .map(|i| {
                cluster(&format!("fix module {:02}", i), 25, vec![Source::Claude, Source::Codex])
            })
            .collect();
        let results = classify(&clusters, &[], &freq(), &ClassifierConfig::default());
        assert_eq!(results.skills.len(), 20);
    }
}
