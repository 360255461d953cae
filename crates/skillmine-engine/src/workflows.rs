use anyhow::Result;
use skillmine_store::RelationStore;
use skillmine_types::{
    EXAMPLE_PROMPT_LEN, SessionRecord, Source, WorkflowPattern, truncate,
};
use std::collections::{BTreeSet, HashMap};

/// Sliding-window bounds over whole-session tool sequences.
const MIN_WINDOW: usize = 3;
const MAX_WINDOW: usize = 8;

/// Primary support tier: occurrences >= 5 across >= 3 distinct sessions.
const PRIMARY_MIN_OCCURRENCES: u32 = 5;
const PRIMARY_MIN_SESSIONS: usize = 3;

/// Relaxed tier: occurrences >= 3 across >= 2 distinct sessions.
const RELAXED_MIN_OCCURRENCES: u32 = 3;
const RELAXED_MIN_SESSIONS: usize = 2;

/// Fallback tier: top raw subsequences by occurrence, session spread ignored.
const FALLBACK_TOP: usize = 50;

const MAX_EXAMPLES: usize = 5;
const MAX_PATTERNS: usize = 100;

/// Phase 2c: mine the sessions relation for recurring multi-step workflows
/// and persist the ranked result.
pub fn run_workflow_mining(store: &RelationStore) -> Result<Vec<WorkflowPattern>> {
    let sessions = store.read_sessions()?;
    let patterns = mine_workflows(&sessions);
    store.write_workflows(&patterns)?;
    Ok(patterns)
}

/// Collapse consecutive duplicate tool names.
pub fn normalize_sequence(sequence: &[String]) -> Vec<String> {
    let mut normalized: Vec<String> = Vec::with_capacity(sequence.len());
    for tool in sequence {
        if normalized.last() != Some(tool) {
            normalized.push(tool.clone());
        }
    }
    normalized
}

#[derive(Default)]
struct SubseqStats {
    count: u32,
    sessions: BTreeSet<String>,
    sources: BTreeSet<Source>,
    examples: Vec<String>,
}

/// Mine contiguous subsequences (length 3..=8) from whole-session tool
/// sequences, threshold by support, and merge subsequences sharing a
/// normalized form.
pub fn mine_workflows(sessions: &[SessionRecord]) -> Vec<WorkflowPattern> {
    let mut stats: HashMap<Vec<String>, SubseqStats> = HashMap::new();

    for session in sessions {
        let tools = &session.tool_sequence;
        if tools.len() < MIN_WINDOW {
            continue;
        }

        for window_size in MIN_WINDOW..=MAX_WINDOW.min(tools.len()) {
            for window in tools.windows(window_size) {
                let entry = stats.entry(window.to_vec()).or_default();
                entry.count += 1;
                entry.sessions.insert(session.session_id.clone());
                entry.sources.insert(session.source);
                if entry.examples.len() < MAX_EXAMPLES && !session.first_prompt.is_empty() {
                    let example = truncate(&session.first_prompt, EXAMPLE_PROMPT_LEN);
                    if !entry.examples.contains(&example) {
                        entry.examples.push(example);
                    }
                }
            }
        }
    }

    let frequent = select_supported(&stats);
    if frequent.is_empty() {
        return Vec::new();
    }

    // Group by normalized form. Iterating in descending count order makes
    // the first member of each group its highest-occurrence representative.
    let mut group_index: HashMap<Vec<String>, usize> = HashMap::new();
    let mut groups: Vec<Vec<&Vec<String>>> = Vec::new();
    for subseq in &frequent {
        let normalized = normalize_sequence(subseq);
        match group_index.get(&normalized) {
            Some(&i) => groups[i].push(subseq),
            None => {
                group_index.insert(normalized, groups.len());
                groups.push(vec![subseq]);
            }
        }
    }

    let mut patterns: Vec<WorkflowPattern> = groups
        .into_iter()
        .map(|members| {
            let representative = members[0].clone();
            let mut occurrences = 0;
            let mut sessions_union: BTreeSet<&str> = BTreeSet::new();
            let mut sources_union: BTreeSet<Source> = BTreeSet::new();
            let mut examples: Vec<String> = Vec::new();
            let mut total_length = 0usize;

            for member in &members {
                let member_stats = &stats[*member];
                occurrences += member_stats.count;
                sessions_union.extend(member_stats.sessions.iter().map(String::as_str));
                sources_union.extend(member_stats.sources.iter().copied());
                for example in &member_stats.examples {
                    if examples.len() < MAX_EXAMPLES && !examples.contains(example) {
                        examples.push(example.clone());
                    }
                }
                total_length += member.len();
            }

            WorkflowPattern {
                normalized: normalize_sequence(&representative),
                pattern: representative,
                occurrences,
                distinct_sessions: sessions_union.len() as u32,
                sources: sources_union.into_iter().collect(),
                example_first_prompts: examples,
                avg_length: total_length as f64 / members.len() as f64,
            }
        })
        .collect();

    patterns.sort_by(|a, b| b.occurrences.cmp(&a.occurrences).then(a.pattern.cmp(&b.pattern)));
    patterns.truncate(MAX_PATTERNS);
    patterns
}

/// Apply the support tiers; the first tier yielding any results wins.
/// Returns subsequences in descending count order (ties lexicographic).
fn select_supported(stats: &HashMap<Vec<String>, SubseqStats>) -> Vec<Vec<String>> {
    let by_count_desc = |map: &HashMap<Vec<String>, SubseqStats>,
                         predicate: &dyn Fn(&SubseqStats) -> bool| {
        let mut selected: Vec<Vec<String>> = map
            .iter()
            .filter(|(_, s)| predicate(s))
            .map(|(subseq, _)| subseq.clone())
            .collect();
        selected.sort_by(|a, b| stats[b].count.cmp(&stats[a].count).then(a.cmp(b)));
        selected
    };

    let primary = by_count_desc(stats, &|s: &SubseqStats| {
        s.count >= PRIMARY_MIN_OCCURRENCES && s.sessions.len() >= PRIMARY_MIN_SESSIONS
    });
    if !primary.is_empty() {
        return primary;
    }

    let relaxed = by_count_desc(stats, &|s: &SubseqStats| {
        s.count >= RELAXED_MIN_OCCURRENCES && s.sessions.len() >= RELAXED_MIN_SESSIONS
    });
    if !relaxed.is_empty() {
        return relaxed;
    }

    let mut fallback = by_count_desc(stats, &|_: &SubseqStats| true);
    fallback.truncate(FALLBACK_TOP);
    fallback
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(id: &str, source: Source, tools: &[&str], first_prompt: &str) -> SessionRecord {
        SessionRecord {
            source,
            session_id: id.to_string(),
            project: String::new(),
            start_time: None,
            end_time: None,
            num_prompts: 1,
            num_tool_calls: tools.len() as u32,
            unique_tools: Vec::new(),
            tool_sequence: tools.iter().map(|t| t.to_string()).collect(),
            first_prompt: first_prompt.to_string(),
        }
    }

    fn strings(tools: &[&str]) -> Vec<String> {
        tools.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_normalize_collapses_consecutive_duplicates() {
        let sequence = strings(&["Read", "Read", "Grep", "Edit", "Edit", "Read"]);
        assert_eq!(normalize_sequence(&sequence), strings(&["Read", "Grep", "Edit", "Read"]));
    }

    #[test]
    fn test_normalize_empty() {
        assert!(normalize_sequence(&[]).is_empty());
    }

    #[test]
    fn test_no_sessions_yield_no_patterns() {
        assert!(mine_workflows(&[]).is_empty());
        // sessions with fewer than 3 calls contribute nothing
        let short = vec![session("s1", Source::Claude, &["Read", "Edit"], "hi")];
        assert!(mine_workflows(&short).is_empty());
    }

    #[test]
    fn test_recurring_sequence_meets_primary_tier() {
        // the same 6-call sequence in 5 distinct sessions
        let tools = ["Read", "Read", "Grep", "Edit", "Bash", "Edit"];
        let sessions: Vec<SessionRecord> = (0..5)
            .map(|i| {
                session(&format!("s{}", i), Source::Claude, &tools, &format!("prompt {}", i))
            })
            .collect();

        let patterns = mine_workflows(&sessions);
        assert!(!patterns.is_empty());

        // some length >= 3 subsequence covers the pattern with primary support
        let covering = patterns
            .iter()
            .find(|p| p.pattern.len() >= 3 && p.occurrences >= 5 && p.distinct_sessions >= 3);
        assert!(covering.is_some(), "no pattern met the primary tier: {:?}", patterns);
    }

    #[test]
    fn test_groups_merge_by_normalized_form() {
        // "Read Read Edit" and "Read Edit Edit" share normalized "Read Edit"...
        // but windows are length >= 3, so craft two raw forms with the same
        // normalization: [Read, Read, Grep, Edit] and [Read, Grep, Grep, Edit]
        let a = ["Read", "Read", "Grep", "Edit"];
        let b = ["Read", "Grep", "Grep", "Edit"];
        let mut sessions = Vec::new();
        for i in 0..3 {
            sessions.push(session(&format!("a{}", i), Source::Claude, &a, "alpha"));
            sessions.push(session(&format!("b{}", i), Source::Codex, &b, "beta"));
        }

        let patterns = mine_workflows(&sessions);
        let normalized_target = strings(&["Read", "Grep", "Edit"]);
        let merged: Vec<&WorkflowPattern> =
            patterns.iter().filter(|p| p.normalized == normalized_target).collect();

        // exactly one output row per normalized form; the group holds the
        // three raw members [R,G,E], [R,G,G,E], and [R,R,G,E]
        assert_eq!(merged.len(), 1);
        let merged = merged[0];
        assert_eq!(merged.occurrences, 9);
        assert_eq!(merged.distinct_sessions, 6);
        assert_eq!(merged.sources, vec![Source::Claude, Source::Codex]);
        assert!((merged.avg_length - 11.0 / 3.0).abs() < 1e-9);
        assert_eq!(merged.pattern, strings(&["Read", "Grep", "Edit"]));
        assert!(merged.example_first_prompts.contains(&"alpha".to_string()));
        assert!(merged.example_first_prompts.contains(&"beta".to_string()));
    }

    #[test]
    fn test_normalized_forms_unique_in_output() {
        let tools = ["Read", "Read", "Grep", "Edit", "Bash", "Edit"];
        let sessions: Vec<SessionRecord> = (0..5)
            .map(|i| session(&format!("s{}", i), Source::Claude, &tools, "p"))
            .collect();

        let patterns = mine_workflows(&sessions);
        let mut seen = std::collections::HashSet::new();
        for pattern in &patterns {
            assert!(seen.insert(pattern.normalized.clone()), "duplicate normalized form");
            // every member's normalized form equals the group's
            assert_eq!(normalize_sequence(&pattern.pattern), pattern.normalized);
        }
    }

    #[test]
    fn test_relaxed_tier_applies_when_primary_empty() {
        // 3 occurrences across 2 sessions: fails primary, passes relaxed
        let tools = ["Read", "Grep", "Edit"];
        let sessions = vec![
            session("s1", Source::Claude, &tools, "one"),
            session("s2", Source::Claude, &tools, "two"),
            session("s2b", Source::Claude, &["Glob", "Bash", "Write"], "three"),
        ];
        // "Read Grep Edit" occurs twice over two sessions -> relaxed needs 3;
        // add a third occurrence within one session
        let mut sessions = sessions;
        sessions.push(session("s1", Source::Claude, &tools, "one"));

        let patterns = mine_workflows(&sessions);
        let target = strings(&["Read", "Grep", "Edit"]);
        assert!(patterns.iter().any(|p| p.pattern == target && p.occurrences == 3));
    }

    #[test]
    fn test_fallback_keeps_top_patterns() {
        // single session, nothing repeats: only the fallback tier fires
        let sessions =
            vec![session("s1", Source::Lemon, &["Read", "Grep", "Edit", "Bash"], "solo")];
        let patterns = mine_workflows(&sessions);
        assert!(!patterns.is_empty());
        assert!(patterns.iter().all(|p| p.distinct_sessions == 1));
    }

    #[test]
    fn test_ranked_by_occurrences() {
        let common = ["Read", "Grep", "Edit"];
        let rare = ["Glob", "Bash", "Write"];
        let mut sessions: Vec<SessionRecord> = (0..6)
            .map(|i| session(&format!("c{}", i), Source::Claude, &common, "common"))
            .collect();
        for i in 0..5 {
            sessions.push(session(&format!("r{}", i), Source::Claude, &rare, "rare"));
        }

        let patterns = mine_workflows(&sessions);
        assert!(patterns.len() >= 2);
        assert!(patterns[0].occurrences >= patterns[1].occurrences);
        assert_eq!(patterns[0].pattern, strings(&common));
    }
}
