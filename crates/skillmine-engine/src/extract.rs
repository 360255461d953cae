use anyhow::{Context, Result};
use rayon::prelude::*;
use skillmine_providers::{LogParser, ParsedFile, build_parsers, discover_jsonl_files};
use skillmine_store::RelationStore;
use skillmine_types::{
    ExtractOptions, ExtractionStats, FIRST_PROMPT_LEN, PromptRecord, SessionRecord, Source,
    SourceRoots, ToolCallRecord, truncate,
};
use std::collections::{BTreeMap, BTreeSet};

// NOTE: Worker Pool Rationale
//
// Extraction is the only parallel phase. Each worker owns exactly one file
// for its full lifetime and returns a self-contained {prompts, tool_calls}
// result; the coordinator merges in deterministic file order. Workers share
// nothing mutable, so no locks are needed, and a file that fails to parse
// is isolated to that worker's result.

/// Phase 1: parse all source trees into the prompts, tool_calls, and
/// sessions relations. Returns summary counts for observability.
pub fn run_extraction(
    store: &RelationStore,
    roots: &SourceRoots,
    options: &ExtractOptions,
) -> Result<ExtractionStats> {
    store.ensure_dir()?;

    let workers = options.workers.unwrap_or_else(default_worker_count);
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build()
        .context("failed to build extraction worker pool")?;

    let parsers = build_parsers(roots, options.skip_lemon);
    let mut stats = ExtractionStats::default();
    let mut all_prompts: Vec<PromptRecord> = Vec::new();
    let mut all_tool_calls: Vec<ToolCallRecord> = Vec::new();

    for parser in &parsers {
        let files = discover_jsonl_files(&parser.log_root(roots), options.max_files);
        match parser.source() {
            Source::Claude => stats.claude_files = files.len(),
            Source::Codex => stats.codex_files = files.len(),
            Source::Lemon => stats.lemon_files = files.len(),
        }

        let results: Vec<Option<ParsedFile>> = pool.install(|| {
            files
                .par_iter()
                .map(|path| parser.parse_file(path).ok())
                .collect()
        });

        for result in results {
            match result {
                Some(parsed) => {
                    all_prompts.extend(parsed.prompts);
                    all_tool_calls.extend(parsed.tool_calls);
                }
                None => stats.skipped_files += 1,
            }
        }
    }

    let sessions = build_sessions(&all_prompts, &all_tool_calls);

    stats.prompts = all_prompts.len();
    stats.tool_calls = all_tool_calls.len();
    stats.sessions = sessions.len();

    store.write_prompts(&all_prompts)?;
    store.write_tool_calls(&all_tool_calls)?;
    store.write_sessions(&sessions)?;

    Ok(stats)
}

fn default_worker_count() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

/// Derive the sessions relation by grouping prompts and tool calls by
/// (source, session_id). The tool sequence is ordered by (prompt_idx,
/// call_idx) — the authoritative ordering for everything downstream.
pub(crate) fn build_sessions(
    prompts: &[PromptRecord],
    tool_calls: &[ToolCallRecord],
) -> Vec<SessionRecord> {
    let mut prompt_groups: BTreeMap<(Source, &str), Vec<&PromptRecord>> = BTreeMap::new();
    for prompt in prompts {
        prompt_groups
            .entry((prompt.source, prompt.session_id.as_str()))
            .or_default()
            .push(prompt);
    }

    let mut tool_groups: BTreeMap<(Source, &str), Vec<&ToolCallRecord>> = BTreeMap::new();
    for call in tool_calls {
        tool_groups
            .entry((call.source, call.session_id.as_str()))
            .or_default()
            .push(call);
    }

    let keys: BTreeSet<(Source, &str)> = prompt_groups
        .keys()
        .chain(tool_groups.keys())
        .copied()
        .collect();

    let mut sessions = Vec::with_capacity(keys.len());
    for (source, session_id) in keys {
        let mut session_prompts = prompt_groups.remove(&(source, session_id)).unwrap_or_default();
        session_prompts.sort_by_key(|p| p.prompt_idx);

        let mut session_calls = tool_groups.remove(&(source, session_id)).unwrap_or_default();
        session_calls.sort_by_key(|c| (c.prompt_idx, c.call_idx));

        let mut timestamps: Vec<&str> = session_prompts
            .iter()
            .filter_map(|p| p.timestamp.as_deref())
            .chain(session_calls.iter().filter_map(|c| c.timestamp.as_deref()))
            .collect();
        timestamps.sort_unstable();

        let unique_tools: BTreeSet<&str> =
            session_calls.iter().map(|c| c.tool_name.as_str()).collect();

        sessions.push(SessionRecord {
            source,
            session_id: session_id.to_string(),
            project: session_prompts
                .first()
                .map(|p| p.project.clone())
                .unwrap_or_default(),
            start_time: timestamps.first().map(|t| t.to_string()),
            end_time: timestamps.last().map(|t| t.to_string()),
            num_prompts: session_prompts.len() as u32,
            num_tool_calls: session_calls.len() as u32,
            unique_tools: unique_tools.into_iter().map(str::to_string).collect(),
            tool_sequence: session_calls.iter().map(|c| c.tool_name.clone()).collect(),
            first_prompt: session_prompts
                .first()
                .map(|p| truncate(&p.text, FIRST_PROMPT_LEN))
                .unwrap_or_default(),
        });
    }

    sessions
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prompt(session: &str, idx: u32, text: &str, ts: Option<&str>) -> PromptRecord {
        PromptRecord {
            source: Source::Claude,
            session_id: session.to_string(),
            prompt_idx: idx,
            timestamp: ts.map(str::to_string),
            text: text.to_string(),
            project: "/work/app".to_string(),
            char_count: text.chars().count() as u32,
        }
    }

    fn call(session: &str, prompt_idx: u32, call_idx: u32, tool: &str) -> ToolCallRecord {
        ToolCallRecord {
            source: Source::Claude,
            session_id: session.to_string(),
            prompt_idx,
            call_idx,
            timestamp: None,
            tool_name: tool.to_string(),
            arguments_json: "{}".to_string(),
            is_error: false,
        }
    }

    #[test]
    fn test_tool_sequence_ordered_by_prompt_and_call_idx() {
        let prompts = vec![prompt("s1", 0, "go", Some("2025-06-01T10:00:00Z"))];
        // deliberately shuffled input order
        let calls = vec![
            call("s1", 1, 0, "Edit"),
            call("s1", 0, 1, "Grep"),
            call("s1", 0, 0, "Read"),
        ];

        let sessions = build_sessions(&prompts, &calls);
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].tool_sequence, vec!["Read", "Grep", "Edit"]);
        assert_eq!(sessions[0].unique_tools, vec!["Edit", "Grep", "Read"]);
        assert_eq!(sessions[0].num_tool_calls, 3);
    }

    #[test]
    fn test_session_without_prompts_still_aggregated() {
        let calls = vec![call("orphan", 0, 0, "Bash")];
        let sessions = build_sessions(&[], &calls);
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].num_prompts, 0);
        assert_eq!(sessions[0].first_prompt, "");
    }

    #[test]
    fn test_start_and_end_times_span_both_relations() {
        let prompts = vec![prompt("s1", 0, "go", Some("2025-06-01T10:05:00Z"))];
        let mut early = call("s1", 0, 0, "Read");
        early.timestamp = Some("2025-06-01T10:00:00Z".to_string());
        let mut late = call("s1", 0, 1, "Edit");
        late.timestamp = Some("2025-06-01T10:10:00Z".to_string());

        let sessions = build_sessions(&prompts, &[early, late]);
        assert_eq!(sessions[0].start_time.as_deref(), Some("2025-06-01T10:00:00Z"));
        assert_eq!(sessions[0].end_time.as_deref(), Some("2025-06-01T10:10:00Z"));
    }

    #[test]
    fn test_first_prompt_truncated() {
        let long = "x".repeat(FIRST_PROMPT_LEN * 2);
        let prompts = vec![prompt("s1", 0, &long, None)];
        let sessions = build_sessions(&prompts, &[]);
        assert_eq!(sessions[0].first_prompt.chars().count(), FIRST_PROMPT_LEN + 1);
    }

    #[test]
    fn test_sessions_keyed_by_source_and_id() {
        let mut codex_prompt = prompt("shared-id", 0, "hi", None);
        codex_prompt.source = Source::Codex;
        let prompts = vec![prompt("shared-id", 0, "hi", None), codex_prompt];
        let sessions = build_sessions(&prompts, &[]);
        assert_eq!(sessions.len(), 2);
    }
}
