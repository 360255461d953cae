//! End-to-end pipeline tests over synthetic log trees.

use skillmine_engine::{
    run_classification, run_extraction, run_prompt_clustering, run_tool_analysis,
    run_workflow_mining,
};
use skillmine_store::RelationStore;
use skillmine_testing::{
    LogWorld, claude_assistant_tools_line, claude_user_line, codex_function_call_line,
    codex_history_line, codex_session_meta_line, codex_user_message_line, lemon_session_line,
    lemon_tool_line, lemon_user_line,
};
use skillmine_types::{ClassifierConfig, ExtractOptions, Source};

fn single_threaded() -> ExtractOptions {
    ExtractOptions { workers: Some(1), ..Default::default() }
}

/// A claude session whose whole-session tool sequence is
/// [Read, Read, Grep, Edit, Bash, Edit].
fn claude_session_lines(session_id: &str, first_prompt: &str) -> Vec<String> {
    vec![
        claude_user_line(session_id, "/work/app", "2025-06-01T10:00:00Z", first_prompt),
        claude_assistant_tools_line(session_id, "2025-06-01T10:00:10Z", &["Read", "Read", "Grep"]),
        claude_user_line(session_id, "/work/app", "2025-06-01T10:05:00Z", "now apply the fix"),
        claude_assistant_tools_line(session_id, "2025-06-01T10:05:10Z", &["Edit", "Bash", "Edit"]),
    ]
}

#[test]
fn test_extraction_normalizes_all_three_sources() -> anyhow::Result<()> {
    let world = LogWorld::new()?;
    world.write_claude_session(
        "/work/app",
        "a.jsonl",
        &claude_session_lines("claude-1", "please fix the login flow"),
    )?;
    world.write_codex_session(
        "b.jsonl",
        &[
            codex_session_meta_line("codex-1", "/work/api", "2025-06-02T09:00:00Z"),
            codex_user_message_line("2025-06-02T09:00:05Z", "profile the slow endpoint"),
            codex_function_call_line("2025-06-02T09:00:10Z", "shell", "{\"cmd\":\"top\"}"),
        ],
    )?;
    world.write_lemon_session(
        "c.jsonl",
        &[
            lemon_session_line("lemon-1", "/work/game"),
            lemon_user_line(1735689600000, "render the intro scene"),
            lemon_tool_line(1735689660000, &["exec_command"]),
        ],
    )?;

    let store = RelationStore::new(world.output_dir());
    let stats = run_extraction(&store, &world.roots(), &single_threaded())?;

    assert_eq!(stats.claude_files, 1);
    assert_eq!(stats.codex_files, 1);
    assert_eq!(stats.lemon_files, 1);
    assert_eq!(stats.prompts, 4);
    assert_eq!(stats.tool_calls, 8);
    assert_eq!(stats.sessions, 3);

    let sessions = store.read_sessions()?;
    let claude = sessions.iter().find(|s| s.source == Source::Claude).unwrap();
    assert_eq!(claude.tool_sequence, vec!["Read", "Read", "Grep", "Edit", "Bash", "Edit"]);
    assert_eq!(claude.first_prompt, "please fix the login flow");
    assert_eq!(claude.project, "/work/app");
    assert_eq!(claude.num_prompts, 2);

    let lemon = sessions.iter().find(|s| s.source == Source::Lemon).unwrap();
    assert_eq!(lemon.session_id, "lemon-1");
    assert_eq!(lemon.tool_sequence, vec!["exec_command"]);
    Ok(())
}

#[test]
fn test_tool_sequence_matches_sorted_tool_calls() -> anyhow::Result<()> {
    let world = LogWorld::new()?;
    for i in 0..3 {
        world.write_claude_session(
            "/work/app",
            &format!("s{}.jsonl", i),
            &claude_session_lines(&format!("claude-{}", i), "tune the cache layer"),
        )?;
    }

    let store = RelationStore::new(world.output_dir());
    run_extraction(&store, &world.roots(), &single_threaded())?;

    let calls = store.read_tool_calls()?;
    for session in store.read_sessions()? {
        let mut expected: Vec<_> = calls
            .iter()
            .filter(|c| c.source == session.source && c.session_id == session.session_id)
            .collect();
        expected.sort_by_key(|c| (c.prompt_idx, c.call_idx));
        let expected: Vec<String> = expected.into_iter().map(|c| c.tool_name.clone()).collect();
        assert_eq!(session.tool_sequence, expected);
    }
    Ok(())
}

#[test]
fn test_extraction_is_idempotent() -> anyhow::Result<()> {
    let world = LogWorld::new()?;
    world.write_claude_session(
        "/work/app",
        "a.jsonl",
        &claude_session_lines("claude-1", "migrate the database schema"),
    )?;
    world.write_codex_history(&[codex_history_line("codex-1", 1735689600, "orphan entry")])?;

    let store = RelationStore::new(world.output_dir());
    run_extraction(&store, &world.roots(), &single_threaded())?;
    let first = (store.read_prompts()?, store.read_tool_calls()?, store.read_sessions()?);

    run_extraction(&store, &world.roots(), &single_threaded())?;
    let second = (store.read_prompts()?, store.read_tool_calls()?, store.read_sessions()?);

    assert_eq!(first, second);
    Ok(())
}

#[test]
fn test_unparseable_files_produce_empty_relations_without_error() -> anyhow::Result<()> {
    // Scenario: 10 files with zero parseable JSON lines
    let world = LogWorld::new()?;
    for i in 0..10 {
        world.write_claude_session(
            "/work/app",
            &format!("junk{}.jsonl", i),
            &["this is not json".to_string(), "nor is this".to_string()],
        )?;
    }

    let store = RelationStore::new(world.output_dir());
    let stats = run_extraction(&store, &world.roots(), &single_threaded())?;

    assert_eq!(stats.claude_files, 10);
    assert_eq!(stats.prompts, 0);
    assert_eq!(stats.tool_calls, 0);
    assert_eq!(stats.sessions, 0);
    assert!(store.read_prompts()?.is_empty());
    assert!(store.read_sessions()?.is_empty());
    Ok(())
}

#[test]
fn test_max_files_and_skip_lemon_respected() -> anyhow::Result<()> {
    let world = LogWorld::new()?;
    for i in 0..4 {
        world.write_claude_session(
            "/work/app",
            &format!("s{}.jsonl", i),
            &claude_session_lines(&format!("claude-{}", i), "check the builds"),
        )?;
    }
    world.write_lemon_session(
        "l.jsonl",
        &[lemon_session_line("lemon-1", "/work/game"), lemon_user_line(1735689600000, "hello world")],
    )?;

    let store = RelationStore::new(world.output_dir());
    let options = ExtractOptions { max_files: Some(2), workers: Some(1), skip_lemon: true };
    let stats = run_extraction(&store, &world.roots(), &options)?;

    assert_eq!(stats.claude_files, 2);
    assert_eq!(stats.lemon_files, 0);
    assert!(store.read_prompts()?.iter().all(|p| p.source != Source::Lemon));
    Ok(())
}

#[test]
fn test_codex_history_recovers_missing_prompts() -> anyhow::Result<()> {
    let world = LogWorld::new()?;
    world.write_codex_session(
        "b.jsonl",
        &[
            codex_session_meta_line("codex-1", "/work/api", "2025-06-02T09:00:00Z"),
            codex_user_message_line("2025-06-02T09:00:05Z", "profile the slow endpoint"),
        ],
    )?;
    world.write_codex_history(&[
        codex_history_line("codex-1", 1735689600, "profile the slow endpoint"),
        codex_history_line("codex-1", 1735689700, "a prompt only history retained"),
        codex_history_line("unrelated", 1735689800, "different session"),
    ])?;

    let store = RelationStore::new(world.output_dir());
    let stats = run_extraction(&store, &world.roots(), &single_threaded())?;

    // the duplicate history entry is dropped by the 50-char prefix heuristic
    assert_eq!(stats.prompts, 2);
    let prompts = store.read_prompts()?;
    assert!(prompts.iter().any(|p| p.text == "a prompt only history retained"));
    Ok(())
}

#[test]
fn test_cluster_assignment_follows_length_filter() -> anyhow::Result<()> {
    let world = LogWorld::new()?;
    let lines = vec![
        claude_user_line("claude-1", "/work/app", "2025-06-01T10:00:00Z", "ok"),
        claude_user_line(
            "claude-1",
            "/work/app",
            "2025-06-01T10:01:00Z",
            "please refactor the session parser module",
        ),
        claude_user_line(
            "claude-1",
            "/work/app",
            "2025-06-01T10:02:00Z",
            "add tests for the retry logic",
        ),
    ];
    world.write_claude_session("/work/app", "a.jsonl", &lines)?;

    let store = RelationStore::new(world.output_dir());
    run_extraction(&store, &world.roots(), &single_threaded())?;
    let clusters = run_prompt_clustering(&store)?;

    // two usable prompts (< 5) collapse into the catch-all cluster
    assert_eq!(clusters.len(), 1);
    assert_eq!(clusters[0].label, "all prompts");
    assert_eq!(clusters[0].count, 2);

    for row in store.read_clustered_prompts()? {
        if row.prompt.text == "ok" {
            assert_eq!(row.cluster_id, None);
        } else {
            assert_eq!(row.cluster_id, Some(0));
        }
    }
    Ok(())
}

#[test]
fn test_recurring_session_pattern_meets_primary_support() -> anyhow::Result<()> {
    // Scenario: [Read, Read, Grep, Edit, Bash, Edit] across 5 distinct sessions
    let world = LogWorld::new()?;
    for i in 0..5 {
        world.write_claude_session(
            "/work/app",
            &format!("s{}.jsonl", i),
            &claude_session_lines(&format!("claude-{}", i), "fix the flaky pipeline"),
        )?;
    }

    let store = RelationStore::new(world.output_dir());
    run_extraction(&store, &world.roots(), &single_threaded())?;
    let workflows = run_workflow_mining(&store)?;

    let covering = workflows
        .iter()
        .find(|w| w.pattern.len() >= 3 && w.occurrences >= 5 && w.distinct_sessions >= 3);
    assert!(covering.is_some(), "no workflow met the primary tier: {:?}", workflows);

    // persisted relation matches the returned value
    assert_eq!(store.read_workflows()?, workflows);
    Ok(())
}

#[test]
fn test_full_pipeline_classification_is_deterministic() -> anyhow::Result<()> {
    let world = LogWorld::new()?;
    for i in 0..5 {
        world.write_claude_session(
            "/work/app",
            &format!("s{}.jsonl", i),
            &claude_session_lines(&format!("claude-{}", i), "fix the failing auth tests"),
        )?;
        world.write_codex_session(
            &format!("c{}.jsonl", i),
            &[
                codex_session_meta_line(&format!("codex-{}", i), "/work/api", "2025-06-02T09:00:00Z"),
                codex_user_message_line("2025-06-02T09:00:05Z", "fix the failing auth tests"),
                codex_function_call_line("2025-06-02T09:00:10Z", "shell", "{}"),
            ],
        )?;
    }

    let store = RelationStore::new(world.output_dir());
    run_extraction(&store, &world.roots(), &single_threaded())?;
    run_prompt_clustering(&store)?;
    run_tool_analysis(&store)?;
    run_workflow_mining(&store)?;

    let config = ClassifierConfig::default();
    let first = run_classification(&store, &config)?;
    let second = run_classification(&store, &config)?;
    assert_eq!(first, second);
    Ok(())
}

#[test]
fn test_missing_upstream_relation_is_a_clear_error() -> anyhow::Result<()> {
    let world = LogWorld::new()?;
    let store = RelationStore::new(world.output_dir());

    let err = run_tool_analysis(&store).unwrap_err().to_string();
    assert!(err.contains("tool_calls.arrow"), "unexpected error: {}", err);
    assert!(err.contains("run `skillmine extract` first"), "unexpected error: {}", err);

    let err = run_classification(&store, &ClassifierConfig::default())
        .unwrap_err()
        .to_string();
    assert!(err.contains("run `skillmine analyze` first"), "unexpected error: {}", err);
    Ok(())
}

#[test]
fn test_degenerate_inputs_flow_through_without_error() -> anyhow::Result<()> {
    // empty log tree: every phase still produces well-typed empty outputs
    let world = LogWorld::new()?;
    let store = RelationStore::new(world.output_dir());

    let stats = run_extraction(&store, &world.roots(), &single_threaded())?;
    assert_eq!(stats.total_files(), 0);

    let clusters = run_prompt_clustering(&store)?;
    assert!(clusters.is_empty());

    let tool_report = run_tool_analysis(&store)?;
    assert!(tool_report.frequency.is_empty());

    let workflows = run_workflow_mining(&store)?;
    assert!(workflows.is_empty());

    let classifications = run_classification(&store, &ClassifierConfig::default())?;
    assert!(classifications.skills.is_empty());
    assert!(classifications.tools.is_empty());
    Ok(())
}
