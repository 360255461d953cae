use anyhow::Result;
use skillmine_store::RelationStore;
use skillmine_types::{
    Candidate, Classifications, ClusterSummary, ExtractionStats, ToolUsageReport, WorkflowPattern,
    format_sources,
};
use std::path::PathBuf;

use crate::output::{banner, cell, fmt_count};

fn load_clusters(store: &RelationStore) -> Result<Vec<ClusterSummary>> {
    if store.clusters_path().exists() {
        store.read_clusters()
    } else {
        Ok(Vec::new())
    }
}

fn load_workflows(store: &RelationStore) -> Result<Vec<WorkflowPattern>> {
    if store.workflows_path().exists() {
        store.read_workflows()
    } else {
        Ok(Vec::new())
    }
}

// --- Terminal report ---

pub(crate) fn render_terminal_report(
    store: &RelationStore,
    extract_stats: Option<&ExtractionStats>,
    tool_report: &ToolUsageReport,
    classifications: &Classifications,
) -> Result<()> {
    banner("=== Session Mining Report ===");

    if let Some(stats) = extract_stats {
        println!("\nExtraction summary");
        println!("  {:<22} {:>8}", "total files", fmt_count(stats.total_files()));
        println!("  {:<22} {:>8}", "prompts", fmt_count(stats.prompts));
        println!("  {:<22} {:>8}", "tool calls", fmt_count(stats.tool_calls));
        println!("  {:<22} {:>8}", "sessions", fmt_count(stats.sessions));
    }

    let clusters = load_clusters(store)?;
    if !clusters.is_empty() {
        println!("\nTop prompt clusters");
        println!("  {:>3}  {:<40} {:>6}  {}", "#", "label", "count", "sources");
        for (i, cluster) in clusters.iter().take(15).enumerate() {
            println!(
                "  {:>3}  {:<40} {:>6}  {}",
                i + 1,
                cell(&cluster.label, 40),
                cluster.count,
                format_sources(&cluster.sources),
            );
        }
    }

    if !tool_report.frequency.is_empty() {
        println!("\nTop tools by usage");
        for (i, row) in tool_report.frequency.iter().take(20).enumerate() {
            println!("  {:>3}  {:<30} {:>8}", i + 1, row.tool_name, fmt_count(row.count as usize));
        }
    }

    for n in [2usize, 3] {
        if let Some(rows) = tool_report.ngrams.get(&n)
            && !rows.is_empty()
        {
            println!("\nTop {}-gram tool sequences", n);
            for (i, row) in rows.iter().take(15).enumerate() {
                println!("  {:>3}  {:<50} {:>6}", i + 1, cell(&row.display(), 50), row.count);
            }
        }
    }

    for (title, candidates) in [
        ("Top skill candidates", &classifications.skills),
        ("Top subagent candidates", &classifications.subagents),
        ("Top tool candidates", &classifications.tools),
    ] {
        if candidates.is_empty() {
            continue;
        }
        println!("\n{}", title);
        println!("  {:>3}  {:<40} {:>5} {:>6}  {}", "#", "label", "score", "count", "reasons");
        for (i, candidate) in candidates.iter().take(10).enumerate() {
            println!(
                "  {:>3}  {:<40} {:>5} {:>6}  {}",
                i + 1,
                cell(&candidate.label, 40),
                candidate.score,
                candidate.count,
                cell(&candidate.reasons.join("; "), 50),
            );
        }
    }

    Ok(())
}

// --- Markdown report ---

pub(crate) fn write_markdown_report(
    store: &RelationStore,
    extract_stats: Option<&ExtractionStats>,
    tool_report: &ToolUsageReport,
    classifications: &Classifications,
) -> Result<PathBuf> {
    let mut lines: Vec<String> = Vec::new();

    lines.push("# Session Mining Report".to_string());
    lines.push(format!(
        "\nGenerated: {}\n",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    ));

    lines.push("## Summary Statistics\n".to_string());
    if let Some(stats) = extract_stats {
        lines.push("| Metric | Value |".to_string());
        lines.push("|--------|-------|".to_string());
        lines.push(format!("| Total files | {} |", stats.total_files()));
        lines.push(format!("| Claude files | {} |", stats.claude_files));
        lines.push(format!("| Codex files | {} |", stats.codex_files));
        lines.push(format!("| Lemon files | {} |", stats.lemon_files));
        lines.push(format!("| User prompts | {} |", stats.prompts));
        lines.push(format!("| Tool calls | {} |", stats.tool_calls));
        lines.push(format!("| Sessions | {} |", stats.sessions));
        lines.push(String::new());
    }

    let clusters = load_clusters(store)?;
    if !clusters.is_empty() {
        lines.push("## Prompt Clusters\n".to_string());
        for cluster in &clusters {
            lines.push(format!("### Cluster: {} ({} prompts)\n", cluster.label, cluster.count));
            lines.push(format!("**Sources:** {}\n", format_sources(&cluster.sources)));
            if !cluster.top_terms.is_empty() {
                let terms: Vec<&str> =
                    cluster.top_terms.iter().take(8).map(String::as_str).collect();
                lines.push(format!("**Top terms:** {}\n", terms.join(", ")));
            }
            if !cluster.example_prompts.is_empty() {
                lines.push("**Example prompts:**\n".to_string());
                for example in cluster.example_prompts.iter().take(5) {
                    lines.push(format!("- {}", cell(example, 150)));
                }
                lines.push(String::new());
            }
        }
    }

    if !tool_report.frequency.is_empty() {
        lines.push("## Tool Usage Analysis\n".to_string());
        lines.push("### Overall Tool Frequency\n".to_string());
        lines.push("| Rank | Tool | Count |".to_string());
        lines.push("|------|------|-------|".to_string());
        for (i, row) in tool_report.frequency.iter().take(25).enumerate() {
            lines.push(format!("| {} | {} | {} |", i + 1, row.tool_name, row.count));
        }
        lines.push(String::new());

        for (n, title) in [(2usize, "Bigrams"), (3, "Trigrams"), (4, "4-grams")] {
            let Some(rows) = tool_report.ngrams.get(&n) else {
                continue;
            };
            if rows.is_empty() {
                continue;
            }
            lines.push(format!("### Tool {}\n", title));
            lines.push("| Rank | Sequence | Count |".to_string());
            lines.push("|------|----------|-------|".to_string());
            for (i, row) in rows.iter().take(20).enumerate() {
                lines.push(format!("| {} | {} | {} |", i + 1, row.display(), row.count));
            }
            lines.push(String::new());
        }

        if !tool_report.cooccurrence.is_empty() {
            lines.push("### Tool Co-occurrence (same turn)\n".to_string());
            lines.push("| Tool A | Tool B | Count |".to_string());
            lines.push("|--------|--------|-------|".to_string());
            for row in tool_report.cooccurrence.iter().take(20) {
                lines.push(format!("| {} | {} | {} |", row.tool_a, row.tool_b, row.count));
            }
            lines.push(String::new());
        }

        if !tool_report.errors.is_empty() {
            lines.push("### Tool Errors\n".to_string());
            lines.push("| Tool | Errors | Calls | Error rate |".to_string());
            lines.push("|------|--------|-------|------------|".to_string());
            for row in &tool_report.errors {
                lines.push(format!(
                    "| {} | {} | {} | {:.1}% |",
                    row.tool_name, row.error_count, row.count, row.error_rate_pct
                ));
            }
            lines.push(String::new());
        }
    }

    let workflows = load_workflows(store)?;
    if !workflows.is_empty() {
        lines.push("## Workflow Patterns\n".to_string());
        lines.push("| Rank | Pattern | Occurrences | Sessions | Sources |".to_string());
        lines.push("|------|---------|-------------|----------|---------|".to_string());
        for (i, workflow) in workflows.iter().take(30).enumerate() {
            lines.push(format!(
                "| {} | {} | {} | {} | {} |",
                i + 1,
                workflow.pattern_display(),
                workflow.occurrences,
                workflow.distinct_sessions,
                format_sources(&workflow.sources),
            ));
        }
        lines.push(String::new());
    }

    lines.push("## Recommended Candidates\n".to_string());
    for (title, description, candidates) in [
        (
            "Skill Candidates",
            "High-level user-facing workflows that should become reusable skills",
            &classifications.skills,
        ),
        (
            "Subagent Candidates",
            "Delegatable research/exploration tasks",
            &classifications.subagents,
        ),
        ("Tool Candidates", "Reusable atomic tool operations", &classifications.tools),
    ] {
        if candidates.is_empty() {
            continue;
        }
        lines.push(format!("### {}\n", title));
        lines.push(format!("*{}*\n", description));
        for (i, candidate) in candidates.iter().take(15).enumerate() {
            lines.extend(candidate_lines(i + 1, candidate));
        }
    }

    let path = store.report_path();
    std::fs::write(&path, lines.join("\n"))?;
    Ok(path)
}

fn candidate_lines(rank: usize, candidate: &Candidate) -> Vec<String> {
    let mut lines = Vec::new();
    lines.push(format!("**{}. {}** (score: {})", rank, candidate.label, candidate.score));
    if !candidate.reasons.is_empty() {
        lines.push(format!("  - Reasons: {}", candidate.reasons.join("; ")));
    }
    if candidate.count > 0 {
        lines.push(format!("  - Frequency: {}", candidate.count));
    }
    if !candidate.sources.is_empty() {
        lines.push(format!("  - Sources: {}", format_sources(&candidate.sources)));
    }
    if !candidate.examples.is_empty() {
        lines.push("  - Examples:".to_string());
        for example in candidate.examples.iter().take(3) {
            lines.push(format!("    - {}", cell(example, 120)));
        }
    }
    if let Some(workflow) = &candidate.workflow {
        lines.push(format!("  - Workflow: {}", workflow));
    }
    lines.push(String::new());
    lines
}
