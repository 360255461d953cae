use anyhow::Result;
use skillmine_engine::{
    run_classification, run_extraction, run_prompt_clustering, run_tool_analysis,
    run_workflow_mining,
};
use skillmine_store::RelationStore;
use skillmine_types::ClassifierConfig;

use crate::args::ExtractArgs;
use crate::handlers::extract::print_stats;
use crate::output::{banner, phase_line};
use crate::report::{render_terminal_report, write_markdown_report};

pub(crate) fn handle(store: &RelationStore, args: &ExtractArgs) -> Result<()> {
    banner("=== Phase 1: Extraction ===");
    let stats = run_extraction(store, &args.source_roots(), &args.extract_options())?;
    print_stats(&stats);

    banner("=== Phase 2: Analysis ===");
    phase_line("Clustering prompts...");
    let clusters = run_prompt_clustering(store)?;
    println!("  {} clusters", clusters.len());

    phase_line("Analyzing tool usage...");
    let tool_report = run_tool_analysis(store)?;
    println!("  {} unique tools", tool_report.frequency.len());

    phase_line("Mining workflows...");
    let workflows = run_workflow_mining(store)?;
    println!("  {} workflow patterns", workflows.len());

    banner("=== Phase 3: Classification ===");
    let classifications = run_classification(store, &ClassifierConfig::default())?;
    println!("  skills:    {} candidates", classifications.skills.len());
    println!("  subagents: {} candidates", classifications.subagents.len());
    println!("  tools:     {} candidates", classifications.tools.len());

    banner("=== Phase 4: Report ===");
    render_terminal_report(store, Some(&stats), &tool_report, &classifications)?;
    let path = write_markdown_report(store, Some(&stats), &tool_report, &classifications)?;
    println!("\nFull report: {}", path.display());

    Ok(())
}
