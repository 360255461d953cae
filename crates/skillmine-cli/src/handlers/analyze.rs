use anyhow::Result;
use skillmine_engine::{run_prompt_clustering, run_tool_analysis, run_workflow_mining};
use skillmine_store::RelationStore;

use crate::output::phase_line;

pub(crate) fn handle(store: &RelationStore) -> Result<()> {
    phase_line("Clustering prompts...");
    let clusters = run_prompt_clustering(store)?;
    println!("  {} clusters", clusters.len());

    phase_line("Analyzing tool usage...");
    let tool_report = run_tool_analysis(store)?;
    println!("  {} unique tools", tool_report.frequency.len());

    phase_line("Mining workflows...");
    let workflows = run_workflow_mining(store)?;
    println!("  {} workflow patterns", workflows.len());

    Ok(())
}
