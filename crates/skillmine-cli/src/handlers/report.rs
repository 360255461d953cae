use anyhow::Result;
use skillmine_engine::{run_classification, run_tool_analysis};
use skillmine_store::RelationStore;
use skillmine_types::ClassifierConfig;

use crate::report::{render_terminal_report, write_markdown_report};

pub(crate) fn handle(store: &RelationStore) -> Result<()> {
    let tool_report = run_tool_analysis(store)?;
    let classifications = run_classification(store, &ClassifierConfig::default())?;

    render_terminal_report(store, None, &tool_report, &classifications)?;
    let path = write_markdown_report(store, None, &tool_report, &classifications)?;
    println!("\nReport saved to {}", path.display());
    Ok(())
}
