use anyhow::Result;
use skillmine_engine::run_classification;
use skillmine_store::RelationStore;
use skillmine_types::ClassifierConfig;

pub(crate) fn handle(store: &RelationStore) -> Result<()> {
    let results = run_classification(store, &ClassifierConfig::default())?;

    println!("Classification complete");
    println!("  skills:    {} candidates", results.skills.len());
    println!("  subagents: {} candidates", results.subagents.len());
    println!("  tools:     {} candidates", results.tools.len());
    Ok(())
}
