use anyhow::Result;
use skillmine_engine::run_extraction;
use skillmine_store::RelationStore;
use skillmine_types::ExtractionStats;

use crate::args::ExtractArgs;
use crate::output::fmt_count;

pub(crate) fn handle(store: &RelationStore, args: &ExtractArgs) -> Result<()> {
    let stats = run_extraction(store, &args.source_roots(), &args.extract_options())?;
    print_stats(&stats);
    Ok(())
}

pub(crate) fn print_stats(stats: &ExtractionStats) {
    println!("Extraction complete");
    println!("  total files:  {}", fmt_count(stats.total_files()));
    println!("    claude:     {}", fmt_count(stats.claude_files));
    println!("    codex:      {}", fmt_count(stats.codex_files));
    println!("    lemon:      {}", fmt_count(stats.lemon_files));
    if stats.skipped_files > 0 {
        println!("    skipped:    {}", fmt_count(stats.skipped_files));
    }
    println!("  user prompts: {}", fmt_count(stats.prompts));
    println!("  tool calls:   {}", fmt_count(stats.tool_calls));
    println!("  sessions:     {}", fmt_count(stats.sessions));
}
