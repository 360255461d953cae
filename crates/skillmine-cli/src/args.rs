use clap::{Args, Parser, Subcommand};
use skillmine_types::{ExtractOptions, SourceRoots};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "skillmine")]
#[command(about = "Mine AI session logs for skill, subagent, and tool candidates", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Directory holding relation files and reports
    #[arg(long, default_value = "skillmine-output", global = true)]
    pub output_dir: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Phase 1: extract and normalize session logs into relations")]
    Extract(ExtractArgs),

    #[command(about = "Phase 2: cluster prompts, analyze tool usage, mine workflows")]
    Analyze,

    #[command(about = "Phase 3: score skill, subagent, and tool candidates")]
    Classify,

    #[command(about = "Phase 4: render the terminal report and write the markdown report")]
    Report,

    #[command(about = "Run the full pipeline: extract, analyze, classify, report")]
    Run(ExtractArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct ExtractArgs {
    /// Limit files processed per source (for testing)
    #[arg(long)]
    pub max_files: Option<usize>,

    /// Override the worker pool size (default: CPU core count)
    #[arg(long)]
    pub workers: Option<usize>,

    /// Skip lemon sessions
    #[arg(long)]
    pub skip_lemon: bool,

    /// Override the claude session root
    #[arg(long)]
    pub claude_root: Option<PathBuf>,

    /// Override the codex session root
    #[arg(long)]
    pub codex_root: Option<PathBuf>,

    /// Override the codex auxiliary history log
    #[arg(long)]
    pub codex_history: Option<PathBuf>,

    /// Override the lemon session root
    #[arg(long)]
    pub lemon_root: Option<PathBuf>,
}

impl ExtractArgs {
    pub fn source_roots(&self) -> SourceRoots {
        let mut roots = SourceRoots::default();
        if let Some(path) = &self.claude_root {
            roots.claude_root = path.clone();
        }
        if let Some(path) = &self.codex_root {
            roots.codex_root = path.clone();
        }
        if let Some(path) = &self.codex_history {
            roots.codex_history = path.clone();
        }
        if let Some(path) = &self.lemon_root {
            roots.lemon_root = path.clone();
        }
        roots
    }

    pub fn extract_options(&self) -> ExtractOptions {
        ExtractOptions {
            max_files: self.max_files,
            workers: self.workers,
            skip_lemon: self.skip_lemon,
        }
    }
}
