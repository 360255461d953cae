use anyhow::{Context, Result};
use skillmine_types::{
    ClusterSummary, ClusteredPrompt, PromptRecord, SessionRecord, SourceToolCount, ToolCallRecord,
    ToolCount, WorkflowPattern,
};
use std::path::{Path, PathBuf};

use crate::relations;

// Phase names match the CLI subcommand that produces each relation, so a
// missing-relation error tells the user exactly what to run.
const PHASE_EXTRACT: &str = "extract";
const PHASE_ANALYZE: &str = "analyze";

/// Handle on one output directory holding the pipeline's relation files.
///
/// Every relation is rewritten wholesale by the phase that owns it; readers
/// treat the files as immutable inputs. Concurrent runs against the same
/// directory are not supported.
#[derive(Debug, Clone)]
pub struct RelationStore {
    dir: PathBuf,
}

impl RelationStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn ensure_dir(&self) -> Result<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("failed to create output directory {}", self.dir.display()))
    }

    // --- Relation file locations ---

    pub fn prompts_path(&self) -> PathBuf {
        self.dir.join("prompts.arrow")
    }

    pub fn tool_calls_path(&self) -> PathBuf {
        self.dir.join("tool_calls.arrow")
    }

    pub fn sessions_path(&self) -> PathBuf {
        self.dir.join("sessions.arrow")
    }

    pub fn clusters_path(&self) -> PathBuf {
        self.dir.join("clusters.arrow")
    }

    pub fn clustered_prompts_path(&self) -> PathBuf {
        self.dir.join("prompts_clustered.arrow")
    }

    pub fn tool_frequency_path(&self) -> PathBuf {
        self.dir.join("tool_frequency.arrow")
    }

    pub fn tool_frequency_by_source_path(&self) -> PathBuf {
        self.dir.join("tool_frequency_by_source.arrow")
    }

    pub fn workflows_path(&self) -> PathBuf {
        self.dir.join("workflows.arrow")
    }

    pub fn report_path(&self) -> PathBuf {
        self.dir.join("session-mining-report.md")
    }

    // --- Extraction outputs ---

    pub fn write_prompts(&self, rows: &[PromptRecord]) -> Result<()> {
        relations::prompts::write(&self.prompts_path(), rows)
    }

    pub fn read_prompts(&self) -> Result<Vec<PromptRecord>> {
        relations::prompts::read(&self.prompts_path(), PHASE_EXTRACT)
    }

    pub fn write_tool_calls(&self, rows: &[ToolCallRecord]) -> Result<()> {
        relations::tool_calls::write(&self.tool_calls_path(), rows)
    }

    pub fn read_tool_calls(&self) -> Result<Vec<ToolCallRecord>> {
        relations::tool_calls::read(&self.tool_calls_path(), PHASE_EXTRACT)
    }

    pub fn write_sessions(&self, rows: &[SessionRecord]) -> Result<()> {
        relations::sessions::write(&self.sessions_path(), rows)
    }

    pub fn read_sessions(&self) -> Result<Vec<SessionRecord>> {
        relations::sessions::read(&self.sessions_path(), PHASE_EXTRACT)
    }

    // --- Clustering outputs ---

    pub fn write_clusters(&self, rows: &[ClusterSummary]) -> Result<()> {
        relations::clusters::write(&self.clusters_path(), rows)
    }

    pub fn read_clusters(&self) -> Result<Vec<ClusterSummary>> {
        relations::clusters::read(&self.clusters_path(), PHASE_ANALYZE)
    }

    pub fn write_clustered_prompts(&self, rows: &[ClusteredPrompt]) -> Result<()> {
        relations::prompts::write_clustered(&self.clustered_prompts_path(), rows)
    }

    pub fn read_clustered_prompts(&self) -> Result<Vec<ClusteredPrompt>> {
        relations::prompts::read_clustered(&self.clustered_prompts_path(), PHASE_ANALYZE)
    }

    // --- Tool analysis outputs ---

    pub fn write_tool_frequency(&self, rows: &[ToolCount]) -> Result<()> {
        relations::frequency::write_global(&self.tool_frequency_path(), rows)
    }

    pub fn read_tool_frequency(&self) -> Result<Vec<ToolCount>> {
        relations::frequency::read_global(&self.tool_frequency_path(), PHASE_ANALYZE)
    }

    pub fn write_tool_frequency_by_source(&self, rows: &[SourceToolCount]) -> Result<()> {
        relations::frequency::write_by_source(&self.tool_frequency_by_source_path(), rows)
    }

    pub fn read_tool_frequency_by_source(&self) -> Result<Vec<SourceToolCount>> {
        relations::frequency::read_by_source(&self.tool_frequency_by_source_path(), PHASE_ANALYZE)
    }

    // --- Workflow mining outputs ---

    pub fn write_workflows(&self, rows: &[WorkflowPattern]) -> Result<()> {
        relations::workflows::write(&self.workflows_path(), rows)
    }

    pub fn read_workflows(&self) -> Result<Vec<WorkflowPattern>> {
        relations::workflows::read(&self.workflows_path(), PHASE_ANALYZE)
    }
}
