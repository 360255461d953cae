use anyhow::Result;
use skillmine_types::SourceRoots;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// An isolated on-disk world: one temp directory holding log trees for all
/// three sources plus an output directory, with a matching [`SourceRoots`].
///
/// Sessions are written as JSONL files exactly where each runtime would put
/// them, so extraction tests run against realistic directory shapes.
pub struct LogWorld {
    temp: TempDir,
}

impl LogWorld {
    pub fn new() -> Result<Self> {
        let temp = TempDir::new()?;
        Ok(Self { temp })
    }

    pub fn roots(&self) -> SourceRoots {
        let base = self.temp.path();
        SourceRoots {
            claude_root: base.join("claude/projects"),
            codex_root: base.join("codex/sessions"),
            codex_history: base.join("codex/history.jsonl"),
            lemon_root: base.join("lemon/agent/sessions"),
        }
    }

    pub fn output_dir(&self) -> PathBuf {
        self.temp.path().join("output")
    }

    pub fn path(&self) -> &Path {
        self.temp.path()
    }

    /// Write a Claude session file under an encoded project directory.
    pub fn write_claude_session(
        &self,
        project: &str,
        file_name: &str,
        lines: &[String],
    ) -> Result<PathBuf> {
        let encoded = format!("-{}", project.replace(['/', '.'], "-").trim_start_matches('-'));
        let dir = self.roots().claude_root.join(encoded);
        self.write_jsonl(&dir, file_name, lines)
    }

    pub fn write_codex_session(&self, file_name: &str, lines: &[String]) -> Result<PathBuf> {
        let dir = self.roots().codex_root.clone();
        self.write_jsonl(&dir, file_name, lines)
    }

    pub fn write_codex_history(&self, lines: &[String]) -> Result<PathBuf> {
        let path = self.roots().codex_history;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, format!("{}\n", lines.join("\n")))?;
        Ok(path)
    }

    pub fn write_lemon_session(&self, file_name: &str, lines: &[String]) -> Result<PathBuf> {
        let dir = self.roots().lemon_root.clone();
        self.write_jsonl(&dir, file_name, lines)
    }

    fn write_jsonl(&self, dir: &Path, file_name: &str, lines: &[String]) -> Result<PathBuf> {
        fs::create_dir_all(dir)?;
        let path = dir.join(file_name);
        fs::write(&path, format!("{}\n", lines.join("\n")))?;
        Ok(path)
    }
}
