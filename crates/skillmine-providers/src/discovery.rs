use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Recursively discover line-delimited-JSON files under a source root.
///
/// Results are sorted for deterministic processing order. A missing root is
/// an empty source, not an error. `max_files` caps the list (for testing).
pub fn discover_jsonl_files(root: &Path, max_files: Option<usize>) -> Vec<PathBuf> {
    if !root.exists() {
        return Vec::new();
    }

    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "jsonl"))
        .collect();

    files.sort();

    if let Some(cap) = max_files {
        files.truncate(cap);
    }

    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_missing_root_is_empty() {
        let files = discover_jsonl_files(Path::new("/nonexistent/skillmine-root"), None);
        assert!(files.is_empty());
    }

    #[test]
    fn test_discovers_nested_jsonl_sorted_and_capped() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        fs::create_dir_all(dir.path().join("b"))?;
        fs::write(dir.path().join("b/two.jsonl"), "{}\n")?;
        fs::write(dir.path().join("a.jsonl"), "{}\n")?;
        fs::write(dir.path().join("notes.txt"), "skip me")?;

        let files = discover_jsonl_files(dir.path(), None);
        assert_eq!(files.len(), 2);
        assert!(files[0].ends_with("a.jsonl"));
        assert!(files[1].ends_with("b/two.jsonl"));

        let capped = discover_jsonl_files(dir.path(), Some(1));
        assert_eq!(capped.len(), 1);
        Ok(())
    }
}
