use skillmine_types::{Source, SourceRoots};

use crate::claude::ClaudeParser;
use crate::codex::{CodexParser, HistoryIndex};
use crate::lemon::LemonParser;
use crate::traits::LogParser;
use crate::{Error, Result};

#[derive(Debug, Clone)]
pub struct SourceMetadata {
    pub source: Source,
    pub description: &'static str,
    pub default_log_path: &'static str,
}

const SOURCES: &[SourceMetadata] = &[
    SourceMetadata {
        source: Source::Claude,
        description: "Claude Code sessions",
        default_log_path: "~/.claude/projects",
    },
    SourceMetadata {
        source: Source::Codex,
        description: "Codex CLI sessions",
        default_log_path: "~/.codex/sessions",
    },
    SourceMetadata {
        source: Source::Lemon,
        description: "Lemon agent sessions",
        default_log_path: "~/.lemon/agent/sessions",
    },
];

pub fn list_sources() -> &'static [SourceMetadata] {
    SOURCES
}

pub fn get_source_metadata(source: Source) -> Result<&'static SourceMetadata> {
    SOURCES
        .iter()
        .find(|meta| meta.source == source)
        .ok_or_else(|| Error::Source(format!("source not registered: {}", source)))
}

/// Build one parser per enabled source.
///
/// The codex auxiliary history log is loaded here, once, and shared
/// read-only by every worker that parses a codex file.
pub fn build_parsers(roots: &SourceRoots, skip_lemon: bool) -> Vec<Box<dyn LogParser>> {
    let mut parsers: Vec<Box<dyn LogParser>> = vec![
        Box::new(ClaudeParser),
        Box::new(CodexParser::new(HistoryIndex::load(&roots.codex_history))),
    ];
    if !skip_lemon {
        parsers.push(Box::new(LemonParser));
    }
    parsers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_sources_registered() {
        for source in Source::ALL {
            assert!(get_source_metadata(source).is_ok());
        }
    }

    #[test]
    fn test_skip_lemon_drops_one_parser() {
        let roots = SourceRoots::default();
        assert_eq!(build_parsers(&roots, false).len(), 3);
        let parsers = build_parsers(&roots, true);
        assert_eq!(parsers.len(), 2);
        assert!(parsers.iter().all(|p| p.source() != Source::Lemon));
    }
}
