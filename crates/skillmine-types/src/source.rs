use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Log platform a record was extracted from.
///
/// Each variant corresponds to one on-disk log schema with its own parser
/// implementation in `skillmine-providers`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Claude,
    Codex,
    Lemon,
}

impl Source {
    pub const ALL: [Source; 3] = [Source::Claude, Source::Codex, Source::Lemon];

    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Claude => "claude",
            Source::Codex => "codex",
            Source::Lemon => "lemon",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Source {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "claude" => Ok(Source::Claude),
            "codex" => Ok(Source::Codex),
            "lemon" => Ok(Source::Lemon),
            _ => Err(format!("unknown source '{}': expected claude, codex, or lemon", s)),
        }
    }
}

/// Render a set of sources as a sorted, comma-separated list.
pub fn format_sources(sources: &[Source]) -> String {
    let mut names: Vec<&str> = sources.iter().map(|s| s.as_str()).collect();
    names.sort_unstable();
    names.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_roundtrip() {
        for source in Source::ALL {
            assert_eq!(source.as_str().parse::<Source>().unwrap(), source);
        }
    }

    #[test]
    fn test_source_serde_lowercase() {
        let json = serde_json::to_string(&Source::Claude).unwrap();
        assert_eq!(json, "\"claude\"");
        let back: Source = serde_json::from_str("\"lemon\"").unwrap();
        assert_eq!(back, Source::Lemon);
    }

    #[test]
    fn test_unknown_source_rejected() {
        assert!("gemini".parse::<Source>().is_err());
    }
}
