use once_cell::sync::Lazy;
use regex::Regex;

/// Tokens substituted for volatile substrings before vectorization. They are
/// excluded again when cluster labels are derived.
pub(crate) const PLACEHOLDER_TOKENS: &[&str] = &["path", "uuid", "hash", "num"];

/// Preprocessed texts at or below this length are excluded from clustering.
pub(crate) const MIN_PROCESSED_LEN: usize = 10;

static FILE_PATH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[/\\][\w._\-/\\]+\.\w+").unwrap());

static DIR_PATH_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[/\\][\w._\-/\\]{3,}").unwrap());

static UUID_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}").unwrap()
});

static HEX_HASH_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b[0-9a-f]{7,40}\b").unwrap());

static INTEGER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\d+\b").unwrap());

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Lowercase and replace paths, UUIDs, hex hashes, and bare integers with
/// fixed placeholder tokens, then collapse whitespace.
///
/// Placeholders keep structurally similar prompts ("fix /a/b.rs" and
/// "fix /c/d.rs") in the same neighborhood instead of scattering them
/// across the vocabulary.
pub(crate) fn preprocess(text: &str) -> String {
    let text = text.to_lowercase();
    let text = FILE_PATH_RE.replace_all(&text, " path ");
    let text = DIR_PATH_RE.replace_all(&text, " path ");
    let text = UUID_RE.replace_all(&text, " uuid ");
    let text = HEX_HASH_RE.replace_all(&text, " hash ");
    let text = INTEGER_RE.replace_all(&text, " num ");
    let text = WHITESPACE_RE.replace_all(&text, " ");
    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercases_and_collapses_whitespace() {
        assert_eq!(preprocess("Fix   The\n\tBug"), "fix the bug");
    }

    #[test]
    fn test_file_paths_replaced() {
        assert_eq!(preprocess("open /src/main.rs please"), "open path please");
    }

    #[test]
    fn test_bare_directories_replaced() {
        assert_eq!(preprocess("look in /usr/local/bin now"), "look in path now");
    }

    #[test]
    fn test_uuids_replaced() {
        let text = "session 7f2abd2d-7cfc-4447-9ddd-3ca8d14e02e9 failed";
        assert_eq!(preprocess(text), "session uuid failed");
    }

    #[test]
    fn test_hex_hashes_replaced() {
        assert_eq!(preprocess("commit deadbeef123 broke it"), "commit hash broke it");
    }

    #[test]
    fn test_integers_replaced() {
        assert_eq!(preprocess("retry 42 times"), "retry num times");
    }

    #[test]
    fn test_short_hex_words_kept() {
        // "bad" and "face" are ordinary words below the 7-char hash floor
        assert_eq!(preprocess("bad face"), "bad face");
    }
}
