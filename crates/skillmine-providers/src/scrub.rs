use once_cell::sync::Lazy;
use regex::Regex;

static SYSTEM_REMINDER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<system-reminder>.*?</system-reminder>").unwrap());

static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").unwrap());

/// Strip internal wrapper markup from user prompt text.
///
/// Removes reminder/system blocks including their content, then any
/// remaining tag-delimited markup, and trims surrounding whitespace.
pub fn scrub_prompt_text(text: &str) -> String {
    let text = SYSTEM_REMINDER_RE.replace_all(text, "");
    let text = TAG_RE.replace_all(&text, "");
    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_system_reminder_blocks() {
        let text = "fix the bug <system-reminder>internal\nnote</system-reminder> please";
        assert_eq!(scrub_prompt_text(text), "fix the bug  please");
    }

    #[test]
    fn test_strips_tag_delimited_markup() {
        let text = "<command-name>/commit</command-name> run it";
        assert_eq!(scrub_prompt_text(text), "/commit run it");
    }

    #[test]
    fn test_plain_text_untouched() {
        assert_eq!(scrub_prompt_text("  add a test  "), "add a test");
    }

    #[test]
    fn test_all_markup_yields_empty() {
        let text = "<system-reminder>only internals</system-reminder>";
        assert_eq!(scrub_prompt_text(text), "");
    }
}
