use is_terminal::IsTerminal;
use owo_colors::OwoColorize;

/// Section banner, colored only when stdout is a terminal.
pub(crate) fn banner(text: &str) {
    if std::io::stdout().is_terminal() {
        println!("\n{}", text.cyan().bold());
    } else {
        println!("\n{}", text);
    }
}

pub(crate) fn phase_line(text: &str) {
    if std::io::stdout().is_terminal() {
        println!("{}", text.blue());
    } else {
        println!("{}", text);
    }
}

/// Compact human count: 1234 -> "1.2K", 3400000 -> "3.4M".
pub(crate) fn fmt_count(n: usize) -> String {
    if n >= 1_000_000 {
        format!("{:.1}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.1}K", n as f64 / 1_000.0)
    } else {
        n.to_string()
    }
}

/// Single-line ellipsis truncation for table cells.
pub(crate) fn cell(text: &str, max: usize) -> String {
    let flat = text.replace('\n', " ");
    if flat.chars().count() <= max {
        flat
    } else {
        let mut truncated: String = flat.chars().take(max).collect();
        truncated.push_str("...");
        truncated
    }
}
