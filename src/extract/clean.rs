use std::sync::LazyLock;

use regex::Regex;

static BLANK_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\s*\n").expect("blank-run pattern is valid"));

/// Strip PDF extraction noise: blank lines, bare page numbers, "Page N of M"
/// footers and fragments of three characters or fewer. Lines are trimmed.
pub fn clean_email_text(text: &str) -> String {
    let text = BLANK_RUNS.replace_all(text, "\n\n");

    text.split('\n')
        .map(str::trim)
        .filter(|line| {
            !line.is_empty()
                && !line.chars().all(|c| c.is_ascii_digit())
                && !line.starts_with("Page ")
                && line.chars().count() > 3
        })
        .collect::<Vec<_>>()
        .join("\n")
}
