//! Splitting of flattened email threads (PDF exports, forwarded chains)
//! into individual messages.
//!
//! There are no threading headers to work with once a thread has been
//! printed to PDF, so this is pattern matching on the separators mail
//! clients insert between quoted messages.

use std::sync::LazyLock;

use regex::Regex;

use super::types::ParsedEmail;

/// Separators in priority order. The first one that occurs in the text
/// decides how it is split; the others are not consulted.
static SEPARATORS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)From:.*?@.*",
        r"(?i)-----Original Message-----",
        r"(?i)________________________________",
        r"(?i)On .* wrote:",
        r"(?i)Begin forwarded message:",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("separator patterns are valid"))
    .collect()
});

/// Pull header-like fields out of a block of text.
///
/// Keys are matched anywhere in a line, case-insensitively, and the value
/// is whatever follows the line's first colon. A later line overwrites an
/// earlier one. Fields never seen stay "Not found".
pub fn extract_email_info(text: &str) -> ParsedEmail {
    let mut email = ParsedEmail::with_content(text);

    for line in text.split('\n') {
        let lower = line.to_lowercase();
        let value = || {
            line.split_once(':')
                .map(|(_, v)| v.trim().to_string())
                .unwrap_or_default()
        };

        if lower.contains("subject:") {
            email.subject = value();
        } else if lower.contains("from:") {
            email.from = value();
        } else if lower.contains("to:") {
            email.to = value();
        } else if ["date:", "sent:", "received:"]
            .iter()
            .any(|k| lower.contains(k))
        {
            email.date = value();
        }
    }

    email
}

/// Split a thread into messages. Never returns an empty vector: text with
/// no recognizable separator is treated as a single email.
pub fn split_email_threads(text: &str) -> Vec<ParsedEmail> {
    for separator in SEPARATORS.iter() {
        if let Some(parts) = split_on(separator, text) {
            let emails: Vec<ParsedEmail> = parts.iter().map(|p| extract_email_info(p)).collect();
            if emails.is_empty() {
                break;
            }
            tracing::debug!(
                "Split thread into {} emails on {:?}",
                emails.len(),
                separator.as_str()
            );
            return emails;
        }
    }

    vec![extract_email_info(text)]
}

/// Split `text` at every match of `separator`, gluing each separator back
/// onto the segment that follows it. Segments with no text of their own are
/// dropped. Returns None when the separator does not occur at all.
fn split_on(separator: &Regex, text: &str) -> Option<Vec<String>> {
    let mut matches = separator.find_iter(text).peekable();
    let first = matches.peek()?.start();

    let mut parts = Vec::new();
    if !text[..first].trim().is_empty() {
        parts.push(text[..first].trim().to_string());
    }

    while let Some(m) = matches.next() {
        let end = matches.peek().map_or(text.len(), |next| next.start());
        let body = &text[m.end()..end];
        if body.trim().is_empty() {
            continue;
        }
        parts.push(format!("{}{}", m.as_str(), body).trim().to_string());
    }

    Some(parts)
}

/// Normalize subject for topic comparison: strip Re:/Fwd:/Fw: style
/// prefixes (including localized and counted variants) and lowercase.
pub fn normalize_subject(subject: &str) -> String {
    const PREFIXES: &[&str] = &["re:", "fwd:", "fw:", "aw:", "sv:", "wg:"];

    let mut s = subject.trim();
    'strip: loop {
        let lower = s.to_lowercase();
        for prefix in PREFIXES {
            if lower.starts_with(prefix) {
                s = s[prefix.len()..].trim_start();
                continue 'strip;
            }
        }
        // Re[2]: style
        if lower.starts_with("re[")
            && let Some(end) = s.find("]:")
        {
            s = s[end + 2..].trim_start();
            continue;
        }
        break;
    }
    s.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::NOT_FOUND;

    #[test]
    fn test_extract_email_info_headers() {
        let text = "From: Alice <alice@example.com>\n\
                    To: bob@example.com\n\
                    Sent: Monday, March 3, 2025 9:14 AM\n\
                    Subject: Re: Q3 budget\n\
                    Numbers attached.";

        let email = extract_email_info(text);
        assert_eq!(email.from, "Alice <alice@example.com>");
        assert_eq!(email.to, "bob@example.com");
        assert_eq!(email.date, "Monday, March 3, 2025 9:14 AM");
        assert_eq!(email.subject, "Re: Q3 budget");
        assert_eq!(email.content, text);
    }

    #[test]
    fn test_extract_email_info_missing_fields() {
        let email = extract_email_info("just some words");
        assert_eq!(email.subject, NOT_FOUND);
        assert_eq!(email.from, NOT_FOUND);
        assert_eq!(email.to, NOT_FOUND);
        assert_eq!(email.date, NOT_FOUND);
    }

    #[test]
    fn test_subject_wins_over_other_keys_on_same_line() {
        let email = extract_email_info("Subject: from: the archive");
        assert_eq!(email.subject, "from: the archive");
        assert_eq!(email.from, NOT_FOUND);
    }

    #[test]
    fn test_split_on_from_lines() {
        let text = "From: carol@example.com\nSubject: Launch\nWe ship Friday.\n\
                    From: dave@example.com\nSubject: Re: Launch\nConfirmed.";

        let emails = split_email_threads(text);
        assert_eq!(emails.len(), 2);
        assert_eq!(emails[0].from, "carol@example.com");
        assert_eq!(emails[0].subject, "Launch");
        assert!(emails[0].content.ends_with("We ship Friday."));
        assert_eq!(emails[1].from, "dave@example.com");
        assert_eq!(emails[1].subject, "Re: Launch");
    }

    #[test]
    fn test_split_keeps_leading_text() {
        let text = "Thanks, see below.\n-----Original Message-----\n\
                    Subject: Contract\nPlease sign.";

        let emails = split_email_threads(text);
        assert_eq!(emails.len(), 2);
        assert_eq!(emails[0].content, "Thanks, see below.");
        assert!(emails[1].content.starts_with("-----Original Message-----"));
        assert_eq!(emails[1].subject, "Contract");
    }

    #[test]
    fn test_first_matching_separator_wins() {
        // Both "On ... wrote:" and the underscore rule occur; the rule has
        // higher priority so the "wrote:" line stays inside a segment.
        let text = "Sounds good.\n________________________________\n\
                    On Tue, Jan 7, Erin wrote:\n> Can we meet?";

        let emails = split_email_threads(text);
        assert_eq!(emails.len(), 2);
        assert!(emails[1].content.contains("Erin wrote:"));
    }

    #[test]
    fn test_no_separator_is_single_email() {
        let emails = split_email_threads("Subject: Hello\nNothing quoted here.");
        assert_eq!(emails.len(), 1);
        assert_eq!(emails[0].subject, "Hello");
    }

    #[test]
    fn test_separator_only_text_is_single_email() {
        let emails = split_email_threads("-----Original Message-----");
        assert_eq!(emails.len(), 1);
        assert_eq!(emails[0].content, "-----Original Message-----");
    }

    #[test]
    fn test_separators_are_case_insensitive() {
        let text = "Top reply\nbegin FORWARDED message:\nSubject: Old news\nbody";
        let emails = split_email_threads(text);
        assert_eq!(emails.len(), 2);
        assert_eq!(emails[1].subject, "Old news");
    }

    #[test]
    fn test_normalize_subject() {
        assert_eq!(normalize_subject("Hello"), "hello");
        assert_eq!(normalize_subject("Re: Hello"), "hello");
        assert_eq!(normalize_subject("RE: Fwd: Hello"), "hello");
        assert_eq!(normalize_subject("FW: AW: Hello"), "hello");
        assert_eq!(normalize_subject("Re[2]: Hello"), "hello");
        assert_eq!(normalize_subject("  Re:  Hello  "), "hello");
    }
}
