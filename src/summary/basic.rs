//! Extractive summary used without an LLM, or when the LLM call fails.

use std::sync::LazyLock;

use regex::Regex;

use crate::constants::{MAX_IMPORTANT_DETAILS, MAX_PARTICIPANTS, NOT_FOUND, PREVIEW_CHARS};
use crate::mail::{ParsedEmail, normalize_subject};

static DATE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"\b\d{1,2}[/-]\d{1,2}[/-]\d{2,4}\b",
        r"\b\d{4}[/-]\d{1,2}[/-]\d{1,2}\b",
        r"(?i)\b(?:Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec)[a-z]* \d{1,2},? \d{4}\b",
    ])
});

static MONEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$[\d,]+(?:\.\d{2})?").expect("money pattern is valid"));

static ACTION_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"(?i)(?:deadline|due|complete|finish|deliver|submit|send|review|approve|sign|meet|call|discuss|decide)[^.]*",
        r"(?i)(?:urgent|important|priority|asap|immediately|critical)[^.]*",
        r"(?i)(?:action item|to do|task|assignment|responsibility)[^.]*",
    ])
});

static DEADLINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:deadline|due|by|before)[^.]*(?:\d{1,2}[/-]\d{1,2}[/-]\d{2,4}|\b(?:monday|tuesday|wednesday|thursday|friday|saturday|sunday)\b)",
    )
    .expect("deadline pattern is valid")
});

static DECISION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:decided|agreed|concluded|determined|approved|rejected)[^.]*")
        .expect("decision pattern is valid")
});

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(p).expect("summary patterns are valid"))
        .collect()
}

fn truncate(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}

/// Dates, amounts and action phrases found in one message body
fn important_details(content: &str) -> Vec<String> {
    let mut details = Vec::new();

    for re in DATE_PATTERNS.iter() {
        details.extend(
            re.find_iter(content)
                .take(3)
                .map(|m| format!("**Date:** {}", m.as_str())),
        );
    }

    details.extend(
        MONEY
            .find_iter(content)
            .take(3)
            .map(|m| format!("**Amount:** {}", m.as_str())),
    );

    for re in ACTION_PATTERNS.iter() {
        details.extend(
            re.find_iter(content)
                .take(2)
                .map(|m| format!("**Action:** {}...", truncate(m.as_str(), 100))),
        );
    }

    details.truncate(MAX_IMPORTANT_DETAILS);
    details
}

/// Senders in first-seen order, skipping unknowns and repeats
fn participants(emails: &[ParsedEmail]) -> Vec<&str> {
    let mut seen: Vec<&str> = Vec::new();
    for email in emails {
        let from = email.from.trim();
        if !from.is_empty() && from != NOT_FOUND && !seen.contains(&from) {
            seen.push(from);
        }
    }
    seen
}

fn distinct_topics(emails: &[ParsedEmail]) -> usize {
    let mut topics: Vec<String> = emails
        .iter()
        .filter(|e| !e.subject.trim().is_empty() && e.subject != NOT_FOUND)
        .map(|e| normalize_subject(&e.subject))
        .collect();
    topics.sort();
    topics.dedup();
    topics.len()
}

fn thread_highlights(emails: &[ParsedEmail]) -> Vec<String> {
    let all_content: String = emails
        .iter()
        .map(|e| format!(" {}", e.content))
        .collect();

    let deadlines = DEADLINE
        .find_iter(&all_content)
        .take(2)
        .map(|m| format!("**⏰ Deadline:** {}...", truncate(m.as_str(), 80)));
    let decisions = DECISION
        .find_iter(&all_content)
        .take(2)
        .map(|m| format!("**✅ Decision:** {}...", truncate(m.as_str(), 80)));

    deadlines.chain(decisions).collect()
}

/// Build a markdown summary from headers and simple pattern matches.
///
/// The first email contributes the subject, participants, a preview and
/// any dates, amounts or action phrases. Threads also get a participant
/// list, a topic count and deadline/decision highlights drawn from every
/// message.
pub fn generate_basic_summary(emails: &[ParsedEmail]) -> String {
    let mut parts: Vec<String> = vec![
        "**📧 Email Thread Summary**".to_string(),
        format!("**Number of emails:** {}", emails.len()),
    ];

    if let Some(first) = emails.first() {
        parts.push(format!("**Subject:** {}", first.subject));
        parts.push(format!(
            "**Main participants:** **{}** → **{}**",
            first.from, first.to
        ));
        parts.push(format!(
            "**Content preview:** {}...",
            truncate(&first.content, PREVIEW_CHARS)
        ));

        let details = important_details(&first.content);
        if !details.is_empty() {
            parts.push("**🔍 Important Details Found:**".to_string());
            parts.extend(details);
        }
    }

    if emails.len() > 1 {
        parts.push(format!(
            "\n**📊 Thread contains {} related emails**",
            emails.len()
        ));

        let people = participants(emails);
        if !people.is_empty() {
            let list = people
                .iter()
                .take(MAX_PARTICIPANTS)
                .map(|p| format!("**{}**", p))
                .collect::<Vec<_>>()
                .join(", ");
            parts.push(format!("**All participants:** {}", list));
        }

        let topics = distinct_topics(emails);
        if topics > 1 {
            parts.push(format!(
                "**Topic evolution:** {} different subjects discussed",
                topics
            ));
        }

        let highlights = thread_highlights(emails);
        if !highlights.is_empty() {
            parts.push("**🎯 Key Thread Highlights:**".to_string());
            parts.extend(highlights);
        }
    }

    parts.join("\n\n")
}
