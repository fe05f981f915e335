//! Prompts for thread summarization

use crate::constants::{PROMPT_CONTENT_LIMIT, PROMPT_CONTENT_LIMIT_LONG};
use crate::mail::ParsedEmail;
use crate::summary::SummaryType;

/// System prompt for every summary request
pub const SYSTEM: &str = "You are a highly skilled email analysis assistant. \
Analyze email content thoroughly and provide structured summaries \
with clear highlighting of important details.";

const SHORT: &str = "Provide a concise 3-4 sentence summary with the following structure:
1. **Main Topic**: What is the primary subject matter?
2. **Key Participants**: Who are the main people involved?
3. **Critical Outcomes**: What important decisions, actions, or deadlines were established?
4. **Next Steps**: What follow-up actions are required?

Use **bold text** to highlight the most important information such as deadlines, \
dollar amounts, names, decisions, and action items.";

const MEDIUM: &str = "Provide a well-structured summary with the following format:
**Topic**: Main subject and context
**Participants**: Key people involved (highlight names in **bold**)
**Important Details**:
- **Deadlines/Dates**: Any time-sensitive information
- **Key Decisions**: Important choices made
- **Action Items**: Tasks assigned with responsible parties
- **Financial/Numerical Data**: Dollar amounts, quantities, etc.
**Outcomes**: Results achieved or expected
**Next Steps**: Required follow-up actions

Emphasize critical information with **bold formatting** including all names, \
dates, amounts, deadlines, and action items.";

const LONG: &str = "Provide a comprehensive detailed summary with the following structure:
## Executive Summary
Brief overview of the main topic and outcomes.

## Key Participants
List all important people and their roles.

## Important Details
- **Deadlines**: All dates and timeline information
- **Financial Information**: Any monetary amounts, budgets, costs
- **Decisions Made**: Key choices and determinations
- **Action Items**: Specific tasks and responsibilities assigned
- **Issues/Concerns**: Problems raised and their status

## Next Steps & Follow-up
What needs to happen next and who is responsible.

Use **bold text** for all critical information including names, dates, amounts, \
and action items. Use bullet points for clarity.";

const INSTRUCTIONS: &str = "
=== ANALYSIS INSTRUCTIONS ===
Please analyze the entire email thread and provide a summary that:
1. Identifies ALL important details (dates, names, amounts, deadlines)
2. Highlights critical information using **bold text**
3. Organizes information logically and clearly
4. Includes specific action items and who is responsible
5. Notes any unresolved issues or pending decisions
6. Provides clear next steps and timelines

Remember: Use **bold text** for all names, dates, dollar amounts, \
deadlines, and action items to make them easily scannable.";

fn base_prompt(kind: SummaryType) -> &'static str {
    match kind {
        SummaryType::Short => SHORT,
        SummaryType::Medium => MEDIUM,
        SummaryType::Long => LONG,
    }
}

/// Per-email content budget in characters
fn content_limit(kind: SummaryType) -> usize {
    match kind {
        SummaryType::Long => PROMPT_CONTENT_LIMIT_LONG,
        _ => PROMPT_CONTENT_LIMIT,
    }
}

/// User prompt: the structure for the requested summary type, every email
/// with its headers and (truncated) content, then the analysis checklist.
pub fn build_thread_prompt(emails: &[ParsedEmail], kind: SummaryType) -> String {
    let limit = content_limit(kind);
    let mut prompt = format!("{}\n\n=== EMAIL THREAD ANALYSIS ===\n", base_prompt(kind));

    for (i, email) in emails.iter().enumerate() {
        let date = if email.date.trim().is_empty() {
            "Not specified"
        } else {
            email.date.as_str()
        };

        let mut content: String = email.content.chars().take(limit).collect();
        if email.content.chars().count() > limit {
            content.push_str("...[content truncated]");
        }

        prompt.push_str(&format!(
            "\n--- Email {} ---\nFrom: {}\nTo: {}\nSubject: {}\nDate: {}\nContent: {}\n",
            i + 1,
            email.from,
            email.to,
            email.subject,
            date,
            content
        ));
    }

    prompt.push_str(INSTRUCTIONS);
    prompt
}
