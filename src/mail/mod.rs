//! Email sources: .eml and .msg parsing, attachment text, and the
//! heuristic splitter for threads flattened into plain text.

mod attachment;
mod msg;
mod parser;
mod thread;
mod types;

pub use msg::parse_msg;
pub use parser::parse_eml;
pub use thread::{normalize_subject, split_email_threads};
pub use types::{ParsedEmail, SourceFormat};
