//! Summary kinds, the extractive fallback summary and the report handed
//! back to callers.

mod basic;
mod report;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use basic::generate_basic_summary;
pub use report::{SummaryMethod, SummaryReport};

/// How much detail the summary should carry.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum SummaryType {
    Short,
    #[default]
    Medium,
    Long,
}

impl SummaryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Short => "short",
            Self::Medium => "medium",
            Self::Long => "long",
        }
    }
}

impl fmt::Display for SummaryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Case-insensitive; anything unrecognized is Medium.
impl FromStr for SummaryType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "short" => Self::Short,
            "long" => Self::Long,
            _ => Self::Medium,
        })
    }
}

impl From<String> for SummaryType {
    fn from(s: String) -> Self {
        s.parse().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_summary_type() {
        assert_eq!("short".parse::<SummaryType>().unwrap(), SummaryType::Short);
        assert_eq!("LONG".parse::<SummaryType>().unwrap(), SummaryType::Long);
        assert_eq!(" Medium ".parse::<SummaryType>().unwrap(), SummaryType::Medium);
        assert_eq!("detailed".parse::<SummaryType>().unwrap(), SummaryType::Medium);
    }

    #[test]
    fn test_serde_roundtrip_is_lowercase() {
        let json = serde_json::to_string(&SummaryType::Long).unwrap();
        assert_eq!(json, "\"long\"");
        let parsed: SummaryType = serde_json::from_str("\"Short\"").unwrap();
        assert_eq!(parsed, SummaryType::Short);
        let unknown: SummaryType = serde_json::from_str("\"verbose\"").unwrap();
        assert_eq!(unknown, SummaryType::Medium);
    }
}
