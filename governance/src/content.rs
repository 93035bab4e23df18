//! Moderation-request template carried in a proposal's free-text description.
//!
//! The contract stores one description string. The client writes three
//! labeled sections into it and reads them back for display. Parsing is
//! best-effort: a missing marker yields an empty field, never an error.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

const CONTENT_URL_LABEL: &str = "Content URL:";
const DESCRIPTION_LABEL: &str = "Description:";
const REASON_LABEL: &str = "Reason for removal:";

/// The three display fields of a proposal, as entered by its creator.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalContent {
    pub content_url: String,
    pub description: String,
    pub reason: String,
}

impl ProposalContent {
    pub fn new(
        content_url: impl Into<String>,
        description: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            content_url: content_url.into(),
            description: description.into(),
            reason: reason.into(),
        }
    }

    /// Render into the single description string stored on the ledger.
    ///
    /// Sections are separated by blank lines, so a field that itself contains
    /// a blank line is read back by [`ProposalContent::parse`] only up to its
    /// first paragraph.
    pub fn compose(&self) -> String {
        format!(
            "{CONTENT_URL_LABEL} {}\n\n{DESCRIPTION_LABEL} {}\n\n{REASON_LABEL} {}",
            self.content_url.trim(),
            self.description.trim(),
            self.reason.trim(),
        )
    }

    /// Split a stored description back into its sections.
    ///
    /// Without a `Description:` marker the whole text is taken as the description.
    pub fn parse(raw: &str) -> Self {
        let patterns = section_patterns();
        let section = |re: &Regex| {
            re.captures(raw)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().trim().to_string())
        };
        Self {
            content_url: section(&patterns[0]).unwrap_or_default(),
            description: section(&patterns[1]).unwrap_or_else(|| raw.trim().to_string()),
            reason: section(&patterns[2]).unwrap_or_default(),
        }
    }
}

/// A section runs from its label to the next blank line or the end of text.
fn section_patterns() -> &'static [Regex; 3] {
    static PATTERNS: OnceLock<[Regex; 3]> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [CONTENT_URL_LABEL, DESCRIPTION_LABEL, REASON_LABEL].map(|label| {
            Regex::new(&format!(r"(?s){}[ \t]*(.*?)(?:\n\s*\n|$)", regex::escape(label)))
                .expect("section pattern is a valid regex")
        })
    })
}
