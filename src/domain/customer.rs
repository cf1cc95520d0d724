//! Positional parser for pasted customer blocks.
//!
//! One field per line, in a fixed order, no delimiters and no escaping:
//! name, email, phone, address1, address2, city, state, postal code, country, company.

use super::CustomerDraft;

pub const MAX_PASTE_LINES: usize = 10;

/// A paste needs at least name, email and phone before it is previewed.
pub const MIN_PREVIEW_LINES: usize = 3;

/// Split a pasted block into lines, dropping blank ones and keeping the first ten.
pub fn prepare_paste_lines(text: &str) -> Vec<String> {
    text.split('\n')
        .filter(|line| !line.trim().is_empty())
        .take(MAX_PASTE_LINES)
        .map(str::to_string)
        .collect()
}

pub fn parse_customer_lines<S: AsRef<str>>(lines: &[S]) -> CustomerDraft {
    let field = |index: usize| -> String {
        lines
            .get(index)
            .map(|line| line.as_ref().trim().to_string())
            .unwrap_or_default()
    };

    CustomerDraft {
        name: field(0),
        email: field(1),
        phone: field(2),
        address1: field(3),
        address2: field(4),
        city: field(5),
        state: field(6),
        postal_code: field(7),
        country: field(8),
        company: field(9),
    }
}

/// Result of inspecting a paste.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PastePreview {
    pub lines: Vec<String>,
    /// `None` while fewer than [`MIN_PREVIEW_LINES`] lines are present.
    pub draft: Option<CustomerDraft>,
}

impl PastePreview {
    pub fn from_text(text: &str) -> Self {
        let lines = prepare_paste_lines(text);
        let draft = (lines.len() >= MIN_PREVIEW_LINES).then(|| parse_customer_lines(&lines));
        Self { lines, draft }
    }

    /// Save and find are only offered for a previewed paste carrying a name and an email.
    pub fn is_valid(&self) -> bool {
        self.draft.as_ref().map_or(false, CustomerDraft::has_required_fields)
    }
}
