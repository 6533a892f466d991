//! Multi-choice option formatting.
//!
//! Turns the raw option list of an annotation record into the three pieces
//! every downstream consumer agrees on: a display block "(i) text", the
//! 1-based choice tokens "1".."N", and the token-to-text map. The raw
//! annotation answer index is 0-based; adopters must add exactly 1 when
//! deriving the expected choice token.

use std::collections::BTreeMap;

use crate::labels::canonicalize;

/// An indexed option set derived from one annotation record.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionSet {
    /// "(1) text" lines joined by newlines, no trailing newline.
    pub display: String,
    /// Choice tokens "1".."N", in option order.
    pub choices: Vec<String>,
    /// Choice token to canonicalized option text.
    pub index2ans: BTreeMap<String, String>,
}

impl OptionSet {
    /// Builds an option set, canonicalizing each option for display.
    pub fn new(options: &[String]) -> Self {
        let mut display = String::new();
        let mut choices = Vec::with_capacity(options.len());
        let mut index2ans = BTreeMap::new();

        for (i, raw) in options.iter().enumerate() {
            let text = canonicalize(raw);
            let token = (i + 1).to_string();
            display.push_str(&format!("({}) {}\n", token, text));
            index2ans.insert(token.clone(), text);
            choices.push(token);
        }
        let display = display.trim_end_matches('\n').to_string();

        Self {
            display,
            choices,
            index2ans,
        }
    }

    /// Canonicalized text for the given choice token, if the token exists.
    pub fn answer_text(&self, token: &str) -> Option<&str> {
        self.index2ans.get(token).map(String::as_str)
    }
}
