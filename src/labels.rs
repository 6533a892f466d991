//! Canonicalization of compact camel-case task and tool names.
//!
//! COIN task names arrive as compact camel-case tokens ("MakeRJ45Cable").
//! Prompts and answer strings need the human-readable form ("Make RJ45 Cable").
//! Splitting happens at letter-case boundaries; a small fixed repair table
//! patches the acronym-heavy names the boundary rules cannot split correctly.

use std::sync::OnceLock;

use regex::Regex;

/// Known bad splits and their repaired forms.
///
/// The boundary rules over-split acronym runs in a finite set of task names.
/// Any newly observed bad split is a data issue: add it here, do not change
/// the splitter.
const REPAIRS: &[(&str, &str)] = &[
    ("Assemble Desktop P C", "Assemble Desktop PC"),
    ("Replace Battery On T V Control", "Replace Battery On TV Control"),
    ("Make R J45 Cable", "Make RJ45 Cable"),
    ("Make R J45Cable", "Make RJ45 Cable"),
    ("Make RJ45Cable", "Make RJ45 Cable"),
    ("Attend N B A Skills Challenge", "Attend NBA Skills Challenge"),
    ("Perform C P R", "Perform CPR"),
    ("Replace C D Drive With S S D", "Replace CD Drive With SSD"),
    ("Replace S I M Card", "Replace SIM Card"),
];

fn lower_upper_boundary() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"([a-z])([A-Z])").expect("hardcoded pattern is valid"))
}

fn acronym_boundary() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"([A-Z])([A-Z][a-z])").expect("hardcoded pattern is valid"))
}

/// Turns a compact camel-case token into a space-separated phrase.
///
/// Inputs that already contain a space pass through the splitter unchanged,
/// so the function is idempotent. Two boundary rules apply: between a
/// lowercase letter and a following uppercase letter, and between an
/// uppercase letter and a following uppercase-then-lowercase pair (so
/// "RJ45Cable" becomes "RJ45 Cable", not "R J45 Cable"). The result is then
/// looked up in [`REPAIRS`].
pub fn canonicalize(input: &str) -> String {
    let split = if input.contains(' ') {
        input.to_string()
    } else {
        let pass1 = lower_upper_boundary().replace_all(input, "$1 $2");
        acronym_boundary().replace_all(&pass1, "$1 $2").into_owned()
    };

    for (from, to) in REPAIRS {
        if split == *from {
            return (*to).to_string();
        }
    }
    split
}
