//! Outbound command filtering and inbound error detection.
//!
//! Both checks are plain substring scans over constant tables so the full
//! deny/error surface is auditable at a glance. Neither is a security
//! boundary: obfuscated input can slip past the deny-list, and GAP code can
//! be made to print signature-like text.

/// Substrings rejected before a command reaches GAP.
///
/// `QUIT`, `quit;`, and `ForceQuitGap(` terminate the process out of band
/// of the managed reset/close paths and desynchronize the sentinel
/// protocol; `Exec(`, `Process(`, and `Edit(` reach host-level shell,
/// process, and editor primitives from inside the session.
pub const BLOCKED_PATTERNS: &[&str] = &[
    "QUIT",
    "quit;",
    "ForceQuitGap(",
    "Exec(",
    "Process(",
    "Edit(",
];

/// Substrings recognized as GAP error reports.
///
/// `Error,` opens every GAP runtime error; `Syntax error` opens parser
/// diagnostics. Scanned over the combined stdout and stderr of one command.
pub const ERROR_SIGNATURES: &[&str] = &["Error,", "Syntax error"];

/// First deny-list pattern contained in `code`, in list order.
#[must_use]
pub fn contains_blocked(code: &str) -> Option<&'static str> {
    BLOCKED_PATTERNS
        .iter()
        .copied()
        .find(|pattern| code.contains(pattern))
}

/// Error region of `text`, if any signature matches.
///
/// Returns the text from the start of the line containing the earliest
/// match through the end of `text`, trimmed. GAP error bodies continue over
/// several lines, so everything after the match is kept.
#[must_use]
pub fn find_error(text: &str) -> Option<String> {
    let earliest = ERROR_SIGNATURES
        .iter()
        .filter_map(|signature| text.find(signature))
        .min()?;
    let line_start = text[..earliest].rfind('\n').map_or(0, |newline| newline + 1);
    Some(text[line_start..].trim().to_owned())
}
