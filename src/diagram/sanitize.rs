//! Escaping of user text before it is templated into a flowchart label.

/// Entity written in place of a double quote.
///
/// Carries no terminating `;` because semicolons end flowchart statements.
pub const QUOTE_ENTITY: &str = "&quot";

/// Make user text safe to place inside a quoted node label.
///
/// Double quotes become [`QUOTE_ENTITY`] so they cannot close the label early,
/// and semicolons are dropped so they cannot end the statement early. Every
/// other character passes through untouched.
pub fn sanitize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '"' => out.push_str(QUOTE_ENTITY),
            ';' => {}
            _ => out.push(c),
        }
    }
    out
}
