//! Command-template variable substitution.
//!
//! Templates carry `{{ NAME }}` placeholders. Session-level substitution
//! happens at session start, step-level substitution at step start; any
//! placeholder still unresolved afterwards is a client error that names
//! the variable.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;

fn variable_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    // A variable starts with a letter and continues with word characters.
    PATTERN.get_or_init(|| Regex::new(r"\{\{ ([A-Za-z]\w*) \}\}").unwrap())
}

/// Replace every `{{ NAME }}` placeholder that has a value in `vars`.
pub fn substitute(input: &str, vars: &HashMap<String, String>) -> String {
    let mut output = input.to_string();
    for (name, value) in vars {
        output = output.replace(&format!("{{{{ {name} }}}}"), value);
    }
    output
}

/// Placeholders left in `input`, in order of appearance.
pub fn unresolved_variables(input: &str) -> Vec<String> {
    variable_pattern()
        .captures_iter(input)
        .map(|cap| cap[1].to_string())
        .collect()
}

/// Check a session name: nonempty, letters, digits, dash and underscore.
///
/// The name ends up in scheduler job names and service names, so the
/// alphabet is deliberately narrow. Returns the reason when invalid.
pub fn validate_session_name(name: &str) -> Option<String> {
    if name.is_empty() {
        return Some("must not be empty".to_string());
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Some(
            "may only contain letters, digits, dashes and underscores".to_string(),
        );
    }
    None
}
