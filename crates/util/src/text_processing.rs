//! # Text Processing Utilities
//!
//! Redaction of secret-looking values before text reaches the screen or the
//! clipboard, and width-aware truncation for table cells.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use unicode_width::UnicodeWidthChar;

const REPLACEMENT: &str = "[REDACTED]";

static REDACT_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(build_redact_patterns);

/// Redacts values that look like secrets in a string.
///
/// Key names are preserved so that a redacted log line still shows which
/// setting was involved.
///
/// # Example
/// ```rust
/// use flowpanel_util::redact_sensitive;
///
/// assert_eq!(redact_sensitive("API_KEY=abc123"), "API_KEY=[REDACTED]");
/// ```
pub fn redact_sensitive(input: &str) -> String {
    let mut redacted = input.to_string();
    for pattern in REDACT_PATTERNS.iter() {
        redacted = pattern
            .replace_all(&redacted, |captures: &regex::Captures| {
                let prefix = captures.get(1).map(|m| m.as_str()).unwrap_or("");
                let suffix = captures.get(3).map(|m| m.as_str()).unwrap_or("");
                format!("{prefix}{REPLACEMENT}{suffix}")
            })
            .to_string();
    }
    redacted
}

/// Applies [`redact_sensitive`] to every string inside a JSON value.
pub fn redact_json(value: &Value) -> Value {
    match value {
        Value::String(text) => Value::String(redact_sensitive(text)),
        Value::Array(items) => Value::Array(items.iter().map(redact_json).collect()),
        Value::Object(map) => Value::Object(map.iter().map(|(key, value)| (key.clone(), redact_json(value))).collect()),
        other => other.clone(),
    }
}

/// Truncates `text` to at most `max_width` terminal columns, appending `…`
/// when anything was cut.
pub fn truncate_with_ellipsis(text: &str, max_width: usize) -> String {
    let mut width = 0;
    let mut truncated = String::new();
    for character in text.chars() {
        let character_width = character.width().unwrap_or(0);
        if width + character_width > max_width {
            if max_width > 0 {
                while width + 1 > max_width
                    && let Some(removed) = truncated.pop()
                {
                    width -= removed.width().unwrap_or(0);
                }
                truncated.push('…');
            }
            return truncated;
        }
        width += character_width;
        truncated.push(character);
    }
    truncated
}

fn build_redact_patterns() -> Vec<Regex> {
    const SENSITIVE_KEYS: &str = r"[A-Za-z0-9_]*(?:KEY|TOKEN|SECRET|PASSWORD|PASSWD|CREDENTIALS?)";
    [
        r"(?i)(authorization:\s+)([^\s]+(?:\s+[^\s]+)*)".to_string(),
        r"(?i)((?:^|\b)Bearer\s+)([A-Za-z0-9\-._~+/]+=*)".to_string(),
        format!(r"(?i)(\b{SENSITIVE_KEYS}=)([^\s]+)"),
        format!(r#"(?i)("{SENSITIVE_KEYS}"\s*:\s*")([^"]*)(")"#),
        r"(?i)(\b(?:DATABASE_URL|REDIS_URL)=)([^\s]+)".to_string(),
        r"()(\b(?:sk|pk|rk)_(?:live|test)_[A-Za-z0-9]{16,})".to_string(),
    ]
    .iter()
    .filter_map(|pattern| Regex::new(pattern).ok())
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn redacts_shell_style_sensitive_env_vars() {
        assert_eq!(
            redact_sensitive("export AWS_SECRET_ACCESS_KEY=supersecret"),
            "export AWS_SECRET_ACCESS_KEY=[REDACTED]"
        );
    }

    #[test]
    fn redacts_json_style_sensitive_entries() {
        let input = r#"{"clientSecret": "top-secret"}"#;
        assert_eq!(redact_sensitive(input), r#"{"clientSecret": "[REDACTED]"}"#);
    }

    #[test]
    fn redacts_bearer_tokens() {
        assert_eq!(redact_sensitive("sent Bearer abc.def.ghi"), "sent Bearer [REDACTED]");
    }

    #[test]
    fn ignores_non_sensitive_values() {
        let input = "PORT=8080 step=fetch-weather";
        assert_eq!(redact_sensitive(input), input);
    }

    #[test]
    fn redacts_bare_api_keys() {
        assert_eq!(redact_sensitive("key sk_live_1234567890abcdef1234"), "key [REDACTED]");
    }

    #[test]
    fn redacts_nested_json_strings() {
        let value = json!({"env": ["API_TOKEN=abc"], "count": 2});
        assert_eq!(redact_json(&value), json!({"env": ["API_TOKEN=[REDACTED]"], "count": 2}));
    }

    #[test]
    fn truncates_to_width_with_ellipsis() {
        assert_eq!(truncate_with_ellipsis("workflow", 20), "workflow");
        assert_eq!(truncate_with_ellipsis("workflow", 5), "work…");
        assert_eq!(truncate_with_ellipsis("workflow", 0), "");
    }
}
