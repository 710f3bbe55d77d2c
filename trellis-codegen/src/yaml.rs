//! Scalar formatting for the emitted YAML

/// Words YAML 1.1 parsers read as booleans or null
const RESERVED: &[&str] = &["true", "false", "yes", "no", "on", "off", "null", "y", "n"];

/// Render a key or identifier, quoting only when a plain scalar would be
/// misread
pub fn scalar(value: &str) -> String {
    if is_plain_safe(value) {
        value.to_string()
    } else {
        quoted(value)
    }
}

/// Render a double-quoted scalar
pub fn quoted(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Render a flow sequence of scalars, e.g. `[build, test]`
pub fn flow_list<'a>(items: impl IntoIterator<Item = &'a str>) -> String {
    let rendered: Vec<String> = items.into_iter().map(scalar).collect();
    format!("[{}]", rendered.join(", "))
}

pub fn boolean(value: bool) -> &'static str {
    if value { "true" } else { "false" }
}

fn is_plain_safe(value: &str) -> bool {
    let mut chars = value.chars();
    let Some(first) = chars.next() else {
        return false;
    };

    if !(first.is_ascii_alphanumeric() || first == '_') {
        return false;
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '/')) {
        return false;
    }
    if RESERVED.contains(&value.to_ascii_lowercase().as_str()) {
        return false;
    }

    // Numbers would come back as ints or floats
    value.parse::<f64>().is_err()
}
