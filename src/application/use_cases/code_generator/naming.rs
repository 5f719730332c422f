pub(super) fn escape_java(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
}

/// Quoted Java string literal.
pub(super) fn java_string(input: &str) -> String {
    format!("\"{}\"", escape_java(input))
}

/// Replaces every non-alphanumeric ASCII character with `_`.
pub(super) fn sanitize_identifier(input: &str) -> String {
    input
        .chars()
        .map(|ch| if ch.is_ascii_alphanumeric() { ch } else { '_' })
        .collect()
}

/// `AutomationTest_2026_03_04_05_06_07_000` for stamp `2026-03-04T05-06-07-000Z`.
pub(super) fn class_name(file_stamp: &str) -> String {
    let body = file_stamp.replace(['-', 'T'], "_");
    format!(
        "AutomationTest_{}",
        body.strip_suffix('Z').unwrap_or(&body)
    )
}

/// Keeps a value from closing the surrounding block comment.
pub(super) fn comment_safe(input: &str) -> String {
    input.replace("*/", "* /").replace(['\r', '\n'], " ")
}
