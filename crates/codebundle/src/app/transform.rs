//! Per-file content transformation.

use std::borrow::Cow;

/// Render a file's raw text the way it appears in the bundle.
///
/// With `remove_empty_lines` every empty or whitespace-only line is dropped and each kept line is
/// written back with a `\n` terminator. Otherwise the content is returned untouched.
pub fn transform_content(content: &str, remove_empty_lines: bool) -> Cow<'_, str> {
    if !remove_empty_lines {
        return Cow::Borrowed(content);
    }

    let mut out = String::with_capacity(content.len());
    for line in content.lines().filter(|line| !line.trim().is_empty()) {
        out.push_str(line);
        out.push('\n');
    }
    Cow::Owned(out)
}

/// Decode file bytes, replacing invalid UTF-8 sequences rather than failing.
pub fn decode(bytes: &[u8]) -> Cow<'_, str> {
    String::from_utf8_lossy(bytes)
}
