use crate::process::raw_table::RawValue;

/// Title and body joined by a single line break. Without a title column, or
/// with an empty title, the body stands alone. The body is always kept, even
/// when empty.
pub fn fuse(title: Option<&RawValue>, body: &RawValue) -> String {
    let body = body.to_text();
    match title.map(RawValue::to_text) {
        Some(title) if !title.is_empty() => format!("{}\n{}", title, body),
        _ => body,
    }
}
