//! Deterministic JSON text for metadata files.
//!
//! Output is indented with `indent`; an array or object is written on one
//! line (`[ a, b ]`, `{ "k": v }`) when its indentation, members and four
//! padding characters fit within `limit` columns, and one member per line
//! otherwise. Widths are counted in UTF-16 units so files written by other
//! tools with the same rule come out byte-identical. Map order is insertion
//! order, so unchanged data always renders to the same bytes.

use serde_json::Value;

/// Render `value` as indented, width-wrapped JSON.
pub fn beautify(value: &Value, indent: &str, limit: usize) -> String {
    render(value, indent, limit, "")
}

fn render(value: &Value, indent: &str, limit: usize, mind: &str) -> String {
    match value {
        Value::Array(items) => {
            if items.is_empty() {
                return "[]".to_string();
            }
            let gap = format!("{}{}", mind, indent);
            let partial: Vec<String> = items
                .iter()
                .map(|item| render(item, indent, limit, &gap))
                .collect();
            wrap(('[', ']'), &partial, indent, &gap, mind, limit)
        }
        Value::Object(map) => {
            if map.is_empty() {
                return "{}".to_string();
            }
            let gap = format!("{}{}", mind, indent);
            let separator = if indent.is_empty() { ":" } else { ": " };
            let partial: Vec<String> = map
                .iter()
                .map(|(key, item)| {
                    format!(
                        "{}{}{}",
                        Value::from(key.as_str()),
                        separator,
                        render(item, indent, limit, &gap)
                    )
                })
                .collect();
            wrap(('{', '}'), &partial, indent, &gap, mind, limit)
        }
        scalar => scalar.to_string(),
    }
}

fn wrap(
    (open, close): (char, char),
    partial: &[String],
    indent: &str,
    gap: &str,
    mind: &str,
    limit: usize,
) -> String {
    if indent.is_empty() {
        return format!("{}{}{}", open, partial.join(","), close);
    }

    let inline = partial.join(", ");
    if utf16_len(gap) + utf16_len(&inline) + 4 > limit {
        let separator = format!(",\n{}", gap);
        format!(
            "{}\n{}{}\n{}{}",
            open,
            gap,
            partial.join(&separator),
            mind,
            close
        )
    } else {
        format!("{} {} {}", open, inline, close)
    }
}

fn utf16_len(s: &str) -> usize {
    s.encode_utf16().count()
}
