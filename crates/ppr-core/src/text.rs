//! Text cleanup for exported cells.

use ppr_frame::{Table, Value};

/// Decode the HTML entities the export tooling leaves in text cells
/// (`&quot;`, `&amp;`, numeric references, ...). Unknown entities pass
/// through unchanged.
pub fn unescape_entities(text: &str) -> String {
    let Some(first) = text.find('&') else {
        return text.to_string();
    };
    let mut out = String::with_capacity(text.len());
    out.push_str(&text[..first]);
    let mut rest = &text[first..];
    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        rest = &rest[start..];
        match rest.find(';') {
            Some(end) if end > 1 && end <= 10 => {
                let entity = &rest[1..end];
                match decode_entity(entity) {
                    Some(decoded) => {
                        out.push_str(&decoded);
                        rest = &rest[end + 1..];
                    }
                    None => {
                        out.push('&');
                        rest = &rest[1..];
                    }
                }
            }
            _ => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(entity: &str) -> Option<String> {
    let decoded = match entity {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{a0}',
        _ => {
            let code = entity.strip_prefix('#')?;
            let value = match code.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => code.parse::<u32>().ok()?,
            };
            char::from_u32(value)?
        }
    };
    Some(decoded.to_string())
}

/// Unescape every string cell of a table.
pub fn unescape_table_text(table: &Table) -> Table {
    let mut result = table.clone();
    for column in table.columns().to_vec() {
        result = result.map_column(&column, |value| match value.as_str() {
            Some(text) if text.contains('&') => Value::Str(unescape_entities(text)),
            _ => value.clone(),
        });
    }
    result
}
