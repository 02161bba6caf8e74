//! Cell-level typing of raw CSV text.

use ppr_frame::Value;

/// Parse one CSV cell into a typed value.
///
/// Empty cells and the literal `nan` become null. Numeric text becomes an
/// integer or float only when the parse round-trips, so identifier-like
/// text with leading zeros (zip codes, EIN fragments) stays textual.
pub fn parse_cell(raw: &str) -> Value {
    let trimmed = raw.trim().trim_matches('\u{feff}');
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan") {
        return Value::Null;
    }
    if let Ok(int) = trimmed.parse::<i64>() {
        if int.to_string() == trimmed {
            return Value::Int(int);
        }
        return Value::Str(trimmed.to_string());
    }
    if let Ok(num) = trimmed.parse::<f64>() {
        let leading_zero = trimmed
            .trim_start_matches('-')
            .strip_prefix('0')
            .is_some_and(|rest| !rest.is_empty() && !rest.starts_with('.'));
        if num.is_finite() && !leading_zero {
            return Value::Num(num);
        }
    }
    Value::Str(trimmed.to_string())
}

/// Normalize a header cell: trim, strip the BOM, and collapse inner runs of
/// whitespace to single spaces.
pub fn normalize_header(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('\u{feff}');
    let mut parts = trimmed.split_whitespace();
    let mut normalized = String::new();
    if let Some(first) = parts.next() {
        normalized.push_str(first);
        for part in parts {
            normalized.push(' ');
            normalized.push_str(part);
        }
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_cells_type_as_numbers() {
        assert_eq!(parse_cell("42"), Value::Int(42));
        assert_eq!(parse_cell("4.5"), Value::Num(4.5));
        assert_eq!(parse_cell(""), Value::Null);
        assert_eq!(parse_cell("nan"), Value::Null);
    }

    #[test]
    fn leading_zero_identifiers_stay_text() {
        assert_eq!(parse_cell("01234"), Value::Str("01234".to_string()));
        assert_eq!(parse_cell("0.5"), Value::Num(0.5));
    }

    #[test]
    fn headers_collapse_whitespace() {
        assert_eq!(normalize_header("  Grantee   Name "), "Grantee Name");
    }
}
