use std::cmp::Ordering;
use std::fmt;

use chrono::NaiveDate;

/// One cell of a [`crate::Table`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Num(f64),
    Date(NaiveDate),
    Str(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(value) => Some(value),
            _ => None,
        }
    }

    /// Numeric view; strings parse leniently, as the raw extracts mix
    /// numeric cells with their text renderings.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(value) => Some(*value as f64),
            Self::Num(value) => Some(*value),
            Self::Bool(value) => Some(if *value { 1.0 } else { 0.0 }),
            Self::Str(value) => parse_f64(value),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(*value),
            Self::Num(value) => Some(*value as i64),
            Self::Str(value) => parse_i64(value),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Self::Date(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    /// Text rendering for output sheets. Null renders empty; integral
    /// floats drop the trailing `.0`.
    pub fn text(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Bool(value) => value.to_string(),
            Self::Int(value) => value.to_string(),
            Self::Num(value) => format_numeric(*value),
            Self::Date(value) => value.format("%Y-%m-%d").to_string(),
            Self::Str(value) => value.clone(),
        }
    }

    /// Canonical key for grouping and join matching.
    ///
    /// Ints and integral floats share a key so year columns join across
    /// numeric representations; nulls match other nulls, mirroring how the
    /// source treated missing keys during merges.
    pub fn group_key(&self) -> String {
        match self {
            Self::Null => "\u{0}".to_string(),
            other => other.text(),
        }
    }

    /// Total order used by group extremes and sorting. Null sorts lowest;
    /// mixed types order by kind, with ints and floats unified.
    pub fn compare(&self, other: &Self) -> Ordering {
        match (self.as_comparable(), other.as_comparable()) {
            (Comparable::Null, Comparable::Null) => Ordering::Equal,
            (Comparable::Num(a), Comparable::Num(b)) => a.total_cmp(&b),
            (Comparable::Date(a), Comparable::Date(b)) => a.cmp(&b),
            (Comparable::Str(a), Comparable::Str(b)) => a.cmp(b),
            (a, b) => a.rank().cmp(&b.rank()),
        }
    }

    fn as_comparable(&self) -> Comparable<'_> {
        match self {
            Self::Null => Comparable::Null,
            Self::Bool(value) => Comparable::Num(if *value { 1.0 } else { 0.0 }),
            Self::Int(value) => Comparable::Num(*value as f64),
            Self::Num(value) => Comparable::Num(*value),
            Self::Date(value) => Comparable::Date(*value),
            Self::Str(value) => Comparable::Str(value),
        }
    }
}

enum Comparable<'a> {
    Null,
    Num(f64),
    Date(NaiveDate),
    Str(&'a str),
}

impl Comparable<'_> {
    fn rank(&self) -> u8 {
        match self {
            Self::Null => 0,
            Self::Num(_) => 1,
            Self::Date(_) => 2,
            Self::Str(_) => 3,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text())
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Num(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<NaiveDate> for Value {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

pub fn format_numeric(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 9.0e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

fn parse_f64(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok()
}

fn parse_i64(value: &str) -> Option<i64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<i64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_and_float_share_group_keys() {
        assert_eq!(Value::Int(2023).group_key(), Value::Num(2023.0).group_key());
        assert_ne!(Value::Null.group_key(), Value::Str(String::new()).group_key());
    }

    #[test]
    fn compare_orders_null_lowest() {
        assert_eq!(Value::Null.compare(&Value::Int(0)), Ordering::Less);
        assert_eq!(Value::Int(2).compare(&Value::Num(2.0)), Ordering::Equal);
        assert_eq!(Value::Int(3).compare(&Value::Int(2)), Ordering::Greater);
    }

    #[test]
    fn text_drops_trailing_zero() {
        assert_eq!(Value::Num(5.0).text(), "5");
        assert_eq!(Value::Num(5.5).text(), "5.5");
        assert_eq!(Value::Null.text(), "");
    }
}
