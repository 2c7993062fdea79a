//! Runtime values and their MySQL literal encoding.
//!
//! Statements are rendered as literal SQL text, so every value that reaches a
//! statement goes through [`Value::encode`] (or one of the escape helpers
//! below) first.

use crate::error::{OrmError, OrmResult};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Timelike, Utc};
use regex::Regex;
use std::fmt::Write as _;
use std::sync::OnceLock;

/// A typed value bound for a statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Int(i64),
    UInt(u64),
    Float(f64),
    Bool(bool),
    Str(String),
    Time(NaiveDateTime),
    /// SQL text spliced verbatim. Only UPDATE assignments accept it.
    Raw(String),
    List(ValueList),
}

/// A homogeneous list, used by `IN` / `NOT IN` and LIKE part lists.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueList {
    Int(Vec<i64>),
    UInt(Vec<u64>),
    Float(Vec<f64>),
    Str(Vec<String>),
    Time(Vec<NaiveDateTime>),
}

impl ValueList {
    pub fn len(&self) -> usize {
        match self {
            Self::Int(v) => v.len(),
            Self::UInt(v) => v.len(),
            Self::Float(v) => v.len(),
            Self::Str(v) => v.len(),
            Self::Time(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Value {
    /// Splice `sql` verbatim after the column in an UPDATE assignment,
    /// e.g. `Value::raw("= `hits` + 1")`.
    pub fn raw(sql: impl Into<String>) -> Self {
        Self::Raw(sql.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Short name of the value kind, used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Int(_) => "int",
            Self::UInt(_) => "unsigned",
            Self::Float(_) => "float",
            Self::Bool(_) => "bool",
            Self::Str(_) => "string",
            Self::Time(_) => "time",
            Self::Raw(_) => "raw",
            Self::List(_) => "list",
        }
    }

    /// Encode a scalar value as a literal for `column`.
    ///
    /// `sql_type` is the column's declared type; temporal values need it to
    /// pick a format and fail with [`OrmError::UnknownColumn`] without it.
    pub fn encode(&self, column: &str, sql_type: Option<&str>) -> OrmResult<String> {
        match self {
            Self::Null => Ok("NULL".to_string()),
            Self::Int(v) => Ok(v.to_string()),
            Self::UInt(v) => Ok(v.to_string()),
            Self::Float(v) if !v.is_finite() => {
                Err(OrmError::unsupported_value(column, "non-finite float"))
            }
            Self::Float(v) => Ok(format_float(*v)),
            Self::Bool(v) => Ok(format_bool(*v).to_string()),
            Self::Str(v) => Ok(quote(v)),
            Self::Time(t) => match sql_type {
                Some(ty) => Ok(format_time(t, ty)),
                None => Err(OrmError::UnknownColumn(column.to_string())),
            },
            Self::Raw(_) | Self::List(_) => Err(OrmError::unsupported_value(column, self.kind_name())),
        }
    }
}

pub fn format_bool(v: bool) -> &'static str {
    if v { "TRUE" } else { "FALSE" }
}

/// Fixed-point text with six fraction digits. Callers reject NaN and
/// infinities first.
pub fn format_float(v: f64) -> String {
    format!("{v:.6}")
}

/// Escape a string for use inside a single-quoted MySQL literal.
pub fn escape_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    for ch in s.chars() {
        push_escaped(&mut out, ch);
    }
    out
}

/// Like [`escape_string`], and additionally escapes the `%` wildcard.
pub fn escape_like(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    for ch in s.chars() {
        if ch == '%' {
            out.push_str("\\%");
        } else {
            push_escaped(&mut out, ch);
        }
    }
    out
}

fn push_escaped(out: &mut String, ch: char) {
    match ch {
        '\\' => out.push_str("\\\\"),
        '\'' => out.push_str("\\'"),
        '\n' => out.push_str("\\n"),
        '\r' => out.push_str("\\r"),
        '\t' => out.push_str("\\t"),
        '\u{8}' => out.push_str("\\b"),
        '\0' => out.push_str("\\0"),
        '\u{1a}' => out.push_str("\\Z"),
        c => out.push(c),
    }
}

/// Escape and single-quote a string.
pub fn quote(s: &str) -> String {
    format!("'{}'", escape_string(s))
}

fn fractional_type_re() -> &'static Regex {
    static FRACTIONAL_TYPE: OnceLock<Regex> = OnceLock::new();
    FRACTIONAL_TYPE.get_or_init(|| {
        Regex::new(r"^(datetime|timestamp|time)\s*\(?\s*(\d)\s*\)?$")
            .expect("invalid built-in fractional type regex")
    })
}

/// Format a temporal value for a column of type `sql_type`.
///
/// Unrecognized column types render as `NULL`.
pub fn format_time(t: &NaiveDateTime, sql_type: &str) -> String {
    let ty = sql_type.trim().to_ascii_lowercase();
    match ty.as_str() {
        "timestamp" | "datetime" => return format!("'{}'", t.format("%Y-%m-%d %H:%M:%S")),
        "date" => return format!("'{}'", t.format("%Y-%m-%d")),
        "time" => return format!("'{}'", t.format("%H:%M:%S")),
        "year" => return format!("'{}'", t.format("%Y")),
        _ => {}
    }

    if let Some(caps) = fractional_type_re().captures(&ty) {
        let digits: usize = caps[2].parse().unwrap_or(0);
        let mut out = String::from("'");
        let base = if &caps[1] == "time" {
            "%H:%M:%S"
        } else {
            "%Y-%m-%d %H:%M:%S"
        };
        let _ = write!(out, "{}", t.format(base));
        if digits > 0 {
            let nanos = format!("{:09}", t.nanosecond() % 1_000_000_000);
            out.push('.');
            out.push_str(&nanos[..digits.min(9)]);
        }
        out.push('\'');
        return out;
    }

    tracing::warn!(
        target: "myorm.value",
        sql_type,
        "temporal value for unrecognized column type, encoding as NULL"
    );
    "NULL".to_string()
}

macro_rules! impl_from_int {
    ($variant:ident, $list:ident, $wide:ty; $($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Value::$variant(v as $wide)
                }
            }

            impl From<Vec<$t>> for Value {
                fn from(v: Vec<$t>) -> Self {
                    Value::List(ValueList::$list(v.into_iter().map(|x| x as $wide).collect()))
                }
            }
        )*
    };
}

impl_from_int!(Int, Int, i64; i8, i16, i32, i64);
impl_from_int!(UInt, UInt, u64; u8, u16, u32, u64);

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(f64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<Vec<f64>> for Value {
    fn from(v: Vec<f64>) -> Self {
        Value::List(ValueList::Float(v))
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<Vec<String>> for Value {
    fn from(v: Vec<String>) -> Self {
        Value::List(ValueList::Str(v))
    }
}

impl From<Vec<&str>> for Value {
    fn from(v: Vec<&str>) -> Self {
        Value::List(ValueList::Str(v.into_iter().map(str::to_string).collect()))
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Value::Time(v)
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Value::Time(v.and_time(chrono::NaiveTime::MIN))
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Time(v.naive_utc())
    }
}

impl From<Vec<NaiveDateTime>> for Value {
    fn from(v: Vec<NaiveDateTime>) -> Self {
        Value::List(ValueList::Time(v))
    }
}

impl From<ValueList> for Value {
    fn from(v: ValueList) -> Self {
        Value::List(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2019, 9, 6)
            .unwrap()
            .and_hms_nano_opt(12, 34, 56, 123_456_789)
            .unwrap()
    }

    #[test]
    fn escapes_special_characters() {
        assert_eq!(escape_string("it's"), "it\\'s");
        assert_eq!(escape_string("a\\b"), "a\\\\b");
        assert_eq!(escape_string("l1\nl2\r\t"), "l1\\nl2\\r\\t");
        assert_eq!(escape_string("\u{8}\u{1a}\0"), "\\b\\Z\\0");
        assert_eq!(escape_string("100%"), "100%");
        assert_eq!(escape_like("100%"), "100\\%");
        assert_eq!(escape_like("o'k"), "o\\'k");
    }

    #[test]
    fn scalars() {
        assert_eq!(Value::from(-5i32).encode("c", None).unwrap(), "-5");
        assert_eq!(Value::from(7u8).encode("c", None).unwrap(), "7");
        assert_eq!(Value::from(true).encode("c", None).unwrap(), "TRUE");
        assert_eq!(Value::from(false).encode("c", None).unwrap(), "FALSE");
        assert_eq!(Value::from(1.5f64).encode("c", None).unwrap(), "1.500000");
        assert_eq!(Value::from("x'y").encode("c", None).unwrap(), "'x\\'y'");
        assert_eq!(Value::Null.encode("c", None).unwrap(), "NULL");
        assert_eq!(Value::from(None::<i32>), Value::Null);
    }

    #[test]
    fn non_finite_floats_are_rejected() {
        for v in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let err = Value::from(v).encode("price", None).unwrap_err();
            assert!(matches!(
                err,
                OrmError::UnsupportedValueType { ref column, kind: "non-finite float" } if column == "price"
            ));
        }
    }

    #[test]
    fn lists_and_raw_are_not_scalars() {
        let err = Value::from(vec![1, 2]).encode("c", None).unwrap_err();
        assert!(matches!(err, OrmError::UnsupportedValueType { kind: "list", .. }));
        let err = Value::raw("+ 1").encode("c", None).unwrap_err();
        assert!(matches!(err, OrmError::UnsupportedValueType { kind: "raw", .. }));
    }

    #[test]
    fn time_requires_a_column_type() {
        let err = Value::from(ts()).encode("created", None).unwrap_err();
        assert!(matches!(err, OrmError::UnknownColumn(ref c) if c == "created"));
    }

    #[test]
    fn time_formats_by_column_type() {
        let t = ts();
        assert_eq!(format_time(&t, "datetime"), "'2019-09-06 12:34:56'");
        assert_eq!(format_time(&t, "TIMESTAMP"), "'2019-09-06 12:34:56'");
        assert_eq!(format_time(&t, "date"), "'2019-09-06'");
        assert_eq!(format_time(&t, "time"), "'12:34:56'");
        assert_eq!(format_time(&t, "year"), "'2019'");
        assert_eq!(format_time(&t, "datetime3"), "'2019-09-06 12:34:56.123'");
        assert_eq!(format_time(&t, "datetime(6)"), "'2019-09-06 12:34:56.123456'");
        assert_eq!(format_time(&t, "time2"), "'12:34:56.12'");
        assert_eq!(format_time(&t, "datetime0"), "'2019-09-06 12:34:56'");
        assert_eq!(format_time(&t, "varchar(20)"), "NULL");
    }

    #[test]
    fn millisecond_literal_parses_back() {
        use crate::entity::ColumnType;

        let t = ts();
        let literal = format_time(&t, "datetime(3)");
        let parsed = NaiveDateTime::from_value("c", Value::from(literal.trim_matches('\''))).unwrap();
        assert_eq!(parsed.and_utc().timestamp_millis(), t.and_utc().timestamp_millis());

        let literal = format_time(&t, "date");
        let parsed = NaiveDateTime::from_value("c", Value::from(literal.trim_matches('\''))).unwrap();
        assert_eq!(parsed.date(), t.date());
        assert_eq!(parsed.time(), chrono::NaiveTime::MIN);
    }
}
