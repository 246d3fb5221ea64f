//! Scalar assignment from raw strings.
//!
//! Path segments support signed and unsigned integers, floats, strings and
//! booleans; `Vec<String>` is accepted and left untouched. Query values
//! support the same scalars plus [`Date`], and `Option<T>` fields are only
//! allocated when their key is present.

use std::fmt;

use crate::date::{Date, ParseDateError};

/// Why a raw value could not be assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// The parser rejected the value; carries the parser's message.
    Parse(String),
    /// The field type cannot be decoded from this source.
    Unsupported {
        /// Name of the field kind, e.g. `slice` or `ptr`.
        kind: &'static str,
    },
}

impl fmt::Display for ValueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(msg) => f.write_str(msg),
            Self::Unsupported { kind } => write!(f, "unsupported type {kind}"),
        }
    }
}

impl std::error::Error for ValueError {}

/// A field that can be assigned from a matched path segment.
pub trait PathValue {
    /// Replaces the value with one parsed from `raw`.
    fn assign_path(&mut self, raw: &str) -> Result<(), ValueError>;
}

/// A field that can be assigned from a query string value.
pub trait QueryValue {
    /// Replaces the value with one parsed from `raw`.
    fn assign_query(&mut self, raw: &str) -> Result<(), ValueError>;
}

/// Parses booleans the way the dispatch layer's clients send them.
///
/// ```
/// assert_eq!(vestibule_extract::parse_bool("T"), Ok(true));
/// assert_eq!(vestibule_extract::parse_bool("0"), Ok(false));
/// assert!(vestibule_extract::parse_bool("yes").is_err());
/// ```
pub fn parse_bool(raw: &str) -> Result<bool, ValueError> {
    match raw {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Ok(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Ok(false),
        _ => Err(ValueError::Parse(format!("invalid bool value {raw:?}"))),
    }
}

fn parse<T>(raw: &str) -> Result<T, ValueError>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    raw.parse()
        .map_err(|e: T::Err| ValueError::Parse(format!("parsing {raw:?}: {e}")))
}

macro_rules! scalar_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl PathValue for $ty {
                fn assign_path(&mut self, raw: &str) -> Result<(), ValueError> {
                    *self = parse(raw)?;
                    Ok(())
                }
            }

            impl QueryValue for $ty {
                fn assign_query(&mut self, raw: &str) -> Result<(), ValueError> {
                    *self = parse(raw)?;
                    Ok(())
                }
            }
        )*
    };
}

scalar_value!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64);

impl PathValue for String {
    fn assign_path(&mut self, raw: &str) -> Result<(), ValueError> {
        raw.clone_into(self);
        Ok(())
    }
}

impl QueryValue for String {
    fn assign_query(&mut self, raw: &str) -> Result<(), ValueError> {
        raw.clone_into(self);
        Ok(())
    }
}

impl PathValue for bool {
    fn assign_path(&mut self, raw: &str) -> Result<(), ValueError> {
        *self = parse_bool(raw)?;
        Ok(())
    }
}

impl QueryValue for bool {
    fn assign_query(&mut self, raw: &str) -> Result<(), ValueError> {
        *self = parse_bool(raw)?;
        Ok(())
    }
}

// Reserved for multi-segment parameters.
impl PathValue for Vec<String> {
    fn assign_path(&mut self, _raw: &str) -> Result<(), ValueError> {
        Ok(())
    }
}

impl QueryValue for Vec<String> {
    fn assign_query(&mut self, _raw: &str) -> Result<(), ValueError> {
        Err(ValueError::Unsupported { kind: "slice" })
    }
}

impl PathValue for Date {
    fn assign_path(&mut self, _raw: &str) -> Result<(), ValueError> {
        Err(ValueError::Unsupported { kind: "date" })
    }
}

impl QueryValue for Date {
    fn assign_query(&mut self, raw: &str) -> Result<(), ValueError> {
        *self = raw
            .parse()
            .map_err(|e: ParseDateError| ValueError::Parse(e.to_string()))?;
        Ok(())
    }
}

impl<T> PathValue for Option<T> {
    fn assign_path(&mut self, _raw: &str) -> Result<(), ValueError> {
        Err(ValueError::Unsupported { kind: "ptr" })
    }
}

impl<T: QueryValue + Default> QueryValue for Option<T> {
    fn assign_query(&mut self, raw: &str) -> Result<(), ValueError> {
        self.get_or_insert_with(T::default).assign_query(raw)
    }
}

impl<T: QueryValue + Default> QueryValue for Box<T> {
    fn assign_query(&mut self, raw: &str) -> Result<(), ValueError> {
        self.as_mut().assign_query(raw)
    }
}
