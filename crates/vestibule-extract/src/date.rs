//! Calendar date without time or zone.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use vestibule_mask::{FieldKind, MaskSchema};

/// Nullable date packed as BCD digits `0xYYYYMMDD`.
///
/// The packed form compares and sorts like the date itself. Zero is the null
/// date and serializes as JSON `null`.
///
/// # Example
///
/// ```
/// use vestibule_extract::Date;
///
/// let d: Date = "2021-09-01".parse().unwrap();
/// assert_eq!(d.packed(), 0x2021_0901);
/// assert_eq!(d.to_string(), "2021-09-01");
/// assert!(Date::NULL < d);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Date(u32);

/// Error returned for malformed dates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseDateError(String);

impl fmt::Display for ParseDateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ParseDateError {}

fn bcd(value: u32, digits: u32) -> u32 {
    let mut out = 0;
    let mut v = value;
    for i in 0..digits {
        out |= (v % 10) << (4 * i);
        v /= 10;
    }
    out
}

fn unbcd(value: u32, digits: u32) -> u32 {
    let mut out = 0;
    for i in (0..digits).rev() {
        out = out * 10 + ((value >> (4 * i)) & 0xF);
    }
    out
}

impl Date {
    /// The null date.
    pub const NULL: Self = Self(0);

    /// Builds a date, `None` if it does not exist on the calendar.
    #[must_use]
    pub fn new(year: u32, month: u32, day: u32) -> Option<Self> {
        if year > 9999 {
            return None;
        }
        let year_i32 = i32::try_from(year).ok()?;
        NaiveDate::from_ymd_opt(year_i32, month, day)?;
        Some(Self((bcd(year, 4) << 16) | (bcd(month, 2) << 8) | bcd(day, 2)))
    }

    /// Wraps a packed value without validation.
    #[must_use]
    pub const fn from_packed(packed: u32) -> Self {
        Self(packed)
    }

    /// Packed `0xYYYYMMDD` value.
    #[must_use]
    pub const fn packed(&self) -> u32 {
        self.0
    }

    /// Returns true for the null date.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        self.0 == 0
    }

    /// Year.
    #[must_use]
    pub fn year(&self) -> u32 {
        unbcd(self.0 >> 16, 4)
    }

    /// Month, 1 to 12.
    #[must_use]
    pub fn month(&self) -> u32 {
        unbcd((self.0 >> 8) & 0xFF, 2)
    }

    /// Day of month.
    #[must_use]
    pub fn day(&self) -> u32 {
        unbcd(self.0 & 0xFF, 2)
    }

    /// Converts to a chrono date, `None` for null or invalid values.
    #[must_use]
    pub fn to_naive(&self) -> Option<NaiveDate> {
        if self.is_null() {
            return None;
        }
        NaiveDate::from_ymd_opt(i32::try_from(self.year()).ok()?, self.month(), self.day())
    }

    /// Converts from a chrono date, `None` outside years 0 to 9999.
    #[must_use]
    pub fn from_naive(date: NaiveDate) -> Option<Self> {
        Self::new(u32::try_from(date.year()).ok()?, date.month(), date.day())
    }
}

impl FromStr for Date {
    type Err = ParseDateError;

    /// Parses `YYYY?MM?DD` where `?` is any single separator. A leading quote
    /// is ignored and an empty string is the null date.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.strip_prefix('"').unwrap_or(s);
        let s = s.strip_suffix('"').unwrap_or(s);
        if s.is_empty() {
            return Ok(Self::NULL);
        }
        let b = s.as_bytes();
        if b.len() != 10 {
            return Err(ParseDateError(format!(
                "date {s:?} must be 10 characters long (YYYY-MM-DD)"
            )));
        }
        let number = |range: std::ops::Range<usize>| -> Result<u32, ParseDateError> {
            s.get(range)
                .filter(|part| part.bytes().all(|c| c.is_ascii_digit()))
                .and_then(|part| part.parse().ok())
                .ok_or_else(|| ParseDateError(format!("date {s:?} has non-digit parts")))
        };
        let (year, month, day) = (number(0..4)?, number(5..7)?, number(8..10)?);
        Self::new(year, month, day)
            .ok_or_else(|| ParseDateError(format!("date {s:?} is out of range")))
    }
}

impl fmt::Display for Date {
    /// Writes `YYYY-MM-DD`, nothing for the null date.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            return Ok(());
        }
        write!(f, "{:04}-{:02}-{:02}", self.year(), self.month(), self.day())
    }
}

impl Serialize for Date {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.is_null() {
            serializer.serialize_none()
        } else {
            serializer.collect_str(self)
        }
    }
}

impl<'de> Deserialize<'de> for Date {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct DateVisitor;

        impl<'de> Visitor<'de> for DateVisitor {
            type Value = Date;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a YYYY-MM-DD date string or null")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Date, E> {
                v.parse().map_err(E::custom)
            }

            fn visit_none<E: de::Error>(self) -> Result<Date, E> {
                Ok(Date::NULL)
            }

            fn visit_unit<E: de::Error>(self) -> Result<Date, E> {
                Ok(Date::NULL)
            }

            fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<Date, D::Error> {
                d.deserialize_str(self)
            }
        }

        deserializer.deserialize_option(DateVisitor)
    }
}

impl MaskSchema for Date {
    fn mask_kind(_tag: &str) -> FieldKind {
        FieldKind::Scalar
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packing() {
        let d = Date::new(2021, 9, 1).unwrap();
        assert_eq!(d.packed(), 0x2021_0901);
        assert_eq!((d.year(), d.month(), d.day()), (2021, 9, 1));
        assert_eq!(Date::new(1999, 12, 31).unwrap().packed(), 0x1999_1231);
    }

    #[test]
    fn test_rejects_impossible_dates() {
        assert!(Date::new(2021, 2, 29).is_none());
        assert!(Date::new(2021, 13, 1).is_none());
        assert!("2021-02-30".parse::<Date>().is_err());
        assert!("2021-9-1".parse::<Date>().is_err());
        assert!("2021-0a-01".parse::<Date>().is_err());
    }

    #[test]
    fn test_parse_any_separator_and_quotes() {
        let expected = Date::new(2018, 1, 31).unwrap();
        assert_eq!("2018/01/31".parse::<Date>().unwrap(), expected);
        assert_eq!("\"2018-01-31\"".parse::<Date>().unwrap(), expected);
        assert_eq!("".parse::<Date>().unwrap(), Date::NULL);
    }

    #[test]
    fn test_ordering_follows_calendar() {
        let a: Date = "2020-12-31".parse().unwrap();
        let b: Date = "2021-01-01".parse().unwrap();
        assert!(a < b);
    }

    #[test]
    fn test_serde() {
        let d = Date::new(2021, 9, 1).unwrap();
        assert_eq!(serde_json::to_string(&d).unwrap(), "\"2021-09-01\"");
        assert_eq!(serde_json::to_string(&Date::NULL).unwrap(), "null");
        assert_eq!(serde_json::from_str::<Date>("\"2021-09-01\"").unwrap(), d);
        assert_eq!(serde_json::from_str::<Date>("null").unwrap(), Date::NULL);
        assert!(serde_json::from_str::<Date>("\"yesterday\"").is_err());
    }

    #[test]
    fn test_chrono_conversion() {
        let naive = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        let d = Date::from_naive(naive).unwrap();
        assert_eq!(d.to_naive(), Some(naive));
        assert_eq!(Date::NULL.to_naive(), None);
    }
}
