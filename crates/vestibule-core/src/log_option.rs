//! Logging verbosity bitmask.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};
use std::str::FromStr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Set of flags controlling what the dispatcher logs for an endpoint.
///
/// # Example
///
/// ```
/// use vestibule_core::LogOption;
///
/// let opt: LogOption = "enter|exit|reqBody".parse().unwrap();
/// assert!(opt.contains(LogOption::REQ_BODY));
/// assert!(!opt.contains(LogOption::RESP_BODY));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct LogOption(u32);

const NAMES: [(&str, LogOption); 7] = [
    ("silent", LogOption::SILENT),
    ("enter", LogOption::ENTER),
    ("exit", LogOption::EXIT),
    ("reqBody", LogOption::REQ_BODY),
    ("reqInput", LogOption::REQ_INPUT),
    ("respBody", LogOption::RESP_BODY),
    ("respOutput", LogOption::RESP_OUTPUT),
];

impl LogOption {
    /// No flag set; the dispatcher substitutes its default.
    pub const UNKNOWN: Self = Self(0);
    /// Log nothing except failures.
    pub const SILENT: Self = Self(1);
    /// Log when the request enters the pipeline.
    pub const ENTER: Self = Self(1 << 1);
    /// Log when the request leaves the pipeline.
    pub const EXIT: Self = Self(1 << 2);
    /// Log the raw request body.
    pub const REQ_BODY: Self = Self(1 << 3);
    /// Log the decoded input.
    pub const REQ_INPUT: Self = Self(1 << 4);
    /// Log the response body.
    pub const RESP_BODY: Self = Self(1 << 5);
    /// Log the controller result.
    pub const RESP_OUTPUT: Self = Self(1 << 6);

    /// Everything except the controller result.
    pub const FULL: Self = Self(
        Self::ENTER.0 | Self::EXIT.0 | Self::REQ_BODY.0 | Self::REQ_INPUT.0 | Self::RESP_BODY.0,
    );
    /// `FULL` without the enter line.
    pub const FULL_ON_EXIT: Self =
        Self(Self::EXIT.0 | Self::REQ_BODY.0 | Self::REQ_INPUT.0 | Self::RESP_BODY.0);
    /// Only the exit line, no payloads.
    pub const CONFIDENTIAL: Self = Self::EXIT;

    /// Builds an option from raw bits.
    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Raw bits.
    #[must_use]
    pub const fn bits(&self) -> u32 {
        self.0
    }

    /// Returns true if every flag of `other` is set.
    #[must_use]
    pub const fn contains(&self, other: Self) -> bool {
        other.0 != 0 && self.0 & other.0 == other.0
    }

    /// Returns true if no flag is set.
    #[must_use]
    pub const fn is_unknown(&self) -> bool {
        self.0 == 0
    }

    /// Returns `default` when no flag is set.
    #[must_use]
    pub const fn or(self, default: Self) -> Self {
        if self.0 == 0 {
            default
        } else {
            self
        }
    }

    /// Clears every flag of `other`.
    #[must_use]
    pub const fn without(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }
}

impl BitOr for LogOption {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for LogOption {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Display for LogOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 == 0 {
            return f.write_str("unknown");
        }
        let mut first = true;
        for (name, flag) in NAMES {
            if self.contains(flag) {
                if !first {
                    f.write_str("|")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Error returned when parsing an unknown flag name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown log option {0:?}")]
pub struct ParseLogOptionError(String);

impl FromStr for LogOption {
    type Err = ParseLogOptionError;

    /// Parses flag or preset names separated by `|` or `,`. Names are
    /// case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut opt = Self::UNKNOWN;
        for part in s.split(['|', ',']).map(str::trim).filter(|p| !p.is_empty()) {
            let flag = match part.to_ascii_lowercase().as_str() {
                "unknown" => Self::UNKNOWN,
                "full" => Self::FULL,
                "fullonexit" | "full_on_exit" => Self::FULL_ON_EXIT,
                "confidential" => Self::CONFIDENTIAL,
                lower => NAMES
                    .iter()
                    .find(|(name, _)| name.eq_ignore_ascii_case(lower))
                    .map(|(_, flag)| *flag)
                    .ok_or_else(|| ParseLogOptionError(part.to_string()))?,
            };
            opt |= flag;
        }
        Ok(opt)
    }
}

impl Serialize for LogOption {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for LogOption {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Bits(u32),
            Names(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Bits(bits) => Ok(Self(bits)),
            Repr::Names(s) => s.parse().map_err(serde::de::Error::custom),
        }
    }
}

/// Shared, atomically updatable [`LogOption`].
///
/// Cloning shares the underlying value, so an operator can change the
/// verbosity of a live endpoint without locking the request path.
#[derive(Debug, Clone, Default)]
pub struct LogOptionHandle(Arc<AtomicU32>);

impl LogOptionHandle {
    /// Creates a handle holding `opt`.
    #[must_use]
    pub fn new(opt: LogOption) -> Self {
        Self(Arc::new(AtomicU32::new(opt.0)))
    }

    /// Current value.
    #[must_use]
    pub fn load(&self) -> LogOption {
        LogOption(self.0.load(Ordering::Relaxed))
    }

    /// Replaces the value.
    pub fn store(&self, opt: LogOption) {
        self.0.store(opt.0, Ordering::Relaxed);
    }
}
