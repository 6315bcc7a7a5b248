//! Core types: Ticker, Dollars, Pct

use std::fmt;
use std::str::FromStr;

use crate::error::PlanError;

/// Maximum ticker length in bytes.
pub const MAX_TICKER_LEN: usize = 8;

/// Instrument ticker, stored inline so it is `Copy` and cheap to hash.
///
/// Tickers are normalized to ASCII uppercase on construction, so `"qqq"` and
/// `"QQQ"` compare equal. Ordering is lexical.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticker {
    bytes: [u8; MAX_TICKER_LEN],
    len: u8,
}

impl Ticker {
    /// Create a ticker, panicking on invalid input.
    ///
    /// Use [`Ticker::try_new`] for untrusted input.
    pub fn new(s: &str) -> Self {
        match Self::try_new(s) {
            Some(t) => t,
            None => panic!("invalid ticker {s:?}"),
        }
    }

    /// Create a ticker: 1..=8 bytes of ASCII letters, digits, `.` or `-`.
    pub fn try_new(s: &str) -> Option<Self> {
        let raw = s.trim().as_bytes();
        if raw.is_empty() || raw.len() > MAX_TICKER_LEN {
            return None;
        }
        let mut bytes = [0u8; MAX_TICKER_LEN];
        for (slot, &b) in bytes.iter_mut().zip(raw) {
            if !(b.is_ascii_alphanumeric() || b == b'.' || b == b'-') {
                return None;
            }
            *slot = b.to_ascii_uppercase();
        }
        Some(Self {
            bytes,
            len: raw.len() as u8,
        })
    }

    /// The ticker as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        // Only ASCII bytes are ever stored.
        std::str::from_utf8(&self.bytes[..self.len as usize]).unwrap_or("?")
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl fmt::Debug for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ticker({})", self.as_str())
    }
}

impl FromStr for Ticker {
    type Err = PlanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ticker::try_new(s).ok_or_else(|| PlanError::InvalidTicker(s.to_string()))
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Ticker {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Ticker {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ticker::try_new(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid ticker {s:?}")))
    }
}

/// Dollar amount formatter with thousands separators.
///
/// Whole dollars by default; honors an explicit precision (`{:.2}`).
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct Dollars(pub f64);

impl fmt::Display for Dollars {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let precision = f.precision().unwrap_or(0);
        let raw = format!("{:.*}", precision, self.0.abs());
        let (int_part, frac_part) = match raw.split_once('.') {
            Some((i, d)) => (i, Some(d)),
            None => (raw.as_str(), None),
        };

        let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
        for (i, ch) in int_part.chars().enumerate() {
            if i > 0 && (int_part.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }

        // "-$0" reads badly; only sign non-zero renderings.
        let negative = self.0 < 0.0 && raw.bytes().any(|b| b.is_ascii_digit() && b != b'0');
        let sign = if negative { "-" } else { "" };
        match frac_part {
            Some(d) => write!(f, "{sign}${grouped}.{d}"),
            None => write!(f, "{sign}${grouped}"),
        }
    }
}

/// Weight formatter: `Pct(0.1234)` renders as `12.34%`.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct Pct(pub f64);

impl fmt::Display for Pct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let precision = f.precision().unwrap_or(2);
        write!(f, "{:.*}%", precision, self.0 * 100.0)
    }
}
