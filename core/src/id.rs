//! Record identifiers.
//!
//! Users and events are addressed by a 12-byte identifier that travels as a
//! 24-character hexadecimal string, both in URLs and in JSON bodies.
//!
//! # Layout
//!
//! ```text
//! ┌──────────────┬──────────────────┬──────────────┐
//! │ 4 bytes      │ 5 bytes          │ 3 bytes      │
//! │ unix seconds │ random           │ counter      │
//! └──────────────┴──────────────────┴──────────────┘
//! ```
//!
//! The leading timestamp makes freshly generated ids sort roughly by
//! creation time.

use chrono::Utc;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;
use std::sync::atomic::{AtomicU32, Ordering};
use thiserror::Error;

/// Number of raw bytes in a [`RecordId`].
pub const RECORD_ID_BYTES: usize = 12;

/// Length of the hexadecimal form of a [`RecordId`].
pub const RECORD_ID_HEX_LEN: usize = RECORD_ID_BYTES * 2;

static COUNTER: LazyLock<AtomicU32> = LazyLock::new(|| AtomicU32::new(rand::random::<u32>()));

/// Error returned when a string is not a valid [`RecordId`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid record id: {0:?}")]
pub struct ParseRecordIdError(pub String);

/// Unique identifier for a stored user or event.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordId([u8; RECORD_ID_BYTES]);

impl RecordId {
    /// Generates a new identifier.
    #[must_use]
    pub fn new() -> Self {
        let seconds = u32::try_from(Utc::now().timestamp()).unwrap_or(u32::MAX);
        let random: [u8; 5] = rand::random();
        let count = COUNTER.fetch_add(1, Ordering::Relaxed);

        let mut bytes = [0u8; RECORD_ID_BYTES];
        bytes[..4].copy_from_slice(&seconds.to_be_bytes());
        bytes[4..9].copy_from_slice(&random);
        bytes[9..].copy_from_slice(&count.to_be_bytes()[1..]);
        Self(bytes)
    }

    /// Returns `true` if `value` has the shape of an identifier:
    /// exactly 24 hexadecimal characters, either case.
    #[must_use]
    pub fn is_well_formed(value: &str) -> bool {
        value.len() == RECORD_ID_HEX_LEN && value.bytes().all(|b| b.is_ascii_hexdigit())
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RecordId({self})")
    }
}

impl FromStr for RecordId {
    type Err = ParseRecordIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !Self::is_well_formed(s) {
            return Err(ParseRecordIdError(s.to_string()));
        }

        let mut bytes = [0u8; RECORD_ID_BYTES];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&s[i * 2..i * 2 + 2], 16)
                .map_err(|_| ParseRecordIdError(s.to_string()))?;
        }
        Ok(Self(bytes))
    }
}

impl Serialize for RecordId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
