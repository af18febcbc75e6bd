//! # Identifier Module
//!
//! Time-ordered identifiers (UUID version 7 layout) cho mọi entity.
//!
//! ```text
//!  0                   48   52         64 66                        128
//!  ├── unix_ts_ms (48) ──┼ver┼ rand_a ──┼var┼──────── rand_b ────────┤
//! ```
//!
//! Identifiers minted at a later millisecond sort after earlier ones, both as
//! `Uuid` values and as their canonical dashed-hex text. Within one millisecond
//! the random bits decide the order.

use crate::error::CoreError;
use chrono::Utc;
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::{Builder, Uuid};

/// Number of random bytes consumed per identifier.
pub const RANDOM_BYTES: usize = 10;

/// Build an identifier from a millisecond timestamp and random material.
///
/// Only the low 48 bits of `unix_ms` are used. Version and variant bits
/// overwrite 6 of the 80 random bits, leaving 74.
pub fn id_from_parts(unix_ms: u64, random: [u8; RANDOM_BYTES]) -> Uuid {
    Builder::from_unix_timestamp_millis(unix_ms & 0xFFFF_FFFF_FFFF, &random).into_uuid()
}

/// Mint a fresh identifier from the wall clock and the OS random source.
pub fn generate() -> Uuid {
    let unix_ms = Utc::now().timestamp_millis().max(0) as u64;
    let mut random = [0u8; RANDOM_BYTES];
    OsRng.fill_bytes(&mut random);
    id_from_parts(unix_ms, random)
}

/// Millisecond timestamp encoded in the high 48 bits.
pub fn timestamp_millis(id: &Uuid) -> u64 {
    let bytes = id.as_bytes();
    bytes[..6]
        .iter()
        .fold(0u64, |acc, b| (acc << 8) | u64::from(*b))
}

macro_rules! entity_id {
    ($(#[$meta:meta])* $t:ident, $name:literal) => {
        $(#[$meta])*
        #[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $t(Uuid);

        impl $t {
            /// Mint a new time-ordered identifier.
            pub fn generate() -> Self {
                Self(generate())
            }

            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl fmt::Display for $t {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0.hyphenated(), f)
            }
        }

        impl From<Uuid> for $t {
            fn from(value: Uuid) -> Self {
                Self(value)
            }
        }

        impl FromStr for $t {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s)
                    .map(Self)
                    .map_err(|e| CoreError::InvalidId(format!("{}: {} ({})", $name, s, e)))
            }
        }
    };
}

entity_id!(
    /// Identifier of a registered user.
    UserId,
    "UserId"
);
entity_id!(
    /// Identifier of a ledger.
    LedgerId,
    "LedgerId"
);
entity_id!(
    /// Identifier of a recorded transaction.
    TransactionId,
    "TransactionId"
);
