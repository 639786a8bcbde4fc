//! Upstream permission masks using bitflags.
//!
//! The bit layout is defined by the upstream chat platform. Only
//! `VIEW_CHANNEL` is evaluated by this server; every other bit is carried
//! through unchanged so overwrite arithmetic stays bit-exact.

use std::fmt;

use bitflags::bitflags;
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};

bitflags! {
    /// Permission mask represented as a 64-bit bitfield.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Permissions: u64 {
        /// Permission to see a channel and read its history
        const VIEW_CHANNEL = 1 << 10;

        // Upstream defines many more bits; keep all of them.
        const _ = !0;
    }
}

impl Permissions {
    /// Build a mask from raw upstream bits without dropping anything.
    #[must_use]
    pub const fn from_raw(bits: u64) -> Self {
        Self::from_bits_retain(bits)
    }

    /// Check if this mask includes the specified permission(s).
    ///
    /// # Examples
    ///
    /// ```
    /// use archive_server::permissions::Permissions;
    ///
    /// let perms = Permissions::from_raw(0x400 | 0x800);
    /// assert!(perms.has(Permissions::VIEW_CHANNEL));
    /// assert!(!Permissions::empty().has(Permissions::VIEW_CHANNEL));
    /// ```
    #[must_use]
    pub const fn has(self, permission: Self) -> bool {
        self.contains(permission)
    }
}

impl Default for Permissions {
    fn default() -> Self {
        Self::empty()
    }
}

// Upstream sends masks as decimal strings; older payloads use plain numbers.
impl<'de> Deserialize<'de> for Permissions {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer
            .deserialize_any(LenientU64Visitor)
            .map(Self::from_raw)
    }
}

impl Serialize for Permissions {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.bits())
    }
}

/// Accepts an unsigned 64-bit integer encoded either as a JSON number or a
/// decimal string.
pub(crate) struct LenientU64Visitor;

impl Visitor<'_> for LenientU64Visitor {
    type Value = u64;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an unsigned integer or a decimal string")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<u64, E> {
        Ok(v)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<u64, E> {
        u64::try_from(v).map_err(|_| E::invalid_value(de::Unexpected::Signed(v), &self))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<u64, E> {
        v.parse()
            .map_err(|_| E::invalid_value(de::Unexpected::Str(v), &self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_channel_bit() {
        assert_eq!(Permissions::VIEW_CHANNEL.bits(), 0x400);
    }

    #[test]
    fn test_unknown_bits_are_retained() {
        let raw = 0x8000_0000_0000_0001_u64 | 0x400;
        let perms = Permissions::from_raw(raw);
        assert_eq!(perms.bits(), raw);
        assert_eq!((perms & !Permissions::VIEW_CHANNEL).bits(), 0x8000_0000_0000_0001);
    }

    #[test]
    fn test_deserialize_string_and_number() {
        let from_str: Permissions = serde_json::from_str("\"1024\"").unwrap();
        let from_num: Permissions = serde_json::from_str("1024").unwrap();
        assert_eq!(from_str, Permissions::VIEW_CHANNEL);
        assert_eq!(from_num, Permissions::VIEW_CHANNEL);
    }

    #[test]
    fn test_deserialize_rejects_garbage() {
        assert!(serde_json::from_str::<Permissions>("\"view\"").is_err());
        assert!(serde_json::from_str::<Permissions>("-1").is_err());
        assert!(serde_json::from_str::<Permissions>("true").is_err());
    }

    #[test]
    fn test_serialize_as_decimal_string() {
        let json = serde_json::to_string(&Permissions::VIEW_CHANNEL).unwrap();
        assert_eq!(json, "\"1024\"");
    }
}
