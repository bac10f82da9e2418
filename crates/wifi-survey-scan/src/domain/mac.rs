//! MAC address value object.

use std::fmt;
use std::str::FromStr;

use crate::error::ScanError;

/// A 6-byte IEEE 802 MAC address identifying one access point (its BSSID).
///
/// Displays as six lowercase hex pairs separated by colons.
#[derive(Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct MacAddress(pub [u8; 6]);

impl MacAddress {
    /// Parse a colon-separated hex string such as `"aa:bb:cc:dd:ee:ff"`.
    ///
    /// Upper- and lowercase hex digits are both accepted.
    pub fn parse(s: &str) -> Result<Self, ScanError> {
        let err = || ScanError::MacParseFailed {
            input: s.to_owned(),
        };

        let mut bytes = [0u8; 6];
        let mut parts = s.split(':');
        for byte in &mut bytes {
            let part = parts.next().ok_or_else(err)?;
            if part.len() != 2 {
                return Err(err());
            }
            *byte = u8::from_str_radix(part, 16).map_err(|_| err())?;
        }
        if parts.next().is_some() {
            return Err(err());
        }
        Ok(Self(bytes))
    }

    /// Return the raw 6-byte MAC address.
    pub fn as_bytes(&self) -> &[u8; 6] {
        &self.0
    }
}

impl FromStr for MacAddress {
    type Err = ScanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Debug for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MacAddress({self})")
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = *self.as_bytes();
        let mac = format!("{a:02x}:{b:02x}:{c:02x}:{d:02x}:{e:02x}:{g:02x}");
        // Route through `pad` so width specifiers like `{:<20}` apply.
        f.pad(&mac)
    }
}
