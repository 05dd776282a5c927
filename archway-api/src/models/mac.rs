use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// IEEE 802 hardware address, used both as BSSID and as client key.
#[cfg_attr(feature = "docs", derive(utoipa::ToSchema), schema(value_type = String))]
#[derive(Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct MacAddress(pub [u8; 6]);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid MAC address '{0}': expected AA:BB:CC:DD:EE:FF")]
pub struct MacParseError(pub String);

impl MacAddress {
    pub fn as_bytes(&self) -> &[u8; 6] {
        &self.0
    }

    /// The vendor prefix (first three octets).
    pub fn oui(&self) -> [u8; 3] {
        [self.0[0], self.0[1], self.0[2]]
    }

    /// Randomised client addresses set the locally administered bit.
    pub fn is_locally_administered(&self) -> bool {
        self.0[0] & 0x02 != 0
    }

    pub fn is_multicast(&self) -> bool {
        self.0[0] & 0x01 != 0
    }
}

impl FromStr for MacAddress {
    type Err = MacParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let separator = if trimmed.contains('-') { '-' } else { ':' };
        let parts: Vec<&str> = trimmed.split(separator).collect();

        if parts.len() != 6 {
            return Err(MacParseError(s.to_owned()));
        }

        let mut bytes = [0u8; 6];
        for (i, part) in parts.iter().enumerate() {
            if part.len() != 2 || !part.bytes().all(|b| b.is_ascii_hexdigit()) {
                return Err(MacParseError(s.to_owned()));
            }
            bytes[i] = u8::from_str_radix(part, 16).map_err(|_| MacParseError(s.to_owned()))?;
        }

        Ok(Self(bytes))
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02X}:{b:02X}:{c:02X}:{d:02X}:{e:02X}:{g:02X}")
    }
}

impl fmt::Debug for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MacAddress({self})")
    }
}

impl Serialize for MacAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MacAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let mac: MacAddress = "aa:bb:cc:00:11:ff".parse().unwrap();
        assert_eq!(mac.0, [0xaa, 0xbb, 0xcc, 0x00, 0x11, 0xff]);
        assert_eq!(mac.to_string(), "AA:BB:CC:00:11:FF");

        let dashed: MacAddress = "AA-BB-CC-00-11-FF".parse().unwrap();
        assert_eq!(mac, dashed);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!("AA:BB:CC:DD:EE".parse::<MacAddress>().is_err());
        assert!("AA:BB:CC:DD:EE:GG".parse::<MacAddress>().is_err());
        assert!("AAA:BB:CC:DD:EE:FF".parse::<MacAddress>().is_err());
        assert!("".parse::<MacAddress>().is_err());
        assert!("+1:22:33:44:55:66".parse::<MacAddress>().is_err());
    }

    #[test]
    fn test_locally_administered_bit() {
        let random: MacAddress = "DA:A1:19:00:00:01".parse().unwrap();
        let burned_in: MacAddress = "00:1B:63:00:00:01".parse().unwrap();

        assert!(random.is_locally_administered());
        assert!(!burned_in.is_locally_administered());
        assert_eq!(burned_in.oui(), [0x00, 0x1b, 0x63]);
    }

    #[test]
    fn test_serde_as_string() {
        let mac: MacAddress = "00:11:22:33:44:55".parse().unwrap();
        let json = serde_json::to_string(&mac).unwrap();
        assert_eq!(json, "\"00:11:22:33:44:55\"");

        let back: MacAddress = serde_json::from_str(&json).unwrap();
        assert_eq!(back, mac);
    }
}
