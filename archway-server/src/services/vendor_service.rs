use std::collections::HashMap;

use archway_api::models::MacAddress;

use crate::configs::VendorEntry;

pub const UNKNOWN_VENDOR: &str = "Unknown";
pub const RANDOMIZED_VENDOR: &str = "Private (randomized)";

const BUILTIN_OUIS: &[([u8; 3], &str)] = &[
    ([0x00, 0x11, 0x22], "Cisco Systems"),
    ([0x00, 0x0A, 0x41], "Cisco Systems"),
    ([0x00, 0x0B, 0x46], "Cisco Systems"),
    ([0x00, 0x0C, 0x85], "Cisco Systems"),
    ([0x00, 0x1B, 0x63], "Apple Inc."),
    ([0x00, 0x23, 0xDF], "Apple Inc."),
    ([0x00, 0x25, 0x00], "Apple Inc."),
    ([0x00, 0x26, 0xBB], "Apple Inc."),
    ([0x28, 0xCF, 0xE9], "Apple Inc."),
    ([0x00, 0x50, 0x56], "VMware Inc."),
    ([0x00, 0x0C, 0x29], "VMware Inc."),
    ([0x08, 0x00, 0x27], "Oracle VirtualBox"),
    ([0x00, 0x1C, 0x42], "Parallels Inc."),
    ([0x00, 0x09, 0x5B], "Netgear"),
    ([0x00, 0x0F, 0xB5], "Netgear"),
    ([0x00, 0x14, 0x6C], "Netgear"),
    ([0x00, 0x06, 0x25], "Linksys"),
    ([0x00, 0x0C, 0x41], "Linksys"),
    ([0x00, 0x12, 0x17], "Linksys"),
    ([0x00, 0x27, 0x19], "TP-Link"),
    ([0x14, 0xCC, 0x20], "TP-Link"),
    ([0x50, 0xC7, 0xBF], "TP-Link"),
    ([0x00, 0x1F, 0xC6], "ASUS"),
    ([0x00, 0x22, 0x15], "ASUS"),
    ([0x00, 0x26, 0x18], "ASUS"),
    ([0x00, 0x05, 0x5D], "D-Link"),
    ([0x00, 0x0F, 0x3D], "D-Link"),
    ([0x00, 0x15, 0xE9], "D-Link"),
    ([0x00, 0x15, 0x6D], "Ubiquiti"),
    ([0x04, 0x18, 0xD6], "Ubiquiti"),
    ([0x24, 0xA4, 0x3C], "Ubiquiti"),
    ([0x00, 0x0B, 0x86], "Aruba"),
    ([0x00, 0x1A, 0x1E], "Aruba"),
    ([0x00, 0x24, 0x6C], "Aruba"),
    ([0x00, 0x24, 0xA8], "Ruckus"),
    ([0x2C, 0x5A, 0x0F], "Ruckus"),
    ([0x58, 0x93, 0x96], "Ruckus"),
    ([0x00, 0x12, 0xFB], "Samsung"),
    ([0x00, 0x1A, 0x11], "Google"),
    ([0x00, 0x14, 0x22], "Dell"),
    ([0x00, 0x1F, 0x29], "HP"),
];

/// OUI prefix to manufacturer name.
pub struct VendorService {
    table: HashMap<[u8; 3], String>,
}

impl VendorService {
    pub fn new(extra: &[VendorEntry]) -> Self {
        let mut table: HashMap<[u8; 3], String> = BUILTIN_OUIS
            .iter()
            .map(|(oui, name)| (*oui, name.to_string()))
            .collect();

        for entry in extra {
            match parse_prefix(&entry.prefix) {
                Some(oui) => {
                    table.insert(oui, entry.name.clone());
                }
                None => tracing::warn!("Ignoring malformed vendor prefix '{}'", entry.prefix),
            }
        }

        Self { table }
    }

    pub fn lookup(&self, mac: &MacAddress) -> String {
        if let Some(name) = self.table.get(&mac.oui()) {
            return name.clone();
        }

        if mac.is_locally_administered() {
            RANDOMIZED_VENDOR.to_string()
        } else {
            UNKNOWN_VENDOR.to_string()
        }
    }
}

impl Default for VendorService {
    fn default() -> Self {
        Self::new(&[])
    }
}

fn parse_prefix(prefix: &str) -> Option<[u8; 3]> {
    let parts: Vec<&str> = prefix.trim().split([':', '-']).collect();
    if parts.len() != 3 {
        return None;
    }

    let mut oui = [0u8; 3];
    for (i, part) in parts.iter().enumerate() {
        if part.len() != 2 {
            return None;
        }
        oui[i] = u8::from_str_radix(part, 16).ok()?;
    }

    Some(oui)
}
