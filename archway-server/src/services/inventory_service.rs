use std::path::{Path, PathBuf};

use archway_api::models::{MacAddress, WirelessInterface};
use async_trait::async_trait;

use crate::configs::InterfaceConfig;

/// Source of the wireless interfaces a scan may be started on.
#[async_trait]
pub trait InterfaceInventory: Send + Sync {
    async fn list(&self) -> anyhow::Result<Vec<WirelessInterface>>;

    async fn get(&self, name: &str) -> anyhow::Result<Option<WirelessInterface>> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .find(|interface| interface.name == name))
    }
}

/// Interfaces declared in configuration, used with the simulated backend.
pub struct StaticInventory {
    interfaces: Vec<WirelessInterface>,
}

impl StaticInventory {
    pub fn new(configured: &[InterfaceConfig]) -> Self {
        let interfaces = configured
            .iter()
            .map(|config| WirelessInterface {
                name: config.name.clone(),
                wireless: true,
                monitor_capable: config.monitor_capable,
                mac: None,
                current_mode: Some(String::from("managed")),
            })
            .collect();

        Self { interfaces }
    }
}

#[async_trait]
impl InterfaceInventory for StaticInventory {
    async fn list(&self) -> anyhow::Result<Vec<WirelessInterface>> {
        Ok(self.interfaces.clone())
    }
}

/// Reads `/sys/class/net` for interfaces with a wireless extension or phy.
pub struct SysfsInventory {
    root: PathBuf,
    overrides: Vec<InterfaceConfig>,
}

impl SysfsInventory {
    pub fn new(overrides: &[InterfaceConfig]) -> Self {
        Self::with_root("/sys/class/net", overrides)
    }

    pub fn with_root(root: impl Into<PathBuf>, overrides: &[InterfaceConfig]) -> Self {
        Self {
            root: root.into(),
            overrides: overrides.to_vec(),
        }
    }

    async fn describe(&self, dir: &Path, name: String) -> Option<WirelessInterface> {
        let has_phy = tokio::fs::try_exists(dir.join("phy80211")).await.unwrap_or(false);
        let has_wext = tokio::fs::try_exists(dir.join("wireless")).await.unwrap_or(false);
        if !has_phy && !has_wext {
            return None;
        }

        let mac = tokio::fs::read_to_string(dir.join("address"))
            .await
            .ok()
            .and_then(|address| address.trim().parse::<MacAddress>().ok());

        // ARPHRD_IEEE80211_RADIOTAP
        let current_mode = tokio::fs::read_to_string(dir.join("type"))
            .await
            .ok()
            .map(|kind| match kind.trim() {
                "803" => String::from("monitor"),
                _ => String::from("managed"),
            });

        let monitor_capable = self
            .overrides
            .iter()
            .find(|config| config.name == name)
            .map(|config| config.monitor_capable)
            .unwrap_or(has_phy);

        Some(WirelessInterface {
            name,
            wireless: true,
            monitor_capable,
            mac,
            current_mode,
        })
    }
}

#[async_trait]
impl InterfaceInventory for SysfsInventory {
    async fn list(&self) -> anyhow::Result<Vec<WirelessInterface>> {
        let mut entries = tokio::fs::read_dir(&self.root).await?;
        let mut interfaces = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name().to_string_lossy().into_owned();
            if let Some(interface) = self.describe(&entry.path(), name).await {
                interfaces.push(interface);
            }
        }

        interfaces.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(interfaces)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(name: &str, monitor_capable: bool) -> InterfaceConfig {
        InterfaceConfig {
            name: name.into(),
            monitor_capable,
        }
    }

    #[tokio::test]
    async fn test_static_inventory() {
        let inventory = StaticInventory::new(&[config("wlan0", true), config("wlan1", false)]);

        assert_eq!(inventory.list().await.unwrap().len(), 2);
        assert!(inventory.get("wlan0").await.unwrap().unwrap().monitor_capable);
        assert!(inventory.get("wlan9").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_sysfs_inventory_reads_wireless_devices() {
        let root = std::env::temp_dir().join(format!("archway-sysfs-{}", uuid::Uuid::new_v4()));

        let wlan = root.join("wlan0");
        std::fs::create_dir_all(wlan.join("phy80211")).unwrap();
        std::fs::write(wlan.join("address"), "00:11:22:33:44:55\n").unwrap();
        std::fs::write(wlan.join("type"), "1\n").unwrap();

        let wired = root.join("eth0");
        std::fs::create_dir_all(&wired).unwrap();
        std::fs::write(wired.join("address"), "00:11:22:33:44:66\n").unwrap();

        let inventory = SysfsInventory::with_root(&root, &[]);
        let interfaces = inventory.list().await.unwrap();

        assert_eq!(interfaces.len(), 1);
        assert_eq!(interfaces[0].name, "wlan0");
        assert!(interfaces[0].monitor_capable);
        assert_eq!(interfaces[0].current_mode.as_deref(), Some("managed"));
        assert_eq!(
            interfaces[0].mac,
            Some("00:11:22:33:44:55".parse().unwrap())
        );

        let overridden = SysfsInventory::with_root(&root, &[config("wlan0", false)]);
        assert!(!overridden.get("wlan0").await.unwrap().unwrap().monitor_capable);

        std::fs::remove_dir_all(&root).unwrap();
    }
}
