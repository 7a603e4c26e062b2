//! Configuration for wizard defaults

use crate::model::{DiskBus, NetworkInterfaceModel};
use crate::resources::parse_quantity;
use crate::validation::common::validate_dns1123_label;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Current config version for migration support
pub const CONFIG_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WizardConfig {
    pub version: u32,
    #[serde(default)]
    pub defaults: DefaultsSection,
}

/// Values the wizard fills in when neither the user nor a template did
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsSection {
    /// NIC model used when a template interface does not name one
    pub interface_model: String,
    /// Bus given to template disks that declare none
    pub disk_bus: String,
    /// Name of the pod network and its interface
    pub pod_network_name: String,
    /// Binding of the default pod interface ("masquerade" or "bridge")
    pub pod_binding: String,
    /// Name of the disk created for URL and container provisioning
    pub root_disk_name: String,
    /// Size requested for a root disk imported from a URL
    pub root_disk_size: String,
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            defaults: DefaultsSection::default(),
        }
    }
}

impl Default for DefaultsSection {
    fn default() -> Self {
        Self {
            interface_model: NetworkInterfaceModel::Virtio.as_str().to_string(),
            disk_bus: DiskBus::Virtio.as_str().to_string(),
            pod_network_name: "default".to_string(),
            pod_binding: "masquerade".to_string(),
            root_disk_name: "rootdisk".to_string(),
            root_disk_size: "15Gi".to_string(),
        }
    }
}

impl WizardConfig {
    /// Get the default config file path
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("vm-wizard")
            .join("config.toml")
    }

    /// Load config from the default path, or fall back to defaults
    pub fn load_or_default() -> Result<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load config from a specific path
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        if config.version > CONFIG_VERSION {
            return Err(Error::config(format!(
                "Config version {} is newer than supported version {}",
                config.version, CONFIG_VERSION
            )));
        }
        config.validate()?;
        Ok(config)
    }

    /// Save config to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        let defaults = &self.defaults;
        if NetworkInterfaceModel::from_name(&defaults.interface_model).is_none() {
            return Err(Error::validation(format!(
                "Unknown interface model '{}'",
                defaults.interface_model
            )));
        }
        if DiskBus::from_name(&defaults.disk_bus).is_none() {
            return Err(Error::validation(format!(
                "Unknown disk bus '{}'",
                defaults.disk_bus
            )));
        }
        if !matches!(defaults.pod_binding.as_str(), "masquerade" | "bridge") {
            return Err(Error::validation(
                "Pod binding must be 'masquerade' or 'bridge'",
            ));
        }
        validate_dns1123_label(&defaults.pod_network_name)
            .map_err(|e| Error::validation(format!("Pod network name: {}", e)))?;
        validate_dns1123_label(&defaults.root_disk_name)
            .map_err(|e| Error::validation(format!("Root disk name: {}", e)))?;
        if !parse_quantity(&defaults.root_disk_size).is_some_and(|bytes| bytes > 0) {
            return Err(Error::validation(format!(
                "Root disk size '{}' is not a positive quantity",
                defaults.root_disk_size
            )));
        }
        Ok(())
    }
}
