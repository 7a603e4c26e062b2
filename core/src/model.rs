//! Domain model types for the VM creation wizard

use serde::{Deserialize, Serialize};

/// Name of the flavor that lets the user pick CPU and memory freely
pub const CUSTOM_FLAVOR: &str = "Custom";

/// Tab-level error shown when a PXE boot has no bootable interface
pub const MISSING_BOOT_SOURCE_ERROR: &str = "Please select the boot source.";

/// A stage of the wizard. Declaration order is navigation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WizardTab {
    ImportProviders,
    VmSettings,
    Networking,
    Storage,
    AdvancedCloudInit,
    AdvancedVirtualHardware,
    Review,
    Result,
}

impl WizardTab {
    pub const ALL: [WizardTab; 8] = [
        WizardTab::ImportProviders,
        WizardTab::VmSettings,
        WizardTab::Networking,
        WizardTab::Storage,
        WizardTab::AdvancedCloudInit,
        WizardTab::AdvancedVirtualHardware,
        WizardTab::Review,
        WizardTab::Result,
    ];

    fn position(&self) -> usize {
        Self::ALL
            .iter()
            .position(|tab| tab == self)
            .unwrap_or_default()
    }

    /// The tab after this one, ignoring visibility
    pub fn next(&self) -> Option<WizardTab> {
        Self::ALL.get(self.position() + 1).copied()
    }

    /// The tab before this one, ignoring visibility
    pub fn prev(&self) -> Option<WizardTab> {
        self.position().checked_sub(1).map(|i| Self::ALL[i])
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            WizardTab::ImportProviders => "Import",
            WizardTab::VmSettings => "General",
            WizardTab::Networking => "Networking",
            WizardTab::Storage => "Storage",
            WizardTab::AdvancedCloudInit => "Cloud-init",
            WizardTab::AdvancedVirtualHardware => "Virtual Hardware",
            WizardTab::Review => "Review",
            WizardTab::Result => "Result",
        }
    }
}

/// Per-tab metadata consumed by whatever renders the wizard
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabMetadata {
    pub is_valid: bool,
    pub is_locked: bool,
    pub is_hidden: bool,
    pub is_pending: bool,
    pub has_all_required_filled: bool,
    pub error: Option<String>,
}

impl TabMetadata {
    /// Metadata for a tab that has nothing to fill in
    pub fn complete() -> Self {
        Self {
            is_valid: true,
            has_all_required_filled: true,
            ..Self::default()
        }
    }

    pub fn hidden(mut self, is_hidden: bool) -> Self {
        self.is_hidden = is_hidden;
        self
    }

    /// Replace the validity triple. A tab can never be valid while a
    /// required field is missing.
    pub fn with_validity(
        mut self,
        is_valid: bool,
        has_all_required_filled: bool,
        error: Option<String>,
    ) -> Self {
        self.is_valid = is_valid && has_all_required_filled;
        self.has_all_required_filled = has_all_required_filled;
        self.error = error;
        self
    }

    /// Compare against a freshly computed validity triple
    pub fn validity_differs(
        &self,
        is_valid: bool,
        has_all_required_filled: bool,
        error: Option<&str>,
    ) -> bool {
        self.is_valid != is_valid
            || self.has_all_required_filled != has_all_required_filled
            || self.error.as_deref() != error
    }
}

/// Where the VM's boot media comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProvisionSource {
    Pxe,
    Url,
    Container,
    /// Boot from an existing disk (PVC or cloned data volume)
    Disk,
    Import,
}

impl ProvisionSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProvisionSource::Pxe => "PXE",
            ProvisionSource::Url => "URL",
            ProvisionSource::Container => "Container",
            ProvisionSource::Disk => "Disk",
            ProvisionSource::Import => "Import",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ProvisionSource::Pxe => "PXE (network boot - adds network interface)",
            ProvisionSource::Url => "URL (creates PVC)",
            ProvisionSource::Container => "Container (ephemeral)",
            ProvisionSource::Disk => "Existing disk (attach or clone)",
            ProvisionSource::Import => "Import",
        }
    }

    /// Sources selectable for a regular (non-import) wizard
    pub fn selectable() -> [ProvisionSource; 4] {
        [
            ProvisionSource::Pxe,
            ProvisionSource::Url,
            ProvisionSource::Container,
            ProvisionSource::Disk,
        ]
    }
}

/// NIC models KubeVirt accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkInterfaceModel {
    Virtio,
    E1000,
    E1000e,
    Ne2kPci,
    Pcnet,
    Rtl8139,
}

impl NetworkInterfaceModel {
    pub const ALL: [NetworkInterfaceModel; 6] = [
        NetworkInterfaceModel::Virtio,
        NetworkInterfaceModel::E1000,
        NetworkInterfaceModel::E1000e,
        NetworkInterfaceModel::Ne2kPci,
        NetworkInterfaceModel::Pcnet,
        NetworkInterfaceModel::Rtl8139,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NetworkInterfaceModel::Virtio => "virtio",
            NetworkInterfaceModel::E1000 => "e1000",
            NetworkInterfaceModel::E1000e => "e1000e",
            NetworkInterfaceModel::Ne2kPci => "ne2k_pci",
            NetworkInterfaceModel::Pcnet => "pcnet",
            NetworkInterfaceModel::Rtl8139 => "rtl8139",
        }
    }

    pub fn from_name(model: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|m| m.as_str() == model)
    }
}

/// Disk buses KubeVirt accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiskBus {
    Virtio,
    Sata,
    Scsi,
}

impl DiskBus {
    pub const ALL: [DiskBus; 3] = [DiskBus::Virtio, DiskBus::Sata, DiskBus::Scsi];

    pub fn as_str(&self) -> &'static str {
        match self {
            DiskBus::Virtio => "virtio",
            DiskBus::Sata => "sata",
            DiskBus::Scsi => "scsi",
        }
    }

    pub fn from_name(bus: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|b| b.as_str() == bus)
    }
}
