//! Actions accepted by the wizard reducer

use crate::entries::{EntryId, NetworkEntry, StorageEntry};
use crate::model::WizardTab;
use crate::resources::{DataVolume, Disk, Network, NetworkInterface, PersistentVolumeClaim, Volume};
use crate::state::{CommonData, SettingsUpdate};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum Action {
    // User intent
    UpdateSettings(Vec<SettingsUpdate>),
    #[serde(rename_all = "camelCase")]
    AddNetwork {
        network: Option<Network>,
        network_interface: NetworkInterface,
    },
    UpdateNetwork(NetworkEntry),
    RemoveNetwork(EntryId),
    #[serde(rename_all = "camelCase")]
    AddStorage {
        disk: Disk,
        volume: Option<Volume>,
        #[serde(default)]
        data_volume: Option<DataVolume>,
        #[serde(default)]
        persistent_volume_claim: Option<PersistentVolumeClaim>,
    },
    UpdateStorage(StorageEntry),
    RemoveStorage(EntryId),
    SetCommonData(CommonData),
    #[serde(rename_all = "camelCase")]
    SetTabLocked { tab: WizardTab, is_locked: bool },
    #[serde(rename_all = "camelCase")]
    SetTabHidden { tab: WizardTab, is_hidden: bool },
    LockAll,

    // Emitted by the update pipeline
    SetNetworks(Vec<Arc<NetworkEntry>>),
    SetStorages(Vec<Arc<StorageEntry>>),
    #[serde(rename_all = "camelCase")]
    SetTabValidity {
        tab: WizardTab,
        is_valid: bool,
        has_all_required_filled: bool,
        error: Option<String>,
    },
    SetCloudInitForm(bool),
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::UpdateSettings(_) => "UpdateSettings",
            Action::AddNetwork { .. } => "AddNetwork",
            Action::UpdateNetwork(_) => "UpdateNetwork",
            Action::RemoveNetwork(_) => "RemoveNetwork",
            Action::AddStorage { .. } => "AddStorage",
            Action::UpdateStorage(_) => "UpdateStorage",
            Action::RemoveStorage(_) => "RemoveStorage",
            Action::SetCommonData(_) => "SetCommonData",
            Action::SetTabLocked { .. } => "SetTabLocked",
            Action::SetTabHidden { .. } => "SetTabHidden",
            Action::LockAll => "LockAll",
            Action::SetNetworks(_) => "SetNetworks",
            Action::SetStorages(_) => "SetStorages",
            Action::SetTabValidity { .. } => "SetTabValidity",
            Action::SetCloudInitForm(_) => "SetCloudInitForm",
        }
    }

    /// Internal actions are produced by the pipeline and never trigger it
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            Action::SetNetworks(_)
                | Action::SetStorages(_)
                | Action::SetTabValidity { .. }
                | Action::SetCloudInitForm(_)
        )
    }

    pub fn tab_validity(
        tab: WizardTab,
        is_valid: bool,
        has_all_required_filled: bool,
        error: Option<String>,
    ) -> Self {
        Action::SetTabValidity {
            tab,
            is_valid,
            has_all_required_filled,
            error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_json() {
        let json = r#"[
            {"type": "updateSettings", "payload": [{"field": "name", "value": "vm1"}]},
            {"type": "addNetwork", "payload": {"network": {"name": "n1", "multus": {"networkName": "br1"}}, "networkInterface": {"name": "eth1"}}},
            {"type": "removeNetwork", "payload": 3},
            {"type": "lockAll"}
        ]"#;
        let actions: Vec<Action> = serde_json::from_str(json).unwrap();
        assert_eq!(actions.len(), 4);
        assert_eq!(actions[0].name(), "UpdateSettings");
        assert!(matches!(actions[2], Action::RemoveNetwork(3)));
        assert!(matches!(actions[3], Action::LockAll));
        assert!(!actions[1].is_internal());
    }

    #[test]
    fn test_internal_actions() {
        assert!(Action::SetNetworks(Vec::new()).is_internal());
        assert!(Action::tab_validity(WizardTab::Storage, true, true, None).is_internal());
        assert!(!Action::UpdateSettings(Vec::new()).is_internal());
    }
}
