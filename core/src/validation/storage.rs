//! Storage tab validation

use super::aggregate;
use super::disk::{validate_disk, UsedDiskNames};
use crate::actions::Action;
use crate::entries::StorageEntry;
use crate::model::{ProvisionSource, WizardTab};
use crate::selectors::{check_tab_validity_changed, has_storages_changed};
use crate::state::WizardState;
use std::sync::Arc;

/// Re-validate every row when the storage list changed since `prev`
pub fn validate_storages(prev: &WizardState, state: &WizardState) -> Option<Action> {
    if !has_storages_changed(prev, state) {
        return None;
    }

    let storages = &state.storages;
    let validated = storages
        .iter()
        .map(|entry| {
            let others = storages.iter().filter(|s| s.id != entry.id);
            let used = UsedDiskNames {
                disk_names: others
                    .clone()
                    .filter_map(|s| s.disk_name())
                    .map(|name| name.trim().to_string())
                    .collect(),
                pvc_names: others
                    .filter_map(|s| s.data_volume_name())
                    .map(|name| name.trim().to_string())
                    .collect(),
            };
            let validation = validate_disk(
                &entry.disk,
                entry.volume.as_ref(),
                entry.data_volume.as_ref(),
                entry.persistent_volume_claim.as_ref(),
                &used,
            );
            Arc::new(entry.with_validation(validation))
        })
        .collect();

    Some(Action::SetStorages(validated))
}

/// Compute the tab verdict and emit it if it differs from the stored one
pub fn set_storages_tab_validity(state: &WizardState) -> Option<Action> {
    let storages = &state.storages;
    let (is_valid, mut has_all_required_filled) =
        aggregate(storages.iter().map(|s| s.validation.as_ref()));

    if has_all_required_filled && state.provision_source() == Some(ProvisionSource::Disk) {
        has_all_required_filled = storages.iter().any(|s| is_boot_disk(s));
    }

    let is_valid = has_all_required_filled && is_valid;

    if check_tab_validity_changed(state, WizardTab::Storage, is_valid, has_all_required_filled, None)
    {
        Some(Action::tab_validity(
            WizardTab::Storage,
            is_valid,
            has_all_required_filled,
            None,
        ))
    } else {
        None
    }
}

/// A first-boot disk device backed by a data volume or a claim
fn is_boot_disk(entry: &StorageEntry) -> bool {
    entry.disk.is_first_bootable_device()
        && entry.disk.disk.is_some()
        && entry.volume.as_ref().is_some_and(|v| v.is_claim_backed())
}
