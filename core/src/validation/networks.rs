//! Networking tab validation

use super::nic::{validate_nic, UsedNicNames};
use super::aggregate;
use crate::actions::Action;
use crate::model::{ProvisionSource, WizardTab, MISSING_BOOT_SOURCE_ERROR};
use crate::selectors::{check_tab_validity_changed, has_networks_changed};
use crate::state::WizardState;
use std::sync::Arc;

/// Re-validate every row when the network list changed since `prev`.
/// Returns `None` when nothing changed.
pub fn validate_networks(prev: &WizardState, state: &WizardState) -> Option<Action> {
    if !has_networks_changed(prev, state) {
        return None;
    }

    let networks = &state.networks;
    let validated = networks
        .iter()
        .map(|entry| {
            // names of the other rows, so a row never collides with itself
            let others = networks.iter().filter(|n| n.id != entry.id);
            let used = UsedNicNames {
                interface_names: others
                    .clone()
                    .filter_map(|n| n.interface_name())
                    .map(|name| name.trim().to_string())
                    .collect(),
                multus_network_names: others
                    .filter_map(|n| n.multus_network_name())
                    .map(|name| name.trim().to_string())
                    .collect(),
            };
            let validation =
                validate_nic(&entry.network_interface, entry.network.as_ref(), &used);
            Arc::new(entry.with_validation(validation))
        })
        .collect();

    Some(Action::SetNetworks(validated))
}

/// Compute the tab verdict and emit it if it differs from the stored one
pub fn set_networks_tab_validity(state: &WizardState) -> Option<Action> {
    let networks = &state.networks;
    let (mut is_valid, mut has_all_required_filled) =
        aggregate(networks.iter().map(|n| n.validation.as_ref()));
    let mut error = None;

    if state.provision_source() == Some(ProvisionSource::Pxe) {
        let has_boot_source = networks
            .iter()
            .any(|n| !n.is_pod() && n.network_interface.is_first_bootable_device());
        if !has_boot_source {
            error = Some(MISSING_BOOT_SOURCE_ERROR.to_string());
            has_all_required_filled = false;
        }
    }

    is_valid = is_valid && has_all_required_filled;

    if check_tab_validity_changed(
        state,
        WizardTab::Networking,
        is_valid,
        has_all_required_filled,
        error.as_deref(),
    ) {
        Some(Action::tab_validity(
            WizardTab::Networking,
            is_valid,
            has_all_required_filled,
            error,
        ))
    } else {
        None
    }
}
