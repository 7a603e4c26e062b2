//! Pure state transitions: `reduce(state, action) -> state`

use crate::actions::Action;
use crate::entries::{IdResolver, Identified, NetworkEntry, NetworkType, StorageEntry, StorageType};
use crate::model::WizardTab;
use crate::state::WizardState;
use log::debug;
use std::sync::Arc;

pub fn reduce(state: &WizardState, action: &Action) -> WizardState {
    let mut next = state.clone();

    match action {
        Action::UpdateSettings(updates) => {
            for update in updates {
                next.settings.apply(update);
            }
        }
        Action::AddNetwork {
            network,
            network_interface,
        } => {
            let id = IdResolver::for_entries(&next.networks).next_id();
            next.networks.push(Arc::new(NetworkEntry::new(
                id,
                NetworkType::UserInput,
                network.clone(),
                network_interface.clone(),
            )));
        }
        Action::UpdateNetwork(entry) => replace_entry(&mut next.networks, entry),
        Action::RemoveNetwork(id) => remove_entry(&mut next.networks, *id),
        Action::AddStorage {
            disk,
            volume,
            data_volume,
            persistent_volume_claim,
        } => {
            let id = IdResolver::for_entries(&next.storages).next_id();
            let mut entry = StorageEntry::new(id, StorageType::UserInput, disk.clone(), volume.clone());
            entry.data_volume = data_volume.clone();
            entry.persistent_volume_claim = persistent_volume_claim.clone();
            next.storages.push(Arc::new(entry));
        }
        Action::UpdateStorage(entry) => replace_entry(&mut next.storages, entry),
        Action::RemoveStorage(id) => remove_entry(&mut next.storages, *id),
        Action::SetCommonData(data) => next.common_data = Arc::new(data.clone()),
        Action::SetTabLocked { tab, is_locked } => next.tab_mut(*tab).is_locked = *is_locked,
        Action::SetTabHidden { tab, is_hidden } => next.tab_mut(*tab).is_hidden = *is_hidden,
        Action::LockAll => {
            for tab in WizardTab::ALL {
                next.tab_mut(tab).is_locked = true;
            }
        }
        Action::SetNetworks(networks) => next.networks = networks.clone(),
        Action::SetStorages(storages) => next.storages = storages.clone(),
        Action::SetTabValidity {
            tab,
            is_valid,
            has_all_required_filled,
            error,
        } => {
            let meta = next.tab_mut(*tab);
            *meta = meta
                .clone()
                .with_validity(*is_valid, *has_all_required_filled, error.clone());
        }
        Action::SetCloudInitForm(is_form) => next.cloud_init.is_form = Some(*is_form),
    }

    next
}

/// Swap in a new allocation for the row with the same id
fn replace_entry<T: Identified + Clone>(entries: &mut [Arc<T>], entry: &T) {
    match entries.iter_mut().find(|e| e.id() == entry.id()) {
        Some(slot) => *slot = Arc::new(entry.clone()),
        None => debug!("ignoring update of unknown entry {}", entry.id()),
    }
}

fn remove_entry<T: Identified>(entries: &mut Vec<Arc<T>>, id: u32) {
    let before = entries.len();
    entries.retain(|e| e.id() != id);
    if entries.len() == before {
        debug!("ignoring removal of unknown entry {}", id);
    }
}
