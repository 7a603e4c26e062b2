//! Read-side helpers: change detection and navigation
//!
//! Change detection is by identity, not by value. Two lists are "the same"
//! when they have the same length and hold the same allocations at every
//! position. A row rebuilt with identical content counts as changed.

use crate::model::WizardTab;
use crate::state::WizardState;
use std::sync::Arc;

/// Length plus pairwise pointer comparison
pub fn entries_changed<T>(prev: &[Arc<T>], next: &[Arc<T>]) -> bool {
    prev.len() != next.len() || prev.iter().zip(next).any(|(a, b)| !Arc::ptr_eq(a, b))
}

pub fn has_networks_changed(prev: &WizardState, state: &WizardState) -> bool {
    entries_changed(&prev.networks, &state.networks)
}

pub fn has_storages_changed(prev: &WizardState, state: &WizardState) -> bool {
    entries_changed(&prev.storages, &state.storages)
}

/// Whether a settings edit or newly loaded templates call for a new prefill
pub fn settings_prefill_relevant_changed(prev: &WizardState, state: &WizardState) -> bool {
    let (a, b) = (&prev.settings, &state.settings);
    a.user_template != b.user_template
        || a.provision_source != b.provision_source
        || a.operating_system != b.operating_system
        || a.workload_profile != b.workload_profile
        || a.image_url != b.image_url
        || a.container_image != b.container_image
        || !Arc::ptr_eq(&prev.common_data, &state.common_data)
}

/// True when a computed validity triple differs from what the tab holds
pub fn check_tab_validity_changed(
    state: &WizardState,
    tab: WizardTab,
    is_valid: bool,
    has_all_required_filled: bool,
    error: Option<&str>,
) -> bool {
    state
        .tab(tab)
        .validity_differs(is_valid, has_all_required_filled, error)
}

pub fn is_tab_valid(state: &WizardState, tab: WizardTab) -> bool {
    state.tab(tab).is_valid
}

pub fn visible_tabs(state: &WizardState) -> Vec<WizardTab> {
    WizardTab::ALL
        .iter()
        .copied()
        .filter(|&tab| !state.tab(tab).is_hidden)
        .collect()
}

pub fn next_visible_tab(state: &WizardState, tab: WizardTab) -> Option<WizardTab> {
    let mut candidate = tab.next();
    while let Some(next) = candidate {
        if !state.tab(next).is_hidden {
            return Some(next);
        }
        candidate = next.next();
    }
    None
}

pub fn prev_visible_tab(state: &WizardState, tab: WizardTab) -> Option<WizardTab> {
    let mut candidate = tab.prev();
    while let Some(prev) = candidate {
        if !state.tab(prev).is_hidden {
            return Some(prev);
        }
        candidate = prev.prev();
    }
    None
}

/// First visible tab before Review that blocks creation
pub fn first_invalid_tab(state: &WizardState) -> Option<WizardTab> {
    visible_tabs(state)
        .into_iter()
        .filter(|&tab| tab < WizardTab::Review)
        .find(|&tab| {
            let meta = state.tab(tab);
            !meta.is_valid || meta.is_pending
        })
}

/// Whether "Next" may leave `tab`
pub fn can_advance(state: &WizardState, tab: WizardTab) -> bool {
    let meta = state.tab(tab);
    meta.is_valid && !meta.is_pending && next_visible_tab(state, tab).is_some()
}

/// Whether "Create" is enabled
pub fn can_create(state: &WizardState) -> bool {
    first_invalid_tab(state).is_none() && !state.tab(WizardTab::Review).is_locked
}
