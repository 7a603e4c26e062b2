//! The update pipeline run after every user action
//!
//! Updaters look at the state before the action and the state after it, and
//! produce internal actions. Each one is reduced right away so the next
//! updater sees its effect.

use crate::actions::Action;
use crate::config::WizardConfig;
use crate::prefill::prefill_vm_template;
use crate::reducer::reduce;
use crate::selectors::settings_prefill_relevant_changed;
use crate::state::WizardState;
use crate::validation::networks::{set_networks_tab_validity, validate_networks};
use crate::validation::settings::set_settings_tab_validity;
use crate::validation::storage::{set_storages_tab_validity, validate_storages};
use log::debug;

/// Accumulates emitted actions while threading the state through updaters
struct Pass {
    state: WizardState,
    emitted: Vec<Action>,
}

impl Pass {
    fn apply(&mut self, action: Action) {
        debug!("wizard {}: {}", self.state.id, action.name());
        self.state = reduce(&self.state, &action);
        self.emitted.push(action);
    }

    fn apply_opt(&mut self, action: Option<Action>) {
        if let Some(action) = action {
            self.apply(action);
        }
    }
}

/// Run every updater for the transition `prev -> state`.
/// Returns the final state and the internal actions that produced it.
pub fn run_updaters(
    prev: &WizardState,
    state: WizardState,
    config: &WizardConfig,
) -> (WizardState, Vec<Action>) {
    let mut pass = Pass {
        state,
        emitted: Vec::new(),
    };

    if settings_prefill_relevant_changed(prev, &pass.state) {
        let update = prefill_vm_template(
            &pass.state,
            pass.state.common_data.as_ref(),
            &config.defaults,
        );
        for action in update.into_actions() {
            pass.apply(action);
        }
    }

    let action = validate_networks(prev, &pass.state);
    pass.apply_opt(action);
    let action = set_networks_tab_validity(&pass.state);
    pass.apply_opt(action);

    let action = validate_storages(prev, &pass.state);
    pass.apply_opt(action);
    let action = set_storages_tab_validity(&pass.state);
    pass.apply_opt(action);

    let action = set_settings_tab_validity(&pass.state);
    pass.apply_opt(action);

    (pass.state, pass.emitted)
}

/// First pass for a freshly created session. Everything counts as changed.
pub fn initialize(state: WizardState, config: &WizardConfig) -> (WizardState, Vec<Action>) {
    let prev = WizardState::empty(state.id);
    run_updaters(&prev, state, config)
}
