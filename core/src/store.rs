//! Wizard sessions keyed by id

use crate::actions::Action;
use crate::config::WizardConfig;
use crate::reducer::reduce;
use crate::state::{CommonData, WizardId, WizardState};
use crate::update::{initialize, run_updaters};
use crate::{Error, Result};
use log::{debug, info};
use std::collections::HashMap;
use uuid::Uuid;

pub struct WizardStore {
    config: WizardConfig,
    wizards: HashMap<WizardId, WizardState>,
}

impl WizardStore {
    pub fn new(config: WizardConfig) -> Self {
        Self {
            config,
            wizards: HashMap::new(),
        }
    }

    pub fn config(&self) -> &WizardConfig {
        &self.config
    }

    /// Open a new session and run its first update pass
    pub fn create(&mut self, common_data: CommonData) -> WizardId {
        let id = Uuid::new_v4();
        let (state, emitted) = initialize(WizardState::new(id, common_data), &self.config);
        info!("Created wizard {} ({} initial actions)", id, emitted.len());
        self.wizards.insert(id, state);
        id
    }

    pub fn get(&self, id: WizardId) -> Option<&WizardState> {
        self.wizards.get(&id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &WizardId> {
        self.wizards.keys()
    }

    /// Apply an action and run the update pipeline.
    /// Returns the internal actions the pipeline emitted.
    pub fn dispatch(&mut self, id: WizardId, action: Action) -> Result<Vec<Action>> {
        let prev = self
            .wizards
            .get(&id)
            .ok_or_else(|| Error::not_found(format!("Wizard {}", id)))?;

        debug!("wizard {}: dispatch {}", id, action.name());
        let state = reduce(prev, &action);

        let (state, emitted) = if action.is_internal() {
            (state, Vec::new())
        } else {
            run_updaters(prev, state, &self.config)
        };

        self.wizards.insert(id, state);
        Ok(emitted)
    }

    /// Drop a session, returning its last state
    pub fn dispose(&mut self, id: WizardId) -> Option<WizardState> {
        let state = self.wizards.remove(&id);
        if state.is_some() {
            info!("Disposed wizard {}", id);
        }
        state
    }
}

impl Default for WizardStore {
    fn default() -> Self {
        Self::new(WizardConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::WizardTab;
    use crate::state::SettingsUpdate;

    #[test]
    fn test_create_and_dispose() {
        let mut store = WizardStore::default();
        let id = store.create(CommonData::default());
        assert!(store.get(id).is_some());
        assert_eq!(store.ids().count(), 1);
        assert!(store.dispose(id).is_some());
        assert!(store.get(id).is_none());
        assert!(store.dispose(id).is_none());
    }

    #[test]
    fn test_dispatch_unknown_wizard() {
        let mut store = WizardStore::default();
        let err = store.dispatch(Uuid::new_v4(), Action::LockAll).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_internal_actions_skip_pipeline() {
        let mut store = WizardStore::default();
        let id = store.create(CommonData::default());
        let emitted = store
            .dispatch(id, Action::tab_validity(WizardTab::Storage, false, false, None))
            .unwrap();
        assert!(emitted.is_empty());
        assert!(!store.get(id).unwrap().tab(WizardTab::Storage).is_valid);
    }

    #[test]
    fn test_dispatch_settings() {
        let mut store = WizardStore::default();
        let id = store.create(CommonData::default());
        store
            .dispatch(
                id,
                Action::UpdateSettings(vec![
                    SettingsUpdate::Name(Some("vm1".to_string())),
                    SettingsUpdate::ProvisionSource(Some(crate::model::ProvisionSource::Pxe)),
                    SettingsUpdate::OperatingSystem(Some("fedora31".to_string())),
                    SettingsUpdate::Flavor(Some("small".to_string())),
                    SettingsUpdate::WorkloadProfile(Some("server".to_string())),
                ]),
            )
            .unwrap();
        let state = store.get(id).unwrap();
        assert!(state.tab(WizardTab::VmSettings).is_valid);
        // PXE without a bootable interface
        assert!(!state.tab(WizardTab::Networking).is_valid);
    }
}
