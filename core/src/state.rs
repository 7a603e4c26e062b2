//! Wizard session state
//!
//! A `WizardState` is only ever replaced, never edited in place: the
//! reducer clones it and swaps in new values, sharing untouched rows.

use crate::entries::{NetworkEntry, StorageEntry};
use crate::model::{ProvisionSource, TabMetadata, WizardTab};
use crate::template::{Template, TemplateSource};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use uuid::Uuid;

pub type WizardId = Uuid;

const UNKNOWN_TAB: TabMetadata = TabMetadata {
    is_valid: false,
    is_locked: false,
    is_hidden: false,
    is_pending: false,
    has_all_required_filled: false,
    error: None,
};

/// Values of the general (VM settings) tab
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VmSettings {
    pub name: Option<String>,
    pub hostname: Option<String>,
    pub description: Option<String>,
    pub provision_source: Option<ProvisionSource>,
    pub container_image: Option<String>,
    pub image_url: Option<String>,
    pub user_template: Option<String>,
    pub operating_system: Option<String>,
    pub flavor: Option<String>,
    /// Memory as a Kubernetes quantity, e.g. `2Gi`
    pub memory: Option<String>,
    pub cpu: Option<u32>,
    pub workload_profile: Option<String>,
    #[serde(default)]
    pub start_vm: bool,
}

/// A single field edit on the general tab
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "camelCase")]
pub enum SettingsUpdate {
    Name(Option<String>),
    Hostname(Option<String>),
    Description(Option<String>),
    ProvisionSource(Option<ProvisionSource>),
    ContainerImage(Option<String>),
    ImageUrl(Option<String>),
    UserTemplate(Option<String>),
    OperatingSystem(Option<String>),
    Flavor(Option<String>),
    Memory(Option<String>),
    Cpu(Option<u32>),
    WorkloadProfile(Option<String>),
    StartVm(bool),
}

impl VmSettings {
    pub fn apply(&mut self, update: &SettingsUpdate) {
        match update.clone() {
            SettingsUpdate::Name(v) => self.name = v,
            SettingsUpdate::Hostname(v) => self.hostname = v,
            SettingsUpdate::Description(v) => self.description = v,
            SettingsUpdate::ProvisionSource(v) => self.provision_source = v,
            SettingsUpdate::ContainerImage(v) => self.container_image = v,
            SettingsUpdate::ImageUrl(v) => self.image_url = v,
            SettingsUpdate::UserTemplate(v) => self.user_template = v,
            SettingsUpdate::OperatingSystem(v) => self.operating_system = v,
            SettingsUpdate::Flavor(v) => self.flavor = v,
            SettingsUpdate::Memory(v) => self.memory = v,
            SettingsUpdate::Cpu(v) => self.cpu = v,
            SettingsUpdate::WorkloadProfile(v) => self.workload_profile = v,
            SettingsUpdate::StartVm(v) => self.start_vm = v,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudInitSettings {
    /// `Some(true)` when cloud-init can be edited through the form,
    /// `Some(false)` when only YAML editing is possible
    pub is_form: Option<bool>,
}

/// Data loaded from outside the wizard (cluster watches and launch flags)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommonData {
    #[serde(default)]
    pub user_templates: Vec<Template>,
    #[serde(default)]
    pub common_templates: Vec<Template>,
    #[serde(default)]
    pub is_create_template: bool,
    #[serde(default)]
    pub is_provider_import: bool,
}

impl CommonData {
    /// File a template under the common or user list by its type label
    pub fn insert_template(&mut self, template: Template) {
        if template.is_common() {
            self.common_templates.push(template);
        } else {
            self.user_templates.push(template);
        }
    }
}

impl TemplateSource for CommonData {
    fn user_templates(&self) -> &[Template] {
        &self.user_templates
    }

    fn common_templates(&self) -> &[Template] {
        &self.common_templates
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardState {
    pub id: WizardId,
    pub created_at: DateTime<Utc>,
    pub tabs: BTreeMap<WizardTab, TabMetadata>,
    pub settings: VmSettings,
    pub networks: Vec<Arc<NetworkEntry>>,
    pub storages: Vec<Arc<StorageEntry>>,
    pub cloud_init: CloudInitSettings,
    pub common_data: Arc<CommonData>,
}

impl WizardState {
    /// Fresh session state. Rows are added by the first update pass.
    pub fn new(id: WizardId, common_data: CommonData) -> Self {
        let mut state = Self::empty(id);
        state.tabs = initial_tabs(&common_data);
        if common_data.is_provider_import {
            state.settings.provision_source = Some(ProvisionSource::Import);
        }
        state.common_data = Arc::new(common_data);
        state
    }

    /// A state with nothing in it, used as the "previous" state of the
    /// first update pass
    pub fn empty(id: WizardId) -> Self {
        Self {
            id,
            created_at: Utc::now(),
            tabs: BTreeMap::new(),
            settings: VmSettings::default(),
            networks: Vec::new(),
            storages: Vec::new(),
            cloud_init: CloudInitSettings::default(),
            common_data: Arc::new(CommonData::default()),
        }
    }

    pub fn tab(&self, tab: WizardTab) -> &TabMetadata {
        self.tabs.get(&tab).unwrap_or(&UNKNOWN_TAB)
    }

    pub fn tab_mut(&mut self, tab: WizardTab) -> &mut TabMetadata {
        self.tabs.entry(tab).or_default()
    }

    pub fn network(&self, id: u32) -> Option<&Arc<NetworkEntry>> {
        self.networks.iter().find(|n| n.id == id)
    }

    pub fn storage(&self, id: u32) -> Option<&Arc<StorageEntry>> {
        self.storages.iter().find(|s| s.id == id)
    }

    pub fn provision_source(&self) -> Option<ProvisionSource> {
        self.settings.provision_source
    }
}

fn initial_tabs(common_data: &CommonData) -> BTreeMap<WizardTab, TabMetadata> {
    WizardTab::ALL
        .iter()
        .map(|&tab| {
            let meta = match tab {
                WizardTab::ImportProviders => {
                    TabMetadata::complete().hidden(!common_data.is_provider_import)
                }
                WizardTab::VmSettings | WizardTab::Networking | WizardTab::Storage => {
                    TabMetadata::default()
                }
                WizardTab::AdvancedCloudInit
                | WizardTab::AdvancedVirtualHardware
                | WizardTab::Review => TabMetadata::complete(),
                WizardTab::Result => TabMetadata::complete().hidden(true),
            };
            (tab, meta)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_tabs() {
        let state = WizardState::new(Uuid::new_v4(), CommonData::default());
        assert_eq!(state.tabs.len(), WizardTab::ALL.len());
        assert!(state.tab(WizardTab::ImportProviders).is_hidden);
        assert!(!state.tab(WizardTab::VmSettings).is_valid);
        assert!(state.tab(WizardTab::AdvancedCloudInit).is_valid);
        assert!(state.networks.is_empty());
    }

    #[test]
    fn test_provider_import_state() {
        let state = WizardState::new(
            Uuid::new_v4(),
            CommonData {
                is_provider_import: true,
                ..CommonData::default()
            },
        );
        assert!(!state.tab(WizardTab::ImportProviders).is_hidden);
        assert_eq!(state.provision_source(), Some(ProvisionSource::Import));
    }

    #[test]
    fn test_insert_template_by_type_label() {
        let common = r#"{"metadata": {"name": "fedora", "labels": {"template.kubevirt.io/type": "base"}}}"#;
        let mut data = CommonData::default();
        data.insert_template(Template::from_json(common).unwrap());
        data.insert_template(Template::from_json(r#"{"metadata": {"name": "mine"}}"#).unwrap());

        assert_eq!(data.common_templates.len(), 1);
        assert_eq!(data.user_templates.len(), 1);
        assert!(data.find_user_template("mine").is_some());
        assert!(data.find_user_template("fedora").is_none());
    }

    #[test]
    fn test_unknown_tab_is_not_valid() {
        let state = WizardState::empty(Uuid::new_v4());
        assert!(!state.tab(WizardTab::Storage).is_valid);
    }

    #[test]
    fn test_settings_apply() {
        let mut settings = VmSettings::default();
        settings.apply(&SettingsUpdate::Flavor(Some("small".to_string())));
        settings.apply(&SettingsUpdate::Cpu(Some(2)));
        settings.apply(&SettingsUpdate::StartVm(true));
        assert_eq!(settings.flavor.as_deref(), Some("small"));
        assert_eq!(settings.cpu, Some(2));
        assert!(settings.start_vm);
    }

    #[test]
    fn test_settings_update_json() {
        let update: SettingsUpdate =
            serde_json::from_str(r#"{"field": "provisionSource", "value": "PXE"}"#).unwrap();
        assert_eq!(
            update,
            SettingsUpdate::ProvisionSource(Some(ProvisionSource::Pxe))
        );
    }
}
