//! Recorded wizard sessions

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use vm_wizard_core::{Action, CommonData, Template};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(default)]
    pub common_data: CommonData,
    /// Template JSON files, relative to the session file
    #[serde(default)]
    pub templates: Vec<PathBuf>,
    #[serde(default)]
    pub actions: Vec<Action>,
}

impl Session {
    /// Read a session and fold its template files into the common data
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read session {}", path.display()))?;
        let mut session: Session = serde_json::from_str(&content)
            .with_context(|| format!("Invalid session file {}", path.display()))?;

        let base = path.parent().unwrap_or_else(|| Path::new("."));
        for file in &session.templates {
            let file = base.join(file);
            let content = fs::read_to_string(&file)
                .with_context(|| format!("Failed to read template {}", file.display()))?;
            let template = Template::from_json(&content)
                .with_context(|| format!("Invalid template {}", file.display()))?;
            log::debug!("Loaded template {:?} from {}", template.name(), file.display());
            session.common_data.insert_template(template);
        }

        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use vm_wizard_core::{NetworkType, WizardStore, WizardTab};

    #[test]
    fn test_load_session_with_templates() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("base.json"),
            r#"{"metadata": {"name": "fedora", "labels": {"template.kubevirt.io/type": "base"}}}"#,
        )
        .unwrap();
        fs::write(
            dir.path().join("mine.json"),
            r#"{"metadata": {"name": "mine"}}"#,
        )
        .unwrap();
        let path = dir.path().join("session.json");
        fs::write(
            &path,
            r#"{
                "templates": ["base.json", "mine.json"],
                "actions": [{"type": "updateSettings", "payload": [{"field": "name", "value": "vm1"}]}]
            }"#,
        )
        .unwrap();

        let session = Session::load(&path).unwrap();
        assert_eq!(session.common_data.common_templates.len(), 1);
        assert_eq!(session.common_data.user_templates.len(), 1);
        assert_eq!(session.actions.len(), 1);
    }

    fn replay_demo(name: &str) -> vm_wizard_core::WizardState {
        let demos = Path::new(env!("CARGO_MANIFEST_DIR")).join("../demos");
        let session = Session::load(&demos.join(name)).unwrap();
        let mut store = WizardStore::default();
        let id = store.create(session.common_data);
        for action in session.actions {
            store.dispatch(id, action).unwrap();
        }
        store.get(id).unwrap().clone()
    }

    #[test]
    fn test_demo_template_session() {
        let state = replay_demo("template-session.json");
        for tab in [WizardTab::VmSettings, WizardTab::Networking, WizardTab::Storage] {
            assert!(state.tab(tab).is_valid, "{:?}", tab);
        }
        assert_eq!(state.settings.flavor.as_deref(), Some("small"));
        assert_eq!(state.cloud_init.is_form, Some(true));
        // the template supplies its own pod network
        assert_eq!(state.networks.iter().filter(|n| n.is_pod()).count(), 1);
        assert!(!state.networks.iter().any(|n| n.kind == NetworkType::PodDefault));
    }

    #[test]
    fn test_demo_pxe_session() {
        let state = replay_demo("pxe-session.json");
        assert!(state.tab(WizardTab::Networking).is_valid);
        assert_eq!(state.tab(WizardTab::Networking).error, None);
        assert!(vm_wizard_core::selectors::can_create(&state));
    }

    #[test]
    fn test_missing_template_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, r#"{"templates": ["nope.json"]}"#).unwrap();
        assert!(Session::load(&path).is_err());
    }
}
