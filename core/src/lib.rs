//! VM Wizard Core Library
//!
//! State, template prefill and tab validation for the VM creation wizard.
//! Rendering is left to the front end; this crate only decides what each
//! tab contains and whether it is complete.

pub mod actions;
pub mod cloud_init;
pub mod config;
pub mod entries;
pub mod error;
pub mod model;
pub mod prefill;
pub mod reducer;
pub mod resources;
pub mod selectors;
pub mod state;
pub mod store;
pub mod template;
pub mod update;
pub mod validation;

pub use actions::Action;
pub use config::{DefaultsSection, WizardConfig};
pub use entries::{EntryId, NetworkEntry, NetworkType, StorageEntry, StorageType};
pub use error::{Error, Result};
pub use model::*;
pub use prefill::{prefill_vm_template, PrefillUpdate};
pub use reducer::reduce;
pub use state::{CommonData, SettingsUpdate, VmSettings, WizardId, WizardState};
pub use store::WizardStore;
pub use template::{Template, TemplateSource};
pub use validation::{EntryValidation, FieldError, ValidatedField};
