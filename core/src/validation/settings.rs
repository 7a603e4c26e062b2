//! General (VM settings) tab validation

use super::common::validate_dns1123_label;
use super::{EntryValidation, Errors, FieldError, ValidatedField};
use crate::actions::Action;
use crate::model::{WizardTab, CUSTOM_FLAVOR};
use crate::resources::parse_quantity;
use crate::selectors::check_tab_validity_changed;
use crate::state::{VmSettings, WizardState};

fn filled(value: Option<&String>) -> Option<&str> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty())
}

fn require(errors: &mut Errors, value: Option<&String>, field: ValidatedField, message: &str) {
    if filled(value).is_none() {
        errors.push(FieldError::required(field, message));
    }
}

pub fn validate_settings(settings: &VmSettings) -> EntryValidation {
    let mut errors = Errors::default();

    match filled(settings.name.as_ref()) {
        None => errors.push(FieldError::required(ValidatedField::Name, "Name is required")),
        Some(name) => {
            if let Err(message) = validate_dns1123_label(name) {
                errors.push(FieldError::invalid(ValidatedField::Name, message));
            }
        }
    }

    // image URL and container image are checked on the storage tab
    if settings.provision_source.is_none() {
        errors.push(FieldError::required(
            ValidatedField::ProvisionSource,
            "Source is required",
        ));
    }

    require(
        &mut errors,
        settings.operating_system.as_ref(),
        ValidatedField::OperatingSystem,
        "Operating system is required",
    );
    require(
        &mut errors,
        settings.flavor.as_ref(),
        ValidatedField::Flavor,
        "Flavor is required",
    );
    require(
        &mut errors,
        settings.workload_profile.as_ref(),
        ValidatedField::WorkloadProfile,
        "Workload profile is required",
    );

    if settings.flavor.as_deref() == Some(CUSTOM_FLAVOR) {
        match settings.cpu {
            None => errors.push(FieldError::required(ValidatedField::Cpu, "CPUs are required")),
            Some(0) => errors.push(FieldError::invalid(
                ValidatedField::Cpu,
                "At least one CPU is required",
            )),
            Some(_) => {}
        }
        match filled(settings.memory.as_ref()) {
            None => errors.push(FieldError::required(
                ValidatedField::Memory,
                "Memory is required",
            )),
            Some(memory) => {
                if !parse_quantity(memory).is_some_and(|bytes| bytes > 0) {
                    errors.push(FieldError::invalid(
                        ValidatedField::Memory,
                        "Memory must be a positive quantity such as 2Gi",
                    ));
                }
            }
        }
    }

    errors.finish()
}

pub fn set_settings_tab_validity(state: &WizardState) -> Option<Action> {
    let validation = validate_settings(&state.settings);
    let has_all_required_filled = validation.has_all_required_filled;
    let is_valid = validation.is_valid && has_all_required_filled;

    check_tab_validity_changed(state, WizardTab::VmSettings, is_valid, has_all_required_filled, None)
        .then(|| {
            Action::tab_validity(WizardTab::VmSettings, is_valid, has_all_required_filled, None)
        })
}
