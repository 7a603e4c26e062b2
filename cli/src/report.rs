//! Plain-text summary of a wizard state

use std::fmt::Write;
use vm_wizard_core::selectors::{can_create, first_invalid_tab};
use vm_wizard_core::{EntryValidation, WizardState, WizardTab};

fn flag(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

fn verdict(validation: Option<&EntryValidation>) -> String {
    match validation {
        None => "not validated".to_string(),
        Some(v) if v.is_valid => "ok".to_string(),
        Some(v) => v
            .errors
            .iter()
            .map(|e| e.message.as_str())
            .collect::<Vec<_>>()
            .join("; "),
    }
}

pub fn render(state: &WizardState) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Wizard {}", state.id);
    let _ = writeln!(
        out,
        "{:<18} {:<6} {:<9} {:<7} {:<7} Error",
        "Tab", "Valid", "Required", "Locked", "Hidden"
    );
    for tab in WizardTab::ALL {
        let meta = state.tab(tab);
        let _ = writeln!(
            out,
            "{:<18} {:<6} {:<9} {:<7} {:<7} {}",
            tab.display_name(),
            flag(meta.is_valid),
            flag(meta.has_all_required_filled),
            flag(meta.is_locked),
            flag(meta.is_hidden),
            meta.error.as_deref().unwrap_or("-"),
        );
    }

    let _ = writeln!(out, "\nNetworks:");
    for entry in &state.networks {
        let _ = writeln!(
            out,
            "  #{} {:<12} {:<16} {}",
            entry.id,
            format!("{:?}", entry.kind),
            entry.interface_name().unwrap_or("<unnamed>"),
            verdict(entry.validation.as_ref()),
        );
    }

    let _ = writeln!(out, "\nStorage:");
    for entry in &state.storages {
        let _ = writeln!(
            out,
            "  #{} {:<28} {:<16} {}",
            entry.id,
            format!("{:?}", entry.kind),
            entry.disk_name().unwrap_or("<unnamed>"),
            verdict(entry.validation.as_ref()),
        );
    }

    match first_invalid_tab(state) {
        Some(tab) => {
            let _ = writeln!(out, "\nCannot create yet: {} is incomplete", tab.display_name());
        }
        None if can_create(state) => {
            let _ = writeln!(out, "\nReady to create");
        }
        None => {
            let _ = writeln!(out, "\nLocked");
        }
    }
    out
}
