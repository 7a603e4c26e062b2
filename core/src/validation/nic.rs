//! Validation of a single network interface row

use super::common::{validate_dns1123_label, validate_mac_address, validate_multus_network_name};
use super::{EntryValidation, Errors, FieldError, ValidatedField};
use crate::model::NetworkInterfaceModel;
use crate::resources::{Network, NetworkInterface};
use std::collections::HashSet;

/// Names taken by the other rows of the networking tab
#[derive(Debug, Clone, Default)]
pub struct UsedNicNames {
    pub interface_names: HashSet<String>,
    pub multus_network_names: HashSet<String>,
}

pub fn validate_nic(
    interface: &NetworkInterface,
    network: Option<&Network>,
    used: &UsedNicNames,
) -> EntryValidation {
    let mut errors = Errors::default();

    match interface.name.as_deref().map(str::trim) {
        None | Some("") => errors.push(FieldError::required(
            ValidatedField::Name,
            "Name is required",
        )),
        Some(name) => {
            if let Err(message) = validate_dns1123_label(name) {
                errors.push(FieldError::invalid(ValidatedField::Name, message));
            } else if used.interface_names.contains(name) {
                errors.push(FieldError::invalid(
                    ValidatedField::Name,
                    "Interface with this name already exists",
                ));
            }
        }
    }

    if let Some(model) = interface.model.as_deref() {
        if NetworkInterfaceModel::from_name(model).is_none() {
            errors.push(FieldError::invalid(
                ValidatedField::Model,
                format!("Unknown network interface model '{}'", model),
            ));
        }
    }

    if let Some(mac) = interface.mac_address.as_deref().map(str::trim) {
        if !mac.is_empty() {
            if let Err(message) = validate_mac_address(mac) {
                errors.push(FieldError::invalid(ValidatedField::MacAddress, message));
            }
        }
    }

    match network {
        None => errors.push(FieldError::required(
            ValidatedField::Network,
            "Network is required",
        )),
        Some(network) if network.is_pod() => {
            if interface.sriov.is_some() {
                errors.push(FieldError::invalid(
                    ValidatedField::Network,
                    "SR-IOV binding is not supported on the pod network",
                ));
            }
        }
        Some(network) => match network.multus_network_name().map(str::trim) {
            None | Some("") => errors.push(FieldError::required(
                ValidatedField::Network,
                "Network is required",
            )),
            Some(name) => {
                if let Err(message) = validate_multus_network_name(name) {
                    errors.push(FieldError::invalid(ValidatedField::Network, message));
                } else if used.multus_network_names.contains(name) {
                    errors.push(FieldError::invalid(
                        ValidatedField::Network,
                        "Network is already used by another interface",
                    ));
                }
            }
        },
    }

    errors.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ErrorKind;

    fn used(interfaces: &[&str], networks: &[&str]) -> UsedNicNames {
        UsedNicNames {
            interface_names: interfaces.iter().map(|s| s.to_string()).collect(),
            multus_network_names: networks.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_valid_pod_nic() {
        let v = validate_nic(
            &NetworkInterface::named("default").with_model("virtio"),
            Some(&Network::pod("default")),
            &UsedNicNames::default(),
        );
        assert!(v.is_valid);
        assert!(v.has_all_required_filled);
    }

    #[test]
    fn test_missing_name_and_network_are_required() {
        let v = validate_nic(&NetworkInterface::default(), None, &UsedNicNames::default());
        assert!(!v.has_all_required_filled);
        assert_eq!(
            v.error_for(ValidatedField::Name).map(|e| e.kind),
            Some(ErrorKind::Required)
        );
        assert_eq!(
            v.error_for(ValidatedField::Network).map(|e| e.kind),
            Some(ErrorKind::Required)
        );
    }

    #[test]
    fn test_duplicate_interface_name() {
        let v = validate_nic(
            &NetworkInterface::named("eth0"),
            Some(&Network::multus("eth0", "br1")),
            &used(&["eth0"], &[]),
        );
        assert!(!v.is_valid);
        assert!(v.has_all_required_filled);
        assert!(v.error_for(ValidatedField::Name).is_some());
    }

    #[test]
    fn test_duplicate_multus_network() {
        let v = validate_nic(
            &NetworkInterface::named("eth1"),
            Some(&Network::multus("eth1", "br1")),
            &used(&["eth0"], &["br1"]),
        );
        assert!(!v.is_valid);
        assert!(v.error_for(ValidatedField::Network).is_some());
    }

    #[test]
    fn test_bad_mac_and_model() {
        let mut nic = NetworkInterface::named("eth0").with_model("virtio-net");
        nic.mac_address = Some("not-a-mac".to_string());
        let v = validate_nic(&nic, Some(&Network::pod("default")), &UsedNicNames::default());
        assert!(!v.is_valid);
        assert!(v.has_all_required_filled);
        assert!(v.error_for(ValidatedField::MacAddress).is_some());
        assert!(v.error_for(ValidatedField::Model).is_some());
    }

    #[test]
    fn test_sriov_on_pod_network() {
        let mut nic = NetworkInterface::named("eth0");
        nic.sriov = Some(Default::default());
        let v = validate_nic(&nic, Some(&Network::pod("default")), &UsedNicNames::default());
        assert!(!v.is_valid);
    }
}
