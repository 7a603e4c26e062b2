//! Validation of a single storage row

use super::common::{validate_dns1123_label, validate_url};
use super::{EntryValidation, Errors, FieldError, ValidatedField};
use crate::model::DiskBus;
use crate::resources::{
    parse_quantity, DataVolume, Disk, DiskType, PersistentVolumeClaim, Volume, VolumeType,
};
use std::collections::HashSet;

/// Names taken by the other rows of the storage tab
#[derive(Debug, Clone, Default)]
pub struct UsedDiskNames {
    pub disk_names: HashSet<String>,
    /// Names of the data volumes (and so PVCs) the other rows create
    pub pvc_names: HashSet<String>,
}

pub fn validate_disk(
    disk: &Disk,
    volume: Option<&Volume>,
    data_volume: Option<&DataVolume>,
    persistent_volume_claim: Option<&PersistentVolumeClaim>,
    used: &UsedDiskNames,
) -> EntryValidation {
    let mut errors = Errors::default();

    match disk.name.as_deref().map(str::trim) {
        None | Some("") => errors.push(FieldError::required(
            ValidatedField::Name,
            "Name is required",
        )),
        Some(name) => {
            if let Err(message) = validate_dns1123_label(name) {
                errors.push(FieldError::invalid(ValidatedField::Name, message));
            } else if used.disk_names.contains(name) {
                errors.push(FieldError::invalid(
                    ValidatedField::Name,
                    "Disk with this name already exists",
                ));
            }
        }
    }

    if let Some(bus) = disk.bus() {
        validate_bus(disk.disk_type(), bus, &mut errors);
    }

    if disk.boot_order == Some(0) {
        errors.push(FieldError::invalid(
            ValidatedField::BootOrder,
            "Boot order must be greater than 0",
        ));
    }

    let Some(volume) = volume else {
        errors.push(FieldError::required(
            ValidatedField::Volume,
            "Disk source is required",
        ));
        return errors.finish();
    };

    match volume.volume_type() {
        None => errors.push(FieldError::required(
            ValidatedField::Volume,
            "Disk source is required",
        )),
        Some(VolumeType::ContainerDisk) => {
            let image = volume
                .container_disk
                .as_ref()
                .and_then(|c| c.image.as_deref())
                .map(str::trim)
                .unwrap_or_default();
            if image.is_empty() {
                errors.push(FieldError::required(
                    ValidatedField::ContainerImage,
                    "Container image is required",
                ));
            }
        }
        Some(VolumeType::PersistentVolumeClaim) => {
            let claim = volume
                .persistent_volume_claim
                .as_ref()
                .and_then(|c| c.claim_name.as_deref())
                .or_else(|| persistent_volume_claim.and_then(|p| p.metadata.name.as_deref()))
                .unwrap_or_default();
            if claim.is_empty() {
                errors.push(FieldError::required(
                    ValidatedField::PvcName,
                    "Persistent volume claim is required",
                ));
            }
        }
        Some(VolumeType::DataVolume) => {
            if let Some(data_volume) = data_volume {
                validate_data_volume(data_volume, used, &mut errors);
            } else if volume.data_volume_name().unwrap_or_default().is_empty() {
                errors.push(FieldError::required(
                    ValidatedField::PvcName,
                    "Data volume is required",
                ));
            }
        }
        Some(VolumeType::CloudInitNoCloud) | Some(VolumeType::EmptyDisk) => {}
    }

    errors.finish()
}

fn validate_bus(disk_type: Option<DiskType>, bus: &str, errors: &mut Errors) {
    let Some(parsed) = DiskBus::from_name(bus) else {
        errors.push(FieldError::invalid(
            ValidatedField::Bus,
            format!("Unknown disk interface '{}'", bus),
        ));
        return;
    };
    if disk_type == Some(DiskType::Cdrom) && parsed == DiskBus::Virtio {
        errors.push(FieldError::invalid(
            ValidatedField::Bus,
            "CD-ROMs cannot use the virtio interface",
        ));
    }
}

fn validate_data_volume(data_volume: &DataVolume, used: &UsedDiskNames, errors: &mut Errors) {
    if let Some(name) = data_volume.name().map(str::trim) {
        if used.pvc_names.contains(name) {
            errors.push(FieldError::invalid(
                ValidatedField::PvcName,
                "PVC with this name is already used by another disk",
            ));
        }
    }

    let source = &data_volume.spec.source;
    let needs_size = if let Some(http) = &source.http {
        match http.url.as_deref().map(str::trim) {
            None | Some("") => errors.push(FieldError::required(
                ValidatedField::Url,
                "URL is required",
            )),
            Some(url) => {
                if let Err(message) = validate_url(url) {
                    errors.push(FieldError::invalid(ValidatedField::Url, message));
                }
            }
        }
        true
    } else if let Some(pvc) = &source.pvc {
        if pvc.name.as_deref().unwrap_or_default().is_empty() {
            errors.push(FieldError::required(
                ValidatedField::PvcName,
                "Persistent volume claim to clone is required",
            ));
        }
        false
    } else {
        source.blank.is_some() || source.registry.is_some()
    };

    if needs_size {
        match data_volume.size() {
            None => errors.push(FieldError::required(
                ValidatedField::Size,
                "Size is required",
            )),
            Some(size) => {
                if !parse_quantity(size).is_some_and(|bytes| bytes > 0) {
                    errors.push(FieldError::invalid(
                        ValidatedField::Size,
                        "Size must be a positive quantity such as 15Gi",
                    ));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::{HttpSource, Marker, ObjectMeta};
    use crate::validation::ErrorKind;

    fn http_data_volume(name: &str, url: Option<&str>, size: Option<&str>) -> DataVolume {
        let mut dv = DataVolume {
            metadata: ObjectMeta::named(name),
            ..DataVolume::default()
        };
        dv.spec.source.http = Some(HttpSource {
            url: url.map(str::to_string),
        });
        match size {
            Some(size) => dv.with_size(size),
            None => dv,
        }
    }

    #[test]
    fn test_valid_pvc_backed_disk() {
        let v = validate_disk(
            &Disk::disk("rootdisk", Some("virtio")).with_boot_order(1),
            Some(&Volume::persistent_volume_claim("rootdisk", "my-pvc")),
            None,
            None,
            &UsedDiskNames::default(),
        );
        assert!(v.is_valid, "{:?}", v.errors);
    }

    #[test]
    fn test_data_volume_reference_without_object() {
        let v = validate_disk(
            &Disk::disk("rootdisk", None).with_boot_order(1),
            Some(&Volume::data_volume("rootdisk", "dv1")),
            None,
            None,
            &UsedDiskNames::default(),
        );
        assert!(v.is_valid);
        assert!(v.has_all_required_filled);
    }

    #[test]
    fn test_missing_volume_is_required() {
        let v = validate_disk(
            &Disk::disk("rootdisk", None),
            None,
            None,
            None,
            &UsedDiskNames::default(),
        );
        assert!(!v.has_all_required_filled);
        assert_eq!(
            v.error_for(ValidatedField::Volume).map(|e| e.kind),
            Some(ErrorKind::Required)
        );
    }

    #[test]
    fn test_duplicate_disk_and_pvc_names() {
        let used = UsedDiskNames {
            disk_names: ["rootdisk".to_string()].into_iter().collect(),
            pvc_names: ["root-dv".to_string()].into_iter().collect(),
        };
        let dv = http_data_volume("root-dv", Some("http://example.com/img"), Some("10Gi"));
        let v = validate_disk(
            &Disk::disk("rootdisk", None),
            Some(&Volume::data_volume("rootdisk", "root-dv")),
            Some(&dv),
            None,
            &used,
        );
        assert!(!v.is_valid);
        assert!(v.error_for(ValidatedField::Name).is_some());
        assert!(v.error_for(ValidatedField::PvcName).is_some());
    }

    #[test]
    fn test_http_source_needs_url_and_size() {
        let dv = http_data_volume("root-dv", None, None);
        let v = validate_disk(
            &Disk::disk("rootdisk", None),
            Some(&Volume::data_volume("rootdisk", "root-dv")),
            Some(&dv),
            None,
            &UsedDiskNames::default(),
        );
        assert!(!v.has_all_required_filled);
        assert!(v.error_for(ValidatedField::Url).is_some());
        assert!(v.error_for(ValidatedField::Size).is_some());

        let dv = http_data_volume("root-dv", Some("ftp://nope"), Some("0Gi"));
        let v = validate_disk(
            &Disk::disk("rootdisk", None),
            Some(&Volume::data_volume("rootdisk", "root-dv")),
            Some(&dv),
            None,
            &UsedDiskNames::default(),
        );
        assert!(v.has_all_required_filled);
        assert!(!v.is_valid);
    }

    #[test]
    fn test_blank_source_needs_size() {
        let mut dv = DataVolume {
            metadata: ObjectMeta::named("blank-dv"),
            ..DataVolume::default()
        };
        dv.spec.source.blank = Some(Marker {});
        let v = validate_disk(
            &Disk::disk("data", None),
            Some(&Volume::data_volume("data", "blank-dv")),
            Some(&dv),
            None,
            &UsedDiskNames::default(),
        );
        assert!(v.error_for(ValidatedField::Size).is_some());
    }

    #[test]
    fn test_container_disk_needs_image() {
        let v = validate_disk(
            &Disk::disk("rootdisk", None),
            Some(&Volume::container_disk("rootdisk", None)),
            None,
            None,
            &UsedDiskNames::default(),
        );
        assert!(!v.has_all_required_filled);
    }

    #[test]
    fn test_bus_checks() {
        let v = validate_disk(
            &Disk::disk("rootdisk", Some("ide")),
            Some(&Volume::persistent_volume_claim("rootdisk", "pvc")),
            None,
            None,
            &UsedDiskNames::default(),
        );
        assert!(v.error_for(ValidatedField::Bus).is_some());

        let cdrom = Disk {
            name: Some("cd".to_string()),
            cdrom: Some(crate::resources::DiskTarget {
                bus: Some("virtio".to_string()),
            }),
            ..Disk::default()
        };
        let v = validate_disk(
            &cdrom,
            Some(&Volume::persistent_volume_claim("cd", "iso")),
            None,
            None,
            &UsedDiskNames::default(),
        );
        assert!(v.error_for(ValidatedField::Bus).is_some());
    }
}
