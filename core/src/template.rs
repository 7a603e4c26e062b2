//! VM templates and what can be read off them
//!
//! Templates are OpenShift `Template` objects whose `objects` contain a
//! KubeVirt `VirtualMachine`. Flavor, OS and workload are advertised
//! through labels of the form `<prefix>/<value>: "true"`.

use crate::model::ProvisionSource;
use crate::resources::{ObjectMeta, VirtualMachine, VolumeType};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub const TEMPLATE_FLAVOR_LABEL: &str = "flavor.template.kubevirt.io";
pub const TEMPLATE_OS_LABEL: &str = "os.template.kubevirt.io";
pub const TEMPLATE_WORKLOAD_LABEL: &str = "workload.template.kubevirt.io";
pub const TEMPLATE_TYPE_LABEL: &str = "template.kubevirt.io/type";
pub const TEMPLATE_TYPE_BASE: &str = "base";

const DEFAULT_CPU_CORES: u32 = 1;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Template {
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub objects: Vec<serde_json::Value>,
}

impl Template {
    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn name(&self) -> Option<&str> {
        self.metadata.name.as_deref()
    }

    /// Build a template around a single VM, mostly for tests and fixtures
    pub fn with_vm(metadata: ObjectMeta, vm: &VirtualMachine) -> Result<Self> {
        let mut object = serde_json::to_value(vm)?;
        if let Some(map) = object.as_object_mut() {
            map.insert("kind".to_string(), "VirtualMachine".into());
        }
        Ok(Self {
            metadata,
            objects: vec![object],
        })
    }

    pub fn is_common(&self) -> bool {
        self.metadata.labels.get(TEMPLATE_TYPE_LABEL).map(String::as_str)
            == Some(TEMPLATE_TYPE_BASE)
    }

    /// The VirtualMachine this template instantiates
    pub fn select_vm(&self) -> Result<VirtualMachine> {
        let object = self
            .objects
            .iter()
            .find(|o| o.get("kind").and_then(|k| k.as_str()) == Some("VirtualMachine"))
            .ok_or_else(|| {
                Error::template(format!(
                    "Template '{}' has no VirtualMachine object",
                    self.name().unwrap_or_default()
                ))
            })?;
        Ok(serde_json::from_value(object.clone())?)
    }

    fn label_values(&self, prefix: &str) -> Vec<&str> {
        self.metadata
            .labels
            .iter()
            .filter(|(_, value)| value.as_str() == "true")
            .filter_map(|(key, _)| key.strip_prefix(prefix)?.strip_prefix('/'))
            .collect()
    }

    pub fn flavors(&self) -> Vec<&str> {
        self.label_values(TEMPLATE_FLAVOR_LABEL)
    }

    pub fn operating_systems(&self) -> Vec<&str> {
        self.label_values(TEMPLATE_OS_LABEL)
    }

    pub fn workload_profiles(&self) -> Vec<&str> {
        self.label_values(TEMPLATE_WORKLOAD_LABEL)
    }

    fn matches(&self, os: Option<&str>, workload: Option<&str>) -> bool {
        os.map_or(true, |os| self.operating_systems().contains(&os))
            && workload.map_or(true, |w| self.workload_profiles().contains(&w))
    }
}

/// Read-only access to the templates a wizard session can prefill from
pub trait TemplateSource {
    fn user_templates(&self) -> &[Template];

    fn common_templates(&self) -> &[Template];

    fn find_user_template(&self, name: &str) -> Option<&Template> {
        self.user_templates()
            .iter()
            .find(|t| t.name() == Some(name))
    }
}

/// Flavors offered by the templates matching the chosen OS and workload
pub fn available_flavors<'a>(
    templates: impl IntoIterator<Item = &'a Template>,
    os: Option<&str>,
    workload: Option<&str>,
) -> Vec<String> {
    templates
        .into_iter()
        .filter(|t| t.matches(os, workload))
        .flat_map(|t| t.flavors())
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// CPU cores requested by a VM, falling back to a single core
pub fn cpu_cores(vm: &VirtualMachine) -> u32 {
    vm.cpu_cores().unwrap_or(DEFAULT_CPU_CORES)
}

/// Work out how a template VM boots
pub fn provision_source_of(vm: &VirtualMachine) -> Option<ProvisionSource> {
    if vm.interfaces().iter().any(|i| i.is_first_bootable_device()) {
        return Some(ProvisionSource::Pxe);
    }

    let boot_disk = vm.disks().iter().find(|d| d.is_first_bootable_device())?;
    let volume = vm
        .volumes()
        .iter()
        .find(|v| v.name.is_some() && v.name == boot_disk.name)?;

    match volume.volume_type()? {
        VolumeType::ContainerDisk => Some(ProvisionSource::Container),
        VolumeType::PersistentVolumeClaim => Some(ProvisionSource::Disk),
        VolumeType::DataVolume => {
            let template = vm
                .data_volume_templates()
                .iter()
                .find(|dv| dv.name().is_some() && dv.name() == volume.data_volume_name());
            match template {
                Some(dv) if dv.spec.source.http.is_some() => Some(ProvisionSource::Url),
                Some(dv) if dv.spec.source.pvc.is_some() => Some(ProvisionSource::Disk),
                Some(_) => None,
                // Existing data volume outside the template
                None => Some(ProvisionSource::Disk),
            }
        }
        VolumeType::CloudInitNoCloud | VolumeType::EmptyDisk => None,
    }
}
