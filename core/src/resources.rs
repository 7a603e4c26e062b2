//! KubeVirt and Kubernetes value records the wizard works on
//!
//! These mirror the JSON shape of the API objects (camelCase, optional
//! sibling fields for "one of" choices) so templates fetched from a cluster
//! deserialize directly. Only the fields the wizard reads are modelled.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Empty marker object, e.g. `pod: {}` or `masquerade: {}`
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Marker {}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    pub name: Option<String>,
    pub namespace: Option<String>,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    #[serde(default)]
    pub annotations: BTreeMap<String, String>,
}

impl ObjectMeta {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }
}

// ==================== Networks ====================

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultusNetwork {
    pub network_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Network {
    pub name: Option<String>,
    pub pod: Option<Marker>,
    pub multus: Option<MultusNetwork>,
}

impl Network {
    pub fn pod(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            pod: Some(Marker {}),
            multus: None,
        }
    }

    pub fn multus(name: impl Into<String>, network_name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            pod: None,
            multus: Some(MultusNetwork {
                network_name: Some(network_name.into()),
            }),
        }
    }

    pub fn is_pod(&self) -> bool {
        self.pod.is_some()
    }

    /// The network attachment definition name, if this is a multus network
    pub fn multus_network_name(&self) -> Option<&str> {
        self.multus.as_ref()?.network_name.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkInterface {
    pub name: Option<String>,
    pub model: Option<String>,
    pub mac_address: Option<String>,
    pub boot_order: Option<u32>,
    pub bridge: Option<Marker>,
    pub masquerade: Option<Marker>,
    pub sriov: Option<Marker>,
}

impl NetworkInterface {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_boot_order(mut self, boot_order: u32) -> Self {
        self.boot_order = Some(boot_order);
        self
    }

    pub fn is_first_bootable_device(&self) -> bool {
        self.boot_order == Some(1)
    }
}

// ==================== Disks and volumes ====================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiskType {
    Disk,
    Cdrom,
    Floppy,
    Lun,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DiskTarget {
    pub bus: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Disk {
    pub name: Option<String>,
    pub boot_order: Option<u32>,
    pub disk: Option<DiskTarget>,
    pub cdrom: Option<DiskTarget>,
    pub floppy: Option<Marker>,
    pub lun: Option<DiskTarget>,
}

impl Disk {
    /// A regular disk device on the given bus
    pub fn disk(name: impl Into<String>, bus: Option<&str>) -> Self {
        Self {
            name: Some(name.into()),
            disk: Some(DiskTarget {
                bus: bus.map(str::to_string),
            }),
            ..Self::default()
        }
    }

    pub fn with_boot_order(mut self, boot_order: u32) -> Self {
        self.boot_order = Some(boot_order);
        self
    }

    pub fn disk_type(&self) -> Option<DiskType> {
        if self.disk.is_some() {
            Some(DiskType::Disk)
        } else if self.cdrom.is_some() {
            Some(DiskType::Cdrom)
        } else if self.floppy.is_some() {
            Some(DiskType::Floppy)
        } else if self.lun.is_some() {
            Some(DiskType::Lun)
        } else {
            None
        }
    }

    pub fn bus(&self) -> Option<&str> {
        let target = match self.disk_type()? {
            DiskType::Disk => self.disk.as_ref(),
            DiskType::Cdrom => self.cdrom.as_ref(),
            DiskType::Lun => self.lun.as_ref(),
            DiskType::Floppy => None,
        };
        target?.bus.as_deref()
    }

    pub fn is_first_bootable_device(&self) -> bool {
        self.boot_order == Some(1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeType {
    ContainerDisk,
    DataVolume,
    PersistentVolumeClaim,
    CloudInitNoCloud,
    EmptyDisk,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ContainerDiskSource {
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DataVolumeRef {
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimRef {
    pub claim_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecretRef {
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudInitNoCloudSource {
    pub user_data: Option<String>,
    pub user_data_base64: Option<String>,
    pub network_data: Option<String>,
    pub secret_ref: Option<SecretRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EmptyDiskSource {
    pub capacity: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Volume {
    pub name: Option<String>,
    pub container_disk: Option<ContainerDiskSource>,
    pub data_volume: Option<DataVolumeRef>,
    pub persistent_volume_claim: Option<ClaimRef>,
    pub cloud_init_no_cloud: Option<CloudInitNoCloudSource>,
    pub empty_disk: Option<EmptyDiskSource>,
}

impl Volume {
    pub fn data_volume(name: impl Into<String>, data_volume_name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            data_volume: Some(DataVolumeRef {
                name: Some(data_volume_name.into()),
            }),
            ..Self::default()
        }
    }

    pub fn persistent_volume_claim(name: impl Into<String>, claim_name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            persistent_volume_claim: Some(ClaimRef {
                claim_name: Some(claim_name.into()),
            }),
            ..Self::default()
        }
    }

    pub fn container_disk(name: impl Into<String>, image: Option<String>) -> Self {
        Self {
            name: Some(name.into()),
            container_disk: Some(ContainerDiskSource { image }),
            ..Self::default()
        }
    }

    pub fn cloud_init(name: impl Into<String>, source: CloudInitNoCloudSource) -> Self {
        Self {
            name: Some(name.into()),
            cloud_init_no_cloud: Some(source),
            ..Self::default()
        }
    }

    pub fn volume_type(&self) -> Option<VolumeType> {
        if self.container_disk.is_some() {
            Some(VolumeType::ContainerDisk)
        } else if self.data_volume.is_some() {
            Some(VolumeType::DataVolume)
        } else if self.persistent_volume_claim.is_some() {
            Some(VolumeType::PersistentVolumeClaim)
        } else if self.cloud_init_no_cloud.is_some() {
            Some(VolumeType::CloudInitNoCloud)
        } else if self.empty_disk.is_some() {
            Some(VolumeType::EmptyDisk)
        } else {
            None
        }
    }

    pub fn data_volume_name(&self) -> Option<&str> {
        self.data_volume.as_ref()?.name.as_deref()
    }

    /// True when the volume is backed by a data volume or a PVC
    pub fn is_claim_backed(&self) -> bool {
        self.data_volume.is_some() || self.persistent_volume_claim.is_some()
    }
}

// ==================== Data volumes and claims ====================

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HttpSource {
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PvcSource {
    pub name: Option<String>,
    pub namespace: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RegistrySource {
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DataVolumeSource {
    pub http: Option<HttpSource>,
    pub pvc: Option<PvcSource>,
    pub blank: Option<Marker>,
    pub registry: Option<RegistrySource>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResourceRequirements {
    #[serde(default)]
    pub requests: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimSpec {
    #[serde(default)]
    pub access_modes: Vec<String>,
    #[serde(default)]
    pub resources: ResourceRequirements,
    pub storage_class_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DataVolumeSpec {
    #[serde(default)]
    pub source: DataVolumeSource,
    pub pvc: Option<ClaimSpec>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DataVolume {
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: DataVolumeSpec,
}

impl DataVolume {
    pub fn name(&self) -> Option<&str> {
        self.metadata.name.as_deref()
    }

    /// Requested storage size, e.g. `15Gi`
    pub fn size(&self) -> Option<&str> {
        self.spec
            .pvc
            .as_ref()?
            .resources
            .requests
            .get("storage")
            .map(String::as_str)
    }

    pub fn with_size(mut self, size: impl Into<String>) -> Self {
        self.spec
            .pvc
            .get_or_insert_with(ClaimSpec::default)
            .resources
            .requests
            .insert("storage".to_string(), size.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PersistentVolumeClaim {
    #[serde(default)]
    pub metadata: ObjectMeta,
}

/// Parse a Kubernetes quantity such as `15Gi`, `1.5Gi` or `500M` into bytes.
/// Fractional bytes round up.
pub fn parse_quantity(quantity: &str) -> Option<u64> {
    let quantity = quantity.trim();
    let split = quantity
        .find(|c: char| !c.is_ascii_digit() && c != '.')
        .unwrap_or(quantity.len());
    let (number, suffix) = quantity.split_at(split);
    let (whole, fraction) = number.split_once('.').unwrap_or((number, ""));
    if whole.is_empty() && fraction.is_empty() {
        return None;
    }
    if fraction.len() > 18 || !fraction.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let multiplier: u128 = match suffix {
        "" => 1,
        "Ki" => 1 << 10,
        "Mi" => 1 << 20,
        "Gi" => 1 << 30,
        "Ti" => 1 << 40,
        "K" | "k" => 1_000,
        "M" => 1_000_000,
        "G" => 1_000_000_000,
        "T" => 1_000_000_000_000,
        _ => return None,
    };

    let whole: u128 = if whole.is_empty() { 0 } else { whole.parse().ok()? };
    let mut bytes = whole.checked_mul(multiplier)?;
    if !fraction.is_empty() {
        let scale = 10u128.pow(fraction.len() as u32);
        let fraction: u128 = fraction.parse().ok()?;
        bytes = bytes.checked_add((fraction * multiplier + scale - 1) / scale)?;
    }
    u64::try_from(bytes).ok()
}

// ==================== Virtual machines ====================

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Cpu {
    pub cores: Option<u32>,
    pub sockets: Option<u32>,
    pub threads: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Devices {
    #[serde(default)]
    pub disks: Vec<Disk>,
    #[serde(default)]
    pub interfaces: Vec<NetworkInterface>,
    pub autoattach_pod_interface: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DomainSpec {
    pub cpu: Option<Cpu>,
    pub resources: Option<ResourceRequirements>,
    #[serde(default)]
    pub devices: Devices,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InstanceSpec {
    #[serde(default)]
    pub domain: DomainSpec,
    #[serde(default)]
    pub networks: Vec<Network>,
    #[serde(default)]
    pub volumes: Vec<Volume>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InstanceTemplate {
    #[serde(default)]
    pub spec: InstanceSpec,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualMachineSpec {
    #[serde(default)]
    pub template: InstanceTemplate,
    #[serde(default)]
    pub data_volume_templates: Vec<DataVolume>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VirtualMachine {
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: VirtualMachineSpec,
}

impl VirtualMachine {
    pub fn disks(&self) -> &[Disk] {
        &self.spec.template.spec.domain.devices.disks
    }

    pub fn interfaces(&self) -> &[NetworkInterface] {
        &self.spec.template.spec.domain.devices.interfaces
    }

    pub fn networks(&self) -> &[Network] {
        &self.spec.template.spec.networks
    }

    pub fn volumes(&self) -> &[Volume] {
        &self.spec.template.spec.volumes
    }

    pub fn data_volume_templates(&self) -> &[DataVolume] {
        &self.spec.data_volume_templates
    }

    /// Whether KubeVirt adds a pod interface on its own (defaults to yes)
    pub fn auto_attach_pod_interface(&self) -> bool {
        self.spec
            .template
            .spec
            .domain
            .devices
            .autoattach_pod_interface
            .unwrap_or(true)
    }

    pub fn cpu_cores(&self) -> Option<u32> {
        self.spec.template.spec.domain.cpu.as_ref()?.cores
    }

    pub fn memory(&self) -> Option<&str> {
        self.spec
            .template
            .spec
            .domain
            .resources
            .as_ref()?
            .requests
            .get("memory")
            .map(String::as_str)
    }
}
