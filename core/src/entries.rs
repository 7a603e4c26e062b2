//! Network and storage rows of the wizard
//!
//! Rows are shared as `Arc`s. A row that did not change keeps its
//! allocation across reductions, which is what change detection compares.

use crate::resources::{DataVolume, Disk, Network, NetworkInterface, PersistentVolumeClaim, Volume};
use crate::validation::EntryValidation;
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;

pub type EntryId = u32;

/// Where a network row came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NetworkType {
    Template,
    PodDefault,
    UserInput,
    Imported,
}

/// Where a storage row came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StorageType {
    Template,
    ProvisionSourceTemplateDisk,
    ProvisionSourceDisk,
    UserInput,
    Imported,
    GuestTools,
}

impl StorageType {
    /// Rows that a template prefill owns and replaces wholesale
    pub fn is_prefilled(&self) -> bool {
        matches!(
            self,
            StorageType::Template
                | StorageType::ProvisionSourceTemplateDisk
                | StorageType::ProvisionSourceDisk
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkEntry {
    pub id: EntryId,
    #[serde(rename = "type")]
    pub kind: NetworkType,
    pub network: Option<Network>,
    pub network_interface: NetworkInterface,
    #[serde(default)]
    pub validation: Option<EntryValidation>,
}

impl NetworkEntry {
    pub fn new(
        id: EntryId,
        kind: NetworkType,
        network: Option<Network>,
        network_interface: NetworkInterface,
    ) -> Self {
        Self {
            id,
            kind,
            network,
            network_interface,
            validation: None,
        }
    }

    pub fn is_pod(&self) -> bool {
        self.network.as_ref().is_some_and(Network::is_pod)
    }

    pub fn interface_name(&self) -> Option<&str> {
        self.network_interface.name.as_deref()
    }

    pub fn multus_network_name(&self) -> Option<&str> {
        self.network.as_ref()?.multus_network_name()
    }

    pub fn with_validation(&self, validation: EntryValidation) -> Self {
        Self {
            validation: Some(validation),
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageEntry {
    pub id: EntryId,
    #[serde(rename = "type")]
    pub kind: StorageType,
    pub disk: Disk,
    pub volume: Option<Volume>,
    pub data_volume: Option<DataVolume>,
    pub persistent_volume_claim: Option<PersistentVolumeClaim>,
    #[serde(default)]
    pub validation: Option<EntryValidation>,
}

impl StorageEntry {
    pub fn new(id: EntryId, kind: StorageType, disk: Disk, volume: Option<Volume>) -> Self {
        Self {
            id,
            kind,
            disk,
            volume,
            data_volume: None,
            persistent_volume_claim: None,
            validation: None,
        }
    }

    pub fn with_data_volume(mut self, data_volume: DataVolume) -> Self {
        self.data_volume = Some(data_volume);
        self
    }

    pub fn disk_name(&self) -> Option<&str> {
        self.disk.name.as_deref()
    }

    pub fn data_volume_name(&self) -> Option<&str> {
        self.data_volume.as_ref()?.name()
    }

    pub fn is_cloud_init(&self) -> bool {
        self.volume
            .as_ref()
            .is_some_and(|v| v.cloud_init_no_cloud.is_some())
    }

    pub fn with_validation(&self, validation: EntryValidation) -> Self {
        Self {
            validation: Some(validation),
            ..self.clone()
        }
    }
}

/// Something a list of rows can be keyed by
pub trait Identified {
    fn id(&self) -> EntryId;
}

impl Identified for NetworkEntry {
    fn id(&self) -> EntryId {
        self.id
    }
}

impl Identified for StorageEntry {
    fn id(&self) -> EntryId {
        self.id
    }
}

/// Hands out ids above every id already present in a list. Once the id
/// space above the maximum is used up, the lowest free id is taken instead.
#[derive(Debug, Clone)]
pub struct IdResolver {
    next: Option<EntryId>,
    taken: BTreeSet<EntryId>,
}

impl IdResolver {
    pub fn for_entries<T: Identified>(entries: &[Arc<T>]) -> Self {
        let taken: BTreeSet<EntryId> = entries.iter().map(|e| e.id()).collect();
        let next = match taken.last() {
            Some(max) => max.checked_add(1),
            None => Some(1),
        };
        Self { next, taken }
    }

    pub fn next_id(&mut self) -> EntryId {
        let id = match self.next {
            Some(id) => {
                self.next = id.checked_add(1);
                id
            }
            None => {
                let id = self.lowest_free();
                warn!("Entry ids exhausted above the maximum, reusing free id {}", id);
                id
            }
        };
        self.taken.insert(id);
        id
    }

    fn lowest_free(&self) -> EntryId {
        let mut candidate: EntryId = 1;
        for &id in self.taken.range(1..) {
            if id != candidate {
                break;
            }
            candidate = candidate.saturating_add(1);
        }
        candidate
    }
}
