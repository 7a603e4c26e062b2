//! Template prefill
//!
//! Rebuilds the template-owned part of the wizard whenever the selected
//! template, the provisioning inputs or the loaded templates change. Rows the
//! user added survive with their allocation; rows a previous prefill created
//! are dropped and recreated.

use crate::actions::Action;
use crate::cloud_init::CloudInitData;
use crate::config::DefaultsSection;
use crate::entries::{IdResolver, NetworkEntry, NetworkType, StorageEntry, StorageType};
use crate::model::{NetworkInterfaceModel, ProvisionSource, CUSTOM_FLAVOR};
use crate::resources::{
    DataVolume, Disk, DiskType, HttpSource, Marker, Network, NetworkInterface, ObjectMeta,
    VirtualMachine, Volume,
};
use crate::state::{SettingsUpdate, WizardState};
use crate::template::{available_flavors, cpu_cores, provision_source_of, Template, TemplateSource};
use log::{debug, warn};
use std::sync::Arc;

/// Everything a prefill pass wants to change
#[derive(Debug, Clone, Default)]
pub struct PrefillUpdate {
    pub settings: Vec<SettingsUpdate>,
    pub networks: Vec<Arc<NetworkEntry>>,
    pub storages: Vec<Arc<StorageEntry>>,
    /// `None` leaves the cloud-init form flag as it is
    pub cloud_init_form: Option<bool>,
}

impl PrefillUpdate {
    pub fn into_actions(self) -> Vec<Action> {
        let mut actions = Vec::with_capacity(4);
        if !self.settings.is_empty() {
            actions.push(Action::UpdateSettings(self.settings));
        }
        actions.push(Action::SetNetworks(self.networks));
        actions.push(Action::SetStorages(self.storages));
        if let Some(is_form) = self.cloud_init_form {
            actions.push(Action::SetCloudInitForm(is_form));
        }
        actions
    }
}

pub fn prefill_vm_template(
    state: &WizardState,
    templates: &dyn TemplateSource,
    defaults: &DefaultsSection,
) -> PrefillUpdate {
    let mut update = PrefillUpdate::default();

    let mut networks: Vec<Arc<NetworkEntry>> = state
        .networks
        .iter()
        .filter(|n| n.kind != NetworkType::Template)
        .cloned()
        .collect();
    let mut network_ids = IdResolver::for_entries(&networks);

    let mut storages: Vec<Arc<StorageEntry>> = state
        .storages
        .iter()
        .filter(|s| !s.kind.is_prefilled() && !s.is_cloud_init())
        .cloned()
        .collect();
    let mut storage_ids = IdResolver::for_entries(&storages);

    if !networks.iter().any(|n| n.is_pod()) {
        networks.insert(0, Arc::new(pod_entry(network_ids.next_id(), defaults)));
    }

    // a new template is never based on a user template
    let template = state
        .settings
        .user_template
        .as_deref()
        .filter(|_| !state.common_data.is_create_template)
        .and_then(|name| templates.find_user_template(name));

    match template {
        Some(template) => {
            debug!("prefilling wizard {} from template {:?}", state.id, template.name());
            let vm = match template.select_vm() {
                Ok(vm) => Some(vm),
                Err(e) => {
                    warn!("Ignoring VM of template {:?}: {}", template.name(), e);
                    None
                }
            };
            update.settings = template_settings(template, vm.as_ref());

            if let Some(vm) = vm {
                let template_networks: Vec<NetworkEntry> = vm
                    .interfaces()
                    .iter()
                    .map(|interface| template_network(network_ids.next_id(), &vm, interface))
                    .collect();

                let has_pod = template_networks.iter().any(NetworkEntry::is_pod);
                if has_pod || !vm.auto_attach_pod_interface() {
                    networks.retain(|n| !n.is_pod());
                }
                networks.extend(template_networks.into_iter().map(Arc::new));

                let (template_storages, cloud_init_form) =
                    template_storages(&vm, &mut storage_ids, defaults);
                update.cloud_init_form = cloud_init_form;
                let mut prefilled: Vec<Arc<StorageEntry>> =
                    template_storages.into_iter().map(Arc::new).collect();
                prefilled.append(&mut storages);
                storages = prefilled;
            }
        }
        None => {
            let flavors = available_flavors(
                templates
                    .user_templates()
                    .iter()
                    .chain(templates.common_templates()),
                state.settings.operating_system.as_deref(),
                state.settings.workload_profile.as_deref(),
            );
            if let [flavor] = flavors.as_slice() {
                update.settings.push(SettingsUpdate::Flavor(Some(flavor.clone())));
            }

            if let Some(entry) = provision_source_storage(state, storage_ids.next_id(), defaults) {
                storages.insert(0, Arc::new(entry));
            }
        }
    }

    update.networks = networks;
    update.storages = storages;
    update
}

fn pod_entry(id: u32, defaults: &DefaultsSection) -> NetworkEntry {
    let mut interface = NetworkInterface::named(defaults.pod_network_name.as_str())
        .with_model(defaults.interface_model.as_str());
    if defaults.pod_binding == "bridge" {
        interface.bridge = Some(Marker {});
    } else {
        interface.masquerade = Some(Marker {});
    }
    NetworkEntry::new(
        id,
        NetworkType::PodDefault,
        Some(Network::pod(defaults.pod_network_name.as_str())),
        interface,
    )
}

fn template_settings(template: &Template, vm: Option<&VirtualMachine>) -> Vec<SettingsUpdate> {
    let flavor = template.flavors().first().map(|f| f.to_string());
    let mut settings = Vec::new();

    if flavor.as_deref() == Some(CUSTOM_FLAVOR) {
        settings.push(SettingsUpdate::Cpu(vm.map(cpu_cores)));
        settings.push(SettingsUpdate::Memory(
            vm.and_then(VirtualMachine::memory).map(str::to_string),
        ));
    }
    settings.push(SettingsUpdate::Flavor(flavor));
    settings.push(SettingsUpdate::OperatingSystem(
        template.operating_systems().first().map(|os| os.to_string()),
    ));
    settings.push(SettingsUpdate::WorkloadProfile(
        template.workload_profiles().first().map(|w| w.to_string()),
    ));
    settings.push(SettingsUpdate::ProvisionSource(
        vm.and_then(provision_source_of),
    ));
    settings
}

fn template_network(id: u32, vm: &VirtualMachine, interface: &NetworkInterface) -> NetworkEntry {
    let network = vm
        .networks()
        .iter()
        .find(|n| n.name.is_some() && n.name == interface.name)
        .cloned();
    let mut interface = interface.clone();
    if interface.model.is_none() {
        interface.model = Some(NetworkInterfaceModel::Virtio.as_str().to_string());
    }
    NetworkEntry::new(id, NetworkType::Template, network, interface)
}

/// Storage rows for the template disks, and the cloud-init form flag when
/// the template carries cloud-init volumes
fn template_storages(
    vm: &VirtualMachine,
    ids: &mut IdResolver,
    defaults: &DefaultsSection,
) -> (Vec<StorageEntry>, Option<bool>) {
    let mut cloud_init_form: Option<bool> = None;

    let entries = vm
        .disks()
        .iter()
        .map(|disk| {
            let mut volume = vm
                .volumes()
                .iter()
                .find(|v| v.name.is_some() && v.name == disk.name)
                .cloned();

            if let Some(source) = volume.as_mut().and_then(|v| v.cloud_init_no_cloud.as_mut()) {
                let is_form = CloudInitData::includes_only_form_values(source);
                if is_form {
                    *source = CloudInitData::make_form_compliant(source);
                }
                cloud_init_form = Some(cloud_init_form.unwrap_or(true) && is_form);
            }

            let data_volume = volume
                .as_ref()
                .and_then(Volume::data_volume_name)
                .and_then(|name| {
                    vm.data_volume_templates()
                        .iter()
                        .find(|dv| dv.name() == Some(name))
                })
                .cloned();

            let mut disk = disk.clone();
            if disk.disk_type() == Some(DiskType::Disk) && disk.bus().is_none() {
                if let Some(target) = disk.disk.as_mut() {
                    target.bus = Some(defaults.disk_bus.clone());
                }
            }

            let kind = if disk.is_first_bootable_device() {
                StorageType::ProvisionSourceTemplateDisk
            } else {
                StorageType::Template
            };
            let mut entry = StorageEntry::new(ids.next_id(), kind, disk, volume);
            entry.data_volume = data_volume;
            entry
        })
        .collect();

    (entries, cloud_init_form)
}

/// Boot disk implied by the provisioning source when no template is used
fn provision_source_storage(
    state: &WizardState,
    id: u32,
    defaults: &DefaultsSection,
) -> Option<StorageEntry> {
    let name = defaults.root_disk_name.as_str();
    let disk = Disk::disk(name, Some(defaults.disk_bus.as_str())).with_boot_order(1);

    match state.provision_source()? {
        ProvisionSource::Url => {
            let mut data_volume = DataVolume {
                metadata: ObjectMeta::named(name),
                ..DataVolume::default()
            }
            .with_size(defaults.root_disk_size.as_str());
            data_volume.spec.source.http = Some(HttpSource {
                url: state.settings.image_url.clone(),
            });
            Some(
                StorageEntry::new(
                    id,
                    StorageType::ProvisionSourceDisk,
                    disk,
                    Some(Volume::data_volume(name, name)),
                )
                .with_data_volume(data_volume),
            )
        }
        ProvisionSource::Container => Some(StorageEntry::new(
            id,
            StorageType::ProvisionSourceDisk,
            disk,
            Some(Volume::container_disk(
                name,
                state.settings.container_image.clone(),
            )),
        )),
        ProvisionSource::Pxe | ProvisionSource::Disk | ProvisionSource::Import => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::Action;
    use crate::reducer::reduce;
    use crate::resources::{CloudInitNoCloudSource, Cpu, ResourceRequirements};
    use crate::state::CommonData;
    use std::collections::BTreeMap;
    use uuid::Uuid;

    fn template(name: &str, labels: &[&str], vm: &VirtualMachine) -> Template {
        let mut metadata = ObjectMeta::named(name);
        metadata.labels = labels
            .iter()
            .map(|l| (l.to_string(), "true".to_string()))
            .collect();
        Template::with_vm(metadata, vm).unwrap()
    }

    fn fedora_vm() -> VirtualMachine {
        let mut vm = VirtualMachine::default();
        let spec = &mut vm.spec.template.spec;
        spec.domain.devices.interfaces = vec![NetworkInterface::named("nic0")];
        spec.networks = vec![Network::multus("nic0", "br1")];
        spec.domain.devices.disks = vec![
            Disk::disk("rootdisk", None).with_boot_order(1),
            Disk::disk("cloudinitdisk", Some("virtio")),
        ];
        spec.volumes = vec![
            Volume::container_disk("rootdisk", Some("quay.io/fedora".to_string())),
            Volume::cloud_init(
                "cloudinitdisk",
                CloudInitNoCloudSource {
                    user_data: Some("#cloud-config\nuser: fedora\npassword: secret".to_string()),
                    ..CloudInitNoCloudSource::default()
                },
            ),
        ];
        vm
    }

    fn state_with(common: CommonData, updates: Vec<SettingsUpdate>) -> WizardState {
        let state = WizardState::new(Uuid::new_v4(), common);
        reduce(&state, &Action::UpdateSettings(updates))
    }

    fn user_input_nic(state: &WizardState, name: &str) -> WizardState {
        reduce(
            state,
            &Action::AddNetwork {
                network: Some(Network::multus(name, "br9")),
                network_interface: NetworkInterface::named(name),
            },
        )
    }

    #[test]
    fn test_no_template_adds_pod_network() {
        let state = state_with(CommonData::default(), Vec::new());
        let update = prefill_vm_template(&state, state.common_data.as_ref(), &DefaultsSection::default());
        assert_eq!(update.networks.len(), 1);
        let pod = &update.networks[0];
        assert_eq!(pod.kind, NetworkType::PodDefault);
        assert!(pod.network_interface.masquerade.is_some());
        assert_eq!(pod.network_interface.model.as_deref(), Some("virtio"));
        assert!(update.storages.is_empty());
        assert_eq!(update.cloud_init_form, None);
    }

    #[test]
    fn test_user_rows_keep_identity() {
        let state = user_input_nic(&state_with(CommonData::default(), Vec::new()), "eth1");
        let update = prefill_vm_template(&state, state.common_data.as_ref(), &DefaultsSection::default());
        assert_eq!(update.networks.len(), 2);
        assert_eq!(update.networks[0].kind, NetworkType::PodDefault);
        assert!(Arc::ptr_eq(&update.networks[1], &state.networks[0]));
        assert!(update.networks[0].id > state.networks[0].id);
    }

    #[test]
    fn test_template_prefill() {
        let common = CommonData {
            user_templates: vec![template(
                "fedora-small",
                &[
                    "flavor.template.kubevirt.io/small",
                    "os.template.kubevirt.io/fedora31",
                    "workload.template.kubevirt.io/server",
                ],
                &fedora_vm(),
            )],
            ..CommonData::default()
        };
        let state = state_with(
            common,
            vec![SettingsUpdate::UserTemplate(Some("fedora-small".to_string()))],
        );
        let state = user_input_nic(&state, "eth1");

        let update = prefill_vm_template(&state, state.common_data.as_ref(), &DefaultsSection::default());

        assert!(update.settings.contains(&SettingsUpdate::Flavor(Some("small".to_string()))));
        assert!(update
            .settings
            .contains(&SettingsUpdate::OperatingSystem(Some("fedora31".to_string()))));
        assert!(update
            .settings
            .contains(&SettingsUpdate::ProvisionSource(Some(ProvisionSource::Container))));
        assert!(!update.settings.iter().any(|s| matches!(s, SettingsUpdate::Cpu(_))));

        let kinds: Vec<NetworkType> = update.networks.iter().map(|n| n.kind).collect();
        assert_eq!(
            kinds,
            vec![NetworkType::PodDefault, NetworkType::UserInput, NetworkType::Template]
        );
        let template_nic = &update.networks[2];
        assert_eq!(template_nic.network_interface.model.as_deref(), Some("virtio"));
        assert_eq!(template_nic.multus_network_name(), Some("br1"));

        assert_eq!(update.storages.len(), 2);
        assert_eq!(update.storages[0].kind, StorageType::ProvisionSourceTemplateDisk);
        assert_eq!(update.storages[0].disk.bus(), Some("virtio"));
        assert_eq!(update.storages[1].kind, StorageType::Template);
        assert_eq!(update.cloud_init_form, Some(true));
        let user_data = update.storages[1]
            .volume
            .as_ref()
            .and_then(|v| v.cloud_init_no_cloud.as_ref())
            .and_then(|c| c.user_data.as_deref())
            .unwrap();
        assert!(user_data.starts_with("#cloud-config"));
    }

    #[test]
    fn test_create_template_ignores_user_template() {
        let common = CommonData {
            user_templates: vec![template(
                "fedora-small",
                &["os.template.kubevirt.io/fedora31"],
                &fedora_vm(),
            )],
            is_create_template: true,
            ..CommonData::default()
        };
        let state = state_with(
            common,
            vec![SettingsUpdate::UserTemplate(Some("fedora-small".to_string()))],
        );

        let update = prefill_vm_template(&state, state.common_data.as_ref(), &DefaultsSection::default());
        assert!(!update
            .settings
            .iter()
            .any(|s| matches!(s, SettingsUpdate::OperatingSystem(_))));
        assert!(update.networks.iter().all(|n| n.kind != NetworkType::Template));
        assert!(update.storages.is_empty());
        assert_eq!(update.cloud_init_form, None);
    }

    #[test]
    fn test_template_pod_network_replaces_default() {
        let mut vm = fedora_vm();
        vm.spec.template.spec.networks = vec![Network::pod("nic0")];
        let common = CommonData {
            user_templates: vec![template("pod-template", &[], &vm)],
            ..CommonData::default()
        };
        let state = state_with(
            common,
            vec![SettingsUpdate::UserTemplate(Some("pod-template".to_string()))],
        );
        let update = prefill_vm_template(&state, state.common_data.as_ref(), &DefaultsSection::default());
        assert_eq!(update.networks.len(), 1);
        assert_eq!(update.networks[0].kind, NetworkType::Template);
        assert!(update.networks[0].is_pod());
    }

    #[test]
    fn test_no_auto_attach_drops_pod_network() {
        let mut vm = fedora_vm();
        vm.spec.template.spec.domain.devices.autoattach_pod_interface = Some(false);
        let common = CommonData {
            user_templates: vec![template("no-pod", &[], &vm)],
            ..CommonData::default()
        };
        let state = state_with(common, vec![SettingsUpdate::UserTemplate(Some("no-pod".to_string()))]);
        let update = prefill_vm_template(&state, state.common_data.as_ref(), &DefaultsSection::default());
        assert!(!update.networks.iter().any(|n| n.is_pod()));
    }

    #[test]
    fn test_one_yaml_only_cloud_init_disables_form() {
        let mut vm = fedora_vm();
        let spec = &mut vm.spec.template.spec;
        spec.domain.devices.disks.push(Disk::disk("extra-ci", Some("virtio")));
        spec.volumes.push(Volume::cloud_init(
            "extra-ci",
            CloudInitNoCloudSource {
                user_data: Some("#cloud-config\nruncmd:\n  - [ls, -l]\nwrite_files:\n  - path: /x\n    content: y".to_string()),
                ..CloudInitNoCloudSource::default()
            },
        ));
        let common = CommonData {
            user_templates: vec![template("mixed", &[], &vm)],
            ..CommonData::default()
        };
        let state = state_with(common, vec![SettingsUpdate::UserTemplate(Some("mixed".to_string()))]);
        let update = prefill_vm_template(&state, state.common_data.as_ref(), &DefaultsSection::default());
        assert_eq!(update.cloud_init_form, Some(false));
    }

    #[test]
    fn test_custom_flavor_reads_cpu_and_memory() {
        let mut vm = fedora_vm();
        let domain = &mut vm.spec.template.spec.domain;
        domain.cpu = Some(Cpu {
            cores: Some(4),
            ..Cpu::default()
        });
        domain.resources = Some(ResourceRequirements {
            requests: BTreeMap::from([("memory".to_string(), "4Gi".to_string())]),
        });
        let common = CommonData {
            user_templates: vec![template("custom", &["flavor.template.kubevirt.io/Custom"], &vm)],
            ..CommonData::default()
        };
        let state = state_with(common, vec![SettingsUpdate::UserTemplate(Some("custom".to_string()))]);
        let update = prefill_vm_template(&state, state.common_data.as_ref(), &DefaultsSection::default());
        assert!(update.settings.contains(&SettingsUpdate::Cpu(Some(4))));
        assert!(update.settings.contains(&SettingsUpdate::Memory(Some("4Gi".to_string()))));
    }

    #[test]
    fn test_url_source_prepends_boot_disk() {
        let state = state_with(
            CommonData::default(),
            vec![
                SettingsUpdate::ProvisionSource(Some(ProvisionSource::Url)),
                SettingsUpdate::ImageUrl(Some("https://example.com/fedora.qcow2".to_string())),
            ],
        );
        let defaults = DefaultsSection::default();
        let update = prefill_vm_template(&state, state.common_data.as_ref(), &defaults);
        assert_eq!(update.storages.len(), 1);
        let root = &update.storages[0];
        assert_eq!(root.kind, StorageType::ProvisionSourceDisk);
        assert!(root.disk.is_first_bootable_device());
        let dv = root.data_volume.as_ref().unwrap();
        assert_eq!(dv.size(), Some(defaults.root_disk_size.as_str()));
        assert_eq!(
            dv.spec.source.http.as_ref().and_then(|h| h.url.as_deref()),
            Some("https://example.com/fedora.qcow2")
        );
    }

    #[test]
    fn test_single_available_flavor_is_selected() {
        let common = CommonData {
            common_templates: vec![
                template(
                    "fedora-small",
                    &["flavor.template.kubevirt.io/small", "os.template.kubevirt.io/fedora31"],
                    &fedora_vm(),
                ),
                template(
                    "rhel-large",
                    &["flavor.template.kubevirt.io/large", "os.template.kubevirt.io/rhel8"],
                    &fedora_vm(),
                ),
            ],
            ..CommonData::default()
        };
        let state = state_with(
            common,
            vec![SettingsUpdate::OperatingSystem(Some("fedora31".to_string()))],
        );
        let update = prefill_vm_template(&state, state.common_data.as_ref(), &DefaultsSection::default());
        assert_eq!(update.settings, vec![SettingsUpdate::Flavor(Some("small".to_string()))]);

        let state = reduce(
            &state,
            &Action::UpdateSettings(vec![SettingsUpdate::OperatingSystem(None)]),
        );
        let update = prefill_vm_template(&state, state.common_data.as_ref(), &DefaultsSection::default());
        assert!(update.settings.is_empty());
    }

    #[test]
    fn test_into_actions_skips_empty_settings() {
        let actions = PrefillUpdate::default().into_actions();
        let names: Vec<&str> = actions.iter().map(Action::name).collect();
        assert_eq!(names, vec!["SetNetworks", "SetStorages"]);
    }
}
