use std::collections::BTreeSet;

use crate::api::Session;
use crate::config::{StorageConfig, VMID_MAX};
use crate::model::{StorageStatus, StorageVolume, VirtualMachine, find_vm};
use crate::util::{bracket_list, bytes_to_gib, format_gib};

use super::{CheckKind, CheckResult};

/// How many VMs to list when the template is missing.
const LISTED_VMS: usize = 10;

// ── permissions ──────────────────────────────────────────

pub async fn permissions<S: Session>(session: &S, node: &str) -> CheckResult {
    let mut result = CheckResult::new(CheckKind::Permissions);

    let nodes = match session.list_nodes().await {
        Ok(nodes) => nodes,
        Err(err) => return result.error("Cannot list nodes", &err),
    };
    let names: Vec<&str> = nodes.iter().map(|n| n.name.as_str()).collect();
    result.ok(format!("Can list nodes: {}", bracket_list(&names)));

    if !names.contains(&node) {
        result.fail(format!("Node '{node}' not found"));
        result.info(format!("Available nodes: {}", bracket_list(&names)));
        result.action("Set [proxmox] node (or --node) to one of the available nodes");
        return result.fail_with(format!("node '{node}' not found"));
    }
    result.ok(format!("Node '{node}' found"));

    match session.list_vms(node).await {
        Ok(vms) => result.ok(format!("Can list VMs: {} VMs found", vms.len())),
        Err(err) => return result.error("Cannot list VMs", &err),
    }

    match session.list_storage(node).await {
        Ok(storage) => {
            let names: Vec<&str> = storage.iter().map(|s| s.name.as_str()).collect();
            result.ok(format!("Can list storage: {}", bracket_list(&names)));
        }
        Err(err) => return result.error("Cannot list storage", &err),
    }

    result.pass_with("user can list nodes, VMs and storage")
}

// ── template ─────────────────────────────────────────────

#[derive(Debug, PartialEq, Eq)]
pub enum TemplateLookup<'a> {
    Ready(&'a VirtualMachine),
    /// A VM holds the id but is not flagged as a template.
    NotTemplate(&'a VirtualMachine),
    Missing,
}

pub fn lookup_template(vms: &[VirtualMachine], template_id: u32) -> TemplateLookup<'_> {
    match find_vm(vms, template_id) {
        Some(vm) if vm.is_template => TemplateLookup::Ready(vm),
        Some(vm) => TemplateLookup::NotTemplate(vm),
        None => TemplateLookup::Missing,
    }
}

pub async fn template<S: Session>(
    session: &S,
    node: &str,
    template_id: u32,
    host: &str,
) -> CheckResult {
    match session.list_vms(node).await {
        Ok(vms) => evaluate_template(&vms, template_id, host),
        Err(err) => CheckResult::new(CheckKind::Template).error("Template test failed", &err),
    }
}

pub fn evaluate_template(vms: &[VirtualMachine], template_id: u32, host: &str) -> CheckResult {
    let mut result = CheckResult::new(CheckKind::Template);
    result.info(format!("Looking for template ID: {template_id}"));

    match lookup_template(vms, template_id) {
        TemplateLookup::Ready(vm) => {
            result.ok(format!("Template {template_id} found"));
            result.info(format!("Name: {}", vm.display_name()));
            result.info(format!("Status: {}", vm.status));
            result.ok(format!("VM {template_id} is a template"));
            result.pass_with(format!("template {template_id} ready"))
        }
        TemplateLookup::NotTemplate(vm) => {
            result.ok(format!("VM {template_id} exists"));
            result.info(format!("Name: {}", vm.display_name()));
            result.info(format!("Status: {}", vm.status));
            result.warn(format!("VM {template_id} exists but is NOT a template"));
            result.action(format!(
                "Convert it to a template: ssh root@{host} 'qm template {template_id}'"
            ));
            result.action("Or set [template] id (or --template-id) to an existing template");
            result.fail_with(format!("VM {template_id} exists but is NOT a template"))
        }
        TemplateLookup::Missing => {
            result.fail(format!("Template {template_id} not found"));
            if vms.is_empty() {
                result.info("No VMs or templates exist on this node");
            } else {
                result.info("Available VMs/Templates:");
                let mut sorted: Vec<&VirtualMachine> = vms.iter().collect();
                sorted.sort_by_key(|vm| vm.vmid);
                for vm in sorted.into_iter().take(LISTED_VMS) {
                    let kind = if vm.is_template { "TEMPLATE" } else { "VM" };
                    result.info(format!(
                        "  {kind:<8} - ID: {:>3} - Name: {}",
                        vm.vmid,
                        vm.display_name()
                    ));
                }
            }
            result.action(
                "Set [template] id (or --template-id) to one of the template IDs above",
            );
            result.fail_with(format!("Template {template_id} not found"))
        }
    }
}

// ── target vmids ─────────────────────────────────────────

#[derive(Debug, Default, PartialEq, Eq)]
pub struct TargetAvailability {
    pub available: Vec<u32>,
    /// Conflicting vmid and the name of the VM that holds it.
    pub conflicts: Vec<(u32, String)>,
}

/// Examine every candidate, in the order given.
pub fn partition_targets(vms: &[VirtualMachine], candidates: &[u32]) -> TargetAvailability {
    let mut out = TargetAvailability::default();
    for &vmid in candidates {
        match find_vm(vms, vmid) {
            Some(vm) => out.conflicts.push((vmid, vm.display_name().to_string())),
            None => out.available.push(vmid),
        }
    }
    out
}

/// First `count` unused vmids in the next hundred-block above `after`.
///
/// `after = 203` starts the search at 301.
pub fn suggest_free_ids(vms: &[VirtualMachine], after: u32, count: usize) -> Vec<u32> {
    let used: BTreeSet<u32> = vms.iter().map(|vm| vm.vmid).collect();
    let start = (after / 100 + 1).saturating_mul(100).saturating_add(1);
    (start..=VMID_MAX)
        .filter(|id| !used.contains(id))
        .take(count)
        .collect()
}

pub async fn target_ids<S: Session>(
    session: &S,
    node: &str,
    candidates: &[u32],
    host: &str,
) -> CheckResult {
    match session.list_vms(node).await {
        Ok(vms) => evaluate_targets(&vms, candidates, host),
        Err(err) => CheckResult::new(CheckKind::TargetIds).error("Target ID check failed", &err),
    }
}

pub fn evaluate_targets(vms: &[VirtualMachine], candidates: &[u32], host: &str) -> CheckResult {
    let mut result = CheckResult::new(CheckKind::TargetIds);

    if candidates.is_empty() {
        result.info("No target VM IDs configured");
        return result.pass_with("no target VM IDs configured");
    }

    result.info(format!("Checking target VM IDs {}", bracket_list(candidates)));
    let availability = partition_targets(vms, candidates);

    for &vmid in candidates {
        match availability.conflicts.iter().find(|(id, _)| *id == vmid) {
            Some((_, name)) => result.warn(format!("VM {vmid} already exists: {name}")),
            None => result.ok(format!("VM {vmid} available (can be created)")),
        }
    }

    if availability.conflicts.is_empty() {
        return result.pass_with(format!("{} target VM IDs available", candidates.len()));
    }

    let conflicting: Vec<u32> = availability.conflicts.iter().map(|(id, _)| *id).collect();
    result.action("Delete the existing VMs or change the target VMIDs");
    for vmid in &conflicting {
        result.action(format!(
            "To delete: ssh root@{host} 'qm stop {vmid} && qm destroy {vmid}'"
        ));
    }
    let highest = candidates.iter().copied().max().unwrap_or(0);
    let suggested = suggest_free_ids(vms, highest, candidates.len());
    if !suggested.is_empty() {
        result.action(format!(
            "Or set [targets] vmids (or --vmid) to unused IDs, e.g. {}",
            bracket_list(&suggested)
        ));
    }

    result.fail_with(format!("VMIDs already in use: {}", bracket_list(&conflicting)))
}

// ── storage ──────────────────────────────────────────────

pub async fn storage<S: Session>(session: &S, node: &str, cfg: &StorageConfig) -> CheckResult {
    let volumes = match session.list_storage(node).await {
        Ok(v) => v,
        Err(err) => {
            return CheckResult::new(CheckKind::Storage).error("Storage test failed", &err);
        }
    };

    let Some(volume) = volumes.iter().find(|v| v.name == cfg.name) else {
        return evaluate_storage(&volumes, cfg, None);
    };

    match session.storage_status(node, &volume.name).await {
        Ok(status) => evaluate_storage(&volumes, cfg, Some(status)),
        Err(err) => CheckResult::new(CheckKind::Storage).error("Storage test failed", &err),
    }
}

/// `status` is the capacity of the configured volume, `None` when it was
/// not looked up because the volume is absent.
pub fn evaluate_storage(
    volumes: &[StorageVolume],
    cfg: &StorageConfig,
    status: Option<StorageStatus>,
) -> CheckResult {
    let mut result = CheckResult::new(CheckKind::Storage);
    result.info(format!("Looking for storage: {}", cfg.name));

    let found = volumes.iter().find(|v| v.name == cfg.name);
    let (Some(volume), Some(status)) = (found, status) else {
        let names: Vec<&str> = volumes.iter().map(|v| v.name.as_str()).collect();
        result.fail(format!("Storage '{}' not found", cfg.name));
        result.info(format!("Available storage: {}", bracket_list(&names)));
        result.action("Set [storage] name (or --storage) to one of the available storage IDs");
        return result.fail_with(format!("storage '{}' not found", cfg.name));
    };

    result.ok(format!("Storage '{}' found", volume.name));
    result.info(format!("Type: {}", volume.kind));
    result.info(format!("Active: {}", if volume.active { "yes" } else { "no" }));
    result.info(format!("Total: {}", format_gib(status.total)));
    result.info(format!("Used: {}", format_gib(status.used)));
    result.info(format!("Available: {}", format_gib(status.avail)));

    if bytes_to_gib(status.avail) > cfg.min_free_gb as f64 {
        result.ok("Sufficient space available");
        result.pass_with(format!("{} available", format_gib(status.avail)))
    } else {
        result.warn(format!(
            "Low disk space (< {} GB available)",
            cfg.min_free_gb
        ));
        result.warn_with(format!(
            "Low disk space: {} available on '{}'",
            format_gib(status.avail),
            volume.name
        ))
    }
}
