//! Typed records the checks work with.
//!
//! These are read-only snapshots of hypervisor state, mapped from the wire
//! representation in [`crate::api::pve`]. Collections returned by the API
//! are unordered; look entries up by their identifier.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualMachine {
    pub vmid: u32,
    pub name: Option<String>,
    pub status: String,
    pub is_template: bool,
}

impl VirtualMachine {
    /// Name for display, `"N/A"` when the VM has none.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("N/A")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageVolume {
    pub name: String,
    /// Storage backend type, e.g. `lvmthin` or `dir`.
    pub kind: String,
    pub active: bool,
}

/// Capacity of a storage volume, in bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StorageStatus {
    pub total: u64,
    pub used: u64,
    pub avail: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionInfo {
    pub version: String,
    pub release: String,
}

/// Login material for the ticket endpoint. `Debug` never shows the password.
#[derive(Clone)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

pub fn find_vm(vms: &[VirtualMachine], vmid: u32) -> Option<&VirtualMachine> {
    vms.iter().find(|vm| vm.vmid == vmid)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vm(vmid: u32, name: Option<&str>) -> VirtualMachine {
        VirtualMachine {
            vmid,
            name: name.map(String::from),
            status: "stopped".into(),
            is_template: false,
        }
    }

    #[test]
    fn find_vm_ignores_order() {
        let vms = vec![vm(300, None), vm(100, Some("tmpl")), vm(201, None)];
        assert_eq!(find_vm(&vms, 100).unwrap().display_name(), "tmpl");
        assert!(find_vm(&vms, 999).is_none());
    }

    #[test]
    fn display_name_falls_back() {
        assert_eq!(vm(1, None).display_name(), "N/A");
    }

    #[test]
    fn credentials_debug_redacts_password() {
        let creds = Credentials {
            user: "root@pam".into(),
            password: "hunter2".into(),
        };
        let shown = format!("{creds:?}");
        assert!(shown.contains("root@pam"));
        assert!(!shown.contains("hunter2"));
    }
}
