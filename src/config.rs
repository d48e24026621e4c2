use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use facet::Facet;

use crate::error::PreflightError;
use crate::paths;

/// Smallest vmid Proxmox hands out.
pub const VMID_MIN: u32 = 100;
/// Largest vmid Proxmox accepts.
pub const VMID_MAX: u32 = 999_999_999;

#[derive(Debug, Clone, Default, Facet)]
pub struct Config {
    #[facet(default)]
    pub proxmox: ProxmoxConfig,
    #[facet(default)]
    pub template: TemplateConfig,
    #[facet(default)]
    pub targets: TargetsConfig,
    #[facet(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Facet)]
#[facet(default)]
pub struct ProxmoxConfig {
    #[facet(default)]
    pub host: String,
    #[facet(default = 8006)]
    pub port: u16,
    #[facet(default = "root@pam")]
    pub user: String,
    #[facet(default = "pve")]
    pub node: String,
    #[facet(default)]
    pub verify_tls: bool,
    #[facet(default = 5)]
    pub timeout_secs: u64,
}

impl Default for ProxmoxConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: 8006,
            user: "root@pam".into(),
            node: "pve".into(),
            verify_tls: false,
            timeout_secs: 5,
        }
    }
}

#[derive(Debug, Clone, Facet)]
#[facet(default)]
pub struct TemplateConfig {
    #[facet(default = 100)]
    pub id: u32,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self { id: 100 }
    }
}

#[derive(Debug, Clone, Facet)]
#[facet(default)]
pub struct TargetsConfig {
    pub vmids: Vec<u32>,
}

impl Default for TargetsConfig {
    fn default() -> Self {
        Self {
            vmids: vec![201, 202, 203],
        }
    }
}

#[derive(Debug, Clone, Facet)]
#[facet(default)]
pub struct StorageConfig {
    #[facet(default = "local-lvm")]
    pub name: String,
    #[facet(default = 10)]
    pub min_free_gb: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            name: "local-lvm".into(),
            min_free_gb: 10,
        }
    }
}

/// Command-line values that take precedence over the config file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub user: Option<String>,
    pub node: Option<String>,
    pub verify_tls: bool,
    pub timeout_secs: Option<u64>,
    pub template_id: Option<u32>,
    pub vmids: Vec<u32>,
    pub storage: Option<String>,
    pub min_free_gb: Option<u64>,
}

impl Config {
    pub fn apply(&mut self, overrides: &Overrides) {
        if let Some(ref host) = overrides.host {
            self.proxmox.host = host.clone();
        }
        if let Some(port) = overrides.port {
            self.proxmox.port = port;
        }
        if let Some(ref user) = overrides.user {
            self.proxmox.user = user.clone();
        }
        if let Some(ref node) = overrides.node {
            self.proxmox.node = node.clone();
        }
        if overrides.verify_tls {
            self.proxmox.verify_tls = true;
        }
        if let Some(secs) = overrides.timeout_secs {
            self.proxmox.timeout_secs = secs;
        }
        if let Some(id) = overrides.template_id {
            self.template.id = id;
        }
        if !overrides.vmids.is_empty() {
            self.targets.vmids = overrides.vmids.clone();
        }
        if let Some(ref storage) = overrides.storage {
            self.storage.name = storage.clone();
        }
        if let Some(gb) = overrides.min_free_gb {
            self.storage.min_free_gb = gb;
        }
    }
}

/// Formats a socket address, bracketing IPv6 literals.
pub fn format_address(host: &str, port: u16) -> String {
    if host.contains(':') && !host.starts_with('[') {
        format!("[{host}]:{port}")
    } else {
        format!("{host}:{port}")
    }
}

pub fn validate_config(config: &Config) -> Result<(), PreflightError> {
    let pve = &config.proxmox;

    if pve.host.trim().is_empty() {
        return Err(PreflightError::Validation {
            message: "host must be set ([proxmox] host or --host)".into(),
        });
    }
    if pve.port == 0 {
        return Err(PreflightError::Validation {
            message: "port must not be 0".into(),
        });
    }
    match pve.user.split_once('@') {
        Some((name, realm)) if !name.is_empty() && !realm.is_empty() => {}
        _ => {
            return Err(PreflightError::Validation {
                message: format!("user must be of the form user@realm (got '{}')", pve.user),
            });
        }
    }
    if pve.node.trim().is_empty() {
        return Err(PreflightError::Validation {
            message: "node must not be empty".into(),
        });
    }
    if pve.timeout_secs == 0 {
        return Err(PreflightError::Validation {
            message: "timeout must be at least 1 second".into(),
        });
    }

    validate_vmid("template id", config.template.id)?;

    let mut seen = BTreeSet::new();
    for &vmid in &config.targets.vmids {
        validate_vmid("target vmid", vmid)?;
        if !seen.insert(vmid) {
            return Err(PreflightError::Validation {
                message: format!("target vmid {vmid} is listed more than once"),
            });
        }
    }

    if config.storage.name.trim().is_empty() {
        return Err(PreflightError::Validation {
            message: "storage name must not be empty".into(),
        });
    }

    Ok(())
}

fn validate_vmid(label: &str, vmid: u32) -> Result<(), PreflightError> {
    if !(VMID_MIN..=VMID_MAX).contains(&vmid) {
        return Err(PreflightError::Validation {
            message: format!("{label} {vmid} is outside {VMID_MIN}..={VMID_MAX}"),
        });
    }
    Ok(())
}

// ── public API ────────────────────────────────────────────

pub fn load_config(path: &Path) -> Result<Config, PreflightError> {
    let contents = std::fs::read_to_string(path).map_err(|source| PreflightError::ConfigLoad {
        path: path.display().to_string(),
        source,
    })?;

    facet_toml::from_str(&contents).map_err(|e| PreflightError::ConfigParse {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

/// Load the explicit config file, or the first one found on the search path,
/// or fall back to built-in defaults. Returns the path that was read, if any.
pub fn resolve_config(explicit: Option<&Path>) -> Result<(Config, Option<PathBuf>), PreflightError> {
    if let Some(path) = explicit {
        return Ok((load_config(path)?, Some(path.to_path_buf())));
    }

    for candidate in paths::config_candidates() {
        if candidate.is_file() {
            tracing::debug!(path = %candidate.display(), "using config file");
            let config = load_config(&candidate)?;
            return Ok((config, Some(candidate)));
        }
    }

    Ok((Config::default(), None))
}
