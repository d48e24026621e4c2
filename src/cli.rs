use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::Overrides;

#[derive(Parser, Debug)]
#[command(
    name = "pvecheck",
    version,
    about = "Pre-flight checks for provisioning VMs on Proxmox VE"
)]
pub struct Cli {
    /// Path to config file (default: ./pvecheck.toml, then the user config dir)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Also write debug logs to this file
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(flatten)]
    pub target: TargetArgs,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Settings that override the config file.
#[derive(Args, Debug, Default)]
pub struct TargetArgs {
    /// Proxmox host name or address
    #[arg(long, global = true)]
    pub host: Option<String>,

    /// Management API port
    #[arg(long, global = true)]
    pub port: Option<u16>,

    /// User with realm, e.g. root@pam
    #[arg(long, global = true)]
    pub user: Option<String>,

    /// Node to inspect
    #[arg(long, global = true)]
    pub node: Option<String>,

    /// Verify the server's TLS certificate
    #[arg(long, global = true)]
    pub verify_tls: bool,

    /// Per-request timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// VM ID of the clone template
    #[arg(long, global = true)]
    pub template_id: Option<u32>,

    /// Target VM ID that must be free (repeatable)
    #[arg(long = "vmid", global = true)]
    pub vmids: Vec<u32>,

    /// Storage that will hold the new disks
    #[arg(long, global = true)]
    pub storage: Option<String>,

    /// Free space (GB) below which storage is reported as low
    #[arg(long, global = true)]
    pub min_free_gb: Option<u64>,
}

impl TargetArgs {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            host: self.host.clone(),
            port: self.port,
            user: self.user.clone(),
            node: self.node.clone(),
            verify_tls: self.verify_tls,
            timeout_secs: self.timeout,
            template_id: self.template_id,
            vmids: self.vmids.clone(),
            storage: self.storage.clone(),
            min_free_gb: self.min_free_gb,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the full pre-flight suite (default)
    Check {
        /// Password (falls back to PROXMOX_PASSWORD, then a prompt)
        password: Option<String>,
    },

    /// Check only the clone template and target VM IDs
    Template {
        /// Password (falls back to PROXMOX_PASSWORD, then a prompt)
        password: Option<String>,
    },

    /// Write a default pvecheck.toml in the current directory
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
