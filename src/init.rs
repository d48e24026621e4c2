use std::path::Path;

use crate::config::Config;
use crate::error::PreflightError;
use crate::util::bracket_list;

/// Write a starter config at `path`. Refuses to overwrite unless `force`.
pub fn run(path: &Path, force: bool) -> Result<(), PreflightError> {
    if path.exists() && !force {
        return Err(PreflightError::Validation {
            message: format!("{} already exists (use --force to overwrite)", path.display()),
        });
    }

    let toml = generate_toml(&Config::default());
    std::fs::write(path, &toml).map_err(|e| PreflightError::ConfigWrite {
        path: path.display().to_string(),
        source: e,
    })?;

    println!("Created {}", path.display());
    println!("Set proxmox.host, then run `pvecheck` to validate the server.");
    Ok(())
}

// ── rendering ────────────────────────────────────────────

/// Render `config` as commented TOML. The password is never written here;
/// pass it on the command line or via PROXMOX_PASSWORD.
pub fn generate_toml(config: &Config) -> String {
    let mut out = String::new();

    let pve = &config.proxmox;
    out.push_str("[proxmox]\n");
    out.push_str("# Host name or address of the Proxmox VE server\n");
    out.push_str(&format!("host = \"{}\"\n", pve.host));
    out.push_str(&format!("port = {}\n", pve.port));
    out.push_str(&format!("user = \"{}\"\n", pve.user));
    out.push_str(&format!("node = \"{}\"\n", pve.node));
    out.push_str("# Most installs use a self-signed certificate\n");
    out.push_str(&format!("verify_tls = {}\n", pve.verify_tls));
    out.push_str(&format!("timeout_secs = {}\n", pve.timeout_secs));
    out.push('\n');

    out.push_str("[template]\n");
    out.push_str("# VM that new machines are cloned from\n");
    out.push_str(&format!("id = {}\n", config.template.id));
    out.push('\n');

    out.push_str("[targets]\n");
    out.push_str("# VM IDs the pipeline will create; they must be free\n");
    out.push_str(&format!("vmids = {}\n", bracket_list(&config.targets.vmids)));
    out.push('\n');

    out.push_str("[storage]\n");
    out.push_str(&format!("name = \"{}\"\n", config.storage.name));
    out.push_str(&format!("min_free_gb = {}\n", config.storage.min_free_gb));

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_toml_round_trips() {
        let mut config = Config::default();
        config.proxmox.host = "pve.lan".into();
        config.targets.vmids = vec![301, 302];

        let toml = generate_toml(&config);
        let parsed: Config = facet_toml::from_str(&toml).unwrap();

        assert_eq!(parsed.proxmox.host, "pve.lan");
        assert_eq!(parsed.proxmox.port, 8006);
        assert_eq!(parsed.proxmox.user, "root@pam");
        assert!(!parsed.proxmox.verify_tls);
        assert_eq!(parsed.template.id, 100);
        assert_eq!(parsed.targets.vmids, vec![301, 302]);
        assert_eq!(parsed.storage.name, "local-lvm");
        assert_eq!(parsed.storage.min_free_gb, 10);
    }

    #[test]
    fn generated_toml_has_no_password() {
        let toml = generate_toml(&Config::default());
        assert!(!toml.contains("password ="));
    }

    #[test]
    fn run_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pvecheck.toml");
        run(&path, false).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("[proxmox]"));
    }

    #[test]
    fn run_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pvecheck.toml");
        std::fs::write(&path, "# mine\n").unwrap();

        let err = run(&path, false).unwrap_err();
        assert!(err.to_string().contains("already exists"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# mine\n");

        run(&path, true).unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().contains("[storage]"));
    }
}
