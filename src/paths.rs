use std::path::PathBuf;

/// Config file name looked up in the working directory.
pub const LOCAL_CONFIG: &str = "pvecheck.toml";

/// Per-user config file: `~/.config/pvecheck/config.toml`
pub fn user_config() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("pvecheck").join("config.toml"))
}

/// Config files tried in order when `--config` is not given.
pub fn config_candidates() -> Vec<PathBuf> {
    let mut candidates = vec![PathBuf::from(LOCAL_CONFIG)];
    candidates.extend(user_config());
    candidates
}
