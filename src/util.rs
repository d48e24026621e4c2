/// Bytes per GB as Proxmox reports it (binary units, 1G = 1024³).
pub const GIB: u64 = 1024 * 1024 * 1024;

/// Convert a byte count into binary gigabytes.
pub fn bytes_to_gib(bytes: u64) -> f64 {
    bytes as f64 / GIB as f64
}

/// Render a byte count as `"12.34 GB"`.
pub fn format_gib(bytes: u64) -> String {
    format!("{:.2} GB", bytes_to_gib(bytes))
}

/// Mask a secret for display, one `*` per character.
pub fn mask(secret: &str) -> String {
    "*".repeat(secret.chars().count())
}

/// Render a list of names as `[a, b, c]`.
pub fn bracket_list<T: std::fmt::Display>(items: &[T]) -> String {
    let joined: Vec<String> = items.iter().map(ToString::to_string).collect();
    format!("[{}]", joined.join(", "))
}
