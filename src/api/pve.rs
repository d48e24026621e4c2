//! Proxmox VE REST client over HTTPS.
//!
//! Only the read-only calls the checks need, plus ticket login. Wire types
//! stay private to this module and are mapped to [`crate::model`] records.

use std::time::Duration;

use facet::Facet;
use reqwest::header::COOKIE;
use reqwest::{StatusCode, Url};

use crate::config::{ProxmoxConfig, format_address};
use crate::error::{ApiError, PreflightError};
use crate::model::{Credentials, Node, StorageStatus, StorageVolume, VersionInfo, VirtualMachine};

// ── wire types ───────────────────────────────────────────

#[derive(Debug, Facet)]
struct VersionEnvelope {
    data: Option<VersionData>,
}

#[derive(Debug, Facet)]
struct VersionData {
    version: String,
    #[facet(default)]
    release: String,
}

#[derive(Debug, Facet)]
struct TicketEnvelope {
    data: Option<TicketData>,
}

#[derive(Debug, Facet)]
struct TicketData {
    ticket: String,
}

#[derive(Debug, Facet)]
struct NodeListEnvelope {
    data: Option<Vec<NodeEntry>>,
}

#[derive(Debug, Facet)]
struct NodeEntry {
    node: String,
}

#[derive(Debug, Facet)]
struct VmListEnvelope {
    data: Option<Vec<VmEntry>>,
}

#[derive(Debug, Facet)]
struct VmEntry {
    vmid: u32,
    #[facet(default)]
    name: Option<String>,
    #[facet(default)]
    status: String,
    /// `1` for templates, absent otherwise.
    #[facet(default)]
    template: u8,
}

#[derive(Debug, Facet)]
struct StorageListEnvelope {
    data: Option<Vec<StorageEntry>>,
}

#[derive(Debug, Facet)]
struct StorageEntry {
    storage: String,
    #[facet(rename = "type", default)]
    kind: String,
    #[facet(default)]
    active: u8,
}

#[derive(Debug, Facet)]
struct StorageStatusEnvelope {
    data: Option<StorageStatusData>,
}

#[derive(Debug, Facet)]
struct StorageStatusData {
    #[facet(default)]
    total: u64,
    #[facet(default)]
    used: u64,
    #[facet(default)]
    avail: u64,
}

impl From<VersionData> for VersionInfo {
    fn from(d: VersionData) -> Self {
        Self {
            version: d.version,
            release: d.release,
        }
    }
}

impl From<VmEntry> for VirtualMachine {
    fn from(e: VmEntry) -> Self {
        Self {
            vmid: e.vmid,
            name: e.name.filter(|n| !n.is_empty()),
            status: e.status,
            is_template: e.template == 1,
        }
    }
}

impl From<StorageEntry> for StorageVolume {
    fn from(e: StorageEntry) -> Self {
        Self {
            name: e.storage,
            kind: e.kind,
            active: e.active == 1,
        }
    }
}

impl From<StorageStatusData> for StorageStatus {
    fn from(d: StorageStatusData) -> Self {
        Self {
            total: d.total,
            used: d.used,
            avail: d.avail,
        }
    }
}

fn decode<T>(url: &Url, body: &str) -> Result<T, ApiError>
where
    T: for<'a> Facet<'a>,
{
    facet_json::from_str(body).map_err(|e| ApiError::Decode {
        url: url.to_string(),
        message: e.to_string(),
    })
}

/// Every envelope carries its payload under `data`; error bodies omit it.
fn payload<T>(url: &Url, data: Option<T>) -> Result<T, ApiError> {
    data.ok_or_else(|| ApiError::Decode {
        url: url.to_string(),
        message: "missing data".into(),
    })
}

fn decode_version(url: &Url, body: &str) -> Result<VersionInfo, ApiError> {
    let envelope: VersionEnvelope = decode(url, body)?;
    let data = payload(url, envelope.data)?;
    if data.version.is_empty() {
        return Err(ApiError::Decode {
            url: url.to_string(),
            message: "empty version string".into(),
        });
    }
    Ok(data.into())
}

fn decode_nodes(url: &Url, body: &str) -> Result<Vec<Node>, ApiError> {
    let envelope: NodeListEnvelope = decode(url, body)?;
    Ok(payload(url, envelope.data)?
        .into_iter()
        .map(|n| Node { name: n.node })
        .collect())
}

fn decode_vms(url: &Url, body: &str) -> Result<Vec<VirtualMachine>, ApiError> {
    let envelope: VmListEnvelope = decode(url, body)?;
    Ok(payload(url, envelope.data)?.into_iter().map(Into::into).collect())
}

fn decode_storage(url: &Url, body: &str) -> Result<Vec<StorageVolume>, ApiError> {
    let envelope: StorageListEnvelope = decode(url, body)?;
    Ok(payload(url, envelope.data)?.into_iter().map(Into::into).collect())
}

fn decode_storage_status(url: &Url, body: &str) -> Result<StorageStatus, ApiError> {
    let envelope: StorageStatusEnvelope = decode(url, body)?;
    Ok(payload(url, envelope.data)?.into())
}

// ── transport ────────────────────────────────────────────

/// Shared HTTP plumbing for the endpoint and its sessions.
#[derive(Clone)]
struct Transport {
    client: reqwest::Client,
    base: Url,
    timeout: Duration,
}

impl Transport {
    fn url(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::Url {
                message: format!("{} cannot be a base URL", self.base),
            })?
            .extend(segments);
        Ok(url)
    }

    fn request_error(&self, url: &Url, source: reqwest::Error) -> ApiError {
        if source.is_timeout() {
            ApiError::Timeout {
                what: format!("request to {url}"),
                secs: self.timeout.as_secs(),
            }
        } else {
            ApiError::Request {
                url: url.to_string(),
                source,
            }
        }
    }

    async fn get(&self, segments: &[&str], ticket: Option<&str>) -> Result<(Url, String), ApiError> {
        let url = self.url(segments)?;
        tracing::debug!(url = %url, authenticated = ticket.is_some(), "GET");

        let mut request = self.client.get(url.clone());
        if let Some(ticket) = ticket {
            request = request.header(COOKIE, format!("PVEAuthCookie={ticket}"));
        }

        let response = request
            .send()
            .await
            .map_err(|e| self.request_error(&url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| self.request_error(&url, e))?;
        Ok((url, body))
    }
}

// ── endpoint ─────────────────────────────────────────────

pub struct PveEndpoint {
    transport: Transport,
    address: String,
}

impl PveEndpoint {
    pub fn new(config: &ProxmoxConfig) -> Result<Self, PreflightError> {
        let timeout = Duration::from_secs(config.timeout_secs);
        let address = format_address(&config.host, config.port);

        let client = reqwest::Client::builder()
            .danger_accept_invalid_certs(!config.verify_tls)
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()
            .map_err(|e| PreflightError::HttpClient {
                message: e.to_string(),
            })?;

        let base = Url::parse(&format!("https://{address}/api2/json")).map_err(|e| {
            PreflightError::Validation {
                message: format!("invalid host '{}': {e}", config.host),
            }
        })?;

        Ok(Self {
            transport: Transport {
                client,
                base,
                timeout,
            },
            address,
        })
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn api_url(&self) -> &Url {
        &self.transport.base
    }
}

impl super::Endpoint for PveEndpoint {
    type Session = PveSession;

    async fn probe(&self) -> Result<(), ApiError> {
        let connect = tokio::net::TcpStream::connect(self.address.as_str());
        match tokio::time::timeout(self.transport.timeout, connect).await {
            Ok(Ok(_stream)) => Ok(()),
            Ok(Err(source)) => Err(ApiError::Connect {
                addr: self.address.clone(),
                source,
            }),
            Err(_) => Err(ApiError::Timeout {
                what: format!("connection to {}", self.address),
                secs: self.transport.timeout.as_secs(),
            }),
        }
    }

    async fn version(&self) -> Result<VersionInfo, ApiError> {
        let (url, body) = self.transport.get(&["version"], None).await?;
        decode_version(&url, &body)
    }

    async fn authenticate(&self, credentials: &Credentials) -> Result<PveSession, ApiError> {
        let url = self.transport.url(&["access", "ticket"])?;
        tracing::debug!(url = %url, user = %credentials.user, "requesting ticket");

        let response = self
            .transport
            .client
            .post(url.clone())
            .form(&[
                ("username", credentials.user.as_str()),
                ("password", credentials.password.as_str()),
            ])
            .send()
            .await
            .map_err(|e| self.transport.request_error(&url, e))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(ApiError::AuthRejected {
                user: credentials.user.clone(),
            });
        }
        if !status.is_success() {
            return Err(ApiError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| self.transport.request_error(&url, e))?;
        let envelope: TicketEnvelope = decode(&url, &body)?;
        let ticket = payload(&url, envelope.data)?.ticket;
        if ticket.is_empty() {
            return Err(ApiError::AuthRejected {
                user: credentials.user.clone(),
            });
        }

        tracing::info!(user = %credentials.user, "authenticated");
        Ok(PveSession {
            transport: self.transport.clone(),
            ticket,
        })
    }
}

// ── session ──────────────────────────────────────────────

pub struct PveSession {
    transport: Transport,
    ticket: String,
}

impl PveSession {
    async fn get(&self, segments: &[&str]) -> Result<(Url, String), ApiError> {
        self.transport.get(segments, Some(&self.ticket)).await
    }
}

impl super::Session for PveSession {
    async fn version(&self) -> Result<VersionInfo, ApiError> {
        let (url, body) = self.get(&["version"]).await?;
        decode_version(&url, &body)
    }

    async fn list_nodes(&self) -> Result<Vec<Node>, ApiError> {
        let (url, body) = self.get(&["nodes"]).await?;
        decode_nodes(&url, &body)
    }

    async fn list_vms(&self, node: &str) -> Result<Vec<VirtualMachine>, ApiError> {
        let (url, body) = self.get(&["nodes", node, "qemu"]).await?;
        decode_vms(&url, &body)
    }

    async fn list_storage(&self, node: &str) -> Result<Vec<StorageVolume>, ApiError> {
        let (url, body) = self.get(&["nodes", node, "storage"]).await?;
        decode_storage(&url, &body)
    }

    async fn storage_status(&self, node: &str, storage: &str) -> Result<StorageStatus, ApiError> {
        let (url, body) = self
            .get(&["nodes", node, "storage", storage, "status"])
            .await?;
        decode_storage_status(&url, &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoint() -> PveEndpoint {
        let config = ProxmoxConfig {
            host: "192.0.2.10".into(),
            ..Default::default()
        };
        PveEndpoint::new(&config).unwrap()
    }

    fn url() -> Url {
        Url::parse("https://192.0.2.10:8006/api2/json/test").unwrap()
    }

    #[test]
    fn base_url_uses_port_and_api_prefix() {
        let ep = endpoint();
        assert_eq!(ep.address(), "192.0.2.10:8006");
        assert_eq!(ep.api_url().as_str(), "https://192.0.2.10:8006/api2/json");
    }

    #[test]
    fn ipv6_host_is_bracketed() {
        let config = ProxmoxConfig {
            host: "fd00::10".into(),
            ..Default::default()
        };
        let ep = PveEndpoint::new(&config).unwrap();
        assert_eq!(ep.address(), "[fd00::10]:8006");
        assert_eq!(ep.api_url().host_str(), Some("[fd00::10]"));
    }

    #[test]
    fn url_appends_segments() {
        let ep = endpoint();
        let url = ep
            .transport
            .url(&["nodes", "pve", "storage", "local-lvm", "status"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://192.0.2.10:8006/api2/json/nodes/pve/storage/local-lvm/status"
        );
    }

    #[test]
    fn url_escapes_segments() {
        let ep = endpoint();
        let url = ep.transport.url(&["nodes", "a/b"]).unwrap();
        assert_eq!(url.as_str(), "https://192.0.2.10:8006/api2/json/nodes/a%2Fb");
    }

    #[test]
    fn decode_version_payload() {
        let body = r#"{"data":{"version":"8.1.4","release":"8.1","repoid":"ec5affc9e41f1d79"}}"#;
        let info = decode_version(&url(), body).unwrap();
        assert_eq!(info.version, "8.1.4");
        assert_eq!(info.release, "8.1");
    }

    #[test]
    fn decode_version_rejects_garbage() {
        assert!(matches!(
            decode_version(&url(), "<html>nope</html>"),
            Err(ApiError::Decode { .. })
        ));
        assert!(matches!(
            decode_version(&url(), r#"{"data":{"version":""}}"#),
            Err(ApiError::Decode { .. })
        ));
    }

    #[test]
    fn decode_vm_list_maps_template_flag() {
        let body = r#"{"data":[
            {"vmid":100,"name":"ubuntu-tmpl","status":"stopped","template":1,"maxmem":2147483648},
            {"vmid":201,"name":"web-1","status":"running","cpus":2},
            {"vmid":202,"status":"stopped"}
        ]}"#;
        let vms = decode_vms(&url(), body).unwrap();
        assert_eq!(vms.len(), 3);
        assert!(vms[0].is_template);
        assert_eq!(vms[0].name.as_deref(), Some("ubuntu-tmpl"));
        assert!(!vms[1].is_template);
        assert_eq!(vms[1].status, "running");
        assert_eq!(vms[2].name, None);
    }

    #[test]
    fn decode_empty_vm_list() {
        assert!(decode_vms(&url(), r#"{"data":[]}"#).unwrap().is_empty());
    }

    #[test]
    fn decode_storage_list() {
        let body = r#"{"data":[
            {"storage":"local","type":"dir","active":1,"total":100,"used":10,"avail":90,"content":"iso,vztmpl"},
            {"storage":"local-lvm","type":"lvmthin","active":0}
        ]}"#;
        let volumes = decode_storage(&url(), body).unwrap();
        assert_eq!(volumes[0].name, "local");
        assert_eq!(volumes[0].kind, "dir");
        assert!(volumes[0].active);
        assert_eq!(volumes[1].kind, "lvmthin");
        assert!(!volumes[1].active);
    }

    #[test]
    fn decode_storage_status_payload() {
        let body = r#"{"data":{"total":107374182400,"used":102005473280,"avail":5368709120,"type":"lvmthin","active":1}}"#;
        let status = decode_storage_status(&url(), body).unwrap();
        assert_eq!(status.total, 107_374_182_400);
        assert_eq!(status.avail, 5_368_709_120);
    }

    #[test]
    fn listings_without_data_are_decode_errors() {
        for body in ["{}", r#"{"errors":{}}"#, r#"{"data":null}"#] {
            assert!(
                matches!(decode_nodes(&url(), body), Err(ApiError::Decode { .. })),
                "nodes: {body}"
            );
            assert!(
                matches!(decode_vms(&url(), body), Err(ApiError::Decode { .. })),
                "vms: {body}"
            );
            assert!(
                matches!(decode_storage(&url(), body), Err(ApiError::Decode { .. })),
                "storage: {body}"
            );
            assert!(
                matches!(decode_storage_status(&url(), body), Err(ApiError::Decode { .. })),
                "status: {body}"
            );
        }
    }

    #[test]
    fn missing_data_error_names_the_url() {
        let err = decode_vms(&url(), "{}").unwrap_err();
        let text = err.to_string();
        assert!(text.contains("/api2/json/test"));
        assert!(text.contains("missing data"));
    }
}
