use crate::api::{Endpoint, Session};
use crate::config::ProxmoxConfig;
use crate::error::ApiError;
use crate::model::Credentials;
use crate::util::mask;

use super::{CheckKind, CheckResult};

/// Raw TCP connect to the management port. Does not touch the API.
pub async fn connectivity<E: Endpoint>(endpoint: &E, pve: &ProxmoxConfig) -> CheckResult {
    let mut result = CheckResult::new(CheckKind::Connectivity);
    match endpoint.probe().await {
        Ok(()) => {
            result.ok(format!("Port {} is open on {}", pve.port, pve.host));
            result.pass_with(format!("port {} reachable", pve.port))
        }
        Err(err) => {
            result.fail(format!("Cannot connect to {}:{}", pve.host, pve.port));
            result.info(err.to_string());
            result.action(format!(
                "Check that the host is up and that port {} is not firewalled",
                pve.port
            ));
            result.fail_with(format!("cannot connect to {}:{}", pve.host, pve.port))
        }
    }
}

/// Unauthenticated version request.
pub async fn api_liveness<E: Endpoint>(endpoint: &E) -> CheckResult {
    let mut result = CheckResult::new(CheckKind::ApiLiveness);
    match endpoint.version().await {
        Ok(info) => {
            result.ok("API is responding");
            result.info(format!("Version: {}", info.version));
            result.info(format!("Release: {}", info.release));
            result.pass_with(format!("API version {}", info.version))
        }
        Err(ApiError::Status { status, .. }) => {
            let message = format!("API returned status code: {status}");
            result.fail(message.clone());
            result.fail_with(message)
        }
        Err(err) => result.error("API test failed", &err),
    }
}

/// Log in and hand back the live session on success.
///
/// The session is only returned when both the ticket request and an
/// authenticated version call succeed.
pub async fn authentication<E: Endpoint>(
    endpoint: &E,
    credentials: &Credentials,
    pve: &ProxmoxConfig,
) -> (CheckResult, Option<E::Session>) {
    let mut result = CheckResult::new(CheckKind::Authentication);
    result.info(format!("Host: {}", pve.host));
    result.info(format!("User: {}", credentials.user));
    result.info(format!("Password: {}", mask(&credentials.password)));

    let session = match endpoint.authenticate(credentials).await {
        Ok(session) => session,
        Err(err) => return (result.error("Authentication failed", &err), None),
    };
    result.ok("Authentication successful!");

    match session.version().await {
        Ok(info) => {
            result.ok(format!("Connected to Proxmox VE {}", info.version));
            let result = result.pass_with(format!("authenticated as {}", credentials.user));
            (result, Some(session))
        }
        Err(err) => (result.error("Authentication failed", &err), None),
    }
}
