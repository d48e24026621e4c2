//! The pre-flight validator: runs a suite of checks in order and aggregates
//! them into one verdict.
//!
//! Checks before authentication always run. Authentication gates the rest:
//! when it fails the run stops immediately, since every later check needs the
//! session. Once authenticated, every remaining check runs regardless of the
//! others' outcomes.

use crate::api::Endpoint;
use crate::checks::{self, CheckKind, CheckResult};
use crate::config::Config;
use crate::model::Credentials;
use crate::observer::Observer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Suite {
    /// Connectivity through storage: everything a provisioning run needs.
    Full,
    /// Template and target-vmid readiness only.
    Template,
}

impl Suite {
    pub fn checks(self) -> &'static [CheckKind] {
        match self {
            Self::Full => &[
                CheckKind::Connectivity,
                CheckKind::ApiLiveness,
                CheckKind::Authentication,
                CheckKind::Permissions,
                CheckKind::Template,
                CheckKind::TargetIds,
                CheckKind::Storage,
            ],
            Self::Template => &[
                CheckKind::Authentication,
                CheckKind::Template,
                CheckKind::TargetIds,
            ],
        }
    }

    pub fn heading(self) -> &'static str {
        match self {
            Self::Full => "Proxmox API Pre-flight Check",
            Self::Template => "Proxmox Template and VM Check",
        }
    }

    /// Closing line printed when every check passed.
    pub fn ready_note(self) -> &'static str {
        match self {
            Self::Full => "Your Proxmox credentials are working correctly. You can proceed with the pipeline.",
            Self::Template => "Ready to create VMs.",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Ready,
    NotReady,
    /// Credentials were rejected; later checks were not attempted.
    AuthenticationFailed,
}

#[derive(Debug)]
pub struct RunReport {
    pub results: Vec<CheckResult>,
    pub verdict: Verdict,
}

impl RunReport {
    pub fn failed(&self) -> impl Iterator<Item = &CheckResult> {
        self.results.iter().filter(|r| !r.passed())
    }

    pub fn is_ready(&self) -> bool {
        self.verdict == Verdict::Ready
    }

    pub fn exit_code(&self) -> i32 {
        if self.is_ready() { 0 } else { 1 }
    }
}

pub struct Preflight<'a, E> {
    endpoint: &'a E,
    config: &'a Config,
}

impl<'a, E: Endpoint> Preflight<'a, E> {
    pub fn new(endpoint: &'a E, config: &'a Config) -> Self {
        Self { endpoint, config }
    }

    pub async fn run(
        &self,
        suite: Suite,
        credentials: &Credentials,
        observer: &mut dyn Observer,
    ) -> RunReport {
        let plan = suite.checks();
        let total = plan.len();
        let pve = &self.config.proxmox;
        let node = &pve.node;
        let host = &pve.host;

        let mut results = Vec::with_capacity(total);
        let mut session: Option<E::Session> = None;

        for (index, &kind) in plan.iter().enumerate() {
            let step = index + 1;
            observer.on_check_started(step, total, kind);

            let result = match kind {
                CheckKind::Connectivity => checks::connectivity(self.endpoint, pve).await,
                CheckKind::ApiLiveness => checks::api_liveness(self.endpoint).await,
                CheckKind::Authentication => {
                    let (result, live) =
                        checks::authentication(self.endpoint, credentials, pve).await;
                    session = live;
                    result
                }
                CheckKind::Permissions => match session.as_ref() {
                    Some(live) => checks::permissions(live, node).await,
                    None => unauthenticated(kind),
                },
                CheckKind::Template => match session.as_ref() {
                    Some(live) => checks::template(live, node, self.config.template.id, host).await,
                    None => unauthenticated(kind),
                },
                CheckKind::TargetIds => match session.as_ref() {
                    Some(live) => {
                        checks::target_ids(live, node, &self.config.targets.vmids, host).await
                    }
                    None => unauthenticated(kind),
                },
                CheckKind::Storage => match session.as_ref() {
                    Some(live) => checks::storage(live, node, &self.config.storage).await,
                    None => unauthenticated(kind),
                },
            };

            tracing::info!(
                check = kind.name(),
                status = ?result.status,
                message = %result.message,
                "check finished"
            );
            observer.on_check_finished(step, total, &result);

            let auth_failed = kind == CheckKind::Authentication && !result.passed();
            results.push(result);
            if auth_failed {
                tracing::warn!("authentication failed, skipping remaining checks");
                return RunReport {
                    results,
                    verdict: Verdict::AuthenticationFailed,
                };
            }
        }

        let verdict = if results.iter().all(CheckResult::passed) {
            Verdict::Ready
        } else {
            Verdict::NotReady
        };
        RunReport { results, verdict }
    }
}

/// Result for a session check in a suite that reached it without logging in.
fn unauthenticated(kind: CheckKind) -> CheckResult {
    CheckResult::new(kind).fail_with("skipped: requires an authenticated session")
}
