//! Rendering of a pre-flight run as it happens.
//!
//! The validator notifies the observer before and after each check.
//! Checks run strictly one after another, so observers need no locking.

pub mod interactive;
pub mod plain;

use crate::checks::{CheckKind, CheckResult};

pub trait Observer {
    /// A check is about to run. `step` is 1-based.
    fn on_check_started(&mut self, step: usize, total: usize, kind: CheckKind);

    fn on_check_finished(&mut self, step: usize, total: usize, result: &CheckResult);
}

/// Discards everything. For callers that only want the final report.
pub struct SilentObserver;

impl Observer for SilentObserver {
    fn on_check_started(&mut self, _step: usize, _total: usize, _kind: CheckKind) {}

    fn on_check_finished(&mut self, _step: usize, _total: usize, _result: &CheckResult) {}
}
