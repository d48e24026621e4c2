//! Plain text observer, no ANSI. Used for piped output and CI logs.

use crate::checks::{CheckKind, CheckResult};
use crate::report;

use super::Observer;

pub struct PlainObserver;

impl Observer for PlainObserver {
    fn on_check_started(&mut self, step: usize, _total: usize, kind: CheckKind) {
        for line in report::heading(step, kind.title()) {
            println!("{line}");
        }
    }

    fn on_check_finished(&mut self, _step: usize, _total: usize, result: &CheckResult) {
        for line in report::result_lines(result, false) {
            println!("{line}");
        }
    }
}
