//! Interactive TTY observer: a spinner while each check runs, coloured marks after.

use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::checks::{CheckKind, CheckResult, CheckStatus};
use crate::report;

use super::Observer;

fn spinner_style() -> ProgressStyle {
    ProgressStyle::default_spinner()
        .template("[{prefix}] {spinner:.cyan} {msg}")
        .expect("valid spinner template")
}

#[derive(Default)]
pub struct InteractiveObserver {
    spinner: Option<ProgressBar>,
}

impl InteractiveObserver {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Observer for InteractiveObserver {
    fn on_check_started(&mut self, step: usize, total: usize, kind: CheckKind) {
        let bar = ProgressBar::new_spinner();
        bar.set_style(spinner_style());
        bar.set_prefix(format!("{step}/{total}"));
        bar.set_message(kind.title());
        bar.enable_steady_tick(Duration::from_millis(80));
        self.spinner = Some(bar);
    }

    fn on_check_finished(&mut self, step: usize, total: usize, result: &CheckResult) {
        if let Some(bar) = self.spinner.take() {
            bar.finish_and_clear();
        }

        let title = result.kind.title();
        let status = match result.status {
            CheckStatus::Passed => style("\u{2713}").green(),
            CheckStatus::Warning => style("\u{26a0}").yellow(),
            CheckStatus::Failed => style("\u{2717}").red(),
        };
        println!();
        println!("[{step}/{total}] {status} {}", style(title).bold());
        for line in report::result_lines(result, true) {
            println!("      {line}");
        }
    }
}

impl Drop for InteractiveObserver {
    fn drop(&mut self) {
        if let Some(bar) = self.spinner.take() {
            bar.finish_and_clear();
        }
    }
}
