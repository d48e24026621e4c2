//! Text rendering of check results and the final verdict.

use console::style;

use crate::checks::{CheckResult, CheckStatus, Line};
use crate::preflight::{RunReport, Suite, Verdict};

pub const RULE: &str = "==================================================";

fn mark(line: &Line, colored: bool) -> String {
    let (symbol, text) = match line {
        Line::Ok(t) => ("\u{2713}", t),
        Line::Fail(t) => ("\u{2717}", t),
        Line::Warn(t) => ("\u{26a0}", t),
        Line::Info(t) => return format!("  {t}"),
    };
    if !colored {
        return format!("{symbol} {text}");
    }
    let symbol = match line {
        Line::Ok(_) => style(symbol).green().to_string(),
        Line::Fail(_) => style(symbol).red().to_string(),
        _ => style(symbol).yellow().to_string(),
    };
    format!("{symbol} {text}")
}

/// Section heading for step `step` of a run.
pub fn heading(step: usize, title: &str) -> Vec<String> {
    vec![String::new(), RULE.to_string(), format!("{step}. {title}"), RULE.to_string()]
}

/// Body of one check: its diagnostic lines, then any remediation.
pub fn result_lines(result: &CheckResult, colored: bool) -> Vec<String> {
    let mut out: Vec<String> = result.lines.iter().map(|l| mark(l, colored)).collect();
    if !result.actions.is_empty() {
        out.push(String::new());
        out.push("ACTION REQUIRED:".to_string());
        for action in &result.actions {
            out.push(format!("  {action}"));
        }
    }
    out
}

pub fn banner(suite: Suite) -> Vec<String> {
    vec![String::new(), RULE.to_string(), suite.heading().to_string(), RULE.to_string()]
}

pub fn summary_lines(report: &RunReport, suite: Suite) -> Vec<String> {
    let mut out = vec![String::new(), RULE.to_string()];

    match report.verdict {
        Verdict::AuthenticationFailed => {
            out.push("RESULT: Authentication Failed".to_string());
            out.push(RULE.to_string());
            return out;
        }
        Verdict::Ready => {
            out.push("RESULT: \u{2713} All Tests Passed!".to_string());
            out.push(RULE.to_string());
        }
        Verdict::NotReady => {
            out.push("RESULT: \u{26a0} Some Tests Failed".to_string());
            out.push(RULE.to_string());
            out.push(String::new());
            out.push("Failed checks:".to_string());
            for result in report.failed() {
                out.push(format!("  - {}: {}", result.kind.title(), result.message));
            }
        }
    }

    let warnings: Vec<&CheckResult> = report
        .results
        .iter()
        .filter(|r| r.status == CheckStatus::Warning)
        .collect();
    if !warnings.is_empty() {
        out.push(String::new());
        out.push("Warnings:".to_string());
        for result in warnings {
            out.push(format!("  - {}: {}", result.kind.title(), result.message));
        }
    }

    out.push(String::new());
    if report.verdict == Verdict::Ready {
        out.push(suite.ready_note().to_string());
    } else {
        out.push("Please fix the issues above before running the pipeline.".to_string());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::CheckKind;

    fn report(results: Vec<CheckResult>, verdict: Verdict) -> RunReport {
        RunReport { results, verdict }
    }

    #[test]
    fn plain_marks() {
        assert_eq!(mark(&Line::Ok("up".into()), false), "\u{2713} up");
        assert_eq!(mark(&Line::Fail("down".into()), false), "\u{2717} down");
        assert_eq!(mark(&Line::Warn("low".into()), false), "\u{26a0} low");
        assert_eq!(mark(&Line::Info("Name: x".into()), false), "  Name: x");
    }

    #[test]
    fn actions_render_under_heading() {
        let mut result = CheckResult::new(CheckKind::Template);
        result.fail("Template 100 not found");
        result.action("Set [template] id");
        let lines = result_lines(&result, false);
        assert_eq!(lines[0], "\u{2717} Template 100 not found");
        assert!(lines.contains(&"ACTION REQUIRED:".to_string()));
        assert_eq!(lines.last().unwrap(), "  Set [template] id");
    }

    #[test]
    fn summary_lists_every_failure() {
        let a = CheckResult::new(CheckKind::Template).fail_with("Template 100 not found");
        let b = CheckResult::new(CheckKind::TargetIds).fail_with("VMIDs already in use: [202]");
        let c = CheckResult::new(CheckKind::Storage).warn_with("Low disk space");
        let lines = summary_lines(&report(vec![a, b, c], Verdict::NotReady), Suite::Full);
        let text = lines.join("\n");
        assert!(text.contains("Some Tests Failed"));
        assert!(text.contains("Testing Template: Template 100 not found"));
        assert!(text.contains("Checking Target VM IDs: VMIDs already in use: [202]"));
        assert!(text.contains("Warnings:"));
        assert!(text.contains("Testing Storage: Low disk space"));
    }

    #[test]
    fn summary_for_auth_failure_is_terminal() {
        let a = CheckResult::new(CheckKind::Authentication).fail_with("rejected");
        let lines = summary_lines(&report(vec![a], Verdict::AuthenticationFailed), Suite::Full);
        assert!(lines.iter().any(|l| l == "RESULT: Authentication Failed"));
        assert!(!lines.iter().any(|l| l.contains("Please fix")));
    }

    #[test]
    fn summary_when_ready() {
        let a = CheckResult::new(CheckKind::Template).pass_with("ok");
        let lines = summary_lines(&report(vec![a], Verdict::Ready), Suite::Template);
        let text = lines.join("\n");
        assert!(text.contains("All Tests Passed"));
        assert!(text.contains(Suite::Template.ready_note()));
    }
}
