//! Output rendering for check reports.
//!
//! Supports `human` (default) and `json` outputs. The JSON form includes
//! per-report findings and counts plus a top-level summary.

use crate::config::Output;
use crate::models::{Finding, Report, Severity, Summary};
use crate::utils::{colors_enabled, rel_to_wd};
use owo_colors::OwoColorize;
use serde_json::json;
use serde_json::Value as JsonVal;

fn use_colors(output: Output) -> bool {
    output != Output::Json && colors_enabled()
}

fn severity_label(severity: Severity, color: bool) -> String {
    let label = severity.as_str();
    if !color {
        return label.to_string();
    }
    match severity {
        Severity::Error => label.red().bold().to_string(),
        Severity::Warn => label.yellow().bold().to_string(),
        Severity::Info => label.blue().bold().to_string(),
    }
}

fn finding_line(f: &Finding, color: bool) -> String {
    let sev = severity_label(f.severity, color);
    match &f.location {
        Some(loc) => format!("{}: {} [{}]", sev, f.message, loc),
        None => format!("{}: {}", sev, f.message),
    }
}

/// Human rendering: one section per report, then the summary block.
pub fn render_human(reports: &[Report], color: bool) -> String {
    let mut out = String::new();
    for report in reports {
        let header = format!("== {} ==", report.name);
        if color {
            out.push_str(&header.bold().to_string());
        } else {
            out.push_str(&header);
        }
        out.push('\n');
        if report.findings().is_empty() {
            let pass = if color {
                "PASS".green().bold().to_string()
            } else {
                "PASS".to_string()
            };
            out.push_str(&format!("{}: no findings\n", pass));
        }
        for f in report.findings() {
            out.push_str(&finding_line(f, color));
            out.push('\n');
        }
        out.push('\n');
    }
    let summary = Summary::of(reports);
    let header = "== summary ==";
    if color {
        out.push_str(&header.bold().to_string());
    } else {
        out.push_str(header);
    }
    out.push('\n');
    out.push_str(&format!(
        "errors={} warnings={}\n",
        summary.errors, summary.warnings
    ));
    out
}

/// JSON rendering of `reports` with per-report counts and a summary.
pub fn compose_json(reports: &[Report]) -> JsonVal {
    let items: Vec<JsonVal> = reports
        .iter()
        .map(|r| {
            json!({
                "name": r.name,
                "target": r.target.as_deref().map(rel_to_wd),
                "findings": r.findings(),
                "errors": r.errors(),
                "warnings": r.warnings(),
            })
        })
        .collect();
    let summary = Summary::of(reports);
    json!({
        "reports": items,
        "summary": summary,
    })
}

/// Print `reports` to stdout in the requested format and return the totals.
pub fn print_reports(reports: &[Report], output: Output) -> Summary {
    match output {
        Output::Json => {
            let out = compose_json(reports);
            let text = serde_json::to_string_pretty(&out).unwrap_or_else(|_| out.to_string());
            println!("{}", text);
        }
        Output::Human => print!("{}", render_human(reports, use_colors(output))),
    }
    Summary::of(reports)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn sample() -> Vec<Report> {
        let clean = Report::new("skills");
        let mut plan = Report::for_target("plan", PathBuf::from("docs/plans/p.md"));
        plan.error("Missing required header `Goal`", "docs/plans/p.md");
        plan.warn("something soft", "");
        plan.info("fyi", "docs/plans/p.md:3");
        vec![clean, plan]
    }

    #[test]
    fn test_render_human_plain() {
        let text = render_human(&sample(), false);
        let expected = "\
== skills ==
PASS: no findings

== plan ==
ERROR: Missing required header `Goal` [docs/plans/p.md]
WARN: something soft
INFO: fyi [docs/plans/p.md:3]

== summary ==
errors=1 warnings=1
";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_render_human_no_reports_still_has_summary() {
        assert_eq!(render_human(&[], false), "== summary ==\nerrors=0 warnings=0\n");
    }

    #[test]
    fn test_compose_json_shape() {
        let v = compose_json(&sample());
        assert_eq!(v["summary"]["errors"], 1);
        assert_eq!(v["summary"]["warnings"], 1);
        assert_eq!(v["summary"]["infos"], 1);
        let reports = v["reports"].as_array().unwrap();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0]["name"], "skills");
        assert!(reports[0]["target"].is_null());
        assert_eq!(reports[1]["target"], "docs/plans/p.md");
        assert_eq!(reports[1]["errors"], 1);
        let f = &reports[1]["findings"][0];
        assert_eq!(f["severity"], "ERROR");
        assert_eq!(f["location"], "docs/plans/p.md");
        assert!(reports[1]["findings"][1].get("location").is_none());
    }
}
