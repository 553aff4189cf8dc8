//! Plan document validation.
//!
//! Checks, in order: required headers, task discovery, per-task fields and
//! values, dependency references, and finally dependency cycles. Only a read
//! failure or a plan without tasks stops the pass early.

use crate::extract::{extract_field, parse_depends, parse_tasks};
use crate::fsutil;
use crate::graph::detect_cycle;
use crate::models::contract::{FILES_MARKER, PLAN_HEADERS, PRIORITIES, TASK_FIELDS};
use crate::models::Report;
use regex::{Regex, RegexBuilder};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::OnceLock;

pub const REPORT_NAME: &str = "plan";

fn header_res() -> &'static [(&'static str, Regex)] {
    static RES: OnceLock<Vec<(&'static str, Regex)>> = OnceLock::new();
    RES.get_or_init(|| {
        PLAN_HEADERS
            .iter()
            .map(|(label, pattern)| {
                let re = RegexBuilder::new(pattern)
                    .case_insensitive(true)
                    .multi_line(true)
                    .build()
                    .expect("plan header regex must compile");
                (*label, re)
            })
            .collect()
    })
}

/// Validate the plan at `path`.
pub fn validate_plan(path: &Path) -> Report {
    let mut report = Report::for_target(REPORT_NAME, path);
    if let Some(text) = fsutil::read_for_report(path, &mut report) {
        check_plan_text(&text, &path.display().to_string(), &mut report);
    }
    report
}

/// Validate plan `text`, attributing findings to `source`.
pub fn check_plan_text(text: &str, source: &str, report: &mut Report) {
    for (label, re) in header_res() {
        if !re.is_match(text) {
            report.error(format!("Missing required header `{}`", label), source);
        }
    }

    let tasks = parse_tasks(text);
    if tasks.is_empty() {
        report.error("No task section found (`### Task N:`)", source);
        return;
    }

    let task_ids: Vec<String> = tasks.iter().map(|t| t.id.clone()).collect();
    let known: HashSet<&str> = task_ids.iter().map(String::as_str).collect();
    let mut edges: HashMap<String, Vec<String>> = HashMap::new();

    for task in &tasks {
        let location = format!("{}:{}", source, task.start_line);

        for field in TASK_FIELDS {
            if extract_field(&task.block, field).is_empty() {
                report.error(
                    format!("Task {} ({}) missing field `{}`", task.id, task.title, field),
                    &location,
                );
            }
        }

        let priority = extract_field(&task.block, "Priority");
        if !priority.is_empty() && !PRIORITIES.contains(&priority.as_str()) {
            report.error(
                format!("Task {} invalid Priority `{}`", task.id, priority),
                &location,
            );
        }

        let depends_raw = extract_field(&task.block, "Depends On");
        let deps = parse_depends(&depends_raw);
        if !depends_raw.is_empty() && !depends_raw.eq_ignore_ascii_case("none") && deps.is_empty()
        {
            report.error(
                format!("Task {} has invalid Depends On `{}`", task.id, depends_raw),
                &location,
            );
        }

        // Only edges to other known tasks reach the cycle search.
        let mut graph_deps = Vec::new();
        for dep in deps {
            if dep == task.id {
                report.error(format!("Task {} cannot depend on itself", task.id), &location);
            } else if !known.contains(dep.as_str()) {
                report.error(
                    format!("Task {} depends on unknown Task {}", task.id, dep),
                    &location,
                );
            } else {
                graph_deps.push(dep);
            }
        }
        // Duplicate headers share an id; keep the first block's edges.
        edges.entry(task.id.clone()).or_insert(graph_deps);

        if !task
            .block
            .iter()
            .any(|line| line.trim().starts_with(FILES_MARKER))
        {
            report.error(
                format!("Task {} missing `{}` section", task.id, FILES_MARKER),
                &location,
            );
        }
    }

    if let Some(cycle) = detect_cycle(&task_ids, &edges) {
        report.error(
            format!("Task dependency cycle detected: {}", cycle.join(" -> ")),
            source,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Severity;
    use std::fs;
    use tempfile::tempdir;

    fn valid_plan() -> String {
        [
            "# Plan Title",
            "",
            "**Goal:** Build the feature",
            "**Architecture:** Monolith",
            "**Tech Stack:** Rust, serde",
            "**Execution Context:** local development",
            "",
            "### Task 1: First task",
            "",
            "**Priority:** P0",
            "**Area:** backend",
            "**Depends On:** None",
            "**Acceptance Criteria:** It works",
            "**Review (Dev):** self review",
            "**Review (Regression):** full suite",
            "**Files:** src/main.rs",
            "",
            "### Task 2: Second task",
            "",
            "**Priority:** P1",
            "**Area:** frontend",
            "**Depends On:** Task 1",
            "**Acceptance Criteria:** It renders",
            "**Review (Dev):** self review",
            "**Review (Regression):** full suite",
            "**Files:** src/ui.rs",
            "",
        ]
        .join("\n")
    }

    fn check(text: &str) -> Report {
        let mut report = Report::new(REPORT_NAME);
        check_plan_text(text, "plan.md", &mut report);
        report
    }

    fn error_messages(report: &Report) -> Vec<String> {
        report
            .findings()
            .iter()
            .filter(|f| f.severity == Severity::Error)
            .map(|f| f.message.to_lowercase())
            .collect()
    }

    #[test]
    fn test_valid_plan_has_no_errors() {
        let report = check(&valid_plan());
        assert_eq!(report.errors(), 0, "{:?}", report.findings());
    }

    #[test]
    fn test_valid_plan_from_disk() {
        let dir = tempdir().unwrap();
        let p = dir.path().join("plan.md");
        fs::write(&p, valid_plan()).unwrap();
        let report = validate_plan(&p);
        assert_eq!(report.errors(), 0, "{:?}", report.findings());
        assert_eq!(report.target.as_deref(), Some(p.as_path()));
    }

    #[test]
    fn test_missing_file_stops_early() {
        let dir = tempdir().unwrap();
        let report = validate_plan(&dir.path().join("no_such_plan.md"));
        assert_eq!(report.findings().len(), 1);
        assert!(error_messages(&report)[0].contains("does not exist"));
    }

    #[test]
    fn test_each_missing_header_is_its_own_error() {
        let text = valid_plan()
            .lines()
            .filter(|l| !l.starts_with("**Goal") && !l.starts_with("**Architecture"))
            .collect::<Vec<_>>()
            .join("\n");
        let errs = error_messages(&check(&text));
        assert_eq!(errs.len(), 2);
        assert!(errs.iter().any(|m| m.contains("`goal`")));
        assert!(errs.iter().any(|m| m.contains("`architecture`")));
    }

    #[test]
    fn test_header_without_value_counts_as_missing() {
        let text = valid_plan().replace("**Goal:** Build the feature", "**Goal:**");
        let errs = error_messages(&check(&text));
        assert_eq!(errs, vec!["missing required header `goal`"]);
    }

    #[test]
    fn test_header_value_on_next_line_is_missing() {
        let text = valid_plan().replace("**Goal:** Build the feature", "**Goal:**\nBuild the feature");
        let errs = error_messages(&check(&text));
        assert_eq!(errs, vec!["missing required header `goal`"]);
    }

    #[test]
    fn test_no_tasks_is_terminal() {
        let text = "**Goal:** G\n**Architecture:** A\n**Tech Stack:** T\n**Execution Context:** E\n";
        let report = check(text);
        assert_eq!(report.errors(), 1);
        assert!(error_messages(&report)[0].contains("no task section"));
    }

    #[test]
    fn test_invalid_priority() {
        let text = valid_plan().replace("**Priority:** P0", "**Priority:** P99");
        let errs = error_messages(&check(&text));
        assert_eq!(errs, vec!["task 1 invalid priority `p99`"]);
    }

    #[test]
    fn test_missing_task_fields_reported_per_field() {
        let text = valid_plan()
            .replacen("**Acceptance Criteria:** It works\n", "", 1)
            .replacen("**Review (Regression):** full suite\n", "", 1)
            .replacen("**Files:** src/main.rs\n", "", 1);
        let report = check(&text);
        let errs = error_messages(&report);
        assert_eq!(errs.len(), 3, "{:?}", errs);
        assert!(errs[0].contains("missing field `acceptance criteria`"));
        assert!(errs[1].contains("missing field `review (regression)`"));
        assert!(errs[2].contains("missing `**files:**` section"));
        assert!(report.findings()[0]
            .location
            .as_deref()
            .unwrap()
            .ends_with("plan.md:8"));
    }

    #[test]
    fn test_unknown_dependency() {
        let text = valid_plan().replace("**Depends On:** Task 1", "**Depends On:** Task 99");
        let errs = error_messages(&check(&text));
        assert_eq!(errs, vec!["task 2 depends on unknown task 99"]);
    }

    #[test]
    fn test_self_dependency() {
        let text = valid_plan().replace("**Depends On:** Task 1", "**Depends On:** Task 2");
        let errs = error_messages(&check(&text));
        assert_eq!(errs, vec!["task 2 cannot depend on itself"]);
    }

    #[test]
    fn test_free_text_depends_on_is_invalid() {
        let text = valid_plan().replace("**Depends On:** Task 1", "**Depends On:** the backend");
        let errs = error_messages(&check(&text));
        assert_eq!(errs, vec!["task 2 has invalid depends on `the backend`"]);
    }

    #[test]
    fn test_dependency_cycle_reports_path_once() {
        let text = valid_plan().replace("**Depends On:** None", "**Depends On:** Task 2");
        let report = check(&text);
        let errs = error_messages(&report);
        assert_eq!(errs, vec!["task dependency cycle detected: 1 -> 2 -> 1"]);
        let cycle = report.findings().iter().find(|f| f.message.contains("cycle")).unwrap();
        assert_eq!(cycle.location.as_deref(), Some("plan.md"));
    }

    #[test]
    fn test_idempotent_reports() {
        let text = valid_plan().replace("**Priority:** P1", "**Priority:** high");
        let a = check(&text);
        let b = check(&text);
        assert_eq!(a.findings(), b.findings());
    }
}
