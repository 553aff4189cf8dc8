//! Check orchestration: target discovery, mode dispatch, and the exit gate.

use crate::config::{Effective, FailOn, Output};
use crate::fsutil::latest_file;
use crate::models::{Report, Summary};
use crate::utils::{info_prefix, rel_to_wd};
use crate::{issues, plan, skills};
use std::path::{Path, PathBuf};

pub const EXIT_OK: i32 = 0;
pub const EXIT_ERRORS: i32 = 1;
/// Warnings under `--fail-on warning`; also used for configuration errors.
pub const EXIT_WARNINGS: i32 = 2;
pub const EXIT_RUNTIME: i32 = 3;

pub const PLAN_PATTERN: &str = "*.md";
pub const ISSUES_PATTERN: &str = "*.jsonl";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Plan,
    Issues,
    Skills,
    Full,
}

/// Run the checks for `mode`. Report order is fixed: skills, plan, issues.
pub fn run_checks(eff: &Effective, mode: Mode) -> Vec<Report> {
    match mode {
        Mode::Plan => vec![plan_report(eff, true)],
        Mode::Issues => vec![issues_report(eff, true)],
        Mode::Skills => vec![skills::check_skills(&eff.skills_root)],
        Mode::Full => {
            let mut reports = Vec::with_capacity(3);
            if eff.include_skills {
                reports.push(skills::check_skills(&eff.skills_root));
            }
            let (plan, issues) = rayon::join(
                || plan_report(eff, eff.require_plan),
                || issues_report(eff, eff.require_issues),
            );
            reports.push(plan);
            reports.push(issues);
            reports
        }
    }
}

/// Validate the explicit or newest plan. A missing plan is an ERROR when
/// `required`, otherwise an INFO skip.
pub fn plan_report(eff: &Effective, required: bool) -> Report {
    match target(eff, eff.plan.as_ref(), &eff.plans_dir, PLAN_PATTERN, "plan") {
        Some(path) => plan::validate_plan(&path),
        None => missing_target(plan::REPORT_NAME, "plan", "Plan", eff, &eff.plans_dir, required),
    }
}

/// Validate the explicit or newest non-archived issues snapshot.
pub fn issues_report(eff: &Effective, required: bool) -> Report {
    match target(
        eff,
        eff.issues.as_ref(),
        &eff.issues_dir,
        ISSUES_PATTERN,
        "issues",
    ) {
        Some(path) => issues::validate_issues(&path, &eff.project_root),
        None => missing_target(
            issues::REPORT_NAME,
            "issues",
            "Issues",
            eff,
            &eff.issues_dir,
            required,
        ),
    }
}

fn target(
    eff: &Effective,
    explicit: Option<&PathBuf>,
    dir: &Path,
    pattern: &str,
    kind: &str,
) -> Option<PathBuf> {
    if let Some(p) = explicit {
        return Some(p.clone());
    }
    let found = latest_file(dir, pattern)?;
    if eff.output == Output::Human {
        eprintln!(
            "{} Using latest {} file: {}",
            info_prefix(),
            kind,
            rel_to_wd(&found)
        );
    }
    Some(found)
}

fn missing_target(
    name: &str,
    kind: &str,
    title: &str,
    eff: &Effective,
    dir: &Path,
    required: bool,
) -> Report {
    let shown = pathdiff::diff_paths(dir, &eff.project_root)
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| dir.to_path_buf());
    let mut report = Report::new(name);
    if required {
        report.error(
            format!("No {} file found under {}", kind, shown.display()),
            "",
        );
    } else {
        report.info(
            format!(
                "{} check skipped: no {} file found under {}",
                title,
                kind,
                shown.display()
            ),
            "",
        );
    }
    report
}

/// Map totals to a process exit code under the `fail_on` policy.
pub fn decide_exit_code(summary: &Summary, fail_on: FailOn) -> i32 {
    match fail_on {
        FailOn::Never => EXIT_OK,
        _ if summary.errors > 0 => EXIT_ERRORS,
        FailOn::Warning if summary.warnings > 0 => EXIT_WARNINGS,
        _ => EXIT_OK,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{resolve_effective, CliOverrides};
    use crate::models::Severity;
    use std::fs;
    use tempfile::{tempdir, TempDir};

    fn project() -> TempDir {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();
        dir
    }

    fn effective(root: &Path, tweak: impl FnOnce(&mut CliOverrides)) -> Effective {
        let mut cli = CliOverrides {
            project_root: Some(root.to_path_buf()),
            output: Some(Output::Json),
            ..CliOverrides::default()
        };
        tweak(&mut cli);
        resolve_effective(&cli).unwrap()
    }

    fn summary(errors: usize, warnings: usize) -> Summary {
        Summary {
            errors,
            warnings,
            infos: 0,
        }
    }

    #[test]
    fn test_exit_code_policy() {
        assert_eq!(decide_exit_code(&summary(3, 3), FailOn::Never), EXIT_OK);
        assert_eq!(decide_exit_code(&summary(1, 0), FailOn::Error), EXIT_ERRORS);
        assert_eq!(decide_exit_code(&summary(1, 2), FailOn::Warning), EXIT_ERRORS);
        assert_eq!(decide_exit_code(&summary(0, 2), FailOn::Warning), EXIT_WARNINGS);
        assert_eq!(decide_exit_code(&summary(0, 2), FailOn::Error), EXIT_OK);
        assert_eq!(decide_exit_code(&summary(0, 0), FailOn::Warning), EXIT_OK);
    }

    #[test]
    fn test_full_mode_without_files_is_non_blocking() {
        let dir = project();
        let eff = effective(dir.path(), |_| {});
        let reports = run_checks(&eff, Mode::Full);
        let names: Vec<&str> = reports.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["plan", "issues"]);
        assert!(reports
            .iter()
            .all(|r| r.findings().len() == 1 && r.findings()[0].severity == Severity::Info));
        assert_eq!(
            reports[0].findings()[0].message,
            "Plan check skipped: no plan file found under docs/plans"
        );
        let s = Summary::of(&reports);
        assert_eq!(decide_exit_code(&s, eff.fail_on), EXIT_OK);
    }

    #[test]
    fn test_required_plan_missing_blocks_full_mode() {
        let dir = project();
        let eff = effective(dir.path(), |c| c.require_plan = true);
        let reports = run_checks(&eff, Mode::Full);
        assert_eq!(reports[0].errors(), 1);
        assert_eq!(reports[0].findings()[0].message, "No plan file found under docs/plans");
        assert_eq!(reports[1].errors(), 0);
        assert_eq!(decide_exit_code(&Summary::of(&reports), eff.fail_on), EXIT_ERRORS);
    }

    #[test]
    fn test_single_modes_require_their_file() {
        let dir = project();
        let eff = effective(dir.path(), |_| {});
        let plan = run_checks(&eff, Mode::Plan);
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].errors(), 1);
        let issues = run_checks(&eff, Mode::Issues);
        assert_eq!(issues[0].findings()[0].message, "No issues file found under docs/issues");
    }

    #[test]
    fn test_discovery_skips_archived_snapshot() {
        let dir = project();
        let issues_dir = dir.path().join("docs/issues");
        fs::create_dir_all(&issues_dir).unwrap();
        fs::write(issues_dir.join("2026-01-01-old.archived.jsonl"), "").unwrap();
        let eff = effective(dir.path(), |_| {});
        let reports = run_checks(&eff, Mode::Issues);
        assert!(reports[0].findings()[0].message.starts_with("No issues file found"));

        fs::write(issues_dir.join("2026-02-01-live.jsonl"), "").unwrap();
        let reports = run_checks(&eff, Mode::Issues);
        assert!(reports[0]
            .target
            .as_deref()
            .is_some_and(|t| t.ends_with("2026-02-01-live.jsonl")));
        assert!(reports[0].findings()[0].message.contains("empty"));
    }

    #[test]
    fn test_explicit_missing_plan_reports_read_error() {
        let dir = project();
        let eff = effective(dir.path(), |c| c.plan = Some(PathBuf::from("nope.md")));
        let reports = run_checks(&eff, Mode::Full);
        assert!(reports[0].findings()[0].message.contains("does not exist"));
        assert_eq!(reports[0].target.as_deref(), Some(eff.project_root.join("nope.md").as_path()));
    }

    #[test]
    fn test_full_mode_puts_skills_first() {
        let dir = project();
        let eff = effective(dir.path(), |c| c.include_skills = true);
        let reports = run_checks(&eff, Mode::Full);
        let names: Vec<&str> = reports.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["skills", "plan", "issues"]);
        assert!(reports[0].errors() > 0);
    }
}
