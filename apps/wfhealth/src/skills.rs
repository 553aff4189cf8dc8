//! Skill contract check: every workflow skill document must carry its
//! `<!-- workflow-contract: name -->` markers.

use crate::fsutil;
use crate::models::contract::{SkillContract, SKILL_CONTRACTS};
use crate::models::{Finding, Report};
use rayon::prelude::*;
use regex::Regex;
use std::collections::HashSet;
use std::path::Path;
use std::sync::OnceLock;

pub const REPORT_NAME: &str = "skills";

fn marker_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"<!--\s*workflow-contract:\s*([a-zA-Z0-9._-]+)\s*-->")
            .expect("marker regex must compile")
    })
}

/// Lowercased marker names declared in `text`.
pub fn collect_markers(text: &str) -> HashSet<String> {
    marker_re()
        .captures_iter(text)
        .map(|c| c[1].to_lowercase())
        .collect()
}

/// Check every skill in the contract table under `skills_root`.
pub fn check_skills(skills_root: &Path) -> Report {
    check_contracts(skills_root, SKILL_CONTRACTS)
}

/// Check `contracts` under `skills_root`. Files are scanned in parallel;
/// findings keep table order.
pub fn check_contracts(skills_root: &Path, contracts: &[SkillContract]) -> Report {
    let mut report = Report::for_target(REPORT_NAME, skills_root);
    let per_skill: Vec<Vec<Finding>> = contracts
        .par_iter()
        .map(|contract| check_one(skills_root, contract).into_findings())
        .collect();
    report.extend(per_skill.into_iter().flatten());
    report
}

fn check_one(skills_root: &Path, contract: &SkillContract) -> Report {
    let path = skills_root.join(contract.path);
    let mut report = Report::new(REPORT_NAME);
    let Some(text) = fsutil::read_for_report(&path, &mut report) else {
        return report;
    };
    let found = collect_markers(&text);
    let location = path.display().to_string();
    for marker in contract.markers {
        if !found.contains(&marker.to_lowercase()) {
            report.error(
                format!("Missing workflow contract marker `{}`", marker),
                &location,
            );
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Severity;
    use std::fs;
    use tempfile::tempdir;

    fn write_skill(root: &Path, contract: &SkillContract, skip: Option<&str>) {
        let path = root.join(contract.path);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        let body: Vec<String> = contract
            .markers
            .iter()
            .filter(|m| Some(**m) != skip)
            .map(|m| format!("<!-- workflow-contract: {} -->", m))
            .collect();
        fs::write(&path, format!("# Skill\n\n{}\n", body.join("\n"))).unwrap();
    }

    #[test]
    fn test_collect_markers_is_case_insensitive() {
        let text = "<!--workflow-contract:Foo.Bar-->\n<!--  workflow-contract:  baz_1  -->\n";
        let found = collect_markers(text);
        assert!(found.contains("foo.bar"));
        assert!(found.contains("baz_1"));
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn test_all_markers_present_passes() {
        let dir = tempdir().unwrap();
        for c in SKILL_CONTRACTS {
            write_skill(dir.path(), c, None);
        }
        let report = check_skills(dir.path());
        assert!(report.findings().is_empty(), "{:?}", report.findings());
    }

    #[test]
    fn test_missing_marker_and_missing_file_in_table_order() {
        let dir = tempdir().unwrap();
        for (i, c) in SKILL_CONTRACTS.iter().enumerate() {
            match i {
                0 => {}
                1 => write_skill(dir.path(), c, Some(c.markers[0])),
                _ => write_skill(dir.path(), c, None),
            }
        }
        let report = check_skills(dir.path());
        assert_eq!(report.errors(), 2, "{:?}", report.findings());
        assert!(report.findings()[0].message.contains("does not exist"));
        assert_eq!(
            report.findings()[1].message,
            format!(
                "Missing workflow contract marker `{}`",
                SKILL_CONTRACTS[1].markers[0]
            )
        );
        assert!(report
            .findings()
            .iter()
            .all(|f| f.severity == Severity::Error));
    }

    #[test]
    fn test_uppercase_marker_in_document_matches() {
        let dir = tempdir().unwrap();
        let contract = SkillContract {
            path: "demo/SKILL.md",
            markers: &["demo.step_one"],
        };
        let path = dir.path().join(contract.path);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "<!-- workflow-contract: DEMO.STEP_ONE -->").unwrap();
        let report = check_contracts(dir.path(), &[contract]);
        assert!(report.findings().is_empty());
    }
}
