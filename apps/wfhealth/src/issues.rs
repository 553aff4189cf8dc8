//! Issues snapshot validation.
//!
//! A snapshot is JSONL: the first object is the meta record, the rest are
//! issue records. Every malformed line or field becomes a finding; only a
//! read failure, an empty file, or a snapshot without issue rows ends the
//! pass early.
//!
//! Pass order:
//! - parse every non-blank line (bad lines are reported and skipped)
//! - meta: `type`, required fields, `schema_version`, `archived`,
//!   `execution_context` (INFO only), `source`
//! - per issue: required fields, enums, types, refs, committed consistency
//! - cross issue: dependency references, then one cycle search

use crate::fsutil;
use crate::git;
use crate::graph::detect_cycle;
use crate::models::contract::{
    IssueSchema, APPEND_ORIGIN, COMMITTED, DONE, EXECUTION_CONTEXT_KEYS, KNOWN_SCHEMA_VERSIONS,
    META_FIELDS, META_TYPE, PRIORITIES,
};
use crate::models::Report;
use regex::Regex;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;

pub const REPORT_NAME: &str = "issues";

type Record = Map<String, Value>;

fn ref_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(.+):(\d+)(?:-(\d+))?$").expect("ref regex must compile"))
}

fn parent_issue_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"parent_issue:\s*([^;\s]+)").expect("parent issue regex must compile")
    })
}

/// Validate the snapshot at `path`; refs and `source` resolve under `project_root`.
pub fn validate_issues(path: &Path, project_root: &Path) -> Report {
    validate_issues_with(path, project_root, git::detect_git_branch)
}

/// Like `validate_issues`, with an explicit current-branch lookup used for
/// execution-context fallback messages. The lookup runs at most once.
pub fn validate_issues_with<F>(path: &Path, project_root: &Path, branch_lookup: F) -> Report
where
    F: Fn(&Path) -> String,
{
    let mut report = Report::for_target(REPORT_NAME, path);
    if let Some(text) = fsutil::read_for_report(path, &mut report) {
        check_issues_text(
            &text,
            &path.display().to_string(),
            project_root,
            &branch_lookup,
            &mut report,
        );
    }
    report
}

/// Validate snapshot `text`, attributing findings to `source`.
pub fn check_issues_text(
    text: &str,
    source: &str,
    project_root: &Path,
    branch_lookup: &dyn Fn(&Path) -> String,
    report: &mut Report,
) {
    let lines: Vec<(usize, &str)> = text
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| (idx + 1, line))
        .collect();
    if lines.is_empty() {
        report.error("JSONL is empty", source);
        return;
    }

    let mut rows: Vec<(usize, Record)> = Vec::new();
    for (line_no, line) in lines {
        if let Some(record) = parse_row(line, &format!("{}:{}", source, line_no), report) {
            rows.push((line_no, record));
        }
    }
    let Some(((meta_line, meta), issue_rows)) = rows.split_first() else {
        return;
    };

    let meta_loc = format!("{}:{}", source, meta_line);
    let schema = check_meta(meta, &meta_loc, project_root, branch_lookup, report);

    if issue_rows.is_empty() {
        report.error("No issue rows after meta", source);
        return;
    }

    if let Some(declared) = meta.get("total_issues").and_then(Value::as_i64) {
        if declared != issue_rows.len() as i64 {
            report.error(
                format!(
                    "Meta total_issues={} does not match actual={}",
                    declared,
                    issue_rows.len()
                ),
                &meta_loc,
            );
        }
    }

    // Records with a usable id; only the first record per id is canonical.
    let mut identified: Vec<(&str, String, &Record, bool)> = Vec::new();
    let mut first_line: HashMap<&str, usize> = HashMap::new();
    for (line_no, issue) in issue_rows {
        let loc = format!("{}:{}", source, line_no);
        check_issue(issue, &loc, schema, project_root, report);

        let id = match issue.get("id").and_then(Value::as_str) {
            Some(id) if !id.trim().is_empty() => id,
            _ => {
                report.error("Issue `id` must be a non-empty string", &loc);
                continue;
            }
        };
        let canonical = match first_line.get(id) {
            Some(first) => {
                report.error(
                    format!("Duplicate issue id `{}` (first defined at line {})", id, first),
                    &loc,
                );
                false
            }
            None => {
                first_line.insert(id, *line_no);
                true
            }
        };
        identified.push((id, loc, issue, canonical));
    }

    // Every record's entries are checked; only canonical records add edges.
    let mut ids: Vec<&str> = Vec::new();
    let mut edges: HashMap<String, Vec<String>> = HashMap::new();
    for (id, loc, issue, canonical) in &identified {
        if *canonical {
            ids.push(*id);
        }
        let Some(Value::Array(deps)) = issue.get("depends_on") else {
            continue;
        };
        let mut targets = Vec::new();
        for dep in deps {
            match dep.as_str().filter(|d| !d.trim().is_empty()) {
                None => report.error("depends_on entries must be non-empty strings", loc),
                Some(d) if d == *id => {
                    report.error(format!("Issue `{}` cannot depend on itself", id), loc)
                }
                Some(d) if !first_line.contains_key(d) => report.error(
                    format!("Issue `{}` depends on unknown id `{}`", id, d),
                    loc,
                ),
                Some(d) => targets.push(d.to_string()),
            }
        }
        if *canonical {
            edges.insert(id.to_string(), targets);
        }
    }

    if let Some(cycle) = detect_cycle(&ids, &edges) {
        report.error(
            format!("Issue dependency cycle detected: {}", cycle.join(" -> ")),
            source,
        );
    }
}

fn parse_row(line: &str, loc: &str, report: &mut Report) -> Option<Record> {
    match serde_json::from_str::<Value>(line) {
        Ok(Value::Object(record)) => Some(record),
        Ok(_) => {
            report.error("JSONL line must be a JSON object", loc);
            None
        }
        Err(e) => {
            report.error(format!("Invalid JSON: {}", e), loc);
            None
        }
    }
}

/// Check the meta record and return the issue layout it declares.
fn check_meta(
    meta: &Record,
    loc: &str,
    project_root: &Path,
    branch_lookup: &dyn Fn(&Path) -> String,
    report: &mut Report,
) -> IssueSchema {
    if meta.get("type").and_then(Value::as_str) != Some(META_TYPE) {
        report.error("First line must be `type=meta`", loc);
    }
    for field in META_FIELDS {
        if !meta.contains_key(*field) {
            report.error(format!("Meta missing field `{}`", field), loc);
        }
    }

    let schema = match meta.get("schema_version") {
        None => {
            report.warn("Meta missing `schema_version`; assuming version 1", loc);
            IssueSchema::V1
        }
        Some(v) => match v.as_i64().and_then(IssueSchema::from_version) {
            Some(schema) => schema,
            None => {
                let known: Vec<String> =
                    KNOWN_SCHEMA_VERSIONS.iter().map(|v| v.to_string()).collect();
                report.error(
                    format!(
                        "Unsupported schema_version `{}` (known: {})",
                        show(Some(v)),
                        known.join(", ")
                    ),
                    loc,
                );
                IssueSchema::V1
            }
        },
    };

    if meta.get("archived").and_then(Value::as_bool) == Some(true) {
        report.warn(
            "Snapshot is archived (`archived=true`); it should not drive execution",
            loc,
        );
    }

    check_execution_context(meta, loc, project_root, branch_lookup, report);

    if let Some(Value::String(src)) = meta.get("source") {
        if !src.trim().is_empty() && !fsutil::resolve_under(project_root, Path::new(src)).exists()
        {
            report.info(
                format!("Meta source path not found (non-blocking): {}", src),
                loc,
            );
        }
    }
    schema
}

/// Every finding here is INFO: callers fall back to the project root and
/// the current branch when the context is absent or incomplete.
fn check_execution_context(
    meta: &Record,
    loc: &str,
    project_root: &Path,
    branch_lookup: &dyn Fn(&Path) -> String,
    report: &mut Report,
) {
    let ctx = match meta.get("execution_context") {
        None | Some(Value::Null) => {
            report.info(
                "Meta `execution_context` missing; using fallback context (project_root/current_branch)",
                loc,
            );
            return;
        }
        Some(Value::Object(ctx)) => ctx,
        Some(_) => {
            report.info(
                "Meta `execution_context` is not an object; fallback context will be used",
                loc,
            );
            return;
        }
    };

    let mut branch: Option<String> = None;
    for key in EXECUTION_CONTEXT_KEYS {
        let problem = match ctx.get(*key) {
            Some(Value::String(s)) if !s.trim().is_empty() => continue,
            None | Some(Value::Null) | Some(Value::String(_)) => "missing",
            Some(_) => "not a string",
        };
        let fallback = if *key == "worktree_path" {
            project_root.display().to_string()
        } else {
            branch
                .get_or_insert_with(|| branch_lookup(project_root))
                .clone()
        };
        report.info(
            format!(
                "Meta execution_context `{}` {}; fallback available ({})",
                key, problem, fallback
            ),
            loc,
        );
    }
}

/// Field, enum, ref, and consistency checks local to one issue record.
fn check_issue(
    issue: &Record,
    loc: &str,
    schema: IssueSchema,
    project_root: &Path,
    report: &mut Report,
) {
    for field in schema.required_fields() {
        if !issue.contains_key(*field) {
            report.error(format!("Issue missing field `{}`", field), loc);
        }
    }

    let priority = issue.get("priority");
    if !priority
        .and_then(Value::as_str)
        .is_some_and(|p| PRIORITIES.contains(&p))
    {
        report.error(format!("Invalid priority `{}`", show(priority)), loc);
    }

    for (field, allowed) in schema.status_enums() {
        let value = issue.get(field);
        if !value
            .and_then(Value::as_str)
            .is_some_and(|v| allowed.contains(&v))
        {
            report.error(format!("Invalid {} `{}`", field, show(value)), loc);
        }
    }

    if !matches!(issue.get("blocked"), Some(Value::Bool(_))) {
        report.error("`blocked` must be boolean", loc);
    }

    if !matches!(issue.get("depends_on"), Some(Value::Array(_))) {
        report.error("`depends_on` must be an array", loc);
    }

    match issue.get("refs") {
        Some(Value::Array(refs)) if !refs.is_empty() => {
            for r in refs {
                check_ref(r, loc, project_root, report);
            }
        }
        _ => report.error("`refs` must be a non-empty array", loc),
    }

    if issue.get("git_state").and_then(Value::as_str) == Some(COMMITTED) {
        for field in schema.work_state_fields() {
            if issue.get(*field).and_then(Value::as_str) != Some(DONE) {
                report.error(
                    format!("Committed issue must have `{}={}`", field, DONE),
                    loc,
                );
            }
        }
        if issue.get("blocked").and_then(Value::as_bool) == Some(true) {
            report.error("Committed issue cannot be blocked", loc);
        }
    }

    if let Some(notes) = issue.get("notes").and_then(Value::as_str) {
        if notes.contains(APPEND_ORIGIN) {
            let id = show(issue.get("id"));
            let msg = match parent_issue_re().captures(notes) {
                Some(c) => format!(
                    "Issue `{}` appended mid-execution (parent_issue: {})",
                    id, &c[1]
                ),
                None => format!("Issue `{}` appended mid-execution", id),
            };
            report.info(msg, loc);
        }
    }
}

fn check_ref(r: &Value, loc: &str, project_root: &Path, report: &mut Report) {
    let Some(text) = r.as_str() else {
        report.error("Each ref must be a string", loc);
        return;
    };
    let Some(caps) = ref_re().captures(text) else {
        report.error(
            format!(
                "Invalid ref format `{}` (expected path:line or path:line-line)",
                text
            ),
            loc,
        );
        return;
    };
    let ref_path = Path::new(caps.get(1).map_or("", |m| m.as_str()));
    if !fsutil::resolve_under(project_root, ref_path).exists() {
        report.info(
            format!(
                "Referenced path not found (non-blocking): {}",
                ref_path.display()
            ),
            loc,
        );
    }
}

/// Render a field value for messages; strings print bare.
fn show(value: Option<&Value>) -> String {
    match value {
        None => "<missing>".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
