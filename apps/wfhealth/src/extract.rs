//! Label-line extraction for plan documents.
//!
//! Plans are not parsed as markdown. Task sections are found by their
//! `### Task <id>: <title>` headers and fields by `**Label:** value` lines.

use regex::Regex;
use std::sync::OnceLock;

/// One `### Task` section. `block` holds the header line and every line up
/// to (not including) the next task header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub start_line: usize,
    pub block: Vec<String>,
}

fn task_header_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^###\s+Task\s+([0-9]+(?:\.[0-9]+)*):\s+(.+)$")
            .expect("task header regex must compile")
    })
}

fn task_ref_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)Task\s+([0-9]+(?:\.[0-9]+)*)").expect("task ref regex must compile")
    })
}

/// Split plan text into task sections, in document order.
pub fn parse_tasks(text: &str) -> Vec<Task> {
    let lines: Vec<&str> = text.lines().collect();
    let starts: Vec<(String, String, usize)> = lines
        .iter()
        .enumerate()
        .filter_map(|(idx, line)| {
            let caps = task_header_re().captures(line.trim())?;
            Some((caps[1].to_string(), caps[2].trim().to_string(), idx + 1))
        })
        .collect();

    starts
        .iter()
        .enumerate()
        .map(|(i, (id, title, start_line))| {
            let end_line = starts
                .get(i + 1)
                .map(|next| next.2 - 1)
                .unwrap_or(lines.len());
            Task {
                id: id.clone(),
                title: title.clone(),
                start_line: *start_line,
                block: lines[start_line - 1..end_line]
                    .iter()
                    .map(|l| l.to_string())
                    .collect(),
            }
        })
        .collect()
}

/// Value of the first `**<label>:** value` line, trimmed; empty when absent.
///
/// The label comparison is case-insensitive. No other normalization is done.
pub fn extract_field<S: AsRef<str>>(block: &[S], label: &str) -> String {
    let marker = format!("**{}:**", label);
    block
        .iter()
        .find_map(|line| {
            let line = line.as_ref().trim_start();
            let head = line.get(..marker.len())?;
            head.eq_ignore_ascii_case(&marker)
                .then(|| line[marker.len()..].trim().to_string())
        })
        .unwrap_or_default()
}

/// Task ids referenced by a `Depends On` value. `none` and empty yield nothing.
pub fn parse_depends(raw: &str) -> Vec<String> {
    let value = raw.trim();
    if value.is_empty() || value.eq_ignore_ascii_case("none") {
        return Vec::new();
    }
    task_ref_re()
        .captures_iter(value)
        .map(|c| c[1].to_string())
        .collect()
}
