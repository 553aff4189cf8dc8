//! Shared data models for check outputs and the artifact contracts.

pub mod contract;

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
/// Finding severity. Only `Error` blocks by default.
pub enum Severity {
    Error,
    Warn,
    Info,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Error => "ERROR",
            Severity::Warn => "WARN",
            Severity::Info => "INFO",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// A single finding with severity and optional `path` or `path:line` location.
pub struct Finding {
    pub severity: Severity,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
/// Ordered, append-only findings produced by one check.
///
/// Findings can only be appended. Counts are derived from them on every
/// call; nothing is cached.
pub struct Report {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<PathBuf>,
    findings: Vec<Finding>,
}

impl Report {
    pub fn new(name: impl Into<String>) -> Self {
        Report {
            name: name.into(),
            target: None,
            findings: Vec::new(),
        }
    }

    /// Report bound to the document it describes.
    pub fn for_target(name: impl Into<String>, target: impl Into<PathBuf>) -> Self {
        Report {
            target: Some(target.into()),
            ..Report::new(name)
        }
    }

    /// Append a finding. An empty `location` is stored as no location.
    pub fn add(&mut self, severity: Severity, message: impl Into<String>, location: &str) {
        self.findings.push(Finding {
            severity,
            message: message.into(),
            location: (!location.is_empty()).then(|| location.to_string()),
        });
    }

    /// Append findings produced elsewhere, keeping their order.
    pub fn extend(&mut self, findings: impl IntoIterator<Item = Finding>) {
        self.findings.extend(findings);
    }

    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    pub fn into_findings(self) -> Vec<Finding> {
        self.findings
    }

    pub fn error(&mut self, message: impl Into<String>, location: &str) {
        self.add(Severity::Error, message, location);
    }

    pub fn warn(&mut self, message: impl Into<String>, location: &str) {
        self.add(Severity::Warn, message, location);
    }

    pub fn info(&mut self, message: impl Into<String>, location: &str) {
        self.add(Severity::Info, message, location);
    }

    pub fn errors(&self) -> usize {
        self.count(Severity::Error)
    }

    pub fn warnings(&self) -> usize {
        self.count(Severity::Warn)
    }

    pub fn infos(&self) -> usize {
        self.count(Severity::Info)
    }

    fn count(&self, severity: Severity) -> usize {
        self.findings
            .iter()
            .filter(|f| f.severity == severity)
            .count()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
/// Aggregated counts across reports used by printers and the exit gate.
pub struct Summary {
    pub errors: usize,
    pub warnings: usize,
    pub infos: usize,
}

impl Summary {
    pub fn of(reports: &[Report]) -> Self {
        reports.iter().fold(Summary::default(), |acc, r| Summary {
            errors: acc.errors + r.errors(),
            warnings: acc.warnings + r.warnings(),
            infos: acc.infos + r.infos(),
        })
    }
}
