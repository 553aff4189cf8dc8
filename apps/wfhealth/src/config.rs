//! Configuration discovery and effective settings resolution.
//!
//! wfhealth reads `wfhealth.toml|yaml|yml` from the project root (the
//! closest ancestor holding a config file or `.git`) and merges it with CLI
//! flags to produce an `Effective` config.
//! Defaults:
//! - `output`: `human`
//! - `fail_on`: `error`
//! - `plans_dir`: `docs/plans`
//! - `issues_dir`: `docs/issues`
//! - `skills_root`: `skills`
//! - `full.{include_skills,require_plan,require_issues}`: false
//!
//! Overrides precedence: CLI > config file > defaults.

use crate::fsutil::resolve_under;
use serde::Deserialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const CONFIG_FILES: &[&str] = &["wfhealth.toml", "wfhealth.yaml", "wfhealth.yml"];
pub const DEFAULT_PLANS_DIR: &str = "docs/plans";
pub const DEFAULT_ISSUES_DIR: &str = "docs/issues";
pub const DEFAULT_SKILLS_ROOT: &str = "skills";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
/// Report rendering mode.
pub enum Output {
    #[default]
    Human,
    Json,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
/// Lowest severity that makes the run fail.
pub enum FailOn {
    #[default]
    Error,
    Warning,
    Never,
}

#[derive(Debug, Default, Deserialize, Clone)]
/// `[full]` section: knobs for the combined run.
pub struct FullCfg {
    pub include_skills: Option<bool>,
    pub require_plan: Option<bool>,
    pub require_issues: Option<bool>,
}

#[derive(Debug, Default, Deserialize, Clone)]
/// Root configuration loaded from `wfhealth.toml|yaml`.
pub struct HealthConfig {
    pub output: Option<Output>,
    pub fail_on: Option<FailOn>,
    pub plans_dir: Option<String>,
    pub issues_dir: Option<String>,
    pub skills_root: Option<String>,
    #[serde(default)]
    pub full: Option<FullCfg>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid TOML in {}: {source}", .path.display())]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid YAML in {}: {source}", .path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

#[derive(Debug, Default, Clone)]
/// Values taken from the command line. `None`/`false` defers to config.
pub struct CliOverrides {
    pub project_root: Option<PathBuf>,
    pub output: Option<Output>,
    pub fail_on: Option<FailOn>,
    pub strict_warnings: bool,
    pub plan: Option<PathBuf>,
    pub issues: Option<PathBuf>,
    pub skills_root: Option<PathBuf>,
    pub include_skills: bool,
    pub require_plan: bool,
    pub require_issues: bool,
}

#[derive(Debug, Clone)]
/// Fully-resolved configuration used by the runner after applying precedence.
/// All paths are absolute or rooted at `project_root`.
pub struct Effective {
    pub project_root: PathBuf,
    /// Config file the settings came from, if any.
    pub config_file: Option<PathBuf>,
    pub output: Output,
    pub fail_on: FailOn,
    pub plan: Option<PathBuf>,
    pub issues: Option<PathBuf>,
    pub plans_dir: PathBuf,
    pub issues_dir: PathBuf,
    pub skills_root: PathBuf,
    pub include_skills: bool,
    pub require_plan: bool,
    pub require_issues: bool,
}

/// Walk upward from `start` to detect the project root.
///
/// Stops when a `wfhealth.toml|yaml|yml` or a `.git` entry is found.
pub fn detect_project_root(start: &Path) -> PathBuf {
    let mut cur = start;
    loop {
        if find_config_file(cur).is_some() || cur.join(".git").exists() {
            return cur.to_path_buf();
        }
        match cur.parent() {
            Some(p) => cur = p,
            None => return start.to_path_buf(),
        }
    }
}

/// First existing config file in `root`, TOML preferred.
pub fn find_config_file(root: &Path) -> Option<PathBuf> {
    CONFIG_FILES
        .iter()
        .map(|name| root.join(name))
        .find(|p| p.is_file())
}

/// Load `HealthConfig` from `root`. `Ok(None)` when no config file exists.
pub fn load_config(root: &Path) -> Result<Option<HealthConfig>, ConfigError> {
    let Some(path) = find_config_file(root) else {
        return Ok(None);
    };
    let text = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
        path: path.clone(),
        source,
    })?;
    let is_toml = path.extension().is_some_and(|e| e == "toml");
    let cfg = if is_toml {
        toml::from_str(&text).map_err(|source| ConfigError::Toml {
            path: path.clone(),
            source,
        })?
    } else if text.trim().is_empty() {
        HealthConfig::default()
    } else {
        serde_yaml::from_str(&text).map_err(|source| ConfigError::Yaml {
            path: path.clone(),
            source,
        })?
    };
    Ok(Some(cfg))
}

/// Resolve `Effective` by merging CLI flags, discovered config, and defaults.
pub fn resolve_effective(cli: &CliOverrides) -> Result<Effective, ConfigError> {
    let start = cli
        .project_root
        .clone()
        .unwrap_or_else(|| PathBuf::from("."));
    let start = fs::canonicalize(&start).unwrap_or(start);
    let project_root = detect_project_root(&start);
    let config_file = find_config_file(&project_root);
    let cfg = load_config(&project_root)?.unwrap_or_default();
    let full = cfg.full.clone().unwrap_or_default();

    let output = cli.output.or(cfg.output).unwrap_or_default();
    let fail_on = if cli.strict_warnings {
        FailOn::Warning
    } else {
        cli.fail_on.or(cfg.fail_on).unwrap_or_default()
    };

    let under_root = |p: &Path| resolve_under(&project_root, p);
    let dir_or = |cli_value: Option<&PathBuf>, cfg_value: Option<&String>, default: &str| {
        match cli_value {
            Some(p) => under_root(p),
            None => under_root(Path::new(cfg_value.map_or(default, String::as_str))),
        }
    };

    Ok(Effective {
        plan: cli.plan.as_deref().map(under_root),
        issues: cli.issues.as_deref().map(under_root),
        plans_dir: dir_or(None, cfg.plans_dir.as_ref(), DEFAULT_PLANS_DIR),
        issues_dir: dir_or(None, cfg.issues_dir.as_ref(), DEFAULT_ISSUES_DIR),
        skills_root: dir_or(
            cli.skills_root.as_ref(),
            cfg.skills_root.as_ref(),
            DEFAULT_SKILLS_ROOT,
        ),
        include_skills: cli.include_skills || full.include_skills.unwrap_or(false),
        require_plan: cli.require_plan || full.require_plan.unwrap_or(false),
        require_issues: cli.require_issues || full.require_issues.unwrap_or(false),
        output,
        fail_on,
        config_file,
        project_root,
    })
}
