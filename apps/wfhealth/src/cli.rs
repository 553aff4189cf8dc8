//! CLI argument parsing via `clap`.

use crate::config::{CliOverrides, FailOn, Output};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "wfhealth",
    version,
    about = "Workflow health checker for plans, issue snapshots, and skill contracts",
    long_about = "wfhealth validates implementation plans (markdown) and issue snapshots (JSONL) against the workflow contract, and checks that workflow skill documents carry their contract markers.\n\nConfiguration precedence: CLI > wfhealth.toml > defaults.",
    after_help = "Examples:\n  wfhealth plan\n  wfhealth issues --issues docs/issues/2026-02-18_feat.jsonl --output json\n  wfhealth full --include-skills --fail-on warning",
    arg_required_else_help = true
)]
/// Top-level CLI options and subcommands.
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Args, Debug, Default, Clone)]
/// Flags shared by every check subcommand.
pub struct CommonArgs {
    #[arg(
        long,
        visible_alias = "root",
        help = "Project root (default: nearest ancestor with wfhealth.toml or .git)"
    )]
    pub project_root: Option<PathBuf>,
    #[arg(long, value_enum, help = "Output mode (default: human)")]
    pub output: Option<Output>,
    #[arg(long, value_enum, help = "Lowest severity that fails the run (default: error)")]
    pub fail_on: Option<FailOn>,
    #[arg(long, help = "Deprecated alias for --fail-on warning")]
    pub strict_warnings: bool,
}

#[derive(Subcommand, Debug)]
/// Supported subcommands.
pub enum Commands {
    /// Show version
    #[command(about = "Show version", long_about = "Print the current wfhealth version.")]
    Version,
    /// Validate a plan document
    #[command(
        about = "Validate a plan document",
        long_about = "Check required headers, task fields, priorities, and task dependencies of a plan. Without --plan the newest *.md under plans_dir is used.",
        after_help = "Examples:\n  wfhealth plan\n  wfhealth plan --plan docs/plans/feature.md"
    )]
    Plan {
        #[command(flatten)]
        common: CommonArgs,
        #[arg(long, help = "Plan file (relative paths resolve under the project root)")]
        plan: Option<PathBuf>,
    },
    /// Validate an issues snapshot
    #[command(
        about = "Validate an issues snapshot",
        long_about = "Check the meta record, issue fields and states, refs, and issue dependencies of a JSONL snapshot. Without --issues the newest non-archived *.jsonl under issues_dir is used.",
        after_help = "Examples:\n  wfhealth issues\n  wfhealth issues --issues docs/issues/feature.jsonl --output json"
    )]
    Issues {
        #[command(flatten)]
        common: CommonArgs,
        #[arg(long, help = "Issues snapshot (relative paths resolve under the project root)")]
        issues: Option<PathBuf>,
    },
    /// Check skill contract markers
    #[command(
        about = "Check skill contract markers",
        long_about = "Verify that each workflow SKILL.md declares its required `<!-- workflow-contract: name -->` markers."
    )]
    Skills {
        #[command(flatten)]
        common: CommonArgs,
        #[arg(long, help = "Skills directory (default: skills)")]
        skills_root: Option<PathBuf>,
    },
    /// Run plan and issues checks together
    #[command(
        about = "Run plan and issues checks together",
        long_about = "Validate the plan and the issues snapshot (and optionally skills). Missing files are skipped with an INFO unless required.",
        after_help = "Examples:\n  wfhealth full\n  wfhealth full --require-plan --require-issues --include-skills"
    )]
    Full {
        #[command(flatten)]
        common: CommonArgs,
        #[arg(long)]
        plan: Option<PathBuf>,
        #[arg(long)]
        issues: Option<PathBuf>,
        #[arg(long, help = "Skills directory (default: skills)")]
        skills_root: Option<PathBuf>,
        #[arg(long, help = "Also run the skills check")]
        include_skills: bool,
        #[arg(long, help = "Fail when no plan file is found")]
        require_plan: bool,
        #[arg(long, help = "Fail when no issues snapshot is found")]
        require_issues: bool,
    },
}

impl CommonArgs {
    /// Start an override set from the shared flags.
    pub fn overrides(&self) -> CliOverrides {
        CliOverrides {
            project_root: self.project_root.clone(),
            output: self.output,
            fail_on: self.fail_on,
            strict_warnings: self.strict_warnings,
            ..CliOverrides::default()
        }
    }
}
