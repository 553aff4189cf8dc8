//! wfhealth CLI binary entry point.
//! Resolves configuration, runs the requested checks, and prints results.

use clap::Parser;
use std::panic::{self, AssertUnwindSafe};
use std::process;
use wfhealth::cli::{Cli, Commands};
use wfhealth::config::{self, CliOverrides};
use wfhealth::runner::{self, Mode, EXIT_RUNTIME, EXIT_WARNINGS};
use wfhealth::{output, utils};

fn main() {
    let cli = Cli::parse();
    let (overrides, mode) = match cli.cmd {
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            return;
        }
        Commands::Plan { common, plan } => (
            CliOverrides {
                plan,
                ..common.overrides()
            },
            Mode::Plan,
        ),
        Commands::Issues { common, issues } => (
            CliOverrides {
                issues,
                ..common.overrides()
            },
            Mode::Issues,
        ),
        Commands::Skills {
            common,
            skills_root,
        } => (
            CliOverrides {
                skills_root,
                ..common.overrides()
            },
            Mode::Skills,
        ),
        Commands::Full {
            common,
            plan,
            issues,
            skills_root,
            include_skills,
            require_plan,
            require_issues,
        } => (
            CliOverrides {
                plan,
                issues,
                skills_root,
                include_skills,
                require_plan,
                require_issues,
                ..common.overrides()
            },
            Mode::Full,
        ),
    };

    if overrides.strict_warnings {
        eprintln!(
            "{} --strict-warnings is deprecated; use --fail-on warning",
            utils::warn_prefix()
        );
    }
    let eff = match config::resolve_effective(&overrides) {
        Ok(eff) => eff,
        Err(e) => {
            eprintln!("{} {}", utils::error_prefix(), e);
            process::exit(EXIT_WARNINGS);
        }
    };
    if eff.config_file.is_none() && eff.output == config::Output::Human {
        eprintln!(
            "{} No wfhealth.toml found; using defaults.",
            utils::note_prefix()
        );
    }

    // Keep the default hook quiet; the failure is reported below.
    panic::set_hook(Box::new(|_| {}));
    let run = panic::catch_unwind(AssertUnwindSafe(|| {
        let reports = runner::run_checks(&eff, mode);
        let summary = output::print_reports(&reports, eff.output);
        runner::decide_exit_code(&summary, eff.fail_on)
    }));
    match run {
        Ok(code) => process::exit(code),
        Err(payload) => {
            let reason = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            println!("== runtime ==");
            println!("ERROR: unexpected checker failure: {}", reason);
            process::exit(EXIT_RUNTIME);
        }
    }
}
