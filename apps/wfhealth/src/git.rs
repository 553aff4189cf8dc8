//! Best-effort current-branch lookup via `git rev-parse`.

use std::io::Read;
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

pub const UNKNOWN_BRANCH: &str = "unknown";
pub const BRANCH_LOOKUP_TIMEOUT: Duration = Duration::from_secs(5);

/// Current branch of the repository at `project_root`, or `"unknown"` when
/// git is missing, times out, exits non-zero, or prints nothing.
pub fn detect_git_branch(project_root: &Path) -> String {
    current_branch(project_root, BRANCH_LOOKUP_TIMEOUT).unwrap_or_else(|| UNKNOWN_BRANCH.to_string())
}

fn current_branch(project_root: &Path, timeout: Duration) -> Option<String> {
    let mut child = Command::new("git")
        .arg("-C")
        .arg(project_root)
        .args(["rev-parse", "--abbrev-ref", "HEAD"])
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .ok()?;

    let deadline = Instant::now() + timeout;
    loop {
        match child.try_wait() {
            Ok(Some(status)) if status.success() => break,
            Ok(Some(_)) => return None,
            Ok(None) if Instant::now() < deadline => thread::sleep(Duration::from_millis(10)),
            _ => {
                let _ = child.kill();
                let _ = child.wait();
                return None;
            }
        }
    }

    let mut out = String::new();
    child.stdout.take()?.read_to_string(&mut out).ok()?;
    let branch = out.trim();
    (!branch.is_empty()).then(|| branch.to_string())
}
