//! Small shared helpers: coloured stderr prefixes and path display.

use owo_colors::OwoColorize;
use std::path::Path;

/// True unless `NO_COLOR` is set.
pub fn colors_enabled() -> bool {
    std::env::var_os("NO_COLOR").is_none()
}

fn prefix(label: &str, paint: fn(&str) -> String) -> String {
    if colors_enabled() {
        paint(label)
    } else {
        label.to_string()
    }
}

pub fn error_prefix() -> String {
    prefix("error:", |s| s.red().bold().to_string())
}

pub fn warn_prefix() -> String {
    prefix("warning:", |s| s.yellow().bold().to_string())
}

pub fn note_prefix() -> String {
    prefix("note:", |s| s.cyan().bold().to_string())
}

pub fn info_prefix() -> String {
    prefix("info:", |s| s.blue().bold().to_string())
}

/// Display `path` relative to the working directory when possible.
pub fn rel_to_wd(path: &Path) -> String {
    let rel = std::env::current_dir()
        .ok()
        .filter(|_| path.is_absolute())
        .and_then(|wd| pathdiff::diff_paths(path, wd));
    match rel {
        Some(r) if r.as_os_str().is_empty() => ".".to_string(),
        Some(r) => r.display().to_string(),
        None => path.display().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_paths_pass_through() {
        assert_eq!(rel_to_wd(Path::new("docs/plans/a.md")), "docs/plans/a.md");
    }

    #[test]
    fn test_absolute_path_under_wd_is_shortened() {
        let wd = std::env::current_dir().unwrap();
        assert_eq!(rel_to_wd(&wd.join("x").join("y.md")), format!("x{}y.md", std::path::MAIN_SEPARATOR));
        assert_eq!(rel_to_wd(&wd), ".");
    }

    #[test]
    fn test_prefixes_carry_label() {
        assert!(error_prefix().contains("error:"));
        assert!(warn_prefix().contains("warning:"));
        assert!(note_prefix().contains("note:"));
        assert!(info_prefix().contains("info:"));
    }
}
