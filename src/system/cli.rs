//! Launch-context handling for student programs.
//!
//! This module inspects the invocation arguments and environment:
//! - Invocation path and display name capture (diagnostics only)
//! - The `NOCONSOLE` environment variable that suppresses the console
//! - macOS `.app` bundle detection for working-directory fixup

use std::path::PathBuf;

/// Launch context captured from the invocation argument vector.
///
/// Argument zero is used only for diagnostic and path purposes; no flags are
/// parsed from the remaining arguments.
#[derive(Debug, Clone)]
pub struct LaunchContext {
    /// Full invocation path (argv[0]), if the OS provided one
    pub program_path: Option<PathBuf>,
    /// Display name derived from the invocation path, used for the console
    /// window title and log lines
    pub program_name: String,
}

impl LaunchContext {
    /// Capture the launch context from an argument vector.
    pub fn from_args(args: &[String]) -> Self {
        let program_path = args.first().filter(|a| !a.is_empty()).map(PathBuf::from);
        let program_name = program_path
            .as_ref()
            .and_then(|p| p.file_stem())
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "program".to_string());

        LaunchContext {
            program_path,
            program_name,
        }
    }
}

/// Decide console suppression from a `NOCONSOLE` value.
///
/// Any value beginning with `t` suppresses the graphical console; anything
/// else, or an unset variable, does not.
pub fn console_suppressed_by(value: Option<&str>) -> bool {
    matches!(value, Some(v) if v.starts_with('t'))
}

/// Read the `NOCONSOLE` environment variable and decide console suppression.
pub fn console_suppressed() -> bool {
    let value = std::env::var("NOCONSOLE").ok();
    console_suppressed_by(value.as_deref())
}

/// Find the directory containing a macOS `.app` bundle in an invocation path.
///
/// When a program runs from inside `Something.app/Contents/`, relative file
/// access should behave as if the program were run from the bundle's parent
/// directory; the bootstrap changes the working directory to the returned
/// path.
pub fn bundle_parent_dir(arg0: &str) -> Option<PathBuf> {
    let marker = arg0.find(".app/Contents/")?;
    let slash = arg0[..marker].rfind('/')?;
    if slash == 0 {
        return None;
    }
    Some(PathBuf::from(&arg0[..slash]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_launch_context_from_args() {
        let args = vec!["/usr/local/bin/histogram".to_string(), "--fast".to_string()];
        let ctx = LaunchContext::from_args(&args);
        assert_eq!(ctx.program_name, "histogram");
        assert_eq!(
            ctx.program_path,
            Some(PathBuf::from("/usr/local/bin/histogram"))
        );
    }

    #[test]
    fn test_launch_context_empty_args() {
        let ctx = LaunchContext::from_args(&[]);
        assert_eq!(ctx.program_name, "program");
        assert!(ctx.program_path.is_none());
    }

    #[test]
    fn test_console_suppressed_by_t_values() {
        assert!(console_suppressed_by(Some("true")));
        assert!(console_suppressed_by(Some("t")));
        assert!(console_suppressed_by(Some("totally")));
    }

    #[test]
    fn test_console_not_suppressed_otherwise() {
        assert!(!console_suppressed_by(Some("false")));
        assert!(!console_suppressed_by(Some("yes")));
        assert!(!console_suppressed_by(Some("T")));
        assert!(!console_suppressed_by(Some("")));
        assert!(!console_suppressed_by(None));
    }

    #[test]
    fn test_console_suppressed_reads_environment() {
        // This is the only test that touches NOCONSOLE, so there is no race
        // with parallel tests.
        std::env::set_var("NOCONSOLE", "true");
        assert!(console_suppressed());
        std::env::set_var("NOCONSOLE", "0");
        assert!(!console_suppressed());
        std::env::remove_var("NOCONSOLE");
        assert!(!console_suppressed());
    }

    #[test]
    fn test_bundle_parent_dir() {
        assert_eq!(
            bundle_parent_dir("/Users/kim/Demos/Histogram.app/Contents/MacOS/Histogram"),
            Some(PathBuf::from("/Users/kim/Demos"))
        );
        assert_eq!(bundle_parent_dir("/usr/local/bin/histogram"), None);
        // Bundle directly under the filesystem root has no usable parent
        assert_eq!(bundle_parent_dir("/Histogram.app/Contents/MacOS/x"), None);
    }
}
