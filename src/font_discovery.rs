//! Cross-platform discovery of a monospace font for the console window
//!
//! The console draws a single monospace face. This module searches
//! platform-specific font directories for fonts known to render well:
//! - Windows: C:\Windows\Fonts and user font directories
//! - macOS: /System/Library/Fonts, /Library/Fonts, ~/Library/Fonts
//! - Linux: /usr/share/fonts, /usr/local/share/fonts, ~/.local/share/fonts
//!
//! If no suitable font is found, the caller should handle the None return
//! value and surface an installation hint to the user.

use std::fs;
use std::path::{Path, PathBuf};

/// Preferred monospace fonts, in order of preference
const PREFERRED_MONOSPACE_FONTS: &[&str] = &[
    // Windows system fonts
    "CascadiaMono.ttf",
    "consola.ttf",
    "cour.ttf",
    // macOS system fonts
    "SFNSMono.ttf",
    "Menlo.ttf",
    "Monaco.ttf",
    // Popular programmer fonts
    "Hack-Regular.ttf",
    "JetBrainsMono-Regular.ttf",
    "FiraCode-Regular.ttf",
    "FiraMono-Regular.ttf",
    "SourceCodePro-Regular.ttf",
    "Inconsolata-Regular.ttf",
    // Common distribution defaults
    "NotoSansMono-Regular.ttf",
    "NotoSansMono.ttf",
    "UbuntuMono-Regular.ttf",
    "LiberationMono-Regular.ttf",
    // Fallback default
    "DejaVuSansMono.ttf",
    "FreeMono.ttf",
];

/// Common font directories on Windows, Linux, and macOS systems
const FONT_DIRECTORIES: &[&str] = &[
    // Windows paths
    "C:\\Windows\\Fonts",
    "%LOCALAPPDATA%\\Microsoft\\Windows\\Fonts",
    "%USERPROFILE%\\AppData\\Local\\Microsoft\\Windows\\Fonts",
    // Linux paths
    "/usr/share/fonts",
    "/usr/local/share/fonts",
    "~/.local/share/fonts",
    "~/.fonts",
    // macOS paths
    "/System/Library/Fonts",
    "/Library/Fonts",
    "~/Library/Fonts",
];

/// Discovers the best available monospace font for the console.
///
/// Returns the full path to the first preferred font found, or None if no
/// suitable font is available.
pub fn find_best_monospace_font() -> Option<String> {
    let search_paths = expanded_search_paths();

    for font_name in PREFERRED_MONOSPACE_FONTS {
        for base_path in &search_paths {
            if let Some(font_path) = search_font_recursive(base_path, font_name) {
                eprintln!("[FONT] Found monospace font: {}", font_path.display());
                return Some(font_path.to_string_lossy().to_string());
            }
        }
    }

    eprintln!("[FONT] WARNING: No monospace fonts found in system directories");
    None
}

/// Searches for a specific font file by name across all font directories.
pub fn find_specific_font(font_name: &str) -> Option<String> {
    let search_paths = expanded_search_paths();

    for base_path in &search_paths {
        if let Some(font_path) = search_font_recursive(base_path, font_name) {
            return Some(font_path.to_string_lossy().to_string());
        }
    }

    None
}

/// The font directory list with home directories and Windows variables expanded
fn expanded_search_paths() -> Vec<PathBuf> {
    let mut search_paths = Vec::new();
    for dir in FONT_DIRECTORIES {
        if let Some(expanded) = expand_home_dir(dir) {
            search_paths.push(expanded);
        }
    }
    search_paths
}

/// Recursively searches for a font file in a directory tree
fn search_font_recursive(base_path: &Path, font_name: &str) -> Option<PathBuf> {
    if !base_path.exists() || !base_path.is_dir() {
        return None;
    }

    let entries = match fs::read_dir(base_path) {
        Ok(entries) => entries,
        Err(_) => return None,
    };

    for entry in entries.flatten() {
        let path = entry.path();

        if path.is_file() {
            if let Some(filename) = path.file_name() {
                if filename == font_name {
                    return Some(path);
                }
            }
        } else if path.is_dir() {
            if let Some(found) = search_font_recursive(&path, font_name) {
                return Some(found);
            }
        }
    }

    None
}

/// Expands ~ to the user's home directory and Windows %VAR% variables
fn expand_home_dir(path: &str) -> Option<PathBuf> {
    // Handle Windows environment variables like %USERPROFILE%, %LOCALAPPDATA%
    if path.contains('%') {
        let mut expanded = String::new();
        let mut chars = path.chars().peekable();

        while let Some(ch) = chars.next() {
            if ch != '%' {
                expanded.push(ch);
                continue;
            }

            let mut var_name = String::new();
            let mut found_closing = false;
            while let Some(&next_ch) = chars.peek() {
                chars.next();
                if next_ch == '%' {
                    found_closing = true;
                    break;
                }
                var_name.push(next_ch);
            }

            if found_closing && !var_name.is_empty() {
                if let Ok(var_value) = std::env::var(&var_name) {
                    expanded.push_str(&var_value);
                } else {
                    // Keep the original pattern when the variable is unset
                    expanded.push('%');
                    expanded.push_str(&var_name);
                    expanded.push('%');
                }
            } else {
                expanded.push('%');
                expanded.push_str(&var_name);
            }
        }
        return Some(PathBuf::from(expanded));
    }

    // Handle Unix-style ~ expansion
    if path.starts_with("~/") || path == "~" {
        let home = std::env::var("HOME").ok()?;
        let home_path = PathBuf::from(home);
        if path == "~" {
            return Some(home_path);
        }
        return Some(home_path.join(&path[2..]));
    }

    Some(PathBuf::from(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_home_dir() {
        // Set HOME for testing
        std::env::set_var("HOME", "/home/testuser");

        assert_eq!(expand_home_dir("~/.fonts").unwrap(), PathBuf::from("/home/testuser/.fonts"));

        assert_eq!(expand_home_dir("~").unwrap(), PathBuf::from("/home/testuser"));

        assert_eq!(expand_home_dir("/usr/share/fonts").unwrap(), PathBuf::from("/usr/share/fonts"));
    }

    #[test]
    fn test_expand_unset_windows_variable_keeps_pattern() {
        std::env::remove_var("LECTERN_NO_SUCH_VAR");
        assert_eq!(
            expand_home_dir("%LECTERN_NO_SUCH_VAR%\\Fonts").unwrap(),
            PathBuf::from("%LECTERN_NO_SUCH_VAR%\\Fonts")
        );
    }

    #[test]
    fn test_find_best_font_returns_path_or_none() {
        // This test will return Some with a .ttf path, or None if no fonts are found
        let font_path = find_best_monospace_font();
        if let Some(path) = font_path {
            assert!(!path.is_empty());
            assert!(path.ends_with(".ttf"));
        }
    }

    #[test]
    fn test_search_missing_directory_returns_none() {
        assert!(search_font_recursive(Path::new("/no/such/dir"), "DejaVuSansMono.ttf").is_none());
    }
}
