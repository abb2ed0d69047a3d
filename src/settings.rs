//! Settings management for the console library
//!
//! Handles loading and saving user settings to JSON files.
//! Uses separate directories for production and test builds:
//! - Linux/macOS Production: ~/.config/lectern/settings.json
//! - Linux/macOS Test/Debug: ~/.config/lectern-test/settings.json
//! - Windows Production: %APPDATA%\lectern\settings.json
//! - Windows Test/Debug: %APPDATA%\lectern-test\settings.json

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Console window appearance and behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsoleSettings {
    #[serde(rename = "fontSize")]
    pub font_size: f32,
    /// Font file path, or "auto" for system discovery
    #[serde(rename = "fontFamily")]
    pub font_family: String,
    #[serde(default = "default_columns")]
    pub columns: u32,
    #[serde(default = "default_rows")]
    pub rows: u32,
    /// Transcript row cap; 0 keeps everything
    #[serde(rename = "scrollbackLines", default = "default_scrollback_lines")]
    pub scrollback_lines: usize,
    /// Mirror console output to the real stdout
    #[serde(default = "default_echo")]
    pub echo: bool,
    /// Close the console window as soon as the program body finishes
    #[serde(rename = "closeOnFinish", default)]
    pub close_on_finish: bool,
}

fn default_columns() -> u32 {
    80
}

fn default_rows() -> u32 {
    25
}

fn default_scrollback_lines() -> usize {
    1000
}

fn default_echo() -> bool {
    true
}

impl Default for ConsoleSettings {
    fn default() -> Self {
        Self {
            font_size: 14.0,
            font_family: "auto".to_string(),
            columns: default_columns(),
            rows: default_rows(),
            scrollback_lines: default_scrollback_lines(),
            echo: default_echo(),
            close_on_finish: false,
        }
    }
}

/// Settings structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub console: ConsoleSettings,
}

/// Get the settings file path based on the platform and build profile.
///
/// Uses platform-appropriate directories:
/// - Linux/macOS Production: ~/.config/lectern/settings.json
/// - Linux/macOS Test/Debug: ~/.config/lectern-test/settings.json
/// - Windows Production: %APPDATA%\lectern\settings.json
/// - Windows Test/Debug: %APPDATA%\lectern-test\settings.json
fn get_settings_file_path() -> Result<PathBuf, String> {
    // Determine the application name based on build profile
    #[cfg(production)]
    let app_name = "lectern";

    #[cfg(not(production))]
    let app_name = "lectern-test";

    // Get the platform-appropriate config directory
    let proj_dirs = ProjectDirs::from("", "", app_name)
        .ok_or_else(|| "Failed to determine config directory".to_string())?;

    let config_dir = proj_dirs.config_dir();

    // Create directory if it doesn't exist
    if !config_dir.exists() {
        fs::create_dir_all(config_dir).map_err(|e| format!("Failed to create config directory: {}", e))?;
    }

    Ok(config_dir.join("settings.json"))
}

/// Get the path to the settings file (public API)
pub fn get_settings_path() -> Result<PathBuf, String> {
    get_settings_file_path()
}

/// Load settings from the settings file
/// If the file doesn't exist, creates it with default settings
pub fn load_settings() -> Result<Settings, String> {
    let settings_path = get_settings_file_path()?;

    if !settings_path.exists() {
        // Create default settings file
        let default_settings = Settings::default();
        save_settings(&default_settings)?;
        return Ok(default_settings);
    }

    let contents =
        fs::read_to_string(&settings_path).map_err(|e| format!("Failed to read settings file: {}", e))?;

    let settings: Settings =
        serde_json::from_str(&contents).map_err(|e| format!("Failed to parse settings file: {}", e))?;

    Ok(settings)
}

/// Save settings to the settings file
pub fn save_settings(settings: &Settings) -> Result<(), String> {
    let settings_path = get_settings_file_path()?;

    let json =
        serde_json::to_string_pretty(settings).map_err(|e| format!("Failed to serialize settings: {}", e))?;

    fs::write(&settings_path, json).map_err(|e| format!("Failed to write settings file: {}", e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.console.font_size, 14.0);
        assert_eq!(settings.console.font_family, "auto");
        assert_eq!(settings.console.columns, 80);
        assert_eq!(settings.console.rows, 25);
        assert_eq!(settings.console.scrollback_lines, 1000);
        assert!(settings.console.echo);
        assert!(!settings.console.close_on_finish);
    }

    #[test]
    fn test_settings_serialization() {
        let settings = Settings::default();
        let json = serde_json::to_string(&settings).unwrap();
        let deserialized: Settings = serde_json::from_str(&json).unwrap();
        assert_eq!(settings.console.font_size, deserialized.console.font_size);
        assert_eq!(settings.console.font_family, deserialized.console.font_family);
        assert_eq!(settings.console.columns, deserialized.console.columns);
        assert_eq!(settings.console.echo, deserialized.console.echo);
    }

    #[test]
    fn test_settings_field_names_are_camel_case() {
        let json = serde_json::to_string_pretty(&Settings::default()).unwrap();
        assert!(json.contains("fontSize"));
        assert!(json.contains("fontFamily"));
        assert!(json.contains("scrollbackLines"));
        assert!(json.contains("closeOnFinish"));
    }

    #[test]
    fn test_settings_json_parsing_with_defaults() {
        let json = r#"
        {
            "console": {
                "fontSize": 18.0,
                "fontFamily": "auto"
            }
        }
        "#;

        let settings: Settings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.console.font_size, 18.0);
        // Omitted fields fall back to defaults
        assert_eq!(settings.console.columns, 80);
        assert_eq!(settings.console.scrollback_lines, 1000);
        assert!(settings.console.echo);
        assert!(!settings.console.close_on_finish);
    }

    #[test]
    fn test_empty_settings_object_uses_defaults() {
        let settings: Settings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings.console.font_size, 14.0);
        assert_eq!(settings.console.rows, 25);
    }

    #[test]
    fn test_config_directory_path() {
        // This may fail in parallel test runs due to permission issues, so we accept both success and certain errors
        let path = get_settings_file_path();

        if let Err(e) = &path {
            // If there's a permission error during parallel test runs, that's acceptable
            if e.contains("Permission denied") {
                eprintln!("Note: Permission denied in parallel test run (acceptable)");
                return;
            }
        }

        assert!(path.is_ok(), "Should be able to get settings file path: {:?}", path.err());

        let path = path.unwrap();
        assert!(
            path.to_string_lossy().ends_with("settings.json"),
            "Path should end with settings.json"
        );

        // Verify the path contains the correct app name based on build profile
        let path_str = path.to_string_lossy();
        #[cfg(production)]
        assert!(
            path_str.contains("lectern") && !path_str.contains("lectern-test"),
            "Production build should use 'lectern' directory, got: {}",
            path_str
        );

        #[cfg(not(production))]
        assert!(
            path_str.contains("lectern-test"),
            "Debug build should use 'lectern-test' directory, got: {}",
            path_str
        );
    }
}
