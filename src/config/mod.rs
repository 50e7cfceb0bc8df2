//! Configuration management
//!
//! This module handles loading and managing configuration from
//! TOML files and CLI arguments.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::constants::{display, layout, output_formats, tool};
use crate::core::error::{Result, VitalsUpError};

/// A page tested per release and shown as one dashboard section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageConfig {
    /// Sub-directory name under each release directory
    pub name: String,

    /// Display label in reports
    pub label: String,

    /// URL handed to the testing tool
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl PageConfig {
    pub fn new(name: &str, label: &str, url: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            url: url.map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Program invoked to measure a page
    pub tool_command: Option<String>,

    /// Argument template; `{url}` and `{output}` are substituted
    pub tool_args: Option<Vec<String>>,

    /// Timeout in seconds for one tool run
    pub tool_timeout: Option<u64>,

    /// Directory holding the `release-<N>` folders
    pub base_dir: Option<String>,

    /// Summary JSON path relative to a page folder
    pub summary_file: Option<String>,

    /// Prefix of release directory names
    pub release_prefix: Option<String>,

    /// Top-level entries of a page folder kept after a run
    pub retain_artifacts: Option<Vec<String>>,

    /// Pages to test and report on
    pub pages: Option<Vec<PageConfig>>,

    /// Output format (text, json)
    pub output_format: Option<String>,

    /// Enable verbose logging
    pub verbose: Option<bool>,

    /// Dashboard title
    pub title: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tool_command: Some(tool::COMMAND.to_string()),
            tool_args: Some(tool::ARGS.iter().map(|arg| arg.to_string()).collect()),
            tool_timeout: Some(tool::DEFAULT_TIMEOUT_SECONDS),
            base_dir: None, // Resolved against the working directory by the binary
            summary_file: Some(layout::SUMMARY_FILE.to_string()),
            release_prefix: Some(layout::RELEASE_PREFIX.to_string()),
            retain_artifacts: Some(
                layout::RETAINED_ARTIFACTS
                    .iter()
                    .map(|name| name.to_string())
                    .collect(),
            ),
            pages: Some(default_pages()),
            output_format: Some(output_formats::DEFAULT.to_string()),
            verbose: Some(false),
            title: Some(display::DEFAULT_TITLE.to_string()),
        }
    }
}

/// Sections reported when no pages are configured. They carry no URL, so
/// running the tool requires a config file.
pub fn default_pages() -> Vec<PageConfig> {
    vec![
        PageConfig::new("home", "Homepage", None),
        PageConfig::new("plp", "Product Listing Page", None),
        PageConfig::new("pdp", "Product Detail Page", None),
        PageConfig::new("search", "Search Results", None),
    ]
}

impl Config {
    /// Load configuration from a TOML file and validate it
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            VitalsUpError::Config(format!(
                "Could not read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        let config: Config =
            toml::from_str(&content).map_err(|source| VitalsUpError::TomlParsing {
                path: path.to_path_buf(),
                source,
            })?;

        config.validate()?;
        Ok(config)
    }

    /// Find a config file in `start_dir` or up to three of its parents.
    ///
    /// Returns the defaults when no file exists. A file that exists but
    /// does not load is an error.
    pub fn load_from_standard_locations(start_dir: &Path) -> Result<Self> {
        match Self::find_config_file(start_dir) {
            Some(path) => Self::load_from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Locate the nearest `.vitalsup.toml`, searching upwards from `start_dir`
    pub fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
        start_dir
            .ancestors()
            .take(layout::CONFIG_SEARCH_DEPTH + 1)
            .map(|dir| dir.join(layout::CONFIG_FILE))
            .find(|candidate| candidate.is_file())
    }

    /// Merge this config with CLI arguments (CLI takes precedence)
    pub fn merge_with_cli(&mut self, cli_config: &CliConfig) {
        if let Some(timeout) = cli_config.tool_timeout {
            self.tool_timeout = Some(timeout);
        }
        if let Some(ref base_dir) = cli_config.base_dir {
            self.base_dir = Some(base_dir.clone());
        }
        if cli_config.verbose {
            self.verbose = Some(true);
        }
        if let Some(ref output_format) = cli_config.output_format {
            self.output_format = Some(output_format.clone());
        }
        if let Some(ref title) = cli_config.title {
            self.title = Some(title.clone());
        }
    }

    pub fn tool_command(&self) -> &str {
        self.tool_command.as_deref().unwrap_or(tool::COMMAND)
    }

    pub fn tool_args(&self) -> Vec<String> {
        self.tool_args
            .clone()
            .unwrap_or_else(|| tool::ARGS.iter().map(|arg| arg.to_string()).collect())
    }

    /// Get the tool timeout as Duration
    pub fn tool_timeout_duration(&self) -> Duration {
        Duration::from_secs(self.tool_timeout.unwrap_or(tool::DEFAULT_TIMEOUT_SECONDS))
    }

    /// Base directory, resolved against `working_dir` when relative
    pub fn base_dir(&self, working_dir: &Path) -> PathBuf {
        match self.base_dir {
            Some(ref dir) => working_dir.join(dir),
            None => working_dir.to_path_buf(),
        }
    }

    pub fn summary_file(&self) -> &str {
        self.summary_file.as_deref().unwrap_or(layout::SUMMARY_FILE)
    }

    pub fn release_prefix(&self) -> &str {
        self.release_prefix
            .as_deref()
            .unwrap_or(layout::RELEASE_PREFIX)
    }

    pub fn retained_artifacts(&self) -> HashSet<String> {
        match self.retain_artifacts {
            Some(ref names) => names.iter().cloned().collect(),
            None => layout::RETAINED_ARTIFACTS
                .iter()
                .map(|name| name.to_string())
                .collect(),
        }
    }

    /// Configured pages, or the default sections when none are set
    pub fn pages(&self) -> Vec<PageConfig> {
        self.pages.clone().unwrap_or_else(default_pages)
    }

    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or(display::DEFAULT_TITLE)
    }

    pub fn output_format(&self) -> &str {
        self.output_format
            .as_deref()
            .unwrap_or(output_formats::DEFAULT)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if let Some(timeout) = self.tool_timeout {
            if timeout == 0 {
                return Err(VitalsUpError::Config(
                    "Tool timeout cannot be 0. Expected a positive integer representing seconds."
                        .to_string(),
                ));
            }
            if timeout > tool::MAX_TIMEOUT_SECONDS {
                return Err(VitalsUpError::Config(format!(
                    "Tool timeout of {timeout} seconds is extremely large (>24 hours). Consider using a smaller value."
                )));
            }
        }

        if let Some(ref command) = self.tool_command
            && command.trim().is_empty()
        {
            return Err(VitalsUpError::Config(
                "Tool command cannot be empty.".to_string(),
            ));
        }

        if let Some(ref prefix) = self.release_prefix
            && prefix.is_empty()
        {
            return Err(VitalsUpError::Config(
                "Release prefix cannot be empty.".to_string(),
            ));
        }

        if let Some(ref summary) = self.summary_file
            && (summary.trim().is_empty() || Path::new(summary).is_absolute())
        {
            return Err(VitalsUpError::Config(format!(
                "Summary file '{summary}' must be a path relative to the page folder."
            )));
        }

        if let Some(ref retained) = self.retain_artifacts {
            for name in retained {
                if !is_plain_name(name) {
                    return Err(VitalsUpError::Config(format!(
                        "Retained artifact '{name}' must be a plain file or folder name."
                    )));
                }
            }
        }

        if let Some(ref pages) = self.pages {
            let mut seen = HashSet::new();
            for page in pages {
                if !is_plain_name(&page.name) {
                    return Err(VitalsUpError::Config(format!(
                        "Page name '{}' must be a plain folder name.",
                        page.name
                    )));
                }
                if !seen.insert(page.name.as_str()) {
                    return Err(VitalsUpError::Config(format!(
                        "Page name '{}' is configured more than once.",
                        page.name
                    )));
                }
            }
        }

        if let Some(ref format) = self.output_format
            && !output_formats::ALL.contains(&format.as_str())
        {
            return Err(VitalsUpError::Config(format!(
                "Invalid output format '{format}'. Expected one of: {}.",
                output_formats::ALL.join(", ")
            )));
        }

        Ok(())
    }
}

/// A single path component without separators or dot segments
pub(crate) fn is_plain_name(name: &str) -> bool {
    !name.trim().is_empty()
        && name != "."
        && name != ".."
        && !name.contains('/')
        && !name.contains('\\')
}

/// Configuration options that can come from CLI
#[derive(Debug, Default)]
pub struct CliConfig {
    pub tool_timeout: Option<u64>,     // run --timeout
    pub base_dir: Option<String>,      // run --base-dir
    pub title: Option<String>,         // --title
    pub quiet: bool,                   // --quiet
    pub verbose: bool,                 // --verbose
    pub output_format: Option<String>, // --format
    pub no_progress: bool,             // --no-progress
    pub config_file: Option<String>,   // --config
    pub no_config: bool,               // --no-config
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.tool_timeout, Some(tool::DEFAULT_TIMEOUT_SECONDS));
        assert_eq!(config.tool_command(), "sitespeed.io");
        assert_eq!(config.release_prefix(), "release-");
        assert_eq!(config.pages().len(), 4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_load_from_file() -> Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        file.write_all(
            br#"
tool_command = "browsertime"
tool_timeout = 600
retain_artifacts = ["data", "har"]

[[pages]]
name = "home"
label = "Homepage"
url = "https://shop.example/"

[[pages]]
name = "search"
label = "Search"
url = "https://shop.example/search?q=shoes"
"#,
        )?;

        let config = Config::load_from_file(file.path())?;
        assert_eq!(config.tool_command(), "browsertime");
        assert_eq!(config.tool_timeout_duration(), Duration::from_secs(600));
        assert!(config.retained_artifacts().contains("har"));

        let pages = config.pages();
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[1].url.as_deref(), Some("https://shop.example/search?q=shoes"));
        Ok(())
    }

    #[test]
    fn test_config_loaded_file_falls_back_to_defaults() -> Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        file.write_all(b"title = \"Nightly\"")?;

        let config = Config::load_from_file(file.path())?;
        assert_eq!(config.title(), "Nightly");
        assert_eq!(config.summary_file(), layout::SUMMARY_FILE);
        assert_eq!(config.tool_args(), tool::ARGS.to_vec());
        assert_eq!(config.pages(), default_pages());
        Ok(())
    }

    #[test]
    fn test_config_load_invalid_toml() -> Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        file.write_all(b"tool_timeout = [")?;

        let err = Config::load_from_file(file.path()).unwrap_err();
        assert!(matches!(err, VitalsUpError::TomlParsing { .. }));
        assert!(format!("{err}").contains("Invalid TOML"));
        assert!(format!("{err}").contains(&file.path().display().to_string()));
        Ok(())
    }

    #[test]
    fn test_config_load_missing_file() {
        let err = Config::load_from_file("/definitely/not/here/.vitalsup.toml").unwrap_err();
        assert!(matches!(err, VitalsUpError::Config(_)));
    }

    #[test]
    fn test_standard_locations_searches_parents() -> Result<()> {
        let root = tempfile::tempdir()?;
        let nested = root.path().join("a/b");
        fs::create_dir_all(&nested)?;
        fs::write(root.path().join(layout::CONFIG_FILE), "tool_timeout = 42\n")?;

        let config = Config::load_from_standard_locations(&nested)?;
        assert_eq!(config.tool_timeout, Some(42));
        Ok(())
    }

    #[test]
    fn test_standard_locations_defaults_when_absent() -> Result<()> {
        let root = tempfile::tempdir()?;
        let config = Config::load_from_standard_locations(root.path())?;
        assert_eq!(config.tool_timeout, Some(tool::DEFAULT_TIMEOUT_SECONDS));
        Ok(())
    }

    #[test]
    fn test_standard_locations_reports_broken_file() -> Result<()> {
        let root = tempfile::tempdir()?;
        fs::write(root.path().join(layout::CONFIG_FILE), "tool_timeout = 0\n")?;

        assert!(Config::load_from_standard_locations(root.path()).is_err());
        Ok(())
    }

    #[test]
    fn test_config_merge_with_cli() {
        let mut config = Config::default();
        let cli_config = CliConfig {
            tool_timeout: Some(45),
            base_dir: Some("runs".to_string()),
            verbose: true,
            output_format: Some("json".to_string()),
            ..Default::default()
        };

        config.merge_with_cli(&cli_config);

        assert_eq!(config.tool_timeout, Some(45));
        assert_eq!(config.verbose, Some(true));
        assert_eq!(config.output_format(), "json");
        assert_eq!(config.base_dir(Path::new("/work")), PathBuf::from("/work/runs"));
    }

    #[test]
    fn test_config_merge_keeps_unset_values() {
        let mut config = Config {
            tool_timeout: Some(120),
            ..Default::default()
        };
        config.merge_with_cli(&CliConfig::default());
        assert_eq!(config.tool_timeout, Some(120));
        assert_eq!(config.verbose, Some(false));
    }

    #[test]
    fn test_base_dir_absolute_wins() {
        let config = Config {
            base_dir: Some("/srv/perf".to_string()),
            ..Default::default()
        };
        assert_eq!(config.base_dir(Path::new("/work")), PathBuf::from("/srv/perf"));
        assert_eq!(
            Config::default().base_dir(Path::new("/work")),
            PathBuf::from("/work")
        );
    }

    #[test]
    fn test_validate_timeout() {
        let zero = Config {
            tool_timeout: Some(0),
            ..Default::default()
        };
        assert!(zero.validate().is_err());

        let huge = Config {
            tool_timeout: Some(tool::MAX_TIMEOUT_SECONDS + 1),
            ..Default::default()
        };
        assert!(huge.validate().is_err());
    }

    #[test]
    fn test_validate_pages() {
        let nested = Config {
            pages: Some(vec![PageConfig::new("a/b", "Nested", None)]),
            ..Default::default()
        };
        assert!(nested.validate().is_err());

        let duplicate = Config {
            pages: Some(vec![
                PageConfig::new("home", "Homepage", None),
                PageConfig::new("home", "Homepage again", None),
            ]),
            ..Default::default()
        };
        let err = duplicate.validate().unwrap_err();
        assert!(format!("{err}").contains("more than once"));
    }

    #[test]
    fn test_validate_layout_values() {
        let absolute = Config {
            summary_file: Some("/tmp/summary.json".to_string()),
            ..Default::default()
        };
        assert!(absolute.validate().is_err());

        let empty_prefix = Config {
            release_prefix: Some(String::new()),
            ..Default::default()
        };
        assert!(empty_prefix.validate().is_err());

        let dotdot = Config {
            retain_artifacts: Some(vec!["..".to_string()]),
            ..Default::default()
        };
        assert!(dotdot.validate().is_err());
    }

    #[test]
    fn test_validate_output_format() {
        let config = Config {
            output_format: Some("xml".to_string()),
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(format!("{err}").contains("text, json"));
    }
}
