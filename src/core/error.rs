use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Comprehensive error types for vitalsup operations
#[derive(Debug)]
pub enum VitalsUpError {
    /// IO error (file operations, etc.)
    Io(std::io::Error),

    /// Configuration error
    Config(String),

    /// A config file is not valid TOML
    TomlParsing {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// Directory walking error
    FileWalking(ignore::Error),

    /// A summary file could not be read
    SummaryUnreadable {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A summary file is not valid JSON
    SummaryInvalid {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// Release directories could not be listed
    ReleaseDiscovery(String),

    /// The testing tool could not be started
    ToolSpawn {
        command: String,
        source: std::io::Error,
    },

    /// The testing tool exited unsuccessfully
    ToolFailed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    /// The testing tool ran past its timeout and was killed
    ToolTimedOut { command: String, timeout: Duration },

    /// The run was cancelled and the tool was killed
    Cancelled(String),

    /// Moving or pruning tool output failed
    ArtifactMove { path: PathBuf, source: std::io::Error },

    /// Invalid argument error
    InvalidArgument(String),
}

impl fmt::Display for VitalsUpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VitalsUpError::Io(err) => write!(f, "IO error: {err}"),
            VitalsUpError::Config(msg) => write!(f, "Configuration error: {msg}"),
            VitalsUpError::TomlParsing { path, source } => {
                write!(f, "Invalid TOML in config file '{}': {source}", path.display())
            }
            VitalsUpError::FileWalking(err) => write!(f, "File walking error: {err}"),
            VitalsUpError::SummaryUnreadable { path, source } => {
                write!(f, "Could not read summary '{}': {source}", path.display())
            }
            VitalsUpError::SummaryInvalid { path, source } => {
                write!(f, "Invalid JSON in summary '{}': {source}", path.display())
            }
            VitalsUpError::ReleaseDiscovery(msg) => write!(f, "Release discovery error: {msg}"),
            VitalsUpError::ToolSpawn { command, source } => {
                write!(f, "Could not start '{command}': {source}")
            }
            VitalsUpError::ToolFailed {
                command,
                code,
                stderr,
            } => {
                match code {
                    Some(code) => write!(f, "Tool '{command}' failed with exit code {code}")?,
                    None => write!(f, "Tool '{command}' was terminated by a signal")?,
                }
                if !stderr.trim().is_empty() {
                    write!(f, ": {}", stderr.trim())?;
                }
                Ok(())
            }
            VitalsUpError::ToolTimedOut { command, timeout } => write!(
                f,
                "Tool timeout: '{command}' did not finish within {}s",
                timeout.as_secs()
            ),
            VitalsUpError::Cancelled(command) => write!(f, "Cancelled: '{command}' was stopped"),
            VitalsUpError::ArtifactMove { path, source } => {
                write!(f, "Artifact error at '{}': {source}", path.display())
            }
            VitalsUpError::InvalidArgument(msg) => write!(f, "Invalid argument: {msg}"),
        }
    }
}

impl std::error::Error for VitalsUpError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            VitalsUpError::Io(err) => Some(err),
            VitalsUpError::TomlParsing { source, .. } => Some(source),
            VitalsUpError::FileWalking(err) => Some(err),
            VitalsUpError::SummaryUnreadable { source, .. } => Some(source),
            VitalsUpError::SummaryInvalid { source, .. } => Some(source),
            VitalsUpError::ToolSpawn { source, .. } => Some(source),
            VitalsUpError::ArtifactMove { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<std::io::Error> for VitalsUpError {
    fn from(err: std::io::Error) -> Self {
        VitalsUpError::Io(err)
    }
}

impl From<ignore::Error> for VitalsUpError {
    fn from(err: ignore::Error) -> Self {
        VitalsUpError::FileWalking(err)
    }
}

/// Type alias for Results using VitalsUpError
pub type Result<T> = std::result::Result<T, VitalsUpError>;
