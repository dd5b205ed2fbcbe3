//! Configuration errors.

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
#[non_exhaustive]
pub enum ConfigError {
    /// The file could not be read.
    #[error("could not read config file {}", path.display())]
    #[diagnostic(code(notepad::config::read))]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid JSON.
    #[error("invalid JSON in {}", path.display())]
    #[diagnostic(code(notepad::config::json))]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The file is not valid TOML.
    #[error("invalid TOML in {}", path.display())]
    #[diagnostic(code(notepad::config::toml))]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// The extension is neither `.json` nor `.toml`.
    #[error("unsupported config format: {}", path.display())]
    #[diagnostic(
        code(notepad::config::format),
        help("config files must end in .json or .toml")
    )]
    UnsupportedFormat { path: PathBuf },

    /// A field holds a value the editor cannot work with.
    #[error("invalid {field} in {}: {reason}", path.display())]
    #[diagnostic(code(notepad::config::invalid))]
    Invalid {
        path: PathBuf,
        field: &'static str,
        reason: &'static str,
    },

    /// An environment override could not be parsed.
    #[error("{var} must be a whole number of milliseconds, got {value:?}")]
    #[diagnostic(code(notepad::config::env))]
    InvalidEnv { var: &'static str, value: String },
}
