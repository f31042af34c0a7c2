//! Error types for the scripting crate

use crate::script::Origin;
use ditto_core::DittoError;
use std::fmt;
use std::path::{Path, PathBuf};

/// Where in a script resource something went wrong
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub file: PathBuf,
    pub script_id: String,
    pub line: usize,
}

impl Location {
    pub fn new(origin: &Origin, line: usize) -> Self {
        Self {
            file: origin.file.clone(),
            script_id: origin.script_id.clone(),
            line,
        }
    }

    /// File name without its directories, as shown to content authors
    pub fn file_name(&self) -> String {
        display_name(&self.file)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, script {}, line {}", self.file_name(), self.script_id, self.line)
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Recoverable lexer diagnostics; the offending input is skipped
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LexError {
    #[error("Illegal character '{ch}' on line {line}")]
    IllegalCharacter { line: usize, ch: char },

    #[error("Unterminated string on line {line}")]
    UnterminatedString { line: usize },

    #[error("Invalid number '{text}' on line {line}")]
    InvalidNumber { line: usize, text: String },
}

/// Failures raised by host objects and commands
///
/// These only know the name that failed. The resolver turns them into a
/// [`ScriptError`] carrying file, script and line via [`HostError::at`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HostError {
    #[error("Name {name} is not recognised")]
    Lookup { name: String },

    #[error("{command}: {message}")]
    Arguments { command: String, message: String },
}

impl HostError {
    pub fn lookup(name: impl Into<String>) -> Self {
        HostError::Lookup { name: name.into() }
    }

    pub fn arguments(command: impl Into<String>, message: impl Into<String>) -> Self {
        HostError::Arguments {
            command: command.into(),
            message: message.into(),
        }
    }

    /// Attach the script location this failure surfaced at
    pub fn at(self, location: Location) -> ScriptError {
        match self {
            HostError::Lookup { name } => ScriptError::Name { location, name },
            HostError::Arguments { command, message } => ScriptError::Command {
                location,
                command,
                message,
            },
        }
    }
}

/// Script-specific error types
#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    /// Grammar violation, aborts the parse
    #[error("Syntax error in {location} at: {token}")]
    Syntax { location: Location, token: String },

    /// Binary operator applied to operands it does not support
    #[error("Operator error in {location}: operator {op} is not valid for operands {lhs} and {rhs}")]
    Operator {
        location: Location,
        op: String,
        lhs: String,
        rhs: String,
    },

    /// Unknown object, variable or command
    #[error("Name error in {location}: name {name} is not recognised")]
    Name { location: Location, name: String },

    /// A command rejected its arguments
    #[error("Command error in {location}: {command}: {message}")]
    Command {
        location: Location,
        command: String,
        message: String,
    },

    /// Malformed or missing script/behaviour resource
    #[error("Invalid resource {}: {message}", .path.display())]
    Resource { path: PathBuf, message: String },

    /// Resource could not be read or written
    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ScriptError {
    pub fn resource(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        ScriptError::Resource {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ScriptError::Io {
            path: path.into(),
            source,
        }
    }

    /// Script location, for errors raised from script content
    pub fn location(&self) -> Option<&Location> {
        match self {
            ScriptError::Syntax { location, .. }
            | ScriptError::Operator { location, .. }
            | ScriptError::Name { location, .. }
            | ScriptError::Command { location, .. } => Some(location),
            ScriptError::Resource { .. } | ScriptError::Io { .. } => None,
        }
    }

    /// Lines to show the content author
    pub fn describe(&self) -> Vec<String> {
        let (title, detail) = match self {
            ScriptError::Syntax { location, token } => (
                "Syntax error!",
                vec![
                    format!("On line {}, at: {}", location.line, token),
                    "Syntax is not correct".to_string(),
                ],
            ),
            ScriptError::Operator { location, op, lhs, rhs } => (
                "Operator error!",
                vec![
                    format!("On line {}", location.line),
                    format!("Operator {} is not valid for operands {} and {}", op, lhs, rhs),
                ],
            ),
            ScriptError::Name { location, name } => (
                "Name error!",
                vec![
                    format!("On line {}", location.line),
                    format!("Name {} is not recognised", name),
                ],
            ),
            ScriptError::Command { location, command, message } => (
                "Command error!",
                vec![
                    format!("On line {}", location.line),
                    format!("Command {}: {}", command, message),
                ],
            ),
            ScriptError::Resource { path, message } => {
                return vec![
                    "Invalid resource".to_string(),
                    format!("Resource {} is not correct", display_name(path)),
                    message.clone(),
                ];
            }
            ScriptError::Io { path, source } => {
                return vec![
                    "File not accessible (probably doesn't exist)".to_string(),
                    format!("Attempting to open {}", display_name(path)),
                    source.to_string(),
                ];
            }
        };

        let mut lines = vec![title.to_string()];
        if let Some(location) = self.location() {
            lines.push(format!(
                "In file {}, script {}",
                location.file_name(),
                location.script_id
            ));
        }
        lines.extend(detail);
        lines
    }
}

impl From<ScriptError> for DittoError {
    fn from(err: ScriptError) -> Self {
        DittoError::Script(err.to_string())
    }
}

/// Result type for scripting operations
pub type Result<T> = std::result::Result<T, ScriptError>;
