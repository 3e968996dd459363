//! Error and violation types.
//!
//! Resolution and validation never stop at the first problem. Every finding
//! is recorded as a [`Violation`], and the export entry points raise a single
//! [`ValidationError`] carrying the complete list.

use std::path::PathBuf;

use thiserror::Error;

/// The category of a single validation finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViolationKind {
    /// A reference names a path that is not defined in the document set.
    ReferenceNotFound,
    /// A reference chain loops back on itself or exceeds the depth bound.
    Cycle,
    /// A color, number, dimension, or composite value is malformed.
    InvalidValue,
    /// A layered property is missing from one or more layers.
    LayerIncomplete,
    /// A path is duplicated, cannot be encoded as a variable name, or its
    /// scoped alias would collide with another variable.
    InvalidPath,
}

impl ViolationKind {
    /// Returns the error name used when reporting this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            ViolationKind::ReferenceNotFound => "ReferenceNotFoundError",
            ViolationKind::Cycle => "CycleError",
            ViolationKind::InvalidValue => "InvalidValueError",
            ViolationKind::LayerIncomplete => "LayerIncompletenessError",
            ViolationKind::InvalidPath => "InvalidPathError",
        }
    }
}

impl std::fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One problem found while indexing, resolving, or validating.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Dot-delimited path the problem belongs to.
    pub path: String,
    pub kind: ViolationKind,
    pub message: String,
}

impl Violation {
    pub fn new(path: impl Into<String>, kind: ViolationKind, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Aggregate of every violation found in one validation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub violations: Vec<Violation>,
}

impl ValidationError {
    pub fn new(violations: Vec<Violation>) -> Self {
        Self { violations }
    }

    /// Returns `true` if any violation has the given kind.
    pub fn has_kind(&self, kind: ViolationKind) -> bool {
        self.violations.iter().any(|v| v.kind == kind)
    }

    /// Iterates over the violations of one kind.
    pub fn of_kind(&self, kind: ViolationKind) -> impl Iterator<Item = &Violation> {
        self.violations.iter().filter(move |v| v.kind == kind)
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Transform validation failed ({} errors):",
            self.violations.len()
        )?;
        for violation in &self.violations {
            write!(f, "\n{}", violation)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// Errors returned by the public entry points of this crate.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("failed to parse {what}: {source}")]
    Json {
        what: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to parse configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("failed to render CSS: {0}")]
    Template(#[from] minijinja::Error),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub(crate) fn json(what: impl Into<String>, source: serde_json::Error) -> Self {
        Error::Json {
            what: what.into(),
            source,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    /// Returns the aggregated violations if this is a validation failure.
    pub fn violations(&self) -> Option<&[Violation]> {
        match self {
            Error::Validation(err) => Some(&err.violations),
            _ => None,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
