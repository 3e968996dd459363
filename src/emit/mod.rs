//! CSS emission.
//!
//! Two strategies share one data model:
//!
//! - [`SpecificEmitter`]: a single `:root` block with one variable per path
//! - [`ScopedEmitter`]: `:root` specific names plus theme/layer alias blocks
//!
//! Both validate first and refuse to emit anything if a single violation is
//! found. The error carries the complete list.
//!
//! # Example
//!
//! ```rust
//! use recursica::{export_specific, Config, Documents};
//!
//! let docs = Documents::canonical().unwrap();
//! let artifact = export_specific(&docs, &Config::default()).unwrap();
//! assert_eq!(artifact.file_name, "recursica_variables_specific.css");
//! assert!(artifact.contents.starts_with(":root {"));
//! ```

mod css;
mod scoped;
mod specific;

use std::path::{Path, PathBuf};

pub use css::{CssBlock, CssRenderer, Declaration};
pub use scoped::{layer_selector, theme_selector, ScopedEmitter};
pub use specific::SpecificEmitter;

use crate::config::Config;
use crate::documents::Documents;
use crate::error::{Error, Violation, ViolationKind};
use crate::resolve::Resolver;
use crate::tokens::{Entry, TokenPath, TokenValue};

/// A rendered stylesheet and the file name it is written under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub file_name: String,
    pub contents: String,
}

impl ExportArtifact {
    /// Writes the stylesheet into `dir`, returning the full path.
    pub fn write_to(&self, dir: impl AsRef<Path>) -> Result<PathBuf, Error> {
        let path = dir.as_ref().join(&self.file_name);
        std::fs::write(&path, &self.contents).map_err(|e| Error::io(&path, e))?;
        Ok(path)
    }
}

/// Renders one entry's value in export mode.
pub(crate) fn entry_css(
    resolver: &Resolver<'_>,
    entry: &Entry,
    theme: Option<&str>,
    name_of: &dyn Fn(&TokenPath) -> String,
) -> Result<String, Violation> {
    match &entry.value {
        TokenValue::Literal(literal) => Ok(literal.to_css()),
        TokenValue::Reference(target) => resolver
            .pointer(&entry.path, target, theme, name_of)
            .map_err(|err| err.into_violation(&entry.path)),
        TokenValue::Composite(composite) => composite.to_css(name_of).map_err(|reason| {
            Violation::new(entry.path.to_string(), ViolationKind::InvalidValue, reason)
        }),
    }
}

/// Validates the document set and renders the flat stylesheet.
pub fn export_specific(documents: &Documents, config: &Config) -> Result<ExportArtifact, Error> {
    let emitter = SpecificEmitter::new(config);
    let contents = emitter.emit(&documents.index())?;
    Ok(ExportArtifact {
        file_name: emitter.file_name(),
        contents,
    })
}

/// Validates the document set and renders the theme/layer scoped stylesheet.
pub fn export_scoped(documents: &Documents, config: &Config) -> Result<ExportArtifact, Error> {
    let emitter = ScopedEmitter::new(config);
    let contents = emitter.emit(&documents.index())?;
    Ok(ExportArtifact {
        file_name: emitter.file_name(),
        contents,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_to_directory() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = ExportArtifact {
            file_name: "out.css".into(),
            contents: ":root {\n}\n".into(),
        };
        let path = artifact.write_to(dir.path()).unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), ":root {\n}\n");
    }

    #[test]
    fn test_write_to_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = ExportArtifact {
            file_name: "out.css".into(),
            contents: String::new(),
        };
        let err = artifact.write_to(dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }
}
