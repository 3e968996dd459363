//! Flat emission: one `:root` block, one variable per indexed path.

use crate::config::Config;
use crate::error::{Error, ValidationError};
use crate::resolve::Resolver;
use crate::tokens::{custom_property, variable_name, TokenIndex, TokenPath};
use crate::validate::validate;

use super::css::{CssBlock, CssRenderer};
use super::entry_css;

/// Emits every path under its full-path name.
///
/// References render as `var()` pointers to other full-path names. Paths
/// without a theme of their own resolve theme shorthand in
/// [`Config::export_theme`].
pub struct SpecificEmitter<'c> {
    config: &'c Config,
}

impl<'c> SpecificEmitter<'c> {
    pub fn new(config: &'c Config) -> Self {
        Self { config }
    }

    pub fn file_name(&self) -> String {
        format!("{}_variables_specific.css", self.config.prefix)
    }

    /// Validates the index and builds the `:root` block.
    pub fn blocks(&self, index: &TokenIndex) -> Result<Vec<CssBlock>, ValidationError> {
        let theme = self.config.export_theme();
        let mut violations = validate(index, self.config, &[theme]);
        if !violations.is_empty() {
            return Err(ValidationError::new(violations));
        }

        let prefix = self.config.prefix.as_str();
        let resolver = Resolver::new(index).with_max_depth(self.config.max_reference_depth);
        let name_of = |p: &TokenPath| variable_name(prefix, p);

        let mut root = CssBlock::new(":root");
        for entry in index.entries() {
            match entry_css(&resolver, entry, Some(theme), &name_of) {
                Ok(value) => root.push(custom_property(prefix, &entry.path), value),
                Err(violation) => violations.push(violation),
            }
        }

        if violations.is_empty() {
            Ok(vec![root])
        } else {
            Err(ValidationError::new(violations))
        }
    }

    pub fn emit(&self, index: &TokenIndex) -> Result<String, Error> {
        let blocks = self.blocks(index)?;
        Ok(CssRenderer::new()?.render(&blocks)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ViolationKind;
    use serde_json::json;

    #[test]
    fn test_literal_output() {
        let doc = json!({"tokens": {"colors": {"scale-02": {"500": {"$value": "#112233"}}}}});
        let index = TokenIndex::build([&doc]);
        let css = SpecificEmitter::new(&Config::default())
            .emit(&index)
            .unwrap();
        assert_eq!(
            css,
            ":root {\n  --recursica_tokens_colors_scale-02_500: #112233;\n}\n"
        );
    }

    #[test]
    fn test_reference_rendered_as_pointer() {
        let doc = json!({"tokens": {"a": "4px", "b": "{tokens.a}"}});
        let index = TokenIndex::build([&doc]);
        let css = SpecificEmitter::new(&Config::default())
            .emit(&index)
            .unwrap();
        assert!(css.contains("--recursica_tokens_b: var(--recursica_tokens_a);"));
    }

    #[test]
    fn test_dangling_reference_fails() {
        let doc = json!({"tokens": {"b": "{tokens.a}"}});
        let index = TokenIndex::build([&doc]);
        let err = SpecificEmitter::new(&Config::default())
            .blocks(&index)
            .unwrap_err();
        assert!(err.has_kind(ViolationKind::ReferenceNotFound));
        assert_eq!(err.violations[0].path, "tokens.b");
    }

    #[test]
    fn test_custom_prefix_file_name() {
        let config = Config::from_yaml_str("prefix: acme\n").unwrap();
        assert_eq!(
            SpecificEmitter::new(&config).file_name(),
            "acme_variables_specific.css"
        );
    }
}
