//! Theme- and layer-scoped emission.
//!
//! Output has two naming tiers:
//!
//! - **Specific names** carry the full path, including theme and layer. They
//!   all live in the unscoped `:root` block, so any reference between them
//!   (including layer-0 pointing at layer-1) resolves regardless of cascade.
//!   UI-kit paths are emitted once per theme, with `themes.<theme>` inserted
//!   after the root segment.
//! - **Generic names** drop the theme and layer segments. They are defined
//!   only inside `[data-theme]` and `[data-theme][data-layer]` blocks, each as
//!   a one-line alias to a specific name, and never at `:root`.
//!
//! ```css
//! :root {
//!   --recursica_brand_themes_light_layers_layer-0_property_surface: var(--recursica_tokens_colors_scale-01_000);
//! }
//!
//! [data-theme="light"][data-layer="0"], [data-theme="light"] [data-layer="0"] {
//!   --recursica_brand_layers_property_surface: var(--recursica_brand_themes_light_layers_layer-0_property_surface);
//! }
//! ```

use std::collections::HashSet;

use crate::config::Config;
use crate::error::{Error, ValidationError, Violation, ViolationKind};
use crate::resolve::Resolver;
use crate::tokens::{
    custom_property, var_ref, variable_name, Entry, TokenIndex, TokenPath, BRAND_ROOT, UI_KIT_ROOT,
};
use crate::validate::validate;

use super::css::{CssBlock, CssRenderer};
use super::entry_css;

pub fn theme_selector(theme: &str) -> String {
    format!(r#"[data-theme="{}"]"#, theme)
}

/// Matches the layer on the themed element itself or on any descendant.
pub fn layer_selector(theme: &str, layer: u32) -> String {
    format!(
        r#"[data-theme="{t}"][data-layer="{l}"], [data-theme="{t}"] [data-layer="{l}"]"#,
        t = theme,
        l = layer
    )
}

/// Emits specific names at `:root` and generic aliases per theme and layer.
pub struct ScopedEmitter<'c> {
    config: &'c Config,
}

impl<'c> ScopedEmitter<'c> {
    pub fn new(config: &'c Config) -> Self {
        Self { config }
    }

    pub fn file_name(&self) -> String {
        format!("{}_variables_scoped.css", self.config.prefix)
    }

    /// Specific path of `path` within `theme`.
    fn specific_path(&self, path: &TokenPath, theme: &str) -> TokenPath {
        if path.root() == Some(UI_KIT_ROOT) {
            path.with_theme(theme)
        } else {
            path.clone()
        }
    }

    fn specific_name(&self, path: &TokenPath, theme: &str) -> String {
        variable_name(&self.config.prefix, &self.specific_path(path, theme))
    }

    /// Validates the index, refusing to emit if any layer is incomplete, and
    /// builds every block.
    pub fn blocks(&self, index: &TokenIndex) -> Result<Vec<CssBlock>, ValidationError> {
        let themes: Vec<&str> = self.config.themes.iter().map(String::as_str).collect();
        let violations = validate(index, self.config, &themes);
        if !violations.is_empty() {
            return Err(ValidationError::new(violations));
        }

        let mut violations = Vec::new();
        let root = self.root_block(index, &themes, &mut violations);
        let root_names: HashSet<&str> = root.declarations.iter().map(|d| d.name.as_str()).collect();

        let mut blocks = Vec::new();
        for theme in &themes {
            for block in self.alias_blocks(index, theme, &root_names, &mut violations) {
                if !block.is_empty() {
                    blocks.push(block);
                }
            }
        }

        if !violations.is_empty() {
            return Err(ValidationError::new(violations));
        }

        blocks.insert(0, root);
        Ok(blocks)
    }

    fn root_block(
        &self,
        index: &TokenIndex,
        themes: &[&str],
        violations: &mut Vec<Violation>,
    ) -> CssBlock {
        let resolver = Resolver::new(index).with_max_depth(self.config.max_reference_depth);
        let mut root = CssBlock::new(":root");

        let (ui_kit, shared): (Vec<&Entry>, Vec<&Entry>) = index
            .entries()
            .iter()
            .partition(|e| e.path.root() == Some(UI_KIT_ROOT));

        let export_theme = self.config.export_theme();
        for entry in shared {
            let theme = entry.path.theme().unwrap_or(export_theme);
            let name_of = |p: &TokenPath| self.specific_name(p, theme);
            match entry_css(&resolver, entry, Some(theme), &name_of) {
                Ok(value) => root.push(custom_property(&self.config.prefix, &entry.path), value),
                Err(violation) => violations.push(violation),
            }
        }

        for &theme in themes {
            let name_of = |p: &TokenPath| self.specific_name(p, theme);
            for entry in &ui_kit {
                let name = format!("--{}", self.specific_name(&entry.path, theme));
                match entry_css(&resolver, entry, Some(theme), &name_of) {
                    Ok(value) => root.push(name, value),
                    Err(violation) => violations.push(violation),
                }
            }
        }

        root
    }

    /// The theme block followed by one block per layer.
    fn alias_blocks(
        &self,
        index: &TokenIndex,
        theme: &str,
        root_names: &HashSet<&str>,
        violations: &mut Vec<Violation>,
    ) -> Vec<CssBlock> {
        let mut theme_block = CssBlock::new(theme_selector(theme));
        let mut layer_blocks: Vec<CssBlock> = self
            .config
            .layers()
            .map(|layer| CssBlock::new(layer_selector(theme, layer)))
            .collect();
        let mut defined: Vec<HashSet<String>> = vec![HashSet::new(); layer_blocks.len() + 1];

        for entry in index.entries() {
            let scoped = match entry.path.root() {
                Some(UI_KIT_ROOT) => true,
                Some(BRAND_ROOT) => entry.path.theme() == Some(theme),
                _ => false,
            };
            if !scoped {
                continue;
            }

            let generic = custom_property(&self.config.prefix, &entry.path.generic());
            let target = var_ref(&self.specific_name(&entry.path, theme));

            if root_names.contains(generic.as_str()) {
                violations.push(Violation::new(
                    entry.path.to_string(),
                    ViolationKind::InvalidPath,
                    format!("scoped name {} collides with a root variable", generic),
                ));
                continue;
            }

            let (slot, block) = match entry.path.layer() {
                Some((_, layer)) => match layer_blocks.get_mut(layer as usize) {
                    Some(block) => (layer as usize + 1, block),
                    None => continue,
                },
                None => (0, &mut theme_block),
            };

            if !defined[slot].insert(generic.clone()) {
                violations.push(Violation::new(
                    entry.path.to_string(),
                    ViolationKind::InvalidPath,
                    format!("scoped name {} is defined twice in {}", generic, block.selector),
                ));
                continue;
            }
            block.push(generic, target);
        }

        let mut blocks = Vec::with_capacity(layer_blocks.len() + 1);
        blocks.push(theme_block);
        blocks.extend(layer_blocks);
        blocks
    }

    pub fn emit(&self, index: &TokenIndex) -> Result<String, Error> {
        let blocks = self.blocks(index)?;
        Ok(CssRenderer::new()?.render(&blocks)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn layered_ui_kit(skip: Option<u32>) -> Value {
        let mut colors = serde_json::Map::new();
        for n in 0..4 {
            if Some(n) == skip {
                continue;
            }
            colors.insert(
                format!("layer-{}", n),
                json!({"background": format!("{{brand.layers.layer-{}.surface}}", n)}),
            );
        }
        json!({"ui-kit": {"button": {"colors": colors}}})
    }

    fn brand() -> Value {
        let mut themes = serde_json::Map::new();
        for (theme, tone) in [("light", "#ffffff"), ("dark", "#000000")] {
            let mut layers = serde_json::Map::new();
            for n in 0..4 {
                layers.insert(format!("layer-{}", n), json!({"surface": tone}));
            }
            themes.insert(
                theme.to_string(),
                json!({"palettes": {"tone": tone}, "layers": layers}),
            );
        }
        json!({"brand": {"themes": themes}})
    }

    #[test]
    fn test_generic_names_never_at_root() {
        let docs = [brand(), layered_ui_kit(None)];
        let index = TokenIndex::build(docs.iter());
        let blocks = ScopedEmitter::new(&Config::default())
            .blocks(&index)
            .unwrap();

        let root = &blocks[0];
        assert_eq!(root.selector, ":root");
        assert!(root
            .declarations
            .iter()
            .all(|d| d.name != "--recursica_ui-kit_button_colors_background"
                && d.name != "--recursica_brand_palettes_tone"));
    }

    #[test]
    fn test_ui_kit_layer_entries_per_theme_and_layer() {
        let docs = [brand(), layered_ui_kit(None)];
        let index = TokenIndex::build(docs.iter());
        let blocks = ScopedEmitter::new(&Config::default())
            .blocks(&index)
            .unwrap();

        let specific: Vec<&str> = blocks[0]
            .declarations
            .iter()
            .map(|d| d.name.as_str())
            .filter(|n| n.starts_with("--recursica_ui-kit_"))
            .collect();
        assert_eq!(specific.len(), 8);
        assert!(specific.contains(&"--recursica_ui-kit_themes_dark_button_colors_layer-3_background"));
    }

    #[test]
    fn test_layer_alias_block() {
        let docs = [brand(), layered_ui_kit(None)];
        let index = TokenIndex::build(docs.iter());
        let blocks = ScopedEmitter::new(&Config::default())
            .blocks(&index)
            .unwrap();

        let block = blocks
            .iter()
            .find(|b| b.selector == layer_selector("dark", 2))
            .unwrap();
        assert!(block.declarations.iter().any(|d| {
            d.name == "--recursica_ui-kit_button_colors_background"
                && d.value == "var(--recursica_ui-kit_themes_dark_button_colors_layer-2_background)"
        }));
        assert!(block.declarations.iter().any(|d| {
            d.name == "--recursica_brand_layers_surface"
                && d.value == "var(--recursica_brand_themes_dark_layers_layer-2_surface)"
        }));
    }

    #[test]
    fn test_refuses_incomplete_layers() {
        let docs = [brand(), layered_ui_kit(Some(1))];
        let index = TokenIndex::build(docs.iter());
        let err = ScopedEmitter::new(&Config::default())
            .blocks(&index)
            .unwrap_err();
        assert!(err.has_kind(ViolationKind::LayerIncomplete));
    }

    #[test]
    fn test_generic_collision_with_root() {
        let docs = [
            json!({"brand": {
                "palettes": {"tone": "#ffffff"},
                "themes": {"light": {"palettes": {"tone": "#000000"}}, "dark": {}}
            }}),
        ];
        let index = TokenIndex::build(docs.iter());
        let err = ScopedEmitter::new(&Config::default())
            .blocks(&index)
            .unwrap_err();
        assert!(err.has_kind(ViolationKind::InvalidPath));
        assert_eq!(
            err.violations[0].path,
            "brand.themes.light.palettes.tone"
        );
    }
}
