//! Derived CSS variable groups.
//!
//! The live store does not apply one monolithic variable map. It splits the
//! variables into independent groups, each computed from a slice of the
//! index, so a mutation only touches the groups its document feeds.

use std::collections::BTreeMap;

use crate::config::Config;
use crate::documents::Domain;
use crate::error::{Violation, ViolationKind};
use crate::resolve::{Resolution, Resolver};
use crate::tokens::{
    custom_property, variable_name, Entry, TokenIndex, TokenPath, TokenValue, BRAND_ROOT,
    THEMES_SEGMENT, UI_KIT_ROOT,
};
use crate::validate::check_layer_completeness;

/// Custom property name → CSS value.
pub type VarMap = BTreeMap<String, String>;

/// A group of live CSS variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum VarGroup {
    TokenColors,
    TokenSizes,
    TokenOpacities,
    CorePalette,
    ThemePalettes,
    Layers,
    Typography,
    Elevations,
    Dimensions,
    UiKit,
}

const TOKENS: &[Domain] = &[Domain::Tokens];
const TOKENS_BRAND: &[Domain] = &[Domain::Tokens, Domain::Brand];
const ALL_DOMAINS: &[Domain] = &[Domain::Tokens, Domain::Brand, Domain::UiKit];

impl VarGroup {
    pub const ALL: [VarGroup; 10] = [
        VarGroup::TokenColors,
        VarGroup::TokenSizes,
        VarGroup::TokenOpacities,
        VarGroup::CorePalette,
        VarGroup::ThemePalettes,
        VarGroup::Layers,
        VarGroup::Typography,
        VarGroup::Elevations,
        VarGroup::Dimensions,
        VarGroup::UiKit,
    ];

    pub fn name(self) -> &'static str {
        match self {
            VarGroup::TokenColors => "token-colors",
            VarGroup::TokenSizes => "token-sizes",
            VarGroup::TokenOpacities => "token-opacities",
            VarGroup::CorePalette => "core-palette",
            VarGroup::ThemePalettes => "theme-palettes",
            VarGroup::Layers => "layers",
            VarGroup::Typography => "typography",
            VarGroup::Elevations => "elevations",
            VarGroup::Dimensions => "dimensions",
            VarGroup::UiKit => "ui-kit",
        }
    }

    /// Documents whose contents can change this group's values.
    pub fn inputs(self) -> &'static [Domain] {
        match self {
            VarGroup::TokenColors | VarGroup::TokenSizes | VarGroup::TokenOpacities => TOKENS,
            VarGroup::UiKit => ALL_DOMAINS,
            _ => TOKENS_BRAND,
        }
    }

    /// Groups recomputed when `domain` changes.
    pub fn fed_by(domain: Domain) -> impl Iterator<Item = VarGroup> {
        VarGroup::ALL
            .into_iter()
            .filter(move |g| g.inputs().contains(&domain))
    }

    /// Groups whose values depend on the active theme.
    pub fn is_themed(self) -> bool {
        self.inputs().contains(&Domain::Brand)
    }

    /// Whether `path` belongs to this group under `theme`.
    pub fn contains(self, path: &TokenPath, theme: &str) -> bool {
        let brand_section = || match path.segments() {
            [root, themes, t, section, rest @ ..]
                if root == BRAND_ROOT && themes == THEMES_SEGMENT && t == theme =>
            {
                Some((section.as_str(), rest))
            }
            _ => None,
        };

        match self {
            VarGroup::TokenColors => path.starts_with(&["tokens", "colors"]),
            VarGroup::TokenSizes => path.starts_with(&["tokens", "sizes"]),
            VarGroup::TokenOpacities => path.starts_with(&["tokens", "opacities"]),
            VarGroup::CorePalette => matches!(
                brand_section(),
                Some(("palettes", [first, ..])) if first == "core-colors"
            ),
            VarGroup::ThemePalettes => matches!(
                brand_section(),
                Some(("palettes", rest)) if rest.first().map(String::as_str) != Some("core-colors")
            ),
            VarGroup::Layers => matches!(brand_section(), Some(("layers", _))),
            VarGroup::Typography => {
                path.starts_with(&["tokens", "font"])
                    || matches!(brand_section(), Some(("typography", _)))
            }
            VarGroup::Elevations => matches!(brand_section(), Some(("elevations", _))),
            VarGroup::Dimensions => matches!(brand_section(), Some(("dimensions", _))),
            VarGroup::UiKit => path.root() == Some(UI_KIT_ROOT),
        }
    }
}

impl std::fmt::Display for VarGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Computes one group in store mode.
///
/// Every value is resolved to its final literal. Composites, and references
/// that end at a composite, become `var()` pointers. Any violation fails the
/// whole group so the caller can keep the previous map.
pub fn compute_group(
    group: VarGroup,
    index: &TokenIndex,
    config: &Config,
    theme: &str,
) -> Result<VarMap, Vec<Violation>> {
    let prefix = config.prefix.as_str();
    let resolver = Resolver::new(index).with_max_depth(config.max_reference_depth);
    let name_of = |p: &TokenPath| variable_name(prefix, p);

    let members: Vec<&Entry> = index
        .entries()
        .iter()
        .filter(|e| group.contains(&e.path, theme))
        .collect();

    let mut vars = VarMap::new();
    let mut violations = check_layer_completeness(members.iter().copied(), config.layer_count);

    for entry in members {
        let value = match &entry.value {
            TokenValue::Literal(literal) => match literal.shape_error() {
                Some(problem) => Err(invalid(&entry.path, problem)),
                None => Ok(literal.to_css()),
            },
            TokenValue::Reference(_) => match resolver.resolve(&entry.path, Some(theme)) {
                Ok(Resolution::Literal(literal)) => match literal.shape_error() {
                    Some(problem) => Err(invalid(&entry.path, problem)),
                    None => Ok(literal.to_css()),
                },
                Ok(Resolution::Composite { .. }) => resolver
                    .resolve_css(&entry.path, Some(theme), name_of)
                    .map_err(|err| err.into_violation(&entry.path)),
                Err(err) => Err(err.into_violation(&entry.path)),
            },
            TokenValue::Composite(composite) => composite
                .to_css(name_of)
                .map_err(|reason| invalid(&entry.path, reason)),
        };

        match value {
            Ok(css) => {
                vars.insert(custom_property(prefix, &entry.path), css);
            }
            Err(violation) => violations.push(violation),
        }
    }

    if violations.is_empty() {
        Ok(vars)
    } else {
        Err(violations)
    }
}

fn invalid(path: &TokenPath, problem: String) -> Violation {
    Violation::new(path.to_string(), ViolationKind::InvalidValue, problem)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::Documents;

    fn path(s: &str) -> TokenPath {
        TokenPath::parse(s).unwrap()
    }

    #[test]
    fn test_membership() {
        let core = path("brand.themes.light.palettes.core-colors.black");
        assert!(VarGroup::CorePalette.contains(&core, "light"));
        assert!(!VarGroup::CorePalette.contains(&core, "dark"));
        assert!(!VarGroup::ThemePalettes.contains(&core, "light"));

        let neutral = path("brand.themes.light.palettes.neutral.100.color.tone");
        assert!(VarGroup::ThemePalettes.contains(&neutral, "light"));

        assert!(VarGroup::Typography.contains(&path("tokens.font.sizes.md"), "light"));
        assert!(VarGroup::UiKit.contains(&path("ui-kit.globals.icon.size"), "dark"));
    }

    #[test]
    fn test_every_canonical_path_has_at_most_one_group() {
        let index = Documents::canonical().unwrap().index();
        for entry in index.entries() {
            let owners: Vec<VarGroup> = VarGroup::ALL
                .into_iter()
                .filter(|g| g.contains(&entry.path, "light"))
                .collect();
            assert!(owners.len() <= 1, "{} in {:?}", entry.path, owners);
        }
    }

    #[test]
    fn test_fed_by() {
        let tokens: Vec<VarGroup> = VarGroup::fed_by(Domain::Tokens).collect();
        assert_eq!(tokens.len(), VarGroup::ALL.len());

        let ui_kit: Vec<VarGroup> = VarGroup::fed_by(Domain::UiKit).collect();
        assert_eq!(ui_kit, vec![VarGroup::UiKit]);

        assert!(!VarGroup::TokenColors.is_themed());
        assert!(VarGroup::Layers.is_themed());
    }

    #[test]
    fn test_canonical_groups_resolve_to_literals() {
        let index = Documents::canonical().unwrap().index();
        let config = Config::default();

        let palette = compute_group(VarGroup::ThemePalettes, &index, &config, "light").unwrap();
        assert_eq!(
            palette
                .get("--recursica_brand_themes_light_palettes_neutral_100_color_tone")
                .map(String::as_str),
            Some("#f4f4f5")
        );

        let dark = compute_group(VarGroup::ThemePalettes, &index, &config, "dark").unwrap();
        assert_eq!(
            dark.get("--recursica_brand_themes_dark_palettes_neutral_100_color_tone")
                .map(String::as_str),
            Some("#18181b")
        );
    }

    #[test]
    fn test_elevation_composite_is_a_pointer_list() {
        let index = Documents::canonical().unwrap().index();
        let vars =
            compute_group(VarGroup::Elevations, &index, &Config::default(), "light").unwrap();
        assert_eq!(
            vars.get("--recursica_brand_themes_light_elevations_elevation-1")
                .map(String::as_str),
            Some(
                "var(--recursica_brand_themes_light_elevations_elevation-1_x-axis) \
                 var(--recursica_brand_themes_light_elevations_elevation-1_y-axis) \
                 var(--recursica_brand_themes_light_elevations_elevation-1_blur) \
                 var(--recursica_brand_themes_light_elevations_elevation-1_spread) \
                 var(--recursica_brand_themes_light_elevations_elevation-1_shadow-color)"
            )
        );
        assert_eq!(
            vars.get("--recursica_brand_themes_light_elevations_elevation-1_blur")
                .map(String::as_str),
            Some("4px")
        );
    }

    #[test]
    fn test_group_fails_as_a_whole() {
        let docs = Documents::canonical().unwrap().with(
            Domain::Tokens,
            serde_json::json!({"tokens": {"colors": {"a": "#ffffff", "b": "{tokens.colors.nope}"}}}),
        );
        let index = docs.index();
        let err =
            compute_group(VarGroup::TokenColors, &index, &Config::default(), "light").unwrap_err();
        assert_eq!(err.len(), 1);
        assert_eq!(err[0].kind, ViolationKind::ReferenceNotFound);
    }
}
