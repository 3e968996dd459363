//! Validation passes over an indexed document set.
//!
//! Each pass collects violations instead of stopping at the first one. The
//! passes run in a fixed order and their findings are concatenated:
//!
//! 1. path findings recorded by the indexer
//! 2. reference existence and cycles
//! 3. value shape (colors, numbers, dimensions, composites)
//! 4. layer completeness
//!
//! The caller decides whether a non-empty result is fatal.

use std::collections::{HashMap, HashSet};

use crate::config::Config;
use crate::error::{Violation, ViolationKind};
use crate::resolve::Resolver;
use crate::tokens::{Entry, TokenIndex, TokenPath, TokenValue, BRAND_ROOT, UI_KIT_ROOT};

/// Runs every pass and returns the merged, ordered violations.
///
/// Entries without a theme of their own (tokens, UI-kit) are resolved once
/// per theme in `themes`, since their references may use theme shorthand.
pub fn validate(index: &TokenIndex, config: &Config, themes: &[&str]) -> Vec<Violation> {
    let mut violations = index.findings().to_vec();
    violations.extend(check_references(index, config, themes));
    violations.extend(check_shapes(index.entries()));
    violations.extend(check_layer_completeness(
        index.entries().iter(),
        config.layer_count,
    ));
    violations
}

/// Every reference must reach a literal or composite without cycles.
pub fn check_references(index: &TokenIndex, config: &Config, themes: &[&str]) -> Vec<Violation> {
    let resolver = Resolver::new(index).with_max_depth(config.max_reference_depth);
    let mut violations = Vec::new();
    let mut seen = HashSet::new();

    for entry in index.entries() {
        if !matches!(entry.value, TokenValue::Reference(_)) {
            continue;
        }

        let contexts: Vec<Option<&str>> = match entry.path.theme() {
            Some(theme) => vec![Some(theme)],
            None if themes.is_empty() => vec![None],
            None => themes.iter().copied().map(Some).collect(),
        };

        for theme in contexts {
            if let Err(err) = resolver.resolve(&entry.path, theme) {
                let violation = err.into_violation(&entry.path);
                if seen.insert((violation.path.clone(), violation.message.clone())) {
                    violations.push(violation);
                }
            }
        }
    }

    violations
}

/// Literal and composite values must be well formed.
pub fn check_shapes(entries: &[Entry]) -> Vec<Violation> {
    entries
        .iter()
        .filter_map(|entry| {
            let problem = match &entry.value {
                TokenValue::Literal(literal) => literal.shape_error(),
                TokenValue::Composite(composite) => composite.ordered_parts().err(),
                TokenValue::Reference(_) => None,
            }?;
            Some(Violation::new(
                entry.path.to_string(),
                ViolationKind::InvalidValue,
                problem,
            ))
        })
        .collect()
}

/// Whether a path takes part in the layer completeness contract.
fn is_layered_scope(path: &TokenPath) -> bool {
    match path.root() {
        Some(UI_KIT_ROOT) => true,
        Some(BRAND_ROOT) => path.theme().is_some(),
        _ => false,
    }
}

/// A property defined under any `layer-N` must be defined under every layer.
///
/// Properties are grouped by their canonical name: the path with its layer
/// segment replaced by `layer-*`. One violation is reported per missing
/// layer, against the path that should exist.
pub fn check_layer_completeness<'a, I>(entries: I, layer_count: u32) -> Vec<Violation>
where
    I: IntoIterator<Item = &'a Entry>,
{
    let mut order: Vec<String> = Vec::new();
    let mut present: HashMap<String, (TokenPath, Vec<u32>)> = HashMap::new();
    let mut violations = Vec::new();

    for entry in entries {
        if !is_layered_scope(&entry.path) {
            continue;
        }
        let Some((_, layer)) = entry.path.layer() else {
            continue;
        };

        if layer >= layer_count {
            violations.push(Violation::new(
                entry.path.to_string(),
                ViolationKind::LayerIncomplete,
                format!(
                    "layer-{} is outside layer-0..layer-{}",
                    layer,
                    layer_count.saturating_sub(1)
                ),
            ));
            continue;
        }

        let canonical = canonical_name(&entry.path);
        let slot = present.entry(canonical.clone()).or_insert_with(|| {
            order.push(canonical);
            (entry.path.clone(), Vec::new())
        });
        slot.1.push(layer);
    }

    for canonical in order {
        let Some((template, layers)) = present.get(&canonical) else {
            continue;
        };
        for layer in 0..layer_count {
            if !layers.contains(&layer) {
                violations.push(Violation::new(
                    template.with_layer(layer).to_string(),
                    ViolationKind::LayerIncomplete,
                    format!("missing layer-{} definition of {}", layer, canonical),
                ));
            }
        }
    }

    violations
}

fn canonical_name(path: &TokenPath) -> String {
    let mut segments: Vec<&str> = path.segments().iter().map(String::as_str).collect();
    if let Some((i, _)) = path.layer() {
        segments[i] = "layer-*";
    }
    segments.join(".")
}
