//! Token value variants.

use once_cell::sync::Lazy;
use regex::Regex;

use super::path::{var_ref, TokenPath};

static HEX_COLOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^#[0-9a-fA-F]{6}([0-9a-fA-F]{2})?$").expect("color pattern is valid")
});

static DIMENSION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(-?(?:\d+(?:\.\d+)?|\.\d+))([A-Za-z%]+)$").expect("dimension pattern is valid")
});

/// Units accepted on dimension values.
pub const DIMENSION_UNITS: &[&str] = &["px", "rem", "em", "%", "vh", "vw", "ms", "s"];

/// A concrete (non-reference) leaf value.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Color(String),
    Dimension { value: f64, unit: String },
    Number(f64),
    Text(String),
    Bool(bool),
    /// A value whose JSON shape could not be interpreted.
    Invalid { raw: String, reason: String },
}

impl Literal {
    /// Parses `"12px"`-style strings.
    pub fn parse_dimension(source: &str) -> Option<Literal> {
        let caps = DIMENSION.captures(source)?;
        let value = caps.get(1)?.as_str().parse::<f64>().ok()?;
        let unit = caps.get(2)?.as_str().to_string();
        Some(Literal::Dimension { value, unit })
    }

    /// Returns `true` if a string parses as a dimension.
    pub fn looks_like_dimension(source: &str) -> bool {
        DIMENSION.is_match(source)
    }

    /// Describes why this literal is not a valid value, if it isn't.
    pub fn shape_error(&self) -> Option<String> {
        match self {
            Literal::Color(hex) if !HEX_COLOR.is_match(hex) => {
                Some(format!("'{}' is not a #RRGGBB or #RRGGBBAA color", hex))
            }
            Literal::Dimension { value, .. } if !value.is_finite() => {
                Some(format!("dimension value {} is not finite", value))
            }
            Literal::Dimension { unit, .. } if !DIMENSION_UNITS.contains(&unit.as_str()) => {
                Some(format!(
                    "unit '{}' is not one of: {}",
                    unit,
                    DIMENSION_UNITS.join(", ")
                ))
            }
            Literal::Number(n) if !n.is_finite() => Some(format!("number {} is not finite", n)),
            Literal::Invalid { raw, reason } => Some(format!("{} ({})", reason, raw)),
            _ => None,
        }
    }

    /// Renders the literal as a CSS value.
    pub fn to_css(&self) -> String {
        match self {
            Literal::Color(hex) => hex.clone(),
            Literal::Dimension { value, unit } => format!("{}{}", value, unit),
            Literal::Number(n) => n.to_string(),
            Literal::Text(text) => text.clone(),
            Literal::Bool(b) => b.to_string(),
            Literal::Invalid { raw, .. } => raw.clone(),
        }
    }
}

/// Kinds of composite values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompositeKind {
    /// A box shadow assembled from offset, blur, spread, and color parts.
    Shadow,
}

impl CompositeKind {
    /// Part names in emission order.
    pub fn parts(self) -> &'static [&'static str] {
        match self {
            CompositeKind::Shadow => &["x-axis", "y-axis", "blur", "spread", "shadow-color"],
        }
    }

    /// The composite kind of groups nested directly under `container`.
    pub fn for_container(container: &str) -> Option<Self> {
        match container {
            "elevations" => Some(CompositeKind::Shadow),
            _ => None,
        }
    }
}

/// A value assembled from sibling part values.
#[derive(Debug, Clone, PartialEq)]
pub struct Composite {
    pub kind: CompositeKind,
    /// Parts as found in the document: (part name, part path).
    pub parts: Vec<(String, TokenPath)>,
}

impl Composite {
    /// Part paths in canonical order.
    ///
    /// Fails unless the document defines exactly the expected parts.
    pub fn ordered_parts(&self) -> Result<Vec<&TokenPath>, String> {
        let expected = self.kind.parts();
        let unexpected: Vec<&str> = self
            .parts
            .iter()
            .map(|(name, _)| name.as_str())
            .filter(|name| !expected.contains(name))
            .collect();
        let missing: Vec<&str> = expected
            .iter()
            .copied()
            .filter(|name| !self.parts.iter().any(|(n, _)| n == name))
            .collect();

        if !missing.is_empty() || !unexpected.is_empty() || self.parts.len() != expected.len() {
            let mut reason = format!(
                "composite expects {} parts ({}), found {}",
                expected.len(),
                expected.join(", "),
                self.parts.len()
            );
            if !missing.is_empty() {
                reason.push_str(&format!("; missing {}", missing.join(", ")));
            }
            if !unexpected.is_empty() {
                reason.push_str(&format!("; unexpected {}", unexpected.join(", ")));
            }
            return Err(reason);
        }

        Ok(expected
            .iter()
            .filter_map(|name| self.parts.iter().find(|(n, _)| n == name))
            .map(|(_, path)| path)
            .collect())
    }

    /// Renders the composite as space-joined `var()` pointers.
    pub fn to_css<F>(&self, name_of: F) -> Result<String, String>
    where
        F: Fn(&TokenPath) -> String,
    {
        let parts = self.ordered_parts()?;
        Ok(parts
            .into_iter()
            .map(|p| var_ref(&name_of(p)))
            .collect::<Vec<_>>()
            .join(" "))
    }
}

/// The value held at one indexed path.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenValue {
    Literal(Literal),
    Reference(TokenPath),
    Composite(Composite),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_shape() {
        assert!(Literal::Color("#112233".into()).shape_error().is_none());
        assert!(Literal::Color("#11223344".into()).shape_error().is_none());
        assert!(Literal::Color("#123".into()).shape_error().is_some());
        assert!(Literal::Color("red".into()).shape_error().is_some());
    }

    #[test]
    fn test_dimension_parsing() {
        assert_eq!(
            Literal::parse_dimension("0.875rem"),
            Some(Literal::Dimension {
                value: 0.875,
                unit: "rem".into()
            })
        );
        assert_eq!(
            Literal::parse_dimension("-4px"),
            Some(Literal::Dimension {
                value: -4.0,
                unit: "px".into()
            })
        );
        assert!(Literal::parse_dimension("px").is_none());
        assert!(Literal::parse_dimension("12 px").is_none());
    }

    #[test]
    fn test_dimension_unit_shape() {
        let bad = Literal::parse_dimension("12pt").unwrap();
        assert!(bad.shape_error().unwrap().contains("pt"));
        assert!(Literal::parse_dimension("50%")
            .unwrap()
            .shape_error()
            .is_none());
    }

    #[test]
    fn test_css_rendering() {
        assert_eq!(Literal::Number(1.0).to_css(), "1");
        assert_eq!(Literal::Number(0.48).to_css(), "0.48");
        assert_eq!(
            Literal::Dimension {
                value: 12.0,
                unit: "px".into()
            }
            .to_css(),
            "12px"
        );
        assert_eq!(Literal::Text("Inter".into()).to_css(), "Inter");
    }

    fn shadow(names: &[&str]) -> Composite {
        let base = TokenPath::new(["brand", "elevations", "e1"]);
        Composite {
            kind: CompositeKind::Shadow,
            parts: names.iter().map(|n| (n.to_string(), base.child(*n))).collect(),
        }
    }

    #[test]
    fn test_composite_canonical_order() {
        let composite = shadow(&["shadow-color", "blur", "x-axis", "spread", "y-axis"]);
        let css = composite
            .to_css(|p| p.last().unwrap_or_default().to_string())
            .unwrap();
        assert_eq!(
            css,
            "var(--x-axis) var(--y-axis) var(--blur) var(--spread) var(--shadow-color)"
        );
    }

    #[test]
    fn test_composite_part_count() {
        let missing = shadow(&["x-axis", "y-axis", "blur", "spread"]);
        let err = missing.ordered_parts().unwrap_err();
        assert!(err.contains("missing shadow-color"));

        let extra = shadow(&["x-axis", "y-axis", "blur", "spread", "shadow-color", "inset"]);
        assert!(extra.ordered_parts().unwrap_err().contains("unexpected inset"));
    }
}
