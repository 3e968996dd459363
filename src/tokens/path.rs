//! Token paths and CSS variable naming.
//!
//! A [`TokenPath`] addresses a value by its dot-delimited position in a
//! source document (`tokens.colors.scale-02.500`). Variable names are derived
//! from paths by joining the prefix and every segment with `_`:
//!
//! | Path | Variable |
//! |------|----------|
//! | `tokens.colors.scale-02.500` | `--recursica_tokens_colors_scale-02_500` |
//! | `brand.themes.light.palettes.neutral.100.color.tone` | `--recursica_brand_themes_light_palettes_neutral_100_color_tone` |
//!
//! Segments are restricted to ASCII letters, digits, and hyphens, so the
//! mapping is reversible: [`decode_variable_name`] recovers the path.

use once_cell::sync::Lazy;
use regex::Regex;

static SEGMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9-]+$").expect("segment pattern is valid"));

static REFERENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\{([^{}\s]+)\}$").expect("reference pattern is valid"));

/// Root segment of the brand document.
pub const BRAND_ROOT: &str = "brand";
/// Root segment of the UI-kit document.
pub const UI_KIT_ROOT: &str = "ui-kit";
/// Segment under which per-theme brand values live.
pub const THEMES_SEGMENT: &str = "themes";

/// Dot-delimited address of a value in the document set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TokenPath {
    segments: Vec<String>,
}

impl TokenPath {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// Parses a dot-delimited path. Returns `None` if any segment is empty.
    pub fn parse(source: &str) -> Option<Self> {
        if source.is_empty() {
            return None;
        }
        let segments: Vec<String> = source.split('.').map(str::to_string).collect();
        if segments.iter().any(|s| s.is_empty()) {
            return None;
        }
        Some(Self { segments })
    }

    /// Parses a `{path}` reference string.
    pub fn parse_reference(source: &str) -> Option<Self> {
        REFERENCE
            .captures(source)
            .and_then(|caps| caps.get(1))
            .and_then(|inner| Self::parse(inner.as_str()))
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn root(&self) -> Option<&str> {
        self.segments.first().map(String::as_str)
    }

    pub fn last(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment.into());
        Self { segments }
    }

    pub fn starts_with(&self, prefix: &[&str]) -> bool {
        self.segments.len() >= prefix.len()
            && self.segments.iter().zip(prefix).all(|(a, b)| a == b)
    }

    /// Theme encoded by a `brand.themes.<theme>.…` path.
    pub fn theme(&self) -> Option<&str> {
        match self.segments.as_slice() {
            [root, themes, theme, ..] if root == BRAND_ROOT && themes == THEMES_SEGMENT => {
                Some(theme.as_str())
            }
            _ => None,
        }
    }

    /// Index of the first `layer-N` segment, and N.
    pub fn layer(&self) -> Option<(usize, u32)> {
        self.segments
            .iter()
            .enumerate()
            .find_map(|(i, s)| layer_index(s).map(|n| (i, n)))
    }

    /// Copy of this path with the layer segment replaced by `layer-{layer}`.
    pub fn with_layer(&self, layer: u32) -> Self {
        let mut segments = self.segments.clone();
        if let Some((i, _)) = self.layer() {
            segments[i] = format!("layer-{}", layer);
        }
        Self { segments }
    }

    /// Inserts `themes.<theme>` after the root segment.
    ///
    /// Used to derive per-theme names for documents that are not themselves
    /// split by theme.
    pub fn with_theme(&self, theme: &str) -> Self {
        let mut segments = Vec::with_capacity(self.segments.len() + 2);
        let mut iter = self.segments.iter().cloned();
        segments.extend(iter.next());
        segments.push(THEMES_SEGMENT.to_string());
        segments.push(theme.to_string());
        segments.extend(iter);
        Self { segments }
    }

    /// The theme- and layer-free form of this path.
    ///
    /// `brand.themes.light.layers.layer-0.property.surface` becomes
    /// `brand.layers.property.surface`.
    pub fn generic(&self) -> Self {
        let skip_theme = self.theme().is_some();
        let segments = self
            .segments
            .iter()
            .enumerate()
            .filter(|(i, s)| !(skip_theme && (*i == 1 || *i == 2)) && layer_index(s).is_none())
            .map(|(_, s)| s.clone())
            .collect();
        Self { segments }
    }

    /// Returns the segments that cannot be encoded in a variable name.
    pub fn invalid_segments(&self) -> impl Iterator<Item = &str> {
        self.segments
            .iter()
            .map(String::as_str)
            .filter(|s| !is_encodable_segment(s))
    }
}

impl std::fmt::Display for TokenPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.segments.join("."))
    }
}

/// Returns `true` if `segment` survives the path → name → path round trip.
pub fn is_encodable_segment(segment: &str) -> bool {
    SEGMENT.is_match(segment)
}

/// Parses `layer-N` into N.
pub fn layer_index(segment: &str) -> Option<u32> {
    let digits = segment.strip_prefix("layer-")?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Variable name for `path`, without the leading `--`.
pub fn variable_name(prefix: &str, path: &TokenPath) -> String {
    let mut name = String::from(prefix);
    for segment in path.segments() {
        name.push('_');
        name.push_str(segment);
    }
    name
}

/// Custom property name for `path` (`--prefix_…`).
pub fn custom_property(prefix: &str, path: &TokenPath) -> String {
    format!("--{}", variable_name(prefix, path))
}

/// `var()` pointer to a variable name produced by [`variable_name`].
pub fn var_ref(name: &str) -> String {
    format!("var(--{})", name)
}

/// Recovers the path from a variable name, with or without the leading `--`.
pub fn decode_variable_name(prefix: &str, name: &str) -> Option<TokenPath> {
    let name = name.strip_prefix("--").unwrap_or(name);
    let rest = name.strip_prefix(prefix)?.strip_prefix('_')?;
    let segments: Vec<&str> = rest.split('_').collect();
    if segments.iter().any(|s| !is_encodable_segment(s)) {
        return None;
    }
    Some(TokenPath::new(segments))
}
