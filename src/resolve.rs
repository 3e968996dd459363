//! Reference resolution.
//!
//! A reference is a `{path}` value pointing at another indexed path. The
//! [`Resolver`] supports two modes:
//!
//! - **Store mode** ([`Resolver::resolve_css`]): follows the chain to the
//!   final literal and renders it. The live store applies these values.
//! - **Export mode** ([`Resolver::pointer`]): stops after one hop and renders
//!   `var(--<name>)`, so exported CSS is itself a graph of variable
//!   references rather than flattened literals.
//!
//! # Theme shorthand
//!
//! Inside a themed context a reference may omit the theme:
//! `{brand.palettes.neutral.100.color.tone}` under theme `light` expands to
//! `brand.themes.light.palettes.neutral.100.color.tone`. When both the
//! literal path and its expanded form exist, the expanded form wins. When
//! the expanded form does not exist the path is used as written.
//!
//! The theme of a hop is taken from the path that holds the reference
//! (`brand.themes.dark.…` resolves in `dark`) and otherwise from the caller's
//! context theme.

use thiserror::Error;

use crate::error::{Violation, ViolationKind};
use crate::tokens::{
    var_ref, Composite, Literal, TokenIndex, TokenPath, TokenValue, BRAND_ROOT, THEMES_SEGMENT,
};

/// Default bound on reference hops.
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Why a reference could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("reference {{{target}}} not found")]
    NotFound { target: TokenPath },

    #[error("reference cycle: {}", render_chain(.chain))]
    Cycle { chain: Vec<TokenPath> },

    #[error("reference chain exceeds {limit} hops: {}", render_chain(.chain))]
    DepthExceeded { limit: usize, chain: Vec<TokenPath> },
}

fn render_chain(chain: &[TokenPath]) -> String {
    chain
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" -> ")
}

impl ResolveError {
    pub fn kind(&self) -> ViolationKind {
        match self {
            ResolveError::NotFound { .. } => ViolationKind::ReferenceNotFound,
            ResolveError::Cycle { .. } | ResolveError::DepthExceeded { .. } => ViolationKind::Cycle,
        }
    }

    /// Converts into a violation reported against `owner`.
    pub fn into_violation(self, owner: &TokenPath) -> Violation {
        Violation::new(owner.to_string(), self.kind(), self.to_string())
    }
}

/// Where a reference chain ends.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution<'a> {
    Literal(&'a Literal),
    /// Composites are never flattened; callers point at them by name.
    Composite {
        path: TokenPath,
        composite: &'a Composite,
    },
}

/// Resolves references against a [`TokenIndex`].
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    index: &'a TokenIndex,
    max_depth: usize,
}

impl<'a> Resolver<'a> {
    pub fn new(index: &'a TokenIndex) -> Self {
        Self {
            index,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn index(&self) -> &'a TokenIndex {
        self.index
    }

    /// Applies the theme shorthand rule to a reference target.
    pub fn expand(&self, target: &TokenPath, theme: Option<&str>) -> TokenPath {
        let (Some(theme), [root, second, ..]) = (theme, target.segments()) else {
            return target.clone();
        };
        if root != BRAND_ROOT || second == THEMES_SEGMENT {
            return target.clone();
        }

        let expanded = TokenPath::new(
            [BRAND_ROOT, THEMES_SEGMENT, theme]
                .into_iter()
                .map(str::to_string)
                .chain(target.segments()[1..].iter().cloned()),
        );
        if self.index.contains(&expanded) {
            expanded
        } else {
            target.clone()
        }
    }

    /// Follows the chain starting at `path` to a literal or composite.
    pub fn resolve(
        &self,
        path: &TokenPath,
        theme: Option<&str>,
    ) -> Result<Resolution<'a>, ResolveError> {
        let mut current = path.clone();
        let mut chain = vec![path.clone()];

        loop {
            let entry = self
                .index
                .get(&current)
                .ok_or_else(|| ResolveError::NotFound {
                    target: current.clone(),
                })?;

            match &entry.value {
                TokenValue::Literal(literal) => return Ok(Resolution::Literal(literal)),
                TokenValue::Composite(composite) => {
                    return Ok(Resolution::Composite {
                        path: current,
                        composite,
                    })
                }
                TokenValue::Reference(target) => {
                    let hop_theme = current.theme().or(theme);
                    let next = self.expand(target, hop_theme);

                    if chain.contains(&next) {
                        chain.push(next);
                        return Err(ResolveError::Cycle { chain });
                    }
                    if !self.index.contains(&next) {
                        return Err(ResolveError::NotFound { target: next });
                    }
                    if chain.len() > self.max_depth {
                        chain.push(next);
                        return Err(ResolveError::DepthExceeded {
                            limit: self.max_depth,
                            chain,
                        });
                    }

                    chain.push(next.clone());
                    current = next;
                }
            }
        }
    }

    /// Store mode: the fully resolved CSS value of `path`.
    ///
    /// Literals render as themselves. A chain ending at a composite renders
    /// as a `var()` pointer to the composite, named by `name_of`.
    pub fn resolve_css<F>(
        &self,
        path: &TokenPath,
        theme: Option<&str>,
        name_of: F,
    ) -> Result<String, ResolveError>
    where
        F: Fn(&TokenPath) -> String,
    {
        match self.resolve(path, theme)? {
            Resolution::Literal(literal) => Ok(literal.to_css()),
            Resolution::Composite { path, .. } => Ok(var_ref(&name_of(&path))),
        }
    }

    /// Export mode: a `var()` pointer for a reference held at `owner`.
    ///
    /// Only the first hop is taken; the target's own value is emitted under
    /// its own name.
    pub fn pointer<F>(
        &self,
        owner: &TokenPath,
        target: &TokenPath,
        theme: Option<&str>,
        name_of: F,
    ) -> Result<String, ResolveError>
    where
        F: Fn(&TokenPath) -> String,
    {
        let expanded = self.expand(target, owner.theme().or(theme));
        if !self.index.contains(&expanded) {
            return Err(ResolveError::NotFound { target: expanded });
        }
        Ok(var_ref(&name_of(&expanded)))
    }
}
