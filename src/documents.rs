//! The three-document set: tokens, brand, and UI-kit.
//!
//! [`Documents`] is an immutable snapshot. Each document sits behind an
//! [`Arc`], so cloning a snapshot is cheap and replacing one document
//! ([`Documents::with`]) leaves every other holder of the old snapshot
//! untouched.

use std::sync::Arc;

use serde_json::Value;

use crate::error::Error;
use crate::tokens::TokenIndex;

const CANONICAL_TOKENS: &str = include_str!("../defaults/tokens.json");
const CANONICAL_BRAND: &str = include_str!("../defaults/brand.json");
const CANONICAL_UI_KIT: &str = include_str!("../defaults/ui-kit.json");

/// Identifies one of the three source documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Domain {
    Tokens,
    Brand,
    UiKit,
}

impl Domain {
    /// All domains in indexing order.
    pub const ALL: [Domain; 3] = [Domain::Tokens, Domain::Brand, Domain::UiKit];

    /// Stable key used for persistence and logging.
    pub fn key(self) -> &'static str {
        match self {
            Domain::Tokens => "tokens",
            Domain::Brand => "brand",
            Domain::UiKit => "ui-kit",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Domain::ALL.into_iter().find(|d| d.key() == key)
    }
}

impl std::fmt::Display for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Snapshot of the tokens, brand, and UI-kit documents.
#[derive(Debug, Clone, PartialEq)]
pub struct Documents {
    tokens: Arc<Value>,
    brand: Arc<Value>,
    ui_kit: Arc<Value>,
}

impl Documents {
    pub fn new(tokens: Value, brand: Value, ui_kit: Value) -> Self {
        Self {
            tokens: Arc::new(tokens),
            brand: Arc::new(brand),
            ui_kit: Arc::new(ui_kit),
        }
    }

    /// Parses the three documents from JSON text.
    pub fn from_json_strs(tokens: &str, brand: &str, ui_kit: &str) -> Result<Self, Error> {
        let parse = |domain: Domain, source: &str| {
            serde_json::from_str::<Value>(source)
                .map_err(|e| Error::json(format!("{} document", domain), e))
        };
        Ok(Self::new(
            parse(Domain::Tokens, tokens)?,
            parse(Domain::Brand, brand)?,
            parse(Domain::UiKit, ui_kit)?,
        ))
    }

    /// The canonical default documents shipped with the crate.
    pub fn canonical() -> Result<Self, Error> {
        Self::from_json_strs(CANONICAL_TOKENS, CANONICAL_BRAND, CANONICAL_UI_KIT)
    }

    pub fn get(&self, domain: Domain) -> &Arc<Value> {
        match domain {
            Domain::Tokens => &self.tokens,
            Domain::Brand => &self.brand,
            Domain::UiKit => &self.ui_kit,
        }
    }

    /// Returns a new snapshot with one document replaced.
    pub fn with(&self, domain: Domain, document: Value) -> Self {
        let mut next = self.clone();
        let slot = match domain {
            Domain::Tokens => &mut next.tokens,
            Domain::Brand => &mut next.brand,
            Domain::UiKit => &mut next.ui_kit,
        };
        *slot = Arc::new(document);
        next
    }

    /// Iterates over (domain, document) in indexing order.
    pub fn iter(&self) -> impl Iterator<Item = (Domain, &Value)> {
        Domain::ALL
            .into_iter()
            .map(move |domain| (domain, self.get(domain).as_ref()))
    }

    /// Builds the path index over all three documents.
    pub fn index(&self) -> TokenIndex {
        TokenIndex::build(self.iter().map(|(_, doc)| doc))
    }
}
