//! # Recursica - design tokens to CSS custom properties
//!
//! Recursica turns three JSON documents into CSS variables:
//!
//! - **tokens**: raw scales (colors, sizes, opacities, fonts)
//! - **brand**: per-theme palettes, layers, elevations, typography
//! - **ui-kit**: component and global properties, per layer
//!
//! Values may reference other values with `{path.to.value}`. Inside a themed
//! brand context, `{brand.palettes.x}` is shorthand for
//! `{brand.themes.<theme>.palettes.x}` when that path exists.
//!
//! ## Export
//!
//! The export path is fail-hard: every violation in the document set is
//! collected and returned in one [`ValidationError`], and nothing is emitted.
//!
//! ```rust
//! use recursica::{export_scoped, Config, Documents};
//!
//! let docs = Documents::canonical().unwrap();
//! let artifact = export_scoped(&docs, &Config::default()).unwrap();
//! assert!(artifact.contents.contains(r#"[data-theme="dark"]"#));
//! ```
//!
//! ## Live store
//!
//! [`VarsStore`] keeps the documents in memory and applies resolved values to
//! a [`StyleTarget`]. It is fail-soft: an edit that breaks a variable group is
//! logged and the group keeps its previous values.
//!
//! ## Naming
//!
//! Every indexed path gets exactly one variable name, `--<prefix>_` followed
//! by the path segments joined with `_`. Segments are restricted to ASCII
//! letters, digits, and hyphens, so [`decode_variable_name`] recovers the
//! path from any emitted name.

pub mod config;
pub mod documents;
pub mod emit;
pub mod error;
pub mod resolve;
pub mod store;
pub mod theme;
pub mod tokens;
pub mod validate;

pub use config::Config;
pub use documents::{Documents, Domain};
pub use emit::{
    export_scoped, export_specific, CssBlock, CssRenderer, Declaration, ExportArtifact,
    ScopedEmitter, SpecificEmitter,
};
pub use error::{Error, Result, ValidationError, Violation, ViolationKind};
pub use resolve::{Resolution, ResolveError, Resolver};
pub use store::{
    FilePersistence, Hydration, MemoryPersistence, MemoryStyleTarget, MutationReport,
    PersistError, PersistStore, StoreState, StyleTarget, StyleWrite, Subscription, VarGroup,
    VarMap, VarsStore,
};
pub use theme::{set_theme_detector, ColorMode, AUTO_THEME};
pub use tokens::{decode_variable_name, variable_name, TokenIndex, TokenPath};
pub use validate::validate;
