//! Token model: paths, values, the parsed tree, and the path index.
//!
//! - [`TokenPath`]: dot-delimited address plus variable naming helpers
//! - [`Node`]: tagged tree parsed from a JSON document
//! - [`TokenValue`] / [`Literal`] / [`Composite`]: indexed value variants
//! - [`TokenIndex`]: ordered, path-addressable entries over the document set

mod index;
mod path;
mod tree;
mod value;

pub use index::{index_document, Entry, TokenIndex};
pub use path::{
    custom_property, decode_variable_name, is_encodable_segment, layer_index, var_ref,
    variable_name, TokenPath, BRAND_ROOT, THEMES_SEGMENT, UI_KIT_ROOT,
};
pub use tree::Node;
pub use value::{Composite, CompositeKind, Literal, TokenValue, DIMENSION_UNITS};
