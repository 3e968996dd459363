//! Live application of CSS variables.
//!
//! - [`VarsStore`]: owns the working documents and drives everything below
//! - [`VarGroup`] / [`compute_group`]: independent derived variable groups
//! - [`VarDelta`] / [`StyleTarget`]: minimal writes against a style target
//! - [`PersistStore`]: durable mirror keyed by bundle version
//! - [`Subscription`]: listener handles with batched notification

mod delta;
mod groups;
mod listeners;
mod persist;
mod vars_store;

pub use delta::{MemoryStyleTarget, StyleTarget, StyleWrite, VarDelta};
pub use groups::{compute_group, VarGroup, VarMap};
pub use listeners::{Notifier, Subscription};
pub use persist::{
    bundle_version, FilePersistence, MemoryPersistence, PersistError, PersistStore, VERSION_KEY,
};
pub use vars_store::{Hydration, MutationReport, StoreState, VarsStore, VarsStoreBuilder};
