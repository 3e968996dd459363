//! The reactive vars store.
//!
//! [`VarsStore`] owns the working document triple, applies the derived CSS
//! variable groups to a [`StyleTarget`], mirrors the documents to a
//! [`PersistStore`], and notifies listeners after each mutation.
//!
//! ```rust
//! use recursica::{Domain, MemoryStyleTarget, StoreState, StyleTarget, VarsStore};
//!
//! let mut store = VarsStore::builder(MemoryStyleTarget::new()).build().unwrap();
//! assert_eq!(store.state(), StoreState::Uninitialized);
//!
//! store.hydrate();
//! assert_eq!(store.state(), StoreState::Ready);
//! assert_eq!(
//!     store.target().property("--recursica_tokens_colors_scale-01_000"),
//!     Some("#ffffff")
//! );
//!
//! let mut tokens = store.get(Domain::Tokens).as_ref().clone();
//! tokens["tokens"]["colors"]["scale-01"]["000"]["$value"] = "#fefefe".into();
//! let report = store.set(Domain::Tokens, tokens);
//! assert!(report.is_accepted());
//! assert_eq!(
//!     store.target().property("--recursica_tokens_colors_scale-01_000"),
//!     Some("#fefefe")
//! );
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::documents::{Documents, Domain};
use crate::error::{Error, Violation};
use crate::theme::{select_theme, AUTO_THEME};

use super::delta::{MemoryStyleTarget, StyleTarget, VarDelta};
use super::groups::{compute_group, VarGroup, VarMap};
use super::listeners::{Notifier, Subscription};
use super::persist::{bundle_version, MemoryPersistence, PersistError, PersistStore, VERSION_KEY};

/// Lifecycle of a [`VarsStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreState {
    Uninitialized,
    Hydrating,
    Ready,
    Mutating,
}

/// How the working documents were obtained during hydration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Hydration {
    /// The persisted bundle version matched. `recovered` lists documents
    /// that were missing or unreadable and were replaced by defaults.
    Restored { recovered: Vec<Domain> },
    /// The persisted version was absent or stale; everything was reseeded
    /// from defaults and mirrored again.
    Reseeded,
    /// Persistence could not be read; defaults are used and nothing is
    /// mirrored.
    Fallback,
    /// The store had already been hydrated.
    AlreadyReady,
}

/// What one mutation did to the applied variables.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MutationReport {
    /// Groups that were recomputed, in group order.
    pub recomputed: Vec<VarGroup>,
    /// Recomputed groups whose applied variables actually changed.
    pub changed: Vec<VarGroup>,
    /// Groups whose recompute failed and kept their previous variables.
    pub rejected: Vec<(VarGroup, Vec<Violation>)>,
    /// Number of property writes against the style target.
    pub writes: usize,
}

impl MutationReport {
    pub fn is_accepted(&self) -> bool {
        self.rejected.is_empty()
    }

    pub fn violations(&self) -> impl Iterator<Item = &Violation> {
        self.rejected.iter().flat_map(|(_, v)| v.iter())
    }
}

/// Builder for [`VarsStore`].
pub struct VarsStoreBuilder<T> {
    target: T,
    config: Config,
    defaults: Option<Documents>,
    persistence: Option<Box<dyn PersistStore>>,
}

impl<T: StyleTarget> VarsStoreBuilder<T> {
    fn new(target: T) -> Self {
        Self {
            target,
            config: Config::default(),
            defaults: None,
            persistence: None,
        }
    }

    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Replaces the canonical documents. Defaults to [`Documents::canonical`].
    pub fn defaults(mut self, documents: Documents) -> Self {
        self.defaults = Some(documents);
        self
    }

    /// Sets the durable mirror. Defaults to a fresh [`MemoryPersistence`].
    pub fn persistence(mut self, store: impl PersistStore + 'static) -> Self {
        self.persistence = Some(Box::new(store));
        self
    }

    /// Builds an uninitialized store. Nothing is read or applied until
    /// [`VarsStore::hydrate`].
    pub fn build(self) -> Result<VarsStore<T>, Error> {
        self.config.validate()?;
        let canonical = match self.defaults {
            Some(documents) => documents,
            None => Documents::canonical()?,
        };
        let version = bundle_version(&canonical);
        let theme = self.config.initial_theme();
        let notifier = Notifier::new(self.config.batch_debounce());

        Ok(VarsStore {
            documents: canonical.clone(),
            canonical,
            bundle_version: version,
            theme,
            state: StoreState::Uninitialized,
            applied: BTreeMap::new(),
            stale: BTreeSet::new(),
            target: self.target,
            persistence: self
                .persistence
                .unwrap_or_else(|| Box::new(MemoryPersistence::new())),
            notifier,
            config: self.config,
        })
    }
}

/// Owns the working documents and keeps the style target in sync.
///
/// Mutations are serialized by `&mut self`: each one is recomputed, applied,
/// and persisted before listeners run, and listeners cannot re-enter.
pub struct VarsStore<T: StyleTarget = MemoryStyleTarget> {
    config: Config,
    canonical: Documents,
    bundle_version: String,
    documents: Documents,
    theme: String,
    state: StoreState,
    applied: BTreeMap<VarGroup, VarMap>,
    stale: BTreeSet<VarGroup>,
    target: T,
    persistence: Box<dyn PersistStore>,
    notifier: Notifier,
}

impl<T: StyleTarget> VarsStore<T> {
    pub fn builder(target: T) -> VarsStoreBuilder<T> {
        VarsStoreBuilder::new(target)
    }

    pub fn state(&self) -> StoreState {
        self.state
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The active theme.
    pub fn theme(&self) -> &str {
        &self.theme
    }

    pub fn bundle_version(&self) -> &str {
        &self.bundle_version
    }

    pub fn target(&self) -> &T {
        &self.target
    }

    pub fn target_mut(&mut self) -> &mut T {
        &mut self.target
    }

    /// Consumes the store, returning the style target.
    pub fn into_target(self) -> T {
        self.target
    }

    /// An immutable snapshot of one working document.
    pub fn get(&self, domain: Domain) -> Arc<Value> {
        Arc::clone(self.documents.get(domain))
    }

    /// An immutable snapshot of all three working documents.
    pub fn documents(&self) -> Documents {
        self.documents.clone()
    }

    /// The variables last applied for `group`.
    pub fn group_vars(&self, group: VarGroup) -> Option<&VarMap> {
        self.applied.get(&group)
    }

    /// Groups whose latest recompute failed and still show older values.
    pub fn stale_groups(&self) -> impl Iterator<Item = VarGroup> + '_ {
        self.stale.iter().copied()
    }

    /// Loads the working documents and applies every group.
    ///
    /// Never fails: unreadable persistence falls back to the defaults, and a
    /// restored document that any of its groups rejects is replaced by the
    /// default for that domain.
    pub fn hydrate(&mut self) -> Hydration {
        if self.state != StoreState::Uninitialized {
            return Hydration::AlreadyReady;
        }
        self.state = StoreState::Hydrating;

        let outcome = match self.persistence.load(VERSION_KEY) {
            Ok(Some(version)) if version == self.bundle_version => self.restore(),
            Ok(stored) => {
                info!(
                    stored = stored.as_deref().unwrap_or("none"),
                    current = %self.bundle_version,
                    "bundle version changed, reseeding from defaults"
                );
                self.reseed();
                Hydration::Reseeded
            }
            Err(err) => {
                warn!(error = %err, "persistence unreadable, using defaults");
                self.documents = self.canonical.clone();
                Hydration::Fallback
            }
        };

        let report = self.recompute(VarGroup::ALL.into_iter().collect());
        info!(
            theme = %self.theme,
            groups = report.recomputed.len(),
            rejected = report.rejected.len(),
            "vars store ready"
        );
        self.state = StoreState::Ready;
        outcome
    }

    fn restore(&mut self) -> Hydration {
        let mut documents = self.canonical.clone();
        let mut recovered = Vec::new();

        for domain in Domain::ALL {
            match self.load_document(domain) {
                Ok(Some(document)) => documents = documents.with(domain, document),
                Ok(None) => recovered.push(domain),
                Err(err) => {
                    warn!(error = %err, "discarding persisted {} document", domain);
                    recovered.push(domain);
                }
            }
        }

        for domain in Domain::ALL {
            if recovered.contains(&domain)
                || documents.get(domain) == self.canonical.get(domain)
            {
                continue;
            }
            let index = documents.index();
            let failing = VarGroup::fed_by(domain)
                .find(|&group| compute_group(group, &index, &self.config, &self.theme).is_err());
            if let Some(group) = failing {
                warn!(
                    group = %group,
                    "persisted {} document does not apply, using defaults",
                    domain
                );
                documents = documents.with(domain, self.canonical.get(domain).as_ref().clone());
                recovered.push(domain);
            }
        }

        self.documents = documents;
        for &domain in &recovered {
            self.persist(domain);
        }
        info!(recovered = recovered.len(), "restored persisted documents");
        Hydration::Restored { recovered }
    }

    fn load_document(&self, domain: Domain) -> Result<Option<Value>, PersistError> {
        let Some(text) = self.persistence.load(domain.key())? else {
            return Ok(None);
        };
        serde_json::from_str(&text)
            .map(Some)
            .map_err(|source| PersistError::Decode {
                key: domain.key().to_string(),
                source,
            })
    }

    fn reseed(&mut self) {
        self.documents = self.canonical.clone();
        for domain in Domain::ALL {
            self.persist(domain);
        }
        // Version last: a partial mirror must never match.
        if let Err(err) = self.persistence.save(VERSION_KEY, &self.bundle_version) {
            warn!(error = %err, "failed to persist bundle version");
        }
    }

    fn persist(&mut self, domain: Domain) {
        let text = self.documents.get(domain).to_string();
        if let Err(err) = self.persistence.save(domain.key(), &text) {
            warn!(error = %err, "failed to persist {} document", domain);
        }
    }

    fn ensure_ready(&mut self) {
        if self.state == StoreState::Uninitialized {
            self.hydrate();
        }
    }

    /// Replaces one working document and applies the affected groups.
    ///
    /// Recomputes every group the document feeds plus any group left stale
    /// by an earlier rejected edit. A group that fails keeps its previously
    /// applied variables; the document itself is still replaced. Hydrates
    /// first if the store has not been hydrated.
    pub fn set(&mut self, domain: Domain, document: Value) -> MutationReport {
        self.ensure_ready();
        self.state = StoreState::Mutating;

        self.documents = self.documents.with(domain, document);
        let groups: BTreeSet<VarGroup> = VarGroup::fed_by(domain)
            .chain(self.stale.iter().copied())
            .collect();
        let report = self.recompute(groups);
        self.persist(domain);

        self.state = StoreState::Ready;
        self.notifier.changed();
        report
    }

    /// Switches the active theme and reapplies the themed groups.
    ///
    /// Accepts any configured theme or `auto`.
    pub fn set_theme(&mut self, theme: &str) -> Result<MutationReport, Error> {
        if theme != AUTO_THEME && !self.config.themes.iter().any(|t| t == theme) {
            return Err(Error::Config(format!("unknown theme '{}'", theme)));
        }
        let Some(theme) = select_theme(theme, &self.config.themes) else {
            return Err(Error::Config("no themes configured".into()));
        };

        self.ensure_ready();
        if theme == self.theme {
            return Ok(MutationReport::default());
        }
        self.state = StoreState::Mutating;

        debug!(from = %self.theme, to = %theme, "switching theme");
        self.theme = theme;
        let groups: BTreeSet<VarGroup> = VarGroup::ALL
            .into_iter()
            .filter(|g| g.is_themed())
            .chain(self.stale.iter().copied())
            .collect();
        let report = self.recompute(groups);

        self.state = StoreState::Ready;
        self.notifier.changed();
        Ok(report)
    }

    /// Restores the defaults, mirrors them, and reapplies every group.
    pub fn reset(&mut self) -> MutationReport {
        self.ensure_ready();
        self.state = StoreState::Mutating;

        self.reseed();
        let report = self.recompute(VarGroup::ALL.into_iter().collect());

        self.state = StoreState::Ready;
        self.notifier.changed();
        report
    }

    fn recompute(&mut self, groups: BTreeSet<VarGroup>) -> MutationReport {
        let index = self.documents.index();
        let mut report = MutationReport::default();

        for group in groups {
            report.recomputed.push(group);
            match compute_group(group, &index, &self.config, &self.theme) {
                Ok(vars) => {
                    let previous = self.applied.remove(&group).unwrap_or_default();
                    let delta = VarDelta::between(&previous, &vars);
                    delta.apply_to(&mut self.target);
                    debug!(
                        group = %group,
                        set = delta.set.len(),
                        removed = delta.removed.len(),
                        unchanged = delta.unchanged,
                        "applied variable group"
                    );

                    if !delta.is_empty() {
                        report.changed.push(group);
                    }
                    report.writes += delta.write_count();
                    self.applied.insert(group, vars);
                    self.stale.remove(&group);
                }
                Err(violations) => {
                    warn!(
                        group = %group,
                        violations = violations.len(),
                        first = %violations.first().map(ToString::to_string).unwrap_or_default(),
                        "rejected edit, keeping previous variables"
                    );
                    self.stale.insert(group);
                    report.rejected.push((group, violations));
                }
            }
        }
        report
    }

    /// Registers a listener called after every mutation, or once per
    /// closed batch.
    pub fn subscribe(&mut self, listener: impl Fn() + 'static) -> Subscription {
        self.notifier.subscribe(listener)
    }

    /// Opens a batch. Mutations inside it do not notify on their own.
    pub fn begin_batch(&mut self) {
        self.notifier.begin_batch();
    }

    /// Closes a batch. The coalesced notification fires once the debounce
    /// window has passed, see [`poll_notifications`](Self::poll_notifications).
    pub fn end_batch(&mut self) {
        self.notifier.end_batch(Instant::now());
    }

    /// Fires a scheduled notification whose window has elapsed.
    pub fn poll_notifications(&mut self) -> bool {
        self.poll_notifications_at(Instant::now())
    }

    pub fn poll_notifications_at(&mut self, now: Instant) -> bool {
        self.notifier.poll(now)
    }

    /// Fires a scheduled notification immediately.
    pub fn flush_notifications(&mut self) -> bool {
        self.notifier.flush()
    }

    pub fn notification_pending(&self) -> bool {
        self.notifier.is_pending()
    }
}

impl<T: StyleTarget + std::fmt::Debug> std::fmt::Debug for VarsStore<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VarsStore")
            .field("state", &self.state)
            .field("theme", &self.theme)
            .field("bundle_version", &self.bundle_version)
            .field("stale", &self.stale)
            .field("notifier", &self.notifier)
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}
