//! Per-scenario data store with tiered lookup.
//!
//! `get` consults, in order, the Dynamic tier (values written in this
//! scenario), the Resolved Static Document (feature and scenario data
//! files), and the run-wide durable file. The first tier holding the key
//! wins.
//!
//! `store_data` writes to the Dynamic tier and then to the durable file.
//! The durable write is a whole-file read-modify-write; see
//! [`crate::durable`] for what that means for concurrent scenarios.

use crate::config::{Config, WriteFailurePolicy};
use crate::context::ScenarioContext;
use crate::document::{Document, Value};
use crate::durable::{DurableFile, RunId};
use crate::error::{Result, TdmError};
use crate::generate::{EntityGenerator, Order, Product, User};
use crate::loader::DataLoader;
use crate::tiers::{resolve_key, DurableTier, DynamicTier, Lookup, StaticTier, Tier};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info, warn};

/// Lifecycle state of a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreState {
    /// No scenario has been configured yet; only the durable tier answers.
    Unconfigured,
    /// Static data for a scenario is loaded.
    Configured,
}

/// Result of a `store_data` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOutcome {
    /// Written to the Dynamic tier and the durable file.
    Persisted,
    /// Written to the Dynamic tier only; the durable write failed.
    NotPersisted,
}

impl StoreOutcome {
    /// Whether the durable write succeeded.
    pub fn is_persisted(&self) -> bool {
        matches!(self, Self::Persisted)
    }
}

/// Test data store for one scenario execution at a time.
///
/// Create one per harness worker, call [`configure`](Self::configure) at
/// the start of every scenario and [`end_scenario`](Self::end_scenario) at
/// the end. Every store of a run shares the same [`DurableFile`].
pub struct ScenarioDataStore {
    loader: DataLoader,
    durable: DurableFile,
    dynamic: DynamicTier,
    statics: StaticTier,
    context: Option<ScenarioContext>,
    policy: WriteFailurePolicy,
    generator: EntityGenerator,
}

impl ScenarioDataStore {
    /// Creates an unconfigured store.
    pub fn new(loader: DataLoader, durable: DurableFile) -> Self {
        Self {
            loader,
            durable,
            dynamic: DynamicTier::new(),
            statics: StaticTier::default(),
            context: None,
            policy: WriteFailurePolicy::default(),
            generator: EntityGenerator::from_entropy(),
        }
    }

    /// Creates a store for `run` using the project layout from `config`.
    pub fn from_config(project_root: &Path, config: &Config, run: &RunId) -> Self {
        let loader = DataLoader::from_config(project_root, config);
        let durable = DurableFile::for_run(config.results_dir(project_root), run)
            .with_mode(config.durable.write_mode);
        Self::new(loader, durable).with_policy(config.durable.on_write_failure)
    }

    /// Sets what happens when a durable write fails.
    pub fn with_policy(mut self, policy: WriteFailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Replaces the entity generator (e.g. with a seeded one).
    pub fn with_generator(mut self, generator: EntityGenerator) -> Self {
        self.generator = generator;
        self
    }

    /// Current lifecycle state.
    pub fn state(&self) -> StoreState {
        if self.context.is_some() {
            StoreState::Configured
        } else {
            StoreState::Unconfigured
        }
    }

    /// Scenario this store is configured for.
    pub fn context(&self) -> Option<&ScenarioContext> {
        self.context.as_ref()
    }

    /// The Resolved Static Document for the current scenario.
    pub fn static_data(&self) -> &Document {
        self.statics.document()
    }

    /// The shared durable file handle.
    pub fn durable(&self) -> &DurableFile {
        &self.durable
    }

    /// Prepares the store for a scenario.
    ///
    /// Resolves and caches the static document and empties the Dynamic
    /// tier. Calling it again switches to a new scenario.
    pub fn configure(&mut self, environment: &str, feature: &str, scenario_key: Option<&str>) {
        let document = self
            .loader
            .resolve(environment, Some(feature), scenario_key);

        self.statics = StaticTier::new(document);
        self.dynamic.clear();
        self.context = Some(ScenarioContext::new(environment, feature, scenario_key));

        info!(
            environment = environment,
            feature = feature,
            data_key = scenario_key.unwrap_or("default"),
            "Configured scenario data"
        );
    }

    /// Prepares the store from a context built by the harness.
    pub fn configure_with(&mut self, context: &ScenarioContext) {
        self.configure(
            &context.environment,
            &context.feature,
            context.scenario_key.as_deref(),
        );
    }

    /// Looks a key up through all tiers.
    ///
    /// Returns `None` when no tier holds it; never fails.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.lookup(key).map(|hit| hit.value)
    }

    /// Looks a key up and reports which tier answered.
    pub fn lookup(&self, key: &str) -> Option<Lookup> {
        let durable = DurableTier::new(&self.durable);
        let tiers: [&dyn Tier; 3] = [&self.dynamic, &self.statics, &durable];
        resolve_key(&tiers, key)
    }

    /// Looks a key up and deserializes it into `T`.
    ///
    /// A value that doesn't fit `T` is treated as absent.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.get(key)?;
        match serde_json::from_value(value) {
            Ok(typed) => Some(typed),
            Err(e) => {
                debug!(key = key, error = %e, "Stored value has unexpected shape");
                None
            }
        }
    }

    /// Stores a value for this scenario and for later scenarios of the run.
    ///
    /// The Dynamic tier is written first and is never rolled back. The
    /// durable write may then fail; under [`WriteFailurePolicy::Warn`] that
    /// yields `Ok(StoreOutcome::NotPersisted)`, under
    /// [`WriteFailurePolicy::Fail`] it yields `Err(TdmError::Persist)`.
    ///
    /// # Errors
    ///
    /// Returns `NotConfigured` (and writes nothing) before the first
    /// `configure`.
    pub fn store_data(&mut self, key: &str, value: impl Into<Value>) -> Result<StoreOutcome> {
        if self.context.is_none() {
            return Err(TdmError::NotConfigured);
        }

        let value = value.into();
        self.dynamic.insert(key, value.clone());

        match self.durable.put(key, value) {
            Ok(()) => Ok(StoreOutcome::Persisted),
            Err(e) => match self.policy {
                WriteFailurePolicy::Warn => {
                    warn!(
                        key = key,
                        path = %self.durable.path().display(),
                        error = %e,
                        "Could not persist data"
                    );
                    Ok(StoreOutcome::NotPersisted)
                }
                WriteFailurePolicy::Fail => Err(TdmError::Persist {
                    key: key.to_string(),
                    source: Box::new(e),
                }),
            },
        }
    }

    /// Serializes `value` and stores it under `key`.
    pub fn store_serialized<T: Serialize>(&mut self, key: &str, value: &T) -> Result<StoreOutcome> {
        let value = serde_json::to_value(value)?;
        self.store_data(key, value)
    }

    /// Deletes the run's durable file.
    ///
    /// Safe to call when the file doesn't exist. The Dynamic tier is left
    /// alone.
    pub fn clear_persistent(&self) -> Result<()> {
        self.durable.clear().map_err(|e| {
            warn!(
                path = %self.durable.path().display(),
                error = %e,
                "Could not clear persistent data file"
            );
            e
        })
    }

    /// Ends the current scenario, discarding its Dynamic tier.
    ///
    /// Static data and the durable file are untouched.
    pub fn end_scenario(&mut self) {
        let discarded = self.dynamic.len();
        self.dynamic.clear();

        if let Some(ctx) = &self.context {
            debug!(
                feature = %ctx.feature,
                discarded = discarded,
                "Completed scenario, dynamic data cleared"
            );
        }
    }

    // ===== Entity generators =====

    /// Generates a user; with `store`, writes each field via `store_data`.
    pub fn generate_user(&mut self, store: bool) -> Result<User> {
        let user = self.generator.user();
        if store {
            self.store_fields(&user)?;
        }
        Ok(user)
    }

    /// Generates an order; with `store`, writes `orderId`, `orderItems`,
    /// and `totalAmount` via `store_data`.
    pub fn generate_order(&mut self, store: bool) -> Result<Order> {
        let order = self.generator.order();
        if store {
            self.store_data("orderId", order.order_id.clone())?;
            self.store_serialized("orderItems", &order.items)?;
            self.store_data("totalAmount", order.total_amount)?;
        }
        Ok(order)
    }

    /// Generates a product; with `store`, writes each field via `store_data`.
    pub fn generate_product(&mut self, store: bool) -> Result<Product> {
        let product = self.generator.product();
        if store {
            self.store_fields(&product)?;
        }
        Ok(product)
    }

    /// `<prefix>_<length random alphanumerics>`.
    pub fn generate_string(&mut self, prefix: &str, length: usize) -> String {
        self.generator.string(prefix, length)
    }

    /// A random integer in `min..=max`.
    pub fn generate_number(&mut self, min: i64, max: i64) -> i64 {
        self.generator.number(min, max)
    }

    /// Stores every top-level field of a serialized entity.
    fn store_fields<T: Serialize>(&mut self, entity: &T) -> Result<()> {
        let Value::Object(fields) = serde_json::to_value(entity)? else {
            return Err(TdmError::Serialization(
                "entity did not serialize to a document".to_string(),
            ));
        };

        for (key, value) in fields {
            self.store_data(&key, value)?;
        }
        Ok(())
    }
}
