//! TDM Core Library
//!
//! Test data management for scenario-based test suites, providing:
//! - Hierarchical static data (feature defaults merged with scenario overrides)
//! - A per-scenario in-memory tier
//! - A run-wide durable tier for handing values between scenarios
//! - Randomized entity generators
//!
//! # Quick Start
//!
//! ```
//! use tdm_core::{DataLoader, DurableFile, ScenarioDataStore};
//! use serde_json::json;
//! use tempfile::TempDir;
//!
//! let tmp = TempDir::new().unwrap();
//! let durable = DurableFile::at(tmp.path().join("test-results/run.json"));
//! let mut store = ScenarioDataStore::new(DataLoader::new(tmp.path()), durable.clone());
//!
//! store.configure("qa", "login", None);
//! store.store_data("email", "a@b.com").unwrap();
//! assert_eq!(store.get("email"), Some(json!("a@b.com")));
//! store.end_scenario();
//!
//! // A later scenario, possibly on another store instance, reads it back
//! let mut next = ScenarioDataStore::new(DataLoader::new(tmp.path()), durable);
//! next.configure("qa", "profile", None);
//! assert_eq!(next.get("email"), Some(json!("a@b.com")));
//! ```
//!
//! # Lookup order
//!
//! `get` answers from the first tier holding the key:
//!
//! 1. Dynamic: values stored during the current scenario
//! 2. Static: `features/<feature>/data/default.json` deep-merged with
//!    `features/<feature>/data/scenarios/<key>.json`
//! 3. Durable: `test-results/persistent-data-<run-id>.json`
//!
//! ## Deep merge
//!
//! ```
//! use tdm_core::merge_documents;
//! use serde_json::json;
//!
//! let base = json!({"user": {"name": "ada", "roles": ["qa"]}});
//! let over = json!({"user": {"roles": ["admin"]}});
//!
//! let merged = merge_documents(base.as_object().unwrap(), over.as_object().unwrap());
//! assert_eq!(merged["user"], json!({"name": "ada", "roles": ["admin"]}));
//! ```

mod config;
mod context;
mod document;
mod durable;
mod error;
mod generate;
mod loader;
mod merge;
mod store;
mod tiers;

pub use config::{
    Config, DataConfig, DurableConfig, RunConfig, WriteFailurePolicy, WriteMode, CONFIG_FILE,
    ENV_VAR_ENVIRONMENT, ENV_VAR_RUN_ID,
};
pub use context::{
    environment_from_env, environment_or, scenario_key_from_tags, ScenarioContext,
    DATA_TAG_PREFIX, DEFAULT_ENVIRONMENT,
};
pub use document::{kind_name, Document, Value};
pub use durable::{DurableFile, RunId};
pub use error::{Result, TdmError};
pub use generate::{
    sum_line_totals, EntityGenerator, Order, OrderItem, Product, User, DEFAULT_NUMBER_MAX,
    DEFAULT_NUMBER_MIN, DEFAULT_STRING_LENGTH, DEFAULT_STRING_PREFIX, ITEM_QUANTITY, ORDER_ITEMS,
};
pub use loader::{DataLoader, Resolution, SourceLayer, SourceReport, SourceStatus};
pub use merge::{merge_all, merge_documents, merge_values};
pub use store::{ScenarioDataStore, StoreOutcome, StoreState};
pub use tiers::{resolve_key, DurableTier, DynamicTier, Lookup, StaticTier, Tier, TierKind};
