//! Hierarchical loading of static test data documents.
//!
//! For a feature the loader reads
//! `<features_dir>/<feature>/data/default.json` and, when a scenario key is
//! given, `<features_dir>/<feature>/data/scenarios/<key>.json`, then
//! deep-merges them with the scenario document taking precedence.

use crate::config::Config;
use crate::document::{read_document, Document};
use crate::error::{Result, TdmError};
use crate::merge::merge_all;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info, warn};

/// Outcome of reading one source document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceStatus {
    /// The document was read and parsed.
    Loaded,
    /// No file at the expected path.
    Missing,
    /// The file exists but could not be read or parsed.
    Malformed {
        /// Description of the failure.
        reason: String,
    },
}

/// One document consulted during resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceReport {
    /// Which layer this document provides.
    pub layer: SourceLayer,
    /// Path that was consulted.
    pub path: PathBuf,
    /// What happened when reading it.
    pub status: SourceStatus,
}

/// Layer of the static hierarchy, lowest precedence first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SourceLayer {
    /// `data/default.json` for the feature.
    FeatureDefault,
    /// `data/scenarios/<key>.json` for the feature.
    Scenario,
}

/// Result of resolving the static document, with the sources consulted.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    /// The merged document.
    pub document: Document,
    /// Sources in precedence order (lowest first).
    pub sources: Vec<SourceReport>,
}

/// Loads and merges the static documents for a feature and scenario.
///
/// Pure with respect to its inputs and the document tree on disk: the
/// loader holds no state beyond its root directory.
#[derive(Debug, Clone)]
pub struct DataLoader {
    features_dir: PathBuf,
}

impl DataLoader {
    /// Creates a loader reading from `<project_root>/features`.
    pub fn new(project_root: impl AsRef<Path>) -> Self {
        Self::with_features_dir(project_root.as_ref().join("features"))
    }

    /// Creates a loader reading from an explicit features directory.
    pub fn with_features_dir(features_dir: impl AsRef<Path>) -> Self {
        Self {
            features_dir: features_dir.as_ref().to_path_buf(),
        }
    }

    /// Creates a loader using the layout from `config`.
    pub fn from_config(project_root: &Path, config: &Config) -> Self {
        Self::with_features_dir(config.features_dir(project_root))
    }

    /// Directory containing one folder per feature.
    pub fn features_dir(&self) -> &Path {
        &self.features_dir
    }

    /// Path of the feature-default document.
    pub fn default_path(&self, feature: &str) -> PathBuf {
        self.features_dir
            .join(feature)
            .join("data")
            .join("default.json")
    }

    /// Path of the scenario-override document.
    pub fn scenario_path(&self, feature: &str, scenario_key: &str) -> PathBuf {
        self.features_dir
            .join(feature)
            .join("data")
            .join("scenarios")
            .join(format!("{}.json", scenario_key))
    }

    /// Resolves the static document.
    ///
    /// Never fails: missing, malformed, or unreadable sources contribute an
    /// empty document and are logged.
    pub fn resolve(
        &self,
        environment: &str,
        feature: Option<&str>,
        scenario_key: Option<&str>,
    ) -> Document {
        self.resolve_with_report(environment, feature, scenario_key)
            .document
    }

    /// Resolves the static document and reports which sources were used.
    pub fn resolve_with_report(
        &self,
        environment: &str,
        feature: Option<&str>,
        scenario_key: Option<&str>,
    ) -> Resolution {
        let Some(feature) = feature else {
            debug!(environment = environment, "No feature given, static data is empty");
            return Resolution::default();
        };

        if let Err(e) = validate_name("feature", feature) {
            warn!(environment = environment, "{}", e);
            return Resolution::default();
        }

        let mut docs = Vec::with_capacity(2);
        let mut sources = Vec::with_capacity(2);

        let default_path = self.default_path(feature);
        let (doc, status) = load_source(&default_path);
        if status == SourceStatus::Missing {
            debug!(path = %default_path.display(), "No default data for feature");
        }
        docs.push(doc);
        sources.push(SourceReport {
            layer: SourceLayer::FeatureDefault,
            path: default_path,
            status,
        });

        if let Some(key) = scenario_key {
            match validate_name("scenario", key) {
                Ok(()) => {
                    let path = self.scenario_path(feature, key);
                    let (doc, status) = load_source(&path);
                    match status {
                        SourceStatus::Loaded => {
                            info!(path = %path.display(), "Loaded scenario data");
                        }
                        SourceStatus::Missing => {
                            warn!(
                                scenario = key,
                                feature = feature,
                                "Scenario data file not found"
                            );
                        }
                        SourceStatus::Malformed { .. } => {}
                    }
                    docs.push(doc);
                    sources.push(SourceReport {
                        layer: SourceLayer::Scenario,
                        path,
                        status,
                    });
                }
                Err(e) => warn!(feature = feature, "{}", e),
            }
        }

        debug!(
            environment = environment,
            feature = feature,
            scenario = scenario_key.unwrap_or("default"),
            "Resolved static data"
        );

        Resolution {
            document: merge_all(docs.iter()),
            sources,
        }
    }
}

/// Reads one source, degrading every failure to an empty document.
fn load_source(path: &Path) -> (Document, SourceStatus) {
    match read_document(path) {
        Ok(Some(doc)) => (doc, SourceStatus::Loaded),
        Ok(None) => (Document::new(), SourceStatus::Missing),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Could not read/parse data document");
            (
                Document::new(),
                SourceStatus::Malformed {
                    reason: e.to_string(),
                },
            )
        }
    }
}

/// Checks that a name is a single normal path component.
pub(crate) fn validate_name(kind: &'static str, name: &str) -> Result<()> {
    let invalid = || TdmError::InvalidName {
        kind,
        name: name.to_string(),
    };

    if name.trim().is_empty() || name.contains('/') || name.contains('\\') {
        return Err(invalid());
    }

    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        _ => Err(invalid()),
    }
}
