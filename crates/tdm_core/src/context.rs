//! Scenario context handed over by the test harness.

use crate::config::ENV_VAR_ENVIRONMENT;

/// Tag prefix selecting a scenario data document, as in `@data:standard_login`.
pub const DATA_TAG_PREFIX: &str = "@data:";

/// Environment used when `TEST_ENV` is not set.
pub const DEFAULT_ENVIRONMENT: &str = "qa";

/// What the harness tells the store at scenario start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioContext {
    /// Target environment (e.g. "qa").
    pub environment: String,
    /// Feature the scenario belongs to.
    pub feature: String,
    /// Scenario data selector, if the scenario carries one.
    pub scenario_key: Option<String>,
}

impl ScenarioContext {
    /// Context for `feature` in `environment`, with an optional selector.
    pub fn new(environment: &str, feature: &str, scenario_key: Option<&str>) -> Self {
        Self {
            environment: environment.to_string(),
            feature: feature.to_string(),
            scenario_key: scenario_key.map(str::to_string),
        }
    }

    /// Context whose selector comes from the scenario's tags.
    pub fn from_tags<I, S>(environment: &str, feature: &str, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let key = scenario_key_from_tags(tags);
        Self::new(environment, feature, key.as_deref())
    }
}

/// Extracts the key of the first `@data:` tag.
///
/// Only the first `@data:` tag counts. If its key is empty the scenario has
/// no data document, even when a later tag names one.
pub fn scenario_key_from_tags<I, S>(tags: I) -> Option<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    tags.into_iter()
        .find_map(|tag| {
            tag.as_ref()
                .trim()
                .strip_prefix(DATA_TAG_PREFIX)
                .map(|key| key.trim().to_string())
        })
        .filter(|key| !key.is_empty())
}

/// Environment from `TEST_ENV`, defaulting to "qa".
pub fn environment_from_env() -> String {
    environment_or(DEFAULT_ENVIRONMENT)
}

/// Environment from `TEST_ENV`, or `default` when unset or blank.
pub fn environment_or(default: &str) -> String {
    std::env::var(ENV_VAR_ENVIRONMENT)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}
