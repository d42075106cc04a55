use crate::harness::{Assertion, Scenario};
use serde_json::json;
use tdm_core::{ScenarioDataStore, StoreState, TierKind};

#[test]
fn test_feature_default_merged_with_scenario() {
    Scenario::new("login_standard")
        .from_fixture("default")
        .configure("login", Some("standard_login"))
        .assert_state(StoreState::Configured)
        .assert_get("expectedTitle", "Login")
        .assert_get("expectedWelcomeMessage", "Welcome!")
        .assert_answered_by("expectedTitle", TierKind::Static)
        .assert(Assertion::StaticKeyCount(6))
        .run()
        .expect("scenario should pass");
}

#[test]
fn test_nested_override_and_null_keeps_base() {
    Scenario::new("login_locked_account")
        .from_fixture("default")
        .configure("login", Some("locked_account"))
        .assert_get("expectedTitle", "Account Locked")
        .assert_get("limits", json!({"attempts": 1, "lockoutSeconds": 60}))
        .assert_get("allowedRoles", json!(["guest"]))
        .assert_get("loginErrorMessage", "Invalid username or password")
        .run()
        .unwrap();
}

#[test]
fn test_data_tag_selects_scenario_file() {
    Scenario::new("data_tag")
        .from_fixture("default")
        .configure_from_tags("login", &["@smoke", "@data:standard_login", "@data:locked_account"])
        .assert_get("expectedWelcomeMessage", "Welcome!")
        .assert_get("expectedTitle", "Login")
        .run()
        .unwrap();
}

#[test]
fn test_untagged_scenario_uses_defaults_only() {
    Scenario::new("no_data_tag")
        .from_fixture("default")
        .configure_from_tags("login", &["@smoke"])
        .assert_get("expectedTitle", "Login")
        .assert_missing("expectedWelcomeMessage")
        .assert(Assertion::StaticKeyCount(5))
        .run()
        .unwrap();
}

#[test]
fn test_missing_scenario_file_falls_back_to_defaults() {
    Scenario::new("missing_scenario_file")
        .from_fixture("default")
        .configure("login", Some("no_such_scenario"))
        .assert_get("expectedTitle", "Login")
        .assert(Assertion::StaticKeyCount(5))
        .run()
        .unwrap();
}

#[test]
fn test_feature_without_data_is_empty() {
    Scenario::new("feature_without_data")
        .from_fixture("default")
        .configure("search", Some("by_name"))
        .assert_state(StoreState::Configured)
        .assert(Assertion::StaticKeyCount(0))
        .assert_missing("expectedTitle")
        .run()
        .unwrap();
}

#[test]
fn test_malformed_data_files_are_treated_as_absent() {
    Scenario::new("malformed_data_files")
        .from_fixture("default")
        .configure("broken", Some("list_root"))
        .assert(Assertion::StaticKeyCount(0))
        .assert_missing("expectedTitle")
        .run()
        .unwrap();
}

#[test]
fn test_path_like_scenario_key_is_skipped() {
    Scenario::new("path_like_scenario_key")
        .from_fixture("default")
        .configure("login", Some("../default"))
        .assert_get("expectedTitle", "Login")
        .assert(Assertion::StaticKeyCount(5))
        .run()
        .unwrap();
}

#[test]
fn test_environment_does_not_select_files() {
    Scenario::new("environment_independent")
        .from_fixture("default")
        .configure_in("staging", "login", Some("standard_login"))
        .assert_get("expectedWelcomeMessage", "Welcome!")
        .assert(Assertion::Custom(Box::new(|store: &mut ScenarioDataStore| -> anyhow::Result<()> {
            let ctx = store
                .context()
                .ok_or_else(|| anyhow::anyhow!("store not configured"))?;
            anyhow::ensure!(ctx.environment == "staging", "wrong environment");
            anyhow::ensure!(ctx.scenario_key.as_deref() == Some("standard_login"));
            Ok(())
        })))
        .run()
        .unwrap();
}

#[test]
fn test_data_edited_between_scenarios_is_reloaded() {
    Scenario::new("data_reload")
        .from_fixture("default")
        .configure("checkout", None)
        .assert_get("currency", "EUR")
        .end_scenario()
        .write_file(
            "features/checkout/data/default.json",
            br#"{"currency": "USD"}"#,
        )
        .configure("checkout", None)
        .assert_get("currency", "USD")
        .assert_missing("shipping")
        .run()
        .unwrap();
}

#[test]
fn test_path_like_feature_is_empty() {
    Scenario::new("path_like_feature")
        .from_fixture("default")
        .configure("../default/features/login", None)
        .assert_state(StoreState::Configured)
        .assert(Assertion::StaticKeyCount(0))
        .run()
        .unwrap();
}
