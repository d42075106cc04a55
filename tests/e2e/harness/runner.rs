use super::assertions::Assertion;
use super::steps::ScenarioStep;
use super::workspace::TestWorkspace;
use anyhow::{anyhow, bail, Context, Result};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::thread;
use tdm_core::{
    sum_line_totals, Config, EntityGenerator, Order, RunId, ScenarioContext, ScenarioDataStore,
    StoreOutcome, WriteFailurePolicy, WriteMode,
};

/// How a scenario's workspace is prepared
pub struct RunnerSetup {
    pub fixture: Option<String>,
    pub initial_files: HashMap<String, Vec<u8>>,
    pub write_mode: Option<WriteMode>,
    pub failure_policy: Option<WriteFailurePolicy>,
}

/// Executes scenarios against real data stores sharing one durable file
pub struct ScenarioRunner {
    workspace: TestWorkspace,
    config: Config,
    run: RunId,
    workers: Vec<ScenarioDataStore>,
    active: usize,
    last_store: Option<std::result::Result<StoreOutcome, String>>,
    last_order: Option<Order>,
    current_step: usize,
}

impl ScenarioRunner {
    /// Create a runner with a single worker
    pub fn new(setup: &RunnerSetup) -> Result<Self> {
        let workspace = match &setup.fixture {
            Some(name) => TestWorkspace::from_fixture(name)?,
            None => TestWorkspace::empty()?,
        };
        workspace.write_files(&setup.initial_files)?;

        let mut config = Config::load(workspace.path())?;
        if let Some(mode) = setup.write_mode {
            config.durable.write_mode = mode;
        }
        if let Some(policy) = setup.failure_policy {
            config.durable.on_write_failure = policy;
        }

        let mut runner = Self {
            workspace,
            config,
            run: RunId::from_env_or_now()?,
            workers: Vec::new(),
            active: 0,
            last_store: None,
            last_order: None,
            current_step: 0,
        };
        runner.spawn_worker();

        Ok(runner)
    }

    /// Get current step number
    pub fn current_step(&self) -> usize {
        self.current_step
    }

    /// Execute all steps in sequence
    pub fn execute(&mut self, steps: &[ScenarioStep]) -> Result<()> {
        for (i, step) in steps.iter().enumerate() {
            self.current_step = i;
            self.execute_step(step)
                .with_context(|| format!("Step {}: {:?}", i, step))?;
        }
        Ok(())
    }

    fn execute_step(&mut self, step: &ScenarioStep) -> Result<()> {
        match step {
            ScenarioStep::Configure {
                environment,
                feature,
                scenario_key,
            } => {
                let environment = environment
                    .clone()
                    .unwrap_or_else(|| self.config.run.environment.clone());
                self.worker()
                    .configure(&environment, feature, scenario_key.as_deref());
                Ok(())
            }
            ScenarioStep::ConfigureFromTags { feature, tags } => {
                let ctx = ScenarioContext::from_tags(&self.config.run.environment, feature, tags);
                self.worker().configure_with(&ctx);
                Ok(())
            }
            ScenarioStep::EndScenario => {
                self.worker().end_scenario();
                Ok(())
            }

            ScenarioStep::Store { key, value } => {
                let outcome = self.worker().store_data(key, value.clone())?;
                self.last_store = Some(Ok(outcome));
                Ok(())
            }
            ScenarioStep::TryStore { key, value } => {
                let result = self.worker().store_data(key, value.clone());
                self.last_store = Some(result.map_err(|e| e.to_string()));
                Ok(())
            }
            ScenarioStep::GenerateUser { store } => {
                self.worker().generate_user(*store)?;
                Ok(())
            }
            ScenarioStep::GenerateOrder { store } => {
                let order = self.worker().generate_order(*store)?;
                self.last_order = Some(order);
                Ok(())
            }
            ScenarioStep::GenerateProduct { store } => {
                self.worker().generate_product(*store)?;
                Ok(())
            }
            ScenarioStep::ClearPersistent => {
                self.worker().clear_persistent()?;
                Ok(())
            }

            ScenarioStep::Worker { index } => self.handle_switch_worker(*index),
            ScenarioStep::ConcurrentStores {
                workers,
                keys_per_worker,
            } => self.handle_concurrent_stores(*workers, *keys_per_worker),

            ScenarioStep::WriteFile { path, content } => self.workspace.write_file(path, content),
            ScenarioStep::RemovePath { path } => self.workspace.remove(path),
            ScenarioStep::CorruptDurableFile => {
                let path = self.durable_rel_path()?;
                self.workspace.write_file(&path, b"{\"truncated\": ")
            }
            ScenarioStep::BlockResultsDir => {
                let dir = self.config.durable.results_dir.to_string_lossy().into_owned();
                self.workspace.remove(&dir)?;
                self.workspace.write_file(&dir, b"not a directory")
            }

            ScenarioStep::Assert { assertion } => self.handle_assertion(assertion),
        }
    }

    // ===== Workers =====

    fn new_store(&self, seed: u64) -> ScenarioDataStore {
        ScenarioDataStore::from_config(self.workspace.path(), &self.config, &self.run)
            .with_generator(EntityGenerator::with_seed(seed))
    }

    fn spawn_worker(&mut self) {
        let store = self.new_store(self.workers.len() as u64);
        self.workers.push(store);
    }

    fn worker(&mut self) -> &mut ScenarioDataStore {
        &mut self.workers[self.active]
    }

    fn handle_switch_worker(&mut self, index: usize) -> Result<()> {
        if index > self.workers.len() {
            bail!(
                "Worker {} requested but only {} exist; add workers in order",
                index,
                self.workers.len()
            );
        }
        if index == self.workers.len() {
            self.spawn_worker();
        }
        self.active = index;
        Ok(())
    }

    fn handle_concurrent_stores(&mut self, workers: usize, keys_per_worker: usize) -> Result<()> {
        let environment = self.config.run.environment.clone();
        let mut stores: Vec<ScenarioDataStore> = (0..workers)
            .map(|w| self.new_store(1000 + w as u64))
            .collect();

        thread::scope(|scope| -> Result<()> {
            let handles: Vec<_> = stores
                .iter_mut()
                .enumerate()
                .map(|(w, store)| {
                    let environment = environment.as_str();
                    scope.spawn(move || -> Result<()> {
                        store.configure(environment, "parallel", None);
                        for k in 0..keys_per_worker {
                            store.store_data(&format!("worker{}_key{}", w, k), json!(k))?;
                        }
                        store.end_scenario();
                        Ok(())
                    })
                })
                .collect();

            for handle in handles {
                handle
                    .join()
                    .map_err(|_| anyhow!("Worker thread panicked"))??;
            }
            Ok(())
        })
    }

    fn durable_rel_path(&self) -> Result<String> {
        let store = &self.workers[self.active];
        let rel = store
            .durable()
            .path()
            .strip_prefix(self.workspace.path())
            .context("Durable file lies outside the workspace")?;
        Ok(rel.to_string_lossy().into_owned())
    }

    // ===== Assertions =====

    fn handle_assertion(&mut self, assertion: &Assertion) -> Result<()> {
        match assertion {
            Assertion::Get { key, value } => {
                let actual = self.worker().get(key);
                if actual.as_ref() != Some(value) {
                    bail!("Expected {} = {}, got {:?}", key, value, actual);
                }
            }
            Assertion::Missing { key } => {
                if let Some(actual) = self.worker().get(key) {
                    bail!("Expected {} to be absent, got {}", key, actual);
                }
            }
            Assertion::AnsweredBy { key, tier } => {
                let hit = self
                    .worker()
                    .lookup(key)
                    .ok_or_else(|| anyhow!("No tier holds {}", key))?;
                if hit.tier != *tier {
                    bail!("Expected {} from the {} tier, got {}", key, tier, hit.tier);
                }
            }
            Assertion::State(expected) => {
                let actual = self.worker().state();
                if actual != *expected {
                    bail!("Expected store state {:?}, got {:?}", expected, actual);
                }
            }
            Assertion::StaticKeyCount(expected) => {
                let actual = self.worker().static_data().len();
                if actual != *expected {
                    bail!("Expected {} static keys, got {}", expected, actual);
                }
            }

            Assertion::DurableFileExists => {
                if !self.worker().durable().exists() {
                    bail!("Durable file does not exist");
                }
            }
            Assertion::NoDurableFile => {
                if self.worker().durable().exists() {
                    bail!("Durable file exists");
                }
            }
            Assertion::DurableContains { key, value } => {
                let actual = self.worker().durable().get(key)?;
                if actual.as_ref() != Some(value) {
                    bail!("Expected durable {} = {}, got {:?}", key, value, actual);
                }
            }
            Assertion::DurableLacks { key } => {
                if let Some(actual) = self.worker().durable().get(key)? {
                    bail!("Expected durable {} to be absent, got {}", key, actual);
                }
            }
            Assertion::DurableKeyCount(expected) => {
                let actual = self.worker().durable().read_document()?.len();
                if actual != *expected {
                    bail!("Expected {} durable keys, got {}", expected, actual);
                }
            }
            Assertion::DurableUnreadable => {
                if self.worker().durable().read_document().is_ok() {
                    bail!("Expected the durable file to be unreadable");
                }
            }

            Assertion::LastStoreOutcome(expected) => match &self.last_store {
                Some(Ok(actual)) if actual == expected => {}
                other => bail!("Expected last store {:?}, got {:?}", expected, other),
            },
            Assertion::LastStoreFailed => match &self.last_store {
                Some(Err(_)) => {}
                other => bail!("Expected last store to fail, got {:?}", other),
            },
            Assertion::OrderTotalConsistent => {
                let order = self
                    .last_order
                    .as_ref()
                    .ok_or_else(|| anyhow!("No order generated yet"))?;
                if order.total_amount != sum_line_totals(&order.items) {
                    bail!(
                        "Order total {} does not match its items",
                        order.total_amount
                    );
                }
                let stored = self.workers[self.active].get("totalAmount");
                if let Some(stored) = stored {
                    if stored != Value::from(order.total_amount) {
                        bail!("Stored total {} differs from {}", stored, order.total_amount);
                    }
                }
            }

            Assertion::Custom(check) => check(self.worker())?,
        }
        Ok(())
    }
}
