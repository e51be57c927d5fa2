//! Background job runner.
//!
//! One optimization run at a time: [`JobRunner::start`] claims the single
//! busy slot, creates the run directory and spawns the job. The job narrates
//! its progress and forwards everything the engine prints to the
//! [`LogSink`]. There is no queue and no cancellation; a second start while
//! a job is active is rejected with [`CoreError::Conflict`].

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::process::Command;
use tokio::task::JoinHandle;

use crate::engine_config;
use crate::error::CoreError;
use crate::log_sink::{publish, LogSink};
use crate::run_config::RunConfig;
use crate::run_dir::{create_run_dir, RunDir};
use crate::subprocess::stream_command;
use crate::types::RunId;

/// Log line prefix telling listeners that a run's artifacts can be listed.
pub const RESULTS_READY_PREFIX: &str = "RESULTS_READY:";

/// Placeholder in engine arguments replaced by the run config path.
pub const CONFIG_PLACEHOLDER: &str = "{config}";
/// Placeholder in engine arguments replaced by the run directory.
pub const OUTPUT_PLACEHOLDER: &str = "{output}";

/// The engine's command line, with placeholders in its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl EngineCommand {
    /// Build from a program and a whitespace-separated argument template.
    pub fn from_template(program: impl Into<String>, args_template: &str) -> Self {
        Self {
            program: program.into(),
            args: args_template.split_whitespace().map(str::to_string).collect(),
        }
    }

    /// Concrete command for one run.
    pub fn command(&self, config_path: &Path, output_dir: &Path) -> Command {
        let config = config_path.to_string_lossy();
        let output = output_dir.to_string_lossy();
        let mut cmd = Command::new(&self.program);
        cmd.args(self.args.iter().map(|arg| {
            arg.replace(CONFIG_PLACEHOLDER, &config)
                .replace(OUTPUT_PLACEHOLDER, &output)
        }));
        cmd
    }
}

/// Static settings of the runner.
#[derive(Debug, Clone)]
pub struct RunnerSettings {
    /// Directory holding one subdirectory per run.
    pub output_root: PathBuf,
    /// Directory holding the config template and tutorial dataset.
    pub assets_dir: PathBuf,
    pub engine: EngineCommand,
    /// Pause after the opening lines so freshly connected listeners catch
    /// the whole log.
    pub settle_delay: Duration,
}

/// A run that has been accepted and spawned.
#[derive(Debug)]
pub struct StartedRun {
    pub run_id: RunId,
    pub output_dir: PathBuf,
    /// Completes when the job has finished and released the busy slot.
    pub handle: JoinHandle<()>,
}

/// Launches optimization runs, one at a time.
pub struct JobRunner {
    settings: Arc<RunnerSettings>,
    sink: Arc<dyn LogSink>,
    busy: Arc<AtomicBool>,
}

impl JobRunner {
    pub fn new(settings: RunnerSettings, sink: Arc<dyn LogSink>) -> Self {
        Self {
            settings: Arc::new(settings),
            sink,
            busy: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn settings(&self) -> &RunnerSettings {
        &self.settings
    }

    /// Whether a job is currently running.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Validate `run`, create its directory and spawn it in the background.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(&self, run: RunConfig) -> Result<StartedRun, CoreError> {
        run.validate()?;
        let guard = BusyGuard::acquire(Arc::clone(&self.busy)).ok_or_else(|| {
            CoreError::Conflict("A run is already in progress".to_string())
        })?;

        let run_dir = create_run_dir(&self.settings.output_root, chrono::Local::now())?;
        tracing::info!(
            run_id = %run_dir.id,
            input = %run.input_database,
            solver = %run.solver_name,
            "Run accepted",
        );

        let job = Job {
            run,
            run_dir: run_dir.clone(),
            settings: Arc::clone(&self.settings),
            sink: Arc::clone(&self.sink),
        };
        let handle = tokio::spawn(async move {
            let _guard = guard;
            job.execute().await;
        });

        Ok(StartedRun {
            run_id: run_dir.id,
            output_dir: run_dir.path,
            handle,
        })
    }
}

/// Holds the runner's busy flag; clears it on drop, including on panic.
struct BusyGuard(Arc<AtomicBool>);

impl BusyGuard {
    fn acquire(flag: Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// A failed job step and the error it hit.
struct JobFailure {
    step: String,
    error: CoreError,
}

fn failed_while(step: String) -> impl FnOnce(CoreError) -> JobFailure {
    move |error| JobFailure { step, error }
}

struct Job {
    run: RunConfig,
    run_dir: RunDir,
    settings: Arc<RunnerSettings>,
    sink: Arc<dyn LogSink>,
}

impl Job {
    async fn execute(self) {
        let id = self.run_dir.id.clone();
        self.say(format!("--- Starting Run ID: {id} ---")).await;
        self.say(format!(
            "Time: {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.6f")
        ))
        .await;
        if !self.settings.settle_delay.is_zero() {
            tokio::time::sleep(self.settings.settle_delay).await;
        }

        match self.run_engine().await {
            Ok(()) => {
                tracing::info!(run_id = %id, "Run completed");
                self.say(format!("✅ Run {id} completed successfully.")).await;
                self.say(format!("{RESULTS_READY_PREFIX}{id}")).await;
            }
            Err(failure) => {
                tracing::error!(run_id = %id, step = %failure.step, error = %failure.error, "Run failed");
                self.report_failure(&failure).await;
            }
        }
    }

    async fn run_engine(&self) -> Result<(), JobFailure> {
        let config = engine_config::build(&self.run, &self.settings.assets_dir, self.sink.as_ref())
            .await
            .map_err(failed_while(format!(
                "building the engine configuration from {}",
                self.run.input_database
            )))?;
        self.say(format!("Output Database target: {}", config.output_database()))
            .await;

        let config_path = self.run_dir.config_path();
        config
            .write_to(&config_path)
            .await
            .map_err(failed_while(format!("writing {}", config_path.display())))?;
        tracing::debug!(path = %config_path.display(), "Wrote engine configuration");

        self.say("Starting engine...").await;
        let engine_step = format!("running {}", self.settings.engine.program);
        let mut cmd = self.settings.engine.command(&config_path, &self.run_dir.path);
        let status = stream_command(&mut cmd, self.sink.as_ref())
            .await
            .map_err(failed_while(engine_step.clone()))?;
        if !status.success() {
            return Err(JobFailure {
                step: engine_step,
                error: CoreError::Engine(format!("engine exited with {status}")),
            });
        }
        Ok(())
    }

    /// Error line, then the step that failed.
    async fn report_failure(&self, failure: &JobFailure) {
        self.say(format!("❌ Error during run: {}", failure.error)).await;
        self.say(format!("    while {}", failure.step)).await;
    }

    async fn say(&self, line: impl Into<String>) {
        publish(self.sink.as_ref(), line).await;
    }
}
