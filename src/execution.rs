use std::{
    io::{self, Write},
    path::Path,
    time::Duration,
};

use crate::{
    bundle::Engines,
    error::{GlueError, Result},
    output::OutputDisplay,
    plan::{Plan, Stage},
    util::run_command_with_timeout,
};

/// Feeds planned stages to their engines, one at a time.
pub struct PipelineRunner<'a> {
    engines: &'a Engines,
    timeout: Option<Duration>,
    display: OutputDisplay,
}

impl<'a> PipelineRunner<'a> {
    pub fn new(engines: &'a Engines, timeout: Option<Duration>, display: OutputDisplay) -> Self {
        Self {
            engines,
            timeout,
            display,
        }
    }

    /// Runs every stage of every plan in order and stops at the first failure.
    pub async fn run_plans(&self, plans: &[Plan]) -> Result<()> {
        for plan in plans {
            if plan.stages.is_empty() {
                tracing::info!(bundle = %plan.bundle, "Nothing to do");
                continue;
            }

            for stage in &plan.stages {
                self.run_stage(stage).await?;
            }

            let queued: Vec<String> = plan.stages.iter().map(Stage::task_name).collect();
            tracing::info!(bundle = %plan.bundle, "Completed stages: {}", queued.join(", "));
        }

        Ok(())
    }

    async fn run_stage(&self, stage: &Stage) -> Result<()> {
        let task_name = stage.task_name();

        let command = self.engines.command(stage.engine).ok_or_else(|| {
            GlueError::Stage(format!(
                "No engine configured for '{}' (set engines.{} in the config file)",
                task_name, stage.engine
            ))
        })?;

        let missing = missing_sources(stage);
        if !missing.is_empty() {
            return Err(GlueError::Stage(format!(
                "'{}' cannot start, missing inputs: {}",
                task_name,
                missing.join(", ")
            )));
        }

        tracing::info!(stage = %task_name, files = stage.files.len(), "Running stage");

        let payload = serde_json::to_vec(stage)?;
        let envs = [
            ("JSGLUE_ENGINE", stage.engine.as_str()),
            ("JSGLUE_TARGET", stage.target.as_str()),
        ];
        let stream_output = self.display == OutputDisplay::Stream;

        let output =
            run_command_with_timeout(command, &payload, &envs, self.timeout, stream_output).await?;

        if !stream_output {
            print_grouped_output(&output.stdout, &output.stderr);
        }

        if !output.status.success() {
            return Err(GlueError::Stage(format!(
                "'{}' failed with status: {}",
                task_name, output.status
            )));
        }

        tracing::debug!(stage = %task_name, "Stage finished");
        Ok(())
    }
}

/// Sources that do not exist yet. A minify stage reads the previous stage's
/// output, so this catches engines that exit cleanly without writing.
fn missing_sources(stage: &Stage) -> Vec<&str> {
    stage
        .files
        .iter()
        .flat_map(|file| file.sources.iter())
        .filter(|source| !Path::new(source.as_str()).exists())
        .map(String::as_str)
        .collect()
}

fn print_grouped_output(stdout: &[u8], stderr: &[u8]) {
    if !stdout.is_empty() {
        let mut out = io::stdout().lock();
        let _ = out.write_all(stdout);
        let _ = out.flush();
    }
    if !stderr.is_empty() {
        let mut err = io::stderr().lock();
        let _ = err.write_all(stderr);
        let _ = err.flush();
    }
}
