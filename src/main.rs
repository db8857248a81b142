use clap::Parser;
use std::process;
use tracing_subscriber::EnvFilter;

mod bundle;
mod cli;
mod destination;
mod error;
mod execution;
mod options;
mod output;
mod plan;
mod util;

use bundle::{GlueConfiguration, load_config, select_bundles};
use cli::Cli;
use error::Result;
use execution::PipelineRunner;
use options::resolve;
use output::OutputDisplay;
use plan::{Plan, build_plan};
use util::parse_timeout;

#[tokio::main]
async fn main() {
    let args = Cli::parse();
    init_logging(args.verbose);

    if let Err(e) = run_jsglue(args).await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run_jsglue(args: Cli) -> Result<()> {
    let config = load_config(&args.file)?;
    let plans = plan_bundles(&config, args.bundle.as_deref())?;

    if args.plan {
        println!("{}", serde_json::to_string_pretty(&plans)?);
        return Ok(());
    }

    if args.dry_run {
        print_dry_run(&plans);
        return Ok(());
    }

    let timeout = parse_timeout(args.timeout.as_deref(), config.timeout.as_deref());
    let display = args
        .display
        .or(config.display)
        .unwrap_or(OutputDisplay::Group);

    PipelineRunner::new(&config.engines, timeout, display)
        .run_plans(&plans)
        .await
}

fn plan_bundles(config: &GlueConfiguration, requested: Option<&str>) -> Result<Vec<Plan>> {
    let bundles = select_bundles(
        &config.bundles,
        requested,
        config.default_bundle.as_deref(),
    )?;

    let mut plans = Vec::with_capacity(bundles.len());
    for bundle in bundles {
        let options = resolve(&config.options.overlay(&bundle.options))?;

        let groups = bundle
            .files
            .iter()
            .map(|group| group.expand())
            .collect::<Result<Vec<_>>>()?;

        let plan = build_plan(&bundle.name, &groups, &options)?;
        tracing::debug!(bundle = %bundle.name, stages = plan.stages.len(), "Planned bundle");
        plans.push(plan);
    }

    Ok(plans)
}

fn print_dry_run(plans: &[Plan]) {
    println!("Dry run mode - showing what would be executed:");
    for plan in plans {
        println!("{}:", plan.bundle);
        for stage in &plan.stages {
            println!("  {}", stage.task_name());
            for file in &stage.files {
                println!("    [{}] -> {}", file.sources.join(", "), file.destination);
            }
        }
    }
}
