use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use groundwork::cli::{Command, PreflightArgs, RootArgs, SetupArgs};
use groundwork::setup::context::SetupContext;
use groundwork::setup::deps::Deps;
use groundwork::setup::pipeline::Pipeline;
use groundwork::setup::plan::SetupPlan;
use groundwork::tools::{self, Toolset, REQUIRED_PROGRAMS};

fn main() -> Result<()> {
    let args = RootArgs::parse();
    init_tracing(args.verbose());

    match args.command {
        Command::Setup(args) => cmd_setup(args),
        Command::Preflight(args) => cmd_preflight(args),
    }
}

fn init_tracing(verbose: bool) {
    // --verbose wins over RUST_LOG; otherwise default to info for our crate.
    let filter = if verbose {
        EnvFilter::new("groundwork=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("groundwork=info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_setup(args: SetupArgs) -> Result<()> {
    let plan = SetupPlan::resolve(&args)?;
    let pipeline = Pipeline::build(&plan);

    if args.dry_run {
        let preview = serde_json::json!({
            "plan": plan,
            "steps": pipeline.step_names(),
        });
        println!("{}", serde_json::to_string_pretty(&preview)?);
        return Ok(());
    }

    tools::preflight(REQUIRED_PROGRAMS)?;
    let toolset = Arc::new(Toolset::production(&plan.manifest_root));
    let deps = Deps::production(toolset, &plan);
    let mut ctx = SetupContext::new(plan);
    pipeline.run(&deps, &mut ctx)?;

    println!("Setup complete. Operator image: {}", ctx.operator_image);
    Ok(())
}

fn cmd_preflight(_args: PreflightArgs) -> Result<()> {
    tools::preflight(REQUIRED_PROGRAMS)?;
    println!("All required tools found: {}", REQUIRED_PROGRAMS.join(", "));
    Ok(())
}
