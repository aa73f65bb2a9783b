use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use autotag::cli::run_release;
use autotag::config::{self, Parameters};
use autotag::git::Git2Repository;
use autotag::output::ActionOutputs;
use autotag::ui;

#[derive(clap::Parser)]
#[command(
    name = "autotag",
    version,
    about = "Create the next release tag from commit messages and existing tags"
)]
struct Args {
    #[arg(short, long, help = "Custom inputs file path")]
    config: Option<String>,

    #[arg(long, default_value = ".", help = "Path inside the git repository")]
    repo: PathBuf,

    #[arg(
        long = "ref",
        env = "GITHUB_REF",
        help = "Ref that triggered the run, e.g. refs/heads/main"
    )]
    trigger_ref: Option<String>,

    #[arg(long, help = "Push created tags to this remote")]
    remote: Option<String>,

    #[arg(
        short,
        long = "input",
        value_name = "KEY=VALUE",
        help = "Override an input, may be repeated"
    )]
    inputs: Vec<String>,

    #[arg(short, long, help = "Enable debug logging")]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("autotag=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("autotag=info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn run(args: Args) -> Result<()> {
    let mut inputs =
        config::load_inputs(args.config.as_deref()).context("Failed to load inputs")?;
    config::overlay_pairs(&mut inputs, args.inputs.iter().map(String::as_str))?;
    let parameters = Parameters::from_inputs(&inputs)?;

    let mut client = Git2Repository::open(&args.repo)
        .with_context(|| format!("Cannot open git repository at {}", args.repo.display()))?;
    if let Some(remote) = args.remote {
        client = client.with_remote(remote, parameters.token.clone());
    }

    let trigger_ref = match args.trigger_ref {
        Some(trigger_ref) => trigger_ref,
        None if parameters.branch.is_some() => String::new(),
        None => client.current_ref()?,
    };

    let mut outputs = ActionOutputs::new(std::env::var_os("GITHUB_OUTPUT").map(PathBuf::from));

    let report = run_release(
        &parameters,
        &client,
        &trigger_ref,
        chrono::Utc::now(),
        &mut outputs,
    )?;
    ui::display_report(&report);

    Ok(())
}

fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);

    if let Err(e) = run(args) {
        ui::display_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}
