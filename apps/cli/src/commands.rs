//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::Result;
use crateprov_core::{
    ProgressReporter, build_workflow_context, extract_step_dicts_with, extract_steps_with, to_json,
    write_json,
};
use crateprov_shared::{AppConfig, ExtractConfig, init_config, load_config};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// crateprov: summarise workflow steps recorded in an RO-Crate.
#[derive(Parser)]
#[command(
    name = "crateprov",
    version,
    about = "Extract and summarise workflow-step provenance from RO-Crate metadata.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Arguments shared by every extraction command.
#[derive(Args, Debug)]
pub(crate) struct CrateArgs {
    /// Crate directory (defaults to `crate_dir` from the config file).
    #[arg(value_name = "CRATE")]
    pub crate_dir: Option<PathBuf>,

    /// Interface entity whose workflow is extracted.
    #[arg(short, long)]
    pub interface: Option<String>,

    /// Write JSON to this file instead of stdout.
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Print the ordered step records.
    Steps {
        #[command(flatten)]
        args: CrateArgs,
    },

    /// Print per-step views with their prompt payloads.
    Views {
        #[command(flatten)]
        args: CrateArgs,

        /// Prefer example links containing this site identifier.
        #[arg(short, long)]
        site: Option<String>,
    },

    /// Print the workflow overview, diagram and outcomes.
    Context {
        #[command(flatten)]
        args: CrateArgs,

        /// Prefer example links containing this site identifier.
        #[arg(short, long)]
        site: Option<String>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags. Logs go to stderr.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "crateprov=info,crateprov_core=info",
        1 => "crateprov=debug,crateprov_core=debug,crateprov_graph=debug",
        _ => "crateprov=trace,crateprov_core=trace,crateprov_graph=trace,crateprov_shared=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Steps { args } => cmd_steps(&args),
        Command::Views { args, site } => cmd_views(&args, site),
        Command::Context { args, site } => cmd_context(&args, site),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(),
        },
    }
}

/// Crate directory and extraction settings from the config file and flags.
fn resolve_settings(
    config: &AppConfig,
    args: &CrateArgs,
    site: Option<String>,
) -> (PathBuf, ExtractConfig) {
    let crate_dir = args
        .crate_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.defaults.crate_dir));

    let mut extract = ExtractConfig::from(config);
    if let Some(interface) = &args.interface {
        extract.interface_id = interface.clone();
    }
    if site.is_some() {
        extract = extract.with_site(site);
    }
    (crate_dir, extract)
}

fn cmd_steps(args: &CrateArgs) -> Result<()> {
    let config = load_config()?;
    let (crate_dir, extract) = resolve_settings(&config, args, None);
    info!(crate_dir = %crate_dir.display(), interface = %extract.interface_id, "extracting steps");

    let reporter = CliProgress::new();
    let steps = extract_steps_with(crate_dir.as_path(), &extract, &reporter)?;
    emit(&steps, args.out.as_deref(), steps.len(), "steps")
}

fn cmd_views(args: &CrateArgs, site: Option<String>) -> Result<()> {
    let config = load_config()?;
    let (crate_dir, extract) = resolve_settings(&config, args, site);
    info!(crate_dir = %crate_dir.display(), interface = %extract.interface_id, "building step views");

    let reporter = CliProgress::new();
    let documents = extract_step_dicts_with(crate_dir.as_path(), &extract, &reporter)?;
    emit(&documents, args.out.as_deref(), documents.len(), "step views")
}

fn cmd_context(args: &CrateArgs, site: Option<String>) -> Result<()> {
    let config = load_config()?;
    let (crate_dir, extract) = resolve_settings(&config, args, site);
    info!(crate_dir = %crate_dir.display(), interface = %extract.interface_id, "building workflow context");

    let reporter = CliProgress::new();
    let documents = extract_step_dicts_with(crate_dir.as_path(), &extract, &reporter)?;
    let context = build_workflow_context(
        documents.iter().map(|document| &document.view),
        extract.site.as_deref(),
    );
    emit(&context, args.out.as_deref(), documents.len(), "steps in workflow context")
}

/// Print JSON to stdout, or write it atomically to `out`.
fn emit<T: Serialize>(data: &T, out: Option<&Path>, count: usize, what: &str) -> Result<()> {
    match out {
        Some(path) => {
            write_json(path, data)?;
            println!("Wrote {count} {what} to {}", path.display());
        }
        None => println!("{}", to_json(data)?),
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner on stderr.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .map(|style| style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]))
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(style);
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn step_built(&self, step_id: &str, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Built step [{current}/{total}] {step_id}"));
    }

    fn done(&self, _steps: usize) {
        self.spinner.finish_and_clear();
    }
}

impl Drop for CliProgress {
    fn drop(&mut self) {
        if !self.spinner.is_finished() {
            self.spinner.finish_and_clear();
        }
    }
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}
