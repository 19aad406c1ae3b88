//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use repofrag_core::{ExtractResult, ProgressReporter};
use repofrag_shared::{
    AppConfig, ExtractConfig, FRAGMENTS_FILE_NAME, PayloadConfig, init_config, load_config,
};
use tracing::info;

/// Exit status when `build-payload` runs before `extract`.
const MISSING_INPUT_EXIT_CODE: i32 = 2;

/// Number of captured paths echoed after extraction.
const PREVIEW_LEN: usize = 10;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// repofrag — capture repository fragments for project summaries.
#[derive(Parser)]
#[command(
    name = "repofrag",
    version,
    about = "Extract repository fragments and build a prompt payload for project summaries.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Repository root (defaults to the current directory).
    #[arg(long, global = true, value_name = "DIR")]
    pub root: Option<PathBuf>,

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

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Scan the repository and write fragments.json.
    Extract,

    /// Select key fragments from fragments.json and write prompt_payload.json.
    BuildPayload {
        /// Maximum number of fragments to include [default: 10].
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        max: Option<u64>,

        /// Deployment profile stored in the payload (local/dev/prod) [default: local].
        #[arg(long)]
        env: Option<String>,
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

/// Initialize tracing based on CLI flags.
///
/// Diagnostics go to stderr so stdout carries only command output.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "repofrag=warn,repofrag_core=warn,repofrag_shared=warn",
        1 => "repofrag=info,repofrag_core=info,repofrag_shared=info",
        2 => "repofrag=debug,repofrag_core=debug,repofrag_shared=debug",
        _ => "repofrag=trace,repofrag_core=trace,repofrag_shared=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

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
    let root = match cli.root {
        Some(root) => root,
        None => std::env::current_dir()
            .map_err(|e| eyre!("cannot determine working directory: {e}"))?,
    };

    match cli.command {
        Command::Extract => cmd_extract(&root),
        Command::BuildPayload { max, env } => cmd_build_payload(&root, max, env),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(),
        },
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

fn cmd_extract(root: &Path) -> Result<()> {
    if !root.is_dir() {
        return Err(eyre!("repository root '{}' is not a directory", root.display()));
    }

    let config = load_config()?;
    let extract_config = ExtractConfig::from_section(&config.extract, root);

    info!(root = %root.display(), "extracting fragments");

    let reporter = CliProgress::new();
    let result = repofrag_core::extract::extract(&extract_config, &reporter)?;

    println!(
        "Wrote {} fragments to {}",
        result.count(),
        result.output_path.display()
    );
    println!("Example paths:");
    for path in result.preview(PREVIEW_LEN) {
        println!(" - {path}");
    }
    println!("Done.");

    Ok(())
}

fn cmd_build_payload(root: &Path, max: Option<u64>, env: Option<String>) -> Result<()> {
    let config = load_config()?;
    let mut payload_config = PayloadConfig::from_app(&config, root);
    if let Some(max) = max {
        payload_config.max =
            usize::try_from(max).map_err(|_| eyre!("--max {max} is out of range"))?;
    }
    if let Some(env) = env {
        payload_config.env = env;
    }

    info!(
        root = %root.display(),
        max = payload_config.max,
        env = %payload_config.env,
        "building payload"
    );

    let result = match repofrag_core::payload::build_payload(&payload_config) {
        Ok(result) => result,
        Err(e) if e.is_missing_input() => {
            eprintln!(
                "Error: {FRAGMENTS_FILE_NAME} not found in {}. Run `repofrag extract` first.",
                root.display()
            );
            std::process::exit(MISSING_INPUT_EXIT_CODE);
        }
        Err(e) => return Err(e.into()),
    };

    println!(
        "Wrote payload with {} fragments to {}",
        result.document.files_scanned.len(),
        result.output_path.display()
    );
    for record in &result.document.files_scanned {
        println!(" - {}", record.path);
    }

    Ok(())
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

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// Spinner shown on stderr while the tree is scanned. Hidden when stderr is
/// not a terminal.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn file_captured(&self, path: &str, count: usize) {
        self.spinner.set_message(format!("Captured [{count}] {path}"));
    }

    fn done(&self, _result: &ExtractResult) {
        self.spinner.finish_and_clear();
    }
}
