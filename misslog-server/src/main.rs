// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  misslog — not-found request logger
//
//  Host:      axum static-file server on tokio
//  Signal:    every response that ends in 404
//  Settings:  JSON settings file, reloaded on SIGHUP
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use clap::{Args, Parser, Subcommand};
use misslog_core::MissLogConfig;
use misslog_core::sanitize::SettingsForm;
use misslog_core::settings::Flag;
use misslog_server::commands;
use misslog_store::{FileSettingsStore, SettingsStore};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "misslog", version, about = "Append a templated line to a file for every 404")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "misslog.yaml")]
    config: PathBuf,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Settings file holding the logger record (overrides `settings.path`)
    #[arg(long)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the document root and log every 404 (default)
    Serve,
    /// List the variables a template can use
    Vars,
    /// Inspect or change the logger settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Print the current settings
    Show,
    /// Change one or more settings
    Set(SetArgs),
}

#[derive(Args, Debug)]
struct SetArgs {
    /// Enable or disable logging (1/0, true/false, on/off)
    #[arg(long)]
    enabled: Option<String>,

    /// File the log lines are appended to
    #[arg(long)]
    file_path: Option<String>,

    /// Line template; pass an empty string for the built-in layout
    #[arg(long)]
    template: Option<String>,

    /// strftime format for %datetime%
    #[arg(long)]
    date_format: Option<String>,
}

impl From<SetArgs> for SettingsForm {
    fn from(args: SetArgs) -> Self {
        SettingsForm {
            enabled: args.enabled.map(Flag::Text),
            file_path: args.file_path,
            template: args.template,
            date_format: args.date_format,
            write_mode: None,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // ── Tracing ──
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // ── Config ──
    if cli.config.exists() {
        info!(path = %cli.config.display(), "Loading config file");
    } else {
        info!("No config file found, using defaults and environment");
    }
    let mut config = MissLogConfig::load(&cli.config)?;
    if let Some(path) = cli.settings {
        config.settings.path = path;
    }

    // ── Settings store ──
    let store = Arc::new(FileSettingsStore::new(
        config.settings.path.clone(),
        config.settings.key.clone(),
    ));

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            info!(version = env!("CARGO_PKG_VERSION"), "misslog starting");
            let store: Arc<dyn SettingsStore> = store;
            tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()?
                .block_on(misslog_server::serve(config.server, store))?;
        }
        Command::Vars => commands::print_vars(&mut std::io::stdout().lock())?,
        Command::Config { action } => match action {
            ConfigAction::Show => {
                commands::show_config(store.as_ref(), &mut std::io::stdout().lock())?
            }
            ConfigAction::Set(args) => {
                commands::set_config(store.as_ref(), args.into(), &mut std::io::stdout().lock())?;
            }
        },
    }

    Ok(())
}
