mod config;
mod config_cmd;
mod repl_cmd;
mod run_cmd;
mod surface;
#[cfg(test)]
mod test_util;

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use wearprobe_core::sdk::SimulatorSettings;

use config::{ConfigFile, HarnessSection, MwdatSection, WearprobeConfig};

/// Log entries are already printed to stdout; keep their tracing mirror quiet.
const DEFAULT_LOG_FILTER: &str = "info,wearprobe::log=warn";

#[derive(Parser)]
#[command(name = "wearprobe", about = "Diagnostic harness for a wearables-pairing SDK")]
struct Cli {
    /// Config file (overrides WEARPROBE_CONFIG env var)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a config file
    Init {
        /// MetaAppID value
        #[arg(long)]
        meta_app_id: Option<String>,
        /// ClientToken value
        #[arg(long)]
        client_token: Option<String>,
        /// TeamID value
        #[arg(long)]
        team_id: Option<String>,
        /// AppLinkURLScheme value
        #[arg(long)]
        url_scheme: Option<String>,
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
    /// Show the configuration values the harness reads
    Config {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Start the harness, issue commands, and print the log until idle
    Run {
        /// Call startRegistration() after startup
        #[arg(long)]
        register: bool,
        /// Call startUnregistration() after startup
        #[arg(long)]
        unregister: bool,
        /// Deep link to hand to the SDK (repeatable)
        #[arg(long = "link")]
        links: Vec<String>,
        /// Keep listening for this many seconds instead of stopping when idle
        #[arg(long)]
        wait: Option<u64>,
        /// Print the final snapshot as JSON instead of streaming the log
        #[arg(long)]
        json: bool,
    },
    /// Drive the harness interactively from stdin
    Repl,
    /// Print shell completions
    Completions {
        /// Target shell
        shell: Shell,
    },
}

/// Execute the `wearprobe init` command: write config file.
fn cmd_init(path: PathBuf, mwdat: MwdatSection, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}\nUse --force to overwrite.",
            path.display()
        );
    }

    let cfg = ConfigFile {
        mwdat,
        simulator: SimulatorSettings::default(),
        harness: HarnessSection::default(),
    };
    config::save_config(&path, &cfg)?;

    println!("Config written to {}", path.display());
    for (key, value) in [
        ("MetaAppID", &cfg.mwdat.meta_app_id),
        ("ClientToken", &cfg.mwdat.client_token),
        ("TeamID", &cfg.mwdat.team_id),
        ("AppLinkURLScheme", &cfg.mwdat.app_link_url_scheme),
    ] {
        match value {
            Some(v) => println!("  MWDAT.{key} = {v:?}"),
            None => println!("  MWDAT.{key} (not set)"),
        }
    }
    println!();
    println!("Next: run `wearprobe run --register` to exercise the SDK.");

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init {
            meta_app_id,
            client_token,
            team_id,
            url_scheme,
            force,
        } => {
            let path = config::config_path(cli.config.as_deref());
            let mwdat = MwdatSection {
                meta_app_id,
                client_token,
                team_id,
                app_link_url_scheme: url_scheme,
            };
            cmd_init(path, mwdat, force)?;
        }
        Commands::Config { json } => {
            let resolved = WearprobeConfig::resolve(cli.config.as_deref())?;
            config_cmd::run_config(&resolved, json)?;
        }
        Commands::Run {
            register,
            unregister,
            links,
            wait,
            json,
        } => {
            let resolved = WearprobeConfig::resolve(cli.config.as_deref())?;
            let options = run_cmd::RunOptions {
                register,
                unregister,
                links,
                wait: wait.map(Duration::from_secs),
                json,
            };
            run_cmd::run(&resolved, options).await?;
        }
        Commands::Repl => {
            let resolved = WearprobeConfig::resolve(cli.config.as_deref())?;
            repl_cmd::run_repl(&resolved).await?;
        }
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "wearprobe", &mut io::stdout());
        }
    }

    Ok(())
}
