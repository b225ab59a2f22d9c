//! openstatus CLI
//!
//! Manage openstatus monitors from a YAML file.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use openstatus::commands;
use openstatus::config::DEFAULT_RUN_CONFIG;
use openstatus::io::ReqwestHttpClient;
use openstatus::prompt::StdinPrompt;
use openstatus::{ApiGateway, ApplyOutcome, LockStore, MonitorGateway};
use tracing::Level;

#[derive(Parser)]
#[command(name = "openstatus")]
#[command(about = "Manage your openstatus monitors as code")]
#[command(version)]
struct Cli {
    /// Log level
    #[arg(short, long, default_value = "warn", global = true)]
    log_level: Level,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Manage monitors
    #[command(subcommand)]
    Monitors(MonitorsCommand),

    /// Run the synthetic tests listed in the runner config
    Run {
        #[command(flatten)]
        auth: Auth,

        /// Test runner configuration file
        #[arg(long, default_value = DEFAULT_RUN_CONFIG)]
        config: PathBuf,
    },

    /// Show the workspace of the access token
    Whoami {
        #[command(flatten)]
        auth: Auth,
    },
}

#[derive(Subcommand)]
enum MonitorsCommand {
    /// Create, update and delete monitors to match the config file
    Apply {
        #[command(flatten)]
        auth: Auth,
        #[command(flatten)]
        files: Files,
        /// Apply without asking for confirmation
        #[arg(short = 'y', long)]
        auto_accept: bool,
    },

    /// Create every monitor of the config file
    Create {
        #[command(flatten)]
        auth: Auth,
        /// Monitor configuration file
        #[arg(short, long, default_value = "openstatus.yaml")]
        config: PathBuf,
        /// Apply without asking for confirmation
        #[arg(short = 'y', long)]
        auto_accept: bool,
    },

    /// Delete a monitor
    Delete {
        #[command(flatten)]
        auth: Auth,
        id: i64,
        /// Apply without asking for confirmation
        #[arg(short = 'y', long)]
        auto_accept: bool,
    },

    /// Import every monitor of the workspace into a config and lock file
    Import {
        #[command(flatten)]
        auth: Auth,
        /// Output configuration file
        #[arg(short, long, default_value = "openstatus.yaml")]
        output: PathBuf,
        /// Lock file to write
        #[arg(long, default_value = "openstatus.lock")]
        lock: PathBuf,
    },

    /// Show a monitor
    Info {
        #[command(flatten)]
        auth: Auth,
        id: i64,
    },

    /// List monitors
    List {
        #[command(flatten)]
        auth: Auth,
        /// Include inactive monitors
        #[arg(long)]
        all: bool,
    },

    /// Run a monitor once from every region
    Trigger {
        #[command(flatten)]
        auth: Auth,
        id: i64,
    },
}

#[derive(Args)]
struct Auth {
    /// openstatus API access token
    #[arg(short = 't', long, env = "OPENSTATUS_API_TOKEN", hide_env_values = true)]
    access_token: String,
}

#[derive(Args)]
struct Files {
    /// Monitor configuration file
    #[arg(short, long, default_value = "openstatus.yaml")]
    config: PathBuf,

    /// Lock file recording synchronized monitors
    #[arg(long, default_value = "openstatus.lock")]
    lock: PathBuf,
}

fn gateway(auth: &Auth) -> ApiGateway {
    ApiGateway::new(&auth.access_token, Arc::new(ReqwestHttpClient::default()))
}

async fn execute(command: Command) -> openstatus::Result<()> {
    match command {
        Command::Monitors(MonitorsCommand::Apply {
            auth,
            files,
            auto_accept,
        }) => {
            let store = LockStore::new(files.lock);
            let gateway: Arc<dyn MonitorGateway> = Arc::new(gateway(&auth));
            let outcome =
                commands::apply_monitors(gateway, &files.config, &store, auto_accept, &StdinPrompt)
                    .await?;
            if outcome == ApplyOutcome::Declined {
                println!("No changes applied");
            }
            Ok(())
        }
        Command::Monitors(MonitorsCommand::Create {
            auth,
            config,
            auto_accept,
        }) => {
            commands::create_monitors(&gateway(&auth), &config, auto_accept, &StdinPrompt)
                .await?;
            Ok(())
        }
        Command::Monitors(MonitorsCommand::Delete {
            auth,
            id,
            auto_accept,
        }) => {
            commands::delete_monitor(&gateway(&auth), id, auto_accept, &StdinPrompt).await?;
            Ok(())
        }
        Command::Monitors(MonitorsCommand::Import { auth, output, lock }) => {
            commands::import_monitors(&gateway(&auth), &output, &LockStore::new(lock)).await?;
            Ok(())
        }
        Command::Monitors(MonitorsCommand::Info { auth, id }) => {
            commands::monitor_info(&gateway(&auth), id).await
        }
        Command::Monitors(MonitorsCommand::List { auth, all }) => {
            commands::list_monitors(&gateway(&auth), all).await
        }
        Command::Monitors(MonitorsCommand::Trigger { auth, id }) => {
            commands::trigger_monitor(&gateway(&auth), id).await
        }
        Command::Run { auth, config } => {
            commands::run_configured_tests(Arc::new(gateway(&auth)), &config).await
        }
        Command::Whoami { auth } => {
            commands::whoami(&gateway(&auth)).await?;
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(cli.log_level)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("Parsed command line arguments: log_level={:?}", cli.log_level);

    match execute(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!("Command failed: {:?}", e);
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
