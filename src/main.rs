use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use exchequer::api::{AppState, run_http_server};
use exchequer::data::load_baseline;
use exchequer::scenario::FileScenarioStore;

#[derive(Parser, Debug)]
#[command(
    name = "exchequer",
    about = "Interactive budget explorer (revenue levers, benefit reforms, departmental adjustments)"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the web UI and JSON API.
    Serve {
        #[arg(long, default_value_t = 8080)]
        port: u16,
        #[arg(long, default_value = "data", help = "Directory of source documents")]
        data_dir: PathBuf,
        #[arg(
            long,
            default_value = "scenarios",
            help = "Directory where saved scenarios are written"
        )]
        scenario_dir: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Serve {
            port,
            data_dir,
            scenario_dir,
        } => {
            let baseline = match load_baseline(&data_dir) {
                Ok(baseline) => baseline,
                Err(e) => {
                    error!(data_dir = %data_dir.display(), "failed to load baseline: {e}");
                    process::exit(1);
                }
            };
            info!(
                fiscal_year = %baseline.fiscal_year,
                revenue = baseline.total_revenue(),
                expenditure = baseline.total_expenditure(),
                "baseline loaded"
            );

            let store = match FileScenarioStore::new(&scenario_dir) {
                Ok(store) => store,
                Err(e) => {
                    error!(scenario_dir = %scenario_dir.display(), "failed to open scenario store: {e}");
                    process::exit(1);
                }
            };

            let state = AppState::new(baseline, Box::new(store));
            if let Err(e) = run_http_server(port, state).await {
                error!("server error: {e}");
                process::exit(1);
            }
        }
    }
}
