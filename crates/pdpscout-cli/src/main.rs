use std::path::PathBuf;

use clap::{Parser, Subcommand};
use pdpscout_core::CustomStore;
use tracing_subscriber::EnvFilter;

mod input;
mod output;
mod resolve;

use output::OutputFormat;
use resolve::{parse_custom_store, ResolveArgs};

#[derive(Debug, Parser)]
#[command(name = "pdpscout")]
#[command(about = "Find product detail pages for EANs across online stores")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Resolve every EAN in a CSV file against the selected stores
    Resolve {
        /// CSV file with an `EAN` column
        #[arg(long, short)]
        input: PathBuf,
        /// Where to write the result table (stdout when omitted)
        #[arg(long, short)]
        output: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
        format: OutputFormat,
        /// Catalog store slug to include; repeatable. All stores when omitted.
        #[arg(long = "store")]
        stores: Vec<String>,
        /// Extra store as `NAME=URL` or a bare URL; repeatable
        #[arg(long = "custom-store", value_parser = parse_custom_store)]
        custom_stores: Vec<CustomStore>,
    },
    /// List the predefined store catalog
    Stores,
    /// Detect the storefront platform behind a URL
    Classify { url: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = pdpscout_core::load_app_config()?;

    // Logs go to stderr so a table written to stdout stays clean.
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Resolve {
            input,
            output,
            format,
            stores,
            custom_stores,
        } => {
            resolve::run_resolve(
                &config,
                ResolveArgs {
                    input,
                    output,
                    format,
                    stores,
                    custom_stores,
                },
            )
            .await?;
        }
        Commands::Stores => resolve::run_stores(&config)?,
        Commands::Classify { url } => resolve::run_classify(&config, &url).await?,
    }

    Ok(())
}
