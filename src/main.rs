//! Entry point wiring CLI dispatch to the analysis modules.

use anyhow::Result;
use fda_signal::{cli::Cli, config::Settings, logging};
use tracing::{info, instrument};

#[tokio::main]
#[instrument]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_tracing()?;
    let settings = Settings::load()?;

    info!(?cli, "starting command");
    cli.dispatch(settings).await
}
