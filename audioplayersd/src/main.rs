mod cli;
mod logging;
mod stdio;

use clap::Parser;
use eyre::Result;
use libaudioplayers_dispatch::dispatch::{CommandDispatcher, SimulatedBackendFactory};
use tokio::io::BufReader;
use tokio::task::LocalSet;
use tracing::info;

use crate::cli::Args;
use crate::logging::init_logging;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();
    let log_level = init_logging(args.log_level)?;
    let settings = args.settings();
    info!("Starting with {settings:?}");

    // Players, the registry and the heartbeat all live on this thread
    LocalSet::new()
        .run_until(async move {
            let dispatcher = CommandDispatcher::new(SimulatedBackendFactory, log_level, settings);
            let input = BufReader::new(tokio::io::stdin());
            let mut output = tokio::io::stdout();
            stdio::serve(&dispatcher, input, &mut output).await
        })
        .await
}
