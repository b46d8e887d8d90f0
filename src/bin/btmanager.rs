//! btmanager binary entrypoint.

use btmanager::cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    cli::run().await
}
