use anyhow::Result;
use reviewer::cli;

#[tokio::main]
async fn main() -> Result<()> {
    cli::run().await
}
