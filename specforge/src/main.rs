//! Binary entry point.

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    specforge::cli::run().await
}
