use miette::Result;

#[tokio::main]
async fn main() -> Result<()> {
    tablerepo::cli::run().await?;
    Ok(())
}
