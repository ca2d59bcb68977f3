use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    phrasefind_cli::main_entry().await
}
