#[tokio::main]
async fn main() -> anyhow::Result<()> {
    verse_drip_backend::run().await
}
