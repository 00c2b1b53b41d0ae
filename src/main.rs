#[tokio::main]
async fn main() -> anyhow::Result<()> {
    investor_onboarding::run().await
}
