#[tokio::main]
async fn main() -> anyhow::Result<()> {
    wasteguard_lib::run().await
}
