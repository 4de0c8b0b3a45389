#[tokio::main]
async fn main() -> anyhow::Result<()> {
    macro_dashboard_lib::run().await
}
