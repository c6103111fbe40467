#[tokio::main]
async fn main() -> anyhow::Result<()> {
    cleaning_crm::run().await
}
