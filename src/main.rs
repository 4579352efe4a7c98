#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = quiz_service::run().await {
        eprintln!("quiz-service fatal: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}
