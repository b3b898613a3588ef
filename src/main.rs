#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = chemtest_rust::run().await {
        eprintln!("chemtest-rust fatal: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}
