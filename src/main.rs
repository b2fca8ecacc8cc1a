#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = eduaccess::run().await {
        eprintln!("eduaccess fatal: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}
