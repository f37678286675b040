use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = beancount_migrate::args::parse();
    beancount_migrate::cli::main(args).await
}
