use clap::Parser;
use tracing_subscriber::EnvFilter;
use workreport_client::cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = workreport_client::cli::run(cli).await {
        let verbose = matches!(std::env::var("WR_CLI_VERBOSE").as_deref(), Ok("true") | Ok("1"));
        if verbose {
            eprintln!("Error: {e:?}");
        } else if !workreport_client::cli::already_reported(&e) {
            eprintln!("Error: {e}");
        }
        std::process::exit(1);
    }

    Ok(())
}
