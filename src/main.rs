use clap::Parser;
use tracemix::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.debug { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("RUST_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();

    let quiet = cli.quiet;
    let report = tracemix::run(cli).await?;

    if !quiet {
        tracemix::print_statistics(&report, &mut std::io::stderr().lock())?;
    }
    Ok(())
}
