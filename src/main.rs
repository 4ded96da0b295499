use clap::Parser;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = gmail_threads::cli::Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = gmail_threads::run(cli).await {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: u8) {
    let default_directive = match verbose {
        0 => "gmail_threads=warn",
        1 => "gmail_threads=debug",
        _ => "gmail_threads=trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
