use std::io::Write;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use locker_admin::{execute, Args};
use locker_client::LockerClient;

fn run(args: &Args) -> Result<(), locker_client::Error> {
    let client = LockerClient::new(args.config()?)?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    execute(&args.command, &client, &mut out)?;
    out.flush()?;
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();

    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
