use clap::Parser;
use env_logger::Env;
use log::{error, info, warn};
use raw_http_server::{ConnectionAcceptor, ServerConfig, ServerResult};
use std::path::PathBuf;
use std::process;

/// Minimal HTTP/1.1 server: echo, user-agent and file routes
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Directory the /files/ routes read from and write to
    #[arg(long)]
    directory: Option<PathBuf>,

    /// Port to listen on
    #[arg(long, default_value_t = 4221)]
    port: u16,
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let mut config = ServerConfig::new().with_address("0.0.0.0", args.port);
    if let Some(directory) = args.directory {
        config = config.with_directory(directory);
    }

    if let Err(e) = run(config).await {
        error!("{}", e);
        process::exit(1);
    }
}

async fn run(config: ServerConfig) -> ServerResult<()> {
    match config.directory() {
        Some(dir) => info!("Serving files from {}", dir.display()),
        None => warn!("No --directory given; /files/ routes will fail"),
    }

    let acceptor = ConnectionAcceptor::bind(config)?;
    info!("Listening on {}", acceptor.local_addr());

    acceptor
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Could not install Ctrl-C handler: {}", e);
                std::future::pending::<()>().await;
            }
            info!("Received shutdown signal. Stopping server...");
        })
        .await
}
