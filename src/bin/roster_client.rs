#![warn(clippy::pedantic, clippy::all, clippy::nursery)]

use clap::Parser;
use roster::client::{api::RecordsApi, controller::Controller, repl};
use std::time::Duration;
use tracing::{error, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Terminal client for the student records server
#[derive(Parser, Debug)]
#[command(name = "roster-client", version, about)]
struct Args {
    #[arg(
        long,
        env = "ROSTER_SERVER_URL",
        default_value = "http://127.0.0.1:3000",
        help = "Base URL of the records server"
    )]
    server: String,

    #[arg(
        long = "reconnect-secs",
        value_name = "SECS",
        default_value_t = 30,
        help = "How often to retry while the server is unreachable"
    )]
    reconnect_secs: u64,
}

#[tokio::main]
async fn main() {
    let dotenv_result = dotenvy::dotenv();
    let args = Args::parse();

    //logs go to stderr so they don't tangle with the result area
    tracing::subscriber::set_global_default(
        FmtSubscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .with_writer(std::io::stderr)
            .finish(),
    )
    .expect("unable to set tracing subscriber");

    if let Err(e) = dotenv_result {
        warn!(?e, "No .env file loaded");
    }

    let api = RecordsApi::new(&args.server).expect("unable to create API client");
    let reconnect_every = Duration::from_secs(args.reconnect_secs.max(1));

    if let Err(e) = repl::run(Controller::new(api), reconnect_every).await {
        error!(?e, "Client stopped with an error");
        std::process::exit(1);
    }
}
