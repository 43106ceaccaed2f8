use clap::Parser;
use std::io;

use erpsync::config::{load_config, locate_config, HotlineConfig};
use erpsync::soap::SoapClient;
use erpsync::worker::{consume_tickets, TicketWorker};

#[derive(Parser)]
#[command(name = "ticket-worker")]
#[command(about = "Forward queued ticket JSON to the hotline TicketCreate service")]
#[command(version)]
struct Args {}

fn main() {
    let _args = Args::parse();
    erpsync::logging::init("info");

    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let config: HotlineConfig = load_config(&locate_config()?)?;

    let client = SoapClient::new(
        &config.wsdl_hotline,
        &config.login_hotline,
        &config.password_hotline,
        &config.namespace_hotline,
        config.request_timeout(),
    )?;
    tracing::info!("Hotline endpoint: {}", client.endpoint());

    let worker = TicketWorker::new(client);
    let stats = consume_tickets(&config, &worker, &mut io::stdout().lock())?;
    tracing::info!(
        "{} messages, {} tickets created, {} failed",
        stats.received,
        stats.succeeded,
        stats.failed
    );
    Ok(())
}
